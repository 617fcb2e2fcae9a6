//! Module instance implementation for loaded WASM modules

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use easel_shared::constants::{LOOP_EXPORTS, MODE_EXPORTS, SETUP_EXPORTS};
use wasmtime::{
    Func, Instance, Linker, Store, Trap, TypedFunc, UpdateDeadline, Val, ValType, WasmParams,
    WasmResults,
};

use super::context::BridgeContext;
use super::engine::WasmEngine;
use crate::config::BridgeConfig;

/// A loaded and instantiated module
pub struct ModuleInstance {
    store: Store<BridgeContext>,
    instance: Instance,
    mode_fn: Option<TypedFunc<(), i32>>,
    setup_fn: Option<Func>,
    loop_fn: Option<Func>,
}

impl ModuleInstance {
    /// Compile, link and instantiate a module
    ///
    /// Registers the system-call shim and the bridge imports (plus fallbacks
    /// for anything else the module declares in those namespaces), enforces
    /// the configured memory limit and arms epoch interruption: once
    /// `cancelled` is set, the next epoch tick traps whatever is running.
    pub fn instantiate(
        engine: &WasmEngine,
        bytes: &[u8],
        config: &BridgeConfig,
        cancelled: Arc<AtomicBool>,
    ) -> Result<Self> {
        let module = engine.load_module(bytes)?;
        WasmEngine::validate_module_memory(&module, config.runtime.memory_limit)?;

        let mut linker = Linker::new(engine.engine());
        crate::shim::register_shim(&mut linker, &module)?;
        crate::ffi::register_bridge_ffi(&mut linker, &module)?;

        let mut store = Store::new(engine.engine(), BridgeContext::new(config, cancelled));
        store.limiter(|ctx| &mut ctx.limits);
        store.set_epoch_deadline(1);
        store.epoch_deadline_callback(|ctx| {
            if ctx.data().cancelled.load(Ordering::Acquire) {
                Err(Trap::Interrupt.into())
            } else {
                Ok(UpdateDeadline::Continue(1))
            }
        });

        let instance = linker
            .instantiate(&mut store, &module)
            .context("Failed to instantiate WASM module")?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .context("Module exports no linear memory named `memory`")?;
        store.data_mut().memory = Some(memory);

        let mode_fn = MODE_EXPORTS
            .iter()
            .find_map(|name| instance.get_typed_func::<(), i32>(&mut store, name).ok());
        let setup_fn = SETUP_EXPORTS
            .iter()
            .find_map(|name| instance.get_func(&mut store, name));
        let loop_fn = LOOP_EXPORTS
            .iter()
            .find_map(|name| instance.get_func(&mut store, name));

        tracing::debug!(
            "Instantiated module: mode={} setup={} loop={} memory={} bytes",
            mode_fn.is_some(),
            setup_fn.is_some(),
            loop_fn.is_some(),
            memory.data_size(&store)
        );

        Ok(Self {
            store,
            instance,
            mode_fn,
            setup_fn,
            loop_fn,
        })
    }

    /// Call the module's mode query. `None` if it exports none.
    pub fn mode(&mut self) -> Result<Option<i32>> {
        match &self.mode_fn {
            Some(mode) => {
                let value = mode
                    .call(&mut self.store, ())
                    .context("WASM mode() failed")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Call the module's one-time setup entry point
    pub fn setup(&mut self) -> Result<()> {
        match self.setup_fn {
            Some(setup) => self.call_entry(setup).context("WASM setup() failed"),
            None => {
                tracing::debug!("Module exports no setup entry point");
                Ok(())
            }
        }
    }

    /// Call the module's per-frame entry point
    pub fn run_loop(&mut self) -> Result<()> {
        match self.loop_fn {
            Some(frame) => self.call_entry(frame).context("WASM loop() failed"),
            None => Ok(()),
        }
    }

    pub fn has_loop(&self) -> bool {
        self.loop_fn.is_some()
    }

    /// Entry points are `void f(void)` by contract, but C toolchains sometimes
    /// export them as `int f(void)`; any numeric results are discarded.
    fn call_entry(&mut self, func: Func) -> Result<()> {
        let ty = func.ty(&self.store);
        if ty.params().len() != 0 {
            anyhow::bail!("entry point takes {} parameters, expected none", ty.params().len());
        }
        let mut results = ty
            .results()
            .map(|ty| zero_value(&ty))
            .collect::<Option<Vec<Val>>>()
            .context("entry point returns a non-numeric value")?;
        func.call(&mut self.store, &[], &mut results)?;
        Ok(())
    }

    /// Look up any typed export (test harnesses and diagnostics)
    pub fn get_typed_func<Params: WasmParams, Results: WasmResults>(
        &mut self,
        name: &str,
    ) -> Result<TypedFunc<Params, Results>> {
        self.instance.get_typed_func(&mut self.store, name)
    }

    pub fn context(&self) -> &BridgeContext {
        self.store.data()
    }

    pub fn context_mut(&mut self) -> &mut BridgeContext {
        self.store.data_mut()
    }

    pub fn store(&self) -> &Store<BridgeContext> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<BridgeContext> {
        &mut self.store
    }
}

/// Whether a call failed because its bridge was cancelled
pub fn is_interrupt(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<Trap>(), Some(Trap::Interrupt))
}

/// Zero of a numeric value type; `None` for reference and vector types
pub(crate) fn zero_value(ty: &ValType) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(0)),
        ValType::I64 => Some(Val::I64(0)),
        ValType::F32 => Some(Val::F32(0)),
        ValType::F64 => Some(Val::F64(0)),
        _ => None,
    }
}
