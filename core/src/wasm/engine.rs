//! WASM engine wrapper for loading and compiling modules

use anyhow::{Context, Result};
use wasmtime::{Config, Engine, ExternType, Module};

/// WASM page size in bytes
const WASM_PAGE_SIZE: usize = 65536;

/// Shared WASM engine (one per application)
///
/// Epoch interruption is always on. [`WasmEngine::interrupt`] makes every
/// store on the engine check its cancellation flag at the next loop header or
/// call; only cancelled stores trap, the rest keep running.
#[derive(Clone)]
pub struct WasmEngine {
    engine: Engine,
}

impl WasmEngine {
    /// Create a new WASM engine with epoch interruption enabled
    pub fn new() -> Result<Self> {
        let mut config = Config::new();
        config.epoch_interruption(true);
        let engine = Engine::new(&config).context("Failed to create WASM engine")?;
        Ok(Self { engine })
    }

    /// Get a reference to the underlying wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Load a WASM module from bytes
    pub fn load_module(&self, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).context("Failed to compile WASM module")
    }

    /// Wake every store's epoch check
    pub fn interrupt(&self) {
        self.engine.increment_epoch();
    }

    /// Validate that a module's declared memory fits the configured limit
    ///
    /// Checks both exported and imported memories, so an oversized module is
    /// rejected with a clear message instead of failing inside instantiation.
    pub fn validate_module_memory(module: &Module, memory_limit: usize) -> Result<()> {
        let exported = module.exports().map(|e| (e.name().to_string(), e.ty()));
        let imported = module
            .imports()
            .map(|i| (format!("{}::{}", i.module(), i.name()), i.ty()));

        for (name, ty) in exported.chain(imported) {
            if let ExternType::Memory(mem_type) = ty {
                let min_pages = mem_type.minimum();
                let min_bytes = (min_pages as usize).saturating_mul(WASM_PAGE_SIZE);

                if min_bytes > memory_limit {
                    anyhow::bail!(
                        "Module memory '{}' requires {} bytes ({} pages) minimum, \
                         but the bridge only allows {} bytes",
                        name,
                        min_bytes,
                        min_pages,
                        memory_limit
                    );
                }

                if mem_type.maximum().is_none() {
                    tracing::debug!(
                        "Module memory '{}' has no maximum declared; \
                         host will limit to {} bytes",
                        name,
                        memory_limit
                    );
                }
            }
        }
        Ok(())
    }
}
