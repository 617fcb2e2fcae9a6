//! Signature-agnostic stubs for imports with no typed implementation
//!
//! A stub is defined with the exact function type the module declares, so
//! instantiation succeeds whatever signature the toolchain chose. Calling it
//! returns a fixed status in every integer result slot and zero in float slots.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use wasmtime::{FuncType, Linker, Val, ValType};

use crate::wasm::BridgeContext;

/// One result slot of a stub
#[derive(Debug, Clone, Copy, PartialEq)]
enum StubValue {
    I32(i32),
    I64(i64),
    F32,
    F64,
}

impl StubValue {
    fn for_type(ty: &ValType, status: i32) -> Option<Self> {
        match ty {
            ValType::I32 => Some(StubValue::I32(status)),
            ValType::I64 => Some(StubValue::I64(status as i64)),
            ValType::F32 => Some(StubValue::F32),
            ValType::F64 => Some(StubValue::F64),
            _ => None,
        }
    }

    fn to_val(self) -> Val {
        match self {
            StubValue::I32(v) => Val::I32(v),
            StubValue::I64(v) => Val::I64(v),
            StubValue::F32 => Val::F32(0),
            StubValue::F64 => Val::F64(0),
        }
    }
}

/// Define `namespace::name` as a stub answering `status`
///
/// Returns `false` (and defines nothing) when the declared results include
/// reference or vector types; instantiation then reports the missing import.
pub(crate) fn define_stub(
    linker: &mut Linker<BridgeContext>,
    namespace: &str,
    name: &str,
    ty: FuncType,
    status: i32,
) -> Result<bool> {
    let Some(values) = ty
        .results()
        .map(|result| StubValue::for_type(&result, status))
        .collect::<Option<Vec<_>>>()
    else {
        tracing::warn!(
            "Cannot stub {}::{}: it returns a non-numeric value",
            namespace,
            name
        );
        return Ok(false);
    };

    let qualified = format!("{namespace}::{name}");
    let reported = AtomicBool::new(false);
    linker.func_new(namespace, name, ty, move |_caller, _params, results| {
        if !reported.swap(true, Ordering::Relaxed) {
            tracing::warn!("Unresolved call {} answered with status {}", qualified, status);
        } else {
            tracing::trace!("Unresolved call {}", qualified);
        }
        for (slot, value) in results.iter_mut().zip(&values) {
            *slot = value.to_val();
        }
        Ok(())
    })?;
    Ok(true)
}
