//! Tests for WASM engine and module instance

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use crate::config::BridgeConfig;
use crate::test_utils::*;

// ============================================================================
// WasmEngine Tests
// ============================================================================

#[test]
fn test_wasm_engine_creation() {
    let engine = WasmEngine::new();
    assert!(engine.is_ok());
}

#[test]
fn test_wasm_engine_load_invalid_module() {
    let engine = WasmEngine::new().unwrap();
    let result = engine.load_module(b"not valid wasm");
    assert!(result.is_err());
}

#[test]
fn test_validate_module_memory_rejects_oversized_minimum() {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(r#"(module (memory (export "memory") 20))"#).unwrap();
    let module = engine.load_module(&wasm).unwrap();

    assert!(WasmEngine::validate_module_memory(&module, 20 * 65536).is_ok());
    let err = WasmEngine::validate_module_memory(&module, 65536).unwrap_err();
    assert!(err.to_string().contains("requires"));
}

// ============================================================================
// ModuleInstance Tests
// ============================================================================

#[test]
fn test_instantiate_requires_memory_export() {
    let result = try_instantiate_wat(
        r#"(module (func (export "loop")))"#,
        &BridgeConfig::default(),
    );
    let err = result.err().unwrap();
    assert!(format!("{err:#}").contains("memory"));
}

#[test]
fn test_instantiate_rejects_memory_over_limit() {
    let mut config = BridgeConfig::default();
    config.runtime.memory_limit = 2 * 65536;
    let result = try_instantiate_wat(r#"(module (memory (export "memory") 4))"#, &config);
    assert!(result.is_err());
}

#[test]
fn test_memory_growth_is_capped_by_limit() {
    let mut config = BridgeConfig::default();
    config.runtime.memory_limit = 2 * 65536;
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "grow") (result i32)
                (memory.grow (i32.const 4))
            )
        )
    "#;
    let mut instance = try_instantiate_wat(wat, &config).unwrap();
    // memory.grow reports failure as -1 instead of trapping
    assert_eq!(call_i32(&mut instance, "grow"), -1);
}

#[test]
fn test_entry_points_resolve_plain_names() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (global $frames (mut i32) (i32.const 0))
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "setup"))
            (func (export "loop")
                (global.set $frames (i32.add (global.get $frames) (i32.const 1))))
            (func (export "frames") (result i32) (global.get $frames))
        )
    "#;
    let mut instance = instantiate_wat(wat);
    assert_eq!(instance.mode().unwrap(), Some(2));
    instance.setup().unwrap();
    instance.run_loop().unwrap();
    instance.run_loop().unwrap();
    assert_eq!(call_i32(&mut instance, "frames"), 2);
}

#[test]
fn test_entry_points_resolve_prefixed_names() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "gama_mode") (result i32) (i32.const 7))
            (func (export "gama_setup"))
            (func (export "gama_loop"))
        )
    "#;
    let mut instance = instantiate_wat(wat);
    assert_eq!(instance.mode().unwrap(), Some(7));
    assert!(instance.has_loop());
}

#[test]
fn test_missing_entry_points_are_not_errors() {
    let mut instance = instantiate_wat(r#"(module (memory (export "memory") 1))"#);
    assert_eq!(instance.mode().unwrap(), None);
    assert!(instance.setup().is_ok());
    assert!(instance.run_loop().is_ok());
    assert!(!instance.has_loop());
}

#[test]
fn test_entry_point_result_is_discarded() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "loop") (result i32) (i32.const 42))
        )
    "#;
    let mut instance = instantiate_wat(wat);
    assert!(instance.run_loop().is_ok());
}

#[test]
fn test_trap_in_loop_is_an_error_not_an_interrupt() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "loop") unreachable)
        )
    "#;
    let mut instance = instantiate_wat(wat);
    let err = instance.run_loop().unwrap_err();
    assert!(!is_interrupt(&err));
}

#[test]
fn test_cancellation_stops_runaway_loop() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "loop") (loop $spin (br $spin)))
        )
    "#;
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(wat).unwrap();
    let cancelled = Arc::new(AtomicBool::new(false));
    let mut instance =
        ModuleInstance::instantiate(&engine, &wasm, &BridgeConfig::default(), cancelled.clone())
            .unwrap();

    let interrupter = engine.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(50));
        cancelled.store(true, Ordering::Release);
        interrupter.interrupt();
    });

    let err = instance.run_loop().unwrap_err();
    assert!(is_interrupt(&err));
    handle.join().unwrap();
}

#[test]
fn test_interrupt_spares_stores_that_are_not_cancelled() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (global $n (mut i32) (i32.const 0))
            (func (export "loop")
                (loop $count
                    (global.set $n (i32.add (global.get $n) (i32.const 1)))
                    (br_if $count (i32.lt_u (global.get $n) (i32.const 1000)))))
        )
    "#;
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(wat).unwrap();
    let mut instance = ModuleInstance::instantiate(
        &engine,
        &wasm,
        &BridgeConfig::default(),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();

    engine.interrupt();
    assert!(instance.run_loop().is_ok());
    engine.interrupt();
    assert!(instance.run_loop().is_ok());
}
