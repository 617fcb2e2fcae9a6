//! Shared test utilities for integration and unit tests

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::config::BridgeConfig;
use crate::wasm::memory::{read_bytes, view};
use crate::wasm::{ModuleInstance, WasmEngine};

/// Instantiate a WAT module with default configuration
pub fn instantiate_wat(wat: &str) -> ModuleInstance {
    try_instantiate_wat(wat, &BridgeConfig::default()).unwrap()
}

pub fn try_instantiate_wat(wat: &str, config: &BridgeConfig) -> anyhow::Result<ModuleInstance> {
    let engine = WasmEngine::new()?;
    let wasm = wat::parse_str(wat)?;
    ModuleInstance::instantiate(&engine, &wasm, config, Arc::new(AtomicBool::new(false)))
}

/// Call an exported function taking no parameters and returning an i32
pub fn call_i32(instance: &mut ModuleInstance, name: &str) -> i32 {
    let func = instance.get_typed_func::<(), i32>(name).unwrap();
    func.call(instance.store_mut(), ()).unwrap()
}

pub fn memory_bytes(instance: &ModuleInstance, ptr: u32, len: u32) -> Vec<u8> {
    let memory = instance.context().memory.unwrap();
    read_bytes(memory, instance.store(), ptr, len).unwrap()
}

pub fn memory_u32(instance: &ModuleInstance, ptr: u32) -> u32 {
    let bytes = memory_bytes(instance, ptr, 4);
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub fn memory_u64(instance: &ModuleInstance, ptr: u32) -> u64 {
    let memory = instance.context().memory.unwrap();
    let data = view(memory, instance.store());
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[ptr as usize..ptr as usize + 8]);
    u64::from_le_bytes(word)
}

pub fn memory_f64(instance: &ModuleInstance, ptr: u32) -> f64 {
    f64::from_bits(memory_u64(instance, ptr))
}
