//! WASM runtime wrapper
//!
//! Provides abstractions over wasmtime for loading and executing modules.
//!
//! # Module Organization
//!
//! - [`engine`] - Shared engine with epoch interruption
//! - [`instance`] - Instantiated module and its entry points
//! - [`context`] - Per-store state every import sees
//! - [`memory`] - Bounds-checked views into linear memory
//! - [`queue`] - Drawing intents of the current frame
//! - [`input`] - Module-side pointer and keyboard snapshot

pub mod context;
pub mod engine;
pub mod input;
pub mod instance;
pub mod memory;
pub mod queue;

pub use context::{BridgeContext, WindowInit};
pub use engine::WasmEngine;
pub use input::InputState;
pub use instance::{ModuleInstance, is_interrupt};
pub use memory::MemoryError;
pub use queue::CommandQueue;

#[cfg(test)]
mod tests;
