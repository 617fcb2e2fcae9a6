//! Easel Core - sandboxed module execution bridge
//!
//! Runs an untrusted WASM drawing module on its own thread and turns its
//! imports into an ordered stream of draw commands the host paints and
//! presents once per display refresh.
//!
//! # Architecture
//!
//! - [`WasmEngine`] / [`ModuleInstance`] - Compile, link and call the module
//! - [`shim`] - `wasi_snapshot_preview1` system calls
//! - [`ffi`] - Rendering, window and input imports (`gapi` / `env`)
//! - [`ModuleController`] - Lifecycle state machine on the execution thread
//! - [`ExecutionThread`] - Thread and channels around the controller
//! - [`Bridge`] - Host facade: frame scheduler, canvas, surfaces, input relay

pub mod config;
pub mod error;
pub mod ffi;
pub mod host;
#[cfg(test)]
mod integration;
pub mod lifecycle;
pub mod shim;
#[cfg(test)]
pub mod test_utils;
pub mod wasm;
pub mod worker;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use host::{Bridge, Canvas, FrameScheduler, FrameStats, ImageSurface, InputRelay, Surface};
pub use lifecycle::{LifecycleState, ModuleController};
pub use wasm::{BridgeContext, InputState, ModuleInstance, WasmEngine};
pub use worker::{ExecutionThread, WorkerHandle};
