//! Per-bridge state shared by every import
//!
//! One `BridgeContext` lives in each `Store`. Host functions reach it through
//! `Caller::data`/`data_mut`; nothing about a running module is global.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use easel_shared::constants::{DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH};
use wasmtime::{Memory, StoreLimits, StoreLimitsBuilder};

use super::input::InputState;
use super::queue::CommandQueue;
use crate::config::BridgeConfig;

/// Window parameters the module requests during setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInit {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowInit {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Store data for one running module
pub struct BridgeContext {
    /// Linear memory export, cached after instantiation
    pub memory: Option<Memory>,
    /// Drawing intents of the current setup or frame
    pub queue: CommandQueue,
    /// Latest input snapshot as seen by the module
    pub input: InputState,
    /// Window record sent with `initialize`
    pub window: WindowInit,
    /// Cleared by `quit` or `proc_exit`; reported by `runs`/`yield`
    pub running: bool,
    /// Code passed to `proc_exit`, if any
    pub exit_code: Option<i32>,
    /// Previous `yield` call, for the delta-time it reports
    pub last_yield: Instant,
    /// Origin of the monotonic clock
    pub started: Instant,
    /// Upper bound on C-string scans
    pub max_cstring_len: usize,
    /// Forward fd 1/2 writes to the log
    pub log_stdio: bool,
    /// Largest width or height `init`/`resize` may ask for
    pub max_canvas_side: u32,
    /// Set by the owning bridge on teardown; checked at every epoch tick
    pub cancelled: Arc<AtomicBool>,
    pub limits: StoreLimits,
}

impl BridgeContext {
    pub fn new(config: &BridgeConfig, cancelled: Arc<AtomicBool>) -> Self {
        let now = Instant::now();
        Self {
            memory: None,
            queue: CommandQueue::default(),
            input: InputState::default(),
            window: WindowInit::default(),
            running: true,
            exit_code: None,
            last_yield: now,
            started: now,
            max_cstring_len: config.shim.max_cstring_len,
            log_stdio: config.shim.log_stdio,
            max_canvas_side: config.runtime.max_canvas_side,
            cancelled,
            limits: StoreLimitsBuilder::new()
                .memory_size(config.runtime.memory_limit)
                .instances(1)
                .build(),
        }
    }
}
