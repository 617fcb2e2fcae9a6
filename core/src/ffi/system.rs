//! Window, logging and run-state FFI functions

use std::time::Instant;

use easel_shared::DrawCommand;
use easel_shared::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use wasmtime::Caller;

use crate::wasm::BridgeContext;
use crate::wasm::memory::{guest_memory, read_cstring, write_f64};

/// Read a module string with the configured scan bound; faults read as empty
pub(super) fn module_string(caller: &mut Caller<'_, BridgeContext>, ptr: u32) -> String {
    let max_len = caller.data().max_cstring_len;
    match guest_memory(caller).and_then(|memory| read_cstring(memory, &*caller, ptr, max_len)) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Unreadable string argument: {}", e);
            String::new()
        }
    }
}

/// Non-positive sizes fall back to the default; oversized ones are capped
fn dimension(value: i32, fallback: u32, max: u32) -> u32 {
    match u32::try_from(value) {
        Ok(v) if v > max => {
            tracing::warn!("Canvas side {} exceeds the limit of {}", v, max);
            max
        }
        Ok(v) if v > 0 => v,
        _ => fallback.min(max),
    }
}

/// Record the window the module wants; sent to the host with `initialize`
pub(super) fn init(mut caller: Caller<'_, BridgeContext>, width: i32, height: i32, title: u32) -> i32 {
    let title = module_string(&mut caller, title);
    let max = caller.data().max_canvas_side;
    let window = &mut caller.data_mut().window;
    window.width = dimension(width, DEFAULT_WIDTH, max);
    window.height = dimension(height, DEFAULT_HEIGHT, max);
    window.title = title;
    tracing::debug!(
        "Module requested a {}x{} window titled {:?}",
        window.width,
        window.height,
        window.title
    );
    0
}

/// Takes effect when the window is announced, so only during setup
pub(super) fn set_title(mut caller: Caller<'_, BridgeContext>, title: u32) {
    let title = module_string(&mut caller, title);
    caller.data_mut().window.title = title;
}

pub(super) fn log_message(mut caller: Caller<'_, BridgeContext>, message: u32) {
    let message = module_string(&mut caller, message);
    tracing::info!("[MODULE] {}", message);
}

pub(super) fn quit(mut caller: Caller<'_, BridgeContext>) {
    tracing::info!("Module requested quit");
    caller.data_mut().running = false;
}

pub(super) fn runs(caller: Caller<'_, BridgeContext>) -> i32 {
    caller.data().running as i32
}

/// Report seconds since the previous yield through `dt_ptr`; returns whether
/// the module should keep running
pub(super) fn yield_frame(mut caller: Caller<'_, BridgeContext>, dt_ptr: u32) -> i32 {
    let now = Instant::now();
    let dt = now.duration_since(caller.data().last_yield).as_secs_f64();
    caller.data_mut().last_yield = now;

    if dt_ptr != 0
        && let Err(e) =
            guest_memory(&mut caller).and_then(|memory| write_f64(memory, &mut caller, dt_ptr, dt))
    {
        tracing::warn!("yield: {}", e);
    }
    caller.data().running as i32
}

/// Commands already flow out once per frame, so there is nothing to wait for
pub(super) fn wait_queue(_caller: Caller<'_, BridgeContext>) {}

pub(super) fn resize(mut caller: Caller<'_, BridgeContext>, width: i32, height: i32) {
    let max = caller.data().max_canvas_side;
    let size = [
        dimension(width, DEFAULT_WIDTH, max),
        dimension(height, DEFAULT_HEIGHT, max),
    ];
    caller.data_mut().queue.push(DrawCommand::Resize { size });
}

pub(super) fn fullscreen(mut caller: Caller<'_, BridgeContext>, full: i32) {
    caller
        .data_mut()
        .queue
        .push(DrawCommand::Fullscreen { full: full != 0 });
}

pub(super) fn set_bg_color(mut caller: Caller<'_, BridgeContext>, r: i32, g: i32, b: i32, a: i32) {
    caller.data_mut().queue.push(DrawCommand::SetBackground {
        color: easel_shared::Color::from_module_args(r, g, b, a),
    });
}
