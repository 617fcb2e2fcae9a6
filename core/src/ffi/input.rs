//! Pointer and keyboard FFI functions

use easel_shared::KeyCode;
use glam::DVec2;
use wasmtime::Caller;

use crate::wasm::BridgeContext;
use crate::wasm::memory::{guest_memory, write_f64};

fn write_point(caller: &mut Caller<'_, BridgeContext>, call: &str, x_ptr: u32, y_ptr: u32, point: DVec2) {
    let result = guest_memory(caller).and_then(|memory| {
        write_f64(memory, &mut *caller, x_ptr, point.x)?;
        write_f64(memory, &mut *caller, y_ptr, point.y)
    });
    if let Err(e) = result {
        tracing::warn!("{}: {}", call, e);
    }
}

/// Pointer position in module space
pub(super) fn mouse_get(mut caller: Caller<'_, BridgeContext>, x_ptr: u32, y_ptr: u32) -> i32 {
    let position = caller.data().input.position;
    write_point(&mut caller, "mouse_get", x_ptr, y_ptr, position);
    0
}

/// Motion of the last pointer move, in module units
pub(super) fn get_mouse_move(mut caller: Caller<'_, BridgeContext>, x_ptr: u32, y_ptr: u32) {
    let movement = caller.data().input.movement;
    write_point(&mut caller, "get_mouse_move", x_ptr, y_ptr, movement);
}

pub(super) fn mouse_down(caller: Caller<'_, BridgeContext>) -> i32 {
    caller.data().input.down as i32
}

pub(super) fn mouse_pressed(caller: Caller<'_, BridgeContext>) -> i32 {
    caller.data().input.pressed as i32
}

/// Key went down since the last frame
pub(super) fn key_pressed(caller: Caller<'_, BridgeContext>, class: i32, key: i32) -> i32 {
    KeyCode::from_module_args(class, key).is_some_and(|code| caller.data().input.key_pressed(code))
        as i32
}

/// Key is currently held
pub(super) fn key_down(caller: Caller<'_, BridgeContext>, class: i32, key: i32) -> i32 {
    KeyCode::from_module_args(class, key).is_some_and(|code| caller.data().input.key_down(code))
        as i32
}
