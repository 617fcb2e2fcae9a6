//! Bridge FFI host functions
//!
//! The rendering, windowing and input imports a module links against. The
//! same table is served under every namespace in [`BRIDGE_MODULES`], since
//! toolchains disagree on where unqualified externs land.

mod draw;
mod input;
mod system;


use anyhow::Result;
use easel_shared::constants::BRIDGE_MODULES;
use hashbrown::HashSet;
use wasmtime::{ExternType, Linker, Module};

use crate::shim::fallback::define_stub;
use crate::wasm::BridgeContext;

/// Every name the bridge implements in its namespaces
pub const BRIDGE_IMPORTS: [&str; 22] = [
    "init",
    "set_title",
    "log",
    "quit",
    "runs",
    "yield",
    "wait_queue",
    "resize",
    "fullscreen",
    "set_bg_color",
    "draw_line",
    "draw_rect",
    "draw_rounded_rect",
    "draw_circle",
    "draw_triangle",
    "draw_text",
    "mouse_get",
    "get_mouse_move",
    "mouse_down",
    "mouse_pressed",
    "key_pressed",
    "key_down",
];

/// Status returned by stubs for unimplemented bridge imports
const STUB_STATUS: i32 = 0;

/// Register the bridge functions with the linker
///
/// Function imports the module declares in a bridge namespace but the bridge
/// does not implement are stubbed to return zero.
pub fn register_bridge_ffi(linker: &mut Linker<BridgeContext>, module: &Module) -> Result<()> {
    for namespace in BRIDGE_MODULES {
        // Window and run state
        linker.func_wrap(namespace, "init", system::init)?;
        linker.func_wrap(namespace, "set_title", system::set_title)?;
        linker.func_wrap(namespace, "log", system::log_message)?;
        linker.func_wrap(namespace, "quit", system::quit)?;
        linker.func_wrap(namespace, "runs", system::runs)?;
        linker.func_wrap(namespace, "yield", system::yield_frame)?;
        linker.func_wrap(namespace, "wait_queue", system::wait_queue)?;
        linker.func_wrap(namespace, "resize", system::resize)?;
        linker.func_wrap(namespace, "fullscreen", system::fullscreen)?;
        linker.func_wrap(namespace, "set_bg_color", system::set_bg_color)?;

        // Drawing
        linker.func_wrap(namespace, "draw_line", draw::draw_line)?;
        linker.func_wrap(namespace, "draw_rect", draw::draw_rect)?;
        linker.func_wrap(namespace, "draw_rounded_rect", draw::draw_rounded_rect)?;
        linker.func_wrap(namespace, "draw_circle", draw::draw_circle)?;
        linker.func_wrap(namespace, "draw_triangle", draw::draw_triangle)?;
        linker.func_wrap(namespace, "draw_text", draw::draw_text)?;

        // Input
        linker.func_wrap(namespace, "mouse_get", input::mouse_get)?;
        linker.func_wrap(namespace, "get_mouse_move", input::get_mouse_move)?;
        linker.func_wrap(namespace, "mouse_down", input::mouse_down)?;
        linker.func_wrap(namespace, "mouse_pressed", input::mouse_pressed)?;
        linker.func_wrap(namespace, "key_pressed", input::key_pressed)?;
        linker.func_wrap(namespace, "key_down", input::key_down)?;
    }

    let mut stubbed = HashSet::new();
    for import in module.imports() {
        if !BRIDGE_MODULES.contains(&import.module()) || BRIDGE_IMPORTS.contains(&import.name()) {
            continue;
        }
        let ExternType::Func(ty) = import.ty() else {
            continue;
        };
        if stubbed.insert((import.module().to_string(), import.name().to_string())) {
            tracing::debug!("Stubbing bridge import {}::{}", import.module(), import.name());
            define_stub(linker, import.module(), import.name(), ty, STUB_STATUS)?;
        }
    }

    Ok(())
}
