//! Process calls: exit, an empty environment and an empty argument list

use easel_shared::constants::ERRNO_SUCCESS;
use wasmtime::Caller;

use super::errno;
use crate::wasm::BridgeContext;
use crate::wasm::memory::{guest_memory, write_u32};

/// Record the exit code and stop reporting the module as running.
/// The host keeps going; only the module's own loop sees the change.
pub(super) fn proc_exit(mut caller: Caller<'_, BridgeContext>, code: i32) {
    tracing::info!("Module exited with code {}", code);
    let ctx = caller.data_mut();
    ctx.exit_code = Some(code);
    ctx.running = false;
}

/// Zero entries, zero bytes
fn write_empty_sizes(
    caller: &mut Caller<'_, BridgeContext>,
    call: &str,
    count_ptr: u32,
    size_ptr: u32,
) -> i32 {
    errno(
        call,
        guest_memory(caller).and_then(|memory| {
            write_u32(memory, &mut *caller, count_ptr, 0)?;
            write_u32(memory, &mut *caller, size_ptr, 0)?;
            Ok(ERRNO_SUCCESS)
        }),
    )
}

pub(super) fn environ_sizes_get(
    mut caller: Caller<'_, BridgeContext>,
    count_ptr: u32,
    size_ptr: u32,
) -> i32 {
    write_empty_sizes(&mut caller, "environ_sizes_get", count_ptr, size_ptr)
}

pub(super) fn args_sizes_get(
    mut caller: Caller<'_, BridgeContext>,
    count_ptr: u32,
    size_ptr: u32,
) -> i32 {
    write_empty_sizes(&mut caller, "args_sizes_get", count_ptr, size_ptr)
}

/// Nothing to copy: the sizes calls reported zero entries
pub(super) fn environ_get(_caller: Caller<'_, BridgeContext>, _environ: u32, _buf: u32) -> i32 {
    ERRNO_SUCCESS
}

pub(super) fn args_get(_caller: Caller<'_, BridgeContext>, _argv: u32, _buf: u32) -> i32 {
    ERRNO_SUCCESS
}
