//! Random bytes for the module

use easel_shared::constants::ERRNO_SUCCESS;
use wasmtime::Caller;

use super::errno;
use crate::wasm::BridgeContext;
use crate::wasm::memory::{fill_random, guest_memory};

/// Fill `buf_len` bytes at `buf` with cryptographically secure randomness
pub(super) fn random_get(mut caller: Caller<'_, BridgeContext>, buf: u32, buf_len: u32) -> i32 {
    errno(
        "random_get",
        guest_memory(&mut caller)
            .and_then(|memory| fill_random(memory, &mut caller, buf, buf_len))
            .map(|()| ERRNO_SUCCESS),
    )
}
