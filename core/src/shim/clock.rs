//! Clock calls

use std::time::{SystemTime, UNIX_EPOCH};

use easel_shared::constants::{ERRNO_INVAL, ERRNO_SUCCESS};
use wasmtime::Caller;

use super::errno;
use crate::wasm::BridgeContext;
use crate::wasm::memory::{guest_memory, write_u64};

const CLOCK_REALTIME: i32 = 0;
const CLOCK_MONOTONIC: i32 = 1;
const CLOCK_PROCESS_CPUTIME: i32 = 2;
const CLOCK_THREAD_CPUTIME: i32 = 3;

/// Reported resolution, in nanoseconds
const CLOCK_RESOLUTION_NS: u64 = 1_000;

/// Current time in nanoseconds: wall clock since the Unix epoch for the
/// realtime clock, time since instantiation for the others
pub(super) fn clock_time_get(
    mut caller: Caller<'_, BridgeContext>,
    id: i32,
    _precision: i64,
    time: u32,
) -> i32 {
    let nanos = match id {
        CLOCK_REALTIME => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64),
        CLOCK_MONOTONIC | CLOCK_PROCESS_CPUTIME | CLOCK_THREAD_CPUTIME => {
            caller.data().started.elapsed().as_nanos() as u64
        }
        _ => return ERRNO_INVAL,
    };
    errno(
        "clock_time_get",
        guest_memory(&mut caller)
            .and_then(|memory| write_u64(memory, &mut caller, time, nanos))
            .map(|()| ERRNO_SUCCESS),
    )
}

pub(super) fn clock_res_get(mut caller: Caller<'_, BridgeContext>, id: i32, resolution: u32) -> i32 {
    if !(CLOCK_REALTIME..=CLOCK_THREAD_CPUTIME).contains(&id) {
        return ERRNO_INVAL;
    }
    errno(
        "clock_res_get",
        guest_memory(&mut caller)
            .and_then(|memory| write_u64(memory, &mut caller, resolution, CLOCK_RESOLUTION_NS))
            .map(|()| ERRNO_SUCCESS),
    )
}
