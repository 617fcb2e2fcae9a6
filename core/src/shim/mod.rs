//! System-call shim (`wasi_snapshot_preview1`)
//!
//! A narrow slice of WASI, enough for C runtimes to start, print, read the
//! clock and get random bytes. Every other call in the namespace answers
//! "not supported" instead of failing instantiation, so modules built
//! against the full interface still load.

mod clock;
pub(crate) mod fallback;
mod fd;
mod process;
mod random;
mod syscall;


pub use syscall::Syscall;

use anyhow::Result;
use easel_shared::constants::{ERRNO_FAULT, WASI_MODULE};
use hashbrown::HashSet;
use wasmtime::{ExternType, Linker, Module};

use crate::wasm::{BridgeContext, MemoryError};

/// Map a memory fault to `EFAULT`, logging the call that hit it
fn errno(call: &str, result: Result<i32, MemoryError>) -> i32 {
    result.unwrap_or_else(|e| {
        tracing::warn!("{} faulted: {}", call, e);
        ERRNO_FAULT
    })
}

/// Register the shim with the linker
///
/// Modeled calls get typed host functions. Every other function the module
/// imports from the namespace gets a stub built from its declared signature.
pub fn register_shim(linker: &mut Linker<BridgeContext>, module: &Module) -> Result<()> {
    // Process
    linker.func_wrap(WASI_MODULE, "proc_exit", process::proc_exit)?;
    linker.func_wrap(WASI_MODULE, "environ_get", process::environ_get)?;
    linker.func_wrap(WASI_MODULE, "environ_sizes_get", process::environ_sizes_get)?;
    linker.func_wrap(WASI_MODULE, "args_get", process::args_get)?;
    linker.func_wrap(WASI_MODULE, "args_sizes_get", process::args_sizes_get)?;

    // Clocks and randomness
    linker.func_wrap(WASI_MODULE, "clock_time_get", clock::clock_time_get)?;
    linker.func_wrap(WASI_MODULE, "clock_res_get", clock::clock_res_get)?;
    linker.func_wrap(WASI_MODULE, "random_get", random::random_get)?;

    // Standard streams
    linker.func_wrap(WASI_MODULE, "fd_write", fd::fd_write)?;
    linker.func_wrap(WASI_MODULE, "fd_read", fd::fd_read)?;
    linker.func_wrap(WASI_MODULE, "fd_fdstat_get", fd::fd_fdstat_get)?;
    linker.func_wrap(WASI_MODULE, "fd_prestat_get", fd::fd_prestat_get)?;

    let mut stubbed = HashSet::new();
    for import in module.imports().filter(|i| i.module() == WASI_MODULE) {
        let ExternType::Func(ty) = import.ty() else {
            continue;
        };
        let syscall = Syscall::resolve(import.name());
        let Some(status) = syscall.stub_status() else {
            continue;
        };
        if !stubbed.insert(import.name().to_string()) {
            continue;
        }
        match &syscall {
            Syscall::Unknown(name) => {
                tracing::warn!("Module imports unknown system call {}; it will answer ENOTSUP", name)
            }
            other => tracing::debug!("Stubbing system call {}", other.name()),
        }
        fallback::define_stub(linker, WASI_MODULE, import.name(), ty, status)?;
    }

    Ok(())
}
