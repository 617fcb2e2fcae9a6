//! Closed dispatch over the system-call surface

use easel_shared::constants::{ERRNO_NOTSUP, ERRNO_SUCCESS};

/// Calls accepted and ignored; they report success
const NOOP_CALLS: [&str; 4] = ["fd_close", "fd_sync", "fd_datasync", "sched_yield"];

/// File, path, socket and poll calls with no meaning inside the sandbox
const UNSUPPORTED_CALLS: [&str; 30] = [
    "fd_advise",
    "fd_allocate",
    "fd_fdstat_set_flags",
    "fd_fdstat_set_rights",
    "fd_filestat_get",
    "fd_filestat_set_size",
    "fd_filestat_set_times",
    "fd_pread",
    "fd_prestat_dir_name",
    "fd_pwrite",
    "fd_readdir",
    "fd_renumber",
    "fd_seek",
    "fd_tell",
    "path_create_directory",
    "path_filestat_get",
    "path_filestat_set_times",
    "path_link",
    "path_open",
    "path_readlink",
    "path_remove_directory",
    "path_rename",
    "path_symlink",
    "path_unlink_file",
    "poll_oneoff",
    "proc_raise",
    "sock_accept",
    "sock_recv",
    "sock_send",
    "sock_shutdown",
];

/// One system call, resolved by import name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syscall {
    ProcExit,
    ClockTimeGet,
    ClockResGet,
    RandomGet,
    FdWrite,
    FdRead,
    FdFdstatGet,
    FdPrestatGet,
    EnvironGet,
    EnvironSizesGet,
    ArgsGet,
    ArgsSizesGet,
    /// Accepted and ignored
    NoOp(&'static str),
    /// Known call the sandbox refuses
    Unsupported(&'static str),
    /// Anything else; answered like `Unsupported`
    Unknown(String),
}

impl Syscall {
    pub fn resolve(name: &str) -> Self {
        match name {
            "proc_exit" => Syscall::ProcExit,
            "clock_time_get" => Syscall::ClockTimeGet,
            "clock_res_get" => Syscall::ClockResGet,
            "random_get" => Syscall::RandomGet,
            "fd_write" => Syscall::FdWrite,
            "fd_read" => Syscall::FdRead,
            "fd_fdstat_get" => Syscall::FdFdstatGet,
            "fd_prestat_get" => Syscall::FdPrestatGet,
            "environ_get" => Syscall::EnvironGet,
            "environ_sizes_get" => Syscall::EnvironSizesGet,
            "args_get" => Syscall::ArgsGet,
            "args_sizes_get" => Syscall::ArgsSizesGet,
            _ => {
                if let Some(noop) = NOOP_CALLS.iter().find(|&&n| n == name) {
                    Syscall::NoOp(*noop)
                } else if let Some(unsupported) = UNSUPPORTED_CALLS.iter().find(|&&n| n == name) {
                    Syscall::Unsupported(*unsupported)
                } else {
                    Syscall::Unknown(name.to_string())
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Syscall::ProcExit => "proc_exit",
            Syscall::ClockTimeGet => "clock_time_get",
            Syscall::ClockResGet => "clock_res_get",
            Syscall::RandomGet => "random_get",
            Syscall::FdWrite => "fd_write",
            Syscall::FdRead => "fd_read",
            Syscall::FdFdstatGet => "fd_fdstat_get",
            Syscall::FdPrestatGet => "fd_prestat_get",
            Syscall::EnvironGet => "environ_get",
            Syscall::EnvironSizesGet => "environ_sizes_get",
            Syscall::ArgsGet => "args_get",
            Syscall::ArgsSizesGet => "args_sizes_get",
            Syscall::NoOp(name) | Syscall::Unsupported(name) => *name,
            Syscall::Unknown(name) => name.as_str(),
        }
    }

    /// Fixed status for calls served by a signature-agnostic stub.
    /// `None` for calls with a typed host implementation.
    pub fn stub_status(&self) -> Option<i32> {
        match self {
            Syscall::NoOp(_) => Some(ERRNO_SUCCESS),
            Syscall::Unsupported(_) | Syscall::Unknown(_) => Some(ERRNO_NOTSUP),
            _ => None,
        }
    }
}
