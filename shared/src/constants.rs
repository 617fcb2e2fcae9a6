//! Centralized constants for the bridge.
//!
//! Single source of truth for values both sides of the bridge agree on.

/// Value the module's `mode` export must return ("interactive setup" mode).
pub const SETUP_MODE: i32 = 2;

/// Import namespace of the system-call surface.
pub const WASI_MODULE: &str = "wasi_snapshot_preview1";

/// Import namespaces served by the bridge's rendering/input table.
///
/// Toolchains disagree on where unqualified externs land, so both are served.
pub const BRIDGE_MODULES: [&str; 2] = ["gapi", "env"];

/// Candidate export names for the mode query, in lookup order.
pub const MODE_EXPORTS: [&str; 2] = ["mode", "gama_mode"];

/// Candidate export names for the one-time setup entry point.
pub const SETUP_EXPORTS: [&str; 2] = ["setup", "gama_setup"];

/// Candidate export names for the per-frame entry point.
pub const LOOP_EXPORTS: [&str; 2] = ["loop", "gama_loop"];

/// WASI errno: success.
pub const ERRNO_SUCCESS: i32 = 0;

/// WASI errno: bad file descriptor.
pub const ERRNO_BADF: i32 = 8;

/// WASI errno: bad address (a pointer argument falls outside linear memory).
pub const ERRNO_FAULT: i32 = 21;

/// WASI errno: invalid argument. Also answers `fd_write` when the iovec
/// lengths overflow 32 bits.
pub const ERRNO_INVAL: i32 = 28;

/// WASI errno: not supported. Every file, socket and poll call answers this.
///
/// This is the WASI preview1 number. Older hosts answered 28 here, and 1 for
/// `path_*` and `fd_prestat_*`; modules that compare against those values
/// need updating.
pub const ERRNO_NOTSUP: i32 = 58;

/// Window width used when the module never calls `init`.
pub const DEFAULT_WIDTH: u32 = 500;

/// Window height used when the module never calls `init`.
pub const DEFAULT_HEIGHT: u32 = 500;

/// Window title used when the module never calls `init`.
pub const DEFAULT_TITLE: &str = "easel app";

/// Largest canvas width or height a module may request, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Upper bound on a NUL-terminated string scan in module memory.
pub const MAX_CSTRING_SCAN: usize = 1024;

/// Default display refresh rate for hosts without a real vsync source.
pub const DEFAULT_REFRESH_RATE: u32 = 60;
