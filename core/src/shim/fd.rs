//! Descriptor calls: the three standard streams and nothing else

use easel_shared::constants::{ERRNO_BADF, ERRNO_INVAL, ERRNO_SUCCESS};
use wasmtime::Caller;

use super::errno;
use crate::wasm::BridgeContext;
use crate::wasm::memory::{
    MemoryError, guest_memory, read_slice, read_u32, write_bytes, write_u32,
};

const STDIN: i32 = 0;
const STDOUT: i32 = 1;
const STDERR: i32 = 2;

/// `{ buf: u32, buf_len: u32 }`
const IOVEC_SIZE: u32 = 8;

/// Longest logged line; the rest of an unterminated line is dropped
const MAX_LINE: usize = 4096;

/// `__WASI_FILETYPE_CHARACTER_DEVICE`
const FILETYPE_CHARACTER_DEVICE: u8 = 2;
const RIGHT_FD_READ: u64 = 1 << 1;
const RIGHT_FD_WRITE: u64 = 1 << 6;

/// Gather writes to stdout/stderr into the log
pub(super) fn fd_write(
    mut caller: Caller<'_, BridgeContext>,
    fd: i32,
    iovs: u32,
    iovs_len: u32,
    nwritten: u32,
) -> i32 {
    errno("fd_write", write_stdio(&mut caller, fd, iovs, iovs_len, nwritten))
}

fn write_stdio(
    caller: &mut Caller<'_, BridgeContext>,
    fd: i32,
    iovs: u32,
    iovs_len: u32,
    nwritten: u32,
) -> Result<i32, MemoryError> {
    if fd != STDOUT && fd != STDERR {
        return Ok(ERRNO_BADF);
    }
    let memory = guest_memory(caller)?;

    let mut total: u32 = 0;
    for index in 0..iovs_len {
        let (_, len) = read_iovec(memory, caller, iovs, index)?;
        match total.checked_add(len) {
            Some(sum) => total = sum,
            None => return Ok(ERRNO_INVAL),
        }
    }

    // Logged one iovec at a time; iovecs may alias the same bytes
    let mut lines = caller.data().log_stdio.then(|| LineLog::new(fd == STDERR));
    for index in 0..iovs_len {
        let (buf, len) = read_iovec(memory, caller, iovs, index)?;
        let bytes = read_slice(memory, &*caller, buf, len)?;
        if let Some(lines) = lines.as_mut() {
            lines.push(bytes);
        }
    }
    if let Some(lines) = lines.as_mut() {
        lines.flush();
    }

    write_u32(memory, &mut *caller, nwritten, total)?;
    Ok(ERRNO_SUCCESS)
}

/// Splits stream output into log lines, holding at most one partial line
struct LineLog {
    stderr: bool,
    partial: Vec<u8>,
}

impl LineLog {
    fn new(stderr: bool) -> Self {
        Self {
            stderr,
            partial: Vec::new(),
        }
    }

    fn push(&mut self, mut bytes: &[u8]) {
        while let Some(end) = bytes.iter().position(|&b| b == b'\n') {
            self.extend(&bytes[..end]);
            self.flush();
            bytes = &bytes[end + 1..];
        }
        self.extend(bytes);
    }

    fn extend(&mut self, bytes: &[u8]) {
        let room = MAX_LINE.saturating_sub(self.partial.len());
        self.partial.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }

    fn flush(&mut self) {
        if self.partial.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.partial);
        let line = line.trim_end_matches('\r');
        if self.stderr {
            tracing::warn!("[MODULE] {}", line);
        } else {
            tracing::info!("[MODULE] {}", line);
        }
        self.partial.clear();
    }
}

fn read_iovec(
    memory: wasmtime::Memory,
    caller: &Caller<'_, BridgeContext>,
    iovs: u32,
    index: u32,
) -> Result<(u32, u32), MemoryError> {
    let entry = index
        .checked_mul(IOVEC_SIZE)
        .and_then(|offset| iovs.checked_add(offset))
        .filter(|entry| entry.checked_add(IOVEC_SIZE).is_some())
        .ok_or(MemoryError::OutOfBounds {
            ptr: iovs,
            len: IOVEC_SIZE as usize,
        })?;
    Ok((read_u32(memory, caller, entry)?, read_u32(memory, caller, entry + 4)?))
}

/// Stdin is always at end of file
pub(super) fn fd_read(
    mut caller: Caller<'_, BridgeContext>,
    fd: i32,
    _iovs: u32,
    _iovs_len: u32,
    nread: u32,
) -> i32 {
    if fd != STDIN {
        return ERRNO_BADF;
    }
    errno(
        "fd_read",
        guest_memory(&mut caller)
            .and_then(|memory| write_u32(memory, &mut caller, nread, 0))
            .map(|()| ERRNO_SUCCESS),
    )
}

/// Standard streams report as character devices, which keeps C stdio
/// line-buffered
pub(super) fn fd_fdstat_get(mut caller: Caller<'_, BridgeContext>, fd: i32, buf: u32) -> i32 {
    let rights = match fd {
        STDIN => RIGHT_FD_READ,
        STDOUT | STDERR => RIGHT_FD_WRITE,
        _ => return ERRNO_BADF,
    };
    // filetype u8, pad, flags u16, pad, rights_base u64, rights_inheriting u64
    let mut stat = [0u8; 24];
    stat[0] = FILETYPE_CHARACTER_DEVICE;
    stat[8..16].copy_from_slice(&rights.to_le_bytes());
    errno(
        "fd_fdstat_get",
        guest_memory(&mut caller)
            .and_then(|memory| write_bytes(memory, &mut caller, buf, &stat))
            .map(|()| ERRNO_SUCCESS),
    )
}

/// No preopened directories; answering BADF ends libc's preopen scan
pub(super) fn fd_prestat_get(_caller: Caller<'_, BridgeContext>, _fd: i32, _buf: u32) -> i32 {
    ERRNO_BADF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_log_keeps_one_bounded_partial_line() {
        let mut lines = LineLog::new(false);
        let chunk = vec![b'x'; 1 << 16];
        for _ in 0..64 {
            lines.push(&chunk);
        }
        assert_eq!(lines.partial.len(), MAX_LINE);

        lines.push(b"\nnext");
        assert_eq!(lines.partial, b"next");
    }
}
