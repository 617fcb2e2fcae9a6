//! Memory view accessor
//!
//! Bounds-checked reads and writes against a module's linear memory.
//! Memory can grow during any call into the module, which invalidates earlier
//! slices, so nothing here caches one: every helper re-derives its view from
//! the [`Memory`] handle and the store at the moment of the access.
//! All multi-byte values are little-endian, as in WASM itself.

use rand::RngCore;
use wasmtime::{AsContext, AsContextMut, Caller, Extern, Memory, StoreContext};

use super::context::BridgeContext;

/// Errors from a module memory access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("module exports no linear memory named `memory`")]
    NoMemory,
    #[error("access of {len} bytes at {ptr:#x} is out of bounds")]
    OutOfBounds { ptr: u32, len: usize },
}

/// Resolve the module's linear memory from inside a host function
///
/// Uses the handle cached at instantiation and falls back to the `memory`
/// export for calls made before the cache is filled (start functions).
pub fn guest_memory(caller: &mut Caller<'_, BridgeContext>) -> Result<Memory, MemoryError> {
    if let Some(memory) = caller.data().memory {
        return Ok(memory);
    }
    match caller.get_export("memory") {
        Some(Extern::Memory(memory)) => Ok(memory),
        _ => Err(MemoryError::NoMemory),
    }
}

/// Byte view of the whole linear memory, valid until the next call into the module
pub fn view<'a, T: 'static>(memory: Memory, store: impl Into<StoreContext<'a, T>>) -> &'a [u8] {
    memory.data(store)
}

fn check_range(
    memory: Memory,
    store: impl AsContext,
    ptr: u32,
    len: usize,
) -> Result<usize, MemoryError> {
    let start = ptr as usize;
    match start.checked_add(len) {
        Some(end) if end <= memory.data_size(&store) => Ok(start),
        _ => Err(MemoryError::OutOfBounds { ptr, len }),
    }
}

/// Borrow `len` bytes of module memory, valid until the next call into the module
pub fn read_slice<'a, T: 'static>(
    memory: Memory,
    store: impl Into<StoreContext<'a, T>>,
    ptr: u32,
    len: u32,
) -> Result<&'a [u8], MemoryError> {
    let store = store.into();
    let len = len as usize;
    let start = check_range(memory, &store, ptr, len)?;
    Ok(&memory.data(store)[start..start + len])
}

/// Copy `len` bytes out of module memory
pub fn read_bytes(
    memory: Memory,
    store: impl AsContext,
    ptr: u32,
    len: u32,
) -> Result<Vec<u8>, MemoryError> {
    let len = len as usize;
    let start = check_range(memory, &store, ptr, len)?;
    Ok(memory.data(&store)[start..start + len].to_vec())
}

/// Copy `bytes` into module memory at `ptr`
pub fn write_bytes(
    memory: Memory,
    mut store: impl AsContextMut,
    ptr: u32,
    bytes: &[u8],
) -> Result<(), MemoryError> {
    let start = check_range(memory, &store, ptr, bytes.len())?;
    memory.data_mut(&mut store)[start..start + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

pub fn read_u32(memory: Memory, store: impl AsContext, ptr: u32) -> Result<u32, MemoryError> {
    let start = check_range(memory, &store, ptr, 4)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(&memory.data(&store)[start..start + 4]);
    Ok(u32::from_le_bytes(word))
}

pub fn write_u32(
    memory: Memory,
    store: impl AsContextMut,
    ptr: u32,
    value: u32,
) -> Result<(), MemoryError> {
    write_bytes(memory, store, ptr, &value.to_le_bytes())
}

pub fn write_u64(
    memory: Memory,
    store: impl AsContextMut,
    ptr: u32,
    value: u64,
) -> Result<(), MemoryError> {
    write_bytes(memory, store, ptr, &value.to_le_bytes())
}

pub fn write_f64(
    memory: Memory,
    store: impl AsContextMut,
    ptr: u32,
    value: f64,
) -> Result<(), MemoryError> {
    write_bytes(memory, store, ptr, &value.to_le_bytes())
}

/// Fill `len` bytes at `ptr` from the thread-local CSPRNG
///
/// The range is checked before any byte is generated and the fill happens in
/// place, so the cost is bounded by the module's own memory.
pub fn fill_random(
    memory: Memory,
    mut store: impl AsContextMut,
    ptr: u32,
    len: u32,
) -> Result<(), MemoryError> {
    let len = len as usize;
    let start = check_range(memory, &store, ptr, len)?;
    rand::rng().fill_bytes(&mut memory.data_mut(&mut store)[start..start + len]);
    Ok(())
}

/// Read a NUL-terminated string
///
/// `ptr == 0` is the empty string. The scan stops at the first NUL, at
/// `max_len` bytes, or at the end of memory, whichever comes first. The bytes
/// are copied out before decoding and invalid UTF-8 is replaced, so the
/// result never aliases module memory.
pub fn read_cstring(
    memory: Memory,
    store: impl AsContext,
    ptr: u32,
    max_len: usize,
) -> Result<String, MemoryError> {
    if ptr == 0 {
        return Ok(String::new());
    }
    let data = memory.data(&store);
    let start = ptr as usize;
    if start >= data.len() {
        return Err(MemoryError::OutOfBounds { ptr, len: 1 });
    }
    let window = &data[start..data.len().min(start.saturating_add(max_len))];
    let end = match window.iter().position(|&b| b == 0) {
        Some(end) => end,
        None => {
            tracing::debug!(
                "String at {:#x} has no terminator within {} bytes; truncating",
                ptr,
                window.len()
            );
            window.len()
        }
    };
    let bytes = window[..end].to_vec();
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::{Engine, MemoryType, Store};

    fn store_with_memory(pages: u32) -> (Store<()>, Memory) {
        let engine = Engine::default();
        let mut store = Store::new(&engine, ());
        let memory = Memory::new(&mut store, MemoryType::new(pages, None)).unwrap();
        (store, memory)
    }

    #[test]
    fn test_cstring_null_pointer_is_empty() {
        let (store, memory) = store_with_memory(1);
        assert_eq!(read_cstring(memory, &store, 0, 1024).unwrap(), "");
    }

    #[test]
    fn test_cstring_stops_at_nul() {
        let (mut store, memory) = store_with_memory(1);
        write_bytes(memory, &mut store, 16, b"hello\0world\0").unwrap();
        assert_eq!(read_cstring(memory, &store, 16, 1024).unwrap(), "hello");
    }

    #[test]
    fn test_cstring_bounded_scan() {
        let (mut store, memory) = store_with_memory(1);
        write_bytes(memory, &mut store, 100, &[b'x'; 2000]).unwrap();
        let text = read_cstring(memory, &store, 100, 1024).unwrap();
        assert_eq!(text.len(), 1024);
    }

    #[test]
    fn test_cstring_stops_at_end_of_memory() {
        let (mut store, memory) = store_with_memory(1);
        let last = 65536 - 3;
        write_bytes(memory, &mut store, last, b"abc").unwrap();
        assert_eq!(read_cstring(memory, &store, last, 1024).unwrap(), "abc");
    }

    #[test]
    fn test_cstring_out_of_bounds_pointer() {
        let (store, memory) = store_with_memory(1);
        assert!(read_cstring(memory, &store, 70000, 1024).is_err());
    }

    #[test]
    fn test_cstring_invalid_utf8_is_replaced() {
        let (mut store, memory) = store_with_memory(1);
        write_bytes(memory, &mut store, 8, &[b'a', 0xFF, b'b', 0]).unwrap();
        assert_eq!(read_cstring(memory, &store, 8, 1024).unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn test_cstring_is_a_copy() {
        let (mut store, memory) = store_with_memory(1);
        write_bytes(memory, &mut store, 8, b"keep\0").unwrap();
        let text = read_cstring(memory, &store, 8, 1024).unwrap();
        write_bytes(memory, &mut store, 8, b"gone\0").unwrap();
        assert_eq!(text, "keep");
    }

    #[test]
    fn test_view_sees_growth() {
        let (mut store, memory) = store_with_memory(1);
        assert_eq!(view(memory, &store).len(), 65536);
        memory.grow(&mut store, 1).unwrap();
        write_u32(memory, &mut store, 65536 + 4, 7).unwrap();
        assert_eq!(view(memory, &store).len(), 131072);
        assert_eq!(read_u32(memory, &store, 65536 + 4).unwrap(), 7);
    }

    #[test]
    fn test_little_endian_writes() {
        let (mut store, memory) = store_with_memory(1);
        write_u64(memory, &mut store, 0, 0x0102_0304_0506_0708).unwrap();
        assert_eq!(
            read_bytes(memory, &store, 0, 8).unwrap(),
            vec![8, 7, 6, 5, 4, 3, 2, 1]
        );
        write_f64(memory, &mut store, 8, 1.5).unwrap();
        assert_eq!(read_bytes(memory, &store, 8, 8).unwrap(), 1.5f64.to_le_bytes());
    }

    #[test]
    fn test_out_of_bounds_access() {
        let (mut store, memory) = store_with_memory(1);
        assert_eq!(
            read_u32(memory, &store, 65534),
            Err(MemoryError::OutOfBounds { ptr: 65534, len: 4 })
        );
        assert!(write_bytes(memory, &mut store, u32::MAX, b"x").is_err());
        assert!(read_bytes(memory, &store, 10, u32::MAX).is_err());
    }

    #[test]
    fn test_fill_random_writes_requested_range() {
        let (mut store, memory) = store_with_memory(1);
        fill_random(memory, &mut store, 32, 64).unwrap();
        let bytes = read_bytes(memory, &store, 32, 64).unwrap();
        // 64 zero bytes from a CSPRNG is not a realistic outcome
        assert!(bytes.iter().any(|&b| b != 0));
        assert_eq!(read_u32(memory, &store, 96).unwrap(), 0);
    }

    #[test]
    fn test_fill_random_rejects_oversized_length_up_front() {
        let (mut store, memory) = store_with_memory(1);
        let start = std::time::Instant::now();
        assert_eq!(
            fill_random(memory, &mut store, 0, u32::MAX),
            Err(MemoryError::OutOfBounds {
                ptr: 0,
                len: u32::MAX as usize
            })
        );
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        // Nothing was written on the failed call
        assert!(view(memory, &store).iter().all(|&b| b == 0));
    }
}
