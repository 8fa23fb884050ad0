//! Shared wire-format constants for the fget request/stream protocol

/// Width of the filename request field. The name goes left-justified,
/// the remainder null-padded; all 256 bytes are transmitted.
pub const NAME_MAX_LEN: usize = 256;

/// Receive chunk size. Deliberately small so short reads actually occur
/// in demos and tests; any positive size yields the same file contents.
pub const CHUNK_SIZE: usize = 10;

/// Port the stock file server listens on.
pub const DEFAULT_PORT: u16 = 42424;

/// Build the fixed-width filename field: `name` left-justified, the rest
/// zeroed. Names longer than `NAME_MAX_LEN - 1` bytes are truncated so
/// the field the peer parses always carries a terminating null.
pub fn encode_name(name: &str) -> [u8; NAME_MAX_LEN] {
    let mut field = [0u8; NAME_MAX_LEN];
    let bytes = name.as_bytes();
    let n = bytes.len().min(NAME_MAX_LEN - 1);
    field[..n].copy_from_slice(&bytes[..n]);
    field
}
