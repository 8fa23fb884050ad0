//! Reliable read/write loops over stream endpoints.
//!
//! A single `read` or `write` on a stream socket may move fewer bytes
//! than asked. Everything above this layer works in exact byte counts,
//! so these loops retry short transfers until the requested count is
//! reached, the peer closes (read), or the endpoint stalls (write).

use std::io::{self, Read, Write};

/// Read until `buf` is full. Returns the number of bytes read, which is
/// less than `buf.len()` only when the peer closed its sending side.
///
/// Not `Read::read_exact`: end-of-stream is the protocol's normal
/// termination signal here, and the caller needs the count it stopped
/// at, not an `UnexpectedEof` error.
pub fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(m) => n += m,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

/// Write all of `buf`. Returns the number of bytes written; a count
/// short of `buf.len()` means the endpoint accepted zero bytes
/// mid-transfer. Stalls are reported to the caller, not retried.
pub fn write_full<W: Write + ?Sized>(w: &mut W, buf: &[u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match w.write(&buf[n..]) {
            Ok(0) => break,
            Ok(m) => n += m,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}
