//! Client side of the fget protocol: one fixed-width filename request
//! out, then the raw file body back until the peer closes.
//!
//! The exchange is strictly half-duplex. The server reads the complete
//! 256-byte name before it produces a single byte, so the request write
//! must finish before the first read is issued; the body has no length
//! prefix or trailer, end-of-stream is the only completion signal.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::logger::Logger;
use crate::protocol::{encode_name, CHUNK_SIZE, NAME_MAX_LEN};
use crate::xfer::{read_full, write_full};

/// Failures of one fetch, one variant per phase so the binary can map
/// them to distinct exit codes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("connect {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("send request: {0}")]
    Send(#[source] io::Error),

    #[error("request truncated: peer took {sent} of {NAME_MAX_LEN} bytes")]
    RequestTruncated { sent: usize },

    #[error("open {}: {source}", .path.display())]
    OpenDest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("receive: {0}")]
    Recv(#[source] io::Error),

    #[error("write {}: {source}", .path.display())]
    WriteDest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Process exit code for this failure. 2 belongs to clap's usage
    /// errors; 130 to the Ctrl-C handler.
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::Connect { .. } => 1,
            FetchError::Send(_) | FetchError::RequestTruncated { .. } => 3,
            FetchError::OpenDest { .. } | FetchError::Recv(_) | FetchError::WriteDest { .. } => 4,
        }
    }
}

/// Direction tag for the receive loop, so `receive_file` can tell a
/// dead connection from a full disk.
#[derive(Debug)]
enum CopyError {
    Stream(io::Error),
    Sink(io::Error),
}

/// Open a connection to `host:port`. No retry, no multi-address logic;
/// the caller owns the stream and tears it down by dropping it.
pub fn connect(host: &str, port: u16) -> Result<TcpStream, FetchError> {
    let addr = format!("{}:{}", host, port);
    TcpStream::connect(&addr).map_err(|source| FetchError::Connect { addr, source })
}

/// Transmit the fixed-width filename request. The null padding is part
/// of the wire format and goes out verbatim.
pub fn send_request<W: Write>(
    conn: &mut W,
    name_field: &[u8; NAME_MAX_LEN],
) -> Result<(), FetchError> {
    let sent = write_full(conn, name_field).map_err(FetchError::Send)?;
    if sent < NAME_MAX_LEN {
        return Err(FetchError::RequestTruncated { sent });
    }
    Ok(())
}

/// Drain `conn` into `sink` one chunk at a time until the peer closes.
/// Returns the number of bytes moved. A short chunk from the stream is
/// normal pacing; a short write into the sink is an error.
fn copy_to_sink<R: Read, W: Write>(conn: &mut R, sink: &mut W) -> Result<u64, CopyError> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = read_full(conn, &mut buf).map_err(CopyError::Stream)?;
        if n == 0 {
            return Ok(total);
        }
        let written = write_full(sink, &buf[..n]).map_err(CopyError::Sink)?;
        if written < n {
            return Err(CopyError::Sink(io::Error::new(
                io::ErrorKind::WriteZero,
                "sink accepted zero bytes mid-chunk",
            )));
        }
        total += n as u64;
    }
}

/// Receive the remainder of the stream into `dest`, creating or
/// truncating it. Returns the byte count on success.
///
/// The destination handle is released on every exit path. On failure
/// the partially-written file stays on disk, closed; there is no
/// rollback in this protocol.
pub fn receive_file<R: Read>(conn: &mut R, dest: &Path) -> Result<u64, FetchError> {
    let mut file = File::create(dest).map_err(|source| FetchError::OpenDest {
        path: dest.to_path_buf(),
        source,
    })?;
    let total = copy_to_sink(conn, &mut file).map_err(|e| match e {
        CopyError::Stream(source) => FetchError::Recv(source),
        CopyError::Sink(source) => FetchError::WriteDest {
            path: dest.to_path_buf(),
            source,
        },
    })?;
    file.flush().map_err(|source| FetchError::WriteDest {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(total)
}

/// One whole fetch: connect, send the request, stream the body into
/// `dest`. Returns the bytes received; the connection closes when the
/// stream drops on return.
pub fn fetch(
    host: &str,
    port: u16,
    remote: &str,
    dest: &Path,
    logger: &dyn Logger,
) -> Result<u64, FetchError> {
    logger.start(remote, dest);
    let start = Instant::now();

    let field = encode_name(remote);
    let mut stream = connect(host, port)?;

    send_request(&mut stream, &field).map_err(|e| {
        logger.error("send", &e.to_string());
        e
    })?;
    logger.request_sent(remote);

    let total = receive_file(&mut stream, dest).map_err(|e| {
        logger.error("receive", &e.to_string());
        e
    })?;
    logger.done(total, start.elapsed().as_secs_f64());
    Ok(total)
}
