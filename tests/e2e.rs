use anyhow::Result;
use fget::logger::NoopLogger;
use fget::net::{self, FetchError};
use fget::protocol::NAME_MAX_LEN;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// One-shot file server: accept a single connection, read the full
/// 256-byte request, hand the connection to `serve`, then close. Joining
/// the handle returns the raw request field for inspection.
fn spawn_server<F>(serve: F) -> (u16, thread::JoinHandle<Vec<u8>>)
where
    F: FnOnce(&mut TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = vec![0u8; NAME_MAX_LEN];
        stream.read_exact(&mut request).unwrap();
        serve(&mut stream);
        request
    });
    (port, handle)
}

#[test]
fn hello_world_in_two_delayed_chunks() -> Result<()> {
    let (port, server) = spawn_server(|stream| {
        stream.write_all(b"hello, ").unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        stream.write_all(b"world!").unwrap();
    });

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("out.txt");
    let bytes = net::fetch("127.0.0.1", port, "greeting.txt", &dest, &NoopLogger)?;

    assert_eq!(bytes, 13);
    assert_eq!(std::fs::read(&dest)?, b"hello, world!");

    // The request field went out left-justified with null padding.
    let request = server.join().unwrap();
    assert_eq!(&request[..12], b"greeting.txt");
    assert!(request[12..].iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn zero_length_file_is_empty_and_success() -> Result<()> {
    let (port, server) = spawn_server(|_stream| {
        // Close without sending a body. On this wire an absent file and
        // an empty file look identical.
    });

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("empty.bin");
    let bytes = net::fetch("127.0.0.1", port, "void", &dest, &NoopLogger)?;

    assert_eq!(bytes, 0);
    assert_eq!(std::fs::metadata(&dest)?.len(), 0);
    server.join().unwrap();
    Ok(())
}

#[test]
fn one_byte_chunk_server_round_trips() -> Result<()> {
    let body = b"short reads are pacing, not failure";
    let (port, server) = spawn_server(move |stream| {
        for &b in body {
            stream.write_all(&[b]).unwrap();
            stream.flush().unwrap();
        }
    });

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("trickle.txt");
    let bytes = net::fetch("127.0.0.1", port, "trickle", &dest, &NoopLogger)?;

    assert_eq!(bytes, body.len() as u64);
    assert_eq!(std::fs::read(&dest)?, body);
    server.join().unwrap();
    Ok(())
}

#[test]
fn multi_kilobyte_body_round_trips() -> Result<()> {
    let body: Vec<u8> = (0..64 * 1024 + 321)
        .map(|i| (i % 251) as u8)
        .collect();
    let expected = body.clone();
    let (port, server) = spawn_server(move |stream| {
        // Uneven chunking on purpose.
        for chunk in body.chunks(1747) {
            stream.write_all(chunk).unwrap();
        }
    });

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("big.bin");
    let bytes = net::fetch("127.0.0.1", port, "big.bin", &dest, &NoopLogger)?;

    assert_eq!(bytes, expected.len() as u64);
    assert_eq!(std::fs::read(&dest)?, expected);
    server.join().unwrap();
    Ok(())
}

#[test]
fn refused_connection_maps_to_connect_error() -> Result<()> {
    // Grab a free port, then close the listener so the connect is refused.
    let port = {
        let sock = TcpListener::bind("127.0.0.1:0")?;
        let p = sock.local_addr()?.port();
        drop(sock);
        p
    };

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("never.bin");
    match net::fetch("127.0.0.1", port, "anything", &dest, &NoopLogger) {
        Err(e @ FetchError::Connect { .. }) => assert_eq!(e.exit_code(), 1),
        other => panic!("expected connect failure, got {:?}", other),
    }
    // The failure happened before the receive phase; no file was created.
    assert!(!dest.exists());
    Ok(())
}

#[test]
fn overlong_remote_name_still_frames_at_width() -> Result<()> {
    let (port, server) = spawn_server(|stream| {
        stream.write_all(b"ok").unwrap();
    });

    let long_name = "d".repeat(NAME_MAX_LEN * 2);
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("out.bin");
    net::fetch("127.0.0.1", port, &long_name, &dest, &NoopLogger)?;

    let request = server.join().unwrap();
    assert_eq!(request.len(), NAME_MAX_LEN);
    assert!(request[..NAME_MAX_LEN - 1].iter().all(|&b| b == b'd'));
    assert_eq!(request[NAME_MAX_LEN - 1], 0);
    Ok(())
}
