//! Fget - minimal byte-exact file fetch over TCP
//!
//! Design goals:
//! - One request out, one stream back, nothing else on the wire
//! - Exact byte counts everywhere; short transfers absorbed at the lowest layer
//! - Blocking sequential I/O, no runtime, no threads

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use fget::logger::{Logger, NoopLogger, TextLogger};
use fget::net;
use fget::protocol;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fget - fetch one remote file over TCP, byte-exact"
)]
struct Args {
    /// Remote file to request
    remote: String,

    /// Local destination path
    dest: PathBuf,

    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = protocol::DEFAULT_PORT)]
    port: u16,

    /// Write text log entries to file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Print a transfer summary on success
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    let args = Args::parse();

    // Choose logger once; zero overhead in the transfer loop with NoopLogger
    let logger: Arc<dyn Logger + Send + Sync> = if let Some(ref p) = args.log_file {
        match TextLogger::new(p) {
            Ok(l) => Arc::new(l),
            Err(_) => Arc::new(NoopLogger),
        }
    } else {
        Arc::new(NoopLogger)
    };

    match net::fetch(
        &args.host,
        args.port,
        &args.remote,
        &args.dest,
        logger.as_ref(),
    ) {
        Ok(bytes) => {
            if args.verbose {
                println!("{} -> {} ({} bytes)", args.remote, args.dest.display(), bytes);
            }
        }
        Err(e) => {
            eprintln!("fget: {}", e);
            process::exit(e.exit_code());
        }
    }
}
