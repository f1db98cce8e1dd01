//! `flat-unpack`: decode a flat record table (stdin) to JSON (stdout).
//!
//! Usage:
//!   flat-unpack [--compact]
//!
//! Cyclic documents cannot be printed as JSON and exit with an error.

use json_flat::cli::{unpack, unpack_args};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let compact = match unpack_args(&args) {
        Ok(compact) => compact,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match unpack(buf.trim(), compact) {
        Ok(json) => {
            if let Err(e) = io::stdout().write_all(json.as_bytes()) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
