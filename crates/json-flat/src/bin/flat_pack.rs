//! `flat-pack`: encode JSON (stdin) as a flat record table (stdout).
//!
//! Usage:
//!   flat-pack [--space N | --indent STR]
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use json_flat::cli::{pack, pack_args};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let space = match pack_args(&args) {
        Ok(space) => space,
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

    match pack(buf.trim(), space) {
        Ok(text) => {
            if let Err(e) = io::stdout().write_all(text.as_bytes()) {
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
