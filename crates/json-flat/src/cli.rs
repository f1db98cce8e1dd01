//! Core logic behind the command-line tools.
//!
//! - `flat-pack`: JSON (stdin) → record table (stdout)
//! - `flat-unpack`: record table (stdin) → JSON (stdout)

use crate::{FlatDecoder, FlatEncoder, FlatError, Graph, Indent};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Flat(FlatError),
    Usage(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e)  => write!(f, "{e}"),
            CliError::Flat(e)  => write!(f, "{e}"),
            CliError::Usage(e) => write!(f, "usage: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<FlatError> for CliError {
    fn from(e: FlatError) -> Self { CliError::Flat(e) }
}

// ── flat-pack ─────────────────────────────────────────────────────────────

/// Encode a JSON document as a record table.
pub fn pack(json: &str, space: Option<Indent>) -> Result<String, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let mut graph = Graph::new();
    let root = graph.insert_json(&value);
    let mut encoder = FlatEncoder::new();
    if let Some(space) = space {
        encoder = encoder.with_space(space);
    }
    Ok(encoder.encode(&graph, &root)?)
}

/// Parse `flat-pack` flags: `--space N` or `--indent STR`.
pub fn pack_args(args: &[String]) -> Result<Option<Indent>, CliError> {
    let mut space = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--space" => {
                i += 1;
                let n = args
                    .get(i)
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| CliError::Usage("--space expects a number".into()))?;
                space = Some(Indent::Spaces(n));
            }
            "--indent" => {
                i += 1;
                let text = args
                    .get(i)
                    .ok_or_else(|| CliError::Usage("--indent expects a string".into()))?;
                space = Some(Indent::Text(text.clone()));
            }
            other => return Err(CliError::Usage(format!("unknown flag {other}"))),
        }
        i += 1;
    }
    Ok(space)
}

// ── flat-unpack ───────────────────────────────────────────────────────────

/// Decode a record table and print it as JSON.
///
/// Fails with [`FlatError::Cycle`] when the document is cyclic, since plain
/// JSON cannot express it. Shared nodes are printed once per path.
pub fn unpack(text: &str, compact: bool) -> Result<String, CliError> {
    let doc = FlatDecoder::new().decode(text)?;
    let json = doc.to_json()?;
    if compact {
        Ok(serde_json::to_string(&json)?)
    } else {
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Parse `flat-unpack` flags: `--compact`.
pub fn unpack_args(args: &[String]) -> Result<bool, CliError> {
    let mut compact = false;
    for arg in args {
        match arg.as_str() {
            "--compact" => compact = true,
            other => return Err(CliError::Usage(format!("unknown flag {other}"))),
        }
    }
    Ok(compact)
}
