//! File manipulation utilities.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, from_str, to_writer_pretty};

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, io::Error> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

/// Reads a JSON-encoded type from a given file `path` without blocking the runtime.
pub async fn read_json_async<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, io::Error> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(from_str(&contents)?)
}

/// Writes `value` as pretty-printed JSON to `path`, replacing any existing file.
pub fn write_json<S: Serialize + ?Sized>(path: impl AsRef<Path>, value: &S) -> Result<(), io::Error> {
    let file = File::create(path)?;
    to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}
