use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use eyre::{Context, Result};
use lofty::file::{AudioFile, TaggedFile};
use lofty::probe::Probe;

/// Reads the media duration from a local file. `None` if the container reports no length.
pub(crate) fn probe_path(path: impl AsRef<Path>) -> Result<Option<Duration>> {
    let path = path.as_ref();
    let tagged_file = lofty::read_from_path(path)
        .wrap_err_with(|| format!("Error probing {path:?}"))?;
    Ok(duration_of(&tagged_file))
}

pub(crate) fn probe_bytes(bytes: &[u8]) -> Result<Option<Duration>> {
    let tagged_file = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .wrap_err("Error guessing media type")?
        .read()
        .wrap_err("Error probing media bytes")?;
    Ok(duration_of(&tagged_file))
}

fn duration_of(tagged_file: &TaggedFile) -> Option<Duration> {
    Some(tagged_file.properties().duration()).filter(|duration| !duration.is_zero())
}

/// Strips a `file://` scheme so local urls can be opened as paths.
pub(crate) fn local_path(url: &str) -> &str {
    url.strip_prefix("file://").unwrap_or(url)
}

#[cfg(test)]
pub(crate) fn wav_bytes(sample_rate: u32, millis: u32) -> Vec<u8> {
    // 16 bit mono PCM
    let data_len = sample_rate / 1000 * millis * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);
    bytes
}
