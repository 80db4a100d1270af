use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Load recorded provider output.
///
/// A file holding a JSON array of strings is replayed fragment by fragment as recorded.
/// Anything else is treated as raw provider text and cut into `chunk_size`-character
/// pieces, which deliberately land in the middle of keys and strings.
pub fn load_fragments(path: &Path, chunk_size: usize) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fragments from {}", path.display()))?;
    Ok(parse_fragments(&text, chunk_size))
}

pub fn parse_fragments(text: &str, chunk_size: usize) -> Vec<String> {
    if let Ok(recorded) = serde_json::from_str::<Vec<String>>(text) {
        return recorded;
    }
    split_chars(text, chunk_size.max(1))
}

fn split_chars(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
