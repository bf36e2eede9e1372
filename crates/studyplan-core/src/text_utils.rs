use once_cell::sync::Lazy;
use regex::Regex;

/// Default chunk size, in characters, for [`chunk_text`].
pub const DEFAULT_CHUNK_SIZE: usize = 2000;
/// Default overlap, in characters, between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Basic cleanup of extracted text before chunking.
///
/// Normalizes line endings, collapses runs of blank lines and horizontal
/// whitespace, drops lines that are just a page number (1-3 digits), and
/// trims every line.
pub fn clean_text(raw: &str) -> String {
    static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
    static HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
    static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").unwrap());

    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    let text = HSPACE.replace_all(&text, " ");

    let cleaned: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !PAGE_NUMBER.is_match(line))
        .collect();

    let result = cleaned.join("\n").trim().to_string();
    tracing::debug!(length = result.chars().count(), "text cleaning finished");
    result
}

/// Split `text` into chunks of at most `max_chars` characters, each starting
/// `overlap` characters before the end of the previous one.
///
/// An overlap that is not smaller than `max_chars` is clamped to
/// `max_chars - 1` so the window always advances.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(max_chars - 1);

    // Byte offset of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < char_len {
        let end = (start + max_chars).min(char_len);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        if end == char_len {
            break;
        }
        start = end - overlap;
    }

    tracing::debug!(chunks = chunks.len(), max_chars, overlap, "chunking finished");
    chunks
}

/// The first `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
