use crate::error::IngestError;
use crate::models::{DocumentChunk, QaOptions};
use regex::Regex;

const DISALLOWED_CHARS: &str = r"[^A-Za-z0-9_\s.,!?;:\-]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

impl From<&QaOptions> for ChunkingConfig {
    fn from(value: &QaOptions) -> Self {
        Self {
            chunk_size: value.chunk_size,
            overlap: value.chunk_overlap,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, IngestError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn clean_text(raw: &str) -> Result<String, IngestError> {
    let disallowed = Regex::new(DISALLOWED_CHARS)?;
    let stripped = disallowed.replace_all(raw, "");
    Ok(normalize_whitespace(&stripped))
}

/// Splits `text` into windows of up to `chunk_size` words, each starting
/// `chunk_size - overlap` words after the previous one.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Result<Vec<DocumentChunk>, IngestError> {
    config.validate()?;

    let words: Vec<&str> = text.split_whitespace().collect();
    let step = config.step();

    let chunks = (0..words.len())
        .step_by(step)
        .enumerate()
        .map(|(index, start)| {
            let end = (start + config.chunk_size).min(words.len());
            DocumentChunk {
                content: words[start..end].join(" "),
                index,
            }
        })
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(chunks: &[DocumentChunk]) -> Vec<&str> {
        chunks.iter().map(|chunk| chunk.content.as_str()).collect()
    }

    #[test]
    fn whitespace_is_normalized() {
        let input = "A  \t  lot\nof   spacing ";
        assert_eq!(normalize_whitespace(input), "A lot of spacing");
    }

    #[test]
    fn clean_text_strips_symbols_and_collapses_spacing() {
        let raw = "  Senior® Engineer — 5+ years\n\n(Rust, Go); remote!  ";
        let cleaned = clean_text(raw).expect("allow-list regex compiles");
        assert_eq!(cleaned, "Senior Engineer 5 years Rust, Go; remote!");
    }

    #[test]
    fn removed_dash_between_words_leaves_one_space() {
        let cleaned = clean_text("a — b").expect("allow-list regex compiles");
        assert_eq!(cleaned, "a b");
        assert_eq!(cleaned.chars().count(), 3);
    }

    #[test]
    fn clean_text_drops_non_ascii_letters() {
        let cleaned = clean_text("café naïve under_score x-y").expect("allow-list regex compiles");
        assert_eq!(cleaned, "caf nave under_score x-y");
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let config = ChunkingConfig::new(3, 1).expect("valid config");
        let chunks = chunk_text("a b c d e f", config).expect("chunking succeeds");

        assert_eq!(contents(&chunks), vec!["a b c", "c d e", "e f"]);
        assert_eq!(
            chunks.iter().map(|chunk| chunk.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn trailing_window_is_emitted_until_start_passes_the_end() {
        let config = ChunkingConfig::new(3, 1).expect("valid config");
        let chunks = chunk_text("a b c", config).expect("chunking succeeds");
        assert_eq!(contents(&chunks), vec!["a b c", "c"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunk_text("", ChunkingConfig::default()).expect("chunking succeeds");
        assert!(chunks.is_empty());

        let chunks = chunk_text(" \n\t ", ChunkingConfig::default()).expect("chunking succeeds");
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_fits_in_one_default_chunk() {
        let chunks =
            chunk_text("one  two\nthree", ChunkingConfig::default()).expect("chunking succeeds");
        assert_eq!(contents(&chunks), vec!["one two three"]);
    }

    #[test]
    fn non_advancing_configs_are_rejected() {
        assert!(matches!(
            ChunkingConfig::new(3, 3),
            Err(IngestError::InvalidChunkConfig(_))
        ));
        assert!(matches!(
            ChunkingConfig::new(0, 0),
            Err(IngestError::InvalidChunkConfig(_))
        ));

        let config = ChunkingConfig {
            chunk_size: 2,
            overlap: 5,
        };
        assert!(chunk_text("a b c", config).is_err());
    }

    #[test]
    fn config_follows_qa_options() {
        let config = ChunkingConfig::from(&QaOptions::default());
        assert_eq!(config, ChunkingConfig::default());
        assert_eq!(config.step(), 450);
    }
}
