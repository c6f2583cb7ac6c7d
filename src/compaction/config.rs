//! Compaction configuration and granularity parsing.

use anyhow::{Context, Result};

use super::{DEFAULT_CHUNK_SIZE, DEFAULT_KEEP_COUNT};

/// How the summarized head is partitioned.
///
/// Exactly one granularity is active per deployment; the two are alternative
/// designs, not layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Summarize everything before the kept tail in one call.
    #[default]
    SingleShot,
    /// Peel fixed-size chunks off the front, one summary turn per chunk.
    /// Bounds each summarization call's input size at the cost of losing
    /// cross-chunk continuity in the summary text.
    Chunked,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::SingleShot => write!(f, "single-shot"),
            Granularity::Chunked => write!(f, "chunked"),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single-shot" | "single_shot" | "singleshot" => Ok(Granularity::SingleShot),
            "chunked" => Ok(Granularity::Chunked),
            other => anyhow::bail!(
                "Unknown granularity '{}': expected 'single-shot' or 'chunked'",
                other
            ),
        }
    }
}

/// Knobs for the compaction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionConfig {
    /// Number of most-recent turns retained verbatim across compaction.
    pub keep_count: usize,
    /// Turns summarized per synthetic turn in chunked mode; ignored by
    /// single-shot.
    pub chunk_size: usize,
    /// Active partitioning granularity.
    pub granularity: Granularity,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            keep_count: DEFAULT_KEEP_COUNT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            granularity: Granularity::default(),
        }
    }
}

impl CompactionConfig {
    /// Validated constructor. `keep_count` may be zero (summarize everything);
    /// `chunk_size` must be at least 1 when chunked mode is active.
    pub fn new(keep_count: usize, chunk_size: usize, granularity: Granularity) -> Result<Self> {
        if granularity == Granularity::Chunked && chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1 in chunked mode");
        }
        Ok(Self {
            keep_count,
            chunk_size,
            granularity,
        })
    }

    /// Parse a granularity string, defaulting when absent.
    pub fn parse_granularity(s: Option<&str>) -> Result<Granularity> {
        match s {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid granularity: {}", raw)),
            None => Ok(Granularity::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_granularity() {
        assert_eq!(
            "single-shot".parse::<Granularity>().unwrap(),
            Granularity::SingleShot
        );
        assert_eq!(
            "SingleShot".parse::<Granularity>().unwrap(),
            Granularity::SingleShot
        );
        assert_eq!("chunked".parse::<Granularity>().unwrap(), Granularity::Chunked);
        assert_eq!(
            " Chunked ".parse::<Granularity>().unwrap(),
            Granularity::Chunked
        );
    }

    #[test]
    fn test_parse_granularity_invalid() {
        assert!("windowed".parse::<Granularity>().is_err());
        assert!("".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_parse_granularity_default_when_absent() {
        assert_eq!(
            CompactionConfig::parse_granularity(None).unwrap(),
            Granularity::SingleShot
        );
    }

    #[test]
    fn test_display_roundtrip() {
        for g in [Granularity::SingleShot, Granularity::Chunked] {
            assert_eq!(g.to_string().parse::<Granularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_new_rejects_zero_chunk_in_chunked_mode() {
        assert!(CompactionConfig::new(3, 0, Granularity::Chunked).is_err());
    }

    #[test]
    fn test_new_allows_zero_chunk_in_single_shot() {
        // Single-shot ignores chunk_size entirely
        let config = CompactionConfig::new(3, 0, Granularity::SingleShot).unwrap();
        assert_eq!(config.keep_count, 3);
    }

    #[test]
    fn test_new_allows_zero_keep_count() {
        let config = CompactionConfig::new(0, 4, Granularity::Chunked).unwrap();
        assert_eq!(config.keep_count, 0);
    }

    #[test]
    fn test_defaults() {
        let config = CompactionConfig::default();
        assert_eq!(config.keep_count, DEFAULT_KEEP_COUNT);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.granularity, Granularity::SingleShot);
    }
}
