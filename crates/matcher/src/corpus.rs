//! Caller-supplied corpus of prior uploads.
//!
//! The corpus is an immutable snapshot handed in with every request; nothing
//! in this crate stores or mutates it.

use serde::{Deserialize, Serialize};

use crate::types::CorpusEntry;

/// Wire form of the corpus sent alongside an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusPayload {
    #[serde(default)]
    pub videos: Vec<CorpusVideo>,
    #[serde(default)]
    pub current_user: Option<String>,
}

/// One prior upload in wire form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusVideo {
    pub fingerprint: String,
    #[serde(default)]
    pub owner: String,
}

/// Ordered list of prior uploads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

/// Result of lenient corpus decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCorpus {
    pub corpus: Corpus,
    pub current_user: Option<String>,
    /// One line per recovered problem, in input order.
    pub warnings: Vec<String>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CorpusEntry) {
        self.entries.push(entry);
    }

    /// Decode a wire payload, skipping entries whose fingerprint does not
    /// decode at `bit_width`.
    pub fn from_payload(payload: CorpusPayload, bit_width: u32) -> ParsedCorpus {
        let mut parsed = ParsedCorpus {
            current_user: payload.current_user.filter(|u| !u.trim().is_empty()),
            ..Default::default()
        };

        for (i, video) in payload.videos.into_iter().enumerate() {
            match CorpusEntry::from_hex(&video.fingerprint, video.owner, bit_width) {
                Ok(entry) => parsed.corpus.push(entry),
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "skipping corpus entry");
                    parsed
                        .warnings
                        .push(format!("corpus entry {i} skipped: {e}"));
                }
            }
        }
        parsed
    }

    /// Decode corpus JSON without failing.
    ///
    /// Blank input is an empty corpus. Malformed JSON is an empty corpus plus
    /// a warning.
    pub fn from_json_lenient(text: &str, bit_width: u32) -> ParsedCorpus {
        if text.trim().is_empty() {
            return ParsedCorpus::default();
        }
        match serde_json::from_str::<CorpusPayload>(text) {
            Ok(payload) => Self::from_payload(payload, bit_width),
            Err(e) => {
                tracing::warn!(error = %e, "malformed corpus JSON; treating as empty");
                ParsedCorpus {
                    warnings: vec![format!("malformed corpus ignored: {e}")],
                    ..Default::default()
                }
            }
        }
    }
}

impl FromIterator<CorpusEntry> for Corpus {
    fn from_iter<T: IntoIterator<Item = CorpusEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
