//! # VidCred Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides whether a freshly fingerprinted video duplicates one of
//! the caller's previously accepted videos. It owns two pieces of logic:
//!
//! - the **similarity comparator**, a symmetric percentage built from the
//!   normalised Hamming distance of position-aligned frame hashes, and
//! - the **duplicate classifier**, which keeps the best similarity over a
//!   corpus, applies a strict threshold and attributes the match to the same
//!   or a different uploader.
//!
//! The corpus is always supplied by the caller and is never persisted here.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: duplicate threshold (default `95.0`), expected
//!   fingerprint length and parallelism.
//! - [`Corpus`] / [`CorpusEntry`]: ordered snapshot of prior uploads.
//!   [`Corpus::from_json_lenient`] decodes the wire payload and never fails.
//! - [`SimilarityResult`]: best score and matched entry.
//! - [`DuplicateVerdict`]: final decision handed to credit scoring.
//! - [`DuplicateClassifier`]: the engine.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{Corpus, DuplicateClassifier, MatchConfig};
//! use perceptual::VideoFingerprint;
//!
//! let upload = VideoFingerprint::new(64, vec![0xff00, 0x00ff]);
//! let corpus = Corpus::from_json_lenient(
//!     r#"{"videos":[{"fingerprint":"000000000000ff0000000000000000ff","owner":"alice"}]}"#,
//!     64,
//! )
//! .corpus;
//!
//! let classifier = DuplicateClassifier::new(MatchConfig::default()).unwrap();
//! let verdict = classifier.classify(&upload, &corpus, Some("alice"));
//! assert!(verdict.is_duplicate);
//! assert!(verdict.same_owner_as_match);
//! ```

pub mod corpus;
pub mod engine;
pub mod similarity;
pub mod types;

pub use crate::corpus::{Corpus, CorpusPayload, CorpusVideo, ParsedCorpus};
pub use crate::engine::DuplicateClassifier;
pub use crate::similarity::similarity;
pub use crate::types::{
    CorpusEntry, DuplicateVerdict, MatchConfig, MatchError, SimilarityResult,
};
