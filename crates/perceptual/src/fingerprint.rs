//! Fingerprint type for the VidCred perceptual layer.
//!
//! A [`VideoFingerprint`] is the ordered list of per-frame hashes. Position `i`
//! always belongs to the `i`-th sample point, so two fingerprints built with the
//! same sample count and hash width are comparable position by position.
//!
//! The text form is the concatenation of every frame hash as `bit_width / 4`
//! lower-case hex digits, most significant bit first. It is what the upload
//! API returns and what callers send back inside a corpus.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PerceptualError;

/// Ordered per-frame perceptual hashes of one video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VideoFingerprint {
    /// Number of meaningful bits in every hash (at most 64).
    pub bit_width: u32,
    /// One hash per sampled frame, in sample order.
    pub hashes: Vec<u64>,
}

impl VideoFingerprint {
    pub fn new(bit_width: u32, hashes: Vec<u64>) -> Self {
        Self { bit_width, hashes }
    }

    /// Number of component hashes.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Whether `other` has the same number of hashes and the same width.
    pub fn same_structure(&self, other: &VideoFingerprint) -> bool {
        self.bit_width == other.bit_width && self.hashes.len() == other.hashes.len()
    }

    /// Render as concatenated fixed-width hex chunks.
    pub fn to_hex(&self) -> String {
        let digits = (self.bit_width / 4) as usize;
        let mut out = String::with_capacity(digits * self.hashes.len());
        for hash in &self.hashes {
            out.push_str(&format!("{hash:0digits$x}"));
        }
        out
    }

    /// Parse the hex text form produced by [`to_hex`](Self::to_hex).
    pub fn from_hex(text: &str, bit_width: u32) -> Result<Self, PerceptualError> {
        if bit_width == 0 || bit_width > 64 || bit_width % 4 != 0 {
            return Err(PerceptualError::MalformedFingerprint(format!(
                "unsupported hash width {bit_width}"
            )));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(PerceptualError::MalformedFingerprint(
                "empty fingerprint".into(),
            ));
        }
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PerceptualError::MalformedFingerprint(
                "fingerprint contains non-hex characters".into(),
            ));
        }
        let digits = (bit_width / 4) as usize;
        if text.len() % digits != 0 {
            return Err(PerceptualError::MalformedFingerprint(format!(
                "length {} is not a multiple of {digits} hex digits",
                text.len()
            )));
        }

        // ASCII only past this point, so byte offsets are char boundaries.
        let hashes = (0..text.len())
            .step_by(digits)
            .map(|start| {
                u64::from_str_radix(&text[start..start + digits], 16)
                    .map_err(|e| PerceptualError::MalformedFingerprint(e.to_string()))
            })
            .collect::<Result<Vec<u64>, _>>()?;

        Ok(Self { bit_width, hashes })
    }
}

impl fmt::Display for VideoFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Number of differing bits between two hashes.
#[inline]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_uses_fixed_width_chunks() {
        let fp = VideoFingerprint::new(64, vec![0x1, 0xffff_0000_ffff_0000]);
        assert_eq!(fp.to_hex(), "0000000000000001ffff0000ffff0000");
        assert_eq!(fp.to_string(), fp.to_hex());

        let narrow = VideoFingerprint::new(16, vec![0xab, 0x1234]);
        assert_eq!(narrow.to_hex(), "00ab1234");
    }

    #[test]
    fn from_hex_restores_hashes() {
        let fp = VideoFingerprint::from_hex("00ab1234", 16).unwrap();
        assert_eq!(fp.hashes, vec![0xab, 0x1234]);
        assert_eq!(fp.bit_width, 16);

        let upper = VideoFingerprint::from_hex(" FFFF0000FFFF0000 ", 64).unwrap();
        assert_eq!(upper.hashes, vec![0xffff_0000_ffff_0000]);
    }

    #[test]
    fn from_hex_rejects_malformed_text() {
        assert!(VideoFingerprint::from_hex("", 64).is_err());
        assert!(VideoFingerprint::from_hex("xyz0", 16).is_err());
        assert!(VideoFingerprint::from_hex("abc", 16).is_err());
        assert!(VideoFingerprint::from_hex("abcd", 0).is_err());
        assert!(VideoFingerprint::from_hex("abcd", 6).is_err());
        assert!(VideoFingerprint::from_hex("ü0ab", 16).is_err());
    }

    #[test]
    fn structure_compares_length_and_width() {
        let a = VideoFingerprint::new(64, vec![1, 2, 3]);
        let b = VideoFingerprint::new(64, vec![4, 5, 6]);
        let short = VideoFingerprint::new(64, vec![1, 2]);
        let narrow = VideoFingerprint::new(16, vec![1, 2, 3]);
        assert!(a.same_structure(&b));
        assert!(!a.same_structure(&short));
        assert!(!a.same_structure(&narrow));
    }

    #[test]
    fn hamming_counts_bit_differences() {
        assert_eq!(hamming_distance(0, 0), 0);
        assert_eq!(hamming_distance(0b1011, 0b0001), 2);
        assert_eq!(hamming_distance(u64::MAX, 0), 64);
    }
}
