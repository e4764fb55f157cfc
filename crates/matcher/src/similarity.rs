//! Fingerprint-to-fingerprint similarity.

use perceptual::{hamming_distance, VideoFingerprint};

/// Similarity of two fingerprints as a percentage in `[0, 100]`.
///
/// Position `i` of `a` is compared with position `i` of `b`; each position
/// contributes `1 - hamming / bit_width` and the mean is scaled to a
/// percentage. Fingerprints with a different number of hashes or a different
/// hash width are incomparable and score `0.0`, as does an empty fingerprint.
pub fn similarity(a: &VideoFingerprint, b: &VideoFingerprint) -> f64 {
    if a.is_empty() || !a.same_structure(b) || a.bit_width == 0 || a.bit_width > 64 {
        return 0.0;
    }

    let mask = width_mask(a.bit_width);
    let width = f64::from(a.bit_width);
    let total: f64 = a
        .hashes
        .iter()
        .zip(&b.hashes)
        .map(|(&x, &y)| 1.0 - f64::from(hamming_distance(x & mask, y & mask)) / width)
        .sum();

    (total / a.len() as f64 * 100.0).clamp(0.0, 100.0)
}

fn width_mask(bit_width: u32) -> u64 {
    if bit_width >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(hashes: &[u64]) -> VideoFingerprint {
        VideoFingerprint::new(64, hashes.to_vec())
    }

    #[test]
    fn identical_fingerprints_score_100() {
        let a = fp(&[0xdead_beef, 0x1234_5678_9abc_def0, u64::MAX]);
        assert_eq!(similarity(&a, &a), 100.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = fp(&[0x0f0f, 0xffff_0000, 7]);
        let b = fp(&[0x00ff, 0x0000_ffff, 9]);
        assert_eq!(similarity(&a, &b), similarity(&b, &a));
    }

    #[test]
    fn complementary_hashes_score_zero() {
        let a = fp(&[0, 0]);
        let b = fp(&[u64::MAX, u64::MAX]);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn one_bit_per_position_costs_one_sixty_fourth() {
        let a = fp(&[0, 0, 0, 0]);
        let b = fp(&[1, 2, 4, 8]);
        let expected = (1.0 - 1.0 / 64.0) * 100.0;
        assert!((similarity(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn mismatched_structure_scores_zero() {
        let a = fp(&[1, 2, 3]);
        let short = fp(&[1, 2]);
        let narrow = VideoFingerprint::new(16, vec![1, 2, 3]);
        assert_eq!(similarity(&a, &short), 0.0);
        assert_eq!(similarity(&short, &a), 0.0);
        assert_eq!(similarity(&a, &narrow), 0.0);
    }

    #[test]
    fn empty_fingerprints_score_zero() {
        let empty = fp(&[]);
        assert_eq!(similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn bits_above_width_are_ignored() {
        let a = VideoFingerprint::new(16, vec![0x0001]);
        let b = VideoFingerprint::new(16, vec![0xffff_0000_0000_0001]);
        assert_eq!(similarity(&a, &b), 100.0);
    }

    #[test]
    fn score_stays_in_bounds() {
        let hashes: Vec<u64> = (0..10).map(|i| 0x9e37_79b9_7f4a_7c15u64.rotate_left(i)).collect();
        let a = fp(&hashes);
        for shift in 0..64 {
            let b = fp(&hashes.iter().map(|h| h.rotate_right(shift)).collect::<Vec<_>>());
            let s = similarity(&a, &b);
            assert!((0.0..=100.0).contains(&s), "shift={shift} s={s}");
        }
    }
}
