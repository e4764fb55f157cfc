//! Average hash over a downscaled luma grid.

use image::DynamicImage;

use crate::config::PerceptualConfig;

/// Compute the average hash of one frame.
///
/// The frame is converted to 8-bit luma, resized to a `hash_size x hash_size`
/// grid, and every cell brighter than the grid mean sets its bit. Bits are
/// emitted row-major, first cell in the most significant position.
pub(crate) fn average_hash(img: &DynamicImage, cfg: &PerceptualConfig) -> u64 {
    let side = cfg.hash_size;
    let grid = image::imageops::resize(
        &img.to_luma8(),
        side,
        side,
        cfg.filter.as_image_filter(),
    );

    let cells: Vec<u32> = grid.pixels().map(|p| u32::from(p.0[0])).collect();
    let sum: u64 = cells.iter().map(|&c| u64::from(c)).sum();
    // Compare `cell * n > sum` instead of `cell > sum / n` to stay in integers.
    let n = cells.len() as u64;

    cells.iter().fold(0u64, |acc, &cell| {
        let bit = u64::from(u64::from(cell) * n > sum);
        (acc << 1) | bit
    })
}
