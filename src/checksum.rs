//! Frame digests and distortion metrics.
//!
//! Everything here walks logical samples through the stride-aware plane
//! views. Two frames holding identical pixels therefore hash and compare
//! identically no matter how their backing buffers are laid out, which lets
//! a sensor crop be checked against a codec output without either side
//! knowing the other's format.
use crc32fast::Hasher;

use crate::frame::{FrameError, Yuv, YuvFrame};
use crate::plane::PlaneRef;

/// CRC32 over every sample byte.
///
/// Samples are visited in plane order, row order, column order. Padding and
/// interleaved foreign bytes never enter the digest.
pub fn checksum(frame: &YuvFrame<'_>) -> Result<u32, FrameError> {
    let mut crc = Hasher::new();
    for plane in frame.planes()? {
        update(&mut crc, &plane);
    }
    Ok(crc.finalize())
}

fn update(crc: &mut Hasher, plane: &PlaneRef<'_>) {
    if plane.pixel_stride() == 1 {
        for y in 0..plane.height() {
            crc.update(plane.row_bytes(y));
        }
        return;
    }

    for y in 0..plane.height() {
        for x in 0..plane.width() {
            crc.update(&[plane.sample(x, y)]);
        }
    }
}

/// Root-mean-square distortion between two frames of equal logical size.
///
/// The mean runs over every pixel and all three channels.
///
/// # Panics
///
/// This function panics when the logical dimensions differ.
pub fn error_rms(a: &YuvFrame<'_>, b: &YuvFrame<'_>) -> Result<f64, FrameError> {
    let (total, samples) = total_error_squared(a, b)?;
    Ok(libm::sqrt(total / samples))
}

/// Peak signal-to-noise ratio between two frames, in decibels.
///
/// Infinite for identical content.
///
/// # Panics
///
/// This function panics when the logical dimensions differ.
pub fn psnr(a: &YuvFrame<'_>, b: &YuvFrame<'_>) -> Result<f64, FrameError> {
    let (total, samples) = total_error_squared(a, b)?;
    if total == 0.0 {
        return Ok(f64::INFINITY);
    }
    let mse = total / samples;
    Ok(10.0 * libm::log10(255.0 * 255.0 / mse))
}

fn total_error_squared(a: &YuvFrame<'_>, b: &YuvFrame<'_>) -> Result<(f64, f64), FrameError> {
    let pa = a.planes()?;
    let pb = b.planes()?;
    let (width, height) = (pa[0].width(), pa[0].height());
    assert!(
        width == pb[0].width() && height == pb[0].height(),
        "Mismatching frame dimensions."
    );

    let mut total = 0.0;
    for y in 0..height {
        for x in 0..width {
            let (cx, cy) = (x / 2, y / 2);
            let left = Yuv {
                y: pa[0].sample(x, y),
                u: pa[1].sample(cx, cy),
                v: pa[2].sample(cx, cy),
            };
            let right = Yuv {
                y: pb[0].sample(x, y),
                u: pb[1].sample(cx, cy),
                v: pb[2].sample(cx, cy),
            };
            total += left.error_squared(right);
        }
    }

    Ok((total, (width * height) as f64 * 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ChromaMode, Coord, FrameGeometry};

    fn geometry(width: u32, height: u32, array_width: u32, array_height: u32) -> FrameGeometry {
        FrameGeometry {
            origin: Coord(0, 0),
            width,
            height,
            array_width,
            array_height,
        }
    }

    #[test]
    fn digest_ignores_padding() {
        // The same logical 4×4 content in a packed and in a padded array.
        let mut packed_luma = [0u8; 16];
        let mut packed_chroma = [0u8; 8];
        let mut padded_luma = [0xEEu8; 4 * 8];
        let mut padded_chroma = [0xEEu8; 2 * 8];

        for y in 0..4usize {
            for x in 0..4usize {
                let value = (10 * y + x) as u8;
                packed_luma[y * 4 + x] = value;
                padded_luma[y * 8 + x] = value;
            }
        }
        for y in 0..2usize {
            for x in 0..2usize {
                packed_chroma[y * 4 + 2 * x] = 100 + y as u8;
                packed_chroma[y * 4 + 2 * x + 1] = 200 + x as u8;
                padded_chroma[y * 8 + 2 * x] = 100 + y as u8;
                padded_chroma[y * 8 + 2 * x + 1] = 200 + x as u8;
            }
        }

        let packed = YuvFrame::new(
            geometry(4, 4, 4, 4),
            ChromaMode::SemiPlanar,
            0,
            &packed_luma,
            &packed_chroma,
        )
        .unwrap();
        let padded = YuvFrame::new(
            geometry(4, 4, 8, 8),
            ChromaMode::SemiPlanar,
            0,
            &padded_luma,
            &padded_chroma,
        )
        .unwrap();

        assert_eq!(checksum(&packed).unwrap(), checksum(&padded).unwrap());

        // Disturbing one padding byte changes nothing.
        let mut disturbed = padded_luma;
        disturbed[4] = 0x55;
        let frame = YuvFrame::new(
            geometry(4, 4, 8, 8),
            ChromaMode::SemiPlanar,
            0,
            &disturbed,
            &padded_chroma,
        )
        .unwrap();
        assert_eq!(checksum(&packed).unwrap(), checksum(&frame).unwrap());

        // Disturbing one sample does not.
        let mut disturbed = padded_luma;
        disturbed[8] = 0x55;
        let frame = YuvFrame::new(
            geometry(4, 4, 8, 8),
            ChromaMode::SemiPlanar,
            0,
            &disturbed,
            &padded_chroma,
        )
        .unwrap();
        assert_ne!(checksum(&packed).unwrap(), checksum(&frame).unwrap());
    }

    #[test]
    fn identical_frames_have_no_distortion() {
        let luma = [7u8; 16];
        let chroma = [3u8; 8];
        let frame = YuvFrame::new(
            geometry(4, 4, 4, 4),
            ChromaMode::SemiPlanar,
            0,
            &luma,
            &chroma,
        )
        .unwrap();

        assert_eq!(error_rms(&frame, &frame).unwrap(), 0.0);
        assert_eq!(psnr(&frame, &frame).unwrap(), f64::INFINITY);
    }

    #[test]
    fn distortion_counts_every_channel() {
        let geometry = geometry(2, 2, 2, 2);
        let luma_a = [10u8; 4];
        let luma_b = [13u8; 4];
        let chroma = [0u8; 2];

        let a = YuvFrame::new(geometry, ChromaMode::SemiPlanar, 0, &luma_a, &chroma).unwrap();
        let b = YuvFrame::new(geometry, ChromaMode::SemiPlanar, 0, &luma_b, &chroma).unwrap();

        // Four pixels deviate by three in one of three channels.
        let expected = libm::sqrt(4.0 * 9.0 / 12.0);
        assert!((error_rms(&a, &b).unwrap() - expected).abs() < 1e-12);
        assert!(psnr(&a, &b).unwrap() > 0.0);
    }

    #[test]
    fn closed_frames_do_not_digest() {
        let luma = [0u8; 16];
        let chroma = [0u8; 8];
        let mut frame = YuvFrame::new(
            geometry(4, 4, 4, 4),
            ChromaMode::SemiPlanar,
            0,
            &luma,
            &chroma,
        )
        .unwrap();
        frame.close();
        assert_eq!(checksum(&frame), Err(FrameError::Closed));
    }
}
