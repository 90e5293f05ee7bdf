//! Owned backing storage for a full scene array.
use alloc::vec;
use alloc::vec::Vec;

use crate::frame::{FrameError, YuvFrame, YuvFrameMut};
use crate::layout::{ChromaMode, Coord, FrameGeometry};
use crate::plane::BadPlaneError;

// Broadcast luma keeps headroom and footroom; full range is not valid here.
const Y_CLAMP_MIN: u8 = 16;
const Y_CLAMP_MAX: u8 = 235;

/// Owned luma and chroma arrays that frames are borrowed out of.
///
/// The arrays describe a scene larger than any single frame; frames are
/// cropped views at an origin, the way an encoder input tracks a moving
/// scene inside a fixed reference plane. The buffer itself never addresses
/// samples directly, it only allocates and fills; all addressing goes
/// through the views it lends.
pub struct FrameBuffer {
    array_width: u32,
    array_height: u32,
    mode: ChromaMode,
    luma: Vec<u8>,
    chroma: Vec<u8>,
}

impl FrameBuffer {
    /// Allocate zeroed arrays for a backing size and chroma arrangement.
    ///
    /// Both dimensions must be even and non-zero, so the chroma array is a
    /// clean half in each direction.
    pub fn new(
        array_width: u32,
        array_height: u32,
        mode: ChromaMode,
    ) -> Result<Self, BadPlaneError> {
        if array_width == 0 || array_height == 0 {
            return Err(BadPlaneError::invalid_geometry());
        }
        if array_width % 2 != 0 || array_height % 2 != 0 {
            return Err(BadPlaneError::invalid_geometry());
        }

        let luma_len = (array_width as usize)
            .checked_mul(array_height as usize)
            .ok_or_else(BadPlaneError::invalid_geometry)?;

        Ok(FrameBuffer {
            array_width,
            array_height,
            mode,
            luma: vec![0; luma_len],
            chroma: vec![0; luma_len / 2],
        })
    }

    /// Width of the backing arrays.
    pub fn array_width(&self) -> u32 {
        self.array_width
    }

    /// Height of the backing arrays.
    pub fn array_height(&self) -> u32 {
        self.array_height
    }

    /// The chroma arrangement frames of this buffer use.
    pub fn mode(&self) -> ChromaMode {
        self.mode
    }

    /// Render the reference scene.
    ///
    /// Luma is a diagonal gradient clamped to the broadcast range; each
    /// chroma sample encodes its own coordinates, U the row and V the
    /// column. Every crop of the scene is therefore distinguishable from
    /// every other, which is what makes the pattern useful as a source for
    /// copy and comparison checks.
    pub fn fill_reference(&mut self) {
        let (aw, ah) = (self.array_width as usize, self.array_height as usize);
        for y in 0..ah {
            for x in 0..aw {
                self.luma[y * aw + x] = clamp_y(((x + y) & 0xff) as u8);
            }
        }

        match self.mode {
            ChromaMode::SemiPlanar => {
                for y in 0..ah / 2 {
                    for x in 0..aw / 2 {
                        self.chroma[y * aw + 2 * x] = y as u8;
                        self.chroma[y * aw + 2 * x + 1] = x as u8;
                    }
                }
            }
            ChromaMode::Planar => {
                let v_offset = (aw / 2) * (ah / 2);
                for y in 0..ah / 2 {
                    for x in 0..aw / 2 {
                        self.chroma[y * (aw / 2) + x] = y as u8;
                        self.chroma[v_offset + y * (aw / 2) + x] = x as u8;
                    }
                }
            }
        }
    }

    fn geometry(&self, origin: Coord, width: u32, height: u32) -> FrameGeometry {
        FrameGeometry {
            origin,
            width,
            height,
            array_width: self.array_width,
            array_height: self.array_height,
        }
    }

    /// Borrow a cropped read-only frame at an origin.
    pub fn frame(
        &self,
        origin: Coord,
        width: u32,
        height: u32,
        timestamp: i64,
    ) -> Result<YuvFrame<'_>, FrameError> {
        YuvFrame::new(
            self.geometry(origin, width, height),
            self.mode,
            timestamp,
            &self.luma,
            &self.chroma,
        )
    }

    /// Borrow a cropped writable frame at an origin.
    pub fn frame_mut(
        &mut self,
        origin: Coord,
        width: u32,
        height: u32,
        timestamp: i64,
    ) -> Result<YuvFrameMut<'_>, FrameError> {
        YuvFrameMut::new(
            self.geometry(origin, width, height),
            self.mode,
            timestamp,
            &mut self.luma,
            &mut self.chroma,
        )
    }
}

fn clamp_y(value: u8) -> u8 {
    value.clamp(Y_CLAMP_MIN, Y_CLAMP_MAX)
}

#[test]
fn even_dimensions_only() {
    assert!(FrameBuffer::new(16, 16, ChromaMode::Planar).is_ok());
    assert!(FrameBuffer::new(15, 16, ChromaMode::Planar).is_err());
    assert!(FrameBuffer::new(16, 0, ChromaMode::SemiPlanar).is_err());
}

#[test]
fn reference_scene_is_readable() {
    let mut scene = FrameBuffer::new(16, 16, ChromaMode::SemiPlanar).unwrap();
    scene.fill_reference();

    let frame = scene.frame(Coord(4, 6), 8, 8, 0).unwrap();
    let pixel = frame.yuv_at(0, 0).unwrap();
    // Luma carries the clamped diagonal, chroma its own coordinates.
    assert_eq!(pixel.y, clamp_y(4 + 6));
    assert_eq!(pixel.u, 3);
    assert_eq!(pixel.v, 2);

    let pixel = frame.yuv_at(5, 3).unwrap();
    assert_eq!(pixel.y, 4 + 5 + 6 + 3);
    assert_eq!(pixel.u, (6 + 3) / 2);
    assert_eq!(pixel.v, (4 + 5) / 2);
}

#[test]
fn luma_stays_in_broadcast_range() {
    let mut scene = FrameBuffer::new(64, 64, ChromaMode::Planar).unwrap();
    scene.fill_reference();

    let frame = scene.frame(Coord(0, 0), 64, 64, 0).unwrap();
    let luma = frame.y().unwrap();
    for y in 0..luma.height() {
        for x in 0..luma.width() {
            let value = luma.sample(x, y);
            assert!((Y_CLAMP_MIN..=Y_CLAMP_MAX).contains(&value));
        }
    }
}
