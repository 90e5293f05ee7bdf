//! Flexible 4:2:0 frames over caller-owned buffers.
//!
//! A frame composes three plane views out of two buffers: one for luma, one
//! for chroma. The buffers stay owned by the caller; the frame only records
//! how to address them. Construction is fail-fast, every view is derived and
//! bounds-checked once before a frame exists, so a frame in hand is always
//! fully addressable.
//!
//! A read-only frame can be closed. Closing releases the buffer references
//! and every later access reports the closure loudly instead of returning
//! stale data.
use core::fmt;

use crate::layout::{ChromaMode, FrameGeometry, YuvLayout};
use crate::plane::{BadPlaneError, PlaneMut, PlaneRef};

/// Pixel arrangements a frame can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FrameFormat {
    /// 4:2:0 subsampled planar YUV, eight bits per sample.
    Yuv420,
}

/// One sampled pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Yuv {
    pub y: u8,
    pub u: u8,
    pub v: u8,
}

impl Yuv {
    /// Squared distance to another pixel, summed over the three channels.
    pub fn error_squared(self, other: Yuv) -> f64 {
        let dy = f64::from(self.y) - f64::from(other.y);
        let du = f64::from(self.u) - f64::from(other.u);
        let dv = f64::from(self.v) - f64::from(other.v);
        dy * dy + du * du + dv * dv
    }
}

/// Top-level frame error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    /// A plane could not be derived over the supplied geometry and buffers.
    Plane(BadPlaneError),
    /// The frame was closed and its buffers are no longer reachable.
    Closed,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plane(e) => write!(f, "plane error: {e}"),
            Self::Closed => f.write_str("frame has been closed"),
        }
    }
}

impl core::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Plane(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BadPlaneError> for FrameError {
    fn from(e: BadPlaneError) -> Self {
        Self::Plane(e)
    }
}

#[derive(Clone, Copy)]
struct Buffers<'data> {
    luma: &'data [u8],
    chroma: &'data [u8],
}

/// A read-only 4:2:0 frame composed of three plane views.
///
/// The planes come in fixed `[Y, U, V]` order. In the semi-planar
/// arrangement the U and V views alias the same chroma region one byte
/// apart; in the fully planar arrangement they are disjoint. Either way the
/// stride-aware accessors hide the difference from consumers.
#[derive(Clone)]
pub struct YuvFrame<'data> {
    layout: YuvLayout,
    timestamp: i64,
    bufs: Option<Buffers<'data>>,
}

impl<'data> YuvFrame<'data> {
    /// Compose a frame over a luma and a chroma buffer.
    ///
    /// The timestamp is taken as supplied, in microseconds of the caller's
    /// presentation clock; nothing here generates time. Fail-fast: a
    /// geometry or capacity problem in any plane aborts the whole
    /// construction and no partial frame exists.
    pub fn new(
        geometry: FrameGeometry,
        mode: ChromaMode,
        timestamp: i64,
        luma: &'data [u8],
        chroma: &'data [u8],
    ) -> Result<Self, FrameError> {
        let layout = YuvLayout::new(geometry, mode)?;
        Self::with_layout(layout, timestamp, luma, chroma)
    }

    /// Compose a frame over buffers for an already validated layout.
    pub fn with_layout(
        layout: YuvLayout,
        timestamp: i64,
        luma: &'data [u8],
        chroma: &'data [u8],
    ) -> Result<Self, FrameError> {
        PlaneRef::new(layout.luma(), luma)?;
        PlaneRef::new(layout.chroma_u(), chroma)?;
        PlaneRef::new(layout.chroma_v(), chroma)?;

        Ok(YuvFrame {
            layout,
            timestamp,
            bufs: Some(Buffers { luma, chroma }),
        })
    }

    fn buffers(&self) -> Result<Buffers<'data>, FrameError> {
        self.bufs.ok_or(FrameError::Closed)
    }

    pub(crate) fn layout(&self) -> YuvLayout {
        self.layout
    }

    /// The pixel arrangement of this frame.
    pub fn format(&self) -> Result<FrameFormat, FrameError> {
        self.buffers()?;
        Ok(FrameFormat::Yuv420)
    }

    /// Logical width in luma samples.
    pub fn width(&self) -> Result<u32, FrameError> {
        self.buffers()?;
        Ok(self.layout.geometry().width)
    }

    /// Logical height in luma samples.
    pub fn height(&self) -> Result<u32, FrameError> {
        self.buffers()?;
        Ok(self.layout.geometry().height)
    }

    /// The caller-supplied presentation timestamp, in microseconds.
    pub fn timestamp(&self) -> Result<i64, FrameError> {
        self.buffers()?;
        Ok(self.timestamp)
    }

    /// The three plane views, in `[Y, U, V]` order.
    pub fn planes(&self) -> Result<[PlaneRef<'data>; 3], FrameError> {
        let bufs = self.buffers()?;
        // Bounds were proven during construction; a failure here would mean
        // the buffers shrank, which shared slices cannot do.
        let y = PlaneRef::new(self.layout.luma(), bufs.luma)?;
        let u = PlaneRef::new(self.layout.chroma_u(), bufs.chroma)?;
        let v = PlaneRef::new(self.layout.chroma_v(), bufs.chroma)?;
        Ok([y, u, v])
    }

    /// The luma plane view.
    pub fn y(&self) -> Result<PlaneRef<'data>, FrameError> {
        Ok(self.planes()?[0])
    }

    /// The U chroma plane view.
    pub fn u(&self) -> Result<PlaneRef<'data>, FrameError> {
        Ok(self.planes()?[1])
    }

    /// The V chroma plane view.
    pub fn v(&self) -> Result<PlaneRef<'data>, FrameError> {
        Ok(self.planes()?[2])
    }

    /// Sample the pixel at an image-relative position.
    ///
    /// Chroma is read at half resolution, rounding toward the origin.
    ///
    /// # Panics
    ///
    /// This method panics when the position lies outside the frame.
    pub fn yuv_at(&self, x: u32, y: u32) -> Result<Yuv, FrameError> {
        let [py, pu, pv] = self.planes()?;
        let (x, y) = (x as usize, y as usize);
        Ok(Yuv {
            y: py.sample(x, y),
            u: pu.sample(x / 2, y / 2),
            v: pv.sample(x / 2, y / 2),
        })
    }

    /// Release the plane views.
    ///
    /// The buffers themselves are caller-owned and unaffected. Afterwards
    /// every accessor reports [`FrameError::Closed`]. Closing twice is
    /// allowed and does nothing more.
    pub fn close(&mut self) {
        self.bufs = None;
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.bufs.is_none()
    }
}

/// A writable 4:2:0 frame over exclusively borrowed buffers.
///
/// This is the destination side of a copy. U and V may alias the same chroma
/// bytes, so mutable plane views are taken one at a time.
pub struct YuvFrameMut<'data> {
    layout: YuvLayout,
    timestamp: i64,
    luma: &'data mut [u8],
    chroma: &'data mut [u8],
}

impl<'data> YuvFrameMut<'data> {
    /// Compose a writable frame over a luma and a chroma buffer.
    ///
    /// The same fail-fast contract as [`YuvFrame::new`].
    pub fn new(
        geometry: FrameGeometry,
        mode: ChromaMode,
        timestamp: i64,
        luma: &'data mut [u8],
        chroma: &'data mut [u8],
    ) -> Result<Self, FrameError> {
        let layout = YuvLayout::new(geometry, mode)?;
        PlaneRef::new(layout.luma(), luma)?;
        PlaneRef::new(layout.chroma_u(), chroma)?;
        PlaneRef::new(layout.chroma_v(), chroma)?;

        Ok(YuvFrameMut {
            layout,
            timestamp,
            luma,
            chroma,
        })
    }

    /// Borrow this as a read-only frame.
    pub fn as_ref(&self) -> YuvFrame<'_> {
        YuvFrame {
            layout: self.layout,
            timestamp: self.timestamp,
            bufs: Some(Buffers {
                luma: &*self.luma,
                chroma: &*self.chroma,
            }),
        }
    }

    /// The mutable luma plane view.
    pub fn y_mut(&mut self) -> Result<PlaneMut<'_>, FrameError> {
        Ok(PlaneMut::new(self.layout.luma(), self.luma)?)
    }

    /// The mutable U chroma plane view.
    pub fn u_mut(&mut self) -> Result<PlaneMut<'_>, FrameError> {
        Ok(PlaneMut::new(self.layout.chroma_u(), self.chroma)?)
    }

    /// The mutable V chroma plane view.
    pub fn v_mut(&mut self) -> Result<PlaneMut<'_>, FrameError> {
        Ok(PlaneMut::new(self.layout.chroma_v(), self.chroma)?)
    }

    /// Copy the pixels from another frame.
    ///
    /// Proceeds plane by plane, row by row, each side walked through its own
    /// strides. The two frames may differ in backing array size, origin, and
    /// chroma arrangement; only the logical content transfers.
    ///
    /// # Panics
    ///
    /// This method panics when the logical dimensions differ.
    pub fn copy_from(&mut self, source: &YuvFrame<'_>) -> Result<(), FrameError> {
        let src = source.planes()?;
        let (ours, theirs) = (self.layout.geometry(), source.layout().geometry());
        assert!(
            ours.width == theirs.width && ours.height == theirs.height,
            "Mismatching frame dimensions."
        );

        self.y_mut()?.copy_from(&src[0]);
        self.u_mut()?.copy_from(&src[1]);
        self.v_mut()?.copy_from(&src[2]);
        Ok(())
    }
}

#[cfg(test)]
use crate::layout::Coord;

#[test]
fn closed_frames_fail_loudly() {
    let luma = [0u8; 16];
    let chroma = [0u8; 8];
    let mut frame = YuvFrame::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 4,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::SemiPlanar,
        7,
        &luma,
        &chroma,
    )
    .expect("Valid frame");

    assert_eq!(frame.format(), Ok(FrameFormat::Yuv420));
    assert_eq!(frame.timestamp(), Ok(7));
    assert!(frame.planes().is_ok());

    frame.close();
    assert!(frame.is_closed());
    assert_eq!(frame.planes().map(|_| ()), Err(FrameError::Closed));
    assert_eq!(frame.width(), Err(FrameError::Closed));
    assert_eq!(frame.timestamp(), Err(FrameError::Closed));
    assert_eq!(frame.yuv_at(0, 0), Err(FrameError::Closed));

    // A second close is fine.
    frame.close();
    assert!(frame.is_closed());
}

#[test]
fn construction_is_fail_fast() {
    let luma = [0u8; 16];
    let chroma = [0u8; 7];
    // The V view reaches one byte past a seven-byte chroma buffer.
    let err = YuvFrame::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 4,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::SemiPlanar,
        0,
        &luma,
        &chroma,
    )
    .map(|_| ())
    .unwrap_err();

    match err {
        FrameError::Plane(e) => {
            assert_eq!(e.kind(), crate::plane::BadPlaneKind::OutOfBounds)
        }
        other => panic!("expected a plane error, got {other:?}"),
    }
}

#[test]
fn sampling_reads_through_strides() {
    // A hand-built 4×2 semi-planar frame inside a 6-wide array.
    #[rustfmt::skip]
    let luma = [
        1u8, 2, 3, 4, 0, 0,
        5,   6, 7, 8, 0, 0,
    ];
    #[rustfmt::skip]
    let chroma = [
        20u8, 30, 21, 31, 0, 0,
    ];

    let frame = YuvFrame::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 4,
            height: 2,
            array_width: 6,
            array_height: 2,
        },
        ChromaMode::SemiPlanar,
        0,
        &luma,
        &chroma,
    )
    .unwrap();

    assert_eq!(frame.yuv_at(0, 0), Ok(Yuv { y: 1, u: 20, v: 30 }));
    assert_eq!(frame.yuv_at(3, 1), Ok(Yuv { y: 8, u: 21, v: 31 }));
    assert_eq!(frame.u().unwrap().sample(1, 0), 21);
    assert_eq!(frame.v().unwrap().sample(1, 0), 31);
}

#[test]
fn copy_across_arrangements() {
    // Semi-planar source, packed planar destination.
    #[rustfmt::skip]
    let luma = [
        1u8, 2, 3, 4,
        5,   6, 7, 8,
        9,  10, 11, 12,
        13, 14, 15, 16,
    ];
    let chroma = [40u8, 50, 41, 51, 42, 52, 43, 53];

    let geometry = FrameGeometry {
        origin: Coord(0, 0),
        width: 4,
        height: 4,
        array_width: 4,
        array_height: 4,
    };
    let src = YuvFrame::new(geometry, ChromaMode::SemiPlanar, 0, &luma, &chroma).unwrap();

    let mut dst_luma = [0u8; 16];
    let mut dst_chroma = [0u8; 8];
    let mut dst = YuvFrameMut::new(
        geometry,
        ChromaMode::Planar,
        0,
        &mut dst_luma,
        &mut dst_chroma,
    )
    .unwrap();

    dst.copy_from(&src).unwrap();
    assert_eq!(dst.as_ref().yuv_at(0, 0), Ok(Yuv { y: 1, u: 40, v: 50 }));
    assert_eq!(dst.as_ref().yuv_at(3, 3), Ok(Yuv { y: 16, u: 43, v: 53 }));
    drop(dst);

    assert_eq!(dst_luma, luma);
    // U samples first, then the V quarter array.
    assert_eq!(dst_chroma, [40, 41, 42, 43, 50, 51, 52, 53]);
}
