//! 4:2:0 frame geometry.
//!
//! Derives the per-plane offsets and strides for a logical sub-rectangle of
//! two backing arrays, one holding luma and one holding chroma, in either
//! chroma arrangement. All divisions are floor divisions: chroma coordinates
//! round toward the origin, matching the convention of the surrounding pixel
//! formats. That rounding is deliberate policy, not an artifact.
use crate::plane::{BadPlaneError, PlaneLayout, PlaneSpec};

/// A position of the backing array, in samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord(pub u32, pub u32);

impl Coord {
    pub fn x(self) -> u32 {
        self.0
    }

    pub fn y(self) -> u32 {
        self.1
    }

    pub fn xy(self) -> (u32, u32) {
        (self.0, self.1)
    }
}

/// How the two chroma planes share their backing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChromaMode {
    /// U and V interleave in one region. Each view steps two bytes per
    /// sample and the V view begins one byte after the U view.
    SemiPlanar,
    /// U and V occupy disjoint regions. The V region follows a full quarter
    /// array of U samples, and each view steps one byte per sample.
    Planar,
}

/// A logical sub-rectangle of a larger backing array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    /// Top-left corner of the image inside the backing arrays.
    pub origin: Coord,
    /// Logical width in luma samples.
    pub width: u32,
    /// Logical height in luma samples.
    pub height: u32,
    /// Width of the full backing arrays.
    pub array_width: u32,
    /// Height of the full backing arrays.
    pub array_height: u32,
}

/// The validated plane layouts of one 4:2:0 frame.
///
/// Construction derives all three plane descriptions up front, so holding a
/// value of this type certifies that the geometry is internally consistent.
/// Whether the backing buffers are large enough is checked when views are
/// taken over them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YuvLayout {
    geometry: FrameGeometry,
    mode: ChromaMode,
    luma: PlaneLayout,
    chroma_u: PlaneLayout,
    chroma_v: PlaneLayout,
}

impl YuvLayout {
    /// Derive the plane layouts for a geometry and chroma arrangement.
    ///
    /// Fails when the image rectangle leaves the backing array, or when a
    /// dimension is smaller than two. The subsampled chroma of a one-sample
    /// row or column would be empty, so such frames are rejected rather than
    /// described.
    pub fn new(geometry: FrameGeometry, mode: ChromaMode) -> Result<Self, BadPlaneError> {
        let FrameGeometry {
            origin,
            width,
            height,
            array_width,
            array_height,
        } = geometry;

        if width < 2 || height < 2 {
            return Err(BadPlaneError::invalid_geometry());
        }
        if u64::from(origin.x()) + u64::from(width) > u64::from(array_width)
            || u64::from(origin.y()) + u64::from(height) > u64::from(array_height)
        {
            return Err(BadPlaneError::invalid_geometry());
        }

        let (ox, oy) = (origin.x() as usize, origin.y() as usize);
        let (w, h) = (width as usize, height as usize);
        let (aw, ah) = (array_width as usize, array_height as usize);

        let luma_offset = mul_add(oy, aw, ox)?;
        let luma = PlaneLayout::new(PlaneSpec {
            width: w,
            height: h,
            row_stride: aw,
            pixel_stride: 1,
            offset: luma_offset,
        })?;

        let (cw, ch) = (w / 2, h / 2);
        let (chroma_u, chroma_v) = match mode {
            ChromaMode::SemiPlanar => {
                let base = mul_add(oy / 2, aw, (ox / 2) * 2)?;
                let u = PlaneLayout::new(PlaneSpec {
                    width: cw,
                    height: ch,
                    row_stride: aw,
                    pixel_stride: 2,
                    offset: base,
                })?;
                let v = PlaneLayout::new(PlaneSpec {
                    offset: base + 1,
                    ..u.spec()
                })?;
                (u, v)
            }
            ChromaMode::Planar => {
                let caw = aw / 2;
                let u_offset = mul_add(oy / 2, caw, ox / 2)?;
                let v_offset = u_offset
                    .checked_add(caw * (ah / 2))
                    .ok_or_else(BadPlaneError::invalid_geometry)?;
                let u = PlaneLayout::new(PlaneSpec {
                    width: cw,
                    height: ch,
                    row_stride: caw,
                    pixel_stride: 1,
                    offset: u_offset,
                })?;
                let v = PlaneLayout::new(PlaneSpec {
                    offset: v_offset,
                    ..u.spec()
                })?;
                (u, v)
            }
        };

        Ok(YuvLayout {
            geometry,
            mode,
            luma,
            chroma_u,
            chroma_v,
        })
    }

    /// The geometry this layout was derived from.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// The chroma arrangement of this layout.
    pub fn mode(&self) -> ChromaMode {
        self.mode
    }

    /// The luma plane description.
    pub fn luma(&self) -> PlaneLayout {
        self.luma
    }

    /// The U chroma plane description.
    pub fn chroma_u(&self) -> PlaneLayout {
        self.chroma_u
    }

    /// The V chroma plane description.
    pub fn chroma_v(&self) -> PlaneLayout {
        self.chroma_v
    }

    /// Minimal luma buffer capacity this layout can be viewed over.
    pub fn luma_span(&self) -> usize {
        self.luma.end()
    }

    /// Minimal chroma buffer capacity this layout can be viewed over.
    pub fn chroma_span(&self) -> usize {
        self.chroma_u.end().max(self.chroma_v.end())
    }
}

fn mul_add(a: usize, b: usize, c: usize) -> Result<usize, BadPlaneError> {
    a.checked_mul(b)
        .and_then(|v| v.checked_add(c))
        .ok_or_else(BadPlaneError::invalid_geometry)
}

#[test]
fn semi_planar_offsets() {
    let layout = YuvLayout::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 4,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::SemiPlanar,
    )
    .expect("Valid layout");

    let (u, v) = (layout.chroma_u(), layout.chroma_v());
    assert_eq!(u.pixel_stride(), 2);
    assert_eq!(v.pixel_stride(), 2);
    assert_eq!(v.offset(), u.offset() + 1);
    assert_eq!(u.width(), 2);
    assert_eq!(u.height(), 2);
    assert_eq!(u.row_stride(), 4);
}

#[test]
fn planar_offsets() {
    let layout = YuvLayout::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 4,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::Planar,
    )
    .expect("Valid layout");

    let (u, v) = (layout.chroma_u(), layout.chroma_v());
    assert_eq!(u.pixel_stride(), 1);
    assert_eq!(v.pixel_stride(), 1);
    assert_eq!(v.offset() - u.offset(), (4 / 2) * (4 / 2));
    assert_eq!(u.row_stride(), 2);
}

#[test]
fn origin_rounds_toward_zero() {
    // An odd origin addresses the chroma sample containing it.
    let layout = YuvLayout::new(
        FrameGeometry {
            origin: Coord(3, 5),
            width: 4,
            height: 4,
            array_width: 16,
            array_height: 16,
        },
        ChromaMode::SemiPlanar,
    )
    .unwrap();

    assert_eq!(layout.luma().offset(), 5 * 16 + 3);
    assert_eq!(layout.chroma_u().offset(), 2 * 16 + 2);
    assert_eq!(layout.chroma_v().offset(), 2 * 16 + 3);

    let layout = YuvLayout::new(
        FrameGeometry {
            origin: Coord(3, 5),
            width: 4,
            height: 4,
            array_width: 16,
            array_height: 16,
        },
        ChromaMode::Planar,
    )
    .unwrap();

    assert_eq!(layout.chroma_u().offset(), 2 * 8 + 1);
    assert_eq!(layout.chroma_v().offset(), 2 * 8 + 1 + 8 * 8);
}

#[test]
fn odd_dimensions_floor() {
    // 4:2:0 halves round down, so a 5×5 image has 2×2 chroma.
    let layout = YuvLayout::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 5,
            height: 5,
            array_width: 6,
            array_height: 6,
        },
        ChromaMode::Planar,
    )
    .unwrap();

    assert_eq!(layout.luma().width(), 5);
    assert_eq!(layout.chroma_u().width(), 2);
    assert_eq!(layout.chroma_u().height(), 2);
    assert_eq!(layout.chroma_v().width(), 2);
}

#[test]
fn rectangle_must_fit_the_array() {
    let err = YuvLayout::new(
        FrameGeometry {
            origin: Coord(2, 0),
            width: 4,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::Planar,
    )
    .unwrap_err();
    assert_eq!(err.kind(), crate::plane::BadPlaneKind::InvalidGeometry);

    let err = YuvLayout::new(
        FrameGeometry {
            origin: Coord(0, 0),
            width: 1,
            height: 4,
            array_width: 4,
            array_height: 4,
        },
        ChromaMode::SemiPlanar,
    )
    .unwrap_err();
    assert_eq!(err.kind(), crate::plane::BadPlaneKind::InvalidGeometry);
}
