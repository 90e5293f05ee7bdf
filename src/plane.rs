//! Byte-based, strided views of single image planes.
//!
//! This is the base unit below any frame composition. A plane is a rectangle
//! of one-byte samples addressed through a row stride and a pixel stride, so
//! the same accessors serve packed rows, padded rows, and interleaved chroma
//! alike. The result of any walk is as if visiting samples row-for-row and
//! column-by-column, except where otherwise noted.
//!
//! The reference types do not rely on a container and can be constructed over
//! any byte slice. A view is bounded: it exposes exactly the bytes reachable
//! by valid `(row, column)` indexing and nothing past them, even when the row
//! stride pads rows beyond their logical width.
use core::fmt;
use core::ops::Range;

/// A simple description of one plane as a strided byte rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneSpec {
    /// The number of samples in width direction.
    pub width: usize,
    /// The number of samples in height direction.
    pub height: usize,
    /// The number of bytes to go one sample along the height.
    pub row_stride: usize,
    /// The number of bytes to go one sample along the width.
    ///
    /// A stride larger than one indicates samples of another channel between
    /// consecutive samples of this one.
    pub pixel_stride: usize,
    /// Offset of this plane from the start of its backing buffer.
    pub offset: usize,
}

/// A validated plane description.
///
/// The invariants are that every `(row, column)` index addresses a byte
/// within the recorded length, and that the length is tight: it ends one past
/// the last reachable sample. Padding past the final sample of the final row
/// is never exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneLayout {
    spec: PlaneSpec,
    /// The number of reachable bytes, computed once during validation.
    len: usize,
}

/// Error that occurs when a [`PlaneSpec`] does not describe a usable view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BadPlaneError {
    kind: BadPlaneKind,
}

/// The failure classes of plane and frame construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BadPlaneKind {
    /// A dimension or stride was zero, rows would overlap their own samples,
    /// or the described region is not addressable on this architecture.
    InvalidGeometry,
    /// The described region extends past the end of the backing buffer.
    OutOfBounds,
}

/// A read-only view of one plane of a shared byte buffer.
#[derive(Clone, Copy, Debug)]
pub struct PlaneRef<'data> {
    layout: PlaneLayout,
    data: &'data [u8],
}

/// A mutable view of one plane of an exclusively borrowed byte buffer.
///
/// Writes go through the same strided addressing as reads, so a view whose
/// pixel stride interleaves it with another channel touches only its own
/// sample positions and leaves the foreign bytes in between untouched.
pub struct PlaneMut<'data> {
    layout: PlaneLayout,
    data: &'data mut [u8],
}

impl PlaneSpec {
    /// Compare logical sizes without taking into account offset or strides.
    fn matches(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    fn has_contiguous_rows(&self) -> bool {
        self.pixel_stride == 1
    }

    /// Bytes reachable by valid indexing, one past the last sample.
    fn reachable_len(&self) -> Option<usize> {
        let max_h_offset = (self.height - 1).checked_mul(self.row_stride)?;
        let max_w_offset = (self.width - 1).checked_mul(self.pixel_stride)?;
        max_h_offset.checked_add(max_w_offset)?.checked_add(1)
    }
}

impl PlaneLayout {
    /// Try to create a new layout from a specification.
    ///
    /// This fails if the specification does not describe a valid plane: a
    /// zero dimension or stride, a row stride too small to hold a full row of
    /// samples, or a region not expressible in memory on the current
    /// architecture.
    pub fn new(spec: PlaneSpec) -> Result<Self, BadPlaneError> {
        if spec.width == 0 || spec.height == 0 || spec.pixel_stride == 0 {
            return Err(BadPlaneError::invalid_geometry());
        }

        let row_bytes = spec
            .width
            .checked_mul(spec.pixel_stride)
            .ok_or_else(BadPlaneError::invalid_geometry)?;
        if spec.row_stride < row_bytes {
            return Err(BadPlaneError::invalid_geometry());
        }

        let len = spec
            .reachable_len()
            .ok_or_else(BadPlaneError::invalid_geometry)?;
        // The past-the-end position must be addressable as well.
        if spec.offset.checked_add(len).is_none() {
            return Err(BadPlaneError::invalid_geometry());
        }

        Ok(PlaneLayout { spec, len })
    }

    /// Get the specification of this plane.
    pub fn spec(&self) -> PlaneSpec {
        self.spec
    }

    /// The number of samples in width direction.
    pub fn width(&self) -> usize {
        self.spec.width
    }

    /// The number of samples in height direction.
    pub fn height(&self) -> usize {
        self.spec.height
    }

    /// The number of bytes between the starts of consecutive rows.
    pub fn row_stride(&self) -> usize {
        self.spec.row_stride
    }

    /// The number of bytes between consecutive samples of a row.
    pub fn pixel_stride(&self) -> usize {
        self.spec.pixel_stride
    }

    /// Offset of the view within its backing buffer.
    pub fn offset(&self) -> usize {
        self.spec.offset
    }

    /// The number of bytes the view exposes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// One past the last backing-buffer byte the view reaches.
    pub fn end(&self) -> usize {
        // Checked during construction.
        self.spec.offset + self.len
    }

    fn matches(&self, other: &Self) -> bool {
        self.spec.matches(&other.spec)
    }

    fn has_contiguous_rows(&self) -> bool {
        self.spec.has_contiguous_rows()
    }

    /// Position of a sample relative to the start of the view.
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.spec.width && y < self.spec.height, "Sample outside plane.");
        y * self.spec.row_stride + x * self.spec.pixel_stride
    }

    /// The reachable span of one row relative to the start of the view.
    fn row(&self, y: usize) -> Range<usize> {
        assert!(y < self.spec.height, "Row outside plane.");
        let start = y * self.spec.row_stride;
        let len = (self.spec.width - 1) * self.spec.pixel_stride + 1;
        start..start + len
    }
}

impl<'data> PlaneRef<'data> {
    /// View bytes of a buffer under a plane layout.
    ///
    /// Fails with an out-of-bounds error when the buffer is too short for the
    /// described region. The view references the buffer, it does not copy.
    pub fn new(layout: PlaneLayout, buffer: &'data [u8]) -> Result<Self, BadPlaneError> {
        let data = buffer
            .get(layout.offset()..layout.end())
            .ok_or_else(BadPlaneError::out_of_bounds)?;
        Ok(PlaneRef { layout, data })
    }

    /// Get the layout of this view.
    pub fn layout(&self) -> PlaneLayout {
        self.layout
    }

    /// The number of samples in width direction.
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    /// The number of samples in height direction.
    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// The number of bytes between the starts of consecutive rows.
    pub fn row_stride(&self) -> usize {
        self.layout.row_stride()
    }

    /// The number of bytes between consecutive samples of a row.
    pub fn pixel_stride(&self) -> usize {
        self.layout.pixel_stride()
    }

    /// The bounded byte window of this plane.
    pub fn as_bytes(&self) -> &'data [u8] {
        self.data
    }

    /// Read the sample at a column and row.
    ///
    /// # Panics
    ///
    /// This method panics when the position lies outside the plane.
    pub fn sample(&self, x: usize, y: usize) -> u8 {
        self.data[self.layout.index(x, y)]
    }

    /// The reachable bytes of one row.
    ///
    /// For a pixel stride of one this is exactly the row's samples. For wider
    /// strides the span ends on the row's last sample and interleaves foreign
    /// bytes, which callers skip by stepping at the pixel stride.
    ///
    /// # Panics
    ///
    /// This method panics when the row lies outside the plane.
    pub fn row_bytes(&self, y: usize) -> &'data [u8] {
        &self.data[self.layout.row(y)]
    }
}

impl<'data> PlaneMut<'data> {
    /// View bytes of a buffer mutably under a plane layout.
    ///
    /// The same bounds contract as [`PlaneRef::new`].
    pub fn new(layout: PlaneLayout, buffer: &'data mut [u8]) -> Result<Self, BadPlaneError> {
        let data = buffer
            .get_mut(layout.offset()..layout.end())
            .ok_or_else(BadPlaneError::out_of_bounds)?;
        Ok(PlaneMut { layout, data })
    }

    /// Get the layout of this view.
    pub fn layout(&self) -> PlaneLayout {
        self.layout
    }

    /// Write the sample at a column and row.
    ///
    /// # Panics
    ///
    /// This method panics when the position lies outside the plane.
    pub fn write_sample(&mut self, x: usize, y: usize, value: u8) {
        self.data[self.layout.index(x, y)] = value;
    }

    /// Write every logical sample from a function of its column and row.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> u8) {
        for y in 0..self.layout.height() {
            for x in 0..self.layout.width() {
                self.data[self.layout.index(x, y)] = f(x, y);
            }
        }
    }

    /// Copy the samples from another plane.
    ///
    /// The source must have the same logical width and height; offsets and
    /// strides of the two sides are free to differ and each side is walked
    /// through its own.
    ///
    /// # Panics
    ///
    /// This method panics when the logical dimensions differ.
    pub fn copy_from(&mut self, source: &PlaneRef<'_>) {
        assert!(
            self.layout.matches(&source.layout),
            "Mismatching plane dimensions."
        );

        if self.layout.has_contiguous_rows() && source.layout.has_contiguous_rows() {
            for y in 0..self.layout.height() {
                let into = self.layout.row(y);
                self.data[into].copy_from_slice(source.row_bytes(y));
            }
            return;
        }

        for y in 0..self.layout.height() {
            for x in 0..self.layout.width() {
                self.data[self.layout.index(x, y)] = source.sample(x, y);
            }
        }
    }

    /// Borrow this as a read-only view.
    pub fn as_ref(&self) -> PlaneRef<'_> {
        PlaneRef {
            layout: self.layout,
            data: &*self.data,
        }
    }

    /// Convert this into a read-only view.
    pub fn into_ref(self) -> PlaneRef<'data> {
        PlaneRef {
            layout: self.layout,
            data: self.data,
        }
    }
}

impl BadPlaneError {
    pub(crate) fn invalid_geometry() -> Self {
        BadPlaneError {
            kind: BadPlaneKind::InvalidGeometry,
        }
    }

    pub(crate) fn out_of_bounds() -> Self {
        BadPlaneError {
            kind: BadPlaneKind::OutOfBounds,
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> BadPlaneKind {
        self.kind
    }
}

impl fmt::Display for BadPlaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BadPlaneKind::InvalidGeometry => f.write_str("plane geometry is invalid"),
            BadPlaneKind::OutOfBounds => f.write_str("plane exceeds its backing buffer"),
        }
    }
}

impl core::error::Error for BadPlaneError {}

#[test]
fn geometry_validation() {
    // Setup a good base specification.
    let spec = PlaneSpec {
        width: 4,
        height: 3,
        row_stride: 6,
        pixel_stride: 1,
        offset: 0,
    };
    let layout = PlaneLayout::new(spec).expect("Valid plane");
    assert_eq!(layout.len(), 2 * 6 + 3 + 1);

    let zero_width = PlaneSpec { width: 0, ..spec };
    let err = PlaneLayout::new(zero_width).unwrap_err();
    assert_eq!(err.kind(), BadPlaneKind::InvalidGeometry);

    let zero_pitch = PlaneSpec {
        pixel_stride: 0,
        ..spec
    };
    assert!(PlaneLayout::new(zero_pitch).is_err());

    // Rows of four two-byte samples do not fit a stride of six.
    let overlapping = PlaneSpec {
        pixel_stride: 2,
        ..spec
    };
    let err = PlaneLayout::new(overlapping).unwrap_err();
    assert_eq!(err.kind(), BadPlaneKind::InvalidGeometry);
}

#[test]
fn view_is_tight() {
    // A padded row stride must not leak the padding of the final row.
    let spec = PlaneSpec {
        width: 2,
        height: 2,
        row_stride: 4,
        pixel_stride: 1,
        offset: 1,
    };
    let layout = PlaneLayout::new(spec).expect("Valid plane");
    assert_eq!(layout.len(), 6);

    let buffer = [0xAAu8, 1, 2, 0xAA, 0xAA, 5, 6, 0xAA];
    let plane = PlaneRef::new(layout, &buffer).expect("Buffer long enough");
    assert_eq!(plane.as_bytes(), &buffer[1..7]);
    assert_eq!(plane.sample(0, 0), 1);
    assert_eq!(plane.sample(1, 1), 6);

    // One byte short of the reachable region.
    let err = PlaneRef::new(layout, &buffer[..6]).unwrap_err();
    assert_eq!(err.kind(), BadPlaneKind::OutOfBounds);

    // Exactly the reachable region is enough.
    assert!(PlaneRef::new(layout, &buffer[..7]).is_ok());
}

#[test]
fn interleaved_rows() {
    // Two interleaved channels sharing four-byte rows, as chroma does.
    let spec = PlaneSpec {
        width: 2,
        height: 2,
        row_stride: 4,
        pixel_stride: 2,
        offset: 0,
    };
    let layout = PlaneLayout::new(spec).expect("Valid plane");
    let buffer = [10u8, 11, 12, 13, 14, 15, 16, 17];

    let plane = PlaneRef::new(layout, &buffer).unwrap();
    assert_eq!(plane.sample(1, 0), 12);
    assert_eq!(plane.sample(0, 1), 14);
    // The row span ends on the last sample.
    assert_eq!(plane.row_bytes(0), &[10, 11, 12]);
}

#[test]
fn plane_copies() {
    let packed = PlaneLayout::new(PlaneSpec {
        width: 3,
        height: 2,
        row_stride: 3,
        pixel_stride: 1,
        offset: 0,
    })
    .unwrap();
    let padded = PlaneLayout::new(PlaneSpec {
        width: 3,
        height: 2,
        row_stride: 5,
        pixel_stride: 1,
        offset: 0,
    })
    .unwrap();
    let interleaved = PlaneLayout::new(PlaneSpec {
        width: 3,
        height: 2,
        row_stride: 6,
        pixel_stride: 2,
        offset: 0,
    })
    .unwrap();

    let src = [1u8, 2, 3, 4, 5, 6];
    let src = PlaneRef::new(packed, &src).unwrap();

    let mut out = [0u8; 9];
    let mut dst = PlaneMut::new(padded, &mut out).unwrap();
    dst.copy_from(&src);
    assert_eq!(out, [1, 2, 3, 0, 0, 4, 5, 6, 0]);

    let mut out = [0u8; 11];
    let mut dst = PlaneMut::new(interleaved, &mut out).unwrap();
    dst.copy_from(&src);
    // Samples land on even positions, the bytes in between stay untouched.
    assert_eq!(out, [1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6]);
}

#[test]
fn fill_and_readback() {
    let layout = PlaneLayout::new(PlaneSpec {
        width: 4,
        height: 4,
        row_stride: 7,
        pixel_stride: 1,
        offset: 2,
    })
    .unwrap();

    let mut out = [0u8; 32];
    let mut plane = PlaneMut::new(layout, &mut out).unwrap();
    plane.fill_with(|x, y| (16 * y + x) as u8);

    let plane = plane.into_ref();
    assert_eq!(plane.sample(3, 0), 3);
    assert_eq!(plane.sample(0, 3), 48);
    assert_eq!(plane.row_bytes(1), &[16, 17, 18, 19]);
}
