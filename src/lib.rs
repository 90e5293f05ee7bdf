// Distributed under The MIT License (MIT)
//
// Copyright (c) 2026 The `flex-yuv` developers
//! # Flexible YUV
//!
//! Strided plane views and 4:2:0 frame composition over caller-owned byte
//! buffers.
//!
//! A video pipeline rarely hands out tightly packed pixels. Between a capture
//! path and a codec there exist many valid but competing buffer shapes:
//!
//! - A reader that produces packed planar frames with stride equal to width.
//! - A decoder that emits semi-planar chroma with two-byte pixel strides.
//! - A camera crop addressed by an origin inside a padded sensor array.
//! - A consumer that compares any two of the above sample-for-sample.
//!
//! This crate offers the language to describe all of them through one set of
//! stride-aware accessors. Views never copy and never own: they are bounded
//! windows over buffers the caller allocated, and all addressing is index
//! arithmetic on slices.
//!
//! ## Usage
//!
//! ```
//! use flex_yuv::{checksum, ChromaMode, Coord, FrameBuffer};
//!
//! let mut scene = FrameBuffer::new(32, 32, ChromaMode::SemiPlanar).unwrap();
//! scene.fill_reference();
//!
//! // Borrow a cropped 16×16 frame two rows and columns into the array.
//! let frame = scene.frame(Coord(2, 2), 16, 16, 0).unwrap();
//! let planes = frame.planes().unwrap();
//!
//! // Chroma samples interleave, so the U plane steps two bytes at a time.
//! assert_eq!(planes[1].pixel_stride(), 2);
//!
//! let digest = checksum(&frame).unwrap();
//! # let _ = digest;
//! ```
// Be std for doctests, avoids a weird warning about missing allocator.
#![cfg_attr(not(doctest), no_std)]
#![forbid(unsafe_code)]
extern crate alloc;

mod buffer;
mod checksum;
mod frame;
pub mod layout;
pub mod plane;

pub use self::buffer::FrameBuffer;
pub use self::checksum::{checksum, error_rms, psnr};
pub use self::frame::{FrameError, FrameFormat, Yuv, YuvFrame, YuvFrameMut};
pub use self::layout::{ChromaMode, Coord, FrameGeometry, YuvLayout};
pub use self::plane::{BadPlaneError, BadPlaneKind, PlaneLayout, PlaneMut, PlaneRef, PlaneSpec};
