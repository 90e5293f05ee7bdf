use flex_yuv::{
    checksum, error_rms, psnr, ChromaMode, Coord, FrameBuffer, FrameError, Yuv,
};

fn reference_scene(mode: ChromaMode) -> FrameBuffer {
    let mut scene = FrameBuffer::new(64, 48, mode).expect("Valid backing size");
    scene.fill_reference();
    scene
}

#[test]
fn copy_preserves_digests_across_strides() {
    let scene = reference_scene(ChromaMode::SemiPlanar);
    let source = scene.frame(Coord(6, 10), 16, 16, 0).unwrap();

    // A packed destination of the same logical size, different array.
    let mut target = FrameBuffer::new(16, 16, ChromaMode::SemiPlanar).unwrap();
    {
        let mut frame = target.frame_mut(Coord(0, 0), 16, 16, 0).unwrap();
        frame.copy_from(&source).unwrap();
    }

    let copied = target.frame(Coord(0, 0), 16, 16, 0).unwrap();
    assert_eq!(checksum(&source).unwrap(), checksum(&copied).unwrap());
    assert_eq!(error_rms(&source, &copied).unwrap(), 0.0);
    assert_eq!(psnr(&source, &copied).unwrap(), f64::INFINITY);
}

#[test]
fn copy_preserves_digests_across_arrangements() {
    let scene = reference_scene(ChromaMode::SemiPlanar);
    let source = scene.frame(Coord(4, 4), 24, 20, 0).unwrap();

    let mut target = FrameBuffer::new(32, 24, ChromaMode::Planar).unwrap();
    {
        let mut frame = target.frame_mut(Coord(2, 2), 24, 20, 0).unwrap();
        frame.copy_from(&source).unwrap();
    }

    // Same pixels, entirely different physical layout.
    let copied = target.frame(Coord(2, 2), 24, 20, 0).unwrap();
    assert_eq!(checksum(&source).unwrap(), checksum(&copied).unwrap());
}

#[test]
fn moving_origin_changes_the_picture() {
    let scene = reference_scene(ChromaMode::Planar);

    let first = scene.frame(Coord(0, 0), 16, 16, 0).unwrap();
    let second = scene.frame(Coord(8, 2), 16, 16, 1).unwrap();

    assert_ne!(checksum(&first).unwrap(), checksum(&second).unwrap());
    assert!(error_rms(&first, &second).unwrap() > 0.0);
}

#[test]
fn crops_read_the_scene_at_their_origin() {
    let scene = reference_scene(ChromaMode::SemiPlanar);
    let frame = scene.frame(Coord(10, 20), 8, 8, 0).unwrap();

    // The crop's first pixel is the scene's pixel at the origin.
    assert_eq!(
        frame.yuv_at(0, 0).unwrap(),
        Yuv {
            y: 10 + 20,
            u: 20 / 2,
            v: 10 / 2,
        }
    );

    // Timestamps pass through untouched.
    assert_eq!(frame.timestamp(), Ok(0));
}

#[test]
fn frames_agree_with_their_mutable_counterparts() {
    let mut scene = reference_scene(ChromaMode::Planar);
    let before = checksum(&scene.frame(Coord(0, 0), 32, 32, 0).unwrap()).unwrap();

    // A mutable borrow of the same crop reads the same bytes.
    let frame = scene.frame_mut(Coord(0, 0), 32, 32, 0).unwrap();
    assert_eq!(checksum(&frame.as_ref()).unwrap(), before);
}

#[test]
fn closing_a_frame_ends_all_access() {
    let scene = reference_scene(ChromaMode::SemiPlanar);
    let mut frame = scene.frame(Coord(0, 0), 16, 16, 42).unwrap();

    assert_eq!(frame.timestamp(), Ok(42));
    frame.close();

    assert_eq!(frame.planes().map(|_| ()), Err(FrameError::Closed));
    assert_eq!(checksum(&frame), Err(FrameError::Closed));
}

#[test]
fn oversized_crops_are_rejected() {
    let scene = reference_scene(ChromaMode::Planar);
    assert!(scene.frame(Coord(60, 0), 16, 16, 0).is_err());
    assert!(scene.frame(Coord(0, 40), 16, 16, 0).is_err());
}
