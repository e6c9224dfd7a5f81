use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let mut dst = vec![0u8; 4];
    flatten_over_bg(&mut dst, &[0, 0, 0, 0], true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_over_bg(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_alpha_premultiplies_first() {
    let mut dst = vec![0u8; 4];
    flatten_over_bg(&mut dst, &[255, 0, 0, 128], false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_over_bg(&mut dst, &[0, 0, 0, 0], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn odd_sizes_are_rejected_for_yuv420p() {
    assert!(check_even_size(256, 192).is_ok());
    assert!(matches!(
        check_even_size(255, 192),
        Err(ReelError::Validation(_))
    ));
    assert!(check_even_size(0, 2).is_err());
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(ReelError::Evaluation(_))
    ));
}

#[test]
fn encode_png_sequence_requires_frames() {
    let dir = crate::test_support::temp_dir("ffmpeg_empty_seq");
    let err = encode_png_sequence(&dir, Fps::default(), &dir.join("out.mp4")).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    std::fs::remove_dir_all(dir).ok();
}
