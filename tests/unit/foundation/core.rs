use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert!((fps.frames_to_secs(60) - 2.0).abs() < 1e-12);
}

#[test]
fn canvas_validation() {
    assert!(Canvas::default().validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .validate()
        .is_err()
    );
}

#[test]
fn premultiply_rounds() {
    assert_eq!(Rgba8::WHITE.premultiplied(), [255, 255, 255, 255]);
    assert_eq!(Rgba8::rgba(255, 0, 100, 0).premultiplied(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::rgba(255, 128, 0, 128).premultiplied(), [128, 64, 0, 128]);
}

#[test]
fn offsets_add_componentwise() {
    let a = Offset3::new(1, -2, 3);
    let b = Offset3::new(10, 20, -30);
    assert_eq!(a + b, Offset3::new(11, 18, -27));
}

#[test]
fn ensure_positive_rejects_out_of_domain() {
    assert!(ensure_positive("d", 0.0).is_err());
    assert!(ensure_positive("d", -1.0).is_err());
    assert!(ensure_positive("d", f64::NAN).is_err());
    assert_eq!(ensure_positive("d", 0.5).unwrap(), 0.5);
}
