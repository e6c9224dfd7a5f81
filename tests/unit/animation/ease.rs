use super::*;

const ALL_BUILTIN: [Ease; 7] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
];

#[test]
fn builtin_curves_hit_endpoints_exactly() {
    for ease in ALL_BUILTIN {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
        ease.validate_terminates().unwrap();
    }
}

#[test]
fn progress_is_clamped() {
    assert_eq!(Ease::Linear.apply(1.7), 1.0);
    assert_eq!(Ease::InCubic.apply(-0.5), 0.0);
}

#[test]
fn in_out_cubic_is_symmetric_at_midpoint() {
    assert!((Ease::InOutCubic.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn custom_curve_is_applied_and_checked() {
    fn square(t: f64) -> f64 {
        t * t
    }
    fn stalls(t: f64) -> f64 {
        t * 0.5
    }
    assert_eq!(Ease::Custom(square).apply(0.5), 0.25);
    assert!(Ease::Custom(square).validate_terminates().is_ok());
    assert!(Ease::Custom(stalls).validate_terminates().is_err());
}

#[test]
fn lerp_truncates_toward_zero() {
    assert_eq!(lerp_i32(0, 10, 0.55), 5);
    assert_eq!(lerp_i32(0, -10, 0.55), -5);
    assert_eq!(lerp_i32(-1034, 0, 1.0), 0);
    assert_eq!(lerp_i32(7, -1034, 0.0), 7);
}
