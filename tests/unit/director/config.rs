use super::*;

#[test]
fn defaults_validate() {
    let cfg = DirectorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas, Canvas::default());
    assert_eq!(cfg.fps, Fps { num: 30, den: 1 });
    assert_eq!(cfg.camera_x(Side::Right), -1034);
    assert!(cfg.palette.contains_key("orange"));
}

#[test]
fn json_overrides_only_listed_fields() {
    let cfg = DirectorConfig::from_json_str(
        r#"{
            "fps": { "num": 60, "den": 1 },
            "stage": { "font": "fonts/ace.ttf" },
            "palette": { "red": { "r": 255, "g": 0, "b": 0, "a": 255 } }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps.num, 60);
    assert_eq!(cfg.stage.font.as_deref(), Some("fonts/ace.ttf"));
    assert_eq!(cfg.stage.arrow, StageConfig::default().arrow);
    assert_eq!(cfg.palette.len(), 1);
    assert_eq!(cfg.chars_per_second, 30.0);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = DirectorConfig::from_json_str(r#"{ "frame_rate": 30 }"#).unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)), "{err}");
}

#[test]
fn out_of_domain_values_are_rejected() {
    let cases: [fn(&mut DirectorConfig); 7] = [
        |c| c.fps.den = 0,
        |c| c.canvas.width = 0,
        |c| c.chars_per_second = -5.0,
        |c| c.post_reveal_hold_secs = 0.0,
        |c| c.pan_secs = f64::NAN,
        |c| c.blip_loop_delay_secs = -0.1,
        |c| c.max_frames = 0,
    ];
    for mutate in cases {
        let mut cfg = DirectorConfig::default();
        mutate(&mut cfg);
        assert!(
            matches!(cfg.validate(), Err(ReelError::Validation(_))),
            "{cfg:?} should be rejected"
        );
    }
}

#[test]
fn json_round_trips() {
    let cfg = DirectorConfig::default();
    let s = serde_json::to_string(&cfg).unwrap();
    assert_eq!(DirectorConfig::from_json_str(&s).unwrap(), cfg);
}
