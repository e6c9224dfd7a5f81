use super::*;

fn raw(name: &str, args: &[&str]) -> RawDirective {
    RawDirective {
        name: name.to_owned(),
        args: args.iter().map(|s| (*s).to_owned()).collect(),
    }
}

#[test]
fn decodes_known_directives() {
    assert_eq!(
        Directive::parse(&raw("wait", &["0.8"])),
        Directive::Wait { secs: 0.8 }
    );
    assert_eq!(
        Directive::parse(&raw("sprite", &["left", "chars/phoenix-talk.gif"])),
        Directive::Sprite {
            side: Side::Left,
            path: "chars/phoenix-talk.gif".to_owned()
        }
    );
    assert_eq!(
        Directive::parse(&raw("startblip", &["male"])),
        Directive::StartBlip {
            voice: "male".to_owned()
        }
    );
    assert_eq!(
        Directive::parse(&raw("music", &["start", "cross-moderato"])),
        Directive::MusicStart {
            name: "cross-moderato".to_owned()
        }
    );
    assert_eq!(Directive::parse(&raw("music", &["stop"])), Directive::MusicStop);
    assert_eq!(
        Directive::parse(&raw("holdit", &["phoenix"])),
        Directive::Exclamation {
            kind: ExclamationKind::HoldIt,
            speaker: "phoenix".to_owned()
        }
    );
    assert_eq!(
        Directive::parse(&raw("edgeworthslam", &[])),
        Directive::DeskSlam { side: Side::Right }
    );
    assert_eq!(
        Directive::parse(&raw("pan", &["right"])),
        Directive::Pan { side: Side::Right }
    );
}

#[test]
fn optional_durations_fall_back_to_defaults() {
    assert_eq!(
        Directive::parse(&raw("shake", &[])),
        Directive::Shake {
            secs: DEFAULT_SHAKE_SECS
        }
    );
    assert_eq!(
        Directive::parse(&raw("flash", &["0.5"])),
        Directive::Flash { secs: 0.5 }
    );
}

#[test]
fn nametag_joins_arguments_and_strips_quotes() {
    assert_eq!(
        Directive::parse(&raw("nametag", &["\"Miles", "Edgeworth\""])),
        Directive::Nametag {
            text: "Miles Edgeworth".to_owned()
        }
    );
}

#[test]
fn malformed_and_unknown_directives_become_no_ops() {
    for d in [
        raw("wait", &[]),
        raw("wait", &["soon"]),
        raw("wait", &["0"]),
        raw("wait", &["-1"]),
        raw("sprite", &["middle", "x.png"]),
        raw("sprite", &["left"]),
        raw("pan", &[]),
        raw("shake", &["NaN"]),
        raw("music", &["pause"]),
        raw("confetti", &["lots"]),
    ] {
        assert!(
            matches!(Directive::parse(&d), Directive::Unknown { ref name } if *name == d.name),
            "{d:?} should decode to Unknown"
        );
    }
}
