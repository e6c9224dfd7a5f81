use super::*;

#[test]
fn starting_a_channel_closes_its_previous_entry() {
    let mut log = AudioLog::new();
    log.start_channel(
        AudioChannel::Music,
        "music/a.mp3",
        0.0,
        None,
        LoopType::LoopUntilTruncated,
    );
    log.start_channel(
        AudioChannel::VoiceBlip,
        "sound/sfx-blipmale.wav",
        1.0,
        Some(0.06),
        LoopType::LoopCompleteOnly,
    );
    log.start_channel(
        AudioChannel::Music,
        "music/b.mp3",
        2.5,
        None,
        LoopType::LoopUntilTruncated,
    );

    let e = log.entries();
    assert_eq!(e.len(), 3);
    assert_eq!(e[0].end, Some(2.5));
    assert_eq!(e[1].end, None);
    assert_eq!(e[2].end, None);
    assert!(log.is_open(AudioChannel::Music));
    assert!(log.is_open(AudioChannel::VoiceBlip));

    log.close_all(4.0);
    assert_eq!(log.entries()[1].end, Some(4.0));
    assert_eq!(log.entries()[2].end, Some(4.0));
    assert!(!log.is_open(AudioChannel::Music));
}

#[test]
fn stopping_a_silent_channel_is_a_no_op() {
    let mut log = AudioLog::new();
    log.play("sound/sfx-pichoop.wav", 0.5);
    log.stop_channel(AudioChannel::VoiceBlip, 1.0);
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].end, None);
}

#[test]
fn json_matches_the_mixer_schema() {
    let mut log = AudioLog::new();
    log.play("sound/sfx-deskslam.wav", 1.25);
    log.start_channel(
        AudioChannel::VoiceBlip,
        "sound/sfx-blipfemale.wav",
        2.0,
        Some(0.06),
        LoopType::LoopCompleteOnly,
    );
    log.stop_channel(AudioChannel::VoiceBlip, 3.0);

    let v: serde_json::Value = serde_json::from_str(&log.to_json_string().unwrap()).unwrap();
    assert_eq!(
        v,
        serde_json::json!([
            {"type": "audio", "path": "sound/sfx-deskslam.wav", "offset": 1.25},
            {
                "type": "audio",
                "path": "sound/sfx-blipfemale.wav",
                "offset": 2.0,
                "end": 3.0,
                "loop_delay": 0.06,
                "loop_type": "loop_complete_only"
            }
        ])
    );
}

#[test]
fn write_json_creates_the_file() {
    let dir = crate::test_support::temp_dir("audio_log");
    let path = dir.join("audio.json");
    let mut log = AudioLog::new();
    log.play("a.wav", 0.0);
    log.write_json(&path).unwrap();
    let back: Vec<AudioCommand> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, log.entries());
    let _ = std::fs::remove_dir_all(dir);
}
