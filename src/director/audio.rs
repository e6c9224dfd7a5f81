use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// How an external mixer should repeat a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopType {
    /// Loop until the entry's `end`, cutting the last repetition short.
    LoopUntilTruncated,
    /// Loop until `end`, but only start repetitions that can play to completion.
    LoopCompleteOnly,
}

/// Singleton audio channels: at most one open entry each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    /// Background music.
    Music,
    /// Looping voice blips during text reveal.
    VoiceBlip,
}

/// One entry of the audio command log.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioCommand {
    /// Always `"audio"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Clip path.
    pub path: String,
    /// Start time in seconds of global time.
    pub offset: f64,
    /// End time in seconds, for looped or truncated clips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    /// Silence between repetitions in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_delay: Option<f64>,
    /// Repetition policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_type: Option<LoopType>,
}

impl AudioCommand {
    fn clip(path: impl Into<String>, offset: f64) -> Self {
        Self {
            kind: "audio".to_owned(),
            path: path.into(),
            offset,
            end: None,
            loop_delay: None,
            loop_type: None,
        }
    }
}

/// Append-only log of audio commands for an external mixer.
#[derive(Clone, Debug, Default)]
pub struct AudioLog {
    entries: Vec<AudioCommand>,
    music: Option<usize>,
    voice_blip: Option<usize>,
}

impl AudioLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a one-shot clip.
    pub fn play(&mut self, path: impl Into<String>, offset: f64) {
        let path = path.into();
        tracing::debug!(%path, offset, "audio one-shot");
        self.entries.push(AudioCommand::clip(path, offset));
    }

    /// Open a looping entry on `channel`, closing the channel's previous entry at `offset` first.
    pub fn start_channel(
        &mut self,
        channel: AudioChannel,
        path: impl Into<String>,
        offset: f64,
        loop_delay: Option<f64>,
        loop_type: LoopType,
    ) {
        self.stop_channel(channel, offset);
        let path = path.into();
        tracing::debug!(?channel, %path, offset, "audio channel start");
        let mut cmd = AudioCommand::clip(path, offset);
        cmd.loop_delay = loop_delay;
        cmd.loop_type = Some(loop_type);
        self.entries.push(cmd);
        *self.slot(channel) = Some(self.entries.len() - 1);
    }

    /// Close the open entry on `channel` at `end`. No-op when the channel is silent.
    pub fn stop_channel(&mut self, channel: AudioChannel, end: f64) {
        if let Some(i) = self.slot(channel).take() {
            tracing::debug!(?channel, end, "audio channel stop");
            self.entries[i].end = Some(end);
        }
    }

    /// Close every open channel at `end`.
    pub fn close_all(&mut self, end: f64) {
        self.stop_channel(AudioChannel::Music, end);
        self.stop_channel(AudioChannel::VoiceBlip, end);
    }

    /// Whether `channel` has an open entry.
    pub fn is_open(&self, channel: AudioChannel) -> bool {
        match channel {
            AudioChannel::Music => self.music.is_some(),
            AudioChannel::VoiceBlip => self.voice_blip.is_some(),
        }
    }

    /// Logged entries in insertion order.
    pub fn entries(&self) -> &[AudioCommand] {
        &self.entries
    }

    /// Pretty JSON array of all entries.
    pub fn to_json_string(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Write [`to_json_string`](Self::to_json_string) to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json)
            .with_context(|| format!("write audio log to '{}'", path.display()))?;
        Ok(())
    }

    fn slot(&mut self, channel: AudioChannel) -> &mut Option<usize> {
        match channel {
            AudioChannel::Music => &mut self.music,
            AudioChannel::VoiceBlip => &mut self.voice_blip,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/director/audio.rs"]
mod tests;
