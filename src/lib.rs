//! reelkit renders scripted visual-novel cutscenes to frames.
//!
//! A [`Director`] owns one [`SceneGraph`], a serial [`Sequencer`] of [`Action`]s, a
//! [`DialogueInterpreter`] that reveals text a character at a time and fires inline
//! [`Directive`]s, and an append-only [`AudioLog`]. Scripting calls only enqueue work; the batch
//! entry point [`Director::render_movie`] runs a fixed-timestep loop and hands every frame to a
//! [`FrameSink`]:
//!
//! - [`InMemorySink`] for tests and previews
//! - [`PngSequenceSink`] for a `frame_000000.png` sequence (see [`encode_png_sequence`])
//! - [`FfmpegSink`] for MP4 output through the system `ffmpeg`
//!
//! Audio is not mixed: the log serializes to JSON for an external mixer.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod dialogue;
mod director;
mod encode;
mod foundation;
mod render;
mod scene;
mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Offset3, Rgba8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::decode::{Sprite, SpriteFrame};
pub use crate::assets::store::{AssetStore, FontAsset, normalize_rel_path};

pub use crate::scene::graph::{Compositor, DrawItem, SceneGraph};
pub use crate::scene::node::{
    ColorFill, NodeId, Payload, SceneNode, SpritePayload, TextRun, TextSpan, TimerAction,
};

pub use crate::timeline::action::{
    Action, ActionCtx, ActionFinisher, ActionId, Callback, MoveAction, SetPositionAction,
    WaitAction,
};
pub use crate::timeline::sequencer::Sequencer;

pub use crate::dialogue::directive::{
    DEFAULT_FLASH_SECS, DEFAULT_SHAKE_SECS, Directive, ExclamationKind, Side,
};
pub use crate::dialogue::interpreter::{
    DialogueInterpreter, InterpreterConfig, InterpreterState, TextBoxBinding,
};
pub use crate::dialogue::page::{
    DialogueCommand, DialoguePage, DialoguePageBuilder, RawDirective, TextChunk, VisibleChunk,
    VisibleText,
};

pub use crate::director::audio::{AudioChannel, AudioCommand, AudioLog, LoopType};
pub use crate::director::cast::Cast;
pub use crate::director::config::{DirectorConfig, StageConfig};
pub use crate::director::engine::{Director, RenderStats};

pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, encode_png_sequence, is_ffmpeg_on_path,
};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::cpu::{CpuCompositor, CpuCompositorOpts};
pub use crate::render::frame::FrameRGBA;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
