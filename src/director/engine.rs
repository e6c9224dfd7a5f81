use std::sync::Arc;

use crate::animation::ease::Ease;
use crate::assets::store::AssetStore;
use crate::dialogue::directive::{Directive, ExclamationKind, Side};
use crate::dialogue::interpreter::{DialogueInterpreter, TextBoxBinding};
use crate::dialogue::page::DialoguePage;
use crate::director::audio::{AudioChannel, AudioLog, LoopType};
use crate::director::cast::Cast;
use crate::director::config::DirectorConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::cpu::{CpuCompositor, CpuCompositorOpts};
use crate::render::frame::FrameRGBA;
use crate::scene::graph::SceneGraph;
use crate::scene::node::TimerAction;
use crate::timeline::action::{Action, ActionCtx};
use crate::timeline::sequencer::Sequencer;

const SHAKE_AMPLITUDE_PX: i32 = 2;
const DESK_SLAM_SOUND: &str = "sound/sfx-deskslam.wav";
const DESK_SLAM_SOUND_DELAY_SECS: f64 = 0.15;
const GENERIC_EXCLAMATION_AUDIO: &str = "exclamations/objection-generic.wav";

fn sound_path(name: &str) -> String {
    format!("sound/sfx-{name}.wav")
}

fn blip_path(voice: &str) -> String {
    format!("sound/sfx-blip{voice}.wav")
}

fn music_path(name: &str) -> String {
    format!("music/{name}.mp3")
}

fn exclamation_sprite_path(kind: ExclamationKind) -> String {
    format!("exclamations/{}.gif", kind.stem())
}

/// Speaker-specific clip (`.mp3`, then `.wav`), else the generic objection clip.
fn exclamation_audio(
    assets: &AssetStore,
    kind: ExclamationKind,
    speaker: &str,
) -> ReelResult<String> {
    let base = format!("exclamations/{}-{speaker}", kind.stem());
    for ext in ["mp3", "wav"] {
        let candidate = format!("{base}.{ext}");
        if assets.exists(&candidate) {
            return assets.resolve_audio(&candidate);
        }
    }
    assets.resolve_audio(GENERIC_EXCLAMATION_AUDIO)
}

/// Summary of one [`Director::render_movie`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames handed to the sink.
    pub frames: u64,
    /// `frames` expressed in seconds at the configured frame rate.
    pub duration_secs: f64,
}

/// Owns a scene, its sequencer, the dialogue interpreter and the audio log, and runs the
/// fixed-step frame loop.
///
/// Scripting methods only enqueue actions; nothing touches the scene until
/// [`render_movie`](Self::render_movie) (or [`step`](Self::step)) runs the queue. Assets named by
/// a script call are loaded by that call, so a missing file fails while scripting, not mid-render.
///
/// Each frame runs, in order: the sequencer, the dialogue interpreter (dispatching the directives
/// it reached), the text box refresh, the scene tick, and finally the render.
pub struct Director {
    cfg: DirectorConfig,
    assets: AssetStore,
    scene: SceneGraph,
    cast: Cast,
    binding: TextBoxBinding,
    sequencer: Sequencer,
    dialogue: DialogueInterpreter,
    audio: AudioLog,
    compositor: CpuCompositor,
    frame: u64,
    time: f64,
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("frame", &self.frame)
            .field("time", &self.time)
            .field("queued", &self.sequencer.len())
            .field("dialogue", &self.dialogue)
            .finish_non_exhaustive()
    }
}

impl Director {
    /// Validate `cfg`, load the stage art and build the cast.
    pub fn new(cfg: DirectorConfig) -> ReelResult<Self> {
        cfg.validate()?;
        let mut assets = AssetStore::new(cfg.assets_root.clone());
        let mut scene = SceneGraph::new();
        let (cast, binding) = Cast::build(&mut scene, &mut assets, &cfg)?;
        let dialogue = DialogueInterpreter::new(cfg.interpreter())?;
        let compositor = CpuCompositor::new(
            cfg.canvas,
            CpuCompositorOpts {
                clear_rgba: Some([0, 0, 0, 255]),
            },
        )?;
        Ok(Self {
            cfg,
            assets,
            scene,
            cast,
            binding,
            sequencer: Sequencer::new(),
            dialogue,
            audio: AudioLog::new(),
            compositor,
            frame: 0,
            time: 0.0,
        })
    }

    /// Configuration this director was built with.
    pub fn config(&self) -> &DirectorConfig {
        &self.cfg
    }

    /// Scene tree.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Named stage nodes.
    pub fn cast(&self) -> &Cast {
        &self.cast
    }

    /// Dialogue interpreter state.
    pub fn dialogue(&self) -> &DialogueInterpreter {
        &self.dialogue
    }

    /// Audio commands logged so far.
    pub fn audio_log(&self) -> &AudioLog {
        &self.audio
    }

    /// Asset cache, e.g. for building actions with preloaded sprites.
    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    /// Global time at the start of the next frame, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Frames stepped so far.
    pub fn frames_stepped(&self) -> u64 {
        self.frame
    }

    /// Number of queued actions, including the running one.
    pub fn queued(&self) -> usize {
        self.sequencer.len()
    }

    /// `true` once the action queue is drained and no dialogue page is active.
    pub fn is_settled(&self) -> bool {
        self.sequencer.is_empty() && self.dialogue.is_idle()
    }

    /// Enqueue an arbitrary action.
    pub fn push(&mut self, action: impl Into<Action>) {
        self.sequencer.push(action);
    }

    /// Eased camera pan to the stop for `side`.
    pub fn pan_to(&mut self, side: Side) -> ReelResult<()> {
        let target = (self.cfg.camera_x(side), 0);
        self.push(Action::move_to(
            self.cast.background,
            target,
            self.cfg.pan_secs,
            Ease::InOutCubic,
        )?);
        Ok(())
    }

    /// Instant camera cut to the stop for `side`.
    pub fn cut_to(&mut self, side: Side) {
        let target = (self.cfg.camera_x(side), 0);
        self.push(Action::set_position(self.cast.background, target));
    }

    /// Show the dialogue box, then display `pages` one after another with `speaker` on the
    /// nametag.
    ///
    /// Every asset the pages' directives name is loaded here.
    pub fn text_box<I>(&mut self, speaker: impl Into<String>, pages: I) -> ReelResult<()>
    where
        I: IntoIterator<Item = DialoguePage>,
    {
        let speaker = speaker.into();
        let pages = pages
            .into_iter()
            .map(|page| {
                self.preload_page(&page)?;
                Ok(Arc::new(page))
            })
            .collect::<ReelResult<Vec<_>>>()?;
        self.show_text_box();
        for page in pages {
            self.push(Action::display_page(page, Some(speaker.clone())));
        }
        Ok(())
    }

    /// Show the dialogue box.
    pub fn show_text_box(&mut self) {
        let node = self.cast.dialogue_box;
        self.run(move |ctx| ctx.scene.node_mut(node).show());
    }

    /// Hide the dialogue box.
    pub fn hide_text_box(&mut self) {
        let node = self.cast.dialogue_box;
        self.run(move |ctx| ctx.scene.node_mut(node).hide());
    }

    /// Do nothing for `secs`.
    pub fn wait(&mut self, secs: f64) -> ReelResult<()> {
        self.push(Action::wait(secs)?);
        Ok(())
    }

    /// Swap the sprite on the `side` stand.
    pub fn set_sprite(&mut self, side: Side, path: &str) -> ReelResult<()> {
        let sprite = self.assets.load_sprite(path)?;
        self.push(Action::set_sprite(self.cast.stand(side), sprite));
        Ok(())
    }

    /// Start `music/<name>.mp3`, replacing any playing track.
    pub fn start_music(&mut self, name: &str) -> ReelResult<()> {
        let path = self.assets.resolve_audio(&music_path(name))?;
        self.run(move |ctx| {
            ctx.audio.start_channel(
                AudioChannel::Music,
                path,
                ctx.time,
                None,
                LoopType::LoopUntilTruncated,
            )
        });
        Ok(())
    }

    /// Stop the current music track.
    pub fn stop_music(&mut self) {
        self.run(|ctx| ctx.audio.stop_channel(AudioChannel::Music, ctx.time));
    }

    /// Start looping `sound/sfx-blip<voice>.wav`, replacing any running blips.
    pub fn start_voice_blips(&mut self, voice: &str) -> ReelResult<()> {
        let path = self.assets.resolve_audio(&blip_path(voice))?;
        let delay = self.cfg.blip_loop_delay_secs;
        self.run(move |ctx| {
            ctx.audio.start_channel(
                AudioChannel::VoiceBlip,
                path,
                ctx.time,
                Some(delay),
                LoopType::LoopCompleteOnly,
            )
        });
        Ok(())
    }

    /// Stop the voice blips.
    pub fn stop_voice_blips(&mut self) {
        self.run(|ctx| ctx.audio.stop_channel(AudioChannel::VoiceBlip, ctx.time));
    }

    /// Play `sound/sfx-<name>.wav` once.
    pub fn play_sound(&mut self, name: &str) -> ReelResult<()> {
        let path = self.assets.resolve_audio(&sound_path(name))?;
        self.run(move |ctx| ctx.audio.play(path, ctx.time));
        Ok(())
    }

    /// Run `f` once when the queue reaches it.
    pub fn run(&mut self, f: impl FnOnce(&mut ActionCtx<'_>) + 'static) {
        self.push(Action::run(f));
    }

    /// Advance every subsystem by one fixed frame without rendering.
    pub fn step(&mut self) -> ReelResult<()> {
        let dt = self.cfg.fps.frame_duration_secs();
        self.time = self.cfg.fps.frames_to_secs(self.frame);
        tracing::trace!(frame = self.frame, time = self.time, "step");

        let mut ctx = ActionCtx::new(
            &mut self.scene,
            &mut self.dialogue,
            &mut self.audio,
            self.time,
        );
        self.sequencer.update(dt, &mut ctx);

        for directive in self.dialogue.update(dt) {
            self.apply_directive(directive)?;
        }
        // A page completed above pops its action on this frame, not the next.
        self.sequencer.settle();
        self.binding.present(&self.dialogue, &mut self.scene);
        self.scene.update(dt);

        self.frame += 1;
        Ok(())
    }

    /// Rasterize the scene as it stands.
    pub fn render_frame(&mut self) -> ReelResult<FrameRGBA> {
        self.compositor.render_frame(&self.scene)
    }

    /// Run the whole script into `sink`.
    ///
    /// `camera_offset_y` is applied to the root node. Frames are stepped and rendered until the
    /// queue is drained and no page is active; the frame on which that happens is the last one.
    /// Audio channels still open at the end are closed at the final time.
    ///
    /// The sink is ended even when rendering fails; the first error is returned.
    #[tracing::instrument(skip(self, sink))]
    pub fn render_movie(
        &mut self,
        sink: &mut dyn FrameSink,
        camera_offset_y: i32,
    ) -> ReelResult<RenderStats> {
        let root = self.scene.root();
        self.scene.node_mut(root).set_y(camera_offset_y);

        sink.begin(SinkConfig {
            width: self.cfg.canvas.width,
            height: self.cfg.canvas.height,
            fps: self.cfg.fps,
        })?;

        let frames = match self.run_frames(sink) {
            Ok(frames) => frames,
            Err(err) => {
                if let Err(end_err) = sink.end() {
                    tracing::warn!(error = %end_err, "sink did not close cleanly after a failed render");
                }
                return Err(err);
            }
        };
        sink.end()?;

        let end = self.cfg.fps.frames_to_secs(self.frame);
        self.audio.close_all(end);
        let stats = RenderStats {
            frames,
            duration_secs: self.cfg.fps.frames_to_secs(frames),
        };
        tracing::info!(
            frames = stats.frames,
            duration_secs = stats.duration_secs,
            audio_entries = self.audio.entries().len(),
            "movie rendered"
        );
        Ok(stats)
    }

    fn run_frames(&mut self, sink: &mut dyn FrameSink) -> ReelResult<u64> {
        let mut frames = 0u64;
        loop {
            if frames >= self.cfg.max_frames {
                return Err(ReelError::evaluation(format!(
                    "script still running after {} frames ({} actions queued)",
                    self.cfg.max_frames,
                    self.sequencer.len()
                )));
            }
            self.step()?;
            let frame = self.render_frame()?;
            sink.push_frame(FrameIndex(frames), &frame)?;
            frames += 1;
            if self.is_settled() {
                return Ok(frames);
            }
        }
    }

    fn preload_page(&mut self, page: &DialoguePage) -> ReelResult<()> {
        for (_, raw) in page.directives() {
            match Directive::parse(raw) {
                Directive::Sprite { path, .. } => {
                    self.assets.load_sprite(&path)?;
                }
                Directive::PlaySound { name } => {
                    self.assets.resolve_audio(&sound_path(&name))?;
                }
                Directive::StartBlip { voice } => {
                    self.assets.resolve_audio(&blip_path(&voice))?;
                }
                Directive::MusicStart { name } => {
                    self.assets.resolve_audio(&music_path(&name))?;
                }
                Directive::Exclamation { kind, speaker } => {
                    self.assets.load_sprite(&exclamation_sprite_path(kind))?;
                    exclamation_audio(&self.assets, kind, &speaker)?;
                }
                Directive::DeskSlam { side } => {
                    let path = self.slam_sprite_path(side).to_owned();
                    self.assets.load_sprite(&path)?;
                    self.assets.resolve_audio(DESK_SLAM_SOUND)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn slam_sprite_path(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.cfg.stage.left_slam_sprite,
            Side::Right => &self.cfg.stage.right_slam_sprite,
        }
    }

    fn apply_directive(&mut self, directive: Directive) -> ReelResult<()> {
        let time = self.time;
        match directive {
            Directive::Sprite { side, path } => {
                let sprite = self.assets.load_sprite(&path)?;
                self.scene.node_mut(self.cast.stand(side)).set_sprite(sprite);
            }
            Directive::PlaySound { name } => {
                let path = self.assets.resolve_audio(&sound_path(&name))?;
                self.audio.play(path, time);
            }
            Directive::StartBlip { voice } => {
                let path = self.assets.resolve_audio(&blip_path(&voice))?;
                self.audio.start_channel(
                    AudioChannel::VoiceBlip,
                    path,
                    time,
                    Some(self.cfg.blip_loop_delay_secs),
                    LoopType::LoopCompleteOnly,
                );
            }
            Directive::StopBlip => self.audio.stop_channel(AudioChannel::VoiceBlip, time),
            Directive::Shake { secs } => self
                .scene
                .node_mut(self.cast.background)
                .start_shake(SHAKE_AMPLITUDE_PX, secs),
            Directive::Flash { secs } => {
                let flash = self.scene.node_mut(self.cast.flash);
                flash.show();
                flash.schedule(secs, TimerAction::Hide);
            }
            Directive::Pan { side } => {
                let x = self.cfg.camera_x(side);
                let bg = self.scene.node_mut(self.cast.background);
                let y = bg.xy().1;
                bg.start_tween((x, y), self.cfg.pan_secs, Ease::InOutCubic);
            }
            Directive::Cut { side } => {
                let x = self.cfg.camera_x(side);
                let bg = self.scene.node_mut(self.cast.background);
                let y = bg.xy().1;
                bg.start_tween((x, y), 0.0, Ease::Linear);
            }
            Directive::ShowArrow => self.scene.node_mut(self.cast.arrow).show(),
            Directive::HideArrow => self.scene.node_mut(self.cast.arrow).hide(),
            Directive::Nametag { text } => self.dialogue.set_speaker(text),
            Directive::MusicStart { name } => {
                let path = self.assets.resolve_audio(&music_path(&name))?;
                self.audio.start_channel(
                    AudioChannel::Music,
                    path,
                    time,
                    None,
                    LoopType::LoopUntilTruncated,
                );
            }
            Directive::MusicStop => self.audio.stop_channel(AudioChannel::Music, time),
            Directive::Exclamation { kind, speaker } => {
                let sprite = self.assets.load_sprite(&exclamation_sprite_path(kind))?;
                let bubble = self.scene.node_mut(self.cast.exclamation);
                bubble.set_sprite(sprite);
                bubble.show();
                bubble.schedule(self.cfg.exclamation_secs, TimerAction::Hide);
                let clip = exclamation_audio(&self.assets, kind, &speaker)?;
                self.audio.play(clip, time);
            }
            Directive::DeskSlam { side } => {
                let path = self.slam_sprite_path(side).to_owned();
                let slam = self.assets.load_sprite(&path)?;
                let stand = self.scene.node_mut(self.cast.stand(side));
                // A slam during a pending revert keeps the original revert target.
                let before = stand
                    .take_pending_sprite()
                    .or_else(|| stand.current_sprite().cloned());
                if let Some(before) = before {
                    stand.schedule(self.cfg.desk_slam_secs, TimerAction::SetSprite(before));
                }
                stand.set_sprite(slam);
                self.audio
                    .play(DESK_SLAM_SOUND, time + DESK_SLAM_SOUND_DELAY_SECS);
            }
            Directive::ShowBox => self.scene.node_mut(self.cast.dialogue_box).show(),
            Directive::HideBox => self.scene.node_mut(self.cast.dialogue_box).hide(),
            // Consumed by the interpreter and never returned.
            Directive::Wait { .. } | Directive::Unknown { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/director/engine.rs"]
mod tests;
