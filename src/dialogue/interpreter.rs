use std::collections::BTreeMap;
use std::sync::Arc;

use crate::dialogue::directive::Directive;
use crate::dialogue::page::DialoguePage;
use crate::foundation::core::{Rgba8, ensure_positive};
use crate::foundation::error::ReelResult;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{NodeId, TextSpan};

/// Reveal pacing for a [`DialogueInterpreter`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterpreterConfig {
    /// Characters revealed per second.
    pub chars_per_second: f64,
    /// Hold after the last character before the page completes.
    pub post_reveal_hold_secs: f64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 30.0,
            post_reveal_hold_secs: 1.0,
        }
    }
}

impl InterpreterConfig {
    /// Reject non-finite or non-positive rates and delays.
    pub fn validate(&self) -> ReelResult<()> {
        ensure_positive("chars_per_second", self.chars_per_second)?;
        ensure_positive("post_reveal_hold_secs", self.post_reveal_hold_secs)?;
        Ok(())
    }
}

/// Observable interpreter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpreterState {
    /// No page loaded.
    Idle,
    /// Characters are being revealed.
    Revealing,
    /// A wait window froze the reveal clock.
    Paused,
    /// Everything is visible; holding before completion.
    AllRevealed,
}

#[derive(Clone, Copy, Debug)]
struct WaitWindow {
    duration: f64,
    elapsed: f64,
}

struct ActivePage {
    page: Arc<DialoguePage>,
    directives: Vec<(usize, Directive)>,
    next_directive: usize,
    total: usize,
    speaker: Option<String>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

/// Typewriter reveal of one [`DialoguePage`] at a time.
///
/// Each [`update`](Self::update) advances the reveal clock by `dt` and returns the directives whose
/// stream position the cursor reached during that step. Directives are matched by position in the
/// command stream, so each fires exactly once even when identical directives sit next to each other.
///
/// `wait` directives are consumed here: they open a window during which the reveal clock is frozen,
/// keeping its fractional remainder for when the window closes.
pub struct DialogueInterpreter {
    cfg: InterpreterConfig,
    char_interval: f64,
    active: Option<ActivePage>,
    visible: usize,
    char_time: f64,
    wait: Option<WaitWindow>,
    hold_elapsed: f64,
}

impl std::fmt::Debug for DialogueInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueInterpreter")
            .field("state", &self.state())
            .field("visible", &self.visible)
            .field("char_time", &self.char_time)
            .field("speaker", &self.speaker())
            .finish_non_exhaustive()
    }
}

impl DialogueInterpreter {
    /// Create an idle interpreter.
    pub fn new(cfg: InterpreterConfig) -> ReelResult<Self> {
        cfg.validate()?;
        Ok(Self {
            char_interval: 1.0 / cfg.chars_per_second,
            cfg,
            active: None,
            visible: 0,
            char_time: 0.0,
            wait: None,
            hold_elapsed: 0.0,
        })
    }

    /// Pacing this interpreter was built with.
    pub fn config(&self) -> InterpreterConfig {
        self.cfg
    }

    /// Start revealing `page`. `on_complete` runs once, after the post-reveal hold.
    ///
    /// A page that is still active is dropped without running its completion callback.
    pub fn load(
        &mut self,
        page: Arc<DialoguePage>,
        speaker: Option<String>,
        on_complete: Box<dyn FnOnce()>,
    ) {
        if self.active.is_some() {
            tracing::warn!("dialogue page replaced before it completed");
        }
        let directives = page
            .directives()
            .into_iter()
            .map(|(pos, raw)| (pos, Directive::parse(raw)))
            .collect();
        let total = page.total_chars();
        tracing::debug!(total_chars = total, speaker = ?speaker, "dialogue page loaded");
        self.active = Some(ActivePage {
            page,
            directives,
            next_directive: 0,
            total,
            speaker,
            on_complete: Some(on_complete),
        });
        self.visible = 0;
        self.char_time = 0.0;
        self.wait = None;
        self.hold_elapsed = 0.0;
    }

    /// Current state.
    pub fn state(&self) -> InterpreterState {
        match &self.active {
            None => InterpreterState::Idle,
            Some(_) if self.wait.is_some() => InterpreterState::Paused,
            Some(a) if self.visible >= a.total => InterpreterState::AllRevealed,
            Some(_) => InterpreterState::Revealing,
        }
    }

    /// `true` when no page is loaded.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Revealed character count.
    pub fn visible_chars(&self) -> usize {
        self.visible
    }

    /// Reveal clock remainder carried into the next step.
    pub fn char_time(&self) -> f64 {
        self.char_time
    }

    /// Speaker of the active page.
    pub fn speaker(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.speaker.as_deref())
    }

    /// Rename the speaker of the active page. No-op when idle.
    pub fn set_speaker(&mut self, speaker: impl Into<String>) {
        if let Some(a) = self.active.as_mut() {
            a.speaker = Some(speaker.into());
        }
    }

    /// Active page.
    pub fn page(&self) -> Option<&Arc<DialoguePage>> {
        self.active.as_ref().map(|a| &a.page)
    }

    /// Advance by `dt` seconds and return the side-effect directives reached, in stream order.
    ///
    /// Returned directives never include `wait` (handled internally) or unknown ones (no-ops).
    pub fn update(&mut self, dt: f64) -> Vec<Directive> {
        let mut fired = Vec::new();
        if self.active.is_none() {
            return fired;
        }

        if let Some(w) = self.wait.as_mut() {
            w.elapsed += dt;
            if w.elapsed < w.duration {
                return fired;
            }
            tracing::trace!(secs = w.duration, "wait window closed");
            self.wait = None;
            // Directives queued right behind the wait fire now; reveal resumes next step.
            self.dispatch_due(&mut fired);
            return fired;
        }

        self.dispatch_due(&mut fired);
        if self.wait.is_some() {
            return fired;
        }

        let total = self.active.as_ref().map_or(0, |a| a.total);
        if self.visible >= total {
            self.hold_elapsed += dt;
            if self.hold_elapsed >= self.cfg.post_reveal_hold_secs {
                self.complete();
            }
            return fired;
        }

        self.char_time += dt;
        while self.char_time >= self.char_interval && self.visible < total {
            self.char_time -= self.char_interval;
            self.visible += 1;
            self.dispatch_due(&mut fired);
            if self.wait.is_some() {
                break;
            }
        }
        if self.visible >= total && self.wait.is_none() {
            self.char_time = 0.0;
        }
        fired
    }

    fn dispatch_due(&mut self, fired: &mut Vec<Directive>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        while let Some((pos, d)) = active.directives.get(active.next_directive) {
            if *pos > self.visible {
                break;
            }
            active.next_directive += 1;
            match d {
                Directive::Wait { secs } => {
                    tracing::trace!(secs = *secs, at = *pos, "wait window opened");
                    self.wait = Some(WaitWindow {
                        duration: *secs,
                        elapsed: 0.0,
                    });
                    return;
                }
                Directive::Unknown { name } => {
                    tracing::warn!(directive = %name, at = *pos, "ignoring unknown directive");
                }
                other => {
                    tracing::debug!(directive = other.name(), at = *pos, "directive reached");
                    fired.push(other.clone());
                }
            }
        }
    }

    fn complete(&mut self) {
        let on_complete = self.active.take().and_then(|mut a| a.on_complete.take());
        self.visible = 0;
        self.char_time = 0.0;
        self.hold_elapsed = 0.0;
        tracing::debug!("dialogue page complete");
        if let Some(f) = on_complete {
            f();
        }
    }
}

/// Binds a [`DialogueInterpreter`] to the text nodes that display it.
#[derive(Clone, Debug)]
pub struct TextBoxBinding {
    /// Node with a text payload receiving the visible text.
    pub text: NodeId,
    /// Optional node with a text payload receiving the speaker name.
    pub nametag: Option<NodeId>,
    /// Tag to color lookup; the innermost tag of a chunk picks its color.
    pub palette: BTreeMap<String, Rgba8>,
    /// Color of untagged or unknown-tag text.
    pub default_color: Rgba8,
}

impl TextBoxBinding {
    /// Bind to `text` with the default white color and an empty palette.
    pub fn bind(text: NodeId) -> Self {
        Self {
            text,
            nametag: None,
            palette: BTreeMap::new(),
            default_color: Rgba8::WHITE,
        }
    }

    /// Write the interpreter's visible text and speaker into the bound nodes.
    ///
    /// An idle interpreter clears the text node and leaves the nametag untouched.
    pub fn present(&self, interpreter: &DialogueInterpreter, scene: &mut SceneGraph) {
        let spans = match interpreter.page() {
            None => Vec::new(),
            Some(page) => self.spans(page, interpreter.visible_chars()),
        };
        if let Some(run) = scene.node_mut(self.text).text_run_mut() {
            run.spans = spans;
        }
        if let (Some(tag), Some(speaker)) = (self.nametag, interpreter.speaker())
            && let Some(run) = scene.node_mut(tag).text_run_mut()
            && run.text() != speaker
        {
            run.set_text(speaker);
        }
    }

    fn spans(&self, page: &DialoguePage, visible: usize) -> Vec<TextSpan> {
        let mut out = Vec::new();
        for (i, line) in page.visible(visible).lines.into_iter().enumerate() {
            if i > 0 {
                out.push(TextSpan {
                    text: "\n".to_owned(),
                    color: self.default_color,
                });
            }
            for chunk in line {
                let color = chunk
                    .tags
                    .last()
                    .and_then(|t| self.palette.get(t))
                    .copied()
                    .unwrap_or(self.default_color);
                out.push(TextSpan {
                    text: chunk.text,
                    color,
                });
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialogue/interpreter.rs"]
mod tests;
