use std::sync::Arc;

use crate::animation::ease::{Ease, lerp_i32};
use crate::assets::decode::Sprite;
use crate::assets::store::FontAsset;
use crate::foundation::core::{Offset3, Rgba8};

/// Stable handle to a node inside a [`SceneGraph`](crate::SceneGraph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A styled piece of a text run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpan {
    /// Span text. `\n` starts a new line.
    pub text: String,
    /// Fill color.
    pub color: Rgba8,
}

/// Text payload: styled spans drawn with one font.
#[derive(Clone, Debug)]
pub struct TextRun {
    /// Spans in reading order.
    pub spans: Vec<TextSpan>,
    /// Font used to shape the text. Runs without a font are skipped by the renderer.
    pub font: Option<Arc<FontAsset>>,
    /// Font size in pixels.
    pub size_px: f32,
}

impl TextRun {
    /// Single-color run.
    pub fn plain(
        text: impl Into<String>,
        font: Option<Arc<FontAsset>>,
        size_px: f32,
        color: Rgba8,
    ) -> Self {
        Self {
            spans: vec![TextSpan {
                text: text.into(),
                color,
            }],
            font,
            size_px,
        }
    }

    /// Concatenated text of all spans.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Replace the content with a single span, keeping the first span's color.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let color = self.spans.first().map(|s| s.color).unwrap_or(Rgba8::WHITE);
        self.spans = vec![TextSpan {
            text: text.into(),
            color,
        }];
    }
}

/// Image payload: a sprite with optional explicit draw size.
#[derive(Clone, Debug)]
pub struct SpritePayload {
    /// Decoded image or animation.
    pub sprite: Arc<Sprite>,
    /// Explicit draw width; the frame width when `None`.
    pub width: Option<u32>,
    /// Explicit draw height; the frame height when `None`.
    pub height: Option<u32>,
}

/// Solid rectangle payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorFill {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Fill color.
    pub color: Rgba8,
}

/// What a node draws.
#[derive(Clone, Debug, Default)]
pub enum Payload {
    /// Grouping node; draws nothing.
    #[default]
    None,
    /// Image sprite.
    Sprite(SpritePayload),
    /// Text run.
    Text(TextRun),
    /// Flat color rectangle.
    Fill(ColorFill),
}

/// Deferred mutation applied by a node's own tick.
#[derive(Clone, Debug)]
pub enum TimerAction {
    /// Swap to another sprite (restarting its animation clock).
    SetSprite(Arc<Sprite>),
    /// Hide the node.
    Hide,
    /// Show the node.
    Show,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeTimer {
    pub(crate) remaining: f64,
    pub(crate) then: TimerAction,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Shake {
    pub(crate) amplitude: i32,
    pub(crate) remaining: f64,
    pub(crate) tick: u32,
}

impl Shake {
    const PATTERN: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

    pub(crate) fn offset(&self) -> (i32, i32) {
        let (dx, dy) = Self::PATTERN[(self.tick as usize) % Self::PATTERN.len()];
        (dx * self.amplitude, dy * self.amplitude)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Tween {
    pub(crate) from: (i32, i32),
    pub(crate) to: (i32, i32),
    pub(crate) duration: f64,
    pub(crate) elapsed: f64,
    pub(crate) ease: Ease,
}

/// A positioned, nameable unit of the scene tree.
///
/// Parent and children are arena handles owned by the [`SceneGraph`](crate::SceneGraph); use the
/// graph to attach or move nodes.
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Display name, used for lookup and debugging.
    pub name: String,
    /// Local offset relative to the parent.
    pub offset: Offset3,
    /// Local visibility flag.
    pub visible: bool,
    /// Renderable payload.
    pub payload: Payload,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) clock: f64,
    pub(crate) timers: Vec<NodeTimer>,
    pub(crate) shake: Option<Shake>,
    pub(crate) tween: Option<Tween>,
}

impl SceneNode {
    /// Visible grouping node at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: Offset3::default(),
            visible: true,
            payload: Payload::None,
            parent: None,
            children: Vec::new(),
            clock: 0.0,
            timers: Vec::new(),
            shake: None,
            tween: None,
        }
    }

    /// Node drawing `sprite` at its natural size.
    pub fn sprite(name: impl Into<String>, sprite: Arc<Sprite>) -> Self {
        Self::new(name).with_payload(Payload::Sprite(SpritePayload {
            sprite,
            width: None,
            height: None,
        }))
    }

    /// Node drawing a text run.
    pub fn text(name: impl Into<String>, run: TextRun) -> Self {
        Self::new(name).with_payload(Payload::Text(run))
    }

    /// Node drawing a solid rectangle.
    pub fn fill(name: impl Into<String>, width: u32, height: u32, color: Rgba8) -> Self {
        Self::new(name).with_payload(Payload::Fill(ColorFill {
            width,
            height,
            color,
        }))
    }

    /// Set the local offset.
    pub fn at(mut self, x: i32, y: i32, z: i32) -> Self {
        self.offset = Offset3::new(x, y, z);
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Parent handle, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Make the node locally visible.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Make the node locally invisible (hides descendants too).
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Set the local x offset.
    pub fn set_x(&mut self, x: i32) {
        self.offset.x = x;
    }

    /// Set the local y offset.
    pub fn set_y(&mut self, y: i32) {
        self.offset.y = y;
    }

    /// Local `(x, y)`.
    pub fn xy(&self) -> (i32, i32) {
        (self.offset.x, self.offset.y)
    }

    /// Swap the drawn sprite, keeping any explicit draw size. Restarts the animation clock.
    pub fn set_sprite(&mut self, sprite: Arc<Sprite>) {
        match &mut self.payload {
            Payload::Sprite(p) => p.sprite = sprite,
            other => {
                *other = Payload::Sprite(SpritePayload {
                    sprite,
                    width: None,
                    height: None,
                })
            }
        }
        self.clock = 0.0;
    }

    /// Current sprite, if the payload is an image.
    pub fn current_sprite(&self) -> Option<&Arc<Sprite>> {
        match &self.payload {
            Payload::Sprite(p) => Some(&p.sprite),
            _ => None,
        }
    }

    /// Mutable text run, if the payload is text.
    pub fn text_run_mut(&mut self) -> Option<&mut TextRun> {
        match &mut self.payload {
            Payload::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Run `then` after `after_secs` of node ticks.
    pub fn schedule(&mut self, after_secs: f64, then: TimerAction) {
        self.timers.push(NodeTimer {
            remaining: after_secs,
            then,
        });
    }

    /// Cancel pending sprite swaps, returning the first one's sprite.
    pub(crate) fn take_pending_sprite(&mut self) -> Option<Arc<Sprite>> {
        let mut first = None;
        self.timers.retain(|timer| match &timer.then {
            TimerAction::SetSprite(s) => {
                first.get_or_insert_with(|| s.clone());
                false
            }
            _ => true,
        });
        first
    }

    /// Jitter the painted position of this node (and its subtree) for `secs`.
    pub fn start_shake(&mut self, amplitude: i32, secs: f64) {
        self.shake = Some(Shake {
            amplitude,
            remaining: secs,
            tick: 0,
        });
    }

    /// Glide the local `(x, y)` to `to` over `secs`, driven by the node's tick.
    pub fn start_tween(&mut self, to: (i32, i32), secs: f64, ease: Ease) {
        if secs.is_nan() || secs <= 0.0 {
            self.offset.x = to.0;
            self.offset.y = to.1;
            self.tween = None;
            return;
        }
        self.tween = Some(Tween {
            from: self.xy(),
            to,
            duration: secs,
            elapsed: 0.0,
            ease,
        });
    }

    /// Return `true` while a tween is in flight.
    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    pub(crate) fn shake_offset(&self) -> (i32, i32) {
        self.shake.map(|s| s.offset()).unwrap_or((0, 0))
    }

    /// Per-frame hook: animation clock, timers, shake and tween.
    pub(crate) fn tick(&mut self, dt: f64) {
        self.clock += dt;

        if let Some(tw) = self.tween.as_mut() {
            tw.elapsed += dt;
            let t = tw.ease.apply(tw.elapsed / tw.duration);
            self.offset.x = lerp_i32(tw.from.0, tw.to.0, t);
            self.offset.y = lerp_i32(tw.from.1, tw.to.1, t);
            if t >= 1.0 {
                self.offset.x = tw.to.0;
                self.offset.y = tw.to.1;
                self.tween = None;
            }
        }

        if let Some(sh) = self.shake.as_mut() {
            sh.remaining -= dt;
            sh.tick = sh.tick.wrapping_add(1);
            if sh.remaining <= 0.0 {
                self.shake = None;
            }
        }

        if self.timers.is_empty() {
            return;
        }
        let mut due = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                due.push(timer.then.clone());
                false
            } else {
                true
            }
        });
        for action in due {
            match action {
                TimerAction::SetSprite(s) => self.set_sprite(s),
                TimerAction::Hide => self.hide(),
                TimerAction::Show => self.show(),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
