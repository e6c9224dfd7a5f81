use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::animation::ease::{Ease, lerp_i32};
use crate::assets::decode::Sprite;
use crate::dialogue::interpreter::DialogueInterpreter;
use crate::dialogue::page::DialoguePage;
use crate::director::audio::AudioLog;
use crate::foundation::core::ensure_positive;
use crate::foundation::error::ReelResult;
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

/// Side-effecting closure run with access to the frame's mutable state.
pub type Callback = Box<dyn FnOnce(&mut ActionCtx<'_>)>;

/// Identity of a queued action, unique per [`Sequencer`](crate::Sequencer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) u64);

pub(crate) type FinishQueue = Rc<RefCell<VecDeque<ActionId>>>;

/// One-shot "this action is done" signal bound to a specific action.
///
/// Consuming `finish` is the only way to report completion, so a finisher cannot fire twice.
#[derive(Debug)]
pub struct ActionFinisher {
    id: ActionId,
    queue: FinishQueue,
}

impl ActionFinisher {
    pub(crate) fn new(id: ActionId, queue: FinishQueue) -> Self {
        Self { id, queue }
    }

    /// Report completion to the owning sequencer.
    pub fn finish(self) {
        self.queue.borrow_mut().push_back(self.id);
    }
}

/// Mutable frame state handed to actions and callbacks.
pub struct ActionCtx<'a> {
    /// Scene tree.
    pub scene: &'a mut SceneGraph,
    /// Dialogue interpreter.
    pub dialogue: &'a mut DialogueInterpreter,
    /// Audio command log.
    pub audio: &'a mut AudioLog,
    /// Global time at the start of this frame, in seconds.
    pub time: f64,
    pub(crate) finisher: Option<ActionFinisher>,
}

impl<'a> ActionCtx<'a> {
    /// Bundle frame state for one sequencer update.
    pub fn new(
        scene: &'a mut SceneGraph,
        dialogue: &'a mut DialogueInterpreter,
        audio: &'a mut AudioLog,
        time: f64,
    ) -> Self {
        Self {
            scene,
            dialogue,
            audio,
            time,
            finisher: None,
        }
    }

    /// Signal that the running action has finished. Later calls in the same frame are no-ops.
    pub fn action_finished(&mut self) {
        if let Some(f) = self.finisher.take() {
            f.finish();
        }
    }

    /// Take the running action's finisher to report completion later.
    pub fn take_finisher(&mut self) -> Option<ActionFinisher> {
        self.finisher.take()
    }
}

/// Eased glide of a node's local `(x, y)` to a target.
pub struct MoveAction {
    node: NodeId,
    target: (i32, i32),
    duration: f64,
    ease: Ease,
    on_complete: Option<Callback>,
    origin: Option<(i32, i32)>,
    elapsed: f64,
    completed: bool,
}

impl MoveAction {
    /// Move `node` to `target` over `duration` seconds.
    pub fn new(node: NodeId, target: (i32, i32), duration: f64, ease: Ease) -> ReelResult<Self> {
        ensure_positive("move duration", duration)?;
        ease.validate_terminates()?;
        Ok(Self {
            node,
            target,
            duration,
            ease,
            on_complete: None,
            origin: None,
            elapsed: 0.0,
            completed: false,
        })
    }

    /// Run `f` once when the move completes.
    pub fn on_complete(mut self, f: impl FnOnce(&mut ActionCtx<'_>) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn update(&mut self, dt: f64, ctx: &mut ActionCtx<'_>) {
        if self.completed {
            return;
        }
        let node = ctx.scene.node_mut(self.node);
        let origin = *self.origin.get_or_insert(node.xy());

        self.elapsed += dt;
        let t = self.ease.apply(self.elapsed / self.duration);
        node.set_x(lerp_i32(origin.0, self.target.0, t));
        node.set_y(lerp_i32(origin.1, self.target.1, t));

        if t >= 1.0 {
            self.completed = true;
            if let Some(cb) = self.on_complete.take() {
                cb(ctx);
            }
            ctx.action_finished();
        }
    }
}

/// Instant jump of a node's local `(x, y)`.
pub struct SetPositionAction {
    node: NodeId,
    target: (i32, i32),
    on_complete: Option<Callback>,
    completed: bool,
}

impl SetPositionAction {
    /// Place `node` at `target`.
    pub fn new(node: NodeId, target: (i32, i32)) -> Self {
        Self {
            node,
            target,
            on_complete: None,
            completed: false,
        }
    }

    /// Run `f` once after the position is set.
    pub fn on_complete(mut self, f: impl FnOnce(&mut ActionCtx<'_>) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn update(&mut self, ctx: &mut ActionCtx<'_>) {
        if self.completed {
            return;
        }
        let node = ctx.scene.node_mut(self.node);
        node.set_x(self.target.0);
        node.set_y(self.target.1);
        self.completed = true;
        if let Some(cb) = self.on_complete.take() {
            cb(ctx);
        }
        ctx.action_finished();
    }
}

/// Idle for a fixed duration.
pub struct WaitAction {
    duration: f64,
    elapsed: f64,
    on_complete: Option<Callback>,
    completed: bool,
}

impl WaitAction {
    /// Wait `duration` seconds. Finishes on the first frame where elapsed time is strictly greater.
    pub fn new(duration: f64) -> ReelResult<Self> {
        ensure_positive("wait duration", duration)?;
        Ok(Self {
            duration,
            elapsed: 0.0,
            on_complete: None,
            completed: false,
        })
    }

    /// Run `f` once when the wait ends.
    pub fn on_complete(mut self, f: impl FnOnce(&mut ActionCtx<'_>) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn update(&mut self, dt: f64, ctx: &mut ActionCtx<'_>) {
        if self.completed {
            return;
        }
        self.elapsed += dt;
        if self.elapsed > self.duration {
            self.completed = true;
            if let Some(cb) = self.on_complete.take() {
                cb(ctx);
            }
            ctx.action_finished();
        }
    }
}

/// Queue entry: one timed mutation of the scene.
pub enum Action {
    /// Eased move; see [`MoveAction`].
    Move(MoveAction),
    /// Instant position; see [`SetPositionAction`].
    SetPosition(SetPositionAction),
    /// Pause; see [`WaitAction`].
    Wait(WaitAction),
    /// Instant sprite swap on a node.
    SetSprite {
        /// Target node.
        node: NodeId,
        /// Already-loaded replacement sprite.
        sprite: Arc<Sprite>,
    },
    /// Run an arbitrary callback once and finish the same frame.
    ///
    /// A callback that takes the finisher with [`ActionCtx::take_finisher`] keeps the action
    /// running until it calls [`ActionFinisher::finish`] itself.
    RunCallback(Option<Callback>),
    /// Hand a page to the dialogue interpreter; finishes when the interpreter completes it.
    DisplayDialoguePage {
        /// Page to reveal.
        page: Arc<DialoguePage>,
        /// Speaker shown on the nametag, if any.
        speaker: Option<String>,
    },
}

impl Action {
    /// Eased move of `node` to `target`.
    pub fn move_to(node: NodeId, target: (i32, i32), duration: f64, ease: Ease) -> ReelResult<Self> {
        Ok(Self::Move(MoveAction::new(node, target, duration, ease)?))
    }

    /// Instant position.
    pub fn set_position(node: NodeId, target: (i32, i32)) -> Self {
        Self::SetPosition(SetPositionAction::new(node, target))
    }

    /// Pause for `duration` seconds.
    pub fn wait(duration: f64) -> ReelResult<Self> {
        Ok(Self::Wait(WaitAction::new(duration)?))
    }

    /// Instant sprite swap.
    pub fn set_sprite(node: NodeId, sprite: Arc<Sprite>) -> Self {
        Self::SetSprite { node, sprite }
    }

    /// Run `f` once.
    pub fn run(f: impl FnOnce(&mut ActionCtx<'_>) + 'static) -> Self {
        Self::RunCallback(Some(Box::new(f)))
    }

    /// Display one dialogue page.
    pub fn display_page(page: Arc<DialoguePage>, speaker: Option<String>) -> Self {
        Self::DisplayDialoguePage { page, speaker }
    }

    /// Short variant name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::SetPosition(_) => "set_position",
            Self::Wait(_) => "wait",
            Self::SetSprite { .. } => "set_sprite",
            Self::RunCallback(_) => "run_callback",
            Self::DisplayDialoguePage { .. } => "display_dialogue_page",
        }
    }

    /// Called once when the action becomes the queue head.
    pub(crate) fn start(&mut self, ctx: &mut ActionCtx<'_>) {
        if let Self::DisplayDialoguePage { page, speaker } = self {
            let Some(finisher) = ctx.take_finisher() else {
                tracing::warn!("dialogue page started without a finisher; it can never complete");
                return;
            };
            ctx.dialogue.load(
                page.clone(),
                speaker.clone(),
                Box::new(move || finisher.finish()),
            );
        }
    }

    /// Called every frame while the action is the queue head, including its first frame.
    pub(crate) fn update(&mut self, dt: f64, ctx: &mut ActionCtx<'_>) {
        match self {
            Self::Move(m) => m.update(dt, ctx),
            Self::SetPosition(s) => s.update(ctx),
            Self::Wait(w) => w.update(dt, ctx),
            Self::SetSprite { node, sprite } => {
                ctx.scene.node_mut(*node).set_sprite(sprite.clone());
                ctx.action_finished();
            }
            Self::RunCallback(cb) => {
                if let Some(f) = cb.take() {
                    f(ctx);
                    ctx.action_finished();
                }
            }
            // The interpreter reports completion through the finisher taken in `start`.
            Self::DisplayDialoguePage { .. } => {}
        }
    }
}

impl From<MoveAction> for Action {
    fn from(a: MoveAction) -> Self {
        Self::Move(a)
    }
}

impl From<SetPositionAction> for Action {
    fn from(a: SetPositionAction) -> Self {
        Self::SetPosition(a)
    }
}

impl From<WaitAction> for Action {
    fn from(a: WaitAction) -> Self {
        Self::Wait(a)
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/action.rs"]
mod tests;
