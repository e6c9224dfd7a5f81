use std::collections::VecDeque;

use crate::timeline::action::{Action, ActionCtx, ActionFinisher, ActionId, FinishQueue};

struct Queued {
    id: ActionId,
    action: Action,
}

/// Serial FIFO executor: exactly one action runs at a time.
///
/// The head is started the first frame it is seen and updated every frame until it reports
/// completion through its [`ActionFinisher`]. Completion pops the head; the next action starts on
/// the following `update`.
pub struct Sequencer {
    queue: VecDeque<Queued>,
    current: Option<ActionId>,
    next_id: u64,
    finished: FinishQueue,
    completed_count: u64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Empty sequencer.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            next_id: 0,
            finished: FinishQueue::default(),
            completed_count: 0,
        }
    }

    /// Append an action to the back of the queue.
    pub fn push(&mut self, action: impl Into<Action>) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.queue.push_back(Queued {
            id,
            action: action.into(),
        });
        id
    }

    /// Number of pending actions, including the running one.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Return `true` when no action is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle of the action that has been started and not yet finished.
    pub fn current(&self) -> Option<ActionId> {
        let head = self.queue.front()?.id;
        (self.current == Some(head)).then_some(head)
    }

    /// Number of actions that have finished so far.
    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    /// Advance the queue head by `dt`. Returns `false` when there was nothing to run.
    pub fn update(&mut self, dt: f64, ctx: &mut ActionCtx<'_>) -> bool {
        self.drain_finished();
        let Some(head) = self.queue.front_mut() else {
            return false;
        };

        let id = head.id;
        if self.current != Some(id) {
            self.current = Some(id);
            tracing::debug!(action = head.action.label(), id = id.0, "start action");
            ctx.finisher = Some(ActionFinisher::new(id, self.finished.clone()));
            head.action.start(ctx);
        }

        ctx.finisher = Some(ActionFinisher::new(id, self.finished.clone()));
        head.action.update(dt, ctx);
        ctx.finisher = None;

        self.drain_finished();
        true
    }

    /// Pop the running head. Actions report through [`ActionCtx::action_finished`] instead; this
    /// is the direct form for callers that own the sequencer.
    pub fn action_finished(&mut self) {
        if let Some(q) = self.queue.pop_front() {
            tracing::debug!(action = q.action.label(), id = q.id.0, "finish action");
            self.completed_count += 1;
        }
    }

    /// Pop actions that reported completion outside [`update`](Self::update).
    pub(crate) fn settle(&mut self) {
        self.drain_finished();
    }

    fn drain_finished(&mut self) {
        loop {
            let Some(id) = self.finished.borrow_mut().pop_front() else {
                break;
            };
            match self.queue.front() {
                Some(q) if q.id == id => self.action_finished(),
                _ => tracing::warn!(
                    id = id.0,
                    "ignoring finish signal from an action that is not running"
                ),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sequencer.rs"]
mod tests;
