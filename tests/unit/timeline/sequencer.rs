use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::dialogue::interpreter::{DialogueInterpreter, InterpreterConfig};
use crate::director::audio::AudioLog;
use crate::scene::graph::SceneGraph;

struct Harness {
    scene: SceneGraph,
    dialogue: DialogueInterpreter,
    audio: AudioLog,
}

impl Harness {
    fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            dialogue: DialogueInterpreter::new(InterpreterConfig::default()).unwrap(),
            audio: AudioLog::new(),
        }
    }

    fn update(&mut self, seq: &mut Sequencer, dt: f64) -> bool {
        let mut ctx = ActionCtx::new(&mut self.scene, &mut self.dialogue, &mut self.audio, 0.0);
        seq.update(dt, &mut ctx)
    }
}

#[test]
fn empty_queue_is_a_no_op() {
    let mut h = Harness::new();
    let mut seq = Sequencer::new();
    assert!(!h.update(&mut seq, 1.0));
    assert_eq!(seq.current(), None);
}

#[test]
fn drains_n_instant_actions_in_n_frames_fifo() {
    let mut h = Harness::new();
    let mut seq = Sequencer::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    for i in 0..5 {
        let log = log.clone();
        seq.push(Action::run(move |_| log.borrow_mut().push(i)));
    }

    for frame in 1..=5 {
        assert!(h.update(&mut seq, 1.0 / 30.0));
        assert_eq!(*log.borrow(), (0..frame).collect::<Vec<_>>());
    }
    assert!(seq.is_empty());
    assert_eq!(seq.completed_count(), 5);
}

#[test]
fn head_starts_once_and_runs_alone() {
    let mut h = Harness::new();
    let mut seq = Sequencer::new();
    let first = seq.push(Action::wait(0.05).unwrap());
    let second = seq.push(Action::wait(0.05).unwrap());
    assert_eq!(seq.current(), None);

    h.update(&mut seq, 0.04);
    assert_eq!(seq.current(), Some(first));
    h.update(&mut seq, 0.04);
    // First wait finished this frame; the second one has not started yet.
    assert_eq!(seq.current(), None);
    assert_eq!(seq.len(), 1);

    h.update(&mut seq, 0.04);
    assert_eq!(seq.current(), Some(second));
}

#[test]
fn stale_finish_signals_are_ignored() {
    let mut h = Harness::new();
    let mut seq = Sequencer::new();
    seq.push(Action::wait(10.0).unwrap());
    seq.push(Action::wait(10.0).unwrap());
    h.update(&mut seq, 0.1);

    ActionFinisher::new(ActionId(1), seq.finished.clone()).finish();
    ActionFinisher::new(ActionId(42), seq.finished.clone()).finish();
    h.update(&mut seq, 0.1);
    assert_eq!(seq.len(), 2);
}

#[test]
fn callbacks_can_defer_completion_with_the_finisher() {
    let mut h = Harness::new();
    let mut seq = Sequencer::new();
    let parked: Rc<RefCell<Option<ActionFinisher>>> = Rc::default();
    let slot = parked.clone();
    seq.push(Action::run(move |ctx| {
        *slot.borrow_mut() = ctx.take_finisher();
    }));

    h.update(&mut seq, 0.1);
    h.update(&mut seq, 0.1);
    assert_eq!(seq.len(), 1);

    let finisher = parked.borrow_mut().take().unwrap();
    finisher.finish();
    h.update(&mut seq, 0.1);
    assert!(seq.is_empty());
}

#[test]
fn direct_action_finished_pops_the_head() {
    let mut seq = Sequencer::new();
    seq.push(Action::wait(1.0).unwrap());
    seq.action_finished();
    assert!(seq.is_empty());
    assert_eq!(seq.completed_count(), 1);
}
