use std::cell::Cell;

use super::*;
use crate::dialogue::interpreter::InterpreterConfig;
use crate::foundation::core::Rgba8;
use crate::scene::node::SceneNode;
use crate::timeline::sequencer::Sequencer;

struct World {
    scene: SceneGraph,
    dialogue: DialogueInterpreter,
    audio: AudioLog,
    seq: Sequencer,
}

impl World {
    fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            dialogue: DialogueInterpreter::new(InterpreterConfig {
                chars_per_second: 10.0,
                post_reveal_hold_secs: 0.5,
            })
            .unwrap(),
            audio: AudioLog::new(),
            seq: Sequencer::new(),
        }
    }

    fn node(&mut self, x: i32, y: i32) -> NodeId {
        let root = self.scene.root();
        self.scene
            .add(root, SceneNode::fill("n", 1, 1, Rgba8::WHITE).at(x, y, 0))
    }

    fn step(&mut self, dt: f64) {
        let mut ctx = ActionCtx::new(&mut self.scene, &mut self.dialogue, &mut self.audio, 0.0);
        self.seq.update(dt, &mut ctx);
        self.dialogue.update(dt);
    }
}

#[test]
fn constructors_reject_out_of_domain_durations() {
    let id = NodeId(0);
    assert!(MoveAction::new(id, (1, 1), 0.0, Ease::Linear).is_err());
    assert!(MoveAction::new(id, (1, 1), f64::INFINITY, Ease::Linear).is_err());
    assert!(WaitAction::new(-1.0).is_err());
    assert!(Action::wait(f64::NAN).is_err());
    assert!(MoveAction::new(id, (1, 1), 1.0, Ease::Custom(|_| 0.5)).is_err());
}

#[test]
fn move_interpolates_from_the_position_captured_at_first_update() {
    let mut w = World::new();
    let n = w.node(0, 0);
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    w.seq.push(
        MoveAction::new(n, (100, -50), 1.0, Ease::Linear)
            .unwrap()
            .on_complete(move |_| h.set(h.get() + 1)),
    );
    // Moved after queueing but before the action starts: the origin follows.
    w.scene.node_mut(n).set_x(20);

    w.step(0.25);
    assert_eq!(w.scene.node(n).xy(), (40, -12));
    w.step(0.25);
    assert_eq!(w.scene.node(n).xy(), (60, -25));
    w.step(0.5);
    assert_eq!(w.scene.node(n).xy(), (100, -50));
    assert_eq!(hits.get(), 1);
    assert!(w.seq.is_empty());
}

#[test]
fn move_fires_its_callback_once_when_updated_past_completion() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let n = scene.add(root, SceneNode::new("n"));
    let mut dialogue = DialogueInterpreter::new(InterpreterConfig::default()).unwrap();
    let mut audio = AudioLog::new();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let mut action = MoveAction::new(n, (9, 9), 0.1, Ease::InOutCubic)
        .unwrap()
        .on_complete(move |_| h.set(h.get() + 1));

    let queue = FinishQueue::default();
    for _ in 0..5 {
        let mut ctx = ActionCtx::new(&mut scene, &mut dialogue, &mut audio, 0.0);
        ctx.finisher = Some(ActionFinisher::new(ActionId(7), queue.clone()));
        action.update(0.1, &mut ctx);
    }
    assert_eq!(scene.node(n).xy(), (9, 9));
    assert_eq!(hits.get(), 1);
    assert_eq!(queue.borrow().len(), 1);
}

#[test]
fn wait_finishes_when_elapsed_strictly_exceeds_duration() {
    let mut w = World::new();
    w.seq.push(WaitAction::new(1.0).unwrap());
    let mut ticks = 0;
    while !w.seq.is_empty() {
        w.step(1.0 / 30.0);
        ticks += 1;
        assert!(ticks < 100);
    }
    assert_eq!(ticks, 31);
}

#[test]
fn wait_on_an_exact_boundary_takes_one_more_frame() {
    let mut w = World::new();
    w.seq.push(WaitAction::new(1.0).unwrap());
    for _ in 0..4 {
        w.step(0.25);
    }
    assert_eq!(w.seq.len(), 1);
    w.step(0.25);
    assert!(w.seq.is_empty());
}

#[test]
fn instant_actions_apply_and_finish_in_one_frame() {
    let mut w = World::new();
    let n = w.node(5, 5);
    w.seq.push(SetPositionAction::new(n, (-3, 4)).on_complete(|ctx| ctx.audio.play("a.wav", 1.0)));
    w.seq.push(Action::run(|ctx| ctx.scene.node_mut(NodeId(1)).hide()));

    w.step(0.0);
    assert_eq!(w.scene.node(n).xy(), (-3, 4));
    assert_eq!(w.audio.entries().len(), 1);
    assert_eq!(w.seq.len(), 1);

    w.step(0.0);
    assert!(!w.scene.node(n).visible);
    assert!(w.seq.is_empty());
}

#[test]
fn set_sprite_swaps_the_payload() {
    let dir = crate::test_support::temp_dir("action_sprite");
    crate::test_support::write_png(&dir, "a.png", 2, 2, [255, 0, 0, 255]);
    let mut store = crate::assets::store::AssetStore::new(&dir);
    let sprite = store.load_sprite("a.png").unwrap();

    let mut w = World::new();
    let n = w.node(0, 0);
    w.seq.push(Action::set_sprite(n, sprite.clone()));
    w.step(0.0);
    assert!(Arc::ptr_eq(w.scene.node(n).current_sprite().unwrap(), &sprite));
    assert!(w.seq.is_empty());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn dialogue_page_finishes_when_the_interpreter_completes() {
    let mut w = World::new();
    let page = Arc::new(DialoguePage::builder().text("Hi").build());
    w.seq.push(Action::display_page(page, Some("Maya".to_owned())));
    w.seq.push(Action::run(|_| {}));

    // 2 chars at 10 cps, then 0.5 s hold: done on the 7th 0.1 s step.
    for _ in 0..7 {
        w.step(0.1);
        assert_eq!(w.seq.len(), 2);
    }
    assert!(w.dialogue.is_idle());
    // The signal is drained on the next update, which also runs the callback action.
    w.step(0.1);
    assert!(w.seq.is_empty());
    assert_eq!(w.seq.completed_count(), 2);
}

#[test]
fn display_page_without_a_finisher_leaves_the_interpreter_idle() {
    let mut w = World::new();
    let mut action = Action::display_page(
        Arc::new(DialoguePage::builder().text("AB").build()),
        Some("Phoenix".to_owned()),
    );
    let mut ctx = ActionCtx::new(&mut w.scene, &mut w.dialogue, &mut w.audio, 0.0);
    action.start(&mut ctx);
    action.update(0.1, &mut ctx);
    assert!(w.dialogue.is_idle());
}
