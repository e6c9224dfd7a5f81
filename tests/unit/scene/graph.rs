use super::*;
use crate::foundation::core::Rgba8;

#[derive(Default)]
struct Recorder {
    drawn: Vec<(String, i32, i32)>,
}

impl Compositor for Recorder {
    fn draw(&mut self, item: DrawItem<'_>) -> ReelResult<()> {
        self.drawn.push((item.name.to_owned(), item.x, item.y));
        Ok(())
    }
}

fn fill(name: &str, x: i32, y: i32, z: i32) -> SceneNode {
    SceneNode::fill(name, 1, 1, Rgba8::WHITE).at(x, y, z)
}

fn names(g: &SceneGraph, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| g.node(id).name.clone()).collect()
}

#[test]
fn absolute_position_sums_the_ancestor_chain() {
    let mut g = SceneGraph::new();
    let bg = g.add(g.root(), fill("bg", -100, 5, 0));
    let stand = g.add(bg, fill("stand", 1034, 2, 2));
    let badge = g.add(stand, fill("badge", 3, -4, 1));

    assert_eq!(g.absolute_position(bg), Offset3::new(-100, 5, 0));
    assert_eq!(g.absolute_position(badge), Offset3::new(937, 3, 3));

    g.node_mut(g.root()).set_y(-15);
    assert_eq!(g.absolute_position(badge).y, -12, "positions are never cached");
}

#[test]
fn hidden_ancestor_hides_descendants() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 0, 0, 0));
    let b = g.add(a, fill("b", 0, 0, 0));
    let c = g.add(b, fill("c", 0, 0, 0));

    assert!(g.absolute_visibility(c));
    g.node_mut(a).hide();
    assert!(!g.absolute_visibility(b));
    assert!(!g.absolute_visibility(c));
    g.node_mut(a).show();
    g.node_mut(c).hide();
    assert!(g.absolute_visibility(b));
    assert!(!g.absolute_visibility(c));

    g.node_mut(g.root()).hide();
    assert!(!g.absolute_visibility(a));
}

#[test]
fn paint_order_is_a_stable_global_z_sort() {
    let mut g = SceneGraph::new();
    g.add(g.root(), fill("first", 0, 0, 5));
    g.add(g.root(), fill("low", 0, 0, 1));
    g.add(g.root(), fill("second", 0, 0, 5));

    assert_eq!(names(&g, &g.paint_order()), ["low", "first", "second"]);
}

#[test]
fn child_can_paint_behind_unrelated_node() {
    let mut g = SceneGraph::new();
    let parent = g.add(g.root(), fill("parent", 0, 0, 10));
    g.add(parent, fill("child", 0, 0, 0));
    g.add(g.root(), fill("other", 0, 0, 5));

    assert_eq!(names(&g, &g.paint_order()), ["child", "other", "parent"]);
}

#[test]
fn render_skips_hidden_and_empty_nodes() {
    let mut g = SceneGraph::new();
    let group = g.add(g.root(), SceneNode::new("group").at(10, 20, 0));
    g.add(group, fill("shown", 1, 1, 1));
    let hidden = g.add(group, fill("hidden", 0, 0, 2));
    g.node_mut(hidden).hide();

    let mut rec = Recorder::default();
    g.render(&mut rec).unwrap();
    assert_eq!(rec.drawn, vec![("shown".to_owned(), 11, 21)]);
}

#[test]
fn render_applies_shake_to_subtree_only_at_paint_time() {
    let mut g = SceneGraph::new();
    let bg = g.add(g.root(), fill("bg", 0, 0, 0));
    let stand = g.add(bg, fill("stand", 5, 0, 1));
    g.node_mut(bg).start_shake(3, 1.0);

    let mut rec = Recorder::default();
    g.render(&mut rec).unwrap();
    assert_eq!(rec.drawn[1], ("stand".to_owned(), 8, 0));
    assert_eq!(g.absolute_position(stand), Offset3::new(5, 0, 1));
}

#[test]
fn reparent_moves_atomically() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 1, 0, 0));
    let b = g.add(g.root(), fill("b", 10, 0, 0));
    let n = g.add(a, fill("n", 100, 0, 0));

    g.reparent(n, b).unwrap();
    assert!(g.node(a).children().is_empty());
    assert_eq!(g.node(b).children(), &[n]);
    assert_eq!(g.node(n).parent(), Some(b));
    assert_eq!(g.absolute_position(n).x, 110);
    assert_eq!(g.descendants().iter().filter(|&&id| id == n).count(), 1);
}

#[test]
fn reparent_rejects_cycles_and_root() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 0, 0, 0));
    let b = g.add(a, fill("b", 0, 0, 0));

    assert!(g.reparent(a, b).is_err());
    assert!(g.reparent(a, a).is_err());
    assert!(g.reparent(g.root(), a).is_err());
    assert_eq!(g.node(a).children(), &[b]);
    assert_eq!(g.node(b).parent(), Some(a));
}

#[test]
fn descendants_are_preorder_and_find_uses_names() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 0, 0, 0));
    g.add(a, fill("a1", 0, 0, 0));
    g.add(g.root(), fill("b", 0, 0, 0));
    g.add(a, fill("a2", 0, 0, 0));

    assert_eq!(names(&g, &g.descendants()), ["a", "a1", "a2", "b"]);
    assert_eq!(g.find("a2").map(|id| g.node(id).name.clone()).as_deref(), Some("a2"));
    assert_eq!(g.find("Root"), Some(g.root()));
    assert!(g.find("zzz").is_none());
}

#[test]
fn update_ticks_every_descendant() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 0, 0, 0));
    let b = g.add(a, fill("b", 0, 0, 0));
    g.node_mut(b).schedule(0.1, crate::scene::node::TimerAction::Hide);
    g.update(0.1);
    assert!(!g.node(b).visible);
    assert_eq!(g.node(a).clock, 0.1);
}

#[test]
fn hierarchy_dump_indents_children() {
    let mut g = SceneGraph::new();
    let a = g.add(g.root(), fill("a", 1, 2, 3));
    g.add(a, fill("b", 0, 0, 0).hidden());
    let dump = g.hierarchy();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines[0], "\"Root\" (0, 0, 0)");
    assert_eq!(lines[1], "\t\"a\" (1, 2, 3)");
    assert_eq!(lines[2], "\t\t\"b\" (0, 0, 0) [hidden]");
}
