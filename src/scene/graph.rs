use std::fmt::Write as _;

use crate::foundation::core::Offset3;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::node::{NodeId, Payload, SceneNode};

/// One paint request handed to a [`Compositor`], in paint order.
#[derive(Clone, Copy, Debug)]
pub struct DrawItem<'a> {
    /// Node being painted.
    pub node: NodeId,
    /// Node display name.
    pub name: &'a str,
    /// What to draw.
    pub payload: &'a Payload,
    /// Absolute x in pixels, including any shake jitter.
    pub x: i32,
    /// Absolute y in pixels, including any shake jitter.
    pub y: i32,
    /// Node animation clock in seconds (selects animated sprite frames).
    pub clock: f64,
}

/// Paints payloads at absolute positions.
///
/// Implementations own all pixel work; the graph only decides what is drawn and in which order.
pub trait Compositor {
    /// Draw one item. Called in paint order, back to front.
    fn draw(&mut self, item: DrawItem<'_>) -> ReelResult<()>;
}

/// Arena-backed scene tree.
///
/// Nodes are addressed by [`NodeId`] handles. The root exists from construction, is never painted,
/// and cannot be reparented.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only a root node named `Root`.
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new("Root")],
            root: NodeId(0),
        }
    }

    /// Root handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is always present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `node` and append it to `parent`'s children.
    pub fn add(&mut self, parent: NodeId, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.index()]
    }

    /// First node (pre-order, root included) with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants())
            .find(|&id| self.node(id).name == name)
    }

    /// Move `node` under `new_parent`, appending it to the new parent's children.
    ///
    /// The detach and attach happen in one call, so the node is never listed under two parents or
    /// left without one. Rejects moving the root and moves that would create a cycle.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> ReelResult<()> {
        if node == self.root {
            return Err(ReelError::validation("the root node cannot be reparented"));
        }
        let mut p = Some(new_parent);
        while let Some(cur) = p {
            if cur == node {
                return Err(ReelError::validation(format!(
                    "reparenting '{}' under its own subtree would create a cycle",
                    self.node(node).name
                )));
            }
            p = self.node(cur).parent;
        }

        if let Some(old) = self.nodes[node.index()].parent {
            self.nodes[old.index()].children.retain(|&c| c != node);
        }
        self.nodes[new_parent.index()].children.push(node);
        self.nodes[node.index()].parent = Some(new_parent);
        Ok(())
    }

    /// Sum of local offsets from `id` up to and including the root.
    pub fn absolute_position(&self, id: NodeId) -> Offset3 {
        let mut out = Offset3::default();
        let mut p = Some(id);
        while let Some(cur) = p {
            let n = self.node(cur);
            out = out + n.offset;
            p = n.parent;
        }
        out
    }

    /// `false` if `id` or any ancestor is hidden.
    pub fn absolute_visibility(&self, id: NodeId) -> bool {
        let mut p = Some(id);
        while let Some(cur) = p {
            let n = self.node(cur);
            if !n.visible {
                return false;
            }
            p = n.parent;
        }
        true
    }

    fn shake_offset_chain(&self, id: NodeId) -> (i32, i32) {
        let mut out = (0, 0);
        let mut p = Some(id);
        while let Some(cur) = p {
            let n = self.node(cur);
            let (dx, dy) = n.shake_offset();
            out.0 += dx;
            out.1 += dy;
            p = n.parent;
        }
        out
    }

    /// All nodes below the root in pre-order (parent before children, siblings in insertion order).
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut stack: Vec<NodeId> = self.node(self.root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Visible descendants stably sorted by local z.
    ///
    /// This is one flat sort over the whole tree: equal z keeps pre-order, and a child may paint
    /// behind an unrelated lower-z node elsewhere in the tree.
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = self
            .descendants()
            .into_iter()
            .filter(|&id| self.absolute_visibility(id))
            .collect();
        order.sort_by_key(|&id| self.node(id).offset.z);
        order
    }

    /// Advance every descendant's tick hook in pre-order (not paint order).
    pub fn update(&mut self, dt: f64) {
        for id in self.descendants() {
            self.nodes[id.index()].tick(dt);
        }
    }

    /// Paint visible nodes back to front through `compositor`.
    pub fn render(&self, compositor: &mut dyn Compositor) -> ReelResult<()> {
        for id in self.paint_order() {
            let n = self.node(id);
            if matches!(n.payload, Payload::None) {
                continue;
            }
            let pos = self.absolute_position(id);
            let (sx, sy) = self.shake_offset_chain(id);
            compositor.draw(DrawItem {
                node: id,
                name: &n.name,
                payload: &n.payload,
                x: pos.x + sx,
                y: pos.y + sy,
                clock: n.clock,
            })?;
        }
        Ok(())
    }

    /// Indented dump of the tree, one node per line.
    pub fn hierarchy(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let n = self.node(id);
            let _ = writeln!(
                out,
                "{}\"{}\" ({}, {}, {}){}",
                "\t".repeat(depth),
                n.name,
                n.offset.x,
                n.offset.y,
                n.offset.z,
                if n.visible { "" } else { " [hidden]" }
            );
            for &c in n.children.iter().rev() {
                stack.push((c, depth + 1));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
