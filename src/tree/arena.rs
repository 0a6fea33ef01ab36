//! Group/layer tree stored as an index arena.
//!
//! Every node lives in one `Vec` slot addressed by a [`NodeId`]. Groups own their children
//! as a list of ids; each node keeps its parent id for upward queries only. Nodes are only
//! ever attached under an existing group, so the structure cannot form cycles.

use crate::foundation::core::{IRect, Raster};
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::records::record::RecordFlags;

/// Stable handle to a node in a [`LayerTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Leaf payload: pixels plus placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Premultiplied pixels; pixel `(0, 0)` sits at `bounds.x, bounds.y` on the canvas.
    pub image: Raster,
    pub bounds: IRect,
    /// Fraction in `[0, 1]`.
    pub opacity: f32,
    pub flags: RecordFlags,
    /// Placeholder for a non-pixel shape record.
    pub shape: bool,
}

impl Layer {
    pub fn new(image: Raster, bounds: IRect, opacity: f32) -> Self {
        Self {
            image,
            bounds,
            opacity: opacity.clamp(0.0, 1.0),
            flags: RecordFlags::default(),
            shape: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Children in document order: index 0 is the bottom of the stack.
    Group { children: Vec<NodeId> },
    Layer(Layer),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }
}

/// The document's group tree. Slot 0 is always the root group named `"root"`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerTree {
    nodes: Vec<Node>,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    pub const ROOT_NAME: &'static str = "root";

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: Self::ROOT_NAME.to_string(),
                parent: None,
                kind: NodeKind::Group {
                    children: Vec::new(),
                },
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Borrow a node. Panics when `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a group in document order; empty for layers.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Group { children } => children,
            NodeKind::Layer(_) => &[],
        }
    }

    pub fn layer(&self, id: NodeId) -> Option<&Layer> {
        match &self.nodes.get(id.index())?.kind {
            NodeKind::Layer(layer) => Some(layer),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn layer_mut(&mut self, id: NodeId) -> Option<&mut Layer> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::Layer(layer) => Some(layer),
            NodeKind::Group { .. } => None,
        }
    }

    /// Layers are leaves, and so are groups without children (they hold no pixels).
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// Append an empty group as the new topmost child of `parent`.
    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> LayerstackResult<NodeId> {
        self.attach(
            parent,
            name.into(),
            NodeKind::Group {
                children: Vec::new(),
            },
        )
    }

    /// Append a layer as the new topmost child of `parent`.
    pub fn add_layer(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        layer: Layer,
    ) -> LayerstackResult<NodeId> {
        self.attach(parent, name.into(), NodeKind::Layer(layer))
    }

    fn attach(&mut self, parent: NodeId, name: String, kind: NodeKind) -> LayerstackResult<NodeId> {
        if !self.get(parent).is_some_and(Node::is_group) {
            return Err(LayerstackError::validation(format!(
                "node {} is not a group",
                parent.index()
            )));
        }
        if !self.is_attached(parent) {
            return Err(LayerstackError::validation(format!(
                "group '{}' has been removed from the tree",
                self.name(parent)
            )));
        }
        let id = NodeId(
            self.nodes
                .len()
                .try_into()
                .map_err(|_| LayerstackError::validation("node id overflow"))?,
        );
        self.nodes.push(Node {
            name,
            parent: Some(parent),
            kind,
        });
        if let NodeKind::Group { children } = &mut self.nodes[parent.index()].kind {
            children.push(id);
        }
        Ok(id)
    }

    /// Detach `id` (and its subtree) from its owning group.
    ///
    /// The slots stay allocated but become unreachable from the root.
    pub fn remove(&mut self, id: NodeId) -> LayerstackResult<()> {
        if id == self.root() {
            return Err(LayerstackError::validation("cannot remove the root group"));
        }
        let Some(parent) = self.get(id).and_then(Node::parent) else {
            return Err(LayerstackError::validation(format!(
                "node {} is not attached",
                id.index()
            )));
        };
        if let NodeKind::Group { children } = &mut self.nodes[parent.index()].kind {
            children.retain(|c| *c != id);
        }
        self.nodes[id.index()].parent = None;
        Ok(())
    }

    /// True when the parent chain of `id` reaches the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root() {
                return true;
            }
            match self.get(cur).and_then(Node::parent) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Names from the root's first child down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root() {
                break;
            }
            out.push(self.name(n));
            cur = self.parent(n);
        }
        out.reverse();
        out
    }

    /// Pre-order walk below the root, children in stored order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        let stack = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&c| (c, 0))
            .collect();
        DepthFirst { tree: self, stack }
    }

    /// Pixel-holding leaves in traversal (bottom-to-top) order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.depth_first()
            .filter(|(id, _)| self.layer(*id).is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of layers reachable from the root, counted from the live tree.
    pub fn num_layers(&self) -> usize {
        self.depth_first()
            .filter(|(id, _)| self.layer(*id).is_some())
            .count()
    }
}

/// Iterator returned by [`LayerTree::depth_first`]; yields `(node, depth)`.
pub struct DepthFirst<'a> {
    tree: &'a LayerTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for DepthFirst<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        for &c in self.tree.children(id).iter().rev() {
            self.stack.push((c, depth + 1));
        }
        Some((id, depth))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/arena.rs"]
mod tests;
