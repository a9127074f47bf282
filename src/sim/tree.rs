//! Planning tree for one RRT* episode
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The root is
//! fixed at construction; every other node has exactly one parent and a cost
//! equal to its parent's cost plus the edge length.

use glam::Vec2;

/// Stable handle into a [`PlanningTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree vertex
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub pos: Vec2,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Path length from the root along tree edges
    pub cost: f32,
}

/// Ordered waypoints from the tree root to a goal, inclusive
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    pub fn first(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Sum of segment lengths
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

impl From<Vec<Vec2>> for Path {
    fn from(points: Vec<Vec2>) -> Self {
        Self { points }
    }
}

/// Arena-backed search tree, replaced wholesale on every replan
#[derive(Debug, Clone)]
pub struct PlanningTree {
    nodes: Vec<PlanNode>,
}

impl PlanningTree {
    pub fn new(root: Vec2) -> Self {
        Self {
            nodes: vec![PlanNode {
                pos: root,
                parent: None,
                children: Vec::new(),
                cost: 0.0,
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists for the tree's whole life
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn pos(&self, id: NodeId) -> Vec2 {
        self.nodes[id.0].pos
    }

    #[inline]
    pub fn cost(&self, id: NodeId) -> f32 {
        self.nodes[id.0].cost
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Add `pos` as a child of `parent` with the given edge length
    pub fn insert(&mut self, parent: NodeId, pos: Vec2, edge_cost: f32) -> NodeId {
        let id = NodeId(self.nodes.len());
        let cost = self.nodes[parent.0].cost + edge_cost;
        self.nodes.push(PlanNode {
            pos,
            parent: Some(parent),
            children: Vec::new(),
            cost,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Whether `ancestor` lies on the parent chain of `node` (a node is its own ancestor)
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Re-parent `node` under `new_parent` with cost `new_cost` and refresh every
    /// descendant's cost
    ///
    /// Returns false without touching the tree if the move would detach the root
    /// or create a cycle.
    pub fn rewire_parent(&mut self, node: NodeId, new_parent: NodeId, new_cost: f32) -> bool {
        if node == self.root() || self.is_ancestor(node, new_parent) {
            return false;
        }

        if let Some(old_parent) = self.nodes[node.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != node);
        }
        self.nodes[node.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(node);
        self.nodes[node.0].cost = new_cost;

        self.propagate_costs(node);
        true
    }

    /// Recompute cost for every descendant of `from` (worklist, no recursion)
    fn propagate_costs(&mut self, from: NodeId) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let (pos, cost) = (self.nodes[id.0].pos, self.nodes[id.0].cost);
            for i in 0..self.nodes[id.0].children.len() {
                let child = self.nodes[id.0].children[i];
                let node = &mut self.nodes[child.0];
                node.cost = cost + pos.distance(node.pos);
                stack.push(child);
            }
        }
    }

    /// Nearest node to `pos`; first minimum wins on ties
    pub fn nearest(&self, pos: Vec2) -> NodeId {
        let mut best = self.root();
        let mut best_dist = f32::INFINITY;
        for (i, node) in self.nodes.iter().enumerate() {
            let d = node.pos.distance_squared(pos);
            if d < best_dist {
                best_dist = d;
                best = NodeId(i);
            }
        }
        best
    }

    /// All nodes strictly closer than `radius` to `pos`, in insertion order
    pub fn nodes_within_radius(&self, pos: Vec2, radius: f32) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.pos.distance(pos) < radius)
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Walk the parent chain from `goal` and return the root -> goal path
    pub fn path_to(&self, goal: NodeId) -> Path {
        let mut points = Vec::new();
        let mut current = Some(goal);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            points.push(node.pos);
            current = node.parent;
        }
        points.reverse();
        Path { points }
    }

    /// `(parent, child)` position pairs for every non-root node
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.nodes
            .iter()
            .filter_map(|node| node.parent.map(|p| (self.nodes[p.0].pos, node.pos)))
    }
}
