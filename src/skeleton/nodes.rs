use nalgebra::Vector2;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// A vertex of the shrinking wavefront. It moves with constant velocity
/// (`bisector`) starting from the skeleton vertex `vertex_ndx` and sits between
/// the wavefront edges that descend from the contour edges `left_edge`
/// (incoming) and `right_edge` (outgoing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub ndx: usize,
    pub next_ndx: usize,
    pub prev_ndx: usize,
    pub bisector: Vector2<f64>,
    pub vertex_ndx: usize,
    pub left_edge: usize,
    pub right_edge: usize,
    pub reflex: bool,
}
impl Node {
    /// an unlinked node, the links and index are assigned by [`Nodes`]
    pub fn new(vertex_ndx:usize, left_edge:usize, right_edge:usize, bisector:Vector2<f64>, reflex:bool) -> Self {
        Node{
            ndx: usize::MAX,
            next_ndx: usize::MAX,
            prev_ndx: usize::MAX,
            bisector,
            vertex_ndx,
            left_edge,
            right_edge,
            reflex,
        }
    }
    pub fn with_links(mut self, prev_ndx:usize, next_ndx:usize) -> Self {
        self.prev_ndx = prev_ndx;
        self.next_ndx = next_ndx;
        self
    }
    /// zero velocity nodes sit between two anti parallel wavefront edges
    pub fn is_stationary(&self) -> bool {
        self.bisector == Vector2::zeros()
    }
}
impl Display for Node{
    fn fmt(&self, b:&mut std::fmt::Formatter<'_>) -> Result<(),std::fmt::Error>{
        write!(b, "ndx: {} next: {} prev: {} bisector: [{} {}] vert_ndx: {} edges: {}-{}{}",
            self.ndx,
            self.next_ndx,
            self.prev_ndx,
            self.bisector[0],
            self.bisector[1],
            self.vertex_ndx,
            self.left_edge,
            self.right_edge,
            if self.reflex {" reflex"} else {""},
            )
    }
}

/// Arena of wavefront nodes forming one or more circular doubly linked lists.
/// Nodes are never removed, only deactivated.
#[derive(Debug,Default)]
pub struct Nodes {
    pub nodes: Vec<Node>,
    active_nodes: BTreeSet<usize>,
    /// active nodes per contour edge they start, indexed by `right_edge`
    edge_carriers: Vec<usize>,
}
impl Nodes {
    pub fn insert(&mut self, mut node:Node) -> usize {
        let ndx = self.nodes.len();
        node.ndx = ndx;
        self.active_nodes.insert(ndx);
        if self.edge_carriers.len() <= node.right_edge {
            self.edge_carriers.resize(node.right_edge + 1, 0);
        }
        self.edge_carriers[node.right_edge] += 1;
        self.nodes.push(node);
        ndx
    }
    pub fn link(&mut self, prev_ndx:usize, next_ndx:usize) {
        self.nodes[prev_ndx].next_ndx = next_ndx;
        self.nodes[next_ndx].prev_ndx = prev_ndx;
    }
    pub fn deactivate(&mut self, node_ndx:usize){
        if self.active_nodes.remove(&node_ndx) {
            self.edge_carriers[self.nodes[node_ndx].right_edge] -= 1;
        }
    }
    /// true if some active wavefront edge descends from the contour edge
    pub fn edge_is_active(&self, edge_ndx:usize) -> bool {
        self.edge_carriers.get(edge_ndx).is_some_and(|count| *count > 0)
    }
    /// Replaces the consecutive nodes of `chain` by `node`
    pub fn merge(&mut self, chain:&[usize], node:Node) -> usize {
        let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
            return self.insert(node)
        };
        let prev_ndx = self.nodes[*first].prev_ndx;
        let next_ndx = self.nodes[*last].next_ndx;
        let ndx = self.insert(node.with_links(prev_ndx, next_ndx));
        self.link(prev_ndx, ndx);
        self.link(ndx, next_ndx);
        for node_ndx in chain {
            self.deactivate(*node_ndx);
        }
        ndx
    }
    /// Replaces `splitting_ndx` by two nodes. Both nodes must carry the links
    /// to their new neighbours.
    pub fn split(&mut self, splitting_ndx:usize, left_node:Node, right_node:Node) -> [usize;2] {
        let left_ndx = self.insert(left_node);
        self.link(left_node.prev_ndx, left_ndx);
        self.link(left_ndx, left_node.next_ndx);

        let right_ndx = self.insert(right_node);
        self.link(right_node.prev_ndx, right_ndx);
        self.link(right_ndx, right_node.next_ndx);

        self.deactivate(splitting_ndx);
        [left_ndx, right_ndx]
    }
    pub fn next(&self, node_ndx:usize) -> &Node {
        &self.nodes[self.nodes[node_ndx].next_ndx]
    }
    pub fn prev(&self, node_ndx:usize) -> &Node {
        &self.nodes[self.nodes[node_ndx].prev_ndx]
    }
    pub fn len(&self) -> usize {
        self.active_nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.active_nodes.is_empty()
    }
    pub fn contains(&self, index:usize) -> bool {
        self.active_nodes.contains(&index)
    }
    /// number of nodes in the cycle containing `node_ndx`
    pub fn cycle_len(&self, node_ndx:usize) -> usize {
        self.iter_from(node_ndx).count()
    }
}
// Itterators
impl Nodes {
    /// active node indices in ascending order
    pub fn active_nodes_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_nodes.iter().copied()
    }
    /// walks the cycle forward starting with `starting_ndx`
    pub fn iter_from(&self, starting_ndx:usize) -> NodesIntoIterator {
        NodesIntoIterator{
            starting: starting_ndx,
            nodes: self,
            next_node: Some(starting_ndx),
            steps: 0,
            backwards: false,
        }
    }
    /// walks the cycle backwards starting with `starting_ndx`
    pub fn back_iter_from(&self, starting_ndx:usize) -> NodesIntoIterator {
        NodesIntoIterator{
            starting: starting_ndx,
            nodes: self,
            next_node: Some(starting_ndx),
            steps: 0,
            backwards: true,
        }
    }
}
pub struct NodesIntoIterator<'a>{
    starting:usize,
    nodes:&'a Nodes,
    next_node:Option<usize>,
    steps:usize,
    backwards:bool,
}
impl <'a> Iterator for NodesIntoIterator<'a>{
    type Item = &'a Node;
    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes.nodes[self.next_node?];
        self.steps += 1;
        let following = if self.backwards { node.prev_ndx } else { node.next_ndx };
        // a broken cycle must not loop forever
        self.next_node = if following == self.starting || self.steps >= self.nodes.nodes.len() {
            None
        } else {
            Some(following)
        };
        Some(node)
    }
}
impl Display for Nodes{
    fn fmt(&self, b: &mut Formatter)->Result<(),fmt::Error> {

        writeln!(b,"\x1b[1m|             Nodes            | Bisector  |  Edges  |")?;
        writeln!(b,"\x1b[1;4m| ndx | next | prev | vert_ndx |  x  |  y  | left right|\x1b[0m")?;
        for node in self.nodes.iter() {
            if self.active_nodes.contains(&node.ndx){
                write!(b,"\x1b[036m")?;
            }
            write!(b,"| {:<4}| {:<4} | {:<4} | {:<4}     |{:+.2}|{:+.2}| {:<4} {:<4}|",
                node.ndx,
                node.next_ndx,
                node.prev_ndx,
                node.vertex_ndx,
                node.bisector[0],
                node.bisector[1],
                node.left_edge,
                node.right_edge,
                )?;
            writeln!(b,"\x1b[0m  ")?;
        }
        Ok(())
    }
}
