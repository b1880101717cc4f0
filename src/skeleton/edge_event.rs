use std::collections::VecDeque;

use crate::skeleton::*;

impl SkeletonBuilder {
    pub(super) fn find_edge_event(&mut self, node_ndx:usize) -> Result<(), SkeletonError> {
        if let Some(event) = self.compute_edge_event(node_ndx) {
            self.push_event(event)?;
        }
        Ok(())
    }
    /// Time at which the wavefront edge from `node_ndx` to its successor
    /// shrinks to zero length, if it ever does
    pub(super) fn compute_edge_event(&self, node_ndx:usize) -> Option<Event> {
        let edge_start = &self.shrinking_polygon.nodes[node_ndx];
        let edge_end = self.shrinking_polygon.next(node_ndx);
        if edge_start.ndx == edge_end.ndx { return None }

        let start_v = &self.vertices[edge_start.vertex_ndx];
        let end_v = &self.vertices[edge_end.vertex_ndx];
        let max_time = start_v.time.max(end_v.time);

        let start_p = self.position(edge_start, max_time);
        let end_p = self.position(edge_end, max_time);
        let t = collapse_time(&start_p, &edge_start.bisector, &end_p, &edge_end.bisector, self.tolerance)?;

        Some(Event {
            time: OrderedFloat(t + max_time),
            node: edge_start.ndx,
            event_type: EventType::Edge{ next_ndx: edge_end.ndx },
        })
    }

    pub(super) fn handle_edge_event(&mut self, node_ndx:usize, time:f64) -> Result<Option<FiredEvent>, SkeletonError> {
        let edge_start = self.shrinking_polygon.nodes[node_ndx];
        let edge_end = *self.shrinking_polygon.next(node_ndx);

        let point = nalgebra::center(&self.position(&edge_start, time), &self.position(&edge_end, time));

        // every neighbour that arrives at the same point collapses with the edge
        let cycle_len = self.shrinking_polygon.cycle_len(node_ndx);
        let mut chain = VecDeque::from([edge_start.ndx, edge_end.ndx]);
        let mut next_ndx = edge_end.next_ndx;
        while chain.len() < cycle_len && self.reaches(next_ndx, &point, time) {
            chain.push_back(next_ndx);
            next_ndx = self.shrinking_polygon.nodes[next_ndx].next_ndx;
        }
        let mut prev_ndx = edge_start.prev_ndx;
        while chain.len() < cycle_len && self.reaches(prev_ndx, &point, time) {
            chain.push_front(prev_ndx);
            prev_ndx = self.shrinking_polygon.nodes[prev_ndx].prev_ndx;
        }
        let chain = Vec::from(chain);

        // Add new skeleton vertex and edges
        let vertex_ndx = self.add_vertex(point, time);
        for ndx in chain.iter() {
            let start = self.shrinking_polygon.nodes[*ndx].vertex_ndx;
            self.edges.push(Edge{start, end:vertex_ndx});
        }

        if chain.len() == cycle_len {
            // the whole loop vanishes in one point
            for ndx in chain.iter() {
                self.shrinking_polygon.deactivate(*ndx);
            }
            info!("\x1b[032mt:{:.3} Peak Event for {} nodes at p={}\x1b[0m", time, chain.len(), point);
        } else if prev_ndx == next_ndx {
            // triangle detected vertex event
            let remaining_node = self.shrinking_polygon.nodes[prev_ndx];
            self.edges.push(Edge{start:remaining_node.vertex_ndx, end:vertex_ndx});
            for ndx in chain.iter().chain(std::iter::once(&remaining_node.ndx)) {
                self.shrinking_polygon.deactivate(*ndx);
            }
            info!("\x1b[032mt:{:.3} Vertex Event for nodes: {:?} & {} at p={}\x1b[0m",
                time, chain, remaining_node.ndx, point);
        } else {
            let first = self.shrinking_polygon.nodes[chain[0]];
            let last = self.shrinking_polygon.nodes[chain[chain.len()-1]];
            let left = self.contour_edges[first.left_edge];
            let right = self.contour_edges[last.right_edge];

            let bisector = bisector(&left, &right).map_err(SkeletonError::EdgeEventError)?;
            let new_node = Node::new(vertex_ndx, first.left_edge, last.right_edge, bisector, is_reflex(&left, &right));
            let new_ndx = self.shrinking_polygon.merge(&chain, new_node);

            //find events for the new vertex
            if !self.close_if_collapsed(new_ndx, time) {
                self.find_events(new_ndx)?;
            }
            info!("\x1b[032mt:{:.3} Edge Event for nodes:{:?} at p={} new node {}\x1b[0m", time, chain, point, new_ndx);
        }
        Ok(Some(FiredEvent{ kind: EventKind::Edge, time, point, vertex_ndx }))
    }
    /// true if the node is at `point` at `time`
    fn reaches(&self, node_ndx:usize, point:&Point2<f64>, time:f64) -> bool {
        let node = &self.shrinking_polygon.nodes[node_ndx];
        (self.position(node, time) - point).norm() <= self.tolerance
    }
}

/// Time until two points moving with constant velocities meet.
/// Returns `None` if they never meet or only did so in the past.
pub fn collapse_time(
    p1: &Point2<f64>,
    v1: &Vector2<f64>,
    p2: &Point2<f64>,
    v2: &Vector2<f64>,
    tolerance: f64,
) -> Option<f64> {
    let dv = v1 - v2;
    let dp = p2 - p1;
    let speed_sq = dv.norm_squared();
    if speed_sq < f64::EPSILON {
        // same velocity, they either already coincide or never will
        return (dp.norm() <= tolerance).then_some(0.0)
    }
    let t = dv.dot(&dp) / speed_sq;
    if t < -tolerance { return None }
    let t = t.max(0.0);
    let miss = (p1 + v1 * t) - (p2 + v2 * t);
    (miss.norm() <= tolerance).then_some(t)
}
