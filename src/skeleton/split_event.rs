use crate::geo::distance_to_segment;
use crate::skeleton::*;

impl SkeletonBuilder{
    /// Candidate split events of a reflex node: the times at which the node
    /// reaches the wavefront copy of each contour edge that is still part of
    /// the wavefront.
    pub (super) fn compute_split_events(&self, node: &Node) -> Vec<Event> {
        let mut events = Vec::new();
        if !node.reflex { return events }

        let node_v = &self.vertices[node.vertex_ndx];
        trace!("Finding split events for node: {} at {}", node.ndx, node_v.coords);

        for (edge_ndx, edge) in self.contour_edges.iter().enumerate()
            .filter(|(edge_ndx,_)| *edge_ndx != node.left_edge && *edge_ndx != node.right_edge)
            .filter(|(edge_ndx,_)| self.shrinking_polygon.edge_is_active(*edge_ndx))
        {
            // closing speed between the node and the offset line
            let approach = 1.0 - edge.normal.dot(&node.bisector);
            if approach <= f64::EPSILON { continue }
            let distance = edge.distance(&node_v.coords, node_v.time);
            if distance <= self.tolerance { continue }

            let dt = distance / approach;
            let b = node_v.coords + node.bisector * dt;
            trace!("  - candidate for edge {edge_ndx} b: ({:>7.4},{:>7.4}) t: {:.4}", b.x, b.y, node_v.time + dt);

            events.push(Event {
                time: OrderedFloat(node_v.time + dt),
                node: node.ndx,
                event_type: EventType::Split{ edge: edge_ndx, split_point: [OrderedFloat(b.x), OrderedFloat(b.y)] },
            });
        }
        events
    }
    /// Finds the active wavefront edge descending from `edge_ndx` that holds
    /// `b` at `time`. Edges adjacent to the splitting node are skipped.
    fn find_split_edge(&self, node:&Node, edge_ndx:usize, b:&Point2<f64>, time:f64) -> Option<Node> {
        self.shrinking_polygon.active_nodes_iter()
            .map(|ndx| self.shrinking_polygon.nodes[ndx])
            .filter(|edge_start| edge_start.right_edge == edge_ndx)
            .filter(|edge_start| edge_start.ndx != node.ndx && edge_start.next_ndx != node.ndx)
            .find(|edge_start| {
                let edge_end = self.shrinking_polygon.next(edge_start.ndx);
                let start_p = self.position(edge_start, time);
                let end_p = self.position(edge_end, time);
                distance_to_segment(b, &start_p, &end_p) <= self.tolerance
            })
    }
    pub (super) fn handle_split_event(&mut self, node_ndx:usize, edge_ndx:usize, b:Point2<f64>, time:f64) -> Result<Option<FiredEvent>, SkeletonError> {
        let node = self.shrinking_polygon.nodes[node_ndx];

        // find edge beeing split
        let Some(edge_start) = self.find_split_edge(&node, edge_ndx, &b, time) else {
            info!("t:{:.3} skipping Split Event node: {} split point: {} \x1b[031mno wavefront edge at split point\x1b[0m",
                time, node.ndx, b);
            return Ok(None)
        };
        let edge_end_ndx = edge_start.next_ndx;

        // Add new skeleton vertex and edge
        let vertex_ndx = self.add_vertex(b, time);
        self.edges.push(Edge{start:node.vertex_ndx, end:vertex_ndx});

        let split_edge = self.contour_edges[edge_ndx];
        let left_edge = self.contour_edges[node.left_edge];
        let right_edge = self.contour_edges[node.right_edge];

        let left_bisector = bisector(&left_edge, &split_edge).map_err(SkeletonError::SplitEventError)?;
        let right_bisector = bisector(&split_edge, &right_edge).map_err(SkeletonError::SplitEventError)?;

        // the left node closes the loop ahead of the split edge, the right node the loop behind it
        let left_node = Node::new(vertex_ndx, node.left_edge, edge_ndx, left_bisector, is_reflex(&left_edge, &split_edge))
            .with_links(node.prev_ndx, edge_end_ndx);
        let right_node = Node::new(vertex_ndx, edge_ndx, node.right_edge, right_bisector, is_reflex(&split_edge, &right_edge))
            .with_links(edge_start.ndx, node.next_ndx);
        let new_nodes = self.shrinking_polygon.split(node.ndx, left_node, right_node);

        info!("\x1b[032mt:{:.3} Split Event for node: {} at p={} splitting edge {}-{} new nodes {:?}\x1b[0m",
            time, node.ndx, b, edge_start.ndx, edge_end_ndx, new_nodes);

        for new_ndx in new_nodes {
            if !self.shrinking_polygon.contains(new_ndx) { continue }
            if !self.close_if_collapsed(new_ndx, time) {
                self.find_events(new_ndx)?;
            }
        }
        Ok(Some(FiredEvent{ kind: EventKind::Split, time, point: b, vertex_ndx }))
    }
}
