use nalgebra::{Matrix2, Point2, Vector2};
use nalgebra_glm::cross2d;
use ordered_float::OrderedFloat;
use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    ops::Range,
};
use log::{debug, info, trace};

#[cfg(test)]
mod test;

mod error;
pub use error::{SkeletonError,BisectorError};

mod nodes;
use nodes::{Nodes,Node};

mod queue;
use queue::EventQueue;

mod split_event;
mod edge_event;

mod graph;
pub use graph::*;

use crate::geo::Polygon;
use crate::settings::{Classification, Settings};

/// Angles below this are treated as parallel
const ANGLE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Edge {
    pub start: usize,
    pub end: usize,
}
/// A point of the skeleton. Input vertices have time 0, every other vertex
/// was created by an event at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub coords: Point2<f64>,
    pub time: f64,
}

/// A line of the input polygon. At time t its wavefront copy is the line
/// `normal·x = offset + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourEdge {
    pub start: Point2<f64>,
    pub direction: Vector2<f64>,
    pub normal: Vector2<f64>,
    pub offset: f64,
}
impl ContourEdge {
    pub fn new(start:Point2<f64>, end:Point2<f64>) -> Self {
        let direction = (end - start).normalize();
        // interior is on the left
        let normal = Vector2::new(-direction.y, direction.x);
        ContourEdge{ start, direction, normal, offset: normal.dot(&start.coords) }
    }
    /// signed distance from p to the wavefront copy of the edge at `time`,
    /// positive on the interior side
    pub fn distance(&self, p:&Point2<f64>, time:f64) -> f64 {
        self.normal.dot(&p.coords) - self.offset - time
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub(crate) struct Event {
    time: OrderedFloat<f64>,
    node: usize,
    event_type: EventType,
}
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub(crate) enum EventType {
    Edge{ next_ndx:usize },  // the wavefront edge between node and next_ndx shrinks to zero length
    Split{ edge:usize, split_point:[OrderedFloat<f64>;2] }, // node hits the wavefront copy of a contour edge
}
impl Display for Event {
    fn fmt(&self, b:&mut std::fmt::Formatter<'_>) -> Result<(),std::fmt::Error>{
        write!(b, "t: {:.4} {} Event node: {}",self.time,self.event_type,self.node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Active,
    Finished,
    Failed,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Edge,
    Split,
}
/// Summary of an event that changed the wavefront
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredEvent {
    pub kind: EventKind,
    pub time: f64,
    pub point: Point2<f64>,
    /// index of the skeleton vertex created by the event
    pub vertex_ndx: usize,
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Fired(FiredEvent),
    QueueEmpty,
}

/// Runs the wavefront propagation for one polygon with holes.
///
/// The builder owns the shrinking wavefront and the event queue. Each call to
/// [`SkeletonBuilder::advance`] fires the earliest valid event until the
/// wavefront has vanished. After a failure the builder is unusable.
#[derive(Debug)]
pub struct SkeletonBuilder {
    shrinking_polygon: Nodes,
    contour_edges: Vec<ContourEdge>,
    rings: Vec<Range<usize>>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    events: EventQueue,
    time: f64,
    state: BuilderState,
    tolerance: f64,
    event_limit: usize,
    edge_events: usize,
    split_events: usize,
    classification: Classification,
}
impl SkeletonBuilder {
    pub fn from_polygon(polygon:&Polygon, settings:&Settings) -> Result<Self,SkeletonError> {
        let scale = polygon.aabb().diagonal().max(1.0);
        let mut builder = SkeletonBuilder{
            shrinking_polygon: Nodes::default(),
            contour_edges: Vec::with_capacity(polygon.vertex_count()),
            rings: Vec::new(),
            vertices: Vec::with_capacity(polygon.vertex_count()*2),
            edges: Vec::new(),
            events: EventQueue::default(),
            time: 0.0,
            state: BuilderState::Active,
            tolerance: settings.tolerance * scale,
            event_limit: settings.event_limit(polygon.vertex_count()),
            edge_events: 0,
            split_events: 0,
            classification: settings.classification,
        };
        for contour in polygon.rings() {
            builder.add_loop(&contour.points)?;
        }
        //initialize events
        for node_ndx in 0..builder.shrinking_polygon.nodes.len() {
            builder.find_events(node_ndx)?;
        }
        info!("\x1b[034mSkeletonBuilder: {} rings {} nodes {} initial events\x1b[0m",
            builder.rings.len(), builder.shrinking_polygon.len(), builder.events.len());
        Ok(builder)
    }
    fn add_loop(&mut self, points: &[Point2<f64>]) -> Result<(), SkeletonError> {
        let offset = self.vertices.len();
        let len = points.len();
        self.contour_edges.extend(
            (0..len).map(|i| ContourEdge::new(points[i], points[(i + 1) % len]))
        );
        for i in 0..len {
            let next_ndx = (i + 1) % len + offset;
            let prev_ndx = (i + len - 1) % len + offset;
            let ndx = i + offset;

            let left = &self.contour_edges[prev_ndx];
            let right = &self.contour_edges[ndx];
            let bisector = match bisector(left, right) {
                Ok(bisector) if bisector != Vector2::zeros() => bisector,
                Ok(_) => return Err(SkeletonError::InitializationError{
                    node: ndx,
                    error: BisectorError{ left: left.direction, right: right.direction },
                }),
                Err(error) => return Err(SkeletonError::InitializationError{node:ndx,error}),
            };
            let node = Node::new(ndx, prev_ndx, ndx, bisector, is_reflex(left, right))
                .with_links(prev_ndx, next_ndx);
            self.shrinking_polygon.insert(node);
        }
        self.vertices.extend(points.iter().map(|p| Vertex{coords:*p,time:0.0}));
        self.rings.push(offset..offset + len);
        Ok(())
    }

    /// Fires the next valid event. Returns [`Advance::QueueEmpty`] once the
    /// wavefront has vanished.
    pub fn advance(&mut self) -> Result<Advance, SkeletonError> {
        match self.state {
            BuilderState::Finished => return Ok(Advance::QueueEmpty),
            BuilderState::Failed => return Err(self.construction_error("builder has already failed")),
            BuilderState::Active => (),
        }
        match self.step() {
            Ok(Advance::QueueEmpty) => {
                self.state = BuilderState::Finished;
                info!("\x1b[034mSkeleton finished: {} edge events {} split events {} vertices\x1b[0m",
                    self.edge_events, self.split_events, self.vertices.len());
                Ok(Advance::QueueEmpty)
            }
            Ok(fired) => Ok(fired),
            Err(error) => {
                self.state = BuilderState::Failed;
                debug!("\n{self}");
                Err(error)
            }
        }
    }
    fn step(&mut self) -> Result<Advance, SkeletonError> {
        loop {
            if self.shrinking_polygon.is_empty() { return Ok(Advance::QueueEmpty) }
            let Some(event) = self.next_event() else {
                if self.close_collapsed_cycles() { return Ok(Advance::QueueEmpty) }
                return Err(self.construction_error(format!(
                    "event queue drained with {} moving wavefront nodes", self.shrinking_polygon.len())))
            };
            if !event_is_current(&self.shrinking_polygon, &event) {
                trace!("skipping stale event {event}");
                continue
            }
            let time = event.time.0;
            if !time.is_finite() {
                return Err(self.construction_error(format!("non finite event time in {event}")))
            }
            if time < self.time - self.tolerance {
                return Err(self.construction_error(format!(
                    "event {event} is earlier than the current time {}", self.time)))
            }
            if self.edge_events + self.split_events >= self.event_limit {
                return Err(self.construction_error(format!("event limit of {} exceeded", self.event_limit)))
            }
            let time = time.max(self.time);
            let fired = match event.event_type {
                EventType::Edge{..} => self.handle_edge_event(event.node, time)?,
                EventType::Split{edge, split_point} => {
                    let b = Point2::new(split_point[0].0, split_point[1].0);
                    self.handle_split_event(event.node, edge, b, time)?
                }
            };
            if let Some(fired) = fired {
                self.time = time;
                match fired.kind {
                    EventKind::Edge => self.edge_events += 1,
                    EventKind::Split => self.split_events += 1,
                }
                debug!("\n{self}");
                return Ok(Advance::Fired(fired))
            }
        }
    }
    /// Pops the earliest event. A split event yields to a valid edge event
    /// that happens within the tolerance window.
    fn next_event(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        if let EventType::Split{..} = event.event_type {
            let nodes = &self.shrinking_polygon;
            let limit = event.time.0 + self.tolerance;
            if let Some(edge_event) = self.events.take_edge_event(limit, |e| event_is_current(nodes, e)) {
                self.events.push(event);
                return Some(edge_event)
            }
        }
        Some(event)
    }
    /// Closes the cycles left when the queue drains. A cycle closes if its
    /// nodes lie on one line or if none of them moves. Returns false if a
    /// cycle with area and moving nodes is left.
    fn close_collapsed_cycles(&mut self) -> bool {
        loop {
            let first = self.shrinking_polygon.active_nodes_iter().next();
            let Some(start) = first else { return true };
            if self.close_flat_cycle(start, self.time) { continue }
            if !self.shrinking_polygon.iter_from(start).all(|node| node.is_stationary()) {
                return false
            }
            self.join_cycle(start);
        }
    }
    /// Joins the vertices of a cycle of stationary nodes in cycle order
    fn join_cycle(&mut self, start:usize) {
        let cycle: Vec<usize> = self.shrinking_polygon.iter_from(start)
            .map(|node| node.vertex_ndx)
            .collect();
        let mut joined = HashSet::new();
        for (a, b) in cycle.iter().zip(cycle.iter().cycle().skip(1)) {
            if a == b || !joined.insert((*a.min(b), *a.max(b))) { continue }
            self.push_skeleton_edge(*a, *b);
        }
        let nodes: Vec<usize> = self.shrinking_polygon.iter_from(start).map(|node| node.ndx).collect();
        for ndx in nodes {
            self.shrinking_polygon.deactivate(ndx);
        }
        info!("t:{:.3} closing stationary cycle of {} nodes", self.time, cycle.len());
    }
    /// Closes the cycle through `node_ndx` if it has no area left and no
    /// pair of neighbours is about to collapse. Returns false if the cycle
    /// stays in the wavefront.
    fn close_if_collapsed(&mut self, node_ndx:usize, time:f64) -> bool {
        let cycle = self.cycle_positions(node_ndx, time);
        if cycle.len() > 2 {
            // coincident neighbours still have an edge event to fire
            let pending = cycle.iter().zip(cycle.iter().cycle().skip(1))
                .any(|((_, a), (_, b))| (a - b).norm() <= self.tolerance);
            if pending || self.flat_direction(&cycle).is_none() { return false }
        }
        self.close_flat_cycle(node_ndx, time)
    }
    /// Replaces a cycle whose nodes lie on one line at `time` by skeleton
    /// edges along that line. Nodes away from their vertex get a new vertex
    /// at their position, which counts as the collapse of their wavefront
    /// edges. Returns false if the cycle is not flat.
    fn close_flat_cycle(&mut self, start:usize, time:f64) -> bool {
        let cycle = self.cycle_positions(start, time);
        let Some(direction) = self.flat_direction(&cycle) else { return false };

        let (resting, moved): (Vec<&(Node, Point2<f64>)>, Vec<&(Node, Point2<f64>)>) = cycle.iter()
            .partition(|(node, p)| (self.vertices[node.vertex_ndx].coords - p).norm() <= self.tolerance);
        let mut stops: Vec<(usize, Point2<f64>)> = Vec::new();
        for (node, p) in resting {
            if !stops.iter().any(|(ndx, _)| *ndx == node.vertex_ndx) {
                stops.push((node.vertex_ndx, *p));
            }
        }
        for (node, p) in moved {
            let found = stops.iter()
                .find(|(_, q)| (q - p).norm() <= self.tolerance)
                .map(|(ndx, _)| *ndx);
            let stop = match found {
                Some(ndx) => ndx,
                None => {
                    let ndx = self.add_vertex(*p, time);
                    self.edge_events += 1;
                    stops.push((ndx, *p));
                    ndx
                }
            };
            self.edges.push(Edge{start:node.vertex_ndx, end:stop});
        }
        stops.sort_by(|(a_ndx, a), (b_ndx, b)| {
            direction.dot(&a.coords).total_cmp(&direction.dot(&b.coords))
                .then(a_ndx.cmp(b_ndx))
        });
        for pair in stops.windows(2) {
            let [(a, _), (b, _)] = pair else { continue };
            self.push_skeleton_edge(*a, *b);
        }
        for (node, _) in cycle.iter() {
            self.shrinking_polygon.deactivate(node.ndx);
        }
        info!("t:{:.3} closing flat cycle of {} nodes with {} vertices", time, cycle.len(), stops.len());
        true
    }
    /// Nodes of the cycle through `start` paired with their position at `time`
    fn cycle_positions(&self, start:usize, time:f64) -> Vec<(Node, Point2<f64>)> {
        self.shrinking_polygon.iter_from(start)
            .map(|node| (*node, self.position(node, time)))
            .collect()
    }
    /// Direction of the line holding every position of the cycle, a zero
    /// vector if they all coincide and `None` if the cycle encloses an area.
    fn flat_direction(&self, cycle:&[(Node, Point2<f64>)]) -> Option<Vector2<f64>> {
        let (_, origin) = cycle.first()?;
        let far = cycle.iter()
            .map(|(_, p)| p - origin)
            .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()))?;
        if far.norm() <= self.tolerance { return Some(Vector2::zeros()) }
        let direction = far.normalize();
        cycle.iter()
            .all(|(_, p)| cross2d(&direction, &(p - origin)).abs() <= self.tolerance)
            .then_some(direction)
    }
    /// skeleton edge between two existing vertices, the earlier one first
    fn push_skeleton_edge(&mut self, a:usize, b:usize) {
        let edge = if self.vertices[a].time <= self.vertices[b].time {
            Edge{start:a, end:b}
        } else {
            Edge{start:b, end:a}
        };
        self.edges.push(edge);
    }
    /// Runs the propagation to the end and returns the finished skeleton
    pub fn compute_skeleton(mut self) -> Result<StraightSkeleton, SkeletonError> {
        info!("\x1b[034m========================== Computing Skeleton ==========================\x1b[0m");
        while let Advance::Fired(_) = self.advance()? {}
        StraightSkeleton::try_from(self)
    }

    fn find_events(&mut self, node_ndx:usize) -> Result<(), SkeletonError> {
        // Edge events with both neighbours
        self.find_edge_event(node_ndx)?;
        self.find_edge_event(self.shrinking_polygon.nodes[node_ndx].prev_ndx)?;
        // Split events
        let node = self.shrinking_polygon.nodes[node_ndx];
        for event in self.compute_split_events(&node) {
            self.push_event(event)?;
        }
        Ok(())
    }
    fn push_event(&mut self, event:Event) -> Result<(), SkeletonError> {
        if !event.time.is_finite() {
            return Err(self.construction_error(format!("non finite event time in {event}")))
        }
        trace!("queueing {event}");
        self.events.push(event);
        Ok(())
    }
    /// position of a wavefront node at `time`
    fn position(&self, node:&Node, time:f64) -> Point2<f64> {
        let vertex = &self.vertices[node.vertex_ndx];
        vertex.coords + node.bisector * (time - vertex.time)
    }
    fn add_vertex(&mut self, coords:Point2<f64>, time:f64) -> usize {
        self.vertices.push(Vertex{coords, time});
        self.vertices.len() - 1
    }
    fn construction_error(&self, reason:impl Into<String>) -> SkeletonError {
        SkeletonError::ConstructionError{
            time: self.time,
            events: self.edge_events + self.split_events,
            reason: reason.into(),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }
    /// time of the last fired event
    pub fn time(&self) -> f64 {
        self.time
    }
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
    /// number of nodes still moving in the wavefront
    pub fn active_nodes(&self) -> usize {
        self.shrinking_polygon.len()
    }
}

fn event_is_current(nodes:&Nodes, event:&Event) -> bool {
    match event.event_type {
        EventType::Edge{next_ndx} => nodes.contains(event.node) && nodes.contains(next_ndx)
            && nodes.nodes[event.node].next_ndx == next_ndx,
        EventType::Split{..} => nodes.contains(event.node),
    }
}

/// Velocity of the wavefront vertex between the `left` and `right` edges.
///
/// Both edges move inward at unit speed, so the velocity `v` satisfies
/// `n_left·v = 1` and `n_right·v = 1`. Parallel edges give the common normal
/// and anti parallel edges give a zero velocity.
pub fn bisector(left:&ContourEdge, right:&ContourEdge) -> Result<Vector2<f64>, BisectorError> {
    let det = cross2d(&left.normal, &right.normal);
    if det.abs() < ANGLE_EPSILON {
        if left.normal.dot(&right.normal) > 0.0 {
            return Ok((left.normal + right.normal).normalize())
        }
        return Ok(Vector2::zeros())
    }
    let a = Matrix2::new(
        left.normal.x, left.normal.y,
        right.normal.x, right.normal.y,
        );
    let bisector = match a.try_inverse() {
        Some(inverse) => inverse * Vector2::new(1.0, 1.0),
        None => return Err(BisectorError{ left: left.direction, right: right.direction }),
    };
    if !bisector.x.is_finite() || !bisector.y.is_finite() {
        return Err(BisectorError{ left: left.direction, right: right.direction })
    }
    Ok(bisector)
}
/// True if the wavefront turns clockwise from `left` to `right`
pub fn is_reflex(left:&ContourEdge, right:&ContourEdge) -> bool {
    cross2d(&left.direction, &right.direction) < -ANGLE_EPSILON
}

pub fn skeleton_from_polygon(polygon:&Polygon, settings:&Settings) -> Result<StraightSkeleton, SkeletonError> {
    let builder = SkeletonBuilder::from_polygon(polygon, settings)?;
    builder.compute_skeleton()
}

impl Display for EventType{
    fn fmt(&self, b:&mut fmt::Formatter) -> Result<(),fmt::Error> {
        match self {
            EventType::Edge{next_ndx} => write!(b,"Edge (next {next_ndx})"),
            EventType::Split{edge, split_point:split_p} => write!(b,"Split (edge {edge} at {} {})",split_p[0],split_p[1]),
        }
    }
}

impl Display for SkeletonBuilder{
    fn fmt(&self, b: &mut Formatter)->Result<(),fmt::Error> {
        let nodes_display = format!("{}",self.shrinking_polygon);
        let mut nodes_lines = nodes_display.lines();
        writeln!(b,"{}  |     Vertices     |", nodes_lines.next().unwrap_or_default())?;
        writeln!(b,"{}  \x1b[1;4m|  x  |  y  | time |\x1b[0m", nodes_lines.next().unwrap_or_default())?;
        let rows = self.shrinking_polygon.nodes.len().max(self.vertices.len());
        for i in 0..rows {
            // Nodes
            write!(b,"{}",nodes_lines.next().unwrap_or("                                                      "))?;

            // Vertices
            match self.vertices.get(i) {
                None => write!(b,"     --")?,
                Some(vert) => write!(b, "|{:+.2}|{:+.2}| {:.2} |",vert.coords[0],vert.coords[1],vert.time)?,
            };
            writeln!(b,"\x1b[0m  ")?;
        }
        Ok(())
    }
}
