use nalgebra::Point2;
use std::ops::Range;

use super::{BuilderState, SkeletonBuilder, SkeletonError};
use crate::settings::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfedgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// part of the input polygon
    Boundary,
    /// skeleton edge that is not an inner bisector under the chosen classification
    Bisector,
    InnerBisector,
}
impl EdgeKind {
    pub fn typecode(&self) -> u8 {
        match self {
            EdgeKind::Boundary => 0,
            EdgeKind::Bisector => 1,
            EdgeKind::InnerBisector => 2,
        }
    }
    pub fn is_bisector(&self) -> bool {
        *self != EdgeKind::Boundary
    }
    pub fn is_inner_bisector(&self) -> bool {
        *self == EdgeKind::InnerBisector
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonVertex {
    pub point: Point2<f64>,
    /// offset distance at which the vertex was created, 0 for input vertices
    pub time: f64,
    pub is_contour: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halfedge {
    pub source: VertexId,
    pub target: VertexId,
    pub kind: EdgeKind,
}

/// Immutable halfedge graph of a finished straight skeleton.
///
/// Halfedges come in twin pairs `2k` and `2k + 1`. The contour edges of every
/// ring come first (the even halfedge of each pair follows the ring), then the
/// skeleton edges in creation order with the even halfedge pointing away from
/// the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StraightSkeleton {
    vertices: Vec<SkeletonVertex>,
    halfedges: Vec<Halfedge>,
    rings: Vec<Range<usize>>,
    edge_events: usize,
    split_events: usize,
}
impl StraightSkeleton {
    pub fn vertices(&self) -> &[SkeletonVertex] {
        &self.vertices
    }
    pub fn vertex(&self, id:VertexId) -> &SkeletonVertex {
        &self.vertices[id.0]
    }
    /// vertices created by events
    pub fn skeleton_vertices(&self) -> impl Iterator<Item = (VertexId, &SkeletonVertex)> {
        self.vertices.iter().enumerate()
            .filter(|(_, v)| !v.is_contour)
            .map(|(i, v)| (VertexId(i), v))
    }
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfedgeId, &Halfedge)> {
        self.halfedges.iter().enumerate().map(|(i, h)| (HalfedgeId(i), h))
    }
    pub fn halfedge(&self, id:HalfedgeId) -> &Halfedge {
        &self.halfedges[id.0]
    }
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }
    pub fn opposite(&self, id:HalfedgeId) -> HalfedgeId {
        HalfedgeId(id.0 ^ 1)
    }
    pub fn source(&self, id:HalfedgeId) -> &SkeletonVertex {
        self.vertex(self.halfedges[id.0].source)
    }
    pub fn target(&self, id:HalfedgeId) -> &SkeletonVertex {
        self.vertex(self.halfedges[id.0].target)
    }
    pub fn kind(&self, id:HalfedgeId) -> EdgeKind {
        self.halfedges[id.0].kind
    }
    pub fn length(&self, id:HalfedgeId) -> f64 {
        (self.target(id).point - self.source(id).point).norm()
    }
    /// one halfedge per undirected edge
    pub fn edges(&self) -> impl Iterator<Item = (HalfedgeId, &Halfedge)> {
        self.halfedges().step_by(2)
    }
    pub fn bisectors(&self) -> impl Iterator<Item = (HalfedgeId, &Halfedge)> {
        self.halfedges().filter(|(_, h)| h.kind.is_bisector())
    }
    pub fn inner_bisectors(&self) -> impl Iterator<Item = (HalfedgeId, &Halfedge)> {
        self.halfedges().filter(|(_, h)| h.kind.is_inner_bisector())
    }
    /// vertex index ranges of the input rings, outer loop first
    pub fn rings(&self) -> &[Range<usize>] {
        &self.rings
    }
    pub fn edge_events(&self) -> usize {
        self.edge_events
    }
    pub fn split_events(&self) -> usize {
        self.split_events
    }
    /// true if every vertex can be reached from every other one along bisectors
    pub fn is_connected(&self) -> bool {
        if self.vertices.is_empty() { return true }
        let mut neighbours = vec![Vec::new(); self.vertices.len()];
        for (_, halfedge) in self.bisectors() {
            neighbours[halfedge.source.0].push(halfedge.target.0);
        }
        let mut visited = vec![false; self.vertices.len()];
        let mut stack = vec![0];
        visited[0] = true;
        while let Some(vertex) = stack.pop() {
            for next in neighbours[vertex].iter() {
                if !visited[*next] {
                    visited[*next] = true;
                    stack.push(*next);
                }
            }
        }
        visited.into_iter().all(|v| v)
    }
}

impl TryFrom<SkeletonBuilder> for StraightSkeleton {
    type Error = SkeletonError;
    fn try_from(s_builder:SkeletonBuilder) -> Result<Self, Self::Error> {
        if s_builder.state != BuilderState::Finished {
            return Err(s_builder.construction_error("skeleton requested before the wavefront collapsed"))
        }
        let contour_vertices = s_builder.rings.last().map_or(0, |ring| ring.end);
        let vertices: Vec<SkeletonVertex> = s_builder.vertices.iter()
            .enumerate()
            .map(|(i, v)| SkeletonVertex{ point: v.coords, time: v.time, is_contour: i < contour_vertices })
            .collect();

        let mut halfedges = Vec::with_capacity(2 * (contour_vertices + s_builder.edges.len()));
        for ring in s_builder.rings.iter() {
            for i in ring.clone() {
                let next = if i + 1 == ring.end { ring.start } else { i + 1 };
                push_twins(&mut halfedges, i, next, EdgeKind::Boundary);
            }
        }
        for edge in s_builder.edges.iter() {
            let start = &vertices[edge.start];
            let end = &vertices[edge.end];
            let kind = match s_builder.classification {
                Classification::Interior => {
                    if (end.point - start.point).norm() <= s_builder.tolerance {
                        EdgeKind::Bisector
                    } else {
                        EdgeKind::InnerBisector
                    }
                },
                Classification::Contour => {
                    if start.is_contour || end.is_contour {
                        EdgeKind::Bisector
                    } else {
                        EdgeKind::InnerBisector
                    }
                },
            };
            push_twins(&mut halfedges, edge.start, edge.end, kind);
        }
        Ok(StraightSkeleton{
            vertices,
            halfedges,
            rings: s_builder.rings,
            edge_events: s_builder.edge_events,
            split_events: s_builder.split_events,
        })
    }
}
fn push_twins(halfedges:&mut Vec<Halfedge>, start:usize, end:usize, kind:EdgeKind) {
    halfedges.push(Halfedge{ source: VertexId(start), target: VertexId(end), kind });
    halfedges.push(Halfedge{ source: VertexId(end), target: VertexId(start), kind });
}
