use std::collections::VecDeque;

use nalgebra::Point2;
use serde::{Serialize, Serializer};

use crate::settings::{ExportMode, Settings};
use crate::skeleton::{EdgeKind, StraightSkeleton};

/// One exported halfedge: `[[x1, y1], [x2, y2], typecode]` once serialized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    pub typecode: u8,
}
impl Serialize for EdgeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            [self.start.x, self.start.y],
            [self.end.x, self.end.y],
            self.typecode,
        ).serialize(serializer)
    }
}

/// Flattens the skeleton into edge records in halfedge order
pub fn export_edges(skeleton: &StraightSkeleton, settings: &Settings) -> Vec<EdgeRecord> {
    skeleton.halfedges()
        .filter(|(id, _)| settings.both_directions || id.0 % 2 == 0)
        .filter(|(_, halfedge)| match settings.export_mode {
            ExportMode::InnerBisectors => halfedge.kind.is_inner_bisector(),
            ExportMode::Bisectors => halfedge.kind.is_bisector(),
            ExportMode::All => true,
        })
        .map(|(id, halfedge)| EdgeRecord{
            start: skeleton.target(skeleton.opposite(id)).point,
            end: skeleton.target(id).point,
            typecode: halfedge.kind.typecode(),
        })
        .collect()
}

pub fn to_json(records: &[EdgeRecord]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

/// Joins segments that share end points into polylines.
///
/// Zero length segments and repeated segments (in either direction) are
/// dropped first. Lines are then stitched pairwise until no two lines share
/// an end point.
pub fn merge_lines(segments: impl IntoIterator<Item = (Point2<f64>, Point2<f64>)>) -> Vec<Vec<Point2<f64>>> {
    let mut lines: Vec<VecDeque<Point2<f64>>> = Vec::new();
    for (start, end) in segments {
        if start == end { continue }
        let repeated = lines.iter().any(|line|
            (line[0] == start && line[1] == end) || (line[0] == end && line[1] == start));
        if !repeated {
            lines.push(VecDeque::from([start, end]));
        }
    }
    'merging: loop {
        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                if stitch(&mut lines, i, j) {
                    continue 'merging
                }
            }
        }
        break
    }
    lines.into_iter().map(Vec::from).collect()
}
/// appends line j to line i if they share an end point, j must be larger than i
fn stitch(lines: &mut Vec<VecDeque<Point2<f64>>>, i: usize, j: usize) -> bool {
    let (Some(&front), Some(&back)) = (lines[i].front(), lines[i].back()) else { return false };
    let (Some(&other_front), Some(&other_back)) = (lines[j].front(), lines[j].back()) else { return false };
    let other = if back == other_front || back == other_back || front == other_front || front == other_back {
        lines.swap_remove(j)
    } else {
        return false
    };
    let line = &mut lines[i];
    if back == other_front {
        line.extend(other.into_iter().skip(1));
    } else if back == other_back {
        line.extend(other.into_iter().rev().skip(1));
    } else if front == other_back {
        for point in other.into_iter().rev().skip(1) { line.push_front(point) }
    } else {
        for point in other.into_iter().skip(1) { line.push_front(point) }
    }
    true
}

/// The skeleton split by edge type. Inner bisectors are merged into
/// polylines, bisectors and boundary edges are kept as one segment per
/// halfedge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonLines {
    pub inner: Vec<Vec<Point2<f64>>>,
    pub outer: Vec<[Point2<f64>; 2]>,
    pub boundary: Vec<[Point2<f64>; 2]>,
}
impl From<&StraightSkeleton> for SkeletonLines {
    fn from(skeleton: &StraightSkeleton) -> Self {
        let mut lines = SkeletonLines::default();
        let mut inner = Vec::new();
        for (id, halfedge) in skeleton.halfedges() {
            let segment = [skeleton.source(id).point, skeleton.target(id).point];
            match halfedge.kind {
                EdgeKind::InnerBisector => inner.push((segment[0], segment[1])),
                EdgeKind::Bisector => lines.outer.push(segment),
                EdgeKind::Boundary => lines.boundary.push(segment),
            }
        }
        lines.inner = merge_lines(inner);
        lines
    }
}
