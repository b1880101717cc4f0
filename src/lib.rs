//! Straight skeletons of polygons with holes.
//!
//! The input rings are validated and oriented by [`geo::Polygon`], the
//! wavefront propagation runs in [`skeleton::SkeletonBuilder`] and the finished
//! [`skeleton::StraightSkeleton`] can be flattened into typed edge records by
//! the [`export`] module.
pub mod geo;
pub mod skeleton;
pub mod export;
pub mod input;
pub mod settings;


use nalgebra::Point2;

pub use export::{EdgeRecord, SkeletonLines};
pub use geo::{GeometryError, Polygon};
pub use settings::Settings;
pub use skeleton::{skeleton_from_polygon, SkeletonError, StraightSkeleton};

/// Computes the skeleton of the polygon described by `rings` (outer loop
/// first) and exports it according to `settings`.
pub fn skeleton_edges(rings: Vec<Vec<Point2<f64>>>, settings: &Settings) -> Result<Vec<EdgeRecord>, SkeletonError> {
    let polygon = Polygon::from_rings(rings)?;
    let skeleton = skeleton_from_polygon(&polygon, settings)?;
    Ok(export::export_edges(&skeleton, settings))
}
