use nalgebra::Vector2;
use thiserror::Error;

use crate::geo::GeometryError;

#[derive(Debug, Error)]
pub enum SkeletonError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Initialization Error could not initialize SkeletonBuilder: failed to create bisector for node {node}\n{error}")]
    InitializationError{node:usize,error:BisectorError},
    #[error("Construction Error at t={time:.6} after {events} events: {reason}")]
    ConstructionError{time:f64, events:usize, reason:String},
    #[error("Edge event Error could not create bisector for newly created vertex {0}")]
    EdgeEventError(BisectorError),
    #[error("Split event Error could not create bisector for newly created vertex {0}")]
    SplitEventError(BisectorError),
}
#[derive(Debug, Error)]
#[error("Bisector Calculation Error: no velocity for left edge direction {left} and right edge direction {right}")]
pub struct BisectorError {
    pub left:Vector2<f64>,
    pub right:Vector2<f64>,
}
