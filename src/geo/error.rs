use thiserror::Error;

/// Rejections raised while turning raw rings into a [`Polygon`](super::Polygon).
/// Ring 0 is the outer boundary, ring `k > 0` is hole `k`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Degenerate input: ring {ring} {reason}")]
    DegenerateInput{ ring:usize, reason:String },
    #[error("Invalid hole {hole}: {reason}")]
    InvalidHole{ hole:usize, reason:String },
}
impl GeometryError {
    /// relabels a ring-level error with the position of the ring inside its
    /// polygon. Any failure of a hole ring is an invalid hole.
    pub(super) fn on_ring(self, ring:usize) -> Self {
        match self {
            GeometryError::DegenerateInput{reason,..} if ring == 0 => GeometryError::DegenerateInput{ring,reason},
            GeometryError::DegenerateInput{reason,..} | GeometryError::InvalidHole{reason,..} =>
                GeometryError::InvalidHole{hole:ring,reason},
        }
    }
}
