use nalgebra::Point2;
use super::{Contour, GeometryError, AABB};
pub use super::Enclosed;

/// A simple polygon with holes. The outer loop is counter clockwise and
/// every hole is clockwise, so the interior is always on the left of an edge.
#[derive(Debug,Clone,PartialEq)]
pub struct Polygon{
    pub outer_loop: Contour,
    pub holes: Vec<Contour>,
}
impl Enclosed for Polygon {
    fn area(&self) -> f64 {
        let area = self.outer_loop.area();
        let hole_area: f64 = self.holes.iter().map(|contour| contour.area() ).sum();
        // holes are clockwise so their area is negative
        area + hole_area
    }
    fn point_is_inside(&self,point:&Point2<f64>) -> bool {
        if !self.outer_loop.point_is_inside(point) { return false }
        !self.holes.iter().any(|hole| hole.point_is_inside(point))
    }
}

impl Polygon {
    /// Normalizes the winding of every ring and checks that the holes sit
    /// strictly inside the outer loop without touching it or each other.
    pub fn new(mut outer_loop:Contour,mut holes:Vec<Contour>) -> Result<Self, GeometryError> {
        if outer_loop.area.is_sign_negative() {
            outer_loop.reverse_order();
        }
        for hole in holes.iter_mut() {
            if hole.area.is_sign_positive(){
                hole.reverse_order();
            }
        }
        for (i, hole) in holes.iter().enumerate() {
            let hole_ndx = i + 1;
            if hole.intersects(&outer_loop) {
                return Err(GeometryError::InvalidHole{
                    hole: hole_ndx,
                    reason: "touches or crosses the outer boundary".into(),
                })
            }
            if !outer_loop.point_is_inside(&hole.points[0]) {
                return Err(GeometryError::InvalidHole{
                    hole: hole_ndx,
                    reason: "lies outside the outer boundary".into(),
                })
            }
            for (j, other) in holes.iter().enumerate().take(i) {
                if hole.intersects(other) {
                    return Err(GeometryError::InvalidHole{
                        hole: hole_ndx,
                        reason: format!("touches or crosses hole {}", j + 1),
                    })
                }
                if other.point_is_inside(&hole.points[0]) || hole.point_is_inside(&other.points[0]) {
                    return Err(GeometryError::InvalidHole{
                        hole: hole_ndx,
                        reason: format!("is nested with hole {}", j + 1),
                    })
                }
            }
        }
        Ok(Self{
            outer_loop,
            holes,
        })
    }
    /// Builds a polygon from raw rings, the first ring being the outer boundary
    pub fn from_rings(rings:Vec<Vec<Point2<f64>>>) -> Result<Self, GeometryError> {
        let mut rings = rings.into_iter().enumerate()
            .map(|(i, ring)| Contour::new(ring).map_err(|error| error.on_ring(i)));
        let outer_loop = match rings.next() {
            Some(outer_loop) => outer_loop?,
            None => return Err(GeometryError::DegenerateInput{ ring:0, reason:"is missing".into() }),
        };
        let holes = rings.collect::<Result<Vec<_>,_>>()?;
        Self::new(outer_loop, holes)
    }
    /// Iterates over the outer loop followed by the holes
    pub fn rings(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.outer_loop).chain(self.holes.iter())
    }
    pub fn vertex_count(&self) -> usize {
        self.rings().map(|ring| ring.len()).sum()
    }
    pub fn aabb(&self) -> AABB {
        self.outer_loop.aabb
    }
}
