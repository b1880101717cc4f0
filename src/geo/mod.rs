use nalgebra::Point2;
use nalgebra_glm::cross2d;

mod aabb;
pub use aabb::*;

mod contour;
pub use contour::*;

mod polygon;
pub use polygon::*;

mod error;
pub use error::GeometryError;

/// The Enclosed trait defines that the struct encloses an area.
/// structs that implement Enclosed therefore have an interior and an exterior.
pub trait Enclosed {
    /// computes the signed area of the shape (positive for counter clockwise loops)
    fn area(&self) -> f64;
    /// returns true if the point is inside the enclosed area
    fn point_is_inside(&self,point:&Point2<f64>) -> bool;
}

/// Twice the signed area of the triangle a b c.
/// Positive when c lies to the left of the directed line a->b
pub fn orient2d(a:&Point2<f64>, b:&Point2<f64>, c:&Point2<f64>) -> f64 {
    cross2d(&(b - a), &(c - a))
}

/// Returns true if the closed segments p1-p2 and q1-q2 share at least one point
pub fn segments_intersect(p1:&Point2<f64>, p2:&Point2<f64>, q1:&Point2<f64>, q2:&Point2<f64>) -> bool {
    let d1 = orient2d(q1, q2, p1);
    let d2 = orient2d(q1, q2, p2);
    let d3 = orient2d(p1, p2, q1);
    let d4 = orient2d(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) &&
       ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true
    }
    (d1 == 0.0 && on_segment(q1, q2, p1)) ||
    (d2 == 0.0 && on_segment(q1, q2, p2)) ||
    (d3 == 0.0 && on_segment(p1, p2, q1)) ||
    (d4 == 0.0 && on_segment(p1, p2, q2))
}

// assumes p is collinear with a-b
fn on_segment(a:&Point2<f64>, b:&Point2<f64>, p:&Point2<f64>) -> bool {
    a.x.min(b.x) <= p.x && p.x <= a.x.max(b.x) &&
    a.y.min(b.y) <= p.y && p.y <= a.y.max(b.y)
}

/// Euclidean distance from the point p to the closed segment a-b
pub fn distance_to_segment(p:&Point2<f64>, a:&Point2<f64>, b:&Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 { return (p - a).norm() }
    let s = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * s)).norm()
}
