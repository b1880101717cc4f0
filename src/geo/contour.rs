use nalgebra::Point2;
use super::{Enclosed, GeometryError, AABB};
use super::{orient2d, segments_intersect};

/// A closed ring of points. The closing edge from the last point back to the
/// first is implicit.
#[derive(Debug,Clone,PartialEq)]
pub struct Contour{
    pub area:f64,
    pub aabb:AABB,
    pub points: Vec<Point2<f64>>
}
impl Enclosed for Contour{
    fn area(&self) -> f64 {
        self.area
    }
    fn point_is_inside(&self,point:&Point2<f64>)->bool{
        if !self.aabb.point_is_inside(point) { return false }

        let intersections = self.edges()
            .filter(|(p1,p2)|{
                // check if the ray will intersect the line
                let ray_crosses_the_edge = (p1.y <= point.y) != (p2.y <= point.y);
                // check if the intersection point is on the correct side of the point
                ray_crosses_the_edge &&
                    point.x <= ((point.y-p1.y)*(p2.x-p1.x)/(p2.y-p1.y) + p1.x)
            })
            .count();

        intersections % 2 == 1
    }
}
impl Contour {
    /// Builds a validated ring. Consecutive duplicate points and a closing
    /// point equal to the first one are dropped before validation.
    pub fn new(points:Vec<Point2<f64>>) -> Result<Self, GeometryError> {
        let mut cleaned: Vec<Point2<f64>> = Vec::with_capacity(points.len());
        for point in points {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(GeometryError::DegenerateInput{
                    ring: 0,
                    reason: format!("contains a non finite coordinate ({}, {})", point.x, point.y),
                })
            }
            if cleaned.last() != Some(&point) { cleaned.push(point) }
        }
        while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            return Err(GeometryError::DegenerateInput{
                ring: 0,
                reason: format!("has {} distinct points, at least 3 are required", cleaned.len()),
            })
        }
        let contour = Self::from_points(cleaned);
        if contour.area == 0.0 {
            return Err(GeometryError::DegenerateInput{ ring: 0, reason: "has zero area".into() })
        }
        if let Some((i,j)) = contour.self_intersection() {
            return Err(GeometryError::DegenerateInput{
                ring: 0,
                reason: format!("is self intersecting at edges {i} and {j}"),
            })
        }
        Ok(contour)
    }
    fn from_points(points:Vec<Point2<f64>>) -> Self {
        let first_point = points[0];
        let last_point = points[points.len()-1];
        let mut area = last_point.x*first_point.y-first_point.x*last_point.y;
        for (p1, p2) in points.iter().zip(points.iter().skip(1)) {
            area += p1.x*p2.y-p2.x*p1.y;
        }
        let aabb = AABB::from_points(points.iter()).unwrap_or(AABB{
            x_max:first_point.x, x_min:first_point.x, y_max:first_point.y, y_min:first_point.y
        });
        Self{
            area: area/2.0,
            aabb,
            points,
        }
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_ccw(&self) -> bool {
        self.area > 0.0
    }
    pub fn reverse_order(&mut self) {
        self.points.reverse();
        self.area = self.area * -1.0;
    }
    // returns a iterator over pairs of edges (pairs of points)
    pub fn edges(&self) -> impl Iterator<Item = (&Point2<f64>,&Point2<f64>)>{
        let points = self.points.iter();
        let points_offset_by_one = points.clone().cycle().skip(1);
        points.zip(points_offset_by_one)
    }
    /// Returns the first pair of edges (by index) that cross, touch or fold back onto each other
    pub fn self_intersection(&self) -> Option<(usize,usize)> {
        let n = self.points.len();
        let edge = |i:usize| (&self.points[i], &self.points[(i+1)%n]);
        for i in 0..n {
            let (a, b) = edge(i);
            // adjacent edges may only share their common vertex
            let (_, c) = edge((i+1)%n);
            if orient2d(a, b, c) == 0.0 && (c - b).dot(&(a - b)) > 0.0 {
                return Some((i,(i+1)%n))
            }
            for j in (i+2)..n {
                if i == 0 && j == n-1 { continue }
                let (p, q) = edge(j);
                if segments_intersect(a, b, p, q) {
                    return Some((i,j))
                }
            }
        }
        None
    }
    /// Returns true if any edge of self shares a point with any edge of other
    pub fn intersects(&self, other:&Contour) -> bool {
        if !self.aabb.overlaps(&other.aabb) { return false }
        self.edges().any(|(a,b)| other.edges().any(|(p,q)| segments_intersect(a, b, p, q)))
    }
}

#[macro_export]
macro_rules! contour {
    ( $( [$x:expr, $y:expr] ),* ) => {
        $crate::geo::Contour::new(vec![
            $(
                nalgebra::Point2::new($x,$y),
            )*
        ])
    };
}

#[test]
fn contour_macro_test(){
    assert_eq!(
        contour!([2.+3.,4.],[3.,4.],[3.,5.]),
        Contour::new(vec![
            Point2::new(2.+3.,4.),
            Point2::new(3.,4.),
            Point2::new(3.,5.),
        ])
    )
}
#[test]
fn contour_area_and_orientation(){
    let mut square = contour!([0.,0.],[4.,0.],[4.,4.],[0.,4.]).unwrap();
    assert_eq!(square.area, 16.0);
    assert!(square.is_ccw());
    square.reverse_order();
    assert_eq!(square.area, -16.0);
    assert_eq!(square.points[0], Point2::new(0.,4.));
}
#[test]
fn contour_drops_duplicate_points(){
    let contour = contour!([0.,0.],[1.,0.],[1.,0.],[1.,1.],[0.,0.]).unwrap();
    assert_eq!(contour.len(), 3);
}
#[test]
fn contour_rejects_degenerate_rings(){
    assert!(matches!(
        contour!([0.,0.],[1.,0.],[0.,0.]),
        Err(GeometryError::DegenerateInput{..})
    ));
    assert!(matches!(
        contour!([0.,0.],[1.,0.],[2.,0.]),
        Err(GeometryError::DegenerateInput{..})
    ));
    assert!(matches!(
        contour!([0.,0.],[f64::NAN,0.],[2.,1.]),
        Err(GeometryError::DegenerateInput{..})
    ));
}
#[test]
fn contour_rejects_self_intersection(){
    let bow_tie = contour!([0.,0.],[2.,2.],[2.,0.],[0.,2.]);
    assert!(matches!(bow_tie, Err(GeometryError::DegenerateInput{..})));
    let spike = contour!([0.,0.],[4.,0.],[4.,4.],[4.,2.],[0.,4.]);
    assert!(matches!(spike, Err(GeometryError::DegenerateInput{..})));
}
#[test]
fn contour_point_is_inside(){
    let l_shape = contour!([0.,0.],[4.,0.],[4.,2.],[2.,2.],[2.,4.],[0.,4.]).unwrap();
    assert!(l_shape.point_is_inside(&Point2::new(1.,3.)));
    assert!(l_shape.point_is_inside(&Point2::new(3.,1.)));
    assert!(!l_shape.point_is_inside(&Point2::new(3.,3.)));
    assert!(!l_shape.point_is_inside(&Point2::new(5.,1.)));
}
