use nalgebra::Point2;

use super::Enclosed;

/// Axis Aligned Bounding Box
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct AABB{
    pub x_max:f64,
    pub x_min:f64,
    pub y_max:f64,
    pub y_min:f64,
}
impl Enclosed for AABB {
    fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }
    fn point_is_inside(&self,point:&Point2<f64>) -> bool {
        self.x_min <= point.x && point.x <= self.x_max &&
        self.y_min <= point.y && point.y <= self.y_max
    }
}
impl AABB {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let aabb = points.fold(
            AABB{ x_max:first.x, x_min:first.x, y_max:first.y, y_min:first.y },
            |mut aabb, p| {
                aabb.x_max = aabb.x_max.max(p.x);
                aabb.x_min = aabb.x_min.min(p.x);
                aabb.y_max = aabb.y_max.max(p.y);
                aabb.y_min = aabb.y_min.min(p.y);
                aabb
            });
        Some(aabb)
    }
    pub fn overlaps(&self, other:&AABB) -> bool {
        self.x_min <= other.x_max && other.x_min <= self.x_max &&
        self.y_min <= other.y_max && other.y_min <= self.y_max
    }
    /// length of the box diagonal, the reference scale for geometric tolerances
    pub fn diagonal(&self) -> f64 {
        (self.x_max - self.x_min).hypot(self.y_max - self.y_min)
    }
}
