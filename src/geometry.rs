//! Geometry kernel: points, rectangles and hit-testing primitives.
//!
//! Everything here works in `f64` image-space pixels. All functions are total over
//! finite inputs; callers validate pointer coordinates with [`validate_point`] before
//! anything reaches the scene.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use thiserror::Error;

/// Rejected geometric input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("non-finite coordinate ({x}, {y})")]
    InvalidGeometry { x: f64, y: f64 },
}

/// A point (or displacement vector) in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Length of the point interpreted as a vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Returns an error for NaN or infinite coordinates.
pub fn validate_point(point: Point) -> Result<Point, GeometryError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(GeometryError::InvalidGeometry {
            x: point.x,
            y: point.y,
        })
    }
}

/// Axis-aligned rectangle with non-negative width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Builds a normalized rectangle from two opposite corners, in any drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Smallest rectangle covering every point, or `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    fn contains_strict(&self, p: Point) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && p.x > self.x
            && p.x < self.right()
            && p.y > self.y
            && p.y < self.bottom()
    }

    /// Grows the rectangle by `amount` on every side. Negative amounts shrink it,
    /// collapsing to the center rather than inverting.
    pub fn inflate(&self, amount: f64) -> Self {
        let width = (self.width + amount * 2.0).max(0.0);
        let height = (self.height + amount * 2.0).max(0.0);
        let c = self.center();
        Self {
            x: c.x - width / 2.0,
            y: c.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self::from_corners(
            Point::new(self.x.min(other.x), self.y.min(other.y)),
            Point::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Integer pixel span `(x0, y0, x1, y1)` (exclusive max) clamped to an image.
    /// Returns `None` when nothing of the rectangle lies inside the image.
    pub fn pixel_span(&self, image_width: i32, image_height: i32) -> Option<(i32, i32, i32, i32)> {
        let x0 = (self.x.floor() as i32).clamp(0, image_width);
        let y0 = (self.y.floor() as i32).clamp(0, image_height);
        let x1 = (self.right().ceil() as i32).clamp(0, image_width);
        let y1 = (self.bottom().ceil() as i32).clamp(0, image_height);
        if x1 > x0 && y1 > y0 {
            Some((x0, y0, x1, y1))
        } else {
            None
        }
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a - b).length()
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    distance(p, a + ab.scale(t))
}

/// True if `p` is within `tolerance` of any segment of the polyline.
pub fn point_near_polyline(points: &[Point], p: Point, tolerance: f64) -> bool {
    match points {
        [] => false,
        [only] => distance(*only, p) <= tolerance,
        _ => points
            .windows(2)
            .any(|w| point_segment_distance(p, w[0], w[1]) <= tolerance),
    }
}

/// True if `p` lies within `tolerance` of the rectangle's outline.
pub fn point_near_rect_border(rect: &Rect, p: Point, tolerance: f64) -> bool {
    rect.inflate(tolerance).contains(p) && !rect.inflate(-tolerance).contains_strict(p)
}

/// Normalized radial distance of `p` from the ellipse inscribed in `rect`
/// (1.0 on the outline). Degenerate ellipses report infinity.
fn ellipse_radial(rect: &Rect, p: Point) -> f64 {
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return f64::INFINITY;
    }
    let c = rect.center();
    let nx = (p.x - c.x) / rx;
    let ny = (p.y - c.y) / ry;
    nx.hypot(ny)
}

pub fn point_in_ellipse(rect: &Rect, p: Point, tolerance: f64) -> bool {
    ellipse_radial(&rect.inflate(tolerance), p) <= 1.0
}

/// Approximate outline test: the radial error is scaled by the smaller radius.
pub fn point_near_ellipse(rect: &Rect, p: Point, tolerance: f64) -> bool {
    let r = ellipse_radial(rect, p);
    if !r.is_finite() {
        // Flat ellipse: treat as its bounding segment.
        return point_near_rect_border(rect, p, tolerance);
    }
    let min_radius = (rect.width.min(rect.height)) / 2.0;
    (r - 1.0).abs() * min_radius <= tolerance
}

/// Computes the two barb end points of an arrowhead at `tip`, pointing away from `tail`.
///
/// The head length is capped at 30% of the shaft so short arrows stay legible.
/// A degenerate shaft (< 1px) returns the tip twice.
///
/// # Arguments
/// * `tip` - Where the arrowhead sits
/// * `tail` - The other end of the shaft
/// * `length` - Desired barb length in pixels
/// * `angle_degrees` - Angle between each barb and the shaft
pub fn arrowhead(tip: Point, tail: Point, length: f64, angle_degrees: f64) -> [Point; 2] {
    let d = tip - tail;
    let line_length = d.length();
    if line_length < 1.0 {
        return [tip, tip];
    }

    let ux = d.x / line_length;
    let uy = d.y / line_length;
    let head = length.min(line_length * 0.3);
    let (sin_a, cos_a) = angle_degrees.to_radians().sin_cos();

    let left = Point::new(
        tip.x - head * (ux * cos_a - uy * sin_a),
        tip.y - head * (uy * cos_a + ux * sin_a),
    );
    let right = Point::new(
        tip.x - head * (ux * cos_a + uy * sin_a),
        tip.y - head * (uy * cos_a - ux * sin_a),
    );
    [left, right]
}

/// Snaps `end` so the segment from `start` lies on a multiple of 45 degrees.
pub fn snap_to_45(start: Point, end: Point) -> Point {
    let d = end - start;
    let len = d.length();
    if len == 0.0 {
        return end;
    }
    let step = std::f64::consts::FRAC_PI_4;
    let angle = (d.y.atan2(d.x) / step).round() * step;
    Point::new(start.x + len * angle.cos(), start.y + len * angle.sin())
}

/// Moves `end` so the drag from `start` covers a square, keeping the drag direction.
pub fn square_from_corners(start: Point, end: Point) -> Point {
    let d = end - start;
    let side = d.x.abs().max(d.y.abs());
    Point::new(
        start.x + side.copysign(d.x),
        start.y + side.copysign(d.y),
    )
}

/// One of the eight resize handles of a box, or an endpoint of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
    Start,
    End,
}

impl Handle {
    pub const BOX: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Left,
        Handle::Right,
        Handle::BottomLeft,
        Handle::Bottom,
        Handle::BottomRight,
    ];

    /// Position of this handle on `rect`. Segment endpoints have no box position.
    pub fn position(self, rect: &Rect) -> Option<Point> {
        let (l, t, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());
        let (cx, cy) = (rect.center().x, rect.center().y);
        let p = match self {
            Handle::TopLeft => Point::new(l, t),
            Handle::Top => Point::new(cx, t),
            Handle::TopRight => Point::new(r, t),
            Handle::Left => Point::new(l, cy),
            Handle::Right => Point::new(r, cy),
            Handle::BottomLeft => Point::new(l, b),
            Handle::Bottom => Point::new(cx, b),
            Handle::BottomRight => Point::new(r, b),
            Handle::Start | Handle::End => return None,
        };
        Some(p)
    }

    /// Applies a drag of this handle to `pos`, returning the resized box.
    pub fn resize_box(self, rect: &Rect, pos: Point) -> Rect {
        let (mut l, mut t, mut r, mut b) = (rect.x, rect.y, rect.right(), rect.bottom());
        match self {
            Handle::TopLeft => (l, t) = (pos.x, pos.y),
            Handle::Top => t = pos.y,
            Handle::TopRight => (r, t) = (pos.x, pos.y),
            Handle::Left => l = pos.x,
            Handle::Right => r = pos.x,
            Handle::BottomLeft => (l, b) = (pos.x, pos.y),
            Handle::Bottom => b = pos.y,
            Handle::BottomRight => (r, b) = (pos.x, pos.y),
            Handle::Start | Handle::End => {}
        }
        Rect::from_corners(Point::new(l, t), Point::new(r, b))
    }
}

/// Finds the handle whose square (side `2 * half_size`) contains `p`.
pub fn handle_at(handles: &[(Handle, Point)], p: Point, half_size: f64) -> Option<Handle> {
    handles
        .iter()
        .find(|(_, c)| (p.x - c.x).abs() <= half_size && (p.y - c.y).abs() <= half_size)
        .map(|(h, _)| *h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_normalizes_any_drag_direction() {
        let r = Rect::from_corners(Point::new(30.0, 40.0), Point::new(10.0, 5.0));
        assert_eq!(r, Rect { x: 10.0, y: 5.0, width: 20.0, height: 35.0 });
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_segment_distance(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_segment_distance(Point::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(point_segment_distance(Point::new(2.0, 0.0), a, a), 2.0);
    }

    #[test]
    fn rect_border_ignores_interior() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(point_near_rect_border(&r, Point::new(2.0, 25.0), 5.0));
        assert!(point_near_rect_border(&r, Point::new(-4.0, 25.0), 5.0));
        assert!(!point_near_rect_border(&r, Point::new(50.0, 25.0), 5.0));
        assert!(!point_near_rect_border(&r, Point::new(-6.0, 25.0), 5.0));
    }

    #[test]
    fn ellipse_outline_and_fill() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(point_near_ellipse(&r, Point::new(100.0, 25.0), 2.0));
        assert!(!point_near_ellipse(&r, Point::new(50.0, 25.0), 2.0));
        assert!(point_in_ellipse(&r, Point::new(50.0, 25.0), 0.0));
        assert!(!point_in_ellipse(&r, Point::new(2.0, 2.0), 0.0));
    }

    #[test]
    fn arrowhead_caps_at_thirty_percent_of_line_length() {
        let [left, _] = arrowhead(Point::new(10.0, 10.0), Point::new(0.0, 10.0), 100.0, 30.0);
        let len = distance(Point::new(10.0, 10.0), left);
        assert!((len - 3.0).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_handles_degenerate_lines() {
        let tip = Point::new(5.0, 5.0);
        assert_eq!(arrowhead(tip, tip, 15.0, 45.0), [tip, tip]);
    }

    #[test]
    fn snap_to_45_rounds_angle_and_keeps_length() {
        let snapped = snap_to_45(Point::new(0.0, 0.0), Point::new(10.0, 1.0));
        assert!((snapped.y).abs() < 1e-9);
        assert!((snapped.x - 101f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn square_constraint_keeps_direction() {
        let end = square_from_corners(Point::new(10.0, 10.0), Point::new(0.0, 40.0));
        assert_eq!(end, Point::new(-20.0, 40.0));
    }

    #[test]
    fn handle_resize_renormalizes_when_dragged_past_opposite_edge() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        let resized = Handle::Left.resize_box(&r, Point::new(50.0, 0.0));
        assert_eq!(resized, Rect::new(30.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn handle_lookup_uses_square_hit_area() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let handles: Vec<_> = Handle::BOX
            .iter()
            .filter_map(|h| h.position(&r).map(|p| (*h, p)))
            .collect();
        assert_eq!(handle_at(&handles, Point::new(11.0, 10.5), 4.0), Some(Handle::BottomRight));
        assert_eq!(handle_at(&handles, Point::new(5.0, 5.0), 4.0), None);
    }

    #[test]
    fn validate_point_rejects_nan() {
        assert!(validate_point(Point::new(f64::NAN, 0.0)).is_err());
        assert!(validate_point(Point::new(1.0, 2.0)).is_ok());
    }

    #[test]
    fn pixel_span_clamps_to_image() {
        let r = Rect::new(-5.5, 2.2, 20.0, 100.0);
        assert_eq!(r.pixel_span(10, 50), Some((0, 2, 10, 50)));
        assert_eq!(Rect::new(20.0, 20.0, 5.0, 5.0).pixel_span(10, 10), None);
    }
}
