//! Zoom/pan transform between image space and screen space.
//!
//! `screen = image * zoom + pan`, so `pan` is the screen position of the image
//! origin. The viewport never touches the scene.

use crate::geometry::Point;
use log::debug;

/// Margin kept around the image by [`Viewport::fit_to_image`], in screen pixels.
const FIT_PADDING: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
    /// Size of the drawable area in screen pixels
    size: (f64, f64),
}

impl Viewport {
    /// Creates an identity viewport with the given zoom bounds.
    ///
    /// Bounds are reordered if given backwards; `zoom_step` must exceed 1.0 to
    /// have any effect.
    pub fn new(min_zoom: f64, max_zoom: f64, zoom_step: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Point::default(),
            min_zoom,
            max_zoom,
            zoom_step,
            size: (0.0, 0.0),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Point {
        self.pan
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.size = (width.max(0.0), height.max(0.0));
    }

    pub fn to_image_space(&self, screen: Point) -> Point {
        (screen - self.pan).scale(1.0 / self.zoom)
    }

    pub fn to_screen_space(&self, image: Point) -> Point {
        image.scale(self.zoom) + self.pan
    }

    /// Multiplies the zoom by `factor`, keeping the image point under `screen`
    /// fixed on screen. Returns false when the zoom was already at the bound.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let anchor = self.to_image_space(screen);
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.pan = screen - anchor.scale(zoom);
        debug!("Viewport zoom {:.0}%", zoom * 100.0);
        true
    }

    /// Zooms one step in about the viewport center.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(self.center(), self.zoom_step)
    }

    /// Zooms one step out about the viewport center.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(self.center(), 1.0 / self.zoom_step)
    }

    /// Shifts the view by a screen-space delta.
    pub fn pan(&mut self, delta: Point) {
        self.pan = self.pan + delta;
    }

    /// Back to 100% with the image origin at the top-left corner.
    pub fn reset_view(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        self.pan = Point::default();
    }

    /// Scales the image to fit the viewport (never above 100%) and centers it.
    pub fn fit_to_image(&mut self, image_width: f64, image_height: f64) {
        let (w, h) = self.size;
        if w <= 0.0 || h <= 0.0 || image_width <= 0.0 || image_height <= 0.0 {
            self.reset_view();
            return;
        }
        let avail_w = (w - FIT_PADDING * 2.0).max(1.0);
        let avail_h = (h - FIT_PADDING * 2.0).max(1.0);
        let zoom = (avail_w / image_width)
            .min(avail_h / image_height)
            .min(1.0)
            .clamp(self.min_zoom, self.max_zoom);
        self.zoom = zoom;
        self.pan = Point::new(
            (w - image_width * zoom) / 2.0,
            (h - image_height * zoom) / 2.0,
        );
    }

    fn center(&self) -> Point {
        Point::new(self.size.0 / 2.0, self.size.1 / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 8.0, 1.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn image_and_screen_space_are_inverse() {
        let mut vp = Viewport::default();
        vp.zoom_at(Point::new(30.0, 40.0), 2.5);
        vp.pan(Point::new(-13.0, 7.5));
        let p = Point::new(123.0, -45.0);
        assert!(approx(vp.to_screen_space(vp.to_image_space(p)), p));
    }

    #[test]
    fn zoom_at_keeps_point_fixed() {
        let mut vp = Viewport::default();
        vp.pan(Point::new(20.0, 10.0));
        let screen = Point::new(300.0, 200.0);
        let image = vp.to_image_space(screen);
        assert!(vp.zoom_at(screen, 1.25));
        assert!(approx(vp.to_screen_space(image), screen));
        assert!((vp.zoom() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut vp = Viewport::new(0.5, 2.0, 1.25);
        for _ in 0..20 {
            vp.zoom_at(Point::new(10.0, 10.0), 2.0);
        }
        assert_eq!(vp.zoom(), 2.0);
        assert!(!vp.zoom_at(Point::new(10.0, 10.0), 2.0));
        vp.zoom_at(Point::new(10.0, 10.0), 0.001);
        assert_eq!(vp.zoom(), 0.5);
    }

    #[test]
    fn reset_view_restores_identity() {
        let mut vp = Viewport::default();
        vp.zoom_at(Point::new(5.0, 5.0), 3.0);
        vp.pan(Point::new(40.0, 40.0));
        vp.reset_view();
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan_offset(), Point::default());
    }

    #[test]
    fn fit_centers_and_never_upscales() {
        let mut vp = Viewport::default();
        vp.set_viewport_size(800.0, 600.0);
        vp.fit_to_image(100.0, 50.0);
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan_offset(), Point::new(350.0, 275.0));

        vp.fit_to_image(1440.0, 1040.0);
        assert!((vp.zoom() - 0.5).abs() < 1e-12);
    }
}
