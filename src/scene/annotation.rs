//! Annotation variants and their per-shape geometry (bounds, hit-testing, editing).

use crate::draw::{Color, FontDescriptor, text_bounds};
use crate::geometry::{self, Handle, Point, Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an annotation within one scene. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub(crate) u64);

impl AnnotationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual attributes shared by every annotation kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Outline color; text and badge fill color for text and step badges
    pub stroke: Color,
    /// Stroke width in image pixels
    pub width: f64,
    /// Interior fill, if any
    pub fill: Option<Color>,
    /// Multiplier applied to every color's alpha (0.0 - 1.0)
    pub opacity: f64,
    /// Font size used by text annotations
    pub font_size: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Color::from_rgb8(255, 80, 80),
            width: 3.0,
            fill: None,
            opacity: 1.0,
            font_size: 18.0,
        }
    }
}

/// Outline of a spotlight region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotlightShape {
    Rectangle,
    Ellipse,
}

/// Filter used by blur regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BlurMode {
    /// Multi-pass box blur approximating a gaussian
    Blur,
    /// Block averaging
    Pixelate,
}

/// Variant-specific geometry and payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    Rectangle {
        rect: Rect,
    },
    Ellipse {
        rect: Rect,
    },
    /// Straight arrow; the head sits at `end`
    Arrow {
        start: Point,
        end: Point,
        head_length: f64,
        head_angle: f64,
    },
    Freehand {
        points: Vec<Point>,
    },
    /// Text whose layout box starts at `anchor` (top-left)
    Text {
        anchor: Point,
        text: String,
        font: FontDescriptor,
    },
    /// Translucent marker stroke, composited with multiply blending
    Highlighter {
        points: Vec<Point>,
    },
    /// Darkens everything outside `rect`
    Spotlight {
        rect: Rect,
        shape: SpotlightShape,
        darkness: f64,
    },
    /// Blurs or pixelates everything inside `rect`
    Blur {
        rect: Rect,
        mode: BlurMode,
        radius: f64,
    },
    /// Numbered circular badge
    StepCounter {
        center: Point,
        number: u32,
        radius: f64,
    },
    /// Distance measurement between two points
    Ruler {
        start: Point,
        end: Point,
    },
}

/// Spotlight borders are only grabbable near the outline, with a wider band.
const SPOTLIGHT_BORDER_TOLERANCE: f64 = 10.0;

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Rectangle { .. } => "rectangle",
            AnnotationKind::Ellipse { .. } => "ellipse",
            AnnotationKind::Arrow { .. } => "arrow",
            AnnotationKind::Freehand { .. } => "freehand",
            AnnotationKind::Text { .. } => "text",
            AnnotationKind::Highlighter { .. } => "highlighter",
            AnnotationKind::Spotlight { .. } => "spotlight",
            AnnotationKind::Blur { .. } => "blur",
            AnnotationKind::StepCounter { .. } => "step",
            AnnotationKind::Ruler { .. } => "ruler",
        }
    }

    /// Box-shaped kinds expose eight resize handles.
    fn box_rect(&self) -> Option<&Rect> {
        match self {
            AnnotationKind::Rectangle { rect }
            | AnnotationKind::Ellipse { rect }
            | AnnotationKind::Spotlight { rect, .. }
            | AnnotationKind::Blur { rect, .. } => Some(rect),
            _ => None,
        }
    }

    /// Axis-aligned bounds in image space, including stroke width.
    pub fn bounds(&self, style: &Style) -> Rect {
        let pad = style.width / 2.0;
        match self {
            AnnotationKind::Rectangle { rect } | AnnotationKind::Ellipse { rect } => {
                rect.inflate(pad)
            }
            AnnotationKind::Spotlight { rect, .. } | AnnotationKind::Blur { rect, .. } => *rect,
            AnnotationKind::Arrow {
                start,
                end,
                head_length,
                head_angle,
            } => {
                let [l, r] = geometry::arrowhead(*end, *start, *head_length, *head_angle);
                Rect::bounding(&[*start, *end, l, r])
                    .unwrap_or_default()
                    .inflate(pad)
            }
            AnnotationKind::Freehand { points } | AnnotationKind::Highlighter { points } => {
                Rect::bounding(points).unwrap_or_default().inflate(pad)
            }
            AnnotationKind::Text { anchor, text, font } => {
                text_bounds(*anchor, text, font, style.font_size)
            }
            AnnotationKind::StepCounter { center, radius, .. } => {
                Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
            }
            AnnotationKind::Ruler { start, end } => Rect::from_corners(*start, *end).inflate(pad),
        }
    }

    /// Shape-accurate hit test: outlines for stroked shapes, interiors for filled
    /// shapes, text boxes and effect regions.
    pub fn hit(&self, style: &Style, p: Point, tolerance: f64) -> bool {
        let reach = tolerance + style.width / 2.0;
        match self {
            AnnotationKind::Rectangle { rect } => {
                if style.fill.is_some() {
                    rect.inflate(reach).contains(p)
                } else {
                    geometry::point_near_rect_border(rect, p, reach)
                }
            }
            AnnotationKind::Ellipse { rect } => {
                if style.fill.is_some() {
                    geometry::point_in_ellipse(rect, p, reach)
                } else {
                    geometry::point_near_ellipse(rect, p, reach)
                }
            }
            AnnotationKind::Arrow {
                start,
                end,
                head_length,
                head_angle,
            } => {
                let [l, r] = geometry::arrowhead(*end, *start, *head_length, *head_angle);
                geometry::point_segment_distance(p, *start, *end) <= reach
                    || geometry::point_segment_distance(p, *end, l) <= reach
                    || geometry::point_segment_distance(p, *end, r) <= reach
            }
            AnnotationKind::Freehand { points } | AnnotationKind::Highlighter { points } => {
                geometry::point_near_polyline(points, p, reach)
            }
            AnnotationKind::Text { .. } => self.bounds(style).inflate(tolerance).contains(p),
            AnnotationKind::Spotlight { rect, .. } => geometry::point_near_rect_border(
                rect,
                p,
                tolerance.max(SPOTLIGHT_BORDER_TOLERANCE),
            ),
            AnnotationKind::Blur { rect, .. } => rect.inflate(tolerance).contains(p),
            AnnotationKind::StepCounter { center, radius, .. } => {
                geometry::distance(*center, p) <= radius + tolerance
            }
            AnnotationKind::Ruler { start, end } => {
                geometry::point_segment_distance(p, *start, *end) <= reach
            }
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = Point::new(dx, dy);
        match self {
            AnnotationKind::Rectangle { rect }
            | AnnotationKind::Ellipse { rect }
            | AnnotationKind::Spotlight { rect, .. }
            | AnnotationKind::Blur { rect, .. } => *rect = rect.translate(dx, dy),
            AnnotationKind::Arrow { start, end, .. } | AnnotationKind::Ruler { start, end } => {
                *start = *start + shift;
                *end = *end + shift;
            }
            AnnotationKind::Freehand { points } | AnnotationKind::Highlighter { points } => {
                for p in points.iter_mut() {
                    *p = *p + shift;
                }
            }
            AnnotationKind::Text { anchor, .. } => *anchor = *anchor + shift,
            AnnotationKind::StepCounter { center, .. } => *center = *center + shift,
        }
    }

    /// Resize handles with their image-space positions.
    pub fn handles(&self) -> Vec<(Handle, Point)> {
        if let Some(rect) = self.box_rect() {
            return Handle::BOX
                .iter()
                .filter_map(|h| h.position(rect).map(|p| (*h, p)))
                .collect();
        }
        match self {
            AnnotationKind::Arrow { start, end, .. } | AnnotationKind::Ruler { start, end } => {
                vec![(Handle::Start, *start), (Handle::End, *end)]
            }
            _ => Vec::new(),
        }
    }

    /// Moves `handle` to `pos`. Kinds without that handle are left untouched.
    pub fn resize(&mut self, handle: Handle, pos: Point) {
        match self {
            AnnotationKind::Rectangle { rect }
            | AnnotationKind::Ellipse { rect }
            | AnnotationKind::Spotlight { rect, .. }
            | AnnotationKind::Blur { rect, .. } => *rect = handle.resize_box(rect, pos),
            AnnotationKind::Arrow { start, end, .. } | AnnotationKind::Ruler { start, end } => {
                match handle {
                    Handle::Start => *start = pos,
                    Handle::End => *end = pos,
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

/// One entry of the scene: identity, style and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub style: Style,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn bounds(&self) -> Rect {
        self.kind.bounds(&self.style)
    }

    pub fn hit(&self, p: Point, tolerance: f64) -> bool {
        self.kind.hit(&self.style, p, tolerance)
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.kind.translate(dx, dy);
        moved
    }

    /// Returns a copy with `handle` dragged to `pos`.
    pub fn resized(&self, handle: Handle, pos: Point) -> Self {
        let mut resized = self.clone();
        resized.kind.resize(handle, pos);
        resized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(kind: AnnotationKind) -> Annotation {
        Annotation {
            id: AnnotationId(1),
            style: Style::default(),
            kind,
        }
    }

    #[test]
    fn outline_rectangle_hits_border_not_interior() {
        let a = ann(AnnotationKind::Rectangle {
            rect: Rect::new(10.0, 10.0, 100.0, 100.0),
        });
        assert!(a.hit(Point::new(12.0, 50.0), 5.0));
        assert!(!a.hit(Point::new(60.0, 60.0), 5.0));
    }

    #[test]
    fn filled_rectangle_hits_interior() {
        let mut a = ann(AnnotationKind::Rectangle {
            rect: Rect::new(10.0, 10.0, 100.0, 100.0),
        });
        a.style.fill = Some(Color::from_rgb8(0, 0, 255));
        assert!(a.hit(Point::new(60.0, 60.0), 5.0));
    }

    #[test]
    fn arrow_head_barbs_are_hittable() {
        let a = ann(AnnotationKind::Arrow {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            head_length: 20.0,
            head_angle: 30.0,
        });
        let [left, _] = geometry::arrowhead(Point::new(100.0, 0.0), Point::new(0.0, 0.0), 20.0, 30.0);
        assert!(a.hit(left, 1.0));
        assert!(!a.hit(Point::new(50.0, 30.0), 5.0));
    }

    #[test]
    fn step_badge_hits_inside_circle() {
        let a = ann(AnnotationKind::StepCounter {
            center: Point::new(50.0, 50.0),
            number: 1,
            radius: 16.0,
        });
        assert!(a.hit(Point::new(60.0, 55.0), 0.0));
        assert!(!a.hit(Point::new(80.0, 80.0), 5.0));
    }

    #[test]
    fn spotlight_only_grabs_its_border() {
        let a = ann(AnnotationKind::Spotlight {
            rect: Rect::new(0.0, 0.0, 200.0, 200.0),
            shape: SpotlightShape::Rectangle,
            darkness: 0.6,
        });
        assert!(a.hit(Point::new(8.0, 100.0), 5.0));
        assert!(!a.hit(Point::new(100.0, 100.0), 5.0));
    }

    #[test]
    fn translate_moves_every_point() {
        let a = ann(AnnotationKind::Freehand {
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
        });
        let moved = a.translated(10.0, -2.0);
        assert_eq!(
            moved.kind,
            AnnotationKind::Freehand {
                points: vec![Point::new(10.0, -2.0), Point::new(15.0, 3.0)]
            }
        );
        assert_eq!(moved.id, a.id);
    }

    #[test]
    fn handles_match_kind() {
        let boxed = ann(AnnotationKind::Blur {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            mode: BlurMode::Blur,
            radius: 4.0,
        });
        assert_eq!(boxed.kind.handles().len(), 8);

        let ruler = ann(AnnotationKind::Ruler {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
        });
        assert_eq!(ruler.kind.handles().len(), 2);

        let step = ann(AnnotationKind::StepCounter {
            center: Point::new(0.0, 0.0),
            number: 3,
            radius: 16.0,
        });
        assert!(step.kind.handles().is_empty());
    }

    #[test]
    fn resizing_arrow_moves_one_endpoint() {
        let a = ann(AnnotationKind::Arrow {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
            head_length: 10.0,
            head_angle: 30.0,
        });
        let r = a.resized(Handle::End, Point::new(40.0, 40.0));
        match r.kind {
            AnnotationKind::Arrow { start, end, .. } => {
                assert_eq!(start, Point::new(0.0, 0.0));
                assert_eq!(end, Point::new(40.0, 40.0));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
