//! Cairo-based rendering of annotations, scene composition and flattening.
//!
//! Everything here draws in image space. The live view applies the viewport
//! transform once (see [`render_view`]) and paints the cached composite; exports
//! call [`flatten`], which never sees the viewport at all.

use super::color::{self, Color};
use super::effects;
use super::{FontDescriptor, Raster, RenderError};
use crate::geometry::{self, Point, Rect};
use crate::scene::{Annotation, AnnotationKind, Scene, SpotlightShape, Style};
use cairo::{Context, Format, ImageSurface};

/// Background shown around the image in the live view.
const VIEW_BACKGROUND: (f64, f64, f64) = (0.1, 0.1, 0.1);

/// Zoom level from which the composite is sampled without smoothing.
const PIXELATED_ZOOM: f64 = 2.0;

/// Composites the base image and every annotation at native resolution.
///
/// Annotations are applied in z-order. Vector kinds draw through their own
/// short-lived context so blur regions can rewrite the pixels in between.
pub fn compose(scene: &Scene) -> Result<ImageSurface, RenderError> {
    let mut surface = scene.base().to_surface()?;
    let image_bounds = scene.image_bounds();

    for annotation in scene.iter() {
        match &annotation.kind {
            AnnotationKind::Blur { rect, mode, radius } => {
                effects::apply_region_effect(&mut surface, rect, *mode, *radius)?;
            }
            _ => {
                let ctx = Context::new(&surface)?;
                render_annotation(&ctx, annotation, &image_bounds);
            }
        }
    }

    surface.flush();
    Ok(surface)
}

/// Flattens the scene into an export raster of the base image's size.
pub fn flatten(scene: &Scene) -> Result<Raster, RenderError> {
    let surface = compose(scene)?;
    Raster::from_surface(&surface)
}

/// Renders a single annotation to a Cairo context.
pub fn render_annotation(ctx: &Context, annotation: &Annotation, image_bounds: &Rect) {
    render_kind(ctx, &annotation.kind, &annotation.style, image_bounds);
}

/// Renders one annotation payload with `style`.
///
/// Blur regions draw nothing here: their pixels are produced by
/// [`compose`]. Tools use this for live previews as well.
pub fn render_kind(ctx: &Context, kind: &AnnotationKind, style: &Style, image_bounds: &Rect) {
    ctx.save().ok();
    let stroke = style.stroke.with_opacity(style.opacity);
    let fill = style.fill.map(|c| c.with_opacity(style.opacity));

    match kind {
        AnnotationKind::Rectangle { rect } => {
            ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
            fill_and_stroke(ctx, fill, stroke, style.width);
        }
        AnnotationKind::Ellipse { rect } => {
            if ellipse_path(ctx, rect) {
                fill_and_stroke(ctx, fill, stroke, style.width);
            }
        }
        AnnotationKind::Arrow {
            start,
            end,
            head_length,
            head_angle,
        } => render_arrow(ctx, *start, *end, *head_length, *head_angle, stroke, style.width),
        AnnotationKind::Freehand { points } => {
            render_polyline(ctx, points, stroke, style.width);
        }
        AnnotationKind::Highlighter { points } => {
            ctx.set_operator(cairo::Operator::Multiply);
            render_polyline(ctx, points, stroke, style.width);
        }
        AnnotationKind::Text { anchor, text, font } => {
            render_text(ctx, *anchor, text, font, style.font_size, stroke, fill);
        }
        AnnotationKind::Spotlight {
            rect,
            shape,
            darkness,
        } => render_spotlight(ctx, rect, *shape, *darkness, image_bounds),
        AnnotationKind::Blur { .. } => {}
        AnnotationKind::StepCounter {
            center,
            number,
            radius,
        } => render_step(ctx, *center, *number, *radius, stroke),
        AnnotationKind::Ruler { start, end } => {
            render_ruler(ctx, *start, *end, stroke, style.width);
        }
    }
    ctx.restore().ok();
}

fn set_color(ctx: &Context, color: Color) {
    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
}

/// Fills (if requested) and then strokes the current path.
fn fill_and_stroke(ctx: &Context, fill: Option<Color>, stroke: Color, width: f64) {
    if let Some(fill) = fill {
        set_color(ctx, fill);
        let _ = ctx.fill_preserve();
    }
    if width > 0.0 {
        set_color(ctx, stroke);
        ctx.set_line_width(width);
        ctx.set_line_join(cairo::LineJoin::Miter);
        let _ = ctx.stroke();
    } else {
        ctx.new_path();
    }
}

/// Appends an ellipse inscribed in `rect`. Returns false for degenerate boxes.
fn ellipse_path(ctx: &Context, rect: &Rect) -> bool {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    let c = rect.center();
    ctx.save().ok();
    ctx.translate(c.x, c.y);
    ctx.scale(rect.width / 2.0, rect.height / 2.0);
    ctx.new_sub_path();
    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
    ctx.restore().ok();
    true
}

fn render_polyline(ctx: &Context, points: &[Point], color: Color, width: f64) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };

    set_color(ctx, color);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(first.x, first.y);
    if rest.is_empty() {
        // A single click still leaves a round dot
        ctx.line_to(first.x, first.y);
    }
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    let _ = ctx.stroke();
}

/// Straight shaft with a two-barb head at `end`.
fn render_arrow(
    ctx: &Context,
    start: Point,
    end: Point,
    head_length: f64,
    head_angle: f64,
    color: Color,
    width: f64,
) {
    set_color(ctx, color);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(start.x, start.y);
    ctx.line_to(end.x, end.y);
    let _ = ctx.stroke();

    let [left, right] = geometry::arrowhead(end, start, head_length, head_angle);
    ctx.move_to(left.x, left.y);
    ctx.line_to(end.x, end.y);
    ctx.line_to(right.x, right.y);
    let _ = ctx.stroke();
}

/// Darkens the image outside `rect` and outlines the lit region.
fn render_spotlight(
    ctx: &Context,
    rect: &Rect,
    shape: SpotlightShape,
    darkness: f64,
    image_bounds: &Rect,
) {
    let region_path = |ctx: &Context| match shape {
        SpotlightShape::Rectangle => {
            ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
            true
        }
        SpotlightShape::Ellipse => ellipse_path(ctx, rect),
    };

    ctx.set_fill_rule(cairo::FillRule::EvenOdd);
    ctx.rectangle(
        image_bounds.x,
        image_bounds.y,
        image_bounds.width,
        image_bounds.height,
    );
    region_path(ctx);
    ctx.set_source_rgba(0.0, 0.0, 0.0, darkness.clamp(0.0, 1.0));
    let _ = ctx.fill();

    if region_path(ctx) {
        ctx.set_source_rgba(1.0, 1.0, 1.0, 0.8);
        ctx.set_line_width(1.5);
        ctx.set_dash(&[6.0, 4.0], 0.0);
        let _ = ctx.stroke();
    }
}

/// Filled badge with its number centered in white.
fn render_step(ctx: &Context, center: Point, number: u32, radius: f64, color: Color) {
    set_color(ctx, color);
    ctx.arc(center.x, center.y, radius, 0.0, 2.0 * std::f64::consts::PI);
    let _ = ctx.fill();

    let layout = pangocairo::functions::create_layout(ctx);
    let font = FontDescriptor::default().to_pango(radius);
    layout.set_font_description(Some(&font));
    layout.set_text(&number.to_string());
    let (_, logical) = layout.pixel_extents();
    ctx.move_to(
        center.x - logical.width() as f64 / 2.0 - logical.x() as f64,
        center.y - logical.height() as f64 / 2.0 - logical.y() as f64,
    );
    set_color(ctx, color::WHITE.with_opacity(color.a));
    pangocairo::functions::show_layout(ctx, &layout);
}

/// Measurement line with endpoint dots and a pixel-length label.
fn render_ruler(ctx: &Context, start: Point, end: Point, color: Color, width: f64) {
    let width = width.max(1.0);
    set_color(ctx, color);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Butt);
    ctx.move_to(start.x, start.y);
    ctx.line_to(end.x, end.y);
    let _ = ctx.stroke();

    for p in [start, end] {
        ctx.arc(p.x, p.y, width * 1.5, 0.0, 2.0 * std::f64::consts::PI);
        let _ = ctx.fill();
    }

    let label = format!("{} px", geometry::distance(start, end).round() as i64);
    let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let layout = pangocairo::functions::create_layout(ctx);
    let font = FontDescriptor::new("Sans".into(), "normal".into(), "normal".into()).to_pango(12.0);
    layout.set_font_description(Some(&font));
    layout.set_text(&label);
    let (_, logical) = layout.pixel_extents();
    let (w, h) = (logical.width() as f64, logical.height() as f64);
    let origin = Point::new(mid.x + 6.0, mid.y - h - 6.0);

    ctx.rectangle(origin.x - 3.0, origin.y - 1.0, w + 6.0, h + 2.0);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.7);
    let _ = ctx.fill();
    ctx.move_to(origin.x, origin.y);
    ctx.set_source_rgba(1.0, 1.0, 1.0, 1.0);
    pangocairo::functions::show_layout(ctx, &layout);
}

/// Renders text whose layout box starts at `anchor`, with multi-line support.
///
/// Text gets a contrasting stroke outline and a soft drop shadow so it stays
/// legible over any screenshot content. When the style has a fill, a
/// translucent box of that color is drawn behind the glyphs.
fn render_text(
    ctx: &Context,
    anchor: Point,
    text: &str,
    font: &FontDescriptor,
    size: f64,
    color: Color,
    background: Option<Color>,
) {
    if text.is_empty() {
        return;
    }
    // Gray antialiasing; subpixel rendering fringes on transparent surfaces
    ctx.set_antialias(cairo::Antialias::Best);

    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango(size)));
    layout.set_text(text);

    let (ink_rect, _) = layout.extents();
    let ink_x = ink_rect.x() as f64 / pango::SCALE as f64;
    let ink_y = ink_rect.y() as f64 / pango::SCALE as f64;
    let ink_width = ink_rect.width() as f64 / pango::SCALE as f64;
    let ink_height = ink_rect.height() as f64 / pango::SCALE as f64;

    let (outline_r, outline_g, outline_b) = if color.brightness() > 0.5 {
        (0.0, 0.0, 0.0)
    } else {
        (1.0, 1.0, 1.0)
    };

    if let Some(bg) = background.filter(|_| ink_width > 0.0 && ink_height > 0.0) {
        let padding = size * 0.15;
        ctx.rectangle(
            anchor.x + ink_x - padding,
            anchor.y + ink_y - padding,
            ink_width + padding * 2.0,
            ink_height + padding * 2.0,
        );
        set_color(ctx, bg.with_opacity(0.3));
        let _ = ctx.fill();
    }

    let shadow_offset = size * 0.04;
    ctx.move_to(anchor.x + shadow_offset, anchor.y + shadow_offset);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.4 * color.a);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.move_to(anchor.x, anchor.y);
    pangocairo::functions::layout_path(ctx, &layout);
    ctx.set_source_rgba(outline_r, outline_g, outline_b, color.a);
    ctx.set_line_width(size * 0.06);
    ctx.set_line_join(cairo::LineJoin::Round);
    let _ = ctx.stroke_preserve();

    set_color(ctx, color);
    let _ = ctx.fill();
}

/// Layout box of `text` anchored at its top-left corner.
///
/// Measured with Pango on a scratch surface. Empty text still occupies a
/// caret-sized box so a freshly placed text annotation can be seen and hit.
pub fn text_bounds(anchor: Point, text: &str, font: &FontDescriptor, size: f64) -> Rect {
    let fallback = Rect::new(anchor.x, anchor.y, size * 0.5, size * 1.2);
    if text.is_empty() {
        return fallback;
    }

    let Ok(surface) = ImageSurface::create(Format::ARgb32, 1, 1) else {
        return fallback;
    };
    let Ok(ctx) = Context::new(&surface) else {
        return fallback;
    };
    let layout = pangocairo::functions::create_layout(&ctx);
    layout.set_font_description(Some(&font.to_pango(size)));
    layout.set_text(text);
    let (_, logical) = layout.pixel_extents();

    Rect::new(
        anchor.x,
        anchor.y,
        (logical.width() as f64).max(fallback.width),
        (logical.height() as f64).max(fallback.height),
    )
}

/// Draws selection outlines and resize handles in image space.
///
/// `zoom` keeps outlines and handles at a constant on-screen size.
pub fn render_selection(ctx: &Context, scene: &Scene, zoom: f64, handle_size: f64) {
    let zoom = zoom.max(f64::EPSILON);
    let selected: Vec<&Annotation> = scene.selected().collect();

    ctx.save().ok();
    ctx.set_line_width(1.0 / zoom);
    for annotation in &selected {
        let b = annotation.bounds().inflate(2.0 / zoom);
        ctx.rectangle(b.x, b.y, b.width, b.height);
        ctx.set_source_rgba(0.2, 0.5, 1.0, 0.9);
        ctx.set_dash(&[4.0 / zoom, 3.0 / zoom], 0.0);
        let _ = ctx.stroke();
    }
    ctx.set_dash(&[], 0.0);

    // Handles are only offered when exactly one annotation is selected
    if let [single] = selected.as_slice() {
        let half = handle_size / zoom / 2.0;
        for (_, p) in single.kind.handles() {
            ctx.rectangle(p.x - half, p.y - half, half * 2.0, half * 2.0);
            ctx.set_source_rgba(1.0, 1.0, 1.0, 1.0);
            let _ = ctx.fill_preserve();
            ctx.set_source_rgba(0.2, 0.5, 1.0, 1.0);
            let _ = ctx.stroke();
        }
    }
    ctx.restore().ok();
}

/// Dashed marquee rectangle used by the selection tool.
pub fn render_marquee(ctx: &Context, rect: &Rect, zoom: f64) {
    let zoom = zoom.max(f64::EPSILON);
    ctx.save().ok();
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    ctx.set_source_rgba(0.2, 0.5, 1.0, 0.15);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgba(0.2, 0.5, 1.0, 0.9);
    ctx.set_line_width(1.0 / zoom);
    ctx.set_dash(&[4.0 / zoom, 3.0 / zoom], 0.0);
    let _ = ctx.stroke();
    ctx.restore().ok();
}

/// Paints the background, then the composite under the viewport transform.
///
/// Leaves `ctx` transformed into image space so overlays can follow.
pub fn render_view(
    ctx: &Context,
    composite: &ImageSurface,
    zoom: f64,
    pan: Point,
    width: f64,
    height: f64,
) -> Result<(), RenderError> {
    let (r, g, b) = VIEW_BACKGROUND;
    ctx.set_source_rgb(r, g, b);
    ctx.rectangle(0.0, 0.0, width, height);
    ctx.fill()?;

    ctx.translate(pan.x, pan.y);
    ctx.scale(zoom, zoom);
    ctx.set_source_surface(composite, 0.0, 0.0)?;
    if zoom >= PIXELATED_ZOOM {
        ctx.source().set_filter(cairo::Filter::Nearest);
    }
    ctx.rectangle(
        0.0,
        0.0,
        composite.width() as f64,
        composite.height() as f64,
    );
    ctx.fill()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BlurMode;

    fn scene(rgba: [u8; 4]) -> Scene {
        Scene::new(Raster::filled(60, 40, rgba))
    }

    #[test]
    fn flatten_of_empty_scene_is_base_image() {
        let scene = scene([10, 20, 30, 255]);
        let out = flatten(&scene).unwrap();
        assert_eq!(out, *scene.base());
    }

    #[test]
    fn filled_rectangle_covers_interior() {
        let mut scene = scene([255, 255, 255, 255]);
        let style = Style {
            fill: Some(color::BLUE),
            ..Style::default()
        };
        scene.create(
            AnnotationKind::Rectangle {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
            },
            style,
        );
        let out = flatten(&scene).unwrap();
        assert_eq!(out.pixel(20, 20), Some([0, 0, 255, 255]));
        assert_eq!(out.pixel(50, 35), Some([255, 255, 255, 255]));
    }

    #[test]
    fn spotlight_darkens_only_outside_region() {
        let mut scene = scene([200, 200, 200, 255]);
        scene.create(
            AnnotationKind::Spotlight {
                rect: Rect::new(20.0, 10.0, 20.0, 20.0),
                shape: SpotlightShape::Rectangle,
                darkness: 0.5,
            },
            Style::default(),
        );
        let out = flatten(&scene).unwrap();
        assert_eq!(out.pixel(30, 20), Some([200, 200, 200, 255]));
        let outside = out.pixel(2, 2).unwrap();
        assert!(outside[0] < 110 && outside[0] > 90, "got {outside:?}");
    }

    #[test]
    fn highlighter_multiplies_with_background() {
        let mut scene = scene([255, 255, 255, 255]);
        let style = Style {
            stroke: color::YELLOW,
            width: 10.0,
            ..Style::default()
        };
        scene.create(
            AnnotationKind::Highlighter {
                points: vec![Point::new(5.0, 20.0), Point::new(55.0, 20.0)],
            },
            style,
        );
        let out = flatten(&scene).unwrap();
        let px = out.pixel(30, 20).unwrap();
        assert_eq!(px[0], 255);
        assert_eq!(px[1], 255);
        assert!(px[2] < 10, "blue channel should be absorbed, got {px:?}");
    }

    #[test]
    fn blur_respects_z_order() {
        // Rectangle drawn after the blur stays crisp
        let mut scene = scene([255, 255, 255, 255]);
        scene.create(
            AnnotationKind::Blur {
                rect: Rect::new(0.0, 0.0, 60.0, 40.0),
                mode: BlurMode::Blur,
                radius: 6.0,
            },
            Style::default(),
        );
        let style = Style {
            fill: Some(color::BLACK),
            width: 0.0,
            ..Style::default()
        };
        scene.create(
            AnnotationKind::Rectangle {
                rect: Rect::new(30.0, 0.0, 30.0, 40.0),
            },
            style,
        );
        let out = flatten(&scene).unwrap();
        assert_eq!(out.pixel(29, 20), Some([255, 255, 255, 255]));
        assert_eq!(out.pixel(30, 20), Some([0, 0, 0, 255]));
    }

    #[test]
    fn text_bounds_grow_with_content() {
        let font = FontDescriptor::default();
        let empty = text_bounds(Point::new(5.0, 5.0), "", &font, 18.0);
        let long = text_bounds(Point::new(5.0, 5.0), "hello world", &font, 18.0);
        assert_eq!(empty.x, 5.0);
        assert!(long.width > empty.width);
        let two_lines = text_bounds(Point::new(5.0, 5.0), "hello\nworld", &font, 18.0);
        assert!(two_lines.height > long.height);
    }
}
