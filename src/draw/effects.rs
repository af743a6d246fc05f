//! Pixel effects applied in place to a composited surface.
//!
//! Both filters only read and write pixels inside the (image-clamped) region, so
//! the result never bleeds past the annotation's bounds. They run on premultiplied
//! ARGB32 bytes channel by channel, which is valid for averaging filters.

use super::RenderError;
use crate::geometry::Rect;
use crate::scene::BlurMode;
use cairo::ImageSurface;

/// Number of box-blur passes; three approximate a gaussian closely enough.
const BLUR_PASSES: usize = 3;

/// Applies the blur or pixelate filter to `region` of `surface`.
///
/// The surface must not be borrowed by a live `cairo::Context`.
///
/// # Arguments
/// * `surface` - Composited image, modified in place
/// * `region` - Image-space region; clamped to the surface bounds
/// * `mode` - Gaussian-like blur or block pixelation
/// * `radius` - Blur radius or pixel block size, in image pixels
pub fn apply_region_effect(
    surface: &mut ImageSurface,
    region: &Rect,
    mode: BlurMode,
    radius: f64,
) -> Result<(), RenderError> {
    let Some(span) = region.pixel_span(surface.width(), surface.height()) else {
        return Ok(());
    };
    let radius = radius.round().max(1.0) as usize;

    surface.flush();
    let stride = surface.stride() as usize;
    let mut data = surface.data()?;

    let mut block = PixelBlock::read(&data, stride, span);
    match mode {
        BlurMode::Blur => {
            for _ in 0..BLUR_PASSES {
                block.box_blur(radius);
            }
        }
        BlurMode::Pixelate => block.pixelate(radius),
    }
    block.write(&mut data, stride);
    Ok(())
}

/// Copy of a rectangular pixel span, one `[u8; 4]` per pixel.
struct PixelBlock {
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl PixelBlock {
    fn read(data: &[u8], stride: usize, (x0, y0, x1, y1): (i32, i32, i32, i32)) -> Self {
        let (x0, y0) = (x0 as usize, y0 as usize);
        let (width, height) = (x1 as usize - x0, y1 as usize - y0);
        let mut pixels = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let row = &data[y * stride + x0 * 4..y * stride + (x0 + width) * 4];
            pixels.extend(row.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]));
        }
        Self {
            x0,
            y0,
            width,
            height,
            pixels,
        }
    }

    fn write(&self, data: &mut [u8], stride: usize) {
        for (row_index, row) in self.pixels.chunks_exact(self.width).enumerate() {
            let start = (self.y0 + row_index) * stride + self.x0 * 4;
            let dst = &mut data[start..start + self.width * 4];
            for (out, px) in dst.chunks_exact_mut(4).zip(row) {
                out.copy_from_slice(px);
            }
        }
    }

    /// One horizontal and one vertical box pass. Edges replicate the nearest
    /// in-region pixel instead of sampling outside the span.
    fn box_blur(&mut self, radius: usize) {
        let mut line_out = vec![[0u8; 4]; self.width.max(self.height)];

        for y in 0..self.height {
            let row = &mut self.pixels[y * self.width..(y + 1) * self.width];
            blur_line(row, &mut line_out[..self.width], radius);
            row.copy_from_slice(&line_out[..self.width]);
        }

        let mut column = vec![[0u8; 4]; self.height];
        for x in 0..self.width {
            for (y, slot) in column.iter_mut().enumerate() {
                *slot = self.pixels[y * self.width + x];
            }
            blur_line(&column, &mut line_out[..self.height], radius);
            for y in 0..self.height {
                self.pixels[y * self.width + x] = line_out[y];
            }
        }
    }

    /// Replaces each `size`x`size` block with its average color.
    fn pixelate(&mut self, size: usize) {
        for by in (0..self.height).step_by(size) {
            for bx in (0..self.width).step_by(size) {
                let y_end = (by + size).min(self.height);
                let x_end = (bx + size).min(self.width);

                let mut total = [0u64; 4];
                let mut count = 0u64;
                for y in by..y_end {
                    for px in &self.pixels[y * self.width + bx..y * self.width + x_end] {
                        for (t, c) in total.iter_mut().zip(px) {
                            *t += *c as u64;
                        }
                        count += 1;
                    }
                }

                let avg = total.map(|t| (t / count) as u8);
                for y in by..y_end {
                    self.pixels[y * self.width + bx..y * self.width + x_end].fill(avg);
                }
            }
        }
    }
}

/// Running-sum box filter over one line of pixels.
fn blur_line(src: &[[u8; 4]], dst: &mut [[u8; 4]], radius: usize) {
    let len = src.len();
    if len == 0 {
        return;
    }
    let r = radius as isize;
    let last = len as isize - 1;
    let at = |i: isize| src[i.clamp(0, last) as usize];
    let window = (2 * radius + 1) as u32;

    let mut sum = [0u32; 4];
    for i in -r..=r {
        add(&mut sum, at(i));
    }
    for (x, out) in dst.iter_mut().enumerate() {
        *out = sum.map(|s| ((s + window / 2) / window) as u8);
        let x = x as isize;
        sub(&mut sum, at(x - r));
        add(&mut sum, at(x + r + 1));
    }
}

fn add(sum: &mut [u32; 4], px: [u8; 4]) {
    for (s, c) in sum.iter_mut().zip(px) {
        *s += c as u32;
    }
}

fn sub(sum: &mut [u32; 4], px: [u8; 4]) {
    for (s, c) in sum.iter_mut().zip(px) {
        *s -= c as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Raster;

    /// Left half black, right half white.
    fn split_surface() -> ImageSurface {
        let mut pixels = Vec::new();
        for _y in 0..20 {
            for x in 0..20 {
                let v = if x < 10 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Raster::new(20, 20, pixels).unwrap().to_surface().unwrap()
    }

    #[test]
    fn blur_softens_edge_inside_region_only() {
        let mut surface = split_surface();
        let region = Rect::new(5.0, 0.0, 10.0, 10.0);
        apply_region_effect(&mut surface, &region, BlurMode::Blur, 3.0).unwrap();
        let raster = Raster::from_surface(&surface).unwrap();

        let edge = raster.pixel(9, 5).unwrap()[0];
        assert!(edge > 0 && edge < 255, "edge pixel should be mixed, got {edge}");
        // Below the region the hard edge is untouched.
        assert_eq!(raster.pixel(9, 15).unwrap()[0], 0);
        assert_eq!(raster.pixel(10, 15).unwrap()[0], 255);
        // Left of the region stays black.
        assert_eq!(raster.pixel(4, 5).unwrap()[0], 0);
    }

    #[test]
    fn pixelate_averages_blocks() {
        let mut surface = split_surface();
        let region = Rect::new(8.0, 0.0, 4.0, 4.0);
        apply_region_effect(&mut surface, &region, BlurMode::Pixelate, 4.0).unwrap();
        let raster = Raster::from_surface(&surface).unwrap();

        let a = raster.pixel(8, 0).unwrap();
        let b = raster.pixel(11, 3).unwrap();
        assert_eq!(a, b);
        assert!((126..=129).contains(&a[0]));
        assert_eq!(raster.pixel(12, 0).unwrap()[0], 255);
    }

    #[test]
    fn region_outside_image_is_ignored() {
        let mut surface = split_surface();
        let region = Rect::new(100.0, 100.0, 10.0, 10.0);
        assert!(apply_region_effect(&mut surface, &region, BlurMode::Blur, 5.0).is_ok());
    }
}
