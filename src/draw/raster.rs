//! Plain RGBA raster used at the capture and export boundaries.
//!
//! The editor works on Cairo `ARgb32` surfaces internally (premultiplied, native
//! endian). Outside the core, images travel as [`Raster`]: tightly packed RGBA8 with
//! straight alpha, which any encoder or clipboard writer can consume directly.

use super::RenderError;
use cairo::{Context, Format, ImageSurface};
use std::fmt;
use std::path::Path;

/// Owned RGBA8 image (straight alpha, rows top to bottom, no padding).
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Wraps an RGBA8 buffer, checking that it matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(RenderError::InvalidRaster {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a raster filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Copies the `width` x `height` block at `(x, y)`. `None` unless the block
    /// is non-empty and lies fully inside the raster.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Raster> {
        if width == 0 || height == 0 {
            return None;
        }
        if x.checked_add(width)? > self.width || y.checked_add(height)? > self.height {
            return None;
        }
        let row_bytes = self.width as usize * 4;
        let (start, len) = (x as usize * 4, width as usize * 4);
        let mut pixels = Vec::with_capacity(len * height as usize);
        for row in self
            .pixels
            .chunks_exact(row_bytes)
            .skip(y as usize)
            .take(height as usize)
        {
            pixels.extend_from_slice(&row[start..start + len]);
        }
        Some(Raster {
            width,
            height,
            pixels,
        })
    }

    /// Copies the raster into a fresh Cairo surface.
    pub fn to_surface(&self) -> Result<ImageSurface, RenderError> {
        let mut surface = ImageSurface::create(Format::ARgb32, self.width as i32, self.height as i32)?;
        let stride = surface.stride() as usize;
        let row_bytes = self.width as usize * 4;
        {
            let mut data = surface.data()?;
            for (y, row) in self.pixels.chunks_exact(row_bytes).enumerate() {
                let dst = &mut data[y * stride..y * stride + row_bytes];
                for (src, out) in row.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
                    out.copy_from_slice(&pack_premultiplied([src[0], src[1], src[2], src[3]]));
                }
            }
        }
        Ok(surface)
    }

    /// Reads any Cairo image surface back into a raster.
    ///
    /// The surface is first painted onto a private `ARgb32` copy so foreign formats
    /// (e.g. `Rgb24` from PNG decoding) and shared surfaces are both handled.
    pub fn from_surface(source: &ImageSurface) -> Result<Self, RenderError> {
        let (width, height) = (source.width(), source.height());
        let mut copy = ImageSurface::create(Format::ARgb32, width, height)?;
        {
            let ctx = Context::new(&copy)?;
            ctx.set_source_surface(source, 0.0, 0.0)?;
            ctx.set_operator(cairo::Operator::Source);
            ctx.paint()?;
        }
        copy.flush();

        let stride = copy.stride() as usize;
        let row_bytes = width as usize * 4;
        let data = copy.data()?;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for y in 0..height as usize {
            for px in data[y * stride..y * stride + row_bytes].chunks_exact(4) {
                pixels.extend_from_slice(&unpack_premultiplied([px[0], px[1], px[2], px[3]]));
            }
        }
        Self::new(width as u32, height as u32, pixels)
    }

    /// Decodes a PNG file. Stands in for the platform capture service in tools and tests.
    pub fn read_png(path: &Path) -> Result<Self, RenderError> {
        let mut file = std::fs::File::open(path)?;
        let surface = ImageSurface::create_from_png(&mut file)?;
        Self::from_surface(&surface)
    }

    /// Encodes the raster as PNG.
    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        let surface = self.to_surface()?;
        let mut file = std::fs::File::create(path)?;
        surface.write_to_png(&mut file)?;
        Ok(())
    }
}

/// Packs straight RGBA into a native-endian premultiplied ARGB32 pixel.
pub(crate) fn pack_premultiplied([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let pm = |c: u8| (c as u32 * a as u32 + 127) / 255;
    let value = ((a as u32) << 24) | (pm(r) << 16) | (pm(g) << 8) | pm(b);
    value.to_ne_bytes()
}

/// Inverse of [`pack_premultiplied`].
pub(crate) fn unpack_premultiplied(bytes: [u8; 4]) -> [u8; 4] {
    let value = u32::from_ne_bytes(bytes);
    let a = value >> 24;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |shift: u32| {
        let c = (value >> shift) & 0xff;
        ((c * 255 + a / 2) / a).min(255) as u8
    };
    [un(16), un(8), un(0), a as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Raster::new(2, 2, vec![0; 15]).is_err());
        assert!(Raster::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn surface_copy_preserves_opaque_pixels() {
        let mut raster = Raster::filled(3, 2, [10, 20, 30, 255]);
        raster.pixels[4..8].copy_from_slice(&[200, 100, 50, 255]);
        let surface = raster.to_surface().unwrap();
        let back = Raster::from_surface(&surface).unwrap();
        assert_eq!(back, raster);
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let raster = Raster::filled(4, 4, [1, 2, 3, 255]);
        assert_eq!(raster.pixel(3, 3), Some([1, 2, 3, 255]));
        assert_eq!(raster.pixel(4, 0), None);
        assert_eq!(raster.pixel(-1, 0), None);
    }

    #[test]
    fn crop_copies_the_block_and_rejects_overflow() {
        let mut pixels = Vec::new();
        for y in 0..4u8 {
            for x in 0..5u8 {
                pixels.extend_from_slice(&[x, y, 0, 255]);
            }
        }
        let raster = Raster::new(5, 4, pixels).unwrap();
        let block = raster.crop(1, 2, 3, 2).unwrap();
        assert_eq!((block.width(), block.height()), (3, 2));
        assert_eq!(block.pixel(0, 0), Some([1, 2, 0, 255]));
        assert_eq!(block.pixel(2, 1), Some([3, 3, 0, 255]));
        assert!(raster.crop(3, 0, 3, 1).is_none());
        assert!(raster.crop(0, 0, 0, 1).is_none());
    }

    #[test]
    fn premultiply_round_trip_is_exact_for_opaque() {
        let px = [12, 250, 99, 255];
        assert_eq!(unpack_premultiplied(pack_premultiplied(px)), px);
        assert_eq!(unpack_premultiplied(pack_premultiplied([9, 9, 9, 0])), [0, 0, 0, 0]);
    }
}
