//! Raster frames and the pixel operations the renderers share
//!
//! Frames are grayscale, indexed `[[row, column]]`, and implement
//! `DrawTarget` so embedded-graphics primitives can be drawn onto them.

use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::*;
use image::{GrayImage, ImageBuffer, Luma};
use ndarray::Array2;
use std::convert::Infallible;

/// One rendered grayscale raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Array2<u8>,
}

impl Frame {
    /// Black frame of `width` x `height` pixels
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: Array2::zeros((height, width)),
        }
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Pixel at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[[y, x]]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[[y, x]] = value;
    }

    pub fn pixels(&self) -> &Array2<u8> {
        &self.pixels
    }

    /// Number of non-zero pixels
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p > 0).count()
    }

    /// Copy of this frame rotated clockwise by `degrees` about a pivot
    ///
    /// Uses inverse mapping with nearest-neighbour sampling; the output has
    /// the same size and anything rotated out of bounds is lost.
    pub fn rotated(&self, pivot_x: f64, pivot_y: f64, degrees: f64) -> Frame {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (height, width) = (self.height() as f64, self.width() as f64);

        let pixels = Array2::from_shape_fn(self.pixels.raw_dim(), |(row, col)| {
            let dx = col as f64 - pivot_x;
            let dy = row as f64 - pivot_y;
            let sx = (pivot_x + dx * cos + dy * sin).round();
            let sy = (pivot_y - dx * sin + dy * cos).round();

            if sx < 0.0 || sy < 0.0 || sx >= width || sy >= height {
                0
            } else {
                self.pixels[[sy as usize, sx as usize]]
            }
        });

        Frame { pixels }
    }

    /// Overlay `sprite` with its top-left corner at (`x`, `y`), keeping the
    /// brighter pixel wherever both are lit
    pub fn composite_max(&mut self, sprite: &Frame, x: i64, y: i64) {
        for ((row, col), &value) in sprite.pixels.indexed_iter() {
            if value == 0 {
                continue;
            }
            let tx = x + col as i64;
            let ty = y + row as i64;
            if tx < 0 || ty < 0 || tx >= self.width() as i64 || ty >= self.height() as i64 {
                continue;
            }
            let target = &mut self.pixels[[ty as usize, tx as usize]];
            *target = (*target).max(value);
        }
    }

    /// Nearest-neighbour enlargement by an integer factor
    pub fn upscale(&self, zoom: u32) -> Frame {
        let zoom = zoom.max(1) as usize;
        let shape = (self.height() * zoom, self.width() * zoom);
        let pixels = Array2::from_shape_fn(shape, |(row, col)| self.pixels[[row / zoom, col / zoom]]);

        Frame { pixels }
    }

    pub fn to_image(&self) -> GrayImage {
        ImageBuffer::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            Luma([self.pixels[[y as usize, x as usize]]])
        })
    }

    /// Draw an embedded-graphics item onto this frame
    pub fn paint<D>(&mut self, item: &D)
    where
        D: Drawable<Color = Gray8>,
    {
        match item.draw(self) {
            Ok(_) => {}
            Err(never) => match never {},
        }
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl DrawTarget for Frame {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.width() as i32, self.height() as i32);
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && point.x < width && point.y < height {
                self.pixels[[point.y as usize, point.x as usize]] = color.luma();
            }
        }
        Ok(())
    }
}

/// Additive accumulator, wide enough that overlapping layers never wrap
pub struct Canvas {
    sums: Array2<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            sums: Array2::zeros((height, width)),
        }
    }

    /// Add a same-sized layer pixel by pixel
    pub fn add(&mut self, layer: &Frame) {
        self.sums
            .zip_mut_with(layer.pixels(), |sum, &value| *sum += value as u32);
    }

    /// Saturate the accumulated sums to [0, 255]
    pub fn into_frame(self) -> Frame {
        Frame {
            pixels: self.sums.mapv(|sum| sum.min(u8::MAX as u32) as u8),
        }
    }
}
