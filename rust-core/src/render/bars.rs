//! Flat bar meter
//!
//! One bottom-anchored bar per band, all the same width, laid out left to
//! right in band order.

use super::canvas::Frame;
use super::{RenderStyle, Renderer};
use crate::meter;
use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

pub struct BarsRenderer {
    width: usize,
    height: usize,
    sensitivity: f64,
}

impl BarsRenderer {
    pub fn new(width: usize, height: usize, sensitivity: f64) -> Self {
        Self {
            width,
            height,
            sensitivity,
        }
    }

    /// Bar heights in pixels, compressed against the frame height
    pub fn bar_heights(&self, magnitudes: &[f64]) -> Vec<usize> {
        let limit = self.height as f64;
        magnitudes
            .iter()
            .map(|&m| (meter::scale(m, self.sensitivity, limit).ceil() as usize).min(self.height))
            .collect()
    }

    /// Horizontal extent of every bar
    pub fn bar_width(&self, band_count: usize) -> usize {
        self.width / band_count.max(1)
    }
}

impl Renderer for BarsRenderer {
    fn render(&mut self, magnitudes: &[f64]) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        let bar_width = self.bar_width(magnitudes.len());

        for (index, bar_height) in self.bar_heights(magnitudes).into_iter().enumerate() {
            let x = (index * bar_width) as i32;
            let y = (self.height - bar_height) as i32;
            frame.paint(
                &Rectangle::new(Point::new(x, y), Size::new(bar_width as u32, bar_height as u32))
                    .into_styled(PrimitiveStyle::with_fill(Gray8::WHITE)),
            );
        }

        frame
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::Bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::SILENCE_MAGNITUDE;

    fn column_height(frame: &Frame, x: usize) -> usize {
        (0..frame.height()).filter(|&y| frame.get(x, y) > 0).count()
    }

    #[test]
    fn test_silence_draws_uniform_minimal_bars() {
        let mut renderer = BarsRenderer::new(200, 80, 1.0);
        let magnitudes = vec![SILENCE_MAGNITUDE; 8];

        let heights = renderer.bar_heights(&magnitudes);
        assert!(heights.iter().all(|&h| h == 1));

        let frame = renderer.render(&magnitudes);
        assert_eq!((frame.width(), frame.height()), (200, 80));

        // 8 bands of 25 px, each one pixel tall on the bottom row
        assert_eq!(frame.lit_count(), 200);
        assert!((0..200).all(|x| frame.get(x, 79) == 255));
    }

    #[test]
    fn test_bars_are_bottom_anchored_and_ordered() {
        let mut renderer = BarsRenderer::new(40, 20, 1.0);
        let frame = renderer.render(&[1.0, 5.0, 1e6, 1.0]);

        assert_eq!(renderer.bar_width(4), 10);
        assert_eq!(column_height(&frame, 0), 1);
        assert_eq!(column_height(&frame, 15), 5);

        // Saturated band fills the full height
        assert_eq!(column_height(&frame, 25), 20);
        assert_eq!(frame.get(25, 0), 255);
        assert_eq!(frame.get(35, 18), 0);
        assert_eq!(frame.get(35, 19), 255);
    }

    #[test]
    fn test_louder_band_is_taller() {
        let renderer = BarsRenderer::new(80, 80, 2.0);
        let heights = renderer.bar_heights(&[1.0, 10.0, 40.0, 400.0]);

        for pair in heights.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(heights[3] <= 80);
    }
}
