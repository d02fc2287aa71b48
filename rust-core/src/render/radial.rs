//! Radial bar meter
//!
//! Every band gets a bar pointing away from the canvas center, rotated to
//! `index * 360 / band_count` degrees. Layers are summed, so neighbouring
//! bars brighten where they overlap before the canvas saturates at 255.

use super::canvas::{Canvas, Frame};
use super::{RenderStyle, Renderer};
use crate::bands::SILENCE_MAGNITUDE;
use crate::config::MAX_RADIAL_LIMIT;
use crate::meter;
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

/// Empty disc left in the middle of the canvas
const INNER_RADIUS: usize = 12;
const BAR_WIDTH: usize = 4;
/// Length drawn for a band sitting at the silence floor
const TICK_LENGTH: usize = 3;
const BAR_INTENSITY: u8 = 160;
const MARGIN: usize = 2;

pub struct RadialRenderer {
    limit: f64,
    sensitivity: f64,
    side: usize,
}

impl RadialRenderer {
    /// # Arguments
    /// * `limit` - Longest bar, in pixels, clamped to `[0, MAX_RADIAL_LIMIT]`
    /// * `sensitivity` - Meter gain
    pub fn new(limit: f64, sensitivity: f64) -> Self {
        let limit = clamp_limit(limit);
        Self {
            limit,
            sensitivity,
            side: canvas_side(limit),
        }
    }

    /// Width and height of the square canvas
    pub fn side(&self) -> usize {
        self.side
    }

    fn center(&self) -> usize {
        self.side / 2
    }

    /// Bar length per band; bands at the silence floor collapse to a tick
    pub fn bar_lengths(&self, magnitudes: &[f64]) -> Vec<usize> {
        let floor = meter::scale(SILENCE_MAGNITUDE, self.sensitivity, self.limit);
        magnitudes
            .iter()
            .map(|&m| {
                let value = meter::scale(m, self.sensitivity, self.limit);
                if value <= floor {
                    TICK_LENGTH
                } else {
                    (value.round() as usize).max(TICK_LENGTH)
                }
            })
            .collect()
    }

    /// Upright bar sprite on a full-size layer
    fn bar_layer(&self, length: usize) -> Frame {
        let mut layer = Frame::new(self.side, self.side);
        let center = self.center();
        let top_left = Point::new(
            (center - BAR_WIDTH / 2) as i32,
            center as i32 - (INNER_RADIUS + length) as i32,
        );

        layer.paint(
            &Rectangle::new(top_left, Size::new(BAR_WIDTH as u32, length as u32))
                .into_styled(PrimitiveStyle::with_fill(Gray8::new(BAR_INTENSITY))),
        );

        layer
    }
}

fn clamp_limit(limit: f64) -> f64 {
    if limit.is_nan() {
        0.0
    } else {
        limit.clamp(0.0, MAX_RADIAL_LIMIT)
    }
}

/// Side of the square canvas needed for bars up to `limit` pixels long
pub fn canvas_side(limit: f64) -> usize {
    let reach = INNER_RADIUS + clamp_limit(limit).ceil() as usize + MARGIN;
    2 * reach + 1
}

impl Renderer for RadialRenderer {
    fn render(&mut self, magnitudes: &[f64]) -> Frame {
        let mut canvas = Canvas::new(self.side, self.side);
        let step = 360.0 / magnitudes.len().max(1) as f64;
        let center = self.center() as f64;

        for (index, length) in self.bar_lengths(magnitudes).into_iter().enumerate() {
            let layer = self.bar_layer(length);
            canvas.add(&layer.rotated(center, center, index as f64 * step));
        }

        canvas.into_frame()
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::RadialBars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_fits_longest_bar() {
        let renderer = RadialRenderer::new(70.0, 1.0);
        assert_eq!(renderer.side(), 2 * (12 + 70 + 2) + 1);
    }

    #[test]
    fn test_huge_limit_is_clamped() {
        let renderer = RadialRenderer::new(1e20, 1.0);
        assert_eq!(renderer.side(), canvas_side(MAX_RADIAL_LIMIT));
        assert_eq!(RadialRenderer::new(f64::NAN, 1.0).side(), canvas_side(0.0));
    }

    #[test]
    fn test_silence_draws_ticks() {
        let renderer = RadialRenderer::new(70.0, 1.0);
        assert_eq!(renderer.bar_lengths(&[SILENCE_MAGNITUDE; 8]), vec![TICK_LENGTH; 8]);
    }

    #[test]
    fn test_every_band_visible_at_rest() {
        let mut renderer = RadialRenderer::new(70.0, 1.0);
        let frame = renderer.render(&[SILENCE_MAGNITUDE; 4]);
        let c = renderer.center();

        // Ticks at 0, 90, 180 and 270 degrees
        let r = INNER_RADIUS + 1;
        assert_eq!(frame.get(c, c - r), BAR_INTENSITY);
        assert_eq!(frame.get(c + r, c), BAR_INTENSITY);
        assert_eq!(frame.get(c, c + r), BAR_INTENSITY);
        assert_eq!(frame.get(c - r, c), BAR_INTENSITY);

        // Nothing past the tick
        assert_eq!(frame.get(c, c - INNER_RADIUS - TICK_LENGTH - 2), 0);
    }

    #[test]
    fn test_loud_band_reaches_out() {
        let mut renderer = RadialRenderer::new(70.0, 1.0);
        let lengths = renderer.bar_lengths(&[1e9, 1.0]);
        assert_eq!(lengths, vec![70, TICK_LENGTH]);

        let frame = renderer.render(&[1e9, 1.0]);
        let c = renderer.center();
        assert_eq!(frame.get(c, c - INNER_RADIUS - 69), BAR_INTENSITY);
        assert_eq!(frame.get(c, c - INNER_RADIUS - 71), 0);
    }

    #[test]
    fn test_overlap_saturates() {
        // Many bands stacked close together overlap near the hub
        let mut renderer = RadialRenderer::new(20.0, 1.0);
        let frame = renderer.render(&[1e9; 64]);

        assert!(frame.pixels().iter().any(|&p| p == 255));
    }
}
