//! Stick-figure pose
//!
//! Torso, hips and upper arms are fixed. The forearms and thighs swing with
//! their bands, and each shin hangs from wherever the rotated thigh ends.

use super::canvas::Frame;
use super::{RenderStyle, Renderer};
use crate::bands::SILENCE_MAGNITUDE;
use crate::config::LimbBands;
use crate::meter;
use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use log::warn;
use rand::Rng;

pub const FIGURE_WIDTH: usize = 160;
pub const FIGURE_HEIGHT: usize = 200;

const STROKE: u32 = 3;

const HEAD_CENTER: (i32, i32) = (80, 30);
const HEAD_DIAMETER: u32 = 28;
const NECK: (i32, i32) = (80, 44);
const PELVIS: (i32, i32) = (80, 110);
const LEFT_SHOULDER: (i32, i32) = (56, 54);
const RIGHT_SHOULDER: (i32, i32) = (104, 54);
const LEFT_ELBOW: (i32, i32) = (44, 86);
const RIGHT_ELBOW: (i32, i32) = (116, 86);
const LEFT_HIP: (i32, i32) = (64, 110);
const RIGHT_HIP: (i32, i32) = (96, 110);

const FOREARM_LENGTH: i32 = 30;
const THIGH_LENGTH: i32 = 42;
const SHIN_LENGTH: i32 = 36;

/// Angles at or below this many degrees are drawn without jitter
pub const JITTER_THRESHOLD: f64 = 1.0;

/// Limb angles in degrees, measured from hanging straight down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub left_forearm: f64,
    pub right_forearm: f64,
    pub left_thigh: f64,
    pub right_thigh: f64,
}

/// Which way a limb swings when its angle grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Outward swing as a clockwise rotation
    fn rotation(self, angle: f64) -> f64 {
        match self {
            Side::Left => angle,
            Side::Right => -angle,
        }
    }
}

pub struct FigureRenderer<R: Rng> {
    bands: LimbBands,
    arm_limit: f64,
    leg_limit: f64,
    sensitivity: f64,
    rng: R,
}

impl<R: Rng> FigureRenderer<R> {
    /// # Arguments
    /// * `bands` - Band index driving each articulated limb
    /// * `arm_limit` - Largest forearm angle in degrees
    /// * `leg_limit` - Largest thigh angle in degrees
    /// * `sensitivity` - Meter gain
    /// * `rng` - Jitter source
    pub fn new(bands: LimbBands, arm_limit: f64, leg_limit: f64, sensitivity: f64, rng: R) -> Self {
        Self {
            bands,
            arm_limit,
            leg_limit,
            sensitivity,
            rng,
        }
    }

    /// Angle of one limb before jitter
    pub fn base_angle(&self, magnitude: f64, limit: f64) -> f64 {
        meter::scale(magnitude, self.sensitivity, limit)
    }

    /// Jittered angles for the current magnitudes
    pub fn pose(&mut self, magnitudes: &[f64]) -> Pose {
        let band = |index: usize| magnitudes.get(index).copied().unwrap_or(SILENCE_MAGNITUDE);
        let (left_arm, right_arm) = (band(self.bands.left_arm), band(self.bands.right_arm));
        let (left_leg, right_leg) = (band(self.bands.left_leg), band(self.bands.right_leg));

        Pose {
            left_forearm: self.limb_angle(left_arm, self.arm_limit),
            right_forearm: self.limb_angle(right_arm, self.arm_limit),
            left_thigh: self.limb_angle(left_leg, self.leg_limit),
            right_thigh: self.limb_angle(right_leg, self.leg_limit),
        }
    }

    fn limb_angle(&mut self, magnitude: f64, limit: f64) -> f64 {
        let base = self.base_angle(magnitude, limit);
        jitter_angle(base, limit, &mut self.rng)
    }

    /// Draw the figure in a given pose
    pub fn draw_pose(&self, pose: &Pose) -> Frame {
        let mut frame = Frame::new(FIGURE_WIDTH, FIGURE_HEIGHT);
        draw_skeleton(&mut frame);

        draw_limb(&mut frame, LEFT_ELBOW, FOREARM_LENGTH, Side::Left.rotation(pose.left_forearm));
        draw_limb(&mut frame, RIGHT_ELBOW, FOREARM_LENGTH, Side::Right.rotation(pose.right_forearm));

        for (hip, side, angle) in [
            (LEFT_HIP, Side::Left, pose.left_thigh),
            (RIGHT_HIP, Side::Right, pose.right_thigh),
        ] {
            let center = sprite_pivot(THIGH_LENGTH);
            let thigh = limb_sprite(THIGH_LENGTH).rotated(center, center, side.rotation(angle));
            let knee = knee_position(&thigh, hip, side);
            paste_sprite(&mut frame, &thigh, hip, THIGH_LENGTH);
            draw_line(&mut frame, knee, (knee.0, knee.1 + SHIN_LENGTH));
        }

        frame
    }
}

impl<R: Rng> Renderer for FigureRenderer<R> {
    fn render(&mut self, magnitudes: &[f64]) -> Frame {
        let pose = self.pose(magnitudes);
        self.draw_pose(&pose)
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::Figure
    }
}

/// Perturb `base` by up to half its value, staying within `[0, limit]`
///
/// Angles at or below `JITTER_THRESHOLD` are returned untouched.
pub fn jitter_angle<R: Rng + ?Sized>(base: f64, limit: f64, rng: &mut R) -> f64 {
    if base <= JITTER_THRESHOLD {
        return base.clamp(0.0, limit.max(0.0));
    }

    let spread = base / 2.0;
    (base + rng.random_range(-spread..=spread)).clamp(0.0, limit.max(0.0))
}

fn draw_line(frame: &mut Frame, from: (i32, i32), to: (i32, i32)) {
    frame.paint(
        &Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
            .into_styled(PrimitiveStyle::with_stroke(Gray8::WHITE, STROKE)),
    );
}

fn draw_skeleton(frame: &mut Frame) {
    frame.paint(
        &Circle::with_center(Point::new(HEAD_CENTER.0, HEAD_CENTER.1), HEAD_DIAMETER)
            .into_styled(PrimitiveStyle::with_stroke(Gray8::WHITE, STROKE)),
    );

    draw_line(frame, NECK, PELVIS);
    draw_line(frame, LEFT_SHOULDER, RIGHT_SHOULDER);
    draw_line(frame, LEFT_SHOULDER, LEFT_ELBOW);
    draw_line(frame, RIGHT_SHOULDER, RIGHT_ELBOW);
    draw_line(frame, LEFT_HIP, RIGHT_HIP);
}

/// Center of a limb sprite, which is also its pivot
fn sprite_pivot(length: i32) -> f64 {
    (length + STROKE as i32) as f64
}

/// Square sprite with a limb hanging straight down from its center
fn limb_sprite(length: i32) -> Frame {
    let half = length as usize + STROKE as usize;
    let mut sprite = Frame::new(2 * half + 1, 2 * half + 1);
    let pivot = half as i32;
    draw_line(&mut sprite, (pivot, pivot), (pivot, pivot + length));
    sprite
}

/// Place a sprite so its pivot lands on `pivot`
fn paste_sprite(frame: &mut Frame, sprite: &Frame, pivot: (i32, i32), length: i32) {
    let offset = length as i64 + STROKE as i64;
    frame.composite_max(sprite, pivot.0 as i64 - offset, pivot.1 as i64 - offset);
}

fn draw_limb(frame: &mut Frame, pivot: (i32, i32), length: i32, rotation: f64) {
    let center = sprite_pivot(length);
    let sprite = limb_sprite(length).rotated(center, center, rotation);
    paste_sprite(frame, &sprite, pivot, length);
}

/// Lowest lit pixel of a sprite as (row, column)
///
/// Scans rows from the bottom edge up. Within the first row that has a lit
/// pixel, columns are scanned from the edge the limb swings toward, so a
/// thigh held level still attaches at its tip.
pub fn attachment_point(sprite: &Frame, side: Side) -> Option<(usize, usize)> {
    let width = sprite.width();
    (0..sprite.height()).rev().find_map(|row| {
        let lit = |&col: &usize| sprite.get(col, row) > 0;
        let col = match side {
            Side::Left => (0..width).find(lit),
            Side::Right => (0..width).rev().find(lit),
        };
        col.map(|col| (row, col))
    })
}

/// Canvas position of the knee for a rotated thigh pinned at `hip`
///
/// Falls back to the tip of an unrotated thigh when the sprite is blank.
fn knee_position(thigh: &Frame, hip: (i32, i32), side: Side) -> (i32, i32) {
    let offset = THIGH_LENGTH + STROKE as i32;
    match attachment_point(thigh, side) {
        Some((row, col)) => (hip.0 - offset + col as i32, hip.1 - offset + row as i32),
        None => {
            warn!("thigh sprite has no lit pixel, attaching shin at default offset");
            (hip.0, hip.1 + THIGH_LENGTH)
        }
    }
}
