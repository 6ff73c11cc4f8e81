//! Board scene assembly
//!
//! Turns a board's current geometry and ball into a triangle list. No layout
//! or physics decisions happen here; this only reads state computed elsewhere.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::SLOT_BAND_HEIGHT;
use crate::settings::Settings;
use crate::sim::{Ball, Board, Layout};

/// Spacing and inset of the decorative dot grid
const GRID_SPACING: f32 = 20.0;
const GRID_INSET: f32 = 12.0;
/// Inset of a slot box from its divider lines
const SLOT_INSET: f32 = 2.0;
const SLOT_BAR_HEIGHT: f32 = 4.0;
/// Dividers start this far above the slot band
const DIVIDER_OVERHANG: f32 = 10.0;
/// Drop guide sits this far above the first peg row band
const DROP_GUIDE_OFFSET: f32 = 12.0;
/// Drop-entry chevrons: height above the top edge and distance from center
const MARKER_Y: f32 = 20.0;
const MARKER_SPREAD: f32 = 45.0;
const MARKER_SIZE: f32 = 6.0;

/// Fill and top-bar color of slot `index`
pub fn slot_colors(index: usize, highlight: Option<usize>, accent: [f32; 4]) -> ([f32; 4], [f32; 4]) {
    if highlight == Some(index) {
        (accent, colors::BACKGROUND)
    } else {
        (colors::SLOT_FILL, accent)
    }
}

/// Full frame for `board`: static board plus the in-flight ball, if any
pub fn board_vertices(board: &Board, settings: &Settings) -> Vec<Vertex> {
    let accent = colors::accent(board.kind());
    let (width, height) = board.size();
    let mut vertices = draw_board(
        width,
        height,
        board.layout(),
        board.highlight(),
        accent,
        settings,
    );
    if let Some(ball) = board.ball() {
        vertices.extend(draw_ball(ball, accent, settings));
    }
    vertices
}

/// Background, grid, slots, walls, pegs and the drop guide
pub fn draw_board(
    width: f32,
    height: f32,
    layout: Option<&Layout>,
    highlight: Option<usize>,
    accent: [f32; 4],
    settings: &Settings,
) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let mut v = shapes::rect(Vec2::ZERO, Vec2::new(width, height), colors::BACKGROUND);

    if settings.effective_grid() {
        let mut gx = GRID_INSET;
        while gx < width {
            let mut gy = GRID_INSET;
            while gy < height {
                v.extend(shapes::circle(Vec2::new(gx, gy), 1.0, colors::GRID_DOT, 6));
                gy += GRID_SPACING;
            }
            gx += GRID_SPACING;
        }
    }

    let Some(layout) = layout else {
        // Nothing loaded yet: a bar where the loading text would be
        let bar = Vec2::new(width * 0.3, 4.0);
        v.extend(shapes::rect(
            Vec2::new(width / 2.0, height / 2.0) - bar / 2.0,
            bar,
            colors::PLACEHOLDER,
        ));
        return v;
    };

    let slot_w = layout.slot_width;
    let slot_y = layout.slot_band_top();

    for i in 0..=layout.slot_count {
        let x = layout.slot_left(i);
        v.extend(shapes::line(
            Vec2::new(x, slot_y - DIVIDER_OVERHANG),
            Vec2::new(x, height),
            1.5,
            colors::SLOT_DIVIDER,
        ));
    }

    for i in 0..layout.slot_count {
        let x = layout.slot_left(i);
        let (fill, bar) = slot_colors(i, highlight, accent);
        let min = Vec2::new(x + SLOT_INSET, slot_y + SLOT_INSET);
        v.extend(shapes::rect(
            min,
            Vec2::new(slot_w - 2.0 * SLOT_INSET, SLOT_BAND_HEIGHT - 2.0 * SLOT_INSET),
            fill,
        ));
        v.extend(shapes::rect(
            min,
            Vec2::new(slot_w - 2.0 * SLOT_INSET, SLOT_BAR_HEIGHT),
            bar,
        ));
    }

    // Side walls
    v.extend(shapes::line(Vec2::new(2.0, 0.0), Vec2::new(2.0, height), 2.0, colors::SIDE_WALL));
    v.extend(shapes::line(
        Vec2::new(width - 2.0, 0.0),
        Vec2::new(width - 2.0, height),
        2.0,
        colors::SIDE_WALL,
    ));

    for peg in &layout.pegs {
        let r = peg.radius;
        v.extend(shapes::circle(peg.pos + Vec2::new(0.0, 1.5), r, colors::PEG_SHADOW, segments));
        v.extend(shapes::circle(peg.pos, r, colors::PEG, segments));
        v.extend(shapes::circle(
            peg.pos - Vec2::splat(r * 0.28),
            r * 0.22,
            colors::PEG_SHINE,
            segments,
        ));
    }

    let guide_y = layout.top_pad - DROP_GUIDE_OFFSET;
    v.extend(shapes::dashed_line(
        Vec2::new(0.0, guide_y),
        Vec2::new(width, guide_y),
        1.0,
        5.0,
        5.0,
        colors::DROP_GUIDE,
    ));

    // Drop-entry chevrons either side of center
    for side in [-1.0, 1.0] {
        let c = Vec2::new(width / 2.0 + side * MARKER_SPREAD, MARKER_Y);
        v.extend(shapes::triangle(
            c + Vec2::new(-MARKER_SIZE, -MARKER_SIZE * 0.6),
            c + Vec2::new(MARKER_SIZE, -MARKER_SIZE * 0.6),
            c + Vec2::new(0.0, MARKER_SIZE * 0.6),
            colors::DROP_MARKER,
        ));
    }

    v
}

/// Ball body, shine dot and fading trail
pub fn draw_ball(ball: &Ball, accent: [f32; 4], settings: &Settings) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let mut v = Vec::new();

    if settings.trails {
        let len = ball.trail.len() as f32;
        for (i, point) in ball.trail.iter().enumerate() {
            let alpha = (i as f32 / len) * 0.25;
            v.extend(shapes::circle(
                *point,
                ball.radius * 0.45,
                colors::with_alpha(accent, alpha),
                segments,
            ));
        }
    }

    v.extend(shapes::circle(ball.pos, ball.radius, accent, segments));
    v.extend(shapes::circle(
        ball.pos - Vec2::new(ball.radius * 0.27, ball.radius * 0.30),
        ball.radius * 0.22,
        colors::BALL_SHINE,
        segments,
    ));
    v
}
