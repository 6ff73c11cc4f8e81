//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for board elements
pub mod colors {
    use crate::sim::BoardKind;

    /// Parse `#rrggbb` into RGBA floats; malformed digits read as zero
    pub fn hex(hex: &str, alpha: f32) -> [f32; 4] {
        let digits = hex.trim_start_matches('#');
        let channel = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .map_or(0.0, |v| v as f32 / 255.0)
        };
        [channel(0), channel(2), channel(4), alpha]
    }

    /// Same color with a different alpha
    #[inline]
    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], alpha]
    }

    const fn rgb(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
    }

    pub const BACKGROUND: [f32; 4] = rgb(0xFC, 0xF6, 0xF5, 1.0);
    pub const GRID_DOT: [f32; 4] = rgb(138, 170, 229, 0.15);
    pub const SLOT_DIVIDER: [f32; 4] = rgb(138, 170, 229, 0.35);
    pub const SLOT_FILL: [f32; 4] = rgb(0xB8, 0xCE, 0xF0, 1.0);
    pub const SIDE_WALL: [f32; 4] = rgb(138, 170, 229, 0.5);
    pub const PEG: [f32; 4] = rgb(0x8A, 0xAA, 0xE5, 1.0);
    pub const PEG_SHADOW: [f32; 4] = rgb(91, 130, 212, 0.18);
    pub const PEG_SHINE: [f32; 4] = rgb(252, 246, 245, 0.70);
    pub const BALL_SHINE: [f32; 4] = rgb(252, 246, 245, 0.85);
    pub const DROP_GUIDE: [f32; 4] = rgb(138, 170, 229, 0.40);
    pub const DROP_MARKER: [f32; 4] = rgb(91, 130, 212, 0.55);
    pub const PLACEHOLDER: [f32; 4] = [0.0, 0.0, 0.0, 0.25];

    /// Ball and accent color per board
    pub fn accent(kind: BoardKind) -> [f32; 4] {
        match kind {
            BoardKind::Big => hex("#e05a6a", 1.0),
            BoardKind::Small => hex("#f9ca24", 1.0),
        }
    }

}
