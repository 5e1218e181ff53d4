use bytemuck::{Pod, Zeroable};

/// Interleaved vertex consumed by the render pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

const RED: [f32; 3] = [1.0, 0.0, 0.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];
const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];

/// Unit cube centred on the origin as a non-indexed triangle list, one
/// colour per face, counter-clockwise when seen from outside.
pub const CUBE_VERTICES: [ColorVertex; 36] = [
    // front (+Z)
    ColorVertex::new([-0.5, -0.5, 0.5], RED),
    ColorVertex::new([0.5, -0.5, 0.5], RED),
    ColorVertex::new([0.5, 0.5, 0.5], RED),
    ColorVertex::new([-0.5, -0.5, 0.5], RED),
    ColorVertex::new([0.5, 0.5, 0.5], RED),
    ColorVertex::new([-0.5, 0.5, 0.5], RED),
    // back (-Z)
    ColorVertex::new([0.5, -0.5, -0.5], GREEN),
    ColorVertex::new([-0.5, -0.5, -0.5], GREEN),
    ColorVertex::new([-0.5, 0.5, -0.5], GREEN),
    ColorVertex::new([0.5, -0.5, -0.5], GREEN),
    ColorVertex::new([-0.5, 0.5, -0.5], GREEN),
    ColorVertex::new([0.5, 0.5, -0.5], GREEN),
    // left (-X)
    ColorVertex::new([-0.5, -0.5, -0.5], BLUE),
    ColorVertex::new([-0.5, -0.5, 0.5], BLUE),
    ColorVertex::new([-0.5, 0.5, 0.5], BLUE),
    ColorVertex::new([-0.5, -0.5, -0.5], BLUE),
    ColorVertex::new([-0.5, 0.5, 0.5], BLUE),
    ColorVertex::new([-0.5, 0.5, -0.5], BLUE),
    // right (+X)
    ColorVertex::new([0.5, -0.5, 0.5], YELLOW),
    ColorVertex::new([0.5, -0.5, -0.5], YELLOW),
    ColorVertex::new([0.5, 0.5, -0.5], YELLOW),
    ColorVertex::new([0.5, -0.5, 0.5], YELLOW),
    ColorVertex::new([0.5, 0.5, -0.5], YELLOW),
    ColorVertex::new([0.5, 0.5, 0.5], YELLOW),
    // bottom (-Y)
    ColorVertex::new([-0.5, -0.5, -0.5], CYAN),
    ColorVertex::new([0.5, -0.5, -0.5], CYAN),
    ColorVertex::new([0.5, -0.5, 0.5], CYAN),
    ColorVertex::new([-0.5, -0.5, -0.5], CYAN),
    ColorVertex::new([0.5, -0.5, 0.5], CYAN),
    ColorVertex::new([-0.5, -0.5, 0.5], CYAN),
    // top (+Y)
    ColorVertex::new([-0.5, 0.5, 0.5], MAGENTA),
    ColorVertex::new([0.5, 0.5, 0.5], MAGENTA),
    ColorVertex::new([0.5, 0.5, -0.5], MAGENTA),
    ColorVertex::new([-0.5, 0.5, 0.5], MAGENTA),
    ColorVertex::new([0.5, 0.5, -0.5], MAGENTA),
    ColorVertex::new([-0.5, 0.5, -0.5], MAGENTA),
];
