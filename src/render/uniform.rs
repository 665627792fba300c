use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::pet::layout::SpriteRect;

/// Per-frame sprite placement uploaded to the GPU.
/// Stride = 48 bytes (padded to a 16-byte multiple for the uniform).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteUniform {
    /// Window size in pixels.
    pub screen_size: [f32; 2],
    /// Top-left of the destination quad in pixels.
    pub dest_min: [f32; 2],
    /// Destination quad size in pixels (frame size × scale).
    pub dest_size: [f32; 2],
    /// Current frame in sheet texture coordinates.
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    pub _pad: [f32; 2],
}

impl SpriteUniform {
    pub fn new(screen: Vec2, rect: &SpriteRect, uv: [f32; 4]) -> Self {
        Self {
            screen_size: screen.max(Vec2::ONE).into(),
            dest_min: rect.min.into(),
            dest_size: rect.size.into(),
            uv_min: [uv[0], uv[1]],
            uv_max: [uv[2], uv[3]],
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::layout::SpriteLayout;

    #[test]
    fn layout_matches_shader_struct() {
        assert_eq!(std::mem::size_of::<SpriteUniform>(), 48);
    }

    #[test]
    fn carries_rect_and_uv() {
        let screen = Vec2::new(800.0, 600.0);
        let rect = SpriteLayout::new(8.0, screen).unwrap().rect(32, 32);
        let u = SpriteUniform::new(screen, &rect, [0.25, 0.0, 0.5, 1.0]);
        assert_eq!(u.dest_min, [272.0, 172.0]);
        assert_eq!(u.dest_size, [256.0, 256.0]);
        assert_eq!(u.uv_min, [0.25, 0.0]);
        assert_eq!(u.uv_max, [0.5, 1.0]);
    }

    #[test]
    fn minimized_window_never_divides_by_zero() {
        let rect = SpriteLayout::new(8.0, Vec2::ZERO).unwrap().rect(32, 32);
        let u = SpriteUniform::new(Vec2::ZERO, &rect, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(u.screen_size, [1.0, 1.0]);
    }
}
