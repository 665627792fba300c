use glam::Vec2;

use crate::sprite::ConfigError;

/// Destination rectangle of the sprite in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl SpriteRect {
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Min edge inclusive, max edge exclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.y >= self.min.y && point.x < max.x && point.y < max.y
    }
}

/// Places one frame, scaled uniformly, in the middle of the viewport.
///
/// `scale` is in logical pixels; the viewport and the resulting rect are
/// physical pixels, converted with the window's pixels-per-point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteLayout {
    scale: f32,
    pixels_per_point: f32,
    viewport: Vec2,
}

impl SpriteLayout {
    pub fn new(scale: f32, viewport: Vec2) -> Result<Self, ConfigError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidScale(scale));
        }
        Ok(Self {
            scale,
            pixels_per_point: 1.0,
            viewport,
        })
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Ignores non-positive or non-finite factors.
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            self.pixels_per_point = pixels_per_point;
        }
    }

    pub fn rect(&self, frame_width: u32, frame_height: u32) -> SpriteRect {
        let size = Vec2::new(frame_width as f32, frame_height as f32)
            * (self.scale * self.pixels_per_point);
        SpriteRect {
            min: (self.viewport - size) * 0.5,
            size,
        }
    }
}
