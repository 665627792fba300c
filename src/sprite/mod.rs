pub mod animator;

use std::sync::Arc;
use std::time::Duration;

/// Rejected animation parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("animation `{0}` needs at least one frame")]
    ZeroFrameCount(SheetId),
    #[error("animation `{0}` has a zero-sized frame")]
    ZeroFrameSize(SheetId),
    #[error("frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f32),
    #[error("animation `{0}` is too large to hold in one sheet")]
    SheetTooLarge(SheetId),
    #[error("sprite scale must be positive and finite, got {0}")]
    InvalidScale(f32),
    #[error("inactivity delay must be non-zero")]
    ZeroInactivityDelay,
}

/// Identity of a sprite sheet (its image source). Two configs with the same
/// sheet are the same animation, possibly played at different parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetId(Arc<str>);

impl SheetId {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel rectangle inside a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One horizontal strip of equal-size frames, played at a fixed rate.
///
/// Only constructible through [`AnimationConfig::new`], so every live value
/// has at least one frame, a non-empty frame size, an RGBA strip whose byte
/// size fits in `u32` and a representable tick period.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    sheet: SheetId,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    frames_per_second: f32,
    looped: bool,
    period: Duration,
}

impl AnimationConfig {
    pub fn new(
        sheet: SheetId,
        frame_width: u32,
        frame_height: u32,
        frame_count: u32,
        frames_per_second: f32,
        looped: bool,
    ) -> Result<Self, ConfigError> {
        if frame_count == 0 {
            return Err(ConfigError::ZeroFrameCount(sheet));
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(ConfigError::ZeroFrameSize(sheet));
        }
        let period = frame_period(frames_per_second)?;
        let strip_bytes = frame_width
            .checked_mul(frame_count)
            .and_then(|w| w.checked_mul(frame_height))
            .and_then(|px| px.checked_mul(4));
        if strip_bytes.is_none() {
            return Err(ConfigError::SheetTooLarge(sheet));
        }
        Ok(Self {
            sheet,
            frame_width,
            frame_height,
            frame_count,
            frames_per_second,
            looped,
            period,
        })
    }

    /// Same animation at a different playback rate.
    pub fn with_frames_per_second(&self, frames_per_second: f32) -> Result<Self, ConfigError> {
        Self::new(
            self.sheet.clone(),
            self.frame_width,
            self.frame_height,
            self.frame_count,
            frames_per_second,
            self.looped,
        )
    }

    pub fn sheet(&self) -> &SheetId {
        &self.sheet
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    /// Time between frame ticks (`1000 / fps` ms). Never zero.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Width of the whole strip in pixels.
    pub fn sheet_width(&self) -> u32 {
        self.frame_width * self.frame_count
    }
}

fn frame_period(frames_per_second: f32) -> Result<Duration, ConfigError> {
    if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
        return Err(ConfigError::InvalidFrameRate(frames_per_second));
    }
    Duration::try_from_secs_f64(1.0 / frames_per_second as f64)
        .map(|period| period.max(Duration::from_micros(1)))
        .map_err(|_| ConfigError::InvalidFrameRate(frames_per_second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetId {
        SheetId::new("IdleCat.png")
    }

    #[test]
    fn period_from_fps() {
        let cfg = AnimationConfig::new(sheet(), 32, 32, 11, 8.0, true).unwrap();
        assert_eq!(cfg.period(), Duration::from_millis(125));
        assert_eq!(cfg.sheet_width(), 352);
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert_eq!(
            AnimationConfig::new(sheet(), 32, 32, 0, 8.0, true),
            Err(ConfigError::ZeroFrameCount(sheet()))
        );
        assert_eq!(
            AnimationConfig::new(sheet(), 0, 32, 4, 8.0, true),
            Err(ConfigError::ZeroFrameSize(sheet()))
        );
        assert!(matches!(
            AnimationConfig::new(sheet(), 32, 32, 4, 0.0, false),
            Err(ConfigError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            AnimationConfig::new(sheet(), 32, 32, 4, -3.0, false),
            Err(ConfigError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            AnimationConfig::new(sheet(), 32, 32, 4, f32::NAN, false),
            Err(ConfigError::InvalidFrameRate(_))
        ));
    }

    #[test]
    fn rejects_unrepresentable_period() {
        assert_eq!(
            AnimationConfig::new(sheet(), 32, 32, 4, 1e-30, false),
            Err(ConfigError::InvalidFrameRate(1e-30))
        );
        let slow = AnimationConfig::new(sheet(), 32, 32, 4, 0.5, false).unwrap();
        assert_eq!(slow.period(), Duration::from_secs(2));
        let fast = AnimationConfig::new(sheet(), 32, 32, 4, 1e30, false).unwrap();
        assert_eq!(fast.period(), Duration::from_micros(1));
    }

    #[test]
    fn rejects_oversized_sheets() {
        assert_eq!(
            AnimationConfig::new(sheet(), 1 << 20, 32, 1 << 13, 8.0, true),
            Err(ConfigError::SheetTooLarge(sheet()))
        );
        // Strip width fits, RGBA bytes don't.
        assert_eq!(
            AnimationConfig::new(sheet(), 1 << 12, 1 << 12, 1 << 7, 8.0, true),
            Err(ConfigError::SheetTooLarge(sheet()))
        );
        let big = AnimationConfig::new(sheet(), 1 << 12, 1 << 9, 1 << 8, 8.0, true).unwrap();
        assert_eq!(big.sheet_width(), 1 << 20);
    }

    #[test]
    fn rate_change_keeps_identity() {
        let cfg = AnimationConfig::new(sheet(), 32, 32, 4, 8.0, false).unwrap();
        let faster = cfg.with_frames_per_second(16.0).unwrap();
        assert_eq!(faster.sheet(), cfg.sheet());
        assert_eq!(faster.period(), Duration::from_micros(62_500));
        assert!(cfg.with_frames_per_second(f32::INFINITY).is_err());
    }
}
