use std::path::Path;

use crate::sprite::AnimationConfig;

/// Decoded sprite strip, RGBA8, row-major.
#[derive(Debug, Clone)]
pub struct SheetImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SheetImage {
    pub fn load(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Load the strip for `config`, or draw a stand-in so the cat still shows
    /// up when the file is missing.
    pub fn load_or_placeholder(path: &Path, config: &AnimationConfig, tint: [u8; 3]) -> Self {
        match Self::load(path) {
            Ok(sheet) => {
                if sheet.width < config.sheet_width() || sheet.height < config.frame_height() {
                    log::warn!(
                        "{}: {}x{} is smaller than {} frames of {}x{}",
                        path.display(),
                        sheet.width,
                        sheet.height,
                        config.frame_count(),
                        config.frame_width(),
                        config.frame_height(),
                    );
                }
                log::info!("Loaded sheet {} ({}x{})", path.display(), sheet.width, sheet.height);
                sheet
            }
            Err(e) => {
                log::warn!("{}: {e}; drawing placeholder", path.display());
                Self::placeholder(config, tint)
            }
        }
    }

    /// Procedural strip: a tinted blob per frame with a white marker that
    /// sweeps left to right, so frame stepping stays visible.
    pub fn placeholder(config: &AnimationConfig, tint: [u8; 3]) -> Self {
        let fw = config.frame_width();
        let fh = config.frame_height();
        let frames = config.frame_count();
        let width = config.sheet_width();
        let mut rgba = vec![0u8; (width * fh * 4) as usize];

        let cx = fw as f32 * 0.5;
        let cy = fh as f32 * 0.6;
        let rx = fw as f32 * 0.35;
        let ry = fh as f32 * 0.3;
        let marker_span = fw.saturating_sub(4);

        for f in 0..frames {
            let marker_x = if frames > 1 {
                f * marker_span / (frames - 1)
            } else {
                0
            };
            for y in 0..fh {
                for x in 0..fw {
                    let dx = (x as f32 + 0.5 - cx) / rx;
                    let dy = (y as f32 + 0.5 - cy) / ry;
                    let in_body = dx * dx + dy * dy <= 1.0;
                    let in_marker = y < 4 && x >= marker_x && x < marker_x + 4;

                    let px = if in_marker {
                        [255, 255, 255, 255]
                    } else if in_body {
                        [tint[0], tint[1], tint[2], 255]
                    } else {
                        continue;
                    };
                    let i = (((y * width) + f * fw + x) * 4) as usize;
                    rgba[i..i + 4].copy_from_slice(&px);
                }
            }
        }

        Self {
            width,
            height: fh,
            rgba,
        }
    }
}
