use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::pet::layout::SpriteLayout;
use crate::pet::{PetSheets, PetState};
use crate::sprite::{AnimationConfig, ConfigError, SheetId};

/// Environment variable naming an alternate settings file.
pub const SETTINGS_ENV: &str = "SPRITECAT_SETTINGS";
/// Settings file looked up in the working directory by default.
pub const DEFAULT_SETTINGS_FILE: &str = "spritecat.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One sprite strip on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetSettings {
    pub file: String,
    pub frames: u32,
    pub looped: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Uniform on-screen scale of one frame, in logical pixels.
    pub scale: f32,
    pub frames_per_second: f32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Pointer-idle time before the cat dozes off.
    pub inactivity_ms: u64,
    pub asset_dir: PathBuf,
    pub idle: SheetSettings,
    pub sleeping: SheetSettings,
    pub waking: SheetSettings,
    /// Linear RGBA window background.
    pub clear_color: [f64; 4],
    pub window_size: [u32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 8.0,
            frames_per_second: 8.0,
            frame_width: 32,
            frame_height: 32,
            inactivity_ms: 5000,
            asset_dir: PathBuf::from("assets"),
            idle: SheetSettings {
                file: "IdleCat.png".to_string(),
                frames: 11,
                looped: true,
            },
            sleeping: SheetSettings {
                file: "toSleep.png".to_string(),
                frames: 4,
                looped: false,
            },
            waking: SheetSettings {
                file: "wakeUp.png".to_string(),
                frames: 4,
                looped: false,
            },
            clear_color: [0.02, 0.02, 0.03, 1.0],
            window_size: [800, 600],
        }
    }
}

impl Settings {
    /// Read settings from `path`. Unset fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings from `$SPRITECAT_SETTINGS` or `./spritecat.json`, falling
    /// back to defaults when the file is missing or malformed.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
        match Self::load(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn inactivity_delay(&self) -> Duration {
        Duration::from_millis(self.inactivity_ms)
    }

    pub fn sheet(&self, state: PetState) -> &SheetSettings {
        match state {
            PetState::Idle => &self.idle,
            PetState::Sleeping => &self.sleeping,
            PetState::Waking => &self.waking,
        }
    }

    /// Where the sheet for `state` lives on disk.
    pub fn sheet_path(&self, state: PetState) -> PathBuf {
        self.asset_dir.join(&self.sheet(state).file)
    }

    /// Layout for the cat before the window exists. Rejects a scale that
    /// would leave nothing to click.
    pub fn sprite_layout(&self) -> Result<SpriteLayout, ConfigError> {
        SpriteLayout::new(self.scale, Vec2::ZERO)
    }

    /// Validated animation for every state.
    pub fn pet_sheets(&self) -> Result<PetSheets, ConfigError> {
        let config = |state: PetState| {
            let sheet = self.sheet(state);
            AnimationConfig::new(
                SheetId::new(self.sheet_path(state).to_string_lossy().as_ref()),
                self.frame_width,
                self.frame_height,
                sheet.frames,
                self.frames_per_second,
                sheet.looped,
            )
        };
        Ok(PetSheets {
            idle: config(PetState::Idle)?,
            sleeping: config(PetState::Sleeping)?,
            waking: config(PetState::Waking)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cat() {
        let sheets = Settings::default().pet_sheets().unwrap();
        assert_eq!(sheets.idle.frame_count(), 11);
        assert!(sheets.idle.looped());
        assert_eq!(sheets.sleeping.frame_count(), 4);
        assert!(!sheets.sleeping.looped());
        assert_eq!(sheets.waking.frame_count(), 4);
        assert!(!sheets.waking.looped());
        assert_eq!(sheets.idle.period(), Duration::from_millis(125));
        assert_ne!(sheets.idle.sheet(), sheets.waking.sheet());
        assert_eq!(Settings::default().inactivity_delay(), Duration::from_millis(5000));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "scale": 4.0, "inactivity_ms": 1500 }"#).unwrap();
        assert_eq!(settings.scale, 4.0);
        assert_eq!(settings.inactivity_ms, 1500);
        assert_eq!(settings.idle, Settings::default().idle);
        assert_eq!(settings.frame_width, 32);
    }

    #[test]
    fn invalid_values_fail_fast() {
        let settings = Settings {
            frames_per_second: 0.0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.pet_sheets(),
            Err(ConfigError::InvalidFrameRate(_))
        ));

        let mut settings = Settings::default();
        settings.sleeping.frames = 0;
        assert!(matches!(
            settings.pet_sheets(),
            Err(ConfigError::ZeroFrameCount(_))
        ));

        let settings = Settings {
            frames_per_second: 1e-30,
            ..Settings::default()
        };
        assert!(matches!(
            settings.pet_sheets(),
            Err(ConfigError::InvalidFrameRate(_))
        ));

        let settings = Settings {
            frame_width: 1 << 24,
            ..Settings::default()
        };
        assert!(matches!(
            settings.pet_sheets(),
            Err(ConfigError::SheetTooLarge(_))
        ));

        for scale in [0.0, -2.0, f32::NAN] {
            let settings = Settings {
                scale,
                ..Settings::default()
            };
            assert!(matches!(
                settings.sprite_layout(),
                Err(ConfigError::InvalidScale(_))
            ));
        }
        assert!(Settings::default().sprite_layout().is_ok());
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = std::env::temp_dir().join(format!("spritecat-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        assert!(matches!(
            Settings::load(&missing),
            Err(SettingsError::Io { .. })
        ));

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ scale: ").unwrap();
        assert!(matches!(
            Settings::load(&broken),
            Err(SettingsError::Parse { .. })
        ));

        let good = dir.join("good.json");
        fs::write(&good, r#"{ "frames_per_second": 12.0 }"#).unwrap();
        assert_eq!(Settings::load(&good).unwrap().frames_per_second, 12.0);

        fs::remove_dir_all(&dir).ok();
    }
}
