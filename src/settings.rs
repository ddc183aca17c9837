//! Effect settings and preferences
//!
//! Persisted as JSON in LocalStorage. Never holds game or animation state.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum background particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => PARTICLE_MAX_COUNT,
            QualityPreset::High => 300,
        }
    }

    /// Whether particle link lines are drawn
    pub fn links_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Effect tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Particle field ===
    /// Squared pixel distance below which particles are linked. Ignored
    /// by presets without links; see [`Settings::effective_link_distance_sq`].
    pub link_distance_sq: f32,

    // === Scroll skew ===
    /// Per-frame smoothing factor toward the target skew
    pub skew_smoothing: f32,
    /// Absolute skew clamp (degrees)
    pub max_skew_deg: f32,

    // === Parallax / tilt ===
    /// Margin (px) around the viewport where parallax keeps updating
    pub parallax_margin: f32,
    /// Tilt rotation (degrees) at the card edge
    pub tilt_intensity: f32,

    // === Accessibility ===
    /// Reduced motion (disables skew, parallax and tilt)
    pub reduced_motion: bool,

    // === Arcade ===
    /// Fixed seed for the arcade RNG (random per session when unset)
    pub arcade_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            link_distance_sq: PARTICLE_LINK_DISTANCE_SQ,

            skew_smoothing: SKEW_SMOOTHING,
            max_skew_deg: MAX_SKEW_DEG,

            parallax_margin: PARALLAX_MARGIN,
            tilt_intensity: TILT_DEFAULT_INTENSITY,

            reduced_motion: false,

            arcade_seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset. Quality-dependent values are derived from
    /// it, so switching presets back and forth loses nothing.
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    /// Effective link threshold; zero when the preset draws no links
    pub fn effective_link_distance_sq(&self) -> f32 {
        if self.quality.links_enabled() {
            self.link_distance_sq
        } else {
            0.0
        }
    }

    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "botsite_fx_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring malformed settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
