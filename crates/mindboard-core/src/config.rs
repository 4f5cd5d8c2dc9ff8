//! Tunable interaction and viewport settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lower bound for the viewport zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Upper bound for the viewport zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Settings shared by the board and its plugins.
///
/// Durations are stored as milliseconds on the wire, so a config file can
/// stay plain JSON:
///
/// ```json
/// { "minZoom": 0.25, "wheelThrottle": 50 }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Multiplicative step for keyboard and ctrl+wheel zoom.
    pub zoom_step: f64,
    /// Pointer travel (world units) before a press turns into a drag.
    pub drag_threshold: f64,
    /// Minimum time between pointer-driven pans.
    #[serde(with = "millis")]
    pub pan_throttle: Duration,
    /// Minimum time between handled wheel events.
    #[serde(with = "millis")]
    pub wheel_throttle: Duration,
    /// Offset applied to copied elements so pastes don't cover the originals.
    pub paste_offset: f64,
    /// Screen padding used by fit-to-content.
    pub fit_padding: f64,
    /// Stroke tolerance (world units) for hit-testing line-like elements.
    pub hit_tolerance: f64,
    /// Batches recorded within this window of the previous entry share one undo step.
    #[serde(with = "millis")]
    pub history_merge_window: Duration,
    /// Maximum number of undo steps kept.
    pub max_history: usize,
    /// Quiet period before a data-changed snapshot is delivered.
    #[serde(with = "millis")]
    pub data_changed_debounce: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: 1.1,
            drag_threshold: 3.0,
            pan_throttle: Duration::from_millis(30),
            wheel_throttle: Duration::from_millis(100),
            paste_offset: 20.0,
            fit_padding: 50.0,
            hit_tolerance: 4.0,
            history_merge_window: Duration::from_millis(1000),
            max_history: 100,
            data_changed_debounce: Duration::from_millis(500),
        }
    }
}

impl BoardConfig {
    /// Parse a config from JSON.
    ///
    /// Zoom bounds must be positive, finite and ordered.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.check_zoom_bounds().map_err(serde::de::Error::custom)?;
        Ok(config)
    }

    fn check_zoom_bounds(&self) -> Result<(), String> {
        let valid = |zoom: f64| zoom.is_finite() && zoom > 0.0;
        if !valid(self.min_zoom) || !valid(self.max_zoom) {
            return Err(format!(
                "zoom bounds must be positive and finite, got minZoom {} and maxZoom {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "minZoom {} is greater than maxZoom {}",
                self.min_zoom, self.max_zoom
            ));
        }
        Ok(())
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp a zoom factor into the configured range.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let low = self.min_zoom.min(self.max_zoom);
        let high = self.min_zoom.max(self.max_zoom);
        zoom.max(low).min(high)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
