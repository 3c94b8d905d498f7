use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Color;

/// Direction of the world's positive Y axis relative to the screen.
/// Chosen once per scene; every world→pixel mapping honors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    /// Physics convention: +Y points up, so pixel Y and rotation are negated.
    #[default]
    Up,
    /// Screen convention: +Y points down, mapping is a plain scale.
    Down,
}

impl YAxis {
    /// Sign applied to world Y (and rotation angles) when mapping to pixels.
    pub fn sign(self) -> f32 {
        match self {
            YAxis::Up => -1.0,
            YAxis::Down => 1.0,
        }
    }
}

/// Scene configuration. Every field has a default, so a partial JSON
/// document (or `{}`) is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Color the surface is cleared to at the start of each draw.
    pub background: Color,
    /// Gravity in world units per second squared.
    pub gravity: Vec2,
    pub y_axis: YAxis,
    /// Pixels per world unit after `Camera::reset`.
    pub default_view_scale: f32,
    /// Proportional padding added around the union box by `fit_to_all`.
    pub fit_padding: f32,
    /// Multiplier on an entity's bounding size used by `fit_to_object`.
    pub fit_margin: f32,
    /// Upper bound the runner clamps frame deltas to, in seconds.
    pub max_dt: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
            gravity: Vec2::new(0.0, -9.81),
            y_axis: YAxis::Up,
            default_view_scale: 100.0,
            fit_padding: 0.4,
            fit_margin: 1.5,
            max_dt: 1.0 / 30.0,
        }
    }
}

/// Errors raised while loading a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid scene config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SceneConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}
