//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::render::Rgba;

/// Tunables for the reconciliation engine and the renderable projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Colors handed out, in order, to new renderables. Wraps around.
    pub palette: Vec<Rgba>,
    /// Visibility of freshly created renderables.
    pub default_visible: bool,
    /// Sides of the frustum drawn per region segment (at least 3).
    pub frustum_sides: usize,
    /// Half-extent of locset markers (micrometres).
    pub marker_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                Rgba::from_hex(0x1f77_b4ff),
                Rgba::from_hex(0xff7f_0eff),
                Rgba::from_hex(0x2ca0_2cff),
                Rgba::from_hex(0xd627_28ff),
                Rgba::from_hex(0x9467_bdff),
                Rgba::from_hex(0x8c56_4bff),
                Rgba::from_hex(0xe377_c2ff),
                Rgba::from_hex(0x7f7f_7fff),
                Rgba::from_hex(0xbcbd_22ff),
                Rgba::from_hex(0x17be_cfff),
            ],
            default_visible: false,
            frustum_sides: 8,
            marker_scale: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration; missing fields take their defaults.
    ///
    /// # Errors
    /// Malformed JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub(crate) fn sides(&self) -> usize {
        self.frustum_sides.max(3)
    }
}
