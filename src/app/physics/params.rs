use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub const CENTER_STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const REPEL_STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=400.0;
pub const LINK_STRENGTH_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const LINK_DISTANCE_RANGE: RangeInclusive<f32> = 20.0..=300.0;

/// Live-tunable force settings. The simulation reads these by reference on
/// every tick, so edits take effect on the next tick without a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceParameters {
    pub center_strength: f32,
    /// Magnitude of the many-body charge; applied as a repulsion.
    pub repel_strength: f32,
    pub link_strength: f32,
    pub link_distance: f32,
}

impl Default for ForceParameters {
    fn default() -> Self {
        Self {
            center_strength: 0.15,
            repel_strength: 160.0,
            link_strength: 0.4,
            link_distance: 70.0,
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

impl ForceParameters {
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            center_strength: clamp_to(
                self.center_strength,
                &CENTER_STRENGTH_RANGE,
                defaults.center_strength,
            ),
            repel_strength: clamp_to(
                self.repel_strength,
                &REPEL_STRENGTH_RANGE,
                defaults.repel_strength,
            ),
            link_strength: clamp_to(
                self.link_strength,
                &LINK_STRENGTH_RANGE,
                defaults.link_strength,
            ),
            link_distance: clamp_to(
                self.link_distance,
                &LINK_DISTANCE_RANGE,
                defaults.link_distance,
            ),
        }
    }

    /// Signed many-body strength; negative pushes nodes apart.
    pub fn charge(&self) -> f32 {
        -self.repel_strength.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_slider_ranges() {
        let defaults = ForceParameters::default();
        assert_eq!(defaults.clamped(), defaults);
    }

    #[test]
    fn charge_is_always_repulsive() {
        let params = ForceParameters {
            repel_strength: 250.0,
            ..ForceParameters::default()
        };
        assert_eq!(params.charge(), -250.0);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let params = ForceParameters {
            link_distance: f32::NAN,
            center_strength: f32::INFINITY,
            ..ForceParameters::default()
        }
        .clamped();
        assert_eq!(params.link_distance, 70.0);
        assert_eq!(params.center_strength, 0.15);
    }
}
