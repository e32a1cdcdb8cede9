use serde::{Deserialize, Serialize};

/// The representation a structure currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActiveTier {
    Full,
    Simplified,
    Minimal,
}

impl ActiveTier {
    pub const ALL: [ActiveTier; 3] = [ActiveTier::Full, ActiveTier::Simplified, ActiveTier::Minimal];
}

impl std::fmt::Display for ActiveTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActiveTier::Full => "full",
            ActiveTier::Simplified => "simplified",
            ActiveTier::Minimal => "minimal",
        };
        f.write_str(name)
    }
}

/// Errors from invalid LOD thresholds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    #[error("LOD thresholds must be finite, positive and increasing, got {full} / {simplified}")]
    Thresholds { full: f32, simplified: f32 },
}

/// Distance thresholds in meters between the three tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodThresholds {
    /// Below this distance the full model is shown.
    pub full: f32,
    /// Below this distance (and at or above `full`) the simplified model is shown.
    pub simplified: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            full: 200.0,
            simplified: 500.0,
        }
    }
}

impl LodThresholds {
    pub fn validate(&self) -> Result<(), LodError> {
        let ok = self.full.is_finite()
            && self.simplified.is_finite()
            && self.full > 0.0
            && self.full < self.simplified;
        if ok {
            Ok(())
        } else {
            Err(LodError::Thresholds {
                full: self.full,
                simplified: self.simplified,
            })
        }
    }

    /// Tier for a viewer distance. Depends on nothing but `distance`.
    pub fn tier_for(&self, distance: f32) -> ActiveTier {
        if distance < self.full {
            ActiveTier::Full
        } else if distance < self.simplified {
            ActiveTier::Simplified
        } else {
            ActiveTier::Minimal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        let t = LodThresholds::default();
        assert_eq!(t.tier_for(0.0), ActiveTier::Full);
        assert_eq!(t.tier_for(199.9), ActiveTier::Full);
        assert_eq!(t.tier_for(200.0), ActiveTier::Simplified);
        assert_eq!(t.tier_for(499.9), ActiveTier::Simplified);
        assert_eq!(t.tier_for(500.0), ActiveTier::Minimal);
        assert_eq!(t.tier_for(1.0e6), ActiveTier::Minimal);
    }

    #[test]
    fn tiers_are_monotonic_in_distance() {
        let t = LodThresholds::default();
        let tiers: Vec<ActiveTier> = (0..100).map(|i| t.tier_for(i as f32 * 10.0)).collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        assert!(LodThresholds::default().validate().is_ok());
        let bad = LodThresholds {
            full: 500.0,
            simplified: 200.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(ActiveTier::Simplified.to_string(), "simplified");
    }
}
