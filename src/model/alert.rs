use serde::{Deserialize, Serialize};

/// Named alert tier used to deduplicate repeated warnings for the same
/// underlying low-fuel condition.
///
/// The two tiers are independent: a `24h` alert is neither implied nor
/// suppressed by a `48h` alert for the same structure and resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdBucket {
    /// Roughly two days of the resource remain.
    #[serde(rename = "48h")]
    Warned48h,
    /// Less than one day of the resource remains.
    #[serde(rename = "24h")]
    Warned24h,
}

impl ThresholdBucket {
    pub const ALL: [ThresholdBucket; 2] = [ThresholdBucket::Warned48h, ThresholdBucket::Warned24h];

    /// Whether a resource with `hours_remaining` until empty falls in this tier.
    ///
    /// The `48h` tier covers the window where two full days remain
    /// (`48 <= h < 72`); the `24h` tier fires once less than one day remains
    /// (`h < 24`). A resource in between has already received its two-day
    /// warning and is not yet urgent, so neither tier fires.
    pub fn matches(&self, hours_remaining: f64) -> bool {
        match self {
            ThresholdBucket::Warned48h => (48.0..72.0).contains(&hours_remaining),
            ThresholdBucket::Warned24h => hours_remaining < 24.0,
        }
    }

    /// Stable key used in persisted alert state.
    pub fn key(&self) -> &'static str {
        match self {
            ThresholdBucket::Warned48h => "48h",
            ThresholdBucket::Warned24h => "24h",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_day_window_matches_48h_tier_only() {
        assert!(ThresholdBucket::Warned48h.matches(48.0));
        assert!(ThresholdBucket::Warned48h.matches(71.9));
        assert!(!ThresholdBucket::Warned24h.matches(48.0));
    }

    #[test]
    fn under_one_day_matches_24h_tier_only() {
        assert!(ThresholdBucket::Warned24h.matches(20.0));
        assert!(ThresholdBucket::Warned24h.matches(0.5));
        assert!(!ThresholdBucket::Warned48h.matches(20.0));
    }

    #[test]
    fn mid_window_matches_neither_tier() {
        // 33.33 hours: the two-day warning already fired, not yet urgent
        for bucket in ThresholdBucket::ALL {
            assert!(!bucket.matches(33.33));
        }
    }

    #[test]
    fn healthy_levels_match_neither_tier() {
        for bucket in ThresholdBucket::ALL {
            assert!(!bucket.matches(72.0));
            assert!(!bucket.matches(500.0));
        }
    }
}
