use serde::{Serialize, Serializer};

pub const HIGH_AVG: f64 = 7.0;
pub const LOW_AVG: f64 = 5.0;
pub const HIGH_STD: f64 = 1.5;

/// Qualitative pedagogical profile of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Critical,
    HighPerformance,
    Inconsistent,
    LowAverage,
    Standard,
}

impl Profile {
    pub fn label(&self) -> &'static str {
        match self {
            Profile::Critical => {
                "CRITICAL SITUATION: Student has failure(s) in the final assessment."
            }
            Profile::HighPerformance => {
                "HIGH PERFORMANCE: Solid and consistent results across all subject areas."
            }
            Profile::Inconsistent => {
                "INCONSISTENT PERFORMANCE: Approved, but with significant grade fluctuation."
            }
            Profile::LowAverage => {
                "GENERAL DIFFICULTY: Approved with low average, requires reinforcement of core concepts."
            }
            Profile::Standard => "STANDARD PERFORMANCE: Approved within the expected normal range.",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Assigns a profile from the rounded mean, standard deviation and failure count.
///
/// Rules are checked in order; an absent mean or deviation fails every
/// comparison it takes part in.
///
/// | Rule                          | Profile         |
/// |-------------------------------|-----------------|
/// | failures > 0                  | Critical        |
/// | mean >= 7.0 and std < 1.5     | HighPerformance |
/// | mean >= 5.0 and std >= 1.5    | Inconsistent    |
/// | mean < 5.0                    | LowAverage      |
/// | otherwise                     | Standard        |
pub fn classify(mean: Option<f64>, std_dev: Option<f64>, fail_count: usize) -> Profile {
    let mean_at_least = |t: f64| mean.is_some_and(|m| m >= t);

    if fail_count > 0 {
        Profile::Critical
    } else if mean_at_least(HIGH_AVG) && std_dev.is_some_and(|s| s < HIGH_STD) {
        Profile::HighPerformance
    } else if mean_at_least(LOW_AVG) && std_dev.is_some_and(|s| s >= HIGH_STD) {
        Profile::Inconsistent
    } else if mean.is_some_and(|m| m < LOW_AVG) {
        Profile::LowAverage
    } else {
        Profile::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_always_critical() {
        for (mean, std) in [
            (Some(10.0), Some(0.0)),
            (Some(8.0), Some(3.0)),
            (Some(2.0), Some(0.5)),
            (None, None),
        ] {
            assert_eq!(classify(mean, std, 1), Profile::Critical);
            assert_eq!(classify(mean, std, 3), Profile::Critical);
        }
    }

    #[test]
    fn test_rule_boundaries() {
        assert_eq!(classify(Some(7.0), Some(1.49), 0), Profile::HighPerformance);
        assert_eq!(classify(Some(6.99), Some(1.0), 0), Profile::Standard);
        assert_eq!(classify(Some(7.0), Some(1.5), 0), Profile::Inconsistent);
        assert_eq!(classify(Some(5.0), Some(1.5), 0), Profile::Inconsistent);
        assert_eq!(classify(Some(4.99), Some(1.5), 0), Profile::LowAverage);
        assert_eq!(classify(Some(4.99), Some(0.1), 0), Profile::LowAverage);
        assert_eq!(classify(Some(5.0), Some(1.49), 0), Profile::Standard);
    }

    #[test]
    fn test_absent_values_fall_through() {
        // single grade: no deviation, high mean is not enough
        assert_eq!(classify(Some(9.0), None, 0), Profile::Standard);
        assert_eq!(classify(Some(3.0), None, 0), Profile::LowAverage);
        assert_eq!(classify(None, None, 0), Profile::Standard);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Profile::HighPerformance).unwrap();
        assert!(json.starts_with("\"HIGH PERFORMANCE:"));
    }
}
