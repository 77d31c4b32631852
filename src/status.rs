//! Status classification for measured environmental values.
//!
//! Maps a numeric reading to a discrete status tier (label, rank, color,
//! advice) for each of the four measurement domains: PM2.5, AQI, rainwater
//! pH, and UV index. Boundary values follow Taiwan MOENV conventions.
//!
//! Classification is total: every finite or infinite input lands in exactly
//! one tier via sequential ascending-threshold comparison, and `NaN` (an
//! unparseable or absent upstream field) lands in [`DATA_UNAVAILABLE`].
//! These functions never fail and have no side effects.

// ---------------------------------------------------------------------------
// Tier types
// ---------------------------------------------------------------------------

/// Display color associated with a status tier.
///
/// Rendered in the terminal as a colored-circle glyph rather than ANSI
/// escapes, so output stays readable in pipes and log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierColor {
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Maroon,
    Gray,
}

impl TierColor {
    /// Terminal glyph for this color.
    pub fn glyph(&self) -> &'static str {
        match self {
            TierColor::Green => "🟢",
            TierColor::Yellow => "🟡",
            TierColor::Orange => "🟠",
            TierColor::Red => "🔴",
            TierColor::Purple => "🟣",
            TierColor::Maroon => "🟤",
            TierColor::Gray => "⚪",
        }
    }
}

/// One severity level within a measurement domain.
///
/// Tiers are defined as statics and returned by reference, so callers can
/// compare them by identity as well as by rank. `rank` is the tier's
/// position in the domain's ascending boundary order starting at 1
/// (rank 0 is reserved for [`DATA_UNAVAILABLE`]); ranks are only meaningful
/// within a single domain.
#[derive(Debug, PartialEq)]
pub struct StatusTier {
    /// English label, e.g. "Unhealthy for Sensitive Groups".
    pub label: &'static str,
    /// Label as published on Taiwanese dashboards, e.g. "對敏感族群不健康".
    pub label_zh: &'static str,
    /// 1-based position in the domain's ascending boundary order.
    pub rank: u8,
    pub color: TierColor,
    /// Public-guidance text, for the domains that publish one.
    pub advice: Option<&'static str>,
}

/// Shared tier for missing or unparseable measurements, across all domains.
///
/// Rank 0 keeps it outside every domain's ordering; summary logic must skip
/// it rather than treat it as "better than Good".
pub static DATA_UNAVAILABLE: StatusTier = StatusTier {
    label: "Data Unavailable",
    label_zh: "資料缺失",
    rank: 0,
    color: TierColor::Gray,
    advice: None,
};

// ---------------------------------------------------------------------------
// PM2.5 (µg/m³)
// ---------------------------------------------------------------------------

pub static PM25_GOOD: StatusTier = StatusTier {
    label: "Good",
    label_zh: "良好",
    rank: 1,
    color: TierColor::Green,
    advice: None,
};

pub static PM25_MODERATE: StatusTier = StatusTier {
    label: "Moderate",
    label_zh: "普通",
    rank: 2,
    color: TierColor::Yellow,
    advice: None,
};

pub static PM25_UNHEALTHY: StatusTier = StatusTier {
    label: "Unhealthy",
    label_zh: "不健康",
    rank: 3,
    color: TierColor::Red,
    advice: None,
};

pub static PM25_VERY_UNHEALTHY: StatusTier = StatusTier {
    label: "Very Unhealthy",
    label_zh: "非常不健康",
    rank: 4,
    color: TierColor::Purple,
    advice: None,
};

/// PM2.5 tiers in ascending boundary order.
pub static PM25_TIERS: &[&StatusTier] = &[
    &PM25_GOOD,
    &PM25_MODERATE,
    &PM25_UNHEALTHY,
    &PM25_VERY_UNHEALTHY,
];

/// Classifies a PM2.5 concentration in µg/m³.
///
/// Boundaries: ≤15 good, ≤35 moderate, ≤54 unhealthy, above that very
/// unhealthy. Upper bounds are inclusive.
pub fn pm25_status(value: f64) -> &'static StatusTier {
    if value.is_nan() {
        return &DATA_UNAVAILABLE;
    }
    if value <= 15.0 {
        &PM25_GOOD
    } else if value <= 35.0 {
        &PM25_MODERATE
    } else if value <= 54.0 {
        &PM25_UNHEALTHY
    } else {
        &PM25_VERY_UNHEALTHY
    }
}

// ---------------------------------------------------------------------------
// AQI (composite index)
// ---------------------------------------------------------------------------

pub static AQI_GOOD: StatusTier = StatusTier {
    label: "Good",
    label_zh: "良好",
    rank: 1,
    color: TierColor::Green,
    advice: Some("空氣品質令人滿意"),
};

pub static AQI_MODERATE: StatusTier = StatusTier {
    label: "Moderate",
    label_zh: "普通",
    rank: 2,
    color: TierColor::Yellow,
    advice: Some("空氣品質可接受"),
};

pub static AQI_UNHEALTHY_SENSITIVE: StatusTier = StatusTier {
    label: "Unhealthy for Sensitive Groups",
    label_zh: "對敏感族群不健康",
    rank: 3,
    color: TierColor::Orange,
    advice: Some("敏感族群應減少戶外活動"),
};

pub static AQI_UNHEALTHY: StatusTier = StatusTier {
    label: "Unhealthy",
    label_zh: "對所有族群不健康",
    rank: 4,
    color: TierColor::Red,
    advice: Some("所有人都可能出現健康問題"),
};

pub static AQI_VERY_UNHEALTHY: StatusTier = StatusTier {
    label: "Very Unhealthy",
    label_zh: "非常不健康",
    rank: 5,
    color: TierColor::Purple,
    advice: Some("健康警報，所有人應避免戶外活動"),
};

pub static AQI_HAZARDOUS: StatusTier = StatusTier {
    label: "Hazardous",
    label_zh: "危害",
    rank: 6,
    color: TierColor::Maroon,
    advice: Some("緊急狀況，所有人應待在室內"),
};

/// AQI tiers in ascending boundary order.
pub static AQI_TIERS: &[&StatusTier] = &[
    &AQI_GOOD,
    &AQI_MODERATE,
    &AQI_UNHEALTHY_SENSITIVE,
    &AQI_UNHEALTHY,
    &AQI_VERY_UNHEALTHY,
    &AQI_HAZARDOUS,
];

/// Classifies a composite AQI score.
///
/// Boundaries: ≤50, ≤100, ≤150, ≤200, ≤300, then hazardous. Upper bounds
/// are inclusive, so AQI 300 is still "very unhealthy" and 301 is the first
/// hazardous score.
pub fn aqi_status(value: f64) -> &'static StatusTier {
    if value.is_nan() {
        return &DATA_UNAVAILABLE;
    }
    if value <= 50.0 {
        &AQI_GOOD
    } else if value <= 100.0 {
        &AQI_MODERATE
    } else if value <= 150.0 {
        &AQI_UNHEALTHY_SENSITIVE
    } else if value <= 200.0 {
        &AQI_UNHEALTHY
    } else if value <= 300.0 {
        &AQI_VERY_UNHEALTHY
    } else {
        &AQI_HAZARDOUS
    }
}

// ---------------------------------------------------------------------------
// Rainwater pH
// ---------------------------------------------------------------------------

pub static PH_ACIDIC: StatusTier = StatusTier {
    label: "Acidic",
    label_zh: "強酸性",
    rank: 1,
    color: TierColor::Red,
    advice: None,
};

pub static PH_WEAKLY_ACIDIC: StatusTier = StatusTier {
    label: "Weakly Acidic",
    label_zh: "弱酸性",
    rank: 2,
    color: TierColor::Yellow,
    advice: None,
};

pub static PH_NORMAL: StatusTier = StatusTier {
    label: "Normal",
    label_zh: "正常",
    rank: 3,
    color: TierColor::Green,
    advice: None,
};

/// pH tiers in ascending boundary order. Note rank follows the pH scale,
/// not health severity: acidic rain sits at the *low* end of the scale, so
/// the healthiest tier carries the highest rank here.
pub static PH_TIERS: &[&StatusTier] = &[&PH_ACIDIC, &PH_WEAKLY_ACIDIC, &PH_NORMAL];

/// The canonical acid-rain boundary: rainwater at or below this pH is
/// acidified. Source records have used both 5.5 and 5.6 over time; 5.6 is
/// the published natural-rainwater reference point and is used throughout.
pub const PH_WEAKLY_ACIDIC_MAX: f64 = 5.6;

/// Classifies a rainwater pH value.
///
/// Below 5.0 is acidic rain, 5.0 through [`PH_WEAKLY_ACIDIC_MAX`] inclusive
/// is weakly acidic, and anything higher is normal.
pub fn ph_status(value: f64) -> &'static StatusTier {
    if value.is_nan() {
        return &DATA_UNAVAILABLE;
    }
    if value < 5.0 {
        &PH_ACIDIC
    } else if value <= PH_WEAKLY_ACIDIC_MAX {
        &PH_WEAKLY_ACIDIC
    } else {
        &PH_NORMAL
    }
}

// ---------------------------------------------------------------------------
// UV index
// ---------------------------------------------------------------------------

pub static UVI_LOW: StatusTier = StatusTier {
    label: "Low",
    label_zh: "低量級",
    rank: 1,
    color: TierColor::Green,
    advice: Some("可安心外出，無需特別防護。"),
};

pub static UVI_MODERATE: StatusTier = StatusTier {
    label: "Moderate",
    label_zh: "中量級",
    rank: 2,
    color: TierColor::Yellow,
    advice: Some("建議戴帽子、太陽眼鏡，並塗抹防曬乳。"),
};

pub static UVI_HIGH: StatusTier = StatusTier {
    label: "High",
    label_zh: "高量級",
    rank: 3,
    color: TierColor::Orange,
    advice: Some("盡量避免上午10點至下午2點外出，務必防護。"),
};

pub static UVI_VERY_HIGH: StatusTier = StatusTier {
    label: "Very High",
    label_zh: "過量級",
    rank: 4,
    color: TierColor::Red,
    advice: Some("盡量待在室內，外出時務必採取嚴密防護。"),
};

pub static UVI_EXTREME: StatusTier = StatusTier {
    label: "Extreme",
    label_zh: "危險級",
    rank: 5,
    color: TierColor::Purple,
    advice: Some("避免所有戶外活動，防護不足會很快曬傷。"),
};

/// UVI tiers in ascending boundary order.
pub static UVI_TIERS: &[&StatusTier] = &[
    &UVI_LOW,
    &UVI_MODERATE,
    &UVI_HIGH,
    &UVI_VERY_HIGH,
    &UVI_EXTREME,
];

/// Classifies a UV index reading.
///
/// Boundaries: ≤2 low, ≤5 moderate, ≤7 high, ≤10 very high, above that
/// extreme. Upper bounds are inclusive.
pub fn uvi_status(value: f64) -> &'static StatusTier {
    if value.is_nan() {
        return &DATA_UNAVAILABLE;
    }
    if value <= 2.0 {
        &UVI_LOW
    } else if value <= 5.0 {
        &UVI_MODERATE
    } else if value <= 7.0 {
        &UVI_HIGH
    } else if value <= 10.0 {
        &UVI_VERY_HIGH
    } else {
        &UVI_EXTREME
    }
}

// ---------------------------------------------------------------------------
// Option adapter
// ---------------------------------------------------------------------------

/// Classifies an optional measurement with the given domain classifier.
///
/// Upstream records carry numbers as strings and omit them freely, so most
/// callers hold an `Option<f64>` by the time classification happens. `None`
/// maps to [`DATA_UNAVAILABLE`], same as `NaN`.
pub fn tier_for(value: Option<f64>, classify: fn(f64) -> &'static StatusTier) -> &'static StatusTier {
    match value {
        Some(v) => classify(v),
        None => &DATA_UNAVAILABLE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Every domain's classifier paired with its tier table, for the
    /// properties that hold uniformly across domains.
    fn all_domains() -> Vec<(fn(f64) -> &'static StatusTier, &'static [&'static StatusTier])> {
        vec![
            (pm25_status as fn(f64) -> &'static StatusTier, PM25_TIERS),
            (aqi_status, AQI_TIERS),
            (ph_status, PH_TIERS),
            (uvi_status, UVI_TIERS),
        ]
    }

    #[test]
    fn test_every_finite_input_lands_in_a_registered_tier() {
        // Sweep a wide grid; each domain must map every value to a tier
        // from its own table, never to DATA_UNAVAILABLE.
        for (classify, tiers) in all_domains() {
            let mut v = -100.0;
            while v <= 600.0 {
                let tier = classify(v);
                assert!(
                    tiers.iter().any(|t| std::ptr::eq(*t, tier)),
                    "value {} mapped to '{}', which is not in the domain table",
                    v,
                    tier.label
                );
                v += 0.25;
            }
        }
    }

    #[test]
    fn test_tier_tables_are_ordered_ascending_starting_at_one() {
        // rank must equal the tier's position in the ascending boundary
        // order; summary sorting depends on this.
        for (_, tiers) in all_domains() {
            for (i, tier) in tiers.iter().enumerate() {
                assert_eq!(
                    tier.rank,
                    (i + 1) as u8,
                    "tier '{}' has rank {}, expected {}",
                    tier.label,
                    tier.rank,
                    i + 1
                );
                assert!(!tier.label.is_empty());
                assert!(!tier.label_zh.is_empty());
            }
        }
        assert_eq!(DATA_UNAVAILABLE.rank, 0);
        assert_eq!(DATA_UNAVAILABLE.color, TierColor::Gray);
    }

    #[test]
    fn test_tier_labels_are_unique_within_each_domain() {
        // Two tiers sharing a label would be indistinguishable on the
        // dashboard and in the summary line.
        for (_, tiers) in all_domains() {
            let mut labels = std::collections::HashSet::new();
            let mut labels_zh = std::collections::HashSet::new();
            for tier in tiers {
                assert!(
                    labels.insert(tier.label),
                    "duplicate label '{}' in one domain's tier table",
                    tier.label
                );
                assert!(
                    labels_zh.insert(tier.label_zh),
                    "duplicate label '{}' in one domain's tier table",
                    tier.label_zh
                );
            }
        }
    }

    #[test]
    fn test_monotonicity_rank_never_decreases_with_value() {
        for (classify, _) in all_domains() {
            let mut prev_rank = 0u8;
            let mut v = -50.0;
            while v <= 600.0 {
                let rank = classify(v).rank;
                assert!(
                    rank >= prev_rank,
                    "rank decreased from {} to {} at value {}",
                    prev_rank,
                    rank,
                    v
                );
                prev_rank = rank;
                v += 0.1;
            }
        }
    }

    #[test]
    fn test_nan_maps_to_data_unavailable_in_every_domain() {
        for (classify, _) in all_domains() {
            let tier = classify(f64::NAN);
            assert!(std::ptr::eq(tier, &DATA_UNAVAILABLE));
            assert_eq!(tier.label_zh, "資料缺失");
        }
    }

    #[test]
    fn test_infinities_classify_to_the_end_tiers() {
        // Only NaN is unclassifiable; infinities fall through the
        // comparisons to the first and last tiers.
        for (classify, tiers) in all_domains() {
            assert!(std::ptr::eq(classify(f64::NEG_INFINITY), tiers[0]));
            assert!(std::ptr::eq(
                classify(f64::INFINITY),
                tiers[tiers.len() - 1]
            ));
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let samples = [-3.0, 0.0, 15.0, 15.1, 54.0, 300.0, 301.0, 5.6, 10.0];
        for (classify, _) in all_domains() {
            for &v in &samples {
                let first = classify(v);
                let second = classify(v);
                assert!(std::ptr::eq(first, second));
                assert_eq!(first.label, second.label);
                assert_eq!(first.rank, second.rank);
            }
        }
    }

    #[test]
    fn test_pm25_boundaries() {
        assert!(std::ptr::eq(pm25_status(0.0), &PM25_GOOD));
        assert!(std::ptr::eq(pm25_status(15.0), &PM25_GOOD));
        assert!(std::ptr::eq(pm25_status(15.1), &PM25_MODERATE));
        assert!(std::ptr::eq(pm25_status(35.0), &PM25_MODERATE));
        assert!(std::ptr::eq(pm25_status(35.0001), &PM25_UNHEALTHY));
        assert!(std::ptr::eq(pm25_status(54.0), &PM25_UNHEALTHY));
        assert!(std::ptr::eq(pm25_status(54.5), &PM25_VERY_UNHEALTHY));
        assert!(std::ptr::eq(pm25_status(200.0), &PM25_VERY_UNHEALTHY));
    }

    #[test]
    fn test_aqi_boundaries() {
        assert!(std::ptr::eq(aqi_status(50.0), &AQI_GOOD));
        assert!(std::ptr::eq(aqi_status(51.0), &AQI_MODERATE));
        assert!(std::ptr::eq(aqi_status(100.0), &AQI_MODERATE));
        assert!(std::ptr::eq(aqi_status(150.0), &AQI_UNHEALTHY_SENSITIVE));
        assert!(std::ptr::eq(aqi_status(200.0), &AQI_UNHEALTHY));
        assert!(std::ptr::eq(aqi_status(300.0), &AQI_VERY_UNHEALTHY));
        assert!(std::ptr::eq(aqi_status(301.0), &AQI_HAZARDOUS));
        assert!(std::ptr::eq(aqi_status(500.0), &AQI_HAZARDOUS));
    }

    #[test]
    fn test_ph_boundaries_inclusive_both_ends() {
        assert!(std::ptr::eq(ph_status(4.9), &PH_ACIDIC));
        assert!(std::ptr::eq(ph_status(4.9999), &PH_ACIDIC));
        assert!(std::ptr::eq(ph_status(5.0), &PH_WEAKLY_ACIDIC));
        assert!(std::ptr::eq(ph_status(5.3), &PH_WEAKLY_ACIDIC));
        assert!(std::ptr::eq(ph_status(5.6), &PH_WEAKLY_ACIDIC));
        assert!(std::ptr::eq(ph_status(5.6001), &PH_NORMAL));
        assert!(std::ptr::eq(ph_status(6.0), &PH_NORMAL));
        assert!(std::ptr::eq(ph_status(7.0), &PH_NORMAL));
    }

    #[test]
    fn test_ph_rank_follows_scale_not_health() {
        // Acidic is the worst outcome but the lowest pH, so its rank is 1.
        // Worst-by-rank logic for acid rain must invert, not reuse, the
        // air quality convention.
        assert!(PH_ACIDIC.rank < PH_WEAKLY_ACIDIC.rank);
        assert!(PH_WEAKLY_ACIDIC.rank < PH_NORMAL.rank);
    }

    #[test]
    fn test_uvi_boundaries() {
        assert!(std::ptr::eq(uvi_status(0.0), &UVI_LOW));
        assert!(std::ptr::eq(uvi_status(2.0), &UVI_LOW));
        assert!(std::ptr::eq(uvi_status(2.1), &UVI_MODERATE));
        assert!(std::ptr::eq(uvi_status(5.0), &UVI_MODERATE));
        assert!(std::ptr::eq(uvi_status(7.0), &UVI_HIGH));
        assert!(std::ptr::eq(uvi_status(10.0), &UVI_VERY_HIGH));
        assert!(std::ptr::eq(uvi_status(10.5), &UVI_EXTREME));
        assert!(std::ptr::eq(uvi_status(11.0), &UVI_EXTREME));
    }

    #[test]
    fn test_tier_for_option_adapter() {
        assert!(std::ptr::eq(tier_for(Some(12.0), pm25_status), &PM25_GOOD));
        assert!(std::ptr::eq(tier_for(None, pm25_status), &DATA_UNAVAILABLE));
        assert!(std::ptr::eq(
            tier_for(Some(f64::NAN), aqi_status),
            &DATA_UNAVAILABLE
        ));
        assert!(std::ptr::eq(tier_for(Some(5.3), ph_status), &PH_WEAKLY_ACIDIC));
    }

    #[test]
    fn test_every_color_has_a_distinct_glyph() {
        let colors = [
            TierColor::Green,
            TierColor::Yellow,
            TierColor::Orange,
            TierColor::Red,
            TierColor::Purple,
            TierColor::Maroon,
            TierColor::Gray,
        ];
        let mut seen = std::collections::HashSet::new();
        for color in colors {
            assert!(
                seen.insert(color.glyph()),
                "glyph {} reused by {:?}",
                color.glyph(),
                color
            );
        }
    }
}
