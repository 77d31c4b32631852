//! County registry for the Taiwan environmental monitoring service.
//!
//! Defines the canonical list of counties and cities accepted by the CWA
//! per-location datasets (forecast, sunrise/sunset) and used to filter
//! MOENV station records. This is the single source of truth for county
//! names — other modules should reference them from here rather than
//! hardcoding strings.

/// All counties/cities queryable by name against the CWA datasets, in the
/// customary north-to-south, main-island-then-outlying order.
///
/// Names use the official 臺 form, which is also what the MOENV station
/// records publish in their `county` field.
pub static COUNTY_REGISTRY: &[&str] = &[
    "臺北市",
    "新北市",
    "桃園市",
    "臺中市",
    "臺南市",
    "高雄市",
    "新竹縣",
    "苗栗縣",
    "彰化縣",
    "南投縣",
    "雲林縣",
    "嘉義縣",
    "屏東縣",
    "宜蘭縣",
    "花蓮縣",
    "臺東縣",
    "澎湖縣",
    "金門縣",
    "連江縣",
];

/// County used when the caller does not name one.
pub const DEFAULT_COUNTY: &str = "臺北市";

/// Looks up a county by name and returns its canonical registry spelling.
///
/// The registry uses 臺 but the colloquial 台 spelling is common in user
/// input, so both are accepted.
pub fn find_county(name: &str) -> Option<&'static str> {
    let canonical = name.replace('台', "臺");
    COUNTY_REGISTRY
        .iter()
        .find(|c| **c == name || **c == canonical)
        .copied()
}

/// Checks whether a name is a known county (in either spelling).
pub fn is_county(name: &str) -> bool {
    find_county(name).is_some()
}

/// Returns the distinct county names present in a batch of station records,
/// in registry order first and any unrecognized names after, alphabetically.
///
/// Used to tell the caller what *is* available when a requested county
/// matched nothing.
pub fn counties_in<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut known: Vec<&'a str> = Vec::new();
    let mut unknown: Vec<&'a str> = Vec::new();
    for name in names {
        if known.contains(&name) || unknown.contains(&name) {
            continue;
        }
        match COUNTY_REGISTRY.iter().position(|c| *c == name) {
            Some(_) => known.push(name),
            None => unknown.push(name),
        }
    }
    known.sort_by_key(|name| COUNTY_REGISTRY.iter().position(|c| c == name));
    unknown.sort_unstable();
    known.extend(unknown);
    known
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_nineteen_cwa_locations() {
        // The CWA per-location datasets accept exactly these names; a
        // missing entry would make that county unreachable from the CLI.
        assert_eq!(COUNTY_REGISTRY.len(), 19);
        for expected in ["臺北市", "高雄市", "連江縣", "澎湖縣"] {
            assert!(
                COUNTY_REGISTRY.contains(&expected),
                "COUNTY_REGISTRY missing expected county '{}'",
                expected
            );
        }
    }

    #[test]
    fn test_county_names_use_official_suffixes() {
        // Every entry must end in 市 or 縣 and use the official 臺 form;
        // the CWA API rejects the colloquial 台 spelling.
        for county in COUNTY_REGISTRY {
            let last = county.chars().last().unwrap();
            assert!(
                last == '市' || last == '縣',
                "county '{}' should end in 市 or 縣",
                county
            );
            assert!(
                !county.contains('台'),
                "county '{}' should use the official 臺 form",
                county
            );
        }
    }

    #[test]
    fn test_no_duplicate_counties() {
        let mut seen = std::collections::HashSet::new();
        for county in COUNTY_REGISTRY {
            assert!(
                seen.insert(county),
                "duplicate county '{}' found in COUNTY_REGISTRY",
                county
            );
        }
    }

    #[test]
    fn test_default_county_is_registered() {
        assert!(is_county(DEFAULT_COUNTY));
    }

    #[test]
    fn test_find_county_accepts_both_spellings() {
        assert_eq!(find_county("臺北市"), Some("臺北市"));
        assert_eq!(find_county("台北市"), Some("臺北市"));
        assert_eq!(find_county("台中市"), Some("臺中市"));
        assert_eq!(find_county("新北市"), Some("新北市"));
        assert_eq!(find_county("東京都"), None);
    }

    #[test]
    fn test_counties_in_dedupes_and_orders_by_registry() {
        let names = ["高雄市", "臺北市", "高雄市", "基隆市", "臺中市"];
        let counties = counties_in(names.iter().copied());
        // Registry order for known names, unknown ones at the end.
        assert_eq!(counties, vec!["臺北市", "臺中市", "高雄市", "基隆市"]);
    }

    #[test]
    fn test_counties_in_empty_input() {
        let counties = counties_in(std::iter::empty());
        assert!(counties.is_empty());
    }
}
