use serde::Serialize;

use crate::{
    error::Result,
    model::AqiCategory,
};

/// Display metadata for one AQI category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityBand {
    pub category: u8,
    pub label: &'static str,
    /// Hex RGB, e.g. `#90be6d`.
    pub color: &'static str,
    pub description: &'static str,
}

/// Ordered by ascending severity; index `n` holds category `n + 1`.
pub const SEVERITY_BANDS: [SeverityBand; 5] = [
    SeverityBand {
        category: 1,
        label: "Good",
        color: "#90be6d",
        description: "Air quality is satisfactory with little risk to health.",
    },
    SeverityBand {
        category: 2,
        label: "Fair",
        color: "#f9c74f",
        description: "Air quality is acceptable; some pollutants may be a moderate concern.",
    },
    SeverityBand {
        category: 3,
        label: "Moderate",
        color: "#f9844a",
        description: "Members of sensitive groups may experience health effects.",
    },
    SeverityBand {
        category: 4,
        label: "Poor",
        color: "#f94144",
        description: "Health effects may be experienced by everyone.",
    },
    SeverityBand {
        category: 5,
        label: "Very Poor",
        color: "#9d4edd",
        description: "Health alert - everyone may experience serious health effects.",
    },
];

pub fn classify(category: AqiCategory) -> &'static SeverityBand {
    &SEVERITY_BANDS[usize::from(category.value() - 1)]
}

/// Classify an unchecked integer; fails with `InvalidCategory` outside 1..=5.
pub fn classify_raw(value: i64) -> Result<&'static SeverityBand> {
    AqiCategory::new(value).map(classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn every_category_has_a_band() {
        let labels: Vec<_> =
            (1..=5).map(|c| classify_raw(c).expect("valid category").label).collect();
        assert_eq!(labels, ["Good", "Fair", "Moderate", "Poor", "Very Poor"]);
    }

    #[test]
    fn boundaries_map_to_their_own_band() {
        assert_eq!(classify(AqiCategory::MIN).label, "Good");
        assert_eq!(classify(AqiCategory::MAX).label, "Very Poor");
        assert_eq!(classify(AqiCategory::MAX).category, 5);
    }

    #[test]
    fn band_colors_and_good_wording() {
        let colors: Vec<_> = SEVERITY_BANDS.iter().map(|b| b.color).collect();
        assert_eq!(colors, ["#90be6d", "#f9c74f", "#f9844a", "#f94144", "#9d4edd"]);
        assert_eq!(
            classify(AqiCategory::MIN).description,
            "Air quality is satisfactory with little risk to health."
        );
    }

    #[test]
    fn out_of_range_is_invalid() {
        assert_eq!(classify_raw(0), Err(Error::InvalidCategory(0)));
        assert_eq!(classify_raw(6), Err(Error::InvalidCategory(6)));
        assert_eq!(classify_raw(-3), Err(Error::InvalidCategory(-3)));
    }

    #[test]
    fn classify_is_pure() {
        let c = AqiCategory::new(3).unwrap();
        assert_eq!(classify(c), classify(c));
        assert!(std::ptr::eq(classify(c), classify(c)));
    }
}
