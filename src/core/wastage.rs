use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{EngineError, EngineResult};
use crate::models::{
    Estimate, EventWastageRequest, FoodItem, ItemWastage, PlateEstimate, RateBasis, WastageEstimate,
};

/// Rate table key every table must carry; unknown event types resolve to it
pub const OTHER_EVENT_TYPE: &str = "Other";

/// Deployment-tunable wastage coefficients
///
/// Loaded from the `[wastage]` configuration section. The three tables feed three
/// independent estimates and are deliberately not reconciled with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WastageRates {
    /// Kilograms of food wasted per attendee, by event type
    #[serde(default = "default_base_rates")]
    pub base_rates: BTreeMap<String, f64>,
    /// Applied to the no-show headcount when more people were expected than came
    #[serde(default = "default_overprep_multiplier")]
    pub overprep_multiplier: f64,
    /// Applied to the whole attendance when demand met or exceeded expectations
    #[serde(default = "default_underprep_factor")]
    pub underprep_factor: f64,
    /// Share of plates expected to go to waste, by event type
    #[serde(default = "default_plate_wastage_rates")]
    pub plate_wastage_rates: BTreeMap<String, f64>,
    /// Share of servings expected to go to waste per food item, by event type
    #[serde(default = "default_item_wastage_factors")]
    pub item_wastage_factors: BTreeMap<String, f64>,
}

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn default_base_rates() -> BTreeMap<String, f64> {
    table(&[
        ("Wedding", 0.5),
        ("Birthday", 0.3),
        ("Corporate", 0.4),
        ("Festival", 0.6),
        ("Other", 0.4),
    ])
}

fn default_overprep_multiplier() -> f64 { 1.5 }
fn default_underprep_factor() -> f64 { 0.2 }

fn default_plate_wastage_rates() -> BTreeMap<String, f64> {
    table(&[
        ("Wedding", 0.15),
        ("Corporate", 0.10),
        ("Birthday", 0.08),
        ("Festival", 0.20),
        ("Other", 0.12),
    ])
}

fn default_item_wastage_factors() -> BTreeMap<String, f64> {
    table(&[
        ("wedding", 0.15),
        ("conference", 0.10),
        ("party", 0.20),
        ("corporate", 0.12),
        ("other", 0.15),
    ])
}

impl Default for WastageRates {
    fn default() -> Self {
        Self {
            base_rates: default_base_rates(),
            overprep_multiplier: default_overprep_multiplier(),
            underprep_factor: default_underprep_factor(),
            plate_wastage_rates: default_plate_wastage_rates(),
            item_wastage_factors: default_item_wastage_factors(),
        }
    }
}

impl WastageRates {
    /// Reject tables that could produce negative or nonsensical estimates
    pub fn validate(&self) -> EngineResult<()> {
        check_table("base_rates", &self.base_rates, None)?;
        check_table("plate_wastage_rates", &self.plate_wastage_rates, Some(1.0))?;
        check_table("item_wastage_factors", &self.item_wastage_factors, None)?;

        if !self.overprep_multiplier.is_finite() || self.overprep_multiplier <= 1.0 {
            return Err(EngineError::invalid(format!(
                "overprep_multiplier must be greater than 1, got {}",
                self.overprep_multiplier
            )));
        }
        if !self.underprep_factor.is_finite()
            || self.underprep_factor < 0.0
            || self.underprep_factor >= 1.0
        {
            return Err(EngineError::invalid(format!(
                "underprep_factor must be in [0, 1), got {}",
                self.underprep_factor
            )));
        }
        Ok(())
    }
}

fn check_table(name: &str, rates: &BTreeMap<String, f64>, max: Option<f64>) -> EngineResult<()> {
    if !rates.keys().any(|k| k.eq_ignore_ascii_case(OTHER_EVENT_TYPE)) {
        return Err(EngineError::invalid(format!("{} has no \"Other\" entry", name)));
    }
    for (event_type, rate) in rates {
        if !rate.is_finite() || *rate < 0.0 || max.is_some_and(|m| *rate > m) {
            return Err(EngineError::invalid(format!(
                "{}[{}] has invalid rate {}",
                name, event_type, rate
            )));
        }
    }
    Ok(())
}

/// Resolve an event type against a rate table
///
/// Exact key first, then a case-insensitive match on the trimmed name, then "Other".
fn lookup_rate<'a>(rates: &'a BTreeMap<String, f64>, event_type: &str) -> EngineResult<(&'a str, f64)> {
    if let Some((key, rate)) = rates.get_key_value(event_type) {
        return Ok((key.as_str(), *rate));
    }

    let trimmed = event_type.trim();
    rates
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(trimmed))
        .or_else(|| rates.iter().find(|(key, _)| key.eq_ignore_ascii_case(OTHER_EVENT_TYPE)))
        .map(|(key, rate)| (key.as_str(), *rate))
        .ok_or_else(|| EngineError::invalid("rate table has no \"Other\" entry"))
}

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn non_negative(name: &str, value: i64) -> EngineResult<u64> {
    u64::try_from(value)
        .map_err(|_| EngineError::invalid(format!("{} must be non-negative, got {}", name, value)))
}

/// Stateless wastage estimator over an injected rate table
#[derive(Debug, Clone, Default)]
pub struct WastageEstimator {
    rates: WastageRates,
}

impl WastageEstimator {
    pub fn new(rates: WastageRates) -> EngineResult<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &WastageRates {
        &self.rates
    }

    /// Kilogram estimate from expected vs. actual attendance
    ///
    /// Over-preparation (fewer people came than planned) wastes the no-show share at
    /// `overprep_multiplier` on top of the attendee share; otherwise only a
    /// `underprep_factor` fraction of the attendee share is wasted.
    pub fn estimate_by_attendance(
        &self,
        event_type: &str,
        expected_attendees: i64,
        actual_attendees: i64,
    ) -> EngineResult<WastageEstimate> {
        let expected = non_negative("expected_attendees", expected_attendees)?;
        let actual = non_negative("actual_attendees", actual_attendees)?;
        let (resolved, base_rate) = lookup_rate(&self.rates.base_rates, event_type)?;

        let attendance_diff = expected as f64 - actual as f64;
        let over_prepared = attendance_diff > 0.0;

        let (quantity, multiplier_applied) = if over_prepared {
            let multiplier = self.rates.overprep_multiplier;
            (
                actual as f64 * base_rate + attendance_diff * base_rate * multiplier,
                multiplier,
            )
        } else {
            let factor = self.rates.underprep_factor;
            (actual as f64 * base_rate * factor, factor)
        };

        Ok(WastageEstimate {
            predicted_quantity: round2(quantity),
            unit: "kg".to_string(),
            basis: RateBasis {
                event_type: resolved.to_string(),
                base_rate,
                multiplier_applied,
                over_prepared,
            },
        })
    }

    /// Plate estimate from a rough plate count
    ///
    /// Wasted plates are rounded half-to-even.
    pub fn estimate_by_plate_count(&self, event_type: &str, plate_count: i64) -> EngineResult<PlateEstimate> {
        let plates = non_negative("plate_count", plate_count)?;
        let (resolved, wastage_rate) = lookup_rate(&self.rates.plate_wastage_rates, event_type)?;

        let estimated_wastage = ((plates as f64 * wastage_rate).round_ties_even() as u64).min(plates);

        Ok(PlateEstimate {
            event_type: resolved.to_string(),
            wastage_rate,
            estimated_wastage,
            recommended_plates: plates - estimated_wastage,
        })
    }

    /// Per-item serving wastage for a planned menu, in input order
    pub fn estimate_by_food_items(&self, event_type: &str, items: &[FoodItem]) -> EngineResult<Vec<ItemWastage>> {
        let (_, factor) = lookup_rate(&self.rates.item_wastage_factors, event_type)?;

        items
            .iter()
            .map(|item| {
                if item.serving_size == 0 {
                    return Err(EngineError::invalid(format!(
                        "serving_size for {} must be positive",
                        item.name
                    )));
                }
                let servings = item.quantity as f64 / item.serving_size as f64;
                Ok(ItemWastage {
                    name: item.name.clone(),
                    original_quantity: item.quantity,
                    predicted_wastage: round2(servings * factor),
                    unit: item.unit.clone(),
                })
            })
            .collect()
    }
}

impl EventWastageRequest {
    /// Pick the estimate matching the figures that are known
    pub fn estimate(&self, estimator: &WastageEstimator) -> EngineResult<Estimate> {
        match self.actual_attendees {
            Some(actual) => estimator
                .estimate_by_attendance(&self.event_type, self.expected_attendees, actual)
                .map(Estimate::Attendance),
            None => estimator
                .estimate_by_plate_count(&self.event_type, self.expected_attendees)
                .map(Estimate::PlateCount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> WastageEstimator {
        WastageEstimator::default()
    }

    #[test]
    fn test_wedding_over_prepared() {
        let estimate = estimator().estimate_by_attendance("Wedding", 1000, 800).unwrap();
        assert_eq!(estimate.predicted_quantity, 550.0);
        assert_eq!(estimate.unit, "kg");
        assert!(estimate.basis.over_prepared);
        assert_eq!(estimate.basis.base_rate, 0.5);
        assert_eq!(estimate.basis.multiplier_applied, 1.5);
    }

    #[test]
    fn test_birthday_demand_exceeded() {
        let estimate = estimator().estimate_by_attendance("Birthday", 100, 120).unwrap();
        assert_eq!(estimate.predicted_quantity, 7.2);
        assert!(!estimate.basis.over_prepared);
    }

    #[test]
    fn test_equal_attendance_takes_underprep_branch() {
        for n in [0_i64, 1, 37, 250, 10_000] {
            let estimate = estimator().estimate_by_attendance("Festival", n, n).unwrap();
            assert_eq!(estimate.predicted_quantity, round2(n as f64 * 0.6 * 0.2));
            assert!(!estimate.basis.over_prepared);
        }
    }

    #[test]
    fn test_unknown_event_type_uses_other() {
        let unknown = estimator().estimate_by_attendance("Graduation", 300, 250).unwrap();
        let other = estimator().estimate_by_attendance("Other", 300, 250).unwrap();
        assert_eq!(unknown, other);
        assert_eq!(unknown.basis.event_type, "Other");
    }

    #[test]
    fn test_event_type_case_insensitive() {
        let estimate = estimator().estimate_by_attendance("  wedding ", 10, 10).unwrap();
        assert_eq!(estimate.basis.event_type, "Wedding");
    }

    #[test]
    fn test_negative_attendance_rejected() {
        assert!(matches!(
            estimator().estimate_by_attendance("Wedding", -1, 10),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            estimator().estimate_by_attendance("Wedding", 10, -1),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimates_non_negative_and_two_decimals() {
        let estimator = estimator();
        for event_type in ["Wedding", "Birthday", "Corporate", "Festival", "Other", "Picnic"] {
            for expected in (0..500).step_by(37) {
                for actual in (0..500).step_by(41) {
                    let q = estimator
                        .estimate_by_attendance(event_type, expected, actual)
                        .unwrap()
                        .predicted_quantity;
                    assert!(q >= 0.0);
                    assert!(((q * 100.0).round() - q * 100.0).abs() < 1e-6, "{} has more than 2 decimals", q);
                }
            }
        }
    }

    #[test]
    fn test_plate_count_mode() {
        let estimate = estimator().estimate_by_plate_count("Wedding", 200).unwrap();
        assert_eq!(estimate.estimated_wastage, 30);
        assert_eq!(estimate.recommended_plates, 170);
        assert_eq!(estimate.wastage_rate, 0.15);

        let estimate = estimator().estimate_by_plate_count("Anniversary", 100).unwrap();
        assert_eq!(estimate.event_type, "Other");
        assert_eq!(estimate.estimated_wastage, 12);
        assert_eq!(estimate.recommended_plates, 88);
    }

    #[test]
    fn test_plate_count_rounds_half_to_even() {
        // 5 * 0.5 = 2.5 -> 2, 7 * 0.5 = 3.5 -> 4
        let rates = WastageRates {
            plate_wastage_rates: table(&[("Other", 0.5)]),
            ..WastageRates::default()
        };
        let estimator = WastageEstimator::new(rates).unwrap();
        assert_eq!(estimator.estimate_by_plate_count("Other", 5).unwrap().estimated_wastage, 2);
        assert_eq!(estimator.estimate_by_plate_count("Other", 7).unwrap().estimated_wastage, 4);
    }

    #[test]
    fn test_plate_count_zero_and_negative() {
        let estimate = estimator().estimate_by_plate_count("Festival", 0).unwrap();
        assert_eq!(estimate.estimated_wastage, 0);
        assert_eq!(estimate.recommended_plates, 0);

        assert!(estimator().estimate_by_plate_count("Festival", -3).is_err());
    }

    #[test]
    fn test_food_item_mode() {
        let items = vec![
            FoodItem::new("Biryani", 120),
            FoodItem {
                serving_size: 4,
                unit: "kg".to_string(),
                ..FoodItem::new("Dal", 30)
            },
        ];

        let predictions = estimator().estimate_by_food_items("Party", &items).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].name, "Biryani");
        assert_eq!(predictions[0].predicted_wastage, 24.0);
        assert_eq!(predictions[1].predicted_wastage, 1.5);
        assert_eq!(predictions[1].unit, "kg");
    }

    #[test]
    fn test_food_item_zero_serving_size() {
        let items = vec![FoodItem {
            serving_size: 0,
            ..FoodItem::new("Rice", 10)
        }];
        assert!(estimator().estimate_by_food_items("wedding", &items).is_err());
    }

    #[test]
    fn test_request_dispatch() {
        let estimator = estimator();

        let with_actual = EventWastageRequest {
            event_type: "Wedding".to_string(),
            expected_attendees: 1000,
            actual_attendees: Some(800),
        };
        assert!(matches!(with_actual.estimate(&estimator), Ok(Estimate::Attendance(e)) if e.predicted_quantity == 550.0));

        let without_actual = EventWastageRequest {
            actual_attendees: None,
            ..with_actual
        };
        assert!(matches!(
            without_actual.estimate(&estimator),
            Ok(Estimate::PlateCount(e)) if e.estimated_wastage == 150
        ));
    }

    #[test]
    fn test_injected_rate_table() {
        let rates = WastageRates {
            base_rates: table(&[("Gala", 1.0), ("Other", 0.1)]),
            overprep_multiplier: 2.0,
            underprep_factor: 0.5,
            ..WastageRates::default()
        };
        let estimator = WastageEstimator::new(rates).unwrap();

        assert_eq!(estimator.estimate_by_attendance("Gala", 10, 5).unwrap().predicted_quantity, 15.0);
        assert_eq!(estimator.estimate_by_attendance("Gala", 5, 10).unwrap().predicted_quantity, 5.0);
    }

    #[test]
    fn test_rate_validation() {
        let missing_other = WastageRates {
            base_rates: table(&[("Wedding", 0.5)]),
            ..WastageRates::default()
        };
        assert!(missing_other.validate().is_err());

        let bad_multiplier = WastageRates {
            overprep_multiplier: 0.9,
            ..WastageRates::default()
        };
        assert!(WastageEstimator::new(bad_multiplier).is_err());

        let bad_factor = WastageRates {
            underprep_factor: 1.0,
            ..WastageRates::default()
        };
        assert!(bad_factor.validate().is_err());

        let bad_percentage = WastageRates {
            plate_wastage_rates: table(&[("Other", 1.2)]),
            ..WastageRates::default()
        };
        assert!(bad_percentage.validate().is_err());

        assert!(WastageRates::default().validate().is_ok());
    }
}
