//! Pure percentage-to-kilogram scaling for material requisitions.
//!
//! Operator-entered recipe percentages frequently do not sum to exactly
//! 100; the calculator rescales the whole set so relative ratios are
//! preserved and the computed weights sum to the batch weight within
//! rounding error. This is always a whole-set pass: changing the base
//! weight or any percentage requires re-running it over every component.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ONE_HUNDRED: Decimal = dec!(100);

/// Kilogram results are rounded to 3 decimal places (gram resolution)
const KG_SCALE: u32 = 3;

/// One component's share of a mixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentShare {
    pub material_name: String,
    pub percentage: Decimal,
}

/// Computed weight for one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentWeight {
    pub material_name: String,
    pub normalized_percent: Decimal,
    pub calculated_kg: Decimal,
}

/// Scales a recipe's component shares to a concrete batch weight.
///
/// A zero percentage total is a degenerate but valid state (factor 1,
/// all weights zero), not an error.
pub fn scale_to_batch(components: &[ComponentShare], base_weight_kg: Decimal) -> Vec<ComponentWeight> {
    let total_percent: Decimal = components.iter().map(|c| c.percentage).sum();

    let normalize_factor = if total_percent > Decimal::ZERO {
        ONE_HUNDRED / total_percent
    } else {
        Decimal::ONE
    };

    components
        .iter()
        .map(|component| {
            let normalized_percent = component.percentage * normalize_factor;
            let calculated_kg =
                (normalized_percent / ONE_HUNDRED * base_weight_kg).round_dp(KG_SCALE);
            ComponentWeight {
                material_name: component.material_name.clone(),
                normalized_percent,
                calculated_kg,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(name: &str, pct: Decimal) -> ComponentShare {
        ComponentShare {
            material_name: name.to_string(),
            percentage: pct,
        }
    }

    #[test]
    fn exact_hundred_needs_no_normalization() {
        let weights = scale_to_batch(
            &[share("pp", dec!(60)), share("masterbatch", dec!(40))],
            dec!(50),
        );
        assert_eq!(weights[0].calculated_kg, dec!(30.000));
        assert_eq!(weights[1].calculated_kg, dec!(20.000));
    }

    #[test]
    fn under_hundred_is_scaled_up() {
        // 30+30+30 = 90, factor 100/90: each share normalizes to
        // 33.333...% and gets a third of the 90 kg batch
        let weights = scale_to_batch(
            &[
                share("a", dec!(30)),
                share("b", dec!(30)),
                share("c", dec!(30)),
            ],
            dec!(90),
        );
        for w in &weights {
            assert_eq!(w.calculated_kg, dec!(30.000));
            assert_eq!(w.normalized_percent.round_dp(3), dec!(33.333));
        }
        let total: Decimal = weights.iter().map(|w| w.calculated_kg).sum();
        assert!((total - dec!(90)).abs() <= dec!(0.001));
    }

    #[test]
    fn over_hundred_is_scaled_down() {
        let weights = scale_to_batch(&[share("a", dec!(80)), share("b", dec!(40))], dec!(60));
        // total 120, factor 100/120
        assert_eq!(weights[0].calculated_kg, dec!(40.000));
        assert_eq!(weights[1].calculated_kg, dec!(20.000));
    }

    #[test]
    fn zero_total_yields_all_zero_without_error() {
        let weights = scale_to_batch(
            &[share("a", Decimal::ZERO), share("b", Decimal::ZERO)],
            dec!(500),
        );
        assert_eq!(weights.len(), 2);
        assert!(weights.iter().all(|w| w.calculated_kg == Decimal::ZERO));
    }

    #[test]
    fn empty_component_set_is_valid() {
        assert!(scale_to_batch(&[], dec!(100)).is_empty());
    }

    #[test]
    fn repeated_runs_are_stable() {
        let components = [share("a", dec!(33.3)), share("b", dec!(66.6))];
        let first = scale_to_batch(&components, dec!(250));
        let second = scale_to_batch(&components, dec!(250));
        assert_eq!(first, second);
    }

    #[test]
    fn relative_ratios_survive_normalization() {
        // 2:1 ratio entered as 40/20 (sums to 60)
        let weights = scale_to_batch(&[share("a", dec!(40)), share("b", dec!(20))], dec!(90));
        assert_eq!(weights[0].calculated_kg, dec!(60.000));
        assert_eq!(weights[1].calculated_kg, dec!(30.000));
    }
}
