//! Price reconciliation.
//!
//! A product carries a full `price` plus an optional discount percentage and
//! an optional discounted price. Callers normally supply one of the two; the
//! reconciler derives the other before the record is written.
//!
//! Neither candidate computation can fail loudly. A missing operand, a zero
//! price used as a divisor, or a result that cannot be stored as a
//! non-negative amount simply makes that candidate unavailable, and
//! resolution falls through to the next rule.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use storefront_core::DomainError;

/// How conflicting or missing discount inputs are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Priority rules of the legacy catalog, kept for compatibility:
    /// a supplied discount always wins and is left untouched, and a product
    /// with no discount information keeps `discount = None`.
    ///
    /// Unlike the legacy code, a derived value of zero counts as available:
    /// a 100% discount commits `discounted_price = 0` (legacy: full price),
    /// and a discounted price equal to the price commits `discount = 0`
    /// (legacy: `None`).
    #[default]
    Faithful,
    /// Always commit a pair satisfying
    /// `discounted_price = price * (1 - discount / 100)`.
    Corrected,
}

impl ReconcileMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReconcileMode::Faithful => "faithful",
            ReconcileMode::Corrected => "corrected",
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcileMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "faithful" => Ok(ReconcileMode::Faithful),
            "corrected" => Ok(ReconcileMode::Corrected),
            other => Err(DomainError::validation(format!(
                "unknown reconcile mode '{other}' (expected 'faithful' or 'corrected')"
            ))),
        }
    }
}

/// Pricing fields as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceInput {
    pub price: u64,
    pub discount: Option<f64>,
    pub discounted_price: Option<u64>,
}

/// Pricing fields to commit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reconciled {
    pub discount: Option<f64>,
    pub discounted_price: u64,
}

/// Derived amounts are snapped to a millionth of a unit before they are
/// truncated or rounded, so `x.9999999995` stores as `x + 1`.
const AMOUNT_SCALE: f64 = 1e6;

fn snap(value: f64) -> f64 {
    (value * AMOUNT_SCALE).round() / AMOUNT_SCALE
}

/// `price - price * discount / 100`, if it is a storable amount.
fn price_after_discount(price: u64, discount: Option<f64>) -> Option<f64> {
    let discount = discount?;
    let price = price as f64;
    let value = snap(price - price * discount / 100.0);
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `(price - discounted_price) / price * 100`, unless `price` is zero.
fn percentage_off(price: u64, discounted_price: Option<u64>) -> Option<f64> {
    let discounted_price = discounted_price?;
    if price == 0 {
        return None;
    }
    let price = price as f64;
    let value = (price - discounted_price as f64) / price * 100.0;
    value.is_finite().then_some(value)
}

/// Derive a consistent `(discount, discounted_price)` pair.
pub fn reconcile(input: PriceInput, mode: ReconcileMode) -> Reconciled {
    let by_discount = price_after_discount(input.price, input.discount);
    let by_price = input
        .discounted_price
        .and_then(|dp| percentage_off(input.price, Some(dp)).map(|pct| (pct, dp)));

    tracing::trace!(
        price = input.price,
        discount = ?input.discount,
        discounted_price = ?input.discounted_price,
        candidate_price = ?by_discount,
        candidate_discount = ?by_price.map(|(pct, _)| pct),
        %mode,
        "reconciling product price"
    );

    match mode {
        ReconcileMode::Faithful => match (by_discount, by_price) {
            // The derived price wins whether or not a percentage could also be
            // derived; the supplied discount is kept as-is.
            (Some(derived), _) => Reconciled {
                discount: input.discount,
                discounted_price: derived.trunc() as u64,
            },
            (None, Some((pct, discounted_price))) => Reconciled {
                discount: Some(pct),
                discounted_price,
            },
            (None, None) => Reconciled {
                discount: input.discount,
                discounted_price: input.price,
            },
        },
        ReconcileMode::Corrected => match (by_discount, by_price) {
            (Some(derived), _) => Reconciled {
                discount: input.discount,
                discounted_price: derived.round() as u64,
            },
            (None, Some((pct, discounted_price))) => Reconciled {
                discount: Some(pct),
                discounted_price,
            },
            (None, None) => Reconciled {
                discount: Some(0.0),
                discounted_price: input.price,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(price: u64, discount: Option<f64>, discounted_price: Option<u64>) -> PriceInput {
        PriceInput {
            price,
            discount,
            discounted_price,
        }
    }

    #[test]
    fn discount_only_derives_discounted_price() {
        let out = reconcile(input(1000, Some(10.0), None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 900);
        assert_eq!(out.discount, Some(10.0));
    }

    #[test]
    fn discounted_price_only_derives_percentage() {
        let out = reconcile(input(1000, None, Some(800)), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 800);
        assert_eq!(out.discount, Some(20.0));
    }

    #[test]
    fn nothing_supplied_falls_back_to_full_price() {
        let out = reconcile(input(1000, None, None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 1000);
        assert_eq!(out.discount, None);
    }

    #[test]
    fn both_supplied_derived_price_wins_and_discount_is_kept() {
        let out = reconcile(input(1000, Some(10.0), Some(800)), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 900);
        assert_eq!(out.discount, Some(10.0));
    }

    #[test]
    fn zero_price_suppresses_division_and_uses_full_price() {
        let out = reconcile(input(0, None, Some(500)), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 0);
        assert_eq!(out.discount, None);
    }

    #[test]
    fn faithful_truncates_fractional_prices() {
        // 999 * 0.85 = 849.15
        let out = reconcile(input(999, Some(15.0), None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 849);
        // 999 * 0.5 = 499.5
        let out = reconcile(input(999, Some(50.0), None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 499);
    }

    #[test]
    fn full_discount_is_still_available() {
        let out = reconcile(input(1000, Some(100.0), None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 0);
        assert_eq!(out.discount, Some(100.0));
    }

    #[test]
    fn discount_over_hundred_is_unavailable() {
        let out = reconcile(input(1000, Some(150.0), None), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 1000);
        assert_eq!(out.discount, Some(150.0));
    }

    #[test]
    fn non_finite_discount_is_unavailable() {
        let out = reconcile(input(1000, Some(f64::NAN), Some(750)), ReconcileMode::Faithful);
        assert_eq!(out.discounted_price, 750);
        assert_eq!(out.discount, Some(25.0));
    }

    #[test]
    fn resave_keeps_merchant_discounted_price() {
        for (price, discounted_price) in [(6, 1), (4_668_877, 838_864)] {
            let first = reconcile(input(price, None, Some(discounted_price)), ReconcileMode::Faithful);
            let again = reconcile(
                input(price, first.discount, Some(first.discounted_price)),
                ReconcileMode::Faithful,
            );
            assert_eq!(again.discounted_price, discounted_price);
            assert_eq!(again.discount, first.discount);
        }
    }

    #[test]
    fn corrected_mode_records_explicit_zero_discount() {
        let out = reconcile(input(1000, None, None), ReconcileMode::Corrected);
        assert_eq!(out.discounted_price, 1000);
        assert_eq!(out.discount, Some(0.0));
    }

    #[test]
    fn corrected_mode_rounds_to_nearest_unit() {
        let out = reconcile(input(999, Some(50.0), None), ReconcileMode::Corrected);
        assert_eq!(out.discounted_price, 500);
    }

    #[test]
    fn corrected_mode_handles_zero_price() {
        let out = reconcile(input(0, None, Some(500)), ReconcileMode::Corrected);
        assert_eq!(out.discounted_price, 0);
        assert_eq!(out.discount, Some(0.0));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Corrected".parse::<ReconcileMode>().unwrap(), ReconcileMode::Corrected);
        assert_eq!(" faithful ".parse::<ReconcileMode>().unwrap(), ReconcileMode::Faithful);
        assert!(matches!(
            "strict".parse::<ReconcileMode>(),
            Err(DomainError::Validation(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a valid percentage never yields more than the full price.
            #[test]
            fn discounted_price_never_exceeds_price(
                price in 0u64..10_000_000,
                discount in 0.0f64..=100.0,
                mode in prop_oneof![Just(ReconcileMode::Faithful), Just(ReconcileMode::Corrected)],
            ) {
                let out = reconcile(input(price, Some(discount), None), mode);
                prop_assert!(out.discounted_price <= price);
                prop_assert_eq!(out.discount, Some(discount));
            }

            /// Property: corrected mode always commits a consistent pair.
            #[test]
            fn corrected_pairs_satisfy_invariant(
                price in 0u64..10_000_000,
                discount in proptest::option::of(0.0f64..=100.0),
                discounted_price in proptest::option::of(0u64..10_000_000),
            ) {
                let out = reconcile(input(price, discount, discounted_price), ReconcileMode::Corrected);
                let pct = out.discount.expect("corrected mode always sets a discount");
                let expected = price as f64 * (1.0 - pct / 100.0);
                prop_assert!((out.discounted_price as f64 - expected).abs() <= 0.5 + 1e-6 * price as f64);
            }

            /// Property: reconciling twice changes nothing the second time.
            #[test]
            fn reconcile_is_idempotent_for_discount_input(
                price in 0u64..10_000_000,
                discount in 0.0f64..=100.0,
            ) {
                let first = reconcile(input(price, Some(discount), None), ReconcileMode::Faithful);
                let second = reconcile(
                    input(price, first.discount, Some(first.discounted_price)),
                    ReconcileMode::Faithful,
                );
                prop_assert_eq!(first, second);
            }

            /// Property: a discounted price survives being saved again, in
            /// either mode, after it has been turned into a percentage.
            #[test]
            fn reconcile_is_idempotent_for_discounted_price_input(
                price in 0u64..10_000_000,
                seed in any::<u64>(),
                mode in prop_oneof![Just(ReconcileMode::Faithful), Just(ReconcileMode::Corrected)],
            ) {
                let discounted_price = seed % (price + 1);
                let first = reconcile(input(price, None, Some(discounted_price)), mode);
                let second = reconcile(
                    input(price, first.discount, Some(first.discounted_price)),
                    mode,
                );
                prop_assert_eq!(first, second);
                if price > 0 {
                    prop_assert_eq!(second.discounted_price, discounted_price);
                }
            }
        }
    }
}
