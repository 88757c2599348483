//! Position enrichment. Pure given its inputs: re-running with the same raw
//! positions, ledger and momentum map reproduces identical output.

use std::collections::HashMap;

use num_traits::Zero;
use rust_decimal::Decimal;

use super::positions_model::{DepotSummary, Position, RawPosition};
use crate::constants::{PRICE_DECIMAL_PRECISION, VALUE_DECIMAL_PRECISION};
use crate::dividends::dividends_model::DividendRecord;
use crate::metadata::MetadataRegistryTrait;

/// Flattens raw positions, applies the rounding policy, left-joins dividend
/// totals by WKN and derives performance and allocation percentages.
pub fn enrich_positions(
    raw: &[RawPosition],
    ledger: &[DividendRecord],
    momentum: &HashMap<String, Decimal>,
    registry: &dyn MetadataRegistryTrait,
) -> Vec<Position> {
    let dividend_totals = total_dividends_by_wkn(ledger);

    let rounded: Vec<(Decimal, Decimal)> = raw
        .iter()
        .map(|p| {
            (
                p.current_value.value.round_dp(VALUE_DECIMAL_PRECISION),
                p.purchase_value.value.round_dp(VALUE_DECIMAL_PRECISION),
            )
        })
        .collect();
    let depot_total: Decimal = rounded.iter().map(|(cv, _)| *cv).sum();

    raw.iter()
        .zip(rounded)
        .map(|(p, (current_value, purchase_value))| {
            let absolute_gain_loss =
                (current_value - purchase_value).round_dp(PRICE_DECIMAL_PRECISION);
            // Zero cost basis: divide by 1 instead of failing the row
            let divisor = if purchase_value.is_zero() {
                Decimal::ONE
            } else {
                purchase_value
            };
            let performance_pct = ((current_value - purchase_value) / divisor
                * Decimal::ONE_HUNDRED)
                .round_dp(PRICE_DECIMAL_PRECISION);
            let percentage_in_depot = if depot_total > Decimal::ZERO {
                Some(
                    (current_value / depot_total * Decimal::ONE_HUNDRED)
                        .round_dp(PRICE_DECIMAL_PRECISION),
                )
            } else {
                None
            };

            Position {
                name: registry.name_for(&p.wkn),
                count: p.quantity.value.round_dp(PRICE_DECIMAL_PRECISION),
                purchase_price: p.purchase_price.value.round_dp(PRICE_DECIMAL_PRECISION),
                purchase_value,
                current_price: p
                    .current_price
                    .price
                    .value
                    .round_dp(PRICE_DECIMAL_PRECISION),
                current_value,
                absolute_gain_loss,
                performance_pct,
                percentage_in_depot,
                total_dividends: dividend_totals.get(&p.wkn).copied(),
                momentum_3m: momentum.get(&p.wkn).copied(),
                wkn: p.wkn.clone(),
            }
        })
        .collect()
}

/// Depot-wide totals. A depot with zero cost basis reports 0 performance,
/// which differs from the per-position divisor guard on purpose.
pub fn summarize(positions: &[Position]) -> DepotSummary {
    let total_value: Decimal = positions.iter().map(|p| p.current_value).sum();
    let total_cost: Decimal = positions.iter().map(|p| p.purchase_value).sum();
    let performance_pct = if total_cost > Decimal::ZERO {
        (total_value - total_cost) / total_cost * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    DepotSummary {
        total_value: total_value.round_dp(PRICE_DECIMAL_PRECISION),
        total_cost: total_cost.round_dp(PRICE_DECIMAL_PRECISION),
        performance_pct: performance_pct.round_dp(PRICE_DECIMAL_PRECISION),
    }
}

fn total_dividends_by_wkn(ledger: &[DividendRecord]) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for record in ledger {
        if let Some(wkn) = &record.wkn {
            *totals.entry(wkn.clone()).or_insert_with(Decimal::zero) += record.amount;
        }
    }
    totals
        .into_iter()
        .map(|(wkn, total)| (wkn, total.round_dp(VALUE_DECIMAL_PRECISION)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataRegistry;
    use crate::positions::positions_model::{CurrentPrice, UnitValue};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn raw(wkn: &str, count: Decimal, pp: Decimal, pv: Decimal, cp: Decimal, cv: Decimal) -> RawPosition {
        RawPosition {
            wkn: wkn.into(),
            quantity: UnitValue {
                value: count,
                unit: None,
            },
            purchase_price: UnitValue {
                value: pp,
                unit: Some("EUR".into()),
            },
            purchase_value: UnitValue {
                value: pv,
                unit: Some("EUR".into()),
            },
            current_price: CurrentPrice {
                price: UnitValue {
                    value: cp,
                    unit: Some("EUR".into()),
                },
                price_date_time: None,
            },
            current_value: UnitValue {
                value: cv,
                unit: Some("EUR".into()),
            },
        }
    }

    fn dividend(wkn: &str, amount: Decimal) -> DividendRecord {
        DividendRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount,
            company: "Example".into(),
            wkn: Some(wkn.into()),
            shares: None,
            div_per_share: None,
        }
    }

    fn empty_registry() -> MetadataRegistry {
        MetadataRegistry::from_entries(vec![])
    }

    #[test]
    fn applies_display_rounding_policy() {
        let raw = vec![raw(
            "A1B2C3",
            dec!(15.4567),
            dec!(81.333),
            dec!(1256.78),
            dec!(103.4567),
            dec!(1594.49),
        )];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());

        let p = &positions[0];
        assert_eq!(p.count, dec!(15.46));
        assert_eq!(p.purchase_price, dec!(81.33));
        assert_eq!(p.purchase_value, dec!(1257));
        assert_eq!(p.current_price, dec!(103.46));
        assert_eq!(p.current_value, dec!(1594));
        assert_eq!(p.absolute_gain_loss, dec!(337.00));
    }

    #[test]
    fn performance_uses_rounded_values() {
        let raw = vec![raw(
            "A1B2C3",
            dec!(10),
            dec!(100),
            dec!(1000),
            dec!(120),
            dec!(1200),
        )];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());
        assert_eq!(positions[0].performance_pct, dec!(20.00));
    }

    #[test]
    fn zero_cost_position_divides_by_one() {
        let raw = vec![raw("FREE00", dec!(1), dec!(0), dec!(0), dec!(50), dec!(50))];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());
        // (50 - 0) / 1 * 100
        assert_eq!(positions[0].performance_pct, dec!(5000.00));
    }

    #[test]
    fn depot_percentages_sum_to_one_hundred() {
        let raw = vec![
            raw("AAA111", dec!(1), dec!(1), dec!(100), dec!(1), dec!(333)),
            raw("BBB222", dec!(1), dec!(1), dec!(100), dec!(1), dec!(333)),
            raw("CCC333", dec!(1), dec!(1), dec!(100), dec!(1), dec!(334)),
        ];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());

        let total: Decimal = positions
            .iter()
            .map(|p| p.percentage_in_depot.unwrap())
            .sum();
        assert!((total - dec!(100)).abs() <= dec!(0.05), "sum was {}", total);
    }

    #[test]
    fn empty_depot_leaves_percentage_unset() {
        let raw = vec![raw("AAA111", dec!(1), dec!(1), dec!(10), dec!(0), dec!(0))];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());
        assert_eq!(positions[0].percentage_in_depot, None);
    }

    #[test]
    fn dividends_join_by_wkn_and_absence_differs_from_zero() {
        let raw = vec![
            raw("A1B2C3", dec!(10), dec!(10), dec!(100), dec!(12), dec!(120)),
            raw("NODIV0", dec!(5), dec!(20), dec!(100), dec!(22), dec!(110)),
        ];
        let ledger = vec![
            dividend("A1B2C3", dec!(12.34)),
            dividend("A1B2C3", dec!(13.50)),
            dividend("OTHER1", dec!(99.00)),
        ];
        let positions = enrich_positions(&raw, &ledger, &HashMap::new(), &empty_registry());

        // 12.34 + 13.50 = 25.84, rounded to whole euros
        assert_eq!(positions[0].total_dividends, Some(dec!(26)));
        assert_eq!(positions[1].total_dividends, None);
    }

    #[test]
    fn momentum_joins_by_wkn() {
        let raw = vec![
            raw("A1B2C3", dec!(10), dec!(10), dec!(100), dec!(12), dec!(120)),
            raw("NOMOM0", dec!(1), dec!(10), dec!(10), dec!(12), dec!(12)),
        ];
        let momentum = HashMap::from([("A1B2C3".to_string(), dec!(0.0815))]);
        let positions = enrich_positions(&raw, &[], &momentum, &empty_registry());

        assert_eq!(positions[0].momentum_3m, Some(dec!(0.0815)));
        assert_eq!(positions[1].momentum_3m, None);
    }

    #[test]
    fn summary_totals_and_zero_cost_guard() {
        let raw = vec![
            raw("AAA111", dec!(1), dec!(1), dec!(500), dec!(1), dec!(600)),
            raw("BBB222", dec!(1), dec!(1), dec!(500), dec!(1), dec!(550)),
        ];
        let positions = enrich_positions(&raw, &[], &HashMap::new(), &empty_registry());
        let summary = summarize(&positions);
        assert_eq!(summary.total_value, dec!(1150.00));
        assert_eq!(summary.total_cost, dec!(1000.00));
        assert_eq!(summary.performance_pct, dec!(15.00));

        assert_eq!(summarize(&[]), DepotSummary::default());
    }
}
