use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::aggregation::{BucketStats, TariffStats};
use crate::models::invoice::Invoice;
use crate::models::price_schedule::PriceSchedule;
use crate::tariff::TariffBucket;

/// Days assumed in a billing period regardless of the actual window
pub const DAYS_IN_PERIOD: u32 = 30;

/// Load factor used in the distribution demand formula
pub const LOAD_FACTOR: Decimal = Decimal::from_parts(57, 0, 0, false, 2);

/// Value added tax rate
pub const VAT_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

/// Rounds to two decimals, half away from zero
///
/// # Arguments
///
/// * 'value' - the value to round
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes an itemized invoice from tariff statistics and prices.
///
/// Every amount is rounded to two decimals as soon as it is computed, and every later amount
/// is computed from the rounded values. Buckets missing in the statistics count as zero.
///
/// # Arguments
///
/// * 'stats' - aggregated statistics per tariff bucket
/// * 'prices' - the price schedule to bill with
pub fn bill(stats: &TariffStats, prices: &PriceSchedule) -> Invoice {
    let get = |bucket: TariffBucket| -> BucketStats {
        stats.get(&bucket).copied().unwrap_or_else(|| BucketStats::empty(bucket))
    };
    let base = get(TariffBucket::Base);
    let intermediate = get(TariffBucket::Intermediate);
    let peak = get(TariffBucket::Peak);

    let mut inv = Invoice { days_in_period: DAYS_IN_PERIOD, ..Default::default() };

    inv.kwh_base = round2(base.sum);
    inv.kwh_intermediate = round2(intermediate.sum);
    inv.kwh_peak = round2(peak.sum);

    inv.max_base = round2(base.max);
    inv.max_intermediate = round2(intermediate.max);
    inv.max_peak = round2(peak.max);

    inv.billable_demand = round2(inv.max_base.max(inv.max_intermediate).max(inv.max_peak));

    let total_consumption = inv.kwh_base + inv.kwh_intermediate + inv.kwh_peak;
    let hours = Decimal::from(24 * DAYS_IN_PERIOD) * LOAD_FACTOR;
    let distribution_formula = total_consumption / hours;
    inv.distribution_demand = round2(inv.max_peak.min(distribution_formula));
    debug!("distribution formula {} capped by max peak {}", distribution_formula, inv.max_peak);

    inv.cost_base = round2(inv.kwh_base * prices.base);
    inv.cost_intermediate = round2(inv.kwh_intermediate * prices.intermediate);
    inv.cost_peak = round2(inv.kwh_peak * prices.peak);
    inv.cost_capacity = round2(inv.billable_demand * prices.capacity);
    inv.cost_distribution = round2(inv.distribution_demand * prices.distribution);

    inv.energy_total = round2(
        inv.cost_base + inv.cost_intermediate + inv.cost_peak + inv.cost_capacity + inv.cost_distribution
    );
    inv.fixed_charge = round2(prices.fixed_charge);
    inv.subtotal = round2(inv.energy_total + inv.fixed_charge);

    inv.street_light_levy = if prices.include_street_light_levy {
        round2(inv.subtotal * (prices.street_light_levy_percent / Decimal::ONE_HUNDRED))
    } else {
        Decimal::ZERO
    };
    inv.subtotal_with_levy = round2(inv.subtotal + inv.street_light_levy);

    inv.vat = round2(inv.subtotal_with_levy * VAT_RATE);
    inv.total = round2(inv.subtotal_with_levy + inv.vat);

    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::aggregation::empty_stats;

    fn stats(values: [(TariffBucket, Decimal, Decimal); 3]) -> TariffStats {
        values.iter()
            .map(|&(bucket, sum, max)| {
                (bucket, BucketStats { bucket, count: 1, sum, average: sum, max })
            })
            .collect()
    }

    fn scenario() -> TariffStats {
        stats([
            (TariffBucket::Base, dec!(1000), dec!(10)),
            (TariffBucket::Intermediate, dec!(2000), dec!(15)),
            (TariffBucket::Peak, dec!(500), dec!(20)),
        ])
    }

    #[test]
    fn default_prices() {
        let p = PriceSchedule::default();
        assert_eq!(p.base, dec!(1.20));
        assert_eq!(p.intermediate, dec!(1.98));
        assert_eq!(p.peak, dec!(2.32));
        assert_eq!(p.capacity, dec!(367.15));
        assert_eq!(p.distribution, dec!(100.00));
        assert_eq!(p.fixed_charge, dec!(563.57));
        assert!(!p.include_street_light_levy);
        assert_eq!(p.street_light_levy_percent, dec!(2.0));
    }

    #[test]
    fn end_to_end_scenario() {
        let inv = bill(&scenario(), &PriceSchedule::default());

        assert_eq!(inv.days_in_period, 30);
        assert_eq!(inv.kwh_base, dec!(1000));
        assert_eq!(inv.kwh_intermediate, dec!(2000));
        assert_eq!(inv.kwh_peak, dec!(500));
        assert_eq!(inv.billable_demand, dec!(20));
        assert_eq!(inv.distribution_demand, dec!(8.53));
        assert_eq!(inv.cost_base, dec!(1200.00));
        assert_eq!(inv.cost_intermediate, dec!(3960.00));
        assert_eq!(inv.cost_peak, dec!(1160.00));
        assert_eq!(inv.cost_capacity, dec!(7343.00));
        assert_eq!(inv.cost_distribution, dec!(853.00));
        assert_eq!(inv.energy_total, dec!(14516.00));
        assert_eq!(inv.fixed_charge, dec!(563.57));
        assert_eq!(inv.subtotal, dec!(15079.57));
        assert_eq!(inv.street_light_levy, dec!(0));
        assert_eq!(inv.subtotal_with_levy, dec!(15079.57));
        assert_eq!(inv.vat, dec!(2412.73));
        assert_eq!(inv.total, dec!(17492.30));
    }

    #[test]
    fn street_light_levy_is_applied_before_vat() {
        let prices = PriceSchedule { include_street_light_levy: true, ..Default::default() };
        let inv = bill(&scenario(), &prices);

        assert_eq!(inv.subtotal, dec!(15079.57));
        assert_eq!(inv.street_light_levy, dec!(301.59));
        assert_eq!(inv.subtotal_with_levy, dec!(15381.16));
        assert_eq!(inv.vat, dec!(2460.99));
        assert_eq!(inv.total, dec!(17842.15));
    }

    #[test]
    fn empty_stats_bill_only_fixed_charge() {
        let prices = PriceSchedule::default();
        let expected = round2(prices.fixed_charge * dec!(1.16));

        let inv = bill(&empty_stats(), &prices);
        assert_eq!(inv.energy_total, dec!(0));
        assert_eq!(inv.billable_demand, dec!(0));
        assert_eq!(inv.distribution_demand, dec!(0));
        assert_eq!(inv.vat, dec!(90.17));
        assert_eq!(inv.total, expected);
        assert_eq!(inv.total, dec!(653.74));

        assert_eq!(bill(&TariffStats::new(), &prices), inv);
    }

    #[test]
    fn distribution_demand_is_capped_by_max_peak() {
        let s = stats([
            (TariffBucket::Base, dec!(1000), dec!(10)),
            (TariffBucket::Intermediate, dec!(2000), dec!(15)),
            (TariffBucket::Peak, dec!(500), dec!(3.456)),
        ]);
        let inv = bill(&s, &PriceSchedule::default());
        assert_eq!(inv.max_peak, dec!(3.46));
        assert_eq!(inv.distribution_demand, dec!(3.46));
        assert_eq!(inv.billable_demand, dec!(15));
    }

    #[test]
    fn rounding_cascades_through_later_steps() {
        // 1.125 kWh rounds to 1.13 before pricing, giving 1.356 -> 1.36 rather than 1.35
        let s = stats([
            (TariffBucket::Base, dec!(1.125), dec!(0)),
            (TariffBucket::Intermediate, dec!(0), dec!(0)),
            (TariffBucket::Peak, dec!(0), dec!(0)),
        ]);
        let inv = bill(&s, &PriceSchedule::default());
        assert_eq!(inv.kwh_base, dec!(1.13));
        assert_eq!(inv.cost_base, dec!(1.36));
    }

    #[test]
    fn round2_is_half_up_and_idempotent() {
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
        assert_eq!(round2(dec!(-2.345)), dec!(-2.35));
        for v in [dec!(8.53), dec!(17492.30), dec!(0.01), dec!(-4.10)] {
            assert_eq!(round2(round2(v)), round2(v));
            assert_eq!(round2(v), v);
        }
    }
}
