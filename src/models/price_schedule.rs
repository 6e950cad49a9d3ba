use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices used when billing, any field left out when deserializing gets its default value
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PriceSchedule {
    /// Currency per kWh in the Base period
    pub base: Decimal,
    /// Currency per kWh in the Intermediate period
    pub intermediate: Decimal,
    /// Currency per kWh in the Peak period
    pub peak: Decimal,
    /// Currency per kW of billable demand
    pub capacity: Decimal,
    /// Currency per kW of distribution demand
    pub distribution: Decimal,
    pub fixed_charge: Decimal,
    pub include_street_light_levy: bool,
    /// Percent of subtotal, e.g. 2.0 for 2%
    pub street_light_levy_percent: Decimal,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        PriceSchedule {
            base: Decimal::new(120, 2),
            intermediate: Decimal::new(198, 2),
            peak: Decimal::new(232, 2),
            capacity: Decimal::new(36715, 2),
            distribution: Decimal::new(10000, 2),
            fixed_charge: Decimal::new(56357, 2),
            include_street_light_levy: false,
            street_light_levy_percent: Decimal::new(20, 1),
        }
    }
}
