use std::fmt;
use std::fmt::Formatter;
use rust_decimal::Decimal;
use serde::Serialize;

/// Itemized bill, every amount rounded to two decimals
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Invoice {
    pub days_in_period: u32,

    pub kwh_base: Decimal,
    pub kwh_intermediate: Decimal,
    pub kwh_peak: Decimal,

    pub max_base: Decimal,
    pub max_intermediate: Decimal,
    pub max_peak: Decimal,
    pub billable_demand: Decimal,
    pub distribution_demand: Decimal,

    pub cost_base: Decimal,
    pub cost_intermediate: Decimal,
    pub cost_peak: Decimal,
    pub cost_capacity: Decimal,
    pub cost_distribution: Decimal,
    pub energy_total: Decimal,
    pub fixed_charge: Decimal,
    pub subtotal: Decimal,
    pub street_light_levy: Decimal,
    pub subtotal_with_levy: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "{:=<48}", "Invoice ")?;
        writeln!(f, "Days in period          {:>24}", self.days_in_period)?;
        writeln!(f, "{:-<48}", "Consumption (kWh) ")?;
        writeln!(f, "Base                    {:>24.2}", self.kwh_base)?;
        writeln!(f, "Intermediate            {:>24.2}", self.kwh_intermediate)?;
        writeln!(f, "Peak                    {:>24.2}", self.kwh_peak)?;
        writeln!(f, "{:-<48}", "Demand (kW) ")?;
        writeln!(f, "Max Base                {:>24.2}", self.max_base)?;
        writeln!(f, "Max Intermediate        {:>24.2}", self.max_intermediate)?;
        writeln!(f, "Max Peak                {:>24.2}", self.max_peak)?;
        writeln!(f, "Billable                {:>24.2}", self.billable_demand)?;
        writeln!(f, "Distribution            {:>24.2}", self.distribution_demand)?;
        writeln!(f, "{:-<48}", "Charges ")?;
        writeln!(f, "Base                    {:>24.2}", self.cost_base)?;
        writeln!(f, "Intermediate            {:>24.2}", self.cost_intermediate)?;
        writeln!(f, "Peak                    {:>24.2}", self.cost_peak)?;
        writeln!(f, "Capacity                {:>24.2}", self.cost_capacity)?;
        writeln!(f, "Distribution            {:>24.2}", self.cost_distribution)?;
        writeln!(f, "Energy                  {:>24.2}", self.energy_total)?;
        writeln!(f, "Fixed charge            {:>24.2}", self.fixed_charge)?;
        writeln!(f, "Subtotal                {:>24.2}", self.subtotal)?;
        writeln!(f, "Street light levy       {:>24.2}", self.street_light_levy)?;
        writeln!(f, "Subtotal with levy      {:>24.2}", self.subtotal_with_levy)?;
        writeln!(f, "VAT                     {:>24.2}", self.vat)?;
        write!(f, "Total                   {:>24.2}", self.total)
    }
}
