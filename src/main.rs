use std::fs;
use std::process::ExitCode;
use anyhow::{Context, Result};
use log::{error, info};
use cfebill::aggregation::aggregate_parallel;
use cfebill::billing::bill;
use cfebill::config::Config;
use cfebill::initialization::init;
use cfebill::manager_readings::MeterData;
use cfebill::models::report::BillingReport;

fn main() -> ExitCode {
    let config = match init() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads meter data, aggregates it per tariff bucket over the configured window and bills it
///
/// # Arguments
///
/// * 'config' - the loaded configuration
fn run(config: &Config) -> Result<()> {
    let (window_start, window_end) = config.period.window()?;
    let holidays = config.holidays.to_set();

    let meter_data = MeterData::from_file(&config.files.readings_file)?;
    if meter_data.is_empty() {
        anyhow::bail!("no readings with a valid timestamp in {}", config.files.readings_file);
    }
    info!("{} rows loaded, sensor columns {:?}", meter_data.len(), meter_data.columns());
    let (sensor_column, readings) = meter_data.readings(config.period.sensor_column.as_deref())?;
    info!("billing sensor column '{}' from {} to {}", sensor_column, window_start, window_end);

    let stats = aggregate_parallel(&readings, &window_start, &window_end, &holidays, config.general.workers);
    for s in stats.values() {
        info!("{:<12} count {:>6}, sum {:>12.2}, avg {:>8.2}, max {:>8.2}", s.bucket.to_string(), s.count, s.sum, s.average, s.max);
    }

    let invoice = bill(&stats, &config.prices);
    println!("{}", invoice);
    info!("invoice total {}", invoice.total);

    if let Some(report_file) = &config.files.report_file {
        let report = BillingReport {
            sensor_column,
            window_start,
            window_end,
            stats: stats.into_values().collect(),
            invoice,
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(report_file, json)
            .with_context(|| format!("writing report to {}", report_file))?;
        info!("report written to {}", report_file);
    }

    Ok(())
}
