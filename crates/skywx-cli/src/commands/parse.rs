use chrono::NaiveDate;
use skywx_core::error::SkywxError;
use skywx_core::model::ReportType;
use skywx_core::units::UnitPolicy;
use skywx_core::ParseOptions;
use std::path::PathBuf;

use super::registry;
use crate::output;

pub struct ParseArgs {
    pub reports: Vec<String>,
    pub file: Option<PathBuf>,
    pub report_type: Option<ReportType>,
    pub date: Option<NaiveDate>,
    pub require_station: bool,
    pub strict_units: bool,
    pub stations: Option<PathBuf>,
    pub output: String,
}

pub fn run(args: ParseArgs) -> Result<(), SkywxError> {
    let registry = registry(args.stations.as_deref())?;

    let mut texts = args.reports;
    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)?;
        texts.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    if texts.is_empty() {
        return Err(SkywxError::EmptyReport);
    }

    let mut options = ParseOptions::default().with_require_station(args.require_station);
    if let Some(report_type) = args.report_type {
        options = options.with_report_type(report_type);
    }
    if let Some(date) = args.date {
        options = options.with_reference_date(date);
    }
    if args.strict_units {
        options = options.with_unit_policy(UnitPolicy::Refuse);
    }

    // A single report fails the command; in a batch each failure is reported in place
    if texts.len() == 1 {
        let report = skywx_core::parse_report(&texts[0], &options, Some(&registry))?;
        return match args.output.as_str() {
            "json" => output::json::print(&report),
            _ => {
                output::table::print_report(&report);
                Ok(())
            }
        };
    }

    let results = skywx_core::parse_batch(&texts, &options, Some(&registry));
    match args.output.as_str() {
        "json" => output::json::print_batch(&results),
        _ => {
            for (i, (text, result)) in texts.iter().zip(&results).enumerate() {
                if i > 0 {
                    println!();
                }
                match result {
                    Ok(report) => output::table::print_report(report),
                    Err(e) => println!("{text}\n  Error: {e}"),
                }
            }
            Ok(())
        }
    }
}
