pub mod error;
pub mod model;
pub mod parsing;
pub mod station;
pub mod units;

use chrono::NaiveDate;
use error::SkywxError;
use model::{ReportType, StructuredReport};
use rayon::prelude::*;
use station::StationRegistry;
use tracing::debug;
use units::UnitPolicy;

/// Knobs for [`parse_report`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Skip report type detection.
    pub report_type: Option<ReportType>,
    pub unit_policy: UnitPolicy,
    /// Fail with [`SkywxError::StationNotFound`] when the station code is unknown.
    pub require_station: bool,
    /// Resolve day/hour groups to calendar times around this date.
    pub reference_date: Option<NaiveDate>,
}

impl ParseOptions {
    pub fn with_report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = Some(report_type);
        self
    }

    pub fn with_unit_policy(mut self, policy: UnitPolicy) -> Self {
        self.unit_policy = policy;
        self
    }

    pub fn with_require_station(mut self, require: bool) -> Self {
        self.require_station = require;
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }
}

/// Main API entry point: decode one METAR or TAF.
///
/// Only an empty input, an unrecognizable header, or (with
/// `require_station`) an unknown station fail. Every other problem is
/// recorded in the report's completeness flag.
pub fn parse_report(
    text: &str,
    options: &ParseOptions,
    registry: Option<&StationRegistry>,
) -> Result<StructuredReport, SkywxError> {
    // Repair transcription noise
    let sanitized = parsing::sanitize::sanitize(text);

    // Split into classified tokens and locate the header
    let raw = parsing::tokenize::tokenize(text, &sanitized, options.report_type)?;

    // Resolve the reporting station
    let station = registry.and_then(|r| r.by_code(raw.station_code()));
    if station.is_none() {
        if options.require_station {
            return Err(SkywxError::StationNotFound(raw.station_code().to_string()));
        }
        debug!(code = raw.station_code(), "station not in registry");
    }

    // Parse fields, periods and remarks
    Ok(parsing::assemble(raw, station, options))
}

/// Decode many reports in parallel. Results keep the input order.
pub fn parse_batch<S>(
    texts: &[S],
    options: &ParseOptions,
    registry: Option<&StationRegistry>,
) -> Vec<Result<StructuredReport, SkywxError>>
where
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| parse_report(text.as_ref(), options, registry))
        .collect()
}
