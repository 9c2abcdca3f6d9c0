use skywx_core::error::SkywxError;
use skywx_core::station::{Coordinate, StationFilter};
use std::path::PathBuf;

use super::registry;
use crate::output;

pub fn lookup(stations: Option<PathBuf>, code: &str, output_format: &str) -> Result<(), SkywxError> {
    let registry = registry(stations.as_deref())?;
    let station = registry
        .by_code(code)
        .ok_or_else(|| SkywxError::StationNotFound(code.to_uppercase()))?;

    match output_format {
        "json" => output::json::print(&station),
        _ => {
            output::table::print_station(&station);
            Ok(())
        }
    }
}

pub fn nearest(
    stations: Option<PathBuf>,
    latitude: f64,
    longitude: f64,
    limit: usize,
    filter: StationFilter,
    output_format: &str,
) -> Result<(), SkywxError> {
    let coord = Coordinate::new(latitude, longitude)?;
    let registry = registry(stations.as_deref())?;
    let found = registry.nearby(coord, limit, filter);

    match output_format {
        "json" => output::json::print(&found),
        _ => {
            output::table::print_nearby(&found);
            Ok(())
        }
    }
}

pub fn search(
    stations: Option<PathBuf>,
    query: &str,
    limit: usize,
    output_format: &str,
) -> Result<(), SkywxError> {
    let registry = registry(stations.as_deref())?;
    let matches = registry.fuzzy(query, limit);

    match output_format {
        "json" => output::json::print(&matches),
        _ => {
            if matches.is_empty() {
                eprintln!("No stations match '{query}'");
            }
            output::table::print_matches(&matches);
            Ok(())
        }
    }
}
