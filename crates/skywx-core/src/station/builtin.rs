use crate::error::SkywxError;
use crate::station::StationRegistry;

const BUILTIN_STATIONS_JSON: &str = include_str!("../../../../stations/builtin.json");

/// Load the station dataset compiled into the library.
pub fn builtin() -> Result<StationRegistry, SkywxError> {
    StationRegistry::from_json(BUILTIN_STATIONS_JSON)
}
