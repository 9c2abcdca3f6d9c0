pub mod builtin;
pub mod geo;
pub mod search;

use crate::error::SkywxError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use geo::Coordinate;
pub use search::StationMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationType {
    LargeAirport,
    MediumAirport,
    SmallAirport,
    SeaplaneBase,
    Heliport,
    Balloonport,
    WeatherStation,
}

impl StationType {
    /// Preference when ranking otherwise equal search results; bigger fields first.
    pub fn rank(&self) -> u8 {
        match self {
            StationType::LargeAirport => 0,
            StationType::MediumAirport => 1,
            StationType::SmallAirport => 2,
            StationType::SeaplaneBase => 3,
            StationType::Heliport => 4,
            StationType::Balloonport => 5,
            StationType::WeatherStation => 6,
        }
    }
}

impl fmt::Display for StationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StationType::LargeAirport => "large airport",
            StationType::MediumAirport => "medium airport",
            StationType::SmallAirport => "small airport",
            StationType::SeaplaneBase => "seaplane base",
            StationType::Heliport => "heliport",
            StationType::Balloonport => "balloon port",
            StationType::WeatherStation => "weather station",
        };
        write!(f, "{s}")
    }
}

fn default_true() -> bool {
    true
}

/// A reporting station from the reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub icao: String,
    #[serde(default)]
    pub iata: Option<String>,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation_ft: Option<i32>,
    #[serde(default)]
    pub elevation_m: Option<i32>,
    #[serde(rename = "type")]
    pub station_type: StationType,
    #[serde(default = "default_true")]
    pub reports_observations: bool,
    #[serde(default)]
    pub reports_forecasts: bool,
}

impl Station {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }
}

/// Capability filter for proximity queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StationFilter {
    #[default]
    Any,
    Observations,
    Forecasts,
}

impl StationFilter {
    pub fn accepts(&self, station: &Station) -> bool {
        match self {
            StationFilter::Any => true,
            StationFilter::Observations => station.reports_observations,
            StationFilter::Forecasts => station.reports_forecasts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestStation {
    pub station: Arc<Station>,
    pub distance_km: f64,
}

/// Read-only index over the station dataset.
///
/// Stations are stored sorted by ICAO code, which makes every scan visit
/// them in lexicographic order; distance ties resolve to the smaller code.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Arc<Station>>,
    by_icao: HashMap<String, usize>,
    by_iata: HashMap<String, usize>,
}

impl StationRegistry {
    /// Build the registry. Records with out-of-range coordinates are
    /// skipped; duplicate ICAO codes and empty datasets are rejected.
    pub fn new(stations: Vec<Station>) -> Result<Self, SkywxError> {
        let mut valid: Vec<Station> = Vec::with_capacity(stations.len());
        for mut station in stations {
            station.icao = station.icao.trim().to_uppercase();
            station.iata = station
                .iata
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty());
            if station.icao.is_empty() {
                warn!(name = %station.name, "skipping station without a code");
                continue;
            }
            if station.coordinate().is_none() {
                warn!(icao = %station.icao, "skipping station with invalid coordinates");
                continue;
            }
            valid.push(station);
        }

        if valid.is_empty() {
            return Err(SkywxError::DatasetInvalid(
                "station dataset contains no usable stations".into(),
            ));
        }

        valid.sort_by(|a, b| a.icao.cmp(&b.icao));

        let mut by_icao = HashMap::with_capacity(valid.len());
        let mut by_iata = HashMap::new();
        for (idx, station) in valid.iter().enumerate() {
            if by_icao.insert(station.icao.clone(), idx).is_some() {
                return Err(SkywxError::DatasetInvalid(format!(
                    "duplicate station code '{}'",
                    station.icao
                )));
            }
            if let Some(ref iata) = station.iata {
                if by_iata.contains_key(iata) {
                    debug!(iata = %iata, icao = %station.icao, "IATA code already indexed");
                } else {
                    by_iata.insert(iata.clone(), idx);
                }
            }
        }

        info!(stations = valid.len(), "station registry built");

        Ok(Self {
            stations: valid.into_iter().map(Arc::new).collect(),
            by_icao,
            by_iata,
        })
    }

    /// Build the registry from a JSON array of station records.
    pub fn from_json(json: &str) -> Result<Self, SkywxError> {
        let stations: Vec<Station> = serde_json::from_str(json)?;
        Self::new(stations)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Station>> {
        self.stations.iter()
    }

    /// Exact, case-insensitive lookup by ICAO code, falling back to IATA.
    pub fn by_code(&self, code: &str) -> Option<Arc<Station>> {
        let code = code.trim().to_uppercase();
        self.by_icao
            .get(&code)
            .or_else(|| self.by_iata.get(&code))
            .map(|&idx| Arc::clone(&self.stations[idx]))
    }

    /// The station with the smallest great-circle distance to `coord`.
    pub fn nearest(&self, coord: Coordinate) -> NearestStation {
        let mut best: Option<NearestStation> = None;
        for station in &self.stations {
            let Some(at) = station.coordinate() else {
                continue;
            };
            let distance_km = geo::great_circle_km(coord, at);
            // Strict comparison keeps the lexicographically first code on ties.
            if best.as_ref().map_or(true, |b| distance_km < b.distance_km) {
                best = Some(NearestStation {
                    station: Arc::clone(station),
                    distance_km,
                });
            }
        }
        best.unwrap_or_else(|| NearestStation {
            station: Arc::clone(&self.stations[0]),
            distance_km: f64::NAN,
        })
    }

    /// Up to `limit` stations passing `filter`, closest first.
    pub fn nearby(
        &self,
        coord: Coordinate,
        limit: usize,
        filter: StationFilter,
    ) -> Vec<NearestStation> {
        let mut found: Vec<NearestStation> = self
            .stations
            .iter()
            .filter(|s| filter.accepts(s))
            .filter_map(|s| {
                s.coordinate().map(|at| NearestStation {
                    station: Arc::clone(s),
                    distance_km: geo::great_circle_km(coord, at),
                })
            })
            .collect();
        found.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.station.icao.cmp(&b.station.icao))
        });
        found.truncate(limit);
        found
    }

    /// Edit-distance ranked text search over codes, names and cities.
    pub fn fuzzy(&self, text: &str, limit: usize) -> Vec<StationMatch> {
        search::rank(&self.stations, text, limit)
    }
}

/// Load a station registry from a JSON file.
pub fn load_registry(path: &Path) -> Result<StationRegistry, SkywxError> {
    let content = std::fs::read_to_string(path).map_err(|e| SkywxError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let stations: Vec<Station> =
        serde_json::from_str(&content).map_err(|e| SkywxError::DatasetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    StationRegistry::new(stations)
}
