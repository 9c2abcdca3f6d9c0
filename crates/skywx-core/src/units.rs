//! Unit disambiguation for numeric groups that may omit their unit.
//!
//! Explicit suffixes always win. Otherwise the reporting station's country
//! selects a regional convention, and without a station the [`UnitPolicy`]
//! decides between the global ICAO default and refusing to guess.

use crate::model::{Unit, UnitConfidence};
use crate::station::Station;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    WindSpeed,
    Visibility,
    Pressure,
}

/// What to do when a unit is ambiguous and no station is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPolicy {
    /// Use the ICAO default (knots, metres, hectopascals), flagged low-confidence.
    #[default]
    GlobalDefault,
    /// Report `Unit::Unknown`.
    Refuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub unit: Unit,
    pub confidence: UnitConfidence,
}

impl Resolution {
    fn explicit(unit: Unit) -> Self {
        Self {
            unit,
            confidence: UnitConfidence::Explicit,
        }
    }
}

/// Regional unit convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    NorthAmerica,
    MetricWind,
    Icao,
}

impl Region {
    fn for_country(country: &str) -> Region {
        match country.trim().to_uppercase().as_str() {
            "US" | "CA" => Region::NorthAmerica,
            "RU" | "CN" | "KZ" | "BY" | "UZ" | "KG" | "TJ" | "TM" | "MN" => Region::MetricWind,
            _ => Region::Icao,
        }
    }

    fn default_unit(self, kind: FieldKind) -> Unit {
        match (self, kind) {
            (Region::NorthAmerica, FieldKind::WindSpeed) => Unit::Knots,
            (Region::NorthAmerica, FieldKind::Visibility) => Unit::StatuteMiles,
            (Region::NorthAmerica, FieldKind::Pressure) => Unit::InchesOfMercury,
            (Region::MetricWind, FieldKind::WindSpeed) => Unit::MetersPerSecond,
            (_, FieldKind::WindSpeed) => Unit::Knots,
            (_, FieldKind::Visibility) => Unit::Meters,
            (_, FieldKind::Pressure) => Unit::Hectopascals,
        }
    }
}

/// Decide the unit for a numeric token of the given field kind.
pub fn resolve(
    kind: FieldKind,
    token: &str,
    station: Option<&Station>,
    policy: UnitPolicy,
) -> Resolution {
    if let Some(unit) = explicit_unit(kind, token) {
        return Resolution::explicit(unit);
    }

    match station {
        Some(station) => {
            let unit = Region::for_country(&station.country).default_unit(kind);
            debug!(token, station = %station.icao, %unit, "regional unit default");
            Resolution {
                unit,
                confidence: UnitConfidence::Regional,
            }
        }
        None => {
            let unit = match policy {
                UnitPolicy::GlobalDefault => Region::Icao.default_unit(kind),
                UnitPolicy::Refuse => Unit::Unknown,
            };
            debug!(token, %unit, "no station context for ambiguous unit");
            Resolution {
                unit,
                confidence: UnitConfidence::LowConfidence,
            }
        }
    }
}

/// Unit carried by the token itself, if any.
fn explicit_unit(kind: FieldKind, token: &str) -> Option<Unit> {
    match kind {
        FieldKind::WindSpeed => {
            if token.ends_with("KT") {
                Some(Unit::Knots)
            } else if token.ends_with("MPS") {
                Some(Unit::MetersPerSecond)
            } else if token.ends_with("KMH") {
                Some(Unit::KilometersPerHour)
            } else {
                None
            }
        }
        FieldKind::Visibility => {
            if token.ends_with("SM") {
                Some(Unit::StatuteMiles)
            } else if token.ends_with("KM") {
                Some(Unit::Kilometers)
            } else if token.chars().take(4).filter(|c| c.is_ascii_digit()).count() == 4 {
                // Four-digit groups are metres by definition.
                Some(Unit::Meters)
            } else {
                None
            }
        }
        FieldKind::Pressure => {
            if token.ends_with("INS") || token.starts_with('A') {
                Some(Unit::InchesOfMercury)
            } else if token.ends_with("HPA") || (token.starts_with('Q') && !token.starts_with("QNH")) {
                Some(Unit::Hectopascals)
            } else {
                None
            }
        }
    }
}
