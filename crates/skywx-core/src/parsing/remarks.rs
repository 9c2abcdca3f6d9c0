//! Remarks section decoder.
//!
//! Remarks are an unordered set of fixed-prefix codes. Every token is
//! matched on its own against the code table below; anything unmatched is
//! kept verbatim as [`RemarkCode::Unparsed`] so the section round-trips.

use crate::parsing::tokenize::{is_weather_shape, Token};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkEntry {
    pub raw: String,
    pub code: RemarkCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    PrecipitationGauge,
    Lightning,
    RunwayVisualRange,
    PresentWeather,
    FreezingRain,
    SecondaryVisibility,
    SecondaryCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Began,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecipitationEvent {
    pub weather: String,
    pub kind: EventKind,
    pub hour: Option<u8>,
    pub minute: u8,
}

/// A decoded remark. Temperatures are degrees Celsius, precipitation is
/// inches and pressure hectopascals, as the remark codes define them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "value", rename_all = "snake_case")]
pub enum RemarkCode {
    /// `AO1` / `AO2`; the latter has a precipitation discriminator.
    AutomatedStation { precipitation_discriminator: bool },
    SeaLevelPressure { hpa: Decimal },
    SeaLevelPressureUnavailable,
    PreciseTemperature {
        temperature: Decimal,
        dewpoint: Option<Decimal>,
    },
    HourlyPrecipitation { inches: Option<Decimal> },
    /// 3- or 6-hourly amount, depending on the synoptic hour.
    PeriodPrecipitation { inches: Option<Decimal> },
    DailyPrecipitation { inches: Option<Decimal> },
    SixHourMaximum { celsius: Decimal },
    SixHourMinimum { celsius: Decimal },
    DailyExtremes { maximum: Decimal, minimum: Decimal },
    PressureTendency { character: u8, change_hpa: Decimal },
    SnowDepth { inches: u16 },
    Sunshine { minutes: u16 },
    PeakWind {
        direction: u16,
        speed: u16,
        hour: Option<u8>,
        minute: u8,
    },
    WindShift {
        hour: Option<u8>,
        minute: u8,
        frontal_passage: bool,
    },
    PressureRisingRapidly,
    PressureFallingRapidly,
    SensorOutage {
        sensor: Sensor,
        location: Option<String>,
    },
    MaintenanceNeeded,
    PrecipitationEvents(Vec<PrecipitationEvent>),
    Unparsed(String),
}

static SLP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SLP(\d{3})$").expect("slp regex"));
static PRECISE_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^T([01])(\d{3})(?:([01])(\d{3}))?$").expect("precise temperature regex")
});
static PRECIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([P67])(\d{4}|////)$").expect("precipitation regex"));
static SIX_HOUR_EXTREME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([12])([01])(\d{3})$").expect("six hour extreme regex"));
static DAILY_EXTREMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^4([01])(\d{3})([01])(\d{3})$").expect("daily extremes regex")
});
static TENDENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^5([0-8])(\d{3})$").expect("pressure tendency regex"));
static SNOW_DEPTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^4/(\d{3})$").expect("snow depth regex"));
static SUNSHINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^98(\d{3})$").expect("sunshine regex"));
static PEAK_WIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PK WND (\d{3})(\d{2,3})/(\d{2})?(\d{2})$").expect("peak wind regex")
});
static WIND_SHIFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WSHFT (\d{2})?(\d{2})$").expect("wind shift regex"));

/// Decode the tokens following `RMK`, in encounter order. Duplicates are
/// kept as separate entries.
pub fn decode_remarks(tokens: &[Token]) -> Vec<RemarkEntry> {
    let mut entries = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let text = tokens[i].text.as_str();
        let next = tokens.get(i + 1).map(|t| t.text.as_str());
        let mut raw = text.to_string();
        let mut code = decode(text);

        // Two-token forms: a qualifier that belongs to the preceding code.
        match (&mut code, next) {
            (RemarkCode::WindShift { frontal_passage, .. }, Some("FROPA")) => {
                *frontal_passage = true;
                raw.push_str(" FROPA");
                i += 1;
            }
            (RemarkCode::SensorOutage { location, .. }, Some(n)) if n.starts_with("RWY") => {
                *location = Some(n.to_string());
                raw = format!("{raw} {n}");
                i += 1;
            }
            _ => {}
        }

        if let RemarkCode::Unparsed(_) = code {
            debug!(token = %raw, "unparsed remark");
        }
        entries.push(RemarkEntry { raw, code });
        i += 1;
    }

    entries
}

/// Decode a single remark token.
pub fn decode(text: &str) -> RemarkCode {
    match text {
        "AO1" => return RemarkCode::AutomatedStation { precipitation_discriminator: false },
        "AO2" => return RemarkCode::AutomatedStation { precipitation_discriminator: true },
        "SLPNO" => return RemarkCode::SeaLevelPressureUnavailable,
        "PRESRR" => return RemarkCode::PressureRisingRapidly,
        "PRESFR" => return RemarkCode::PressureFallingRapidly,
        "$" => return RemarkCode::MaintenanceNeeded,
        _ => {}
    }
    if let Some(sensor) = sensor(text) {
        return RemarkCode::SensorOutage {
            sensor,
            location: None,
        };
    }
    decode_numeric(text)
        .or_else(|| precipitation_events(text).map(RemarkCode::PrecipitationEvents))
        .unwrap_or_else(|| RemarkCode::Unparsed(text.to_string()))
}

fn sensor(text: &str) -> Option<Sensor> {
    match text {
        "PNO" => Some(Sensor::PrecipitationGauge),
        "TSNO" => Some(Sensor::Lightning),
        "RVRNO" => Some(Sensor::RunwayVisualRange),
        "PWINO" => Some(Sensor::PresentWeather),
        "FZRANO" => Some(Sensor::FreezingRain),
        "VISNO" => Some(Sensor::SecondaryVisibility),
        "CHINO" => Some(Sensor::SecondaryCeiling),
        _ => None,
    }
}

fn decode_numeric(text: &str) -> Option<RemarkCode> {
    if let Some(caps) = SLP.captures(text) {
        let tenths: i64 = caps[1].parse().ok()?;
        // SLP omits the leading 9 or 10.
        let base = if tenths < 500 { 1000 } else { 900 };
        return Some(RemarkCode::SeaLevelPressure {
            hpa: Decimal::from(base) + Decimal::new(tenths, 1),
        });
    }
    if let Some(caps) = PRECISE_TEMP.captures(text) {
        let temperature = tenths_celsius(&caps[1], &caps[2])?;
        let dewpoint = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => Some(tenths_celsius(sign.as_str(), value.as_str())?),
            _ => None,
        };
        return Some(RemarkCode::PreciseTemperature {
            temperature,
            dewpoint,
        });
    }
    if let Some(caps) = PRECIP.captures(text) {
        let inches = match &caps[2] {
            "////" => None,
            digits => Some(Decimal::new(digits.parse().ok()?, 2)),
        };
        return Some(match &caps[1] {
            "P" => RemarkCode::HourlyPrecipitation { inches },
            "6" => RemarkCode::PeriodPrecipitation { inches },
            _ => RemarkCode::DailyPrecipitation { inches },
        });
    }
    if let Some(caps) = SIX_HOUR_EXTREME.captures(text) {
        let celsius = tenths_celsius(&caps[2], &caps[3])?;
        return Some(if &caps[1] == "1" {
            RemarkCode::SixHourMaximum { celsius }
        } else {
            RemarkCode::SixHourMinimum { celsius }
        });
    }
    if let Some(caps) = DAILY_EXTREMES.captures(text) {
        return Some(RemarkCode::DailyExtremes {
            maximum: tenths_celsius(&caps[1], &caps[2])?,
            minimum: tenths_celsius(&caps[3], &caps[4])?,
        });
    }
    if let Some(caps) = TENDENCY.captures(text) {
        return Some(RemarkCode::PressureTendency {
            character: caps[1].parse().ok()?,
            change_hpa: Decimal::new(caps[2].parse().ok()?, 1),
        });
    }
    if let Some(caps) = SNOW_DEPTH.captures(text) {
        return Some(RemarkCode::SnowDepth {
            inches: caps[1].parse().ok()?,
        });
    }
    if let Some(caps) = SUNSHINE.captures(text) {
        return Some(RemarkCode::Sunshine {
            minutes: caps[1].parse().ok()?,
        });
    }
    if let Some(caps) = PEAK_WIND.captures(text) {
        return Some(RemarkCode::PeakWind {
            direction: caps[1].parse().ok()?,
            speed: caps[2].parse().ok()?,
            hour: caps.get(3).and_then(|h| h.as_str().parse().ok()),
            minute: caps[4].parse().ok()?,
        });
    }
    if let Some(caps) = WIND_SHIFT.captures(text) {
        return Some(RemarkCode::WindShift {
            hour: caps.get(1).and_then(|h| h.as_str().parse().ok()),
            minute: caps[2].parse().ok()?,
            frontal_passage: false,
        });
    }
    None
}

/// `0244` with sign digit `1` -> -24.4
fn tenths_celsius(sign: &str, value: &str) -> Option<Decimal> {
    let magnitude = Decimal::new(value.parse().ok()?, 1);
    Some(if sign == "1" { -magnitude } else { magnitude })
}

/// Begin/end times such as `RAB15E30`, `TSB0159E30` or `FZRAB1155SNE12`.
fn precipitation_events(text: &str) -> Option<Vec<PrecipitationEvent>> {
    let bytes = text.as_bytes();
    let is_marker = |i: usize| {
        matches!(bytes.get(i), Some(b'B' | b'E'))
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
    };

    let mut events = Vec::new();
    let mut weather: Option<&str> = None;
    let mut i = 0;

    while i < bytes.len() {
        if is_marker(i) {
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            let time = &text[i + 1..i + 1 + digits];
            let (hour, minute) = match digits {
                2 => (None, time.parse().ok()?),
                4 => (Some(time[..2].parse().ok()?), time[2..].parse().ok()?),
                _ => return None,
            };
            events.push(PrecipitationEvent {
                weather: weather?.to_string(),
                kind: if bytes[i] == b'B' {
                    EventKind::Began
                } else {
                    EventKind::Ended
                },
                hour,
                minute,
            });
            i += 1 + digits;
        } else if bytes[i].is_ascii_uppercase() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_uppercase() && !is_marker(i) {
                i += 1;
            }
            let code = &text[start..i];
            if !is_weather_shape(code) {
                return None;
            }
            weather = Some(code);
        } else {
            return None;
        }
    }

    if events.is_empty() {
        None
    } else {
        Some(events)
    }
}
