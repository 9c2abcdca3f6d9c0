use crate::parsing::remarks::RemarkEntry;
use crate::parsing::tokenize::Token;
use crate::station::Station;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Observation,
    Forecast,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Observation => write!(f, "observation"),
            ReportType::Forecast => write!(f, "forecast"),
        }
    }
}

impl ReportType {
    pub fn from_str_loose(s: &str) -> Option<ReportType> {
        match s.trim().to_lowercase().as_str() {
            "metar" | "speci" | "observation" | "obs" => Some(ReportType::Observation),
            "taf" | "forecast" => Some(ReportType::Forecast),
            _ => None,
        }
    }
}

/// Outcome of parsing one field.
///
/// Absence is always explicit: a missing group is `Absent`, never a zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ParsedElement<T> {
    Present(T),
    Absent,
    Malformed(String),
}

impl<T> Default for ParsedElement<T> {
    fn default() -> Self {
        ParsedElement::Absent
    }
}

impl<T> ParsedElement<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            ParsedElement::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ParsedElement::Present(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParsedElement::Malformed(_))
    }

    pub fn status(&self) -> ElementStatus {
        match self {
            ParsedElement::Present(_) => ElementStatus::Present,
            ParsedElement::Absent => ElementStatus::Absent,
            ParsedElement::Malformed(_) => ElementStatus::Malformed,
        }
    }

    pub fn malformed_raw(&self) -> Option<&str> {
        match self {
            ParsedElement::Malformed(raw) => Some(raw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    Present,
    Absent,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kt")]
    Knots,
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "sm")]
    StatuteMiles,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "inHg")]
    InchesOfMercury,
    #[serde(rename = "hPa")]
    Hectopascals,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Knots => "kt",
            Unit::MetersPerSecond => "m/s",
            Unit::KilometersPerHour => "km/h",
            Unit::StatuteMiles => "sm",
            Unit::Meters => "m",
            Unit::Kilometers => "km",
            Unit::Feet => "ft",
            Unit::InchesOfMercury => "inHg",
            Unit::Hectopascals => "hPa",
            Unit::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// How a unit was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitConfidence {
    /// The token carried its own unit.
    Explicit,
    /// Taken from the reporting station's regional convention.
    Regional,
    /// No station context; global default or unknown.
    LowConfidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub repr: String,
    pub day: Option<u8>,
    pub hour: u8,
    pub minute: u8,
    /// Calendar time, only when a reference date was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub repr: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Auto,
    Correction,
    Amended,
    Nil,
    Cancelled,
    Delayed,
}

impl Modifier {
    pub fn from_token(s: &str) -> Option<Modifier> {
        match s {
            "AUTO" => Some(Modifier::Auto),
            "COR" => Some(Modifier::Correction),
            "AMD" => Some(Modifier::Amended),
            "NIL" => Some(Modifier::Nil),
            "CNL" => Some(Modifier::Cancelled),
            "RTD" => Some(Modifier::Delayed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "degrees", rename_all = "snake_case")]
pub enum WindDirection {
    Degrees(u16),
    Variable,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSector {
    pub from: u16,
    pub to: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    pub repr: String,
    pub direction: WindDirection,
    /// `None` when the speed digits are slashed out.
    pub speed: Option<u16>,
    pub gust: Option<u16>,
    pub unit: Unit,
    pub confidence: UnitConfidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_sector: Option<VariableSector>,
}

impl Wind {
    pub fn is_calm(&self) -> bool {
        self.direction == WindDirection::Degrees(0) && self.speed == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindShear {
    pub repr: String,
    pub height_ft: u32,
    pub direction: u16,
    pub speed: u16,
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBound {
    Exact,
    /// `P` prefix or 9999/CAVOK: the value or more.
    AtLeast,
    /// `M` prefix: less than the value.
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub repr: String,
    pub distance: Decimal,
    pub bound: DistanceBound,
    pub unit: Unit,
    pub confidence: UnitConfidence,
    pub cavok: bool,
    /// `NDV` suffix (no directional variation sensor) or a compass sector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<DirectionalMinimum>,
}

/// Lowest visibility toward one sector, reported after prevailing
/// visibility in metres (`4000 1500SW`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalMinimum {
    pub repr: String,
    /// Metres.
    pub distance: Decimal,
    pub direction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RvrTrend {
    Up,
    Down,
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RvrValue {
    pub value: u32,
    pub bound: DistanceBound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunwayVisualRange {
    pub repr: String,
    pub runway: String,
    pub low: RvrValue,
    /// Upper end of a variable range (`R06/0600V1200FT`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<RvrValue>,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<RvrTrend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Descriptor {
    Shallow,
    Partial,
    Patches,
    LowDrifting,
    Blowing,
    Showers,
    Thunderstorm,
    Freezing,
}

impl Descriptor {
    pub fn from_code(code: &str) -> Option<Descriptor> {
        match code {
            "MI" => Some(Descriptor::Shallow),
            "PR" => Some(Descriptor::Partial),
            "BC" => Some(Descriptor::Patches),
            "DR" => Some(Descriptor::LowDrifting),
            "BL" => Some(Descriptor::Blowing),
            "SH" => Some(Descriptor::Showers),
            "TS" => Some(Descriptor::Thunderstorm),
            "FZ" => Some(Descriptor::Freezing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phenomenon {
    Drizzle,
    Rain,
    Snow,
    SnowGrains,
    IceCrystals,
    IcePellets,
    Hail,
    SmallHail,
    UnknownPrecipitation,
    Mist,
    Fog,
    Smoke,
    VolcanicAsh,
    Dust,
    Sand,
    Haze,
    Spray,
    DustWhirls,
    Squalls,
    FunnelCloud,
    Sandstorm,
    Duststorm,
}

impl Phenomenon {
    pub fn from_code(code: &str) -> Option<Phenomenon> {
        match code {
            "DZ" => Some(Phenomenon::Drizzle),
            "RA" => Some(Phenomenon::Rain),
            "SN" => Some(Phenomenon::Snow),
            "SG" => Some(Phenomenon::SnowGrains),
            "IC" => Some(Phenomenon::IceCrystals),
            "PL" | "PE" => Some(Phenomenon::IcePellets),
            "GR" => Some(Phenomenon::Hail),
            "GS" => Some(Phenomenon::SmallHail),
            "UP" => Some(Phenomenon::UnknownPrecipitation),
            "BR" => Some(Phenomenon::Mist),
            "FG" => Some(Phenomenon::Fog),
            "FU" => Some(Phenomenon::Smoke),
            "VA" => Some(Phenomenon::VolcanicAsh),
            "DU" => Some(Phenomenon::Dust),
            "SA" => Some(Phenomenon::Sand),
            "HZ" => Some(Phenomenon::Haze),
            "PY" => Some(Phenomenon::Spray),
            "PO" => Some(Phenomenon::DustWhirls),
            "SQ" => Some(Phenomenon::Squalls),
            "FC" => Some(Phenomenon::FunnelCloud),
            "SS" => Some(Phenomenon::Sandstorm),
            "DS" => Some(Phenomenon::Duststorm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCode {
    pub repr: String,
    pub intensity: Intensity,
    pub in_vicinity: bool,
    pub recent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    pub phenomena: Vec<Phenomenon>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudCover {
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
    SkyClear,
    Clear,
    NoSignificantCloud,
    NoCloudDetected,
}

impl CloudCover {
    pub fn from_code(code: &str) -> Option<CloudCover> {
        match code {
            "FEW" => Some(CloudCover::Few),
            "SCT" => Some(CloudCover::Scattered),
            "BKN" => Some(CloudCover::Broken),
            "OVC" => Some(CloudCover::Overcast),
            "VV" => Some(CloudCover::VerticalVisibility),
            "SKC" => Some(CloudCover::SkyClear),
            "CLR" => Some(CloudCover::Clear),
            "NSC" => Some(CloudCover::NoSignificantCloud),
            "NCD" => Some(CloudCover::NoCloudDetected),
            _ => None,
        }
    }

    /// Clear-sky codes carry no layer height.
    pub fn is_clear(&self) -> bool {
        matches!(
            self,
            CloudCover::SkyClear
                | CloudCover::Clear
                | CloudCover::NoSignificantCloud
                | CloudCover::NoCloudDetected
        )
    }

    /// Broken, overcast and vertical visibility form a ceiling.
    pub fn is_ceiling(&self) -> bool {
        matches!(
            self,
            CloudCover::Broken | CloudCover::Overcast | CloudCover::VerticalVisibility
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudType {
    Cumulonimbus,
    ToweringCumulus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub repr: String,
    pub cover: CloudCover,
    /// Layer base in feet above ground; `None` for clear codes and `///`.
    pub base_ft: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_type: Option<CloudType>,
}

/// Temperature and dewpoint in whole degrees Celsius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureDewpoint {
    pub repr: String,
    pub temperature: Option<i16>,
    pub dewpoint: Option<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeKind {
    Maximum,
    Minimum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureExtreme {
    pub repr: String,
    pub kind: ExtremeKind,
    pub value: i16,
    pub at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pressure {
    pub repr: String,
    pub value: Decimal,
    pub unit: Unit,
    pub confidence: UnitConfidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Altimeter {
    pub primary: Pressure,
    /// Second pressure group, e.g. `Q1013 A2992`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<Pressure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Baseline,
    From,
    Becoming,
    Temporary,
    Probability,
    Intermittent,
    NoSignificantChange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodElements {
    pub wind: ParsedElement<Wind>,
    pub wind_shear: ParsedElement<WindShear>,
    pub visibility: ParsedElement<Visibility>,
    pub weather: ParsedElement<Vec<WeatherCode>>,
    pub clouds: ParsedElement<Vec<CloudLayer>>,
    pub temperature_extremes: ParsedElement<Vec<TemperatureExtreme>>,
    pub altimeter: ParsedElement<Altimeter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub kind: TransitionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    /// Position of the first token of this period (the marker, if any).
    pub start_token: usize,
    pub raw: String,
    pub elements: PeriodElements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub wind: ParsedElement<Wind>,
    pub visibility: ParsedElement<Visibility>,
    pub runway_visibility: ParsedElement<Vec<RunwayVisualRange>>,
    pub weather: ParsedElement<Vec<WeatherCode>>,
    pub clouds: ParsedElement<Vec<CloudLayer>>,
    pub temperature: ParsedElement<TemperatureDewpoint>,
    pub altimeter: ParsedElement<Altimeter>,
    /// Trend section (`NOSIG`, `BECMG ...`, `TEMPO ...`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trend: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub validity: ParsedElement<ValidityWindow>,
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReportBody {
    Observation(Observation),
    Forecast(Forecast),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Time,
    Validity,
    Wind,
    WindShear,
    Visibility,
    RunwayVisibility,
    Weather,
    Clouds,
    Temperature,
    TemperatureExtremes,
    Altimeter,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Time => "time",
            Field::Validity => "validity",
            Field::Wind => "wind",
            Field::WindShear => "wind shear",
            Field::Visibility => "visibility",
            Field::RunwayVisibility => "runway visual range",
            Field::Weather => "weather",
            Field::Clouds => "clouds",
            Field::Temperature => "temperature",
            Field::TemperatureExtremes => "temperature extremes",
            Field::Altimeter => "altimeter",
        };
        write!(f, "{s}")
    }
}

/// Which part of the report a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "index", rename_all = "snake_case")]
pub enum FieldScope {
    Main,
    Period(usize),
}

/// A run of entries in [`StructuredReport::tokens`].
///
/// Multi-word groups (`1 1/2SM`, `R06/1200 U`, `PROB30 TEMPO`) are a single
/// token, so these are not word offsets into the sanitized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub len: usize,
}

impl TokenSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: Field,
    pub scope: FieldScope,
    pub status: ElementStatus,
    /// Tokens consumed by the field's parser, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<TokenSpan>,
}

/// A token no parser accepted. `position` indexes [`StructuredReport::tokens`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconsumedToken {
    pub position: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ParseIssue {
    MalformedField {
        field: Field,
        scope: FieldScope,
        raw: String,
    },
    AbsentField {
        field: Field,
        scope: FieldScope,
    },
    UnconsumedToken {
        position: usize,
        text: String,
    },
    MalformedTransition {
        position: usize,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "completeness", rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Partial { issues: Vec<ParseIssue> },
}

/// A fully decoded report. Built once by the assembler; read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    report_type: ReportType,
    raw: String,
    sanitized: String,
    tokens: Vec<Token>,
    station_code: String,
    station: Option<Arc<Station>>,
    time: ParsedElement<Timestamp>,
    modifiers: Vec<Modifier>,
    body: ReportBody,
    remarks: Vec<RemarkEntry>,
    unconsumed: Vec<UnconsumedToken>,
    record: Vec<FieldOutcome>,
    completeness: Completeness,
}

/// Parts handed to the assembler's constructor.
pub(crate) struct ReportParts {
    pub report_type: ReportType,
    pub raw: String,
    pub sanitized: String,
    pub tokens: Vec<Token>,
    pub station_code: String,
    pub station: Option<Arc<Station>>,
    pub time: ParsedElement<Timestamp>,
    pub modifiers: Vec<Modifier>,
    pub body: ReportBody,
    pub remarks: Vec<RemarkEntry>,
    pub unconsumed: Vec<UnconsumedToken>,
    pub record: Vec<FieldOutcome>,
    pub completeness: Completeness,
}

impl StructuredReport {
    pub(crate) fn from_parts(parts: ReportParts) -> Self {
        Self {
            report_type: parts.report_type,
            raw: parts.raw,
            sanitized: parts.sanitized,
            tokens: parts.tokens,
            station_code: parts.station_code,
            station: parts.station,
            time: parts.time,
            modifiers: parts.modifiers,
            body: parts.body,
            remarks: parts.remarks,
            unconsumed: parts.unconsumed,
            record: parts.record,
            completeness: parts.completeness,
        }
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    /// Classified tokens of the sanitized text. Spans and unconsumed
    /// positions index this list.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Text covered by a span, tokens joined with single spaces.
    pub fn span_text(&self, span: TokenSpan) -> Option<String> {
        let tokens = self.tokens.get(span.start..span.end())?;
        Some(
            tokens
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn station_code(&self) -> &str {
        &self.station_code
    }

    pub fn station(&self) -> Option<&Station> {
        self.station.as_deref()
    }

    pub fn time(&self) -> &ParsedElement<Timestamp> {
        &self.time
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn body(&self) -> &ReportBody {
        &self.body
    }

    pub fn observation(&self) -> Option<&Observation> {
        match &self.body {
            ReportBody::Observation(obs) => Some(obs),
            ReportBody::Forecast(_) => None,
        }
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match &self.body {
            ReportBody::Forecast(fc) => Some(fc),
            ReportBody::Observation(_) => None,
        }
    }

    pub fn remarks(&self) -> &[RemarkEntry] {
        &self.remarks
    }

    pub fn unconsumed(&self) -> &[UnconsumedToken] {
        &self.unconsumed
    }

    pub fn record(&self) -> &[FieldOutcome] {
        &self.record
    }

    pub fn completeness(&self) -> &Completeness {
        &self.completeness
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.completeness, Completeness::Complete)
    }

    /// Outcome recorded for a field in the main scope.
    pub fn outcome(&self, field: Field) -> Option<&FieldOutcome> {
        self.record
            .iter()
            .find(|o| o.field == field && o.scope == FieldScope::Main)
    }
}
