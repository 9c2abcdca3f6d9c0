use crate::error::SkywxError;
use crate::model::{Modifier, ReportType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Shape class of a token, decided by the first matching grammar in
/// [`classify`]'s priority order rather than by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    ReportKeyword,
    Modifier,
    Station,
    Time,
    Validity,
    Transition,
    Wind,
    WindVariation,
    WindShear,
    RunwayVisualRange,
    Visibility,
    Sky,
    TemperatureExtreme,
    Temperature,
    Pressure,
    Weather,
    RemarksMarker,
    Remark,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: usize,
    pub kind: TokenKind,
}

/// Positions of the mandatory header groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub station: usize,
    pub time: Option<usize>,
    pub validity: Option<usize>,
    /// First token after the header.
    pub body_start: usize,
}

/// A sanitized report split into classified tokens.
#[derive(Debug, Clone)]
pub struct RawReport {
    pub original: String,
    pub sanitized: String,
    pub report_type: ReportType,
    pub tokens: Vec<Token>,
    pub header: Header,
    /// Position of the `RMK` marker, if present.
    pub remarks_start: Option<usize>,
}

impl RawReport {
    pub fn station_code(&self) -> &str {
        &self.tokens[self.header.station].text
    }

    /// Tokens between the header and the remarks marker.
    pub fn body(&self) -> &[Token] {
        let end = self.remarks_start.unwrap_or(self.tokens.len());
        &self.tokens[self.header.body_start.min(end)..end]
    }

    /// Tokens after the remarks marker.
    pub fn remarks(&self) -> &[Token] {
        match self.remarks_start {
            Some(idx) => &self.tokens[idx + 1..],
            None => &[],
        }
    }
}

/// Split sanitized text into classified tokens and validate the header.
///
/// The only failures are an empty report and a header that does not match
/// the minimal shape for the report type.
pub fn tokenize(
    original: &str,
    sanitized: &str,
    hint: Option<ReportType>,
) -> Result<RawReport, SkywxError> {
    let words: Vec<&str> = sanitized.split_whitespace().collect();
    if words.is_empty() {
        return Err(SkywxError::EmptyReport);
    }

    let report_type = hint.unwrap_or_else(|| detect_report_type(&words));
    debug!(%report_type, hint = hint.is_some(), "report type");

    let merged = merge_words(&words);
    let mut tokens = Vec::with_capacity(merged.len());
    let mut remarks_start = None;
    for (position, text) in merged.into_iter().enumerate() {
        let kind = if remarks_start.is_some() {
            TokenKind::Remark
        } else {
            classify(&text)
        };
        if kind == TokenKind::RemarksMarker {
            remarks_start = Some(position);
        }
        tokens.push(Token {
            text,
            position,
            kind,
        });
    }

    let header = match report_type {
        ReportType::Observation => observation_header(&mut tokens),
        ReportType::Forecast => forecast_header(&mut tokens),
    }
    .ok_or_else(|| SkywxError::UnrecognizedHeader {
        report_type,
        found: tokens
            .iter()
            .take(4)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    })?;

    Ok(RawReport {
        original: original.to_string(),
        sanitized: sanitized.to_string(),
        report_type,
        tokens,
        header,
        remarks_start,
    })
}

fn detect_report_type(words: &[&str]) -> ReportType {
    match words[0] {
        "TAF" => return ReportType::Forecast,
        "METAR" | "SPECI" => return ReportType::Observation,
        _ => {}
    }
    if words.iter().take(4).any(|w| VALIDITY.is_match(w)) {
        ReportType::Forecast
    } else {
        ReportType::Observation
    }
}

/// Re-join groups that the grammar treats as a single unit across a space.
fn merge_words(words: &[&str]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(words.len());
    let mut in_remarks = false;
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        let next = words.get(i + 1).copied();

        if word == "RMK" {
            in_remarks = true;
        }

        let joined = match next {
            Some(n) if in_remarks => {
                if word == "PK" && n == "WND" {
                    // PK WND dddff/hhmm
                    match words.get(i + 2) {
                        Some(v) if v.contains('/') => Some((format!("PK WND {v}"), 3)),
                        _ => Some(("PK WND".to_string(), 2)),
                    }
                } else if word == "WSHFT" && n.chars().all(|c| c.is_ascii_digit()) {
                    Some((format!("{word} {n}"), 2))
                } else {
                    None
                }
            }
            Some(n) if RVR_SHAPE.is_match(word) && matches!(n, "U" | "D" | "N") => {
                Some((format!("{word} {n}"), 2))
            }
            Some(n) if word.len() == 1 && word.chars().all(|c| c.is_ascii_digit()) && FRACTION_SM.is_match(n) => {
                Some((format!("{word} {n}"), 2))
            }
            Some(n) if PROB.is_match(word) && matches!(n, "TEMPO" | "INTER") => {
                Some((format!("{word} {n}"), 2))
            }
            _ => None,
        };

        match joined {
            Some((text, width)) => {
                merged.push(text);
                i += width;
            }
            None => {
                merged.push(word.to_string());
                i += 1;
            }
        }
    }

    merged
}

/// Classify a token by shape. Order matters: earlier grammars win.
pub fn classify(text: &str) -> TokenKind {
    if text == "RMK" {
        return TokenKind::RemarksMarker;
    }
    if matches!(text, "METAR" | "SPECI" | "TAF") {
        return TokenKind::ReportKeyword;
    }
    if Modifier::from_token(text).is_some() {
        return TokenKind::Modifier;
    }
    if TIME.is_match(text) {
        return TokenKind::Time;
    }
    if VALIDITY.is_match(text) {
        return TokenKind::Validity;
    }
    if is_transition_shape(text) {
        return TokenKind::Transition;
    }
    if WIND_SHEAR_SHAPE.is_match(text) {
        return TokenKind::WindShear;
    }
    if WIND_SHAPE.is_match(text) || WIND_UNITLESS.is_match(text) {
        return TokenKind::Wind;
    }
    if WIND_VARIATION.is_match(text) {
        return TokenKind::WindVariation;
    }
    if RVR_SHAPE.is_match(text) {
        return TokenKind::RunwayVisualRange;
    }
    if is_visibility_shape(text) {
        return TokenKind::Visibility;
    }
    if is_sky_shape(text) {
        return TokenKind::Sky;
    }
    if TEMP_EXTREME_SHAPE.is_match(text) {
        return TokenKind::TemperatureExtreme;
    }
    if TEMPERATURE_SHAPE.is_match(text) {
        return TokenKind::Temperature;
    }
    if is_pressure_shape(text) {
        return TokenKind::Pressure;
    }
    if is_weather_shape(text) {
        return TokenKind::Weather;
    }
    TokenKind::Unknown
}

fn is_transition_shape(text: &str) -> bool {
    matches!(text, "BECMG" | "TEMPO" | "INTER" | "NOSIG")
        || text.starts_with("PROB")
        || (text.starts_with("FM") && text[2..].starts_with(|c: char| c.is_ascii_digit()))
}

fn is_visibility_shape(text: &str) -> bool {
    text == "CAVOK"
        || text == "////"
        || VIS_METERS.is_match(text)
        || VIS_DISTANCE.is_match(text)
        || VIS_BARE.is_match(text)
}

fn is_sky_shape(text: &str) -> bool {
    if matches!(text, "SKC" | "CLR" | "NSC" | "NCD") {
        return true;
    }
    if SKY_MISSING.is_match(text) {
        return true;
    }
    let cover = ["FEW", "SCT", "BKN", "OVC"]
        .iter()
        .any(|c| text.starts_with(c) && text.len() >= 6);
    cover || (text.starts_with("VV") && text.len() >= 5)
}

fn is_pressure_shape(text: &str) -> bool {
    if text.starts_with("QNH") {
        return text.len() >= 7;
    }
    if text.len() != 5 || !(text.starts_with('A') || text.starts_with('Q')) {
        return false;
    }
    let rest = &text[1..];
    rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '/')
        && (rest.chars().filter(|c| c.is_ascii_digit()).count() >= 2 || rest == "////")
}

/// Intensity/proximity prefix followed only by known two-letter codes.
pub(crate) fn is_weather_shape(text: &str) -> bool {
    if text == "NSW" || text == "//" {
        return true;
    }
    let body = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    let body = body
        .strip_prefix("VC")
        .or_else(|| body.strip_prefix("RE"))
        .unwrap_or(body);
    if body.is_empty() || body.len() % 2 != 0 || !body.is_ascii() {
        return false;
    }
    (0..body.len()).step_by(2).all(|i| {
        let code = &body[i..i + 2];
        crate::model::Descriptor::from_code(code).is_some()
            || crate::model::Phenomenon::from_code(code).is_some()
    })
}

fn is_station_code(text: &str) -> bool {
    STATION.is_match(text)
        && !matches!(
            text,
            "AUTO" | "PROB" | "TEMPO" | "NOSIG" | "CAVOK" | "INTER" | "BECMG"
        )
}

/// `[METAR|SPECI] [COR] STATION DDHHMMZ`
fn observation_header(tokens: &mut [Token]) -> Option<Header> {
    let mut idx = 0;
    if tokens.first()?.kind == TokenKind::ReportKeyword && tokens[0].text != "TAF" {
        idx += 1;
    }
    while tokens.get(idx)?.kind == TokenKind::Modifier {
        idx += 1;
    }

    let station = idx;
    if !is_station_code(&tokens.get(station)?.text) {
        return None;
    }
    tokens[station].kind = TokenKind::Station;

    let time = station + 1;
    if tokens.get(time)?.kind != TokenKind::Time {
        return None;
    }

    Some(Header {
        station,
        time: Some(time),
        validity: None,
        body_start: time + 1,
    })
}

/// `[TAF] [AMD|COR|RTD] STATION [DDHHMMZ] DDHH/DDHH`, or `NIL`/`CNL` in
/// place of the validity group.
fn forecast_header(tokens: &mut [Token]) -> Option<Header> {
    let mut idx = 0;
    if tokens.first()?.text == "TAF" {
        idx += 1;
    }
    while tokens.get(idx)?.kind == TokenKind::Modifier {
        idx += 1;
    }

    let station = idx;
    if !is_station_code(&tokens.get(station)?.text) {
        return None;
    }
    tokens[station].kind = TokenKind::Station;
    idx += 1;

    let time = match tokens.get(idx) {
        Some(t) if t.kind == TokenKind::Time => {
            idx += 1;
            Some(idx - 1)
        }
        _ => None,
    };

    match tokens.get(idx) {
        Some(t) if t.kind == TokenKind::Validity => Some(Header {
            station,
            time,
            validity: Some(idx),
            body_start: idx + 1,
        }),
        Some(t) if matches!(t.text.as_str(), "NIL" | "CNL") && time.is_some() => Some(Header {
            station,
            time,
            validity: None,
            body_start: idx,
        }),
        _ => None,
    }
}

static STATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{3}$").expect("station regex"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}Z$").expect("time regex"));
pub(crate) static VALIDITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}/\d{4}$").expect("validity regex"));
static PROB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PROB\d{2}$").expect("prob regex"));
static WIND_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{3}|VRB|///)\S*(KT|MPS|KMH)$").expect("wind regex")
});
static WIND_UNITLESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{3}|VRB)\d{2}(G\d{2})?$").expect("unitless wind regex")
});
static WIND_VARIATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}V\d{3}$").expect("wind variation regex"));
static WIND_SHEAR_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^WS\d{3}/").expect("wind shear regex"));
static RVR_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^R\d{2}[LCR]?/").expect("rvr regex"));
static VIS_METERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}(NDV|N|NE|E|SE|S|SW|W|NW)?$").expect("metre visibility regex")
});
static VIS_DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[PM]?(\d{1,2} )?\d{1,2}(/\d{1,2})?(SM|KM)$").expect("distance visibility regex")
});
static VIS_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[PM]?\d{1,2}$").expect("bare visibility regex"));
static FRACTION_SM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d/\d{1,2}SM$").expect("fraction regex"));
static SKY_MISSING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(///|//////)(CB|TCU|///)?$").expect("sky regex"));
static TEMP_EXTREME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T[XN]M?\S*/\S*Z$").expect("temperature extreme regex"));
static TEMPERATURE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^M?[0-9X/]{2}/(M?[0-9X/]{1,2})?$").expect("temperature regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(report: &RawReport) -> Vec<TokenKind> {
        report.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_classify_observation_tokens() {
        let text = "KJFK 121651Z 28016KT 10SM FEW250 24/18 A3000";
        let report = tokenize(text, text, None).unwrap();
        assert_eq!(report.report_type, ReportType::Observation);
        assert_eq!(
            kinds(&report),
            vec![
                TokenKind::Station,
                TokenKind::Time,
                TokenKind::Wind,
                TokenKind::Visibility,
                TokenKind::Sky,
                TokenKind::Temperature,
                TokenKind::Pressure,
            ]
        );
        assert_eq!(report.station_code(), "KJFK");
        assert_eq!(report.body().len(), 5);
    }

    #[test]
    fn test_empty_is_fatal() {
        assert!(matches!(tokenize("", "", None), Err(SkywxError::EmptyReport)));
    }

    #[test]
    fn test_remarks_only_is_unrecognized_header() {
        let text = "RMK AO2 SLP176 T02440178";
        let err = tokenize(text, text, None).unwrap_err();
        assert!(matches!(err, SkywxError::UnrecognizedHeader { .. }));
    }

    #[test]
    fn test_missing_time_is_unrecognized_header() {
        let text = "KJFK 28016KT 10SM";
        assert!(tokenize(text, text, None).is_err());
    }

    #[test]
    fn test_detects_forecast_by_validity() {
        let text = "KJFK 121720Z 1218/1324 28016KT P6SM FEW250";
        let report = tokenize(text, text, None).unwrap();
        assert_eq!(report.report_type, ReportType::Forecast);
        assert_eq!(report.header.validity, Some(2));
        assert_eq!(report.header.body_start, 3);
    }

    #[test]
    fn test_forecast_header_with_prefix_and_amendment() {
        let text = "TAF AMD KJFK 121720Z 1218/1324 28016KT";
        let report = tokenize(text, text, None).unwrap();
        assert_eq!(report.station_code(), "KJFK");
        assert_eq!(report.header.time, Some(3));
    }

    #[test]
    fn test_hint_overrides_detection() {
        let text = "KJFK 121720Z 1218/1324 28016KT";
        let report = tokenize(text, text, Some(ReportType::Observation)).unwrap();
        assert_eq!(report.report_type, ReportType::Observation);
        assert_eq!(report.tokens[2].kind, TokenKind::Validity);
    }

    #[test]
    fn test_merges_rvr_trend() {
        let text = "EGLL 121650Z 24010KT 0800 R27L/0600 U FG";
        let report = tokenize(text, text, None).unwrap();
        let rvr = &report.tokens[4];
        assert_eq!(rvr.text, "R27L/0600 U");
        assert_eq!(rvr.kind, TokenKind::RunwayVisualRange);
        assert_eq!(report.tokens[5].kind, TokenKind::Weather);
    }

    #[test]
    fn test_merges_fractional_visibility() {
        let text = "KJFK 121651Z 28016KT 1 1/2SM BR";
        let report = tokenize(text, text, None).unwrap();
        assert_eq!(report.tokens[3].text, "1 1/2SM");
        assert_eq!(report.tokens[3].kind, TokenKind::Visibility);
    }

    #[test]
    fn test_merges_prob_tempo() {
        let text = "KJFK 121720Z 1218/1324 28016KT PROB30 TEMPO 1220/1222 TSRA";
        let report = tokenize(text, text, None).unwrap();
        assert!(report.tokens.iter().any(|t| t.text == "PROB30 TEMPO"));
    }

    #[test]
    fn test_remarks_tokens_and_peak_wind_merge() {
        let text = "KJFK 121651Z 28016KT RMK AO2 PK WND 28045/1955 SLP176";
        let report = tokenize(text, text, None).unwrap();
        let remarks: Vec<&str> = report.remarks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(remarks, vec!["AO2", "PK WND 28045/1955", "SLP176"]);
        assert!(report.remarks().iter().all(|t| t.kind == TokenKind::Remark));
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify("VRB03KT"), TokenKind::Wind);
        assert_eq!(classify("28016"), TokenKind::Wind);
        assert_eq!(classify("250V310"), TokenKind::WindVariation);
        assert_eq!(classify("WS020/24045KT"), TokenKind::WindShear);
        assert_eq!(classify("9999"), TokenKind::Visibility);
        assert_eq!(classify("CAVOK"), TokenKind::Visibility);
        assert_eq!(classify("M1/4SM"), TokenKind::Visibility);
        assert_eq!(classify("BKN0X5"), TokenKind::Sky);
        assert_eq!(classify("VV002"), TokenKind::Sky);
        assert_eq!(classify("M05/M10"), TokenKind::Temperature);
        assert_eq!(classify("TX25/1218Z"), TokenKind::TemperatureExtreme);
        assert_eq!(classify("Q1013"), TokenKind::Pressure);
        assert_eq!(classify("A30X0"), TokenKind::Pressure);
        assert_eq!(classify("QNH2992INS"), TokenKind::Pressure);
        assert_eq!(classify("+TSRA"), TokenKind::Weather);
        assert_eq!(classify("VCSH"), TokenKind::Weather);
        assert_eq!(classify("FM121800"), TokenKind::Transition);
        assert_eq!(classify("PROB3O"), TokenKind::Transition);
        assert_eq!(classify("XYZZY"), TokenKind::Unknown);
    }
}
