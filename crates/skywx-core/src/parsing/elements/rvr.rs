use super::{parse_run, ParseContext, Step};
use crate::model::{DistanceBound, RunwayVisualRange, RvrTrend, RvrValue, Unit};
use crate::parsing::tokenize::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static RVR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^R(?P<runway>\d{2}[LCR]?)/(?P<low>[PM]?\d{4})(V(?P<high>[PM]?\d{4}))?(?P<feet>FT)?/?(?P<trend>[UDN])?$",
    )
    .expect("rvr regex")
});

/// Parse the run of runway visual range groups, e.g.
/// `R27L/0600 U R09R/1200V1800FT/D`.
pub fn parse_rvr(tokens: &[Token], _ctx: &ParseContext) -> Step<Vec<RunwayVisualRange>> {
    parse_run(tokens, TokenKind::RunwayVisualRange, decode)
}

fn decode(text: &str) -> Option<RunwayVisualRange> {
    let compact: String = text.split_whitespace().collect();
    let caps = RVR.captures(&compact)?;
    Some(RunwayVisualRange {
        repr: text.to_string(),
        runway: caps["runway"].to_string(),
        low: value(&caps["low"])?,
        high: match caps.name("high") {
            Some(h) => Some(value(h.as_str())?),
            None => None,
        },
        unit: if caps.name("feet").is_some() {
            Unit::Feet
        } else {
            Unit::Meters
        },
        trend: caps.name("trend").map(|t| match t.as_str() {
            "U" => RvrTrend::Up,
            "D" => RvrTrend::Down,
            _ => RvrTrend::NoChange,
        }),
    })
}

fn value(text: &str) -> Option<RvrValue> {
    let (bound, digits) = match text.as_bytes().first() {
        Some(b'P') => (DistanceBound::AtLeast, &text[1..]),
        Some(b'M') => (DistanceBound::LessThan, &text[1..]),
        _ => (DistanceBound::Exact, text),
    };
    Some(RvrValue {
        value: digits.parse().ok()?,
        bound,
    })
}
