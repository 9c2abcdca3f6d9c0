use super::{join, run_len, signed, time, ParseContext, Step};
use crate::model::{ExtremeKind, TemperatureDewpoint, TemperatureExtreme};
use crate::parsing::tokenize::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static EXTREME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^T(?P<kind>[XN])(?P<value>M?\d{1,2})/(?P<when>\d{4})Z$")
        .expect("temperature extreme regex")
});

/// Parse `tt/dd` in whole degrees Celsius; `M` marks negatives.
///
/// Either half may be missing (`24/`, `//`, `XX`) and is then `None`.
pub fn parse_temperature(tokens: &[Token], _ctx: &ParseContext) -> Step<TemperatureDewpoint> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::Temperature) else {
        return Step::absent();
    };
    match decode(&token.text) {
        Some(td) => Step::present(td, 1),
        None => Step::malformed(token.text.clone(), 1),
    }
}

fn decode(text: &str) -> Option<TemperatureDewpoint> {
    let (temp, dew) = text.split_once('/')?;
    Some(TemperatureDewpoint {
        repr: text.to_string(),
        temperature: half(temp)?,
        dewpoint: half(dew)?,
    })
}

/// `Some(None)` for a missing half.
fn half(text: &str) -> Option<Option<i16>> {
    if text.is_empty() || text.chars().all(|c| c == '/' || c == 'X') {
        return Some(None);
    }
    signed(text, 2).map(Some)
}

/// Parse the run of forecast maximum/minimum groups, e.g. `TX25/1218Z TNM02/1306Z`.
pub fn parse_extremes(tokens: &[Token], ctx: &ParseContext) -> Step<Vec<TemperatureExtreme>> {
    let len = run_len(tokens, TokenKind::TemperatureExtreme);
    if len == 0 {
        return Step::absent();
    }
    let run = &tokens[..len];
    let decoded = run
        .iter()
        .map(|t| decode_extreme(&t.text, ctx))
        .collect::<Option<Vec<_>>>();
    match decoded {
        Some(extremes) => Step::present(extremes, len),
        None => Step::malformed(join(run), len),
    }
}

fn decode_extreme(text: &str, ctx: &ParseContext) -> Option<TemperatureExtreme> {
    let caps = EXTREME.captures(text)?;
    Some(TemperatureExtreme {
        repr: text.to_string(),
        kind: if &caps["kind"] == "X" {
            ExtremeKind::Maximum
        } else {
            ExtremeKind::Minimum
        },
        value: signed(&caps["value"], 2)?,
        at: time::ddhh(&caps["when"], ctx)?,
    })
}
