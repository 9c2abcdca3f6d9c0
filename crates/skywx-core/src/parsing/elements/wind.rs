use super::{ParseContext, Step};
use crate::model::{VariableSector, Wind, WindDirection, WindShear};
use crate::parsing::tokenize::{Token, TokenKind};
use crate::units::{self, FieldKind};
use regex::Regex;
use std::sync::LazyLock;

static WIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<dir>\d{3}|VRB|///)(?P<speed>\d{2,3}|//)(G(?P<gust>\d{2,3}|//))?(KT|MPS|KMH)?$")
        .expect("wind regex")
});
static SHEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^WS(?P<height>\d{3})/(?P<dir>\d{3})(?P<speed>\d{2,3})(KT|MPS)?$")
        .expect("wind shear regex")
});

/// Parse surface wind, plus the variable sector group that may follow.
///
/// Handles:
/// - `28016KT`, `28016G25KT`, `27005MPS`
/// - `VRB03KT` (variable), `00000KT` (calm), `/////KT` (missing)
/// - `28016` without unit (resolved by station region)
/// - `28016KT 250V310`
pub fn parse_wind(tokens: &[Token], ctx: &ParseContext) -> Step<Wind> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::Wind) else {
        return Step::absent();
    };
    let Some(mut wind) = decode_wind(&token.text, ctx) else {
        return Step::malformed(token.text.clone(), 1);
    };

    match tokens.get(1).filter(|t| t.kind == TokenKind::WindVariation) {
        Some(variation) => match decode_sector(&variation.text) {
            Some(sector) => {
                wind.variable_sector = Some(sector);
                wind.repr = format!("{} {}", token.text, variation.text);
                Step::present(wind, 2)
            }
            None => Step::malformed(format!("{} {}", token.text, variation.text), 2),
        },
        None => Step::present(wind, 1),
    }
}

fn decode_wind(text: &str, ctx: &ParseContext) -> Option<Wind> {
    let caps = WIND.captures(text)?;
    let direction = match &caps["dir"] {
        "VRB" => WindDirection::Variable,
        "///" => WindDirection::Missing,
        digits => WindDirection::Degrees(degrees(digits)?),
    };
    let speed = knots_or_missing(&caps["speed"])?;
    let gust = match caps.name("gust") {
        Some(g) => knots_or_missing(g.as_str())?,
        None => None,
    };
    let resolution = units::resolve(FieldKind::WindSpeed, text, ctx.station, ctx.policy);

    Some(Wind {
        repr: text.to_string(),
        direction,
        speed,
        gust,
        unit: resolution.unit,
        confidence: resolution.confidence,
        variable_sector: None,
    })
}

/// `Some(None)` for slashed-out digits, `None` for garbage.
fn knots_or_missing(text: &str) -> Option<Option<u16>> {
    if text.chars().all(|c| c == '/') {
        Some(None)
    } else {
        text.parse().ok().map(Some)
    }
}

fn degrees(text: &str) -> Option<u16> {
    text.parse().ok().filter(|d| *d <= 360)
}

fn decode_sector(text: &str) -> Option<VariableSector> {
    let (from, to) = text.split_once('V')?;
    Some(VariableSector {
        from: degrees(from)?,
        to: degrees(to)?,
    })
}

/// Parse a low-level wind shear group `WShhh/dddffKT` (height in hundreds of feet).
pub fn parse_wind_shear(tokens: &[Token], ctx: &ParseContext) -> Step<WindShear> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::WindShear) else {
        return Step::absent();
    };
    let decoded = SHEAR.captures(&token.text).and_then(|caps| {
        Some(WindShear {
            repr: token.text.clone(),
            height_ft: caps["height"].parse::<u32>().ok()? * 100,
            direction: degrees(&caps["dir"])?,
            speed: caps["speed"].parse().ok()?,
            unit: units::resolve(FieldKind::WindSpeed, &token.text, ctx.station, ctx.policy).unit,
        })
    });
    match decoded {
        Some(shear) => Step::present(shear, 1),
        None => Step::malformed(token.text.clone(), 1),
    }
}
