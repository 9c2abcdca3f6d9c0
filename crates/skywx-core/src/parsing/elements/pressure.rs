use super::{join, run_len, ParseContext, Step};
use crate::model::{Altimeter, ParsedElement, Pressure, Unit};
use crate::parsing::tokenize::{Token, TokenKind};
use crate::units::{self, FieldKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>A|Q|QNH)(?P<value>\d{4})(INS|HPA)?$").expect("pressure regex")
});

/// Parse up to two altimeter groups (primary and alternate).
///
/// Handles:
/// - `A3000` -> 30.00 inHg
/// - `Q1013` -> 1013 hPa
/// - `QNH2992INS`, `QNH1013HPA`
/// - `QNH2992` (unit from station region)
/// - `Q////` -> consumed but absent
pub fn parse_pressure(tokens: &[Token], ctx: &ParseContext) -> Step<Altimeter> {
    let len = run_len(tokens, TokenKind::Pressure).min(2);
    if len == 0 {
        return Step::absent();
    }
    let run = &tokens[..len];

    let mut groups = Vec::with_capacity(len);
    for token in run {
        if token.text.ends_with("////") {
            continue;
        }
        match decode(&token.text, ctx) {
            Some(p) => groups.push(p),
            None => return Step::malformed(join(run), len),
        }
    }

    let mut groups = groups.into_iter();
    match groups.next() {
        Some(primary) => Step::present(
            Altimeter {
                primary,
                alternate: groups.next(),
            },
            len,
        ),
        None => Step {
            element: ParsedElement::Absent,
            consumed: len,
        },
    }
}

fn decode(text: &str, ctx: &ParseContext) -> Option<Pressure> {
    let caps = GROUP.captures(text)?;
    let raw: i64 = caps["value"].parse().ok()?;
    let resolution = units::resolve(FieldKind::Pressure, text, ctx.station, ctx.policy);
    let value = match resolution.unit {
        // Reported in hundredths of an inch.
        Unit::InchesOfMercury => Decimal::new(raw, 2),
        _ => Decimal::from(raw),
    };
    Some(Pressure {
        repr: text.to_string(),
        value,
        unit: resolution.unit,
        confidence: resolution.confidence,
    })
}
