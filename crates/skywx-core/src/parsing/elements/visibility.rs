use super::{ParseContext, Step};
use crate::model::{
    DirectionalMinimum, DistanceBound, ParsedElement, Unit, UnitConfidence, Visibility,
};
use crate::parsing::tokenize::{Token, TokenKind};
use crate::units::{self, FieldKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static METRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<value>\d{4})(?P<qualifier>NDV|N|NE|E|SE|S|SW|W|NW)?$")
        .expect("metre visibility regex")
});
static MINIMUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<value>\d{4})(?P<direction>N|NE|E|SE|S|SW|W|NW)$")
        .expect("minimum visibility regex")
});
static DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<bound>[PM])?((?P<whole>\d{1,2}) )?(?P<num>\d{1,2})(/(?P<den>\d{1,2}))?(SM|KM)?$",
    )
    .expect("distance visibility regex")
});

/// Parse prevailing visibility.
///
/// Handles:
/// - `CAVOK` -> 10 km or more, `cavok` set
/// - `9999` -> 10 km or more; `0800`, `4000NDV`, `2000SW` in metres
/// - `10SM`, `P6SM`, `M1/4SM`, `1 1/2SM`, `10KM`
/// - `10` with no unit (resolved by station region)
/// - `////` -> consumed but absent
///
/// A metre visibility may be followed by a directional minimum
/// (`4000 1500SW`), which is consumed with it.
pub fn parse_visibility(tokens: &[Token], ctx: &ParseContext) -> Step<Visibility> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::Visibility) else {
        return Step::absent();
    };
    let text = token.text.as_str();

    if text == "////" {
        return Step {
            element: ParsedElement::Absent,
            consumed: 1,
        };
    }

    match decode(text, ctx) {
        Some(mut vis) => {
            if vis.unit == Unit::Meters {
                vis.minimum = tokens
                    .get(1)
                    .filter(|t| t.kind == TokenKind::Visibility)
                    .and_then(|t| directional_minimum(&t.text));
            }
            let consumed = if vis.minimum.is_some() { 2 } else { 1 };
            Step::present(vis, consumed)
        }
        None => Step::malformed(text, 1),
    }
}

fn directional_minimum(text: &str) -> Option<DirectionalMinimum> {
    let caps = MINIMUM.captures(text)?;
    let value: u32 = caps["value"].parse().ok()?;
    Some(DirectionalMinimum {
        repr: text.to_string(),
        distance: Decimal::from(value),
        direction: caps["direction"].to_string(),
    })
}

fn decode(text: &str, ctx: &ParseContext) -> Option<Visibility> {
    if text == "CAVOK" {
        return Some(Visibility {
            repr: text.to_string(),
            distance: Decimal::from(10),
            bound: DistanceBound::AtLeast,
            unit: Unit::Kilometers,
            confidence: UnitConfidence::Explicit,
            cavok: true,
            qualifier: None,
            minimum: None,
        });
    }

    if let Some(caps) = METRES.captures(text) {
        let value: u32 = caps["value"].parse().ok()?;
        let bound = if value == 9999 {
            DistanceBound::AtLeast
        } else {
            DistanceBound::Exact
        };
        return Some(Visibility {
            repr: text.to_string(),
            distance: Decimal::from(value),
            bound,
            unit: Unit::Meters,
            confidence: UnitConfidence::Explicit,
            cavok: false,
            qualifier: caps.name("qualifier").map(|q| q.as_str().to_string()),
            minimum: None,
        });
    }

    let caps = DISTANCE.captures(text)?;
    let bound = match caps.name("bound").map(|b| b.as_str()) {
        Some("P") => DistanceBound::AtLeast,
        Some("M") => DistanceBound::LessThan,
        _ => DistanceBound::Exact,
    };
    let whole = match caps.name("whole") {
        Some(w) => w.as_str().parse::<u32>().ok()?,
        None => 0,
    };
    let num: u32 = caps["num"].parse().ok()?;
    let distance = match caps.name("den") {
        Some(den) => {
            let den: u32 = den.as_str().parse().ok()?;
            if den == 0 {
                return None;
            }
            Decimal::from(whole) + Decimal::from(num) / Decimal::from(den)
        }
        // "1 5SM" is not a fraction
        None if caps.name("whole").is_some() => return None,
        None => Decimal::from(num),
    };

    let resolution = units::resolve(FieldKind::Visibility, text, ctx.station, ctx.policy);
    Some(Visibility {
        repr: text.to_string(),
        distance,
        bound,
        unit: resolution.unit,
        confidence: resolution.confidence,
        cavok: false,
        qualifier: None,
        minimum: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::elements::tests::tokens;
    use crate::station::tests::station;
    use rust_decimal_macros::dec;

    fn vis(text: &str) -> Step<Visibility> {
        parse_visibility(&tokens(text), &ParseContext::default())
    }

    #[test]
    fn test_statute_miles() {
        let v = vis("10SM FEW250").element.present().cloned().unwrap();
        assert_eq!(v.distance, dec!(10));
        assert_eq!(v.unit, Unit::StatuteMiles);
        assert_eq!(v.bound, DistanceBound::Exact);
    }

    #[test]
    fn test_bounds_and_fractions() {
        let p6 = vis("P6SM").element.present().cloned().unwrap();
        assert_eq!(p6.bound, DistanceBound::AtLeast);
        assert_eq!(p6.distance, dec!(6));

        let quarter = vis("M1/4SM").element.present().cloned().unwrap();
        assert_eq!(quarter.bound, DistanceBound::LessThan);
        assert_eq!(quarter.distance, dec!(0.25));

        let mixed = parse_visibility(
            &[Token {
                text: "1 1/2SM".into(),
                position: 0,
                kind: TokenKind::Visibility,
            }],
            &ParseContext::default(),
        );
        assert_eq!(mixed.element.present().unwrap().distance, dec!(1.5));
    }

    #[test]
    fn test_metres() {
        let v = vis("0800").element.present().cloned().unwrap();
        assert_eq!(v.distance, dec!(800));
        assert_eq!(v.unit, Unit::Meters);

        let v = vis("9999").element.present().cloned().unwrap();
        assert_eq!(v.bound, DistanceBound::AtLeast);

        let v = vis("4000NDV").element.present().cloned().unwrap();
        assert_eq!(v.qualifier.as_deref(), Some("NDV"));
    }

    #[test]
    fn test_directional_minimum_consumed_with_prevailing() {
        let step = vis("4000 1500SW BR");
        assert_eq!(step.consumed, 2);
        let v = step.element.present().cloned().unwrap();
        assert_eq!(v.distance, dec!(4000));
        let minimum = v.minimum.unwrap();
        assert_eq!(minimum.distance, dec!(1500));
        assert_eq!(minimum.direction, "SW");
    }

    #[test]
    fn test_minimum_needs_a_direction() {
        // A second bare group is not a minimum
        let step = vis("4000 1500");
        assert_eq!(step.consumed, 1);
        assert!(step.element.present().unwrap().minimum.is_none());

        // Statute miles never carry one
        let step = vis("10SM 1500SW");
        assert_eq!(step.consumed, 1);
    }

    #[test]
    fn test_cavok() {
        let v = vis("CAVOK").element.present().cloned().unwrap();
        assert!(v.cavok);
        assert_eq!(v.distance, dec!(10));
        assert_eq!(v.unit, Unit::Kilometers);
    }

    #[test]
    fn test_missing_consumed_as_absent() {
        let step = vis("//// FEW020");
        assert_eq!(step.element, ParsedElement::Absent);
        assert_eq!(step.consumed, 1);
    }

    #[test]
    fn test_bare_number_uses_station_region() {
        let us = station("KJFK", "US", 40.6, -73.8);
        let ctx = ParseContext {
            station: Some(&us),
            ..Default::default()
        };
        let v = parse_visibility(&tokens("10"), &ctx);
        let v = v.element.present().unwrap();
        assert_eq!(v.unit, Unit::StatuteMiles);
        assert_eq!(v.confidence, UnitConfidence::Regional);
    }

    #[test]
    fn test_zero_denominator_malformed() {
        assert!(vis("1/0SM").element.is_malformed());
    }
}
