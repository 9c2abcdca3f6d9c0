use super::{ParseContext, Step};
use crate::model::{Timestamp, ValidityWindow};
use crate::parsing::tokenize::{Token, TokenKind};
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

/// Parse the issue time group `DDHHMMZ`.
pub fn parse_time(tokens: &[Token], ctx: &ParseContext) -> Step<Timestamp> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::Time) else {
        return Step::absent();
    };
    let digits = token.text.get(..6).unwrap_or_default();
    match ddhhmm(&token.text, digits, ctx) {
        Some(ts) => Step::present(ts, 1),
        None => Step::malformed(token.text.clone(), 1),
    }
}

/// Parse a validity window `DDHH/DDHH`. The end hour may be `24`.
pub fn parse_validity(tokens: &[Token], ctx: &ParseContext) -> Step<ValidityWindow> {
    let Some(token) = tokens.first().filter(|t| t.kind == TokenKind::Validity) else {
        return Step::absent();
    };
    match validity_window(&token.text, ctx) {
        Some(window) => Step::present(window, 1),
        None => Step::malformed(token.text.clone(), 1),
    }
}

/// Decode a `DDHH/DDHH` group outside the token stream (transition windows).
pub fn validity_window(text: &str, ctx: &ParseContext) -> Option<ValidityWindow> {
    let (start, end) = text.split_once('/')?;
    Some(ValidityWindow {
        repr: text.to_string(),
        start: ddhh(start, ctx)?,
        end: ddhh(end, ctx)?,
    })
}

/// Decode the time of a `FM` marker.
///
/// Handles:
/// - `FM121800` -> day 12, 18:00
/// - `FM1800` -> 18:00, no day (legacy)
pub fn from_marker(text: &str, ctx: &ParseContext) -> Option<Timestamp> {
    let digits = text.strip_prefix("FM")?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match digits.len() {
        6 => ddhhmm(text, digits, ctx),
        4 => {
            let hour = digits[..2].parse().ok()?;
            let minute = digits[2..].parse().ok()?;
            timestamp(text, None, hour, minute, ctx)
        }
        _ => None,
    }
}

/// `DDHH` half of a validity window or the time of a temperature extreme.
pub fn ddhh(text: &str, ctx: &ParseContext) -> Option<Timestamp> {
    if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day = text[..2].parse().ok()?;
    let hour = text[2..].parse().ok()?;
    timestamp(text, Some(day), hour, 0, ctx)
}

fn ddhhmm(repr: &str, digits: &str, ctx: &ParseContext) -> Option<Timestamp> {
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day = digits[..2].parse().ok()?;
    let hour = digits[2..4].parse().ok()?;
    let minute = digits[4..].parse().ok()?;
    timestamp(repr, Some(day), hour, minute, ctx)
}

/// Range-check the parts and resolve against the reference date, if any.
pub fn timestamp(
    repr: &str,
    day: Option<u8>,
    hour: u8,
    minute: u8,
    ctx: &ParseContext,
) -> Option<Timestamp> {
    if day.is_some_and(|d| !(1..=31).contains(&d)) || minute > 59 || hour > 24 {
        return None;
    }
    if hour == 24 && minute != 0 {
        return None;
    }
    Some(Timestamp {
        repr: repr.to_string(),
        day,
        hour,
        minute,
        resolved: ctx
            .reference_date
            .and_then(|reference| resolve(day, hour, minute, reference)),
    })
}

/// Place a day-of-month in the month nearest to `reference`.
fn resolve(day: Option<u8>, hour: u8, minute: u8, reference: NaiveDate) -> Option<NaiveDateTime> {
    let date = match day {
        None => reference,
        Some(day) => {
            let first = reference.with_day(1)?;
            [
                first.checked_sub_months(Months::new(1)),
                Some(first),
                first.checked_add_months(Months::new(1)),
            ]
            .into_iter()
            .flatten()
            .filter_map(|month| month.with_day(u32::from(day)))
            .min_by_key(|d| (*d - reference).num_days().abs())?
        }
    };
    if hour == 24 {
        date.checked_add_days(Days::new(1))?
            .and_hms_opt(0, u32::from(minute), 0)
    } else {
        date.and_hms_opt(u32::from(hour), u32::from(minute), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParsedElement;
    use crate::parsing::elements::tests::tokens;

    fn ctx_on(y: i32, m: u32, d: u32) -> ParseContext<'static> {
        ParseContext {
            reference_date: NaiveDate::from_ymd_opt(y, m, d),
            ..Default::default()
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_short_time_token_is_malformed() {
        let short = [Token {
            text: "12".into(),
            position: 0,
            kind: TokenKind::Time,
        }];
        let step = parse_time(&short, &ParseContext::default());
        assert_eq!(step.element, ParsedElement::Malformed("12".into()));
        assert_eq!(step.consumed, 1);
    }

    #[test]
    fn test_issue_time() {
        let step = parse_time(&tokens("121651Z 28016KT"), &ParseContext::default());
        assert_eq!(step.consumed, 1);
        let ts = step.element.present().unwrap();
        assert_eq!((ts.day, ts.hour, ts.minute), (Some(12), 16, 51));
        assert!(ts.resolved.is_none());
    }

    #[test]
    fn test_issue_time_out_of_range() {
        let step = parse_time(&tokens("991299Z"), &ParseContext::default());
        assert_eq!(step.element, ParsedElement::Malformed("991299Z".into()));
        assert_eq!(step.consumed, 1);
    }

    #[test]
    fn test_not_a_time() {
        let step = parse_time(&tokens("28016KT"), &ParseContext::default());
        assert_eq!(step, Step::absent());
    }

    #[test]
    fn test_resolves_against_reference() {
        let step = parse_time(&tokens("121651Z"), &ctx_on(2024, 3, 13));
        let ts = step.element.present().unwrap();
        assert_eq!(ts.resolved, Some(dt(2024, 3, 12, 16, 51)));
    }

    #[test]
    fn test_resolves_into_previous_month() {
        let step = parse_time(&tokens("312350Z"), &ctx_on(2024, 4, 1));
        let ts = step.element.present().unwrap();
        assert_eq!(ts.resolved, Some(dt(2024, 3, 31, 23, 50)));
    }

    #[test]
    fn test_validity_end_hour_24() {
        let step = parse_validity(&tokens("1218/1324"), &ctx_on(2024, 3, 12));
        let window = step.element.present().unwrap();
        assert_eq!(window.start.resolved, Some(dt(2024, 3, 12, 18, 0)));
        assert_eq!(window.end.hour, 24);
        assert_eq!(window.end.resolved, Some(dt(2024, 3, 14, 0, 0)));
    }

    #[test]
    fn test_validity_malformed() {
        let step = parse_validity(&tokens("1218/1399"), &ParseContext::default());
        assert!(step.element.is_malformed());
    }

    #[test]
    fn test_from_marker_forms() {
        let ctx = ParseContext::default();
        let full = from_marker("FM121800", &ctx).unwrap();
        assert_eq!((full.day, full.hour, full.minute), (Some(12), 18, 0));
        let legacy = from_marker("FM1830", &ctx).unwrap();
        assert_eq!((legacy.day, legacy.hour, legacy.minute), (None, 18, 30));
        assert!(from_marker("FM12", &ctx).is_none());
        assert!(from_marker("FM12X800", &ctx).is_none());
    }
}
