//! Per-field parsers.
//!
//! Every parser takes the tokens from the caller's cursor onward and
//! reports how many leading tokens it consumed. A parser that does not
//! recognise the first token returns `Absent` and consumes nothing, so the
//! next parser can try the same token.

pub mod pressure;
pub mod rvr;
pub mod sky;
pub mod temperature;
pub mod time;
pub mod visibility;
pub mod weather;
pub mod wind;

use crate::model::ParsedElement;
use crate::parsing::tokenize::{Token, TokenKind};
use crate::station::Station;
use crate::units::UnitPolicy;
use chrono::NaiveDate;

/// Read-only context shared by all parsers of one report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext<'a> {
    pub station: Option<&'a Station>,
    pub policy: UnitPolicy,
    pub reference_date: Option<NaiveDate>,
}

/// Result of one parser attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub element: ParsedElement<T>,
    pub consumed: usize,
}

impl<T> Step<T> {
    pub fn absent() -> Self {
        Self {
            element: ParsedElement::Absent,
            consumed: 0,
        }
    }

    pub fn present(value: T, consumed: usize) -> Self {
        Self {
            element: ParsedElement::Present(value),
            consumed,
        }
    }

    pub fn malformed(raw: impl Into<String>, consumed: usize) -> Self {
        Self {
            element: ParsedElement::Malformed(raw.into()),
            consumed,
        }
    }
}

/// Length of the leading run of tokens of `kind`.
pub(crate) fn run_len(tokens: &[Token], kind: TokenKind) -> usize {
    tokens.iter().take_while(|t| t.kind == kind).count()
}

/// Parse a run of same-kind tokens into a list. Any malformed member makes
/// the whole run malformed, reported with its full text.
pub(crate) fn parse_run<T>(
    tokens: &[Token],
    kind: TokenKind,
    parse_one: impl Fn(&str) -> Option<T>,
) -> Step<Vec<T>> {
    let len = run_len(tokens, kind);
    if len == 0 {
        return Step::absent();
    }
    let run = &tokens[..len];
    match run.iter().map(|t| parse_one(&t.text)).collect::<Option<Vec<T>>>() {
        Some(items) => Step::present(items, len),
        None => Step::malformed(join(run), len),
    }
}

pub(crate) fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a possibly `M`-prefixed (negative) integer of at most `max_digits`.
pub(crate) fn signed(text: &str, max_digits: usize) -> Option<i16> {
    let (negative, digits) = match text.strip_prefix('M') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty()
        || digits.len() > max_digits
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let value: i16 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
