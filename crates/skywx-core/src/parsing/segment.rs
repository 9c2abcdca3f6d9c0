//! Forecast period segmentation.
//!
//! A forecast body is a baseline followed by transition segments, each
//! opened by a marker (`FM`, `BECMG`, `TEMPO`, `PROBnn`, `INTER`). The same
//! machine splits the trend section of an observation. Segments are
//! independent: nothing carries over from one to the next.

use crate::model::{Timestamp, TransitionKind, UnconsumedToken, ValidityWindow};
use crate::parsing::elements::time;
use crate::parsing::elements::ParseContext;
use crate::parsing::tokenize::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `FMhhmm`, `TLhhmm`, `AThhmm` time qualifiers in trend groups.
static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FM|TL|AT)(\d{4})$").expect("trend qualifier regex"));

/// One period's slice of the token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'t> {
    pub kind: TransitionKind,
    pub probability: Option<u8>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    /// Every token of the segment, marker included.
    pub tokens: &'t [Token],
    /// Leading tokens taken by the marker and its time groups.
    pub header_len: usize,
}

impl<'t> Segment<'t> {
    /// Tokens left for the element parsers.
    pub fn body(&self) -> &'t [Token] {
        &self.tokens[self.header_len..]
    }

    /// Absolute position of the first token (the marker, if any).
    pub fn start_token(&self) -> Option<usize> {
        self.tokens.first().map(|t| t.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation<'t> {
    /// Baseline first, then transitions in textual order.
    pub segments: Vec<Segment<'t>>,
    /// Transition-shaped tokens that failed to decode. They stay inside
    /// the open segment's body.
    pub malformed: Vec<UnconsumedToken>,
}

/// What a marker token decodes to.
struct Marker {
    kind: TransitionKind,
    probability: Option<u8>,
    from: Option<Timestamp>,
}

/// Split `tokens` into periods. `window` is the report's validity, used
/// for the baseline and to close the last `FM` period.
pub fn segment<'t>(
    tokens: &'t [Token],
    window: Option<&ValidityWindow>,
    ctx: &ParseContext,
) -> Segmentation<'t> {
    let mut malformed = Vec::new();
    // (index into tokens, decoded marker); the baseline has no marker.
    let mut opens: Vec<(usize, Option<Marker>)> = vec![(0, None)];

    // After BECMG/TEMPO, `FMhhmm` is a time qualifier rather than a new period.
    let mut qualifiers_open = false;

    for (i, token) in tokens.iter().enumerate() {
        if qualifiers_open && QUALIFIER.is_match(&token.text) {
            continue;
        }
        qualifiers_open = false;
        if token.kind != TokenKind::Transition {
            continue;
        }
        match decode_marker(&token.text, ctx) {
            Some(marker) => {
                qualifiers_open = marker.kind != TransitionKind::From;
                opens.push((i, Some(marker)));
            }
            None => {
                warn!(token = %token.text, position = token.position, "malformed transition marker");
                malformed.push(UnconsumedToken {
                    position: token.position,
                    text: token.text.clone(),
                });
            }
        }
    }

    let mut segments = Vec::with_capacity(opens.len());
    for (n, (open, marker)) in opens.iter().enumerate() {
        let close = opens.get(n + 1).map_or(tokens.len(), |(next, _)| *next);
        let slice = &tokens[*open..close];

        let segment = match marker {
            None => Segment {
                kind: TransitionKind::Baseline,
                probability: None,
                start: window.map(|w| w.start.clone()),
                end: window.map(|w| w.end.clone()),
                tokens: slice,
                header_len: 0,
            },
            Some(marker) => open_segment(marker, slice, ctx),
        };
        debug!(kind = ?segment.kind, tokens = slice.len(), "segment");
        segments.push(segment);
    }

    close_from_periods(&mut segments, window);

    Segmentation {
        segments,
        malformed,
    }
}

fn decode_marker(text: &str, ctx: &ParseContext) -> Option<Marker> {
    let plain = |kind| {
        Some(Marker {
            kind,
            probability: None,
            from: None,
        })
    };
    match text {
        "BECMG" => return plain(TransitionKind::Becoming),
        "TEMPO" => return plain(TransitionKind::Temporary),
        "INTER" => return plain(TransitionKind::Intermittent),
        "NOSIG" => return plain(TransitionKind::NoSignificantChange),
        _ => {}
    }

    if let Some(rest) = text.strip_prefix("PROB") {
        let (digits, qualifier) = match rest.split_once(' ') {
            Some((d, q)) => (d, Some(q)),
            None => (rest, None),
        };
        if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let kind = match qualifier {
            None => TransitionKind::Probability,
            Some("TEMPO") => TransitionKind::Temporary,
            Some("INTER") => TransitionKind::Intermittent,
            Some(_) => return None,
        };
        return Some(Marker {
            kind,
            probability: Some(digits.parse().ok()?),
            from: None,
        });
    }

    let from = time::from_marker(text, ctx)?;
    Some(Marker {
        kind: TransitionKind::From,
        probability: None,
        from: Some(from),
    })
}

/// Build a transition segment, taking the time groups after its marker.
fn open_segment<'t>(marker: &Marker, slice: &'t [Token], ctx: &ParseContext) -> Segment<'t> {
    let mut segment = Segment {
        kind: marker.kind,
        probability: marker.probability,
        start: marker.from.clone(),
        end: None,
        tokens: slice,
        header_len: 1,
    };
    if marker.kind == TransitionKind::From {
        return segment;
    }

    // TAF style: a DDHH/DDHH window right after the marker.
    if let Some(window) = slice
        .get(1)
        .filter(|t| t.kind == TokenKind::Validity)
        .and_then(|t| time::validity_window(&t.text, ctx))
    {
        segment.start = Some(window.start);
        segment.end = Some(window.end);
        segment.header_len = 2;
        return segment;
    }

    // Trend style: FMhhmm / TLhhmm / AThhmm qualifiers.
    for token in &slice[1..] {
        let Some(caps) = QUALIFIER.captures(&token.text) else {
            break;
        };
        let hour: Option<u8> = caps[2][..2].parse().ok();
        let minute: Option<u8> = caps[2][2..].parse().ok();
        let Some(ts) = hour
            .zip(minute)
            .and_then(|(h, m)| time::timestamp(&token.text, None, h, m, ctx))
        else {
            break;
        };
        match &caps[1] {
            "FM" => segment.start = Some(ts),
            "TL" => segment.end = Some(ts),
            _ => {
                segment.start = Some(ts.clone());
                segment.end = Some(ts);
            }
        }
        segment.header_len += 1;
    }
    segment
}

/// An `FM` period lasts until the next `FM` period starts, or the report ends.
fn close_from_periods(segments: &mut [Segment<'_>], window: Option<&ValidityWindow>) {
    let from_starts: Vec<(usize, Option<Timestamp>)> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == TransitionKind::From)
        .map(|(i, s)| (i, s.start.clone()))
        .collect();

    for (n, (idx, _)) in from_starts.iter().enumerate() {
        segments[*idx].end = match from_starts.get(n + 1) {
            Some((_, next_start)) => next_start.clone(),
            None => window.map(|w| w.end.clone()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tokenize::tokenize;

    fn body_tokens(text: &str) -> Vec<Token> {
        let report = tokenize(text, text, None).unwrap();
        report.body().to_vec()
    }

    fn window() -> ValidityWindow {
        time::validity_window("1218/1324", &ParseContext::default()).unwrap()
    }

    #[test]
    fn test_single_becmg_yields_two_periods() {
        let text = "KJFK 121720Z 1218/1324 28016KT P6SM FEW250 BECMG 1302/1304 31010KT";
        let tokens = body_tokens(text);
        let seg = segment(&tokens, Some(&window()), &ParseContext::default());

        assert_eq!(seg.segments.len(), 2);
        assert!(seg.malformed.is_empty());
        assert_eq!(seg.segments[0].kind, TransitionKind::Baseline);
        assert_eq!(seg.segments[0].body().len(), 3);

        let becmg = &seg.segments[1];
        assert_eq!(becmg.kind, TransitionKind::Becoming);
        assert_eq!(becmg.start_token(), Some(6));
        assert_eq!(becmg.start.as_ref().map(|t| (t.day, t.hour)), Some((Some(13), 2)));
        assert_eq!(becmg.body().len(), 1);
    }

    #[test]
    fn test_from_periods_chain_ends() {
        let text = "KJFK 121720Z 1218/1324 28016KT P6SM FM130000 30012KT FM131200 32008KT";
        let tokens = body_tokens(text);
        let w = window();
        let seg = segment(&tokens, Some(&w), &ParseContext::default());

        assert_eq!(seg.segments.len(), 3);
        let first = &seg.segments[1];
        let second = &seg.segments[2];
        assert_eq!(first.end, second.start);
        assert_eq!(second.end.as_ref(), Some(&w.end));
        assert_eq!(first.header_len, 1);
    }

    #[test]
    fn test_prob_forms() {
        let text =
            "KJFK 121720Z 1218/1324 28016KT PROB30 1220/1222 TSRA PROB40 TEMPO 1300/1302 SHRA";
        let tokens = body_tokens(text);
        let seg = segment(&tokens, Some(&window()), &ParseContext::default());

        assert_eq!(seg.segments[1].kind, TransitionKind::Probability);
        assert_eq!(seg.segments[1].probability, Some(30));
        assert_eq!(seg.segments[2].kind, TransitionKind::Temporary);
        assert_eq!(seg.segments[2].probability, Some(40));
    }

    #[test]
    fn test_malformed_marker_folds_into_open_period() {
        let text = "KJFK 121720Z 1218/1324 28016KT PROB3O 1220/1222 TSRA";
        let tokens = body_tokens(text);
        let seg = segment(&tokens, Some(&window()), &ParseContext::default());

        assert_eq!(seg.segments.len(), 1);
        assert_eq!(seg.malformed.len(), 1);
        assert_eq!(seg.malformed[0].text, "PROB3O");
        assert_eq!(seg.segments[0].tokens.len(), 4);
    }

    #[test]
    fn test_trend_qualifiers() {
        let text = "EGLL 121650Z 24010KT 9999 FEW030 18/09 Q1013 BECMG FM1700 TL1800 25015KT";
        let tokens = body_tokens(text);
        let trend_at = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Transition)
            .unwrap();
        let seg = segment(&tokens[trend_at..], None, &ParseContext::default());

        assert!(seg.segments[0].tokens.is_empty());
        let becmg = &seg.segments[1];
        assert_eq!(becmg.header_len, 3);
        assert_eq!(becmg.start.as_ref().map(|t| t.hour), Some(17));
        assert_eq!(becmg.end.as_ref().map(|t| t.hour), Some(18));
    }
}
