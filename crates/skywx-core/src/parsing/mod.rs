pub mod elements;
pub mod remarks;
pub mod sanitize;
pub mod segment;
pub mod tokenize;

use crate::model::{
    Altimeter, CloudLayer, Completeness, ElementStatus, Field, FieldOutcome, FieldScope, Forecast,
    ForecastPeriod, Modifier, Observation, ParseIssue, ParsedElement, PeriodElements,
    ReportBody, ReportParts, ReportType, RunwayVisualRange, StructuredReport,
    TemperatureDewpoint, TemperatureExtreme, TokenSpan, UnconsumedToken, Visibility,
    WeatherCode, Wind, WindShear,
};
use crate::station::Station;
use crate::ParseOptions;
use elements::{
    pressure, rvr, sky, temperature, time, visibility, weather, wind, ParseContext, Step,
};
use segment::{Segment, Segmentation};
use std::collections::HashSet;
use std::sync::Arc;
use tokenize::{RawReport, Token, TokenKind};
use tracing::debug;

/// One element parser in a grammar's canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
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

impl Stage {
    fn field(self) -> Field {
        match self {
            Stage::Wind => Field::Wind,
            Stage::WindShear => Field::WindShear,
            Stage::Visibility => Field::Visibility,
            Stage::RunwayVisibility => Field::RunwayVisibility,
            Stage::Weather => Field::Weather,
            Stage::Clouds => Field::Clouds,
            Stage::Temperature => Field::Temperature,
            Stage::TemperatureExtremes => Field::TemperatureExtremes,
            Stage::Altimeter => Field::Altimeter,
        }
    }

    fn accepts(self, kind: TokenKind) -> bool {
        let wanted = match self {
            Stage::Wind => TokenKind::Wind,
            Stage::WindShear => TokenKind::WindShear,
            Stage::Visibility => TokenKind::Visibility,
            Stage::RunwayVisibility => TokenKind::RunwayVisualRange,
            Stage::Weather => TokenKind::Weather,
            Stage::Clouds => TokenKind::Sky,
            Stage::Temperature => TokenKind::Temperature,
            Stage::TemperatureExtremes => TokenKind::TemperatureExtreme,
            Stage::Altimeter => TokenKind::Pressure,
        };
        kind == wanted
    }
}

const OBSERVATION_STAGES: &[Stage] = &[
    Stage::Wind,
    Stage::Visibility,
    Stage::RunwayVisibility,
    Stage::Weather,
    Stage::Clouds,
    Stage::Temperature,
    Stage::Altimeter,
];

const PERIOD_STAGES: &[Stage] = &[
    Stage::Wind,
    Stage::Visibility,
    Stage::Weather,
    Stage::Clouds,
    Stage::WindShear,
    Stage::TemperatureExtremes,
    Stage::Altimeter,
];

/// Bookkeeping shared by every sweep of one report.
#[derive(Debug, Default)]
struct Ledger {
    modifiers: Vec<Modifier>,
    record: Vec<FieldOutcome>,
    issues: Vec<ParseIssue>,
    unconsumed: Vec<UnconsumedToken>,
    malformed_markers: Vec<UnconsumedToken>,
}

impl Ledger {
    /// Record a single header element (time, validity).
    fn note<T>(&mut self, field: Field, step: &Step<T>, position: Option<usize>) {
        if let Some(raw) = step.element.malformed_raw() {
            self.issues.push(ParseIssue::MalformedField {
                field,
                scope: FieldScope::Main,
                raw: raw.to_string(),
            });
        }
        self.record.push(FieldOutcome {
            field,
            scope: FieldScope::Main,
            status: step.element.status(),
            span: position.map(|start| TokenSpan {
                start,
                len: step.consumed,
            }),
        });
    }

    /// Decide completeness.
    ///
    /// Blocking: malformed fields, fields whose parser ran but found nothing
    /// usable (`////`), malformed transition markers and unconsumed tokens.
    /// A partial report also lists the fields that were never attempted.
    fn completeness(&mut self) -> Completeness {
        let marker_positions: HashSet<usize> =
            self.malformed_markers.iter().map(|m| m.position).collect();

        let mut issues = std::mem::take(&mut self.issues);
        issues.extend(self.absent_fields(true));
        issues.extend(self.malformed_markers.iter().map(|m| ParseIssue::MalformedTransition {
            position: m.position,
            text: m.text.clone(),
        }));
        issues.extend(
            self.unconsumed
                .iter()
                .filter(|u| !marker_positions.contains(&u.position))
                .map(|u| ParseIssue::UnconsumedToken {
                    position: u.position,
                    text: u.text.clone(),
                }),
        );

        if issues.is_empty() {
            return Completeness::Complete;
        }
        issues.extend(self.absent_fields(false));
        Completeness::Partial { issues }
    }

    fn absent_fields(&self, attempted: bool) -> impl Iterator<Item = ParseIssue> + '_ {
        self.record
            .iter()
            .filter(move |o| o.status == ElementStatus::Absent && o.span.is_some() == attempted)
            .map(|o| ParseIssue::AbsentField {
                field: o.field,
                scope: o.scope,
            })
    }
}

/// Element slots filled by one sweep.
#[derive(Debug, Default)]
struct Sweep {
    wind: ParsedElement<Wind>,
    wind_shear: ParsedElement<WindShear>,
    visibility: ParsedElement<Visibility>,
    runway_visibility: ParsedElement<Vec<RunwayVisualRange>>,
    weather: ParsedElement<Vec<WeatherCode>>,
    clouds: ParsedElement<Vec<CloudLayer>>,
    temperature: ParsedElement<TemperatureDewpoint>,
    temperature_extremes: ParsedElement<Vec<TemperatureExtreme>>,
    altimeter: ParsedElement<Altimeter>,
}

impl Sweep {
    /// Run `stage` at the head of `tokens`, keep its element and return
    /// the tokens consumed plus any malformed text.
    fn run(&mut self, stage: Stage, tokens: &[Token], ctx: &ParseContext) -> (usize, Option<String>) {
        fn keep<T>(slot: &mut ParsedElement<T>, step: Step<T>) -> (usize, Option<String>) {
            let raw = step.element.malformed_raw().map(str::to_string);
            *slot = step.element;
            (step.consumed, raw)
        }
        match stage {
            Stage::Wind => keep(&mut self.wind, wind::parse_wind(tokens, ctx)),
            Stage::WindShear => keep(&mut self.wind_shear, wind::parse_wind_shear(tokens, ctx)),
            Stage::Visibility => {
                keep(&mut self.visibility, visibility::parse_visibility(tokens, ctx))
            }
            Stage::RunwayVisibility => keep(&mut self.runway_visibility, rvr::parse_rvr(tokens, ctx)),
            Stage::Weather => keep(&mut self.weather, weather::parse_weather(tokens, ctx)),
            Stage::Clouds => keep(&mut self.clouds, sky::parse_sky(tokens, ctx)),
            Stage::Temperature => {
                keep(&mut self.temperature, temperature::parse_temperature(tokens, ctx))
            }
            Stage::TemperatureExtremes => keep(
                &mut self.temperature_extremes,
                temperature::parse_extremes(tokens, ctx),
            ),
            Stage::Altimeter => keep(&mut self.altimeter, pressure::parse_pressure(tokens, ctx)),
        }
    }

    fn status(&self, stage: Stage) -> ElementStatus {
        match stage {
            Stage::Wind => self.wind.status(),
            Stage::WindShear => self.wind_shear.status(),
            Stage::Visibility => self.visibility.status(),
            Stage::RunwayVisibility => self.runway_visibility.status(),
            Stage::Weather => self.weather.status(),
            Stage::Clouds => self.clouds.status(),
            Stage::Temperature => self.temperature.status(),
            Stage::TemperatureExtremes => self.temperature_extremes.status(),
            Stage::Altimeter => self.altimeter.status(),
        }
    }

    fn into_period_elements(self) -> PeriodElements {
        PeriodElements {
            wind: self.wind,
            wind_shear: self.wind_shear,
            visibility: self.visibility,
            weather: self.weather,
            clouds: self.clouds,
            temperature_extremes: self.temperature_extremes,
            altimeter: self.altimeter,
        }
    }
}

/// Walk `tokens` left to right through `stages`.
///
/// Each token goes to the first remaining stage that accepts its kind;
/// stages passed over stay `Absent`. A token no remaining stage accepts
/// is recorded as unconsumed and the walk moves on.
fn sweep(
    tokens: &[Token],
    stages: &[Stage],
    scope: FieldScope,
    ctx: &ParseContext,
    ledger: &mut Ledger,
) -> Sweep {
    let mut out = Sweep::default();
    let mut spans: Vec<Option<TokenSpan>> = vec![None; stages.len()];
    let mut next_stage = 0;
    let mut cursor = 0;

    while cursor < tokens.len() {
        let token = &tokens[cursor];

        if let Some(modifier) = Modifier::from_token(&token.text) {
            ledger.modifiers.push(modifier);
            cursor += 1;
            continue;
        }

        let stage_at = stages[next_stage..]
            .iter()
            .position(|s| s.accepts(token.kind))
            .map(|offset| next_stage + offset);

        let consumed = match stage_at {
            Some(at) => {
                let (consumed, raw) = out.run(stages[at], &tokens[cursor..], ctx);
                if consumed > 0 {
                    if let Some(raw) = raw {
                        ledger.issues.push(ParseIssue::MalformedField {
                            field: stages[at].field(),
                            scope,
                            raw,
                        });
                    }
                    spans[at] = Some(TokenSpan {
                        start: token.position,
                        len: consumed,
                    });
                    next_stage = at + 1;
                }
                consumed
            }
            None => 0,
        };

        if consumed == 0 {
            debug!(token = %token.text, position = token.position, "unconsumed token");
            ledger.unconsumed.push(UnconsumedToken {
                position: token.position,
                text: token.text.clone(),
            });
            cursor += 1;
        } else {
            cursor += consumed;
        }
    }

    for (stage, span) in stages.iter().zip(spans) {
        ledger.record.push(FieldOutcome {
            field: stage.field(),
            scope,
            status: out.status(*stage),
            span,
        });
    }
    out
}

/// Parse each segment as an independent period.
fn periods<'s, 't: 's>(
    segments: impl Iterator<Item = &'s Segment<'t>>,
    fallback_start: usize,
    ctx: &ParseContext,
    ledger: &mut Ledger,
) -> Vec<ForecastPeriod> {
    segments
        .enumerate()
        .map(|(index, seg)| {
            let elements = sweep(seg.body(), PERIOD_STAGES, FieldScope::Period(index), ctx, ledger)
                .into_period_elements();
            ForecastPeriod {
                kind: seg.kind,
                probability: seg.probability,
                start: seg.start.clone(),
                end: seg.end.clone(),
                start_token: seg.start_token().unwrap_or(fallback_start),
                raw: elements::join(seg.tokens),
                elements,
            }
        })
        .collect()
}

fn observation(body: &[Token], ctx: &ParseContext, ledger: &mut Ledger) -> Observation {
    let trend_at = body
        .iter()
        .position(|t| t.kind == TokenKind::Transition)
        .unwrap_or(body.len());
    let (main, trend_tokens) = body.split_at(trend_at);

    let parsed = sweep(main, OBSERVATION_STAGES, FieldScope::Main, ctx, ledger);

    let trend = if trend_tokens.is_empty() {
        Vec::new()
    } else {
        let Segmentation {
            segments,
            malformed,
        } = segment::segment(trend_tokens, None, ctx);
        ledger.malformed_markers.extend(malformed);
        // Tokens before the first valid marker belong to no period.
        if let Some(lead) = segments.first() {
            sweep(lead.tokens, &[], FieldScope::Main, ctx, ledger);
        }
        let trend_start = trend_tokens.first().map_or(0, |t| t.position);
        periods(segments.iter().skip(1), trend_start, ctx, ledger)
    };

    Observation {
        wind: parsed.wind,
        visibility: parsed.visibility,
        runway_visibility: parsed.runway_visibility,
        weather: parsed.weather,
        clouds: parsed.clouds,
        temperature: parsed.temperature,
        altimeter: parsed.altimeter,
        trend,
    }
}

fn forecast(raw: &RawReport, ctx: &ParseContext, ledger: &mut Ledger) -> Forecast {
    let validity = match raw.header.validity {
        Some(at) => {
            let step = time::parse_validity(&raw.tokens[at..], ctx);
            ledger.note(Field::Validity, &step, Some(raw.tokens[at].position));
            step.element
        }
        None => {
            ledger.note::<()>(Field::Validity, &Step::absent(), None);
            ParsedElement::Absent
        }
    };

    let Segmentation {
        segments,
        malformed,
    } = segment::segment(raw.body(), validity.present(), ctx);
    ledger.malformed_markers.extend(malformed);

    let body_start = raw.body().first().map_or(raw.header.body_start, |t| t.position);
    let periods = periods(segments.iter(), body_start, ctx, ledger);

    Forecast { validity, periods }
}

/// Build the structured report from a tokenized one.
///
/// Never fails: every per-field problem ends up in the parse record and
/// the completeness flag.
pub fn assemble(
    raw: RawReport,
    station: Option<Arc<Station>>,
    options: &ParseOptions,
) -> StructuredReport {
    let ctx = ParseContext {
        station: station.as_deref(),
        policy: options.unit_policy,
        reference_date: options.reference_date,
    };
    let mut ledger = Ledger::default();

    // Header modifiers sit before the station code
    ledger.modifiers.extend(
        raw.tokens[..raw.header.station]
            .iter()
            .filter_map(|t| Modifier::from_token(&t.text)),
    );

    // Issue time
    let time = match raw.header.time {
        Some(at) => {
            let step = time::parse_time(&raw.tokens[at..], &ctx);
            ledger.note(Field::Time, &step, Some(raw.tokens[at].position));
            step.element
        }
        None => {
            ledger.note::<()>(Field::Time, &Step::absent(), None);
            ParsedElement::Absent
        }
    };

    let body = match raw.report_type {
        ReportType::Observation => {
            ReportBody::Observation(observation(raw.body(), &ctx, &mut ledger))
        }
        ReportType::Forecast => ReportBody::Forecast(forecast(&raw, &ctx, &mut ledger)),
    };

    let remarks = remarks::decode_remarks(raw.remarks());
    let completeness = ledger.completeness();

    debug!(
        station = raw.station_code(),
        tokens = raw.tokens.len(),
        unconsumed = ledger.unconsumed.len(),
        complete = matches!(completeness, Completeness::Complete),
        "report assembled"
    );

    let station_code = raw.station_code().to_string();
    StructuredReport::from_parts(ReportParts {
        report_type: raw.report_type,
        raw: raw.original,
        sanitized: raw.sanitized,
        tokens: raw.tokens,
        station_code,
        station,
        time,
        modifiers: ledger.modifiers,
        body,
        remarks,
        unconsumed: ledger.unconsumed,
        record: ledger.record,
        completeness,
    })
}
