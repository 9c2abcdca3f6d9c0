//! End-to-end tests for parse_report() and the station registry.
//!
//! All tests run against the bundled station dataset.

use rust_decimal_macros::dec;
use skywx_core::error::SkywxError;
use skywx_core::model::{
    Completeness, DistanceBound, ElementStatus, Field, ParseIssue, ParsedElement, ReportType,
    StructuredReport, TransitionKind, Unit, UnitConfidence, WindDirection,
};
use skywx_core::parsing::remarks::RemarkCode;
use skywx_core::parsing::sanitize::sanitize;
use skywx_core::station::builtin::builtin;
use skywx_core::station::{Coordinate, StationFilter};
use skywx_core::{parse_batch, parse_report, ParseOptions};

const KJFK: &str = "METAR KJFK 121651Z 28016KT 10SM FEW250 24/18 A3000 RMK AO2 SLP176";

fn parse(text: &str) -> StructuredReport {
    let registry = builtin().unwrap();
    parse_report(text, &ParseOptions::default(), Some(&registry)).unwrap()
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------
#[test]
fn routine_observation_fully_decoded() {
    let report = parse(KJFK);

    assert_eq!(report.report_type(), ReportType::Observation);
    assert!(report.is_complete(), "{:?}", report.completeness());
    assert_eq!(report.station_code(), "KJFK");
    assert_eq!(report.station().map(|s| s.country.as_str()), Some("US"));

    let time = report.time().present().unwrap();
    assert_eq!((time.day, time.hour, time.minute), (Some(12), 16, 51));

    let obs = report.observation().unwrap();
    let wind = obs.wind.present().unwrap();
    assert_eq!(wind.direction, WindDirection::Degrees(280));
    assert_eq!(wind.speed, Some(16));
    assert_eq!(wind.unit, Unit::Knots);

    let vis = obs.visibility.present().unwrap();
    assert_eq!(vis.distance, dec!(10));
    assert_eq!(vis.unit, Unit::StatuteMiles);
    assert_eq!(vis.bound, DistanceBound::Exact);

    let clouds = obs.clouds.present().unwrap();
    assert_eq!(clouds.len(), 1);
    assert_eq!(clouds[0].base_ft, Some(25000));

    let temp = obs.temperature.present().unwrap();
    assert_eq!((temp.temperature, temp.dewpoint), (Some(24), Some(18)));

    let alt = obs.altimeter.present().unwrap();
    assert_eq!(alt.primary.value, dec!(30.00));
    assert_eq!(alt.primary.unit, Unit::InchesOfMercury);

    assert_eq!(report.remarks().len(), 2);
    assert_eq!(
        report.remarks()[1].code,
        RemarkCode::SeaLevelPressure { hpa: dec!(1017.6) }
    );
}

#[test]
fn noisy_input_is_repaired() {
    let report = parse("metar  kjfk 121651z 28016kt 10sm few250 24/18 a3000=");
    assert!(report.is_complete());
    assert_eq!(report.sanitized(), "METAR KJFK 121651Z 28016KT 10SM FEW250 24/18 A3000");
    assert_eq!(report.raw(), "metar  kjfk 121651z 28016kt 10sm few250 24/18 a3000=");
}

#[test]
fn sanitize_is_idempotent() {
    for text in [
        KJFK,
        "metar kjfk 121651z 28016kt 10sm c a v o k 24/18 a3000==",
        "TAF EGLL 121100Z 1212/1318 24010KT 9999 SCT030\u{7} PROB3O TEMPO",
        "KJFK 121651Z Q1013=$",
        "C= A V O K",
        "",
    ] {
        let once = sanitize(text);
        assert_eq!(sanitize(&once), once);
    }
}

#[test]
fn spans_are_disjoint_and_in_range() {
    let report = parse("KJFK 121651Z 28016G25KT 250V310 1/2SM R04R/2000FT -RA BR OVC004 24/18 A3000");
    let token_count = report.tokens().len();

    let mut spans: Vec<_> = report.record().iter().filter_map(|o| o.span).collect();
    spans.sort_by_key(|s| s.start);
    for pair in spans.windows(2) {
        assert!(pair[0].end() <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
    assert!(spans.iter().all(|s| s.end() <= token_count));

    let outcome = report.outcome(Field::Weather).unwrap();
    assert_eq!(outcome.span.map(|s| s.len), Some(2));
}

#[test]
fn spans_point_at_the_field_text() {
    let report = parse(KJFK);
    let obs = report.observation().unwrap();

    let wind_span = report.outcome(Field::Wind).and_then(|o| o.span).unwrap();
    assert_eq!(
        report.span_text(wind_span).as_deref(),
        Some(obs.wind.present().unwrap().repr.as_str())
    );

    let alt_span = report.outcome(Field::Altimeter).and_then(|o| o.span).unwrap();
    assert_eq!(
        report.span_text(alt_span).as_deref(),
        Some(obs.altimeter.present().unwrap().primary.repr.as_str())
    );
}

#[test]
fn spans_after_a_merged_group_still_point_at_the_field_text() {
    // "1 1/2SM" is two words but one token
    let report = parse("KJFK 121651Z 28016KT 1 1/2SM BR FEW250 24/18 A3000");
    let obs = report.observation().unwrap();

    let vis_span = report.outcome(Field::Visibility).and_then(|o| o.span).unwrap();
    assert_eq!(report.span_text(vis_span).as_deref(), Some("1 1/2SM"));

    let alt_span = report.outcome(Field::Altimeter).and_then(|o| o.span).unwrap();
    assert_eq!(report.span_text(alt_span).as_deref(), Some("A3000"));
    assert_eq!(report.tokens()[alt_span.start].text, obs.altimeter.present().unwrap().primary.repr);
    assert_eq!(alt_span.end(), report.tokens().len());
}

#[test]
fn unconsumed_positions_index_the_token_list() {
    let report = parse("KJFK 121651Z 28016KT 1 1/2SM FEW250 24/18 A3000 XYZZY");
    let unconsumed = &report.unconsumed()[0];
    assert_eq!(unconsumed.text, "XYZZY");
    assert_eq!(report.tokens()[unconsumed.position].text, "XYZZY");
}

#[test]
fn malformed_altimeter_makes_report_partial() {
    let report = parse("METAR KJFK 121651Z 28016KT 10SM FEW250 24/18 A30X0");

    let obs = report.observation().unwrap();
    assert_eq!(obs.altimeter, ParsedElement::Malformed("A30X0".into()));
    assert!(obs.wind.is_present());
    assert_eq!(
        report.outcome(Field::Altimeter).map(|o| o.status),
        Some(ElementStatus::Malformed)
    );

    let Completeness::Partial { issues } = report.completeness() else {
        panic!("expected partial report");
    };
    assert!(issues
        .iter()
        .any(|i| matches!(i, ParseIssue::MalformedField { field: Field::Altimeter, .. })));
}

#[test]
fn unknown_station_uses_low_confidence_units() {
    let registry = builtin().unwrap();
    let report = parse_report(
        "ZZZZ 121651Z 28016 9999 FEW030 18/09 QNH1013",
        &ParseOptions::default(),
        Some(&registry),
    )
    .unwrap();

    assert!(report.station().is_none());
    let wind = report.observation().unwrap().wind.present().unwrap();
    assert_eq!(wind.unit, Unit::Knots);
    assert_eq!(wind.confidence, UnitConfidence::LowConfidence);
}

// ---------------------------------------------------------------------------
// Forecasts
// ---------------------------------------------------------------------------
#[test]
fn forecast_with_becmg_has_two_periods() {
    let report = parse("TAF KJFK 121720Z 1218/1324 28016KT P6SM FEW250 BECMG 1302/1304 31010KT");

    assert_eq!(report.report_type(), ReportType::Forecast);
    assert!(report.is_complete());
    let fc = report.forecast().unwrap();
    assert_eq!(fc.periods.len(), 2);
    assert_eq!(fc.periods[0].kind, TransitionKind::Baseline);
    assert_eq!(fc.periods[1].kind, TransitionKind::Becoming);
    assert_eq!(fc.periods[1].raw, "BECMG 1302/1304 31010KT");

    let vis = fc.periods[0].elements.visibility.present().unwrap();
    assert_eq!(vis.bound, DistanceBound::AtLeast);
    assert_eq!(vis.distance, dec!(6));
}

#[test]
fn forecast_from_and_prob_periods() {
    let report = parse(
        "TAF AMD EGLL 121100Z 1212/1318 24010KT 9999 SCT030 \
         PROB30 1214/1217 4000 TSRA BKN015CB \
         FM130600 27015G25KT 6000 -RA BKN010 \
         TEMPO 1310/1314 3000 RA",
    );

    let fc = report.forecast().unwrap();
    let kinds: Vec<_> = fc.periods.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TransitionKind::Baseline,
            TransitionKind::Probability,
            TransitionKind::From,
            TransitionKind::Temporary,
        ]
    );
    assert_eq!(fc.periods[1].probability, Some(30));

    let from = &fc.periods[2];
    assert_eq!(from.start.as_ref().map(|t| (t.day, t.hour)), Some((Some(13), 6)));
    assert_eq!(from.end, fc.validity.present().map(|w| w.end.clone()));
    assert_eq!(from.elements.wind.present().and_then(|w| w.gust), Some(25));
    // Periods do not inherit from the baseline.
    assert_eq!(fc.periods[3].elements.wind, ParsedElement::Absent);

    assert_eq!(report.station().map(|s| s.icao.as_str()), Some("EGLL"));
}

#[test]
fn malformed_transition_marker_reported() {
    let report = parse("TAF KJFK 121720Z 1218/1324 28016KT P6SM PROB3O 1220/1222 TSRA");

    // The bad marker opens no period; its tokens stay with the baseline.
    let fc = report.forecast().unwrap();
    assert_eq!(fc.periods.len(), 1);
    assert!(fc.periods[0].elements.weather.is_present());

    let Completeness::Partial { issues } = report.completeness() else {
        panic!("expected partial report");
    };
    assert!(issues.contains(&ParseIssue::MalformedTransition {
        position: 6,
        text: "PROB3O".into(),
    }));
    assert!(!issues
        .iter()
        .any(|i| matches!(i, ParseIssue::UnconsumedToken { text, .. } if text == "PROB3O")));
}

// ---------------------------------------------------------------------------
// Errors and options
// ---------------------------------------------------------------------------
#[test]
fn empty_report_rejected() {
    let err = parse_report("   \n\t", &ParseOptions::default(), None).unwrap_err();
    assert!(matches!(err, SkywxError::EmptyReport));
}

#[test]
fn remarks_only_rejected() {
    let err = parse_report("RMK AO2 SLP176", &ParseOptions::default(), None).unwrap_err();
    assert!(matches!(err, SkywxError::UnrecognizedHeader { .. }));
}

#[test]
fn required_station_must_exist() {
    let registry = builtin().unwrap();
    let options = ParseOptions::default().with_require_station(true);

    let err = parse_report("METAR ZZZZ 121651Z 28016KT", &options, Some(&registry)).unwrap_err();
    assert!(matches!(err, SkywxError::StationNotFound(code) if code == "ZZZZ"));

    assert!(parse_report(KJFK, &options, Some(&registry)).is_ok());
}

#[test]
fn report_type_override() {
    let options = ParseOptions::default().with_report_type(ReportType::Observation);
    let err = parse_report("TAF KJFK 121720Z 1218/1324 28016KT", &options, None).unwrap_err();
    assert!(matches!(err, SkywxError::UnrecognizedHeader { .. }));
}

#[test]
fn reference_date_resolves_times() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
    let options = ParseOptions::default().with_reference_date(date);
    let report = parse_report(KJFK, &options, None).unwrap();

    let resolved = report.time().present().and_then(|t| t.resolved).unwrap();
    assert_eq!(resolved.to_string(), "2024-03-12 16:51:00");
}

#[test]
fn batch_keeps_input_order() {
    let registry = builtin().unwrap();
    let texts = vec![
        KJFK.to_string(),
        String::new(),
        "EGLL 121650Z 24010KT 9999 FEW030 18/09 Q1013 NOSIG".to_string(),
        "TAF KJFK 121720Z 1218/1324 28016KT P6SM FEW250".to_string(),
    ];

    let results = parse_batch(&texts, &ParseOptions::default(), Some(&registry));

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().station_code(), "KJFK");
    assert!(matches!(results[1], Err(SkywxError::EmptyReport)));
    assert_eq!(results[2].as_ref().unwrap().station_code(), "EGLL");
    assert_eq!(
        results[3].as_ref().unwrap().report_type(),
        ReportType::Forecast
    );
}

#[test]
fn report_serializes_to_json_and_back() {
    let report = parse_report(KJFK, &ParseOptions::default(), None).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: StructuredReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------
#[test]
fn nearest_matches_brute_force() {
    let registry = builtin().unwrap();
    let query = Coordinate::new(40.6, -73.8).unwrap();

    let nearest = registry.nearest(query);

    let brute = registry
        .iter()
        .filter_map(|s| s.coordinate().map(|c| (s, skywx_core::station::geo::great_circle_km(query, c))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert_eq!(nearest.station.icao, brute.0.icao);
    assert_eq!(nearest.station.icao, "KJFK");
    assert!(nearest.distance_km < 10.0);
}

#[test]
fn nearby_respects_forecast_filter() {
    let registry = builtin().unwrap();
    let query = Coordinate::new(40.78, -73.97).unwrap();

    let any = registry.nearby(query, 1, StationFilter::Any);
    assert_eq!(any[0].station.icao, "KNYC");

    let taf = registry.nearby(query, 3, StationFilter::Forecasts);
    assert!(taf.iter().all(|n| n.station.reports_forecasts));
    assert!(taf.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[test]
fn fuzzy_search_tolerates_typos() {
    let registry = builtin().unwrap();

    let by_code = registry.fuzzy("kjkf", 3);
    assert_eq!(by_code[0].station.icao, "KJFK");

    let by_name = registry.fuzzy("heathrw", 3);
    assert_eq!(by_name[0].station.icao, "EGLL");

    assert!(registry.fuzzy("", 3).is_empty());
}
