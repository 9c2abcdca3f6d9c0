use skywx_core::model::{
    Altimeter, CloudLayer, Completeness, DistanceBound, ForecastPeriod, ParseIssue,
    ParsedElement, PeriodElements, ReportBody, RunwayVisualRange, StructuredReport,
    TemperatureDewpoint, TemperatureExtreme, Visibility, WeatherCode, Wind, WindDirection,
    WindShear,
};
use skywx_core::station::{NearestStation, Station, StationMatch};

const LABEL_WIDTH: usize = 12;

pub fn print_report(report: &StructuredReport) {
    let time = report
        .time()
        .present()
        .map(|t| match t.resolved {
            Some(at) => format!("{}Z", at.format("%Y-%m-%d %H:%M")),
            None => t.repr.clone(),
        })
        .unwrap_or_else(|| "-".into());
    println!(
        "{} {} {}",
        report.station_code(),
        report.report_type(),
        time
    );
    match report.station() {
        Some(station) => row("station", &format!("{} ({})", station.name, station.country)),
        None => row("station", "not in dataset"),
    }
    if !report.modifiers().is_empty() {
        let mods: Vec<String> = report.modifiers().iter().map(|m| format!("{m:?}")).collect();
        row("modifiers", &mods.join(", "));
    }

    match report.body() {
        ReportBody::Observation(obs) => {
            row("wind", &cell(&obs.wind, wind));
            row("visibility", &cell(&obs.visibility, visibility));
            row("rvr", &cell(&obs.runway_visibility, |r| list(r, rvr)));
            row("weather", &cell(&obs.weather, |w| list(w, weather)));
            row("clouds", &cell(&obs.clouds, |c| list(c, cloud)));
            row("temperature", &cell(&obs.temperature, temperature));
            row("altimeter", &cell(&obs.altimeter, altimeter));
            for period in &obs.trend {
                print_period(period);
            }
        }
        ReportBody::Forecast(fc) => {
            row(
                "valid",
                &cell(&fc.validity, |w| format!("{} to {}", w.start.repr, w.end.repr)),
            );
            for period in &fc.periods {
                print_period(period);
            }
        }
    }

    if !report.remarks().is_empty() {
        println!("  remarks");
        for entry in report.remarks() {
            let code = serde_json::to_value(&entry.code)
                .ok()
                .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(String::from))
                .unwrap_or_default();
            println!("    {:<16} {}", entry.raw, code.replace('_', " "));
        }
    }

    match report.completeness() {
        Completeness::Complete => println!("  complete"),
        Completeness::Partial { issues } => {
            println!("  partial");
            for issue in issues {
                if let Some(line) = describe_issue(issue) {
                    println!("    {line}");
                }
            }
        }
    }
}

fn print_period(period: &ForecastPeriod) {
    let probability = period
        .probability
        .map(|p| format!(" {p}%"))
        .unwrap_or_default();
    let span = match (&period.start, &period.end) {
        (Some(start), Some(end)) => format!(" {} to {}", start.repr, end.repr),
        (Some(start), None) => format!(" from {}", start.repr),
        (None, Some(end)) => format!(" until {}", end.repr),
        (None, None) => String::new(),
    };
    println!("  -- {:?}{probability}{span}", period.kind);
    print_elements(&period.elements);
}

fn print_elements(elements: &PeriodElements) {
    let rows = [
        ("wind", cell(&elements.wind, wind)),
        ("visibility", cell(&elements.visibility, visibility)),
        ("weather", cell(&elements.weather, |w| list(w, weather))),
        ("clouds", cell(&elements.clouds, |c| list(c, cloud))),
        ("wind shear", cell(&elements.wind_shear, wind_shear)),
        ("extremes", cell(&elements.temperature_extremes, |e| list(e, extreme))),
        ("altimeter", cell(&elements.altimeter, altimeter)),
    ];
    // Periods only list what they change.
    for (label, value) in rows.iter().filter(|(_, v)| v != "-") {
        row(label, value);
    }
}

fn describe_issue(issue: &ParseIssue) -> Option<String> {
    match issue {
        ParseIssue::MalformedField { field, raw, .. } => Some(format!("malformed {field}: {raw}")),
        ParseIssue::UnconsumedToken { position, text } => {
            Some(format!("unrecognised token {position}: {text}"))
        }
        ParseIssue::MalformedTransition { position, text } => {
            Some(format!("bad transition marker {position}: {text}"))
        }
        // Missing fields are visible as "-" rows already.
        ParseIssue::AbsentField { .. } => None,
    }
}

fn row(label: &str, value: &str) {
    println!("  {label:<LABEL_WIDTH$} {value}");
}

fn cell<T>(element: &ParsedElement<T>, show: impl Fn(&T) -> String) -> String {
    match element {
        ParsedElement::Present(value) => show(value),
        ParsedElement::Absent => "-".into(),
        ParsedElement::Malformed(raw) => format!("?? {raw}"),
    }
}

fn list<T>(items: &[T], show: fn(&T) -> String) -> String {
    if items.is_empty() {
        return "none".into();
    }
    items.iter().map(show).collect::<Vec<_>>().join(", ")
}

fn wind(w: &Wind) -> String {
    if w.is_calm() {
        return "calm".into();
    }
    let direction = match w.direction {
        WindDirection::Degrees(d) => format!("{d:03}°"),
        WindDirection::Variable => "variable".into(),
        WindDirection::Missing => "///".into(),
    };
    let speed = w.speed.map_or("//".into(), |s| s.to_string());
    let gust = w.gust.map(|g| format!(" gusting {g}")).unwrap_or_default();
    let sector = w
        .variable_sector
        .as_ref()
        .map(|s| format!(" (varying {:03}°-{:03}°)", s.from, s.to))
        .unwrap_or_default();
    format!("{direction} {speed}{gust} {}{sector}", w.unit)
}

fn bound(b: DistanceBound) -> &'static str {
    match b {
        DistanceBound::Exact => "",
        DistanceBound::AtLeast => ">=",
        DistanceBound::LessThan => "<",
    }
}

fn visibility(v: &Visibility) -> String {
    if v.cavok {
        return "CAVOK".into();
    }
    let qualifier = v
        .qualifier
        .as_ref()
        .map(|q| format!(" {q}"))
        .unwrap_or_default();
    let minimum = v
        .minimum
        .as_ref()
        .map(|m| format!(" (min {} m {})", m.distance, m.direction))
        .unwrap_or_default();
    format!("{}{} {}{qualifier}{minimum}", bound(v.bound), v.distance, v.unit)
}

fn rvr(r: &RunwayVisualRange) -> String {
    let low = format!("{}{}", bound(r.low.bound), r.low.value);
    let range = match &r.high {
        Some(high) => format!("{low}-{}{}", bound(high.bound), high.value),
        None => low,
    };
    format!("{} {range} {}", r.runway, r.unit)
}

fn weather(w: &WeatherCode) -> String {
    w.repr.clone()
}

fn cloud(c: &CloudLayer) -> String {
    match c.base_ft {
        Some(base) => format!("{:?} {base} ft", c.cover),
        None => format!("{:?}", c.cover),
    }
}

fn temperature(t: &TemperatureDewpoint) -> String {
    let show = |v: Option<i16>| v.map_or("//".into(), |v| format!("{v}°C"));
    format!("{} / dewpoint {}", show(t.temperature), show(t.dewpoint))
}

fn extreme(e: &TemperatureExtreme) -> String {
    format!("{:?} {}°C at {}", e.kind, e.value, e.at.repr)
}

fn altimeter(a: &Altimeter) -> String {
    let primary = format!("{} {}", a.primary.value, a.primary.unit);
    match &a.alternate {
        Some(alt) => format!("{primary} ({} {})", alt.value, alt.unit),
        None => primary,
    }
}

fn wind_shear(ws: &WindShear) -> String {
    format!(
        "{} ft {:03}° {} {}",
        ws.height_ft, ws.direction, ws.speed, ws.unit
    )
}

pub fn print_station(station: &Station) {
    println!("{} {}", station.icao, station.name);
    row("iata", station.iata.as_deref().unwrap_or("-"));
    let place = [station.city.as_deref(), station.state.as_deref(), Some(&station.country)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    row("location", &place);
    row(
        "position",
        &format!("{:.4}, {:.4}", station.latitude, station.longitude),
    );
    if let Some(ft) = station.elevation_ft {
        row("elevation", &format!("{ft} ft"));
    }
    row("type", &station.station_type.to_string());
    let mut issues = Vec::new();
    if station.reports_observations {
        issues.push("METAR");
    }
    if station.reports_forecasts {
        issues.push("TAF");
    }
    row("issues", &issues.join(", "));
}

pub fn print_nearby(found: &[NearestStation]) {
    for n in found {
        println!(
            "  {:<5} {:>8.1} km  {}",
            n.station.icao, n.distance_km, n.station.name
        );
    }
}

pub fn print_matches(matches: &[StationMatch]) {
    for m in matches {
        println!(
            "  {:<5} {:<4} {:.2}  {}",
            m.station.icao,
            m.station.iata.as_deref().unwrap_or(""),
            m.score,
            m.station.name
        );
    }
}
