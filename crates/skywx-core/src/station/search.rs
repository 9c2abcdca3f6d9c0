//! Typo-tolerant station search.
//!
//! A station's score is the best of three measures against the normalized
//! query: edit similarity to its ICAO or IATA code, edit similarity to its
//! full name, and a word score averaging each query word's best match among
//! the words of its name, city and state.

use super::Station;
use serde::Serialize;
use std::sync::Arc;
use strsim::normalized_damerau_levenshtein;

/// Scores below this are not worth returning.
const MIN_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMatch {
    pub station: Arc<Station>,
    pub score: f64,
}

/// Uppercase, map punctuation to spaces and collapse runs of whitespace.
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn code_score(query: &str, station: &Station) -> f64 {
    if query.contains(' ') {
        return 0.0;
    }
    let icao = normalized_damerau_levenshtein(query, &station.icao);
    let iata = station
        .iata
        .as_deref()
        .map_or(0.0, |iata| normalized_damerau_levenshtein(query, iata));
    icao.max(iata)
}

fn word_score(query_words: &[&str], candidate_words: &[&str]) -> f64 {
    if query_words.is_empty() || candidate_words.is_empty() {
        return 0.0;
    }
    let total: f64 = query_words
        .iter()
        .map(|q| {
            candidate_words
                .iter()
                .map(|c| normalized_damerau_levenshtein(q, c))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query_words.len() as f64
}

/// Similarity of a normalized query to one station, in `[0, 1]`.
pub fn score(query: &str, station: &Station) -> f64 {
    let name = normalize(&station.name);
    let city = station.city.as_deref().map(normalize).unwrap_or_default();
    let state = station.state.as_deref().map(normalize).unwrap_or_default();

    let query_words: Vec<&str> = query.split(' ').collect();
    let candidate_words: Vec<&str> = name
        .split(' ')
        .chain(city.split_whitespace())
        .chain(state.split_whitespace())
        .collect();

    code_score(query, station)
        .max(normalized_damerau_levenshtein(query, &name))
        .max(word_score(&query_words, &candidate_words))
}

/// Rank stations against `text`, best first.
///
/// Equal scores prefer larger station types, then the smaller code.
pub(crate) fn rank(stations: &[Arc<Station>], text: &str, limit: usize) -> Vec<StationMatch> {
    let query = normalize(text);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matches: Vec<StationMatch> = stations
        .iter()
        .map(|s| StationMatch {
            station: Arc::clone(s),
            score: score(&query, s),
        })
        .filter(|m| m.score >= MIN_SCORE)
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.station.station_type.rank().cmp(&b.station.station_type.rank()))
            .then_with(|| a.station.icao.cmp(&b.station.icao))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationType;

    fn station(icao: &str, iata: &str, name: &str, city: &str, kind: StationType) -> Arc<Station> {
        Arc::new(Station {
            icao: icao.to_string(),
            iata: Some(iata.to_string()),
            name: name.to_string(),
            city: Some(city.to_string()),
            state: None,
            country: "US".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            elevation_ft: None,
            elevation_m: None,
            station_type: kind,
            reports_observations: true,
            reports_forecasts: true,
        })
    }

    fn fixture() -> Vec<Arc<Station>> {
        vec![
            station(
                "KJFK",
                "JFK",
                "John F Kennedy International Airport",
                "New York",
                StationType::LargeAirport,
            ),
            station(
                "KLGA",
                "LGA",
                "La Guardia Airport",
                "New York",
                StationType::LargeAirport,
            ),
            station(
                "KORD",
                "ORD",
                "Chicago O'Hare International Airport",
                "Chicago",
                StationType::LargeAirport,
            ),
            station(
                "KMDW",
                "MDW",
                "Chicago Midway International Airport",
                "Chicago",
                StationType::LargeAirport,
            ),
        ]
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  chicago  o'hare "), "CHICAGO O HARE");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_transposed_code() {
        let results = rank(&fixture(), "kjkf", 3);
        assert_eq!(results[0].station.icao, "KJFK");
    }

    #[test]
    fn test_misspelled_name() {
        let results = rank(&fixture(), "Kenedy", 3);
        assert_eq!(results[0].station.icao, "KJFK");

        let results = rank(&fixture(), "chicago ohare", 3);
        assert_eq!(results[0].station.icao, "KORD");
    }

    #[test]
    fn test_exact_code_scores_one() {
        let results = rank(&fixture(), "LGA", 1);
        assert_eq!(results[0].station.icao, "KLGA");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_tie_prefers_larger_type_then_code() {
        let stations = vec![
            station("BBBB", "BBB", "Springfield Field", "Springfield", StationType::SmallAirport),
            station("CCCC", "CCC", "Springfield Regional", "Springfield", StationType::MediumAirport),
            station("AAAA", "AAA", "Springfield Strip", "Springfield", StationType::SmallAirport),
        ];
        let results = rank(&stations, "springfield", 3);
        let codes: Vec<&str> = results.iter().map(|m| m.station.icao.as_str()).collect();
        assert_eq!(codes, vec!["CCCC", "AAAA", "BBBB"]);
    }

    #[test]
    fn test_state_disambiguates_same_city() {
        let in_state = |icao: &str, state: &str, kind: StationType| {
            let mut s = Station::clone(&station(
                icao,
                &icao[1..],
                "Springfield Regional Airport",
                "Springfield",
                kind,
            ));
            s.state = Some(state.to_string());
            Arc::new(s)
        };
        let stations = vec![
            in_state("KSGF", "Missouri", StationType::LargeAirport),
            in_state("KSPI", "Illinois", StationType::MediumAirport),
        ];

        let results = rank(&stations, "springfield ilinois", 2);
        assert_eq!(results[0].station.icao, "KSPI");
        assert!(results[0].score > results[1].score);

        let results = rank(&stations, "missouri", 1);
        assert_eq!(results[0].station.icao, "KSGF");
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_empty_query() {
        assert!(rank(&fixture(), "  ", 5).is_empty());
    }

    #[test]
    fn test_limit_respected() {
        assert_eq!(rank(&fixture(), "new york", 1).len(), 1);
    }
}
