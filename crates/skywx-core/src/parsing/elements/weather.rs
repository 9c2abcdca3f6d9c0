use super::{join, run_len, ParseContext, Step};
use crate::model::{Descriptor, Intensity, Phenomenon, WeatherCode};
use crate::parsing::tokenize::{Token, TokenKind};

/// Parse the run of present-weather groups.
///
/// `NSW` (no significant weather) yields an empty list; `//` (not
/// observed) is consumed without contributing a code.
pub fn parse_weather(tokens: &[Token], _ctx: &ParseContext) -> Step<Vec<WeatherCode>> {
    let len = run_len(tokens, TokenKind::Weather);
    if len == 0 {
        return Step::absent();
    }
    let run = &tokens[..len];

    let mut codes = Vec::with_capacity(len);
    for token in run {
        match token.text.as_str() {
            "NSW" | "//" => continue,
            text => match decode(text) {
                Some(code) => codes.push(code),
                None => return Step::malformed(join(run), len),
            },
        }
    }
    Step::present(codes, len)
}

/// Decode one group such as `+TSRA`, `-FZDZ`, `VCSH` or `REBLSN`.
pub fn decode(text: &str) -> Option<WeatherCode> {
    let (intensity, rest) = if let Some(rest) = text.strip_prefix('+') {
        (Intensity::Heavy, rest)
    } else if let Some(rest) = text.strip_prefix('-') {
        (Intensity::Light, rest)
    } else {
        (Intensity::Moderate, text)
    };
    let (in_vicinity, rest) = match rest.strip_prefix("VC") {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let (recent, rest) = match rest.strip_prefix("RE") {
        Some(r) => (true, r),
        None => (false, rest),
    };
    if rest.is_empty() || rest.len() % 2 != 0 || !rest.is_ascii() {
        return None;
    }

    let pairs: Vec<&str> = (0..rest.len()).step_by(2).map(|i| &rest[i..i + 2]).collect();
    let descriptor = Descriptor::from_code(pairs[0]);
    let phenomena = pairs[usize::from(descriptor.is_some())..]
        .iter()
        .map(|code| Phenomenon::from_code(code))
        .collect::<Option<Vec<_>>>()?;

    // Only thunderstorms and showers stand alone without a phenomenon.
    if phenomena.is_empty()
        && !matches!(descriptor, Some(Descriptor::Thunderstorm | Descriptor::Showers))
    {
        return None;
    }

    Some(WeatherCode {
        repr: text.to_string(),
        intensity,
        in_vicinity,
        recent,
        descriptor,
        phenomena,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::elements::tests::tokens;

    #[test]
    fn test_heavy_thunderstorm_rain() {
        let code = decode("+TSRA").unwrap();
        assert_eq!(code.intensity, Intensity::Heavy);
        assert_eq!(code.descriptor, Some(Descriptor::Thunderstorm));
        assert_eq!(code.phenomena, vec![Phenomenon::Rain]);
    }

    #[test]
    fn test_vicinity_showers() {
        let code = decode("VCSH").unwrap();
        assert!(code.in_vicinity);
        assert_eq!(code.descriptor, Some(Descriptor::Showers));
        assert!(code.phenomena.is_empty());
    }

    #[test]
    fn test_mixed_precipitation() {
        let code = decode("-RASN").unwrap();
        assert_eq!(code.intensity, Intensity::Light);
        assert_eq!(code.phenomena, vec![Phenomenon::Rain, Phenomenon::Snow]);
    }

    #[test]
    fn test_recent() {
        let code = decode("REFZRA").unwrap();
        assert!(code.recent);
        assert_eq!(code.descriptor, Some(Descriptor::Freezing));
    }

    #[test]
    fn test_lone_descriptor_rejected() {
        assert!(decode("FZ").is_none());
        assert!(decode("RAFZ").is_none());
    }

    #[test]
    fn test_run_stops_at_sky() {
        let step = parse_weather(&tokens("-RA BR OVC008"), &ParseContext::default());
        assert_eq!(step.consumed, 2);
        assert_eq!(step.element.present().unwrap().len(), 2);
    }

    #[test]
    fn test_nsw_is_present_and_empty() {
        let step = parse_weather(&tokens("NSW"), &ParseContext::default());
        assert_eq!(step.consumed, 1);
        assert_eq!(step.element.present(), Some(&vec![]));
    }

    #[test]
    fn test_absent_without_weather() {
        assert_eq!(
            parse_weather(&tokens("FEW250"), &ParseContext::default()),
            Step::absent()
        );
    }
}
