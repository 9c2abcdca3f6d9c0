use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Normalize raw report text before tokenizing.
///
/// Steps:
/// 1. Control and non-printable characters become spaces
/// 2. Uppercase
/// 3. Drop report terminators (`=`) and trailing maintenance flags (`$`)
/// 4. Re-join spaced-out keywords (`C A V O K`)
/// 5. Replace known transcription typos, token by token
/// 6. Collapse whitespace
///
/// Every replacement produces text that no earlier or later step matches
/// again, so `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let printable: String = raw
        .chars()
        .map(|c| if c.is_control() || !is_printable(c) { ' ' } else { c })
        .collect();

    let upper = printable.to_uppercase();

    // Terminators go first so `C= A V O K` is already spaced out when the
    // keyword join runs.
    let stripped = upper
        .split_whitespace()
        .map(strip_terminators)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let joined = SPACED_KEYWORDS.iter().fold(stripped, |text, (pattern, replacement)| {
        pattern.replace_all(&text, *replacement).into_owned()
    });

    joined
        .split_whitespace()
        .map(fix_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || c.is_whitespace()
}

/// Remove `=` terminators and a `$` glued onto the end of a token, until
/// neither is left (`Q1013=$` -> `Q1013`).
/// A standalone `$` is a maintenance remark and survives.
fn strip_terminators(mut token: &str) -> &str {
    loop {
        let trimmed = token.trim_matches('=');
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('$')
        } else {
            trimmed
        };
        if trimmed == token {
            return token;
        }
        token = trimmed;
    }
}

fn fix_token(token: &str) -> String {
    if let Some(fixed) = TOKEN_FIXES.get(token) {
        return fixed.to_string();
    }

    // Doubled or misspelled wind unit suffix: 28016KTKT, 28016KLT
    for bad in ["KTKT", "KLT", "KTS"] {
        if let Some(stem) = token.strip_suffix(bad) {
            if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit() || c == 'G' || c == '/') {
                return format!("{stem}KT");
            }
        }
    }

    token.to_string()
}

static SPACED_KEYWORDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bC A V O K\b", "CAVOK"),
        (r"\bN O S I G\b", "NOSIG"),
        (r"\bB E C M G\b", "BECMG"),
        (r"\bT E M P O\b", "TEMPO"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

static TOKEN_FIXES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert("CAVOC", "CAVOK");
    m.insert("CAVOKE", "CAVOK");
    m.insert("CAV0K", "CAVOK");
    m.insert("TEMP0", "TEMPO");
    m.insert("TEMPPO", "TEMPO");
    m.insert("TMPO", "TEMPO");
    m.insert("BECMGG", "BECMG");
    m.insert("BECM", "BECMG");
    m.insert("N0SIG", "NOSIG");
    m.insert("NOSIGN", "NOSIG");
    m.insert("SCK", "SKC");
    m.insert("RMKS", "RMK");
    m.insert("RMK:", "RMK");
    m.insert("AUT0", "AUTO");

    m
});
