use super::{join, run_len, ParseContext, Step};
use crate::model::{CloudCover, CloudLayer, CloudType};
use crate::parsing::tokenize::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static LAYER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<cover>FEW|SCT|BKN|OVC|VV)(?P<height>\d{3}|///)(?P<kind>CB|TCU|///)?$")
        .expect("cloud layer regex")
});

/// Parse the ordered run of sky-condition groups, lowest layer first as
/// reported. Fully slashed groups (`//////`) are consumed without adding a
/// layer.
pub fn parse_sky(tokens: &[Token], _ctx: &ParseContext) -> Step<Vec<CloudLayer>> {
    let len = run_len(tokens, TokenKind::Sky);
    if len == 0 {
        return Step::absent();
    }
    let run = &tokens[..len];

    let mut layers = Vec::with_capacity(len);
    for token in run {
        if token.text.starts_with("///") {
            continue;
        }
        match decode(&token.text) {
            Some(layer) => layers.push(layer),
            None => return Step::malformed(join(run), len),
        }
    }
    Step::present(layers, len)
}

pub fn decode(text: &str) -> Option<CloudLayer> {
    if let Some(cover) = CloudCover::from_code(text).filter(|c| c.is_clear()) {
        return Some(CloudLayer {
            repr: text.to_string(),
            cover,
            base_ft: None,
            cloud_type: None,
        });
    }

    let caps = LAYER.captures(text)?;
    let cover = CloudCover::from_code(&caps["cover"])?;
    let base_ft = match &caps["height"] {
        "///" => None,
        digits => Some(digits.parse::<u32>().ok()? * 100),
    };
    let cloud_type = caps.name("kind").and_then(|k| match k.as_str() {
        "CB" => Some(CloudType::Cumulonimbus),
        "TCU" => Some(CloudType::ToweringCumulus),
        _ => None,
    });

    Some(CloudLayer {
        repr: text.to_string(),
        cover,
        base_ft,
        cloud_type,
    })
}
