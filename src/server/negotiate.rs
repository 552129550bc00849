//! `Accept` header matching.

use super::request::ParsedRequest;

const HTML: &str = "text/html";
const JSON: &str = "application/json";

#[derive(Debug)]
struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    quality: f32,
}

impl MediaRange<'_> {
    fn parse(item: &str) -> Option<MediaRange<'_>> {
        let mut parts = item.split(';');
        let (kind, subtype) = parts.next()?.trim().split_once('/')?;
        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse().unwrap_or(0.0);
                }
            }
        }
        Some(MediaRange {
            kind: kind.trim(),
            subtype: subtype.trim(),
            quality,
        })
    }

    /// Specificity of the match, `None` when the range does not cover `offer`.
    fn matches(&self, offer: &str) -> Option<u8> {
        let (kind, subtype) = offer.split_once('/')?;
        match (self.kind, self.subtype) {
            ("*", "*") => Some(0),
            (k, "*") if k.eq_ignore_ascii_case(kind) => Some(1),
            (k, s) if k.eq_ignore_ascii_case(kind) && s.eq_ignore_ascii_case(subtype) => Some(2),
            _ => None,
        }
    }
}

/// Pick the offer the client prefers.
///
/// Each offer is scored by the most specific media range covering it; higher
/// quality wins, then higher specificity, then the earlier offer. A missing or
/// empty header yields `default`.
pub fn best_match<'o>(accept: Option<&str>, offers: &[&'o str], default: &'o str) -> &'o str {
    let ranges: Vec<MediaRange<'_>> = match accept {
        Some(header) if !header.trim().is_empty() => {
            header.split(',').filter_map(MediaRange::parse).collect()
        }
        _ => return default,
    };
    let mut best: Option<(&'o str, f32, u8)> = None;
    for &offer in offers {
        let score = ranges
            .iter()
            .filter_map(|r| r.matches(offer).map(|spec| (r.quality, spec)))
            .max_by_key(|(_, spec)| *spec);
        let Some((quality, spec)) = score else {
            continue;
        };
        if quality <= 0.0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, q, s)) => quality > q || (quality == q && spec > s),
        };
        if better {
            best = Some((offer, quality, spec));
        }
    }
    best.map(|(offer, _, _)| offer).unwrap_or(default)
}

/// Whether the client asked for JSON rather than the HTML page.
///
/// True when `application/json` is the best match of the `Accept` header (HTML
/// is the default) or when the query string carries a `json` key.
pub fn accept_json(req: &ParsedRequest) -> bool {
    let media = best_match(req.header("accept"), &[HTML, JSON], HTML);
    media == JSON || req.query_params.contains_key("json")
}
