use super::types::{ContentNegotiationResult, ContentType};

/// One parsed `Accept` media range.
#[derive(Debug, PartialEq)]
struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    /// 3 = exact match, 2 = `type/*`, 1 = `*/*`, `None` = no match.
    fn specificity_for(&self, content_type: ContentType) -> Option<u8> {
        let (kind, subtype) = content_type.type_and_subtype();
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", "*") => Some(1),
            (k, "*") if k == kind => Some(2),
            (k, s) if k == kind && s == subtype => Some(3),
            _ => None,
        }
    }
}

/// Picks the preferred representation for an `Accept` header.
///
/// For every supported type the most specific matching media range decides its quality.
/// The highest quality wins, ties go to the earlier entry of `supported`. A missing, empty
/// or entirely unparseable header prefers the first supported type.
pub fn negotiate(accept: Option<&str>, supported: &[ContentType]) -> ContentNegotiationResult {
    let ranges = accept.map(parse_accept).unwrap_or_default();

    let preferred = if ranges.is_empty() {
        supported.first().copied()
    } else {
        let mut best: Option<(ContentType, f32)> = None;
        for content_type in supported {
            let quality = ranges
                .iter()
                .filter_map(|range| {
                    range
                        .specificity_for(*content_type)
                        .map(|specificity| (specificity, range.quality))
                })
                .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
                .map(|(_, quality)| quality);

            match quality {
                Some(q) if q > 0.0 => {
                    if best.is_none_or(|(_, best_q)| q > best_q) {
                        best = Some((*content_type, q));
                    }
                }
                _ => {}
            }
        }
        best.map(|(content_type, _)| content_type)
    };

    tracing::debug!("Negotiated {:?} from Accept {:?}", preferred, accept);

    ContentNegotiationResult {
        preferred,
        supported: supported.to_vec(),
    }
}

fn parse_accept(header: &str) -> Vec<MediaRange> {
    header.split(',').filter_map(parse_media_range).collect()
}

fn parse_media_range(segment: &str) -> Option<MediaRange> {
    let mut parts = segment.split(';');
    let media = parts.next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = media.split_once('/')?;
    let (kind, subtype) = (kind.trim(), subtype.trim());
    if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
        return None;
    }

    let mut quality = 1.0_f32;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            quality = value.trim().parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&quality) {
                return None;
            }
        }
    }

    Some(MediaRange {
        kind: kind.to_string(),
        subtype: subtype.to_string(),
        quality,
    })
}
