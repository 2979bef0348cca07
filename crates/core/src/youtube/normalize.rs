use crate::types::TimedCaptionPayload;

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Flatten a timed caption payload into one line of text.
///
/// Events without segments are skipped; segment and event texts are joined
/// with single spaces before [`normalize_text`] cleans the result, so the
/// returned line never starts or ends with whitespace.
pub fn normalize(payload: &TimedCaptionPayload) -> String {
    let joined = payload
        .events
        .iter()
        .filter_map(|event| event.segs.as_deref().filter(|segs| !segs.is_empty()))
        .map(|segs| {
            segs.iter()
                .map(|seg| seg.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" ");

    normalize_text(&joined)
}

/// Strip zero-width characters, collapse every whitespace run into a single
/// space and trim both ends. Idempotent.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !is_zero_width(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
