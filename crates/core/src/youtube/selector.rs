use crate::types::CaptionTrack;

pub const PREFERRED_LANGUAGE: &str = "en";

/// Sort key: preferred language first, then manual before auto-generated.
fn priority(track: &CaptionTrack) -> (bool, bool) {
    (
        track.language_code != PREFERRED_LANGUAGE,
        track.is_auto_generated(),
    )
}

/// Order caption tracks by priority. The sort is stable, so tracks of equal
/// priority keep their original relative order.
pub fn order_tracks(tracks: &[CaptionTrack]) -> Vec<CaptionTrack> {
    let mut ordered = tracks.to_vec();
    ordered.sort_by_key(priority);
    ordered
}

/// The highest-priority track, if any.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<CaptionTrack> {
    order_tracks(tracks).into_iter().next()
}
