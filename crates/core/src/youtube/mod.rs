pub mod acquisition;
pub mod fetcher;
pub mod normalize;
pub mod player;
pub mod selector;

pub use acquisition::{
    AcquisitionRequest, AcquisitionStage, TranscriptAcquisition, publish_document,
};
pub use fetcher::{HttpTranscriptFetcher, TranscriptFetcher, caption_payload_url};
pub use normalize::{normalize, normalize_text};
pub use player::{ensure_captions, extract_player_state, parse_player_response};
pub use selector::{order_tracks, select_track};
