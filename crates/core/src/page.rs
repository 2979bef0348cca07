//! Page-side inputs: the in-page player state, the video id of the current
//! page, and waiting for page readiness.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::types::PlayerState;

/// Read access to player state already embedded in the current page.
pub trait PageStateReader: Send + Sync {
    fn current_player_state(&self) -> Option<PlayerState>;
}

/// No in-page state is ever available; every lookup goes to the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPageState;

impl PageStateReader for NoPageState {
    fn current_player_state(&self) -> Option<PlayerState> {
        None
    }
}

/// A fixed in-page state.
#[derive(Debug, Clone)]
pub struct StaticPageState(pub PlayerState);

impl PageStateReader for StaticPageState {
    fn current_player_state(&self) -> Option<PlayerState> {
        Some(self.0.clone())
    }
}

pub fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host.ends_with(".youtube.com")
}

pub fn is_youtube_watch_page(url: &Url) -> bool {
    url.host_str().is_some_and(is_youtube_host) && url.path().starts_with("/watch")
}

/// The `v` query parameter of a YouTube watch page URL.
pub fn video_id_from_url(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    if !is_youtube_watch_page(&url) {
        return None;
    }

    url.query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Poll `check` until it yields a value.
///
/// Polling stops as soon as the check resolves or the optional timeout
/// elapses; in the latter case `None` is returned.
pub async fn wait_for_ready<T, P>(
    mut check: P,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Option<T>
where
    P: FnMut() -> Option<T>,
{
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Some(found) = check() {
            return Some(found);
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::debug!("page readiness check timed out");
            return None;
        }
    }
}
