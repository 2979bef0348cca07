use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use pinocchio_core::{
    AcquisitionRequest, AcquisitionStage, CaptionTrack, FailureKind, PlayerState,
    TimedCaptionPayload, TranscriptAcquisition, TranscriptError, TranscriptFetcher,
    events::{BusConfig, EventBusBuilder, downcast_ref},
    queues::QueueKind,
    workers::{InputSpec, PipelineFailed, SubscriptionSpec, TranscriptExtracted},
    youtube::publish_document,
};
use tokio::sync::broadcast;

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    NoTracks,
    BadPage,
    Hang,
}

struct FakeFetcher {
    behaviour: Behaviour,
    state_calls: AtomicUsize,
    payload_calls: AtomicUsize,
    requested_track: Mutex<Option<CaptionTrack>>,
}

impl FakeFetcher {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            state_calls: AtomicUsize::new(0),
            payload_calls: AtomicUsize::new(0),
            requested_track: Mutex::new(None),
        }
    }
}

fn track(language_code: &str, kind: Option<&str>) -> CaptionTrack {
    CaptionTrack {
        language_code: language_code.to_string(),
        kind: kind.map(str::to_string),
        base_url: format!("https://www.youtube.com/api/timedtext?lang={language_code}"),
    }
}

#[async_trait]
impl TranscriptFetcher for FakeFetcher {
    async fn player_state(&self, video_id: &str) -> Result<PlayerState, TranscriptError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        let caption_tracks = match self.behaviour {
            Behaviour::BadPage => {
                return Err(TranscriptError::Parse {
                    reason: "player response not found in watch page".to_string(),
                });
            }
            Behaviour::Hang => std::future::pending().await,
            Behaviour::NoTracks => Vec::new(),
            Behaviour::Succeed => vec![track("de", None), track("en", Some("asr"))],
        };

        Ok(PlayerState {
            video_id: video_id.to_string(),
            title: "Rust in ten minutes".to_string(),
            author: Some("Ferris".to_string()),
            duration_seconds: Some(600),
            view_count: Some(42),
            caption_tracks,
        })
    }

    async fn caption_payload(
        &self,
        track: &CaptionTrack,
    ) -> Result<TimedCaptionPayload, TranscriptError> {
        self.payload_calls.fetch_add(1, Ordering::SeqCst);
        *self.requested_track.lock().expect("track lock") = Some(track.clone());
        let payload = serde_json::from_str(
            r#"{"events":[{"segs":[{"utf8":"  ownership "}]},{"segs":[]},{"segs":[{"utf8":"and\nborrowing"}]}]}"#,
        )
        .expect("payload json");
        Ok(payload)
    }
}

fn request() -> AcquisitionRequest {
    AcquisitionRequest::new("abcdefghijk", "https://www.youtube.com/watch?v=abcdefghijk")
}

fn recording(
    fetcher: FakeFetcher,
) -> (TranscriptAcquisition<FakeFetcher>, Arc<Mutex<Vec<AcquisitionStage>>>) {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&stages);
    let acquisition = TranscriptAcquisition::new(fetcher)
        .with_stage_observer(move |stage| seen.lock().expect("stages lock").push(stage));
    (acquisition, stages)
}

#[tokio::test]
async fn successful_acquisition_walks_every_stage() {
    let (acquisition, stages) = recording(FakeFetcher::new(Behaviour::Succeed));

    let document = acquisition.acquire(&request()).await.expect("document");

    assert_eq!(
        *stages.lock().expect("stages lock"),
        vec![
            AcquisitionStage::Idle,
            AcquisitionStage::FetchingState,
            AcquisitionStage::SelectingTrack,
            AcquisitionStage::FetchingPayload,
            AcquisitionStage::Normalizing,
            AcquisitionStage::Formatting,
            AcquisitionStage::Done,
        ]
    );
    assert_eq!(document.transcript, "ownership and borrowing");
    assert!(document.text.starts_with("# Rust in ten minutes\n\n"));
    assert!(document.text.contains("Duration: 10:00\n"));
    assert!(document.text.ends_with("## Transcript\n\nownership and borrowing"));
    assert_eq!(document.url, "https://www.youtube.com/watch?v=abcdefghijk");

    let chosen = acquisition
        .fetcher()
        .requested_track
        .lock()
        .expect("track lock")
        .clone()
        .expect("a payload was requested");
    assert_eq!(chosen.language_code, "en");
}

#[tokio::test]
async fn empty_track_list_fails_before_payload_fetch() {
    let (acquisition, stages) = recording(FakeFetcher::new(Behaviour::NoTracks));

    let err = acquisition.acquire(&request()).await.unwrap_err();

    assert!(matches!(err, TranscriptError::NoCaptions { ref video_id } if video_id == "abcdefghijk"));
    assert_eq!(acquisition.fetcher().payload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        stages.lock().expect("stages lock").last(),
        Some(&AcquisitionStage::Failed(FailureKind::NoCaptions))
    );
}

#[tokio::test]
async fn every_attempt_restarts_from_idle() {
    let (acquisition, stages) = recording(FakeFetcher::new(Behaviour::Succeed));

    acquisition.acquire(&request()).await.expect("first");
    acquisition.acquire(&request()).await.expect("second");

    let stages = stages.lock().expect("stages lock");
    let idles = stages
        .iter()
        .filter(|s| **s == AcquisitionStage::Idle)
        .count();
    assert_eq!(idles, 2);
    assert_eq!(acquisition.fetcher().state_calls.load(Ordering::SeqCst), 2);
}

fn observed_bus() -> (
    pinocchio_core::events::EventBus,
    pinocchio_core::workers::WorkerInputs,
) {
    let (bus, mut wiring, _tasks) = EventBusBuilder::new(BusConfig::default())
        .subscribe(SubscriptionSpec {
            subscriber_id: "observer",
            inputs: vec![InputSpec {
                event_type: TranscriptExtracted::EVENT_TYPE,
                queue_kind: QueueKind::FifoDropOldest { capacity: 4 },
            }],
        })
        .build()
        .expect("bus");
    let inputs = wiring.take("observer").expect("observer inputs");
    (bus, inputs)
}

#[tokio::test]
async fn parse_failure_publishes_nothing() {
    let (acquisition, stages) = recording(FakeFetcher::new(Behaviour::BadPage));
    let (bus, mut observer) = observed_bus();

    let err = acquisition
        .acquire_and_publish(&request(), &bus)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Parse);
    assert_eq!(
        stages.lock().expect("stages lock").last(),
        Some(&AcquisitionStage::Failed(FailureKind::Parse))
    );
    assert!(observer.try_next().is_none());
}

#[tokio::test]
async fn success_publishes_one_transcript_event() {
    let acquisition = TranscriptAcquisition::new(FakeFetcher::new(Behaviour::Succeed));
    let (bus, mut observer) = observed_bus();

    let (document, delivered) = acquisition
        .acquire_and_publish(&request(), &bus)
        .await
        .expect("document");

    assert_eq!(delivered, 1);
    let item = observer.try_next().expect("one event delivered");
    assert_eq!(item.event_type, TranscriptExtracted::EVENT_TYPE);
    let event = downcast_ref::<TranscriptExtracted>(&item.event.event).expect("typed event");
    assert_eq!(event.video_id, "abcdefghijk");
    assert!(Arc::ptr_eq(&event.document, &document));

    let message = serde_json::to_value(item.event.event.message().expect("has wire shape"))
        .expect("serializable");
    assert_eq!(message["action"], "processYouTubeTranscript");
    assert_eq!(message["transcript"], "ownership and borrowing");
    assert_eq!(message["metadata"]["views"], 42);

    assert!(observer.try_next().is_none());
}

#[tokio::test]
async fn document_without_transcript_subscribers_reaches_no_one() {
    let (bus, _wiring, _tasks) = EventBusBuilder::new(BusConfig::default())
        .subscribe(SubscriptionSpec {
            subscriber_id: "failures",
            inputs: vec![InputSpec {
                event_type: PipelineFailed::EVENT_TYPE,
                queue_kind: QueueKind::FifoDropOldest { capacity: 4 },
            }],
        })
        .build()
        .expect("bus");
    let acquisition = TranscriptAcquisition::new(FakeFetcher::new(Behaviour::Succeed));

    let document = acquisition.acquire(&request()).await.expect("document");
    let (document, delivered) = publish_document(&bus, &request(), document);

    assert_eq!(delivered, 0);
    assert_eq!(document.metadata.title, "Rust in ten minutes");
    assert_eq!(bus.metrics().unrouted(), 1);
}

#[tokio::test]
async fn shutdown_cancels_in_flight_acquisition() {
    let (acquisition, stages) = recording(FakeFetcher::new(Behaviour::Hang));
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let handle = tokio::spawn(async move {
        let result = acquisition.acquire_until(&request(), &mut shutdown_rx).await;
        (result, acquisition)
    });
    tokio::task::yield_now().await;
    shutdown_tx.send(()).expect("receiver alive");

    let (result, acquisition) = handle.await.expect("task");
    assert!(matches!(result, Err(TranscriptError::Cancelled)));
    assert_eq!(acquisition.fetcher().payload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        stages.lock().expect("stages lock").last(),
        Some(&AcquisitionStage::Failed(FailureKind::Cancelled))
    );
}

#[tokio::test]
async fn closed_shutdown_channel_does_not_cancel() {
    let acquisition = TranscriptAcquisition::new(FakeFetcher::new(Behaviour::Succeed));
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    drop(shutdown_tx);

    let document = acquisition
        .acquire_until(&request(), &mut shutdown_rx)
        .await
        .expect("document");

    assert_eq!(document.transcript, "ownership and borrowing");
}

#[test]
fn request_from_page_url_requires_a_video_id() {
    let request = AcquisitionRequest::from_page_url("https://www.youtube.com/watch?v=abcdefghijk&t=9")
        .expect("request");
    assert_eq!(request.video_id, "abcdefghijk");

    let err = AcquisitionRequest::from_page_url("https://www.youtube.com/feed").unwrap_err();
    assert_eq!(err.kind(), FailureKind::Parse);
}
