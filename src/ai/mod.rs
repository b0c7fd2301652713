//! AI collaborator: design critique and photoreal renders.
//!
//! Each request runs its blocking HTTP call on a dedicated worker thread and
//! reports back over a channel that is polled once per frame, so the render
//! loop never waits on the network. Cancelling drops the receiving end; the
//! abandoned call finishes on its own thread without occupying Bevy's task
//! pools or delaying the next request. Each request works on its own snapshot
//! of the configuration.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{CarConfig, StudioSettings};
use crate::studio_state::StudioActivity;

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiStudio;

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<AiCollaborator>() {
            let settings = app
                .world()
                .get_resource::<StudioSettings>()
                .cloned()
                .unwrap_or_default();
            if settings.api_key.is_none() {
                warn!("GEMINI_API_KEY is not set; AI review and render will fail");
            }
            app.insert_resource(AiCollaborator::new(GeminiStudio::new(settings)));
        }

        app.add_event::<AiRequest>()
            .add_event::<AiOutcome>()
            .add_event::<CancelAiRequest>()
            .add_systems(
                Update,
                (start_requests, cancel_requests, poll_requests).chain(),
            );
    }
}

/// Structured critique returned by the design review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignReview {
    /// Score from 1 to 10.
    pub rating: f32,
    pub critique: String,
    pub suggested_enhancements: Vec<String>,
    pub market_segment: String,
}

/// Decoded render, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("design review unavailable: {0}")]
    ReviewUnavailable(String),
    #[error("design render unavailable: {0}")]
    RenderUnavailable(String),
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
}

/// The external generative service. Calls block; run them off the main thread.
pub trait DesignStudio: Send + Sync + 'static {
    fn review_design(&self, config: &CarConfig) -> Result<DesignReview, AiError>;

    /// `Ok(None)` when the service answered without an image.
    fn render_design(&self, config: &CarConfig) -> Result<Option<RenderedImage>, AiError>;
}

#[derive(Resource, Clone)]
pub struct AiCollaborator(pub Arc<dyn DesignStudio>);

impl AiCollaborator {
    pub fn new(studio: impl DesignStudio) -> Self {
        Self(Arc::new(studio))
    }
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiRequest {
    Review,
    Render,
}

/// Drops the in-flight request, if any.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct CancelAiRequest;

#[derive(Event, Debug)]
pub enum AiOutcome {
    Reviewed(DesignReview),
    Rendered(RenderedImage),
    /// The service answered but produced no image.
    RenderEmpty,
    Failed { request: AiRequest, error: AiError },
}

enum AiResult {
    Review(Result<DesignReview, AiError>),
    Render(Result<Option<RenderedImage>, AiError>),
}

/// In-flight request. Despawning it abandons the worker's result.
#[derive(Component)]
struct PendingRequest {
    request: AiRequest,
    // `Receiver` is not `Sync`; the mutex is only ever accessed through `get_mut`.
    result: Mutex<Receiver<AiResult>>,
}

fn spawn_worker(
    request: AiRequest,
    studio: Arc<dyn DesignStudio>,
    snapshot: CarConfig,
) -> std::io::Result<Receiver<AiResult>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name(format!("apex-ai-{request:?}").to_lowercase())
        .spawn(move || {
            let result = match request {
                AiRequest::Review => AiResult::Review(studio.review_design(&snapshot)),
                AiRequest::Render => AiResult::Render(studio.render_design(&snapshot)),
            };
            // The receiver is gone when the request was cancelled.
            let _ = sender.send(result);
        })?;
    Ok(receiver)
}

fn unavailable(request: AiRequest, reason: String) -> AiError {
    match request {
        AiRequest::Review => AiError::ReviewUnavailable(reason),
        AiRequest::Render => AiError::RenderUnavailable(reason),
    }
}

fn start_requests(
    mut commands: Commands,
    mut requests: EventReader<AiRequest>,
    collaborator: Res<AiCollaborator>,
    config: Res<CarConfig>,
    activity: Res<State<StudioActivity>>,
    mut next_activity: ResMut<NextState<StudioActivity>>,
    mut outcomes: EventWriter<AiOutcome>,
) {
    // One request at a time; extras in the same frame are dropped.
    let Some(request) = requests.read().next().copied() else {
        return;
    };
    requests.clear();

    if activity.get().is_busy() {
        debug!("Ignoring {request:?}: {:?} in progress", activity.get());
        return;
    }

    let receiver = match spawn_worker(request, Arc::clone(&collaborator.0), config.clone()) {
        Ok(receiver) => receiver,
        Err(err) => {
            error!("Could not start AI {request:?}: {err}");
            outcomes.send(AiOutcome::Failed {
                request,
                error: unavailable(request, err.to_string()),
            });
            return;
        }
    };

    info!("Started AI {request:?} for {} {}", config.brand_name, config.model_name);
    commands.spawn(PendingRequest {
        request,
        result: Mutex::new(receiver),
    });
    next_activity.set(match request {
        AiRequest::Review => StudioActivity::Reviewing,
        AiRequest::Render => StudioActivity::Rendering,
    });
}

fn cancel_requests(
    mut commands: Commands,
    mut cancels: EventReader<CancelAiRequest>,
    pending: Query<(Entity, &PendingRequest)>,
    mut next_activity: ResMut<NextState<StudioActivity>>,
) {
    if cancels.read().next().is_none() {
        return;
    }
    cancels.clear();

    for (entity, pending) in &pending {
        // Dropping the receiver detaches the worker thread.
        commands.entity(entity).despawn();
        info!("Cancelled AI {:?}", pending.request);
        next_activity.set(StudioActivity::Idle);
    }
}

fn poll_requests(
    mut commands: Commands,
    mut pending: Query<(Entity, &mut PendingRequest)>,
    mut outcomes: EventWriter<AiOutcome>,
    mut next_activity: ResMut<NextState<StudioActivity>>,
) {
    for (entity, mut pending) in &mut pending {
        let request = pending.request;
        let polled = match pending.result.get_mut() {
            Ok(receiver) => receiver.try_recv(),
            Err(_) => Err(TryRecvError::Disconnected),
        };
        let result = match polled {
            Ok(result) => Ok(result),
            Err(TryRecvError::Empty) => continue,
            Err(TryRecvError::Disconnected) => Err(unavailable(
                request,
                "worker stopped without answering".to_string(),
            )),
        };
        commands.entity(entity).despawn();
        next_activity.set(StudioActivity::Idle);

        let outcome = match result {
            Err(error) => {
                error!("AI {request:?} worker failed: {error}");
                AiOutcome::Failed { request, error }
            }
            Ok(result) => match result {
                AiResult::Review(Ok(review)) => {
                    info!("AI review received: {}/10", review.rating);
                    AiOutcome::Reviewed(review)
                }
                AiResult::Render(Ok(Some(image))) => {
                    info!("AI render received: {}x{}", image.width, image.height);
                    AiOutcome::Rendered(image)
                }
                AiResult::Render(Ok(None)) => {
                    warn!("AI render returned no image");
                    AiOutcome::RenderEmpty
                }
                AiResult::Review(Err(error)) | AiResult::Render(Err(error)) => {
                    error!("AI {request:?} failed: {error}");
                    AiOutcome::Failed { request, error }
                }
            },
        };
        outcomes.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct FakeStudio {
        calls: AtomicUsize,
        fail: bool,
        /// Delay applied to the first call only.
        first_call_latency: Duration,
    }

    impl FakeStudio {
        fn begin_call(&self) {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(self.first_call_latency);
            }
        }
    }

    impl DesignStudio for FakeStudio {
        fn review_design(&self, config: &CarConfig) -> Result<DesignReview, AiError> {
            self.begin_call();
            if self.fail {
                return Err(AiError::ReviewUnavailable("offline".into()));
            }
            Ok(DesignReview {
                rating: 7.0,
                critique: format!("{} looks fast", config.model_name),
                suggested_enhancements: vec!["Wider rear track".into()],
                market_segment: "Grand Tourer".into(),
            })
        }

        fn render_design(&self, _config: &CarConfig) -> Result<Option<RenderedImage>, AiError> {
            self.begin_call();
            Ok(None)
        }
    }

    fn ai_app(studio: FakeStudio) -> App {
        ai_app_with(AiCollaborator::new(studio))
    }

    fn ai_app_with(collaborator: AiCollaborator) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<StudioActivity>()
            .init_resource::<CarConfig>()
            .insert_resource(collaborator)
            .add_plugins(AiPlugin);
        app
    }

    /// Pump frames until an outcome arrives.
    fn wait_for_outcome(app: &mut App) -> Vec<AiOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            app.update();
            let outcomes: Vec<AiOutcome> = app
                .world_mut()
                .resource_mut::<Events<AiOutcome>>()
                .drain()
                .collect();
            if !outcomes.is_empty() {
                return outcomes;
            }
            assert!(Instant::now() < deadline, "no AI outcome");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn review_round_trip_returns_to_idle() {
        let mut app = ai_app(FakeStudio::default());
        app.world_mut().send_event(AiRequest::Review);

        let outcomes = wait_for_outcome(&mut app);
        assert!(matches!(
            &outcomes[..],
            [AiOutcome::Reviewed(review)] if review.critique == "RS-1 looks fast"
        ));

        app.update();
        assert_eq!(
            *app.world().resource::<State<StudioActivity>>().get(),
            StudioActivity::Idle
        );
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let mut app = ai_app(FakeStudio {
            fail: true,
            ..Default::default()
        });
        app.world_mut().send_event(AiRequest::Review);

        let outcomes = wait_for_outcome(&mut app);
        assert!(matches!(
            &outcomes[..],
            [AiOutcome::Failed {
                request: AiRequest::Review,
                error: AiError::ReviewUnavailable(_)
            }]
        ));
    }

    #[test]
    fn empty_render_is_distinct_from_failure() {
        let mut app = ai_app(FakeStudio::default());
        app.world_mut().send_event(AiRequest::Render);

        let outcomes = wait_for_outcome(&mut app);
        assert!(matches!(&outcomes[..], [AiOutcome::RenderEmpty]));
    }

    #[test]
    fn requests_while_busy_are_ignored() {
        let studio = Arc::new(FakeStudio {
            first_call_latency: Duration::from_millis(100),
            ..Default::default()
        });
        let mut app = ai_app_with(AiCollaborator(studio.clone()));
        app.world_mut().send_event(AiRequest::Review);
        app.update();
        app.world_mut().send_event(AiRequest::Render);

        let outcomes = wait_for_outcome(&mut app);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], AiOutcome::Reviewed(_)));
        assert_eq!(studio.calls.load(Ordering::SeqCst), 1);

        let world = app.world_mut();
        assert_eq!(world.query::<&PendingRequest>().iter(world).count(), 0);
    }

    #[test]
    fn cancel_drops_pending_request() {
        let mut app = ai_app(FakeStudio {
            first_call_latency: Duration::from_millis(200),
            ..Default::default()
        });
        app.world_mut().send_event(AiRequest::Review);
        app.update();
        app.world_mut().send_event(CancelAiRequest);
        app.update();
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&PendingRequest>().iter(world).count(), 0);
        assert_eq!(
            *app.world().resource::<State<StudioActivity>>().get(),
            StudioActivity::Idle
        );
    }

    #[test]
    fn cancelled_call_does_not_delay_next_request() {
        let slow = Duration::from_secs(3);
        let studio = Arc::new(FakeStudio {
            first_call_latency: slow,
            ..Default::default()
        });
        let mut app = ai_app_with(AiCollaborator(studio.clone()));

        app.world_mut().send_event(AiRequest::Review);
        app.update();
        app.world_mut().send_event(CancelAiRequest);
        app.update();

        let started = Instant::now();
        app.world_mut().send_event(AiRequest::Review);
        let outcomes = wait_for_outcome(&mut app);

        assert!(matches!(&outcomes[..], [AiOutcome::Reviewed(_)]));
        assert!(started.elapsed() < slow / 2, "took {:?}", started.elapsed());
        assert_eq!(studio.calls.load(Ordering::SeqCst), 2);
    }
}
