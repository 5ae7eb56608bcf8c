//! The dashboard session: which view is showing, in which language, and the
//! fetches and timers that belong to it.
//!
//! # Usage
//!
//! ```ignore
//! let dashboard = Dashboard::new(&config);
//! dashboard.select("h2").await?.await?;
//! let screen = dashboard.screen().await;
//! ```
//!
//! # Views
//!
//! The session shows either the map view or the detail view of one hospital.
//! `select` leaves the map (stopping its motion simulation) and starts a
//! prediction fetch; `back` drops the detail view and mounts a fresh map.
//!
//! # Staleness
//!
//! Every transition that invalidates an in-flight fetch (selecting another
//! hospital, going back, retrying) bumps the session epoch. A fetch carries the
//! epoch it was started under and only writes its result if that epoch is
//! still current, so a slow answer for a previously selected hospital can never
//! overwrite what is on screen now.
//!
//! # Announcements
//!
//! When the session starts and whenever the selection changes, a voice
//! announcement naming the first hospital in critical status is put on the
//! screen for the front end to speak. Announcements are muted by the sound
//! toggle and throttled to one per [`ANNOUNCEMENT_THROTTLE`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::chart::{HistorySource, SyntheticHistory};
use crate::config::SentinelConfig;
use crate::detail::{DetailOptions, DetailScreen, DetailView};
use crate::error::DashboardError;
use crate::fixtures;
use crate::i18n::{Bilingual, Language, labels};
use crate::map::{Layer, MapScreen, MapView};
use crate::model::Hospital;
use crate::prediction::PredictionClient;
use crate::schedule::ScheduledTask;

/// Minimum spacing between two critical-status announcements.
pub const ANNOUNCEMENT_THROTTLE: std::time::Duration = std::time::Duration::from_secs(15);

enum View {
    Map(MapView),
    Detail(DetailView),
}

struct Session {
    language: Language,
    view: View,
    epoch: u64,
    sound_enabled: bool,
    last_announced: Option<Instant>,
    announcement: Option<Bilingual>,
}

impl Session {
    /// Called on every selection change. Replaces the pending announcement.
    fn announce(&mut self, now: Instant) {
        self.announcement = None;
        if !self.sound_enabled {
            return;
        }
        if self
            .last_announced
            .is_some_and(|last| now.duration_since(last) <= ANNOUNCEMENT_THROTTLE)
        {
            return;
        }
        if let Some(hospital) = fixtures::first_critical() {
            self.announcement = Some(critical_announcement(hospital));
            self.last_announced = Some(now);
            info!(hospital_id = %hospital.id, "Critical status announced");
        }
    }
}

fn critical_announcement(hospital: &Hospital) -> Bilingual {
    Bilingual::new(
        format!("Attention. Critical status detected at {}.", hospital.name.en),
        format!("تنبيه. تم رصد حالة حرجة في {}.", hospital.name.ar),
    )
}

struct Inner {
    session: Mutex<Session>,
    client: PredictionClient,
    history: Arc<dyn HistorySource>,
    options: DetailOptions,
    jitter: Option<std::time::Duration>,
    now: Arc<StdMutex<DateTime<Utc>>>,
    clock_ticks: Arc<AtomicU64>,
    clock: Mutex<Option<ScheduledTask>>,
}

/// The view-state container. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    /// Start a session with the configured prediction client and synthetic history.
    ///
    /// Must be called from within a tokio runtime: the header clock and the
    /// map's motion simulation start immediately.
    pub fn new(config: &SentinelConfig) -> Self {
        Self::with_parts(
            config,
            PredictionClient::new(config),
            Arc::new(SyntheticHistory::default()),
        )
    }

    /// Start a session with an explicit client and history source.
    pub fn with_parts(
        config: &SentinelConfig,
        client: PredictionClient,
        history: Arc<dyn HistorySource>,
    ) -> Self {
        let now = Arc::new(StdMutex::new(Utc::now()));
        let clock_ticks = Arc::new(AtomicU64::new(0));
        let tick_now = now.clone();
        let tick_count = clock_ticks.clone();
        let clock = ScheduledTask::spawn("clock", config.clock_interval, move || {
            let mut slot = match tick_now.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = Utc::now();
            tick_count.fetch_add(1, Ordering::Relaxed);
        });

        let mut session = Session {
            language: Language::default(),
            view: View::Map(MapView::mount(config.jitter_interval, StdRng::from_entropy())),
            epoch: 0,
            sound_enabled: true,
            last_announced: None,
            announcement: None,
        };
        session.announce(Instant::now());

        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(session),
                client,
                history,
                options: DetailOptions {
                    step: Duration::minutes(i64::from(config.forecast_step_minutes)),
                    sort_alerts: config.sort_alerts,
                },
                jitter: config.jitter_interval,
                now,
                clock_ticks,
                clock: Mutex::new(Some(clock)),
            }),
        }
    }

    /// Enter the detail view for `hospital_id` and start fetching its prediction.
    ///
    /// The returned handle completes once the fetch has settled (or was
    /// discarded as stale).
    pub async fn select(&self, hospital_id: &str) -> Result<JoinHandle<()>, DashboardError> {
        let hospital = fixtures::find_hospital(hospital_id)
            .ok_or_else(|| DashboardError::UnknownHospital(hospital_id.to_string()))?;

        let mut session = self.inner.session.lock().await;
        session.epoch += 1;
        let epoch = session.epoch;

        let previous = std::mem::replace(&mut session.view, View::Detail(DetailView::new(hospital)));
        if let View::Map(mut map) = previous {
            map.unmount().await;
        }
        session.announce(Instant::now());
        drop(session);

        info!(hospital_id = %hospital.id, epoch, "Hospital selected");
        Ok(self.spawn_fetch(hospital, epoch))
    }

    /// Return to the map view. No-op when already there.
    pub async fn back(&self) {
        let mut session = self.inner.session.lock().await;
        if matches!(session.view, View::Map(_)) {
            return;
        }
        session.epoch += 1;
        session.view = View::Map(MapView::mount(self.inner.jitter, StdRng::from_entropy()));
        session.announce(Instant::now());
        info!(epoch = session.epoch, "Returned to map view");
    }

    /// Re-issue the fetch for the current hospital after a failure.
    pub async fn retry(&self) -> Result<JoinHandle<()>, DashboardError> {
        let mut session = self.inner.session.lock().await;
        let hospital = match &mut session.view {
            View::Detail(detail) => {
                detail.begin_retry()?;
                detail.hospital()
            }
            View::Map(_) => return Err(DashboardError::NotRetryable),
        };
        session.epoch += 1;
        let epoch = session.epoch;
        drop(session);

        info!(hospital_id = %hospital.id, epoch, "Retrying prediction");
        Ok(self.spawn_fetch(hospital, epoch))
    }

    fn spawn_fetch(&self, hospital: &'static Hospital, epoch: u64) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let result = inner.client.fetch_prediction(&hospital.id).await;

            let mut session = inner.session.lock().await;
            if session.epoch != epoch {
                debug!(
                    hospital_id = %hospital.id,
                    epoch,
                    current = session.epoch,
                    "Discarding stale prediction"
                );
                return;
            }

            if let View::Detail(detail) = &mut session.view {
                detail.settle(result, inner.history.as_ref(), &inner.options, Utc::now());
                info!(
                    hospital_id = %hospital.id,
                    phase = detail.phase().name(),
                    "Prediction settled"
                );
            }
        })
    }

    pub async fn language(&self) -> Language {
        self.inner.session.lock().await.language
    }

    pub async fn set_language(&self, language: Language) {
        self.inner.session.lock().await.language = language;
    }

    /// Switch EN <-> AR and return the new language.
    pub async fn toggle_language(&self) -> Language {
        let mut session = self.inner.session.lock().await;
        session.language = session.language.toggle();
        session.language
    }

    pub async fn sound_enabled(&self) -> bool {
        self.inner.session.lock().await.sound_enabled
    }

    /// Mute or unmute announcements. Muting also drops a pending one.
    pub async fn set_sound(&self, enabled: bool) {
        let mut session = self.inner.session.lock().await;
        session.sound_enabled = enabled;
        if !enabled {
            session.announcement = None;
        }
    }

    /// Flip the sound toggle and return the new setting.
    pub async fn toggle_sound(&self) -> bool {
        let mut session = self.inner.session.lock().await;
        session.sound_enabled = !session.sound_enabled;
        if !session.sound_enabled {
            session.announcement = None;
        }
        session.sound_enabled
    }

    /// Identifier of the hospital whose detail view is showing.
    pub async fn selected(&self) -> Option<String> {
        match &self.inner.session.lock().await.view {
            View::Detail(detail) => Some(detail.hospital().id.clone()),
            View::Map(_) => None,
        }
    }

    /// Flip a map layer. Fails when the map view is not showing.
    pub async fn toggle_layer(&self, layer: Layer) -> Result<bool, DashboardError> {
        match &mut self.inner.session.lock().await.view {
            View::Map(map) => Ok(map.toggle_layer(layer)),
            View::Detail(_) => Err(DashboardError::MapNotShowing),
        }
    }

    /// Motion simulation updates applied to the current map, if it is showing.
    pub async fn map_position_updates(&self) -> Option<u64> {
        match &self.inner.session.lock().await.view {
            View::Map(map) => Some(map.position_updates()),
            View::Detail(_) => None,
        }
    }

    /// Header clock value.
    pub fn now(&self) -> DateTime<Utc> {
        match self.inner.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// How many times the header clock has ticked.
    pub fn clock_ticks(&self) -> u64 {
        self.inner.clock_ticks.load(Ordering::Relaxed)
    }

    pub fn client(&self) -> &PredictionClient {
        &self.inner.client
    }

    /// Render the current view in the current language.
    pub async fn screen(&self) -> Screen {
        let session = self.inner.session.lock().await;
        let lang = session.language;

        let (selected_hospital, view) = match &session.view {
            View::Map(map) => (None, ViewScreen::Map(map.screen(lang))),
            View::Detail(detail) => (
                Some(detail.hospital().id.clone()),
                ViewScreen::Detail(detail.screen(lang)),
            ),
        };

        let text = labels(lang);
        Screen {
            language: lang,
            rtl: lang.is_rtl(),
            clock: self.now(),
            selected_hospital,
            sound_enabled: session.sound_enabled,
            sound_label: if session.sound_enabled {
                text.sound_on
            } else {
                text.sound_off
            },
            announcement: session
                .announcement
                .as_ref()
                .map(|a| a.get(lang).to_string()),
            live_feed_label: text.live_feed,
            live_feed: fixtures::live_feed(),
            view,
        }
    }

    /// Stop every timer and invalidate in-flight fetches.
    pub async fn shutdown(&self) {
        if let Some(clock) = self.inner.clock.lock().await.take() {
            clock.cancel().await;
        }

        let mut session = self.inner.session.lock().await;
        session.epoch += 1;
        if let View::Map(map) = &mut session.view {
            map.unmount().await;
        }
        info!("Dashboard shut down");
    }
}

/// The rendered session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub language: Language,
    pub rtl: bool,
    pub clock: DateTime<Utc>,
    pub selected_hospital: Option<String>,
    pub sound_enabled: bool,
    pub sound_label: &'static str,

    /// Text to speak, set by the latest selection change.
    pub announcement: Option<String>,

    pub live_feed_label: &'static str,
    pub live_feed: &'static [&'static str],
    pub view: ViewScreen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewScreen {
    Map(MapScreen),
    Detail(DetailScreen),
}
