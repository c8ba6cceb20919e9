//! Tracker facade: the single consumer of the observation stream.
//!
//! Drives the session tracker, credits closed sessions to the daily ledger
//! and lifetime stats, runs the intervention policy and tells the presenter
//! what to show. Every entry point returns the domain events it produced,
//! in order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = TrackerFacade::new(Database::open()?, presenter, Config::load_or_default());
//! for observation in inbox {
//!     for event in tracker.handle(observation) {
//!         bridge.send(event);
//!     }
//! }
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ledger::DailyLedger;
use super::policy::{self, Decision, PolicyInput};
use super::session::{ClosedSession, SessionTracker};
use super::stats::StatsRecorder;
use crate::classifier::SectionProbe;
use crate::events::{ms_to_secs, ContentStatus, Event};
use crate::platform::{PackageKind, Platform};
use crate::presenter::{OverlayKind, OverlayRequest, Presenter};
use crate::storage::{keys, ConfigProvider, KvStore};

/// One item of the inbound queue, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Connected {
        at: DateTime<Local>,
    },
    Foreground {
        package: String,
        at: DateTime<Local>,
    },
    Section {
        platform: Platform,
        active: bool,
        at: DateTime<Local>,
    },
    /// The user pressed the overlay's dismiss button. `still_active` is the
    /// classifier's answer when the host re-queried it.
    OverlayDismissed {
        at: DateTime<Local>,
        still_active: bool,
    },
    Interrupted {
        at: DateTime<Local>,
    },
}

/// The intervention currently in force. In vacation mode it exists without
/// being displayed, so foreground handling is the same in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Intervention {
    kind: OverlayKind,
    displayed: bool,
}

pub struct TrackerFacade<S, P, C> {
    store: S,
    presenter: P,
    config: C,
    session: SessionTracker,
    ledger: DailyLedger,
    stats: StatsRecorder,
    overlay: Option<Intervention>,
}

impl<S, P, C> TrackerFacade<S, P, C>
where
    S: KvStore,
    P: Presenter,
    C: ConfigProvider,
{
    /// Load persisted state. Unreadable values start from zero.
    pub fn new(store: S, presenter: P, config: C) -> Self {
        let ledger = DailyLedger::load(&store);
        let stats = StatsRecorder::load(&store);
        Self {
            store,
            presenter,
            config,
            session: SessionTracker::new(),
            ledger,
            stats,
            overlay: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &StatsRecorder {
        &self.stats
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    /// Overlay the presenter is showing right now.
    pub fn overlay(&self) -> Option<OverlayKind> {
        self.overlay.filter(|o| o.displayed).map(|o| o.kind)
    }

    /// Intervention in force, displayed or muted by vacation mode.
    pub fn intervention(&self) -> Option<OverlayKind> {
        self.overlay.map(|o| o.kind)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Ledger total plus the open session's elapsed time.
    pub fn total_elapsed_today_ms(&self, now: DateTime<Local>) -> u64 {
        self.ledger
            .total_today()
            .saturating_add(self.session.elapsed_ms(now))
    }

    // ── Entry points ─────────────────────────────────────────────────

    pub fn handle(&mut self, observation: Observation) -> Vec<Event> {
        match observation {
            Observation::Connected { at } => self.connect(at),
            Observation::Foreground { package, at } => self.on_observation(&package, at),
            Observation::Section {
                platform,
                active,
                at,
            } => self.on_section_classification(platform, active, at),
            Observation::OverlayDismissed { at, still_active } => {
                self.on_overlay_dismissed_by_user(&move |_: Platform| still_active, at)
            }
            Observation::Interrupted { at } => self.interrupt(at),
        }
    }

    pub fn connect(&mut self, now: DateTime<Local>) -> Vec<Event> {
        self.ensure_day(now);
        info!("tracker connected");
        vec![Event::content(
            ContentStatus::ServiceConnected,
            None,
            self.stats.total_time_ms(),
        )]
    }

    /// Foreground package changed (or another event arrived for it).
    pub fn on_observation(&mut self, package: &str, now: DateTime<Local>) -> Vec<Event> {
        self.ensure_day(now);
        let host_package = self.config.config().host_package;
        let kind = PackageKind::classify(package, &host_package);

        match kind {
            PackageKind::Tracked(platform) => self.enter_tracked_app(platform, now),
            _ if self.overlay.is_some() => {
                if kind.is_genuine_switch() {
                    self.on_genuine_app_switch_while_overlay_showing(now)
                } else {
                    // The overlay window itself, or system chrome drawn over it.
                    Vec::new()
                }
            }
            _ => {
                debug!(package, "foreground left tracked apps");
                self.leave_app(now)
            }
        }
    }

    pub fn on_section_classification(
        &mut self,
        platform: Platform,
        section_active: bool,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        self.ensure_day(now);
        let mut events = Vec::new();

        let outcome = self.session.on_section_signal(platform, section_active, now);
        if let Some(closed) = outcome.closed {
            self.close_section(&closed, now, &mut events);
        }
        if let Some(opened) = outcome.opened {
            info!(%opened, "entered {}", opened.section_name());
            events.push(Event::content(
                opened.entered_status(),
                Some(opened),
                self.stats.total_time_ms(),
            ));
        }

        let open_platform = self.session.active_platform();
        events.push(self.time_update(outcome.elapsed_ms, open_platform));

        let still_in_section = section_active && open_platform == Some(platform);
        self.intervene(still_in_section, now, &mut events);
        events
    }

    /// The dismiss button of a soft warning was pressed.
    ///
    /// The time watched so far is credited as a closed session; tracking
    /// then restarts from `now` if the probe confirms the section is still
    /// on screen. Threshold flags are never cleared.
    pub fn on_overlay_dismissed_by_user(
        &mut self,
        probe: &dyn SectionProbe,
        now: DateTime<Local>,
    ) -> Vec<Event> {
        match self.overlay {
            Some(o) if o.displayed && o.kind.dismissible() => {}
            other => {
                debug!(overlay = ?other, "dismissal ignored, no dismissible overlay");
                return Vec::new();
            }
        }
        self.ensure_day(now);
        self.clear_overlay();

        let mut events = Vec::new();
        let Some(closed) = self.session.close(now) else {
            return events;
        };
        self.credit(&closed, now, &mut events);

        let platform = closed.platform;
        let status = if self.session.resume(platform, now, probe.section_active(platform)) {
            info!(%platform, "overlay dismissed, tracking continues");
            ContentStatus::OverlayDismissed
        } else {
            platform.left_status()
        };
        events.push(Event::content(status, Some(platform), self.stats.total_time_ms()));
        events
    }

    /// A non-tracked, non-host, non-system package took the foreground
    /// while an overlay was up. Acts once: later noise finds no overlay.
    pub fn on_genuine_app_switch_while_overlay_showing(&mut self, now: DateTime<Local>) -> Vec<Event> {
        if self.overlay.is_none() {
            return Vec::new();
        }
        info!("user switched to another app during an intervention");
        self.leave_app(now)
    }

    /// Service interrupted or torn down. The overlay goes away; the open
    /// session is not flushed.
    pub fn interrupt(&mut self, now: DateTime<Local>) -> Vec<Event> {
        self.clear_overlay();
        if let Some(platform) = self.session.active_platform() {
            warn!(
                %platform,
                elapsed_ms = self.session.elapsed_ms(now),
                "tracker interrupted with an open session, its time is not credited"
            );
        }
        Vec::new()
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// A new day resets the flags, so nothing from yesterday stays on screen.
    fn ensure_day(&mut self, now: DateTime<Local>) {
        if self.ledger.ensure_day(now.date_naive()) {
            self.ledger.save(&self.store);
            self.clear_overlay();
        }
    }

    /// A tracked app came to the front. A session open on the other
    /// platform can't be on screen any more.
    fn enter_tracked_app(&mut self, platform: Platform, now: DateTime<Local>) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(open) = self.session.active_platform() {
            if open != platform {
                if let Some(closed) = self.session.close(now) {
                    self.close_section(&closed, now, &mut events);
                }
            }
        }
        events
    }

    fn leave_app(&mut self, now: DateTime<Local>) -> Vec<Event> {
        let mut events = Vec::new();
        let had_overlay = self.overlay.is_some();
        self.clear_overlay();

        let closed = self.session.on_foreground_lost(now);
        if let Some(closed) = &closed {
            self.credit(closed, now, &mut events);
        }
        if closed.is_some() || had_overlay {
            events.push(Event::content(
                ContentStatus::LeftApp,
                closed.map(|c| c.platform),
                self.stats.total_time_ms(),
            ));
        }
        events
    }

    fn close_section(&mut self, closed: &ClosedSession, now: DateTime<Local>, events: &mut Vec<Event>) {
        self.clear_overlay();
        self.credit(closed, now, events);
        events.push(Event::content(
            closed.platform.left_status(),
            Some(closed.platform),
            self.stats.total_time_ms(),
        ));
    }

    /// Ledger first, then lifetime stats, committed as one batch. Runs once
    /// per closed session.
    fn credit(&mut self, closed: &ClosedSession, now: DateTime<Local>, events: &mut Vec<Event>) {
        self.ledger.accumulate(closed.platform, closed.duration_ms);
        self.stats.record_session_close(closed, now);
        let mut batch = self.ledger.entries();
        batch.extend(self.stats.entries());
        keys::write_batch(&self.store, &batch);
        events.push(self.stats_update(Some(closed.platform)));
    }

    fn intervene(&mut self, section_active: bool, now: DateTime<Local>, events: &mut Vec<Event>) {
        let config = self.config.config();
        let limit_ms = config.daily_limit_ms();
        let total = self.total_elapsed_today_ms(now);

        let decision = policy::evaluate(&PolicyInput {
            total_elapsed_today_ms: total,
            limit_ms,
            half_shown: self.ledger.half_shown(),
            limit_reached: self.ledger.limit_reached(),
            section_active,
        });

        let flipped = match decision {
            Decision::ShowSoftWarning => self.ledger.mark_half_shown(),
            Decision::ShowHardBlock => self.ledger.mark_limit_reached(),
            Decision::None => false,
        };
        if flipped {
            info!(?decision, total_ms = total, limit_ms, "daily threshold crossed");
            self.ledger.save(&self.store);
        }

        // A soft warning stays until dismissed or the section is left. The
        // ledger must still back it: a rollover clears `half_shown`.
        let wanted = policy::overlay_for(decision).or_else(|| {
            self.intervention().filter(|kind| {
                section_active && *kind == OverlayKind::SoftWarning && self.ledger.half_shown()
            })
        });

        let Some(kind) = wanted else {
            self.clear_overlay();
            return;
        };
        if self.intervention() != Some(kind) {
            self.clear_overlay();
            self.overlay = Some(Intervention {
                kind,
                displayed: false,
            });
        }

        if config.vacation_mode {
            if decision != Decision::None {
                debug!(?decision, "vacation mode, overlay suppressed");
            }
            self.hide_displayed();
        } else if self.overlay() != Some(kind) {
            let request = OverlayRequest::new(kind, total, limit_ms, config.overlay);
            self.show_overlay(&request, events);
        }
    }

    fn show_overlay(&mut self, request: &OverlayRequest, events: &mut Vec<Event>) {
        match self.presenter.show(request) {
            Ok(()) => {
                info!(kind = ?request.kind, elapsed_ms = request.elapsed_today_ms, "overlay displayed");
                self.overlay = Some(Intervention {
                    kind: request.kind,
                    displayed: true,
                });
                events.push(Event::content(
                    ContentStatus::OverlayShown,
                    self.session.active_platform(),
                    self.stats.total_time_ms(),
                ));
            }
            Err(e) => {
                warn!(kind = ?request.kind, error = %e, "failed to display overlay");
                self.overlay = None;
            }
        }
    }

    /// End the intervention, removing the overlay if it is on screen.
    fn clear_overlay(&mut self) {
        self.hide_displayed();
        self.overlay = None;
    }

    /// Take the overlay off screen. The intervention stays in force.
    fn hide_displayed(&mut self) {
        let Some(intervention) = self.overlay.as_mut() else {
            return;
        };
        if !std::mem::replace(&mut intervention.displayed, false) {
            return;
        }
        match self.presenter.hide() {
            Ok(()) => debug!("overlay removed"),
            Err(e) => warn!(error = %e, "failed to remove overlay"),
        }
    }

    fn time_update(&self, elapsed_ms: u64, platform: Option<Platform>) -> Event {
        Event::ContentTimeUpdate {
            current_session_time: ms_to_secs(elapsed_ms),
            total_time_spent: ms_to_secs(self.stats.total_time_ms()),
            platform,
            instagram_time_today: ms_to_secs(self.ledger.platform_ms(Platform::Instagram)),
            youtube_time_today: ms_to_secs(self.ledger.platform_ms(Platform::YouTube)),
        }
    }

    fn stats_update(&self, platform: Option<Platform>) -> Event {
        let stats = self.stats.stats();
        Event::ContentStatsUpdate {
            total_time: ms_to_secs(stats.total_time_ms),
            session_count: stats.session_count,
            last_session_date: stats.last_session_date.clone().unwrap_or_default(),
            platform,
            instagram_time_today: ms_to_secs(self.ledger.platform_ms(Platform::Instagram)),
            youtube_time_today: ms_to_secs(self.ledger.platform_ms(Platform::YouTube)),
        }
    }
}
