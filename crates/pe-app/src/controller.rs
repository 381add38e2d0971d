//! Enhancement lifecycle controller.
//!
//! Owns every piece of mutable lifecycle state and processes all work on a
//! single cooperative event loop. The only suspended operations are the
//! debounce timer and the retry backoff, both living in spawned tasks that
//! report back through the event channel; the loop itself never blocks on
//! anything but its channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pe_core::enhance::CacheSlot;
use pe_core::page::NodeId;
use pe_core::ports::{
    ClockPort, EnhanceRelayPort, InputSurfacePort, OverlayPort, StructuralChangeFeedPort,
    SurfaceLocatorPort,
};
use pe_core::surface::SurfaceRef;
use pe_core::ui::{UiAction, UiEvent, UiState, UiStateMachine};
use pe_core::{ControllerConfig, EnhanceError, EnhancementResult};

use crate::client::RetryingClient;
use crate::debounce::Debouncer;
use crate::event::ControllerEvent;

/// Cloneable sender half for embedder-side happenings (clicks, shutdown).
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    pub fn icon_clicked(&self) {
        let _ = self.events.send(ControllerEvent::IconClicked);
    }

    pub fn panel_clicked(&self) {
        let _ = self.events.send(ControllerEvent::PanelClicked);
    }

    pub fn shutdown(&self) {
        let _ = self.events.send(ControllerEvent::Shutdown);
    }
}

struct BoundSurface {
    surface: SurfaceRef,
    adapter: Arc<dyn InputSurfacePort>,
}

struct InflightRequest {
    generation: u64,
    source_text: String,
}

pub struct EnhancerController {
    config: ControllerConfig,
    locator: Arc<dyn SurfaceLocatorPort>,
    overlay: Arc<dyn OverlayPort>,
    client: Arc<RetryingClient>,

    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    debouncer: Debouncer,

    bound: Option<BoundSurface>,
    ui: UiState,
    cache: CacheSlot,
    /// One-shot guard consumed by the next change notification after a
    /// programmatic write.
    suppress_next_change: bool,
    /// Latest settled text; `None` whenever an edit has happened since the
    /// last settle.
    settled_text: Option<String>,
    /// Settled text that arrived while a request was in flight, waiting for
    /// its turn.
    pending_settled: Option<String>,
    inflight: Option<InflightRequest>,
}

impl EnhancerController {
    pub fn new(
        config: ControllerConfig,
        locator: Arc<dyn SurfaceLocatorPort>,
        overlay: Arc<dyn OverlayPort>,
        relay: Arc<dyn EnhanceRelayPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(
            Duration::from_millis(config.quiet_period_ms),
            events_tx.clone(),
        );
        let client = Arc::new(RetryingClient::new(relay, config.retry, clock));
        Self {
            config,
            locator,
            overlay,
            client,
            events_tx,
            events_rx,
            debouncer,
            bound: None,
            ui: UiState::Idle,
            cache: CacheSlot::new(),
            suppress_next_change: false,
            settled_text: None,
            pending_settled: None,
            inflight: None,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Forward a structural-change feed into the event loop.
    pub fn watch(&self, feed: &dyn StructuralChangeFeedPort) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.subscribe(tx)?;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                if events.send(ControllerEvent::PageMutated).is_err() {
                    break;
                }
            }
        });
        Ok(())
    }

    /// Run until shutdown. Performs the initial locate before consuming
    /// events, so a page that is already complete needs no mutation to get
    /// bound.
    pub async fn run(mut self) {
        self.rebind();
        while let Some(event) = self.events_rx.recv().await {
            if matches!(event, ControllerEvent::Shutdown) {
                break;
            }
            self.handle_event(event);
        }
        info!("enhancement controller stopped");
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::SurfaceChanged { surface } => self.on_surface_changed(surface),
            ControllerEvent::QuietPeriodElapsed { generation } => self.on_quiet_elapsed(generation),
            ControllerEvent::PageMutated => self.rebind(),
            ControllerEvent::IconClicked => self.on_icon_clicked(),
            ControllerEvent::PanelClicked => self.apply_transition(UiEvent::PanelClicked),
            ControllerEvent::EnhancementFinished {
                generation,
                outcome,
            } => self.on_enhancement_finished(generation, outcome),
            ControllerEvent::Shutdown => {}
        }
    }

    // ---- raw changes & settling ----

    fn on_surface_changed(&mut self, surface: NodeId) {
        let Some(bound) = &self.bound else { return };
        if bound.surface.id != surface {
            // Notification from an adapter we already let go of.
            return;
        }

        if self.suppress_next_change {
            self.suppress_next_change = false;
            debug!("suppressed self-generated change notification");
            return;
        }

        // A user edit kills the memo and whatever the previous cycle left
        // on screen, before the new quiet period starts.
        self.cache.invalidate();
        self.settled_text = None;
        self.pending_settled = None;
        self.apply_transition(UiEvent::RawChange);
        self.debouncer.poke();
    }

    fn on_quiet_elapsed(&mut self, generation: u64) {
        if !self.debouncer.is_current(generation) {
            return;
        }
        self.evaluate_settled_text();
    }

    /// Read the surface and treat its trimmed text as settled.
    fn evaluate_settled_text(&mut self) {
        let Some(bound) = &self.bound else { return };
        let text = match bound.adapter.text() {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "could not read the bound surface");
                return;
            }
        };

        let settled = match self.config.settle(&text) {
            Ok(settled) => settled,
            Err(error) => {
                debug!(%error, "nothing to enhance");
                self.settled_text = None;
                self.cache.invalidate();
                self.apply_transition(UiEvent::SettledTooShort);
                return;
            }
        };

        self.settled_text = Some(settled.clone());
        self.on_settled(settled);
    }

    fn on_settled(&mut self, text: String) {
        if let Some(cached) = self.cache.lookup(&text) {
            debug!("reusing cached enhancement, no relay call");
            let enhanced = cached.enhanced_text.clone();
            self.apply_transition(UiEvent::SettledCached { enhanced });
            return;
        }

        if self.inflight.is_some() {
            // At most one authoritative request per surface. The newcomer
            // waits; the in-flight result is now stale for storing unless
            // it still matches the settled text when it lands.
            debug!("request already in flight, queueing settled text");
            self.pending_settled = Some(text);
            self.apply_transition(UiEvent::SettledNew);
            return;
        }

        self.dispatch(text);
    }

    fn dispatch(&mut self, text: String) {
        self.cache.invalidate();
        let generation = self.debouncer.generation();
        self.inflight = Some(InflightRequest {
            generation,
            source_text: text.clone(),
        });
        self.apply_transition(UiEvent::SettledNew);

        let client = self.client.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = client.enhance(&text).await;
            let _ = events.send(ControllerEvent::EnhancementFinished {
                generation,
                outcome,
            });
        });
    }

    // ---- completions ----

    fn on_enhancement_finished(
        &mut self,
        generation: u64,
        outcome: Result<EnhancementResult, EnhanceError>,
    ) {
        let inflight = match self.inflight.take() {
            Some(inflight) if inflight.generation == generation => inflight,
            other => {
                // A rebind or teardown already disowned this request.
                self.inflight = other;
                debug!("discarding completion from a superseded binding");
                return;
            }
        };

        let still_current = self.settled_text.as_deref() == Some(inflight.source_text.as_str());

        match outcome {
            Ok(result) if still_current => {
                debug!(latency_ms = result.latency_ms, "enhancement ready");
                self.apply_transition(UiEvent::EnhanceSucceeded {
                    enhanced: result.enhanced_text.clone(),
                });
                self.cache.store(result);
            }
            Ok(_) => {
                debug!(reason = %EnhanceError::Superseded, "discarding enhancement result");
                self.run_pending();
            }
            Err(error) if still_current => {
                warn!(%error, "enhancement failed");
                self.apply_transition(UiEvent::EnhanceFailed {
                    message: error.user_message().to_string(),
                });
            }
            Err(error) => {
                debug!(%error, "discarding failure for superseded request");
                self.run_pending();
            }
        }
    }

    /// Give a settled text that arrived mid-flight its turn, provided no
    /// edit has happened since.
    fn run_pending(&mut self) {
        if let Some(pending) = self.pending_settled.take() {
            if self.settled_text.as_deref() == Some(pending.as_str()) {
                self.on_settled(pending);
            }
        }
    }

    // ---- clicks ----

    fn on_icon_clicked(&mut self) {
        match self.ui {
            UiState::Ready { .. } | UiState::Loading | UiState::Error { .. } => {
                self.apply_transition(UiEvent::IconClicked);
            }
            UiState::Idle | UiState::Debouncing => {
                // Settle-now: the click skips the rest of the quiet period
                // but goes through the same cache-checked path as a timer
                // elapse.
                if self.bound.is_none() {
                    return;
                }
                self.debouncer.cancel();
                self.apply_transition(UiEvent::RawChange);
                self.evaluate_settled_text();
            }
        }
    }

    // ---- binding ----

    /// Re-run the locator. Safe to call arbitrarily often; a resolved
    /// surface with unchanged identity is a no-op.
    fn rebind(&mut self) {
        let located = match self.locator.locate() {
            Ok(located) => located,
            Err(error) => {
                warn!(%error, "locator failed");
                None
            }
        };

        let bound_id = self.bound.as_ref().map(|bound| bound.surface.id);
        match (bound_id, located) {
            (Some(id), Some(found)) if id == found.id => {}
            (None, None) => {
                // Benign; the next page mutation will try again.
                debug!(reason = %EnhanceError::LocatorNotFound, "nothing to bind");
            }
            (Some(_), None) => {
                let still_attached = self
                    .bound
                    .as_ref()
                    .is_some_and(|bound| bound.adapter.is_attached());
                if still_attached {
                    // The mutation hid it from the heuristics but the
                    // element itself is still live; keep the binding.
                    return;
                }
                info!("bound surface detached, waiting for the next mutation");
                self.bound = None;
                self.reset_lifecycle();
            }
            (_, Some(found)) => self.bind(found),
        }
    }

    fn bind(&mut self, found: SurfaceRef) {
        let adapter = match self.locator.bind(&found) {
            Ok(adapter) => adapter,
            Err(error) => {
                warn!(%error, surface = %found.id, "could not bind located surface");
                return;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Err(error) = adapter.observe(tx) {
            warn!(%error, surface = %found.id, "could not observe located surface");
            return;
        }
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(change) = rx.recv().await {
                if events
                    .send(ControllerEvent::SurfaceChanged {
                        surface: change.surface,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        info!(surface = %found.id, kind = ?found.kind, "bound input surface");
        self.bound = Some(BoundSurface {
            surface: found,
            adapter,
        });
        self.reset_lifecycle();
    }

    /// Fresh start for a new (or lost) surface: no cache, no flags, no
    /// pending work, overlay back to idle.
    fn reset_lifecycle(&mut self) {
        self.cache.invalidate();
        self.suppress_next_change = false;
        self.settled_text = None;
        self.pending_settled = None;
        self.inflight = None;
        self.debouncer.cancel();
        self.apply_transition(UiEvent::SurfaceRebound);
    }

    // ---- UI actions ----

    fn apply_transition(&mut self, event: UiEvent) {
        let state = std::mem::replace(&mut self.ui, UiState::Idle);
        let (next, actions) = UiStateMachine::transition(state, event);
        self.ui = next;
        for action in actions {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: UiAction) {
        match action {
            UiAction::SetIcon(mode) => self.overlay.set_icon(mode),
            UiAction::ShowUnderline => self.overlay.show_underline(),
            UiAction::ClearUnderline => self.overlay.clear_underline(),
            UiAction::ShowPanel(text) => self.overlay.show_panel(&text),
            UiAction::HidePanel => self.overlay.hide_panel(),
            UiAction::ApplyEnhancement { text } => self.apply_enhancement(&text),
        }
    }

    fn apply_enhancement(&mut self, text: &str) {
        let Some(bound) = &self.bound else { return };
        info!("applying enhanced prompt to the surface");
        self.settled_text = None;
        // Armed immediately before the write; the synthetic notification
        // the write emits consumes it, and only that one.
        self.suppress_next_change = true;
        if let Err(error) = bound.adapter.set_text(text) {
            self.suppress_next_change = false;
            warn!(%error, "failed to write enhanced text");
        }
    }
}
