// Stats view controller and its event loop.
//
// Selection changes arrive from the host bridge; each non-empty selection
// spawns one fetch task that reports back over the fetch channel. All page
// writes happen on the loop task, so regions are never written concurrently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use statboard_core::error::FetchError;
use statboard_core::page::{Page, Region, Selector};
use statboard_core::payload::{PlayerStatsPayload, TeamStatsPayload};
use statboard_core::render::{
    render_career_stats, render_error, render_loading, render_position_analysis, render_roster,
    render_team_stats, Html,
};

use crate::client::StatsSource;
use crate::config::{OverlapPolicy, ViewConfig};
use crate::protocol::{FetchEvent, HostMessage, LoadStatus};
use crate::ws_server::WsEvent;

// ---------------------------------------------------------------------------
// SelectorState
// ---------------------------------------------------------------------------

/// Load bookkeeping for one selector. Selectors never share state.
#[derive(Debug, Default)]
pub struct SelectorState {
    /// Incremented for every fetch this selector starts. Under
    /// `OverlapPolicy::Supersede` only results carrying the current value
    /// are rendered.
    pub generation: u64,
    pub current_task: Option<JoinHandle<()>>,
    pub status: LoadStatus,
    /// The identifier most recently requested.
    pub value: Option<String>,
}

impl SelectorState {
    fn cancel(&mut self) {
        if let Some(handle) = self.current_task.take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

pub struct ViewController<P: Page> {
    pub view: ViewConfig,
    pub page: P,
    pub source: Arc<dyn StatsSource>,
    /// Spawned fetch tasks report through a clone of this sender.
    pub fetch_tx: mpsc::Sender<FetchEvent>,
    pub player: SelectorState,
    pub team: SelectorState,
    /// Successful payload renders.
    pub renders: u64,
    /// Failed loads (each one logged once).
    pub failures: u64,
    /// Results dropped because a newer selection superseded them.
    pub discarded: u64,
}

impl<P: Page> ViewController<P> {
    pub fn new(
        view: ViewConfig,
        source: Arc<dyn StatsSource>,
        page: P,
        fetch_tx: mpsc::Sender<FetchEvent>,
    ) -> Self {
        ViewController {
            view,
            page,
            source,
            fetch_tx,
            player: SelectorState::default(),
            team: SelectorState::default(),
            renders: 0,
            failures: 0,
            discarded: 0,
        }
    }

    fn selector_state_mut(&mut self, selector: Selector) -> &mut SelectorState {
        match selector {
            Selector::Player => &mut self.player,
            Selector::Team => &mut self.team,
        }
    }

    /// Route a selector `change` to its load routine. Returns `true` if a
    /// fetch was started.
    pub async fn on_selection_changed(&mut self, selector: Selector, value: &str) -> bool {
        match selector {
            Selector::Player => self.load_player_stats(value).await,
            Selector::Team => self.load_team_stats(value).await,
        }
    }

    /// Fetch `/api/player-stats/{value}`. Empty values are a no-op.
    pub async fn load_player_stats(&mut self, value: &str) -> bool {
        let Some((generation, player_id)) = self.begin_load(Selector::Player, value).await else {
            return false;
        };

        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let id = player_id.clone();
        let handle = tokio::spawn(async move {
            let result = source.player_stats(&id).await;
            let _ = tx
                .send(FetchEvent::Player {
                    generation,
                    player_id: id,
                    result,
                })
                .await;
        });

        self.player.current_task = Some(handle);
        info!("Loading player stats for {} (gen: {})", player_id, generation);
        true
    }

    /// Fetch `/api/team-stats/{value}`. Empty values are a no-op.
    pub async fn load_team_stats(&mut self, value: &str) -> bool {
        let Some((generation, team_id)) = self.begin_load(Selector::Team, value).await else {
            return false;
        };

        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let id = team_id.clone();
        let handle = tokio::spawn(async move {
            let result = source.team_stats(&id).await;
            let _ = tx
                .send(FetchEvent::Team {
                    generation,
                    team_id: id,
                    result,
                })
                .await;
        });

        self.team.current_task = Some(handle);
        info!("Loading team stats for {} (gen: {})", team_id, generation);
        true
    }

    /// Shared start-of-load bookkeeping. Returns the new generation and the
    /// trimmed identifier, or `None` when the selection is empty.
    async fn begin_load(&mut self, selector: Selector, value: &str) -> Option<(u64, String)> {
        let id = value.trim();
        if id.is_empty() {
            debug!("{} cleared, nothing to load", selector);
            return None;
        }

        let overlap = self.view.overlap;
        let state = self.selector_state_mut(selector);
        if overlap == OverlapPolicy::Supersede {
            if state.current_task.is_some() {
                debug!("Superseding in-flight {} fetch (gen: {})", selector, state.generation);
            }
            state.cancel();
        }
        state.generation += 1;
        state.status = LoadStatus::Fetching;
        state.value = Some(id.to_string());
        let generation = state.generation;

        if self.view.show_loading {
            self.fill_regions(selector, render_loading()).await;
        }

        Some((generation, id.to_string()))
    }

    /// Apply a finished fetch. Superseded results are dropped under
    /// `OverlapPolicy::Supersede`; under `LastResolved` every result renders.
    pub async fn handle_fetch_event(&mut self, event: FetchEvent) {
        let selector = event.selector();
        let event_generation = event.generation();
        let overlap = self.view.overlap;

        let state = self.selector_state_mut(selector);
        let current_generation = state.generation;
        let current = event_generation == current_generation;
        if current {
            state.current_task = None;
        }
        if !current && overlap == OverlapPolicy::Supersede {
            debug!(
                "Discarding stale {} result (event gen: {}, current gen: {})",
                selector, event_generation, current_generation
            );
            self.discarded += 1;
            return;
        }

        match event {
            FetchEvent::Player {
                result: Ok(payload),
                ..
            } => self.render_player(payload).await,
            FetchEvent::Team {
                result: Ok(payload),
                ..
            } => self.render_team(payload).await,
            FetchEvent::Player {
                result: Err(err),
                player_id,
                ..
            } => {
                error!("Failed to load player stats for {}: {}", player_id, err);
                self.render_failure(Selector::Player, &err).await;
            }
            FetchEvent::Team {
                result: Err(err),
                team_id,
                ..
            } => {
                error!("Failed to load team stats for {}: {}", team_id, err);
                self.render_failure(Selector::Team, &err).await;
            }
        }
    }

    /// Parse and dispatch one raw message from the host page.
    pub async fn handle_host_message(&mut self, json_str: &str) {
        let msg: HostMessage = match serde_json::from_str(json_str) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to parse host message: {}", e);
                return;
            }
        };

        match msg {
            HostMessage::PageConnected { payload } => {
                info!("Host page identified: {}", payload.url);
            }
            HostMessage::SelectionChanged { payload } => {
                match Selector::from_id(&payload.selector) {
                    Some(selector) => {
                        self.on_selection_changed(selector, &payload.value).await;
                    }
                    None => warn!("Change event from unknown selector `{}`", payload.selector),
                }
            }
            HostMessage::Heartbeat => {}
        }
    }

    /// Abort every in-flight fetch.
    pub fn cancel_all(&mut self) {
        self.player.cancel();
        self.team.cancel();
    }

    async fn render_player(&mut self, payload: PlayerStatsPayload) {
        let career = payload
            .career_stats
            .as_ref()
            .map(render_career_stats)
            .unwrap_or_default();
        let position = payload
            .position_analysis
            .as_ref()
            .map(render_position_analysis)
            .unwrap_or_default();

        self.page.set_content(Region::CareerStatsGrid, career).await;
        self.page
            .set_content(Region::PositionRecommendation, position)
            .await;
        self.player.status = LoadStatus::Rendered;
        self.renders += 1;
    }

    async fn render_team(&mut self, payload: TeamStatsPayload) {
        let team = payload
            .team_stats
            .as_ref()
            .map(render_team_stats)
            .unwrap_or_default();
        let roster = payload
            .roster_stats
            .as_deref()
            .map(render_roster)
            .unwrap_or_default();

        self.page.set_content(Region::TeamStatsGrid, team).await;
        self.page.set_content(Region::TeamComparisonGrid, roster).await;
        self.team.status = LoadStatus::Rendered;
        self.renders += 1;
    }

    async fn render_failure(&mut self, selector: Selector, err: &FetchError) {
        self.selector_state_mut(selector).status = LoadStatus::Failed;
        self.failures += 1;
        if self.view.show_errors {
            self.fill_regions(selector, render_error(&err.user_message()))
                .await;
        }
    }

    async fn fill_regions(&mut self, selector: Selector, html: Html) {
        for region in selector.regions() {
            self.page.set_content(region, html.clone()).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the controller until the host bridge channel closes.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Host bridge events (connection changes and raw page messages)
/// 2. Fetch results from spawned load tasks
pub async fn run<P: Page>(
    mut ws_rx: mpsc::Receiver<WsEvent>,
    mut fetch_rx: mpsc::Receiver<FetchEvent>,
    mut controller: ViewController<P>,
) -> anyhow::Result<()> {
    info!("Controller event loop started");

    loop {
        tokio::select! {
            ws_event = ws_rx.recv() => {
                match ws_event {
                    Some(WsEvent::Connected { addr }) => {
                        info!("Host page connected from {}", addr);
                    }
                    Some(WsEvent::Disconnected) => {
                        info!("Host page disconnected");
                    }
                    Some(WsEvent::Message(json_str)) => {
                        controller.handle_host_message(&json_str).await;
                    }
                    None => {
                        info!("Host channel closed, shutting down");
                        break;
                    }
                }
            }

            // The controller holds a sender, so this channel never closes
            // while the loop runs.
            Some(event) = fetch_rx.recv() => {
                controller.handle_fetch_event(event).await;
            }
        }
    }

    controller.cancel_all();
    info!(
        "Controller event loop exiting ({} renders, {} failures, {} discarded)",
        controller.renders, controller.failures, controller.discarded
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
