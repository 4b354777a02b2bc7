use crate::config::MapConfig;
use crate::debounce::Debouncer;
use crate::map::{MapState, RenderBackend};
use crate::timeline::TimeTravel;
use crate::types::{OrgKey, OrgProperties, Snapshot};
use crate::viewstate::ViewState;
use std::time::{Duration, Instant};

/// A fetch the embedder should perform: produced by the week cursor (which
/// snapshot to load, and which report to refresh if an organization is
/// selected) and by selection changes (the selected organization's report
/// at the current week).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub country: String,
    pub category: String,
    pub week: u32,
    pub selected_organization: Option<String>,
}

/// Top-level controller tying the map state, the week cursor, and the view
/// state together. The embedder (DOM handlers, the CLI event loop) calls the
/// imperative entry points and periodically polls `pending_reload`.
///
/// Responses are applied in arrival order; superseded in-flight requests are
/// not cancelled, so the last one to resolve wins.
pub struct Dashboard<B: RenderBackend> {
    view: ViewState,
    map: MapState<B>,
    timeline: TimeTravel,
    reload: Debouncer<u32>,
}

impl<B: RenderBackend> Dashboard<B> {
    pub fn new(backend: B, config: &MapConfig) -> Self {
        Dashboard {
            view: ViewState::new(&config.country, &config.category),
            map: MapState::new(backend),
            timeline: TimeTravel::new(),
            reload: Debouncer::new(Duration::from_millis(config.debounce_ms)),
        }
    }

    /// Switches to a country at the latest week and schedules the first load.
    pub fn initialize(&mut self, country: &str, now: Instant) {
        self.view.country = country.to_string();
        self.view.week = 0;
        self.view.selected_organization = None;
        self.timeline.reset();
        self.reload.schedule(0, now);
    }

    /// Plots a fetched snapshot: first load builds the layer set, later
    /// calls reconcile into it. An empty snapshot is treated as no update:
    /// the previously rendered layers stay, so transient empty responses
    /// from the data service do not blank the map.
    pub fn plot_snapshot(&mut self, snapshot: &Snapshot) {
        if snapshot.is_empty() {
            return;
        }
        if self.map.is_loaded() {
            self.map.reconcile(snapshot);
        } else {
            self.map.initial_load(snapshot);
        }
    }

    pub fn search(&mut self, text: &str) {
        self.view.set_search(text);
        self.map.apply_search(text);
    }

    /// Selects an organization for the report panel. Returns the URL
    /// fragment encoding the deep link and the fetch for that
    /// organization's report at the current week.
    pub fn select_organization(&mut self, id: &str) -> (String, ReloadRequest) {
        let fragment = self.view.select_organization(id);
        let report = ReloadRequest {
            country: self.view.country.clone(),
            category: self.view.category.clone(),
            week: self.view.week,
            selected_organization: self.view.selected_organization.clone(),
        };
        (fragment, report)
    }

    /// One week further back. Movement schedules a debounced reload.
    pub fn previous_week(&mut self, now: Instant) -> bool {
        if !self.timeline.previous_week() {
            return false;
        }
        self.view.week = self.timeline.week();
        self.reload.schedule(self.view.week, now);
        true
    }

    /// One week toward the present. Movement schedules a debounced reload.
    pub fn next_week(&mut self, now: Instant) -> bool {
        if !self.timeline.next_week() {
            return false;
        }
        self.view.week = self.timeline.week();
        self.reload.schedule(self.view.week, now);
        true
    }

    /// Absolute slider jump.
    pub fn set_week(&mut self, week: u32, now: Instant) -> bool {
        if !self.timeline.set_week(week) {
            return false;
        }
        self.view.week = self.timeline.week();
        self.reload.schedule(self.view.week, now);
        true
    }

    /// Releases the coalesced reload once the idle period has elapsed.
    pub fn pending_reload(&mut self, now: Instant) -> Option<ReloadRequest> {
        let week = self.reload.poll(now)?;
        Some(ReloadRequest {
            country: self.view.country.clone(),
            category: self.view.category.clone(),
            week,
            selected_organization: self.view.selected_organization.clone(),
        })
    }

    // Interaction entry points, routed to the map state.

    pub fn pointer_enter(&mut self, key: &OrgKey) -> Option<&OrgProperties> {
        self.map.pointer_enter(key)
    }

    pub fn pointer_leave(&mut self, key: &OrgKey) {
        self.map.pointer_leave(key)
    }

    /// Click on a rendered layer: selects its organization and returns the
    /// report fragment for navigation plus the report fetch.
    pub fn click(&mut self, key: &OrgKey) -> Option<(String, ReloadRequest)> {
        let key = self.map.click(key)?;
        let id = match self.map.layer(&key) {
            Some(layer) => layer
                .feature
                .properties
                .organization_id
                .clone()
                .or_else(|| layer.feature.properties.organization_name.clone())?,
            None => return None,
        };
        Some(self.select_organization(&id))
    }

    pub fn hit_test(&mut self, lon: f64, lat: f64) -> Option<OrgKey> {
        self.map.hit_test(lon, lat)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn apply_fragment(&mut self, fragment: &str) -> bool {
        self.view.apply_fragment(fragment)
    }

    pub fn map(&self) -> &MapState<B> {
        &self.map
    }
}
