/// The dashboard event loop
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::effects::{Effects, RequestKey, Ticket};
use super::render::{Action, DataNeed};
use super::state::{ApplicationState, StateUpdate};
use super::store::{Mount, Store};
use crate::clients::ProxyClient;
use crate::domain::{Apod, PhotoRecord};

#[derive(Debug)]
pub enum Msg {
    SelectRover(String),
    ApodLoaded {
        ticket: Ticket,
        day: NaiveDate,
        apod: Apod,
    },
    RoverPhotosLoaded {
        ticket: Ticket,
        rover: String,
        photos: Vec<PhotoRecord>,
    },
    FetchFailed {
        ticket: Ticket,
        key: RequestKey,
        reason: String,
    },
    Shutdown,
}

/// Cloneable entry point for user interaction.
#[derive(Clone)]
pub struct DashboardHandle {
    tx: UnboundedSender<Msg>,
}

impl DashboardHandle {
    /// Returns `false` once the dashboard has stopped.
    pub fn select_rover(&self, name: impl Into<String>) -> bool {
        self.tx.send(Msg::SelectRover(name.into())).is_ok()
    }

    pub fn dispatch(&self, action: &Action) -> bool {
        match action {
            Action::SelectRover(name) => self.select_rover(name.clone()),
        }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Msg::Shutdown);
    }
}

/// Owns the [`Store`] and processes [`Msg`]s in order, so every state change
/// goes through a single writer. Each update renders, and the needs of the
/// fresh frame are handed to [`Effects`], whose results come back as messages.
pub struct Dashboard<M: Mount> {
    store: Store<M>,
    effects: Effects,
    rx: UnboundedReceiver<Msg>,
}

impl<M: Mount> Dashboard<M> {
    pub fn new(
        initial: ApplicationState,
        client: ProxyClient,
        mount: M,
        clock: fn() -> NaiveDate,
    ) -> (Self, DashboardHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dashboard = Self {
            store: Store::new(initial, mount, clock),
            effects: Effects::new(client, tx.clone()),
            rx,
        };
        (dashboard, DashboardHandle { tx })
    }

    pub fn state(&self) -> Arc<ApplicationState> {
        self.store.get()
    }

    pub fn mount(&self) -> &M {
        self.store.mount_ref()
    }

    /// First render, as on page load.
    pub fn load(&mut self) {
        let frame = self.store.render_current();
        self.run_effects(frame.needs);
    }

    /// Process one message. Returns `false` when the loop should stop.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(Msg::Shutdown) | None => {
                self.effects.abort_all();
                false
            }
            Some(msg) => {
                self.handle(msg);
                true
            }
        }
    }

    pub async fn run(mut self) {
        self.load();
        while self.step().await {}
        info!("Dashboard stopped");
    }

    fn apply(&mut self, update: StateUpdate) {
        let frame = self.store.update(update);
        self.run_effects(frame.needs);
    }

    fn run_effects(&mut self, needs: Vec<DataNeed>) {
        for need in needs {
            if let Some(RequestKey::Rover(rover)) = self.effects.dispatch(need) {
                let state = self.store.get();
                if rover == state.selected_rover && !state.loading {
                    self.apply(StateUpdate::Loading(true));
                }
            }
        }
    }

    fn handle(&mut self, msg: Msg) {
        match msg {
            Msg::SelectRover(name) => self.select_rover(name),
            Msg::ApodLoaded { ticket, day, apod } => {
                if !self.effects.complete(&RequestKey::Apod(day), ticket, true) {
                    debug!("Discarding superseded APOD result for {}", day);
                    return;
                }
                self.apply(StateUpdate::Apod(Some(apod)));
            }
            Msg::RoverPhotosLoaded {
                ticket,
                rover,
                photos,
            } => {
                let key = RequestKey::Rover(rover);
                if !self.effects.complete(&key, ticket, true) {
                    debug!("Discarding cancelled result {:?}", key);
                    return;
                }
                self.apply(StateUpdate::RoverInfo(photos));
                self.apply(StateUpdate::Loading(false));
            }
            Msg::FetchFailed {
                ticket,
                key,
                reason,
            } => {
                warn!("Fetch {:?} failed: {}", key, reason);
                match key {
                    // Settling stops the cleared flag from re-triggering the same fetch.
                    RequestKey::Rover(_) => {
                        if self.effects.complete(&key, ticket, true) && self.store.get().loading {
                            self.apply(StateUpdate::Loading(false));
                        }
                    }
                    RequestKey::Apod(_) => {
                        self.effects.complete(&key, ticket, false);
                    }
                }
            }
            Msg::Shutdown => {}
        }
    }

    fn select_rover(&mut self, name: String) {
        if !self.store.get().has_rover(&name) {
            warn!("Ignoring selection of unknown rover {:?}", name);
            return;
        }

        self.effects.cancel_rovers_except(&name);
        let still_fetching = self.effects.is_in_flight(&RequestKey::Rover(name.clone()));
        let clear_loading = self.store.get().loading && !still_fetching;

        self.apply(StateUpdate::SelectedRover(name));
        if clear_loading {
            self.apply(StateUpdate::Loading(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::store::tests::{fixed_today, RecordingMount};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photos_body(rover: &str, src: &str) -> serde_json::Value {
        json!({
            "data": {"photos": [{
                "img_src": src,
                "earth_date": "2020-01-01",
                "rover": {
                    "name": rover,
                    "landing_date": "2012-08-06",
                    "launch_date": "2011-11-26",
                    "status": "active"
                }
            }]}
        })
    }

    async fn mount_apod(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/apod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "image": {
                    "date": "2024-03-01",
                    "media_type": "image",
                    "url": "x.jpg",
                    "explanation": "e"
                }
            })))
            .mount(server)
            .await;
    }

    fn dashboard(server: &MockServer) -> (Dashboard<RecordingMount>, DashboardHandle) {
        let client = ProxyClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        Dashboard::new(
            ApplicationState::initial("Student"),
            client,
            RecordingMount::default(),
            fixed_today,
        )
    }

    #[tokio::test]
    async fn test_initial_load_fetches_curiosity_once() {
        let server = MockServer::start().await;
        mount_apod(&server).await;
        Mock::given(method("GET"))
            .and(path("/rover"))
            .and(query_param("rover", "Curiosity"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(photos_body("Curiosity", "a.jpg")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (mut dashboard, _handle) = dashboard(&server);
        dashboard.load();

        let first = &dashboard.mount().frames[0];
        assert!(first.markup.contains("Loading Data..."));
        assert!(dashboard.state().loading);

        // APOD and rover results, in either order
        assert!(dashboard.step().await);
        assert!(dashboard.step().await);

        let state = dashboard.state();
        assert!(!state.loading);
        assert_eq!(state.rover_info.len(), 1);
        assert!(state.apod.is_some());

        let last = dashboard.mount().frames.last().unwrap();
        assert!(last.markup.contains("Details for Curiosity rover camera"));
        assert!(last.markup.contains(r#"<img src="a.jpg">"#));
        assert!(last.markup.contains(r#"<img src="x.jpg""#));
        assert!(last.needs.is_empty());

        server.verify().await;
    }

    #[tokio::test]
    async fn test_late_result_for_deselected_rover_is_discarded() {
        let server = MockServer::start().await;
        mount_apod(&server).await;
        Mock::given(method("GET"))
            .and(path("/rover"))
            .and(query_param("rover", "Curiosity"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(photos_body("Curiosity", "c.jpg"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rover"))
            .and(query_param("rover", "Opportunity"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(photos_body("Opportunity", "o.jpg")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (mut dashboard, handle) = dashboard(&server);
        dashboard.load();

        assert!(handle.select_rover("Opportunity"));
        assert!(dashboard.step().await);
        assert_eq!(dashboard.state().selected_rover, "Opportunity");

        // Opportunity photos and APOD arrive; Curiosity was aborted
        assert!(dashboard.step().await);
        assert!(dashboard.step().await);

        let state = dashboard.state();
        assert_eq!(state.rover_info.len(), 1);
        assert_eq!(state.rover_info[0].rover.name, "Opportunity");
        assert!(!state.loading);

        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.shutdown();
        assert!(!dashboard.step().await);
        assert_eq!(dashboard.state().rover_info[0].img_src, "o.jpg");
    }

    #[tokio::test]
    async fn test_unknown_rover_selection_is_ignored() {
        let server = MockServer::start().await;
        let (mut dashboard, handle) = dashboard(&server);

        let frames_before = dashboard.mount().frames.len();
        handle.select_rover("Perseverance");
        assert!(dashboard.step().await);

        assert_eq!(dashboard.state().selected_rover, "Curiosity");
        assert_eq!(dashboard.mount().frames.len(), frames_before);
    }

    #[tokio::test]
    async fn test_rover_failure_clears_loading_without_retry() {
        let server = MockServer::start().await;
        mount_apod(&server).await;
        Mock::given(method("GET"))
            .and(path("/rover"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        let (mut dashboard, handle) = dashboard(&server);
        dashboard.load();
        assert!(dashboard.step().await);
        assert!(dashboard.step().await);

        let state = dashboard.state();
        assert!(!state.loading);
        assert!(state.rover_info.is_empty());
        let last = dashboard.mount().frames.last().unwrap();
        assert!(last.needs.contains(&DataNeed::RoverPhotos("Curiosity".into())));

        // re-selecting is the way forward
        handle.select_rover("Curiosity");
        assert!(dashboard.step().await);
        assert!(dashboard.state().loading);
        assert!(dashboard.step().await);
        assert!(!dashboard.state().loading);

        server.verify().await;
    }

    #[tokio::test]
    async fn test_apod_dated_before_today_is_fetched_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apod"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "image": {
                    "date": "2024-02-29",
                    "media_type": "image",
                    "url": "y.jpg",
                    "explanation": "leap day"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        for (rover, src) in [("Curiosity", "c.jpg"), ("Spirit", "s.jpg")] {
            Mock::given(method("GET"))
                .and(path("/rover"))
                .and(query_param("rover", rover))
                .respond_with(ResponseTemplate::new(200).set_body_json(photos_body(rover, src)))
                .mount(&server)
                .await;
        }

        let (mut dashboard, handle) = dashboard(&server);
        dashboard.load();
        assert!(dashboard.step().await);
        assert!(dashboard.step().await);

        for rover in ["Spirit", "Curiosity"] {
            handle.select_rover(rover);
            assert!(dashboard.step().await);
            assert!(dashboard.step().await);
            assert_eq!(dashboard.state().rover_info[0].rover.name, rover);
        }

        // still reported as stale, but the day is settled
        let apod_need = DataNeed::Apod { day: fixed_today() };
        let last = dashboard.mount().frames.last().unwrap();
        assert!(last.needs.contains(&apod_need));
        assert!(last.markup.contains(r#"<img src="y.jpg""#));
        assert!(dashboard.mount().frames.len() > 6);

        server.verify().await;
    }

    #[tokio::test]
    async fn test_failed_apod_is_retried_on_next_state_change() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apod"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rover"))
            .and(query_param("rover", "Curiosity"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(photos_body("Curiosity", "a.jpg"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let (mut dashboard, _handle) = dashboard(&server);
        dashboard.load();

        // APOD fails first without touching state
        assert!(dashboard.step().await);
        assert!(dashboard.state().apod.is_none());
        assert!(dashboard.state().rover_info.is_empty());

        // rover photos change state, which re-requests APOD
        assert!(dashboard.step().await);
        assert_eq!(dashboard.state().rover_info.len(), 1);

        // second APOD failure, no further state change
        assert!(dashboard.step().await);
        assert!(dashboard.state().apod.is_none());

        server.verify().await;
    }
}
