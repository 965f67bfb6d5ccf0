use crate::client::{
    ClientError,
    api::{ApiReply, RecordsApi},
    connection::{ConnectionState, Indicator},
    form::StudentForm,
    query::{PreparedQuery, QueryMode},
    render::{ResultView, render_cleared, render_connection_help, render_result},
    status::{StatusKind, StatusMessage, StatusSlot},
};
use jiff::Zoned;
use serde_json::{Value, json};
use tokio::time::{Duration, Instant};

pub const RELOAD_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Insert,
    Query,
}

///All of the client's state, and the actions a user can take on it.
#[derive(Debug)]
pub struct Controller {
    api: RecordsApi,
    is_connected: bool,
    indicator: Indicator,
    mode: QueryMode,
    filter: String,
    form: StudentForm,
    result_area: String,
    result_revision: u64,
    insert_status: StatusSlot,
    query_status: StatusSlot,
    reload_due: Option<Instant>,
}

impl Controller {
    pub fn new(api: RecordsApi) -> Self {
        Self {
            api,
            is_connected: false,
            indicator: Indicator::default(),
            mode: QueryMode::default(),
            filter: String::new(),
            form: StudentForm::default(),
            result_area: String::new(),
            result_revision: 0,
            insert_status: StatusSlot::default(),
            query_status: StatusSlot::default(),
            reload_due: None,
        }
    }

    pub const fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub const fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    pub const fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub const fn form(&self) -> &StudentForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    pub fn result_area(&self) -> &str {
        &self.result_area
    }

    ///bumped every time the result area is replaced
    pub const fn result_revision(&self) -> u64 {
        self.result_revision
    }

    pub fn insert_status(&self, now: Instant) -> Option<&StatusMessage> {
        self.insert_status.visible(now)
    }

    pub fn query_status(&self, now: Instant) -> Option<&StatusMessage> {
        self.query_status.visible(now)
    }

    pub const fn reload_due(&self) -> Option<Instant> {
        self.reload_due
    }

    pub async fn on_load(&mut self) {
        self.check_connection().await;
        self.load_students().await;
    }

    pub async fn check_connection(&mut self) -> bool {
        match self.api.probe().await {
            Ok(true) => {
                self.is_connected = true;
                self.indicator
                    .set(ConnectionState::Connected, Indicator::CONNECTED);
            }
            Ok(false) => {
                warn!("Server answered the probe with an error status");
                self.lose_connection(Indicator::NO_CONNECTION);
            }
            Err(e) => {
                warn!(?e, "Server probe failed");
                self.lose_connection(Indicator::NO_CONNECTION);
            }
        }
        self.is_connected
    }

    pub async fn load_students(&mut self) {
        if !self.is_connected {
            return;
        }

        self.indicator
            .set(ConnectionState::Connecting, Indicator::LOADING);

        match self.api.list().await {
            Ok(reply) if reply.body.success => {
                self.indicator
                    .set(ConnectionState::Connected, Indicator::CONNECTED);
                self.show_reply("Initial data loaded", &reply, None);
            }
            Ok(reply) => {
                warn!(error = ?reply.body.error, "Server refused to list students");
                self.indicator
                    .set(ConnectionState::Disconnected, Indicator::CONNECTION_ERROR);
                self.show_help("Error loading the initial data");
            }
            Err(e) => {
                warn!(?e, "Unable to list students");
                self.lose_connection(Indicator::CONNECTION_ERROR);
            }
        }
    }

    ///returns the filter placeholder for the new mode, if it takes a filter
    pub fn select_mode(&mut self, mode: QueryMode) -> Option<&'static str> {
        self.mode = mode;
        if !mode.needs_filter() {
            self.filter.clear();
        }
        mode.placeholder()
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub async fn submit(&mut self) {
        let now = Instant::now();
        if !self.is_connected {
            self.insert_status
                .show(StatusKind::Error, "No connection to the server", now);
            return;
        }

        let request = match self.form.validate() {
            Ok(request) => request,
            Err(problem) => {
                self.insert_status
                    .show(StatusKind::Error, problem.to_string(), now);
                return;
            }
        };

        self.insert_status
            .show(StatusKind::Warning, "Inserting student...", now);

        match self.api.create(&request).await {
            Ok(reply) if reply.body.success => {
                let message = reply
                    .body
                    .message
                    .clone()
                    .unwrap_or_else(|| "Student created".to_string());
                self.insert_status
                    .show(StatusKind::Success, message, Instant::now());

                let data = reply.body.data.clone().unwrap_or(Value::Null);
                self.show_result(&ResultView {
                    description: "Student inserted successfully",
                    endpoint: &reply.endpoint,
                    filter: None,
                    total: 1,
                    data: &data,
                });

                self.form.reset();
                if self.mode == QueryMode::All {
                    self.reload_due = Some(Instant::now() + RELOAD_DELAY);
                }
            }
            Ok(reply) => self.show_server_error(Slot::Insert, &reply),
            Err(e) => self.network_failure(Slot::Insert, "Connection error while inserting student", &e),
        }
    }

    pub async fn execute_query(&mut self) {
        let now = Instant::now();
        if !self.is_connected {
            self.query_status
                .show(StatusKind::Error, "No connection to the server", now);
            return;
        }

        let query = match PreparedQuery::prepare(self.mode, &self.filter) {
            Ok(query) => query,
            Err(problem) => {
                self.query_status
                    .show(StatusKind::Error, problem.to_string(), now);
                return;
            }
        };

        self.query_status
            .show(StatusKind::Warning, "Running query...", now);

        let reply = match &query {
            PreparedQuery::All => self.api.list().await,
            PreparedQuery::ByMajor(major) => self.api.by_major(major).await,
            PreparedQuery::ByMinAge(age) => self.api.by_min_age(*age).await,
            PreparedQuery::Count => self.api.count().await,
        };

        match reply {
            Ok(reply) if reply.body.success => {
                let total = reply.body.total.unwrap_or(1);
                self.query_status.show(
                    StatusKind::Success,
                    format!("Query executed ({total} result(s))"),
                    Instant::now(),
                );

                let data = reply
                    .body
                    .data
                    .clone()
                    .unwrap_or_else(|| json!({ "total": total }));
                self.show_result(&ResultView {
                    description: &query.description(),
                    endpoint: &reply.endpoint,
                    filter: reply.body.filter.as_deref(),
                    total,
                    data: &data,
                });
            }
            Ok(reply) => self.show_server_error(Slot::Query, &reply),
            Err(e) => self.network_failure(Slot::Query, "Connection error while running query", &e),
        }
    }

    ///runs the reload scheduled by a successful insert, if its time has come
    pub async fn run_due_reload(&mut self, now: Instant) {
        match self.reload_due {
            Some(due) if due <= now => {
                self.reload_due = None;
                self.load_students().await;
            }
            _ => {}
        }
    }

    pub async fn reconnect_tick(&mut self) {
        if !self.is_connected {
            debug!("Still disconnected, probing again");
            self.check_connection().await;
        }
    }

    pub async fn network_online(&mut self) {
        if !self.is_connected {
            self.check_connection().await;
        }
    }

    pub fn network_offline(&mut self) {
        self.is_connected = false;
        self.indicator
            .set(ConnectionState::Disconnected, Indicator::NETWORK_OFFLINE);
    }

    pub fn clear_results(&mut self) {
        let state = if self.is_connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        self.replace_result_area(render_cleared(state));
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut StatusSlot {
        match slot {
            Slot::Insert => &mut self.insert_status,
            Slot::Query => &mut self.query_status,
        }
    }

    fn show_server_error(&mut self, slot: Slot, reply: &ApiReply) {
        let error = reply
            .body
            .error
            .as_deref()
            .unwrap_or("unknown error");
        warn!(status = %reply.status, %error, "Server reported an error");
        self.slot_mut(slot)
            .show(StatusKind::Error, format!("Error: {error}"), Instant::now());
    }

    fn network_failure(&mut self, slot: Slot, message: &str, error: &ClientError) {
        warn!(?error, "Request failed");
        self.slot_mut(slot)
            .show(StatusKind::Error, message, Instant::now());
        if matches!(error, ClientError::Network { .. }) {
            self.lose_connection(Indicator::NO_CONNECTION);
        }
    }

    fn lose_connection(&mut self, label: &str) {
        self.is_connected = false;
        self.indicator.set(ConnectionState::Disconnected, label);
        self.show_help("Cannot reach the server. Make sure it is running.");
    }

    fn show_help(&mut self, message: &str) {
        let help = render_connection_help(message, self.api.server());
        self.replace_result_area(help);
    }

    fn show_reply(&mut self, description: &str, reply: &ApiReply, filter: Option<&str>) {
        let data = reply.body.data.clone().unwrap_or(Value::Null);
        let total = reply.body.total.unwrap_or(0);
        self.show_result(&ResultView {
            description,
            endpoint: &reply.endpoint,
            filter,
            total,
            data: &data,
        });
    }

    fn show_result(&mut self, view: &ResultView<'_>) {
        let rendered = render_result(view, &Zoned::now());
        self.replace_result_area(rendered);
    }

    fn replace_result_area(&mut self, text: String) {
        self.result_area = text;
        self.result_revision += 1;
    }
}
