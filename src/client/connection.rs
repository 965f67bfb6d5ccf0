use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Connecting,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
        })
    }
}

///The little badge that says whether the server is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    state: ConnectionState,
    label: String,
}

impl Indicator {
    pub const CONNECTED: &'static str = "Connected to the records server";
    pub const LOADING: &'static str = "Loading...";
    pub const NO_CONNECTION: &'static str = "No connection";
    pub const CONNECTION_ERROR: &'static str = "Connection error";
    pub const NETWORK_OFFLINE: &'static str = "No network connection";

    pub fn set(&mut self, state: ConnectionState, label: impl Into<String>) {
        self.state = state;
        self.label = label.into();
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            state: ConnectionState::Connecting,
            label: Self::LOADING.to_string(),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.state, self.label)
    }
}
