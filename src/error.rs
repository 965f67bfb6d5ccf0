use crate::envelope::Envelope;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use snafu::Snafu;
use std::num::{ParseIntError, TryFromIntError};
use uuid::Uuid;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Database returned an unusable row count"))]
    InvalidCount { source: TryFromIntError },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` from {:?}", name, original))]
    ParseSetting {
        name: &'static str,
        original: String,
    },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error serving HTTP"))]
    Serve { source: std::io::Error },
    #[snafu(display("invalid student id"))]
    ParseUuid {
        source: uuid::Error,
        original: String,
    },
    #[snafu(display("age must be a valid number"))]
    ParseAge { original: String },
    #[snafu(display("age must be between {} and {}", min, max))]
    AgeOutOfRange { age: i64, min: i64, max: i64 },
    #[snafu(display("missing required fields: firstName, lastName, age, major"))]
    MissingFields,
    #[snafu(display("field `{}` cannot be empty", field))]
    BlankField { field: &'static str },
    #[snafu(display("malformed request body"))]
    MalformedPayload { source: JsonRejection },
    #[snafu(display("student not found"))]
    MissingStudent { id: Uuid },
    #[snafu(display("route not found"))]
    RouteNotFound,
    #[snafu(display("Request handler panicked: {}", detail))]
    HandlerPanicked { detail: String },
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::MakeQuery { .. } => ISE,
            Self::InvalidCount { .. } => ISE,
            Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } | Self::ParseSetting { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
            Self::ParseUuid { .. } => BI,
            Self::ParseAge { .. } => BI,
            Self::AgeOutOfRange { .. } => BI,
            Self::MissingFields => BI,
            Self::BlankField { .. } => BI,
            Self::MalformedPayload { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::RouteNotFound => NF,
            Self::HandlerPanicked { .. } => ISE,
        };

        //internal details only go to the logs
        let message = if status_code == ISE {
            error!(?self, "Error!");
            "internal server error".to_string()
        } else {
            warn!(%self, "Rejected request");
            self.to_string()
        };

        (status_code, Json(Envelope::<()>::failure(message))).into_response()
    }
}
