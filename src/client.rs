//! Terminal front-end for the records API: a form, a query selector and a result area,
//! plus the connectivity indicator that keeps track of whether the server answers.

use snafu::Snafu;

pub mod api;
pub mod connection;
pub mod controller;
pub mod form;
pub mod query;
pub mod render;
pub mod repl;
pub mod status;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    #[snafu(display("Invalid server URL {:?}", url))]
    InvalidServerUrl { url: String },
    #[snafu(display("Unable to build HTTP client"))]
    BuildHttpClient { source: reqwest::Error },
    #[snafu(display("Unable to reach the server"))]
    Network { source: reqwest::Error },
    #[snafu(display("Unable to read the server's response"))]
    Decode { source: reqwest::Error },
    #[snafu(display("Terminal input failed"))]
    Terminal {
        source: rustyline::error::ReadlineError,
    },
}
