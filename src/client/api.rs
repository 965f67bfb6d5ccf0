use crate::{
    client::{
        BuildHttpClientSnafu, ClientResult, DecodeSnafu, InvalidServerUrlSnafu, NetworkSnafu,
    },
    envelope::Envelope,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

///Body of a create request, as the form sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub major: String,
    pub subjects: String,
}

#[derive(Debug)]
pub struct ApiReply {
    pub status: StatusCode,
    ///method and path, e.g. `GET /api/students/count`
    pub endpoint: String,
    pub body: Envelope<Value>,
}

#[derive(Debug, Clone)]
pub struct RecordsApi {
    http: Client,
    base: Url,
}

impl RecordsApi {
    pub fn new(server: &str) -> ClientResult<Self> {
        let base = Url::parse(server.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .context(InvalidServerUrlSnafu { url: server })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(BuildHttpClientSnafu)?;

        Ok(Self { http, base })
    }

    pub fn server(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().ok().context(InvalidServerUrlSnafu {
                url: self.base.to_string(),
            })?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    ///true when the count endpoint answers with a success status
    pub async fn probe(&self) -> ClientResult<bool> {
        let url = self.endpoint(&["students", "count"])?;
        let response = self.http.get(url).send().await.context(NetworkSnafu)?;
        Ok(response.status().is_success())
    }

    pub async fn list(&self) -> ClientResult<ApiReply> {
        self.get(&["students"]).await
    }

    pub async fn by_major(&self, major: &str) -> ClientResult<ApiReply> {
        self.get(&["students", "major", major]).await
    }

    pub async fn by_min_age(&self, min_age: u32) -> ClientResult<ApiReply> {
        self.get(&["students", "age", &min_age.to_string()]).await
    }

    pub async fn count(&self) -> ClientResult<ApiReply> {
        self.get(&["students", "count"]).await
    }

    pub async fn create(&self, request: &CreateStudentRequest) -> ClientResult<ApiReply> {
        let url = self.endpoint(&["students"])?;
        let endpoint = format!("{} {}", Method::POST, url.path());
        self.send(self.http.post(url).json(request), endpoint).await
    }

    async fn get(&self, segments: &[&str]) -> ClientResult<ApiReply> {
        let url = self.endpoint(segments)?;
        let endpoint = format!("{} {}", Method::GET, url.path());
        self.send(self.http.get(url), endpoint).await
    }

    async fn send(&self, request: RequestBuilder, endpoint: String) -> ClientResult<ApiReply> {
        debug!(%endpoint, "Sending request");
        let response = request.send().await.context(NetworkSnafu)?;
        let status = response.status();
        let body = response.json().await.context(DecodeSnafu)?;

        Ok(ApiReply {
            status,
            endpoint,
            body,
        })
    }
}
