//! Session backend client
//!
//! The backend persists timer sessions and aggregates usage statistics. It is
//! an external collaborator; the coordinator only talks to it through the
//! `SessionTracker` trait so tests and alternative transports can stand in.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::SessionApiError;
use super::stats::TimerTypeStats;

const START_PATH: &str = "session/start";
const COMPLETE_PATH: &str = "session/complete";
const STATS_PATH: &str = "user/timer-stats";

/// Opaque session identifier handed out by the backend and echoed back verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub serde_json::Value);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub type_id: i64,
    pub planned_duration_seconds: u64,
}

/// Backend acknowledgement of a started session
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionTicket {
    pub session_id: SessionId,
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSessionRequest {
    pub session_id: SessionId,
    pub actual_duration_seconds: u64,
}

/// Backend acknowledgement of a completed session; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionAck {
    pub session_id: Option<SessionId>,
    pub actual_duration_seconds: Option<u64>,
    pub completed_at: Option<String>,
}

/// Responses come either wrapped as `{success, data, message}` or bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped {
        success: bool,
        data: Option<T>,
        message: Option<String>,
    },
    Bare(T),
}

/// Start/complete notifications and stats lookups
#[async_trait]
pub trait SessionTracker: Send + Sync {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionTicket, SessionApiError>;

    async fn complete_session(
        &self,
        request: CompleteSessionRequest,
    ) -> Result<CompletionAck, SessionApiError>;

    async fn fetch_stats(&self) -> Result<Vec<TimerTypeStats>, SessionApiError>;
}

/// `SessionTracker` over the backend's JSON API
#[derive(Debug, Clone)]
pub struct HttpSessionTracker {
    client: Client,
    base: Url,
    user_id: Option<String>,
}

impl HttpSessionTracker {
    pub fn new(base_url: &str, user_id: Option<String>) -> Result<Self, SessionApiError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base,
            user_id,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Session endpoints carry the user as a query parameter when one is configured
    fn session_url(&self, path: &str) -> Result<Url, SessionApiError> {
        let mut url = self.base.join(path)?;
        if let Some(user_id) = &self.user_id {
            url.query_pairs_mut().append_pair("user_id", user_id);
        }
        Ok(url)
    }

    fn stats_url(&self) -> Result<Url, SessionApiError> {
        let user_id = self.user_id.as_deref().ok_or(SessionApiError::MissingUser)?;
        let mut url = self.base.join(STATS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| SessionApiError::InvalidBaseUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(user_id);
        Ok(url)
    }
}

#[async_trait]
impl SessionTracker for HttpSessionTracker {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionTicket, SessionApiError> {
        let url = self.session_url(START_PATH)?;
        debug!("POST {} {:?}", url, request);

        let response = self.client.post(url).json(&request).send().await?;
        read_envelope(response).await?.ok_or(SessionApiError::EmptyResponse)
    }

    async fn complete_session(
        &self,
        request: CompleteSessionRequest,
    ) -> Result<CompletionAck, SessionApiError> {
        let url = self.session_url(COMPLETE_PATH)?;
        debug!("PUT {} {:?}", url, request);

        let response = self.client.put(url).json(&request).send().await?;
        Ok(read_envelope(response).await?.unwrap_or_default())
    }

    async fn fetch_stats(&self) -> Result<Vec<TimerTypeStats>, SessionApiError> {
        let url = self.stats_url()?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        Ok(read_envelope(response).await?.unwrap_or_default())
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, SessionApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SessionApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    match response.json::<Envelope<T>>().await? {
        Envelope::Wrapped { success: false, message, .. } => Err(SessionApiError::Rejected(
            message.unwrap_or_else(|| "unspecified error".to_string()),
        )),
        Envelope::Wrapped { data, .. } => Ok(data),
        Envelope::Bare(data) => Ok(Some(data)),
    }
}
