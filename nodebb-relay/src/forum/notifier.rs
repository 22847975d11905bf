//! NodeBB write-API client.

use std::time::Duration;

use chrono::Local;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use super::post::{sender_login, ForumPost};
use crate::delivery::VerifiedPayload;
use crate::Config;

/// Path segments of the topic creation endpoint, relative to the API root.
const TOPICS_SEGMENTS: [&str; 3] = ["api", "v3", "topics"];

/// Failure to create a topic.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never produced a response (connect error, timeout, ...).
    #[error("nodebb unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// NodeBB answered with a non-2xx status.
    #[error("nodebb rejected topic with status {status}")]
    Rejected { status: StatusCode, body: String },
}

/// Failure to set up a [`ForumNotifier`].
#[derive(Debug, Error)]
pub enum NotifierSetupError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("nodebb api root cannot carry a path: {0}")]
    InvalidApiRoot(Url),
}

/// Posts verified deliveries to NodeBB as new topics.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ForumNotifier {
    client: Client,
    topics_url: Url,
    api_secret: String,
    category_id: String,
}

impl ForumNotifier {
    /// Create a notifier from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, NotifierSetupError> {
        Self::new(
            &config.nodebb_api_root,
            &config.nodebb_api_secret,
            &config.nodebb_event_topic,
            config.request_timeout(),
        )
    }

    /// Create a notifier for one API root, token and category.
    pub fn new(
        api_root: &Url,
        api_secret: &str,
        category_id: &str,
        timeout: Duration,
    ) -> Result<Self, NotifierSetupError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            topics_url: topics_endpoint(api_root)?,
            api_secret: api_secret.to_string(),
            category_id: category_id.to_string(),
        })
    }

    /// Full URL topics are posted to.
    pub fn topics_url(&self) -> &str {
        self.topics_url.as_str()
    }

    /// Turn a verified payload into a topic and submit it.
    pub async fn notify(&self, payload: &VerifiedPayload) -> Result<(), NotifyError> {
        let payload = payload.value();
        let post = ForumPost::from_payload(&self.category_id, payload, Local::now());

        info!(
            sender = sender_login(payload),
            cid = %post.cid,
            title = %post.title,
            content_length = post.content.len(),
            "nodebb_topic_built"
        );

        self.submit(&post).await
    }

    /// Submit a prepared topic.
    pub async fn submit(&self, post: &ForumPost) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.topics_url.clone())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_secret))
            .json(post)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(url = %self.topics_url, error = %e, "nodebb_request_timeout");
                } else {
                    error!(url = %self.topics_url, error = %e, "nodebb_request_error");
                }
                NotifyError::Unreachable(e)
            })?;

        let status = response.status();

        if status.is_success() {
            info!(status_code = status.as_u16(), cid = %post.cid, "nodebb_topic_created");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        warn!(
            status_code = status.as_u16(),
            body_length = body.len(),
            body = %body,
            "nodebb_topic_rejected"
        );

        Err(NotifyError::Rejected { status, body })
    }
}

/// Append the topics path to the API root, keeping any query string.
fn topics_endpoint(api_root: &Url) -> Result<Url, NotifierSetupError> {
    let mut url = api_root.clone();
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| NotifierSetupError::InvalidApiRoot(api_root.clone()))?
        .pop_if_empty()
        .extend(TOPICS_SEGMENTS);

    Ok(url)
}
