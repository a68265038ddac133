use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("pushover credentials are not configured")]
    NotConfigured,

    #[error("pushover request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("pushover returned {0}")]
    Status(reqwest::StatusCode),
}

/// Delivers a short text message to the site owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct PushoverMessage<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
}

pub struct PushoverNotifier {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    user: Option<String>,
}

impl PushoverNotifier {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.pushover_api_url.clone(),
            token: config.pushover_api_token.clone(),
            user: config.pushover_user_key.clone(),
        })
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(user)) = (self.token.as_deref(), self.user.as_deref()) else {
            return Err(NotifyError::NotConfigured);
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&PushoverMessage {
                token,
                user,
                message,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }

        tracing::debug!("Pushover accepted notification");
        Ok(())
    }
}
