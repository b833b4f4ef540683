// src/services/publisher.rs

//! Announcement publishers.
//!
//! The run loop hands each selected announcement to a [`Publisher`]. A
//! publisher never sees state; by the time it is called the announcement has
//! already been recorded.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Credential, EmblemImage, PublisherConfig, PublisherKind};
use crate::pipeline::Announcement;

/// Destination for announcements.
#[async_trait(?Send)]
pub trait Publisher {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Publish one announcement. Failures are not retried.
    async fn publish(&self, announcement: &Announcement) -> Result<()>;
}

/// Build the configured publisher.
pub fn build_publisher(
    config: &PublisherConfig,
    client: &reqwest::Client,
    credential: Option<&Credential>,
) -> Result<Box<dyn Publisher>> {
    match config.kind {
        PublisherKind::DryRun => Ok(Box::new(DryRunPublisher)),
        PublisherKind::Webhook => {
            let endpoint = config
                .endpoint
                .clone()
                .ok_or_else(|| AppError::config("publisher.endpoint is not set"))?;
            let credential = credential.cloned().ok_or_else(|| {
                AppError::credential("no credential stored; run `partywatch authorize` first")
            })?;
            Ok(Box::new(WebhookPublisher::new(
                client.clone(),
                endpoint,
                credential,
            )))
        }
    }
}

/// Logs announcements instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunPublisher;

#[async_trait(?Send)]
impl Publisher for DryRunPublisher {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn publish(&self, announcement: &Announcement) -> Result<()> {
        log::info!("[dry-run] {}", announcement.message);
        for image in &announcement.attachments {
            log::info!("[dry-run]   attach {} ({})", image.url, image.description);
        }
        Ok(())
    }
}

/// JSON body sent by [`WebhookPublisher`].
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    message: &'a str,
    attachments: &'a [EmblemImage],
}

/// POSTs announcements to an HTTP endpoint using the stored credential.
pub struct WebhookPublisher {
    client: reqwest::Client,
    endpoint: String,
    credential: Credential,
}

impl WebhookPublisher {
    pub fn new(client: reqwest::Client, endpoint: String, credential: Credential) -> Self {
        Self {
            client,
            endpoint,
            credential,
        }
    }
}

#[async_trait(?Send)]
impl Publisher for WebhookPublisher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, announcement: &Announcement) -> Result<()> {
        let payload = WebhookPayload {
            message: &announcement.message,
            attachments: &announcement.attachments,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credential.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::publish(format!(
                "{} responded {}: {}",
                self.endpoint,
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}
