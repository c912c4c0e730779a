use crate::conversation::Turn;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Outcome of one round-trip to the answering service.
#[derive(Debug, Clone)]
pub enum ReplyEvent {
    /// Assistant reply text.
    Reply(String),
    /// The request failed (network, non-2xx, or malformed body).
    Failed(String),
}

#[derive(Serialize)]
struct AskRequest<'a> {
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct AskResponse {
    reply: String,
}

/// HTTP client for the answering service. One POST per submission, no
/// streaming, no auth.
#[derive(Clone)]
pub struct AskClient {
    client: reqwest::Client,
    base_url: String,
}

impl AskClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the conversation off and return a receiver that will yield
    /// exactly one [`ReplyEvent`]. The request runs in a spawned task so
    /// the UI loop keeps ticking while it is in flight.
    pub fn send(&self, turns: Vec<Turn>) -> mpsc::Receiver<ReplyEvent> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();

        tokio::spawn(async move {
            let event = match client.ask(&turns).await {
                Ok(reply) => ReplyEvent::Reply(reply),
                Err(e) => ReplyEvent::Failed(e.to_string()),
            };
            let _ = tx.send(event).await;
        });

        rx
    }

    /// POST the full conversation and return the assistant's reply text.
    pub async fn ask(&self, turns: &[Turn]) -> Result<String> {
        let url = format!("{}/api/ask", self.base_url);
        tracing::debug!(%url, turns = turns.len(), "asking answering service");

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { messages: turns })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Answering service error ({}): {}",
                status,
                error_text
            ));
        }

        let body: AskResponse = response.json().await?;
        Ok(body.reply)
    }
}
