use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn is_connected(&self, guest_id: &str) -> Result<bool> {
        let url = format!("{}/guests/{}/connection", self.base_url, guest_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to get connection status")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to get connection status: {}", response.status());
        }

        let api_response: Value = response.json().await.context("Failed to parse response")?;

        // Extract the data from ApiResponse wrapper
        api_response["data"]["connected"]
            .as_bool()
            .context("No connected flag in response")
    }

    /// Registration completes shortly after the upgrade, so poll for it.
    pub async fn wait_until_connected(&self, guest_id: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while !self.is_connected(guest_id).await? {
            if Instant::now() >= deadline {
                anyhow::bail!("Timeout waiting for guest {} to be registered", guest_id);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Ok(())
    }

    /// Returns the HTTP status; delivery failures are expected in some scenarios.
    pub async fn send_message(
        &self,
        guest_id: &str,
        title: &str,
        content: Value,
    ) -> Result<StatusCode> {
        let url = format!("{}/guests/{}/messages", self.base_url, guest_id);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .context("Failed to send message")?;

        Ok(response.status())
    }

    pub async fn check_in(&self, guest_id: &str, guest: Value) -> Result<()> {
        let url = format!("{}/guests/{}/check_in", self.base_url, guest_id);

        let response = self
            .client
            .post(&url)
            .json(&guest)
            .send()
            .await
            .context("Failed to check in guest")?;

        if response.status() != StatusCode::ACCEPTED {
            anyhow::bail!("Failed to check in guest: {}", response.status());
        }
        Ok(())
    }

    pub async fn close_connection(&self, guest_id: &str) -> Result<StatusCode> {
        let url = format!("{}/guests/{}/connection", self.base_url, guest_id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to close connection")?;

        Ok(response.status())
    }
}
