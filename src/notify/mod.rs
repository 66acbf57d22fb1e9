//! Outbound notification boundary.
//!
//! The engine only ever hands the chat platform two things: a rendered
//! standings artifact for a group's report channel, and a plain reminder
//! for a participant who has not picked yet. Everything else about the bot
//! surface lives outside this service.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::NotifierConfig;
use crate::error::{Error, Result};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one round's standings image plus caption to a group's
    /// report channel.
    async fn post_report(
        &self,
        channel_id: &str,
        caption: &str,
        image_png: &[u8],
        filename: &str,
    ) -> Result<()>;

    /// Send a participant a reminder that they have not picked, with a
    /// prompt to open the selection dialog.
    async fn send_reminder(&self, recipient_id: &str, text: &str) -> Result<()>;
}

pub struct ChatNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl ChatNotifier {
    pub fn new(config: &NotifierConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            bot_token: config.bot_token.clone(),
        })
    }
}

/// Minimal acknowledgement envelope the chat API wraps every response in.
#[derive(Debug, Deserialize)]
struct ApiAck {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

fn check_ack(ack: ApiAck, operation: &str) -> Result<()> {
    if ack.ok {
        Ok(())
    } else {
        Err(Error::Notify(format!(
            "{} rejected: {}",
            operation,
            ack.error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn post_report(
        &self,
        channel_id: &str,
        caption: &str,
        image_png: &[u8],
        filename: &str,
    ) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(image_png.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/png")
            .map_err(|e| Error::Notify(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("channels", channel_id.to_string())
            .text("initial_comment", caption.to_string())
            .part("file", part);

        let ack: ApiAck = self
            .client
            .post(format!("{}/files.upload", self.api_base))
            .bearer_auth(&self.bot_token)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Notify(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;

        check_ack(ack, "file upload")
    }

    async fn send_reminder(&self, recipient_id: &str, text: &str) -> Result<()> {
        let body = json!({
            "channel": recipient_id,
            "text": text,
            "blocks": [{
                "type": "section",
                "text": { "type": "plain_text", "text": text },
                "accessory": {
                    "type": "button",
                    "action_id": "open_pick_prompt",
                    "text": { "type": "plain_text", "text": "Select Team" }
                }
            }]
        });

        let ack: ApiAck = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Notify(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;

        check_ack(ack, "reminder message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_ok_passes() {
        assert!(check_ack(ApiAck { ok: true, error: None }, "file upload").is_ok());
    }

    #[test]
    fn test_ack_error_maps_to_notify_error() {
        let result = check_ack(
            ApiAck {
                ok: false,
                error: Some("channel_not_found".to_string()),
            },
            "file upload",
        );

        match result {
            Err(Error::Notify(msg)) => assert!(msg.contains("channel_not_found")),
            other => panic!("expected notify error, got {:?}", other),
        }
    }

    #[test]
    fn test_ack_error_without_detail_still_fails() {
        assert!(check_ack(ApiAck { ok: false, error: None }, "reminder message").is_err());
    }
}
