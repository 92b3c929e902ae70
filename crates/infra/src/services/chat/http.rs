use super::IChatChannel;
use crate::config::ChatConfig;
use passgate_domain::MembershipStatus;
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// Client for a Telegram style bot HTTP API
pub struct HttpChatChannel {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetChatMemberRequest {
    chat_id: i64,
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

impl HttpChatChannel {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn parse<T: DeserializeOwned>(
        method: &str,
        res: reqwest::Response,
    ) -> anyhow::Result<Option<T>> {
        let status = res.status();
        let body: ApiResponse<T> = res.json().await?;
        if !body.ok {
            return Err(anyhow::anyhow!(
                "Chat API {} failed with status {}: {}",
                method,
                status,
                body.description.unwrap_or_default()
            ));
        }
        Ok(body.result)
    }
}

#[async_trait::async_trait]
impl IChatChannel for HttpChatChannel {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let res = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?;
        Self::parse::<serde_json::Value>("sendMessage", res).await?;
        debug!("Sent chat message to {}", chat_id);
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()> {
        let document = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", document);
        let res = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        Self::parse::<serde_json::Value>("sendDocument", res).await?;
        debug!("Sent chat document {} to {}", file_name, chat_id);
        Ok(())
    }

    async fn get_membership(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> anyhow::Result<MembershipStatus> {
        let res = self
            .client
            .post(self.method_url("getChatMember"))
            .json(&GetChatMemberRequest {
                chat_id: channel_id,
                user_id,
            })
            .send()
            .await?;
        let member = Self::parse::<ChatMember>("getChatMember", res)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Chat API getChatMember returned no member"))?;
        member.status.parse()
    }
}
