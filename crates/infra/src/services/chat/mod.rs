mod http;
mod inmemory;

pub use http::HttpChatChannel;
pub use inmemory::{InMemoryChatChannel, InMemoryChatDelivery};
use passgate_domain::MembershipStatus;

/// A message or document delivered to a chat
#[derive(Debug, Clone, PartialEq)]
pub enum ChatDelivery {
    Message {
        text: String,
    },
    Document {
        file_name: String,
        content: Vec<u8>,
        caption: String,
    },
}

/// The chat platform. Chat ids of members are their user ids.
#[async_trait::async_trait]
pub trait IChatChannel: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()>;
    async fn get_membership(&self, channel_id: i64, user_id: i64)
        -> anyhow::Result<MembershipStatus>;
}
