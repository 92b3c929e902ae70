mod chat;
mod mail;

pub use chat::{
    ChatDelivery, HttpChatChannel, IChatChannel, InMemoryChatChannel, InMemoryChatDelivery,
};
pub use mail::{IMailer, InMemoryMailer, MailAttachment, OutgoingMail, SmtpMailer};
