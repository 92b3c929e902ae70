use super::{IMailer, OutgoingMail};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Mailer that keeps every sent mail in memory
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing_recipients: Mutex<HashSet<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mail to `recipient` fails from now on
    pub fn fail_for(&self, recipient: &str) {
        lock(&self.failing_recipients).insert(recipient.to_string());
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        lock(&self.sent).clone()
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        if lock(&self.failing_recipients).contains(&mail.to) {
            return Err(anyhow::anyhow!("Mailbox {} is unavailable", mail.to));
        }
        lock(&self.sent).push(mail.clone());
        Ok(())
    }
}
