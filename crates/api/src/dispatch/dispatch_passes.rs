use crate::shared::usecase::UseCase;
use futures::future::join_all;
use passgate_domain::{group_by_event, DispatchProfile, PassDigest, RenderedDigest, ID};
use passgate_infra::{MailAttachment, OutgoingMail, PassgateContext};
use std::collections::HashMap;
use std::future::Future;
use tracing::{error, info, warn};

/// One dispatch cycle of a profile: collect the due passes, render the
/// digest, deliver it over chat and email and commit the outcome.
#[derive(Debug)]
pub struct DispatchPassesUseCase {
    pub profile: DispatchProfile,
}

#[derive(Debug, PartialEq)]
pub struct DispatchReport {
    pub profile: String,
    pub pass_ids: Vec<ID>,
    pub event_count: usize,
    /// Events of due passes that could not be loaded, their passes stay pending
    pub skipped_events: Vec<ID>,
    pub email_sent: bool,
    pub chat_sent: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    /// Nothing was mutated, the next firing collects the same passes again
    CollectFailed,
    RenderFailed,
    CommitFailed,
}

impl DispatchPassesUseCase {
    /// Runs `delivery` under the watchdog, a timeout counts as a failure
    async fn watched<F>(&self, channel: &str, ctx: &PassgateContext, delivery: F) -> bool
    where
        F: Future<Output = bool>,
    {
        match tokio::time::timeout(ctx.config.dispatch_delivery_timeout, delivery).await {
            Ok(sent) => sent,
            Err(_) => {
                error!(
                    "Pass dispatch {}: {} delivery timed out after {:?}",
                    self.profile.name, channel, ctx.config.dispatch_delivery_timeout
                );
                false
            }
        }
    }

    async fn deliver_chat(
        &self,
        chat_id: i64,
        digest: &RenderedDigest,
        has_passes: bool,
        ctx: &PassgateContext,
    ) -> bool {
        if let Err(e) = ctx.chat.send_message(chat_id, &digest.summary).await {
            error!(
                "Pass dispatch {}: summary to chat {} failed: {:?}",
                self.profile.name, chat_id, e
            );
            return false;
        }
        if !has_passes {
            return true;
        }
        match ctx
            .chat
            .send_document(
                chat_id,
                &digest.attachment_name,
                digest.attachment.clone(),
                &digest.subject,
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Pass dispatch {}: export to chat {} failed: {:?}",
                    self.profile.name, chat_id, e
                );
                false
            }
        }
    }

    /// True when at least one recipient got the mail
    async fn deliver_email(
        &self,
        digest: &RenderedDigest,
        has_passes: bool,
        ctx: &PassgateContext,
    ) -> bool {
        let attachment = if has_passes {
            Some(MailAttachment {
                file_name: digest.attachment_name.clone(),
                content_type: "application/json".into(),
                content: digest.attachment.clone(),
            })
        } else {
            None
        };
        let mails = self
            .profile
            .recipient_emails
            .iter()
            .map(|to| OutgoingMail {
                to: to.clone(),
                subject: digest.subject.clone(),
                body: digest.summary.clone(),
                attachment: attachment.clone(),
            })
            .collect::<Vec<_>>();

        let results = join_all(mails.iter().map(|mail| ctx.mailer.send(mail))).await;
        let mut delivered = 0;
        for (mail, res) in mails.iter().zip(results) {
            match res {
                Ok(_) => delivered += 1,
                Err(e) => warn!(
                    "Pass dispatch {}: mail to {} failed: {:?}",
                    self.profile.name, mail.to, e
                ),
            }
        }
        delivered > 0
    }
}

#[async_trait::async_trait]
impl UseCase for DispatchPassesUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchPasses";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();

        // Collecting
        let due = ctx.repos.passes.find_due_unsent(now).await.map_err(|e| {
            error!("Pass dispatch {}: unable to collect passes: {:?}", self.profile.name, e);
            UseCaseError::CollectFailed
        })?;
        let mut event_ids = due.iter().map(|p| p.event_id).collect::<Vec<_>>();
        event_ids.sort();
        event_ids.dedup();
        let events = ctx
            .repos
            .events
            .find_many(&event_ids)
            .await
            .map_err(|e| {
                error!("Pass dispatch {}: unable to load events: {:?}", self.profile.name, e);
                UseCaseError::CollectFailed
            })?
            .into_iter()
            .map(|e| (e.id, e))
            .collect::<HashMap<_, _>>();
        let mut user_ids = due.iter().map(|p| p.user_id).collect::<Vec<_>>();
        user_ids.sort_unstable();
        user_ids.dedup();
        let members = ctx
            .repos
            .members
            .find_many(&user_ids)
            .await
            .map_err(|e| {
                error!("Pass dispatch {}: unable to load members: {:?}", self.profile.name, e);
                UseCaseError::CollectFailed
            })?
            .into_iter()
            .map(|m| (m.id, m))
            .collect::<HashMap<_, _>>();

        // Grouping
        let (groups, skipped_events) = group_by_event(due, &events);
        for event_id in &skipped_events {
            warn!(
                "Pass dispatch {}: event {} of due passes was not found, its passes stay pending",
                self.profile.name, event_id
            );
        }
        let digest = PassDigest::new(groups, now);

        // Rendering
        let rendered = digest
            .render(&members, &ctx.config.timezone)
            .map_err(|e| {
                error!("Pass dispatch {}: unable to render digest: {:?}", self.profile.name, e);
                UseCaseError::RenderFailed
            })?;
        let has_passes = !digest.is_empty();

        // Delivering, the channels are independent of each other
        let chat = async {
            match self.profile.chat_channel_id {
                Some(chat_id) => {
                    self.watched("chat", ctx, self.deliver_chat(chat_id, &rendered, has_passes, ctx))
                        .await
                }
                None => false,
            }
        };
        let email = async {
            if self.profile.recipient_emails.is_empty() {
                false
            } else {
                self.watched("email", ctx, self.deliver_email(&rendered, has_passes, ctx))
                    .await
            }
        };
        let (chat_sent, email_sent) = futures::join!(chat, email);

        // Committing
        let pass_ids = digest.pass_ids();
        ctx.repos
            .passes
            .mark_sent(&pass_ids, now, email_sent, chat_sent)
            .await
            .map_err(|e| {
                error!(
                    "Pass dispatch {}: unable to commit {} passes: {:?}",
                    self.profile.name,
                    pass_ids.len(),
                    e
                );
                UseCaseError::CommitFailed
            })?;
        info!(
            "Pass dispatch {}: {} passes for {} events, email sent: {}, chat sent: {}",
            self.profile.name,
            pass_ids.len(),
            digest.event_count(),
            email_sent,
            chat_sent
        );

        Ok(DispatchReport {
            profile: self.profile.name.clone(),
            pass_ids,
            event_count: digest.event_count(),
            skipped_events,
            email_sent,
            chat_sent,
        })
    }
}
