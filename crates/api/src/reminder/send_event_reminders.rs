use crate::shared::usecase::UseCase;
use chrono_tz::Tz;
use passgate_domain::{due_reminders, Event, NotificationRecord, ReminderKind};
use passgate_infra::PassgateContext;
use tracing::{error, info, warn};

/// One reminder poll: every registered member of an event inside a reminder
/// band gets the reminder of that band once.
#[derive(Debug)]
pub struct SendEventRemindersUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct ReminderReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

fn reminder_text(event: &Event, kind: ReminderKind, tz: &Tz) -> String {
    let start = event.start_time.with_timezone(tz);
    let when = match kind {
        ReminderKind::DayBefore => format!("tomorrow at {}", start.format("%H:%M")),
        ReminderKind::HourBefore => format!("in one hour, at {}", start.format("%H:%M")),
    };
    format!(
        "Reminder: \"{}\" starts {}.\nLocation: {}",
        event.name, when, event.location
    )
}

impl SendEventRemindersUseCase {
    async fn remind(
        &self,
        event: &Event,
        kind: ReminderKind,
        ctx: &PassgateContext,
        report: &mut ReminderReport,
    ) -> Result<(), UseCaseError> {
        let registered = ctx
            .repos
            .registrations
            .find_registered_members(&event.id)
            .await
            .map_err(|e| {
                error!("Unable to load registrations of event {}: {:?}", event.id, e);
                UseCaseError::StorageError
            })?;
        let notified = ctx
            .repos
            .notifications
            .find_notified_members(&event.id, kind)
            .await
            .map_err(|e| {
                error!("Unable to load notification ledger of event {}: {:?}", event.id, e);
                UseCaseError::StorageError
            })?;

        let text = reminder_text(event, kind, &ctx.config.timezone);
        for user_id in registered.into_iter().filter(|id| !notified.contains(id)) {
            if let Err(e) = ctx.chat.send_message(user_id, &text).await {
                // No record, the next poll inside the band retries
                warn!(
                    "Unable to send {} reminder of event {} to {}: {:?}",
                    kind, event.id, user_id, e
                );
                report.failed += 1;
                continue;
            }
            let record = NotificationRecord {
                event_id: event.id,
                user_id,
                kind,
                created_at: ctx.sys.now(),
            };
            match ctx.repos.notifications.insert(&record).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    error!(
                        "Sent {} reminder of event {} to {} but could not record it: {:?}",
                        kind, event.id, user_id, e
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UseCase for SendEventRemindersUseCase {
    type Response = ReminderReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendEventReminders";

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let events = ctx
            .repos
            .events
            .find_starting_between(now, now + ctx.config.reminder_lookahead)
            .await
            .map_err(|e| {
                error!("Unable to load upcoming events: {:?}", e);
                UseCaseError::StorageError
            })?;

        let mut report = ReminderReport::default();
        for event in &events {
            for kind in due_reminders(&ctx.config.reminder_bands, event.start_time, now) {
                // One failing event must not starve the others
                if self.remind(event, kind, ctx, &mut report).await.is_err() {
                    report.failed += 1;
                }
            }
        }
        if report.sent > 0 || report.failed > 0 {
            info!(
                "Reminders sent: {}, failed: {}",
                report.sent, report.failed
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::*;
    use chrono::Duration;
    use passgate_domain::{Registration, RegistrationInsert};
    use passgate_infra::ChatDelivery;

    async fn register(ctx: &PassgateContext, event: &Event, user_id: i64) {
        let res = ctx
            .repos
            .registrations
            .insert_if_capacity(&Registration::new(event.id, user_id, ctx.sys.now()), 0)
            .await
            .unwrap();
        assert!(matches!(res, RegistrationInsert::Inserted { .. }));
    }

    async fn tick(ctx: &PassgateContext) -> ReminderReport {
        SendEventRemindersUseCase.execute(ctx).await.unwrap()
    }

    #[actix_web::main]
    #[test]
    async fn nothing_to_send_outside_bands() {
        let TestContext { ctx, chat, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        register(&ctx, &event, 1).await;

        assert_eq!(tick(&ctx).await, ReminderReport::default());
        assert!(chat.deliveries().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn repeated_ticks_in_band_remind_once() {
        let TestContext { ctx, sys, chat, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        register(&ctx, &event, 1).await;
        register(&ctx, &event, 2).await;

        sys.set(event.start_time - Duration::hours(24));
        assert_eq!(tick(&ctx).await.sent, 2);
        sys.set(event.start_time - Duration::minutes(24 * 60 - 1));
        assert_eq!(tick(&ctx).await.sent, 0);
        sys.set(event.start_time - Duration::minutes(24 * 60 - 2));
        assert_eq!(tick(&ctx).await.sent, 0);

        assert_eq!(chat.deliveries_to(1).len(), 1);
        assert_eq!(chat.deliveries_to(2).len(), 1);
        match &chat.deliveries_to(1)[0] {
            ChatDelivery::Message { text } => assert!(text.contains("tomorrow at 18:00")),
            other => panic!("Unexpected delivery {:?}", other),
        }
        assert!(ctx
            .repos
            .notifications
            .exists(&event.id, 1, ReminderKind::DayBefore)
            .await
            .unwrap());
    }

    #[actix_web::main]
    #[test]
    async fn failed_delivery_is_retried_inside_band() {
        let TestContext { ctx, sys, chat, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        register(&ctx, &event, 1).await;
        register(&ctx, &event, 2).await;
        chat.fail_for(1);

        sys.set(event.start_time - Duration::minutes(24 * 60 + 20));
        let report = tick(&ctx).await;
        assert_eq!(report, ReminderReport { sent: 1, failed: 1 });
        assert!(!ctx
            .repos
            .notifications
            .exists(&event.id, 1, ReminderKind::DayBefore)
            .await
            .unwrap());

        chat.recover(1);
        sys.set(event.start_time - Duration::minutes(24 * 60 + 10));
        let report = tick(&ctx).await;
        assert_eq!(report, ReminderReport { sent: 1, failed: 0 });
        assert_eq!(chat.deliveries_to(1).len(), 1);
        assert_eq!(chat.deliveries_to(2).len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn late_registrations_are_picked_up_in_band() {
        let TestContext { ctx, sys, chat, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        register(&ctx, &event, 1).await;

        sys.set(event.start_time - Duration::minutes(24 * 60 + 25));
        assert_eq!(tick(&ctx).await.sent, 1);
        register(&ctx, &event, 2).await;
        sys.set(event.start_time - Duration::minutes(24 * 60 + 5));
        assert_eq!(tick(&ctx).await.sent, 1);

        assert_eq!(chat.deliveries_to(1).len(), 1);
        assert_eq!(chat.deliveries_to(2).len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn hour_reminder_is_a_separate_kind() {
        let TestContext { ctx, sys, chat, .. } = setup();
        let event = event_factory();
        insert_event(&ctx, &event).await;
        register(&ctx, &event, 1).await;

        sys.set(event.start_time - Duration::hours(24));
        tick(&ctx).await;
        sys.set(event.start_time - Duration::minutes(61));
        assert_eq!(tick(&ctx).await.sent, 1);
        sys.set(event.start_time - Duration::minutes(59));
        assert_eq!(tick(&ctx).await.sent, 0);

        let deliveries = chat.deliveries_to(1);
        assert_eq!(deliveries.len(), 2);
        match &deliveries[1] {
            ChatDelivery::Message { text } => assert!(text.contains("in one hour")),
            other => panic!("Unexpected delivery {:?}", other),
        }
    }
}
