use crate::{
    club::remind_club_owners::RemindClubOwnersUseCase,
    dispatch::dispatch_passes::DispatchPassesUseCase,
    reminder::send_event_reminders::SendEventRemindersUseCase,
    shared::usecase::execute,
};
use futures::future::BoxFuture;
use passgate_infra::PassgateContext;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type TaskFn = Arc<dyn Fn(PassgateContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// A unit of work fired by the `CronScheduler` on a cron `schedule`
#[derive(Clone)]
pub struct CronTask {
    pub name: String,
    /// Six field cron expression, seconds first
    pub schedule: String,
    run: TaskFn,
}

impl CronTask {
    pub fn new<F, Fut>(name: impl Into<String>, schedule: impl Into<String>, run: F) -> Self
    where
        F: Fn(PassgateContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            run: Arc::new(move |ctx| Box::pin(run(ctx))),
        }
    }
}

/// Runs `task` unless the previous firing still holds `guard` or the
/// scheduler is stopping. Returns false when the firing was skipped.
///
/// `stopping` is read while holding the guard, so a firing either finished
/// before `stop` got the guard or does not run at all.
async fn run_guarded<F>(name: &str, guard: Arc<Mutex<()>>, stopping: &AtomicBool, task: F) -> bool
where
    F: Future<Output = ()>,
{
    let _permit = match guard.try_lock_owned() {
        Ok(permit) => permit,
        Err(_) => {
            warn!(
                "Scheduled task {} is still running, skipping this firing",
                name
            );
            return false;
        }
    };
    if stopping.load(Ordering::SeqCst) {
        info!("Scheduler is stopping, skipping firing of {}", name);
        return false;
    }
    task.await;
    true
}

struct RunningCron {
    scheduler: JobScheduler,
    guards: Vec<Arc<Mutex<()>>>,
    stopping: Arc<AtomicBool>,
}

/// Fires every `CronTask` on its schedule in the configured time zone.
///
/// A task never overlaps with itself: a firing that finds the previous one
/// still running is skipped. `stop` waits for in-flight firings.
pub struct CronScheduler {
    ctx: PassgateContext,
    tasks: Vec<CronTask>,
    running: Mutex<Option<RunningCron>>,
}

impl CronScheduler {
    pub fn new(ctx: PassgateContext, tasks: Vec<CronTask>) -> Self {
        Self {
            ctx,
            tasks,
            running: Mutex::new(None),
        }
    }

    /// Starting an already running scheduler does nothing
    pub async fn start(&self) -> anyhow::Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;
        let stopping = Arc::new(AtomicBool::new(false));
        let mut guards = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let guard = Arc::new(Mutex::new(()));
            guards.push(guard.clone());

            let ctx = self.ctx.clone();
            let task_fn = task.run.clone();
            let name = task.name.clone();
            let stopping = stopping.clone();
            let job = Job::new_async_tz(
                task.schedule.as_str(),
                self.ctx.config.timezone,
                move |_uuid, _lock| {
                    let ctx = ctx.clone();
                    let task_fn = task_fn.clone();
                    let name = name.clone();
                    let guard = guard.clone();
                    let stopping = stopping.clone();
                    Box::pin(async move {
                        run_guarded(&name, guard, &stopping, task_fn(ctx)).await;
                    })
                },
            )?;
            scheduler.add(job).await?;
            info!(
                "Scheduled task {} with schedule: {} ({})",
                task.name, task.schedule, self.ctx.config.timezone
            );
        }
        scheduler.start().await?;

        *running = Some(RunningCron {
            scheduler,
            guards,
            stopping,
        });
        Ok(())
    }

    /// Stops firing and waits for in-flight firings. Nothing runs after it
    /// returns. Safe to call when the scheduler never started.
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();
        let Some(mut running) = running else {
            return;
        };
        running.stopping.store(true, Ordering::SeqCst);
        if let Err(e) = running.scheduler.shutdown().await {
            error!("Unable to shut down the cron scheduler: {:?}", e);
        }
        for guard in running.guards {
            let _ = guard.lock().await;
        }
    }
}

/// Polls for due event reminders on a fixed interval
pub struct ReminderScheduler {
    ctx: PassgateContext,
    running: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl ReminderScheduler {
    pub fn new(ctx: PassgateContext) -> Self {
        Self {
            ctx,
            running: Mutex::new(None),
        }
    }

    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let cancel = token.clone();
        let ctx = self.ctx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(ctx.config.reminder_poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // Outside of the select so that stopping never cuts a poll short
                let _ = execute(SendEventRemindersUseCase, &ctx).await;
            }
        });
        info!(
            "Reminder polling started, interval: {:?}",
            self.ctx.config.reminder_poll_interval
        );

        *running = Some((token, handle));
    }

    pub async fn stop(&self) {
        let running = self.running.lock().await.take();
        if let Some((token, handle)) = running {
            token.cancel();
            if let Err(e) = handle.await {
                error!("Reminder polling ended abnormally: {:?}", e);
            }
        }
    }
}

/// Every background job of the service
pub struct Schedulers {
    cron: CronScheduler,
    reminders: ReminderScheduler,
}

fn cron_tasks(ctx: &PassgateContext) -> Vec<CronTask> {
    let mut tasks = ctx
        .config
        .dispatch_profiles
        .iter()
        .filter(|profile| profile.active)
        .map(|profile| {
            let profile = profile.clone();
            CronTask::new(
                format!("pass-dispatch-{}", profile.name),
                profile.schedule.clone(),
                move |ctx| {
                    let usecase = DispatchPassesUseCase {
                        profile: profile.clone(),
                    };
                    async move {
                        let _ = execute(usecase, &ctx).await;
                    }
                },
            )
        })
        .collect::<Vec<_>>();

    tasks.push(CronTask::new(
        "club-owner-reminder",
        ctx.config.club_owner_reminder_schedule.clone(),
        |ctx| async move {
            let _ = execute(RemindClubOwnersUseCase, &ctx).await;
        },
    ));

    tasks
}

impl Schedulers {
    pub fn new(ctx: PassgateContext) -> Self {
        let tasks = cron_tasks(&ctx);
        Self {
            cron: CronScheduler::new(ctx.clone(), tasks),
            reminders: ReminderScheduler::new(ctx),
        }
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        self.cron.start().await?;
        self.reminders.start().await;
        Ok(())
    }

    /// Waits for in-flight work so no dispatch cycle is cut off before its commit
    pub async fn stop(&self) {
        self.reminders.stop().await;
        self.cron.stop().await;
        info!("Schedulers stopped");
    }
}
