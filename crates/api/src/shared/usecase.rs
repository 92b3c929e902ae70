use futures::future::join_all;
use passgate_infra::PassgateContext;
use std::fmt::Debug;
use tracing::{debug, error, info};

/// Subscriber is a side effect to a `UseCase`
///
/// It is going to act upon the response of the execution
/// of the `UseCase` if the execution was a success.
#[async_trait::async_trait]
pub trait Subscriber<U: UseCase>: Send + Sync {
    async fn notify(&self, e: &U::Response, ctx: &PassgateContext);
}

#[async_trait::async_trait]
pub trait UseCase: Debug + Send {
    type Response: Send + Sync;
    type Error: Debug + Send + Sync;

    const NAME: &'static str;

    async fn execute(&mut self, ctx: &PassgateContext) -> Result<Self::Response, Self::Error>;

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        Default::default()
    }

    /// Errors that are a regular outcome of the use case, like a duplicate
    /// request. They are logged at debug level instead of error.
    fn is_expected_error(_e: &Self::Error) -> bool {
        false
    }
}

#[tracing::instrument(name = "UseCase executed", skip(usecase, ctx), fields(usecase = %U::NAME))]
pub async fn execute<U>(mut usecase: U, ctx: &PassgateContext) -> Result<U::Response, U::Error>
where
    U: UseCase,
{
    info!("{:?}", usecase);
    let res = usecase.execute(ctx).await;

    match &res {
        Ok(res) => {
            let subscribers = U::subscribers();
            let mut subscriber_promises = Vec::with_capacity(subscribers.len());
            for subscriber in &subscribers {
                subscriber_promises.push(subscriber.notify(res, ctx));
            }
            join_all(subscriber_promises).await;
        }
        Err(e) if U::is_expected_error(e) => {
            debug!("Use case refused: {:?}", e);
        }
        Err(e) => {
            error!("Use case error: {:?}", e);
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Level};
    use tracing_subscriber::{layer::Context, prelude::*, Layer, Registry};

    /// Keeps the level of every event logged while it is the default subscriber
    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[derive(Debug, PartialEq)]
    enum OutcomeError {
        AlreadyDone,
        Broken,
    }

    #[derive(Debug)]
    struct FailingUseCase(OutcomeError);

    #[async_trait::async_trait]
    impl UseCase for FailingUseCase {
        type Response = ();

        type Error = OutcomeError;

        const NAME: &'static str = "Failing";

        async fn execute(&mut self, _ctx: &PassgateContext) -> Result<(), OutcomeError> {
            Err(match self.0 {
                OutcomeError::AlreadyDone => OutcomeError::AlreadyDone,
                OutcomeError::Broken => OutcomeError::Broken,
            })
        }

        fn is_expected_error(e: &OutcomeError) -> bool {
            matches!(e, OutcomeError::AlreadyDone)
        }
    }

    async fn levels_of(usecase: FailingUseCase) -> Vec<Level> {
        let recorder = LevelRecorder::default();
        let subscriber = Registry::default().with(recorder.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let ctx = setup().ctx;
        assert!(execute(usecase, &ctx).await.is_err());

        let levels = recorder.0.lock().unwrap().clone();
        levels
    }

    #[actix_web::main]
    #[test]
    async fn expected_errors_are_not_logged_as_errors() {
        let levels = levels_of(FailingUseCase(OutcomeError::AlreadyDone)).await;
        assert!(levels.contains(&Level::DEBUG));
        assert!(!levels.contains(&Level::ERROR));
    }

    #[actix_web::main]
    #[test]
    async fn unexpected_errors_are_logged_as_errors() {
        let levels = levels_of(FailingUseCase(OutcomeError::Broken)).await;
        assert!(levels.contains(&Level::ERROR));
    }
}
