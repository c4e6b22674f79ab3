use crate::error::{Error, Result};
use crate::stack::{StackApi, StackEvent, StackStatus};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default pause between two polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How a finished stack operation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn of(status: &StackStatus) -> Self {
        if status.is_failure() {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }
}

/// Final state of an observed stack
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub status: StackStatus,
    pub outcome: Outcome,
    pub outputs: BTreeMap<String, String>,
}

/// Receives the progress of an observation as it happens
pub trait EventSink {
    /// Called once per poll with the status the stack had at that moment
    fn polling(&mut self, _status: &StackStatus) {}

    /// A stack event which has not been reported before
    fn event(&mut self, event: &StackEvent);

    fn finished(&mut self, _status: &StackStatus, _outcome: Outcome) {}

    fn outputs(&mut self, _outputs: &BTreeMap<String, String>) {}
}

/// Follows a stack operation until the stack reaches a terminal status
pub struct Observer<'a> {
    api: &'a dyn StackApi,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl<'a> Observer<'a> {
    pub fn new(api: &'a dyn StackApi) -> Self {
        Self {
            api,
            poll_interval: POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Stop observing as soon as the token is cancelled
    ///
    /// The token is checked while sleeping between polls and before every request.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll the stack until its status is terminal
    ///
    /// Events are reported oldest first within a poll, and each event only once.
    /// Ordering across polls is only as good as the order the API returns events in:
    /// an older event first seen on a later poll is reported after newer ones.
    ///
    /// A stack ending in a failed status is a successful observation with
    /// [`Outcome::Failure`], errors are only returned when the stack can't be observed.
    pub async fn observe(&self, stack: &str, sink: &mut dyn EventSink) -> Result<Observation> {
        let mut seen = HashSet::new();
        let mut is_first = true;

        let status = loop {
            if !is_first {
                self.sleep().await?;
            }

            self.check_cancelled()?;

            let status = match self.api.stack_status(stack).await? {
                Some(status) => status,
                None if is_first => return Err(Error::StackNotFound(stack.to_string())),

                // Deleted stacks drop out of the listing once the deletion is done
                None => {
                    log::debug!("Stack {stack} is gone, assuming it has been deleted");
                    break StackStatus::DeleteComplete;
                }
            };

            is_first = false;
            log::debug!("Polled stack {stack}: {status}");
            sink.polling(&status);

            self.check_cancelled()?;
            let mut events = self.api.stack_events(stack).await?;

            // The API lists the newest events first
            events.reverse();

            for event in events {
                if seen.insert(event.id.clone()) {
                    sink.event(&event);
                }
            }

            if status.is_terminal() {
                break status;
            }
        };

        let outcome = Outcome::of(&status);
        sink.finished(&status, outcome);

        let outputs = if status == StackStatus::DeleteComplete {
            BTreeMap::new()
        } else {
            self.check_cancelled()?;
            self.api.stack_outputs(stack).await?
        };

        sink.outputs(&outputs);

        Ok(Observation {
            status,
            outcome,
            outputs,
        })
    }

    async fn sleep(&self) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(self.poll_interval) => Ok(()),
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EventSink, Observer, Outcome};
    use crate::error::Error;
    use crate::stack::testing::{event, FakeApi};
    use crate::stack::{StackEvent, StackStatus};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct Recorder {
        polls: Vec<StackStatus>,
        events: Vec<String>,
        finished: Option<Outcome>,
        log: Vec<&'static str>,
    }

    impl EventSink for Recorder {
        fn polling(&mut self, status: &StackStatus) {
            self.polls.push(status.clone());
            self.log.push("polling");
        }

        fn event(&mut self, event: &StackEvent) {
            self.events.push(event.id.clone());
            self.log.push("event");
        }

        fn finished(&mut self, _status: &StackStatus, outcome: Outcome) {
            self.finished = Some(outcome);
            self.log.push("finished");
        }

        fn outputs(&mut self, _outputs: &BTreeMap<String, String>) {
            self.log.push("outputs");
        }
    }

    const INTERVAL: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn polls_until_complete() {
        let api = FakeApi::new("app")
            .with_statuses(&["CREATE_IN_PROGRESS", "CREATE_IN_PROGRESS", "CREATE_COMPLETE"])
            .with_output("Url", "https://example.com");

        let mut recorder = Recorder::default();
        let start = Instant::now();

        let observation = Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut recorder)
            .await
            .unwrap();

        assert_eq!(api.calls("stack_status"), 3);
        assert_eq!(recorder.polls.len(), 3);
        assert!(start.elapsed() >= INTERVAL * 2);
        assert!(start.elapsed() < INTERVAL * 3);

        assert_eq!(observation.status, StackStatus::CreateComplete);
        assert_eq!(observation.outcome, Outcome::Success);
        assert_eq!(observation.outputs["Url"], "https://example.com");
        assert_eq!(recorder.finished, Some(Outcome::Success));
        assert_eq!(recorder.log.last(), Some(&"outputs"));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_failure() {
        let api = FakeApi::new("app").with_statuses(&[
            "CREATE_IN_PROGRESS",
            "CREATE_IN_PROGRESS",
            "CREATE_FAILED",
        ]);

        let mut recorder = Recorder::default();

        let observation = Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut recorder)
            .await
            .unwrap();

        assert_eq!(observation.status, StackStatus::CreateFailed);
        assert_eq!(observation.outcome, Outcome::Failure);
        assert_eq!(recorder.finished, Some(Outcome::Failure));
        assert_eq!(api.calls("stack_status"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_status_on_first_poll_does_not_sleep() {
        let api = FakeApi::new("app").with_statuses(&["UPDATE_COMPLETE"]);
        let start = Instant::now();

        Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut Recorder::default())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(api.calls("stack_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_each_event_once_oldest_first() {
        // Newest first, as the API lists them
        let first = vec![event("2", "CREATE_IN_PROGRESS", 2), event("1", "CREATE_IN_PROGRESS", 1)];

        // Reordered, with an older event only showing up now
        let second = vec![
            event("1", "CREATE_IN_PROGRESS", 1),
            event("4", "CREATE_COMPLETE", 4),
            event("2", "CREATE_IN_PROGRESS", 2),
            event("3", "CREATE_COMPLETE", 3),
        ];

        let api = FakeApi::new("app")
            .with_statuses(&["CREATE_IN_PROGRESS", "CREATE_COMPLETE"])
            .with_events(vec![first, second]);

        let mut recorder = Recorder::default();

        Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.events, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_stack() {
        let api = FakeApi::new("other");

        let result = Observer::new(&api)
            .observe("app", &mut Recorder::default())
            .await;

        assert!(matches!(result, Err(Error::StackNotFound(ref name)) if name == "app"));
        assert_eq!(api.calls("stack_events"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stack_disappearing_means_deleted() {
        let api = FakeApi::new("app")
            .with_statuses(&["DELETE_IN_PROGRESS"])
            .then_gone();

        let mut recorder = Recorder::default();

        let observation = Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut recorder)
            .await
            .unwrap();

        assert_eq!(observation.status, StackStatus::DeleteComplete);
        assert_eq!(observation.outcome, Outcome::Success);
        assert!(observation.outputs.is_empty());
        assert_eq!(api.calls("stack_events"), 1);
        assert_eq!(api.calls("stack_outputs"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn api_errors_abort_the_loop() {
        let api = FakeApi::new("app")
            .with_statuses(&["CREATE_IN_PROGRESS"])
            .failing("stack_events");

        let result = Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .observe("app", &mut Recorder::default())
            .await;

        assert!(matches!(result, Err(Error::Api(_))));
        assert_eq!(api.calls("stack_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_first_poll() {
        let api = FakeApi::new("app").with_statuses(&["CREATE_IN_PROGRESS"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = Observer::new(&api)
            .with_cancellation(cancel)
            .observe("app", &mut Recorder::default())
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(api.calls("stack_status"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_while_sleeping() {
        let api = FakeApi::new("app").with_statuses(&["CREATE_IN_PROGRESS"]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        });

        let start = Instant::now();

        let result = Observer::new(&api)
            .with_poll_interval(INTERVAL)
            .with_cancellation(cancel)
            .observe("app", &mut Recorder::default())
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(api.calls("stack_status"), 3);
        assert!(start.elapsed() >= Duration::from_secs(25));
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
