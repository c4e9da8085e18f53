//! Outbound mail jobs. Handlers enqueue a [`MailJob`] on the `mail` topic and
//! a [`MailWorker`] drains it through a [`Mailer`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::message_queue::{Message, MessageQueue, MessageQueueError};

pub const MAIL_TOPIC: &str = "mail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MailKind {
    Login,
    Signup,
    ForgotPassword,
}

/// Queue payload: `{ "kind": ..., "email": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailJob {
    pub kind: MailKind,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Queue error: {0}")]
    Queue(#[from] MessageQueueError),
    #[error("Malformed mail job: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Enqueues mail jobs.
#[derive(Clone)]
pub struct MailDispatcher {
    queue: Arc<dyn MessageQueue>,
}

impl MailDispatcher {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        Self { queue }
    }

    #[instrument(skip(self, email))]
    pub async fn dispatch(&self, kind: MailKind, email: &str) -> Result<(), MailError> {
        let job = MailJob {
            kind,
            email: email.to_string(),
        };
        self.queue
            .publish(Message::new(MAIL_TOPIC, serde_json::to_value(&job)?))
            .await?;
        metrics::counter!("mfg_mail.jobs_enqueued", 1);
        Ok(())
    }

    /// Enqueues without failing the caller. Mail is best effort for auth flows.
    pub async fn dispatch_or_log(&self, kind: MailKind, email: &str) {
        if let Err(e) = self.dispatch(kind, email).await {
            warn!(%kind, error = %e, "mail job could not be enqueued");
        }
    }
}

/// Delivers a mail job.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, job: &MailJob) -> Result<(), MailError>;
}

/// Mailer that only records deliveries in the log.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, job: &MailJob) -> Result<(), MailError> {
        info!(kind = %job.kind, email = %job.email, "mail delivered");
        Ok(())
    }
}

/// Polls the mail topic and hands jobs to a [`Mailer`].
pub struct MailWorker {
    queue: Arc<dyn MessageQueue>,
    mailer: Arc<dyn Mailer>,
    idle_interval: Duration,
}

impl MailWorker {
    pub fn new(queue: Arc<dyn MessageQueue>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            queue,
            mailer,
            idle_interval: Duration::from_millis(500),
        }
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    /// Processes at most one job. Returns whether a job was taken.
    pub async fn run_once(&self) -> Result<bool, MailError> {
        let Some(message) = self.queue.subscribe(MAIL_TOPIC).await? else {
            return Ok(false);
        };

        let job: MailJob = match serde_json::from_value(message.payload.clone()) {
            Ok(job) => job,
            Err(e) => {
                // unparseable payloads are never going to succeed
                error!(id = %message.id, error = %e, "dropping malformed mail job");
                self.queue.ack(&message.id).await?;
                return Ok(true);
            }
        };

        match self.mailer.send(&job).await {
            Ok(()) => {
                self.queue.ack(&message.id).await?;
                metrics::counter!("mfg_mail.jobs_delivered", 1);
            }
            Err(e) => {
                warn!(id = %message.id, retry = message.retry_count, error = %e, "mail delivery failed");
                self.queue.nack(&message.id).await?;
                metrics::counter!("mfg_mail.jobs_failed", 1);
            }
        }
        Ok(true)
    }

    /// Runs until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("mail worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.run_once().await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => error!(error = %e, "mail worker iteration failed"),
            }
            tokio::select! {
                _ = tokio::time::sleep(self.idle_interval) => {}
                _ = shutdown.changed() => {}
            }
        }
        debug!("mail worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_queue::InMemoryMessageQueue;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlakyMailer {
        failures_left: Mutex<u32>,
        delivered: Mutex<Vec<MailJob>>,
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, job: &MailJob) -> Result<(), MailError> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(MailError::Delivery("smtp down".into()));
            }
            self.delivered.lock().unwrap().push(job.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatched_job_has_kind_and_email() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        let dispatcher = MailDispatcher::new(queue.clone());
        dispatcher
            .dispatch(MailKind::ForgotPassword, "a@example.com")
            .await
            .unwrap();

        let message = queue.subscribe(MAIL_TOPIC).await.unwrap().unwrap();
        assert_eq!(
            message.payload,
            serde_json::json!({"kind": "forgot_password", "email": "a@example.com"})
        );
    }

    #[tokio::test]
    async fn failed_delivery_is_retried() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        let mailer = Arc::new(FlakyMailer {
            failures_left: Mutex::new(1),
            ..Default::default()
        });
        MailDispatcher::new(queue.clone())
            .dispatch(MailKind::Signup, "new@example.com")
            .await
            .unwrap();

        let worker = MailWorker::new(queue.clone(), mailer.clone());
        assert!(worker.run_once().await.unwrap());
        assert!(mailer.delivered.lock().unwrap().is_empty());
        assert!(worker.run_once().await.unwrap());
        assert_eq!(mailer.delivered.lock().unwrap().len(), 1);
        assert!(!worker.run_once().await.unwrap());
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        queue
            .publish(Message::new(MAIL_TOPIC, serde_json::json!({"kind": 7})))
            .await
            .unwrap();
        let worker = MailWorker::new(queue.clone(), Arc::new(LogMailer));
        assert!(worker.run_once().await.unwrap());
        assert_eq!(queue.pending(MAIL_TOPIC), 0);
    }
}
