use crate::error::CoreError;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

// one worker drains the channel, so tasks on the same queue run one at a
// time in submission order
pub struct SerialQueue {
    label: &'static str,
    tx: mpsc::UnboundedSender<Job>,
}

impl SerialQueue {
    pub fn new(label: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
            }
        });
        Self { label, tx }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub async fn run<F, T>(&self, task: F) -> Result<T, CoreError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = done_tx.send(task.await);
        });
        self.tx.send(job).map_err(|_| CoreError::QueueClosed)?;
        done_rx.await.map_err(|_| CoreError::QueueClosed)
    }
}
