//! Runtime services and shared state for the kobun-bot.

use std::future::Future;

use tokio_util::task::TaskTracker;
use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, genai::GenAiClient},
};

/// Background task facility with a run-to-completion contract.
///
/// Dispatched event handling goes through this pool rather than bare
/// `tokio::spawn` so the server can drain in-flight work during shutdown
/// instead of dropping it with the process.
#[derive(Clone, Default)]
pub struct TaskPool {
    tracker: TaskTracker,
}

impl TaskPool {
    pub fn new() -> Self {
        Self { tracker: TaskTracker::new() }
    }

    /// Submit one independent unit of background work.
    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of tasks still in flight.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Wait for every in-flight task to finish.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, the generative client, the
/// configuration, and the background task pool. It is designed to be
/// trivially cloneable, allowing it to be passed around without the need
/// for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The generative AI client instance.
    pub genai: GenAiClient,
    /// The background task pool.
    pub tasks: TaskPool,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the chat client.
        let chat = ChatClient::slack(&config)?;

        // Initialize the generative client.
        let genai = GenAiClient::gemini(&config);

        Ok(Self {
            config,
            chat,
            genai,
            tasks: TaskPool::new(),
        })
    }

    /// Serve the webhook endpoints until shutdown.
    pub async fn start(&self) -> Void {
        crate::server::serve(self.clone()).await
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn task_pool_drain_waits_for_submitted_work() {
        let pool = TaskPool::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        pool.submit(async move {
            let _ = tx.send(());
        });

        pool.drain().await;

        assert!(pool.is_empty());
        assert!(rx.await.is_ok());
    }
}
