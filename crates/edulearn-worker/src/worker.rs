use crate::error::TaskError;
use crate::queue::TaskQueue;
use crate::task::Task;
use edulearn_core::ai::embedding::{update_all_embeddings, update_course_embedding, update_user_embedding};
use edulearn_core::ai::grading::grade_essay_response;
use edulearn_core::llm_config::LlmConfig;
use sea_orm::DatabaseConnection;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::instrument;

pub struct Worker {
    conn: DatabaseConnection,
    llm_config: Arc<LlmConfig>,
}

impl Worker {
    #[must_use]
    pub fn new(conn: DatabaseConnection, llm_config: Arc<LlmConfig>) -> Self {
        Self { conn, llm_config }
    }

    #[instrument(skip_all, fields(%task))]
    pub async fn handle(&self, task: Task) -> Result<(), TaskError> {
        match task {
            Task::GradeEssayResponse(response_id) => {
                grade_essay_response(&self.conn, &self.llm_config, response_id).await?;
            }
            Task::UpdateUserEmbedding(user_id) => {
                update_user_embedding(&self.conn, &self.llm_config, user_id).await?;
            }
            Task::UpdateCourseEmbedding(course_id) => {
                update_course_embedding(&self.conn, &self.llm_config, course_id).await?;
            }
            Task::UpdateAllEmbeddings => {
                update_all_embeddings(&self.conn, &self.llm_config).await?;
            }
        }
        Ok(())
    }

    /// Drains the queue one task at a time until every sender is dropped.
    pub async fn run(self, mut receiver: UnboundedReceiver<Task>) {
        tracing::info!("task worker started");
        while let Some(task) = receiver.recv().await {
            if let Err(error) = self.handle(task).await {
                tracing::error!(error = &error as &dyn Error, %task, "task failed");
            }
        }
        tracing::info!("task worker stopped");
    }
}

/// Enqueues a full embedding refresh every `period`.
pub async fn refresh_periodically(queue: TaskQueue, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        queue.enqueue(Task::UpdateAllEmbeddings);
    }
}

/// Starts the worker on the current runtime and returns the queue feeding it.
pub fn spawn(
    conn: DatabaseConnection,
    llm_config: Arc<LlmConfig>,
    refresh_interval: Option<Duration>,
) -> (TaskQueue, JoinHandle<()>) {
    let (queue, receiver) = TaskQueue::new();
    let handle = tokio::spawn(Worker::new(conn, llm_config).run(receiver));
    if let Some(period) = refresh_interval.filter(|period| !period.is_zero()) {
        tracing::info!(seconds = period.as_secs(), "scheduling periodic embedding refresh");
        tokio::spawn(refresh_periodically(queue.clone(), period));
    }
    (queue, handle)
}
