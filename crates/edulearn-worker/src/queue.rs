use crate::task::Task;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Fire and forget handle for scheduling tasks.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: UnboundedSender<Task>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<Task>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Schedules `task`. A stopped worker only produces a log entry.
    pub fn enqueue(&self, task: Task) {
        match self.sender.send(task) {
            Ok(()) => tracing::debug!(%task, "task enqueued"),
            Err(error) => tracing::error!(task = %error.0, "worker is gone, dropping task"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_enqueue_keeps_order_without_dedup() {
        let (queue, mut receiver) = TaskQueue::new();
        let user_id = Uuid::new_v4();
        queue.enqueue(Task::UpdateUserEmbedding(user_id));
        queue.enqueue(Task::UpdateUserEmbedding(user_id));
        queue.enqueue(Task::UpdateAllEmbeddings);

        assert_eq!(receiver.try_recv().unwrap(), Task::UpdateUserEmbedding(user_id));
        assert_eq!(receiver.try_recv().unwrap(), Task::UpdateUserEmbedding(user_id));
        assert_eq!(receiver.try_recv().unwrap(), Task::UpdateAllEmbeddings);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_enqueue_after_shutdown_does_not_panic() {
        let (queue, receiver) = TaskQueue::new();
        drop(receiver);
        queue.enqueue(Task::UpdateAllEmbeddings);
    }
}
