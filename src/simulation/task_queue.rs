//! FIFO of deferred work for cooperative scheduling.
//!
//! A batch that wants to run again "as soon as possible" pushes its continuation here and
//! returns; the host drains the queue between frames. This keeps every batch on a flat loop
//! instead of nesting calls, however many thousands of batches a search needs.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    tasks: VecDeque<T>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        TaskQueue {
            tasks: VecDeque::new(),
        }
    }

    /// Append a task behind every pending one.
    pub fn schedule(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    /// Take the oldest pending task.
    pub fn next_task(&mut self) -> Option<T> {
        self.tasks.pop_front()
    }

    /// Drop pending tasks matching `pred`, returning how many were removed.
    pub fn cancel_where<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !pred(t));
        before - self.tasks.len()
    }

    pub fn contains_where<F: FnMut(&T) -> bool>(&self, pred: F) -> bool {
        self.tasks.iter().any(pred)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
