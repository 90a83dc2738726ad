//! Deferred task scheduling contracts.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// Boxed task run by a [`TaskScheduler`].
pub type DeferredTask = Box<dyn FnOnce()>;

/// Host service for running work after a delay on the UI event loop.
pub trait TaskScheduler {
    /// Schedules `task` to run once after roughly `delay_ms` milliseconds.
    fn schedule(&self, delay_ms: u32, task: DeferredTask);
}

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler that runs every task synchronously, ignoring the delay.
pub struct ImmediateTaskScheduler;

impl TaskScheduler for ImmediateTaskScheduler {
    fn schedule(&self, _delay_ms: u32, task: DeferredTask) {
        task();
    }
}

#[derive(Clone, Default)]
/// Scheduler that queues tasks until [`ManualTaskScheduler::run_pending`] is called.
pub struct ManualTaskScheduler {
    queue: Rc<RefCell<VecDeque<(u32, DeferredTask)>>>,
}

impl ManualTaskScheduler {
    /// Returns the number of queued tasks.
    pub fn pending_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns the requested delays of queued tasks, oldest first.
    pub fn pending_delays(&self) -> Vec<u32> {
        self.queue.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    /// Runs queued tasks in FIFO order, including tasks scheduled while running.
    ///
    /// Returns the number of tasks executed.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs so it can schedule more work.
            let next = self.queue.borrow_mut().pop_front();
            let Some((_, task)) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl TaskScheduler for ManualTaskScheduler {
    fn schedule(&self, delay_ms: u32, task: DeferredTask) {
        self.queue.borrow_mut().push_back((delay_ms, task));
    }
}

impl std::fmt::Debug for ManualTaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTaskScheduler")
            .field("pending", &self.pending_len())
            .finish()
    }
}
