//! Execution contexts for delivering asynchronous results.
//!
//! [`Timetable::schedule_in`](crate::Timetable::schedule_in) computes on a
//! rayon worker and then hands its completion to a [`Dispatch`] chosen by the
//! caller. A `rayon::ThreadPool` runs completions on its own workers; a
//! [`JobQueue`] runs them on whichever thread drains its [`JobRunner`], which
//! is how a caller gets results back onto a thread it owns.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// A unit of work handed to a dispatch context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere a job can be sent to run.
pub trait Dispatch: Send + Sync {
    /// Schedule `job` to run on this context. Each job runs at most once.
    fn dispatch(&self, job: Job);
}

impl Dispatch for rayon::ThreadPool {
    fn dispatch(&self, job: Job) {
        self.spawn(job);
    }
}

/// Sending half of a serial job queue.
///
/// Jobs run in submission order on the thread that drains the paired
/// [`JobRunner`]. Jobs sent after the runner is dropped are discarded.
#[derive(Clone, Debug)]
pub struct JobQueue {
    sender: Sender<Job>,
}

/// Draining half of a [`JobQueue`].
pub struct JobRunner {
    receiver: Receiver<Job>,
}

impl JobQueue {
    /// Create a queue and the runner that executes its jobs.
    pub fn channel() -> (JobQueue, JobRunner) {
        let (sender, receiver) = mpsc::channel();
        (JobQueue { sender }, JobRunner { receiver })
    }
}

impl Dispatch for JobQueue {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            log::warn!("job queue runner dropped; discarding job");
        }
    }
}

impl JobRunner {
    /// Run every job already queued without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Block until one job arrives and run it.
    ///
    /// Returns `false` once every [`JobQueue`] handle has been dropped and the
    /// queue is drained.
    pub fn run_next(&self) -> bool {
        match self.receiver.recv() {
            Ok(job) => {
                job();
                true
            }
            Err(_) => false,
        }
    }

    /// Like [`JobRunner::run_next`], giving up after `timeout`.
    pub fn run_next_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::reference_instant;
    use crate::error::TimetableError;
    use crate::interval::DateInterval;
    use crate::timetable::Timetable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn range(start_secs: i64, end_secs: i64) -> DateInterval {
        let reference = reference_instant();
        DateInterval::new(
            reference + chrono::Duration::seconds(start_secs),
            reference + chrono::Duration::seconds(end_secs),
        )
        .unwrap()
    }

    #[test]
    fn test_job_queue_runs_in_order_on_drain() {
        let (queue, runner) = JobQueue::channel();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = Arc::clone(&seen);
            queue.dispatch(Box::new(move || seen.lock().unwrap().push(i)));
        }
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(runner.run_pending(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(runner.run_pending(), 0);
    }

    #[test]
    fn test_runner_stops_when_queue_dropped() {
        let (queue, runner) = JobQueue::channel();
        drop(queue);
        assert!(!runner.run_next());
        assert!(!runner.run_next_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_dispatch_after_runner_dropped_is_discarded() {
        let (queue, runner) = JobQueue::channel();
        drop(runner);
        queue.dispatch(Box::new(|| panic!("must not run")));
    }

    #[test]
    fn test_schedule_in_delivers_on_queue_thread() {
        let timetable = Timetable::new(3_600.0, 900.0).unwrap();
        let (queue, runner) = JobQueue::channel();
        let (tx, rx) = mpsc::channel();

        let queue: Arc<dyn Dispatch> = Arc::new(queue);
        timetable.schedule_in(range(0, 7_200), Some(queue), move |result| {
            tx.send((result, thread::current().id())).unwrap();
        });

        assert!(runner.run_next_timeout(TIMEOUT));
        let (result, delivered_on) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(delivered_on, thread::current().id());
        assert_eq!(result, Ok(vec![range(0, 900), range(3_600, 4_500)]));
    }

    #[test]
    fn test_schedule_in_without_queue_runs_off_caller_thread() {
        let timetable = Timetable::new(60.0, 30.0).unwrap();
        let (tx, rx) = mpsc::channel();
        let expected = timetable.elements_in(&range(-600, 600)).unwrap();

        timetable.schedule_in(range(-600, 600), None, move |result| {
            tx.send((result, thread::current().id())).unwrap();
        });

        let (result, delivered_on) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_ne!(delivered_on, thread::current().id());
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_schedule_in_delivers_exactly_once() {
        let timetable = Timetable::empty();
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<Result<Vec<DateInterval>, TimetableError>>();

        let counter = Arc::clone(&calls);
        timetable.schedule_in(range(0, 10), None, move |result| {
            counter.fetch_add(1, Ordering::SeqCst);
            tx.send(result).unwrap();
        });

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Ok(vec![]));
        // The sender moved into the completion is gone once it has run.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_pool_dispatch() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|_| "delivery".to_string())
            .build()
            .unwrap();
        let pool: Arc<dyn Dispatch> = Arc::new(pool);
        let timetable = Timetable::new(10.0, 10.0).unwrap();
        let (tx, rx) = mpsc::channel();

        timetable.schedule_in(range(0, 30), Some(pool), move |result| {
            let name = thread::current().name().map(str::to_string);
            tx.send((result, name)).unwrap();
        });

        let (result, name) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(name.as_deref(), Some("delivery"));
        assert_eq!(result.unwrap().len(), 3);
    }
}
