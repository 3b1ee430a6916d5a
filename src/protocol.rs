//! The handshake between idle workers and the coordinator.
//!
//! An idle worker hands a `Request` across a zero-capacity channel and
//! then blocks on a private one-shot reply channel.  Because the
//! request channel has no buffer, a send completes only when the
//! coordinator takes the request, and the coordinator takes the next
//! request only after it has answered the current one; so there is
//! never more than one requester, and no wakeup can be missed.
//!
//! The `StealHint` is the other, looser, channel: workers that have
//! just split a box publish their id there so the coordinator knows
//! whom to rob.  Several workers may overwrite each other before the
//! coordinator looks; a stale id only costs a missed steal.

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// The coordinator's answer to a request for work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The requester's task record now holds new work.
    Granted,
    /// Nothing could be found this time; ask again.
    Denied,
    /// No more work will ever come.  The worker must exit.
    Retired,
}

/// A pending request for work, owned by the coordinator until it is
/// answered.  Answering consumes it, so every request is answered at
/// most once.
#[derive(Debug)]
pub struct Request {
    worker: usize,
    reply: Sender<Verdict>,
}

impl Request {
    /// The id of the requesting worker.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Tell the requester its record has new work.
    pub fn grant(self) {
        self.answer(Verdict::Granted)
    }

    /// Tell the requester to try again.
    pub fn deny(self) {
        self.answer(Verdict::Denied)
    }

    /// Tell the requester to exit.
    pub fn retire(self) {
        self.answer(Verdict::Retired)
    }

    /// Send a verdict back to the requester.
    pub fn answer(self, verdict: Verdict) {
        if self.reply.send(verdict).is_err() {
            warn!("worker {} hung up before hearing {:?}", self.worker, verdict);
        }
    }
}

/// The coordinator's end of the request channel.
#[derive(Debug)]
pub struct Inbox {
    requests: Receiver<Request>,
}

impl Inbox {
    /// Block until some worker asks for work.  `None` means every
    /// worker has hung up.
    pub fn next(&self) -> Option<Request> {
        self.requests.recv().ok()
    }
}

/// A worker's end of the request channel.
#[derive(Debug)]
pub struct Desk {
    worker: usize,
    requests: Sender<Request>,
}

impl Desk {
    /// The worker this desk belongs to.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Ask the coordinator for work and wait for the verdict.  The
    /// caller must not hold its task record's lock.  If the
    /// coordinator is gone there is nobody left to hand out work, so
    /// the worker retires.
    pub fn request_work(&self) -> Verdict {
        let (reply, verdict) = channel::bounded(1);
        let request = Request {
            worker: self.worker,
            reply,
        };
        if self.requests.send(request).is_err() {
            error!("worker {}: coordinator is gone, retiring", self.worker);
            return Verdict::Retired;
        }
        match verdict.recv() {
            Ok(verdict) => verdict,
            Err(_) => {
                error!("worker {}: request dropped unanswered, retiring", self.worker);
                Verdict::Retired
            }
        }
    }
}

/// Open the request channel for `workers` workers.  Desk `i` belongs
/// to worker `i`.  The inbox reports hang-up once every desk is
/// dropped.
pub fn rendezvous(workers: usize) -> (Inbox, Vec<Desk>) {
    let (requests, inbox) = channel::bounded(0);
    let desks = (0..workers)
        .map(|worker| Desk {
            worker,
            requests: requests.clone(),
        })
        .collect();
    (Inbox { requests: inbox }, desks)
}

/// What the coordinator saw while waiting for a box announcement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sighting {
    /// Nobody announced anything in time.
    TimedOut,
    /// Something woke us, but no worker has ever announced.
    Anonymous,
    /// The most recent announcer.
    From(usize),
}

#[derive(Debug, Default)]
struct Billboard {
    announcer: Option<usize>,
    announcements: u64,
}

/// Best-effort record of which worker most recently split a box.
#[derive(Debug, Default)]
pub struct StealHint {
    board: Mutex<Billboard>,
    announced: Condvar,
}

impl StealHint {
    /// A hint nobody has written to.
    pub fn new() -> Self {
        StealHint::default()
    }

    fn lock(&self) -> MutexGuard<Billboard> {
        self.board.lock().unwrap_or_else(|poisoned| {
            error!("steal hint lock poisoned; continuing");
            poisoned.into_inner()
        })
    }

    /// Publish `worker` as having fresh boxes to steal.
    pub fn announce(&self, worker: usize) {
        {
            let mut board = self.lock();
            board.announcer = Some(worker);
            board.announcements += 1;
        }
        self.announced.notify_one();
    }

    /// How many announcements have been made so far.
    pub fn announcements(&self) -> u64 {
        self.lock().announcements
    }

    /// Wait up to `timeout` for an announcement made after this call
    /// began, and report who made the latest one.  Announcements made
    /// while nobody was waiting do not count.
    pub fn await_announcement(&self, timeout: Duration) -> Sighting {
        let board = self.lock();
        let seen = board.announcements;
        let (board, waited) = self
            .announced
            .wait_timeout_while(board, timeout, |board| board.announcements == seen)
            .unwrap_or_else(|poisoned| {
                error!("steal hint lock poisoned while waiting; continuing");
                poisoned.into_inner()
            });
        if waited.timed_out() {
            return Sighting::TimedOut;
        }
        match board.announcer {
            Some(worker) => Sighting::From(worker),
            None => Sighting::Anonymous,
        }
    }
}
