//! The per-worker task record.
//!
//! A task record is the only state the coordinator and a worker both
//! touch.  The worker advances the low end of its span as it finishes
//! units of work; the coordinator may cut off the high end to feed an
//! idle worker.  Both do so only while holding the record's lock, and
//! the worker never holds it while computing, so the coordinator can
//! always get in between two units.
//!
//! The low end of a busy worker's span is the unit it is working on
//! right now.  Splitting always leaves at least that unit with its
//! owner, which is what keeps every pixel owned by exactly one worker.

use std::ops::Range;
use std::sync::{Mutex, MutexGuard};

/// Where a worker is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// No work; the worker will ask for more.
    Idle,
    /// The worker is consuming its span.
    Busy,
    /// The worker will never run again.
    Terminated,
}

/// What the indices in a span refer to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Partition {
    /// Pixel rows.
    Rows,
    /// Quadtree box indices.
    Boxes,
}

/// A half-open range of work units, `lo..hi`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// First unit still owned.
    pub lo: usize,
    /// One past the last unit owned.
    pub hi: usize,
}

impl Span {
    /// Constructor.
    pub fn new(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi);
        Span { lo, hi }
    }

    /// An empty span.
    pub fn empty() -> Self {
        Span { lo: 0, hi: 0 }
    }

    /// How many units remain.
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// True when no units remain.
    pub fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    /// Cut the back half off this span and return it.  This span keeps
    /// `lo..mid` and the caller gets `mid..hi`, with
    /// `mid = lo + (hi - lo) / 2`.  A span of one unit cannot be split.
    pub fn split_back(&mut self) -> Option<Span> {
        if self.len() <= 1 {
            return None;
        }
        let mid = self.lo + self.len() / 2;
        let back = Span::new(mid, self.hi);
        self.hi = mid;
        Some(back)
    }

    /// The units as a range.
    pub fn range(&self) -> Range<usize> {
        self.lo..self.hi
    }
}

/// The mutable part of a task record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// The worker's state.
    pub status: Status,
    /// The work the worker owns.
    pub span: Span,
}

impl Assignment {
    /// An assignment whose status matches its span.
    pub fn new(span: Span) -> Self {
        let mut assignment = Assignment {
            status: Status::Idle,
            span,
        };
        assignment.settle();
        assignment
    }

    /// Make the status agree with the span: busy with work, idle
    /// without.  A terminated worker stays terminated.
    pub fn settle(&mut self) {
        if self.status == Status::Terminated {
            return;
        }
        self.status = if self.span.is_empty() {
            Status::Idle
        } else {
            Status::Busy
        };
    }

    /// If this assignment can spare work, move the back half of it into
    /// `requester` and settle both.  Only a busy worker with more than
    /// one unit left can donate.
    pub fn donate_to(&mut self, requester: &mut Assignment) -> bool {
        if self.status != Status::Busy {
            return false;
        }
        match self.span.split_back() {
            Some(back) => {
                requester.span = back;
                requester.settle();
                self.settle();
                true
            }
            None => false,
        }
    }
}

/// One worker's task record.
#[derive(Debug)]
pub struct TaskRecord {
    /// The worker's stable identity, 0..N.
    pub id: usize,
    /// Whether the span counts rows or boxes.
    pub partition: Partition,
    /// The pixel columns every row covers in row mode.
    pub columns: Range<usize>,
    slot: Mutex<Assignment>,
}

impl TaskRecord {
    /// A record that starts out owning `span`.
    pub fn new(id: usize, partition: Partition, columns: Range<usize>, span: Span) -> Self {
        TaskRecord {
            id,
            partition,
            columns,
            slot: Mutex::new(Assignment::new(span)),
        }
    }

    /// The record of worker `id` out of `workers`, covering a square grid
    /// of `resolution` pixels per side.  In row mode each worker gets
    /// an equal share of the rows and the last one picks up the
    /// remainder; in box mode worker 0 owns the root box and everybody
    /// else starts empty-handed.
    pub fn initial(id: usize, workers: usize, partition: Partition, resolution: usize) -> Self {
        let span = match partition {
            Partition::Rows => {
                let share = resolution / workers;
                let hi = if id + 1 == workers {
                    resolution
                } else {
                    (id + 1) * share
                };
                Span::new(id * share, hi)
            }
            Partition::Boxes if id == 0 => Span::new(0, 1),
            Partition::Boxes => Span::empty(),
        };
        TaskRecord::new(id, partition, 0..resolution, span)
    }

    /// Take the record's lock.  A poisoned lock means some thread
    /// panicked mid-update; that is logged and the guard recovered,
    /// but nothing promises the render will finish.
    pub fn lock(&self) -> MutexGuard<Assignment> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            error!("task record {} lock poisoned; continuing", self.id);
            poisoned.into_inner()
        })
    }

    /// A snapshot of the worker's status.
    pub fn status(&self) -> Status {
        self.lock().status
    }

    /// A snapshot of the whole assignment.
    pub fn snapshot(&self) -> Assignment {
        *self.lock()
    }
}
