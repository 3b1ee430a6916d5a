//! Quadtree box stealing.
//!
//! In box mode nobody knows in advance where the work is: it appears
//! whenever a worker finds a box whose border is not uniform and
//! splits it into four children.  So instead of scanning, the
//! coordinator waits (briefly) for the next such announcement and
//! robs the announcer of the back half of its box range.
//!
//! A requester that hears nothing within the timeout is retired for
//! good, even though boxes may still be announced later by workers
//! further down their own trees.  That trades some parallelism at the
//! tail of a render for a guaranteed end.

use std::time::Duration;

use coordinator::{Board, Decision, Scheduler};
use protocol::Sighting;
use task::Status;

/// The quadtree policy.
#[derive(Debug)]
pub struct BoxScheduler {
    timeout: Duration,
}

impl BoxScheduler {
    /// A policy that gives up on a requester after `timeout` without
    /// an announcement.
    pub fn new(timeout: Duration) -> Self {
        BoxScheduler { timeout }
    }
}

impl Scheduler for BoxScheduler {
    fn decide(&mut self, board: &Board, requester: usize) -> Decision {
        let mut mine = board.record(requester).lock();
        debug_assert!(mine.status != Status::Busy);

        let announcer = match board.hint.await_announcement(self.timeout) {
            Sighting::TimedOut => {
                mine.status = Status::Terminated;
                return Decision::Retire;
            }
            Sighting::Anonymous => {
                mine.status = Status::Idle;
                return Decision::Deny;
            }
            // Locking our own record a second time would deadlock.
            Sighting::From(announcer) if announcer == requester => {
                mine.status = Status::Idle;
                return Decision::Deny;
            }
            Sighting::From(announcer) => announcer,
        };

        let mut donor = board.record(announcer).lock();
        if donor.donate_to(&mut mine) {
            Decision::Grant { donor: announcer }
        } else {
            trace!(
                "worker {} has nothing to spare: {:?}",
                announcer,
                *donor
            );
            mine.status = Status::Idle;
            Decision::Deny
        }
    }
}
