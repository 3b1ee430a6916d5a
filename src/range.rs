//! Row-range bisection.
//!
//! Every worker starts with an equal band of rows.  When one runs
//! dry, the coordinator walks the other workers round-robin, starting
//! just after the requester, and gives the requester the back half of
//! the first busy band with more than one row left.  If the walk comes
//! back around without finding one, there is nothing left worth
//! sharing and the requester is retired.

use coordinator::{Board, Decision, Scheduler};
use task::Status;

/// The row-range policy.  It keeps no state of its own.
#[derive(Debug, Default)]
pub struct RangeScheduler;

impl RangeScheduler {
    /// Constructor.
    pub fn new() -> Self {
        RangeScheduler
    }
}

impl Scheduler for RangeScheduler {
    fn decide(&mut self, board: &Board, requester: usize) -> Decision {
        let mut mine = board.record(requester).lock();
        debug_assert!(mine.status != Status::Busy);

        let workers = board.len();
        let mut idle = 1;
        for step in 1..workers {
            let candidate = (requester + step) % workers;
            let mut donor = board.record(candidate).lock();
            match donor.status {
                Status::Busy => {
                    if donor.donate_to(&mut mine) {
                        return Decision::Grant { donor: candidate };
                    }
                    trace!("worker {} is on its last row", candidate);
                }
                Status::Idle => idle += 1,
                Status::Terminated => {}
            }
        }

        trace!("no rows to share; {} workers idle", idle);
        mine.status = Status::Terminated;
        Decision::Retire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator::Coordinator;
    use protocol::{rendezvous, Verdict};
    use std::thread;
    use task::{Partition, Span, TaskRecord};

    fn board(spans: &[Span]) -> Board {
        Board::from_records(
            spans
                .iter()
                .enumerate()
                .map(|(id, span)| TaskRecord::new(id, Partition::Rows, 0..8, *span))
                .collect(),
        )
    }

    #[test]
    fn two_workers_start_with_halves() {
        let board = Board::new(Partition::Rows, 2, 8);
        assert_eq!(board.record(0).snapshot().span, Span::new(0, 4));
        assert_eq!(board.record(1).snapshot().span, Span::new(4, 8));
    }

    #[test]
    fn idle_worker_takes_back_half_of_busy_neighbour() {
        // Worker 0 has finished, worker 1 is still on row 5 of 4..8.
        let board = board(&[Span::new(4, 4), Span::new(5, 8)]);
        let decision = RangeScheduler::new().decide(&board, 0);
        assert_eq!(decision, Decision::Grant { donor: 1 });
        assert_eq!(board.record(0).snapshot().span, Span::new(6, 8));
        assert_eq!(board.record(1).snapshot().span, Span::new(5, 6));
        assert_eq!(board.record(0).status(), Status::Busy);
        assert_eq!(board.record(1).status(), Status::Busy);
    }

    #[test]
    fn last_row_is_never_split() {
        let board = board(&[Span::new(4, 4), Span::new(7, 8)]);
        let decision = RangeScheduler::new().decide(&board, 0);
        assert_eq!(decision, Decision::Retire);
        assert_eq!(board.record(0).status(), Status::Terminated);
        assert_eq!(board.record(1).snapshot().span, Span::new(7, 8));
    }

    #[test]
    fn scan_starts_after_requester() {
        let board = board(&[
            Span::new(0, 6),
            Span::new(6, 6),
            Span::new(6, 6),
            Span::new(20, 30),
        ]);
        let decision = RangeScheduler::new().decide(&board, 1);
        assert_eq!(decision, Decision::Grant { donor: 3 });
        assert_eq!(board.record(1).snapshot().span, Span::new(25, 30));
        assert_eq!(board.record(0).snapshot().span, Span::new(0, 6));
    }

    #[test]
    fn scan_wraps_around_and_skips_the_retired() {
        let board = board(&[Span::new(0, 4), Span::new(4, 4), Span::new(8, 8)]);
        board.record(2).lock().status = Status::Terminated;
        let decision = RangeScheduler::new().decide(&board, 1);
        assert_eq!(decision, Decision::Grant { donor: 0 });
        assert_eq!(board.record(1).snapshot().span, Span::new(2, 4));
    }

    #[test]
    fn lone_worker_is_retired() {
        let board = board(&[Span::new(3, 3)]);
        assert_eq!(RangeScheduler::new().decide(&board, 0), Decision::Retire);
    }

    #[test]
    fn coordinator_retires_everyone_once() {
        let board = board(&[Span::new(0, 0), Span::new(0, 0), Span::new(0, 0)]);
        let (inbox, desks) = rendezvous(3);
        let askers: Vec<_> = desks
            .into_iter()
            .map(|desk| thread::spawn(move || desk.request_work()))
            .collect();
        let tally = Coordinator::new(&board, inbox).run(&mut RangeScheduler::new());
        for asker in askers {
            assert_eq!(asker.join().unwrap(), Verdict::Retired);
        }
        assert_eq!(tally.decisions, 3);
        assert_eq!(tally.retirements, 3);
        assert_eq!(tally.grants, 0);
        assert!(board
            .records
            .iter()
            .all(|record| record.status() == Status::Terminated));
    }
}
