//! The coordinator: the one place where work changes hands.
//!
//! The coordinator runs on the thread that started the render.  It
//! takes one request at a time from the inbox, asks its scheduling
//! policy what to do about it, and answers.  The policy does all of
//! its reading and writing of task records while holding their locks
//! and lets go of every lock before the requester is answered, so a
//! woken worker always finds its record consistent.
//!
//! The lock order is fixed: the requester's record first, then the
//! donor's, then (box mode only) the steal hint.  Workers only ever
//! hold their own record or the steal hint, one at a time, so there is
//! no cycle to deadlock on.

use protocol::{Inbox, StealHint};
use task::{Partition, TaskRecord};

/// Everything the coordinator and the workers share.
#[derive(Debug)]
pub struct Board {
    /// One record per worker, indexed by worker id.
    pub records: Vec<TaskRecord>,
    /// Who last split a box (box mode only).
    pub hint: StealHint,
}

impl Board {
    /// A board with the initial assignment for `workers` workers.
    pub fn new(partition: Partition, workers: usize, resolution: usize) -> Self {
        Board {
            records: (0..workers)
                .map(|id| TaskRecord::initial(id, workers, partition, resolution))
                .collect(),
            hint: StealHint::new(),
        }
    }

    /// A board over records built by hand.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        Board {
            records,
            hint: StealHint::new(),
        }
    }

    /// The record of worker `id`.
    pub fn record(&self, id: usize) -> &TaskRecord {
        &self.records[id]
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for a board without workers.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a policy decided about one request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The requester received part of `donor`'s work.
    Grant {
        /// The worker that gave up work.
        donor: usize,
    },
    /// No work this time; the requester stays idle and may ask again.
    Deny,
    /// The requester has been marked terminated.
    Retire,
}

/// A scheduling policy.  `decide` is called with the requester idle
/// and blocked; it must leave the requester's record busy (on a
/// grant), idle (on a denial) or terminated (on retirement), and must
/// release every lock it took before returning.
pub trait Scheduler {
    /// Serve one request from worker `requester`.
    fn decide(&mut self, board: &Board, requester: usize) -> Decision;
}

/// Counts of the coordinator's decisions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Requests served.
    pub decisions: usize,
    /// Requests answered with new work.
    pub grants: usize,
    /// Requests answered with "try again".
    pub denials: usize,
    /// Workers retired.
    pub retirements: usize,
}

/// The coordinator's loop state.
pub struct Coordinator<'a> {
    board: &'a Board,
    inbox: Inbox,
    live: usize,
    tally: Tally,
}

impl<'a> Coordinator<'a> {
    /// A coordinator over every worker on `board`.
    pub fn new(board: &'a Board, inbox: Inbox) -> Self {
        Coordinator {
            board,
            inbox,
            live: board.len(),
            tally: Tally::default(),
        }
    }

    /// Serve requests until every worker has been retired, then return
    /// what was done.  If every worker hangs up first (a worker
    /// panicked), the loop gives up early.
    pub fn run<S: Scheduler>(mut self, scheduler: &mut S) -> Tally {
        while self.live > 0 {
            let request = match self.inbox.next() {
                Some(request) => request,
                None => {
                    error!(
                        "all workers hung up with {} still unretired",
                        self.live
                    );
                    break;
                }
            };

            let requester = request.worker();
            self.tally.decisions += 1;
            match scheduler.decide(self.board, requester) {
                Decision::Grant { donor } => {
                    self.tally.grants += 1;
                    debug!(
                        "worker {} takes {:?} from worker {}",
                        requester,
                        self.board.record(requester).snapshot().span,
                        donor
                    );
                    request.grant();
                }
                Decision::Deny => {
                    self.tally.denials += 1;
                    debug!("worker {} denied, stays idle", requester);
                    request.deny();
                }
                Decision::Retire => {
                    self.tally.retirements += 1;
                    self.live -= 1;
                    debug!("worker {} retired, {} left", requester, self.live);
                    request.retire();
                }
            }
        }
        self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{rendezvous, Verdict};
    use std::thread;
    use task::Status;

    // Denies the first request from each worker, then retires it.
    struct Grudging {
        seen: Vec<bool>,
    }

    impl Scheduler for Grudging {
        fn decide(&mut self, board: &Board, requester: usize) -> Decision {
            if self.seen[requester] {
                board.record(requester).lock().status = Status::Terminated;
                Decision::Retire
            } else {
                self.seen[requester] = true;
                Decision::Deny
            }
        }
    }

    #[test]
    fn serves_until_everyone_is_retired() {
        let board = Board::new(Partition::Rows, 3, 9);
        let (inbox, desks) = rendezvous(3);
        let askers: Vec<_> = desks
            .into_iter()
            .map(|desk| {
                thread::spawn(move || {
                    let mut heard = vec![desk.request_work()];
                    while heard[heard.len() - 1] != Verdict::Retired {
                        heard.push(desk.request_work());
                    }
                    heard
                })
            })
            .collect();

        let tally = Coordinator::new(&board, inbox).run(&mut Grudging {
            seen: vec![false; 3],
        });
        for asker in askers {
            assert_eq!(
                asker.join().unwrap(),
                vec![Verdict::Denied, Verdict::Retired]
            );
        }
        assert_eq!(
            tally,
            Tally {
                decisions: 6,
                grants: 0,
                denials: 3,
                retirements: 3,
            }
        );
    }

    #[test]
    fn board_has_one_record_per_worker() {
        let board = Board::new(Partition::Boxes, 3, 16);
        assert_eq!(board.len(), 3);
        assert!(!board.is_empty());
        assert!((0..3).all(|id| board.record(id).id == id));
        assert!(Board::from_records(Vec::new()).is_empty());
    }

    #[test]
    fn gives_up_when_every_worker_hangs_up() {
        let board = Board::new(Partition::Rows, 2, 4);
        let (inbox, desks) = rendezvous(2);
        drop(desks);
        let tally = Coordinator::new(&board, inbox).run(&mut Grudging {
            seen: vec![false; 2],
        });
        assert_eq!(tally, Tally::default());
    }
}
