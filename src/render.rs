//! The launcher: set up the grid, start the workers, run the
//! coordinator on the calling thread, and collect the result once
//! every thread has been joined.

use std::sync::Arc;
use std::time::{Duration, Instant};

use boxes::BoxScheduler;
use config::{Policy, RenderConfig};
use coordinator::{Board, Coordinator, Tally};
use error::RenderError;
use fallback;
use grid::EscapeGrid;
use kernel::EscapeKernel;
use protocol::rendezvous;
use range::RangeScheduler;
use task::Partition;
use worker::{Canvas, Worker};

/// How a render went.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// The policy that produced the image.
    pub policy: Policy,
    /// The coordinator's decisions; all zero for uncoordinated
    /// policies.
    pub tally: Tally,
    /// How many times a worker announced freshly split boxes.
    pub announcements: u64,
    /// Wall-clock time from the first thread started to the last
    /// joined.
    pub elapsed: Duration,
}

/// A finished image and how it was made.
#[derive(Debug)]
pub struct Rendering {
    /// The escape counts.
    pub grid: EscapeGrid,
    /// What it took.
    pub report: Report,
}

/// Render the Mandelbrot set described by the configuration.
pub fn render_mandelbrot(config: &RenderConfig) -> Result<Rendering, RenderError> {
    render(config, &config.kernel())
}

/// Render the configured region with an arbitrary kernel.  The
/// configuration is checked before any thread starts; nothing is
/// returned unless every pixel was written.
pub fn render<K: EscapeKernel>(config: &RenderConfig, kernel: &K) -> Result<Rendering, RenderError> {
    config.validate()?;
    let plane = config.plane_mapper()?;
    let grid = EscapeGrid::new(config.resolution);

    info!(
        "rendering {}x{} with policy {} on {} workers",
        config.resolution, config.resolution, config.policy, config.workers
    );
    let started = Instant::now();
    let (tally, announcements) = {
        let canvas = Canvas::new(&plane, kernel, &grid);
        match config.policy {
            Policy::Sequential => {
                fallback::sweep(canvas);
                (Tally::default(), 0)
            }
            Policy::ParallelLoop => {
                fallback::parallel_sweep(canvas, config.workers)?;
                (Tally::default(), 0)
            }
            Policy::FlatRange => coordinated(config, canvas, Partition::Rows)?,
            Policy::Quadtree => coordinated(config, canvas, Partition::Boxes)?,
        }
    };
    let report = Report {
        policy: config.policy,
        tally,
        announcements,
        elapsed: started.elapsed(),
    };
    info!("finished in {:?}: {:?}", report.elapsed, report.tally);

    Ok(Rendering { grid, report })
}

// Start one worker per record and run the coordinator here until all
// of them are retired.  The scope joins every worker before returning.
fn coordinated<K: EscapeKernel>(
    config: &RenderConfig,
    canvas: Canvas<K>,
    partition: Partition,
) -> Result<(Tally, u64), RenderError> {
    let board = Arc::new(Board::new(partition, config.workers, config.resolution));
    let (inbox, desks) = rendezvous(config.workers);
    let min_box_area = config.min_box_area;

    let tally = crossbeam::scope(|spawner| {
        for desk in desks {
            let worker = Worker::new(board.clone(), desk, canvas, min_box_area);
            spawner.spawn(move |_| worker.run());
        }

        let coordinator = Coordinator::new(&board, inbox);
        match partition {
            Partition::Rows => coordinator.run(&mut RangeScheduler::new()),
            Partition::Boxes => coordinator.run(&mut BoxScheduler::new(config.steal_timeout)),
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)?;

    if tally.retirements < config.workers {
        return Err(RenderError::WorkerPanicked);
    }
    Ok((tally, board.hint.announcements()))
}
