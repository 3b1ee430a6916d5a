//! The two renderers that need no coordinator: a plain row-major sweep
//! on the calling thread, and a pool of threads that each pull the
//! next unclaimed row from a shared iterator until there are none
//! left.  The second balances load on its own, because a thread only
//! ever holds one row, at the price of a lock per row.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use error::RenderError;
use kernel::EscapeKernel;
use planes::PixelRect;
use worker::Canvas;

/// Compute every pixel, bottom row first, on the calling thread.
pub fn sweep<K: EscapeKernel>(canvas: Canvas<K>) {
    canvas.compute_block(&canvas.plane.full());
}

// Claim the next unclaimed row.  A thread that panicked while holding
// the lock left the counter intact, so the rest carry on.
fn next_row(rows: &Mutex<Range<usize>>) -> Option<usize> {
    rows.lock()
        .unwrap_or_else(|poisoned| {
            error!("row counter lock poisoned; continuing");
            poisoned.into_inner()
        })
        .next()
}

/// Compute every pixel with `threads` threads, handing out one row at a
/// time.
pub fn parallel_sweep<K: EscapeKernel>(canvas: Canvas<K>, threads: usize) -> Result<(), RenderError> {
    let resolution = canvas.plane.resolution;
    let rows = Arc::new(Mutex::new(0..resolution));
    crossbeam::scope(|spawner| {
        for _ in 0..threads {
            let rows = rows.clone();
            spawner.spawn(move |_| loop {
                match next_row(&rows) {
                    Some(row) => canvas.compute_block(&PixelRect {
                        columns: 0..resolution,
                        rows: row..row + 1,
                    }),
                    None => {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid::EscapeGrid;
    use kernel::Mandelbrot;
    use planes::{ComplexPlane, Pixel, PlaneMapper};

    #[test]
    fn sweep_matches_pointwise_evaluation() {
        let plane = PlaneMapper::new(9, ComplexPlane::new(-2.0, 1.0, -1.5, 1.5)).unwrap();
        let kernel = Mandelbrot::new(50, 2.0);
        let grid = EscapeGrid::new(9);
        sweep(Canvas::new(&plane, &kernel, &grid));
        for (y, x) in iproduct!(0..9, 0..9) {
            let pixel = Pixel(x, y);
            assert_eq!(grid.get(&pixel), kernel.escape(plane.pixel_to_point(&pixel)));
        }
    }

    #[test]
    fn parallel_sweep_matches_sweep() {
        let plane = PlaneMapper::new(33, ComplexPlane::new(-2.0, 1.0, -1.5, 1.5)).unwrap();
        let kernel = Mandelbrot::new(80, 2.0);
        let single = EscapeGrid::new(33);
        let many = EscapeGrid::new(33);
        sweep(Canvas::new(&plane, &kernel, &single));
        parallel_sweep(Canvas::new(&plane, &kernel, &many), 5).unwrap();
        assert_eq!(single.to_vec(), many.to_vec());
    }

    #[test]
    fn poisoned_row_counter_still_hands_out_rows() {
        let rows = Arc::new(Mutex::new(3..5));
        let poisoner = {
            let rows = rows.clone();
            ::std::thread::spawn(move || {
                let _held = rows.lock().unwrap();
                panic!("poison the row counter");
            })
        };
        assert!(poisoner.join().is_err());
        assert!(rows.is_poisoned());

        assert_eq!(next_row(&rows), Some(3));
        assert_eq!(next_row(&rows), Some(4));
        assert_eq!(next_row(&rows), None);
    }
}
