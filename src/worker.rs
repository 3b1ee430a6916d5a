//! The worker loop.
//!
//! A worker is a little state machine over its task record: while
//! busy it consumes its span one unit at a time, when idle it asks the
//! coordinator for more, and once terminated it exits.  The record's
//! lock is held only to read or advance the span, never while
//! computing pixels and never while waiting on the coordinator.

use num::Complex;
use std::sync::Arc;

use coordinator::Board;
use grid::EscapeGrid;
use kernel::EscapeKernel;
use planes::{Pixel, PixelRect, PlaneMapper};
use protocol::{Desk, Verdict};
use quadtree;
use task::{Partition, Span, Status, TaskRecord};

/// The things every thread needs to turn pixels into escape counts:
/// the mapping to the complex plane, the kernel, and the grid to
/// write to.
pub struct Canvas<'a, K: 'a + EscapeKernel> {
    /// Pixel to complex plane mapping.
    pub plane: &'a PlaneMapper,
    /// The per-pixel function.
    pub kernel: &'a K,
    /// Where the results go.
    pub grid: &'a EscapeGrid,
}

impl<'a, K: 'a + EscapeKernel> Clone for Canvas<'a, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K: 'a + EscapeKernel> Copy for Canvas<'a, K> {}

impl<'a, K: 'a + EscapeKernel> Canvas<'a, K> {
    /// Bundle the three.
    pub fn new(plane: &'a PlaneMapper, kernel: &'a K, grid: &'a EscapeGrid) -> Self {
        Canvas {
            plane,
            kernel,
            grid,
        }
    }

    /// The escape count at the centre of a pixel, without storing it.
    pub fn sample(&self, pixel: &Pixel) -> u32 {
        let c: Complex<f64> = self.plane.pixel_to_point(pixel);
        self.kernel.escape(c)
    }

    /// Compute and store one pixel.
    pub fn compute(&self, pixel: &Pixel) {
        self.grid.set(pixel, self.sample(pixel));
    }

    /// Compute and store every pixel of a block.
    pub fn compute_block(&self, block: &PixelRect) {
        for (y, x) in iproduct!(block.rows.clone(), block.columns.clone()) {
            self.compute(&Pixel(x, y));
        }
    }

    /// Sample the pixels along all four edges of a non-empty block.
    /// If every sample equals the first one, return that value.
    pub fn uniform_border(&self, block: &PixelRect) -> Option<u32> {
        debug_assert!(!block.is_empty());
        let (left, right) = (block.columns.start, block.columns.end - 1);
        let (bottom, top) = (block.rows.start, block.rows.end - 1);
        let sides = iproduct!(block.rows.clone(), vec![left, right]).map(|(y, x)| Pixel(x, y));
        let ends = iproduct!(vec![bottom, top], block.columns.clone()).map(|(y, x)| Pixel(x, y));

        let mut samples = sides.chain(ends).map(|pixel| self.sample(&pixel));
        let first = samples.next()?;
        if samples.all(|value| value == first) {
            Some(first)
        } else {
            None
        }
    }
}

/// One worker thread's state.
pub struct Worker<'a, K: 'a + EscapeKernel> {
    id: usize,
    board: Arc<Board>,
    desk: Desk,
    canvas: Canvas<'a, K>,
    min_box_area: usize,
}

impl<'a, K: 'a + EscapeKernel> Worker<'a, K> {
    /// A worker serving the record that matches its desk.  Boxes with
    /// fewer than `min_box_area` pixels are computed rather than split.
    pub fn new(board: Arc<Board>, desk: Desk, canvas: Canvas<'a, K>, min_box_area: usize) -> Self {
        Worker {
            id: desk.worker(),
            board,
            desk,
            canvas,
            min_box_area,
        }
    }

    fn record(&self) -> &TaskRecord {
        self.board.record(self.id)
    }

    /// Work until the coordinator says there is no more.
    pub fn run(&self) {
        loop {
            match self.record().status() {
                Status::Busy => match self.record().partition {
                    Partition::Rows => self.sweep_rows(),
                    Partition::Boxes => self.process_span(),
                },
                Status::Idle => {
                    let verdict = self.desk.request_work();
                    trace!("worker {} heard {:?}", self.id, verdict);
                    if verdict == Verdict::Retired {
                        self.record().lock().status = Status::Terminated;
                    }
                }
                Status::Terminated => break,
            }
        }
        debug!("worker {} exits", self.id);
    }

    /// Compute the rows of the span one at a time, until the span is
    /// empty, then go idle.  The coordinator may shorten the span
    /// between rows.
    pub fn sweep_rows(&self) {
        let columns = self.record().columns.clone();
        let mut finished = None;
        loop {
            let row = {
                let mut slot = self.record().lock();
                if let Some(row) = finished {
                    slot.span.lo = row + 1;
                }
                if slot.span.is_empty() {
                    slot.status = Status::Idle;
                    return;
                }
                slot.span.lo
            };
            trace!("worker {} row {}", self.id, row);
            self.canvas.compute_block(&PixelRect {
                columns: columns.clone(),
                rows: row..row + 1,
            });
            finished = Some(row);
        }
    }

    /// Process the boxes of the span in increasing order, until the
    /// span is empty, then go idle.  The coordinator may shorten the
    /// span between boxes.
    pub fn process_span(&self) {
        let mut finished = None;
        loop {
            let b = {
                let mut slot = self.record().lock();
                if let Some(b) = finished {
                    slot.span.lo = b + 1;
                }
                if slot.span.is_empty() {
                    slot.status = Status::Idle;
                    return;
                }
                slot.span.lo
            };
            self.process_box(b);
            finished = Some(b);
        }
    }

    /// Fill, compute, or split one box.
    ///
    /// A box whose border samples all agree is assumed to be that
    /// value throughout and is filled without looking inside.  That is
    /// an approximation: a box can have a uniform border around a
    /// different interior, and then the interior is painted wrong.
    /// Otherwise small boxes are computed pixel by pixel and larger
    /// ones are split into their four children.
    pub fn process_box(&self, b: usize) {
        let plane = self.canvas.plane;
        let bounds = plane.pixel_bounds(&quadtree::rect_of(&plane.complex_plane, b));
        if bounds.is_empty() {
            return;
        }

        match self.canvas.uniform_border(&bounds) {
            Some(value) => {
                trace!("worker {} fills box {} with {}", self.id, b, value);
                self.canvas.grid.fill(&bounds, value);
            }
            None if bounds.area() < self.min_box_area => {
                trace!("worker {} computes box {}", self.id, b);
                self.canvas.compute_block(&bounds);
            }
            None => self.split_box(b),
        }
    }

    /// Replace the span with the children of `b`, announce them as
    /// stealable, process whatever of them is left to us, then put the
    /// old span back so the enclosing loop carries on where it was.
    /// Recursion is bounded by the depth at which boxes shrink to one
    /// pixel.
    fn split_box(&self, b: usize) {
        let children = quadtree::children(b);
        let saved = {
            let mut slot = self.record().lock();
            let saved = slot.span;
            slot.span = Span::new(children.start, children.end);
            saved
        };
        trace!("worker {} splits box {}", self.id, b);
        self.board.hint.announce(self.id);

        self.process_span();

        let mut slot = self.record().lock();
        slot.span = saved;
        slot.settle();
    }
}
