#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Work-stealing Mandelbrot renderer
//!
//! Every pixel of a Mandelbrot image is independent of every other
//! pixel, so the arithmetic parallelizes trivially.  What does not
//! parallelize trivially is the *cost*: a row that crosses the black
//! heart of the set takes hundreds of times longer than a row far
//! outside it, so handing each thread an equal slice of the image
//! leaves most of the threads idle while one of them grinds through
//! the expensive part.
//!
//! This crate renders the set with a fixed pool of worker threads and a
//! single coordinator that rebalances the work whenever a worker runs
//! dry.  Two partitioning schemes are supported:
//!
//! * flat row ranges, where an idle worker takes the back half of the
//!   first busy neighbour's remaining rows, and
//! * a quadtree of boxes, where workers subdivide their own boxes when
//!   the border is not uniform and announce the new sub-boxes so the
//!   coordinator can hand half of them to an idle worker.
//!
//! A plain sequential sweep and a dynamically scheduled row loop are
//! provided for comparison.

extern crate crossbeam;
extern crate image;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate num;

#[cfg(test)]
extern crate tempfile;

pub mod boxes;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod grid;
pub mod kernel;
pub mod planes;
pub mod ppm;
pub mod protocol;
pub mod quadtree;
pub mod range;
pub mod render;
pub mod task;
pub mod worker;

pub use config::{Policy, RenderConfig};
pub use error::RenderError;
pub use grid::EscapeGrid;
pub use kernel::{EscapeKernel, Mandelbrot};
pub use planes::{ComplexPlane, Pixel, PixelRect, PlaneMapper};
pub use render::{render, render_mandelbrot, Rendering, Report};
