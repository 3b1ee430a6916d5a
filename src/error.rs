// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a render from producing an image.
//!
//! Configuration problems are caught before a single thread starts, so
//! a failed render never leaves a partially written grid behind.

use std::io;

/// The ways a render can fail.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The complex rectangle has no area, or its corners are swapped.
    #[fail(
        display = "The left lower corner ({}, {}) must lie strictly left of and below the right upper corner ({}, {})",
        _0, _1, _2, _3
    )]
    DegenerateDomain(f64, f64, f64, f64),

    /// The image must be at least one pixel on a side.
    #[fail(display = "Resolution must be at least one pixel")]
    EmptyResolution,

    /// At least one worker thread is needed.
    #[fail(display = "Worker count must be at least one")]
    NoWorkers,

    /// The escape threshold must be a positive, finite radius.
    #[fail(display = "Escape threshold must be positive, got {}", _0)]
    BadThreshold(f64),

    /// Zero iterations would paint every pixel the same.
    #[fail(display = "Iteration limit must be at least one")]
    NoIterations,

    /// Counts this large collide with the grid's unwritten marker.
    #[fail(display = "Iteration limit must be below {}, got {}", _0, _1)]
    TooManyIterations(u32, u32),

    /// The quadtree needs a positive minimum box area to stop splitting.
    #[fail(display = "Minimum box area must be at least one pixel")]
    BadMinimumBox,

    /// One of the worker threads panicked; the grid is incomplete.
    #[fail(display = "A worker thread panicked before finishing its work")]
    WorkerPanicked,

    /// Writing the image failed.
    #[fail(display = "Could not write image: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        RenderError::Io(err)
    }
}
