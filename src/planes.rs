//! Contains the PlaneMapper struct, which describes a relationship
//! between a square grid of pixels with an origin at 0,0, and a
//! rectangle on the complex plane with an arbitrary pair of corners
//! defining the leftlower and rightupper corners of the region being
//! rendered.
use num::Complex;
use std::ops::Range;

use error::RenderError;

/// Describes the lower-left corner and upper-right corner of a
/// rectangle on the complex plane, treating the real part of each
/// value as the x-component and the imaginary part of each value as
/// the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

impl ComplexPlane {
    /// Convenience constructor from the four edges.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        ComplexPlane(Complex::new(xmin, ymin), Complex::new(xmax, ymax))
    }

    /// The point halfway between the two corners.
    pub fn midpoint(&self) -> Complex<f64> {
        Complex::new((self.0.re + self.1.re) / 2.0, (self.0.im + self.1.im) / 2.0)
    }

    /// Width times height, in complex units.
    pub fn area(&self) -> f64 {
        (self.1.re - self.0.re) * (self.1.im - self.0.im)
    }
}

/// Describes the x, y of a pixel in the grid.  Row y corresponds to
/// the imaginary axis, with row 0 at the bottom of the domain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A half-open block of pixels: the columns and the rows it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelRect {
    /// Pixel columns, left to right.
    pub columns: Range<usize>,
    /// Pixel rows, bottom to top.
    pub rows: Range<usize>,
}

impl PixelRect {
    /// The number of pixels in the block.
    pub fn area(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// True when the block covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.columns.start >= self.columns.end || self.rows.start >= self.rows.end
    }

    /// Does this block contain the pixel?
    pub fn contains(&self, pixel: &Pixel) -> bool {
        self.columns.start <= pixel.0
            && pixel.0 < self.columns.end
            && self.rows.start <= pixel.1
            && pixel.1 < self.rows.end
    }
}

/// Contains the definitions of two planes: the square pixel grid and
/// the complex rectangle it samples.  Maps points from one to the
/// other.  Each pixel is sampled at its centre.
#[derive(Debug)]
pub struct PlaneMapper {
    /// Pixels per side of the square grid.
    pub resolution: usize,
    /// The two coordinates defining the complex rectangle,
    /// left-lower and right-upper.
    pub complex_plane: ComplexPlane,
    // The distance between adjoining pixel centres, horizontally and
    // vertically.
    pixel_size: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the number of pixels on each side and the
    /// rectangle of the complex plane they cover.
    pub fn new(resolution: usize, complex_plane: ComplexPlane) -> Result<PlaneMapper, RenderError> {
        let ComplexPlane(leftlower, rightupper) = complex_plane;
        if !(rightupper.re > leftlower.re) || !(rightupper.im > leftlower.im) {
            return Err(RenderError::DegenerateDomain(
                leftlower.re,
                leftlower.im,
                rightupper.re,
                rightupper.im,
            ));
        }

        if resolution == 0 {
            return Err(RenderError::EmptyResolution);
        }

        let pixel_size = (
            (rightupper.re - leftlower.re) / (resolution as f64),
            (rightupper.im - leftlower.im) / (resolution as f64),
        );

        Ok(PlaneMapper {
            resolution,
            complex_plane,
            pixel_size,
        })
    }

    /// The whole grid as a pixel block.
    pub fn full(&self) -> PixelRect {
        PixelRect {
            columns: 0..self.resolution,
            rows: 0..self.resolution,
        }
    }

    /// Given a pixel on the grid, return the point at its centre on
    /// the complex plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let origin = self.complex_plane.0;
        Complex::new(
            origin.re + ((pixel.0 as f64) + 0.5) * self.pixel_size.0,
            origin.im + ((pixel.1 as f64) + 0.5) * self.pixel_size.1,
        )
    }

    /// The pixels whose centres fall inside a rectangle of the
    /// complex plane, left and bottom edges inclusive, right and top
    /// edges exclusive.  Two rectangles that share an edge value can
    /// therefore never claim the same pixel.
    pub fn pixel_bounds(&self, region: &ComplexPlane) -> PixelRect {
        let origin = self.complex_plane.0;
        let column = |re: f64| self.first_centre_at_or_after((re - origin.re) / self.pixel_size.0);
        let row = |im: f64| self.first_centre_at_or_after((im - origin.im) / self.pixel_size.1);
        PixelRect {
            columns: column(region.0.re)..column(region.1.re),
            rows: row(region.0.im)..row(region.1.im),
        }
    }

    // Pixel i has its centre at offset i + 0.5, measured in pixels
    // from the origin.
    fn first_centre_at_or_after(&self, offset: f64) -> usize {
        let index = (offset - 0.5).ceil();
        if index <= 0.0 {
            0
        } else if index >= self.resolution as f64 {
            self.resolution
        } else {
            index as usize
        }
    }
}
