//! Writing a finished grid out as a binary PPM.

use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::fs::File;
use std::path::Path;

use error::RenderError;
use grid::EscapeGrid;

/// The colour of one escape count.  Counts cycle through a band of
/// greys; blue stays dark.
pub fn colour(count: u32) -> [u8; 3] {
    let shade = ((9 * (count % 256)) % 255) as u8;
    [shade, shade, 0]
}

/// The RGB bytes of the grid, top row (largest imaginary part) first.
pub fn pixmap(grid: &EscapeGrid) -> Vec<u8> {
    let side = grid.side();
    let mut bytes = Vec::with_capacity(side * side * 3);
    for y in (0..side).rev() {
        for count in grid.row(y) {
            bytes.extend_from_slice(&colour(count));
        }
    }
    bytes
}

/// Write the grid to `outfile` as a binary PPM.
pub fn write_ppm<P: AsRef<Path>>(outfile: P, grid: &EscapeGrid) -> Result<(), RenderError> {
    let output = File::create(outfile.as_ref())?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    let side = grid.side() as u32;
    let bytes = pixmap(grid);
    encoder.encode(&bytes[..], side, side, ColorType::RGB(8))?;
    Ok(())
}
