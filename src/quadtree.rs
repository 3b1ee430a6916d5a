//! Quadtree box addressing.
//!
//! Box 0 is the whole domain.  Box `b` has the four children
//! `4b+1 ..= 4b+4`, so every box but the root has the parent
//! `(b - 1) / 4` and sits in quadrant `b % 4` of it.  A box's rectangle
//! is found by walking from the box up to the root and then applying
//! the quadrants on the way back down.

use std::ops::Range;

use planes::ComplexPlane;

/// The index of the box covering the whole domain.
pub const ROOT: usize = 0;

/// Which quarter of its parent a box covers.  "Upper" means the larger
/// imaginary part, "left" the smaller real part.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Quadrant {
    /// Index remainder 0.
    UpperLeft,
    /// Index remainder 1.
    UpperRight,
    /// Index remainder 2.
    LowerRight,
    /// Index remainder 3.
    LowerLeft,
}

impl Quadrant {
    fn from_index(b: usize) -> Quadrant {
        match b % 4 {
            0 => Quadrant::UpperLeft,
            1 => Quadrant::UpperRight,
            2 => Quadrant::LowerRight,
            _ => Quadrant::LowerLeft,
        }
    }

    /// The part of `parent` this quadrant covers.  Siblings share the
    /// parent's midpoint exactly.
    pub fn of(self, parent: &ComplexPlane) -> ComplexPlane {
        let ComplexPlane(ll, ru) = *parent;
        let mid = parent.midpoint();
        let (xs, ys) = match self {
            Quadrant::UpperLeft => ((ll.re, mid.re), (mid.im, ru.im)),
            Quadrant::UpperRight => ((mid.re, ru.re), (mid.im, ru.im)),
            Quadrant::LowerRight => ((mid.re, ru.re), (ll.im, mid.im)),
            Quadrant::LowerLeft => ((ll.re, mid.re), (ll.im, mid.im)),
        };
        ComplexPlane::new(xs.0, xs.1, ys.0, ys.1)
    }
}

/// The parent of box `b`; the root has none.
pub fn parent(b: usize) -> Option<usize> {
    if b == ROOT {
        None
    } else {
        Some((b - 1) / 4)
    }
}

/// The quadrant of its parent that box `b` covers.
pub fn quadrant(b: usize) -> Option<Quadrant> {
    parent(b).map(|_| Quadrant::from_index(b))
}

/// The four children of box `b`.
pub fn children(b: usize) -> Range<usize> {
    (4 * b + 1)..(4 * b + 5)
}

/// How many splits separate box `b` from the root.
pub fn depth(b: usize) -> usize {
    let mut depth = 0;
    let mut b = b;
    while let Some(p) = parent(b) {
        depth += 1;
        b = p;
    }
    depth
}

/// The rectangle of box `b` within `domain`.
pub fn rect_of(domain: &ComplexPlane, b: usize) -> ComplexPlane {
    let mut path = Vec::new();
    let mut b = b;
    while let Some(p) = parent(b) {
        path.push(Quadrant::from_index(b));
        b = p;
    }
    path.iter()
        .rev()
        .fold(*domain, |rect, quadrant| quadrant.of(&rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planes::{Pixel, PlaneMapper};

    fn domain() -> ComplexPlane {
        ComplexPlane::new(-2.0, 2.0, -1.5, 1.5)
    }

    #[test]
    fn parents_and_children_agree() {
        for b in 0..200 {
            for child in children(b) {
                assert_eq!(parent(child), Some(b));
                assert_eq!(depth(child), depth(b) + 1);
            }
        }
        assert_eq!(parent(ROOT), None);
        assert_eq!(quadrant(ROOT), None);
        assert_eq!(depth(ROOT), 0);
    }

    #[test]
    fn children_take_every_quadrant_once() {
        let quadrants: Vec<Quadrant> = children(5).map(|c| quadrant(c).unwrap()).collect();
        assert_eq!(
            quadrants,
            vec![
                Quadrant::UpperRight,
                Quadrant::LowerRight,
                Quadrant::LowerLeft,
                Quadrant::UpperLeft
            ]
        );
    }

    #[test]
    fn root_is_the_domain() {
        assert_eq!(rect_of(&domain(), ROOT), domain());
    }

    #[test]
    fn first_level_boxes() {
        let d = domain();
        assert_eq!(rect_of(&d, 1), ComplexPlane::new(0.0, 2.0, 0.0, 1.5));
        assert_eq!(rect_of(&d, 2), ComplexPlane::new(0.0, 2.0, -1.5, 0.0));
        assert_eq!(rect_of(&d, 3), ComplexPlane::new(-2.0, 0.0, -1.5, 0.0));
        assert_eq!(rect_of(&d, 4), ComplexPlane::new(-2.0, 0.0, 0.0, 1.5));
    }

    #[test]
    fn children_partition_their_parent() {
        let d = domain();
        for b in vec![0, 1, 3, 7, 22, 93, 341] {
            let whole = rect_of(&d, b);
            let parts: Vec<ComplexPlane> = children(b).map(|c| rect_of(&d, c)).collect();

            let area: f64 = parts.iter().map(|p| p.area()).sum();
            assert!((area - whole.area()).abs() <= 1e-12 * whole.area());

            for part in &parts {
                assert!(part.0.re >= whole.0.re && part.1.re <= whole.1.re);
                assert!(part.0.im >= whole.0.im && part.1.im <= whole.1.im);
            }
            for (i, a) in parts.iter().enumerate() {
                for b in parts.iter().skip(i + 1) {
                    let overlap_re = a.1.re.min(b.1.re) - a.0.re.max(b.0.re);
                    let overlap_im = a.1.im.min(b.1.im) - a.0.im.max(b.0.im);
                    assert!(overlap_re <= 0.0 || overlap_im <= 0.0);
                }
            }
        }
    }

    #[test]
    fn children_partition_their_parents_pixels() {
        let d = domain();
        for resolution in vec![16, 13] {
            let pm = PlaneMapper::new(resolution, d).unwrap();
            for b in vec![0, 2, 4, 9, 17] {
                let whole = pm.pixel_bounds(&rect_of(&d, b));
                let parts: Vec<_> = children(b).map(|c| pm.pixel_bounds(&rect_of(&d, c))).collect();
                for (y, x) in iproduct!(0..resolution, 0..resolution) {
                    let pixel = Pixel(x, y);
                    let owners = parts.iter().filter(|p| p.contains(&pixel)).count();
                    let expected = if whole.contains(&pixel) { 1 } else { 0 };
                    assert_eq!(owners, expected, "pixel {:?} of box {}", pixel, b);
                }
            }
        }
    }
}
