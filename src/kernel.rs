//! The per-pixel arithmetic.  Everything else in this crate is about
//! deciding *who* calls this and *when*; the kernel itself is a pure
//! function of one complex number.

use num::Complex;

/// Anything that can turn a point on the complex plane into an escape
/// count.  Implementations must be pure: the same point always yields
/// the same count, no matter which thread asks.
pub trait EscapeKernel: Sync {
    /// The escape count of the point `c`.
    fn escape(&self, c: Complex<f64>) -> u32;
}

/// The classic Mandelbrot iteration, z <- z^2 + c.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mandelbrot {
    /// The most iterations spent on one point.
    pub max_iterations: u32,
    /// The modulus beyond which a point is considered to have escaped.
    pub threshold: f64,
}

impl Mandelbrot {
    /// Constructor.
    pub fn new(max_iterations: u32, threshold: f64) -> Self {
        Mandelbrot {
            max_iterations,
            threshold,
        }
    }
}

impl EscapeKernel for Mandelbrot {
    /// Returns zero for points already outside the threshold, otherwise
    /// the number of iterations the orbit stayed inside it, capped at
    /// `max_iterations`.  The orbit starts at z = c.
    fn escape(&self, c: Complex<f64>) -> u32 {
        let threshold = self.threshold * self.threshold;
        if c.norm_sqr() >= threshold {
            return 0;
        }

        let mut z = c;
        let mut n = 0;
        while n < self.max_iterations && z.norm_sqr() < threshold {
            z = z * z + c;
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_outside_the_threshold_escape_immediately() {
        let m = Mandelbrot::new(200, 2.0);
        assert_eq!(m.escape(Complex::new(3.0, 0.0)), 0);
        assert_eq!(m.escape(Complex::new(0.0, -2.0)), 0);
    }

    #[test]
    fn points_inside_the_set_hit_the_limit() {
        let m = Mandelbrot::new(200, 2.0);
        assert_eq!(m.escape(Complex::new(0.0, 0.0)), 200);
        assert_eq!(m.escape(Complex::new(-1.0, 0.0)), 200);
    }

    #[test]
    fn escape_counts_stay_within_limit() {
        let m = Mandelbrot::new(37, 2.0);
        for i in 0..40 {
            let c = Complex::new(-2.0 + 0.1 * (i as f64), 0.3);
            assert!(m.escape(c) <= 37);
        }
    }

    #[test]
    fn escape_counts_orbit_length() {
        // 1 -> 2: the first iterate already reaches the threshold.
        let m = Mandelbrot::new(200, 2.0);
        assert_eq!(m.escape(Complex::new(1.0, 0.0)), 1);
    }

    #[test]
    fn largest_limit_counts_escaping_orbits() {
        let m = Mandelbrot::new(u32::max_value(), 2.0);
        assert_eq!(m.escape(Complex::new(1.0, 0.0)), 1);
        assert_eq!(m.escape(Complex::new(0.5, 0.5)), 4);
    }
}
