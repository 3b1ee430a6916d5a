//! What to render and how.

use num::Complex;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use error::RenderError;
use grid::UNSET;
use kernel::Mandelbrot;
use planes::{ComplexPlane, PlaneMapper};

/// How the pixels are shared out between threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Policy {
    /// One thread, row after row.
    Sequential,
    /// Equal bands of rows, rebalanced by bisection when a worker runs
    /// dry.
    FlatRange,
    /// Adaptive quadtree boxes, rebalanced by stealing freshly split
    /// boxes.
    Quadtree,
    /// Threads pulling one row at a time from a shared counter.
    ParallelLoop,
}

impl Policy {
    /// The command-line spelling of every policy.
    pub fn names() -> &'static [&'static str] {
        &["sequential", "range", "quadtree", "parallel"]
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Policy::Sequential => "sequential",
            Policy::FlatRange => "range",
            Policy::Quadtree => "quadtree",
            Policy::ParallelLoop => "parallel",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Policy::Sequential),
            "range" => Ok(Policy::FlatRange),
            "quadtree" => Ok(Policy::Quadtree),
            "parallel" => Ok(Policy::ParallelLoop),
            _ => Err(format!("Unknown policy '{}'", s)),
        }
    }
}

/// The quadtree stops splitting boxes smaller than one box of a
/// uniform grid `depth` levels deep, i.e. boxes of fewer than
/// `(resolution / 2^depth)^2` pixels.
pub fn min_box_area_for_depth(resolution: usize, depth: u32) -> usize {
    let side = (resolution as f64) / 2f64.powi(depth as i32);
    (side * side).floor() as usize
}

/// Everything a render needs to know.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// The rectangle of the complex plane to render.
    pub plane: ComplexPlane,
    /// Pixels per side of the square image.
    pub resolution: usize,
    /// The most iterations spent on one point.
    pub max_iterations: u32,
    /// The escape radius.
    pub threshold: f64,
    /// Worker threads.
    pub workers: usize,
    /// How work is shared.
    pub policy: Policy,
    /// Quadtree boxes with fewer pixels than this are computed, not
    /// split.
    pub min_box_area: usize,
    /// How long the quadtree coordinator waits for a box announcement
    /// before retiring a requester.
    pub steal_timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let resolution = 1024;
        RenderConfig {
            plane: ComplexPlane(Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)),
            resolution,
            max_iterations: 200,
            threshold: 2.0,
            workers: 1,
            policy: Policy::Sequential,
            min_box_area: min_box_area_for_depth(resolution, 4),
            steal_timeout: Duration::from_secs(1),
        }
    }
}

impl RenderConfig {
    /// Check the configuration before any thread is started.
    pub fn validate(&self) -> Result<(), RenderError> {
        self.plane_mapper()?;
        if self.workers == 0 {
            return Err(RenderError::NoWorkers);
        }
        if !(self.threshold > 0.0) || !self.threshold.is_finite() {
            return Err(RenderError::BadThreshold(self.threshold));
        }
        if self.max_iterations == 0 {
            return Err(RenderError::NoIterations);
        }
        if self.max_iterations >= UNSET {
            return Err(RenderError::TooManyIterations(UNSET, self.max_iterations));
        }
        if self.policy == Policy::Quadtree && self.min_box_area == 0 {
            return Err(RenderError::BadMinimumBox);
        }
        Ok(())
    }

    /// The pixel mapping for this configuration.
    pub fn plane_mapper(&self) -> Result<PlaneMapper, RenderError> {
        PlaneMapper::new(self.resolution, self.plane)
    }

    /// The kernel this configuration describes.
    pub fn kernel(&self) -> Mandelbrot {
        Mandelbrot::new(self.max_iterations, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_box_area, 4096);
    }

    #[test]
    fn depth_sets_minimum_box() {
        assert_eq!(min_box_area_for_depth(256, 4), 256);
        assert_eq!(min_box_area_for_depth(100, 3), 156);
        assert_eq!(min_box_area_for_depth(8, 5), 0);
    }

    #[test]
    fn policies_round_trip_their_names() {
        for name in Policy::names() {
            let policy: Policy = name.parse().unwrap();
            assert_eq!(policy.to_string(), *name);
        }
        assert!("magic".parse::<Policy>().is_err());
    }

    #[test]
    fn degenerate_domain_is_rejected() {
        let config = RenderConfig {
            plane: ComplexPlane::new(1.0, 1.0, -1.0, 1.0),
            ..RenderConfig::default()
        };
        match config.validate() {
            Err(RenderError::DegenerateDomain(..)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let base = RenderConfig::default();
        let cases = vec![
            RenderConfig {
                resolution: 0,
                ..base.clone()
            },
            RenderConfig {
                workers: 0,
                ..base.clone()
            },
            RenderConfig {
                threshold: -1.0,
                ..base.clone()
            },
            RenderConfig {
                max_iterations: 0,
                ..base.clone()
            },
            RenderConfig {
                max_iterations: u32::max_value(),
                ..base.clone()
            },
            RenderConfig {
                policy: Policy::Quadtree,
                min_box_area: 0,
                ..base.clone()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn iteration_limit_stays_below_the_unwritten_marker() {
        let config = RenderConfig {
            max_iterations: UNSET - 1,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_ok());
        match (RenderConfig {
            max_iterations: UNSET,
            ..config
        })
        .validate()
        {
            Err(RenderError::TooManyIterations(limit, got)) => {
                assert_eq!(limit, UNSET);
                assert_eq!(got, UNSET);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn minimum_box_only_matters_for_quadtree() {
        let config = RenderConfig {
            policy: Policy::FlatRange,
            min_box_area: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
