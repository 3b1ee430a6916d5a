// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate mandelsteal;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelsteal::config::min_box_area_for_depth;
use mandelsteal::ppm::write_ppm;
use mandelsteal::{render_mandelbrot, ComplexPlane, Policy, RenderConfig, RenderError};
use num::Complex;
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const RESOLUTION: &str = "resolution";
const ITERATIONS: &str = "iterations";
const THRESHOLD: &str = "threshold";
const THREADS: &str = "threads";
const POLICY: &str = "policy";
const DEPTH: &str = "depth";
const TIMEOUT: &str = "timeout";

fn args<'a>(default_threads: &'a str) -> ArgMatches<'a> {
    App::new("mandelsteal")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Work-stealing Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandelbrot_set.ppm")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex plane, as re,im"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex plane, as re,im"),
        )
        .arg(
            Arg::with_name(RESOLUTION)
                .long(RESOLUTION)
                .short("R")
                .takes_value(true)
                .default_value("1024")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        65_536,
                        "Could not parse resolution",
                        "Resolution must be between 1 and 65536",
                    )
                })
                .help("Pixels per side of the square image"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        u32::max_value() - 1,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 4294967294",
                    )
                })
                .help("Most iterations spent on one point"),
        )
        .arg(
            Arg::with_name(THRESHOLD)
                .long(THRESHOLD)
                .short("T")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse threshold",
                        "Threshold must be positive",
                    )
                })
                .help("Escape radius"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("n")
                .takes_value(true)
                .default_value(default_threads)
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        1024,
                        "Could not parse thread count",
                        "Thread count must be between 1 and 1024",
                    )
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(POLICY)
                .long(POLICY)
                .short("p")
                .takes_value(true)
                .default_value("range")
                .possible_values(Policy::names())
                .help("How work is shared between threads"),
        )
        .arg(
            Arg::with_name(DEPTH)
                .long(DEPTH)
                .short("s")
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        0u32,
                        16,
                        "Could not parse box depth",
                        "Box depth must be between 0 and 16",
                    )
                })
                .help("Quadtree boxes smaller than one cell of a grid this many levels deep are not split"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        3_600_000,
                        "Could not parse timeout",
                        "Timeout must be between 1 and 3600000 milliseconds",
                    )
                })
                .help("Milliseconds the quadtree coordinator waits for new boxes"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    // Every argument has a default and a validator, so this cannot fail.
    match matches.value_of(name).map(T::from_str) {
        Some(Ok(value)) => value,
        _ => unreachable!("argument {} was validated", name),
    }
}

fn config(matches: &ArgMatches) -> RenderConfig {
    let leftlower = matches.value_of(LEFTLOWER).and_then(parse_complex);
    let rightupper = matches.value_of(RIGHTUPPER).and_then(parse_complex);
    let (leftlower, rightupper) = match (leftlower, rightupper) {
        (Some(l), Some(r)) => (l, r),
        _ => unreachable!("corners were validated"),
    };
    let resolution: usize = value(matches, RESOLUTION);
    let workers: usize = value(matches, THREADS);
    let policy = if workers == 1 {
        Policy::Sequential
    } else {
        value(matches, POLICY)
    };

    RenderConfig {
        plane: ComplexPlane(leftlower, rightupper),
        resolution,
        max_iterations: value(matches, ITERATIONS),
        threshold: value(matches, THRESHOLD),
        workers,
        policy,
        min_box_area: min_box_area_for_depth(resolution, value(matches, DEPTH)),
        steal_timeout: Duration::from_millis(value(matches, TIMEOUT)),
    }
}

fn run(matches: &ArgMatches) -> Result<(), RenderError> {
    let config = config(matches);
    let outfile = matches.value_of(OUTPUT).unwrap_or("mandelbrot_set.ppm");

    let rendering = render_mandelbrot(&config)?;
    write_ppm(outfile, &rendering.grid)?;

    let report = &rendering.report;
    info!(
        "{} policy, {} workers: {:?}, {} decisions ({} grants, {} denials, {} retirements), {} announcements",
        report.policy,
        config.workers,
        report.elapsed,
        report.tally.decisions,
        report.tally.grants,
        report.tally.denials,
        report.tally.retirements,
        report.announcements
    );
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let default_threads = num_cpus::get().to_string();
    let matches = args(&default_threads);
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
