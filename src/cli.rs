//! Command-line interface of the `poppy` binary, defined with `clap`.

use crate::config::{DEFAULT_FILE_BUDGET, DEFAULT_WINDOW_SIZE};
use crate::flux::Tracer;
use crate::grid::Staggering;
use crate::metrics::Component;
use crate::statistics::Reduction;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Diagnostic time series from POP ocean model output
#[derive(Parser, Debug)]
#[command(
    name = "poppy",
    version,
    about = "Extract diagnostic time series and flux budgets from POP history files"
)]
pub struct Args {
    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    /// Read inputs one file at a time above this many files
    #[arg(long, global = true, default_value_t = DEFAULT_FILE_BUDGET)]
    pub file_budget: usize,

    /// Enable verbose output.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Input files and optional NetCDF destination shared by the extractors
#[derive(ClapArgs, Debug)]
pub struct SeriesArgs {
    /// History files, in time order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to save the series as NetCDF. If not set, prints to terminal.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Maximum Atlantic meridional overturning
    Amoc {
        #[command(flatten)]
        series: SeriesArgs,

        /// Latitude limits, formatted as <south>,<north>
        #[arg(long, value_parser = parse_limits, default_value = "30,60")]
        latlim: (f64, f64),

        /// Depth limits in metres, formatted as <top>,<bottom>
        #[arg(long, value_parser = parse_limits, default_value = "500,9999")]
        zlim: (f64, f64),

        /// Moving average window in time steps
        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,
    },

    /// Maximum meridional heat transport within a latitude band
    Mht {
        #[command(flatten)]
        series: SeriesArgs,

        #[arg(long, value_parser = parse_limits, default_value = "30,60")]
        latlim: (f64, f64),

        /// Transport component index (0 = total)
        #[arg(long, value_parser = parse_component, default_value = "0")]
        component: Component,

        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,
    },

    /// Meridional salt transport at one latitude
    Mst {
        #[command(flatten)]
        series: SeriesArgs,

        #[arg(long, default_value_t = 55.0)]
        lat0: f64,

        #[arg(long, value_parser = parse_component, default_value = "0")]
        component: Component,

        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,
    },

    /// Any field reduced over a horizontal region
    Timeseries {
        #[command(flatten)]
        series: SeriesArgs,

        /// Variable to extract
        #[arg(long = "var")]
        variable: String,

        /// Grid staggering of the variable (T or U)
        #[arg(long, default_value = "T")]
        grid: Staggering,

        /// Reduction over the region: mean, sum, min or max
        #[arg(long, default_value = "mean")]
        reduce: Reduction,

        #[arg(long, value_parser = parse_limits)]
        latlim: Option<(f64, f64)>,

        #[arg(long, value_parser = parse_limits)]
        lonlim: Option<(f64, f64)>,

        /// Vertical level index for 3-D fields
        #[arg(short, long, default_value_t = 0)]
        level: usize,
    },

    /// Net transport into a region of one history file
    Budget {
        /// History file holding velocities and grid variables
        file: PathBuf,

        #[arg(long, value_enum)]
        kind: BudgetKind,

        /// Transported quantity: heat, salt or freshwater
        #[arg(long, value_parser = parse_tracer)]
        tracer: Option<Tracer>,

        #[arg(long, value_parser = parse_limits)]
        latlim: Option<(f64, f64)>,

        #[arg(long, value_parser = parse_limits)]
        lonlim: Option<(f64, f64)>,

        /// First layer of the budget
        #[arg(long, default_value_t = 0)]
        k_start: usize,

        /// Exclusive last layer; all layers when absent
        #[arg(long)]
        k_end: Option<usize>,

        /// Time index within the file
        #[arg(long, default_value_t = 0)]
        time_index: usize,
    },

    /// List the variables of a file, or describe one
    Inspect {
        file: PathBuf,

        /// Describe a specific variable (data type, shape, and attributes)
        #[arg(long)]
        describe: Option<String>,
    },
}

/// Which transport a budget integrates
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    /// Resolved velocity (`UVEL`/`VVEL`), optionally carrying a tracer
    Vvel,
    /// Model-computed face transports (`UES`/`VNS`)
    Uesvns,
    /// Eddy-induced velocity
    Bolus,
    /// Isopycnal diffusion
    Diffusion,
    /// Volume transport divergence
    Divergence,
    /// Eddy-induced advection tendency
    Tendency,
}

fn parse_limits(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [lo, hi] => {
            let lo = lo
                .parse::<f64>()
                .map_err(|_| format!("Invalid lower limit '{}'", lo))?;
            let hi = hi
                .parse::<f64>()
                .map_err(|_| format!("Invalid upper limit '{}'", hi))?;
            if lo > hi {
                return Err(format!("Lower limit {} exceeds upper limit {}", lo, hi));
            }
            Ok((lo, hi))
        }
        _ => Err("Invalid format: Expected '<lower>,<upper>'.".to_string()),
    }
}

fn parse_component(s: &str) -> Result<Component, String> {
    let index = s
        .parse::<usize>()
        .map_err(|_| format!("Invalid component index '{}'", s))?;
    Component::from_index(index).ok_or_else(|| {
        format!(
            "Component index {} out of range (0..{})",
            index,
            Component::ALL.len()
        )
    })
}

fn parse_tracer(s: &str) -> Result<Tracer, String> {
    s.parse::<Tracer>().map_err(|e| e.to_string())
}
