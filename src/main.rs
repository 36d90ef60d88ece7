//! Entry point for the poppy binary.
//! Handles CLI parsing, logging setup, and dispatches to the extractors and flux budgets.

use chrono::Local;
use clap::Parser;
use log::LevelFilter;
use poppy::cli::{Args, BudgetKind, Command, SeriesArgs};
use poppy::prelude::*;
use poppy::{flux, metadata, metrics};
use std::io::Write;
use std::process::ExitCode;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Prints the series, or writes it when an output path is given
fn emit(series: &TimeSeries, args: &SeriesArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            write_series_to_netcdf(series, path)?;
            println!("Saved {} to {}", series.name(), path.display());
        }
        None => {
            println!("{} {}", TIME_INDEX_NAME, series.name());
            for (t, v) in series.iter() {
                println!("{:.4} {}", t, v);
            }
        }
    }
    Ok(())
}

fn run_budget(
    file: &std::path::Path,
    kind: BudgetKind,
    tracer: Option<Tracer>,
    lon_limits: Option<(f64, f64)>,
    lat_limits: Option<(f64, f64)>,
    params: FluxBudgetParams,
) -> Result<f64> {
    let ds = Dataset::open(file)?;
    let grid = Grid::from_dataset(&ds, Staggering::T)?;
    let mask = grid
        .region_mask(lon_limits, lat_limits)?
        .unwrap_or_else(|| grid.ocean_mask());

    let required = || {
        tracer.ok_or_else(|| PoppyError::InvalidSelection {
            message: format!("--tracer is required for the {:?} budget", kind),
        })
    };

    match kind {
        BudgetKind::Vvel => flux::fluxbudget_vvel(&ds, &mask, tracer, &params),
        BudgetKind::Uesvns => flux::fluxbudget_uesvns(&ds, &mask, &params),
        BudgetKind::Bolus => flux::fluxbudget_bolus(&ds, &mask, required()?, &params),
        BudgetKind::Diffusion => flux::fluxbudget_diffusion(&ds, &mask, required()?, &params),
        BudgetKind::Divergence => flux::transport_divergence(&ds, &mask, &params),
        BudgetKind::Tendency => {
            flux::fluxbudget_bolus_advection_tendency(&ds, &mask, required()?, params.t)
        }
    }
}

fn run(args: Args) -> Result<()> {
    ParallelConfig::new(args.threads).setup_global_pool()?;
    if args.verbose {
        get_parallel_info().log();
    }
    let options = ExtractionOptions::with_file_budget(args.file_budget);

    match args.command {
        Command::Amoc {
            series,
            latlim,
            zlim,
            window_size,
        } => {
            let params = AmocParams {
                lat_limits: latlim,
                depth_limits: zlim,
                window_size,
            };
            let ts = metrics::get_amoc(&series.files, &params, &options)?;
            emit(&ts, &series)
        }
        Command::Mht {
            series,
            latlim,
            component,
            window_size,
        } => {
            let params = MhtParams {
                lat_limits: latlim,
                component,
                window_size,
            };
            let ts = metrics::get_mht(&series.files, &params, &options)?;
            emit(&ts, &series)
        }
        Command::Mst {
            series,
            lat0,
            component,
            window_size,
        } => {
            let params = MstParams {
                lat0,
                component,
                window_size,
            };
            let ts = metrics::get_mst(&series.files, &params, &options)?;
            emit(&ts, &series)
        }
        Command::Timeseries {
            series,
            variable,
            grid,
            reduce,
            latlim,
            lonlim,
            level,
        } => {
            let params = FieldParams {
                reduction: reduce,
                lat_limits: latlim,
                lon_limits: lonlim,
                level,
                ..FieldParams::new(&variable, grid)
            };
            let ts = metrics::get_timeseries(&series.files, &params, &options)?;
            emit(&ts, &series)
        }
        Command::Budget {
            file,
            kind,
            tracer,
            latlim,
            lonlim,
            k_start,
            k_end,
            time_index,
        } => {
            let params = FluxBudgetParams {
                k_start,
                k_end,
                t: time_index,
                ..FluxBudgetParams::default()
            };
            let value = run_budget(&file, kind, tracer, lonlim, latlim, params)?;
            println!("{}", value);
            Ok(())
        }
        Command::Inspect { file, describe } => {
            let ds = Dataset::open(&file)?;
            match describe {
                Some(var) => metadata::describe_variable(&ds, &var)?,
                None => metadata::list_variables(&ds),
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
