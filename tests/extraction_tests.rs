mod common;

use common::{expected_amoc, expected_mht, expected_mst, write_history, write_series};
use poppy::metrics::{get_amoc, get_mht, get_mst, get_timeseries};
use poppy::prelude::*;
use std::path::PathBuf;
use tempfile::tempdir;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn unsmoothed_amoc() -> AmocParams {
    AmocParams {
        window_size: 1,
        ..AmocParams::default()
    }
}

#[test]
fn test_amoc_maximum_in_window() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 3);

    let amoc = get_amoc(&files, &unsmoothed_amoc(), &ExtractionOptions::default())?;

    assert_eq!(amoc.name(), "AMOC");
    assert_eq!(amoc.len(), 3);
    for (s, (year, value)) in amoc.iter().enumerate() {
        assert!(close(year, (s + 1) as f64), "year {} at step {}", year, s);
        assert_eq!(value, expected_amoc(s));
    }
    let selection = amoc.selection();
    assert_eq!(selection.variable, "MOC");
    assert_eq!(selection.lat_limits, Some((30.0, 60.0)));
    assert_eq!(selection.depth_limits, Some((500.0, 9999.0)));
    assert_eq!(selection.window_size, Some(1));
    Ok(())
}

#[test]
fn test_read_strategies_agree() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 3);

    let joint = get_amoc(&files, &unsmoothed_amoc(), &ExtractionOptions::with_file_budget(100))?;
    let per_file = get_amoc(&files, &unsmoothed_amoc(), &ExtractionOptions::with_file_budget(1))?;
    assert_eq!(joint, per_file);

    let params = MhtParams {
        window_size: 1,
        ..MhtParams::default()
    };
    let joint = get_mht(&files, &params, &ExtractionOptions::with_file_budget(100))?;
    let per_file = get_mht(&files, &params, &ExtractionOptions::with_file_budget(2))?;
    assert_eq!(joint, per_file);

    let params = MstParams {
        lat0: 45.0,
        window_size: 1,
        ..MstParams::default()
    };
    let joint = get_mst(&files, &params, &ExtractionOptions::with_file_budget(100))?;
    let per_file = get_mst(&files, &params, &ExtractionOptions::with_file_budget(1))?;
    assert_eq!(joint, per_file);

    // Region mask and level selection on the per-file path.
    let params = FieldParams {
        lat_limits: Some((-5.0, 15.0)),
        lon_limits: Some((80.0, 190.0)),
        level: 1,
        ..FieldParams::new("TEMP", Staggering::T)
    };
    let joint = get_timeseries(&files, &params, &ExtractionOptions::with_file_budget(100))?;
    let per_file = get_timeseries(&files, &params, &ExtractionOptions::with_file_budget(1))?;
    assert_eq!(joint, per_file);
    for (s, v) in per_file.values().iter().enumerate() {
        assert!(close(*v, (s + 1) as f64 + 116.5), "mean {} at step {}", v, s);
    }
    Ok(())
}

#[test]
fn test_smoothed_interior_of_long_series() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 8);
    let window_size = 2;

    for budget in [100, 1] {
        let options = ExtractionOptions::with_file_budget(budget);
        let amoc = get_amoc(
            &files,
            &AmocParams {
                window_size,
                ..AmocParams::default()
            },
            &options,
        )?;
        let mht = get_mht(
            &files,
            &MhtParams {
                window_size,
                ..MhtParams::default()
            },
            &options,
        )?;
        let mst = get_mst(
            &files,
            &MstParams {
                lat0: 45.0,
                window_size,
                ..MstParams::default()
            },
            &options,
        )?;

        // Step i averages steps i - 1 and i; steps 0..3 and 6..8 lack a full window.
        for series in [&amoc, &mht, &mst] {
            assert_eq!(series.len(), 8);
            for i in (0..3).chain(6..8) {
                assert!(series.values()[i].is_nan(), "{} step {}", series.name(), i);
            }
        }
        for i in 3..6 {
            let mean = |f: fn(usize) -> f64| 0.5 * (f(i - 1) + f(i));
            assert!(close(amoc.values()[i], mean(expected_amoc)), "AMOC step {}", i);
            assert!(close(mht.values()[i], mean(expected_mht)), "MHT step {}", i);
            assert!(close(mst.values()[i], mean(expected_mst)), "MST step {}", i);
        }
        assert!(close(amoc.time()[5], 6.0));
    }
    Ok(())
}

#[test]
fn test_default_window_leaves_short_series_undefined() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 3);

    let amoc = get_amoc(&files, &AmocParams::default(), &ExtractionOptions::default())?;
    assert_eq!(amoc.len(), 3);
    assert!(amoc.values().iter().all(|v| v.is_nan()));
    assert_eq!(amoc.time().len(), 3);
    Ok(())
}

#[test]
fn test_heat_and_salt_transport() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 3);
    let options = ExtractionOptions::default();

    let mht = get_mht(
        &files,
        &MhtParams {
            window_size: 1,
            ..MhtParams::default()
        },
        &options,
    )?;
    assert_eq!(mht.name(), "MHT");
    for (s, v) in mht.values().iter().enumerate() {
        assert!(close(*v, expected_mht(s)), "MHT {} at step {}", v, s);
    }

    let params = MstParams {
        lat0: 45.0,
        window_size: 1,
        ..MstParams::default()
    };
    let mst = get_mst(&files, &params, &options)?;
    assert_eq!(mst.name(), "MST");
    assert_eq!(mst.selection().lat0, Some(45.0));
    assert_eq!(mst.selection().component, Some(0));
    for (s, v) in mst.values().iter().enumerate() {
        assert_eq!(*v, expected_mst(s));
    }

    let smoothed = get_mst(&files, &MstParams::default(), &options)?;
    assert!(smoothed.values().iter().all(|v| v.is_nan()));
    Ok(())
}

#[test]
fn test_field_timeseries_over_region() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 2);

    let params = FieldParams {
        lat_limits: Some((-5.0, 15.0)),
        lon_limits: Some((80.0, 190.0)),
        level: 1,
        ..FieldParams::new("TEMP", Staggering::T)
    };
    let ts = get_timeseries(&files, &params, &ExtractionOptions::default())?;

    assert_eq!(ts.name(), "TEMP");
    for (s, v) in ts.values().iter().enumerate() {
        assert!(close(*v, (s + 1) as f64 + 116.5), "mean {} at step {}", v, s);
    }
    assert_eq!(ts.selection().level, Some(1));
    assert_eq!(ts.selection().grid, Some(Staggering::T));
    assert_eq!(ts.selection().reduction, Some(Reduction::NanMean));
    Ok(())
}

#[test]
fn test_field_timeseries_skips_fill_values() -> Result<()> {
    let dir = tempdir()?;
    let files = write_series(dir.path(), 2);
    let options = ExtractionOptions::default();

    let mean = get_timeseries(&files, &FieldParams::new("TEMP", Staggering::T), &options)?;
    for (s, v) in mean.values().iter().enumerate() {
        assert!(close(*v, (s + 1) as f64 + 138.0 / 11.0));
    }

    let params = FieldParams {
        reduction: Reduction::NanMax,
        ..FieldParams::new("SST", Staggering::T)
    };
    let max = get_timeseries(&files, &params, &options)?;
    assert_eq!(max.values(), &[12.0, 13.0]);
    assert_eq!(max.selection().level, None);
    Ok(())
}

#[test]
fn test_empty_file_list_is_rejected() {
    let files: Vec<PathBuf> = Vec::new();
    let err = get_amoc(&files, &AmocParams::default(), &ExtractionOptions::default()).unwrap_err();
    assert!(matches!(err, PoppyError::NoInputFiles));
    assert_eq!(err.to_string(), "No files found. Check your glob pattern.");

    let err = get_mst(&files, &MstParams::default(), &ExtractionOptions::default()).unwrap_err();
    assert!(matches!(err, PoppyError::NoInputFiles));
}

#[test]
fn test_unreadable_file_aborts_series() -> Result<()> {
    let dir = tempdir()?;
    let mut files = write_series(dir.path(), 2);
    files.push(dir.path().join("missing.nc"));

    for budget in [100, 1] {
        let err = get_amoc(&files, &unsmoothed_amoc(), &ExtractionOptions::with_file_budget(budget))
            .unwrap_err();
        match err {
            PoppyError::FileOpen { path, .. } => assert!(path.ends_with("missing.nc")),
            other => panic!("expected FileOpen, got {:?}", other),
        }
    }
    Ok(())
}

#[test]
fn test_missing_calendar_is_a_time_metadata_error() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("no_calendar.nc");
    write_history(&path, 0, None);

    let err = get_amoc(&[&path], &unsmoothed_amoc(), &ExtractionOptions::default()).unwrap_err();
    match err {
        PoppyError::TimeMetadata { var, message } => {
            assert_eq!(var, "time");
            assert!(message.contains("calendar"));
        }
        other => panic!("expected TimeMetadata, got {:?}", other),
    }
    Ok(())
}
