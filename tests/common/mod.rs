//! Synthetic POP history files for the integration tests
#![allow(dead_code)]

use netcdf::{create, FileMut};
use std::path::{Path, PathBuf};

pub const NLAT: usize = 3;
pub const NLON: usize = 4;
pub const LAT_AUX: [f64; 4] = [0.0, 30.0, 45.0, 60.0];
/// MOC depth axis in cm
pub const MOC_Z: [f64; 3] = [0.0, 50_000.0, 100_000.0];
pub const POP_FILL: f64 = 9.969_209_968_386_869e36;

pub fn put_var(file: &mut FileMut, name: &str, dims: &[&str], values: &[f64], attrs: &[(&str, &str)]) {
    let mut var = file
        .add_variable::<f64>(name, dims)
        .expect("Failed to add variable");
    for (key, value) in attrs {
        var.put_attribute(key, *value).expect("Failed to add attribute");
    }
    var.put_values(values, ..).expect("Failed to write data");
}

/// Time coordinate of one step, `days` after year zero of a noleap calendar
pub fn put_time(file: &mut FileMut, days: &[f64], calendar: Option<&str>) {
    let mut var = file
        .add_variable::<f64>("time", &["time"])
        .expect("Failed to add time");
    var.put_attribute("units", "days since 0000-01-01 00:00:00")
        .expect("Failed to add units");
    if let Some(calendar) = calendar {
        var.put_attribute("calendar", calendar)
            .expect("Failed to add calendar");
    }
    var.put_values(days, ..).expect("Failed to write time");
}

/// Expected AMOC maximum of step `s` (0-based)
pub fn expected_amoc(s: usize) -> f64 {
    10.0 * (s + 1) as f64 + 23.0
}

/// Expected heat transport maximum of step `s`
pub fn expected_mht(s: usize) -> f64 {
    (s + 1) as f64 + 0.3
}

/// Expected salt transport at 45N of step `s`
pub fn expected_mst(s: usize) -> f64 {
    100.0 * (s + 1) as f64 + 2.0
}

/// One-step history file for model year `s + 1`.
///
/// Holds `MOC`, `N_HEAT` and `N_SALT` with marker values outside the cells
/// the extractors select, plus a small T grid with `TEMP` and `SST`.
pub fn write_history(path: &Path, s: usize, calendar: Option<&str>) {
    let mut file = create(path).expect("Failed to create NetCDF file");
    for (name, len) in [
        ("time", 1),
        ("transport_reg", 2),
        ("moc_comp", 2),
        ("transport_comp", 5),
        ("moc_z", MOC_Z.len()),
        ("lat_aux_grid", LAT_AUX.len()),
        ("z_t", 2),
        ("nlat", NLAT),
        ("nlon", NLON),
    ] {
        file.add_dimension(name, len).expect("Failed to add dimension");
    }

    put_time(&mut file, &[365.0 * (s + 1) as f64], calendar);
    put_var(&mut file, "moc_z", &["moc_z"], &MOC_Z, &[("units", "centimeters")]);
    put_var(&mut file, "lat_aux_grid", &["lat_aux_grid"], &LAT_AUX, &[("units", "degrees_north")]);

    let base = (s + 1) as f64;
    let mut moc = Vec::new();
    for r in 0..2 {
        for c in 0..2 {
            for z in 0..MOC_Z.len() {
                for l in 0..LAT_AUX.len() {
                    moc.push(if r == 1 && c == 0 && z >= 1 && l >= 1 {
                        10.0 * base + 10.0 * z as f64 + l as f64
                    } else {
                        999.0
                    });
                }
            }
        }
    }
    put_var(
        &mut file,
        "MOC",
        &["time", "transport_reg", "moc_comp", "moc_z", "lat_aux_grid"],
        &moc,
        &[("long_name", "Meridional Overturning Circulation")],
    );

    let mut nheat = Vec::new();
    let mut nsalt = Vec::new();
    for r in 0..2 {
        for c in 0..5 {
            for l in 0..LAT_AUX.len() {
                let selected = r == 0 && c == 0;
                nheat.push(if selected && l >= 1 { base + 0.1 * l as f64 } else { 999.0 });
                nsalt.push(if selected { 100.0 * base + l as f64 } else { 5000.0 });
            }
        }
    }
    let transport_dims = ["time", "transport_reg", "transport_comp", "lat_aux_grid"];
    put_var(&mut file, "N_HEAT", &transport_dims, &nheat, &[("long_name", "Northward Heat Transport")]);
    put_var(&mut file, "N_SALT", &transport_dims, &nsalt, &[("long_name", "Northward Salt Transport")]);

    let tlat: Vec<f64> = (0..NLAT * NLON).map(|n| [-10.0, 0.0, 10.0][n / NLON]).collect();
    let tlong: Vec<f64> = (0..NLAT * NLON).map(|n| 90.0 * (n % NLON) as f64).collect();
    let kmt: Vec<f64> = (0..NLAT * NLON).map(|n| if n == 0 { 0.0 } else { 2.0 }).collect();
    put_var(&mut file, "TLAT", &["nlat", "nlon"], &tlat, &[]);
    put_var(&mut file, "TLONG", &["nlat", "nlon"], &tlong, &[]);
    put_var(&mut file, "KMT", &["nlat", "nlon"], &kmt, &[]);

    let mut temp = Vec::new();
    for k in 0..2 {
        for j in 0..NLAT {
            for i in 0..NLON {
                temp.push(if j == 0 && i == 0 {
                    POP_FILL
                } else {
                    base + 100.0 * k as f64 + 10.0 * j as f64 + i as f64
                });
            }
        }
    }
    put_var(
        &mut file,
        "TEMP",
        &["time", "z_t", "nlat", "nlon"],
        &temp,
        &[("long_name", "Potential Temperature"), ("units", "degC")],
    );
    let sst: Vec<f64> = (0..NLAT * NLON).map(|n| base + n as f64).collect();
    put_var(&mut file, "SST", &["time", "nlat", "nlon"], &sst, &[("long_name", "Surface Potential Temperature")]);
}

/// Writes `n` consecutive history files into `dir`
pub fn write_series(dir: &Path, n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|s| {
            let path = dir.join(format!("hist.{:04}.nc", s + 1));
            write_history(&path, s, Some("noleap"));
            path
        })
        .collect()
}

pub const GRID_N: usize = 5;

/// Uniform 5x5 grid with two 10 m layers, 1 km spacing and one time step.
fn create_budget_grid(path: &Path) -> FileMut {
    let mut file = create(path).expect("Failed to create NetCDF file");
    file.add_dimension("time", 1).expect("Failed to add time");
    file.add_dimension("z_t", 2).expect("Failed to add z_t");
    file.add_dimension("nlat", GRID_N).expect("Failed to add nlat");
    file.add_dimension("nlon", GRID_N).expect("Failed to add nlon");

    put_time(&mut file, &[0.0], Some("noleap"));
    put_var(&mut file, "dz", &["z_t"], &[1000.0, 1000.0], &[("units", "centimeters")]);

    let cells = GRID_N * GRID_N;
    let lat: Vec<f64> = (0..cells).map(|n| 10.0 * (n / GRID_N) as f64).collect();
    let lon: Vec<f64> = (0..cells).map(|n| 10.0 * (n % GRID_N) as f64).collect();
    for name in ["TLAT", "ULAT"] {
        put_var(&mut file, name, &["nlat", "nlon"], &lat, &[]);
    }
    for name in ["TLONG", "ULONG"] {
        put_var(&mut file, name, &["nlat", "nlon"], &lon, &[]);
    }
    for name in ["DXT", "DYT", "DXU", "DYU"] {
        put_var(&mut file, name, &["nlat", "nlon"], &vec![1e5; cells], &[("units", "cm")]);
    }
    for name in ["TAREA", "UAREA"] {
        put_var(&mut file, name, &["nlat", "nlon"], &vec![1e10; cells], &[("units", "cm^2")]);
    }
    for name in ["KMT", "KMU"] {
        put_var(&mut file, name, &["nlat", "nlon"], &vec![2.0; cells], &[]);
    }
    file
}

const LAYERED: [&str; 4] = ["time", "z_t", "nlat", "nlon"];

/// Same `value(j, i)` in both layers
fn layered_field(value: impl Fn(usize, usize) -> f64) -> Vec<f64> {
    (0..2 * GRID_N * GRID_N)
        .map(|n| value((n / GRID_N) % GRID_N, n % GRID_N))
        .collect()
}

/// Budget grid where `UVEL` and `UES` grow eastward by 1 per column and
/// the other fields are uniform.
pub fn write_budget_file(path: &Path) {
    let mut file = create_budget_grid(path);
    let column = layered_field(|_, i| i as f64);
    put_var(&mut file, "UVEL", &LAYERED, &column, &[("units", "centimeter/s")]);
    put_var(&mut file, "UES", &LAYERED, &column, &[]);
    for (name, value) in [
        ("VVEL", 0.0),
        ("VNS", 0.0),
        ("UISOP", 3.0),
        ("VISOP", 0.0),
        ("KAPPA_ISOP", 1e7),
        ("TEMP", 2.0),
        ("SALT", 35.0),
    ] {
        put_var(&mut file, name, &LAYERED, &layered_field(|_, _| value), &[]);
    }
    let cells = GRID_N * GRID_N;
    put_var(&mut file, "ADVT_ISOP", &["time", "nlat", "nlon"], &vec![2.0; cells], &[]);
}

/// Budget grid with non-uniform tracers:
///
/// - `VVEL = j` cm/s and `UVEL = 0`
/// - `SALT` half the reference salinity, so the freshwater fraction is 0.5
/// - `TEMP = i²` degC
/// - `UISOP` 3 cm/s west of column 2 and -3 cm/s from it on, `VISOP = 0`
/// - `KAPPA_ISOP = 1e7` cm²/s
pub fn write_tracer_budget_file(path: &Path) {
    let mut file = create_budget_grid(path);
    put_var(&mut file, "UVEL", &LAYERED, &layered_field(|_, _| 0.0), &[]);
    put_var(&mut file, "VVEL", &LAYERED, &layered_field(|j, _| j as f64), &[]);
    put_var(&mut file, "SALT", &LAYERED, &layered_field(|_, _| 17.4), &[]);
    put_var(&mut file, "TEMP", &LAYERED, &layered_field(|_, i| (i * i) as f64), &[]);
    let uisop = layered_field(|_, i| if i < 2 { 3.0 } else { -3.0 });
    put_var(&mut file, "UISOP", &LAYERED, &uisop, &[]);
    put_var(&mut file, "VISOP", &LAYERED, &layered_field(|_, _| 0.0), &[]);
    put_var(&mut file, "KAPPA_ISOP", &LAYERED, &layered_field(|_, _| 1e7), &[]);
}
