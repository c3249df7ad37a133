//! Whitespace-text readers and writers for load cases and results
//!
//! Output files carry a single `#`-prefixed header line; numeric cells are
//! written in signed scientific notation with 16 fractional digits in
//! 24-character columns, matching the upstream tooling.

use std::fs;
use std::path::Path;

use nalgebra::{DMatrix, DVector};

use crate::error::{FeaError, FeaResult};
use crate::loads::TimeSeries;
use crate::model::Model;
use crate::results::SensorSet;

/// Column width of the response tables
const COLUMN: usize = 24;

/// Render a value like numpy's `% .16e`: sign slot, 16 fractional digits,
/// two-digit signed exponent
pub fn format_scientific(value: f64) -> String {
    let raw = format!("{:.16e}", value);
    let (mantissa, exponent) = raw.split_once('e').expect("float format");
    let exp: i32 = exponent.parse().expect("float exponent");
    if value.is_sign_negative() {
        format!("{mantissa}e{exp:+03}")
    } else {
        format!(" {mantissa}e{exp:+03}")
    }
}

fn parse_floats(line: &str, path: &Path) -> FeaResult<Vec<f64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                FeaError::InvalidConfig(format!(
                    "malformed number {:?} in {}",
                    tok,
                    path.display()
                ))
            })
        })
        .collect()
}

fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Read a single-record load case: velocity and magnitude
pub fn read_load_case_single(path: &Path) -> FeaResult<(f64, f64)> {
    let content = fs::read_to_string(path)?;
    let values = data_lines(&content)
        .map(|line| parse_floats(line, path))
        .collect::<FeaResult<Vec<_>>>()?
        .concat();
    if values.len() < 2 {
        return Err(FeaError::InvalidConfig(format!(
            "{} needs velocity and magnitude",
            path.display()
        )));
    }
    Ok((values[0], values[1]))
}

/// Read an N x 2 (time, force) load case into a time series
pub fn read_load_case_series(path: &Path) -> FeaResult<TimeSeries> {
    let content = fs::read_to_string(path)?;
    let mut times = Vec::new();
    let mut values = Vec::new();
    for line in data_lines(&content) {
        let row = parse_floats(line, path)?;
        if row.len() != 2 {
            return Err(FeaError::InvalidConfig(format!(
                "{} expects two columns, found {}",
                path.display(),
                row.len()
            )));
        }
        times.push(row[0]);
        values.push(row[1]);
    }
    TimeSeries::new(times, values)
}

/// Read an N x (1 + nodes) load case: a time column plus one force column
/// per loaded node
pub fn read_load_case_table(path: &Path) -> FeaResult<(Vec<f64>, Vec<Vec<f64>>)> {
    let content = fs::read_to_string(path)?;
    let mut times = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    for line in data_lines(&content) {
        let row = parse_floats(line, path)?;
        if row.len() < 2 {
            return Err(FeaError::InvalidConfig(format!(
                "{} expects a time column plus node columns",
                path.display()
            )));
        }
        if columns.is_empty() {
            columns = vec![Vec::new(); row.len() - 1];
        } else if columns.len() != row.len() - 1 {
            return Err(FeaError::InvalidConfig(format!(
                "ragged rows in {}",
                path.display()
            )));
        }
        times.push(row[0]);
        for (col, &val) in columns.iter_mut().zip(&row[1..]) {
            col.push(val);
        }
    }
    Ok((times, columns))
}

/// Write the sensor node labels and coordinates (`label x y`)
pub fn write_sensor_nodes(path: &Path, model: &Model, sensors: &SensorSet) -> FeaResult<()> {
    let mut out = String::from("# label  x  y\n");
    for &label in sensors.labels() {
        let node = &model.nodes[label];
        out.push_str(&format!("{} {:10.5} {:10.5}\n", label, node.x(), node.y()));
    }
    fs::write(path, out)?;
    Ok(())
}

/// Write one frequency per line
pub fn write_frequencies(path: &Path, frequencies: &DVector<f64>) -> FeaResult<()> {
    let mut out = String::new();
    for f in frequencies.iter() {
        out.push_str(&format_scientific(*f));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Header of per-sensor response columns, each padded to the table width
pub fn response_header(labels: &[usize], components: &[&str]) -> String {
    let mut header = String::new();
    for &label in labels {
        for comp in components {
            let cell = format!("Node-{label}-{comp}");
            header.push_str(&format!("{:<width$}", cell, width = COLUMN));
        }
    }
    header
}

/// Write a response table: one `#`-prefixed header line, then one row per
/// matrix row in scientific notation
pub fn write_table(path: &Path, header: &str, data: &DMatrix<f64>) -> FeaResult<()> {
    let mut out = String::with_capacity((data.nrows() + 1) * (data.ncols() + 1) * COLUMN);
    out.push_str("# ");
    out.push_str(header);
    out.push('\n');
    for i in 0..data.nrows() {
        let row: Vec<String> = (0..data.ncols())
            .map(|j| format_scientific(data[(i, j)]))
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Write mode shapes at the sensor DOFs: one row per DOF, one column per mode
pub fn write_modes(path: &Path, sensors: &SensorSet, modes: &DMatrix<f64>) -> FeaResult<()> {
    let mut header = String::new();
    for &label in sensors.labels() {
        header.push_str(&format!("{label}x   {label}y   "));
    }
    write_table(path, header.trim_end(), modes)
}
