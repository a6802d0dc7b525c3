// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Column tables hold one sample per row: a position in metres followed by one or more values.
//! Columns are separated by whitespace or commas, and lines starting with `#` are comments.
//! Every entry must be a finite number.
use crate::TableError;
use itertools::izip;
use nalgebra::{DVector, RealField};
use std::{
    fmt::LowerExp,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use stratum_mesher::{Mesh1d, Profile};

/// The contents of a column table
#[derive(Clone, Debug, PartialEq)]
pub struct Table<T> {
    /// The first column
    pub positions: Vec<T>,
    /// The remaining columns, in file order
    pub columns: Vec<Vec<T>>,
}

/// Parse the text of a column table
pub fn parse_table<T: Copy + RealField>(contents: &str) -> Result<Table<T>, TableError> {
    let mut positions = Vec::new();
    let mut columns: Vec<Vec<T>> = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(nalgebra::convert::<f64, T>)
                    .ok_or_else(|| TableError::Parse {
                        line: line_number,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<T>, _>>()?;

        if row.len() < 2 {
            return Err(TableError::MissingValues { line: line_number });
        }
        if columns.is_empty() {
            columns = vec![Vec::new(); row.len() - 1];
        } else if row.len() != columns.len() + 1 {
            return Err(TableError::Ragged {
                line: line_number,
                expected: columns.len() + 1,
                found: row.len(),
            });
        }

        positions.push(row[0]);
        for (column, value) in columns.iter_mut().zip(row.into_iter().skip(1)) {
            column.push(value);
        }
    }

    if positions.is_empty() {
        return Err(TableError::Empty);
    }
    Ok(Table { positions, columns })
}

/// Read the column table at `path`
pub fn read_table<T: Copy + RealField>(path: &Path) -> Result<Table<T>, TableError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&contents)
}

/// Read the first value column of the table at `path` as a profile on the mesh of its positions
pub fn read_profile<T: Copy + RealField>(path: &Path) -> Result<Profile<T>, TableError> {
    let Table {
        positions,
        mut columns,
    } = read_table(path)?;
    let mesh = Mesh1d::from_positions(&positions)?;
    let values = DVector::from_vec(columns.swap_remove(0));
    Ok(Profile::new(mesh, values)?)
}

/// Write `profile` to `path` as `position value` rows
///
/// The rows go to a sibling temporary file which then replaces `path`, so an interrupted write
/// never leaves a partial table behind.
pub fn write_profile<T>(path: &Path, profile: &Profile<T>) -> Result<(), TableError>
where
    T: Copy + RealField + LowerExp,
{
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);

    let result = write_rows(&temporary, profile).and_then(|_| std::fs::rename(&temporary, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&temporary);
    }
    result.map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_rows<T>(path: &Path, profile: &Profile<T>) -> std::io::Result<()>
where
    T: Copy + RealField + LowerExp,
{
    let mut writer = BufWriter::new(File::create(path)?);
    for (vertex, value) in izip!(profile.mesh().vertices(), profile.values().iter()) {
        writeln!(writer, "{:e}\t{:e}", vertex.x, value)?;
    }
    writer.flush()
}
