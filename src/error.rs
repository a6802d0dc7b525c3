// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! Failures reading and writing column tables

use miette::Diagnostic;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised by the column table reader and writer
pub enum TableError {
    /// The file could not be read or written
    #[error("IO failure on {path}")]
    #[diagnostic(code(stratum::table::io))]
    Io {
        /// The file being accessed
        path: PathBuf,
        #[source]
        /// The underlying failure
        source: std::io::Error,
    },
    /// A token could not be read as a number
    #[error("line {line}: cannot parse `{token}` as a number")]
    #[diagnostic(code(stratum::table::parse))]
    Parse {
        /// The one-based line number
        line: usize,
        /// The offending token
        token: String,
    },
    /// A row holds a different number of columns to the first row
    #[error("line {line}: expected {expected} columns, found {found}")]
    #[diagnostic(
        code(stratum::table::ragged),
        help("every row must have a position followed by the same number of values")
    )]
    Ragged {
        /// The one-based line number
        line: usize,
        /// The number of columns in the first row
        expected: usize,
        /// The number of columns in this row
        found: usize,
    },
    /// The table has no value column
    #[error("line {line}: a position must be followed by at least one value")]
    #[diagnostic(code(stratum::table::missing_values))]
    MissingValues {
        /// The one-based line number
        line: usize,
    },
    /// The table has no rows
    #[error("the table holds no samples")]
    #[diagnostic(code(stratum::table::empty))]
    Empty,
    /// A baseline profile does not sample the same points as the profile it is added to
    #[error("baseline has {found} samples but the profile has {expected}")]
    #[diagnostic(code(stratum::table::baseline_mismatch))]
    BaselineMismatch {
        /// The number of samples in the profile
        expected: usize,
        /// The number of samples in the baseline
        found: usize,
    },
    #[error(transparent)]
    /// The positions in the table do not form a uniform mesh
    Mesh(#[from] stratum_mesher::MeshError),
}
