// Copyright 2020 by Michael Thies <mail@mhthies.de>
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Writing the preference matrix table for the solver and reading its id axes back in.

use super::split_row;
use crate::preferences::PreferenceMatrix;
use crate::{CourseId, Error, StudentId};
use std::io::BufRead;

/// Write the full preference matrix (including header rows and column) as comma separated table
/// to a Writer (e.g. an output file).
pub fn write<W: std::io::Write>(mut writer: W, matrix: &PreferenceMatrix) -> Result<(), Error> {
    for row in matrix.grid().rows() {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<String>>()
            .join(",");
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the ordered student ids and course ids from a preference matrix table, as written by
/// `write()`.
///
/// The course ids are taken from the first row (skipping the corner cell), the student ids from
/// the first column of every row after the two header rows.
///
/// # Errors
///
/// Fails with `Error::Format`, if the table has less than two rows or an id is not an integer.
pub fn read_axes<R: std::io::Read>(
    reader: R,
) -> Result<(Vec<StudentId>, Vec<CourseId>), Error> {
    let reader = std::io::BufReader::new(reader);
    let mut courses = None;
    let mut students = Vec::new();
    let mut num_rows = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(&line);
        let parse = |value: &str| -> Result<u32, Error> {
            value.parse().map_err(|e: std::num::ParseIntError| {
                Error::Format(format!(
                    "Line {} of preference matrix: '{}' is not a valid id: {}",
                    i + 1,
                    value,
                    e
                ))
            })
        };
        match num_rows {
            0 => {
                courses = Some(
                    fields
                        .iter()
                        .skip(1)
                        .map(|v| parse(*v))
                        .collect::<Result<Vec<CourseId>, Error>>()?,
                );
            }
            1 => {}
            _ => students.push(parse(fields[0])?),
        }
        num_rows += 1;
    }

    if num_rows < 2 {
        return Err(Error::Format(
            "Preference matrix table is missing its header rows.".to_owned(),
        ));
    }
    Ok((students, courses.unwrap_or_default()))
}
