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

//! Reading the WebTree ballot export (comma separated table with a header row).

use super::split_row;
use crate::{BallotRecord, BallotSchema, ClassYear, Error};
use log::info;
use std::io::BufRead;

/// Positions of the relevant columns in the table, determined from the header row
struct ColumnPositions {
    student_id: usize,
    class_year: usize,
    course_id: usize,
    tree: usize,
    branch: usize,
    course_cap: usize,
}

impl ColumnPositions {
    fn from_header(header: &[&str], schema: &BallotSchema) -> Result<ColumnPositions, Error> {
        let find = |name: &str| {
            header.iter().position(|h| *h == name).ok_or_else(|| {
                Error::Format(format!("No column '{}' found in ballot header.", name))
            })
        };
        let columns = &schema.columns;
        Ok(ColumnPositions {
            student_id: find(columns.student_id.as_str())?,
            class_year: find(columns.class_year.as_str())?,
            course_id: find(columns.course_id.as_str())?,
            tree: find(columns.tree.as_str())?,
            branch: find(columns.branch.as_str())?,
            course_cap: find(columns.course_cap.as_str())?,
        })
    }
}

/// Read all ballot records from a Reader (e.g. an open file).
///
/// The first non-empty line is interpreted as the header row. The relevant columns are located by
/// the names given in the schema, all other columns are ignored. Records are returned in file
/// order.
///
/// # Errors
///
/// Fails with `Error::Format`, if a relevant column is missing, a row is too short, an integer
/// field cannot be parsed or a record's tree/branch is out of the schema's bounds. No partial
/// result is returned.
pub fn read<R: std::io::Read>(
    reader: R,
    schema: &BallotSchema,
) -> Result<Vec<BallotRecord>, Error> {
    let reader = std::io::BufReader::new(reader);
    let mut positions: Option<ColumnPositions> = None;
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(&line);
        let pos = match positions {
            Some(ref p) => p,
            None => {
                // Spreadsheet exports often start with a byte order mark
                let header = split_row(line.trim_start_matches('\u{feff}'));
                positions = Some(ColumnPositions::from_header(&header, schema)?);
                continue;
            }
        };

        let field = |index: usize, name: &str| {
            fields.get(index).copied().ok_or_else(|| {
                Error::Format(format!("Line {}: missing field '{}'.", i + 1, name))
            })
        };
        let integer = |index: usize, name: &str| -> Result<u32, Error> {
            let value = field(index, name)?;
            value.parse().map_err(|e: std::num::ParseIntError| {
                Error::Format(format!(
                    "Line {}: field '{}' is not a valid integer ('{}'): {}",
                    i + 1,
                    name,
                    value,
                    e
                ))
            })
        };

        let columns = &schema.columns;
        let record = BallotRecord {
            student_id: integer(pos.student_id, columns.student_id.as_str())?,
            class_year: ClassYear::from_tag(field(pos.class_year, columns.class_year.as_str())?),
            course_id: integer(pos.course_id, columns.course_id.as_str())?,
            tree: integer(pos.tree, columns.tree.as_str())?,
            branch: integer(pos.branch, columns.branch.as_str())?,
            course_cap: integer(pos.course_cap, columns.course_cap.as_str())?,
        };
        schema.check_record(&record)?;
        records.push(record);
    }

    if positions.is_none() {
        return Err(Error::Format("Ballot file has no header row.".to_owned()));
    }
    info!("Read {} ballot records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use crate::{BallotSchema, ClassYear, Error};

    #[test]
    fn parse_ballot_file() {
        let data = include_bytes!("test_ressources/ballots.csv");
        let records = super::read(&data[..], &BallotSchema::default()).unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].student_id, 100);
        assert_eq!(records[0].class_year, ClassYear::Sophomore);
        assert_eq!(records[2].course_id, 5001);
        assert_eq!(records[2].tree, 2);
        assert_eq!(records[2].branch, 3);
        assert_eq!(records[4].course_cap, 10);
        assert_eq!(records[3].class_year, ClassYear::Senior);
        assert_eq!(records[8].class_year, ClassYear::Freshman);
    }

    #[test]
    fn columns_by_header_name() {
        let data = "SEQ,CRN,ID,BRANCH,TREE,CLASS,COURSE_CEILING\n\
                    1,5001,42,3,2,JUNI,25\n\
                    \n\
                    2,5002,42,1,1,OTHR,10\n";
        let records = super::read(data.as_bytes(), &BallotSchema::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].student_id, 42);
        assert_eq!(records[0].course_id, 5001);
        assert_eq!((records[0].tree, records[0].branch), (2, 3));
        assert_eq!(records[0].class_year, ClassYear::Junior);
        assert_eq!(records[1].class_year, ClassYear::Other);
        assert_eq!(records[1].course_cap, 10);
    }

    #[test]
    fn header_with_byte_order_mark() {
        let data = "\u{feff}ID,CLASS,CRN,TREE,BRANCH,COURSE_CEILING\n100,SOPH,5001,1,1,20\n";
        let records = super::read(data.as_bytes(), &BallotSchema::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_id, 100);
        assert_eq!(records[0].course_id, 5001);
    }

    #[test]
    fn non_numeric_field() {
        let data = "ID,CLASS,CRN,TREE,BRANCH,COURSE_CEILING\n\
                    100,SOPH,5001,1,1,20\n\
                    100,SOPH,50x2,1,2,20\n";
        let result = super::read(data.as_bytes(), &BallotSchema::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn missing_column() {
        let data = "ID,CLASS,CRN,TREE,COURSE_CEILING\n100,SOPH,5001,1,20\n";
        let result = super::read(data.as_bytes(), &BallotSchema::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn branch_out_of_range() {
        let data = "ID,CLASS,CRN,TREE,BRANCH,COURSE_CEILING\n100,SOPH,5001,1,8,20\n";
        let result = super::read(data.as_bytes(), &BallotSchema::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn empty_file() {
        let result = super::read(&b""[..], &BallotSchema::default());
        assert!(matches!(result, Err(Error::Format(_))));
    }
}
