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

//! Generation of the preference matrix, which is handed to the external binary integer programming
//! solver.
//!
//! The matrix has one row per student and one column per course, plus two header rows (course ids
//! and course caps) and one header column (student ids). Each inner cell holds the student's best
//! linear rank of the course or the schema's sentinel value, if the student did not list it.

use super::index::{CourseIndex, StudentIndex};
use super::{BallotRecord, BallotSchema, CourseId, Error, Rank, StudentId};
use log::{debug, info};

/// Number of header rows (course ids, course caps) above the students' rows
const HEADER_ROWS: usize = 2;
/// Number of header columns (student ids) left of the courses' columns
const HEADER_COLUMNS: usize = 1;

/// Dense preference matrix including its header rows and column
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceMatrix {
    grid: ndarray::Array2<u32>,
    sentinel: Rank,
}

impl PreferenceMatrix {
    /// The full grid, as it is written for the solver
    pub fn grid(&self) -> &ndarray::Array2<u32> {
        &self.grid
    }

    pub fn num_students(&self) -> usize {
        self.grid.dim().0 - HEADER_ROWS
    }

    pub fn num_courses(&self) -> usize {
        self.grid.dim().1 - HEADER_COLUMNS
    }

    /// Rank of the course at `course_pos` for the student at `student_pos` or None, if the student
    /// did not list the course.
    pub fn rank(&self, student_pos: usize, course_pos: usize) -> Option<Rank> {
        let value = self.grid[[student_pos + HEADER_ROWS, course_pos + HEADER_COLUMNS]];
        if value == self.sentinel {
            None
        } else {
            Some(value)
        }
    }

    /// Student ids in row order
    pub fn student_ids(&self) -> Vec<StudentId> {
        self.grid
            .column(0)
            .iter()
            .skip(HEADER_ROWS)
            .copied()
            .collect()
    }

    /// Course ids in column order
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.grid
            .row(0)
            .iter()
            .skip(HEADER_COLUMNS)
            .copied()
            .collect()
    }

    /// Course caps in column order
    pub fn course_caps(&self) -> Vec<u32> {
        self.grid
            .row(1)
            .iter()
            .skip(HEADER_COLUMNS)
            .copied()
            .collect()
    }
}

/// Build the preference matrix from the ballot records.
///
/// Each record is mapped to its linear rank (see `BallotSchema::rank()`). If a student lists a
/// course more than once, the best (lowest) rank is kept. Thus, the result does not depend on the
/// order of the records, as long as the indexes are the same.
///
/// # Errors
///
/// Fails with `Error::Format`, if a record's tree or branch is out of the schema's bounds, and with
/// `Error::Reference`, if a record's student or course is missing in the indexes.
pub fn build_matrix(
    records: &[BallotRecord],
    students: &StudentIndex,
    courses: &CourseIndex,
    schema: &BallotSchema,
) -> Result<PreferenceMatrix, Error> {
    let sentinel = schema.sentinel();
    assert!(
        sentinel > schema.max_rank(),
        "sentinel must exceed every attainable rank"
    );

    let mut grid = ndarray::Array2::<u32>::from_elem(
        [students.len() + HEADER_ROWS, courses.len() + HEADER_COLUMNS],
        sentinel,
    );

    for record in records {
        schema.check_record(record)?;
        let rank = schema.rank(record.tree, record.branch);
        let r = students.lookup(record.student_id)? + HEADER_ROWS;
        let (course_pos, cap) = courses.lookup(record.course_id)?;
        let c = course_pos + HEADER_COLUMNS;
        debug!(
            "Student {} ranks course {} at {} (tree {}, branch {})",
            record.student_id, record.course_id, rank, record.tree, record.branch
        );

        if grid[[r, c]] > rank {
            grid[[r, c]] = rank;
        }
        grid[[0, c]] = record.course_id;
        grid[[1, c]] = cap;
        grid[[r, 0]] = record.student_id;
    }

    info!(
        "Built preference matrix for {} students and {} courses",
        students.len(),
        courses.len()
    );
    Ok(PreferenceMatrix { grid, sentinel })
}

/// Reorder the ballot records by class year: seniors first, then juniors, sophomores, freshmen
/// and all others.
///
/// The sort is stable, so records of the same class year keep their relative order. Building the
/// indexes from the result puts the students' rows in class priority order.
pub fn order_by_class_year(mut records: Vec<BallotRecord>) -> Vec<BallotRecord> {
    records.sort_by_key(|r| std::cmp::Reverse(r.class_year));
    records
}

#[cfg(test)]
mod tests {
    use super::{build_matrix, order_by_class_year};
    use crate::index::{CourseIndex, StudentIndex};
    use crate::{ballot, BallotRecord, BallotSchema, ClassYear, Error};

    fn build(records: &[BallotRecord]) -> super::PreferenceMatrix {
        let schema = BallotSchema::default();
        let students = StudentIndex::build(records);
        let courses = CourseIndex::build(records);
        build_matrix(records, &students, &courses, &schema).unwrap()
    }

    #[test]
    fn keeps_minimum_rank() {
        let records = vec![ballot(100, 5001, 1, 1), ballot(100, 5001, 2, 3)];
        let matrix = build(&records);
        assert_eq!(matrix.rank(0, 0), Some(1));

        // Same result, if the worse listing comes first
        let records = vec![ballot(100, 5001, 2, 3), ballot(100, 5001, 1, 1)];
        let matrix = build(&records);
        assert_eq!(matrix.rank(0, 0), Some(1));
    }

    #[test]
    fn matrix_layout() {
        let mut records = vec![
            ballot(100, 5001, 1, 1),
            ballot(100, 5002, 1, 4),
            ballot(200, 5002, 2, 3),
            ballot(300, 5003, 3, 7),
        ];
        records[2].course_cap = 35;
        records[3].course_cap = 12;
        let matrix = build(&records);
        let sentinel = BallotSchema::default().sentinel();

        assert_eq!(matrix.grid().dim(), (5, 4));
        assert_eq!(matrix.num_students(), 3);
        assert_eq!(matrix.num_courses(), 3);
        assert_eq!(matrix.course_ids(), vec![5001, 5002, 5003]);
        assert_eq!(matrix.course_caps(), vec![20, 20, 12]);
        assert_eq!(matrix.student_ids(), vec![100, 200, 300]);
        assert_eq!(matrix.grid()[[0, 0]], sentinel);

        assert_eq!(matrix.rank(0, 0), Some(1));
        assert_eq!(matrix.rank(0, 1), Some(4));
        assert_eq!(matrix.rank(0, 2), None);
        assert_eq!(matrix.rank(1, 1), Some(10));
        assert_eq!(matrix.rank(2, 2), Some(21));
        assert_eq!(matrix.grid()[[3, 1]], sentinel);
    }

    #[test]
    fn cells_are_sentinel_or_minimal_rank() {
        let records = vec![
            ballot(1, 10, 1, 2),
            ballot(1, 11, 2, 5),
            ballot(2, 10, 3, 1),
            ballot(1, 10, 4, 7),
            ballot(3, 12, 1, 1),
            ballot(2, 10, 2, 6),
            ballot(3, 11, 10, 7),
        ];
        let schema = BallotSchema::default();
        let students = StudentIndex::build(&records);
        let courses = CourseIndex::build(&records);
        let matrix = build_matrix(&records, &students, &courses, &schema).unwrap();

        for (s, student) in students.ids().iter().enumerate() {
            for (c, course) in courses.ids().iter().enumerate() {
                let expected = records
                    .iter()
                    .filter(|r| r.student_id == *student && r.course_id == *course)
                    .map(|r| schema.rank(r.tree, r.branch))
                    .min();
                assert_eq!(matrix.rank(s, c), expected);
                if let Some(rank) = expected {
                    assert!(rank >= 1 && rank <= schema.max_rank());
                }
            }
        }
    }

    #[test]
    fn row_order_independent() {
        let records = vec![
            ballot(1, 10, 1, 2),
            ballot(2, 11, 2, 5),
            ballot(1, 11, 3, 1),
            ballot(1, 10, 1, 1),
        ];
        let schema = BallotSchema::default();
        let students = StudentIndex::build(&records);
        let courses = CourseIndex::build(&records);
        let matrix = build_matrix(&records, &students, &courses, &schema).unwrap();

        let mut reversed = records.clone();
        reversed.reverse();
        let matrix2 = build_matrix(&reversed, &students, &courses, &schema).unwrap();
        assert_eq!(matrix, matrix2);
    }

    #[test]
    fn rejects_out_of_range_tree() {
        let records = vec![ballot(1, 10, 11, 1)];
        let schema = BallotSchema::default();
        let students = StudentIndex::build(&records);
        let courses = CourseIndex::build(&records);
        assert!(matches!(
            build_matrix(&records, &students, &courses, &schema),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn unindexed_student() {
        let records = vec![ballot(1, 10, 1, 1)];
        let schema = BallotSchema::default();
        let students = StudentIndex::build(&[]);
        let courses = CourseIndex::build(&records);
        assert!(matches!(
            build_matrix(&records, &students, &courses, &schema),
            Err(Error::Reference(_))
        ));
    }

    #[test]
    fn class_year_order() {
        let mut records = vec![
            ballot(1, 10, 1, 1),
            ballot(2, 10, 1, 1),
            ballot(3, 10, 1, 1),
            ballot(1, 11, 1, 2),
            ballot(4, 10, 1, 1),
        ];
        records[0].class_year = ClassYear::Freshman;
        records[1].class_year = ClassYear::Senior;
        records[2].class_year = ClassYear::Other;
        records[3].class_year = ClassYear::Freshman;
        records[4].class_year = ClassYear::Senior;

        let ordered = order_by_class_year(records);
        let ids: Vec<(u32, u32)> = ordered.iter().map(|r| (r.student_id, r.course_id)).collect();
        assert_eq!(ids, vec![(2, 10), (4, 10), (1, 10), (1, 11), (3, 10)]);
        assert_eq!(StudentIndex::build(&ordered).ids(), &[2, 4, 1, 3]);
    }
}
