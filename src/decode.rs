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

//! Conversion between the solver's flat 0/1 result vector and a course assignment.
//!
//! The solver's variables form a students × courses matrix, flattened in row-major order: entry
//! `i` belongs to student `i / num_courses` and course `i % num_courses` (positions as given by the
//! ordered id lists the preference matrix has been built with).

use super::{Assignment, CourseId, Error, StudentId};
use log::info;
use std::collections::HashMap;

/// Decode the solver's result vector into a course assignment.
///
/// For each 1 entry, the respective course is appended to the student's list, so each student's
/// courses are ordered by ascending course position. Students without any assigned course do not
/// appear in the result. Capacities or the number of courses per student are not checked.
///
/// # Errors
///
/// Fails with `Error::Shape`, if the vector's length is not `students.len() * courses.len()`.
pub fn decode(
    vector: &[u8],
    students: &[StudentId],
    courses: &[CourseId],
) -> Result<Assignment, Error> {
    let expected = students.len() * courses.len();
    let matrix = ndarray::ArrayView2::from_shape((students.len(), courses.len()), vector)
        .ok()
        .filter(|_| vector.len() == expected)
        .ok_or(Error::Shape {
            expected,
            actual: vector.len(),
        })?;

    let mut assignment = Assignment::new();
    for ((student_pos, course_pos), value) in matrix.indexed_iter() {
        if *value == 1 {
            assignment
                .entry(students[student_pos])
                .or_insert_with(Vec::new)
                .push(courses[course_pos]);
        }
    }

    info!(
        "Decoded {} results: {} seats assigned to {} of {} students in {} courses",
        vector.len(),
        vector.iter().filter(|v| **v == 1).count(),
        assignment.len(),
        students.len(),
        courses.len()
    );
    Ok(assignment)
}

/// Encode a course assignment as solver-shaped 0/1 vector (the inverse of `decode()`).
///
/// # Errors
///
/// Fails with `Error::Reference`, if the assignment contains a student or course, which is not
/// contained in the given id lists.
pub fn encode(
    assignment: &Assignment,
    students: &[StudentId],
    courses: &[CourseId],
) -> Result<Vec<u8>, Error> {
    let student_positions: HashMap<StudentId, usize> =
        students.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let course_positions: HashMap<CourseId, usize> =
        courses.iter().enumerate().map(|(i, c)| (*c, i)).collect();

    let mut matrix = ndarray::Array2::<u8>::zeros((students.len(), courses.len()));
    for (student, assigned) in assignment.iter() {
        let s = *student_positions.get(student).ok_or_else(|| {
            Error::Reference(format!("Student {} is not part of the problem.", student))
        })?;
        for course in assigned {
            let c = *course_positions.get(course).ok_or_else(|| {
                Error::Reference(format!("Course {} is not part of the problem.", course))
            })?;
            matrix[[s, c]] = 1;
        }
    }
    Ok(matrix.iter().copied().collect())
}
