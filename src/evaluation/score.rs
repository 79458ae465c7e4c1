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

//! Population-level quality metrics of a course assignment.

use super::{build_ranked_assignment, count_duplicates, dedupe, DedupedRanking};
use crate::{Assignment, BallotRecord, BallotSchema, Error, StudentId};
use log::{debug, info};
use num_traits::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

/// Quality report of one course assignment. Summaries of different assignments for the same
/// ballots are directly comparable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Mean number of repeated listings of assigned courses per student
    pub average_duplicates: f64,
    /// Mean of the students' mean tree of their assigned courses
    pub average_tree: f64,
    /// Mean of the students' mean branch of their assigned courses
    pub average_branch: f64,
    /// Mean number of courses per student in the assignment
    pub average_courses_assigned: f64,
    /// Sum of happiness over all assigned courses (see `happiness()`)
    pub happiness: u64,
    /// Number of students in the assignment
    pub num_students: usize,
}

/// Arithmetic mean of the values. `what` names the population for the error message.
fn mean<T: ToPrimitive, I: IntoIterator<Item = T>>(
    values: I,
    what: &'static str,
) -> Result<f64, Error> {
    let (sum, count) = values
        .into_iter()
        .filter_map(|v| v.to_f64())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return Err(Error::EmptyPopulation(what));
    }
    Ok(sum / count as f64)
}

/// Mean number of duplicate listings over all students
pub fn average_duplicate_score(counts: &BTreeMap<StudentId, usize>) -> Result<f64, Error> {
    mean(counts.values().copied(), "students with duplicate counts")
}

/// Mean tree and mean branch of the assigned courses.
///
/// Each student's mean tree and branch is calculated first, then these per-student means are
/// averaged. Thus, every student has the same weight, regardless of the number of assigned
/// courses. Students with an empty ranking do not contribute.
pub fn average_tree_branch(deduped: &DedupedRanking) -> Result<(f64, f64), Error> {
    let per_student: Vec<(f64, f64)> = deduped
        .iter()
        .filter(|(_s, courses)| !courses.is_empty())
        .map(|(student, courses)| {
            let n = courses.len() as f64;
            let tree = courses.iter().map(|c| c.tree as f64).sum::<f64>() / n;
            let branch = courses.iter().map(|c| c.branch as f64).sum::<f64>() / n;
            debug!(
                "Student {}: mean tree {:.2}, mean branch {:.2}",
                student, tree, branch
            );
            (tree, branch)
        })
        .collect();

    Ok((
        mean(per_student.iter().map(|(t, _b)| *t), "ranked students")?,
        mean(per_student.iter().map(|(_t, b)| *b), "ranked students")?,
    ))
}

/// Mean number of assigned courses per student
pub fn average_courses_assigned(assignment: &Assignment) -> Result<f64, Error> {
    mean(
        assignment.values().map(|courses| courses.len()),
        "assigned students",
    )
}

/// Total happiness of all students with their assigned courses.
///
/// Each distinct assigned course is worth `happiness_levels - (rank - 1)`, i.e. a first choice
/// counts `happiness_levels` and every rank further down one less, but never below zero.
pub fn happiness(deduped: &DedupedRanking, schema: &BallotSchema) -> u64 {
    deduped
        .values()
        .flat_map(|courses| courses.iter())
        .map(|c| {
            let rank = schema.rank(c.tree, c.branch);
            schema.happiness_levels().saturating_sub(rank.saturating_sub(1)) as u64
        })
        .sum()
}

/// Calculate the quality summary of an assignment computed for the given ballot records.
///
/// Fails with `Error::Format`, if a record's tree or branch is out of the schema's bounds.
pub fn evaluate(
    assignment: &Assignment,
    records: &[BallotRecord],
    schema: &BallotSchema,
) -> Result<Summary, Error> {
    for record in records {
        schema.check_record(record)?;
    }
    let ranked = build_ranked_assignment(assignment, records)?;
    let duplicates = count_duplicates(&ranked);
    let deduped = dedupe(&ranked);

    let (average_tree, average_branch) = average_tree_branch(&deduped)?;
    let summary = Summary {
        average_duplicates: average_duplicate_score(&duplicates)?,
        average_tree,
        average_branch,
        average_courses_assigned: average_courses_assigned(assignment)?,
        happiness: happiness(&deduped, schema),
        num_students: assignment.len(),
    };
    info!(
        "Evaluated assignment of {} students: mean tree {:.3}, mean branch {:.3}",
        summary.num_students, summary.average_tree, summary.average_branch
    );
    Ok(summary)
}

/// Read a matching file and the ballot file and calculate the assignment's quality summary.
pub fn compose_summary<R1: std::io::Read, R2: std::io::Read>(
    matching: R1,
    ballots: R2,
    schema: &BallotSchema,
) -> Result<Summary, Error> {
    let assignment = crate::io::matching::read(matching)?;
    let records = crate::io::ballots::read(ballots, schema)?;
    evaluate(&assignment, &records, schema)
}
