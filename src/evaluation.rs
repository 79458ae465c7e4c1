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

//! Evaluation of a course assignment against the students' ballots.
//!
//! The assigned courses are looked up in the ballots to recover the (tree, branch) position, at
//! which each student listed them. As students may list the same course several times, the
//! resulting ranking is reduced to the best listing per course with `dedupe()`. The aggregated
//! quality metrics are calculated in the `score` submodule.

pub mod score;


use super::{Assignment, BallotRecord, CourseId, Error, StudentId};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// A course in a student's ranking, together with the position, where the student listed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCourse {
    pub course_id: CourseId,
    pub tree: u32,
    pub branch: u32,
}

impl RankedCourse {
    pub fn new(course_id: CourseId, tree: u32, branch: u32) -> Self {
        RankedCourse {
            course_id,
            tree,
            branch,
        }
    }

    /// Check if this listing is strictly preferred over `other`: lower tree wins, within the same
    /// tree lower branch wins.
    pub fn is_preferred_over(&self, other: &RankedCourse) -> bool {
        (self.tree, self.branch) < (other.tree, other.branch)
    }
}

/// For each student: one entry for every ballot listing of an assigned course, in ballot order.
/// A course, the student listed twice, shows up twice.
pub type RankedAssignment = BTreeMap<StudentId, Vec<RankedCourse>>;

/// For each student: exactly one entry per distinct assigned course, holding its best listing.
pub type DedupedRanking = BTreeMap<StudentId, Vec<RankedCourse>>;

/// Look up the ballot listings of all assigned courses.
///
/// Every record, whose course is assigned to the record's student, contributes one entry to the
/// student's list. Students in the ballots without any assigned course are skipped.
///
/// # Errors
///
/// Fails with `Error::Reference`, if the assignment contains a student or a course, which does not
/// appear anywhere in the ballot records. This indicates that the assignment has not been computed
/// from these ballots.
pub fn build_ranked_assignment(
    assignment: &Assignment,
    records: &[BallotRecord],
) -> Result<RankedAssignment, Error> {
    let known_students: HashSet<StudentId> = records.iter().map(|r| r.student_id).collect();
    let known_courses: HashSet<CourseId> = records.iter().map(|r| r.course_id).collect();
    for (student, courses) in assignment.iter() {
        if !known_students.contains(student) {
            return Err(Error::Reference(format!(
                "Student {} is assigned courses, but has no ballot.",
                student
            )));
        }
        if let Some(course) = courses.iter().find(|c| !known_courses.contains(c)) {
            return Err(Error::Reference(format!(
                "Course {} is assigned to student {}, but does not appear in any ballot.",
                course, student
            )));
        }
    }

    let mut ranked = RankedAssignment::new();
    for record in records {
        if let Some(courses) = assignment.get(&record.student_id) {
            if courses.contains(&record.course_id) {
                ranked
                    .entry(record.student_id)
                    .or_insert_with(Vec::new)
                    .push(RankedCourse::new(record.course_id, record.tree, record.branch));
            }
        }
    }

    for (student, courses) in assignment.iter() {
        let listed = ranked.get(student);
        for course in courses {
            if !listed.map_or(false, |l| l.iter().any(|rc| rc.course_id == *course)) {
                warn!(
                    "Student {} has been assigned course {}, which they did not list.",
                    student, course
                );
            }
        }
    }

    Ok(ranked)
}

/// Reduce each student's ranking to one entry per course, keeping the most preferred listing.
///
/// Entries keep the order of the course's first occurrence. If two listings of a course have the
/// same tree and branch, the first one is kept.
pub fn dedupe(ranked: &RankedAssignment) -> DedupedRanking {
    ranked
        .iter()
        .map(|(student, courses)| {
            let mut unique: Vec<RankedCourse> = Vec::with_capacity(courses.len());
            for entry in courses {
                match unique.iter_mut().find(|u| u.course_id == entry.course_id) {
                    Some(existing) => {
                        if entry.is_preferred_over(existing) {
                            debug!(
                                "Student {}: preferring course {} at ({}, {}) over ({}, {})",
                                student,
                                entry.course_id,
                                entry.tree,
                                entry.branch,
                                existing.tree,
                                existing.branch
                            );
                            *existing = *entry;
                        }
                    }
                    None => unique.push(*entry),
                }
            }
            (*student, unique)
        })
        .collect()
}

/// Count for each student, how many listings of assigned courses are repetitions of an already
/// counted course (number of entries minus number of distinct courses).
///
/// Listing a course more than once may indicate a stronger wish for it. This is a heuristic
/// signal only.
pub fn count_duplicates(ranked: &RankedAssignment) -> BTreeMap<StudentId, usize> {
    ranked
        .iter()
        .map(|(student, courses)| {
            let distinct: HashSet<CourseId> = courses.iter().map(|c| c.course_id).collect();
            (*student, courses.len() - distinct.len())
        })
        .collect()
}
