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

//! Preprocessing and evaluation tooling for WebTree course allocation.
//!
//! Students submit their course wishes as "trees" (top-level preference categories) with
//! "branches" (sub-ranks within a tree). This crate turns those ballots into a preference matrix
//! for an external binary integer programming solver, decodes the solver's flat 0/1 result into a
//! course assignment and scores assignments against the students' stated preferences.

pub mod decode;
pub mod evaluation;
pub mod index;
pub mod io;
pub mod preferences;

use std::collections::BTreeMap;
use std::fmt;

/// Student id as given in the ballot data
pub type StudentId = u32;
/// Course section id (CRN)
pub type CourseId = u32;
/// Linear preference rank of a course for a student. Lower is better, 1 is the best possible rank.
pub type Rank = u32;

/// Course assignment: list of assigned course ids for each student, in the order they have been
/// decoded (ascending course index). Students are iterated by ascending id.
pub type Assignment = BTreeMap<StudentId, Vec<CourseId>>;

/// Class year of a student, as given by the tags in the ballot data.
///
/// The derived ordering puts `Other` lowest and `Senior` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassYear {
    Other,
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl ClassYear {
    /// Interpret a class year tag of the ballot data. Unknown tags are mapped to `Other`.
    pub fn from_tag(tag: &str) -> ClassYear {
        match tag.trim() {
            "SENI" => ClassYear::Senior,
            "JUNI" => ClassYear::Junior,
            "SOPH" => ClassYear::Sophomore,
            "FRST" => ClassYear::Freshman,
            _ => ClassYear::Other,
        }
    }
}

/// One row of the ballot data: a single listing of a course in a student's preference tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotRecord {
    pub student_id: StudentId,
    pub class_year: ClassYear,
    pub course_id: CourseId,
    /// Number of the tree, the course is listed in (starting at 1)
    pub tree: u32,
    /// Position within the tree (starting at 1)
    pub branch: u32,
    /// Maximum number of seats in the course section
    pub course_cap: u32,
}

/// Names of the ballot table's columns, we are interested in. All other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotColumns {
    pub student_id: String,
    pub class_year: String,
    pub course_id: String,
    pub tree: String,
    pub branch: String,
    pub course_cap: String,
}

impl Default for BallotColumns {
    fn default() -> Self {
        BallotColumns {
            student_id: "ID".to_owned(),
            class_year: "CLASS".to_owned(),
            course_id: "CRN".to_owned(),
            tree: "TREE".to_owned(),
            branch: "BRANCH".to_owned(),
            course_cap: "COURSE_CEILING".to_owned(),
        }
    }
}

/// Description of the ballot format and the ranking parameters derived from it.
///
/// This value is passed to every function, which needs to know about column names or the shape
/// of the preference trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotSchema {
    pub columns: BallotColumns,
    /// Number of branches in each tree
    branch_count: u32,
    /// Highest tree number a ballot may use
    max_tree_rank: u32,
    /// Placeholder rank for courses a student did not list. Always greater than any real rank.
    sentinel: Rank,
    /// Happiness gained by getting the first choice (see `evaluation::score::happiness()`)
    happiness_levels: u32,
}

pub const DEFAULT_BRANCH_COUNT: u32 = 7;
pub const DEFAULT_MAX_TREE_RANK: u32 = 10;
pub const DEFAULT_SENTINEL: Rank = 10000;
pub const DEFAULT_HAPPINESS_LEVELS: u32 = 25;

impl BallotSchema {
    /// Create a new schema with default column names.
    ///
    /// Fails with `Error::Format`, if branch_count or max_tree_rank is zero or the sentinel does
    /// not exceed the highest attainable rank.
    pub fn new(
        branch_count: u32,
        max_tree_rank: u32,
        sentinel: Rank,
        happiness_levels: u32,
    ) -> Result<BallotSchema, Error> {
        if branch_count == 0 || max_tree_rank == 0 {
            return Err(Error::Format(
                "Branch count and maximum tree number must be positive.".to_owned(),
            ));
        }
        let max_rank = branch_count.checked_mul(max_tree_rank).ok_or_else(|| {
            Error::Format("Maximum rank exceeds the rank type's range.".to_owned())
        })?;
        if sentinel <= max_rank {
            return Err(Error::Format(format!(
                "Sentinel rank {} does not exceed the maximum attainable rank {}.",
                sentinel, max_rank
            )));
        }
        Ok(BallotSchema {
            columns: BallotColumns::default(),
            branch_count,
            max_tree_rank,
            sentinel,
            happiness_levels,
        })
    }

    pub fn branch_count(&self) -> u32 {
        self.branch_count
    }

    pub fn max_tree_rank(&self) -> u32 {
        self.max_tree_rank
    }

    pub fn sentinel(&self) -> Rank {
        self.sentinel
    }

    pub fn happiness_levels(&self) -> u32 {
        self.happiness_levels
    }

    /// Highest rank a ballot listing can be mapped to
    pub fn max_rank(&self) -> Rank {
        self.branch_count * self.max_tree_rank
    }

    /// Linear preference rank of a (tree, branch) pair.
    ///
    /// Only meaningful for pairs within the schema's bounds (see `check_record()`). Pairs beyond
    /// these bounds saturate at the rank type's maximum instead of overflowing.
    pub fn rank(&self, tree: u32, branch: u32) -> Rank {
        self.branch_count
            .saturating_mul(tree.saturating_sub(1))
            .saturating_add(branch)
    }

    /// Check that a ballot record's tree and branch are within the bounds of this schema.
    pub fn check_record(&self, record: &BallotRecord) -> Result<(), Error> {
        if record.tree < 1 || record.tree > self.max_tree_rank {
            return Err(Error::Format(format!(
                "Tree {} of student {} for course {} is out of range 1..={}",
                record.tree, record.student_id, record.course_id, self.max_tree_rank
            )));
        }
        if record.branch < 1 || record.branch > self.branch_count {
            return Err(Error::Format(format!(
                "Branch {} of student {} for course {} is out of range 1..={}",
                record.branch, record.student_id, record.course_id, self.branch_count
            )));
        }
        Ok(())
    }
}

impl Default for BallotSchema {
    fn default() -> Self {
        BallotSchema {
            columns: BallotColumns::default(),
            branch_count: DEFAULT_BRANCH_COUNT,
            max_tree_rank: DEFAULT_MAX_TREE_RANK,
            sentinel: DEFAULT_SENTINEL,
            happiness_levels: DEFAULT_HAPPINESS_LEVELS,
        }
    }
}

/// Error type of all fallible operations. Every error aborts the current run.
#[derive(Debug)]
pub enum Error {
    /// Malformed input data
    Format(String),
    /// An id is referenced, which does not appear in the ballot data or indexes
    Reference(String),
    /// The solver result does not have the length students × courses
    Shape { expected: usize, actual: usize },
    /// A mean over an empty population has been requested
    EmptyPopulation(&'static str),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "Invalid data: {}", msg),
            Error::Reference(msg) => write!(f, "Inconsistent data: {}", msg),
            Error::Shape { expected, actual } => write!(
                f,
                "Solver result has {} entries, but {} were expected (students × courses)",
                actual, expected
            ),
            Error::EmptyPopulation(what) => {
                write!(f, "Cannot calculate a mean over an empty set of {}", what)
            }
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Helper function for tests to create a ballot record of a student without class year and a
/// course with 20 seats.
#[cfg(test)]
fn ballot(student_id: StudentId, course_id: CourseId, tree: u32, branch: u32) -> BallotRecord {
    BallotRecord {
        student_id,
        class_year: ClassYear::Other,
        course_id,
        tree,
        branch,
        course_cap: 20,
    }
}
