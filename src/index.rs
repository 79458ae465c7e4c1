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

//! Stable mapping of student and course ids to row/column positions of the preference matrix.
//!
//! Positions are handed out in order of first appearance in the ballot data. The same ballot
//! sequence always yields the same positions, so the matrix written for the solver and the decoding
//! of the solver's result agree on the meaning of every row and column.

use super::{BallotRecord, CourseId, Error, StudentId};
use log::{debug, warn};
use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered table of keys. Each new key is assigned the next unused position.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K> {
    positions: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K: Hash + Eq + Copy> OrderedIndex<K> {
    pub fn new() -> Self {
        OrderedIndex {
            positions: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Insert the key, if it is not known yet. Returns the key's position and whether it has been
    /// newly inserted.
    pub fn insert_if_absent(&mut self, key: K) -> (usize, bool) {
        if let Some(position) = self.positions.get(&key) {
            return (*position, false);
        }
        let position = self.keys.len();
        self.positions.insert(key, position);
        self.keys.push(key);
        (position, true)
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// All keys, ordered by their position
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Hash + Eq + Copy> Default for OrderedIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Column positions and seat caps of all courses in the ballot data
#[derive(Debug, Clone)]
pub struct CourseIndex {
    index: OrderedIndex<CourseId>,
    /// Cap of each course, in the same order as the index' keys
    caps: Vec<u32>,
}

impl CourseIndex {
    /// Index all courses from the ballot records.
    ///
    /// A course's cap is taken from the first record naming the course. Differing caps in later
    /// records are ignored (and logged).
    pub fn build(records: &[BallotRecord]) -> CourseIndex {
        let mut index = OrderedIndex::new();
        let mut caps = Vec::new();
        for record in records {
            let (position, new) = index.insert_if_absent(record.course_id);
            if new {
                caps.push(record.course_cap);
            } else if caps[position] != record.course_cap {
                warn!(
                    "Course {} is listed with cap {} and {}. Using the first one.",
                    record.course_id, caps[position], record.course_cap
                );
            }
        }
        debug!("Indexed {} courses", index.len());
        CourseIndex { index, caps }
    }

    /// Get the column position and cap of a course
    pub fn lookup(&self, course_id: CourseId) -> Result<(usize, u32), Error> {
        self.index
            .position(&course_id)
            .map(|position| (position, self.caps[position]))
            .ok_or_else(|| Error::Reference(format!("Course {} is not indexed.", course_id)))
    }

    /// Course ids, ordered by their position
    pub fn ids(&self) -> &[CourseId] {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Row positions of all students in the ballot data
#[derive(Debug, Clone)]
pub struct StudentIndex {
    index: OrderedIndex<StudentId>,
}

impl StudentIndex {
    pub fn build(records: &[BallotRecord]) -> StudentIndex {
        let mut index = OrderedIndex::new();
        for record in records {
            index.insert_if_absent(record.student_id);
        }
        debug!("Indexed {} students", index.len());
        StudentIndex { index }
    }

    pub fn lookup(&self, student_id: StudentId) -> Result<usize, Error> {
        self.index
            .position(&student_id)
            .ok_or_else(|| Error::Reference(format!("Student {} is not indexed.", student_id)))
    }

    /// Student ids, ordered by their position
    pub fn ids(&self) -> &[StudentId] {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CourseIndex, OrderedIndex, StudentIndex};
    use crate::{ballot, Error};

    #[test]
    fn ordered_index_insert_if_absent() {
        let mut index = OrderedIndex::new();
        assert_eq!(index.insert_if_absent(42), (0, true));
        assert_eq!(index.insert_if_absent(7), (1, true));
        assert_eq!(index.insert_if_absent(42), (0, false));
        assert_eq!(index.insert_if_absent(3), (2, true));
        assert_eq!(index.keys(), &[42, 7, 3]);
        assert_eq!(index.position(&7), Some(1));
        assert_eq!(index.position(&8), None);
    }

    #[test]
    fn first_appearance_order() {
        let records = vec![
            ballot(300, 5003, 1, 1),
            ballot(100, 5001, 1, 2),
            ballot(300, 5001, 1, 3),
            ballot(200, 5002, 2, 1),
            ballot(100, 5003, 1, 1),
        ];
        let students = StudentIndex::build(&records);
        let courses = CourseIndex::build(&records);

        assert_eq!(students.ids(), &[300, 100, 200]);
        assert_eq!(courses.ids(), &[5003, 5001, 5002]);
        assert_eq!(students.lookup(100).unwrap(), 1);
        assert_eq!(courses.lookup(5002).unwrap(), (2, 20));
    }

    #[test]
    fn first_cap_wins() {
        let mut records = vec![ballot(100, 5001, 1, 1), ballot(200, 5001, 1, 1)];
        records[0].course_cap = 15;
        records[1].course_cap = 30;
        let courses = CourseIndex::build(&records);
        assert_eq!(courses.lookup(5001).unwrap(), (0, 15));
    }

    #[test]
    fn unknown_ids() {
        let records = vec![ballot(100, 5001, 1, 1)];
        assert!(matches!(
            StudentIndex::build(&records).lookup(101),
            Err(Error::Reference(_))
        ));
        assert!(matches!(
            CourseIndex::build(&records).lookup(5002),
            Err(Error::Reference(_))
        ));
    }
}
