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

//! IO functionality for matching files: one line per student, holding the student id followed by
//! the ids of all courses assigned to the student.

use crate::{Assignment, CourseId, Error, StudentId};
use log::info;
use std::io::BufRead;

/// Read a course assignment from a matching file.
///
/// Ids may be separated by any whitespace; trailing whitespace is ignored. A line with only a
/// student id denotes a student without assigned courses.
///
/// # Errors
///
/// Fails with `Error::Format`, if an id is not an integer, a student has more than one line or a
/// course is listed twice for the same student.
pub fn read<R: std::io::Read>(reader: R) -> Result<Assignment, Error> {
    let reader = std::io::BufReader::new(reader);
    let mut assignment = Assignment::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let mut ids = line.split_whitespace().map(|v| {
            v.parse::<u32>().map_err(|e| {
                Error::Format(format!(
                    "Line {} of matching file: '{}' is not a valid id: {}",
                    i + 1,
                    v,
                    e
                ))
            })
        });
        let student: StudentId = match ids.next() {
            Some(id) => id?,
            None => continue,
        };
        let courses = ids.collect::<Result<Vec<CourseId>, Error>>()?;
        if let Some((j, c)) = courses
            .iter()
            .enumerate()
            .find(|(j, c)| courses[..*j].contains(c))
        {
            return Err(Error::Format(format!(
                "Line {} of matching file: course {} is listed twice (position {}).",
                i + 1,
                c,
                j + 1
            )));
        }
        if assignment.insert(student, courses).is_some() {
            return Err(Error::Format(format!(
                "Line {} of matching file: student {} has already been listed.",
                i + 1,
                student
            )));
        }
    }

    info!("Read matching of {} students", assignment.len());
    Ok(assignment)
}

/// Write a course assignment as matching file to a Writer (e.g. an output file). Students are
/// written in ascending id order.
pub fn write<W: std::io::Write>(mut writer: W, assignment: &Assignment) -> Result<(), Error> {
    for (student, courses) in assignment.iter() {
        write!(writer, "{}", student)?;
        for course in courses {
            write!(writer, " {}", course)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Assignment, Error};

    #[test]
    fn parse_matching_file() {
        let data = include_bytes!("test_ressources/matching.txt");
        let assignment = super::read(&data[..]).unwrap();

        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment[&100], vec![5001, 5002]);
        assert_eq!(assignment[&200], vec![5002, 5003]);
        assert_eq!(assignment[&300], vec![5003, 5004]);
    }

    #[test]
    fn write_matching_file() {
        let mut assignment = Assignment::new();
        assignment.insert(300, vec![5004]);
        assignment.insert(100, vec![5002, 5001]);
        assignment.insert(200, vec![]);

        let mut buffer = Vec::<u8>::new();
        super::write(&mut buffer, &assignment).unwrap();
        assert_eq!(
            String::from_utf8(buffer.clone()).unwrap(),
            "100 5002 5001\n200\n300 5004\n"
        );

        let parsed = super::read(&buffer[..]).unwrap();
        assert_eq!(parsed, assignment);
    }

    #[test]
    fn duplicate_student() {
        let result = super::read(&b"100 5001\n200 5002\n100 5003\n"[..]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn duplicate_course() {
        let result = super::read(&b"100 5001 5002 5001\n"[..]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn invalid_id() {
        let result = super::read(&b"100 5001 abc\n"[..]);
        assert!(matches!(result, Err(Error::Format(_))));
    }
}
