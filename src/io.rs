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

pub mod ballots;
pub mod matching;
pub mod matrix;
pub mod report;
pub mod solver;

use crate::evaluation::score::Summary;
use std::fmt::Write;

/// Split a row of a comma separated table into its trimmed fields. Surrounding double quotes are
/// removed.
fn split_row(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|f| {
            let f = f.trim();
            f.strip_prefix('"')
                .and_then(|f| f.strip_suffix('"'))
                .unwrap_or(f)
        })
        .collect()
}

/// Format the quality summary of an assignment (and optionally of a baseline assignment for
/// comparison) into a human readable String (e.g. to print it to stdout).
///
/// The output format will look like
/// ```text
/// ===== Assignment quality =====
///                          candidate   baseline
/// students                         3          3
/// mean duplicate listings      0.667      0.000
/// …
/// ```
pub fn format_summary(candidate: &Summary, baseline: Option<&Summary>) -> String {
    let mut result = String::new();
    let rows: [(&str, fn(&Summary) -> String); 6] = [
        ("students", |s| s.num_students.to_string()),
        ("mean duplicate listings", |s| format!("{:.3}", s.average_duplicates)),
        ("mean tree", |s| format!("{:.3}", s.average_tree)),
        ("mean branch", |s| format!("{:.3}", s.average_branch)),
        ("mean courses assigned", |s| {
            format!("{:.3}", s.average_courses_assigned)
        }),
        ("happiness", |s| s.happiness.to_string()),
    ];

    write!(result, "===== Assignment quality =====\n").unwrap();
    write!(result, "{:<24}{:>11}", "", "candidate").unwrap();
    if baseline.is_some() {
        write!(result, "{:>11}", "baseline").unwrap();
    }
    result.push('\n');
    for (name, value) in rows.iter() {
        write!(result, "{:<24}{:>11}", name, value(candidate)).unwrap();
        if let Some(b) = baseline {
            write!(result, "{:>11}", value(b)).unwrap();
        }
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::evaluation::score::Summary;
    use crate::index::{CourseIndex, StudentIndex};
    use crate::BallotSchema;

    #[test]
    fn solver_result_to_matching_file() {
        // The axes written to the matrix file have to be the same as the indexes of the ballots
        let ballots = include_bytes!("io/test_ressources/ballots.csv");
        let records = super::ballots::read(&ballots[..], &BallotSchema::default()).unwrap();
        let matrix = include_bytes!("io/test_ressources/preference_matrix.csv");
        let (students, courses) = super::matrix::read_axes(&matrix[..]).unwrap();
        assert_eq!(students, StudentIndex::build(&records).ids());
        assert_eq!(courses, CourseIndex::build(&records).ids());

        let result = include_bytes!("io/test_ressources/solver_result.txt");
        let vector = super::solver::read(&result[..]).unwrap();
        let assignment = crate::decode::decode(&vector, &students, &courses).unwrap();

        let mut buffer = Vec::<u8>::new();
        super::matching::write(&mut buffer, &assignment).unwrap();
        let expected = include_str!("io/test_ressources/matching.txt")
            .lines()
            .map(|l| format!("{}\n", l.trim_end()))
            .collect::<String>();
        assert_eq!(String::from_utf8(buffer).unwrap(), expected);
    }

    #[test]
    fn split_quoted_row() {
        assert_eq!(
            super::split_row(" 100,\"SOPH\", 5001 ,,\"\""),
            vec!["100", "SOPH", "5001", "", ""]
        );
    }

    #[test]
    fn format_comparison() {
        let candidate = Summary {
            average_duplicates: 2.0 / 3.0,
            average_tree: 1.25,
            average_branch: 2.0,
            average_courses_assigned: 2.0,
            happiness: 131,
            num_students: 3,
        };
        let baseline = Summary {
            average_duplicates: 0.0,
            ..candidate.clone()
        };

        let text = super::format_summary(&candidate, None);
        assert!(text.contains("candidate"));
        assert!(!text.contains("baseline"));
        assert!(text.contains("mean tree"));
        assert!(text.contains("1.250"));

        let text = super::format_summary(&candidate, Some(&baseline));
        assert_eq!(text.lines().count(), 8);
        let duplicates_line = text
            .lines()
            .find(|l| l.starts_with("mean duplicate listings"))
            .unwrap();
        assert!(duplicates_line.ends_with("0.667      0.000"));
    }
}
