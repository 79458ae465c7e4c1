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

//! Reading the result vector of the external solver.

use crate::Error;
use log::info;
use std::io::BufRead;

/// Read the solver's result: one binary digit per line. Blank lines are ignored.
///
/// # Errors
///
/// Fails with `Error::Format`, if any line holds something else than `0` or `1`.
pub fn read<R: std::io::Read>(reader: R) -> Result<Vec<u8>, Error> {
    let reader = std::io::BufReader::new(reader);
    let mut result = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let value = line.trim();
        match value {
            "" => continue,
            "0" => result.push(0),
            "1" => result.push(1),
            _ => {
                return Err(Error::Format(format!(
                    "Line {} of solver result is not a binary digit: '{}'",
                    i + 1,
                    value
                )))
            }
        }
    }
    info!(
        "Read {} solver results, {} of them set",
        result.len(),
        result.iter().filter(|v| **v == 1).count()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::Error;

    #[test]
    fn parse_solver_result() {
        let data = include_bytes!("test_ressources/solver_result.txt");
        let result = super::read(&data[..]).unwrap();
        assert_eq!(result, vec![1, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn tolerates_whitespace() {
        let result = super::read(&b"0\r\n 1\n\n1 \n"[..]).unwrap();
        assert_eq!(result, vec![0, 1, 1]);
    }

    #[test]
    fn non_binary_value() {
        assert!(matches!(super::read(&b"0\n2\n"[..]), Err(Error::Format(_))));
        assert!(matches!(super::read(&b"0\nx\n"[..]), Err(Error::Format(_))));
    }
}
