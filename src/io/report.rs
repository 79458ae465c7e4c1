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

//! Machine-readable JSON report of an assignment's quality summary.

use crate::evaluation::score::Summary;
use crate::{BallotSchema, Error};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

const REPORT_FORMAT: &str = "X-webtree-evaluation";
const REPORT_VERSION: &str = "1.0";

/// Write the quality summary of an assignment (and optionally of a baseline assignment) as JSON
/// document to a Writer (e.g. an output file).
pub fn write<W: std::io::Write>(
    writer: W,
    candidate: &Summary,
    baseline: Option<&Summary>,
    schema: &BallotSchema,
) -> Result<(), Error> {
    let to_json =
        |s: &Summary| serde_json::to_value(s).map_err(|e| Error::Format(format!("{}", e)));
    let baseline = match baseline {
        Some(b) => to_json(b)?,
        None => serde_json::Value::Null,
    };
    let data = json!({
        "format": REPORT_FORMAT,
        "version": REPORT_VERSION,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        "schema": {
            "branch_count": schema.branch_count(),
            "max_tree_rank": schema.max_tree_rank(),
            "happiness_levels": schema.happiness_levels(),
        },
        "candidate": to_json(candidate)?,
        "baseline": baseline,
    });
    serde_json::to_writer_pretty(writer, &data).map_err(|e| Error::Io(e.into()))?;

    Ok(())
}
