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

use clap::{crate_authors, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, info};
use webtree::evaluation::score;
use webtree::index::{CourseIndex, StudentIndex};
use webtree::{decode, io, preferences, BallotSchema, Error};

fn main() {
    env_logger::init();

    let args = Command::new("WebTree course allocation tools")
        .version(crate_version!())
        .author(crate_authors!())
        .about(
            "Prepares WebTree ballots for a binary integer programming solver, decodes the \
            solver's result into a course matching and evaluates matchings against the ballots.",
        )
        .subcommand_required(true)
        .arg(
            Arg::new("branch_count")
                .long("branch-count")
                .value_name("N")
                .help("Number of branches per preference tree")
                .value_parser(value_parser!(u32))
                .default_value("7")
                .global(true),
        )
        .arg(
            Arg::new("max_tree")
                .long("max-tree")
                .value_name("N")
                .help(
                    "Highest tree number allowed in the ballots. Records with a higher tree are \
                    rejected. Raise this for ballots with more trees; the sentinel must stay above \
                    branch count × max tree.",
                )
                .value_parser(value_parser!(u32))
                .default_value("10")
                .global(true),
        )
        .arg(
            Arg::new("sentinel")
                .long("sentinel")
                .value_name("RANK")
                .help(
                    "Rank to use for courses not listed by a student. Must exceed every real rank.",
                )
                .value_parser(value_parser!(u32))
                .default_value("10000")
                .global(true),
        )
        .arg(
            Arg::new("happiness_levels")
                .long("happiness-levels")
                .value_name("N")
                .help("Happiness score of an assigned first choice")
                .value_parser(value_parser!(u32))
                .default_value("25")
                .global(true),
        )
        .subcommand(
            Command::new("preprocess")
                .about("Build the preference matrix for the solver from a ballot file")
                .arg(
                    Arg::new("BALLOTS")
                        .help("The ballot file (comma separated, with header row)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("OUTPUT")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the matrix to this file instead of stdout"),
                )
                .arg(
                    Arg::new("by_class")
                        .long("by-class")
                        .help("Order students by class year (seniors first) before indexing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("match")
                .about("Decode the solver's result into a matching file")
                .arg(
                    Arg::new("RESULT")
                        .help("The solver's result (one binary digit per line)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("MATRIX")
                        .help("The preference matrix file the solver has been run on")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("OUTPUT")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the matching to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Score a matching against the students' ballots")
                .arg(
                    Arg::new("MATCHING")
                        .help("The matching file to evaluate")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("BALLOTS")
                        .help("The ballot file, the matching has been computed for")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("baseline")
                        .long("baseline")
                        .value_name("MATCHING")
                        .help("A reference matching to compare with"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("FILE")
                        .help("Write a JSON report of the evaluation to this file"),
                ),
        )
        .get_matches();

    let result = match args.subcommand() {
        Some((name, sub_args)) => schema_from_args(sub_args)
            .and_then(|schema| run_subcommand(name, sub_args, &schema)),
        None => Err((
            Error::Format("No subcommand given.".to_owned()),
            exitcode::USAGE,
        )),
    };

    if let Err((e, code)) = result {
        error!("{}", e);
        std::process::exit(code);
    }
}

/// Error of a subcommand together with the process exit code to report
type RunError = (Error, exitcode::ExitCode);

/// Build the ballot schema from the (global) command line arguments
fn schema_from_args(args: &ArgMatches) -> Result<BallotSchema, RunError> {
    let value = |name: &str, default: u32| args.get_one::<u32>(name).copied().unwrap_or(default);
    BallotSchema::new(
        value("branch_count", webtree::DEFAULT_BRANCH_COUNT),
        value("max_tree", webtree::DEFAULT_MAX_TREE_RANK),
        value("sentinel", webtree::DEFAULT_SENTINEL),
        value("happiness_levels", webtree::DEFAULT_HAPPINESS_LEVELS),
    )
    .map_err(|e| (e, exitcode::USAGE))
}

fn run_subcommand(name: &str, args: &ArgMatches, schema: &BallotSchema) -> Result<(), RunError> {
    match name {
        "preprocess" => run_preprocess(args, schema),
        "match" => run_match(args),
        "evaluate" => run_evaluate(args, schema),
        _ => Err((
            Error::Format(format!("Unknown subcommand '{}'.", name)),
            exitcode::USAGE,
        )),
    }
}

fn data_error(e: Error) -> RunError {
    let code = match e {
        Error::Io(_) => exitcode::IOERR,
        _ => exitcode::DATAERR,
    };
    (e, code)
}

fn open_input(path: &str) -> Result<std::fs::File, RunError> {
    std::fs::File::open(path).map_err(|e| {
        (
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Could not open input file {}: {}", path, e),
            )),
            exitcode::NOINPUT,
        )
    })
}

/// Open the output file, if given, or stdout otherwise
fn open_output(path: Option<&String>) -> Result<Box<dyn std::io::Write>, RunError> {
    match path {
        Some(p) => std::fs::File::create(p)
            .map(|f| Box::new(std::io::BufWriter::new(f)) as Box<dyn std::io::Write>)
            .map_err(|e| {
                (
                    Error::Io(std::io::Error::new(
                        e.kind(),
                        format!("Could not create output file {}: {}", p, e),
                    )),
                    exitcode::CANTCREAT,
                )
            }),
        None => Ok(Box::new(std::io::stdout())),
    }
}

fn run_preprocess(args: &ArgMatches, schema: &BallotSchema) -> Result<(), RunError> {
    let ballots_path = args.get_one::<String>("BALLOTS").map_or("", |s| s.as_str());
    let mut records = io::ballots::read(open_input(ballots_path)?, schema).map_err(data_error)?;
    if args.get_flag("by_class") {
        records = preferences::order_by_class_year(records);
    }

    let students = StudentIndex::build(&records);
    let courses = CourseIndex::build(&records);
    info!(
        "Read {} students and {} courses",
        students.len(),
        courses.len()
    );
    let matrix =
        preferences::build_matrix(&records, &students, &courses, schema).map_err(data_error)?;

    let writer = open_output(args.get_one::<String>("OUTPUT"))?;
    io::matrix::write(writer, &matrix).map_err(data_error)
}

fn run_match(args: &ArgMatches) -> Result<(), RunError> {
    let result_path = args.get_one::<String>("RESULT").map_or("", |s| s.as_str());
    let matrix_path = args.get_one::<String>("MATRIX").map_or("", |s| s.as_str());

    let vector = io::solver::read(open_input(result_path)?).map_err(data_error)?;
    let (students, courses) =
        io::matrix::read_axes(open_input(matrix_path)?).map_err(data_error)?;
    info!(
        "Unique students: {}, unique courses: {}",
        students.len(),
        courses.len()
    );
    let assignment = decode::decode(&vector, &students, &courses).map_err(data_error)?;

    let writer = open_output(args.get_one::<String>("OUTPUT"))?;
    io::matching::write(writer, &assignment).map_err(data_error)
}

fn run_evaluate(args: &ArgMatches, schema: &BallotSchema) -> Result<(), RunError> {
    let matching_path = args.get_one::<String>("MATCHING").map_or("", |s| s.as_str());
    let ballots_path = args.get_one::<String>("BALLOTS").map_or("", |s| s.as_str());

    let candidate = score::compose_summary(
        open_input(matching_path)?,
        open_input(ballots_path)?,
        schema,
    )
    .map_err(data_error)?;
    let baseline = match args.get_one::<String>("baseline") {
        Some(path) => Some(
            score::compose_summary(open_input(path)?, open_input(ballots_path)?, schema)
                .map_err(data_error)?,
        ),
        None => None,
    };

    print!("{}", io::format_summary(&candidate, baseline.as_ref()));

    if let Some(path) = args.get_one::<String>("report") {
        let writer = open_output(Some(path))?;
        io::report::write(writer, &candidate, baseline.as_ref(), schema).map_err(data_error)?;
        info!("Wrote evaluation report to {}", path);
    }
    Ok(())
}
