//! Unit tests for argument parsing, the suite driver and the report.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use convcheck_core::{
    CaseOutcome, CaseRunner, HarnessError, HarnessErrorCode, Invocation, TestRegistry, Verdict,
    Workspace,
};
use rstest::rstest;
use tracing_subscriber::layer::SubscriberExt;

use convcheck_test_support::tracing::RecordingLayer;

use super::commands::run_command;
use super::test_helpers::{
    MissingProgram, OracleProgram, ones_registry, rendered_ones_result, run_suite_capturing,
    temp_dir,
};
use super::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, SuiteSummary, TIP, UNEXPECTED_ERROR,
    render_outcome, run_cli,
};

#[test]
fn no_arguments_means_run_with_defaults() {
    let cli = Cli::try_parse_from(["convcheck"]).expect("no arguments parse");
    assert!(cli.command.is_none());
}

#[test]
fn run_defaults_match_protocol_file_names() {
    let cli = Cli::try_parse_from(["convcheck", "run"]).expect("run parses");
    match cli.command {
        Some(Command::Run(run)) => {
            assert_eq!(run, RunCommand::default());
            assert_eq!(run.program, PathBuf::from("./convolution"));
            assert_eq!(run.input, PathBuf::from("input.txt"));
            assert_eq!(run.output, PathBuf::from("output.txt"));
        }
        other => panic!("expected run command, got {other:?}"),
    }
}

#[test]
fn run_accepts_overrides() {
    let cli = Cli::try_parse_from([
        "convcheck",
        "run",
        "--program",
        "bin/conv",
        "--workdir",
        "/tmp/work",
        "--input",
        "in.txt",
        "--output",
        "out.txt",
        "--filter",
        "1024",
    ])
    .expect("overrides parse");
    let Some(Command::Run(run)) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(
        run,
        RunCommand {
            program: PathBuf::from("bin/conv"),
            workdir: PathBuf::from("/tmp/work"),
            input: PathBuf::from("in.txt"),
            output: PathBuf::from("out.txt"),
            filter: Some("1024".to_owned()),
        }
    );
}

#[test]
fn unknown_flags_are_rejected() {
    assert!(Cli::try_parse_from(["convcheck", "run", "--tolerance", "1"]).is_err());
}

#[test]
fn list_prints_builtin_names_in_order() {
    let mut buffer = Vec::new();
    let summary = run_cli(
        Cli {
            command: Some(Command::List),
        },
        &TestRegistry::builtin(),
        &mut buffer,
    )
    .expect("list succeeds");

    assert_eq!(summary, ExecutionSummary::Listed { cases: 6 });
    assert!(summary.succeeded());
    assert_eq!(
        String::from_utf8_lossy(&buffer),
        "test_5x3\ntest_1x9\ntest_31x9\ntest_1024x3\ntest_1024x9\ntest_1023x9\n"
    );
}

#[test]
fn passing_cases_print_ok_with_blank_separators() {
    let dir = temp_dir();
    let registry = ones_registry(&[(5, 3), (1, 9)]);

    let (result, report) = run_suite_capturing(&dir, &registry, &OracleProgram::exact(), None);

    assert_eq!(
        result.expect("suite completes"),
        SuiteSummary {
            passed: 2,
            mismatched: 0,
            errored: 0,
        }
    );
    assert_eq!(report, "test_5x3: OK\n\ntest_1x9: OK\n\n");
}

#[test]
fn mismatch_prints_both_matrices() {
    let dir = temp_dir();
    let registry = ones_registry(&[(2, 1)]);

    let (result, report) =
        run_suite_capturing(&dir, &registry, &OracleProgram { scale: 2.0 }, None);

    let summary = result.expect("suite completes");
    assert_eq!(summary.mismatched, 1);
    assert!(!summary.all_passed());
    assert_eq!(
        report,
        "test_2x1: Fail\nexpected: 1 1\n1 1\n actual: 2 2\n2 2\n\n"
    );
}

#[test]
fn errors_print_generic_detail_and_continue() {
    let dir = temp_dir();
    let registry = ones_registry(&[(5, 3), (31, 9)]);

    let (result, report) = run_suite_capturing(&dir, &registry, &MissingProgram, None);

    assert_eq!(result.expect("suite completes").errored, 2);
    assert_eq!(
        report,
        format!("test_5x3: Fail\n{UNEXPECTED_ERROR}\n\ntest_31x9: Fail\n{UNEXPECTED_ERROR}\n\n")
    );
}

#[rstest]
#[case("1024", &["test_1024x3", "test_1024x9"])]
#[case("x9", &["test_1x9", "test_31x9", "test_1024x9", "test_1023x9"])]
#[case("test_5x3", &["test_5x3"])]
fn filter_selects_by_substring(#[case] filter: &str, #[case] expected: &[&str]) {
    let dir = temp_dir();
    let registry = TestRegistry::builtin()
        .with_case("never_run", || panic!("filtered cases must not be generated"));
    let (result, report) =
        run_suite_capturing(&dir, &registry, &MissingProgram, Some(filter));

    assert_eq!(result.expect("suite completes").total(), expected.len());
    let names: Vec<&str> = report
        .lines()
        .filter_map(|line| line.strip_suffix(": Fail"))
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn filter_matching_nothing_is_an_error() {
    let dir = temp_dir();
    let (result, report) = run_suite_capturing(
        &dir,
        &TestRegistry::builtin(),
        &OracleProgram::exact(),
        Some("test_7x7"),
    );

    match result {
        Err(CliError::NoMatchingCases { filter }) => assert_eq!(filter, "test_7x7"),
        other => panic!("expected NoMatchingCases, got {other:?}"),
    }
    assert!(report.is_empty());
}

#[test]
fn empty_registry_passes_vacuously() {
    let dir = temp_dir();
    let (result, report) =
        run_suite_capturing(&dir, &TestRegistry::new(), &OracleProgram::exact(), None);
    let summary = result.expect("suite completes");
    assert_eq!(summary.total(), 0);
    assert!(summary.all_passed());
    assert!(report.is_empty());
}

#[test]
fn cleaning_failure_aborts_the_run() {
    let dir = temp_dir();
    fs::create_dir(dir.path().join("output.txt")).expect("block output path with a directory");
    let registry = ones_registry(&[(5, 3), (1, 9)]);

    let (result, report) = run_suite_capturing(&dir, &registry, &OracleProgram::exact(), None);

    match result {
        Err(CliError::Harness(err)) => assert_eq!(err.code(), HarnessErrorCode::Filesystem),
        other => panic!("expected a harness error, got {other:?}"),
    }
    assert!(report.is_empty());
}

#[test]
fn suite_logs_summary_counts() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let dir = temp_dir();
    let registry = ones_registry(&[(5, 3), (2, 1)]);

    tracing::subscriber::with_default(subscriber, || {
        let workspace = Workspace::new(dir.path());
        let program = OracleProgram::exact();
        let runner = CaseRunner::new(&workspace, &program);
        super::run_suite(&registry, &runner, None, std::io::sink()).expect("suite completes");
    });

    let events = layer.events_with_message("suite completed");
    let [event] = events.as_slice() else {
        panic!("expected exactly one summary event, got {events:?}");
    };
    assert_eq!(event.fields.get("passed").map(String::as_str), Some("2"));
    assert_eq!(event.fields.get("errored").map(String::as_str), Some("0"));
    let suite = layer
        .spans()
        .into_iter()
        .find(|span| span.name == "cli.suite")
        .expect("suite span recorded");
    assert_eq!(suite.fields.get("cases").map(String::as_str), Some("2"));
}

#[test]
fn render_outcome_ok_is_a_single_line() {
    let outcome = CaseOutcome {
        name: "test_5x3".to_owned(),
        verdict: Verdict::Ok,
        invocation: Some(Invocation::succeeded()),
    };
    let mut buffer = Vec::new();
    render_outcome(&outcome, &mut buffer).expect("write to vec");
    assert_eq!(buffer, b"test_5x3: OK\n");
}

#[rstest]
#[case(SuiteSummary { passed: 6, mismatched: 0, errored: 0 }, true)]
#[case(SuiteSummary { passed: 5, mismatched: 1, errored: 0 }, false)]
#[case(SuiteSummary { passed: 0, mismatched: 0, errored: 1 }, false)]
fn suite_success_requires_every_case_to_pass(
    #[case] summary: SuiteSummary,
    #[case] expected: bool,
) {
    assert_eq!(ExecutionSummary::Suite(summary).succeeded(), expected);
}

#[test]
fn harness_errors_convert_into_cli_errors() {
    let err = CliError::from(HarnessError::MissingResource {
        path: PathBuf::from("output.txt"),
    });
    assert!(matches!(err, CliError::Harness(_)));
}

#[cfg(unix)]
#[test]
fn run_command_drives_external_program() {
    let dir = temp_dir();
    fs::write(dir.path().join("expected.txt"), rendered_ones_result(5, 3))
        .expect("write expected output");
    convcheck_test_support::scripts::install_copying_program(dir.path(), "expected.txt")
        .expect("install program");
    let command = RunCommand {
        workdir: dir.path().to_path_buf(),
        filter: Some("5x3".to_owned()),
        ..RunCommand::default()
    };
    let mut buffer = Vec::new();

    let summary =
        run_command(&command, &TestRegistry::builtin(), &mut buffer).expect("run completes");

    assert_eq!(summary.passed, 1);
    assert_eq!(
        String::from_utf8_lossy(&buffer),
        format!("{TIP}\n\ntest_5x3: OK\n\n")
    );
}
