use dashgram::aggregate::{aggregate, ChartRequest};
use dashgram::csv_reader;
use dashgram::data::Dataset;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Run the dashgram binary with the given arguments and stdin content
fn run_dashgram(args: &[&str], stdin_content: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_dashgram"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn dashgram");

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(stdin_content.as_bytes())
            .expect("Failed to write to stdin");
    }

    child.wait_with_output().expect("Failed to wait for dashgram")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn load_fixture(path: &str) -> Dataset {
    Dataset::from_csv(csv_reader::read_csv_from_path(Path::new(path)).unwrap())
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_fixture_sum_by_region() {
    let data = load_fixture("test/sales.csv");
    let series = aggregate(&data.rows, &ChartRequest::new("Region").with_measure("Sales")).unwrap();
    assert_eq!(series.labels, vec!["West", "East", "North", "South"]);
    // "n/a" and the empty cell each count as 1
    assert_eq!(series.values, vec![1201.5, 301.0, -50.0, 2000.0]);
}

#[test]
fn test_fixture_truncation_ignores_totals() {
    let data = load_fixture("test/many_categories.csv");
    let series = aggregate(&data.rows, &ChartRequest::new("key").with_measure("value")).unwrap();
    assert_eq!(series.len(), 10);
    assert_eq!(series.labels.last().map(String::as_str), Some("k9"));
    assert!(!series.labels.contains(&"k14".to_string()));
}

#[test]
fn test_fixture_json_matches_csv_semantics() {
    let text = fs::read_to_string("test/worksheet.json").unwrap();
    let data = Dataset::from_json(&serde_json::from_str(&text).unwrap()).unwrap();
    let series = aggregate(&data.rows, &ChartRequest::new("Region").with_measure("Sales")).unwrap();
    assert_eq!(series.labels, vec!["West", "East"]);
    assert_eq!(series.values, vec![1201.5, 300.0]);
}

#[test]
fn test_empty_field_record_counts_under_empty_key() {
    let data = Dataset::from_csv(csv_reader::read_csv("c,v\na,1\n,\n".as_bytes()).unwrap());
    assert_eq!(data.rows.len(), 2);
    let series = aggregate(&data.rows, &ChartRequest::new("c")).unwrap();
    assert_eq!(series.labels, vec!["a", ""]);
    assert_eq!(series.values, vec![1.0, 1.0]);
}

#[test]
fn test_end_to_end_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let output = run_dashgram(
        &["-i", "test/sales.csv", "-c", "test/dashboard.json", "-o", out],
        "",
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Loaded 6 rows, 4 columns."));
    assert!(stdout.contains("Rendered 3 chart(s)."));

    assert!(dir.path().join("chart-1.svg").exists());
    assert!(dir.path().join("chart-2.svg").exists());
    assert!(!dir.path().join("chart-3.svg").exists());
    assert!(dir.path().join("chart-4.svg").exists());

    let svg = fs::read_to_string(dir.path().join("chart-1.svg")).unwrap();
    assert!(svg.contains("Sales by region"));
}

#[test]
fn test_end_to_end_chart_flags_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let csv = fs::read_to_string("test/sales.csv").unwrap();
    let output = run_dashgram(
        &[
            "--chart",
            "chart(x: Region, y: Sales, type: pie) | chart(x: Category)",
            "--format",
            "svg",
            "-o",
            dir.path().to_str().unwrap(),
        ],
        &csv,
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout_of(&output).contains("Rendered 2 chart(s)."));

    let svg = fs::read_to_string(dir.path().join("chart-2.svg")).unwrap();
    assert!(svg.contains("Count by Category"));
}

#[test]
fn test_end_to_end_png_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_dashgram(
        &[
            "-i",
            "test/sales.csv",
            "--chart",
            "chart(x: Region)",
            "-o",
            dir.path().to_str().unwrap(),
        ],
        "",
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let bytes = fs::read(dir.path().join("chart-1.png")).unwrap();
    assert!(is_valid_png(&bytes), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_json_input() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_dashgram(
        &[
            "--json",
            "-i",
            "test/worksheet.json",
            "--chart",
            "chart(x: Region, y: Sales)",
            "--format",
            "svg",
            "-o",
            dir.path().to_str().unwrap(),
        ],
        "",
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout_of(&output).contains("Loaded 3 rows, 2 columns."));
    assert!(dir.path().join("chart-1.svg").exists());
}

#[test]
fn test_end_to_end_no_charts_configured() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_dashgram(
        &["--chart", "chart() | chart()", "-o", dir.path().to_str().unwrap()],
        "a,b\n1,2\n",
    );
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("No charts configured. Choose X columns and try again."));
}

#[test]
fn test_end_to_end_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_dashgram(
        &["--chart", "chart(x: a)", "-o", dir.path().to_str().unwrap()],
        "a,b\n",
    );
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("No data loaded. Please load data first."));
}

#[test]
fn test_end_to_end_preview() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_dashgram(
        &["-i", "test/sales.csv", "--preview", "2", "-o", dir.path().to_str().unwrap()],
        "",
    );
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Region | Category"));
    assert!(stdout.contains("East   | Technology"));
    assert!(!stdout.contains("North"));
}

#[test]
fn test_end_to_end_invalid_syntax() {
    let output = run_dashgram(&["--chart", "invalid syntax here"], "a,b\n1,2\n");
    assert!(!output.status.success(), "Should have failed with parse error");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Parse error"));
}

#[test]
fn test_end_to_end_missing_input_file() {
    let output = run_dashgram(&["-i", "test/does_not_exist.csv"], "");
    assert!(!output.status.success());
}
