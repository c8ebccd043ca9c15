use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn xlsx2csv() -> Command {
    let mut cmd = Command::cargo_bin("xlsx2csv").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_workbook(path: &Path, sheets: &[(&str, &[&[&str]])]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

#[test]
fn missing_arguments_print_usage_and_exit_1() {
    xlsx2csv()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));

    xlsx2csv()
        .arg("only-one")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_exits_successfully() {
    xlsx2csv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--delimiter"))
        .stdout(predicate::str::contains("--sheet-index"));
}

#[test]
fn converts_nested_workbooks_with_tab_delimiter() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out/nested");
    fs::create_dir_all(input.join("sub")).unwrap();

    write_workbook(&input.join("top.xlsx"), &[("Top", &[&["a", "b"], &["1", "2"]])]);
    write_workbook(&input.join("sub/inner.xlsx"), &[("Inner", &[&["x,y", "z"]])]);
    fs::write(input.join("ignored.csv"), "not a workbook").unwrap();

    xlsx2csv()
        .args(["-q"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(output.join("Top.csv")).unwrap(),
        "a\tb\n1\t2\n"
    );
    assert_eq!(
        fs::read_to_string(output.join("Inner.csv")).unwrap(),
        "x,y\tz\n"
    );
    assert_eq!(fs::read_dir(&output).unwrap().count(), 2);
}

#[test]
fn sheet_index_and_delimiter_flags() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();

    write_workbook(
        &input.join("book.xlsx"),
        &[("First", &[&["skip"]]), ("Second", &[&["a", "b;c"]])],
    );

    xlsx2csv()
        .args(["-q", "-i", "1", "-d", ";x"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert!(!output.join("First.csv").exists());
    assert_eq!(
        fs::read_to_string(output.join("Second.csv")).unwrap(),
        "a;\"b;c\"\n"
    );
}

#[test]
fn bad_files_are_logged_and_run_still_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();

    write_workbook(&input.join("good.xlsx"), &[("Good", &[&["ok"]])]);
    fs::write(input.join("broken.xlsx"), b"garbage").unwrap();
    write_workbook(&input.join("short.xlsx"), &[("Only", &[&["one"]])]);

    xlsx2csv()
        .args(["-q", "-i", "0"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.xlsx"));

    assert!(output.join("Good.csv").exists());
    assert!(output.join("Only.csv").exists());
}

#[test]
fn out_of_range_sheet_index_reports_valid_range() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();

    write_workbook(&input.join("two.xlsx"), &[("A", &[&["1"]]), ("B", &[&["2"]])]);

    xlsx2csv()
        .args(["-q", "-i", "5"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("between 0 and 1"));

    assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
}

#[test]
fn non_ascii_delimiter_is_rejected_before_work() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write_workbook(&input.join("book.xlsx"), &[("Sheet1", &[&["a"]])]);

    xlsx2csv()
        .args(["-d", "é"])
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid delimiter"));

    assert!(!output.exists());
}

#[test]
fn missing_input_directory_exits_1() {
    let temp_dir = TempDir::new().unwrap();

    xlsx2csv()
        .arg(temp_dir.path().join("missing"))
        .arg(temp_dir.path().join("out"))
        .assert()
        .code(1);
}

#[test]
fn dry_run_lists_workbooks_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write_workbook(&input.join("book.xlsx"), &[("Sheet1", &[&["a"]])]);

    xlsx2csv()
        .args(["--dry-run", "--output-format", "plain"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("book.xlsx"));

    assert!(!output.exists());
}

#[test]
fn json_report_lists_failures() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("broken.xlsx"), b"garbage").unwrap();

    let assert = xlsx2csv()
        .args(["--output-format", "json"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["failures"][0]["kind"], "open");
    assert_eq!(report["converted"].as_array().unwrap().len(), 0);
}

#[test]
fn json_stdout_stays_parseable_when_verbose() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write_workbook(&input.join("book.xlsx"), &[("Sheet1", &[&["a", "b"]])]);

    let assert = xlsx2csv()
        .args(["--output-format", "json", "-vv"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("\"type\":\"message\""));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["converted"].as_array().unwrap().len(), 1);
    assert_eq!(
        fs::read_to_string(output.join("Sheet1.csv")).unwrap(),
        "a\tb\n"
    );
}

#[test]
fn json_dry_run_prints_only_workbook_list() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    fs::create_dir(&input).unwrap();
    write_workbook(&input.join("book.xlsx"), &[("Sheet1", &[&["a"]])]);

    let assert = xlsx2csv()
        .args(["--dry-run", "--output-format", "json", "-v"])
        .arg(&input)
        .arg(temp_dir.path().join("out"))
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let listing: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listing["type"], "workbooks");
    assert_eq!(listing["paths"].as_array().unwrap().len(), 1);
}

#[test]
fn generate_config_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");

    xlsx2csv()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("delimiter"));
}

#[test]
fn config_file_sets_delimiter() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out");
    let config_path = temp_dir.path().join("xlsx2csv.toml");
    fs::create_dir(&input).unwrap();
    fs::write(&config_path, "[export]\ndelimiter = \"|\"\n").unwrap();
    write_workbook(&input.join("book.xlsx"), &[("Piped", &[&["a", "b"]])]);

    xlsx2csv()
        .args(["-q", "--config"])
        .arg(&config_path)
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(output.join("Piped.csv")).unwrap(),
        "a|b\n"
    );
}
