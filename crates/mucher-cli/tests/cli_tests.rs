//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use mucher_core::report::GradeReport;
use mucher_core::workbook::{read_table, Cell};

fn mucher() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("mucher").unwrap()
}

fn write_bank(path: &Path, sheets: &[(&str, &[&str])]) {
    let mut workbook = Workbook::new();
    for (name, cells) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (row, text) in cells.iter().enumerate() {
            worksheet.write_string(row as u32, 0, *text).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

/// A results sheet: numeric positional header, then one row per student.
fn write_results(path: &Path, rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for c in 0..width {
        worksheet.write_number(0, c as u16, c as f64).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32 + 1, c as u16);
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s).unwrap();
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n).unwrap();
                }
                _ => {}
            }
        }
    }
    workbook.save(path).unwrap();
}

fn student(labels: &[&str], correct: &str, given: Cell, id: &str) -> Vec<Cell> {
    let mut row = vec![Cell::Number(1.0), Cell::Number(10.0), Cell::from("A")];
    row.extend(labels.iter().map(|l| Cell::from(*l)));
    row.push(Cell::from(correct));
    row.push(given);
    row.push(Cell::from(id));
    row
}

const ZOOLOGY: &[&str] = &[
    "Which animal is a mammal?",
    "Whale",
    "Shark",
    "Trout",
    "Eel",
];

#[test]
fn help_output() {
    mucher()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Randomized multiple-choice exams"));
}

#[test]
fn version_output() {
    mucher()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mucher"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    mucher()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mucher.toml"));

    assert!(dir.path().join("mucher.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    mucher().current_dir(dir.path()).arg("init").assert().success();

    mucher()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_lists_categories() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.xlsx");
    write_bank(&bank, &[("Zoology", ZOOLOGY), ("Anatomy", ZOOLOGY)]);

    mucher()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--question-file")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 categories"))
        .stdout(predicate::str::contains("Anatomy"))
        .stdout(predicate::str::contains("Question bank valid."));
}

#[test]
fn validate_reports_dropped_rows() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.xlsx");
    let mut cells = ZOOLOGY.to_vec();
    cells.extend(["Orphan question", "Orphan answer"]);
    write_bank(&bank, &[("Zoology", cells.as_slice())]);

    mucher()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--question-file")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("multiple of 5"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();

    mucher()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--question-file")
        .arg("nonexistent.xlsx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn validate_empty_bank_fails() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.xlsx");
    write_bank(&bank, &[("Empty", &[])]);

    mucher()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--question-file")
        .arg(&bank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no categories"));
}

#[test]
fn grade_scores_and_writes_reports() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("elaborati.xlsx");
    write_results(
        &results,
        &[student(
            &["Alg00", "Geo10", "His20", "Bio30"],
            "ABCD",
            Cell::from("A-CX"),
            "rossi",
        )],
    );

    mucher()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--results-file")
        .arg(&results)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Alg"))
        .stdout(predicate::str::contains("1 row(s) graded, 0 unscored."));

    let graded = read_table(&dir.path().join("out/elaborati_graded.xlsx")).unwrap();
    assert_eq!(graded.header.last(), Some(&Cell::from("score")));
    assert_eq!(graded.rows[0].last(), Some(&Cell::Number(9.0)));

    let report = GradeReport::load_json(&dir.path().join("out/elaborati_report.json")).unwrap();
    assert_eq!(report.series.categories, vec!["Alg", "Geo", "His", "Bio"]);
    assert_eq!(report.students[0].score, Some(9));
    assert!(dir.path().join("out/elaborati_report.html").exists());
}

#[test]
fn grade_skips_malformed_rows() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("elaborati.xlsx");
    write_results(
        &results,
        &[
            student(&["Alg00", "Geo00"], "AB", Cell::Number(12.0), "s1"),
            student(&["Alg01", "Geo01"], "AB", Cell::from("AB"), "s2"),
        ],
    );

    mucher()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--results-file")
        .arg(&results)
        .arg("--format")
        .arg("none")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row(s) graded, 1 unscored."));

    let graded = read_table(&dir.path().join("elaborati_graded.xlsx")).unwrap();
    assert_eq!(graded.rows[1].last(), Some(&Cell::Number(8.0)));
    assert!(!dir.path().join("elaborati_report.json").exists());
}

#[test]
fn grade_accepts_negative_points() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("elaborati.xlsx");
    write_results(
        &results,
        &[student(
            &["Alg00", "Geo10", "His20", "Bio30"],
            "ABCD",
            Cell::from("A-CX"),
            "rossi",
        )],
    );

    mucher()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--results-file")
        .arg(&results)
        .arg("--points-incorrect")
        .arg("-1")
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let report = GradeReport::load_json(&dir.path().join("elaborati_report.json")).unwrap();
    assert_eq!(report.students[0].score, Some(8));
    assert_eq!(report.policy.points_incorrect, -1);
}

#[test]
fn grade_missing_results_fails() {
    let dir = TempDir::new().unwrap();

    mucher()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--results-file")
        .arg("missing.xlsx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.xlsx"));
}

#[test]
fn config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("answers.xlsx");
    write_results(
        &results,
        &[student(&["Alg00"], "A", Cell::from("A"), "rossi")],
    );
    std::fs::write(
        dir.path().join("mucher.toml"),
        "results_file = \"answers.xlsx\"\npoints_correct = 10\n",
    )
    .unwrap();

    mucher()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let report = GradeReport::load_json(&dir.path().join("answers_report.json")).unwrap();
    assert_eq!(report.students[0].score, Some(10));
}

#[test]
fn create_with_missing_randomizer_fails() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("questionario.xlsx");
    write_bank(&bank, &[("Zoology", ZOOLOGY)]);
    std::fs::write(
        dir.path().join("mucher.toml"),
        "randomizer_program = \"/nonexistent/much\"\n",
    )
    .unwrap();

    mucher()
        .current_dir(dir.path())
        .arg("create")
        .assert()
        .failure()
        .stderr(predicate::str::contains("variant generation"))
        .stderr(predicate::str::contains("not installed"));
}

#[cfg(unix)]
mod fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn create_runs_both_tools() {
        let dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        write_bank(
            &dir.path().join("questionario.xlsx"),
            &[("Zoology", ZOOLOGY)],
        );

        let much = script(
            bin.path(),
            "much",
            r#"read cmd; read file
[ -f "$file" ] && [ -f Zoology-0 ] || exit 4
echo '% variants' > mc-output.tex
printf 'Serial Form Q1\n10 A Zoology00\n11 B Zoology00\n' > mc-serials.txt"#,
        );
        let pdflatex = script(bin.path(), "pdflatex", "touch exam.pdf");
        std::fs::write(
            dir.path().join("mucher.toml"),
            format!(
                "randomizer_program = \"{much}\"\ncompiler_program = \"{pdflatex}\"\n\
                 output_dir = \"out\"\ntool_timeout_secs = 30\n"
            ),
        )
        .unwrap();

        mucher()
            .current_dir(dir.path())
            .arg("create")
            .arg("--num-tests")
            .arg("2")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created 2 variant(s) from 1 categories"));

        let out = dir.path().join("out");
        assert!(out.join("exam.pdf").exists());
        assert!(out.join("exam.tex").exists());
        let results = read_table(&out.join("elaborati.xlsx")).unwrap();
        assert_eq!(results.rows.len(), 2);
    }

    #[test]
    fn create_surfaces_randomizer_errors() {
        let dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        write_bank(
            &dir.path().join("questionario.xlsx"),
            &[("Zoology", ZOOLOGY)],
        );
        let much = script(bin.path(), "much", "echo 'unknown directive' >&2; exit 1");
        std::fs::write(
            dir.path().join("mucher.toml"),
            format!("randomizer_program = \"{much}\"\n"),
        )
        .unwrap();

        mucher()
            .current_dir(dir.path())
            .arg("create")
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown directive"));
        assert!(!dir.path().join("elaborati.xlsx").exists());
    }
}
