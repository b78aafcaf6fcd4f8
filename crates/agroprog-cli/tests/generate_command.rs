//! Integration tests for `agroprog generate`
//!
//! Each test runs the built binary in a fresh temporary directory so the
//! workbook lands somewhere empty and no stray `agroprog.toml` is picked up.

use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/farm")
        .join(name)
}

/// Run `agroprog generate` with the farm fixtures and extra args
fn run_generate(dir: &Path, inputs: &str, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_agroprog"))
        .current_dir(dir)
        .env_remove("AGROPROG_CONFIG")
        .env_remove("RUST_LOG")
        .arg("generate")
        .arg("--status")
        .arg(fixture("estado.csv"))
        .arg("--applications")
        .arg(fixture("aplicaciones.csv"))
        .arg("--inputs")
        .arg(fixture(inputs))
        .args(args)
        .output()
        .expect("failed to execute agroprog");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn writes_workbook_named_after_start_date() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "01/01/2024", "--weeks", "4"],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(files_in(dir.path()), vec!["Programacion_LaJudea_20240101.xlsx"]);

    let bytes = std::fs::read(dir.path().join("Programacion_LaJudea_20240101.xlsx")).unwrap();
    assert!(bytes.starts_with(b"PK"));

    assert!(stdout.contains("Programacion"));
    assert!(stdout.contains("Resumen_Insumos"));
    assert!(stdout.contains("Sem 4 22/01 - 28/01"));
    assert!(stdout.contains("La Judea"));
    assert!(stderr.contains("wrote"));
    assert!(!stderr.contains("warning"));
}

#[test]
fn json_preview_carries_the_whole_program() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "2024-01-01", "--format", "json"],
    );
    assert_eq!(code, 0);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["weeks"], 4);
    assert_eq!(value["schedule"].as_array().unwrap().len(), 7);
    assert_eq!(value["schedule"][0]["application_name"], "Boro foliar");
    assert_eq!(value["schedule"][0]["application_date"], "2024-01-07");
    assert_eq!(value["summary"]["rows"].as_array().unwrap().len(), 4);
    assert!(value["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn explicit_output_path_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("programas/enero.xlsx");
    let (code, _, stderr) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "01/01/2024", "--output", target.to_str().unwrap()],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(target.is_file());
}

#[test]
fn missing_inputs_are_listed_together() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_agroprog"))
        .current_dir(dir.path())
        .env_remove("AGROPROG_CONFIG")
        .args(["generate", "--start", "01/01/2024", "--status"])
        .arg(fixture("estado.csv"))
        .arg("--applications")
        .arg(dir.path().join("no_such_file.csv"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Missing input tables: applications, inputs"),
        "stderr: {stderr}"
    );
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn empty_schedule_exits_zero_without_workbook() {
    let dir = TempDir::new().unwrap();
    // Every status is years old by 2030; no rule age matches
    let (code, stdout, stderr) =
        run_generate(dir.path(), "insumos.csv", &["--start", "07/01/2030"]);

    assert_eq!(code, 0);
    assert!(stderr.contains("warning: no applications scheduled"), "stderr: {stderr}");
    assert!(stdout.is_empty());
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn empty_schedule_is_reported_even_when_quiet() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "07/01/2030", "--quiet"],
    );

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert_eq!(
        stderr,
        "warning: no applications scheduled between 07/01/2030 and 03/02/2030\n"
    );
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn unmatched_dosage_warns_but_still_writes() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_generate(
        dir.path(),
        "insumos_sin_urea.csv",
        &["--start", "01/01/2024"],
    );

    assert_eq!(code, 0);
    assert!(stderr.contains("warning: application 'Urea' has no dosage record"));
    // Urea is still scheduled, only left out of the summary
    assert!(stdout.contains("Urea"));
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
fn strict_turns_unmatched_dosage_into_failure() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_generate(
        dir.path(),
        "insumos_sin_urea.csv",
        &["--start", "01/01/2024", "--strict"],
    );

    assert_eq!(code, 1);
    assert!(stderr.contains("Applications without dosage records: Urea"), "stderr: {stderr}");
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn missing_column_names_table_and_column() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_agroprog"))
        .current_dir(dir.path())
        .env_remove("AGROPROG_CONFIG")
        .args(["generate", "--start", "01/01/2024", "--status"])
        .arg(fixture("estado_sin_fecha.csv"))
        .arg("--applications")
        .arg(fixture("aplicaciones.csv"))
        .arg("--inputs")
        .arg(fixture("insumos.csv"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing column in status table: Fecha_Estado"), "stderr: {stderr}");
}

#[test]
fn quiet_suppresses_preview() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_generate(
        dir.path(),
        "insumos_sin_urea.csv",
        &["--start", "01/01/2024", "--quiet"],
    );

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
fn weeks_outside_range_rejected() {
    let dir = TempDir::new().unwrap();
    for weeks in ["0", "13"] {
        let (code, _, _) = run_generate(
            dir.path(),
            "insumos.csv",
            &["--start", "01/01/2024", "--weeks", weeks],
        );
        assert_ne!(code, 0, "--weeks {weeks} should be rejected");
    }
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn config_file_sets_farm_and_file_tag() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("farm.toml");
    std::fs::write(
        &config,
        "farm_name = \"El Porvenir\"\nfile_tag = \"Norte\"\noutput_dir = \"salida\"\n",
    )
    .unwrap();

    let (code, stdout, stderr) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "01/01/2024", "--config", config.to_str().unwrap()],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("El Porvenir"));
    assert!(dir
        .path()
        .join("salida/Programacion_Norte_20240101.xlsx")
        .is_file());
}

#[test]
fn working_directory_config_is_picked_up() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("agroprog.toml"), "file_tag = \"Sur\"\n").unwrap();

    let (code, _, _) = run_generate(dir.path(), "insumos.csv", &["--start", "01/01/2024"]);
    assert_eq!(code, 0);
    assert!(dir.path().join("Programacion_Sur_20240101.xlsx").is_file());
}

#[test]
fn farm_name_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("agroprog.toml"), "farm_name = \"El Porvenir\"\n").unwrap();

    let (code, stdout, _) = run_generate(
        dir.path(),
        "insumos.csv",
        &["--start", "01/01/2024", "--farm-name", "San Rafael"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("San Rafael"));
    assert!(!stdout.contains("El Porvenir"));
}
