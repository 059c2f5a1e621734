use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::error::Error;
use tempfile::{tempdir, TempDir};

fn subextract_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("subextract").expect("Failed to find subextract binary");
    cmd.env("SUBEXTRACT_CONFIG", config_dir.path().join("config.yaml"));
    cmd
}

#[test]
fn test_help_lists_commands() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;

    subextract_cmd(&config_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("extract").and(contains("probe")).and(contains("test")));

    Ok(())
}

#[test]
fn test_config_is_written_and_shown() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;
    let config_file = config_dir.path().join("config.yaml");

    subextract_cmd(&config_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Configuration written to"));
    assert!(config_file.exists());

    std::fs::write(&config_file, "naming:\n  language_code: three\n  default_language: ''\n")?;

    subextract_cmd(&config_dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(contains("ISO 639-2/B").and(contains("Default Language: disabled")));

    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;
    std::fs::write(config_dir.path().join("config.yaml"), "app:\n  text_codecs: []\n")?;

    subextract_cmd(&config_dir)
        .args(["config", "--show"])
        .assert()
        .failure()
        .stderr(contains("text subtitle codec"));

    Ok(())
}

#[test]
fn test_extract_missing_path_fails() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;

    subextract_cmd(&config_dir)
        .args(["extract", "--dry-run", "surely/this/does/not/exist/movie.mkv"])
        .assert()
        .failure()
        .stderr(contains("Path does not exist"));

    Ok(())
}

#[test]
fn test_extract_non_video_counts_as_failure() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;
    let input_dir = tempdir()?;
    let notes = input_dir.path().join("notes.txt");
    std::fs::write(&notes, "not a video")?;

    subextract_cmd(&config_dir)
        .args(["extract", "--dry-run", "--quiet"])
        .arg(&notes)
        .assert()
        .failure()
        .stdout(contains("Not a video file"))
        .stderr(contains("1 file(s) failed"));

    Ok(())
}

#[test]
fn test_extract_empty_directory() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;
    let input_dir = tempdir()?;

    subextract_cmd(&config_dir)
        .args(["extract", "--dry-run", "--format", "json"])
        .arg(input_dir.path())
        .assert()
        .success()
        .stdout(contains("\"results\": []"));

    Ok(())
}

#[test]
fn test_test_command_skips_non_video() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;
    let input_dir = tempdir()?;
    let notes = input_dir.path().join("notes.txt");
    std::fs::write(&notes, "not a video")?;

    subextract_cmd(&config_dir)
        .arg("test")
        .arg(&notes)
        .assert()
        .success()
        .stdout(contains("not a video file"));

    Ok(())
}

#[test]
fn test_rejects_unknown_hi_suffix() -> Result<(), Box<dyn Error>> {
    let config_dir = tempdir()?;

    subextract_cmd(&config_dir)
        .args(["extract", "--hi-suffix", "deaf", "movie.mkv"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));

    Ok(())
}
