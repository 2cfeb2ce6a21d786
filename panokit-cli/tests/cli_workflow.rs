//! Integration tests for the offline CLI commands.
//!
//! Each test runs the built binary with `HOME` pointed at a temporary
//! directory so the config file and log file stay sandboxed. Commands that
//! need the network (`download`, `info`) are not exercised here.

use std::path::Path;
use std::process::{Command, Output};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// Run a CLI command with a sandboxed home directory.
fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_panokit"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Write a smooth 2:1 test panorama.
fn write_panorama(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 120])
    })
    .save(path)
    .unwrap();
}

fn dimensions(path: &Path) -> (u32, u32) {
    image::open(path).unwrap().to_rgb8().dimensions()
}

#[test]
fn test_extract_id_from_url() {
    let home = TempDir::new().unwrap();
    let output = run_cli(
        home.path(),
        &[
            "extract-id",
            "https://www.google.com/maps/@48.8584,2.2945,3a,75y/data=!3m6!1e1!3m4!1sCAoSLEFGMVFpcE5hYmNERUYxMjM0!2e0",
        ],
    );
    assert_success(&output, "extract-id");
    assert_eq!(stdout(&output), "CAoSLEFGMVFpcE5hYmNERUYxMjM0");
}

#[test]
fn test_extract_id_without_match_fails() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["extract-id", "https://example.com/"]);
    assert!(!output.status.success());
}

#[test]
fn test_cubemap_then_equirect() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = work.path().join("street.png");
    let faces = work.path().join("faces");
    let output = work.path().join("street_back.jpg");
    write_panorama(&input, 256, 128);

    let result = run_cli(
        home.path(),
        &[
            "cubemap",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            faces.to_str().unwrap(),
            "--face-size",
            "48",
        ],
    );
    assert_success(&result, "cubemap");
    for face in ["front", "right", "back", "left", "up", "down"] {
        let path = faces.join(format!("street_{}.jpg", face));
        assert_eq!(dimensions(&path), (48, 48), "{}", face);
    }

    let result = run_cli(
        home.path(),
        &[
            "equirect",
            "--input-dir",
            faces.to_str().unwrap(),
            "--base",
            "street",
            "--output",
            output.to_str().unwrap(),
        ],
    );
    assert_success(&result, "equirect");
    assert_eq!(dimensions(&output), (192, 96));
}

#[test]
fn test_overlap_expands_canvas() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = work.path().join("pano.png");
    let output = work.path().join("pano_overlap.jpg");
    write_panorama(&input, 400, 200);

    let result = run_cli(
        home.path(),
        &[
            "overlap",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--percent",
            "20",
            "--layout",
            "symmetric",
        ],
    );
    assert_success(&result, "overlap");

    // bh = 200 * 20 / 200 = 20, bw = 40
    assert_eq!(dimensions(&output), (480, 240));
}

#[test]
fn test_overlap_rejects_mixed_neighbor_sources() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = work.path().join("pano.png");
    write_panorama(&input, 64, 32);

    let result = run_cli(
        home.path(),
        &[
            "overlap",
            "--input",
            input.to_str().unwrap(),
            "--output",
            work.path().join("out.jpg").to_str().unwrap(),
            "--percent",
            "20",
            "--left",
            input.to_str().unwrap(),
            "--shift-neighbors",
        ],
    );
    assert!(!result.status.success());
}

#[test]
fn test_batch_to_cubemap() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input_dir = work.path().join("in");
    let output_dir = work.path().join("out");
    std::fs::create_dir_all(&input_dir).unwrap();
    write_panorama(&input_dir.join("a.png"), 128, 64);
    write_panorama(&input_dir.join("b.png"), 128, 64);

    let result = run_cli(
        home.path(),
        &[
            "batch",
            "--input-dir",
            input_dir.to_str().unwrap(),
            "--output-dir",
            output_dir.to_str().unwrap(),
            "--mode",
            "to-cubemap",
        ],
    );
    assert_success(&result, "batch");
    assert!(stdout(&result).contains("2/2 converted"));
    assert!(output_dir.join("b_down.jpg").exists());
}

#[test]
fn test_config_init_set_get() {
    let home = TempDir::new().unwrap();

    let result = run_cli(home.path(), &["config", "init"]);
    assert_success(&result, "config init");
    assert!(home.path().join(".panokit").join("config.ini").exists());

    let result = run_cli(home.path(), &["config", "set", "overlap.percent", "25"]);
    assert_success(&result, "config set");

    let result = run_cli(home.path(), &["config", "get", "overlap.percent"]);
    assert_success(&result, "config get");
    assert_eq!(stdout(&result), "25");

    let result = run_cli(home.path(), &["config", "get", "overlap.nonsense"]);
    assert!(!result.status.success());
}
