//! Integration tests for strata-cli.
//!
//! Tests cover the CLI binary invocation: processor listing, preset
//! inspection and end-to-end WAV rendering.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `strata` binary built by cargo.
fn strata_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_strata"))
}

fn write_sine(path: &Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let s = (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48000.0).sin() * 0.5;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `strata processors`
// ---------------------------------------------------------------------------

#[test]
fn cli_processors_lists_all_types() {
    let output = strata_bin()
        .args(["processors", "list"])
        .output()
        .expect("failed to run strata processors list");

    assert!(output.status.success(), "strata processors list failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available Processors"));

    for name in [
        "amplifier",
        "volume-pan",
        "stereo-width",
        "waveshaper",
        "biquad-filter",
        "bitcrusher",
        "ring-modulator",
        "tremolo",
        "simple-delay",
        "noise",
    ] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
    assert!(stdout.contains("[group only]"));
}

#[test]
fn cli_processors_json_is_parseable() {
    let output = strata_bin()
        .args(["processors", "list", "--json"])
        .output()
        .expect("failed to run strata");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let list = value.as_array().expect("array");
    assert_eq!(list[0]["streaming_name"], "none");
    assert_eq!(list.len(), 11);
}

#[test]
fn cli_processors_describe_shows_parameters() {
    let output = strata_bin()
        .args(["processors", "describe", "biquad-filter"])
        .output()
        .expect("failed to run strata");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Biquad Filter"));
    assert!(stdout.contains("Parameters"));
    assert!(stdout.contains("Cutoff"));
    assert!(stdout.contains("Low Pass"));
}

#[test]
fn cli_processors_unknown_fails() {
    let output = strata_bin()
        .args(["processors", "describe", "nonexistent_processor_xyz"])
        .output()
        .expect("failed to run strata");

    assert!(!output.status.success(), "should fail for unknown processor");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown processor"),
        "error should mention unknown processor, got: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `strata --help`
// ---------------------------------------------------------------------------

#[test]
fn cli_help_works() {
    let output = strata_bin()
        .arg("--help")
        .output()
        .expect("failed to run strata --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Strata processor chain CLI"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("processors"));
    assert!(stdout.contains("presets"));
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `strata presets`
// ---------------------------------------------------------------------------

#[test]
fn cli_presets_list_and_show() {
    let output = strata_bin().args(["presets", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("crunch"));
    assert!(stdout.contains("slapback"));

    let output = strata_bin().args(["presets", "show", "crunch"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Waveshaper"));
    assert!(stdout.contains("Topology: sequential"));
}

#[test]
fn cli_presets_validate_group_only() {
    let ok = strata_bin()
        .args(["presets", "validate", "slapback"])
        .output()
        .unwrap();
    assert!(ok.status.success());

    let voice = strata_bin()
        .args(["presets", "validate", "slapback", "--voice"])
        .output()
        .unwrap();
    assert!(!voice.status.success());
    let stderr = String::from_utf8_lossy(&voice.stderr);
    assert!(stderr.contains("group chains"), "got: {stderr}");
}

#[test]
fn cli_presets_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lofi.toml");
    let path_str = path.to_str().unwrap();

    let output = strata_bin()
        .args(["presets", "export", "lofi", path_str])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("topology = \"par3\""));
    assert!(text.contains("type = \"bitcrusher\""));

    let again = strata_bin()
        .args(["presets", "export", "lofi", path_str])
        .output()
        .unwrap();
    assert!(!again.status.success(), "should refuse to overwrite");

    let show = strata_bin().args(["presets", "show", path_str]).output().unwrap();
    assert!(show.status.success());
    assert!(String::from_utf8_lossy(&show.stdout).contains("Bitcrusher"));
}

// ---------------------------------------------------------------------------
// CLI binary tests -- `strata render` (end-to-end file processing)
// ---------------------------------------------------------------------------

#[test]
fn cli_render_mono_preset() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_sine(&input, 1, 4800);

    let result = strata_bin()
        .args([
            "render",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--preset",
            "crunch",
        ])
        .output()
        .expect("failed to run strata render");
    assert!(
        result.status.success(),
        "strata render failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.len(), 4800);
}

#[test]
fn cli_render_widening_preset_writes_stereo() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_sine(&input, 1, 1000);

    let result = strata_bin()
        .args([
            "render",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--preset",
            "wide-tremolo",
            "--bit-depth",
            "16",
            "--tail",
            "0.5",
        ])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "{}",
        String::from_utf8_lossy(&result.stderr)
    );

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len(), 2 * (1000 + 24000));
}

#[test]
fn cli_render_topology_override_and_oversample() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_sine(&input, 2, 2000);

    let result = strata_bin()
        .args([
            "render",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--preset",
            "slapback",
            "--topology",
            "par1",
            "--oversample",
        ])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "{}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Routing: par1"));

    let mut reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert!(reader.samples::<f32>().all(|s| s.unwrap().is_finite()));
}

#[test]
fn cli_render_missing_preset_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    write_sine(&input, 1, 100);

    let result = strata_bin()
        .args([
            "render",
            input.to_str().unwrap(),
            dir.path().join("out.wav").to_str().unwrap(),
            "--preset",
            "no-such-preset",
        ])
        .output()
        .unwrap();
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("not found"));
}
