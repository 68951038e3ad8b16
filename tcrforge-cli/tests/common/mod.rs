#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Config shared by the CLI tests; `extra` is appended verbatim.
pub const BASE_CONFIG: &str = "\
target:
  name: KRAS_G12D
design_parameters:
  num_sequences: 30
  seed_sequence: CAS
evo2_parameters:
  top_k: 4
  temperature: 1.0
";

/// Writes `BASE_CONFIG` plus `extra` to `dir/config.yaml`.
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    fs::write(&path, format!("{BASE_CONFIG}{extra}")).expect("write config");
    path
}

/// The tcrforge binary with live generation disabled and colour off.
pub fn tcrforge() -> Command {
    let mut cmd = Command::cargo_bin("tcrforge").expect("tcrforge binary");
    cmd.env_remove("NVIDIA_API_KEY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Runs a local seeded design pass into `results_dir`.
pub fn run_local(config: &Path, results_dir: &Path, seed: u64) -> assert_cmd::assert::Assert {
    tcrforge()
        .arg("--config")
        .arg(config)
        .arg("--results-dir")
        .arg(results_dir)
        .arg("--seed")
        .arg(seed.to_string())
        .assert()
}

/// Replaces the sequence column so snapshots only pin layout and ids.
pub fn redact_sequences(csv: &str, column: usize) -> String {
    csv.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                return line.to_string();
            }
            line.split(',')
                .enumerate()
                .map(|(c, field)| if c == column { "<seq>" } else { field })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
