//! Artifact manifest writer for HealthAI model directories.
//!
//! Hashes `forest.json` and `scaler.json` into `manifest.json`, which the
//! application checks at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir> [--check]
//! ```
//!
//! With `--check` the existing manifest is verified instead of rewritten.

use std::env;
use std::fs;
use std::path::PathBuf;

use healthai::adapters::manifest::verify_model_dir;
use healthai::adapters::{
    read_artifact, ArtifactManifest, FOREST_FILE, MANIFEST_FILE, SCALER_FILE,
};

fn usage() -> String {
    "Usage: write_manifest <model_dir> [--check]".to_string()
}

fn parse_args() -> Result<(PathBuf, bool), String> {
    let mut model_dir: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_none() {
                    model_dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    let model_dir = model_dir.ok_or_else(usage)?;
    Ok((model_dir, check))
}

fn main() -> Result<(), String> {
    let (model_dir, check) = parse_args()?;

    let model_dir = if model_dir.is_file() {
        model_dir
            .parent()
            .ok_or_else(|| "Model path has no parent directory".to_string())?
            .to_path_buf()
    } else {
        model_dir
    };

    let bound = [FOREST_FILE, SCALER_FILE];

    if check {
        let contents = bound
            .iter()
            .map(|file| read_artifact(&model_dir.join(file)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        let artifacts: Vec<(&str, &[u8])> = bound
            .iter()
            .zip(&contents)
            .map(|(file, bytes)| (*file, bytes.as_slice()))
            .collect();
        verify_model_dir(&model_dir, &artifacts, true).map_err(|e| e.to_string())?;
        println!("{MANIFEST_FILE} in {model_dir:?} matches {}", bound.join(", "));
        return Ok(());
    }

    let manifest = ArtifactManifest::for_files(&model_dir, &bound).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize manifest: {e}"))?;

    let out = model_dir.join(MANIFEST_FILE);
    fs::write(&out, json).map_err(|e| format!("Failed to write {out:?}: {e}"))?;

    for (file, digest) in &manifest.files {
        println!("{digest}  {file}");
    }
    println!("Wrote {out:?}");
    Ok(())
}
