//! Directory driver: enumerate, enhance and write every eligible image

use crate::codec;
use crate::config::Config;
use crate::enhance::Pipeline;
use crate::error::EnhanceError;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A file the batch could not process
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Per-file record for a successfully enhanced image
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub tonal_applied: bool,
    pub time_ms: u64,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total: usize,
    pub processed: Vec<ProcessedFile>,
    pub skipped: Vec<SkippedFile>,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Enhance every eligible file in `config.input_dir`
///
/// Directory errors are fatal; per-file decode and encode failures are
/// logged, recorded and skipped.
pub fn run(config: &Config) -> Result<BatchSummary, EnhanceError> {
    let start = Instant::now();
    let pipeline = Pipeline::new(config.params.clone())?;

    let files = list_images(&config.input_dir, &config.extensions)?;
    ensure_distinct_dirs(&config.input_dir, &config.output_dir)?;
    fs::create_dir_all(&config.output_dir)?;

    tracing::info!(
        "Enhancing {} image(s) from {} into {} (tonal mode: {})",
        files.len(),
        config.input_dir.display(),
        config.output_dir.display(),
        pipeline.params().tonal_mode.as_str()
    );

    let progress = progress_bar(files.len() as u64, config.show_progress);
    let mut processed = Vec::new();
    let mut skipped = Vec::new();

    for path in &files {
        let name = file_name(path);
        progress.set_message(name.clone());

        // Join the raw name so non-UTF-8 names are written back unchanged
        let target = config.output_dir.join(path.file_name().unwrap_or_default());

        match process_file(&pipeline, path, &target) {
            Ok(record) => processed.push(record),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping {}: {}", name, e);
                skipped.push(SkippedFile {
                    file: name,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(BatchSummary {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        total: files.len(),
        processed,
        skipped,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

/// Refuse to write into the input directory, which would replace the originals
fn ensure_distinct_dirs(input: &Path, output: &Path) -> Result<(), EnhanceError> {
    let input = fs::canonicalize(input)?;
    // An output directory that does not exist yet cannot be the input
    if let Ok(output_resolved) = fs::canonicalize(output) {
        if output_resolved == input {
            return Err(EnhanceError::InvalidParameter(format!(
                "output directory {} is the input directory",
                output.display()
            )));
        }
    }
    Ok(())
}

fn process_file(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
) -> Result<ProcessedFile, EnhanceError> {
    let image = codec::load(input)?;
    let result = pipeline.process(image)?;
    if let Err(e) = codec::save(&result.image, output) {
        // Leave no truncated file behind
        let _ = fs::remove_file(output);
        return Err(e);
    }

    tracing::debug!(
        "Enhanced {} in {}ms ({} steps)",
        input.display(),
        result.total_time_ms,
        result.steps.len()
    );

    Ok(ProcessedFile {
        file: file_name(input),
        width: result.image.width(),
        height: result.image.height(),
        tonal_applied: result.tonal_applied,
        time_ms: result.total_time_ms,
    })
}

/// Regular files directly inside `dir` whose names end with one of
/// `extensions`, sorted by name
pub fn list_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, EnhanceError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = file_name(&path);
        if extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
