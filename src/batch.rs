//! Recursive batch enhancement of a directory tree.
//!
//! The walker mirrors the input tree under the output root, runs a
//! [`Pipeline`] over every regular file and writes the result to the same
//! relative path. Per-file and per-subtree failures are logged and counted;
//! only an unreadable input root aborts the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::codec::{Codec, MAX_QUALITY};
use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::{ExecutionMode, Executor};
use crate::pipeline::Pipeline;

/// Files processed between two progress lines.
pub const DEFAULT_TELEMETRY_INTERVAL: usize = 1000;

/// Number of successfully written files, shared by reference for one run.
#[derive(Debug, Default)]
pub struct ProgressCounter(AtomicUsize);

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more file and return the new total.
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub mode: ExecutionMode,
    /// Dedicated pool size for [`ExecutionMode::Parallel`]; `None` uses the
    /// global rayon pool.
    pub threads: Option<usize>,
    /// Encoder quality, 0-100.
    pub quality: u8,
    pub telemetry_interval: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            threads: None,
            quality: MAX_QUALITY,
            telemetry_interval: DEFAULT_TELEMETRY_INTERVAL,
        }
    }
}

impl BatchOptions {
    pub fn validate(&self) -> EnhanceResult<()> {
        if self.quality > MAX_QUALITY {
            return Err(EnhanceError::invalid_parameter(format!(
                "quality must be 0-{MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        if self.threads == Some(0) {
            return Err(EnhanceError::invalid_parameter("threads must be >= 1 when set"));
        }
        if self.telemetry_interval == 0 {
            return Err(EnhanceError::invalid_parameter("telemetry interval must be >= 1"));
        }
        Ok(())
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed_files: Vec<PathBuf>,
    pub failed_dirs: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Decode `input`, run `pipeline`, and encode to `output`, creating the
/// output's parent directory if needed.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn enhance_file(
    codec: &dyn Codec,
    input: &Path,
    output: &Path,
    pipeline: &Pipeline,
    exec: &Executor,
    quality: u8,
) -> EnhanceResult<()> {
    let buffer = codec.decode(input)?;
    debug!(
        width = buffer.width(),
        height = buffer.height(),
        channels = buffer.channels(),
        "decoded"
    );
    let enhanced = pipeline.apply(buffer, exec);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EnhanceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    codec.encode(output, &enhanced, quality)
}

/// Immutable state shared by every file of one run.
struct BatchContext<'a> {
    output_root: &'a Path,
    pipeline: &'a Pipeline,
    codec: &'a dyn Codec,
    exec: Executor,
    quality: u8,
    telemetry_interval: usize,
    counter: &'a ProgressCounter,
    started: Instant,
}

impl BatchContext<'_> {
    fn process(&self, input: &Path, relative: &Path) -> EnhanceResult<()> {
        let output = self.output_root.join(relative);
        enhance_file(self.codec, input, &output, self.pipeline, &self.exec, self.quality)?;

        let done = self.counter.increment();
        if done % self.telemetry_interval == 0 {
            info!(
                "Time spent after processing {} images: {} ms",
                done,
                self.started.elapsed().as_millis()
            );
        }
        Ok(())
    }
}

/// Enhance every regular file under `input_root` into `output_root`.
///
/// Returns an error only when the options are invalid, the worker pool
/// cannot be built, or `input_root` itself cannot be opened.
pub fn run_batch(
    input_root: &Path,
    output_root: &Path,
    pipeline: &Pipeline,
    codec: &dyn Codec,
    options: &BatchOptions,
) -> EnhanceResult<BatchSummary> {
    options.validate()?;
    let exec = Executor::for_mode(options.mode, options.threads)?;

    fs::read_dir(input_root).map_err(|source| EnhanceError::DirectoryOpen {
        path: input_root.to_path_buf(),
        source,
    })?;

    let counter = ProgressCounter::new();
    let ctx = BatchContext {
        output_root,
        pipeline,
        codec,
        exec,
        quality: options.quality,
        telemetry_interval: options.telemetry_interval,
        counter: &counter,
        started: Instant::now(),
    };
    info!(
        input = %input_root.display(),
        output = %output_root.display(),
        mode = ?options.mode,
        pipeline = %pipeline,
        "starting batch"
    );

    // An output tree nested in the input must not be walked into. A failure
    // here resurfaces when the root entry is mirrored below.
    let _ = fs::create_dir_all(output_root);
    let output_canonical = fs::canonicalize(output_root).ok();

    let mut summary = BatchSummary::default();
    let mut walker = WalkDir::new(input_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                if is_dangling_link(&path) {
                    debug!(path = %path.display(), "skipping dangling link");
                } else if err.loop_ancestor().is_some() {
                    warn!(path = %path.display(), "skipping symlink loop");
                } else {
                    error!(path = %path.display(), kind = "directory", "{err}");
                    summary.failed_dirs.push(path);
                }
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(input_root) else {
            continue;
        };
        let file_type = entry.file_type();

        if file_type.is_dir() && entry.depth() > 0 && is_same_dir(entry.path(), output_canonical.as_deref()) {
            debug!(path = %entry.path().display(), "skipping output directory");
            walker.skip_current_dir();
        } else if file_type.is_dir() {
            let mirror = output_root.join(relative);
            if let Err(source) = fs::create_dir_all(&mirror) {
                let err = EnhanceError::DirectoryOpen { path: mirror, source };
                error!(path = %entry.path().display(), kind = err.kind(), "{err}");
                summary.failed_dirs.push(entry.path().to_path_buf());
                walker.skip_current_dir();
            }
        } else if file_type.is_file() {
            if let Err(err) = ctx.process(entry.path(), relative) {
                error!(path = %entry.path().display(), kind = err.kind(), "{err}");
                summary.failed_files.push(entry.path().to_path_buf());
            }
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }

    summary.processed = counter.get();
    summary.elapsed = ctx.started.elapsed();
    info!("Total time spent: {} ms", summary.elapsed.as_millis());
    Ok(summary)
}

fn is_same_dir(path: &Path, canonical: Option<&Path>) -> bool {
    canonical.is_some_and(|target| fs::canonicalize(path).is_ok_and(|p| p == target))
}

fn is_dangling_link(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) && fs::metadata(path).is_err()
}
