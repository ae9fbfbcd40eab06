//! Conversion pipeline: decode → sample (text artifact) → render → encode.
//!
//! One job runs on one named worker thread. The caller keeps a
//! [`PipelineHandle`] to follow progress, request cancellation and collect
//! the [`PipelineReport`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use ap_ascii::artifact::discard_artifact;
use ap_ascii::sampler::AsciiSampler;
use ap_core::config::{ArtifactRetention, PipelineConfig};
use ap_core::error::CoreError;
use ap_core::traits::GlyphFont;
use ap_export::GlyphCompositor;
use ap_export::encode::save_png;
use ap_export::font::load_font;
use ap_source::sizing::{OutputSize, resolve_output_size};

/// Progress event emitted by the worker.
#[derive(Clone, Debug, PartialEq)]
pub enum Progress {
    /// Source decoded.
    Decoded {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },
    /// One more row sampled.
    Sampling {
        /// Rows done (1-based).
        row: u32,
        /// Total rows.
        rows: u32,
    },
    /// Text artifact committed.
    Sampled(PathBuf),
    /// Glyph compositing started.
    Rendering,
    /// PNG written.
    Encoded(PathBuf),
}

/// Everything one conversion needs. No global state.
pub struct PipelineJob {
    /// Source image.
    pub input: PathBuf,
    /// Destination of the text artifact.
    pub text_path: PathBuf,
    /// Destination of the PNG.
    pub image_path: PathBuf,
    /// Sizing, render and retention settings.
    pub config: PipelineConfig,
    /// Font for the render stage; `None` when rendering is disabled.
    pub font: Option<Arc<dyn GlyphFont>>,
}

impl PipelineJob {
    /// Build a job for `input`, deriving output paths and loading the font.
    ///
    /// # Errors
    /// Returns an error if rendering is enabled and the font cannot be loaded.
    pub fn new(input: &Path, config: PipelineConfig) -> Result<Self> {
        let font = if config.render_enabled {
            Some(load_font(&config.font).context("Chargement de la police")?)
        } else {
            None
        };
        Ok(Self::with_font(input, config, font))
    }

    /// Build a job with an already loaded font.
    #[must_use]
    pub fn with_font(
        input: &Path,
        config: PipelineConfig,
        font: Option<Arc<dyn GlyphFont>>,
    ) -> Self {
        let (text_path, image_path) = output_paths(input, config.out_dir.as_deref());
        Self {
            input: input.to_path_buf(),
            text_path,
            image_path,
            config,
            font,
        }
    }
}

/// Outcome of a finished job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Grid size in characters.
    pub output: OutputSize,
    /// Text artifact, `None` if it was deleted after rendering.
    pub text_path: Option<PathBuf>,
    /// PNG, `None` if rendering was disabled.
    pub image_path: Option<PathBuf>,
}

/// Handle on a running job.
pub struct PipelineHandle {
    progress: flume::Receiver<Progress>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<PipelineReport>>,
}

impl PipelineHandle {
    /// Progress events. The channel closes when the worker ends.
    #[must_use]
    pub fn progress(&self) -> &flume::Receiver<Progress> {
        &self.progress
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Shared cancel flag, for signal handlers.
    #[must_use]
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Block until the worker finishes.
    ///
    /// # Errors
    /// Returns the worker's error, or an error if it panicked.
    pub fn wait(self) -> Result<PipelineReport> {
        match self.worker.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("Le thread de conversion a paniqué"),
        }
    }
}

/// Start `job` on a dedicated worker thread.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn submit(job: PipelineJob) -> Result<PipelineHandle> {
    let (tx, rx) = flume::unbounded();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);

    let worker = thread::Builder::new()
        .name("ap-pipeline".to_string())
        .spawn(move || run(&job, &worker_cancel, &tx))?;

    Ok(PipelineHandle {
        progress: rx,
        cancel,
        worker,
    })
}

/// True if `err` comes from a cancelled job.
#[must_use]
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<CoreError>(), Some(CoreError::Cancelled))
}

/// `<stem>.ascii.txt` and `<stem>.ascii.png`, in `out_dir` or next to the input.
///
/// The `.ascii` infix keeps a PNG input from being overwritten by its own render.
#[must_use]
pub fn output_paths(input: &Path, out_dir: Option<&Path>) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .map_or_else(|| "ascii".into(), |s| s.to_string_lossy().into_owned());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    (
        dir.join(format!("{stem}.ascii.txt")),
        dir.join(format!("{stem}.ascii.png")),
    )
}

/// Run a job on the current thread.
///
/// # Errors
/// Decode, sampling, render or encode failure, or [`CoreError::Cancelled`].
pub fn run(
    job: &PipelineJob,
    cancel: &AtomicBool,
    progress: &flume::Sender<Progress>,
) -> Result<PipelineReport> {
    // Envoi best-effort : un récepteur fermé ne doit pas interrompre la conversion.
    let emit = |event: Progress| {
        let _ = progress.send(event);
    };

    let image = ap_source::image::load_image(&job.input)?;
    emit(Progress::Decoded {
        width: image.width(),
        height: image.height(),
    });

    let output = resolve_output_size(&job.config, image.width(), image.height())
        .with_context(|| format!("Taille de sortie pour {}", job.input.display()))?;

    let art = AsciiSampler::new().sample_to_file(
        &image,
        output.width,
        output.height,
        &job.text_path,
        cancel,
        |p| {
            emit(Progress::Sampling {
                row: p.row,
                rows: p.rows,
            });
        },
    )?;
    emit(Progress::Sampled(job.text_path.clone()));

    let Some(font) = job.font.as_deref().filter(|_| job.config.render_enabled) else {
        return Ok(PipelineReport {
            output,
            text_path: Some(job.text_path.clone()),
            image_path: None,
        });
    };

    emit(Progress::Rendering);
    let compositor = GlyphCompositor::new(job.config.background, job.config.cell_height);
    let canvas = compositor.render_with(
        &art.text,
        output.width,
        output.height,
        &art.colors,
        font,
        cancel,
    )?;
    save_png(&canvas, &job.image_path)?;
    emit(Progress::Encoded(job.image_path.clone()));

    let text_path = match job.config.retention {
        ArtifactRetention::Keep => Some(job.text_path.clone()),
        ArtifactRetention::DeleteAfterRender => {
            discard_artifact(&job.text_path);
            None
        }
    };

    Ok(PipelineReport {
        output,
        text_path,
        image_path: Some(job.image_path.clone()),
    })
}
