use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::config::Config;
use crate::mapper::{StreamMapper, SubtitlePlan};
use crate::naming;
use crate::probe::{self, FfprobeProbe, MediaProbe};
use crate::SubextractError;

pub mod progress;

use progress::ProgressParser;

/// Options placed before the input on every ffmpeg invocation
const GENERIC_OPTIONS: &[&str] = &[
    "-hide_banner",
    "-loglevel",
    "error",
    "-nostdin",
    "-nostats",
    "-progress",
    "pipe:1",
];

/// Encoder used for every extracted stream, converts mov_text as well
const SUBTITLE_ENCODER: &str = "srt";

/// A subtitle stream together with the file it will be written to
#[derive(Debug, Clone, Serialize)]
pub struct PlannedOutput {
    #[serde(flatten)]
    pub subtitle: SubtitlePlan,

    pub path: PathBuf,

    /// The target file already exists
    pub exists: bool,
}

/// Everything needed to extract the subtitles of one file
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionPlan {
    pub input: PathBuf,

    /// Input duration in seconds, used for progress
    pub duration: Option<f64>,

    pub outputs: Vec<PlannedOutput>,
}

impl ExtractionPlan {
    /// Outputs that will actually be written
    pub fn pending(&self, overwrite: bool) -> impl Iterator<Item = &PlannedOutput> {
        self.outputs.iter().filter(move |output| overwrite || !output.exists)
    }
}

/// Outcome of the file test for one input
#[derive(Debug, Clone, Serialize)]
pub struct FileTest {
    pub input: PathBuf,

    pub is_video: bool,

    /// Number of text subtitle streams found
    pub text_streams: usize,
}

impl FileTest {
    pub fn needs_processing(&self) -> bool {
        self.is_video && self.text_streams > 0
    }
}

/// Extraction result with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub input: PathBuf,

    /// Subtitle files written (or that would be written on a dry run)
    pub written: Vec<PathBuf>,

    /// Existing files left untouched because overwriting is disabled
    pub skipped_existing: Vec<PathBuf>,

    pub dry_run: bool,

    /// Time spent in ffmpeg, seconds
    pub elapsed_secs: f64,

    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedInput {
    pub input: PathBuf,
    pub error: String,
}

/// Results of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub results: Vec<ExtractionResult>,
    pub failures: Vec<FailedInput>,
}

impl BatchSummary {
    pub fn files_written(&self) -> usize {
        self.results.iter().map(|r| r.written.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Main extraction pipeline
pub struct ExtractionPipeline {
    config: Config,
    probe: Box<dyn MediaProbe>,
    mapper: StreamMapper,
    show_progress: bool,
}

impl ExtractionPipeline {
    /// Create a pipeline backed by ffprobe
    pub fn new(config: Config) -> Self {
        let probe = FfprobeProbe::new(config.app.ffprobe_path.clone());
        Self::with_probe(config, Box::new(probe))
    }

    /// Create a pipeline with a custom probe
    pub fn with_probe(config: Config, probe: Box<dyn MediaProbe>) -> Self {
        let mapper = StreamMapper::new(config.naming.clone(), &config.app.text_codecs);
        Self {
            config,
            probe,
            mapper,
            show_progress: false,
        }
    }

    /// Show a progress bar while ffmpeg runs
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Check whether a file contains text subtitles worth extracting
    pub async fn test_file(&self, input: &Path) -> Result<FileTest> {
        let probe = match probe::probe_video(self.probe.as_ref(), input).await {
            Ok(probe) => probe,
            Err(e) if matches!(e.downcast_ref::<SubextractError>(), Some(SubextractError::NotAVideo(_))) => {
                tracing::debug!("{}", e);
                return Ok(FileTest {
                    input: input.to_path_buf(),
                    is_video: false,
                    text_streams: 0,
                });
            }
            Err(e) => return Err(e),
        };

        let text_streams = probe
            .subtitle_streams()
            .filter(|stream| self.mapper.stream_needs_processing(stream))
            .count();

        if text_streams > 0 {
            tracing::debug!(
                "File '{}' should be processed, found {} text subtitle stream(s)",
                input.display(),
                text_streams
            );
        } else {
            tracing::debug!("File '{}' does not contain streams that require processing", input.display());
        }

        Ok(FileTest {
            input: input.to_path_buf(),
            is_video: true,
            text_streams,
        })
    }

    /// Probe a file and work out the output file of every text subtitle stream
    pub async fn plan(&self, input: &Path, output_dir: Option<&Path>) -> Result<ExtractionPlan> {
        let probe = probe::probe_video(self.probe.as_ref(), input).await?;

        let outputs = self
            .mapper
            .subtitle_plans(&probe)
            .into_iter()
            .map(|subtitle| {
                let path = naming::output_path(input, output_dir, &subtitle.tag);
                let exists = path.exists();
                PlannedOutput { subtitle, path, exists }
            })
            .collect();

        Ok(ExtractionPlan {
            input: input.to_path_buf(),
            duration: probe.duration(),
            outputs,
        })
    }

    /// Full ffmpeg argument list (without the program) extracting all pending outputs at once
    pub fn ffmpeg_args(&self, plan: &ExtractionPlan) -> Vec<OsString> {
        let mut args: Vec<OsString> = GENERIC_OPTIONS.iter().map(|o| OsString::from(*o)).collect();

        // -n makes ffmpeg refuse targets created after planning
        args.push(if self.config.app.overwrite { "-y" } else { "-n" }.into());

        args.push("-i".into());
        args.push(plan.input.clone().into_os_string());

        for output in plan.pending(self.config.app.overwrite) {
            args.extend(output.subtitle.stream_mapping().into_iter().map(OsString::from));
            args.push("-c:s".into());
            args.push(SUBTITLE_ENCODER.into());
            args.push(output.path.clone().into_os_string());
        }

        args
    }

    /// Extract all text subtitles of one file
    pub async fn extract(&self, input: &Path, output_dir: Option<&Path>, dry_run: bool) -> Result<ExtractionResult> {
        self.extract_claiming(input, output_dir, dry_run, &mut HashSet::new())
            .await
    }

    /// Extract one file, renaming outputs whose paths an earlier file of the batch already uses
    async fn extract_claiming(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        dry_run: bool,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<ExtractionResult> {
        tracing::info!("Inspecting subtitle streams of {}", input.display());
        let mut plan = self.plan(input, output_dir).await?;
        claim_outputs(&mut plan, output_dir, claimed);

        let overwrite = self.config.app.overwrite;
        let written: Vec<PathBuf> = plan.pending(overwrite).map(|o| o.path.clone()).collect();
        let skipped_existing: Vec<PathBuf> = plan
            .outputs
            .iter()
            .filter(|o| !overwrite && o.exists)
            .map(|o| o.path.clone())
            .collect();

        for path in &skipped_existing {
            tracing::info!("Keeping existing subtitle file {}", path.display());
        }

        let mut result = ExtractionResult {
            input: input.to_path_buf(),
            written,
            skipped_existing,
            dry_run,
            elapsed_secs: 0.0,
            completed_at: Utc::now(),
        };

        if plan.outputs.is_empty() {
            tracing::info!("File '{}' does not contain streams that require processing", input.display());
            return Ok(result);
        }

        if result.written.is_empty() {
            return Ok(result);
        }

        if dry_run {
            for path in &result.written {
                tracing::info!("Would write {}", path.display());
            }
            return Ok(result);
        }

        if let Some(dir) = output_dir {
            fs_err::create_dir_all(dir).context("Failed to create output directory")?;
        }

        let start = Instant::now();
        let args = self.ffmpeg_args(&plan);
        self.run_ffmpeg(&args, plan.duration, input).await?;

        result.elapsed_secs = start.elapsed().as_secs_f64();
        result.completed_at = Utc::now();

        for path in &result.written {
            tracing::info!("Wrote {}", path.display());
        }

        Ok(result)
    }

    /// Extract a batch of files one after the other; a failing file does not stop the batch
    pub async fn extract_many(&self, inputs: &[PathBuf], output_dir: Option<&Path>, dry_run: bool) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut claimed = HashSet::new();

        for input in inputs {
            match self.extract_claiming(input, output_dir, dry_run, &mut claimed).await {
                Ok(result) => summary.results.push(result),
                Err(e) => {
                    tracing::error!("Failed to extract subtitles from {}: {:#}", input.display(), e);
                    summary.failures.push(FailedInput {
                        input: input.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        summary
    }

    /// Run ffmpeg, feeding its progress output into a progress bar
    async fn run_ffmpeg(&self, args: &[OsString], duration: Option<f64>, input: &Path) -> Result<()> {
        let ffmpeg = &self.config.app.ffmpeg_path;
        tracing::debug!(
            "Running {} {}",
            ffmpeg,
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
        );

        let mut child = Command::new(ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SubextractError::ExtractionFailed(format!("could not run {}: {}", ffmpeg, e)))?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let progress = self.progress_bar(input);
        let mut parser = ProgressParser::new(duration);

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(update) = parser.parse_line(&line) {
                    if let Some(percent) = update.percent {
                        progress.set_position(percent.round() as u64);
                    }
                    if let Some(speed) = update.speed {
                        progress.set_message(format!("{:.1}x", speed));
                    }
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            progress.abandon_with_message("failed");
            return Err(SubextractError::ExtractionFailed(format!(
                "ffmpeg exited with {} for {}: {}",
                status,
                input.display(),
                stderr_tail(&stderr)
            ))
            .into());
        }

        progress.finish_with_message("done");
        Ok(())
    }

    fn progress_bar(&self, input: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(100);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress.set_prefix(console::style(name).bold().to_string());
        progress
    }
}

/// Give every output a path no earlier file of the batch has claimed.
///
/// Inputs sharing a stem collide once they are written to a common output
/// directory; later ones get `.2`, `.3`, ... appended to their tag.
fn claim_outputs(plan: &mut ExtractionPlan, output_dir: Option<&Path>, claimed: &mut HashSet<PathBuf>) {
    for output in &mut plan.outputs {
        if claimed.contains(&output.path) {
            let base = output.subtitle.tag.clone();
            let mut n = 2;
            loop {
                let tag = format!("{}.{}", base, n);
                let path = naming::output_path(&plan.input, output_dir, &tag);
                if !claimed.contains(&path) {
                    tracing::warn!(
                        "{} is already written by another file of this run, using {} instead",
                        output.path.display(),
                        path.display()
                    );
                    output.exists = path.exists();
                    output.subtitle.tag = tag;
                    output.path = path;
                    break;
                }
                n += 1;
            }
        }
        claimed.insert(output.path.clone());
    }
}

/// Last few non-empty lines of ffmpeg's stderr
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::sample;
    use crate::probe::{MockMediaProbe, ProbeResult};

    fn pipeline_with(config: Config, result: ProbeResult) -> ExtractionPipeline {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe().returning(move |_| Ok(result.clone()));
        ExtractionPipeline::with_probe(config, Box::new(probe))
    }

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.app.ffmpeg_path = "/nonexistent/ffmpeg".to_string();
        config
    }

    fn lossy(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[tokio::test]
    async fn test_plan_names_outputs_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Movie.mkv");
        let pipeline = pipeline_with(Config::default(), sample());

        let plan = pipeline.plan(&input, None).await.unwrap();
        let paths: Vec<_> = plan.outputs.iter().map(|o| o.path.clone()).collect();
        assert_eq!(
            paths,
            vec![dir.path().join("Movie.en.srt"), dir.path().join("Movie.pt-BR.srt")]
        );
        assert_eq!(plan.duration, Some(5400.25));
        assert!(plan.outputs.iter().all(|o| !o.exists));
    }

    #[tokio::test]
    async fn test_ffmpeg_args() {
        let pipeline = pipeline_with(Config::default(), sample());
        let plan = pipeline.plan(Path::new("/videos/Movie.mkv"), None).await.unwrap();

        let args = lossy(&pipeline.ffmpeg_args(&plan));
        let input_at = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_at + 1], "/videos/Movie.mkv");
        assert_eq!(args[input_at - 1], "-y");
        assert!(!args.contains(&"-n".to_string()));
        assert_eq!(
            &args[input_at + 2..],
            &[
                "-map", "0:s:0", "-c:s", "srt", "/videos/Movie.en.srt",
                "-map", "0:s:2", "-c:s", "srt", "/videos/Movie.pt-BR.srt",
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_does_not_run_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Movie.mkv");
        let pipeline = pipeline_with(offline_config(), sample());

        let result = pipeline.extract(&input, None, true).await.unwrap();
        assert!(result.dry_run);
        assert_eq!(result.written.len(), 2);
        assert!(!dir.path().join("Movie.en.srt").exists());
    }

    #[tokio::test]
    async fn test_no_text_streams_skips_ffmpeg() {
        let mut probe = sample();
        probe.streams.retain(|s| !s.codec_type_is("subtitle") || s.codec_name.as_deref() == Some("hdmv_pgs_subtitle"));
        let pipeline = pipeline_with(offline_config(), probe);

        let result = pipeline.extract(Path::new("Movie.mkv"), None, false).await.unwrap();
        assert!(result.written.is_empty());
    }

    #[tokio::test]
    async fn test_existing_files_kept_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Movie.mkv");
        fs_err::write(dir.path().join("Movie.en.srt"), "1\n").unwrap();

        let mut config = offline_config();
        config.app.overwrite = false;
        let pipeline = pipeline_with(config, sample());

        let plan = pipeline.plan(&input, None).await.unwrap();
        let args = lossy(&pipeline.ffmpeg_args(&plan));
        assert!(!args.contains(&"0:s:0".to_string()));
        assert!(args.contains(&"0:s:2".to_string()));
        let input_at = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input_at - 1], "-n");
        assert!(!args.contains(&"-y".to_string()));

        let result = pipeline.extract(&input, None, true).await.unwrap();
        assert_eq!(result.skipped_existing, vec![dir.path().join("Movie.en.srt")]);
        assert_eq!(result.written, vec![dir.path().join("Movie.pt-BR.srt")]);
    }

    #[tokio::test]
    async fn test_ffmpeg_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Movie.mkv");
        let pipeline = pipeline_with(offline_config(), sample());

        let err = pipeline.extract(&input, None, false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SubextractError>(),
            Some(SubextractError::ExtractionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_many_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![dir.path().join("a.mkv"), dir.path().join("notes.txt")];
        let pipeline = pipeline_with(offline_config(), sample());

        let summary = pipeline.extract_many(&inputs, None, true).await;
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.files_written(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].input, dir.path().join("notes.txt"));
        assert!(summary.has_failures());
    }

    #[tokio::test]
    async fn test_extract_many_keeps_same_stem_outputs_apart() {
        let dir = tempfile::tempdir().unwrap();
        let subs = dir.path().join("subs");
        let inputs = vec![dir.path().join("a").join("Movie.mkv"), dir.path().join("b").join("Movie.mkv")];
        let pipeline = pipeline_with(offline_config(), sample());

        let summary = pipeline.extract_many(&inputs, Some(&subs), true).await;
        assert!(!summary.has_failures());
        assert_eq!(summary.results[0].written, vec![subs.join("Movie.en.srt"), subs.join("Movie.pt-BR.srt")]);
        assert_eq!(summary.results[1].written, vec![subs.join("Movie.en.2.srt"), subs.join("Movie.pt-BR.2.srt")]);
    }

    #[tokio::test]
    async fn test_claim_outputs_skips_taken_suffixes() {
        let pipeline = pipeline_with(Config::default(), sample());
        let mut claimed: HashSet<PathBuf> = [
            PathBuf::from("/videos/Movie.en.srt"),
            PathBuf::from("/videos/Movie.en.2.srt"),
        ]
        .into_iter()
        .collect();

        let mut plan = pipeline.plan(Path::new("/videos/Movie.mkv"), None).await.unwrap();
        claim_outputs(&mut plan, None, &mut claimed);

        assert_eq!(plan.outputs[0].subtitle.tag, ".en.3");
        assert_eq!(plan.outputs[0].path, PathBuf::from("/videos/Movie.en.3.srt"));
        assert_eq!(plan.outputs[1].path, PathBuf::from("/videos/Movie.pt-BR.srt"));
        assert!(claimed.contains(Path::new("/videos/Movie.pt-BR.srt")));
    }

    #[tokio::test]
    async fn test_file_test() {
        let pipeline = pipeline_with(Config::default(), sample());

        let test = pipeline.test_file(Path::new("Movie.mkv")).await.unwrap();
        assert!(test.is_video);
        assert_eq!(test.text_streams, 2);
        assert!(test.needs_processing());

        let test = pipeline.test_file(Path::new("cover.jpg")).await.unwrap();
        assert!(!test.is_video);
        assert!(!test.needs_processing());
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = "a\n\nb\nc\nd\ne\nf\n";
        assert_eq!(stderr_tail(stderr), "b; c; d; e; f");
    }
}
