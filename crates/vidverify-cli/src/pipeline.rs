//! End-to-end analysis of one video against one reference photo.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;
use vidverify_gemini::{GeminiClient, GeminiFile, UploadProgress};
use vidverify_media::{create_comparison_sheet, load_label_font, FrameExtractor, SheetOptions};
use vidverify_models::{
    parse_analysis_response, AnalysisData, AnalysisReport, EvidenceFrame, FileInfo, RunId,
};

use crate::config::AppConfig;
use crate::console;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::progress::{self, SimulatedProgress};
use crate::prompt::build_prompt;

const REFERENCE_KIND: &str = "reference photo";
const VIDEO_KIND: &str = "video";

/// Runs the upload, analysis, evidence and cleanup steps.
pub struct Analyzer {
    client: GeminiClient,
    config: AppConfig,
    sheet_options: Arc<SheetOptions>,
}

impl Analyzer {
    /// Build the client and load the label font.
    pub fn new(config: AppConfig) -> PipelineResult<Self> {
        if config.models.is_empty() {
            return Err(PipelineError::config("no model configured"));
        }

        let client = GeminiClient::new(config.gemini.clone())?;
        let sheet_options = SheetOptions {
            font: load_label_font(config.font.as_deref())?,
            ..SheetOptions::default()
        };

        Ok(Self {
            client,
            config,
            sheet_options: Arc::new(sheet_options),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Analyze the configured video and write the run report.
    ///
    /// Uploaded files are deleted afterwards, whether or not the analysis
    /// succeeded, unless the config says to keep them.
    pub async fn analyze(&self) -> PipelineResult<AnalysisReport> {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "analyze");
        let span = logger.create_span();

        self.analyze_run(&run_id, &logger).instrument(span).await
    }

    async fn analyze_run(
        &self,
        run_id: &RunId,
        logger: &RunLogger,
    ) -> PipelineResult<AnalysisReport> {
        logger.log_start(&format!(
            "video={} reference={}",
            self.config.video.display(),
            self.config.image.display()
        ));

        let video_info = input_info(&self.config.video)?;
        let image_info = input_info(&self.config.image)?;
        console::print_header(&self.config.models[0]);

        let mut uploaded = Vec::new();
        let outcome = self
            .run(run_id, logger, &image_info, &video_info, &mut uploaded)
            .await;

        if self.config.keep_remote {
            let names: Vec<&str> = uploaded.iter().map(|f| f.name.as_str()).collect();
            console::print_kept_remote(&names);
        } else {
            self.cleanup(&uploaded, &logger.for_step("cleanup")).await;
        }

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                logger.log_error(&e.to_string());
                return Err(e);
            }
        };

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let report_path = self.config.report_path();
        report.write_json(&report_path)?;
        console::print_report_written(&report_path);

        logger.log_completion(&format!("report={}", report_path.display()));
        Ok(report)
    }

    async fn run(
        &self,
        run_id: &RunId,
        logger: &RunLogger,
        image_info: &FileInfo,
        video_info: &FileInfo,
        uploaded: &mut Vec<GeminiFile>,
    ) -> PipelineResult<AnalysisReport> {
        let started_at = Utc::now();
        let total_start = Instant::now();

        let upload_logger = logger.for_step("upload");
        let reference = self
            .upload(REFERENCE_KIND, &self.config.image, image_info, &upload_logger)
            .await?;
        uploaded.push(reference.clone());
        let video = self
            .upload(VIDEO_KIND, &self.config.video, video_info, &upload_logger)
            .await?;
        uploaded.push(video.clone());

        let reference = self.wait_for_processing(REFERENCE_KIND, reference).await?;
        let video = self.wait_for_processing(VIDEO_KIND, video).await?;

        let analysis_logger = logger.for_step("analysis");
        console::print_analysis_start();
        let prompt = build_prompt(self.config.prompt_language);

        let analysis_start = Instant::now();
        let progress = SimulatedProgress::start("AI analysis");
        let output = self
            .client
            .generate_with_fallback(&self.config.models, &prompt, &[reference, video])
            .await?;
        progress.finish();

        let analysis_elapsed = analysis_start.elapsed();
        let total_elapsed = total_start.elapsed();
        analysis_logger.log_completion(&format!(
            "model={} secs={:.1}",
            output.model,
            analysis_elapsed.as_secs_f64()
        ));

        console::print_analysis_done(&output.model, analysis_elapsed, total_elapsed);
        if let Some(usage) = &output.usage {
            console::print_token_usage(usage);
        }
        console::print_analysis_text(&output.text);

        let data = parse_analysis_response(&output.text);
        console::print_scores(&data);

        let (screenshots, comparison_path) = self
            .collect_evidence(&data, &logger.for_step("evidence"))
            .await;

        Ok(AnalysisReport {
            run_id: run_id.clone(),
            model: output.model,
            video_path: self.config.video.clone(),
            reference_path: self.config.image.clone(),
            started_at,
            analysis_secs: analysis_elapsed.as_secs_f64(),
            total_secs: total_elapsed.as_secs_f64(),
            token_usage: output.usage,
            analysis: output.text,
            data,
            screenshots,
            comparison_path,
        })
    }

    async fn upload(
        &self,
        kind: &str,
        path: &Path,
        info: &FileInfo,
        logger: &RunLogger,
    ) -> PipelineResult<GeminiFile> {
        console::print_upload_start(kind, info);
        logger.log_progress(&format!("uploading {} ({} bytes)", info.name, info.size));

        let bar = progress::upload_bar(info.size);
        let ticker = bar.clone();
        let on_progress: UploadProgress = Arc::new(move |sent| ticker.set_position(sent));

        let started = Instant::now();
        match self.client.upload_file(path, Some(on_progress)).await {
            Ok(file) => {
                bar.finish_and_clear();
                console::print_upload_done(kind, started.elapsed(), &file.uri);
                Ok(file)
            }
            Err(e) => {
                bar.abandon();
                console::print_upload_failed(kind, &e);
                Err(e.into())
            }
        }
    }

    async fn wait_for_processing(
        &self,
        kind: &str,
        file: GeminiFile,
    ) -> PipelineResult<GeminiFile> {
        console::print_processing_start(kind);

        let spinner = progress::processing_spinner();
        let started = Instant::now();
        let result = self
            .client
            .wait_until_active(file, |waited| {
                spinner.set_message(console::processing_message(waited))
            })
            .await;
        spinner.finish_and_clear();

        let file = result?;
        console::print_processing_done(started.elapsed());
        Ok(file)
    }

    /// Extract stills and build the sheet. Failures here are reported but
    /// do not fail the run; the analysis text is still worth keeping.
    async fn collect_evidence(
        &self,
        data: &AnalysisData,
        logger: &RunLogger,
    ) -> (Vec<EvidenceFrame>, Option<PathBuf>) {
        if data.timestamps.is_empty() {
            logger.log_warning("no evidence timestamps in the response");
            return (Vec::new(), None);
        }

        let extractor = FrameExtractor::new(&self.config.output_dir)
            .with_timeout(self.config.ffmpeg_timeout_secs);
        let frames = match extractor.extract(&self.config.video, &data.timestamps).await {
            Ok(frames) => frames,
            Err(e) => {
                logger.log_warning(&format!("frame extraction failed: {}", e));
                console::print_evidence_failed(&e);
                return (Vec::new(), None);
            }
        };

        if frames.is_empty() {
            logger.log_warning("no evidence frame could be extracted");
            return (frames, None);
        }

        let comparison = match self.build_sheet(frames.clone()).await {
            Ok(path) => path,
            Err(e) => {
                logger.log_warning(&format!("comparison sheet failed: {}", e));
                console::print_evidence_failed(&e);
                None
            }
        };

        console::print_evidence(&frames, comparison.as_deref());
        logger.log_completion(&format!("{} stills", frames.len()));
        (frames, comparison)
    }

    async fn build_sheet(&self, frames: Vec<EvidenceFrame>) -> PipelineResult<Option<PathBuf>> {
        let reference = self.config.image.clone();
        let output_dir = self.config.output_dir.clone();
        let options = Arc::clone(&self.sheet_options);

        let path = tokio::task::spawn_blocking(move || {
            create_comparison_sheet(reference, &frames, output_dir, &options)
        })
        .await??;
        Ok(path)
    }

    async fn cleanup(&self, files: &[GeminiFile], logger: &RunLogger) {
        if files.is_empty() {
            return;
        }

        console::print_cleanup_start();
        for file in files {
            match self.client.delete_file(&file.name).await {
                Ok(()) => console::print_deleted(&file.name),
                Err(e) => {
                    logger.log_warning(&format!("failed to delete {}: {}", file.name, e));
                    console::print_delete_failed(&file.name, &e);
                }
            }
        }
    }
}

fn input_info(path: &Path) -> PipelineResult<FileInfo> {
    if !path.is_file() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }
    Ok(FileInfo::from_path(path)?)
}
