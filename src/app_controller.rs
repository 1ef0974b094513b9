use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::translation::{PipelineConfig, PipelineProgress, RunReport, TranslationPipeline, TranslationService};

// @module: Application controller for dialogue translation

/// Main application controller for dialogue translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate `input_file` into `output_file` with the configured provider
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: &Path,
        force_overwrite: bool,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        let service = TranslationService::from_config(&self.config.translation, cancel)?;
        self.run_with_service(&service, input_file, output_file, force_overwrite)
            .await
    }

    /// Translate `input_file` into `output_file` through the given service
    ///
    /// The output is written only once the whole document is translated.
    pub async fn run_with_service(
        &self,
        service: &TranslationService,
        input_file: &Path,
        output_file: &Path,
        force_overwrite: bool,
    ) -> Result<RunReport> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::check_output_path(output_file, force_overwrite)?;

        let document = FileManager::read_document(input_file)?;
        let pipeline_config = PipelineConfig::from_config(&self.config)?;
        let pipeline = TranslationPipeline::new(pipeline_config);

        info!(
            "🚀 dialogai: {} - {} -> {}",
            service.provider_name(),
            service.model(),
            pipeline.config().prompt_settings.target_language
        );
        info!(
            "Translating {} dialogues in {} files, please wait…",
            document.dialogue_count(),
            document.files.len()
        );

        let progress_bar = ProgressBar::new(document.dialogue_count() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} dialogues ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Analyzing corpus");

        let bar = progress_bar.clone();
        let on_progress = move |progress: &PipelineProgress| {
            bar.set_position(progress.index as u64);
            bar.set_message(format!("${:.4}", progress.cumulative_cost));
        };

        let result = pipeline.run(service, document, Some(&on_progress)).await;
        let (translated, report) = match result {
            Ok(done) => done,
            Err(e) => {
                progress_bar.abandon();
                return Err(e.into());
            }
        };
        progress_bar.finish_with_message(format!("${:.4}", report.total_cost()));

        FileManager::write_document(output_file, &translated)
            .with_context(|| format!("Failed to save translation to {}", output_file.display()))?;

        info!("Success: {}", output_file.display());
        info!("{}", report.summary());
        info!("Total time: {}", Self::format_duration(report.duration));
        debug!("{}", service.usage().summary());

        Ok(report)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
