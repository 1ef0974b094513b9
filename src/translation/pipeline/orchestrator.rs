/*!
 * Pipeline orchestrator for coordinating translation passes.
 *
 * The orchestrator drives a whole run:
 * 1. Analysis Pass: corpus summary and glossary
 * 2. Translation Pass: every dialogue, file by file, in order
 *
 * Each dialogue sees a bounded window of the dialogues before it in the same
 * file. Translated texts are written back into the document in place and the
 * cumulative cost is reported after every dialogue.
 */

use log::{info, warn};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::{AppError, TranslationError};
use crate::translation::context::ContextWindow;
use crate::translation::core::TranslationService;
use crate::translation::document::DialogueDocument;
use crate::translation::prompts::{PromptSettings, TranslationPromptBuilder};
use crate::validation::{LineLengthValidator, LineLimits};

use super::analysis_pass::AnalysisPass;
use super::translation_pass::{DEFAULT_MAX_ATTEMPTS, DialogueTranslator};

/// Configuration for the translation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Prompt wording, limits and target language
    pub prompt_settings: PromptSettings,

    /// Attempt ceiling per dialogue
    pub max_attempts: usize,

    /// Preceding dialogues shown as context
    pub window: ContextWindow,

    /// Optional cost ceiling per dialogue
    pub max_cost_per_dialogue: Option<f64>,
}

impl PipelineConfig {
    /// Create a new pipeline configuration with default limits.
    pub fn new(game_title: &str, target_language: &str) -> Self {
        Self {
            prompt_settings: PromptSettings::new(game_title, target_language),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: ContextWindow::default(),
            max_cost_per_dialogue: None,
        }
    }

    /// Create a pipeline configuration from the application config.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let target_language = config
            .target_language_name()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let common = &config.translation.common;

        let mut prompt_settings = PromptSettings::new(&config.game_title, &target_language);
        prompt_settings.limits = LineLimits {
            no_portrait: common.np_line_limit,
            portrait: common.portrait_line_limit,
        };
        prompt_settings.ascii_only = common.ascii_only;
        prompt_settings.custom_instructions = common.custom_instructions.clone();

        Ok(Self {
            prompt_settings,
            max_attempts: common.max_attempts,
            window: ContextWindow::new(common.context_dialogues),
            max_cost_per_dialogue: common.max_cost_per_dialogue,
        })
    }

    /// Set the attempt ceiling.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the context window size.
    pub fn with_window(mut self, size: usize) -> Self {
        self.window = ContextWindow::new(size);
        self
    }
}

/// Progress after one dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineProgress {
    /// 1-based index of the dialogue just translated
    pub index: usize,

    /// Total dialogues in the document
    pub total: usize,

    /// Cost of the run so far, analysis included
    pub cumulative_cost: f64,
}

impl PipelineProgress {
    /// Completion percentage
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.index as f64 / self.total as f64 * 100.0
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Cost of the summary call
    pub summary_cost: f64,

    /// Cost of the term call
    pub term_cost: f64,

    /// Cost of all dialogue calls
    pub dialogue_cost: f64,

    /// Dialogues translated
    pub dialogues_translated: usize,

    /// Dialogue calls made
    pub total_attempts: usize,

    /// Rows flagged by the advisory row check
    pub row_warnings: usize,

    /// Wall time of the run
    pub duration: Duration,
}

impl RunReport {
    /// Cost of every call in the run
    pub fn total_cost(&self) -> f64 {
        self.summary_cost + self.term_cost + self.dialogue_cost
    }

    /// Get a summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "Translated {} dialogues in {} attempts | Cost: ${:.4} (summary ${:.4}, terms ${:.4}, dialogues ${:.4}) | {} row warnings | Duration: {:.2}s",
            self.dialogues_translated,
            self.total_attempts,
            self.total_cost(),
            self.summary_cost,
            self.term_cost,
            self.dialogue_cost,
            self.row_warnings,
            self.duration.as_secs_f32()
        )
    }
}

/// The main translation pipeline orchestrator.
pub struct TranslationPipeline {
    config: PipelineConfig,
    analysis_pass: AnalysisPass,
    translator: DialogueTranslator,
    row_validator: LineLengthValidator,
}

impl TranslationPipeline {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let prompts = TranslationPromptBuilder::new(config.prompt_settings.clone());
        let analysis_pass = AnalysisPass::new(prompts.clone());
        let translator = DialogueTranslator::new(prompts)
            .with_max_attempts(config.max_attempts)
            .with_max_cost(config.max_cost_per_dialogue);
        let row_validator = LineLengthValidator::new(
            config.prompt_settings.limits,
            config.prompt_settings.ascii_only,
        );

        Self {
            config,
            analysis_pass,
            translator,
            row_validator,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Translate a whole document.
    ///
    /// The document is handed back only when every dialogue succeeded; any
    /// error aborts the run and drops the partially translated document.
    pub async fn run(
        &self,
        service: &TranslationService,
        mut document: DialogueDocument,
        progress_callback: Option<&(dyn Fn(&PipelineProgress) + Send + Sync)>,
    ) -> Result<(DialogueDocument, RunReport), TranslationError> {
        let start_time = Instant::now();
        let total = document.dialogue_count();
        let mut report = RunReport::default();

        if total == 0 {
            warn!("Document has no dialogues, nothing to translate");
            report.duration = start_time.elapsed();
            return Ok((document, report));
        }

        // Phase 1: Analysis
        let analysis = self.analysis_pass.run(service, &document).await?;
        report.summary_cost = analysis.summary_cost;
        report.term_cost = analysis.term_cost;
        info!("Current cost: ${:.4}", report.total_cost());

        // Phase 2: Translation
        let mut index = 0;
        for file in document.files.iter_mut() {
            for i in 0..file.dialogues.len() {
                index += 1;
                let preceding = self.config.window.preceding_views(&file.dialogues, i);
                let view = file.dialogues[i].to_view();

                let outcome = self
                    .translator
                    .translate(service, &analysis.summary, &preceding, &view)
                    .await?;

                let characters: Vec<&str> = view.speeches.iter().map(|s| s.character.as_str()).collect();
                for issue in self.row_validator.check(&characters, &outcome.translation) {
                    warn!("Dialogue {}: {}", index, issue);
                    report.row_warnings += 1;
                }

                file.dialogues[i].apply_translation(&outcome.translation)?;
                report.dialogue_cost += outcome.cost;
                report.total_attempts += outcome.attempts;
                report.dialogues_translated += 1;

                let progress = PipelineProgress {
                    index,
                    total,
                    cumulative_cost: report.total_cost(),
                };
                info!(
                    "{}/{} ({:.2}%), ${:.4}",
                    progress.index,
                    progress.total,
                    progress.percent(),
                    progress.cumulative_cost
                );
                if let Some(callback) = progress_callback {
                    callback(&progress);
                }
            }
        }

        report.duration = start_time.elapsed();
        Ok((document, report))
    }
}
