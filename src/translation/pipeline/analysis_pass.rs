/*!
 * Analysis pass for corpus preprocessing.
 *
 * Two model calls run once per corpus before any dialogue is translated:
 * - Summary: terms to keep consistent, character styles, style guide
 * - Terms: the target-language base form of every term
 *
 * Neither call is retried; a failure here aborts the run.
 */

use log::{info, warn};

use crate::errors::TranslationError;
use crate::providers::CompletionRequest;
use crate::translation::context::{CorpusSummary, Glossary, Summary};
use crate::translation::core::TranslationService;
use crate::translation::document::DialogueDocument;
use crate::translation::prompts::TranslationPromptBuilder;
use crate::translation::response::parse_typed_response;

/// Result of the analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Context shared by every dialogue prompt
    pub summary: Summary,

    /// Cost of the summary call
    pub summary_cost: f64,

    /// Cost of the term call (zero when there were no terms)
    pub term_cost: f64,
}

impl AnalysisResult {
    /// Get a short description of the analysis
    pub fn description(&self) -> String {
        format!(
            "{} glossary terms, {} character styles, ${:.4}",
            self.summary.glossary.len(),
            self.summary.character_styles.len(),
            self.summary_cost + self.term_cost
        )
    }
}

/// Analysis pass runner.
#[derive(Debug, Clone)]
pub struct AnalysisPass {
    prompts: TranslationPromptBuilder,
}

impl AnalysisPass {
    pub fn new(prompts: TranslationPromptBuilder) -> Self {
        Self { prompts }
    }

    /// Summarize the whole corpus in one call
    pub async fn summarize(
        &self,
        service: &TranslationService,
        document: &DialogueDocument,
    ) -> Result<(CorpusSummary, f64), TranslationError> {
        let lines = document.spoken_lines();
        info!("Summarizing {} spoken lines", lines.len());

        let prompt = self.prompts.build_summary_prompt(&lines);
        let completion = service.request(CompletionRequest::json(prompt)).await?;
        let summary: CorpusSummary = parse_typed_response(&completion.text)?;

        summary.warn_missing_styles(&document.named_characters());
        Ok((summary, completion.cost))
    }

    /// Translate the summary terms in one call
    pub async fn translate_terms(
        &self,
        service: &TranslationService,
        terms: &[String],
    ) -> Result<(Glossary, f64), TranslationError> {
        if terms.is_empty() {
            warn!("No terms to translate, skipping glossary");
            return Ok((Glossary::new(), 0.0));
        }

        info!("Translating {} glossary terms", terms.len());
        let prompt = self.prompts.build_term_prompt(terms);
        let completion = service.request(CompletionRequest::json(prompt)).await?;
        let glossary: Glossary = parse_typed_response(&completion.text)?;

        glossary.warn_missing(terms);
        Ok((glossary, completion.cost))
    }

    /// Summary then terms
    pub async fn run(
        &self,
        service: &TranslationService,
        document: &DialogueDocument,
    ) -> Result<AnalysisResult, TranslationError> {
        let (corpus_summary, summary_cost) = self.summarize(service, document).await?;
        let terms = corpus_summary.distinct_terms();
        let (glossary, term_cost) = self.translate_terms(service, &terms).await?;

        let result = AnalysisResult {
            summary: corpus_summary.into_summary(glossary),
            summary_cost,
            term_cost,
        };
        info!("Analysis complete: {}", result.description());
        Ok(result)
    }
}
