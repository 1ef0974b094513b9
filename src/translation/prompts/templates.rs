/*!
 * Prompt templates for game dialogue translation.
 *
 * Four prompts drive a run: the corpus analysis, the term translation, the
 * per-dialogue translation and the corrective prompt sent after a reply with
 * the wrong structure. All of them are plain user messages; the model is
 * asked to answer with a single JSON value.
 */

use serde::Serialize;

use crate::translation::context::Summary;
use crate::translation::document::{DialogueView, Shape, SpokenLine};
use crate::validation::{CorrectionContext, LineLimits};

/// Static parts of the prompts.
pub struct PromptTemplate;

impl PromptTemplate {
    pub const CONTEXT: &'static str =
        "### CONTEXT\nYou are a translator for '{game_title}' into {target_language}.\n\n";

    pub const SUMMARY_INSTRUCTIONS: &'static str = r#"### INSTRUCTIONS
1. Scan the DATA for all isolated names and terms that should be translated consistently: characters, places, recurring items, etc.. Write the original English names for now. Don't include any dialogue.
2. For each named speaking character, write a short description of how you are going to translate the character's style into {target_language}.
3. Write a short and strict translation style guide for yourself. Include rules for transliteration (e.g., how to handle foreign letters), formatting, spelling conventions, etc.{ascii_rule}
4. Ignore technical markers like '{no_portrait}'.

### OUTPUT RULE
Return a JSON dictionary like so: {'terms': ['Polar Star', ...], 'character_styles': {'Curly Brace': '...', ...}, 'style_guide': {...}}."#;

    pub const TERM_INSTRUCTIONS: &'static str = r#"### Instructions
1. Translate these terms into {target_language}.
2. CRITICAL GRAMMAR RULE: Provide the NOMINATIVE SINGULAR form for nouns. Do not inflect them yet.
3. Do not use crude neologisms (e.g., use 'Automaton' for Robot, not 'Robotus').
4. For weapons, use standard military terminology (e.g., 'Lamina' or 'Gladius' for Blade).

### Output Format
Return a JSON dictionary: {"English Term": "{target_language} Nominative"}"#;

    pub const EXAMPLE: &'static str = "### Example Input\n[{\"Char1\": [\"I see.\\r\\nI can't do this myself.\", \"Can you?\"]}, {\"Char2\": [\"Yes.\"]}]\n\n### Example Output\n[[\"Video.\\r\\nHoc facere solus nequeo.\", \"Potesne?\"], [\"Possum.\"]]\n\n";

    pub const DIALOGUE_INSTRUCTIONS: &'static str = r#"### Instructions
1. **Check Context**: Look at the Preceding Dialogues and determine if they provide relevant context or are unrelated. Be wary that, due to the structure of the dialogue files, dialogues may be only coincidentally adjacent.
2. **Analyze**: Determine the grammatical structure (Subject, Object, Verb) of the Dialogue to Translate.
3. **Translate**: Translate the thought into idiomatic {target_language}. Avoid literalism. Fix morphology. Ensure all words are real, properly inflected words (avoid neologisms unless absolutely necessary for clarity). Overall, prioritize accuracy and intelligibility in {target_language} over structural fidelity to the English. Adhere to the style guide.
4. {segment_rules}
5. {output_rule} Follow the example given.

"#;

    pub const SEGMENT_RULES: &'static str = r#"**Segment**: Split the {target_language} translation back into segments.
   - HARD CONSTRAINT: Each line must be under {no_portrait_limit} characters if the portrait is '{no_portrait}', else under {portrait_limit} characters.
   - If a sentence or clause could fit under the constraint, don't add unnecessary linebreaks.
   - You may use standard abbreviations to fit the limit.
   - Do not break words in half unless necessary (if necessary, use a hyphen).
   - There must be exactly the same number of speeches as in the English. ({speech_count})
   - Each speech list must be broken up exactly like the English, and must contain exactly the same number of items as in the English. ({schema})
   - The line breaks within each item, however, may be adjusted (but must still use `\r\n` every time).
   - Count your segmented version before outputting to ensure that it fits the constraints.
"#;

    pub const OUTPUT_RULE: &'static str = r#"**Output**: Return JSON with the new dialogue. Write a nested list [["..."]] with ONLY dialogue, no dictionary keys ([{"NP": ["..."]}] -> [["..."]])."#;

    pub const CORRECTION_INSTRUCTIONS: &'static str = r#"### Instructions
This {target_language} translation for the game {game_title} does not properly meet the constraints of the original English dialogue. The English length schema is {expected}, but the {target_language} is {observed}. Think how to align the {target_language} to the English, and construct one that follows the length schema. Carefully count your result before returning it.
"#;

    pub const ASCII_RULE: &'static str =
        " Never use macrons or other diacritics, as this game only displays ASCII.";
}

/// Settings shared by every prompt of a run.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    /// Game title shown in the context header
    pub game_title: String,

    /// Target language display name, e.g. "Classical Latin"
    pub target_language: String,

    /// Row width limits communicated to the model
    pub limits: LineLimits,

    /// Forbid non-ASCII output in the style guide
    pub ascii_only: bool,

    /// Extra instructions appended to dialogue prompts
    pub custom_instructions: Option<String>,
}

impl PromptSettings {
    pub fn new(game_title: &str, target_language: &str) -> Self {
        Self {
            game_title: game_title.to_string(),
            target_language: target_language.to_string(),
            limits: LineLimits::default(),
            ascii_only: true,
            custom_instructions: None,
        }
    }
}

/// Builder for every prompt sent during a run.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    settings: PromptSettings,
}

impl TranslationPromptBuilder {
    pub fn new(settings: PromptSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PromptSettings {
        &self.settings
    }

    fn render(&self, template: &str) -> String {
        template
            .replace("{game_title}", &self.settings.game_title)
            .replace("{target_language}", &self.settings.target_language)
    }

    fn context_header(&self) -> String {
        self.render(PromptTemplate::CONTEXT)
    }

    /// Corpus analysis prompt over every spoken line
    pub fn build_summary_prompt(&self, lines: &[SpokenLine<'_>]) -> String {
        let ascii_rule = if self.settings.ascii_only {
            PromptTemplate::ASCII_RULE
        } else {
            ""
        };
        let instructions = self
            .render(PromptTemplate::SUMMARY_INSTRUCTIONS)
            .replace("{ascii_rule}", ascii_rule)
            .replace("{no_portrait}", crate::translation::document::NO_PORTRAIT);

        format!(
            "{}### DATA TO ANALYZE\n{}\n\n{}",
            self.context_header(),
            to_json(lines),
            instructions
        )
    }

    /// Term translation prompt
    pub fn build_term_prompt(&self, terms: &[String]) -> String {
        format!(
            "{}### Terms to Translate\n{}\n\n{}",
            self.context_header(),
            to_json(terms),
            self.render(PromptTemplate::TERM_INSTRUCTIONS)
        )
    }

    /// Segmenting rules for a dialogue of the given shape
    pub fn segment_rules(&self, shape: &Shape) -> String {
        self.render(PromptTemplate::SEGMENT_RULES)
            .replace("{no_portrait_limit}", &self.settings.limits.no_portrait.to_string())
            .replace("{portrait_limit}", &self.settings.limits.portrait.to_string())
            .replace("{no_portrait}", crate::translation::document::NO_PORTRAIT)
            .replace("{speech_count}", &shape.speech_count().to_string())
            .replace("{schema}", &shape.to_string())
    }

    /// First prompt for a dialogue
    pub fn build_dialogue_prompt(
        &self,
        summary: &Summary,
        preceding: &[DialogueView],
        dialogue: &DialogueView,
    ) -> String {
        let instructions = self
            .render(PromptTemplate::DIALOGUE_INSTRUCTIONS)
            .replace("{segment_rules}", &self.segment_rules(&dialogue.shape()))
            .replace("{output_rule}", PromptTemplate::OUTPUT_RULE);

        let mut prompt = self.context_header();
        prompt.push_str(&format!(
            "### Global Glossary (Must Use)\n{}\n\n",
            summary.glossary.to_json()
        ));
        prompt.push_str(&format!(
            "### Character Styles\n{}\n\n",
            to_json(&summary.character_styles)
        ));
        prompt.push_str(&format!("### Style Guide\n{}\n\n", to_json(&summary.style_guide)));
        prompt.push_str(PromptTemplate::EXAMPLE);
        prompt.push_str(&instructions);

        if let Some(custom) = self
            .settings
            .custom_instructions
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        {
            prompt.push_str(&format!("### Additional Instructions\n{}\n\n", custom.trim()));
        }

        prompt.push_str(&format!(
            "### Preceding Dialogues in File\n{}\n\n",
            to_json(preceding)
        ));
        prompt.push_str(&format!("### Dialogue to Translate\n{}", dialogue.to_json()));
        prompt
    }

    /// Prompt asking the model to fix the structure of its latest attempt
    pub fn build_corrective_prompt(
        &self,
        dialogue: &DialogueView,
        correction: &CorrectionContext,
    ) -> String {
        let instructions = self
            .render(PromptTemplate::CORRECTION_INSTRUCTIONS)
            .replace("{expected}", &correction.expected_schema.to_string())
            .replace("{observed}", &correction.observed_schema.to_string());

        format!(
            "### Segmenting Directions\n{}\n{}{}\n\n### ENGLISH\n{}\n\n### {}\n{}\n\n",
            self.segment_rules(&correction.expected_schema),
            instructions,
            PromptTemplate::OUTPUT_RULE,
            dialogue.to_json(),
            self.settings.target_language.to_uppercase(),
            correction.prior_attempt_text
        )
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
