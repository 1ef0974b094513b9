/*!
 * Dialogue extraction from decoded TSC scripts, and the reverse.
 *
 * Every extracted line remembers the byte range it came from, so a script is
 * rebuilt by splicing the (translated) line texts back into the original text.
 */

use logos::Logos;
use serde_json::json;
use std::ops::Range;

use crate::errors::AppError;
use crate::game_data::lexer::{Token, face_name};
use crate::translation::document::{Dialogue, DialogueFile, Line, NO_PORTRAIT, Speech};

/// Groups text tokens into speeches and message boxes into dialogues
struct DialogueCollector {
    character: &'static str,
    lines: Vec<Line>,
    speeches: Vec<Speech>,
    dialogues: Vec<Dialogue>,
}

impl DialogueCollector {
    fn new() -> Self {
        Self {
            character: NO_PORTRAIT,
            lines: Vec::new(),
            speeches: Vec::new(),
            dialogues: Vec::new(),
        }
    }

    fn push_line(&mut self, text: String, span: Range<usize>) {
        let mut line = Line::new(text);
        line.trailing.push(json!({"start": span.start, "end": span.end}));
        self.lines.push(line);
    }

    fn close_speech(&mut self) {
        if !self.lines.is_empty() {
            let lines = std::mem::take(&mut self.lines);
            self.speeches.push(Speech::with_lines(self.character, lines));
        }
    }

    fn close_dialogue(&mut self) {
        self.close_speech();
        if !self.speeches.is_empty() {
            let speeches = std::mem::take(&mut self.speeches);
            self.dialogues.push(Dialogue::new(speeches));
        }
    }

    fn change_face(&mut self, face: u8) {
        self.close_speech();
        self.character = face_name(face);
    }

    fn open_message(&mut self) {
        self.close_dialogue();
        self.character = NO_PORTRAIT;
    }

    fn finish(mut self) -> Vec<Dialogue> {
        self.close_dialogue();
        self.dialogues
    }
}

/// Dialogues of one decoded script, one per message box, in script order
pub fn extract_dialogues(script: &str) -> Vec<Dialogue> {
    let mut collector = DialogueCollector::new();
    let mut lexer = Token::lexer(script);

    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Message) => collector.open_message(),
            Ok(Token::Face(face)) => collector.change_face(face),
            Ok(Token::Text(text)) => collector.push_line(text, lexer.span()),
            // Commands, numbers and unrecognised bytes are left in place
            Ok(_) | Err(_) => {}
        }
    }

    collector.finish()
}

/// Byte range of the script text a line was extracted from
pub fn source_range(line: &Line) -> Result<Range<usize>, AppError> {
    let value = line.trailing.first().ok_or_else(|| {
        AppError::Document(format!("line {:?} has no source range", line.text))
    })?;
    Ok(serde_json::from_value(value.clone())?)
}

/// Rebuild a script from its `original` text with every line replaced by the document's text
pub fn rebuild_script(file: &DialogueFile) -> Result<String, AppError> {
    let original = file
        .str_field("original")
        .ok_or_else(|| AppError::Document("script entry has no original text".to_string()))?;

    let mut script = String::with_capacity(original.len());
    let mut copied_up_to = 0;
    let lines = file
        .dialogues
        .iter()
        .flat_map(|d| d.speeches.iter())
        .flat_map(|s| s.text.iter());

    for line in lines {
        let range = source_range(line)?;
        let between = original.get(copied_up_to..range.start).ok_or_else(|| {
            AppError::Document(format!(
                "source range {}..{} of {:?} is out of order or outside the script",
                range.start, range.end, line.text
            ))
        })?;
        if original.get(range.clone()).is_none() {
            return Err(AppError::Document(format!(
                "source range {}..{} of {:?} is outside the script",
                range.start, range.end, line.text
            )));
        }
        script.push_str(between);
        script.push_str(&line.text);
        copied_up_to = range.end;
    }

    script.push_str(&original[copied_up_to..]);
    Ok(script)
}
