/*!
 * Tokens of the TSC scripting language, as far as dialogue extraction needs them.
 */

use logos::Logos;

use crate::translation::document::NO_PORTRAIT;

/// Speaker names for faces `<FAC0000` to `<FAC0029`. Face 0 removes the portrait.
const FACE_NAMES: [&str; 30] = [
    NO_PORTRAIT,
    "SueSmile",
    "SueFrown",
    "SueAngry",
    "SueHurt",
    "BalrogNormal",
    "TorokoNormal",
    "King",
    "TorokoAngry",
    "Jack",
    "Kazuma",
    "TorokoRage",
    "Igor",
    "Jenka",
    "BalrogSmile",
    "MiseryNormal",
    "MiserySmile",
    "BoosterHurt",
    "BoosterNormal",
    "CurlySmile",
    "CurlyFrown",
    "Doctor",
    "Momorin",
    "BalrogHurt",
    "BrokenRobot",
    "CurlyUnknown",
    "MiseryAngry",
    "HumanSue",
    "Itoh",
    "Ballos",
];

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\r\n")]
pub enum Token {
    /// Opens a message box
    #[token("<MSG")]
    Message,

    /// Portrait change
    #[regex(r"<FAC00[0-2][0-9]", |lex| lex.slice()[4..].parse::<u8>().ok())]
    Face(u8),

    /// Any other command, e.g. `<NOD`, `<WAI`, `<FL+`
    #[regex(r"<[A-Z+\-0-9]{3}", priority = 6)]
    Command,

    /// Command argument or event number
    #[regex(r"[0-9]{3,4}", priority = 7)]
    Number,

    /// Displayed text, possibly spanning several rows and ending in a number placeholder
    #[regex(r#"[-a-zA-Z.!?=*'" ][a-zA-Z,.!?;0-9+\-'"= *\r\n]*(?:<NUM0000)?"#, priority = 2, callback = |lex| lex.slice().to_owned())]
    Text(String),

    #[regex(r".", priority = 1, callback = |lex| lex.slice().to_owned())]
    Other(String),
}

/// Speaker shown for a face number
pub fn face_name(face: u8) -> &'static str {
    FACE_NAMES.get(usize::from(face)).copied().unwrap_or(NO_PORTRAIT)
}
