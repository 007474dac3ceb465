//! Deterministic pretty-printer for script field values
//!
//! Script fields hold JavaScript-like source. Both instances' values are run
//! through [`format_script`] before comparison so that indentation, brace
//! placement, spacing and optional semicolons never show up as differences.
//!
//! The formatter is token based: [`lexer`] splits the source into tokens and
//! checks bracket balance, [`layout`] re-emits them with 4-space indentation.
//! It does not parse the language. Anything the lexer cannot make sense of is
//! reported as a [`FormatError`] and the caller keeps the raw text.

use thiserror::Error;

mod layout;
mod lexer;

/// Indentation unit of formatted output
pub const INDENT: &str = "    ";

/// Reasons the formatter rejects a script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString { offset: usize },

    #[error("unterminated template literal starting at byte {offset}")]
    UnterminatedTemplate { offset: usize },

    #[error("unterminated regular expression starting at byte {offset}")]
    UnterminatedRegex { offset: usize },

    #[error("unterminated block comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },

    #[error("unmatched '{found}' at byte {offset}")]
    UnmatchedBracket { found: char, offset: usize },

    #[error("'{open}' opened at byte {offset} is never closed")]
    UnclosedBracket { open: char, offset: usize },

    #[error("unexpected character {ch:?} at byte {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

/// Pretty-print a script
///
/// Output has no trailing newline. Formatting is idempotent: formatting the
/// output again returns it unchanged.
pub fn format_script(source: &str) -> Result<String, FormatError> {
    let tokens = lexer::tokenize(source)?;
    Ok(layout::render(&tokens))
}
