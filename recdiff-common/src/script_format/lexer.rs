//! Tokenizer for script source

use super::FormatError;

/// Reserved words that never end an expression
///
/// `this`, `super`, `null`, `true` and `false` are absent on purpose: they
/// behave like identifiers for spacing and statement termination.
pub(crate) const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "finally", "for", "function", "if", "import",
    "in", "instanceof", "let", "new", "return", "switch", "throw", "try", "typeof", "var", "void",
    "while", "with", "yield",
];

/// Longest match first
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

const HEADER_KEYWORDS: &[&str] = &["if", "for", "while", "with", "switch", "catch"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Word,
    Number,
    Str,
    Template,
    Regex,
    Punct,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// A line terminator separates this token from the previous one
    pub newline_before: bool,
}

impl Token<'_> {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }
}

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Writing `right` directly after `left` would lex as a longer punctuator
pub(crate) fn would_merge(left: &str, right: &str) -> bool {
    let joined = format!("{}{}", left, right);
    PUNCTUATORS
        .iter()
        .any(|p| p.len() > left.len() && joined.starts_with(p))
}

/// Split source into tokens, checking that brackets balance
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, FormatError> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        tokens: Vec::new(),
        brackets: Vec::new(),
        newline_before: false,
        last_paren_was_header: false,
    };
    lexer.run()?;

    if let Some(&(open, offset, _)) = lexer.brackets.last() {
        return Err(FormatError::UnclosedBracket { open, offset });
    }
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token<'a>>,
    /// Open brackets: (char, offset, paren opened a statement header)
    brackets: Vec<(char, usize, bool)>,
    newline_before: bool,
    last_paren_was_header: bool,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), FormatError> {
        let src = self.src;
        while let Some(ch) = self.peek() {
            let start = self.pos;
            let rest = &src[start..];

            if ch.is_whitespace() || ch == '\u{feff}' || ch == '\u{200b}' {
                if is_line_terminator(ch) {
                    self.newline_before = true;
                }
                self.pos += ch.len_utf8();
            } else if rest.starts_with("//") {
                let end = rest.find('\n').map_or(self.src.len(), |i| start + i);
                let text_end = start + self.src[start..end].trim_end().len();
                self.push(TokenKind::LineComment, start, text_end);
                // The line terminator itself is consumed as whitespace
                self.pos = end;
            } else if rest.starts_with("/*") {
                let close = rest[2..]
                    .find("*/")
                    .ok_or(FormatError::UnterminatedComment { offset: start })?;
                let end = start + 2 + close + 2;
                self.push(TokenKind::BlockComment, start, end);
                if self.src[start..end].contains('\n') {
                    self.newline_before = true;
                }
            } else if ch == '"' || ch == '\'' {
                let end = self.scan_string(start, ch)?;
                self.push(TokenKind::Str, start, end);
            } else if ch == '`' {
                let end = scan_template(self.src, start)?;
                self.push(TokenKind::Template, start, end);
            } else if ch == '/' && self.regex_allowed() {
                let end = self.scan_regex(start)?;
                self.push(TokenKind::Regex, start, end);
            } else if ch.is_ascii_digit() || (ch == '.' && next_is_digit(rest)) {
                let end = self.scan_number(start);
                self.push(TokenKind::Number, start, end);
            } else if is_ident_start(ch) {
                let mut end = start + ch.len_utf8();
                end += self.src[end..]
                    .char_indices()
                    .find(|&(_, c)| !is_ident_part(c))
                    .map_or(self.src.len() - end, |(i, _)| i);
                self.push(TokenKind::Word, start, end);
            } else if let Some(punct) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
                self.track_bracket(punct, start)?;
                self.push(TokenKind::Punct, start, start + punct.len());
            } else {
                return Err(FormatError::UnexpectedCharacter { ch, offset: start });
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let src = self.src;
        self.tokens.push(Token {
            kind,
            text: &src[start..end],
            newline_before: std::mem::take(&mut self.newline_before),
        });
        self.pos = end;
    }

    fn last_significant(&self) -> Option<&Token<'a>> {
        self.tokens.iter().rev().find(|t| !t.is_comment())
    }

    fn track_bracket(&mut self, punct: &str, offset: usize) -> Result<(), FormatError> {
        match punct {
            "(" => {
                let header = matches!(
                    self.last_significant(),
                    Some(t) if t.kind == TokenKind::Word && HEADER_KEYWORDS.contains(&t.text)
                );
                self.brackets.push(('(', offset, header));
            }
            "[" => self.brackets.push(('[', offset, false)),
            "{" => self.brackets.push(('{', offset, false)),
            ")" | "]" | "}" => {
                let expected = match punct {
                    ")" => '(',
                    "]" => '[',
                    _ => '{',
                };
                let found = punct.chars().next().unwrap_or(' ');
                match self.brackets.pop() {
                    Some((open, _, header)) if open == expected => {
                        self.last_paren_was_header = header;
                    }
                    _ => return Err(FormatError::UnmatchedBracket { found, offset }),
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// A `/` starts a regex literal where an expression operand is expected
    fn regex_allowed(&self) -> bool {
        let Some(prev) = self.last_significant() else {
            return true;
        };
        match prev.kind {
            TokenKind::Word => is_keyword(prev.text),
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => false,
            TokenKind::Punct => match prev.text {
                ")" => self.last_paren_was_header,
                "]" | "++" | "--" => false,
                _ => true,
            },
            TokenKind::LineComment | TokenKind::BlockComment => true,
        }
    }

    fn scan_string(&self, start: usize, quote: char) -> Result<usize, FormatError> {
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                c if c == quote => return Ok(start + 1 + i + 1),
                '\n' => break,
                _ => {}
            }
        }
        Err(FormatError::UnterminatedString { offset: start })
    }

    fn scan_regex(&self, start: usize) -> Result<usize, FormatError> {
        let mut in_class = false;
        let mut chars = self.src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    let body_end = start + 1 + i + 1;
                    let flags = self.src[body_end..]
                        .char_indices()
                        .find(|&(_, c)| !c.is_ascii_alphabetic())
                        .map_or(self.src.len() - body_end, |(j, _)| j);
                    return Ok(body_end + flags);
                }
                c if is_line_terminator(c) => break,
                _ => {}
            }
        }
        Err(FormatError::UnterminatedRegex { offset: start })
    }

    fn scan_number(&self, start: usize) -> usize {
        let bytes = self.src.as_bytes();
        let is_hex = self.src[start..].starts_with("0x") || self.src[start..].starts_with("0X");
        let mut end = start;
        while end < bytes.len() {
            let b = bytes[end];
            let exponent_sign = (b == b'+' || b == b'-')
                && !is_hex
                && end > start
                && matches!(bytes[end - 1], b'e' | b'E');
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
                end += 1;
            } else {
                break;
            }
        }
        end
    }
}

/// Scan a template literal, including nested templates inside `${...}`
fn scan_template(src: &str, start: usize) -> Result<usize, FormatError> {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'`' if depth == 0 => return Ok(i + 1),
            b'`' => i = scan_template(src, i)? - 1,
            b'$' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                depth = 1;
                i += 1;
            }
            b'{' if depth > 0 => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    Err(FormatError::UnterminatedTemplate { offset: start })
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || c == '#'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn next_is_digit(rest: &str) -> bool {
    rest.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
}
