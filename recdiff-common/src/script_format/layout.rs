//! Re-emits a token stream with canonical indentation and spacing

use super::lexer::{is_keyword, would_merge, Token, TokenKind};
use super::INDENT;

/// Words that end a statement without ending an expression
const STATEMENT_END_WORDS: &[&str] = &["return", "break", "continue", "debugger"];

/// Words that continue the previous statement after a line break
const CONTINUATION_WORDS: &[&str] = &["else", "catch", "finally", "instanceof", "in", "of", "as"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Block,
    Object,
    Paren,
    Bracket,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Paren holds a statement header such as `if (...)` or function parameters
    header: bool,
    /// Paren holds a `for (...)` header
    for_header: bool,
    switch_body: bool,
    /// Statements after a `case` label get one extra indent level
    case_body: bool,
    /// A `case`/`default` is waiting for its `:`
    case_label: bool,
    do_body: bool,
    /// Open `?` waiting for their `:`
    ternary: usize,
    /// Nothing written since the opening bracket
    empty: bool,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            header: false,
            for_header: false,
            switch_body: false,
            case_body: false,
            case_label: false,
            do_body: false,
            ternary: 0,
            empty: true,
        }
    }

    fn indents(&self) -> usize {
        match self.kind {
            FrameKind::Block => 1 + usize::from(self.case_body),
            FrameKind::Object => 1,
            FrameKind::Paren | FrameKind::Bracket => 0,
        }
    }
}

/// Last significant token, with the context needed to judge what follows it
#[derive(Debug, Clone, Copy)]
struct Prev<'a> {
    kind: TokenKind,
    text: &'a str,
    /// Kind of frame this token closed, for `)`, `]` and `}`
    closed: Option<FrameKind>,
    /// `)` closed a statement header
    header_close: bool,
    /// Prefix operator: nothing separates it from its operand
    unary: bool,
    /// `:` ended a case label or a statement label
    statement_colon: bool,
}

impl Prev<'_> {
    fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    fn ends_value(&self) -> bool {
        match self.kind {
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Word => !is_keyword(self.text),
            TokenKind::Punct => match self.text {
                ")" => !self.header_close,
                "]" => true,
                "}" => self.closed == Some(FrameKind::Object),
                "++" | "--" => !self.unary,
                _ => false,
            },
            TokenKind::LineComment | TokenKind::BlockComment => false,
        }
    }

    fn ends_statement(&self) -> bool {
        self.ends_value()
            || (self.kind == TokenKind::Word && STATEMENT_END_WORDS.contains(&self.text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Newline,
    /// After a block's `}`: newline unless the next token continues the statement
    AfterBlock,
}

/// Output lines plus the position just after the last significant token
#[derive(Debug, Default)]
struct Output {
    lines: Vec<String>,
    current: String,
    last_significant_end: Option<(usize, usize)>,
}

impl Output {
    fn push(&mut self, text: &str, space_before: bool, indent: usize) {
        if self.current.is_empty() {
            for _ in 0..indent {
                self.current.push_str(INDENT);
            }
        } else if space_before {
            self.current.push(' ');
        }
        self.current.push_str(text);
    }

    fn mark_significant(&mut self) {
        self.last_significant_end = Some((self.lines.len(), self.current.len()));
    }

    fn newline(&mut self) {
        let line = std::mem::take(&mut self.current);
        if !line.trim().is_empty() {
            self.lines.push(line.trim_end().to_string());
        }
    }

    fn line_is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Insert `;` right after the last significant token, before any trailing comment
    fn insert_semicolon(&mut self) {
        let Some((line, col)) = self.last_significant_end else {
            return;
        };
        let target = if line < self.lines.len() {
            &mut self.lines[line]
        } else {
            &mut self.current
        };
        target.insert(col, ';');
        self.last_significant_end = Some((line, col + 1));
    }

    fn finish(mut self) -> String {
        self.newline();
        self.lines.join("\n")
    }
}

struct Layout<'a> {
    out: Output,
    /// Bottom frame is the top level and is never popped
    frames: Vec<Frame>,
    prev: Option<Prev<'a>>,
    pending: Pending,
    pending_header: Option<&'a str>,
    pending_switch: bool,
    pending_class: bool,
    pending_do: bool,
    after_do_block: bool,
    /// A line break was seen since the last significant token
    line_break: bool,
}

/// Lay out a balanced token stream
pub(crate) fn render(tokens: &[Token<'_>]) -> String {
    let mut layout = Layout {
        out: Output::default(),
        frames: vec![Frame::new(FrameKind::Block)],
        prev: None,
        pending: Pending::None,
        pending_header: None,
        pending_switch: false,
        pending_class: false,
        pending_do: false,
        after_do_block: false,
        line_break: false,
    };

    for token in tokens {
        layout.token(*token);
    }

    if layout.prev.is_some_and(|p| p.ends_statement()) && layout.frames.len() == 1 {
        layout.out.insert_semicolon();
    }
    layout.out.finish()
}

impl<'a> Layout<'a> {
    fn indent(&self) -> usize {
        self.frames.iter().skip(1).map(Frame::indents).sum()
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn write(&mut self, text: &str, space_before: bool) {
        let indent = self.indent();
        self.out.push(text, space_before, indent);
        self.top().empty = false;
    }

    fn write_significant(&mut self, token: Token<'a>, space_before: bool) {
        self.write(token.text, space_before);
        self.out.mark_significant();
    }

    fn set_prev(&mut self, token: Token<'a>) -> &mut Prev<'a> {
        self.prev.insert(Prev {
            kind: token.kind,
            text: token.text,
            closed: None,
            header_close: false,
            unary: false,
            statement_colon: false,
        })
    }

    fn prev_ends_value(&self) -> bool {
        self.prev.is_some_and(|p| p.ends_value())
    }

    fn resolve_pending(&mut self, token: Token<'a>) {
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => {}
            Pending::Newline => self.out.newline(),
            Pending::AfterBlock => {
                let continues = match token.kind {
                    TokenKind::Word => {
                        matches!(token.text, "else" | "catch" | "finally")
                            || (token.text == "while" && self.after_do_block)
                    }
                    TokenKind::Punct => {
                        matches!(token.text, ")" | "]" | "," | ";" | "." | "?.")
                    }
                    _ => false,
                };
                if !continues {
                    self.out.newline();
                }
            }
        }
    }

    /// Automatic semicolon insertion at a line break between two statements
    fn insert_semicolon_at_line_break(&mut self, token: Token<'a>) {
        let line_break = std::mem::take(&mut self.line_break) || token.newline_before;
        if !line_break || !self.prev.is_some_and(|p| p.ends_statement()) {
            return;
        }
        let in_statement_list = self.frames.last().is_some_and(|f| f.kind == FrameKind::Block);
        let starts_statement = match token.kind {
            TokenKind::Word => !CONTINUATION_WORDS.contains(&token.text),
            TokenKind::Number | TokenKind::Str | TokenKind::Regex => true,
            TokenKind::Punct => matches!(token.text, "{" | "++" | "--" | "!" | "~"),
            _ => false,
        };
        if in_statement_list && starts_statement {
            self.out.insert_semicolon();
            self.pending = Pending::Newline;
            self.pending_header = None;
            self.pending_class = false;
            // What follows is judged as if an explicit `;` had been written
            self.prev = Some(Prev {
                kind: TokenKind::Punct,
                text: ";",
                closed: None,
                header_close: false,
                unary: false,
                statement_colon: false,
            });
        }
    }

    fn token(&mut self, token: Token<'a>) {
        match token.kind {
            TokenKind::LineComment | TokenKind::BlockComment => self.comment(token),
            _ => {
                self.insert_semicolon_at_line_break(token);
                if token.is_punct("}") {
                    self.close_brace(token);
                } else {
                    self.resolve_pending(token);
                    self.significant(token);
                }
                if !token.is_punct("}") {
                    self.after_do_block = false;
                }
            }
        }
    }

    fn comment(&mut self, token: Token<'a>) {
        self.line_break |= token.newline_before;
        let own_line = token.newline_before || self.out.line_is_empty();
        if own_line {
            self.pending = Pending::None;
            self.out.newline();
            self.write(token.text, false);
            self.pending = Pending::Newline;
        } else {
            self.write(token.text, true);
            if token.kind == TokenKind::LineComment {
                self.pending = Pending::Newline;
            }
        }
    }

    fn close_brace(&mut self, token: Token<'a>) {
        let popped = if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        };
        let Some(frame) = popped else {
            return;
        };

        if frame.kind == FrameKind::Block
            && !frame.empty
            && self.prev.is_some_and(|p| p.ends_statement())
        {
            self.out.insert_semicolon();
        }
        // Anything still waiting for a header or class body ends with the block
        self.pending_header = None;
        self.pending_class = false;

        self.pending = Pending::None;
        if frame.empty {
            self.write_significant(token, false);
        } else {
            self.out.newline();
            self.write_significant(token, false);
        }

        let prev = self.set_prev(token);
        prev.closed = Some(frame.kind);

        if frame.kind == FrameKind::Block {
            self.pending = Pending::AfterBlock;
            self.after_do_block = frame.do_body;
        } else {
            self.after_do_block = false;
        }
    }

    fn significant(&mut self, token: Token<'a>) {
        match token.kind {
            TokenKind::Word => self.word(token),
            TokenKind::Punct => self.punct(token),
            _ => {
                let space = self.space_before(token);
                self.write_significant(token, space);
                self.set_prev(token);
            }
        }
    }

    fn word(&mut self, token: Token<'a>) {
        let is_case_label = matches!(token.text, "case" | "default") && {
            let top = self.top();
            top.switch_body && top.kind == FrameKind::Block
        };
        if is_case_label {
            let top = self.top();
            top.case_body = false;
            top.case_label = true;
            self.out.newline();
        }

        match token.text {
            "if" | "for" | "with" | "switch" | "catch" | "function" => {
                self.pending_header = Some(token.text)
            }
            "while" if !self.after_do_block => self.pending_header = Some(token.text),
            _ => {}
        }
        match token.text {
            "switch" => self.pending_switch = true,
            "class" => self.pending_class = true,
            "do" => self.pending_do = true,
            _ => {}
        }

        let space = self.space_before(token);
        self.write_significant(token, space);
        self.set_prev(token);
    }

    fn punct(&mut self, token: Token<'a>) {
        match token.text {
            "{" => self.open_brace(token),
            "(" => {
                let space = self.space_before(token);
                self.write_significant(token, space);
                let header = self.pending_header.take();
                let mut frame = Frame::new(FrameKind::Paren);
                frame.header = header.is_some();
                frame.for_header = header == Some("for");
                self.frames.push(frame);
                self.set_prev(token);
            }
            "[" => {
                let space = self.space_before(token);
                self.write_significant(token, space);
                self.frames.push(Frame::new(FrameKind::Bracket));
                self.set_prev(token);
            }
            ")" | "]" => {
                let popped = if self.frames.len() > 1 {
                    self.frames.pop()
                } else {
                    None
                };
                self.write_significant(token, false);
                let prev = self.set_prev(token);
                prev.closed = popped.as_ref().map(|f| f.kind);
                prev.header_close = popped.is_some_and(|f| f.header);
            }
            ";" => {
                self.write_significant(token, false);
                let top = self.top();
                let in_for_header = top.kind == FrameKind::Paren && top.for_header;
                if !in_for_header {
                    self.pending = Pending::Newline;
                    self.pending_header = None;
                    self.pending_class = false;
                }
                self.set_prev(token);
            }
            "," => {
                self.write_significant(token, false);
                if self.top().kind == FrameKind::Object {
                    self.pending = Pending::Newline;
                }
                self.set_prev(token);
            }
            "?" => {
                self.write_significant(token, true);
                self.top().ternary += 1;
                self.set_prev(token);
            }
            ":" => self.colon(token),
            "." | "?." => {
                self.write_significant(token, false);
                self.set_prev(token);
            }
            "++" | "--" | "+" | "-" | "!" | "~" | "..." => {
                let unary = !matches!(token.text, "++" | "--" | "+" | "-") || !self.prev_ends_value();
                let postfix = matches!(token.text, "++" | "--") && !unary;
                let space = !postfix && self.space_before(token);
                self.write_significant(token, space);
                self.set_prev(token).unary = unary;
            }
            _ => {
                let space = self.space_before(token);
                self.write_significant(token, space);
                self.set_prev(token);
            }
        }
    }

    fn colon(&mut self, token: Token<'a>) {
        let top = self.top();
        if top.ternary > 0 {
            top.ternary -= 1;
            self.write_significant(token, true);
            self.set_prev(token);
        } else if top.kind == FrameKind::Block && top.case_label {
            top.case_label = false;
            top.case_body = true;
            self.write_significant(token, false);
            self.pending = Pending::Newline;
            self.set_prev(token).statement_colon = true;
        } else {
            let label = top.kind == FrameKind::Block;
            self.write_significant(token, false);
            self.set_prev(token).statement_colon = label;
        }
    }

    fn open_brace(&mut self, token: Token<'a>) {
        let is_block = self.pending_class
            || match self.prev {
                None => true,
                Some(p) => match p.kind {
                    TokenKind::Punct => {
                        matches!(p.text, ";" | "{" | "}" | ")" | "=>")
                            || (p.text == ":" && p.statement_colon)
                    }
                    TokenKind::Word => matches!(p.text, "else" | "try" | "finally" | "do"),
                    _ => false,
                },
            };

        let space = self.space_before(token);
        self.write_significant(token, space);

        let mut frame = Frame::new(if is_block {
            FrameKind::Block
        } else {
            FrameKind::Object
        });
        if is_block {
            frame.switch_body = std::mem::take(&mut self.pending_switch);
            frame.do_body = std::mem::take(&mut self.pending_do);
        }
        self.pending_class = false;
        self.pending_header = None;
        self.frames.push(frame);
        self.pending = Pending::Newline;
        self.set_prev(token);
    }

    /// Whether a space separates `token` from the previous token on the same line
    fn space_before(&self, token: Token<'a>) -> bool {
        let Some(prev) = self.prev else {
            return false;
        };
        if prev.kind == TokenKind::Punct
            && token.kind == TokenKind::Punct
            && would_merge(prev.text, token.text)
        {
            return true;
        }
        if token.kind == TokenKind::Punct
            && matches!(token.text, ")" | "]" | "," | ";" | "." | "?." | ":")
        {
            return false;
        }
        if prev.unary || (prev.kind == TokenKind::Punct && matches!(prev.text, "(" | "[" | "." | "?.")) {
            return false;
        }
        if token.is_punct("(") {
            return match prev.kind {
                TokenKind::Word => {
                    is_keyword(prev.text) && !matches!(prev.text, "function" | "import")
                }
                TokenKind::Punct => !prev.ends_value() && !prev.is_punct("}"),
                _ => false,
            };
        }
        if token.is_punct("[") {
            return !prev.ends_value();
        }
        true
    }
}
