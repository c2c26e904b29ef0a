//! Statement splitting for free-form SQL text.
//!
//! Splits a block of user-typed SQL into individual statements at top-level
//! semicolons. A naive `split(';')` breaks on separators inside string
//! literals and comments, so the splitter runs a small character scanner
//! first and only treats a `;` as a separator when it is outside both.
//!
//! The scanner is total: malformed input (unterminated strings or comments)
//! is absorbed rather than rejected, so text typed mid-edit never fails to
//! split. Genuinely invalid SQL is left for the remote executor to reject.

/// One lexical unit produced while scanning SQL text.
///
/// Concatenating the spans of all tokens, in order, reproduces the input
/// exactly; the tokenizer is a lossless partition of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A top-level statement separator (`;`).
    Separator,
    /// A run of ordinary characters outside strings and comments.
    Char(String),
    /// A single-quoted string literal, delimiting quotes included.
    /// A doubled quote (`''`) inside the literal is an escape, not a close.
    Str(String),
    /// A line comment (`--` through the line terminator) or a bracketed
    /// comment (`/* ... */`, non-nesting), delimiters included.
    Comment(String),
}

impl Token {
    /// Returns the literal span of the token as it appeared in the input.
    pub fn span(&self) -> &str {
        match self {
            Token::Separator => ";",
            Token::Char(s) | Token::Str(s) | Token::Comment(s) => s,
        }
    }
}

/// One semicolon-delimited unit of SQL text, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    offset: usize,
}

impl Statement {
    /// The trimmed text of the statement.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the statement's first character in the original input.
    ///
    /// Lets a caller map a per-statement error back into the editor buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consumes the statement, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenizes SQL text into separators, character runs, strings, and comments.
///
/// Single left-to-right scan with one character of lookahead. Never fails:
/// unterminated strings and bracket comments are closed implicitly at end of
/// input.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut run = String::new();

    while let Some(c) = chars.next() {
        match c {
            ';' => {
                flush_run(&mut tokens, &mut run);
                tokens.push(Token::Separator);
            }
            '\'' => {
                flush_run(&mut tokens, &mut run);
                tokens.push(Token::Str(consume_string(&mut chars)));
            }
            '-' if chars.peek() == Some(&'-') => {
                flush_run(&mut tokens, &mut run);
                chars.next();
                tokens.push(Token::Comment(consume_line_comment(&mut chars)));
            }
            '/' if chars.peek() == Some(&'*') => {
                flush_run(&mut tokens, &mut run);
                chars.next();
                tokens.push(Token::Comment(consume_bracket_comment(&mut chars)));
            }
            _ => run.push(c),
        }
    }

    flush_run(&mut tokens, &mut run);
    tokens
}

/// Closes the pending character run, if any.
fn flush_run(tokens: &mut Vec<Token>, run: &mut String) {
    if !run.is_empty() {
        tokens.push(Token::Char(std::mem::take(run)));
    }
}

/// Consumes a single-quoted string; the opening quote is already consumed.
///
/// A `''` pair is an escaped quote and stays inside the literal. A missing
/// closing quote ends the string at end of input.
fn consume_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut span = String::from("'");
    while let Some(c) = chars.next() {
        span.push(c);
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                span.push('\'');
                chars.next();
            } else {
                break;
            }
        }
    }
    span
}

/// Consumes a line comment; the leading `--` is already consumed.
///
/// The line terminator, if present, is part of the comment. A `\r\n` pair is
/// folded into the same token so one comment is emitted regardless of
/// line-ending style.
fn consume_line_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut span = String::from("--");
    while let Some(c) = chars.next() {
        span.push(c);
        if c == '\n' {
            break;
        }
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                span.push('\n');
                chars.next();
            }
            break;
        }
    }
    span
}

/// Consumes a bracketed comment; the leading `/*` is already consumed.
///
/// Comments do not nest. A missing `*/` closes the comment at end of input.
fn consume_bracket_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut span = String::from("/*");
    while let Some(c) = chars.next() {
        span.push(c);
        if c == '*' && chars.peek() == Some(&'/') {
            span.push('/');
            chars.next();
            break;
        }
    }
    span
}

/// Splits SQL text into an ordered list of statements.
///
/// Statements are token runs between top-level separators. Each statement is
/// trimmed; statements that are empty after trimming (including the run after
/// a final `;`) are dropped, so `;;` produces nothing. Comments at the start
/// of a statement are skipped, which also drops comment-only statements.
///
/// Total over any input: empty text yields an empty list, text without
/// separators yields at most one statement.
pub fn split(text: &str) -> Vec<Statement> {
    let tokens = tokenize(text);
    let mut statements = Vec::new();
    let mut pending: Vec<(usize, &Token)> = Vec::new();
    let mut pos = 0usize;

    for token in &tokens {
        match token {
            Token::Separator => {
                close_statement(&mut statements, &pending);
                pending.clear();
            }
            other => pending.push((pos, other)),
        }
        pos += token.span().len();
    }
    close_statement(&mut statements, &pending);

    statements
}

/// Closes the pending statement, discarding it if empty after trimming.
fn close_statement(out: &mut Vec<Statement>, pending: &[(usize, &Token)]) {
    // Skip leading comments and whitespace-only runs so a statement that
    // opens with a comment still reports clean text and a useful offset.
    let mut first = 0;
    while first < pending.len() {
        match pending[first].1 {
            Token::Comment(_) => first += 1,
            Token::Char(s) if s.trim().is_empty() => first += 1,
            _ => break,
        }
    }

    let mut text = String::new();
    for (_, token) in &pending[first..] {
        text.push_str(token.span());
    }

    let leading_ws = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }

    out.push(Statement {
        text: trimmed.to_string(),
        offset: pending[first].0 + leading_ws,
    });
}
