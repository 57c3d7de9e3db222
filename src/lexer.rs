//! Quote-aware lexical analysis of a single command line.
//!
//! Tokenization never fails: malformed input (an unterminated quote) is
//! treated as if the quote were closed at end of input, and a trailing bare
//! backslash escapes nothing and is dropped. Whatever validation remains is
//! the resolver's job.

/// How a token's content entered the line.
///
/// Origin matters downstream: the resolver only recognizes redirection
/// operators in `Unquoted` tokens, so `echo ">"` passes a literal `>` through
/// as an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

/// A decoded lexical unit: quote markers removed, escapes already processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub origin: TokenOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

struct LexingFsm {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    /// Origin of the token being accumulated. The first quoted segment wins;
    /// a token stays `Unquoted` only if no part of it was quoted.
    origin: TokenOrigin,
    /// True once the current token exists, even with an empty buffer:
    /// `''` is a real (empty) argument, a run of spaces is not.
    started: bool,
}

impl LexingFsm {
    fn new(line: &str) -> Self {
        LexingFsm {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Unquoted,
            buffer: String::new(),
            origin: TokenOrigin::Unquoted,
            started: false,
        }
    }

    fn make_tokens(&mut self) -> Vec<Token> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Unquoted => self.handle_unquoted(ch, &mut out),
                LexingState::SingleQuoted => self.handle_single_quote(ch),
                LexingState::DoubleQuoted => self.handle_double_quote(ch),
            }
        }

        // End of input inside a quote closes the token as-is.
        self.flush(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_unquoted(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            c if c.is_whitespace() => self.flush(out),
            '\\' => {
                // The next character is taken literally; the backslash itself
                // is dropped. A trailing backslash escapes nothing.
                if let Some(next) = self.read_char() {
                    self.buffer.push(next);
                    self.started = true;
                }
            }
            '\'' => self.enter_quote(LexingState::SingleQuoted, TokenOrigin::SingleQuoted),
            '"' => self.enter_quote(LexingState::DoubleQuoted, TokenOrigin::DoubleQuoted),
            c => {
                self.buffer.push(c);
                self.started = true;
            }
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::Unquoted,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::Unquoted,
            '\\' => match self.peek_char() {
                // The restricted escape set inside double quotes.
                Some(next @ ('\\' | '"' | '$' | '\n')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                // Anything else keeps the backslash as content.
                _ => self.buffer.push('\\'),
            },
            c => self.buffer.push(c),
        }
    }

    fn enter_quote(&mut self, state: LexingState, origin: TokenOrigin) {
        self.state = state;
        self.started = true;
        if self.origin == TokenOrigin::Unquoted {
            self.origin = origin;
        }
    }

    fn flush(&mut self, out: &mut Vec<Token>) {
        if self.started {
            out.push(Token {
                text: std::mem::take(&mut self.buffer),
                origin: self.origin,
            });
            self.origin = TokenOrigin::Unquoted;
            self.started = false;
        }
    }
}

/// Split one input line into decoded tokens, left to right.
pub fn tokenize(line: &str) -> Vec<Token> {
    LexingFsm::new(line).make_tokens()
}
