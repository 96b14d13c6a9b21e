//! Tokenizer for the ES2015 subset the lowering pass understands.
//!
//! Comments and whitespace are trivia; the scanner only remembers whether a
//! line break preceded the current token (needed for automatic semicolon
//! insertion).

use esdown_common::diagnostic_codes;
use esdown_common::diagnostic_messages;
use esdown_common::format_message;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,
    Identifier,
    NumericLiteral,
    StringLiteral,
    RegularExpressionLiteral,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionToken,
    ColonToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    ExclamationToken,
    TildeToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    AmpersandAmpersandToken,
    BarBarToken,
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,

    // Keywords
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    InKeyword,
    InstanceOfKeyword,
    LetKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,
}

impl SyntaxKind {
    /// Source spelling of punctuation and keyword tokens.
    pub fn text(self) -> &'static str {
        match self {
            SyntaxKind::Unknown => "unknown",
            SyntaxKind::EndOfFileToken => "end of file",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::NumericLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::RegularExpressionLiteral => "regular expression",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::DotToken => ".",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::LessThanLessThanToken => "<<",
            SyntaxKind::GreaterThanGreaterThanToken => ">>",
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => ">>>",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::PercentEqualsToken => "%=",
            SyntaxKind::LessThanLessThanEqualsToken => "<<=",
            SyntaxKind::GreaterThanGreaterThanEqualsToken => ">>=",
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => ">>>=",
            SyntaxKind::AmpersandEqualsToken => "&=",
            SyntaxKind::BarEqualsToken => "|=",
            SyntaxKind::CaretEqualsToken => "^=",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::CaseKeyword => "case",
            SyntaxKind::CatchKeyword => "catch",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DebuggerKeyword => "debugger",
            SyntaxKind::DefaultKeyword => "default",
            SyntaxKind::DeleteKeyword => "delete",
            SyntaxKind::DoKeyword => "do",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::FinallyKeyword => "finally",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::InKeyword => "in",
            SyntaxKind::InstanceOfKeyword => "instanceof",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::SwitchKeyword => "switch",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::ThrowKeyword => "throw",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::TryKeyword => "try",
            SyntaxKind::TypeOfKeyword => "typeof",
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::VoidKeyword => "void",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::WithKeyword => "with",
        }
    }

    /// Keyword spelled by `text`, if any.
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "break" => SyntaxKind::BreakKeyword,
            "case" => SyntaxKind::CaseKeyword,
            "catch" => SyntaxKind::CatchKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "debugger" => SyntaxKind::DebuggerKeyword,
            "default" => SyntaxKind::DefaultKeyword,
            "delete" => SyntaxKind::DeleteKeyword,
            "do" => SyntaxKind::DoKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "finally" => SyntaxKind::FinallyKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "in" => SyntaxKind::InKeyword,
            "instanceof" => SyntaxKind::InstanceOfKeyword,
            "let" => SyntaxKind::LetKeyword,
            "new" => SyntaxKind::NewKeyword,
            "null" => SyntaxKind::NullKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "switch" => SyntaxKind::SwitchKeyword,
            "this" => SyntaxKind::ThisKeyword,
            "throw" => SyntaxKind::ThrowKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "try" => SyntaxKind::TryKeyword,
            "typeof" => SyntaxKind::TypeOfKeyword,
            "var" => SyntaxKind::VarKeyword,
            "void" => SyntaxKind::VoidKeyword,
            "while" => SyntaxKind::WhileKeyword,
            "with" => SyntaxKind::WithKeyword,
            _ => return None,
        })
    }

    pub fn is_keyword(self) -> bool {
        self as u8 >= SyntaxKind::BreakKeyword as u8
    }
}

/// A lexical error, reported by the parser as a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub pos: u32,
    pub length: u32,
    pub message: String,
    pub code: u32,
}

/// Snapshot for speculative scanning.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    has_preceding_line_break: bool,
    diagnostic_count: usize,
}

pub struct ScannerState {
    text: String,
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    has_preceding_line_break: bool,
    diagnostics: Vec<ScannerDiagnostic>,
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_identifier_part(byte: u8) -> bool {
    is_identifier_start(byte) || byte.is_ascii_digit()
}

fn is_identifier_char(ch: char) -> bool {
    if ch.is_ascii() {
        is_identifier_part(ch as u8)
    } else {
        ch.is_alphanumeric() || matches!(ch, '\u{200c}' | '\u{200d}')
    }
}

impl ScannerState {
    pub fn new(text: String) -> Self {
        ScannerState {
            text,
            pos: 0,
            token: SyntaxKind::Unknown,
            token_start: 0,
            has_preceding_line_break: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    pub fn token_start(&self) -> u32 {
        self.token_start as u32
    }

    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Raw source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.has_preceding_line_break
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScannerDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            has_preceding_line_break: self.has_preceding_line_break,
            diagnostic_count: self.diagnostics.len(),
        }
    }

    /// Rewind to `snapshot`, dropping lexical errors found since.
    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.has_preceding_line_break = snapshot.has_preceding_line_break;
        self.diagnostics.truncate(snapshot.diagnostic_count);
    }

    fn error(&mut self, pos: usize, length: usize, code: u32, message: String) {
        self.diagnostics.push(ScannerDiagnostic {
            pos: pos as u32,
            length: length as u32,
            message,
            code,
        });
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    /// Skip whitespace and comments, recording line breaks.
    fn skip_trivia(&mut self) {
        let bytes = self.text.as_bytes();
        let mut unterminated_comment = None;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' | b'\r' => {
                    self.has_preceding_line_break = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    let rest = &bytes[self.pos..];
                    match memchr::memchr2(b'\n', b'\r', rest) {
                        Some(offset) => self.pos += offset,
                        None => self.pos = bytes.len(),
                    }
                }
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                    let body_start = self.pos + 2;
                    match memchr::memmem::find(&bytes[body_start..], b"*/") {
                        Some(offset) => {
                            let body = &bytes[body_start..body_start + offset];
                            if memchr::memchr2(b'\n', b'\r', body).is_some() {
                                self.has_preceding_line_break = true;
                            }
                            self.pos = body_start + offset + 2;
                        }
                        None => {
                            unterminated_comment = Some(self.pos);
                            self.pos = bytes.len();
                        }
                    }
                }
                byte if byte >= 0x80 => {
                    let Some(ch) = self.text[self.pos..].chars().next() else {
                        break;
                    };
                    match ch {
                        '\u{2028}' | '\u{2029}' => self.has_preceding_line_break = true,
                        // Byte order mark and Unicode space separators.
                        '\u{feff}' => {}
                        ch if ch.is_whitespace() => {}
                        _ => break,
                    }
                    self.pos += ch.len_utf8();
                }
                _ => break,
            }
        }
        if let Some(start) = unterminated_comment {
            self.error(
                start,
                2,
                diagnostic_codes::UNTERMINATED_COMMENT,
                diagnostic_messages::UNTERMINATED_COMMENT.to_string(),
            );
        }
    }

    /// Advance to the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.has_preceding_line_break = false;
        self.skip_trivia();
        self.token_start = self.pos;
        self.token = self.scan_token();
        self.token
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let Some(ch) = self.peek(0) else {
            return SyntaxKind::EndOfFileToken;
        };

        let starts_identifier = if ch.is_ascii() {
            is_identifier_start(ch)
        } else {
            self.text[self.pos..]
                .chars()
                .next()
                .is_some_and(char::is_alphabetic)
        };
        if starts_identifier {
            return self.scan_identifier();
        }
        if ch.is_ascii_digit() || (ch == b'.' && self.peek(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        let next = self.peek(1);
        let (kind, len) = match ch {
            b'"' | b'\'' => return self.scan_string(ch),
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b'(' => (SyntaxKind::OpenParenToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b'?' => (SyntaxKind::QuestionToken, 1),
            b':' => (SyntaxKind::ColonToken, 1),
            b'.' if next == Some(b'.') && self.peek(2) == Some(b'.') => {
                (SyntaxKind::DotDotDotToken, 3)
            }
            b'.' => (SyntaxKind::DotToken, 1),
            b'<' if next == Some(b'<') && self.peek(2) == Some(b'=') => {
                (SyntaxKind::LessThanLessThanEqualsToken, 3)
            }
            b'<' if next == Some(b'<') => (SyntaxKind::LessThanLessThanToken, 2),
            b'<' if next == Some(b'=') => (SyntaxKind::LessThanEqualsToken, 2),
            b'<' => (SyntaxKind::LessThanToken, 1),
            b'>' => self.greater_than_token(),
            b'=' if next == Some(b'=') && self.peek(2) == Some(b'=') => {
                (SyntaxKind::EqualsEqualsEqualsToken, 3)
            }
            b'=' if next == Some(b'=') => (SyntaxKind::EqualsEqualsToken, 2),
            b'=' => (SyntaxKind::EqualsToken, 1),
            b'!' if next == Some(b'=') && self.peek(2) == Some(b'=') => {
                (SyntaxKind::ExclamationEqualsEqualsToken, 3)
            }
            b'!' if next == Some(b'=') => (SyntaxKind::ExclamationEqualsToken, 2),
            b'!' => (SyntaxKind::ExclamationToken, 1),
            b'+' if next == Some(b'+') => (SyntaxKind::PlusPlusToken, 2),
            b'+' if next == Some(b'=') => (SyntaxKind::PlusEqualsToken, 2),
            b'+' => (SyntaxKind::PlusToken, 1),
            b'-' if next == Some(b'-') => (SyntaxKind::MinusMinusToken, 2),
            b'-' if next == Some(b'=') => (SyntaxKind::MinusEqualsToken, 2),
            b'-' => (SyntaxKind::MinusToken, 1),
            b'*' if next == Some(b'=') => (SyntaxKind::AsteriskEqualsToken, 2),
            b'*' => (SyntaxKind::AsteriskToken, 1),
            b'/' if next == Some(b'=') => (SyntaxKind::SlashEqualsToken, 2),
            b'/' => (SyntaxKind::SlashToken, 1),
            b'%' if next == Some(b'=') => (SyntaxKind::PercentEqualsToken, 2),
            b'%' => (SyntaxKind::PercentToken, 1),
            b'&' if next == Some(b'&') => (SyntaxKind::AmpersandAmpersandToken, 2),
            b'&' if next == Some(b'=') => (SyntaxKind::AmpersandEqualsToken, 2),
            b'&' => (SyntaxKind::AmpersandToken, 1),
            b'|' if next == Some(b'|') => (SyntaxKind::BarBarToken, 2),
            b'|' if next == Some(b'=') => (SyntaxKind::BarEqualsToken, 2),
            b'|' => (SyntaxKind::BarToken, 1),
            b'^' if next == Some(b'=') => (SyntaxKind::CaretEqualsToken, 2),
            b'^' => (SyntaxKind::CaretToken, 1),
            b'~' => (SyntaxKind::TildeToken, 1),
            _ => {
                let ch_len = self.text[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                let shown = &self.text[self.pos..self.pos + ch_len];
                let message = format_message(diagnostic_messages::UNEXPECTED_CHARACTER, &[shown]);
                self.error(
                    self.pos,
                    ch_len,
                    diagnostic_codes::UNEXPECTED_CHARACTER,
                    message,
                );
                self.pos += ch_len;
                return SyntaxKind::Unknown;
            }
        };
        self.pos += len;
        kind
    }

    /// `>`, `>=`, `>>`, `>>=`, `>>>` or `>>>=`.
    fn greater_than_token(&self) -> (SyntaxKind, usize) {
        let mut run = 1;
        while run < 3 && self.peek(run) == Some(b'>') {
            run += 1;
        }
        let assigns = self.peek(run) == Some(b'=');
        let kind = match (run, assigns) {
            (1, false) => SyntaxKind::GreaterThanToken,
            (1, true) => SyntaxKind::GreaterThanEqualsToken,
            (2, false) => SyntaxKind::GreaterThanGreaterThanToken,
            (2, true) => SyntaxKind::GreaterThanGreaterThanEqualsToken,
            (_, false) => SyntaxKind::GreaterThanGreaterThanGreaterThanToken,
            (_, true) => SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken,
        };
        (kind, run + usize::from(assigns))
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let rest = &self.text[self.pos..];
        self.pos += rest
            .char_indices()
            .find(|&(_, ch)| !is_identifier_char(ch))
            .map_or(rest.len(), |(offset, _)| offset);
        SyntaxKind::keyword(self.token_text()).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        if bytes[self.pos] == b'0' && matches!(self.peek(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
            return SyntaxKind::NumericLiteral;
        }
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < bytes.len() && bytes[self.pos] == b'.' {
            self.pos += 1;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < bytes.len() && matches!(bytes[self.pos], b'e' | b'E') {
            let mut look = self.pos + 1;
            if look < bytes.len() && matches!(bytes[look], b'+' | b'-') {
                look += 1;
            }
            if look < bytes.len() && bytes[look].is_ascii_digit() {
                self.pos = look;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        SyntaxKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' if bytes[self.pos + 1..].starts_with(b"\r\n") => self.pos += 3,
                b'\\' => self.pos += 2,
                b'\n' | b'\r' => break,
                byte if byte == quote => {
                    self.pos += 1;
                    return SyntaxKind::StringLiteral;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(bytes.len());
        while !self.text.is_char_boundary(self.pos) {
            self.pos += 1;
        }
        self.error(
            start,
            self.pos - start,
            diagnostic_codes::UNTERMINATED_STRING_LITERAL,
            diagnostic_messages::UNTERMINATED_STRING_LITERAL.to_string(),
        );
        SyntaxKind::StringLiteral
    }

    /// Cooked value of the current string literal token, or `None` when an
    /// escape sequence cannot be decoded (malformed hex digits, an octal
    /// escape, a lone surrogate).
    pub fn string_value(&self) -> Option<String> {
        let raw = self.token_text();
        let inner = raw
            .get(1..raw.len().saturating_sub(1).max(1))
            .unwrap_or_default();
        cook_string(inner)
    }

    /// Re-scan a `/` or `/=` token as a regular expression literal. The
    /// parser calls this where an expression operand is expected.
    pub fn re_scan_slash_token(&mut self) -> SyntaxKind {
        if !matches!(
            self.token,
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken
        ) {
            return self.token;
        }
        let bytes = self.text.as_bytes();
        let mut pos = self.token_start + 1;
        let mut in_class = false;
        loop {
            match bytes.get(pos) {
                None | Some(b'\n' | b'\r') => {
                    self.pos = pos;
                    self.error(
                        self.token_start,
                        pos - self.token_start,
                        diagnostic_codes::UNTERMINATED_REGULAR_EXPRESSION_LITERAL,
                        diagnostic_messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL.to_string(),
                    );
                    self.token = SyntaxKind::RegularExpressionLiteral;
                    return self.token;
                }
                Some(b'\\') if !matches!(bytes.get(pos + 1), None | Some(b'\n' | b'\r')) => {
                    pos += 2
                }
                Some(b'[') => {
                    in_class = true;
                    pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    pos += 1;
                }
                Some(b'/') if !in_class => {
                    pos += 1;
                    break;
                }
                Some(_) => pos += 1,
            }
        }
        while pos < bytes.len() && is_identifier_part(bytes[pos]) {
            pos += 1;
        }
        self.pos = pos;
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }
}

/// Decode the escape sequences of a string literal body.
fn cook_string(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'v' => out.push('\u{b}'),
            'f' => out.push('\u{c}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => out.push('\0'),
            '0'..='9' => return None,
            'x' => out.push(char::from_u32(read_hex_digits(&mut chars, 2)?)?),
            'u' => {
                let mut code = read_unicode_escape(&mut chars)?;
                if (0xD800..0xDC00).contains(&code) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return None;
                    }
                    let low = read_unicode_escape(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                }
                out.push(char::from_u32(code)?);
            }
            // Line continuations contribute nothing.
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    Some(out)
}

fn read_hex_digits(chars: &mut impl Iterator<Item = char>, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Body of a `\u` escape: four hex digits or `{...}`.
fn read_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() != Some(&'{') {
        return read_hex_digits(chars, 4);
    }
    chars.next();
    let mut value: u32 = 0;
    let mut digits = 0;
    loop {
        let ch = chars.next()?;
        if ch == '}' {
            break;
        }
        value = value.checked_mul(16)?.checked_add(ch.to_digit(16)?)?;
        if value > 0x10FFFF {
            return None;
        }
        digits += 1;
    }
    (digits > 0).then_some(value)
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod scanner_tests;
