use std::fmt::{self, Display};
use std::iter::FusedIterator;

use crate::error::{CompileError, CompileResult, InternalError, LexicalError};

/// Every single-character symbol of the language.
pub const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

/// Scanner takes in a source text and hands out tokens one at a time.
///
/// It keeps a current token and at most one buffered lookahead token. The protocol is
/// `has_more_tokens()` (which scans and buffers the next token) followed by exactly one
/// `advance()` (which commits the buffered token as current).
#[derive(Debug)]
pub struct Scanner<'a> {
    // The unscanned remainder of the source. Everything before it has been turned into tokens
    // or skipped as whitespace/comments.
    input: &'a str,
    // Number of bytes of `input` consumed by the token currently being scanned.
    scanned_input_len: usize,
    current_line: usize,
    current: Option<Token<'a>>,
    lookahead: Option<Token<'a>>,
    failed: bool,
}

/// The five lexical classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// One of the reserved words, see [`Keyword`].
    Keyword,
    /// One of [`SYMBOLS`].
    Symbol,
    /// A run of decimal digits. Not range checked.
    IntegerConstant,
    /// The text between two double quotes, quotes excluded.
    StringConstant,
    /// Anything else.
    Identifier,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Keyword => "keyword",
            TokenType::Symbol => "symbol",
            TokenType::IntegerConstant => "integer constant",
            TokenType::StringConstant => "string constant",
            TokenType::Identifier => "identifier",
        };
        f.write_str(name)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    /// The keyword spelled by `text`, if it is reserved.
    pub fn lookup(text: &str) -> Option<Keyword> {
        let keyword = match text {
            "class" => Keyword::Class,
            "constructor" => Keyword::Constructor,
            "function" => Keyword::Function,
            "method" => Keyword::Method,
            "field" => Keyword::Field,
            "static" => Keyword::Static,
            "var" => Keyword::Var,
            "int" => Keyword::Int,
            "char" => Keyword::Char,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "this" => Keyword::This,
            "let" => Keyword::Let,
            "do" => Keyword::Do,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            _ => return None,
        };
        Some(keyword)
    }

    /// Source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token is a single token, including a ref to the raw characters that constitute it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    typ: TokenType,
    raw: &'a str,
    line: usize,
}

impl<'a> Token<'a> {
    /// Lexical class of the token.
    pub fn typ(&self) -> TokenType {
        self.typ
    }

    /// Source text. For string constants the surrounding quotes are not included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// 1-based line the token starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The keyword, if this token is one.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.typ {
            TokenType::Keyword => Keyword::lookup(self.raw),
            _ => None,
        }
    }

    /// The symbol character, if this token is one.
    pub fn symbol(&self) -> Option<char> {
        match self.typ {
            TokenType::Symbol => self.raw.chars().next(),
            _ => None,
        }
    }

    /// True if this token is exactly the symbol `c`.
    pub fn is_symbol(&self, c: char) -> bool {
        self.symbol() == Some(c)
    }

    /// True if this token is exactly the keyword `k`.
    pub fn is_keyword(&self, k: Keyword) -> bool {
        self.keyword() == Some(k)
    }
}

impl<'a> Scanner<'a> {
    /// Returns a fresh Scanner positioned before the first token of `source`.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            input: source,
            scanned_input_len: 0,
            current_line: 1,
            current: None,
            lookahead: None,
            failed: false,
        }
    }

    /// True iff another token remains. Scans and buffers that token, so this must be followed by
    /// exactly one [`Scanner::advance`] before the token becomes current. Calling it again
    /// without advancing is harmless.
    pub fn has_more_tokens(&mut self) -> CompileResult<bool> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan_token()?;
        }
        Ok(self.lookahead.is_some())
    }

    /// Commits the buffered lookahead token as the current token.
    pub fn advance(&mut self) -> CompileResult<()> {
        let next = self
            .lookahead
            .take()
            .ok_or(InternalError::AdvanceWithoutLookahead)?;
        self.current = Some(next);
        Ok(())
    }

    /// The current token, `None` before the first advance.
    pub fn token(&self) -> Option<&Token<'a>> {
        self.current.as_ref()
    }

    /// Type of the current token.
    pub fn token_type(&self) -> Option<TokenType> {
        self.current.as_ref().map(Token::typ)
    }

    /// Text of the current token.
    pub fn value(&self) -> Option<&'a str> {
        self.current.as_ref().map(Token::raw)
    }

    /// The token after the current one, scanning it if needed. Does not advance.
    pub fn peek(&mut self) -> CompileResult<Option<&Token<'a>>> {
        self.has_more_tokens()?;
        Ok(self.lookahead.as_ref())
    }

    /// The line the scanner has reached.
    pub fn line(&self) -> usize {
        self.current_line
    }

    fn scan_token(&mut self) -> CompileResult<Option<Token<'a>>> {
        self.skip_whitespace_and_comments()?;
        let next_char = match self.take_next_char() {
            None => return Ok(None),
            Some(c) => c,
        };
        let token = match next_char {
            '"' => self.scan_string_literal()?,
            '0'..='9' => self.scan_integer_literal(),
            c if is_symbol(c) => self.make_token(TokenType::Symbol),
            _ => self.scan_identifier_or_keyword(),
        };
        self.reset_scanned_input();
        Ok(Some(token))
    }

    fn unscanned_input(&self) -> &'a str {
        &self.input[self.scanned_input_len..]
    }

    fn peek_next_char(&self) -> Option<char> {
        self.unscanned_input().chars().next()
    }

    fn peek_next_next_char(&self) -> Option<char> {
        self.unscanned_input().chars().nth(1)
    }

    fn take_next_char(&mut self) -> Option<char> {
        let next_char = self.peek_next_char()?;
        self.scanned_input_len += next_char.len_utf8();
        Some(next_char)
    }

    fn skip_whitespace_and_comments(&mut self) -> CompileResult<()> {
        loop {
            match self.peek_next_char() {
                Some('\n') => {
                    self.current_line += 1;
                    self.take_next_char();
                }
                Some(c) if c.is_whitespace() => {
                    self.take_next_char();
                }
                Some('/') if self.peek_next_next_char() == Some('/') => {
                    // leave the \n for the next round so the line count stays right
                    while !matches!(self.peek_next_char(), Some('\n') | None) {
                        self.take_next_char();
                    }
                }
                Some('/') if self.peek_next_next_char() == Some('*') => {
                    self.skip_block_comment()?;
                }
                _ => break,
            }
        }
        self.reset_scanned_input();
        Ok(())
    }

    // Covers both /* */ and /** */, which only differ in the opening.
    fn skip_block_comment(&mut self) -> CompileResult<()> {
        let start_line = self.current_line;
        self.take_next_char();
        self.take_next_char();
        loop {
            match self.take_next_char() {
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.take_next_char();
                    return Ok(());
                }
                Some('\n') => self.current_line += 1,
                Some(_) => {}
                None => return Err(self.lexical_error(LexicalError::UnterminatedComment, start_line)),
            }
        }
    }

    fn make_token(&self, typ: TokenType) -> Token<'a> {
        Token {
            typ,
            raw: &self.input[0..self.scanned_input_len],
            line: self.current_line,
        }
    }

    // Drops the scanned portion of input.
    fn reset_scanned_input(&mut self) {
        self.input = self.unscanned_input();
        self.scanned_input_len = 0;
    }

    // Assumes we have just scanned the opening double quote. A backslash keeps the following
    // character from closing the literal; the payload itself is left as written.
    fn scan_string_literal(&mut self) -> CompileResult<Token<'a>> {
        loop {
            match self.peek_next_char() {
                Some('"') => {
                    self.take_next_char();
                    let end = self.scanned_input_len - 1;
                    return Ok(Token {
                        typ: TokenType::StringConstant,
                        raw: &self.input[1..end],
                        line: self.current_line,
                    });
                }
                Some('\\') => {
                    self.take_next_char();
                    match self.peek_next_char() {
                        Some('\n') | None => {}
                        Some(_) => {
                            self.take_next_char();
                        }
                    }
                }
                Some('\n') | None => {
                    return Err(
                        self.lexical_error(LexicalError::UnterminatedString, self.current_line)
                    );
                }
                Some(_) => {
                    self.take_next_char();
                }
            }
        }
    }

    fn scan_integer_literal(&mut self) -> Token<'a> {
        while let Some('0'..='9') = self.peek_next_char() {
            self.take_next_char();
        }
        self.make_token(TokenType::IntegerConstant)
    }

    fn scan_identifier_or_keyword(&mut self) -> Token<'a> {
        while self
            .peek_next_char()
            .map_or(false, |c| !c.is_whitespace() && !is_symbol(c))
        {
            self.take_next_char();
        }
        let text = &self.input[0..self.scanned_input_len];
        let typ = match Keyword::lookup(text) {
            Some(_) => TokenType::Keyword,
            None => TokenType::Identifier,
        };
        self.make_token(typ)
    }

    fn lexical_error(&mut self, kind: LexicalError, line: usize) -> CompileError {
        self.failed = true;
        CompileError::Lexical { kind, line }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = CompileResult<Token<'a>>;

    /// Runs the `has_more_tokens` / `advance` protocol once. Stops for good after an error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.has_more_tokens() {
            Ok(false) => None,
            Ok(true) => match self.advance() {
                Ok(()) => self.current.clone().map(Ok),
                Err(err) => Some(Err(err)),
            },
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
