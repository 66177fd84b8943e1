use thiserror::Error;

/// Errors produced while compiling a single class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The scanner could not form a token.
    #[error("[line {line}] lexical error: {kind}")]
    Lexical {
        /// What went wrong.
        kind: LexicalError,
        /// Line the bad token started on.
        line: usize,
    },
    /// A grammar production expected something other than what was found.
    #[error("[line {line}] expected {expected}, found '{found}'")]
    UnexpectedToken {
        /// Description of the expected token or production.
        expected: String,
        /// Text of the token actually found.
        found: String,
        /// Line of the offending token.
        line: usize,
    },
    /// The input ended in the middle of a production.
    #[error("expected {expected}, found end of input")]
    UnexpectedEof {
        /// Description of the expected token or production.
        expected: String,
    },
    /// Integer constants must fit in 15 bits.
    #[error("[line {line}] integer constant {value} is out of range (0..=32767)")]
    IntegerOutOfRange {
        /// Literal text of the constant.
        value: String,
        /// Line of the constant.
        line: usize,
    },
    /// Every character of a string constant is pushed as a constant, so it must fit in 15 bits
    /// too.
    #[error("[line {line}] character {character:?} in string constant is out of range (0..=32767)")]
    CharacterOutOfRange {
        /// The offending character.
        character: char,
        /// Line of the string constant.
        line: usize,
    },
    /// Expressions or blocks nested deeper than the compiler will follow.
    #[error("[line {line}] nesting deeper than {limit} levels")]
    NestingTooDeep {
        /// The maximum depth.
        limit: usize,
        /// Line where the limit was reached.
        line: usize,
    },
    /// A name resolves neither as a variable nor as a class.
    #[error("[line {line}] cannot resolve '{name}'")]
    Unresolved {
        /// The unresolved name.
        name: String,
        /// Line of the reference.
        line: usize,
    },
    /// A name is declared twice in the same scope.
    #[error("[line {line}] '{name}' is already defined in this scope")]
    Redefinition {
        /// The duplicated name.
        name: String,
        /// Line of the second declaration.
        line: usize,
    },
    /// A compiler invariant was broken. Should never happen for any input.
    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

/// Ways the scanner can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexicalError {
    /// A string literal reached a newline or the end of input before its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A block comment reached the end of input before `*/`.
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Invariants of the compiler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// `Scanner::advance` was called without a token buffered by `has_more_tokens`.
    #[error("advance called without a buffered lookahead token")]
    AdvanceWithoutLookahead,
    /// A local was declared after the function header had been written.
    #[error("local '{0}' declared after the function header was emitted")]
    LocalAfterFunctionHeader(String),
    /// The writer was handed an operator symbol it has no translation for.
    #[error("no {arity} translation for operator '{symbol}'")]
    UnknownOperator {
        /// The operator symbol.
        symbol: char,
        /// "unary" or "binary".
        arity: &'static str,
    },
}

/// The four broad failure classes a caller may want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed token.
    Lexical,
    /// Expected production absent.
    Syntax,
    /// Name did not resolve, or resolved ambiguously.
    Resolution,
    /// Compiler bug.
    InternalInvariant,
}

impl CompileError {
    /// Which part of the taxonomy this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompileError::Lexical { .. } => ErrorCategory::Lexical,
            CompileError::UnexpectedToken { .. }
            | CompileError::UnexpectedEof { .. }
            | CompileError::IntegerOutOfRange { .. }
            | CompileError::CharacterOutOfRange { .. }
            | CompileError::NestingTooDeep { .. } => ErrorCategory::Syntax,
            CompileError::Unresolved { .. } | CompileError::Redefinition { .. } => {
                ErrorCategory::Resolution
            }
            CompileError::Internal(_) => ErrorCategory::InternalInvariant,
        }
    }
}

/// Result alias used throughout the compiler.
pub type CompileResult<T> = Result<T, CompileError>;
