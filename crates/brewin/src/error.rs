use std::fmt;

/// Runtime error raised while evaluating a parsed program.
///
/// Mirrors the error kinds in the language spec: every evaluator failure is
/// one of [`EvalError::Name`], [`EvalError::Type`], or [`EvalError::Arithmetic`],
/// plus [`EvalError::RecursionLimit`] for the ambient recursion guard (the
/// evaluator never raises a syntax error — that belongs to [`crate::parser::ParseError`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Undefined variable/function, missing member, or a first-class reference
    /// to an overloaded function name.
    Name(String),
    /// Operator/condition/call type mismatch, or member access on a non-object.
    Type(String),
    /// Integer division by zero.
    Arithmetic(String),
    /// The call stack exceeded the configured recursion guard.
    RecursionLimit { limit: usize },
}

impl EvalError {
    pub(crate) fn name(message: impl Into<String>) -> Self {
        Self::Name(message.into())
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub(crate) fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic(message.into())
    }

    /// The error-kind tag used by the HTTP surface and the REPL-style CLI
    /// output, matching `original_source/server.py`'s `"ErrorType." in error_msg`
    /// sniffing with an explicit tag instead of string matching.
    #[must_use]
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Self::Name(_) => "NameError",
            Self::Type(_) => "TypeError",
            Self::Arithmetic(_) => "ArithmeticError",
            Self::RecursionLimit { .. } => "RecursionError",
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(message) | Self::Type(message) | Self::Arithmetic(message) => {
                write!(f, "{}: {message}", self.kind_tag())
            }
            Self::RecursionLimit { limit } => {
                write!(f, "{}: exceeded maximum call depth of {limit}", self.kind_tag())
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Top-level error surfaced to the CLI/HTTP wrapper: either the source failed
/// to parse, or it parsed but failed during evaluation.
///
/// Keeping parse and runtime failures as distinct variants lets the outer
/// wrapper map them to the `SyntaxError`/`RuntimeError`-tagged outputs from
/// `original_source/server.py` without string-sniffing the message.
#[derive(Debug, Clone)]
pub enum BrewinError {
    Syntax(crate::parser::ParseError),
    Runtime(EvalError),
}

impl fmt::Display for BrewinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(error) => write!(f, "SyntaxError: {error}"),
            Self::Runtime(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for BrewinError {}

impl From<crate::parser::ParseError> for BrewinError {
    fn from(error: crate::parser::ParseError) -> Self {
        Self::Syntax(error)
    }
}

impl From<EvalError> for BrewinError {
    fn from(error: EvalError) -> Self {
        Self::Runtime(error)
    }
}
