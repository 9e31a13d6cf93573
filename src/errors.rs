//! Error results that can be returned from the selector parser.

use thiserror::Error;

/// Errors raised while compiling a CSS selector into an evaluator tree.
///
/// Every failure propagates immediately to the parse entry point; no partial
/// evaluator tree is ever returned.
#[derive(Debug, Error)]
pub enum SelectorParseError {
    /// No selector production matched the head of the queue.
    #[error("could not parse query '{query}': unexpected token at '{remainder}'")]
    UnexpectedToken { query: String, remainder: String },

    /// A required id, class, sub-query or argument was empty.
    #[error("{0} must not be empty")]
    EmptyToken(String),

    /// The queue ran out before a balanced chunk closed. Carries the partial
    /// content collected up to that point.
    #[error("did not find balanced marker at '{0}'")]
    UnbalancedDelimiter(String),

    /// An explicit consume did not find the expected sequence on the queue.
    #[error("queue did not match expected sequence '{0}'")]
    QueueMismatch(String),

    /// `:lt`, `:gt` and `:eq` take a plain non-negative integer.
    #[error("index must be numeric, got '{0}'")]
    BadIndex(String),

    /// An nth argument matched neither `odd`/`even`, `An+B` nor `B`.
    #[error("could not parse nth-index '{0}': unexpected format")]
    BadNthFormula(String),

    /// Unreachable from normal dispatch; the combinator set is closed.
    #[error("unknown combinator '{0}'")]
    UnknownCombinator(char),

    /// A `:matches`, `:matchesOwn` or `[attr~=]` pattern failed to compile.
    #[error("invalid regex in query: {0}")]
    RegexCompile(#[from] regex::Error),
}
