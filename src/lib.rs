//! Parses CSS selectors into evaluator trees.
//!
//! A query like `div.main > a[href^="/"]:nth-child(2n+1)` compiles into a
//! single [`Evaluator`]: an immutable predicate over nodes of an HTML-like
//! document tree, built from leaf tests (tag, id, class, attribute, index,
//! text) and structural combinators (descendant, child, sibling, or-group).
//! Walking a document and matching nodes against the tree is the embedder's
//! concern; this crate only compiles the query.

pub mod errors;
pub mod evaluator;
pub mod parser;
pub mod tokenqueue;
mod util;

pub use errors::SelectorParseError;
pub use evaluator::Evaluator;
pub use parser::QueryParser;
pub use tokenqueue::TokenQueue;

/// Parse a CSS selector into an evaluator tree.
///
/// ```
/// use css_query::{parse_selector, Evaluator};
///
/// let eval = parse_selector("div.main").unwrap();
/// assert_eq!(
///     eval,
///     Evaluator::And(vec![
///         Evaluator::Tag("div".to_string()),
///         Evaluator::Class("main".to_string()),
///     ])
/// );
/// ```
pub fn parse_selector(css_query: &str) -> Result<Evaluator, SelectorParseError> {
    QueryParser::parse(css_query)
}
