//! The evaluator tree the parser emits.

use regex::Regex;

/// An immutable predicate over document nodes, optionally combined with
/// structural context.
///
/// Variants fall into four categories: leaf predicates (tag, id, class,
/// attribute, text), index predicates, structural wrappers carrying one
/// boxed inner evaluator, and the combining `And`/`Or` evaluators carrying a
/// list of children. A parse produces a single evaluator; composites own
/// their children exclusively and the tree is acyclic.
///
/// Attribute values are stored verbatim as they appeared in the query,
/// surrounding quotes included; stripping them is the matcher's concern.
#[derive(Debug, Clone)]
pub enum Evaluator {
    /// `*`
    AllElements,
    /// `tag`
    Tag(String),
    /// Qualified-name suffix test, emitted for wildcard-namespace selectors
    /// (`*|tag` matches any element whose name ends in `:tag`).
    TagEndsWith(String),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[attr]`
    Attribute(String),
    /// `[^attrPrefix]`
    AttributeStarting(String),
    /// `[attr=value]`
    AttributeWithValue { key: String, value: String },
    /// `[attr!=value]`
    AttributeWithValueNot { key: String, value: String },
    /// `[attr^=value]`
    AttributeWithValueStarting { key: String, value: String },
    /// `[attr$=value]`
    AttributeWithValueEnding { key: String, value: String },
    /// `[attr*=value]`
    AttributeWithValueContaining { key: String, value: String },
    /// `[attr~=regex]`
    AttributeWithValueMatching { key: String, pattern: Regex },
    /// `:contains(text)`
    ContainsText(String),
    /// `:containsOwn(text)`
    ContainsOwnText(String),
    /// `:containsData(text)`
    ContainsData(String),
    /// `:matches(regex)`
    Matches(Regex),
    /// `:matchesOwn(regex)`
    MatchesOwn(Regex),
    /// `:matchText`
    MatchText,
    /// `:lt(n)`
    IndexLessThan(usize),
    /// `:gt(n)`
    IndexGreaterThan(usize),
    /// `:eq(n)`
    IndexEquals(usize),
    /// `:nth-child(An+B)`
    IsNthChild { a: i32, b: i32 },
    /// `:nth-last-child(An+B)`
    IsNthLastChild { a: i32, b: i32 },
    /// `:nth-of-type(An+B)`
    IsNthOfType { a: i32, b: i32 },
    /// `:nth-last-of-type(An+B)`
    IsNthLastOfType { a: i32, b: i32 },
    IsFirstChild,
    IsLastChild,
    IsFirstOfType,
    IsLastOfType,
    IsOnlyChild,
    IsOnlyOfType,
    IsEmpty,
    IsRoot,
    /// Anchor for combinator-led queries such as `> p`.
    Root,
    /// Matches when any ancestor matches the inner evaluator.
    Parent(Box<Evaluator>),
    /// Matches when the direct parent matches the inner evaluator.
    ImmediateParent(Box<Evaluator>),
    /// Matches when any preceding sibling matches the inner evaluator.
    PreviousSibling(Box<Evaluator>),
    /// Matches when the immediately preceding sibling matches.
    ImmediatePreviousSibling(Box<Evaluator>),
    /// `:has(selector)`
    Has(Box<Evaluator>),
    /// `:not(selector)`
    Not(Box<Evaluator>),
    /// All children must match.
    And(Vec<Evaluator>),
    /// Any child must match. By the time an `Or` leaves the parser it has at
    /// least two children.
    Or(Vec<Evaluator>),
}

/// Compiled regexes compare by their pattern source, everything else is
/// plain structural equality.
impl PartialEq for Evaluator {
    fn eq(&self, other: &Self) -> bool {
        use Evaluator::*;

        match (self, other) {
            (AllElements, AllElements)
            | (MatchText, MatchText)
            | (IsFirstChild, IsFirstChild)
            | (IsLastChild, IsLastChild)
            | (IsFirstOfType, IsFirstOfType)
            | (IsLastOfType, IsLastOfType)
            | (IsOnlyChild, IsOnlyChild)
            | (IsOnlyOfType, IsOnlyOfType)
            | (IsEmpty, IsEmpty)
            | (IsRoot, IsRoot)
            | (Root, Root) => true,

            (Tag(a), Tag(b))
            | (TagEndsWith(a), TagEndsWith(b))
            | (Id(a), Id(b))
            | (Class(a), Class(b))
            | (Attribute(a), Attribute(b))
            | (AttributeStarting(a), AttributeStarting(b))
            | (ContainsText(a), ContainsText(b))
            | (ContainsOwnText(a), ContainsOwnText(b))
            | (ContainsData(a), ContainsData(b)) => a == b,

            (AttributeWithValue { key: k1, value: v1 }, AttributeWithValue { key: k2, value: v2 })
            | (
                AttributeWithValueNot { key: k1, value: v1 },
                AttributeWithValueNot { key: k2, value: v2 },
            )
            | (
                AttributeWithValueStarting { key: k1, value: v1 },
                AttributeWithValueStarting { key: k2, value: v2 },
            )
            | (
                AttributeWithValueEnding { key: k1, value: v1 },
                AttributeWithValueEnding { key: k2, value: v2 },
            )
            | (
                AttributeWithValueContaining { key: k1, value: v1 },
                AttributeWithValueContaining { key: k2, value: v2 },
            ) => k1 == k2 && v1 == v2,

            (
                AttributeWithValueMatching { key: k1, pattern: p1 },
                AttributeWithValueMatching { key: k2, pattern: p2 },
            ) => k1 == k2 && p1.as_str() == p2.as_str(),

            (Matches(a), Matches(b)) | (MatchesOwn(a), MatchesOwn(b)) => {
                a.as_str() == b.as_str()
            }

            (IndexLessThan(a), IndexLessThan(b))
            | (IndexGreaterThan(a), IndexGreaterThan(b))
            | (IndexEquals(a), IndexEquals(b)) => a == b,

            (IsNthChild { a: a1, b: b1 }, IsNthChild { a: a2, b: b2 })
            | (IsNthLastChild { a: a1, b: b1 }, IsNthLastChild { a: a2, b: b2 })
            | (IsNthOfType { a: a1, b: b1 }, IsNthOfType { a: a2, b: b2 })
            | (IsNthLastOfType { a: a1, b: b1 }, IsNthLastOfType { a: a2, b: b2 }) => {
                a1 == a2 && b1 == b2
            }

            (Parent(a), Parent(b))
            | (ImmediateParent(a), ImmediateParent(b))
            | (PreviousSibling(a), PreviousSibling(b))
            | (ImmediatePreviousSibling(a), ImmediatePreviousSibling(b))
            | (Has(a), Has(b))
            | (Not(a), Not(b)) => a == b,

            (And(a), And(b)) | (Or(a), Or(b)) => a == b,

            _ => false,
        }
    }
}

impl Eq for Evaluator {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn regex_variants_compare_by_pattern() {
        let a = Evaluator::Matches(Regex::new(r"\d+").unwrap());
        let b = Evaluator::Matches(Regex::new(r"\d+").unwrap());
        let c = Evaluator::Matches(Regex::new(r"\w+").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Evaluator::MatchesOwn(Regex::new(r"\d+").unwrap()));
    }

    #[test]
    fn structural_equality_recurses() {
        let make = || {
            Evaluator::And(vec![
                Evaluator::Tag("a".to_string()),
                Evaluator::ImmediateParent(Box::new(Evaluator::Id("x".to_string()))),
            ])
        };
        assert_eq!(make(), make());
        assert_ne!(make(), Evaluator::Tag("a".to_string()));
    }

    #[test]
    fn attribute_variants_do_not_cross_match() {
        let with = Evaluator::AttributeWithValue {
            key: "href".to_string(),
            value: "/".to_string(),
        };
        let not = Evaluator::AttributeWithValueNot {
            key: "href".to_string(),
            value: "/".to_string(),
        };
        assert_ne!(with, not);
    }
}
