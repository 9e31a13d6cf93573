//! Recursive-descent parser that turns a selector string into an evaluator.

use crate::errors::SelectorParseError;
use crate::evaluator::Evaluator;
use crate::tokenqueue::TokenQueue;
use crate::util::normalize;

mod attribute;
mod nth;
mod pseudo;

/// Combinators that join compound selectors. The comma groups alternatives
/// and binds loosest of all.
const COMBINATORS: [&str; 5] = [",", ">", "+", "~", " "];

/// Parses a CSS selector into an [`Evaluator`] tree.
///
/// The parser owns its [`TokenQueue`] for the duration of one parse and
/// keeps a working list of evaluators for the current compound selector.
/// Combinator tokens fold the working list into a combined evaluator;
/// `:has`, `:not` and the right-hand side of every combinator re-enter
/// [`QueryParser::parse`] on their sub-query.
pub struct QueryParser {
    queue: TokenQueue,
    query: String,
    evals: Vec<Evaluator>,
}

impl QueryParser {
    fn new(css_query: &str) -> Self {
        Self {
            queue: TokenQueue::new(css_query),
            query: css_query.to_string(),
            evals: Vec::new(),
        }
    }

    /// Parse a CSS query into an evaluator.
    pub fn parse(css_query: &str) -> Result<Evaluator, SelectorParseError> {
        QueryParser::new(css_query).parse_query()
    }

    fn parse_query(mut self) -> Result<Evaluator, SelectorParseError> {
        log::trace!("parse_query '{}'", self.query);

        self.queue.consume_whitespace();

        if self.queue.matches_any(&COMBINATORS) {
            // combinator-led query, anchor it to the root
            self.evals.push(Evaluator::Root);
            let c = self.queue.consume();
            self.combinator(c)?;
        } else {
            self.find_elements()?;
        }

        while !self.queue.is_empty() {
            // hierarchy and extras
            let seen_white = self.queue.consume_whitespace();

            if self.queue.matches_any(&COMBINATORS) {
                let c = self.queue.consume();
                self.combinator(c)?;
            } else if seen_white {
                self.combinator(' ')?;
            } else {
                // compound selector continuation: E.class, E#id, E[attr]
                self.find_elements()?;
            }
        }

        if self.evals.len() == 1 {
            return Ok(self.evals.remove(0));
        }
        Ok(Evaluator::And(self.evals))
    }

    fn combinator(&mut self, combinator: char) -> Result<(), SelectorParseError> {
        log::trace!("combinator '{}'", combinator);

        self.queue.consume_whitespace();
        let sub_query = self.consume_sub_query()?;
        // the evaluator for the right-hand side of the combinator
        let new_eval = QueryParser::parse(&sub_query)?;

        // when the working list holds a single OR and the combinator is not
        // a comma, the fold applies to the rightmost alternative only, so
        // `a, b > c` reads as `a, (b > c)`. The remaining alternatives are
        // parked here and spliced back afterwards.
        let mut or_children: Option<Vec<Evaluator>> = None;

        let mut current_eval = if self.evals.len() == 1 {
            let root_eval = self.evals.remove(0);
            match root_eval {
                Evaluator::Or(mut children) if combinator != ',' => match children.pop() {
                    Some(right_most) => {
                        or_children = Some(children);
                        right_most
                    }
                    None => Evaluator::Or(children),
                },
                other => other,
            }
        } else {
            Evaluator::And(std::mem::take(&mut self.evals))
        };

        // the right-hand selector is the outer AND child: document walks
        // evaluate it first and reach the surrounding tree through the
        // structural wrapper
        current_eval = match combinator {
            '>' => Evaluator::And(vec![
                new_eval,
                Evaluator::ImmediateParent(Box::new(current_eval)),
            ]),
            ' ' => Evaluator::And(vec![new_eval, Evaluator::Parent(Box::new(current_eval))]),
            '+' => Evaluator::And(vec![
                new_eval,
                Evaluator::ImmediatePreviousSibling(Box::new(current_eval)),
            ]),
            '~' => Evaluator::And(vec![
                new_eval,
                Evaluator::PreviousSibling(Box::new(current_eval)),
            ]),
            ',' => match current_eval {
                Evaluator::Or(mut children) => {
                    children.push(new_eval);
                    Evaluator::Or(children)
                }
                other => Evaluator::Or(vec![other, new_eval]),
            },
            _ => return Err(SelectorParseError::UnknownCombinator(combinator)),
        };

        let root_eval = match or_children {
            Some(mut children) => {
                children.push(current_eval);
                Evaluator::Or(children)
            }
            None => current_eval,
        };

        self.evals.push(root_eval);
        Ok(())
    }

    /// Accumulates the next simple-selector sequence. Parenthesized and
    /// bracketed groups are kept whole, so combinator characters inside
    /// `:has(a > b)` or `[title=a,b]` stay literal content.
    fn consume_sub_query(&mut self) -> Result<String, SelectorParseError> {
        let mut sq = String::new();
        while !self.queue.is_empty() {
            if self.queue.matches("(") {
                sq.push('(');
                sq.push_str(&self.queue.chomp_balanced('(', ')')?);
                sq.push(')');
            } else if self.queue.matches("[") {
                sq.push('[');
                sq.push_str(&self.queue.chomp_balanced('[', ']')?);
                sq.push(']');
            } else if self.queue.matches_any(&COMBINATORS) {
                break;
            } else {
                sq.push(self.queue.consume());
            }
        }
        Ok(sq)
    }

    fn find_elements(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("find_elements");

        if self.queue.match_chomp("#") {
            self.parse_id()
        } else if self.queue.match_chomp(".") {
            self.parse_class()
        } else if self.queue.matches_word() || self.queue.matches("*|") {
            self.parse_tag()
        } else if self.queue.matches("[") {
            self.parse_attribute()
        } else if self.queue.match_chomp("*") {
            self.evals.push(Evaluator::AllElements);
            Ok(())
        } else if self.queue.match_chomp(":lt(") {
            self.parse_index_less_than()
        } else if self.queue.match_chomp(":gt(") {
            self.parse_index_greater_than()
        } else if self.queue.match_chomp(":eq(") {
            self.parse_index_equals()
        } else if self.queue.matches(":has(") {
            self.parse_has()
        } else if self.queue.matches(":contains(") {
            self.parse_contains(false)
        } else if self.queue.matches(":containsOwn(") {
            self.parse_contains(true)
        } else if self.queue.matches(":containsData(") {
            self.parse_contains_data()
        } else if self.queue.matches(":matches(") {
            self.parse_matches(false)
        } else if self.queue.matches(":matchesOwn(") {
            self.parse_matches(true)
        } else if self.queue.matches(":not(") {
            self.parse_not()
        } else if self.queue.match_chomp(":nth-child(") {
            self.parse_nth(false, false)
        } else if self.queue.match_chomp(":nth-last-child(") {
            self.parse_nth(true, false)
        } else if self.queue.match_chomp(":nth-of-type(") {
            self.parse_nth(false, true)
        } else if self.queue.match_chomp(":nth-last-of-type(") {
            self.parse_nth(true, true)
        } else if self.queue.match_chomp(":first-child") {
            self.evals.push(Evaluator::IsFirstChild);
            Ok(())
        } else if self.queue.match_chomp(":last-child") {
            self.evals.push(Evaluator::IsLastChild);
            Ok(())
        } else if self.queue.match_chomp(":first-of-type") {
            self.evals.push(Evaluator::IsFirstOfType);
            Ok(())
        } else if self.queue.match_chomp(":last-of-type") {
            self.evals.push(Evaluator::IsLastOfType);
            Ok(())
        } else if self.queue.match_chomp(":only-child") {
            self.evals.push(Evaluator::IsOnlyChild);
            Ok(())
        } else if self.queue.match_chomp(":only-of-type") {
            self.evals.push(Evaluator::IsOnlyOfType);
            Ok(())
        } else if self.queue.match_chomp(":empty") {
            self.evals.push(Evaluator::IsEmpty);
            Ok(())
        } else if self.queue.match_chomp(":root") {
            self.evals.push(Evaluator::IsRoot);
            Ok(())
        } else if self.queue.match_chomp(":matchText") {
            self.evals.push(Evaluator::MatchText);
            Ok(())
        } else {
            Err(SelectorParseError::UnexpectedToken {
                query: self.query.clone(),
                remainder: self.queue.remainder(),
            })
        }
    }

    fn parse_id(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_id");

        let id = self.queue.consume_css_identifier();
        if id.is_empty() {
            return Err(SelectorParseError::EmptyToken("id".to_string()));
        }
        self.evals.push(Evaluator::Id(id));
        Ok(())
    }

    fn parse_class(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_class");

        let class_name = self.queue.consume_css_identifier();
        if class_name.is_empty() {
            return Err(SelectorParseError::EmptyToken("class name".to_string()));
        }
        self.evals.push(Evaluator::Class(class_name.trim().to_string()));
        Ok(())
    }

    fn parse_tag(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_tag");

        let tag_name = self.queue.consume_element_selector();
        if tag_name.is_empty() {
            return Err(SelectorParseError::EmptyToken("tag name".to_string()));
        }

        if let Some(local) = tag_name.strip_prefix("*|") {
            // wildcard namespace: the bare name, or any qualified name
            // ending in ":name"
            self.evals.push(Evaluator::Or(vec![
                Evaluator::Tag(normalize(&tag_name)),
                Evaluator::TagEndsWith(normalize(&format!(":{local}"))),
            ]));
        } else {
            // the DOM stores "ns:tag" where the selector writes "ns|tag"
            let tag_name = if tag_name.contains('|') {
                tag_name.replace('|', ":")
            } else {
                tag_name
            };
            self.evals.push(Evaluator::Tag(tag_name.trim().to_string()));
        }
        Ok(())
    }
}
