//! The attribute production: `[attr]`, `[^attrPrefix]`, `[attr OP value]`.

use regex::Regex;

use crate::errors::SelectorParseError;
use crate::evaluator::Evaluator;
use crate::parser::QueryParser;
use crate::tokenqueue::TokenQueue;

/// Attribute comparison operators. The key scan stops at the first of
/// these; the longer `!=`-style tokens are matched before the bare `=`
/// can, because their lead character differs.
const ATTRIBUTE_EVALUATORS: [&str; 6] = ["=", "!=", "^=", "$=", "*=", "~="];

impl QueryParser {
    /// Parses the content of a `[...]` group through its own queue. Values
    /// are taken verbatim from the remainder, surrounding quotes included;
    /// the downstream matcher owns stripping them. `~=` compiles its value
    /// as a regex.
    pub(crate) fn parse_attribute(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_attribute");

        let mut cq = TokenQueue::new(&self.queue.chomp_balanced('[', ']')?);

        let key = cq.consume_to_any(&ATTRIBUTE_EVALUATORS);
        if key.is_empty() {
            return Err(SelectorParseError::EmptyToken("attribute key".to_string()));
        }
        cq.consume_whitespace();

        let eval = if cq.is_empty() {
            if let Some(prefix) = key.strip_prefix('^') {
                Evaluator::AttributeStarting(prefix.to_string())
            } else {
                Evaluator::Attribute(key)
            }
        } else if cq.match_chomp("=") {
            Evaluator::AttributeWithValue {
                key,
                value: cq.remainder(),
            }
        } else if cq.match_chomp("!=") {
            Evaluator::AttributeWithValueNot {
                key,
                value: cq.remainder(),
            }
        } else if cq.match_chomp("^=") {
            Evaluator::AttributeWithValueStarting {
                key,
                value: cq.remainder(),
            }
        } else if cq.match_chomp("$=") {
            Evaluator::AttributeWithValueEnding {
                key,
                value: cq.remainder(),
            }
        } else if cq.match_chomp("*=") {
            Evaluator::AttributeWithValueContaining {
                key,
                value: cq.remainder(),
            }
        } else if cq.match_chomp("~=") {
            Evaluator::AttributeWithValueMatching {
                key,
                pattern: Regex::new(&cq.remainder())?,
            }
        } else {
            return Err(SelectorParseError::UnexpectedToken {
                query: self.query.clone(),
                remainder: cq.remainder(),
            });
        };

        self.evals.push(eval);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(query: &str) -> Evaluator {
        QueryParser::parse(query).unwrap()
    }

    #[test]
    fn key_only() {
        assert_eq!(parse("[href]"), Evaluator::Attribute("href".to_string()));
    }

    #[test]
    fn key_prefix() {
        assert_eq!(
            parse("[^data-]"),
            Evaluator::AttributeStarting("data-".to_string())
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            parse("[href=/index]"),
            Evaluator::AttributeWithValue {
                key: "href".to_string(),
                value: "/index".to_string(),
            }
        );
        assert_eq!(
            parse("[rel!=nofollow]"),
            Evaluator::AttributeWithValueNot {
                key: "rel".to_string(),
                value: "nofollow".to_string(),
            }
        );
        assert_eq!(
            parse("[href$=.png]"),
            Evaluator::AttributeWithValueEnding {
                key: "href".to_string(),
                value: ".png".to_string(),
            }
        );
        assert_eq!(
            parse("[title*=tool]"),
            Evaluator::AttributeWithValueContaining {
                key: "title".to_string(),
                value: "tool".to_string(),
            }
        );
    }

    #[test]
    fn quotes_are_kept_in_the_value() {
        assert_eq!(
            parse("[href^=\"/\"]"),
            Evaluator::AttributeWithValueStarting {
                key: "href".to_string(),
                value: "\"/\"".to_string(),
            }
        );
    }

    #[test]
    fn regex_operator() {
        assert_eq!(
            parse("[id~=\\d+]"),
            Evaluator::AttributeWithValueMatching {
                key: "id".to_string(),
                pattern: Regex::new(r"\d+").unwrap(),
            }
        );
    }

    #[test]
    fn bad_regex_is_reported() {
        assert!(matches!(
            QueryParser::parse("[id~=(]").unwrap_err(),
            SelectorParseError::RegexCompile(_)
        ));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            QueryParser::parse("[=v]").unwrap_err(),
            SelectorParseError::EmptyToken(_)
        ));
    }

    #[test]
    fn compound_with_attribute() {
        assert_eq!(
            parse("a[href]"),
            Evaluator::And(vec![
                Evaluator::Tag("a".to_string()),
                Evaluator::Attribute("href".to_string()),
            ])
        );
    }
}
