//! Pseudo-class productions that take an argument: the index selectors
//! `:lt`, `:gt`, `:eq`, the text selectors `:contains`, `:containsOwn` and
//! `:containsData`, the regex selectors `:matches` and `:matchesOwn`, and
//! the recursive `:has` and `:not`.

use regex::Regex;

use crate::errors::SelectorParseError;
use crate::evaluator::Evaluator;
use crate::parser::QueryParser;
use crate::tokenqueue::TokenQueue;

impl QueryParser {
    pub(crate) fn parse_index_less_than(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_index_less_than");

        let index = self.consume_index()?;
        self.evals.push(Evaluator::IndexLessThan(index));
        Ok(())
    }

    pub(crate) fn parse_index_greater_than(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_index_greater_than");

        let index = self.consume_index()?;
        self.evals.push(Evaluator::IndexGreaterThan(index));
        Ok(())
    }

    pub(crate) fn parse_index_equals(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_index_equals");

        let index = self.consume_index()?;
        self.evals.push(Evaluator::IndexEquals(index));
        Ok(())
    }

    /// Consumes the index argument and its closing bracket. The argument
    /// must be a plain non-negative integer.
    fn consume_index(&mut self) -> Result<usize, SelectorParseError> {
        let index = self.queue.chomp_to(")").trim().to_string();
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return Err(SelectorParseError::BadIndex(index));
        }
        match index.parse() {
            Ok(i) => Ok(i),
            Err(_) => Err(SelectorParseError::BadIndex(index)),
        }
    }

    /// `:has(selector)`, matching elements with a matching descendant.
    pub(crate) fn parse_has(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_has");

        self.queue.consume_seq(":has")?;
        let sub_query = self.queue.chomp_balanced('(', ')')?;
        if sub_query.is_empty() {
            return Err(SelectorParseError::EmptyToken(
                ":has(el) sub-select".to_string(),
            ));
        }
        let inner = QueryParser::parse(&sub_query)?;
        self.evals.push(Evaluator::Has(Box::new(inner)));
        Ok(())
    }

    /// `:contains(text)` and `:containsOwn(text)`. The argument is
    /// unescaped, so `:contains(foo\)bar)` searches for `foo)bar`.
    pub(crate) fn parse_contains(&mut self, own: bool) -> Result<(), SelectorParseError> {
        log::trace!("parse_contains");

        self.queue
            .consume_seq(if own { ":containsOwn" } else { ":contains" })?;
        let search_text = TokenQueue::unescape(&self.queue.chomp_balanced('(', ')')?);
        if search_text.is_empty() {
            return Err(SelectorParseError::EmptyToken(
                ":contains(text) query".to_string(),
            ));
        }
        self.evals.push(if own {
            Evaluator::ContainsOwnText(search_text)
        } else {
            Evaluator::ContainsText(search_text)
        });
        Ok(())
    }

    /// `:containsData(text)`, matching against data nodes such as scripts
    /// and comments.
    pub(crate) fn parse_contains_data(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_contains_data");

        self.queue.consume_seq(":containsData")?;
        let search_text = TokenQueue::unescape(&self.queue.chomp_balanced('(', ')')?);
        if search_text.is_empty() {
            return Err(SelectorParseError::EmptyToken(
                ":containsData(text) query".to_string(),
            ));
        }
        self.evals.push(Evaluator::ContainsData(search_text));
        Ok(())
    }

    /// `:matches(regex)` and `:matchesOwn(regex)`. The argument is not
    /// unescaped, the regex engine needs its escapes in place.
    pub(crate) fn parse_matches(&mut self, own: bool) -> Result<(), SelectorParseError> {
        log::trace!("parse_matches");

        self.queue
            .consume_seq(if own { ":matchesOwn" } else { ":matches" })?;
        let regex = self.queue.chomp_balanced('(', ')')?;
        if regex.is_empty() {
            return Err(SelectorParseError::EmptyToken(
                ":matches(regex) query".to_string(),
            ));
        }
        let pattern = Regex::new(&regex)?;
        self.evals.push(if own {
            Evaluator::MatchesOwn(pattern)
        } else {
            Evaluator::Matches(pattern)
        });
        Ok(())
    }

    /// `:not(selector)`.
    pub(crate) fn parse_not(&mut self) -> Result<(), SelectorParseError> {
        log::trace!("parse_not");

        self.queue.consume_seq(":not")?;
        let sub_query = self.queue.chomp_balanced('(', ')')?;
        if sub_query.is_empty() {
            return Err(SelectorParseError::EmptyToken(
                ":not(selector) sub-select".to_string(),
            ));
        }
        let inner = QueryParser::parse(&sub_query)?;
        self.evals.push(Evaluator::Not(Box::new(inner)));
        Ok(())
    }
}
