//! A character queue with parsing helpers.

use std::fmt;

use crate::errors::SelectorParseError;
use crate::util::is_whitespace;

/// Escape character for balanced chunks and [`TokenQueue::unescape`].
const ESC: char = '\\';

/// A position-indexed cursor over a string, with the lexing primitives a
/// recursive-descent parser needs: lookahead, case-sensitive and
/// case-insensitive matching, class-based consumption and balanced-chunk
/// extraction.
///
/// The backing buffer is copied into a `Vec<char>` once so positions are
/// code-point indices. Only [`add_first`](TokenQueue::add_first) rewrites
/// the buffer; every other mutating operation advances `pos`. A queue has a
/// single live user for the lifetime of one parse.
pub struct TokenQueue {
    buffer: Vec<char>,
    /// Next read position, `0 <= pos <= buffer.len()`.
    pos: usize,
}

impl TokenQueue {
    /// Create a new queue backed by the given data.
    pub fn new(data: &str) -> Self {
        Self {
            buffer: data.chars().collect(),
            pos: 0,
        }
    }

    /// True if no data is left on the queue.
    pub fn is_empty(&self) -> bool {
        self.remaining_length() == 0
    }

    fn remaining_length(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Retrieves but does not remove the first character from the queue.
    /// Returns NUL if the queue is empty.
    pub fn peek(&self) -> char {
        if self.is_empty() {
            '\0'
        } else {
            self.buffer[self.pos]
        }
    }

    /// Add a string to the start of the queue. Not very performant, but an
    /// edge case.
    pub fn add_first(&mut self, seq: &str) {
        let mut buffer: Vec<char> = seq.chars().collect();
        buffer.extend_from_slice(&self.buffer[self.pos..]);
        self.buffer = buffer;
        self.pos = 0;
    }

    /// Tests if the next characters on the queue match the sequence.
    /// Case insensitive.
    pub fn matches(&self, seq: &str) -> bool {
        let mut i = self.pos;
        for sc in seq.chars() {
            match self.buffer.get(i) {
                Some(&c) if chars_eq_ignore_case(c, sc) => i += 1,
                _ => return false,
            }
        }
        true
    }

    /// Case sensitive match test.
    pub fn matches_cs(&self, seq: &str) -> bool {
        let mut i = self.pos;
        for sc in seq.chars() {
            match self.buffer.get(i) {
                Some(&c) if c == sc => i += 1,
                _ => return false,
            }
        }
        true
    }

    /// Tests if the next characters match any of the sequences.
    /// Case insensitive.
    pub fn matches_any(&self, seqs: &[&str]) -> bool {
        seqs.iter().any(|seq| self.matches(seq))
    }

    /// Tests if the next character equals any of the given characters.
    pub fn matches_any_char(&self, chars: &[char]) -> bool {
        if self.is_empty() {
            return false;
        }
        chars.contains(&self.buffer[self.pos])
    }

    /// Tests if the queue is at the start of a tag, `<` followed by a letter.
    pub fn matches_start_tag(&self) -> bool {
        self.remaining_length() >= 2
            && self.buffer[self.pos] == '<'
            && self.buffer[self.pos + 1].is_alphabetic()
    }

    /// Tests if the queue starts with a whitespace character.
    pub fn matches_whitespace(&self) -> bool {
        !self.is_empty() && is_whitespace(self.buffer[self.pos])
    }

    /// Tests if the queue starts with a word character (letter or digit).
    pub fn matches_word(&self) -> bool {
        !self.is_empty() && self.buffer[self.pos].is_alphanumeric()
    }

    /// Drops the next character off the queue. Does nothing at the end of
    /// the queue.
    pub fn advance(&mut self) {
        if !self.is_empty() {
            self.pos += 1;
        }
    }

    /// Consume one character off the queue, or NUL when the queue is empty.
    /// Callers are expected to have checked [`is_empty`](TokenQueue::is_empty).
    pub fn consume(&mut self) -> char {
        let c = self.peek();
        self.advance();
        c
    }

    /// Consumes the supplied sequence off the queue. Case insensitive.
    /// Fails if the queue does not start with the sequence; run
    /// [`matches`](TokenQueue::matches) against that condition first.
    pub fn consume_seq(&mut self, seq: &str) -> Result<(), SelectorParseError> {
        if !self.matches(seq) {
            return Err(SelectorParseError::QueueMismatch(seq.to_string()));
        }
        self.pos += seq.chars().count();
        Ok(())
    }

    /// If the queue matches the sequence, removes it and returns true.
    pub fn match_chomp(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.chars().count();
            true
        } else {
            false
        }
    }

    /// Pulls the next run of whitespace characters off the queue. Returns
    /// whether anything was consumed.
    pub fn consume_whitespace(&mut self) -> bool {
        let mut seen = false;
        while self.matches_whitespace() {
            self.pos += 1;
            seen = true;
        }
        seen
    }

    /// Retrieves the next run of word characters (letter or digit) off the
    /// queue, or an empty string if none.
    pub fn consume_word(&mut self) -> String {
        let start = self.pos;
        while self.matches_word() {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Consume a tag name off the queue (word characters, `:`, `_` or `-`).
    pub fn consume_tag_name(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty() && (self.matches_word() || self.matches_any_char(&[':', '_', '-'])) {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Consume a CSS element selector: a tag name, but with `|` instead of
    /// `:` for namespaces (or `*|` for the wildcard namespace), so as not to
    /// conflict with `:pseudo` selectors.
    pub fn consume_element_selector(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty() && (self.matches_word() || self.matches_any(&["*|", "|", "_", "-"]))
        {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Consume a CSS identifier (id or class) off the queue: word
    /// characters, `-` or `_`.
    pub fn consume_css_identifier(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty() && (self.matches_word() || self.matches_any_char(&['-', '_'])) {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Consume an attribute key off the queue: word characters, `-`, `_` or
    /// `:`.
    pub fn consume_attribute_key(&mut self) -> String {
        let start = self.pos;
        while !self.is_empty() && (self.matches_word() || self.matches_any_char(&['-', '_', ':'])) {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Pulls a string off the queue, up to but exclusive of the match
    /// sequence, or to the queue running out. The terminator is left on the
    /// queue. Case sensitive.
    pub fn consume_to(&mut self, seq: &str) -> String {
        match self.index_of(seq) {
            Some(offset) => {
                let consumed = self.slice(self.pos, offset);
                self.pos = offset;
                consumed
            }
            None => self.remainder(),
        }
    }

    /// Like [`consume_to`](TokenQueue::consume_to), but case insensitive.
    /// When the first character of the sequence has no case distinction, an
    /// index-of scan on that character skips ahead instead of advancing one
    /// position at a time.
    pub fn consume_to_ignore_case(&mut self, seq: &str) -> String {
        let start = self.pos;
        let first = seq.chars().next();
        let can_scan = first.map_or(false, |c| c.to_lowercase().eq(c.to_uppercase()));

        while !self.is_empty() {
            if self.matches(seq) {
                break;
            }
            match first {
                Some(f) if can_scan => {
                    match self.buffer[self.pos..].iter().position(|&c| c == f) {
                        // this is the skip char, but not a match, so force an advance
                        Some(0) => self.pos += 1,
                        Some(skip) => self.pos += skip,
                        // no chance of finding it, grab to the end
                        None => self.pos = self.buffer.len(),
                    }
                }
                _ => self.pos += 1,
            }
        }

        self.slice_from(start)
    }

    /// Consumes to the first of the sequences provided, or to the end of the
    /// queue. Leaves the terminator on the queue. Case insensitive.
    pub fn consume_to_any(&mut self, seqs: &[&str]) -> String {
        let start = self.pos;
        while !self.is_empty() && !self.matches_any(seqs) {
            self.pos += 1;
        }
        self.slice_from(start)
    }

    /// Pulls a string off the queue like [`consume_to`](TokenQueue::consume_to),
    /// then pulls off the matched terminator without returning it. Case
    /// sensitive. If the queue runs out first, returns whatever was left.
    pub fn chomp_to(&mut self, seq: &str) -> String {
        let data = self.consume_to(seq);
        self.match_chomp(seq);
        data
    }

    /// Like [`chomp_to`](TokenQueue::chomp_to), but with a case-insensitive
    /// scan.
    pub fn chomp_to_ignore_case(&mut self, seq: &str) -> String {
        let data = self.consume_to_ignore_case(seq);
        self.match_chomp(seq);
        data
    }

    /// Pulls a balanced string off the queue. On `"(one (two) three) four"`
    /// with `(`, `)` this returns `"one (two) three"` and leaves `" four"`
    /// on the queue. Unbalanced openers and closers can be quoted (with `'`
    /// or `"`) or escaped (with `\`). Escapes are left in the returned
    /// string, which suits regexes; use [`unescape`](TokenQueue::unescape)
    /// for contains-style text.
    ///
    /// Fails with `UnbalancedDelimiter` if the queue runs out before the
    /// outer pair closes.
    pub fn chomp_balanced(&mut self, open: char, close: char) -> Result<String, SelectorParseError> {
        let mut start: Option<usize> = None;
        let mut end: Option<usize> = None;
        let mut depth = 0i32;
        let mut last = '\0';
        let mut in_quote = false;

        loop {
            if self.is_empty() {
                break;
            }
            let c = self.consume();
            if last != ESC {
                // a quote matching the opener is a delimiter, not a quote
                if (c == '\'' || c == '"') && c != open {
                    in_quote = !in_quote;
                }
                if in_quote {
                    last = c;
                    if depth > 0 {
                        continue;
                    }
                    break;
                }
                if c == open {
                    depth += 1;
                    if start.is_none() {
                        start = Some(self.pos);
                    }
                } else if c == close {
                    depth -= 1;
                }
            }

            // don't include the outer match pair in the return
            if depth > 0 && last != '\0' {
                end = Some(self.pos);
            }
            last = c;

            if depth <= 0 {
                break;
            }
        }

        let out = match (start, end) {
            (Some(s), Some(e)) if e >= s => self.slice(s, e),
            _ => String::new(),
        };
        if depth > 0 {
            // ran out of queue before seeing enough closers
            return Err(SelectorParseError::UnbalancedDelimiter(out));
        }
        Ok(out)
    }

    /// Unescape a `\`-escaped string: a lone backslash is removed, a `\\`
    /// pair emits one backslash.
    pub fn unescape(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut last = '\0';
        for c in input.chars() {
            if c == ESC {
                if last == ESC {
                    out.push(c);
                }
            } else {
                out.push(c);
            }
            last = c;
        }
        out
    }

    /// Consume and return whatever is left on the queue.
    pub fn remainder(&mut self) -> String {
        let remainder = self.slice_from(self.pos);
        self.pos = self.buffer.len();
        remainder
    }

    /// Index of the first occurrence of `seq` at or after the current
    /// position. Case sensitive.
    fn index_of(&self, seq: &str) -> Option<usize> {
        let needle: Vec<char> = seq.chars().collect();
        if needle.is_empty() {
            return Some(self.pos);
        }
        if needle.len() > self.buffer.len() {
            return None;
        }
        (self.pos..=self.buffer.len() - needle.len())
            .find(|&i| self.buffer[i..i + needle.len()] == needle[..])
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.buffer[start..end].iter().collect()
    }

    fn slice_from(&self, start: usize) -> String {
        self.buffer[start..].iter().collect()
    }
}

/// Renders the unconsumed remainder without advancing the queue.
impl fmt::Display for TokenQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slice_from(self.pos))
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::SelectorParseError;

    #[test]
    fn peek_advance_consume() {
        let mut tq = TokenQueue::new("ab");
        assert!(!tq.is_empty());
        assert_eq!(tq.peek(), 'a');
        assert_eq!(tq.consume(), 'a');
        assert_eq!(tq.consume(), 'b');
        assert!(tq.is_empty());
        assert_eq!(tq.peek(), '\0');
        assert_eq!(tq.consume(), '\0');

        // advance is idempotent at the end of the queue
        tq.advance();
        assert!(tq.is_empty());
    }

    #[test]
    fn matching() {
        let mut tq = TokenQueue::new(":contains(one) :contains(two)");
        assert!(tq.matches(":CONTAINS"));
        assert!(!tq.matches_cs(":CONTAINS"));
        assert!(tq.matches_cs(":contains"));
        assert!(tq.matches_any(&["four", ":contains"]));
        assert!(!tq.matches_any(&["four", "five"]));

        tq.consume_seq(":contains").unwrap();
        let chunk = tq.chomp_balanced('(', ')').unwrap();
        assert_eq!(chunk, "one");
        assert!(tq.consume_whitespace());
        assert!(tq.matches(":contains(two)"));
    }

    #[test]
    fn matches_does_not_advance() {
        let tq = TokenQueue::new("abc");
        assert!(tq.matches("ab"));
        assert!(tq.matches("ab"));
        assert!(!tq.matches("abcd"));
    }

    #[test]
    fn matches_any_char_and_classes() {
        let tq = TokenQueue::new("-x");
        assert!(tq.matches_any_char(&['_', '-']));
        assert!(!tq.matches_any_char(&['x']));
        assert!(!TokenQueue::new("").matches_any_char(&['a']));
    }

    #[test]
    fn start_tag() {
        assert!(TokenQueue::new("<div>").matches_start_tag());
        assert!(!TokenQueue::new("<1div>").matches_start_tag());
        assert!(!TokenQueue::new("<").matches_start_tag());
        assert!(!TokenQueue::new("div").matches_start_tag());
    }

    #[test]
    fn word_and_whitespace() {
        let mut tq = TokenQueue::new("one two");
        assert!(tq.matches_word());
        assert_eq!(tq.consume_word(), "one");
        assert!(!tq.matches_word());
        assert!(tq.matches_whitespace());
        assert!(tq.consume_whitespace());
        assert!(!tq.consume_whitespace());
        assert_eq!(tq.consume_word(), "two");
        assert!(tq.is_empty());
    }

    #[test]
    fn consume_seq_mismatch() {
        let mut tq = TokenQueue::new("one");
        let err = tq.consume_seq("two").unwrap_err();
        assert!(matches!(err, SelectorParseError::QueueMismatch(_)));
        // the queue did not move
        assert_eq!(tq.to_string(), "one");
    }

    #[test]
    fn match_chomp() {
        let mut tq = TokenQueue::new(":NOT(x)");
        assert!(tq.match_chomp(":not"));
        assert_eq!(tq.peek(), '(');
        assert!(!tq.match_chomp(":not"));
    }

    #[test]
    fn class_consumers() {
        assert_eq!(TokenQueue::new("a-b_c:d e").consume_tag_name(), "a-b_c:d");
        assert_eq!(TokenQueue::new("a-b_c:d e").consume_css_identifier(), "a-b_c");
        assert_eq!(TokenQueue::new("data-x:y=1").consume_attribute_key(), "data-x:y");

        let mut tq = TokenQueue::new("*|div.foo");
        assert_eq!(tq.consume_element_selector(), "*|div");
        assert_eq!(tq.peek(), '.');

        // a lone star is not an element selector
        assert_eq!(TokenQueue::new("*").consume_element_selector(), "");
        assert_eq!(TokenQueue::new("ns|div x").consume_element_selector(), "ns|div");
    }

    #[test]
    fn unicode_identifiers() {
        assert_eq!(TokenQueue::new("日本語.x").consume_css_identifier(), "日本語");
        let mut tq = TokenQueue::new("héllo wörld");
        assert_eq!(tq.consume_word(), "héllo");
    }

    #[test]
    fn consume_to() {
        let mut tq = TokenQueue::new("one two three");
        assert_eq!(tq.consume_to("two"), "one ");
        // terminator is left on the queue
        assert_eq!(tq.to_string(), "two three");
        // not found consumes to the end
        assert_eq!(tq.consume_to("four"), "two three");
        assert!(tq.is_empty());
    }

    #[test]
    fn consume_to_is_case_sensitive() {
        let mut tq = TokenQueue::new("one TWO three");
        assert_eq!(tq.consume_to("two"), "one TWO three");
        assert!(tq.is_empty());

        let mut tq = TokenQueue::new("one TWO three");
        assert_eq!(tq.consume_to_ignore_case("two"), "one ");
        assert_eq!(tq.to_string(), "TWO three");
    }

    #[test]
    fn consume_to_ignore_case_uncased_fast_path() {
        // '<' has no case distinction, so the index-of fast path is taken
        let mut tq = TokenQueue::new("<p>One</p> <p>Two</p>");
        assert_eq!(tq.consume_to_ignore_case("</P>"), "<p>One");
        assert_eq!(tq.to_string(), "</p> <p>Two</p>");
    }

    #[test]
    fn consume_to_any() {
        let mut tq = TokenQueue::new("key!=value");
        assert_eq!(tq.consume_to_any(&["=", "!=", "^="]), "key");
        assert_eq!(tq.to_string(), "!=value");
    }

    #[test]
    fn chomp_to() {
        let mut tq = TokenQueue::new("3)rest");
        assert_eq!(tq.chomp_to(")"), "3");
        assert_eq!(tq.to_string(), "rest");

        let mut tq = TokenQueue::new("no closer");
        assert_eq!(tq.chomp_to(")"), "no closer");
        assert!(tq.is_empty());

        let mut tq = TokenQueue::new("one</X>two");
        assert_eq!(tq.chomp_to_ignore_case("</x>"), "one");
        assert_eq!(tq.to_string(), "two");
    }

    #[test]
    fn chomp_balanced() {
        let mut tq = TokenQueue::new("(one (two) three) four");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "one (two) three");
        assert_eq!(tq.to_string(), " four");
    }

    #[test]
    fn chomp_balanced_quoted() {
        // a quoted closer does not count towards the balance
        let mut tq = TokenQueue::new("(\"a)b\")rest");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "\"a)b\"");
        assert_eq!(tq.to_string(), "rest");

        // a quote matching the opener still toggles quoting
        let mut tq = TokenQueue::new("[attr=\"va]lue\"] x");
        assert_eq!(tq.chomp_balanced('[', ']').unwrap(), "attr=\"va]lue\"");
        assert_eq!(tq.to_string(), " x");
    }

    #[test]
    fn chomp_balanced_escaped() {
        let mut tq = TokenQueue::new("(one \\) two) three");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "one \\) two");
        assert_eq!(tq.to_string(), " three");

        let mut tq = TokenQueue::new("(one \\( two) three");
        assert_eq!(tq.chomp_balanced('(', ')').unwrap(), "one \\( two");
        assert_eq!(tq.to_string(), " three");
    }

    #[test]
    fn chomp_balanced_unbalanced() {
        let mut tq = TokenQueue::new("(one (two) three");
        let err = tq.chomp_balanced('(', ')').unwrap_err();
        match err {
            SelectorParseError::UnbalancedDelimiter(partial) => {
                assert_eq!(partial, "one (two) three");
            }
            other => panic!("expected UnbalancedDelimiter, got {:?}", other),
        }
    }

    #[test]
    fn unescape() {
        assert_eq!(TokenQueue::unescape("one \\( \\) \\\\"), "one ( ) \\");
        assert_eq!(TokenQueue::unescape("no escapes"), "no escapes");
        assert_eq!(TokenQueue::unescape(""), "");
        // already-clean text passes through unchanged
        assert_eq!(TokenQueue::unescape("one ( ) two"), "one ( ) two");
    }

    #[test]
    fn remainder_and_display() {
        let mut tq = TokenQueue::new("one two");
        tq.consume_to(" ");
        assert_eq!(tq.to_string(), " two");
        assert_eq!(tq.remainder(), " two");
        assert!(tq.is_empty());
        assert_eq!(tq.remainder(), "");
    }

    #[test]
    fn add_first() {
        let mut tq = TokenQueue::new("one two");
        assert_eq!(tq.consume_word(), "one");
        tq.add_first("three");
        assert_eq!(tq.to_string(), "three two");
        assert_eq!(tq.consume_word(), "three");
    }
}
