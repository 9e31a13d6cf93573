//! The `:nth-child` family argument grammar: `odd`, `even`, `An+B` or a
//! bare offset `B`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::SelectorParseError;
use crate::evaluator::Evaluator;
use crate::parser::QueryParser;
use crate::util::normalize;

lazy_static! {
    /// Step formulas such as `2n+1`, `-n + 6`, `4n`, `n`.
    static ref NTH_AB: Regex = Regex::new(r"^([+-]?\d*)n(\s*[+-]?\s*\d+)?$").unwrap();
    /// Bare offsets such as `5`, `+2`.
    static ref NTH_B: Regex = Regex::new(r"^([+-]?)(\d+)$").unwrap();
}

impl QueryParser {
    /// Shared production for `:nth-child`, `:nth-last-child`,
    /// `:nth-of-type` and `:nth-last-of-type`; the pseudo-class name has
    /// been chomped by the dispatcher, the argument and its closing bracket
    /// remain on the queue.
    pub(crate) fn parse_nth(
        &mut self,
        backwards: bool,
        of_type: bool,
    ) -> Result<(), SelectorParseError> {
        log::trace!("parse_nth");

        let arg = normalize(&self.queue.chomp_to(")"));
        let (a, b) = parse_nth_formula(&arg)?;

        self.evals.push(match (of_type, backwards) {
            (true, true) => Evaluator::IsNthLastOfType { a, b },
            (true, false) => Evaluator::IsNthOfType { a, b },
            (false, true) => Evaluator::IsNthLastChild { a, b },
            (false, false) => Evaluator::IsNthChild { a, b },
        });
        Ok(())
    }
}

/// Resolves a normalized nth argument into its `(a, b)` step and offset.
fn parse_nth_formula(arg: &str) -> Result<(i32, i32), SelectorParseError> {
    if arg == "odd" {
        return Ok((2, 1));
    }
    if arg == "even" {
        return Ok((2, 0));
    }

    if let Some(caps) = NTH_AB.captures(arg) {
        let coefficient = caps.get(1).map_or("", |m| m.as_str());
        // a sign without digits (`n`, `-n`) keeps the default step of 1
        let a = if coefficient.chars().any(|c| c.is_ascii_digit()) {
            parse_signed(coefficient, arg)?
        } else {
            1
        };
        let b = match caps.get(2) {
            Some(offset) => {
                // the offset group admits interior whitespace (`2n + 1`)
                let compact: String = offset
                    .as_str()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                parse_signed(&compact, arg)?
            }
            None => 0,
        };
        return Ok((a, b));
    }

    if let Some(caps) = NTH_B.captures(arg) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        return Ok((0, parse_signed(whole, arg)?));
    }

    Err(SelectorParseError::BadNthFormula(arg.to_string()))
}

/// Parses an integer with an optional sign, stripping a leading `+`.
fn parse_signed(s: &str, arg: &str) -> Result<i32, SelectorParseError> {
    let s = s.strip_prefix('+').unwrap_or(s);
    s.parse()
        .map_err(|_| SelectorParseError::BadNthFormula(arg.to_string()))
}
