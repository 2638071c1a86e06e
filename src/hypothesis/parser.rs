//! Parser for hypothesis strings.
//!
//! After whitespace removal the grammar is:
//!
//! ```text
//! input      := hypothesis (';' hypothesis)* ';'?
//! hypothesis := operand (op operand)+
//! op         := '>' | '<' | '='
//! operand    := token | '(' token (',' token)* ')' | token (',' token)*
//! ```
//!
//! Parenthesized groups distribute over the neighbouring comparison
//! (`"(a,b)>c"` reads as `a>c` and `b>c`), as do plain comma lists at either
//! end of a chain. A plain list *between* two operators must have exactly two
//! members and splits the chain instead: `"a>b,c>d"` reads as `a>b` and
//! `c>d`. Equalities with more than two members collapse to a pairwise chain.

use crate::core::error::HypothesisError;
use crate::hypothesis::rows::{ComparisonRow, Operator, SymbolTable, Term};

/// A sub-hypothesis reduced to comparison rows, still carrying its compact
/// text for error reporting and result labeling.
#[derive(Debug, Clone)]
pub struct ParsedHypothesis {
    pub text: String,
    pub rows: Vec<ComparisonRow>,
}

/// Parses a full hypothesis string into one entry per `;`-separated
/// sub-hypothesis.
pub fn parse(input: &str, symbols: &SymbolTable) -> Result<Vec<ParsedHypothesis>, HypothesisError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    check_charset(&compact)?;

    let trimmed = compact.strip_suffix(';').unwrap_or(&compact);
    if trimmed.is_empty() {
        return Err(HypothesisError::EmptySubHypothesis);
    }

    let mut parsed = Vec::new();
    for part in trimmed.split(';') {
        if part.is_empty() {
            return Err(HypothesisError::EmptySubHypothesis);
        }
        let rows = parse_sub_hypothesis(part, symbols)?;
        parsed.push(ParsedHypothesis {
            text: part.to_string(),
            rows,
        });
    }
    Ok(parsed)
}

fn check_charset(input: &str) -> Result<(), HypothesisError> {
    for c in input.chars() {
        let legal = c.is_ascii_alphanumeric()
            || matches!(c, '>' | '<' | '=' | ',' | ';' | '(' | ')' | '.' | '-');
        if !legal {
            return Err(HypothesisError::IllegalCharacter(c));
        }
    }
    Ok(())
}

/// Splits a sub-hypothesis into its alternating operand / operator chain.
fn scan_chain(text: &str) -> Result<(Vec<String>, Vec<Operator>), HypothesisError> {
    let mut operands = Vec::new();
    let mut operators = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        match Operator::from_char(c) {
            Some(op) => {
                if current.is_empty() {
                    if operands.is_empty() {
                        return Err(HypothesisError::MissingOperand(text.to_string()));
                    }
                    return Err(HypothesisError::ConsecutiveOperators(text.to_string()));
                }
                operands.push(std::mem::take(&mut current));
                operators.push(op);
            }
            None => current.push(c),
        }
    }

    if operators.is_empty() {
        return Err(HypothesisError::NoComparison(text.to_string()));
    }
    if current.is_empty() {
        return Err(HypothesisError::MissingOperand(text.to_string()));
    }
    operands.push(current);
    Ok((operands, operators))
}

#[derive(Debug, Clone)]
struct OperandList {
    members: Vec<String>,
    grouped: bool,
}

fn parse_operand(text: &str, context: &str) -> Result<OperandList, HypothesisError> {
    let (body, grouped) = if let Some(inner) = text.strip_prefix('(') {
        match inner.strip_suffix(')') {
            Some(body) => (body, true),
            None => return Err(HypothesisError::MalformedParenthesis(context.to_string())),
        }
    } else {
        (text, false)
    };
    if body.contains('(') || body.contains(')') {
        return Err(HypothesisError::MalformedParenthesis(context.to_string()));
    }
    if grouped && body.is_empty() {
        return Err(HypothesisError::MalformedParenthesis(context.to_string()));
    }

    let members: Vec<String> = body.split(',').map(str::to_string).collect();
    if members.iter().any(String::is_empty) {
        return Err(HypothesisError::MisplacedComma(context.to_string()));
    }
    Ok(OperandList { members, grouped })
}

/// Members of operand `pair` acting on the left side of comparison `pair`.
fn left_members<'a>(
    operands: &'a [OperandList],
    pair: usize,
    context: &str,
) -> Result<&'a [String], HypothesisError> {
    let operand = &operands[pair];
    if operand.grouped || operand.members.len() == 1 || pair == 0 {
        return Ok(&operand.members);
    }
    // interior plain list: the first member closed the previous comparison,
    // the second opens this one
    if operand.members.len() != 2 {
        return Err(HypothesisError::MisplacedComma(context.to_string()));
    }
    Ok(std::slice::from_ref(&operand.members[1]))
}

/// Members of operand `pair + 1` acting on the right side of comparison
/// `pair`.
fn right_members<'a>(
    operands: &'a [OperandList],
    pair: usize,
    context: &str,
) -> Result<&'a [String], HypothesisError> {
    let operand = &operands[pair + 1];
    let last = pair + 1 == operands.len() - 1;
    if operand.grouped || operand.members.len() == 1 || last {
        return Ok(&operand.members);
    }
    if operand.members.len() != 2 {
        return Err(HypothesisError::MisplacedComma(context.to_string()));
    }
    Ok(std::slice::from_ref(&operand.members[0]))
}

fn resolve_members(
    members: &[String],
    symbols: &SymbolTable,
) -> Result<Vec<Term>, HypothesisError> {
    members.iter().map(|member| symbols.term(member)).collect()
}

fn parse_sub_hypothesis(
    text: &str,
    symbols: &SymbolTable,
) -> Result<Vec<ComparisonRow>, HypothesisError> {
    let (raw_operands, operators) = scan_chain(text)?;
    let operands: Vec<OperandList> = raw_operands
        .iter()
        .map(|operand| parse_operand(operand, text))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for (pair, &op) in operators.iter().enumerate() {
        let lhs = resolve_members(left_members(&operands, pair, text)?, symbols)?;
        let rhs = resolve_members(right_members(&operands, pair, text)?, symbols)?;

        if op.is_equality() && lhs.len() + rhs.len() > 2 {
            // multi-member equality collapses to a pairwise chain
            let sequence: Vec<Term> = lhs.into_iter().chain(rhs).collect();
            for window in sequence.windows(2) {
                rows.push(ComparisonRow {
                    left: window[0],
                    op,
                    right: window[1],
                });
            }
        } else {
            for &left in &lhs {
                for &right in &rhs {
                    rows.push(ComparisonRow { left, op, right });
                }
            }
        }
    }
    Ok(rows)
}
