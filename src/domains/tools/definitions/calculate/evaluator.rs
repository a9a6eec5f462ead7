//! Arithmetic expression evaluator.
//!
//! Evaluation works directly on the expression text:
//!
//! 1. whitespace is removed and the constants `pi` and `e` are replaced by
//!    their values (plain text substitution, so *every* `e` is replaced);
//! 2. calls to `sqrt`, `pow`, `sin`, `cos` and `tan` are evaluated and the
//!    call text is replaced by the numeric result;
//! 3. the remaining arithmetic is split at the top-level operators of the
//!    lowest precedence (`+ -`, then `* /`, then `^`) and folded left to
//!    right, so every operator is left-associative.
//!
//! All arithmetic is `f64`. Recursion only follows parentheses, which are
//! capped at [`MAX_NESTING_DEPTH`] levels; input longer than
//! [`MAX_EXPRESSION_LEN`] is refused.

use thiserror::Error;

/// Errors produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("Expression is empty")]
    Empty,

    #[error("Unmatched parentheses in expression: {0}")]
    UnmatchedParenthesis(String),

    #[error("Unmatched parentheses in {0} function")]
    UnmatchedFunctionParenthesis(&'static str),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{function} function requires {expected}")]
    WrongArity {
        function: &'static str,
        expected: &'static str,
    },

    #[error("Missing operand in expression: {0}")]
    MissingOperand(String),

    #[error("Unable to evaluate expression: {0}")]
    InvalidNumber(String),

    #[error("Expression is too complex: {0}")]
    TooComplex(String),
}

type Result<T> = std::result::Result<T, EvaluationError>;

/// Longest accepted expression, counted after whitespace is removed.
pub const MAX_EXPRESSION_LEN: usize = 100_000;

/// Deepest accepted parenthesis nesting, function calls included.
pub const MAX_NESTING_DEPTH: usize = 64;

/// One-argument functions, expanded after `sqrt` and `pow`.
const UNARY_FUNCTIONS: &[(&str, fn(f64) -> f64)] =
    &[("sin", f64::sin), ("cos", f64::cos), ("tan", f64::tan)];

/// Evaluate an arithmetic expression.
///
/// ```
/// use stateful_mcp_server::domains::tools::definitions::calculate::evaluate;
///
/// assert_eq!(evaluate("2 + 2 * 3").unwrap(), 8.0);
/// assert_eq!(evaluate("sqrt(144) + pow(2,4)*3 - 10").unwrap(), 50.0);
/// ```
pub fn evaluate(expression: &str) -> Result<f64> {
    let expr: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if expr.is_empty() {
        return Err(EvaluationError::Empty);
    }
    if expr.len() > MAX_EXPRESSION_LEN {
        return Err(EvaluationError::TooComplex(format!(
            "longer than {MAX_EXPRESSION_LEN} characters"
        )));
    }

    let expr = expr
        .replace("pi", &std::f64::consts::PI.to_string())
        .replace('e', &std::f64::consts::E.to_string());

    evaluate_prepared(&expr)
}

/// Evaluate text that already has whitespace and constants handled.
fn evaluate_prepared(expr: &str) -> Result<f64> {
    check_balanced(expr)?;
    let expanded = expand_functions(expr)?;
    parse_expression(&expanded)
}

fn check_balanced(expr: &str) -> Result<()> {
    let mut depth: usize = 0;
    for c in expr.bytes() {
        match c {
            b'(' => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(EvaluationError::TooComplex(format!(
                        "parentheses nested deeper than {MAX_NESTING_DEPTH} levels"
                    )));
                }
            }
            b')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| EvaluationError::UnmatchedParenthesis(expr.to_string()))?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(EvaluationError::UnmatchedParenthesis(expr.to_string()));
    }
    Ok(())
}

/// Replace every supported function call with its value.
fn expand_functions(expr: &str) -> Result<String> {
    let mut expr = expand_function(expr, "sqrt", |inner| {
        single_argument("sqrt", inner).map(f64::sqrt)
    })?;

    expr = expand_function(&expr, "pow", |inner| {
        let (base, exponent) =
            split_top_level_comma(inner).ok_or(EvaluationError::WrongArity {
                function: "pow",
                expected: "2 arguments: base, exponent",
            })?;
        Ok(evaluate_prepared(base)?.powf(evaluate_prepared(exponent)?))
    })?;

    for &(name, func) in UNARY_FUNCTIONS {
        expr = expand_function(&expr, name, |inner| single_argument(name, inner).map(func))?;
    }

    Ok(expr)
}

/// Splice every `name(...)` call, left to right, with its computed value.
fn expand_function<F>(expr: &str, name: &'static str, apply: F) -> Result<String>
where
    F: Fn(&str) -> Result<f64>,
{
    let pattern = format!("{name}(");
    let mut out = String::with_capacity(expr.len());
    let mut rest = expr;

    while let Some(start) = rest.find(&pattern) {
        let open = start + name.len();
        let close = find_matching_paren(rest, open)
            .ok_or(EvaluationError::UnmatchedFunctionParenthesis(name))?;

        let value = apply(&rest[open + 1..close])?;
        out.push_str(&rest[..start]);
        out.push_str(&value.to_string());
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn single_argument(function: &'static str, inner: &str) -> Result<f64> {
    if split_top_level_comma(inner).is_some() {
        return Err(EvaluationError::WrongArity {
            function,
            expected: "1 argument",
        });
    }
    evaluate_prepared(inner)
}

/// Split on the first comma outside nested parentheses.
fn split_top_level_comma(expr: &str) -> Option<(&str, &str)> {
    let mut depth = 0;
    for (i, c) in expr.bytes().enumerate() {
        match c {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => return Some((&expr[..i], &expr[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Index of the parenthesis closing the one at `open`.
fn find_matching_paren(expr: &str, open: usize) -> Option<usize> {
    let mut depth = 1;
    for (i, c) in expr.bytes().enumerate().skip(open + 1) {
        match c {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Operator groups from lowest to highest precedence.
const PRECEDENCE: [&[u8]; 3] = [b"+-", b"*/", b"^"];

fn parse_expression(expr: &str) -> Result<f64> {
    parse_level(expr, 0)
}

/// Evaluate `expr` at precedence `level`, folding its operands left to right.
fn parse_level(expr: &str, level: usize) -> Result<f64> {
    let inner = strip_enclosing_parens(expr);
    if inner.len() != expr.len() {
        return parse_expression(inner);
    }
    if expr.is_empty() {
        return Err(EvaluationError::MissingOperand(expr.to_string()));
    }

    let Some(&operators) = PRECEDENCE.get(level) else {
        return parse_operand(expr);
    };

    let positions = top_level_operators(expr, operators);
    let Some(&first) = positions.first() else {
        return parse_level(expr, level + 1);
    };

    let mut acc = parse_side(expr, &expr[..first], level)?;
    for (n, &at) in positions.iter().enumerate() {
        let end = positions.get(n + 1).copied().unwrap_or(expr.len());
        let rhs = parse_side(expr, &expr[at + 1..end], level)?;
        acc = apply_operator(expr.as_bytes()[at], acc, rhs)?;
    }
    Ok(acc)
}

fn parse_side(expr: &str, side: &str, level: usize) -> Result<f64> {
    if side.is_empty() {
        return Err(EvaluationError::MissingOperand(expr.to_string()));
    }
    parse_level(side, level + 1)
}

fn apply_operator(op: u8, left: f64, right: f64) -> Result<f64> {
    Ok(match op {
        b'+' => left + right,
        b'-' => left - right,
        b'*' => left * right,
        b'/' if right == 0.0 => return Err(EvaluationError::DivisionByZero),
        b'/' => left / right,
        _ => left.powf(right),
    })
}

/// A single number, or a negated parenthesised group such as `-(2+3)`.
fn parse_operand(expr: &str) -> Result<f64> {
    if let Some(value) = parse_number(expr) {
        return Ok(value);
    }

    if let Some(rest) = expr.strip_prefix('-') {
        if rest.starts_with('(') {
            return parse_expression(rest).map(|v| -v);
        }
    }

    Err(EvaluationError::InvalidNumber(expr.to_string()))
}

/// Parse a decimal literal, or the `NaN` / `inf` text a spliced function
/// result can produce. Other spellings `f64::from_str` accepts are refused.
fn parse_number(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let literal = !unsigned.is_empty()
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.');

    if literal || matches!(unsigned, "inf" | "NaN") {
        text.parse().ok()
    } else {
        None
    }
}

fn strip_enclosing_parens(mut expr: &str) -> &str {
    while expr.starts_with('(') && find_matching_paren(expr, 0) == Some(expr.len() - 1) {
        expr = &expr[1..expr.len() - 1];
    }
    expr
}

/// Positions of the top-level operators from `operators`, left to right.
///
/// A `-` at the start, or directly after another operator or `(`, is a
/// sign and is skipped.
fn top_level_operators(expr: &str, operators: &[u8]) -> Vec<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 0usize;
    let mut positions = Vec::new();

    for (i, &c) in bytes.iter().enumerate() {
        match c {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && operators.contains(&c) => {
                if c == b'-' && (i == 0 || b"+-*/^(".contains(&bytes[i - 1])) {
                    continue;
                }
                positions.push(i);
            }
            _ => {}
        }
    }
    positions
}
