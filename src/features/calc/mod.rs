//! # Calculator Feature
//!
//! Arithmetic for `?<expression>` queries. The evaluator is a capability
//! handed to the router; [`ExprEvaluator`] backs it with `evalexpr`.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Signed exponents kept intact (`1e-5`)
//! - 1.1.0: Integer literals evaluated as floats so `7/2` is `3.5`
//! - 1.0.0: Initial evalexpr-backed evaluator

use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

/// Significant digits shown for results
const PRECISION: usize = 6;

static POW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9.]+)\s*\^\s*([0-9.]+)").expect("pow pattern is valid")
});

/// Numeric expression evaluation capability
pub trait Evaluator: Send + Sync {
    /// Evaluate `expression`, returning the value or an error message
    fn evaluate(&self, expression: &str) -> Result<f64, String>;
}

/// [`Evaluator`] backed by the `evalexpr` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ExprEvaluator;

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, String> {
        evalexpr::eval_number(&floatify(expression)).map_err(|e| e.to_string())
    }
}

/// Normalize a user query for evaluation: decimal commas become periods
/// and `A^B` becomes `math::pow(A,B)`.
pub fn prepare(query: &str) -> String {
    let query = query.replace(',', ".");
    POW_RE.replace_all(&query, "math::pow(${1},${2})").into_owned()
}

/// Append `.0` to integer literals that are not part of an identifier.
fn floatify(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len() + 8);
    let mut chars = expression.chars().peekable();
    let mut prev: Option<char> = None;

    while let Some(c) = chars.next() {
        let in_identifier = prev.is_some_and(|p| p.is_alphanumeric() || p == '_' || p == '.');
        if !c.is_ascii_digit() || in_identifier {
            out.push(c);
            prev = Some(c);
            continue;
        }

        let mut literal = String::from(c);
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() || next == '.' {
                literal.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let has_exponent = take_exponent(&mut chars, &mut literal)
            || chars.peek().is_some_and(|n| matches!(n, 'e' | 'E'));
        let is_integer = !literal.contains('.') && !has_exponent;
        out.push_str(&literal);
        if is_integer {
            out.push_str(".0");
        }
        prev = literal.chars().last();
    }

    out
}

/// Move an `e`/`E` exponent with optional sign from `chars` onto `literal`.
/// Leaves `chars` untouched when no exponent digits follow.
fn take_exponent(chars: &mut Peekable<Chars<'_>>, literal: &mut String) -> bool {
    let mut look = chars.clone();
    let mut exponent = match look.next() {
        Some(e @ ('e' | 'E')) => String::from(e),
        _ => return false,
    };
    if let Some(&sign @ ('+' | '-')) = look.peek() {
        exponent.push(sign);
        look.next();
    }
    if !look.peek().is_some_and(|d| d.is_ascii_digit()) {
        return false;
    }
    while let Some(&d) = look.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        exponent.push(d);
        look.next();
    }

    literal.push_str(&exponent);
    *chars = look;
    true
}

/// Format a result the way `printf("%g")` does: six significant digits,
/// exponent notation for very large or very small magnitudes.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return value.to_string();
    };

    if exp < -4 || exp >= PRECISION as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_rewrites_pow_and_commas() {
        assert_eq!(prepare("2^10"), "math::pow(2,10)");
        assert_eq!(prepare("1,5 ^ 2 + 1"), "math::pow(1.5,2) + 1");
        assert_eq!(prepare("3*4"), "3*4");
    }

    #[test]
    fn test_floatify_leaves_identifiers_alone() {
        assert_eq!(floatify("7/2"), "7.0/2.0");
        assert_eq!(floatify("1.5+2"), "1.5+2.0");
        assert_eq!(floatify("math::log2(8)"), "math::log2(8.0)");
        assert_eq!(floatify("math::pow(2,10)"), "math::pow(2.0,10.0)");
    }

    #[test]
    fn test_floatify_keeps_signed_exponents() {
        assert_eq!(floatify("1e-5*2"), "1e-5*2.0");
        assert_eq!(floatify("1E+3"), "1E+3");
        assert_eq!(floatify("2.5e10-1"), "2.5e10-1.0");
        assert_eq!(floatify("3e"), "3e");
    }

    #[test]
    fn test_evaluate_scientific_notation() {
        let eval = ExprEvaluator;
        let value = eval.evaluate("1e-5*2").unwrap();
        assert_eq!(format_number(value), "2e-05");
    }

    #[test]
    fn test_evaluate() {
        let eval = ExprEvaluator;
        assert_eq!(eval.evaluate("1 + 2 * 3"), Ok(7.0));
        assert_eq!(eval.evaluate("7/2"), Ok(3.5));
        assert_eq!(eval.evaluate(&prepare("2^10")), Ok(1024.0));
        assert_eq!(eval.evaluate(&prepare("0,5*4")), Ok(2.0));
    }

    #[test]
    fn test_evaluate_error() {
        let eval = ExprEvaluator;
        assert!(eval.evaluate("1 +").is_err());
        assert!(eval.evaluate("foo(").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(123456.0), "123456");
        assert_eq!(format_number(1234567.0), "1.23457e+06");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001), "1e-05");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    }
}
