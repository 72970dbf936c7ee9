//! Persisted equation text form
//!
//! One invariant per line, written as
//!
//! ```text
//! p1 + 2*p2 - p3 = 1
//! -p4 + p5 = ?
//! ```
//!
//! Terms are sorted by variable name, every term after the first carries an
//! explicit ` + ` / ` - ` separator, and a coefficient of magnitude 1 is
//! elided. An invariant without terms renders its left-hand side as `0`. The
//! right-hand side is an integer or the unknown marker `?`.
//!
//! Decoding is the exact inverse of rendering for every invariant whose
//! variable names are free of whitespace, `*`, `=`, a leading sign, and are
//! not purely numeric. It also accepts a trailing `(N)` annotation after the
//! right-hand side, as printed by PetriSpot.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::invariant::{Constant, Invariant};

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, coeff) in self.coefficients() {
            if first {
                match coeff {
                    1 => write!(f, "{}", name)?,
                    -1 => write!(f, "-{}", name)?,
                    c => write!(f, "{}*{}", c, name)?,
                }
                first = false;
            } else {
                let sign = if coeff > 0 { '+' } else { '-' };
                match coeff.unsigned_abs() {
                    1 => write!(f, " {} {}", sign, name)?,
                    c => write!(f, " {} {}*{}", sign, c, name)?,
                }
            }
        }
        if first {
            f.write_str("0")?;
        }
        write!(f, " = {}", self.constant())
    }
}

impl FromStr for Invariant {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let (lhs, rhs) = text
            .split_once('=')
            .ok_or_else(|| Error::invalid_equation(text, "missing '='"))?;
        let constant = parse_rhs(text, rhs)?;
        let terms = parse_lhs(text, lhs)?;
        Invariant::try_new(terms, constant).map_err(|e| match e {
            Error::InvalidEquation { reason, .. } => Error::invalid_equation(text, reason),
            other => other,
        })
    }
}

fn parse_rhs(text: &str, rhs: &str) -> Result<Constant> {
    let mut tokens = rhs.split_whitespace();
    let value = tokens
        .next()
        .ok_or_else(|| Error::invalid_equation(text, "missing right-hand side"))?;

    let annotation: Vec<&str> = tokens.collect();
    if !annotation.is_empty() {
        let annotation = annotation.join(" ");
        if !(annotation.starts_with('(') && annotation.ends_with(')')) {
            return Err(Error::invalid_equation(
                text,
                format!("unexpected text after right-hand side: '{}'", annotation),
            ));
        }
    }

    if value == Constant::UNKNOWN_MARKER {
        return Ok(Constant::Unknown);
    }
    value
        .parse::<i64>()
        .map(Constant::Known)
        .map_err(|_| Error::invalid_equation(text, format!("bad constant '{}'", value)))
}

fn parse_lhs(text: &str, lhs: &str) -> Result<Vec<(String, i64)>> {
    let tokens: Vec<&str> = lhs.split_whitespace().collect();
    match tokens.as_slice() {
        [] => return Err(Error::invalid_equation(text, "empty left-hand side")),
        ["0"] => return Ok(Vec::new()),
        _ => {}
    }

    let mut terms = Vec::with_capacity(tokens.len());
    // Sign carried by a standalone '+' / '-' token
    let mut pending: Option<i64> = None;
    for token in tokens {
        match token {
            "+" | "-" => {
                if pending.is_some() {
                    return Err(Error::invalid_equation(text, "two signs in a row"));
                }
                pending = Some(if token == "-" { -1 } else { 1 });
            }
            _ => {
                if pending.is_none() && !terms.is_empty() {
                    return Err(Error::invalid_equation(
                        text,
                        format!("missing sign before '{}'", token),
                    ));
                }
                terms.push(parse_term(text, token, pending.take().unwrap_or(1))?);
            }
        }
    }
    if pending.is_some() {
        return Err(Error::invalid_equation(text, "dangling sign"));
    }
    Ok(terms)
}

/// `[sign]coefficient*name` or `[sign]name`, negated when `outer` is -1
fn parse_term(text: &str, token: &str, outer: i64) -> Result<(String, i64)> {
    let (sign, body) = match token.as_bytes().first() {
        Some(b'-') => (-outer, &token[1..]),
        Some(b'+') => (outer, &token[1..]),
        _ => (outer, token),
    };

    let (coeff, name) = match body.split_once('*') {
        Some((digits, name)) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_equation(
                    text,
                    format!("bad coefficient in term '{}'", token),
                ));
            }
            // The magnitude of i64::MIN only fits once the sign is applied
            let coeff = digits
                .parse::<u64>()
                .ok()
                .and_then(|magnitude| i64::try_from(i128::from(sign) * i128::from(magnitude)).ok())
                .ok_or_else(|| {
                    Error::invalid_equation(text, format!("coefficient out of range in '{}'", token))
                })?;
            (coeff, name)
        }
        None => (sign, body),
    };

    if name.is_empty()
        || name.contains('*')
        || name.starts_with(['+', '-'])
        || name.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::invalid_equation(
            text,
            format!("bad variable name in term '{}'", token),
        ));
    }
    Ok((name.to_string(), coeff))
}
