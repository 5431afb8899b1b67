//! Answer extraction and grading for math problems.
//!
//! `extract_answer` pulls the final boxed answer out of a model response;
//! the two graders compare it against a reference answer. `grade_answer_mathd`
//! is strict string equality after MATH-dataset canonicalization,
//! `grade_answer_sympy` also accepts algebraically equivalent answers.

mod expr;
mod latex;
mod normalize;

use normalize::{mathd_normalize, normalize, str_is_int, strip_thousands_commas};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static SIMPLE_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+.?/0*[1-9][0-9]*.?$").expect("valid regex"));

const TUPLE_CHARS: &[char] = &['(', ')', '[', ']'];

const BOX_MARKERS: &[&str] = &[r"\boxed", r"\fbox"];

/// Answers longer than this (in bytes) are never graded equivalent.
pub const MAX_ANSWER_LEN: usize = 1024;

// ----- Extraction -----

/// The contents of the last `\boxed{...}` (or `\fbox{...}`) in `text`.
///
/// Braces are matched, so nested groups survive. The unbraced form
/// `\boxed 42` runs up to the next `$`. Returns `None` when there is no box
/// or its braces never close.
pub fn extract_answer(text: &str) -> Option<String> {
    let (start, marker) = BOX_MARKERS
        .iter()
        .filter_map(|m| text.rfind(m).map(|idx| (idx, *m)))
        .max_by_key(|(idx, _)| *idx)?;
    let rest = &text[start + marker.len()..];

    if let Some(spaced) = rest.strip_prefix(' ') {
        let answer = spaced.split('$').next().unwrap_or_default();
        return Some(answer.trim().to_string());
    }

    let body = rest.strip_prefix('{')?;
    let mut depth = 1usize;
    for (idx, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body[..idx].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

// ----- Grading -----

/// Which grader to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMethod {
    Mathd,
    Sympy,
    /// Correct if either grader accepts.
    #[default]
    Either,
}

impl GradingMethod {
    pub fn grade(self, candidate: &str, reference: &str) -> bool {
        match self {
            Self::Mathd => grade_answer_mathd(candidate, reference),
            Self::Sympy => grade_answer_sympy(candidate, reference),
            Self::Either => {
                grade_answer_mathd(candidate, reference) || grade_answer_sympy(candidate, reference)
            }
        }
    }
}

impl fmt::Display for GradingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mathd => write!(f, "mathd"),
            Self::Sympy => write!(f, "sympy"),
            Self::Either => write!(f, "either"),
        }
    }
}

impl FromStr for GradingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mathd" => Ok(Self::Mathd),
            "sympy" => Ok(Self::Sympy),
            "either" => Ok(Self::Either),
            other => Err(format!(
                "unknown grading method '{}' (expected mathd, sympy or either)",
                other
            )),
        }
    }
}

/// Exact match after MATH-dataset canonicalization of both answers.
pub fn grade_answer_mathd(candidate: &str, reference: &str) -> bool {
    mathd_normalize(candidate) == mathd_normalize(reference)
}

/// Match after loose normalization, element-wise for tuples and intervals,
/// falling back to numeric equivalence of the two expressions.
///
/// Plain fractions such as `3/4` must match textually, and an integer
/// answer never matches a non-integer one.
pub fn grade_answer_sympy(candidate: &str, reference: &str) -> bool {
    if candidate.len() > MAX_ANSWER_LEN || reference.len() > MAX_ANSWER_LEN {
        return false;
    }
    let reference = normalize(reference);
    let candidate = normalize(candidate);

    if reference.is_empty() || candidate.is_empty() {
        return false;
    }
    if reference == candidate {
        return true;
    }

    let expected = split_tuple(&reference);
    let given = split_tuple(&candidate);

    if expected.len() > 1
        && (reference.chars().next() != candidate.chars().next()
            || reference.chars().last() != candidate.chars().last())
    {
        return false;
    }
    if expected.len() != given.len() {
        return false;
    }

    expected
        .iter()
        .zip(&given)
        .all(|(want, got)| elements_match(want, got))
}

fn elements_match(want: &str, got: &str) -> bool {
    if want == got {
        return true;
    }
    if is_fraction(want) && is_fraction(got) {
        return false;
    }
    if str_is_int(want) != str_is_int(got) {
        return false;
    }
    expr::equivalent(want, got)
}

fn is_fraction(expr: &str) -> bool {
    SIMPLE_FRACTION.is_match(expr)
}

/// `(1,2)` and `[1,2)` split into elements; anything else is one element.
fn split_tuple(expr: &str) -> Vec<String> {
    let expr = strip_thousands_commas(expr);
    let chars: Vec<char> = expr.chars().collect();
    if chars.len() > 2
        && TUPLE_CHARS.contains(&chars[0])
        && TUPLE_CHARS.contains(&chars[chars.len() - 1])
    {
        let inner: String = chars[1..chars.len() - 1].iter().collect();
        if !inner.contains(TUPLE_CHARS) {
            return inner.split(',').map(|e| e.trim().to_string()).collect();
        }
    }
    vec![expr]
}
