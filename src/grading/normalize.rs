//! Answer-string normalization.
//!
//! Two flavours: [`mathd_normalize`] is the MATH dataset's string
//! canonicalization (exact comparison afterwards), [`normalize`] is the
//! looser form used before algebraic comparison.

use super::latex::latex_to_plain;
use regex::Regex;
use std::sync::LazyLock;

static TEXT_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\text\{(?P<text>.+?)\}$").expect("valid regex"));

static UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(degree|cm|centimeter|meter|mile|second|minute|hour|day|week|month|year|foot|feet|inch|yard)(es)?(s)? *(\^[0-9]+)?",
    )
    .expect("valid regex")
});

static DEGREE_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^ *\\circ").expect("valid regex"));

static THIN_SPACE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\\! *").expect("valid regex"));

static MINUS_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"- *").expect("valid regex"));

static MIXED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]) +([0-9])").expect("valid regex"));

static THOUSANDS_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)(,)(\d\d\d)($|\D)").expect("valid regex"));

// ----- MATH dataset canonicalization -----

/// Trim, unwrap a whole-answer `\text{...}`, then canonicalize.
pub(crate) fn mathd_normalize(answer: &str) -> String {
    let answer = answer.trim();
    let answer = match TEXT_WRAPPER.captures(answer) {
        Some(caps) => caps["text"].trim().to_string(),
        None => answer.to_string(),
    };
    strip_string(&answer)
}

fn strip_string(input: &str) -> String {
    let mut s = input
        .replace('\n', "")
        .replace(r"\!", "")
        .replace(r"\\", r"\")
        .replace("tfrac", "frac")
        .replace("dfrac", "frac")
        .replace(r"\left", "")
        .replace(r"\right", "")
        .replace(r"^{\circ}", "")
        .replace(r"^\circ", "")
        .replace(r"\$", "");
    s = remove_right_units(s);
    s = s
        .replace(r"\%", "")
        .replace(" .", " 0.")
        .replace("{.", "{0.");

    if s.is_empty() {
        return s;
    }
    if s.starts_with('.') {
        s.insert(0, '0');
    }

    // "x = 5" and "k=5" keep only the value
    if let Some((lhs, rhs)) = s.split_once('=') {
        if !rhs.contains('=') && lhs.chars().count() <= 2 {
            s = rhs.to_string();
        }
    }

    s = fix_sqrt(&s);
    s = s.replace(' ', "");
    s = fix_fracs(&s);
    if s == "0.5" {
        s = r"\frac{1}{2}".to_string();
    }
    fix_a_slash_b(&s)
}

/// Drop a trailing `\text{ unit}`.
fn remove_right_units(s: String) -> String {
    match s.find(r"\text{ ") {
        Some(idx) => s[..idx].to_string(),
        None => s,
    }
}

/// `\sqrt2` becomes `\sqrt{2}`.
fn fix_sqrt(s: &str) -> String {
    let mut parts = s.split(r"\sqrt");
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(r"\sqrt");
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c != '{' => {
                out.push('{');
                out.push(c);
                out.push('}');
                out.push_str(chars.as_str());
            }
            _ => out.push_str(part),
        }
    }
    out
}

/// `\frac12` becomes `\frac{1}{2}` and `\frac1{2}` becomes `\frac{1}{2}`.
/// Malformed fractions leave the whole string unchanged.
fn fix_fracs(s: &str) -> String {
    let mut parts = s.split(r"\frac");
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(r"\frac");
        if part.starts_with('{') {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        let (Some(a), Some(b)) = (chars.next(), chars.next()) else {
            return s.to_string();
        };
        let rest = chars.as_str();
        if b == '{' {
            out.push('{');
            out.push(a);
            out.push('}');
            out.push('{');
            out.push_str(rest);
        } else {
            out.push('{');
            out.push(a);
            out.push_str("}{");
            out.push(b);
            out.push('}');
            out.push_str(rest);
        }
    }
    out
}

/// `3/4` becomes `\frac{3}{4}` when both sides are plain integers.
fn fix_a_slash_b(s: &str) -> String {
    let mut parts = s.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) if is_plain_int(a) && is_plain_int(b) => {
            format!(r"\frac{{{}}}{{{}}}", a, b)
        }
        _ => s.to_string(),
    }
}

fn is_plain_int(s: &str) -> bool {
    s.parse::<i64>().is_ok_and(|n| n.to_string() == s)
}

// ----- Algebraic normalization -----

/// Loose normalization before algebraic comparison: units, dollar and
/// percent signs, thousands separators and LaTeX are removed, mixed numbers
/// become sums, the result is lowercased with spaces and braces dropped, and
/// integral values are printed as integers.
pub(crate) fn normalize(expr: &str) -> String {
    let mut expr = match TEXT_WRAPPER.captures(expr) {
        Some(caps) => caps["text"].to_string(),
        None => expr.to_string(),
    };

    expr = expr
        .replace(r"\%", "%")
        .replace(r"\$", "$")
        .replace(['$', '%'], "")
        .replace(" or ", " , ")
        .replace(" and ", " , ")
        .replace("million", "*10^6")
        .replace("billion", "*10^9")
        .replace("trillion", "*10^12");

    expr = UNITS.replace_all(&expr, "").into_owned();
    expr = DEGREE_SIGN.replace_all(&expr, "").into_owned();
    expr = expr.replace(r"^{\circ}", "");

    if expr.len() >= 2 && expr.starts_with('{') && expr.ends_with('}') {
        expr = expr[1..expr.len() - 1].to_string();
    }

    expr = THIN_SPACE_COMMA.replace_all(&expr, "").into_owned();
    if let Some(n) = integral_value(&expr) {
        expr = n.to_string();
    }

    if expr.contains('\\') {
        if let Some(plain) = latex_to_plain(&expr) {
            expr = plain;
        }
    }

    expr = MINUS_SPACE.replace_all(&expr, "-").into_owned();
    expr = MIXED_NUMBER.replace_all(&expr, "${1}+${2}").into_owned();
    expr = expr.replace([' ', '{', '}'], "").to_lowercase();

    if str_is_int(&expr) {
        if let Some(n) = str_to_int(&expr) {
            expr = n.to_string();
        }
    }
    expr
}

/// `1,234,567` becomes `1234567`; other commas (tuples) are kept.
pub(crate) fn strip_thousands_commas(expr: &str) -> String {
    let mut current = expr.to_string();
    loop {
        let next = THOUSANDS_COMMA
            .replace_all(&current, "${1}${3}${4}")
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// A float that is within 1e-7 of an integer.
fn integral_value(s: &str) -> Option<i64> {
    let x: f64 = s.parse().ok()?;
    (x.is_finite() && (x - x.round()).abs() <= 1e-7 && x.abs() < 1e15).then(|| x.round() as i64)
}

/// Whether `s` (thousands separators allowed) is an integral number.
pub(crate) fn str_is_int(s: &str) -> bool {
    integral_value(&strip_thousands_commas(s)).is_some()
}

fn str_to_int(s: &str) -> Option<i64> {
    let x: f64 = s.replace(',', "").parse().ok()?;
    (x.is_finite() && x.abs() < 1e15).then(|| x.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mathd_canonical_forms() {
        assert_eq!(mathd_normalize(r" \text{5} "), "5");
        assert_eq!(mathd_normalize(r"\dfrac{1}{2}"), r"\frac{1}{2}");
        assert_eq!(mathd_normalize(r"\frac12"), r"\frac{1}{2}");
        assert_eq!(mathd_normalize(r"\frac1{2}"), r"\frac{1}{2}");
        assert_eq!(mathd_normalize("0.5"), r"\frac{1}{2}");
        assert_eq!(mathd_normalize(".5"), r"\frac{1}{2}");
        assert_eq!(mathd_normalize("3/4"), r"\frac{3}{4}");
        assert_eq!(mathd_normalize(r"\sqrt2"), r"\sqrt{2}");
        assert_eq!(mathd_normalize("x = 5"), "5");
        assert_eq!(mathd_normalize(r"90^\circ"), "90");
        assert_eq!(mathd_normalize(r"50\%"), "50");
        assert_eq!(mathd_normalize(r"\$10"), "10");
        assert_eq!(mathd_normalize(r"\left( 1, 2 \right)"), "(1,2)");
        assert_eq!(mathd_normalize(r"10\text{ cm}"), "10");
        assert_eq!(mathd_normalize(""), "");
    }

    #[test]
    fn mathd_keeps_longer_equations_and_malformed_fracs() {
        assert_eq!(mathd_normalize("abc = 5"), "abc=5");
        assert_eq!(mathd_normalize(r"\frac1"), r"\frac1");
        assert_eq!(mathd_normalize("1/2/3"), "1/2/3");
    }

    #[test]
    fn loose_normalization() {
        assert_eq!(normalize(r"\$1,000"), "1000");
        assert_eq!(normalize("5 cm^2"), "5");
        assert_eq!(normalize("10 degrees"), "10");
        assert_eq!(normalize(r"\text{Yes}"), "yes");
        assert_eq!(normalize("3.0"), "3");
        assert_eq!(normalize("2 million"), "2*10^6");
        assert_eq!(normalize(r"\frac{1}{2}"), "1/2");
        assert_eq!(normalize("2 1/2"), "2+1/2");
        assert_eq!(normalize("{(1, 2)}"), "(1,2)");
        assert_eq!(normalize(r"x \in \alpha"), r"x\in\alpha");
    }

    #[test]
    fn thousands_commas_only() {
        assert_eq!(strip_thousands_commas("1,234,567"), "1234567");
        assert_eq!(strip_thousands_commas("(1,2)"), "(1,2)");
        assert!(str_is_int("12,000"));
        assert!(!str_is_int("1.5"));
        assert!(!str_is_int("inf"));
    }
}
