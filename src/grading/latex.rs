//! LaTeX to plain-arithmetic conversion.
//!
//! Covers the notation that shows up in final answers: fractions, roots,
//! powers, `\pi`, multiplication signs, sizing delimiters and text wrappers.
//! Any other command makes the conversion fail.

/// Nesting limit for groups and commands.
const MAX_DEPTH: usize = 64;

/// Convert a LaTeX answer to plain arithmetic, e.g. `\frac{x+1}{2}` becomes
/// `(x+1)/2`. Bare `{...}` groups are kept as-is.
pub(crate) fn latex_to_plain(src: &str) -> Option<String> {
    let mut converter = Converter {
        chars: src.chars().collect(),
        pos: 0,
        depth: 0,
    };
    converter.sequence(None)
}

struct Converter {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Converter {
    fn nested(&mut self, f: fn(&mut Self) -> Option<String>) -> Option<String> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn expect(&mut self, want: char) -> Option<()> {
        (self.bump()? == want).then_some(())
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Convert until `close` (left unconsumed) or end of input.
    fn sequence(&mut self, close: Option<char>) -> Option<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if Some(c) == close {
                return Some(out);
            }
            match c {
                '\\' => out.push_str(&self.nested(Self::command)?),
                '{' => {
                    out.push('{');
                    out.push_str(&self.nested(Self::group)?);
                    out.push('}');
                }
                '}' => return None,
                '^' => {
                    self.pos += 1;
                    let exponent = self.argument()?;
                    out.push('^');
                    out.push_str(&wrap(&exponent));
                }
                _ => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        close.is_none().then_some(out)
    }

    fn group(&mut self) -> Option<String> {
        self.expect('{')?;
        let inner = self.sequence(Some('}'))?;
        self.expect('}')?;
        Some(inner)
    }

    /// A braced group, a command, or a single character.
    fn argument(&mut self) -> Option<String> {
        self.skip_spaces();
        match self.peek()? {
            '{' => self.nested(Self::group),
            '\\' => self.nested(Self::command),
            '}' => None,
            c => {
                self.pos += 1;
                Some(c.to_string())
            }
        }
    }

    fn command(&mut self) -> Option<String> {
        self.expect('\\')?;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();

        if name.is_empty() {
            return match self.bump()? {
                ',' | ';' | ':' | '!' | ' ' => Some(String::new()),
                c @ ('{' | '}' | '%' | '$') => Some(c.to_string()),
                _ => None,
            };
        }

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.argument()?;
                let denominator = self.argument()?;
                Some(format!("{}/{}", wrap(&numerator), wrap(&denominator)))
            }
            "sqrt" => {
                self.skip_spaces();
                if self.peek() == Some('[') {
                    self.pos += 1;
                    let index = self.sequence(Some(']'))?;
                    self.expect(']')?;
                    let radicand = self.argument()?;
                    Some(format!("({})^(1/{})", radicand, wrap(&index)))
                } else {
                    let radicand = self.argument()?;
                    Some(format!("sqrt({})", radicand))
                }
            }
            "pi" => Some("pi".to_string()),
            "cdot" | "times" => Some("*".to_string()),
            "div" => Some("/".to_string()),
            "infty" => Some("inf".to_string()),
            "left" | "right" => {
                self.skip_spaces();
                if self.peek() == Some('.') {
                    self.pos += 1;
                }
                Some(String::new())
            }
            "circ" => Some(String::new()),
            "quad" | "qquad" => Some(" ".to_string()),
            "text" | "textbf" | "textrm" | "mathrm" | "mathbf" | "mbox" => self.argument(),
            _ => None,
        }
    }
}

/// Parenthesize anything that is not a single number or symbol.
fn wrap(s: &str) -> String {
    if !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '.') {
        s.to_string()
    } else {
        format!("({})", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_and_roots() {
        assert_eq!(latex_to_plain(r"\frac{1}{2}").unwrap(), "1/2");
        assert_eq!(latex_to_plain(r"\dfrac{x+1}{2}").unwrap(), "(x+1)/2");
        assert_eq!(latex_to_plain(r"\frac12").unwrap(), "1/2");
        assert_eq!(latex_to_plain(r"2\sqrt{3}").unwrap(), "2sqrt(3)");
        assert_eq!(latex_to_plain(r"\sqrt[3]{8}").unwrap(), "(8)^(1/3)");
        assert_eq!(
            latex_to_plain(r"\frac{\sqrt{3}}{2}").unwrap(),
            "(sqrt(3))/2"
        );
    }

    #[test]
    fn operators_delimiters_and_text() {
        assert_eq!(latex_to_plain(r"2\cdot 3\times4").unwrap(), "2* 3*4");
        assert_eq!(latex_to_plain(r"\left(1+\pi\right)").unwrap(), "(1+pi)");
        assert_eq!(latex_to_plain(r"x^{n+1}").unwrap(), "x^(n+1)");
        assert_eq!(latex_to_plain(r"2^{10}").unwrap(), "2^10");
        assert_eq!(latex_to_plain(r"\text{5}").unwrap(), "5");
        assert_eq!(latex_to_plain(r"1\,000").unwrap(), "1000");
    }

    #[test]
    fn unknown_commands_and_unbalanced_braces_fail() {
        assert!(latex_to_plain(r"\alpha").is_none());
        assert!(latex_to_plain(r"\frac{1}{2").is_none());
        assert!(latex_to_plain(r"1}").is_none());
        assert!(latex_to_plain("\\").is_none());
    }

    #[test]
    fn deep_nesting_fails_cleanly() {
        let within = format!("{}2{}", r"\sqrt{".repeat(MAX_DEPTH / 4), "}".repeat(MAX_DEPTH / 4));
        assert!(latex_to_plain(&within).is_some());

        let roots = format!("{}x{}", r"\sqrt{".repeat(3_000), "}".repeat(3_000));
        assert!(latex_to_plain(&roots).is_none());
        let braces = format!("{}x{}", "{".repeat(100_000), "}".repeat(100_000));
        assert!(latex_to_plain(&braces).is_none());
        assert!(latex_to_plain(&r"\sqrt".repeat(100_000)).is_none());
        assert!(latex_to_plain(&format!("{}1", r"\sqrt[".repeat(1_000))).is_none());
    }
}
