//! Small arithmetic parser used to check answers for algebraic equivalence.
//!
//! Two expressions are equivalent when they agree at a handful of probe
//! points for their free variables. Supports `+ - * / ^` (and `**`),
//! implicit multiplication (`2x`, `3(x+1)`), parentheses and brackets,
//! `pi`, and a few named functions (`sqrt`, `sin`, `ln`, ...).

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

/// Values assigned to free variables, rotated per probe.
const PROBES: [f64; 3] = [0.618_033_988_7, 1.732_050_807_6, 2.236_067_977_5];

/// At most this many distinct letters may appear across both sides.
const MAX_FREE_LETTERS: usize = 2;

/// Nesting limit for parentheses, signs, powers and function calls.
const MAX_DEPTH: usize = 64;

/// Longer inputs are not parsed; this also bounds left-nested `a+b+...` chains.
const MAX_INPUT_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
            Self::Div => x / y,
            Self::Pow => x.powf(y),
        }
    }
}

/// Functions recognised by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Ln,
    Exp,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "ln" | "log" => Some(Self::Ln),
            "exp" => Some(Self::Exp),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Ln => x.ln(),
            Self::Exp => x.exp(),
            Self::Abs => x.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Bin(op, Box::new(lhs), Box::new(rhs))
    }

    fn collect_vars<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::Num(_) => {}
            Self::Var(name) => {
                out.insert(name);
            }
            Self::Neg(e) | Self::Call(_, e) => e.collect_vars(out),
            Self::Bin(_, a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }

    fn eval(&self, env: &BTreeMap<&str, f64>) -> Option<f64> {
        Some(match self {
            Self::Num(n) => *n,
            Self::Var(name) => *env.get(name.as_str())?,
            Self::Neg(e) => -e.eval(env)?,
            Self::Bin(op, a, b) => op.apply(a.eval(env)?, b.eval(env)?),
            Self::Call(func, e) => func.apply(e.eval(env)?),
        })
    }
}

/// Parse a plain-text arithmetic expression.
fn parse(src: &str) -> Option<Expr> {
    if src.len() > MAX_INPUT_LEN {
        return None;
    }
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    (parser.pos == parser.tokens.len()).then_some(expr)
}

/// Whether `a` and `b` evaluate to the same value at every probe point.
pub(crate) fn equivalent(a: &str, b: &str) -> bool {
    let (Some(lhs), Some(rhs)) = (parse(a), parse(b)) else {
        return false;
    };

    let mut vars = BTreeSet::new();
    lhs.collect_vars(&mut vars);
    rhs.collect_vars(&mut vars);
    let letters: BTreeSet<char> = vars.iter().flat_map(|v| v.chars()).collect();
    if letters.len() > MAX_FREE_LETTERS {
        return false;
    }

    (0..PROBES.len()).all(|probe| {
        let env: BTreeMap<&str, f64> = vars
            .iter()
            .enumerate()
            .map(|(j, &name)| (name, PROBES[(probe + j) % PROBES.len()] + 0.5 * j as f64))
            .collect();
        match (lhs.eval(&env), rhs.eval(&env)) {
            (Some(x), Some(y)) => close(x, y),
            _ => false,
        }
    })
}

fn close(x: f64, y: f64) -> bool {
    if !x.is_finite() || !y.is_finite() {
        return false;
    }
    (x - y).abs() <= 1e-6 * x.abs().max(y.abs()).max(1.0)
}

fn tokenize(src: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token::Num(text.parse().ok()?));
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            let token = match c {
                '*' if chars.get(i + 1) == Some(&'*') => {
                    i += 1;
                    Token::Op('^')
                }
                '+' | '-' | '*' | '/' | '^' => Token::Op(c),
                '(' | '[' => Token::Open,
                ')' | ']' => Token::Close,
                _ => return None,
            };
            tokens.push(token);
            i += 1;
        }
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Run `f` one nesting level deeper; `None` past [`MAX_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<BinOp> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(c)) if ops.contains(c) => {
                let op = BinOp::from_char(*c);
                self.pos += 1;
                op
            }
            _ => None,
        }
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self.tokens.get(self.pos),
            Some(Token::Num(_) | Token::Ident(_) | Token::Open)
        )
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Option<Expr> {
        let mut lhs = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            lhs = Expr::bin(op, lhs, rhs);
        }
        Some(lhs)
    }

    // term := unary (('*' | '/') unary | power)*
    fn term(&mut self) -> Option<Expr> {
        let mut lhs = self.unary()?;
        loop {
            if let Some(op) = self.eat_op(&['*', '/']) {
                let rhs = self.unary()?;
                lhs = Expr::bin(op, lhs, rhs);
            } else if self.starts_operand() {
                let rhs = self.power()?;
                lhs = Expr::bin(BinOp::Mul, lhs, rhs);
            } else {
                return Some(lhs);
            }
        }
    }

    fn unary(&mut self) -> Option<Expr> {
        match self.eat_op(&['-', '+']) {
            Some(BinOp::Sub) => Some(Expr::Neg(Box::new(self.nested(Self::unary)?))),
            Some(_) => self.nested(Self::unary),
            None => self.power(),
        }
    }

    // power := primary ('^' unary)?
    fn power(&mut self) -> Option<Expr> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.nested(Self::unary)?;
            return Some(Expr::bin(BinOp::Pow, base, exponent));
        }
        Some(base)
    }

    fn primary(&mut self) -> Option<Expr> {
        match self.next()? {
            Token::Num(n) => Some(Expr::Num(n)),
            Token::Open => {
                let inner = self.nested(Self::expr)?;
                matches!(self.next()?, Token::Close).then_some(inner)
            }
            Token::Ident(name) => {
                if let Some(func) = Func::from_name(&name) {
                    let arg = self.nested(Self::primary)?;
                    return Some(Expr::Call(func, Box::new(arg)));
                }
                if name == "pi" {
                    return Some(Expr::Num(PI));
                }
                Some(Expr::Var(name))
            }
            Token::Op(_) | Token::Close => None,
        }
    }
}
