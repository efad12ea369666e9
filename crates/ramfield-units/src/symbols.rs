//! Unit symbol table and expression parser.
//!
//! [`UnitSymbols`] maps identifiers to a dimension vector and a CGS scale.
//! [`UnitSymbols::cgs`] seeds the usual laboratory and astronomical units;
//! datasets extend a copy with their own `code_*` symbols.
//!
//! # Grammar
//!
//! ```text
//! expr     := term (('*' | '/') term)*
//! term     := atom (('**' | '^') exponent)?
//! atom     := IDENT | NUMBER | '(' expr ')'
//! exponent := ('-' | '+')? INT | '(' ('-' | '+')? INT ('/' INT)? ')'
//! ```
//!
//! The empty string and `dimensionless` both denote the dimensionless unit.

use indexmap::IndexMap;

use crate::dimension::Dimensions;
use crate::error::UnitError;
use crate::expr::UnitExpr;
use crate::rational::Rational;

/// Definition of one symbol.
#[derive(Clone, Debug, PartialEq)]
struct SymbolDef {
    dims: Dimensions,
    scale: f64,
}

/// A table of named units.
#[derive(Clone, Debug, Default)]
pub struct UnitSymbols {
    table: IndexMap<String, SymbolDef>,
}

const PC_CM: f64 = 3.085_677_581_491_367_3e18;
const YR_S: f64 = 31_557_600.0;

impl UnitSymbols {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table seeded with CGS base units and common derived and
    /// astronomical units.
    pub fn cgs() -> Self {
        let mut t = Self::new();
        let l = Dimensions::from_ints(1, 0, 0, 0);
        let m = Dimensions::from_ints(0, 1, 0, 0);
        let time = Dimensions::from_ints(0, 0, 1, 0);
        let temp = Dimensions::from_ints(0, 0, 0, 1);
        let energy = Dimensions::from_ints(2, 1, -2, 0);
        let gauss = Dimensions::magnetic();

        let builtins: [(&str, Dimensions, f64); 24] = [
            ("cm", l, 1.0),
            ("m", l, 1e2),
            ("km", l, 1e5),
            ("au", l, 1.495_978_707e13),
            ("pc", l, PC_CM),
            ("kpc", l, PC_CM * 1e3),
            ("Mpc", l, PC_CM * 1e6),
            ("g", m, 1.0),
            ("kg", m, 1e3),
            ("Msun", m, 1.988_415_86e33),
            ("amu", m, 1.660_539_066_60e-24),
            ("s", time, 1.0),
            ("yr", time, YR_S),
            ("Myr", time, YR_S * 1e6),
            ("Gyr", time, YR_S * 1e9),
            ("day", time, 86_400.0),
            ("Hz", Dimensions::from_ints(0, 0, -1, 0), 1.0),
            ("K", temp, 1.0),
            ("erg", energy, 1.0),
            ("J", energy, 1e7),
            ("eV", energy, 1.602_176_634e-12),
            ("dyne", Dimensions::from_ints(1, 1, -2, 0), 1.0),
            ("gauss", gauss, 1.0),
            ("G", gauss, 1.0),
        ];
        for (name, dims, scale) in builtins {
            t.table.insert(name.to_string(), SymbolDef { dims, scale });
        }
        t
    }

    /// Define (or redefine) a symbol.
    pub fn define(&mut self, name: &str, dims: Dimensions, scale: f64) -> Result<(), UnitError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(UnitError::InvalidScale {
                name: name.to_string(),
                scale,
            });
        }
        self.table.insert(name.to_string(), SymbolDef { dims, scale });
        Ok(())
    }

    /// Define a symbol as an alias for an existing expression, keeping its
    /// dimensions and scale.
    pub fn define_as(&mut self, name: &str, expr: &UnitExpr) -> Result<(), UnitError> {
        self.define(name, *expr.dims(), expr.scale())
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Look up a single identifier.
    pub fn lookup(&self, name: &str) -> Result<UnitExpr, UnitError> {
        if name == "dimensionless" {
            return Ok(UnitExpr::dimensionless());
        }
        self.table
            .get(name)
            .map(|d| UnitExpr::symbol(name, d.dims, d.scale))
            .ok_or_else(|| UnitError::UnknownUnit {
                name: name.to_string(),
            })
    }

    /// Parse a unit expression such as `"code_mass / code_time"` or
    /// `"erg * cm**3 /s/K"`.
    pub fn parse(&self, input: &str) -> Result<UnitExpr, UnitError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(UnitExpr::dimensionless());
        }
        let tokens = tokenize(trimmed).map_err(|reason| UnitError::Parse {
            input: input.to_string(),
            reason,
        })?;
        let mut parser = Parser {
            symbols: self,
            tokens: &tokens,
            pos: 0,
            input,
        };
        let expr = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(parser.error(format!("unexpected token {:?}", tokens[parser.pos])));
        }
        Ok(expr)
    }
}

// ── Tokenizer ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
    Minus,
    Plus,
}

fn tokenize(s: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push(Token::Pow);
                i += 2;
            }
            '*' => {
                out.push(Token::Star);
                i += 1;
            }
            '^' => {
                out.push(Token::Pow);
                i += 1;
            }
            '/' => {
                out.push(Token::Slash);
                i += 1;
            }
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            '-' => {
                out.push(Token::Minus);
                i += 1;
            }
            '+' => {
                out.push(Token::Plus);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let v: f64 = text
                    .parse()
                    .map_err(|_| format!("invalid number '{text}'"))?;
                out.push(Token::Number(v));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                out.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(out)
}

// ── Parser ─────────────────────────────────────────────────────────

struct Parser<'a> {
    symbols: &'a UnitSymbols,
    tokens: &'a [Token],
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: String) -> UnitError {
        UnitError::Parse {
            input: self.input.to_string(),
            reason,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn expect(&mut self, want: Token) -> Result<(), UnitError> {
        match self.bump() {
            Some(t) if *t == want => Ok(()),
            Some(t) => Err(self.error(format!("expected {want:?}, found {t:?}"))),
            None => Err(self.error(format!("expected {want:?}, found end of input"))),
        }
    }

    fn expr(&mut self) -> Result<UnitExpr, UnitError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc = acc.multiply(&self.term()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    acc = acc.divide(&self.term()?)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<UnitExpr, UnitError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let n = self.exponent()?;
            return base.pow(n);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<UnitExpr, UnitError> {
        match self.bump().cloned() {
            Some(Token::Ident(name)) => self.symbols.lookup(&name),
            Some(Token::Number(v)) => Ok(UnitExpr::dimensionless().scaled(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(t) => Err(self.error(format!("unexpected token {t:?}"))),
            None => Err(self.error("unexpected end of input".to_string())),
        }
    }

    fn signed_int(&mut self) -> Result<i32, UnitError> {
        let negative = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                true
            }
            Some(Token::Plus) => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        match self.bump().cloned() {
            Some(Token::Number(v)) if v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => {
                let n = v as i32;
                Ok(if negative { -n } else { n })
            }
            Some(t) => Err(self.error(format!("expected integer exponent, found {t:?}"))),
            None => Err(self.error("missing exponent".to_string())),
        }
    }

    fn exponent(&mut self) -> Result<Rational, UnitError> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let num = self.signed_int()?;
            let den = if self.peek() == Some(&Token::Slash) {
                self.pos += 1;
                self.signed_int()?
            } else {
                1
            };
            self.expect(Token::RParen)?;
            return Rational::new(num, den)
                .ok_or_else(|| self.error("zero denominator in exponent".to_string()));
        }
        Ok(Rational::integer(self.signed_int()?))
    }
}
