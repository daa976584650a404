// src/notation.rs

//! Twisty-puzzle move notation: just enough structure to invert an
//! algorithm written in a sheet cell.
//!
//! Supported forms, freely nested:
//!  - moves: `R`, `U'`, `R2`, `R2'`, `Rw`, `2R`, `2-3Rw`, `x`, `M'`
//!  - groupings with an optional amount: `(R U)2'`
//!  - commutators `[A, B]` and conjugates `[A: B]`
//!  - pauses: `.`
//!  - line comments: `// text`, up to the end of the line
//!
//! Moves may be run together (`RUR'`); printing separates units with a
//! single space, or a newline after a comment.

use std::{fmt, str::FromStr};

use crate::error::NotationError;

/// A single move: optional layer prefix, family and signed amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub prefix: Option<String>,
    pub family: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Move(Move),
    Grouping { alg: Alg, amount: i32 },
    Commutator { a: Alg, b: Alg },
    Conjugate { a: Alg, b: Alg },
    Pause,
    /// Text after `//`, without the line break.
    Comment(String),
}

/// A sequence of units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alg {
    pub units: Vec<Unit>,
}

impl Move {
    pub fn invert(&self) -> Move {
        Move {
            prefix: self.prefix.clone(),
            family: self.family.clone(),
            amount: -self.amount,
        }
    }
}

impl Unit {
    pub fn invert(&self) -> Unit {
        match self {
            Unit::Move(m) => Unit::Move(m.invert()),
            Unit::Grouping { alg, amount } => Unit::Grouping {
                alg: alg.invert(),
                amount: *amount,
            },
            // [A, B]⁻¹ = B A B' A' = [B, A]
            Unit::Commutator { a, b } => Unit::Commutator {
                a: b.clone(),
                b: a.clone(),
            },
            // [A: B]⁻¹ = A B' A' = [A: B']
            Unit::Conjugate { a, b } => Unit::Conjugate {
                a: a.clone(),
                b: b.invert(),
            },
            Unit::Pause => Unit::Pause,
            Unit::Comment(text) => Unit::Comment(text.clone()),
        }
    }
}

impl Alg {
    fn ends_with_comment(&self) -> bool {
        matches!(self.units.last(), Some(Unit::Comment(_)))
    }

    /// Reverse the sequence and invert every unit.
    pub fn invert(&self) -> Alg {
        Alg {
            units: self.units.iter().rev().map(Unit::invert).collect(),
        }
    }
}

/// Parse `notation` and print its inverse. Empty input inverts to empty.
pub fn invert(notation: &str) -> Result<String, NotationError> {
    Ok(notation.parse::<Alg>()?.invert().to_string())
}

// ─── printing ────────────────────────────────────────────────────────

fn write_amount(f: &mut fmt::Formatter<'_>, amount: i32) -> fmt::Result {
    let magnitude = amount.unsigned_abs();
    if magnitude != 1 {
        write!(f, "{}", magnitude)?;
    }
    if amount < 0 {
        f.write_str("'")?;
    }
    Ok(())
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        f.write_str(&self.family)?;
        write_amount(f, self.amount)
    }
}

/// A nested alg, closed off with a line break if it ends in a comment so the
/// following delimiter is not swallowed.
struct Nested<'a>(&'a Alg);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        if self.0.ends_with_comment() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Move(m) => write!(f, "{}", m),
            Unit::Grouping { alg, amount } => {
                write!(f, "({})", Nested(alg))?;
                write_amount(f, *amount)
            }
            Unit::Commutator { a, b } => write!(f, "[{}, {}]", Nested(a), Nested(b)),
            Unit::Conjugate { a, b } => write!(f, "[{}: {}]", Nested(a), Nested(b)),
            Unit::Pause => f.write_str("."),
            Unit::Comment(text) => write!(f, "//{}", text),
        }
    }
}

impl fmt::Display for Alg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<&Unit> = None;
        for unit in &self.units {
            match prev {
                None => {}
                Some(Unit::Comment(_)) => f.write_str("\n")?,
                Some(_) => f.write_str(" ")?,
            }
            write!(f, "{}", unit)?;
            prev = Some(unit);
        }
        Ok(())
    }
}

// ─── parsing ─────────────────────────────────────────────────────────

impl FromStr for Alg {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let alg = parser.alg(&[])?;
        match parser.peek() {
            None => Ok(alg),
            Some(_) => Err(parser.unexpected("end of notation")),
        }
    }
}

fn is_prime(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn unexpected(&self, expected: &'static str) -> NotationError {
        match self.chars.get(self.pos) {
            Some(&(pos, found)) => NotationError::Unexpected { found, pos },
            None => NotationError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), NotationError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn digits(&mut self) -> &'a str {
        let src = self.src;
        let start = self.offset();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        &src[start..self.offset()]
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(i, _)| i)
            .unwrap_or(self.src.len())
    }

    /// Units up to (not including) end of input or one of `stop`.
    fn alg(&mut self, stop: &[char]) -> Result<Alg, NotationError> {
        let mut units = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(c) if stop.contains(&c) => break,
                Some(_) => units.push(self.unit()?),
            }
        }
        Ok(Alg { units })
    }

    fn unit(&mut self) -> Result<Unit, NotationError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let alg = self.alg(&[')'])?;
                self.expect(')', "`)`")?;
                let amount = self.amount()?;
                Ok(Unit::Grouping { alg, amount })
            }
            Some('[') => {
                self.pos += 1;
                let a = self.alg(&[',', ':'])?;
                let sep = self.bump();
                let b = self.alg(&[']'])?;
                self.expect(']', "`]`")?;
                match sep {
                    Some(',') => Ok(Unit::Commutator { a, b }),
                    _ => Ok(Unit::Conjugate { a, b }),
                }
            }
            Some('.') => {
                self.pos += 1;
                Ok(Unit::Pause)
            }
            Some('/') => {
                self.pos += 1;
                self.expect('/', "`//`")?;
                let src = self.src;
                let start = self.offset();
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
                Ok(Unit::Comment(src[start..self.offset()].to_string()))
            }
            Some(c) if c.is_ascii_alphanumeric() => Ok(Unit::Move(self.single_move()?)),
            _ => Err(self.unexpected("a move")),
        }
    }

    fn single_move(&mut self) -> Result<Move, NotationError> {
        let src = self.src;
        let start = self.offset();
        self.digits();
        if self.peek() == Some('-') {
            self.pos += 1;
            if self.digits().is_empty() {
                return Err(self.unexpected("an inner layer number"));
            }
        }
        let prefix = &src[start..self.offset()];

        let family_start = self.offset();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => self.pos += 1,
            _ => return Err(self.unexpected("a move family")),
        }
        let is_outer = src[family_start..].starts_with(|c: char| c.is_ascii_uppercase());
        if is_outer && self.peek() == Some('w') {
            self.pos += 1;
        }
        let family = &src[family_start..self.offset()];

        Ok(Move {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            family: family.to_string(),
            amount: self.amount()?,
        })
    }

    /// Optional digits followed by an optional prime; `1` when both absent.
    fn amount(&mut self) -> Result<i32, NotationError> {
        let digits = self.digits();
        let magnitude = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<i32>()
                .map_err(|_| NotationError::Amount(digits.to_string()))?
        };
        if self.peek().is_some_and(is_prime) {
            self.pos += 1;
            Ok(-magnitude)
        } else {
            Ok(magnitude)
        }
    }
}
