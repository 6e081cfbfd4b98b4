//! Textual tuples and patterns.
//!
//! A tuple is a comma-separated list of values, optionally wrapped in
//! parentheses: `("qqq", 777, 1.5)`. Integers are an optional sign followed by
//! digits, floats additionally contain a `.` or an exponent, strings are
//! double-quoted with `\"`, `\\`, `\n` and `\t` escapes. Patterns may also use
//! the wildcards `?int`, `?float` and `?str`.

use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use crate::errors::{Error, ErrorKind, Result};
use crate::pattern::{Field, Pattern};
use crate::tuple::Tuple;
use crate::value::{Kind, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Comma,
    Value(Value),
    Wildcard(Kind),
}

/// Splits text into [`Token`]s, each paired with its byte offset.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn string(&mut self, start: usize) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                None => bail!(ErrorKind::UnterminatedString(start)),
                Some((_, '"')) => return Ok(Token::Value(Value::S(text))),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, '"')) => text.push('"'),
                    Some((_, '\\')) => text.push('\\'),
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((offset, other)) => {
                        bail!(ErrorKind::UnexpectedCharacter(other, offset))
                    }
                    None => bail!(ErrorKind::UnterminatedString(start)),
                },
                Some((_, c)) => text.push(c),
            }
        }
    }

    fn number(&mut self, start: usize) -> Result<Token> {
        let mut end = start;
        let mut previous = ' ';
        while let Some(&(offset, c)) = self.chars.peek() {
            let sign_allowed = offset == start || previous == 'e' || previous == 'E';
            let accepted = c.is_ascii_digit()
                || c == '.'
                || c == 'e'
                || c == 'E'
                || ((c == '-' || c == '+') && sign_allowed);
            if !accepted {
                break;
            }
            previous = c;
            end = offset + c.len_utf8();
            self.chars.next();
        }

        let text = &self.input[start..end];
        let is_float = text.contains(|c: char| c == '.' || c == 'e' || c == 'E');
        let value = if is_float {
            text.parse::<f64>().ok().map(Value::F)
        } else {
            text.parse::<i64>().ok().map(Value::I)
        };
        match value {
            Some(value) => Ok(Token::Value(value)),
            None => bail!(ErrorKind::InvalidNumber(String::from(text), start)),
        }
    }

    fn wildcard(&mut self, start: usize) -> Result<Token> {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        match name.as_str() {
            "int" => Ok(Token::Wildcard(Kind::Int)),
            "float" => Ok(Token::Wildcard(Kind::Float)),
            "str" => Ok(Token::Wildcard(Kind::Str)),
            _ => bail!(ErrorKind::UnknownKind(name, start)),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }

        let (offset, c) = *self.chars.peek()?;
        let token = match c {
            '(' | ')' | ',' => {
                self.chars.next();
                Ok(match c {
                    '(' => Token::OpenParen,
                    ')' => Token::CloseParen,
                    _ => Token::Comma,
                })
            }
            '"' => {
                self.chars.next();
                self.string(offset)
            }
            '?' => {
                self.chars.next();
                self.wildcard(offset)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(offset),
            other => {
                self.chars.next();
                Err(ErrorKind::UnexpectedCharacter(other, offset).into())
            }
        };
        Some(token.map(|token| (offset, token)))
    }
}

/// Parses a list of pattern fields; tuples are patterns without wildcards.
fn parse_fields(input: &str) -> Result<Vec<(usize, Field)>> {
    let tokens = Lexer::new(input).collect::<Result<Vec<(usize, Token)>>>()?;
    let mut tokens = tokens.into_iter().peekable();

    let parenthesized = matches!(tokens.peek(), Some((_, Token::OpenParen)));
    if parenthesized {
        tokens.next();
    }

    let mut fields = Vec::new();
    let mut closed = false;
    loop {
        match tokens.next() {
            None => break,
            Some((_, Token::CloseParen)) if parenthesized => {
                closed = true;
                break;
            }
            Some((offset, Token::Value(value))) => fields.push((offset, Field::Literal(value))),
            Some((offset, Token::Wildcard(kind))) => fields.push((offset, Field::Wildcard(kind))),
            Some((offset, token)) => bail!(unexpected(input, offset, &token)),
        }
        match tokens.next() {
            None => break,
            Some((_, Token::Comma)) => {}
            Some((_, Token::CloseParen)) if parenthesized => {
                closed = true;
                break;
            }
            Some((offset, token)) => bail!(unexpected(input, offset, &token)),
        }
    }

    if parenthesized && !closed {
        bail!(ErrorKind::UnexpectedEnd(input.len()));
    }
    if let Some((offset, _)) = tokens.next() {
        bail!(ErrorKind::TrailingInput(offset));
    }
    Ok(fields)
}

fn unexpected(input: &str, offset: usize, token: &Token) -> ErrorKind {
    let found = input[offset..].chars().next().unwrap_or(' ');
    match token {
        Token::Wildcard(_) | Token::Value(_) => ErrorKind::TrailingInput(offset),
        _ => ErrorKind::UnexpectedCharacter(found, offset),
    }
}

/// Parses a tuple such as `(3, 1.2, "meow", 4)`.
pub fn parse_tuple(input: &str) -> Result<Tuple> {
    parse_fields(input)?
        .into_iter()
        .map(|(offset, field)| match field {
            Field::Literal(value) => Ok(value),
            Field::Wildcard(_) => Err(Error::from(ErrorKind::WildcardInTuple(offset))),
        })
        .collect::<Result<Vec<Value>>>()
        .map(Tuple::from_vec)
}

/// Parses a pattern such as `("qqq", ?int)`.
pub fn parse_pattern(input: &str) -> Result<Pattern> {
    let fields = parse_fields(input)?;
    Ok(Pattern::from_vec(
        fields.into_iter().map(|(_, field)| field).collect(),
    ))
}

impl FromStr for Tuple {
    type Err = Error;

    fn from_str(s: &str) -> Result<Tuple> {
        parse_tuple(s)
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Pattern> {
        parse_pattern(s)
    }
}
