//! Predicate expressions over layer records.
//!
//! Grammar, in the style of drawing-application filter expressions:
//!
//! ```text
//! or         := and ( "OR" and )*
//! and        := unary ( "AND" unary )*
//! unary      := "NOT" unary | "(" or ")" | comparison
//! comparison := FIELD ( "==" | "!=" ) value
//! ```
//!
//! Fields are `NAME`, `COLOR`, `LINETYPE`, `FROZEN`, `LOCKED` (keywords are
//! case-insensitive). Values are quoted strings or bare words; `NAME` and
//! `LINETYPE` values may contain `*` and `?` wildcards and match
//! case-insensitively. `COLOR` takes an integer, `FROZEN`/`LOCKED` take
//! `TRUE`/`FALSE`.

use regex::Regex;
use thiserror::Error;

use crate::domain::layer::LayerRecord;

#[derive(Error, Debug)]
pub enum ExprError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expected {expected}, found '{found}'")]
    Unexpected {
        expected: &'static str,
        found: String,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid color value '{0}'")]
    InvalidColor(String),

    #[error("invalid flag value '{0}' (expected TRUE or FALSE)")]
    InvalidFlag(String),

    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("trailing input after expression: '{0}'")]
    TrailingInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Color,
    Linetype,
    Frozen,
    Locked,
}

impl Field {
    fn parse(word: &str) -> Result<Self, ExprError> {
        match word.to_ascii_uppercase().as_str() {
            "NAME" => Ok(Field::Name),
            "COLOR" => Ok(Field::Color),
            "LINETYPE" => Ok(Field::Linetype),
            "FROZEN" => Ok(Field::Frozen),
            "LOCKED" => Ok(Field::Locked),
            _ => Err(ExprError::UnknownField(word.to_string())),
        }
    }
}

#[derive(Debug)]
enum Ast {
    Or(Box<Ast>, Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
    NamePattern(Regex),
    LinetypePattern(Regex),
    ColorIs(i16),
    FrozenIs(bool),
    LockedIs(bool),
}

impl Ast {
    fn eval(&self, layer: &LayerRecord) -> bool {
        match self {
            Ast::Or(a, b) => a.eval(layer) || b.eval(layer),
            Ast::And(a, b) => a.eval(layer) && b.eval(layer),
            Ast::Not(a) => !a.eval(layer),
            Ast::NamePattern(re) => re.is_match(&layer.name),
            Ast::LinetypePattern(re) => re.is_match(&layer.linetype),
            Ast::ColorIs(c) => layer.color == *c,
            Ast::FrozenIs(v) => layer.frozen == *v,
            Ast::LockedIs(v) => layer.locked == *v,
        }
    }
}

/// A parsed, evaluatable filter expression.
#[derive(Debug)]
pub struct Expression {
    ast: Ast,
    text: String,
}

impl Expression {
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let tokens = lex(text)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser.parse_or()?;
        if let Some(tok) = parser.peek() {
            return Err(ExprError::TrailingInput(tok.describe()));
        }
        Ok(Self {
            ast,
            text: text.to_string(),
        })
    }

    pub fn matches(&self, layer: &LayerRecord) -> bool {
        self.ast.eval(layer)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Str(String),
    EqEq,
    NotEq,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Str(s) => format!("\"{}\"", s),
            Token::EqEq => "==".to_string(),
            Token::NotEq => "!=".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn lex(text: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::EqEq);
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::NotEq);
                i += 2;
            }
            '"' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != '"' {
                    j += 1;
                }
                if j >= chars.len() {
                    return Err(ExprError::UnterminatedString);
                }
                tokens.push(Token::Str(chars[start..j].iter().collect()));
                i = j + 1;
            }
            c if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '*' | '?' | '-' | '_' | '.' | '$')
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn parse_or(&mut self) -> Result<Ast, ExprError> {
        let mut left = self.parse_and()?;
        while self.peek_keyword("OR") {
            self.next();
            let right = self.parse_and()?;
            left = Ast::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Ast, ExprError> {
        let mut left = self.parse_unary()?;
        while self.peek_keyword("AND") {
            self.next();
            let right = self.parse_unary()?;
            left = Ast::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Ast, ExprError> {
        if self.peek_keyword("NOT") {
            self.next();
            return Ok(Ast::Not(Box::new(self.parse_unary()?)));
        }
        if self.peek() == Some(&Token::LParen) {
            self.next();
            let inner = self.parse_or()?;
            match self.next() {
                Some(Token::RParen) => return Ok(inner),
                Some(tok) => {
                    return Err(ExprError::Unexpected {
                        expected: "')'",
                        found: tok.describe(),
                    })
                }
                None => return Err(ExprError::UnexpectedEnd),
            }
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Ast, ExprError> {
        let field = match self.next() {
            Some(Token::Word(w)) => Field::parse(&w)?,
            Some(tok) => {
                return Err(ExprError::Unexpected {
                    expected: "field name",
                    found: tok.describe(),
                })
            }
            None => return Err(ExprError::UnexpectedEnd),
        };

        let negated = match self.next() {
            Some(Token::EqEq) => false,
            Some(Token::NotEq) => true,
            Some(tok) => {
                return Err(ExprError::Unexpected {
                    expected: "'==' or '!='",
                    found: tok.describe(),
                })
            }
            None => return Err(ExprError::UnexpectedEnd),
        };

        let value = match self.next() {
            Some(Token::Word(w)) => w,
            Some(Token::Str(s)) => s,
            Some(tok) => {
                return Err(ExprError::Unexpected {
                    expected: "value",
                    found: tok.describe(),
                })
            }
            None => return Err(ExprError::UnexpectedEnd),
        };

        let comparison = match field {
            Field::Name => Ast::NamePattern(wildcard_regex(&value)?),
            Field::Linetype => Ast::LinetypePattern(wildcard_regex(&value)?),
            Field::Color => {
                let color: i16 = value
                    .parse()
                    .map_err(|_| ExprError::InvalidColor(value.clone()))?;
                Ast::ColorIs(color)
            }
            Field::Frozen => Ast::FrozenIs(parse_flag(&value)?),
            Field::Locked => Ast::LockedIs(parse_flag(&value)?),
        };

        if negated {
            Ok(Ast::Not(Box::new(comparison)))
        } else {
            Ok(comparison)
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, ExprError> {
    match value.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ExprError::InvalidFlag(value.to_string())),
    }
}

/// Compile a `*`/`?` wildcard pattern to an anchored, case-insensitive regex.
fn wildcard_regex(pattern: &str) -> Result<Regex, ExprError> {
    let mut re = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| ExprError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str) -> LayerRecord {
        LayerRecord::new(name)
    }

    #[test]
    fn given_wildcard_name_pattern_when_matching_then_prefix_matches() {
        let expr = Expression::parse("NAME == \"A-WALL*\"").unwrap();
        assert!(expr.matches(&layer("A-WALL")));
        assert!(expr.matches(&layer("A-WALL-INTR")));
        assert!(!expr.matches(&layer("A-DOOR")));
    }

    #[test]
    fn given_name_pattern_when_matching_then_case_is_ignored() {
        let expr = Expression::parse("NAME == \"a-wall*\"").unwrap();
        assert!(expr.matches(&layer("A-WALL-01")));
    }

    #[test]
    fn given_boolean_operators_when_evaluating_then_precedence_holds() {
        // AND binds tighter than OR
        let expr =
            Expression::parse("NAME == \"A*\" AND COLOR == 1 OR NAME == \"B*\"").unwrap();
        let mut a = layer("A-WALL");
        a.color = 1;
        let mut a_wrong_color = layer("A-WALL");
        a_wrong_color.color = 2;
        assert!(expr.matches(&a));
        assert!(!expr.matches(&a_wrong_color));
        assert!(expr.matches(&layer("B-GRID")));
    }

    #[test]
    fn given_not_and_parens_when_evaluating_then_negation_applies() {
        let expr = Expression::parse("NOT (NAME == \"X*\" OR NAME == \"Y*\")").unwrap();
        assert!(expr.matches(&layer("Z-REF")));
        assert!(!expr.matches(&layer("X-TEMP")));
    }

    #[test]
    fn given_flag_comparison_when_evaluating_then_flags_compare() {
        let expr = Expression::parse("FROZEN == TRUE").unwrap();
        let mut frozen = layer("A");
        frozen.frozen = true;
        assert!(expr.matches(&frozen));
        assert!(!expr.matches(&layer("A")));
    }

    #[test]
    fn given_not_equal_when_evaluating_then_inverts() {
        let expr = Expression::parse("LINETYPE != Continuous").unwrap();
        assert!(!expr.matches(&layer("A")));
        let mut dashed = layer("A");
        dashed.linetype = "Dashed".to_string();
        assert!(expr.matches(&dashed));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Expression::parse("WEIGHT == 1"),
            Err(ExprError::UnknownField(_))
        ));
        assert!(matches!(
            Expression::parse("COLOR == red"),
            Err(ExprError::InvalidColor(_))
        ));
        assert!(matches!(
            Expression::parse("NAME == \"open"),
            Err(ExprError::UnterminatedString)
        ));
        assert!(matches!(
            Expression::parse("NAME =="),
            Err(ExprError::UnexpectedEnd)
        ));
        assert!(matches!(
            Expression::parse("NAME == \"A\" garbage"),
            Err(ExprError::TrailingInput(_))
        ));
    }

    #[test]
    fn test_question_mark_wildcard() {
        let expr = Expression::parse("NAME == \"A-??\"").unwrap();
        assert!(expr.matches(&layer("A-01")));
        assert!(!expr.matches(&layer("A-001")));
    }
}
