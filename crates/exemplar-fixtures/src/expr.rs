//! Reflective expressions.
//!
//! An expression is a literal (`nil`, `true`, `false`, an integer or a
//! double-quoted string) or a constant path such as `ClassPEFixtures::A`,
//! followed by any number of `.method` calls. Supported methods are `class`,
//! `superclass`, `singleton_class`, `new` and `name`; an empty argument list
//! `()` is accepted after any of them.

use core::fmt;
use core::iter::Peekable;
use core::str::Chars;

use exemplar_core::{FixtureError, Reflect, Value};

use crate::namespace::Namespace;

/// A reflective method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Class of the receiver.
    Class,
    /// Superclass of the receiver.
    Superclass,
    /// Singleton class of the receiver.
    SingletonClass,
    /// Fresh instance of the receiver.
    New,
    /// Name of the receiver.
    Name,
}

impl Method {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "class" => Some(Self::Class),
            "superclass" => Some(Self::Superclass),
            "singleton_class" => Some(Self::SingletonClass),
            "new" => Some(Self::New),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    /// Method name as written in expressions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Superclass => "superclass",
            Self::SingletonClass => "singleton_class",
            Self::New => "new",
            Self::Name => "name",
        }
    }

    fn apply<R: Reflect + ?Sized>(self, reflect: &mut R, receiver: &Value) -> Result<Value, FixtureError> {
        match self {
            Self::Class => reflect.class_of(receiver),
            Self::Superclass => reflect.superclass_of(receiver),
            Self::SingletonClass => reflect.identity_descriptor(receiver),
            Self::New => reflect.instantiate(receiver),
            Self::Name => reflect.name_of(receiver),
        }
    }
}

/// Start of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Literal primitive value.
    Literal(Value),
    /// Constant path, one segment per `::`-separated name.
    Constant(Vec<String>),
}

/// A parsed reflective expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    text: String,
    receiver: Receiver,
    calls: Vec<Method>,
}

impl Expr {
    /// Parse an expression.
    ///
    /// # Errors
    /// Returns [`FixtureError::Parse`] if the text is not a valid expression.
    pub fn parse(text: &str) -> Result<Self, FixtureError> {
        let parse_error = |reason: String| FixtureError::Parse {
            expression: text.to_owned(),
            reason,
        };
        let tokens = tokenize(text).map_err(parse_error)?;
        let (receiver, calls) = parse_tokens(tokens).map_err(parse_error)?;
        Ok(Self {
            text: text.trim().to_owned(),
            receiver,
            calls,
        })
    }

    /// Source text, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Receiver the calls start from.
    pub const fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Method calls, in order.
    pub fn calls(&self) -> &[Method] {
        &self.calls
    }

    /// Evaluate against a reflective capability and a namespace.
    ///
    /// # Errors
    /// Returns an error if a constant is unknown or a call is unsupported.
    pub fn evaluate<R: Reflect + ?Sized>(
        &self,
        reflect: &mut R,
        namespace: &Namespace,
    ) -> Result<Value, FixtureError> {
        let mut value = match &self.receiver {
            Receiver::Literal(literal) => literal.clone(),
            Receiver::Constant(path) => namespace.resolve(path)?,
        };
        for method in &self.calls {
            value = method.apply(reflect, &value)?;
        }
        Ok(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    PathSep,
    Dot,
    OpenParen,
    CloseParen,
}

impl fmt::Display for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(ident) => write!(formatter, "`{ident}`"),
            Self::Int(number) => write!(formatter, "`{number}`"),
            Self::Str(text) => write!(formatter, "{text:?}"),
            Self::PathSep => formatter.write_str("`::`"),
            Self::Dot => formatter.write_str("`.`"),
            Self::OpenParen => formatter.write_str("`(`"),
            Self::CloseParen => formatter.write_str("`)`"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&current) = chars.peek() {
        match current {
            space if space.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            ':' => {
                chars.next();
                if chars.next_if_eq(&':').is_none() {
                    return Err("expected `::`".to_owned());
                }
                tokens.push(Token::PathSep);
            }
            '"' => {
                chars.next();
                tokens.push(Token::Str(lex_string(&mut chars)?));
            }
            '-' | '0'..='9' => tokens.push(Token::Int(lex_int(&mut chars)?)),
            letter if letter.is_ascii_alphabetic() || letter == '_' => {
                let mut ident = String::new();
                while let Some(next) =
                    chars.next_if(|candidate| candidate.is_ascii_alphanumeric() || *candidate == '_')
                {
                    ident.push(next);
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(tokens)
}

fn lex_string(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_owned()),
            Some('"') => return Ok(text),
            Some('\\') => match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(escaped @ ('"' | '\\')) => text.push(escaped),
                Some(other) => return Err(format!("unknown escape `\\{other}`")),
                None => return Err("unterminated string literal".to_owned()),
            },
            Some(other) => text.push(other),
        }
    }
}

fn lex_int(chars: &mut Peekable<Chars<'_>>) -> Result<i64, String> {
    let mut digits = String::new();
    if let Some(sign) = chars.next_if_eq(&'-') {
        digits.push(sign);
    }
    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
        digits.push(digit);
    }
    digits
        .parse()
        .map_err(|error| format!("invalid integer `{digits}`: {error}"))
}

fn is_constant_name(name: &str) -> bool {
    name.chars().next().is_some_and(|first| first.is_ascii_uppercase())
}

/// Whether `name` is a single constant segment an expression can refer to,
/// such as `AInstance`.
pub(crate) fn is_constant_identifier(name: &str) -> bool {
    is_constant_name(name)
        && name
            .chars()
            .all(|letter| letter.is_ascii_alphanumeric() || letter == '_')
}

/// Whether `path` is a `::`-separated constant path such as `Outer::Inner`.
pub(crate) fn is_constant_path(path: &str) -> bool {
    path.split("::").all(is_constant_identifier)
}

fn parse_tokens(tokens: Vec<Token>) -> Result<(Receiver, Vec<Method>), String> {
    let mut tokens = tokens.into_iter().peekable();
    let receiver = match tokens.next() {
        None => return Err("empty expression".to_owned()),
        Some(Token::Int(number)) => Receiver::Literal(Value::Int(number)),
        Some(Token::Str(text)) => Receiver::Literal(Value::Str(text)),
        Some(Token::Ident(ident)) => match ident.as_str() {
            "nil" => Receiver::Literal(Value::Nil),
            "true" => Receiver::Literal(Value::Bool(true)),
            "false" => Receiver::Literal(Value::Bool(false)),
            _ if is_constant_name(&ident) => {
                let mut path = vec![ident];
                while tokens.next_if_eq(&Token::PathSep).is_some() {
                    match tokens.next() {
                        Some(Token::Ident(segment)) if is_constant_name(&segment) => {
                            path.push(segment);
                        }
                        _ => return Err("expected constant name after `::`".to_owned()),
                    }
                }
                Receiver::Constant(path)
            }
            _ => return Err(format!("`{ident}` is not a constant or literal")),
        },
        Some(token) => return Err(format!("unexpected {token}")),
    };

    let mut calls = Vec::new();
    while let Some(token) = tokens.next() {
        if token != Token::Dot {
            return Err(format!("expected `.`, found {token}"));
        }
        let name = match tokens.next() {
            Some(Token::Ident(name)) => name,
            Some(other) => return Err(format!("expected method name, found {other}")),
            None => return Err("expected method name after `.`".to_owned()),
        };
        let method = Method::from_name(&name).ok_or_else(|| format!("unsupported method `{name}`"))?;
        if tokens.next_if_eq(&Token::OpenParen).is_some()
            && tokens.next_if_eq(&Token::CloseParen).is_none()
        {
            return Err(format!("`{name}` takes no arguments"));
        }
        calls.push(method);
    }
    Ok((receiver, calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exemplar_core::ObjectSpace;

    fn class_pe() -> (ObjectSpace, Namespace) {
        let mut space = ObjectSpace::new();
        let class_a = space.define_class(Some("ClassPEFixtures::A"), None).unwrap();
        let class_b = space
            .define_class(Some("ClassPEFixtures::B"), Some(class_a))
            .unwrap();
        let instance = space.new_instance(class_a).unwrap();
        let mut namespace = Namespace::with_builtins(Some("ClassPEFixtures".to_owned()), &space);
        namespace.define("ClassPEFixtures::A", Value::Object(class_a));
        namespace.define("ClassPEFixtures::B", Value::Object(class_b));
        namespace.define("ClassPEFixtures::AInstance", Value::Object(instance));
        (space, namespace)
    }

    #[test]
    fn test_parse_constant_path_with_calls() {
        let expr = Expr::parse("ClassPEFixtures::A.new.class").unwrap();
        assert_eq!(
            expr.receiver(),
            &Receiver::Constant(vec!["ClassPEFixtures".to_owned(), "A".to_owned()])
        );
        assert_eq!(expr.calls(), &[Method::New, Method::Class]);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(Expr::parse("nil").unwrap().receiver(), &Receiver::Literal(Value::Nil));
        assert_eq!(Expr::parse("-42").unwrap().receiver(), &Receiver::Literal(Value::Int(-42)));
        assert_eq!(
            Expr::parse(r#""Class\"PE""#).unwrap().receiver(),
            &Receiver::Literal(Value::from("Class\"PE"))
        );
        assert_eq!(Expr::parse(" true.class ").unwrap().calls(), &[Method::Class]);
    }

    #[test]
    fn test_parse_accepts_empty_argument_lists() {
        let expr = Expr::parse("A.new().singleton_class()").unwrap();
        assert_eq!(expr.calls(), &[Method::New, Method::SingletonClass]);
    }

    #[test]
    fn test_parse_errors() {
        for text in ["", "a.class", "A.", "A.frobnicate", "A::b", "A:B", "A.new(1)", "\"open", "A B"] {
            assert!(
                matches!(Expr::parse(text), Err(FixtureError::Parse { .. })),
                "`{text}` should not parse"
            );
        }
    }

    #[test]
    fn test_evaluate_class_pe_examples() {
        let (mut space, namespace) = class_pe();
        let class_a = namespace.resolve(&["ClassPEFixtures".to_owned(), "A".to_owned()]).unwrap();

        let superclass = Expr::parse("ClassPEFixtures::B.superclass").unwrap();
        assert_eq!(superclass.evaluate(&mut space, &namespace).unwrap(), class_a);

        let new_class = Expr::parse("ClassPEFixtures::A.new.class").unwrap();
        assert_eq!(new_class.evaluate(&mut space, &namespace).unwrap(), class_a);

        let singleton = Expr::parse("ClassPEFixtures::AInstance.singleton_class").unwrap();
        let first = singleton.evaluate(&mut space, &namespace).unwrap();
        let second = singleton.evaluate(&mut space, &namespace).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unqualified_names_resolve_in_module() {
        let (mut space, namespace) = class_pe();
        let name = Expr::parse("B.superclass.name").unwrap();
        assert_eq!(
            name.evaluate(&mut space, &namespace).unwrap(),
            Value::from("ClassPEFixtures::A")
        );
    }

    #[test]
    fn test_unknown_constant() {
        let (mut space, namespace) = class_pe();
        let expr = Expr::parse("ClassPEFixtures::C.superclass").unwrap();
        assert_eq!(
            expr.evaluate(&mut space, &namespace).unwrap_err(),
            FixtureError::UnknownEntity("ClassPEFixtures::C".to_owned())
        );
    }

    #[test]
    fn test_unsupported_call_on_primitive() {
        let (mut space, namespace) = class_pe();
        let expr = Expr::parse("3.superclass").unwrap();
        assert!(matches!(
            expr.evaluate(&mut space, &namespace),
            Err(FixtureError::UnsupportedOperation { .. })
        ));
    }
}
