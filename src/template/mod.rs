use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

mod expr;


const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A scalar bound to a placeholder name.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => write!(f, "nan"),
            Value::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(x) => write!(f, "{}", float_text(*x)),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Shortest text that reads back as `x`, positional for exponents in
/// `-4..16` and `1e+20` style otherwise. Integral floats keep a trailing
/// ".0" so 7.0 never reads as the integer 7.
fn float_text(x: f64) -> String {
    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if (-4..16).contains(&exponent) {
        let positional = x.to_string();
        if positional.contains('.') {
            positional
        } else {
            positional + ".0"
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Named values used to produce one concrete variant of a templated question.
pub type VariableSet = BTreeMap<String, Value>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("undefined variable `{name}` in expression `{expression}`")]
    UndefinedVariable { name: String, expression: String },
    #[error("invalid expression `{expression}`: {message}")]
    Syntax { expression: String, message: String },
    #[error("could not evaluate `{expression}`: {message}")]
    Evaluation { expression: String, message: String },
    #[error("placeholder opened at byte {position} is never closed")]
    Unterminated { position: usize },
}

/// Substitutes every `{{ expression }}` placeholder in `template`.
///
/// Text outside placeholders is copied as-is, so a string without any
/// placeholder comes back unchanged. Runs of three or more opening braces
/// keep the extra leading braces as literal text, which lets LaTeX groups
/// such as `\frac{{{ a }}}{2}` wrap a placeholder.
pub fn resolve(template: &str, variables: &VariableSet) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        let mut open = start;
        while rest[open + OPEN.len()..].starts_with('{') {
            open += 1;
        }
        output.push_str(&rest[..open]);

        let body_start = open + OPEN.len();
        let body_length = rest[body_start..]
            .find(CLOSE)
            .ok_or(TemplateError::Unterminated {
                position: offset + open,
            })?;
        let source = &rest[body_start..body_start + body_length];
        let value = expr::evaluate(source, variables)?;
        output.push_str(&value.to_string());

        let consumed = body_start + body_length + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    output.push_str(rest);
    Ok(output)
}
