//! A deliberately small expression language for template placeholders.
//!
//! Supported: literals, variable lookup, arithmetic, string concatenation
//! with `~`, comparisons, `and`/`or`/`not`, conditionals written either as
//! `x if cond else y` or `cond ? x : y`, and a handful of numeric helpers
//! (`round`, `abs`, `min`, `max`, `int`, `float`) callable directly or as
//! filters (`x | round(2)`). Nothing else is reachable from a question bank.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::iter::Peekable;
use std::str::CharIndices;

use super::{TemplateError, Value, VariableSet};

pub fn evaluate(source: &str, variables: &VariableSet) -> Result<Value, TemplateError> {
    let expression = source.trim();
    let failure_to_error = |failure: Failure| match failure {
        Failure::Syntax(message) => TemplateError::Syntax {
            expression: expression.to_owned(),
            message,
        },
        Failure::Undefined(name) => TemplateError::UndefinedVariable {
            name,
            expression: expression.to_owned(),
        },
        Failure::Evaluation(message) => TemplateError::Evaluation {
            expression: expression.to_owned(),
            message,
        },
    };

    let tokens = tokenize(expression).map_err(failure_to_error)?;
    let ast = Parser::new(tokens).parse().map_err(failure_to_error)?;
    eval(&ast, variables).map_err(failure_to_error)
}

#[derive(Debug)]
enum Failure {
    Syntax(String),
    Undefined(String),
    Evaluation(String),
}

type Outcome<T> = Result<T, Failure>;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Pipe,
    Question,
    Colon,
}

const TWO_CHAR_OPS: &[&str] = &["**", "//", "==", "!=", "<=", ">="];
const ONE_CHAR_OPS: &[&str] = &["+", "-", "*", "/", "%", "<", ">", "~"];

fn tokenize(source: &str) -> Outcome<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(index, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() {
            tokens.push(read_number(source, &mut chars)?);
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = index;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(source[index..end].to_owned()));
            continue;
        }

        if c == '\'' || c == '"' {
            chars.next();
            tokens.push(Token::Str(read_string(c, &mut chars)?));
            continue;
        }

        let rest = &source[index..];
        if let Some(op) = TWO_CHAR_OPS.iter().find(|op| rest.starts_with(*op)) {
            chars.next();
            chars.next();
            tokens.push(Token::Op(*op));
            continue;
        }
        if let Some(op) = ONE_CHAR_OPS.iter().find(|op| rest.starts_with(*op)) {
            chars.next();
            tokens.push(Token::Op(*op));
            continue;
        }

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '|' => Token::Pipe,
            '?' => Token::Question,
            ':' => Token::Colon,
            other => return Err(Failure::Syntax(format!("unexpected character `{}`", other))),
        };
        chars.next();
        tokens.push(token);
    }

    Ok(tokens)
}

fn read_number(source: &str, chars: &mut Peekable<CharIndices>) -> Outcome<Token> {
    let start = chars.peek().map(|(i, _)| *i).unwrap_or(0);
    let mut end = start;
    let mut is_float = false;

    while let Some(&(i, c)) = chars.peek() {
        if c.is_ascii_digit() {
            end = i + 1;
            chars.next();
        } else if c == '.' && !is_float {
            // Only a digit after the dot makes this a fractional part
            let next_is_digit = source[i + 1..]
                .chars()
                .next()
                .map_or(false, |n| n.is_ascii_digit());
            if !next_is_digit {
                break;
            }
            is_float = true;
            end = i + 1;
            chars.next();
        } else {
            break;
        }
    }

    let text = &source[start..end];
    if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|e| Failure::Syntax(format!("bad number `{}`: {}", text, e)))
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|e| Failure::Syntax(format!("bad number `{}`: {}", text, e)))
    }
}

fn read_string(quote: char, chars: &mut Peekable<CharIndices>) -> Outcome<String> {
    let mut value = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            c if c == quote => return Ok(value),
            c => value.push(c),
        }
    }
    Err(Failure::Syntax("unterminated string literal".to_owned()))
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    fn from_token(op: &str) -> Option<BinaryOp> {
        Some(match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Pow,
            "~" => BinaryOp::Concat,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            _ => return None,
        })
    }

    fn is_comparison(self) -> bool {
        match self {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
enum Expr {
    Literal(Value),
    Variable(String),
    Negate(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call(String, Vec<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn parse(mut self) -> Outcome<Expr> {
        if self.tokens.is_empty() {
            return Err(Failure::Syntax("empty placeholder".to_owned()));
        }
        let expr = self.conditional()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(Failure::Syntax(format!("unexpected {:?}", token))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(name)) if name == keyword => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, expected: &Token) -> Outcome<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(Failure::Syntax(format!(
                "expected {:?}, found {:?}",
                expected,
                self.peek()
            )))
        }
    }

    fn peek_op(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn conditional(&mut self) -> Outcome<Expr> {
        let expr = self.or()?;

        if self.eat_keyword("if") {
            let condition = self.or()?;
            if !self.eat_keyword("else") {
                return Err(Failure::Syntax("`if` without `else`".to_owned()));
            }
            let otherwise = self.conditional()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(expr),
                otherwise: Box::new(otherwise),
            });
        }

        if self.eat(&Token::Question) {
            let then = self.conditional()?;
            self.expect(&Token::Colon)?;
            let otherwise = self.conditional()?;
            return Ok(Expr::Conditional {
                condition: Box::new(expr),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }

        Ok(expr)
    }

    fn or(&mut self) -> Outcome<Expr> {
        let mut expr = self.and()?;
        while self.eat_keyword("or") {
            let rhs = self.and()?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Outcome<Expr> {
        let mut expr = self.not()?;
        while self.eat_keyword("and") {
            let rhs = self.not()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn not(&mut self) -> Outcome<Expr> {
        if self.eat_keyword("not") {
            let operand = self.not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.comparison()
    }

    /// `a < b < c` reads as `a < b and b < c`.
    fn comparison(&mut self) -> Outcome<Expr> {
        let mut lhs = self.additive()?;
        let mut chain: Option<Expr> = None;

        while let Some(op) = self
            .peek_op()
            .and_then(BinaryOp::from_token)
            .filter(|op| op.is_comparison())
        {
            self.position += 1;
            let rhs = self.additive()?;
            let link = Expr::Binary(op, Box::new(lhs), Box::new(rhs.clone()));
            chain = Some(match chain {
                None => link,
                Some(previous) => Expr::And(Box::new(previous), Box::new(link)),
            });
            lhs = rhs;
        }

        Ok(chain.unwrap_or(lhs))
    }

    fn additive(&mut self) -> Outcome<Expr> {
        let mut expr = self.term()?;
        while let Some(op) = self.peek_op() {
            let op = match op {
                "+" | "-" | "~" => BinaryOp::from_token(op),
                _ => None,
            };
            let op = match op {
                Some(op) => op,
                None => break,
            };
            self.position += 1;
            let rhs = self.term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Outcome<Expr> {
        let mut expr = self.unary()?;
        while let Some(op) = self.peek_op() {
            let op = match op {
                "*" | "/" | "//" | "%" => BinaryOp::from_token(op),
                _ => None,
            };
            let op = match op {
                Some(op) => op,
                None => break,
            };
            self.position += 1;
            let rhs = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Outcome<Expr> {
        match self.peek_op() {
            Some("-") => {
                self.position += 1;
                let operand = self.unary()?;
                Ok(Expr::Negate(Box::new(operand)))
            }
            Some("+") => {
                self.position += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    /// `**` binds tighter than unary minus on its left and is right-associative.
    fn power(&mut self) -> Outcome<Expr> {
        let base = self.postfix()?;
        if self.peek_op() == Some("**") {
            self.position += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Outcome<Expr> {
        let mut expr = self.primary()?;
        while self.eat(&Token::Pipe) {
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                other => {
                    return Err(Failure::Syntax(format!(
                        "expected filter name, found {:?}",
                        other
                    )))
                }
            };
            let mut args = vec![expr];
            if self.eat(&Token::LParen) {
                args.extend(self.arguments()?);
            }
            expr = Expr::Call(name, args);
        }
        Ok(expr)
    }

    fn arguments(&mut self) -> Outcome<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.conditional()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma)?;
        }
    }

    fn primary(&mut self) -> Outcome<Expr> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::LParen) => {
                let expr = self.conditional()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => {
                if name == "true" || name == "True" {
                    Ok(Expr::Literal(Value::Bool(true)))
                } else if name == "false" || name == "False" {
                    Ok(Expr::Literal(Value::Bool(false)))
                } else if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            other => Err(Failure::Syntax(format!(
                "expected a value, found {:?}",
                other
            ))),
        }
    }
}

fn eval(expr: &Expr, variables: &VariableSet) -> Outcome<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => variables
            .get(name)
            .cloned()
            .ok_or_else(|| Failure::Undefined(name.clone())),
        Expr::Negate(operand) => match eval(operand, variables)? {
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow("-")),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(Failure::Evaluation(format!(
                "cannot negate a {}",
                other.type_name()
            ))),
        },
        Expr::Not(operand) => Ok(Value::Bool(!eval(operand, variables)?.is_truthy())),
        Expr::And(lhs, rhs) => {
            let lhs = eval(lhs, variables)?.is_truthy();
            Ok(Value::Bool(lhs && eval(rhs, variables)?.is_truthy()))
        }
        Expr::Or(lhs, rhs) => {
            let lhs = eval(lhs, variables)?.is_truthy();
            Ok(Value::Bool(lhs || eval(rhs, variables)?.is_truthy()))
        }
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval(condition, variables)?.is_truthy() {
                eval(then, variables)
            } else {
                eval(otherwise, variables)
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, variables)?;
            let rhs = eval(rhs, variables)?;
            binary(*op, lhs, rhs)
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| eval(arg, variables))
                .collect::<Outcome<Vec<Value>>>()?;
            call(name, args)
        }
    }
}

fn overflow(op: &str) -> Failure {
    Failure::Evaluation(format!("integer overflow in `{}`", op))
}

fn type_mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> Failure {
    Failure::Evaluation(format!(
        "unsupported operand types for {:?}: {} and {}",
        op,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        remainder.checked_add(b)
    } else {
        Some(remainder)
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Outcome<Value> {
    if op.is_comparison() {
        return compare(op, &lhs, &rhs).map(Value::Bool);
    }

    if op == BinaryOp::Concat {
        return Ok(Value::Str(format!("{}{}", lhs, rhs)));
    }

    if let (BinaryOp::Add, Value::Str(a), Value::Str(b)) = (op, &lhs, &rhs) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    let divides_by_zero = match op {
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => rhs.as_f64() == Some(0.0),
        _ => false,
    };
    if divides_by_zero {
        return Err(Failure::Evaluation("division by zero".to_owned()));
    }

    if let (Value::Int(a), Value::Int(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        let result = match op {
            BinaryOp::Add => a.checked_add(b).ok_or_else(|| overflow("+"))?,
            BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| overflow("-"))?,
            BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| overflow("*"))?,
            BinaryOp::FloorDiv => floor_div(a, b).ok_or_else(|| overflow("//"))?,
            BinaryOp::Mod => floor_mod(a, b).ok_or_else(|| overflow("%"))?,
            BinaryOp::Pow if b >= 0 => {
                let exponent = u32::try_from(b).map_err(|_| overflow("**"))?;
                a.checked_pow(exponent).ok_or_else(|| overflow("**"))?
            }
            // True division and negative powers leave the integers
            _ => return float_binary(op, a as f64, b as f64),
        };
        return Ok(Value::Int(result));
    }

    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => float_binary(op, a, b),
        _ => Err(type_mismatch(op, &lhs, &rhs)),
    }
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Outcome<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a - b * (a / b).floor(),
        BinaryOp::Pow => a.powf(b),
        _ => {
            return Err(Failure::Evaluation(format!(
                "{:?} is not an arithmetic operator",
                op
            )))
        }
    };
    Ok(Value::Float(result))
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Outcome<bool> {
    let ordering = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };

    match (op, ordering) {
        (BinaryOp::Eq, ordering) => Ok(ordering == Some(Ordering::Equal)),
        (BinaryOp::Ne, ordering) => Ok(ordering != Some(Ordering::Equal)),
        (BinaryOp::Lt, Some(ordering)) => Ok(ordering == Ordering::Less),
        (BinaryOp::Le, Some(ordering)) => Ok(ordering != Ordering::Greater),
        (BinaryOp::Gt, Some(ordering)) => Ok(ordering == Ordering::Greater),
        (BinaryOp::Ge, Some(ordering)) => Ok(ordering != Ordering::Less),
        _ => Err(type_mismatch(op, lhs, rhs)),
    }
}

fn numeric_argument(function: &str, value: &Value) -> Outcome<f64> {
    value.as_f64().ok_or_else(|| {
        Failure::Evaluation(format!(
            "{}() expects a number, got a {}",
            function,
            value.type_name()
        ))
    })
}

fn call(name: &str, args: Vec<Value>) -> Outcome<Value> {
    let arity_error = || Failure::Evaluation(format!("wrong number of arguments to {}()", name));

    match name {
        // round(x) gives an integer; round(x, n) keeps n decimals. Halves round away from zero.
        "round" => match args.as_slice() {
            [Value::Int(i)] | [Value::Int(i), _] => Ok(Value::Int(*i)),
            [x] => {
                let x = numeric_argument(name, x)?.round();
                if x.abs() < 9.0e18 {
                    Ok(Value::Int(x as i64))
                } else {
                    Ok(Value::Float(x))
                }
            }
            [x, digits] => {
                let x = numeric_argument(name, x)?;
                let digits = match digits {
                    Value::Int(d) => i32::try_from(*d).map_err(|_| arity_error())?,
                    other => {
                        return Err(Failure::Evaluation(format!(
                            "round() precision must be an integer, got a {}",
                            other.type_name()
                        )))
                    }
                };
                let scale = 10f64.powi(digits);
                Ok(Value::Float((x * scale).round() / scale))
            }
            _ => Err(arity_error()),
        },
        "abs" => match args.as_slice() {
            [Value::Int(i)] => i.checked_abs().map(Value::Int).ok_or_else(|| overflow("abs")),
            [x] => Ok(Value::Float(numeric_argument(name, x)?.abs())),
            _ => Err(arity_error()),
        },
        "min" | "max" => {
            let mut values = args.into_iter();
            let mut best = values.next().ok_or_else(arity_error)?;
            for value in values {
                let ordering_op = if name == "min" {
                    BinaryOp::Lt
                } else {
                    BinaryOp::Gt
                };
                if compare(ordering_op, &value, &best)? {
                    best = value;
                }
            }
            Ok(best)
        }
        "int" => match args.as_slice() {
            [Value::Int(i)] => Ok(Value::Int(*i)),
            [Value::Float(f)] => Ok(Value::Int(f.trunc() as i64)),
            [Value::Bool(b)] => Ok(Value::Int(*b as i64)),
            [Value::Str(s)] => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| Failure::Evaluation(format!("int(\"{}\"): {}", s, e))),
            _ => Err(arity_error()),
        },
        "float" => match args.as_slice() {
            [Value::Str(s)] => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| Failure::Evaluation(format!("float(\"{}\"): {}", s, e))),
            [x] => Ok(Value::Float(numeric_argument(name, x)?)),
            _ => Err(arity_error()),
        },
        other => Err(Failure::Evaluation(format!("unknown function `{}`", other))),
    }
}
