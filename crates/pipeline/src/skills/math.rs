//! Arithmetic evaluator skill.
//!
//! A small recursive-descent parser over `+ - * / % ^`, parentheses,
//! unary minus, a fixed function set, and the constants pi/e/tau. Only
//! fires on short, math-looking input; anything outside the grammar is
//! "not mine" rather than an error.

use async_trait::async_trait;

use super::Skill;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                // "**" is an alternate power spelling.
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let lit: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(lit.parse().ok()?));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect::<String>().to_lowercase()));
            }
            _ => return None,
        }
    }

    Some(tokens)
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

    fn eat(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    value %= self.unary()?;
                }
                _ => return Some(value),
            }
        }
    }

    // Power binds tighter than unary minus, so -2^2 is -4.
    fn unary(&mut self) -> Option<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Some(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exp = self.unary()?;
            Some(base.powf(exp))
        } else {
            Some(base)
        }
    }

    fn primary(&mut self) -> Option<f64> {
        match self.next()? {
            Token::Number(n) => Some(n),
            Token::LParen => {
                let value = self.expr()?;
                self.eat(&Token::RParen).then_some(value)
            }
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    let mut args = vec![self.expr()?];
                    while self.eat(&Token::Comma) {
                        args.push(self.expr()?);
                    }
                    if !self.eat(&Token::RParen) {
                        return None;
                    }
                    apply_fn(&name, &args)
                } else {
                    constant(&name)
                }
            }
            _ => None,
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        _ => None,
    }
}

fn apply_fn(name: &str, args: &[f64]) -> Option<f64> {
    let one = || (args.len() == 1).then(|| args[0]);
    match name {
        "abs" => Some(one()?.abs()),
        "round" => Some(one()?.round()),
        "sqrt" => Some(one()?.sqrt()),
        "log" => match args {
            [x] => Some(x.ln()),
            [x, base] => Some(x.log(*base)),
            _ => None,
        },
        "log10" => Some(one()?.log10()),
        "log2" => Some(one()?.log2()),
        "sin" => Some(one()?.sin()),
        "cos" => Some(one()?.cos()),
        "tan" => Some(one()?.tan()),
        "asin" => Some(one()?.asin()),
        "acos" => Some(one()?.acos()),
        "atan" => Some(one()?.atan()),
        "sinh" => Some(one()?.sinh()),
        "cosh" => Some(one()?.cosh()),
        "tanh" => Some(one()?.tanh()),
        "floor" => Some(one()?.floor()),
        "ceil" => Some(one()?.ceil()),
        "exp" => Some(one()?.exp()),
        "deg" => Some(one()?.to_degrees()),
        "rad" => Some(one()?.to_radians()),
        "pow" => match args {
            [x, y] => Some(x.powf(*y)),
            _ => None,
        },
        "factorial" => {
            let x = one()?;
            if x < 0.0 || x.fract() != 0.0 || x > 170.0 {
                return None;
            }
            Some((1..=x as u64).map(|n| n as f64).product())
        }
        _ => None,
    }
}

fn evaluate(expr: &str) -> Option<f64> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    (parser.pos == parser.tokens.len() && value.is_finite()).then_some(value)
}

/// Small filter so prose never reaches the parser: short input with at
/// least one digit and one operator-ish character.
fn looks_math(query: &str) -> bool {
    let q = query.trim();
    !q.is_empty()
        && q.len() <= 120
        && q.chars().any(|c| c.is_ascii_digit())
        && q.chars().any(|c| "+-*/^().".contains(c))
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{:.10}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn try_calc(query: &str) -> Option<String> {
    if !looks_math(query) {
        return None;
    }

    let mut expr = query.trim();
    for lead in ["what is", "calculate", "calc", "compute"] {
        if expr.to_lowercase().starts_with(lead) {
            expr = expr[lead.len()..].trim_start_matches([':', ',', ' ']);
            break;
        }
    }

    let value = evaluate(expr)?;
    Some(format!("- {} = {}", expr, fmt_value(value)))
}

pub struct MathSkill;

#[async_trait]
impl Skill for MathSkill {
    fn name(&self) -> &'static str {
        "math"
    }

    async fn try_handle(&self, query: &str) -> Option<String> {
        try_calc(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(try_calc("2+2").unwrap(), "- 2+2 = 4");
        assert_eq!(try_calc("what is 2 + 3 * 4").unwrap(), "- 2 + 3 * 4 = 14");
        assert_eq!(try_calc("(2 + 3) * 4").unwrap(), "- (2 + 3) * 4 = 20");
    }

    #[test]
    fn test_power_and_unary() {
        assert_eq!(evaluate("2^10"), Some(1024.0));
        assert_eq!(evaluate("2**10"), Some(1024.0));
        assert_eq!(evaluate("-2^2"), Some(-4.0));
        assert_eq!(evaluate("2^3^2"), Some(512.0));
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(evaluate("sqrt(16)"), Some(4.0));
        assert_eq!(evaluate("factorial(5)"), Some(120.0));
        assert_eq!(evaluate("pow(2, 8)"), Some(256.0));
        assert!((evaluate("log(8, 2)").unwrap() - 3.0).abs() < 1e-12);
        assert!((evaluate("cos(pi)").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_division_by_zero() {
        assert!(evaluate("1/0").is_none());
    }

    #[test]
    fn test_rejects_prose_and_unknown_names() {
        assert!(try_calc("python 3.13 release notes").is_none());
        assert!(try_calc("tell me a story").is_none());
        assert!(evaluate("system(1)").is_none());
        assert!(evaluate("x + 1").is_none());
    }

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(4.0), "4");
        assert_eq!(fmt_value(1.0 / 3.0), "0.3333333333");
        assert_eq!(fmt_value(2.5), "2.5");
    }

    #[test]
    fn test_factorial_guards() {
        assert!(evaluate("factorial(-1)").is_none());
        assert!(evaluate("factorial(2.5)").is_none());
        assert!(evaluate("factorial(171)").is_none());
    }
}
