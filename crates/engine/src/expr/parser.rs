// Expression parser - converts normalized input strings into an AST
// Supports: numbers, basic math (+, -, *, /, ^), parentheses, unary sign,
// function calls (sin, sqrt, ...) and the constants pi / e.
//
// The grammar is strict: unknown identifiers, unknown functions and
// trailing tokens are parse errors. Nothing here ever executes input as
// code; the string becomes data before it becomes a number.

use super::functions::is_known_function;

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Function {
        name: String,
        args: Vec<Expr>,
    },
    BinaryOp {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parse a normalized expression string into an AST.
pub fn parse(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input.trim())?;
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    let (expr, pos) = parse_add_sub(&tokens, 0)?;
    if pos != tokens.len() {
        return Err(format!("Unexpected token at position {}", pos));
    }
    Ok(expr)
}

#[derive(Debug, Clone)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => { chars.next(); }
            '+' => { tokens.push(Token::Plus); chars.next(); }
            '-' => { tokens.push(Token::Minus); chars.next(); }
            '*' => { tokens.push(Token::Star); chars.next(); }
            '/' => { tokens.push(Token::Slash); chars.next(); }
            '^' => { tokens.push(Token::Caret); chars.next(); }
            '(' => { tokens.push(Token::LParen); chars.next(); }
            ')' => { tokens.push(Token::RParen); chars.next(); }
            ',' => { tokens.push(Token::Comma); chars.next(); }
            'a'..='z' | 'A'..='Z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num_str.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
            }
            _ => return Err(format!("Unexpected character: {}", c)),
        }
    }

    Ok(tokens)
}

fn parse_add_sub(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_power(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Star => Op::Mul,
            Token::Slash => Op::Div,
            _ => break,
        };
        let (right, new_pos) = parse_power(tokens, pos + 1)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

// Exponentiation (^) - right-associative, higher precedence than * /
fn parse_power(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (base, pos) = parse_primary(tokens, pos)?;

    if pos < tokens.len() {
        if let Token::Caret = &tokens[pos] {
            // Right-associative: recurse into parse_power for the exponent
            let (exponent, new_pos) = parse_power(tokens, pos + 1)?;
            return Ok((
                Expr::BinaryOp {
                    op: Op::Pow,
                    left: Box::new(base),
                    right: Box::new(exponent),
                },
                new_pos,
            ));
        }
    }

    Ok((base, pos))
}

fn parse_primary(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    if pos >= tokens.len() {
        return Err("Unexpected end of expression".to_string());
    }

    match &tokens[pos] {
        Token::Number(n) => Ok((Expr::Number(*n), pos + 1)),
        Token::Ident(name) => {
            // Function call
            if pos + 1 < tokens.len() {
                if let Token::LParen = &tokens[pos + 1] {
                    if !is_known_function(name) {
                        return Err(format!("Unknown function: {}", name));
                    }
                    let (args, new_pos) = parse_function_args(tokens, pos + 2)?;
                    return Ok((
                        Expr::Function {
                            name: name.clone(),
                            args,
                        },
                        new_pos,
                    ));
                }
            }
            // Bare identifier - must be a constant
            match name.as_str() {
                "pi" => Ok((Expr::Constant(Constant::Pi), pos + 1)),
                "e" => Ok((Expr::Constant(Constant::E), pos + 1)),
                _ => Err(format!("Unknown identifier: {}", name)),
            }
        }
        Token::LParen => {
            let (expr, pos) = parse_add_sub(tokens, pos + 1)?;
            if pos >= tokens.len() {
                return Err("Missing closing parenthesis".to_string());
            }
            match &tokens[pos] {
                Token::RParen => Ok((expr, pos + 1)),
                _ => Err("Expected closing parenthesis".to_string()),
            }
        }
        Token::Plus => {
            // Unary plus (no-op, just parse the next expression)
            parse_primary(tokens, pos + 1)
        }
        Token::Minus => {
            // Unary minus
            let (expr, pos) = parse_primary(tokens, pos + 1)?;
            Ok((
                Expr::BinaryOp {
                    op: Op::Sub,
                    left: Box::new(Expr::Number(0.0)),
                    right: Box::new(expr),
                },
                pos,
            ))
        }
        _ => Err(format!("Unexpected token at position {}", pos)),
    }
}

fn parse_function_args(tokens: &[Token], pos: usize) -> Result<(Vec<Expr>, usize), String> {
    let mut args = Vec::new();
    let mut pos = pos;

    // Empty call: sin()
    if pos < tokens.len() {
        if let Token::RParen = &tokens[pos] {
            return Ok((args, pos + 1));
        }
    }

    loop {
        let (arg, new_pos) = parse_add_sub(tokens, pos)?;
        args.push(arg);
        pos = new_pos;

        if pos >= tokens.len() {
            return Err("Missing closing parenthesis in function call".to_string());
        }

        match &tokens[pos] {
            Token::RParen => return Ok((args, pos + 1)),
            Token::Comma => pos += 1,
            _ => return Err("Expected comma or closing parenthesis".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        let expr = parse("42").unwrap();
        match expr {
            Expr::Number(n) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_precedence() {
        // 2+3*4 must parse as 2+(3*4)
        let expr = parse("2+3*4").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Add, ref right, .. } => match right.as_ref() {
                Expr::BinaryOp { op: Op::Mul, .. } => {}
                _ => panic!("Expected Mul on right, got {:?}", right),
            },
            _ => panic!("Expected Add at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_power_right_associative() {
        // 2^3^2 must parse as 2^(3^2)
        let expr = parse("2^3^2").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Pow, ref right, .. } => match right.as_ref() {
                Expr::BinaryOp { op: Op::Pow, .. } => {}
                _ => panic!("Expected Pow on right, got {:?}", right),
            },
            _ => panic!("Expected Pow at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_unary_minus() {
        // -5 parses as 0-5
        let expr = parse("-5").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Sub, ref left, .. } => match left.as_ref() {
                Expr::Number(n) => assert_eq!(*n, 0.0),
                _ => panic!("Expected Number(0) on left"),
            },
            _ => panic!("Expected Sub op (unary minus), got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_unary_plus_is_noop() {
        let expr = parse("+7").unwrap();
        match expr {
            Expr::Number(n) => assert_eq!(n, 7.0),
            _ => panic!("Expected Number(7), got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_function_call() {
        let expr = parse("sin(0)").unwrap();
        match expr {
            Expr::Function { ref name, ref args } => {
                assert_eq!(name, "sin");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("Expected Function, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_constants() {
        assert!(matches!(parse("pi").unwrap(), Expr::Constant(Constant::Pi)));
        assert!(matches!(parse("e").unwrap(), Expr::Constant(Constant::E)));
    }

    #[test]
    fn test_parse_case_insensitive_idents() {
        assert!(matches!(parse("PI").unwrap(), Expr::Constant(Constant::Pi)));
        assert!(parse("SIN(0)").is_ok());
    }

    #[test]
    fn test_reject_unknown_function() {
        assert!(parse("frob(1)").is_err());
    }

    #[test]
    fn test_reject_unknown_identifier() {
        assert!(parse("x+1").is_err());
    }

    #[test]
    fn test_reject_trailing_tokens() {
        // No implicit multiplication
        assert!(parse("2pi").is_err());
        assert!(parse("(1)(2)").is_err());
    }

    #[test]
    fn test_reject_dangling_operator() {
        assert!(parse("2+").is_err());
        assert!(parse("*3").is_err());
    }

    #[test]
    fn test_reject_unbalanced_parens() {
        assert!(parse("(1+2").is_err());
        assert!(parse("1+2)").is_err());
    }

    #[test]
    fn test_reject_foreign_characters() {
        assert!(parse("5!").is_err());
        assert!(parse("2;3").is_err());
    }

    #[test]
    fn test_reject_invalid_number() {
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn test_reject_empty() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }
}
