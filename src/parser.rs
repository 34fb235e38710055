// ABOUTME: Pratt parser building the AST from the token stream

use crate::ast::{Block, Expression, Identifier, Program, Statement};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    Sum,
    Product,
    Prefix,
    Call,
    Function,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Equal
        | TokenKind::NotEqual
        | TokenKind::LessThan
        | TokenKind::GreaterThan => Precedence::Equals,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::Scope => {
            Precedence::Product
        }
        TokenKind::LParen => Precedence::Call,
        TokenKind::Arrow => Precedence::Function,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    errors: Vec<String>,
    prefix_errors: Vec<String>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            cur: Token::new(TokenKind::Eof, ""),
            peek: Token::new(TokenKind::Eof, ""),
            errors: Vec::new(),
            prefix_errors: Vec::new(),
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Structural errors: missing delimiters, missing identifiers, and so on.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Tokens that had no prefix handler (stray operators, `ILLEGAL` tokens).
    pub fn prefix_errors(&self) -> &[String] {
        &self.prefix_errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.prefix_errors.is_empty()
    }

    /// All accumulated errors in reporting order.
    pub fn all_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.prefix_errors.iter())
            .cloned()
            .collect()
    }

    /// Parses until `Eof`, collecting statements. A failed sub-parse records
    /// its error and skips forward one token, so several errors can be
    /// reported for one program.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.cur_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace => self.parse_block_statement().map(Statement::Block),
            TokenKind::Import => self.parse_import_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        if !self.peek_is(TokenKind::Ident) {
            self.errors
                .push("identifier is expected after let".to_string());
            return None;
        }
        self.next_token();
        let name = Identifier {
            token: self.cur.clone(),
            name: self.cur.literal.clone(),
        };
        if !self.peek_is(TokenKind::Assign) {
            self.errors
                .push("equal sign is expected after the declared name".to_string());
            return None;
        }
        self.next_token();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if !self.move_to_peek(TokenKind::Semicolon) {
            self.errors.push("semicolon is expected".to_string());
            return None;
        }
        Some(Statement::Return { token, value })
    }

    fn parse_import_statement(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.next_token();
        if !self.cur_is(TokenKind::Str) {
            self.errors.push("string path is expected".to_string());
            return None;
        }
        let path = self.cur.literal.clone();
        let name = if self.peek_is(TokenKind::As) {
            self.next_token();
            if !self.peek_is(TokenKind::Ident) {
                self.errors
                    .push("identifier is expected after as".to_string());
                return None;
            }
            self.next_token();
            Identifier {
                token: self.cur.clone(),
                name: self.cur.literal.clone(),
            }
        } else {
            // Without `as`, bind the last path segment.
            let segment = path.rsplit('/').next().unwrap_or_default().to_string();
            Identifier {
                token: Token::new(TokenKind::Ident, segment.clone()),
                name: segment,
            }
        };
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Import { token, path, name })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression { expression })
    }

    fn parse_block_statement(&mut self) -> Option<Block> {
        let token = self.cur.clone();
        let mut statements = Vec::new();
        while !self.peek_is(TokenKind::RBrace) && !self.peek_is(TokenKind::Eof) {
            self.next_token();
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }
        if !self.peek_is(TokenKind::RBrace) {
            self.errors.push("right brace is expected".to_string());
            return None;
        }
        self.next_token();
        Some(Block { token, statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;
        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::Scope => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::Arrow => {
                    self.next_token();
                    self.parse_function_expression(left)?
                }
                _ => return Some(left),
            };
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur.kind {
            TokenKind::Int => self.parse_integer_expression(),
            TokenKind::Ident => Some(Expression::Identifier(Identifier {
                token: self.cur.clone(),
                name: self.cur.literal.clone(),
            })),
            TokenKind::Str => Some(Expression::Str {
                token: self.cur.clone(),
                value: self.cur.literal.clone(),
            }),
            TokenKind::True | TokenKind::False => Some(Expression::Bool {
                token: self.cur.clone(),
                value: self.cur.kind == TokenKind::True,
            }),
            TokenKind::Minus | TokenKind::Not => self.parse_prefix_expression(),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            _ => {
                self.prefix_errors
                    .push(format!("no prefix handler for {}", self.cur.kind));
                None
            }
        }
    }

    fn parse_integer_expression(&mut self) -> Option<Expression> {
        let value = match self.cur.literal.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.errors.push("integer is expected".to_string());
                return None;
            }
        };
        Some(Expression::Integer {
            token: self.cur.clone(),
            value,
        })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let operator = self.cur.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    /// Disambiguates a leading `(` by lookahead: `(IDENT,` starts a parameter
    /// list, `()` is an empty parameter list, anything else is a grouped
    /// expression closed by a mandatory `)`.
    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.next_token();
        if self.cur_is(TokenKind::Ident) && self.peek_is(TokenKind::Comma) {
            Some(self.parse_params(token))
        } else if self.cur_is(TokenKind::RParen) {
            Some(Expression::Params {
                token,
                params: Vec::new(),
            })
        } else {
            let expression = self.parse_expression(Precedence::Lowest)?;
            if !self.peek_is(TokenKind::RParen) {
                self.errors
                    .push("right paren is expected after grouped expression".to_string());
                return None;
            }
            self.next_token();
            Some(expression)
        }
    }

    fn parse_params(&mut self, token: Token) -> Expression {
        let mut params = Vec::new();
        while self.cur_is(TokenKind::Ident) {
            params.push(Identifier {
                token: self.cur.clone(),
                name: self.cur.literal.clone(),
            });
            if self.peek_is(TokenKind::Comma) {
                self.next_token();
            }
            self.next_token();
        }
        Expression::Params { token, params }
    }

    /// `=>` as an infix operator: the left side must be a parameter list or a
    /// single identifier (promoted to a one-element list). A `{` body parses
    /// as a block; any other expression is the lambda shortcut and becomes a
    /// block holding a single return.
    fn parse_function_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.next_token();
        let params = match left {
            Expression::Params { params, .. } => params,
            Expression::Identifier(identifier) => vec![identifier],
            _ => {
                self.errors.push("params are expected".to_string());
                return None;
            }
        };
        let body = if self.cur_is(TokenKind::LBrace) {
            self.parse_block_statement()?
        } else {
            let Some(expression) = self.parse_expression(Precedence::Lowest) else {
                self.errors
                    .push("expression was expected on lambda function".to_string());
                return None;
            };
            Block {
                token: Token::new(TokenKind::LBrace, "{"),
                statements: vec![Statement::Return {
                    token: Token::new(TokenKind::Return, "return"),
                    value: expression,
                }],
            }
        };
        Some(Expression::Function {
            token,
            params,
            body: std::rc::Rc::new(body),
        })
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.next_token();
        let arguments = self.parse_arguments()?;
        Some(Expression::Call {
            token,
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();
        while !self.cur_is(TokenKind::RParen) {
            let expression = self.parse_expression(Precedence::Lowest)?;
            arguments.push(expression);
            if self.peek_is(TokenKind::Comma) {
                self.next_token();
                self.next_token();
                continue;
            }
            // The call's own `)` is at peek after the final argument; the
            // cursor may itself sit on a `)` that closed a nested call or
            // grouping, so it cannot be trusted here.
            if !self.move_to_peek(TokenKind::RParen) {
                self.errors
                    .push("right paren is expected after call arguments".to_string());
                return None;
            }
            break;
        }
        Some(arguments)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        if !self.peek_is(TokenKind::LParen) {
            self.errors
                .push("left paren is expected in if expression".to_string());
            return None;
        }
        self.next_token();
        self.next_token();
        let Some(condition) = self.parse_expression(Precedence::Lowest) else {
            self.errors
                .push("condition is required on if expression".to_string());
            return None;
        };
        if !self.peek_is(TokenKind::RParen) {
            self.errors
                .push("right paren is expected in if expression".to_string());
            return None;
        }
        self.next_token();
        if !self.peek_is(TokenKind::LBrace) {
            self.errors
                .push("block for if expression is required".to_string());
            return None;
        }
        self.next_token();
        let consequence = self.parse_block_statement()?;
        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.peek_is(TokenKind::LBrace) {
                self.errors
                    .push("block for else expression is expected".to_string());
                return None;
            }
            self.next_token();
            Some(self.parse_block_statement()?)
        } else {
            None
        };
        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let operator = self.cur.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn move_to_peek(&mut self, kind: TokenKind) -> bool {
        if !self.peek_is(kind) {
            return false;
        }
        self.next_token();
        true
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(
            !parser.has_errors(),
            "unexpected parse errors: {:?}",
            parser.all_errors()
        );
        program
    }

    fn assert_statements(input: &str, expected: &[&str]) {
        let program = parse(input);
        assert_eq!(
            program.statements.len(),
            expected.len(),
            "program was {}",
            program
        );
        for (statement, expected) in program.statements.iter().zip(expected.iter()) {
            assert_eq!(statement.to_string(), *expected);
        }
    }

    #[test]
    fn test_let_statements() {
        assert_statements(
            "let x = 5;\nlet y = 10;\nlet foobar = 838383;",
            &["let x = 5;", "let y = 10;", "let foobar = 838383;"],
        );
    }

    #[test]
    fn test_let_without_trailing_semicolon() {
        assert_statements("let x = 5", &["let x = 5;"]);
    }

    #[test]
    fn test_grouped_expressions() {
        assert_statements(
            "let x = (a + b) * c;\nlet y = a + b + (a * b);",
            &["let x = ((a + b) * c);", "let y = ((a + b) + (a * b));"],
        );
    }

    #[test]
    fn test_infix_precedence() {
        assert_statements(
            "let x = a + b;
             let y = a * b + c;
             let foobar = a + c * b;
             return a + b / c;
             return -a + b - c;
             return a > b;
             return a < b;
             return a == b;
             return a != b;
             return net::listen();",
            &[
                "let x = (a + b);",
                "let y = ((a * b) + c);",
                "let foobar = (a + (c * b));",
                "return (a + (b / c));",
                "return ((-(a) + b) - c);",
                "return (a > b);",
                "return (a < b);",
                "return (a == b);",
                "return (a != b);",
                "return (net :: listen());",
            ],
        );
    }

    #[test]
    fn test_bool_expressions() {
        assert_statements(
            "let x = false;\nlet y = true;\nreturn false == true;",
            &["let x = false;", "let y = true;", "return (false == true);"],
        );
    }

    #[test]
    fn test_if_expression() {
        let program = parse("if (x > y) { return y; }");
        assert_eq!(program.statements.len(), 1);
        let Statement::Expression { expression } = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::If { alternative, .. } = expression else {
            panic!("expected if expression");
        };
        assert!(alternative.is_none());
        assert_eq!(expression.to_string(), "if((x > y)){return y;}");
    }

    #[test]
    fn test_if_else_expression() {
        let program = parse("if (x > y) { return y; } else { return x; }");
        let Statement::Expression { expression } = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::If { alternative, .. } = expression else {
            panic!("expected if expression");
        };
        assert!(alternative.is_some());
        assert_eq!(
            expression.to_string(),
            "if((x > y)){return y;}else{return x;}"
        );
    }

    #[test]
    fn test_call_without_arguments() {
        let program = parse("add();");
        let Statement::Expression { expression } = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Call { arguments, .. } = expression else {
            panic!("expected call expression");
        };
        assert!(arguments.is_empty());
        assert_eq!(expression.to_string(), "add()");
    }

    #[test]
    fn test_call_with_nested_call() {
        let program = parse("add(2, x(2,3))");
        let Statement::Expression { expression } = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Call { arguments, .. } = expression else {
            panic!("expected call expression");
        };
        assert_eq!(arguments.len(), 2);
        assert_eq!(expression.to_string(), "add(2,x(2,3))");
    }

    #[test]
    fn test_call_with_nested_final_argument() {
        assert_statements("f(g(x));", &["f(g(x));"]);
        assert_statements("print(len(x));", &["print(len(x));"]);
        assert_statements("z(23, b());", &["z(23,b());"]);
        assert_statements("add(2, (a + b));", &["add(2,(a + b));"]);
    }

    #[test]
    fn test_zero_argument_call_inside_expression() {
        assert_statements("add() + 1;", &["(add() + 1);"]);
    }

    #[test]
    fn test_function_without_params() {
        assert_statements("() => { return 5; }", &["()=>{return 5;};"]);
    }

    #[test]
    fn test_function_with_params() {
        let program = parse("(x, y) => { return x + y; }");
        let Statement::Expression { expression } = &program.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Function { params, .. } = expression else {
            panic!("expected function expression");
        };
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(expression.to_string(), "(x,y)=>{return (x + y);}");
    }

    #[test]
    fn test_single_param_shortcut() {
        assert_statements("x => x + 1;", &["(x)=>{return (x + 1);};"]);
    }

    #[test]
    fn test_lambda_shortcut_body() {
        assert_statements("(x, y) => x + y;", &["(x,y)=>{return (x + y);};"]);
    }

    #[test]
    fn test_immediately_invoked_function() {
        assert_statements(
            "((x,y)=>{return x+y;})(10, 5);",
            &["(x,y)=>{return (x + y);}(10,5);"],
        );
    }

    #[test]
    fn test_import_statements() {
        let cases = [
            (r#"import "net""#, "net", "net"),
            (r#"import "tmp/carlos" as test"#, "tmp/carlos", "test"),
            (
                r#"import "multiprocessing/threads/green""#,
                "multiprocessing/threads/green",
                "green",
            ),
            (r#"import "mod";"#, "mod", "mod"),
        ];
        for (input, expected_path, expected_name) in cases {
            let program = parse(input);
            assert_eq!(program.statements.len(), 1, "input {:?}", input);
            let Statement::Import { path, name, .. } = &program.statements[0] else {
                panic!("expected import statement for {:?}", input);
            };
            assert_eq!(path, expected_path);
            assert_eq!(name.name, expected_name);
        }
    }

    #[test]
    fn test_import_without_path_is_error() {
        let mut parser = Parser::new(Lexer::new("import net"));
        parser.parse_program();
        assert!(parser
            .errors()
            .iter()
            .any(|e| e.contains("string path is expected")));
    }

    #[test]
    fn test_return_requires_semicolon() {
        let mut parser = Parser::new(Lexer::new("return 5"));
        parser.parse_program();
        assert!(parser.errors().iter().any(|e| e.contains("semicolon")));
    }

    #[test]
    fn test_illegal_token_reports_missing_prefix_handler() {
        let mut parser = Parser::new(Lexer::new("5 + @"));
        parser.parse_program();
        assert!(parser
            .prefix_errors()
            .iter()
            .any(|e| e.contains("no prefix handler for ILLEGAL")));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut parser = Parser::new(Lexer::new("let = 5; let y 10;"));
        parser.parse_program();
        assert!(parser.errors().len() >= 2, "errors: {:?}", parser.errors());
    }

    #[test]
    fn test_unclosed_block_is_error() {
        let mut parser = Parser::new(Lexer::new("if (x) { return 1;"));
        parser.parse_program();
        assert!(parser
            .errors()
            .iter()
            .any(|e| e.contains("right brace is expected")));
    }

    #[test]
    fn test_scope_call_display() {
        assert_statements("m::addY(10);", &["(m :: addY(10));"]);
    }
}
