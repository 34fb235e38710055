// ABOUTME: Abstract syntax tree nodes with faithful pretty-printers

use crate::token::Token;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Expression,
    },
    Expression {
        expression: Expression,
    },
    Block(Block),
    Import {
        token: Token,
        path: String,
        name: Identifier,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Statement::Return { value, .. } => write!(f, "return {};", value),
            Statement::Expression { expression } => write!(f, "{};", expression),
            Statement::Block(block) => write!(f, "{}", block),
            Statement::Import { path, name, .. } => {
                write!(f, "import \"{}\" as {}", path, name)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Integer {
        token: Token,
        value: i64,
    },
    Str {
        token: Token,
        value: String,
    },
    Bool {
        token: Token,
        value: bool,
    },
    Identifier(Identifier),
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        token: Token,
        params: Vec<Identifier>,
        body: Rc<Block>,
    },
    Call {
        token: Token,
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Transient node for a parenthesized parameter list; it only exists
    /// between the parser seeing `(a, b)` and the following `=>`.
    Params {
        token: Token,
        params: Vec<Identifier>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer { value, .. } => write!(f, "{}", value),
            Expression::Str { value, .. } => write!(f, "{}", value),
            Expression::Bool { value, .. } => write!(f, "{}", value),
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "{}({})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if({}){}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else{}", alternative)?;
                }
                Ok(())
            }
            Expression::Function { params, body, .. } => {
                write!(f, "({})=>{}", join_identifiers(params), body)
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", callee, arguments.join(","))
            }
            Expression::Params { params, .. } => write!(f, "({})", join_identifiers(params)),
        }
    }
}

fn join_identifiers(identifiers: &[Identifier]) -> String {
    identifiers
        .iter()
        .map(|identifier| identifier.name.clone())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}
