use std::collections::VecDeque;

use super::error::{QueryErr, Result};
use super::lexer::{Lexer, Token};
use crate::executor::rows::{Predicate, SetClause};
use crate::storage::DataValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    CreateTable {
        table: Box<str>,
        columns: Vec<(Box<str>, Box<str>)>,
    },
    DropTable {
        table: Box<str>,
    },
    ListTables,
    Insert {
        table: Box<str>,
        values: Vec<DataValue>,
    },
    Select {
        table: Box<str>,
        filter: Option<Predicate>,
    },
    Update {
        table: Box<str>,
        assigns: SetClause,
        filter: Option<Predicate>,
    },
    Delete {
        table: Box<str>,
        filter: Option<Predicate>,
    },
    Help,
    Exit,
}

impl Stmt {
    pub fn verb(&self) -> &'static str {
        match self {
            Stmt::CreateTable { .. } => "create_table",
            Stmt::DropTable { .. } => "drop_table",
            Stmt::ListTables => "list_tables",
            Stmt::Insert { .. } => "insert",
            Stmt::Select { .. } => "select",
            Stmt::Update { .. } => "update",
            Stmt::Delete { .. } => "delete",
            Stmt::Help => "help",
            Stmt::Exit => "exit",
        }
    }

    /// Statements the shell must confirm before running.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Stmt::DropTable { .. } | Stmt::Delete { .. })
    }
}

pub struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self> {
        let mut tokens: VecDeque<Token> = lexer.tokenize()?.into();
        while tokens.back() == Some(&Token::Semicolon) {
            tokens.pop_back();
        }
        Ok(Self { tokens })
    }

    pub fn parse(mut self) -> Result<Stmt> {
        let head = self.tokens.pop_front().ok_or(QueryErr::Empty)?;
        let stmt = match head {
            Token::CreateTable => self.parse_create()?,
            Token::DropTable => Stmt::DropTable {
                table: self.ident("table name")?,
            },
            Token::ListTables => Stmt::ListTables,
            Token::Insert => self.parse_insert()?,
            Token::Select => {
                self.skip(&Token::From);
                Stmt::Select {
                    table: self.ident("table name")?,
                    filter: self.parse_where()?,
                }
            }
            Token::Update => self.parse_update()?,
            Token::Delete => {
                self.skip(&Token::From);
                Stmt::Delete {
                    table: self.ident("table name")?,
                    filter: self.parse_where()?,
                }
            }
            Token::Help => Stmt::Help,
            Token::Exit => Stmt::Exit,
            Token::Ident(word) => return Err(QueryErr::UnknownCommand(word)),
            other => return Err(QueryErr::UnknownCommand(other.to_string())),
        };
        self.expect_end()?;
        Ok(stmt)
    }

    fn parse_create(&mut self) -> Result<Stmt> {
        let table = self.ident("table name")?;
        let mut columns = Vec::new();
        while !self.tokens.is_empty() {
            let name = self.ident("column name")?;
            self.expect(Token::Colon)?;
            let ty = self.ident("column type")?;
            columns.push((name, ty));
            self.skip(&Token::Comma);
        }
        Ok(Stmt::CreateTable { table, columns })
    }

    fn parse_insert(&mut self) -> Result<Stmt> {
        self.skip(&Token::Into);
        let table = self.ident("table name")?;
        self.skip(&Token::Values);
        let wrapped = self.skip(&Token::LParen);
        let mut values = Vec::new();
        loop {
            match self.tokens.front() {
                None => break,
                Some(Token::RParen) if wrapped => {
                    self.tokens.pop_front();
                    break;
                }
                Some(Token::Comma) => {
                    self.tokens.pop_front();
                }
                Some(_) => values.push(self.value()?),
            }
        }
        Ok(Stmt::Insert { table, values })
    }

    fn parse_update(&mut self) -> Result<Stmt> {
        let table = self.ident("table name")?;
        self.expect(Token::Set)?;
        let mut assigns = SetClause::new();
        loop {
            let column = self.ident("column name")?;
            self.expect(Token::Eq)?;
            assigns.insert(column.into(), self.value()?);
            if !self.skip(&Token::Comma) {
                break;
            }
        }
        Ok(Stmt::Update {
            table,
            assigns,
            filter: self.parse_where()?,
        })
    }

    fn parse_where(&mut self) -> Result<Option<Predicate>> {
        if !self.skip(&Token::Where) {
            return Ok(None);
        }
        let column = self.ident("column name")?;
        self.expect(Token::Eq)?;
        let value = self.value()?;
        Ok(Some(Predicate::from([(String::from(column), value)])))
    }

    fn ident(&mut self, expected: &str) -> Result<Box<str>> {
        match self.tokens.pop_front() {
            Some(Token::Ident(name)) => Ok(name.into()),
            Some(other) => Err(QueryErr::UnexpectedToken {
                expected: expected.to_string(),
                found: other.to_string(),
            }),
            None => Err(QueryErr::UnexpectedEof),
        }
    }

    /// A literal. Bare words, keywords included, are read as text.
    fn value(&mut self) -> Result<DataValue> {
        match self.tokens.pop_front() {
            Some(Token::Num(n)) => Ok(n
                .parse::<i64>()
                .map(DataValue::Int)
                .unwrap_or(DataValue::Str(n))),
            Some(Token::Text(t) | Token::Ident(t)) => Ok(DataValue::Str(t)),
            Some(Token::Bool(b)) => Ok(DataValue::Bool(b)),
            Some(other) => match other.word() {
                Some(word) => Ok(DataValue::Str(word.to_string())),
                None => Err(QueryErr::UnexpectedToken {
                    expected: "value".to_string(),
                    found: other.to_string(),
                }),
            },
            None => Err(QueryErr::UnexpectedEof),
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.tokens.pop_front() {
            Some(found) if found == token => Ok(()),
            Some(found) => Err(QueryErr::UnexpectedToken {
                expected: token.to_string(),
                found: found.to_string(),
            }),
            None => Err(QueryErr::UnexpectedEof),
        }
    }

    /// Consumes `token` if it comes next.
    fn skip(&mut self, token: &Token) -> bool {
        if self.tokens.front() == Some(token) {
            self.tokens.pop_front();
            true
        } else {
            false
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.tokens.pop_front() {
            None => Ok(()),
            Some(found) => Err(QueryErr::UnexpectedToken {
                expected: "end of command".to_string(),
                found: found.to_string(),
            }),
        }
    }
}

/// Lexes and parses one command line.
pub fn parse(src: &str) -> Result<Stmt> {
    Parser::new(Lexer::new(src))?.parse()
}
