use std::collections::VecDeque;
use std::fmt::{self, Display};

use super::error::{QueryErr, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Bool(bool),
    Num(String),
    Text(String),
    // 식별자
    Ident(String),
    // 명령어
    CreateTable, // CREATE_TABLE
    DropTable,   // DROP_TABLE
    ListTables,  // LIST_TABLES
    Insert,      // INSERT
    Select,      // SELECT
    Update,      // UPDATE
    Delete,      // DELETE
    Help,        // HELP
    Exit,        // EXIT
    // 키워드
    Into,   // INTO
    Values, // VALUES
    From,   // FROM
    Where,  // WHERE
    Set,    // SET
    // 구분자
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    Eq,        // =
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bool(b) => write!(f, "'{b}'"),
            Token::Num(n) => write!(f, "'{n}'"),
            Token::Text(t) => write!(f, "\"{t}\""),
            Token::Ident(i) => write!(f, "'{i}'"),
            Token::Comma => f.write_str("','"),
            Token::Colon => f.write_str("':'"),
            Token::Semicolon => f.write_str("';'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Eq => f.write_str("'='"),
            keyword => write!(f, "keyword '{}'", keyword.word().unwrap_or_default()),
        }
    }
}

impl Token {
    /// Lowercase spelling of a command or keyword token.
    pub fn word(&self) -> Option<&'static str> {
        let word = match self {
            Token::CreateTable => "create_table",
            Token::DropTable => "drop_table",
            Token::ListTables => "list_tables",
            Token::Insert => "insert",
            Token::Select => "select",
            Token::Update => "update",
            Token::Delete => "delete",
            Token::Help => "help",
            Token::Exit => "exit",
            Token::Into => "into",
            Token::Values => "values",
            Token::From => "from",
            Token::Where => "where",
            Token::Set => "set",
            _ => return None,
        };
        Some(word)
    }
}

pub struct Lexer {
    src: VecDeque<char>,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
        }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_digit(ch: char) -> bool {
        ch.is_ascii_digit()
    }

    pub fn finished(&mut self) -> bool {
        self.skip_ws();
        self.src.is_empty()
    }

    fn curr(&self) -> Option<char> {
        self.src.front().copied()
    }

    fn walk(&mut self) -> Option<char> {
        self.src.pop_front()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.walk();
        }
    }

    pub fn next(&mut self) -> Result<Token> {
        self.skip_ws();
        let ch = self.walk().ok_or(QueryErr::UnexpectedEof)?;
        Ok(match ch {
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' => Token::Eq,
            '\'' | '"' => self.lex_text(ch)?,
            '-' if self.curr().is_some_and(Self::is_digit) => self.lex_num(ch)?,
            _ if Self::is_digit(ch) => self.lex_num(ch)?,
            _ if Self::is_letter(ch) => self.lex_keyword(ch),
            _ => return Err(QueryErr::InvalidToken(ch)),
        })
    }

    /// Lexes the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        while !self.finished() {
            out.push(self.next()?);
        }
        Ok(out)
    }

    fn lex_num(&mut self, start: char) -> Result<Token> {
        let mut out = String::from(start);
        while let Some(ch) = self.curr() {
            if Self::is_digit(ch) || ch == '.' {
                out.push(ch);
                self.walk();
            } else if Self::is_letter(ch) {
                out.push(ch);
                return Err(QueryErr::InvalidNum(out));
            } else {
                break;
            }
        }
        Ok(Token::Num(out))
    }

    fn lex_text(&mut self, quote: char) -> Result<Token> {
        let mut out = String::new();
        while let Some(ch) = self.walk() {
            if ch == quote {
                return Ok(Token::Text(out));
            } else if ch == '\\' {
                let esc = self.walk().ok_or(QueryErr::UnterminatedText)?;
                match esc {
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    _ => {
                        out.push(ch);
                        out.push(esc);
                    }
                }
            } else {
                out.push(ch);
            }
        }
        Err(QueryErr::UnterminatedText)
    }

    fn lex_keyword(&mut self, start: char) -> Token {
        let mut out = String::from(start);
        while let Some(ch) = self.curr()
            && (Self::is_letter(ch) || Self::is_digit(ch))
        {
            out.push(ch);
            self.walk();
        }
        // 키워드 매칭
        match out.to_uppercase().as_str() {
            "TRUE" => Token::Bool(true),
            "FALSE" => Token::Bool(false),
            "CREATE_TABLE" => Token::CreateTable,
            "DROP_TABLE" => Token::DropTable,
            "LIST_TABLES" => Token::ListTables,
            "INSERT" => Token::Insert,
            "SELECT" => Token::Select,
            "UPDATE" => Token::Update,
            "DELETE" => Token::Delete,
            "HELP" => Token::Help,
            "EXIT" => Token::Exit,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "SET" => Token::Set,
            _ => Token::Ident(out),
        }
    }
}
