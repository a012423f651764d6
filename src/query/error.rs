use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryErr>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryErr {
    #[error("empty command")]
    Empty,
    #[error("unexpected end of command")]
    UnexpectedEof,
    #[error("invalid number '{0}'")]
    InvalidNum(String),
    #[error("unterminated quoted text")]
    UnterminatedText,
    #[error("invalid character '{0}'")]
    InvalidToken(char),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unknown command '{0}', type 'help' for the list of commands")]
    UnknownCommand(String),
}
