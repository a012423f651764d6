pub mod error;
pub mod lexer;
pub mod parser;

pub use error::QueryErr;
pub use lexer::{Lexer, Token};
pub use parser::{Parser, Stmt, parse};
