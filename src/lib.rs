pub mod error;
pub mod executor;
pub mod isa;
pub mod lexer;
pub mod log;
pub mod parser;
pub mod program;
pub mod registers;
pub mod runner;
