pub mod cmd;
pub mod parser;
