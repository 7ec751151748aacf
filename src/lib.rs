//! This crate contains a toolchain for the While language, whose only data
//! type is the binary tree: a lexer, a parser, an evaluator, and a parser and
//! printers for tree literals.

pub mod end_to_end;
pub mod lexical_analysis;
pub mod program_execution;
pub mod program_representation;
pub mod recursive_descent_parsing;
pub mod tree_notation;
pub mod tree_value;
