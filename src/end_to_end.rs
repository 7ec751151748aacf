//! Code to configure and run the interpreter on a source code file.

use std::fs;

use clap::Parser;
use thiserror::Error;
use tracing::{debug, info};

use crate::lexical_analysis::{run_lexical_analysis, LexError, LexMode};
use crate::program_execution::{
    Bindings, ExecutionLimits, ExecutionResult, Interpreter, RuntimeError,
};
use crate::program_representation::Program;
use crate::recursive_descent_parsing::{parse_recursive_descent, ParseError};
use crate::tree_notation::{check_tree_literal, print_dot, print_list, LiteralStatus};
use crate::tree_value::{tree_to_number, Tree};

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The While program to run.
    #[arg(short, long)]
    pub src_filepath: String,

    /// Tree literal (dot or list notation) supplied to `read` of the input
    /// variable.
    #[arg(short, long)]
    pub input: Option<String>,

    /// Variable that the input literal is bound to.
    #[arg(long, default_value_t = String::from("x"))]
    pub input_var: String,

    /// Variable reported as the program's result.
    #[arg(short, long, default_value_t = String::from("y"))]
    pub output_var: String,

    /// Abort after this many execution steps instead of looping forever.
    #[arg(short, long)]
    pub max_steps: Option<u64>,

    /// Log every executed command.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Errors that may be thrown when running the interpreter.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Input file error: {0}")]
    InputFile(#[from] std::io::Error),

    #[error("Input for {var_name} is incomplete: it is empty or has unclosed parentheses.")]
    IncompleteInput { var_name: String },

    #[error("Input for {var_name} is invalid: {reason}")]
    InvalidInput { var_name: String, reason: String },

    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Carries whatever the program wrote before it failed.
    #[error("Runtime error: {source}")]
    Runtime {
        source: RuntimeError,
        partial_output: Vec<Tree>,
    },
}

/// Lexes and parses While source text.
pub fn parse_program_source(program_str: &str) -> Result<Program, RunError> {
    let tokens = run_lexical_analysis(program_str, LexMode::WhileProgram, true)?;
    debug!(tokens = tokens.len(), "lexed program");

    return Ok(parse_recursive_descent(&tokens)?);
}

/// Builds the initial bindings from an optional input literal.
pub fn load_initial_bindings(
    input_literal: Option<&str>,
    input_var: &str,
) -> Result<Bindings, RunError> {
    let mut initial_bindings = Bindings::new();

    let Some(literal_str) = input_literal else {
        return Ok(initial_bindings);
    };

    match check_tree_literal(literal_str) {
        LiteralStatus::Complete(tree) => {
            debug!(var_name = input_var, value = %tree, "loaded input");
            initial_bindings.insert(String::from(input_var), tree);
        }
        LiteralStatus::Partial => {
            return Err(RunError::IncompleteInput {
                var_name: String::from(input_var),
            });
        }
        LiteralStatus::Invalid(reason) => {
            return Err(RunError::InvalidInput {
                var_name: String::from(input_var),
                reason: reason,
            });
        }
    }

    return Ok(initial_bindings);
}

/// Parses and runs While source text. On a runtime failure the output written
/// so far travels with the error.
pub fn run_program_source(
    program_str: &str,
    initial_bindings: &Bindings,
    limits: ExecutionLimits,
) -> Result<ExecutionResult, RunError> {
    let program = parse_program_source(program_str)?;
    let mut interpreter = Interpreter::new(initial_bindings, limits);

    if let Err(runtime_error) = interpreter.execute_program(&program) {
        return Err(RunError::Runtime {
            source: runtime_error,
            partial_output: interpreter.output_log().to_vec(),
        });
    }

    return Ok(interpreter.into_result());
}

/// One-line description of a tree in both notations plus its numeric reading.
pub fn describe_tree(tree: &Tree) -> String {
    return format!(
        "{}  |  list: {}  |  number: {}",
        print_dot(tree),
        print_list(tree),
        tree_to_number(tree)
    );
}

fn output_log_to_string(output_log: &[Tree], out: &mut Vec<String>) {
    if output_log.is_empty() {
        out.push(String::from("Output log: (empty)"));
        return;
    }

    out.push(String::from("Output log:"));
    for (idx, tree) in output_log.iter().enumerate() {
        out.push(format!("  #{}: {}", idx + 1, describe_tree(tree)));
    }
}

/// Converts an ExecutionResult to a String.
pub fn execution_result_to_string(execution_result: &ExecutionResult, output_var: &str) -> String {
    let mut out = vec![];

    output_log_to_string(&execution_result.output_log, &mut out);

    out.push(String::from("Final bindings:"));
    for (var_name, tree) in &execution_result.final_bindings {
        out.push(format!("  {}: {}", var_name, describe_tree(tree)));
    }

    match execution_result.final_bindings.get(output_var) {
        Some(tree) => {
            out.push(format!("Output variable {}:", output_var));
            out.push(format!("  tree notation: {}", print_dot(tree)));
            out.push(format!("  list notation: {}", print_list(tree)));
        }
        None => {
            out.push(format!("No output variable {} was produced.", output_var));
        }
    }

    return out.join("\n");
}

/// Converts a RunError to a String, including any partial output.
pub fn run_error_to_string(run_error: &RunError) -> String {
    let mut out = vec![run_error.to_string()];

    if let RunError::Runtime { partial_output, .. } = run_error {
        output_log_to_string(partial_output, &mut out);
    }

    return out.join("\n");
}

/// Run the interpreter (i.e. the lexer, parser, and code execution) given an
/// interpreter config.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(&config.src_filepath)?;
    info!(path = config.src_filepath.as_str(), "running program");

    let initial_bindings =
        load_initial_bindings(config.input.as_deref(), config.input_var.as_str())?;

    let limits = ExecutionLimits {
        max_steps: config.max_steps,
    };

    let execution_result = run_program_source(&program_string, &initial_bindings, limits)?;

    return Ok(execution_result_to_string(
        &execution_result,
        config.output_var.as_str(),
    ));
}
