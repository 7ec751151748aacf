//! Executes While programs against an explicit environment.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::program_representation::{Command, ExprNode, Program, UnaryOperator};
use crate::tree_value::{unary_number, Tree};

/// Variable name to value. Ordered so that printed environments are stable.
pub type Bindings = BTreeMap<String, Tree>;

/// Errors that abort a run.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Line {line_num}: {function} expects {expected} argument(s), found {found}.")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
        line_num: usize,
    },

    #[error("Line {line_num}: unknown function {name:?}.")]
    UnknownFunction { name: String, line_num: usize },

    #[error("Line {line_num}: execution budget of {max_steps} steps exhausted.")]
    BudgetExceeded { max_steps: u64, line_num: usize },
}

/// Optional bounds on a run. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Commands executed plus loop conditions tested.
    pub max_steps: Option<u64>,
}

/// What a finished run hands back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub final_bindings: Bindings,
    pub output_log: Vec<Tree>,
}

/// The state of one run: current bindings, the output log, and the
/// host-supplied values. Those values are bound before the first command runs,
/// and `read` rebinds a variable to its host value.
///
/// If a run fails, whatever was written before the failing command is still
/// available through `output_log`.
#[derive(Debug)]
pub struct Interpreter<'a> {
    initial_bindings: &'a Bindings,
    bindings: Bindings,
    output_log: Vec<Tree>,
    limits: ExecutionLimits,
    steps_taken: u64,
}

impl<'a> Interpreter<'a> {
    pub fn new(initial_bindings: &'a Bindings, limits: ExecutionLimits) -> Interpreter<'a> {
        return Interpreter {
            initial_bindings: initial_bindings,
            bindings: initial_bindings.clone(),
            output_log: Vec::new(),
            limits: limits,
            steps_taken: 0,
        };
    }

    pub fn bindings(&self) -> &Bindings {
        return &self.bindings;
    }

    pub fn output_log(&self) -> &[Tree] {
        return &self.output_log;
    }

    pub fn into_result(self) -> ExecutionResult {
        return ExecutionResult {
            final_bindings: self.bindings,
            output_log: self.output_log,
        };
    }

    fn take_step(&mut self, line_num: usize) -> Result<(), RuntimeError> {
        self.steps_taken += 1;

        match self.limits.max_steps {
            Some(max_steps) if self.steps_taken > max_steps => {
                return Err(RuntimeError::BudgetExceeded {
                    max_steps: max_steps,
                    line_num: line_num,
                });
            }
            _ => return Ok(()),
        }
    }

    /// Runs the program's commands in order.
    pub fn execute_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        return self.execute_commands(&program.commands);
    }

    fn execute_commands(&mut self, commands: &[Command]) -> Result<(), RuntimeError> {
        for command in commands {
            self.execute_command(command)?;
        }

        return Ok(());
    }

    fn execute_command(&mut self, command: &Command) -> Result<(), RuntimeError> {
        self.take_step(command.line_num())?;

        match command {
            Command::Assign {
                var_name,
                value,
                line_num,
            } => {
                let result = self.eval_expr(value, *line_num)?;
                debug!(line_num, var_name = var_name.as_str(), value = %result, "assign");
                self.bindings.insert(var_name.clone(), result);
            }

            Command::While {
                condition,
                body,
                line_num,
            } => {
                while !self.eval_expr(condition, *line_num)?.is_nil() {
                    self.execute_commands(body)?;
                    self.take_step(*line_num)?;
                }
            }

            Command::If {
                condition,
                then_branch,
                else_branch,
                line_num,
            } => {
                let branch = match self.eval_expr(condition, *line_num)?.is_nil() {
                    false => then_branch,
                    true => else_branch,
                };
                self.execute_commands(branch)?;
            }

            Command::Read { var_name, line_num } => {
                let value = self
                    .initial_bindings
                    .get(var_name)
                    .cloned()
                    .unwrap_or(Tree::Nil);
                debug!(line_num, var_name = var_name.as_str(), value = %value, "read");
                self.bindings.insert(var_name.clone(), value);
            }

            Command::Write { value, line_num } => {
                let result = self.eval_expr(value, *line_num)?;
                debug!(line_num, value = %result, "write");
                self.output_log.push(result);
            }
        };

        return Ok(());
    }

    /// Evaluates an expression under the current bindings. `line_num` is the
    /// line of the enclosing command, used for error reporting.
    pub fn eval_expr(&self, expr: &ExprNode, line_num: usize) -> Result<Tree, RuntimeError> {
        trace!(line_num, expr = %expr, "eval");

        match expr {
            ExprNode::NumberLiteral { value } => return Ok(unary_number(*value)),

            ExprNode::NilLiteral => return Ok(Tree::Nil),

            ExprNode::Variable { var_name } => {
                return Ok(self.bindings.get(var_name).cloned().unwrap_or(Tree::Nil));
            }

            ExprNode::PairLiteral { left, right } => {
                let left = self.eval_expr(left, line_num)?;
                let right = self.eval_expr(right, line_num)?;
                return Ok(Tree::cons(left, right));
            }

            ExprNode::Call { fn_name, args } => {
                return self.eval_call(fn_name, args, line_num);
            }

            ExprNode::UnaryOp { operator, operand } => {
                let operand = self.eval_expr(operand, line_num)?;
                return Ok(apply_unary_operator(*operator, &operand));
            }
        }
    }

    // Arguments are evaluated left to right before the callee is resolved, so
    // an unknown function nested in an argument is the error reported.
    fn eval_call(
        &self,
        fn_name: &str,
        args: &[ExprNode],
        line_num: usize,
    ) -> Result<Tree, RuntimeError> {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg, line_num)?);
        }

        let expected = match fn_name {
            "cons" => 2,
            "hd" | "tl" => 1,
            _ => {
                return Err(RuntimeError::UnknownFunction {
                    name: String::from(fn_name),
                    line_num: line_num,
                })
            }
        };

        if arg_values.len() != expected {
            return Err(RuntimeError::Arity {
                function: String::from(fn_name),
                expected: expected,
                found: arg_values.len(),
                line_num: line_num,
            });
        }

        match fn_name {
            "cons" => return Ok(Tree::cons(arg_values[0].clone(), arg_values[1].clone())),
            "hd" => return Ok(arg_values[0].head()),
            _ => return Ok(arg_values[0].tail()),
        }
    }
}

/// Applies a prefix operator. All four are total: shapes they do not expect
/// give `Nil`.
pub fn apply_unary_operator(operator: UnaryOperator, operand: &Tree) -> Tree {
    match operator {
        UnaryOperator::Hd => return operand.head(),
        UnaryOperator::Tl => return operand.tail(),
        UnaryOperator::Succ => return Tree::cons(Tree::Nil, operand.clone()),
        UnaryOperator::Pred => match operand {
            Tree::Pair(left, right) if left.is_nil() => return (**right).clone(),
            _ => return Tree::Nil,
        },
    }
}

/// Runs a program to completion with no step budget.
pub fn run(program: &Program, initial_bindings: &Bindings) -> Result<ExecutionResult, RuntimeError> {
    return run_with_limits(program, initial_bindings, ExecutionLimits::default());
}

/// Runs a program to completion, failing once `limits` are exceeded.
pub fn run_with_limits(
    program: &Program,
    initial_bindings: &Bindings,
    limits: ExecutionLimits,
) -> Result<ExecutionResult, RuntimeError> {
    let mut interpreter = Interpreter::new(initial_bindings, limits);
    interpreter.execute_program(program)?;
    return Ok(interpreter.into_result());
}
