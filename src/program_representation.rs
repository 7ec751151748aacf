//! Data structures to represent While programs, and a printer that turns them
//! back into source text.

/// The prefix operators of the expression language.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Hd,
    Tl,
    Succ,
    Pred,
}

impl UnaryOperator {
    pub fn from_keyword(keyword: &str) -> Option<UnaryOperator> {
        match keyword {
            "hd" => return Some(UnaryOperator::Hd),
            "tl" => return Some(UnaryOperator::Tl),
            "succ" => return Some(UnaryOperator::Succ),
            "pred" => return Some(UnaryOperator::Pred),
            _ => return None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            UnaryOperator::Hd => return "hd",
            UnaryOperator::Tl => return "tl",
            UnaryOperator::Succ => return "succ",
            UnaryOperator::Pred => return "pred",
        }
    }
}

/// Represents a While expression.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExprNode {
    NumberLiteral {
        value: usize,
    },
    Variable {
        var_name: String,
    },
    NilLiteral,
    /// `(nil . e)`; the parser always puts `NilLiteral` on the left.
    PairLiteral {
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    Call {
        fn_name: String,
        args: Vec<ExprNode>,
    },
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<ExprNode>,
    },
}

/// Represents a While command. Every command remembers the line it started on.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    Assign {
        var_name: String,
        value: ExprNode,
        line_num: usize,
    },
    While {
        condition: ExprNode,
        body: Vec<Command>,
        line_num: usize,
    },
    If {
        condition: ExprNode,
        then_branch: Vec<Command>,
        else_branch: Vec<Command>,
        line_num: usize,
    },
    Read {
        var_name: String,
        line_num: usize,
    },
    Write {
        value: ExprNode,
        line_num: usize,
    },
}

impl Command {
    pub fn line_num(&self) -> usize {
        match self {
            Command::Assign { line_num, .. }
            | Command::While { line_num, .. }
            | Command::If { line_num, .. }
            | Command::Read { line_num, .. }
            | Command::Write { line_num, .. } => return *line_num,
        }
    }
}

/// A parsed While program: the top-level command sequence.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Program {
    pub commands: Vec<Command>,
}

// Helper function to produce the source form of an ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::NumberLiteral { value } => {
            string_so_far.push_str(value.to_string().as_str());
        }
        ExprNode::Variable { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::NilLiteral => {
            string_so_far.push_str("nil");
        }
        ExprNode::PairLiteral { left, right } => {
            string_so_far.push('(');
            expr_node_to_string_helper(left, string_so_far);
            string_so_far.push_str(" . ");
            expr_node_to_string_helper(right, string_so_far);
            string_so_far.push(')');
        }
        ExprNode::Call { fn_name, args } => {
            string_so_far.push_str(fn_name.as_str());
            string_so_far.push('(');

            for (idx, arg) in args.iter().enumerate() {
                if idx > 0 {
                    string_so_far.push_str(", ");
                }
                expr_node_to_string_helper(arg, string_so_far);
            }

            string_so_far.push(')');
        }
        ExprNode::UnaryOp { operator, operand } => {
            string_so_far.push_str(operator.keyword());
            string_so_far.push(' ');
            expr_node_to_string_helper(operand, string_so_far);
        }
    };
}

// Converts an expr node to a string.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

fn push_indent(depth: usize, string_so_far: &mut String) {
    for _ in 0..depth {
        string_so_far.push_str("    ");
    }
}

fn push_block(commands: &[Command], depth: usize, string_so_far: &mut String) {
    string_so_far.push_str("{\n");
    for command in commands {
        command_to_string_helper(command, depth + 1, string_so_far);
    }
    push_indent(depth, string_so_far);
    string_so_far.push('}');
}

fn command_to_string_helper(command: &Command, depth: usize, string_so_far: &mut String) {
    push_indent(depth, string_so_far);

    match command {
        Command::Assign {
            var_name, value, ..
        } => {
            string_so_far.push_str(format!("{} := {};", var_name, value).as_str());
        }
        Command::While {
            condition, body, ..
        } => {
            string_so_far.push_str(format!("while {} do ", condition).as_str());
            push_block(body, depth, string_so_far);
        }
        Command::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            string_so_far.push_str(format!("if {} then ", condition).as_str());
            push_block(then_branch, depth, string_so_far);

            if !else_branch.is_empty() {
                string_so_far.push_str(" else ");
                push_block(else_branch, depth, string_so_far);
            }
        }
        Command::Read { var_name, .. } => {
            string_so_far.push_str(format!("read {};", var_name).as_str());
        }
        Command::Write { value, .. } => {
            string_so_far.push_str(format!("write {};", value).as_str());
        }
    };

    string_so_far.push('\n');
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out_string = String::new();
        command_to_string_helper(self, 0, &mut out_string);
        return write!(f, "{}", out_string.trim_end());
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out_string = String::new();
        for command in &self.commands {
            command_to_string_helper(command, 0, &mut out_string);
        }
        return write!(f, "{}", out_string);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn var(var_name: &str) -> ExprNode {
        return ExprNode::Variable {
            var_name: String::from(var_name),
        };
    }

    #[test]
    fn test_expr_node_to_string() {
        let test_input = ExprNode::Call {
            fn_name: String::from("cons"),
            args: vec![
                ExprNode::UnaryOp {
                    operator: UnaryOperator::Hd,
                    operand: Box::new(var("x")),
                },
                ExprNode::PairLiteral {
                    left: Box::new(ExprNode::NilLiteral),
                    right: Box::new(ExprNode::NumberLiteral { value: 2 }),
                },
            ],
        };

        assert_eq!(test_input.to_string(), "cons(hd x, (nil . 2))");
    }

    #[test]
    fn test_program_to_string() {
        let program = Program {
            commands: vec![
                Command::Read {
                    var_name: String::from("x"),
                    line_num: 1,
                },
                Command::While {
                    condition: var("x"),
                    body: vec![Command::Assign {
                        var_name: String::from("x"),
                        value: ExprNode::UnaryOp {
                            operator: UnaryOperator::Tl,
                            operand: Box::new(var("x")),
                        },
                        line_num: 3,
                    }],
                    line_num: 2,
                },
                Command::If {
                    condition: var("x"),
                    then_branch: vec![],
                    else_branch: vec![Command::Write {
                        value: ExprNode::NilLiteral,
                        line_num: 5,
                    }],
                    line_num: 5,
                },
            ],
        };

        let expected_output = "read x;
while x do {
    x := tl x;
}
if x then {
} else {
    write nil;
}
";

        assert_eq!(program.to_string(), expected_output);
    }

    #[test]
    fn test_operator_keywords() {
        for operator in [
            UnaryOperator::Hd,
            UnaryOperator::Tl,
            UnaryOperator::Succ,
            UnaryOperator::Pred,
        ] {
            assert_eq!(UnaryOperator::from_keyword(operator.keyword()), Some(operator));
        }
        assert_eq!(UnaryOperator::from_keyword("cons"), None);
    }
}
