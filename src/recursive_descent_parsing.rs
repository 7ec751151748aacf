//! Recursive descent parser that builds While programs from a token vector.
//!
//! Every choice point is decided by looking at the next token (the keyword or
//! punctuation at the current position), so the parser never backtracks.

use thiserror::Error;
use tracing::debug;

use crate::lexical_analysis::{Token, TokenClass};
use crate::program_representation::{Command, ExprNode, Program, UnaryOperator};

/// Represents a parsing error. Shared by the program parser and the tree
/// notation parser.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line {line_num}: expected {expected}, found {found:?}.\n{line_text}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line_num: usize,
        line_text: String,
    },

    #[error("Unexpected end of input, expected {expected}.")]
    UnexpectedEndOfInput { expected: String },

    #[error("Line {line_num}: integer literal {number_text} is too large.\n{line_text}")]
    InvalidNumber {
        number_text: String,
        line_num: usize,
        line_text: String,
    },

    #[error("Line {line_num}: unexpected {found:?} after a complete expression.\n{line_text}")]
    TrailingTokens {
        found: String,
        line_num: usize,
        line_text: String,
    },
}

impl ParseError {
    pub(crate) fn unexpected(token: &Token, expected: &str) -> ParseError {
        return ParseError::UnexpectedToken {
            expected: String::from(expected),
            found: token.token_text.clone(),
            line_num: token.line_num,
            line_text: token.line_text.clone(),
        };
    }
}

/// Returns the token at tokens[start_idx], or an end-of-input error naming what
/// was expected there.
pub(crate) fn try_any_token<'a>(
    tokens: &'a [Token],
    start_idx: usize,
    expected: &str,
) -> Result<&'a Token, ParseError> {
    match tokens.get(start_idx) {
        Some(token) => return Ok(token),
        None => {
            return Err(ParseError::UnexpectedEndOfInput {
                expected: String::from(expected),
            })
        }
    }
}

/// Tries to parse a token of the requested class at tokens[start_idx].
pub(crate) fn try_token_class<'a>(
    tokens: &'a [Token],
    start_idx: usize,
    token_class: TokenClass,
    expected: &str,
) -> Result<(&'a Token, usize), ParseError> {
    let token = try_any_token(tokens, start_idx, expected)?;

    match token.token_class == token_class {
        true => return Ok((token, start_idx + 1)),
        false => return Err(ParseError::unexpected(token, expected)),
    };
}

/// Tries to parse the given reserved word at tokens[start_idx].
fn try_keyword(tokens: &[Token], start_idx: usize, keyword: &str) -> Result<usize, ParseError> {
    let expected = format!("'{}'", keyword);
    let token = try_any_token(tokens, start_idx, expected.as_str())?;

    match is_keyword(tokens, start_idx, keyword) {
        true => return Ok(start_idx + 1),
        false => return Err(ParseError::unexpected(token, expected.as_str())),
    };
}

/// Checks whether tokens[idx] exists and has the given class.
pub(crate) fn is_token_class(tokens: &[Token], idx: usize, token_class: TokenClass) -> bool {
    return tokens
        .get(idx)
        .is_some_and(|token| token.token_class == token_class);
}

fn is_keyword(tokens: &[Token], idx: usize, keyword: &str) -> bool {
    return tokens.get(idx).is_some_and(|token| {
        token.token_class == TokenClass::Identifier && token.token_text == keyword
    });
}

// Words that may not name a variable.
const RESERVED_WORDS: [&str; 12] = [
    "nil", "while", "do", "if", "then", "else", "read", "write", "hd", "tl", "succ", "pred",
];

/// Tries to parse a variable name (an identifier that is not a reserved word)
/// at tokens[start_idx].
fn try_variable_name_rule<'a>(
    tokens: &'a [Token],
    start_idx: usize,
) -> Result<(&'a Token, usize), ParseError> {
    let (var_token, start_idx) =
        try_token_class(tokens, start_idx, TokenClass::Identifier, "variable name")?;

    if RESERVED_WORDS.contains(&var_token.token_text.as_str()) {
        return Err(ParseError::unexpected(var_token, "variable name"));
    }

    return Ok((var_token, start_idx));
}

/// Tries to parse a parenthesised group. The group is either the body of a
/// pair literal, `(nil . EXPR)`, or (when `allow_arguments` is set) a comma
/// separated argument list. Without `allow_arguments` exactly one expression
/// must sit between the parentheses.
fn try_parenthesised_group_rule(
    tokens: &[Token],
    start_idx: usize,
    allow_arguments: bool,
) -> Result<(Vec<ExprNode>, usize), ParseError> {
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::LeftParen, "'('")?;

    if allow_arguments && is_token_class(tokens, start_idx, TokenClass::RightParen) {
        return Ok((vec![], start_idx + 1));
    }

    let (first_expr, mut start_idx) = if is_keyword(tokens, start_idx, "nil") {
        if is_token_class(tokens, start_idx + 1, TokenClass::Dot) {
            let (right, start_idx) = try_expr_rule(tokens, start_idx + 2)?;
            let (_, start_idx) =
                try_token_class(tokens, start_idx, TokenClass::RightParen, "')'")?;

            return Ok((
                vec![ExprNode::PairLiteral {
                    left: Box::new(ExprNode::NilLiteral),
                    right: Box::new(right),
                }],
                start_idx,
            ));
        }

        (ExprNode::NilLiteral, start_idx + 1)
    } else {
        try_expr_rule(tokens, start_idx)?
    };

    let mut exprs = vec![first_expr];

    if allow_arguments {
        while is_token_class(tokens, start_idx, TokenClass::Comma) {
            let (arg, new_start_idx) = try_expr_rule(tokens, start_idx + 1)?;
            exprs.push(arg);
            start_idx = new_start_idx;
        }
    }

    let expected = match allow_arguments {
        true => "',' or ')'",
        false => "')'",
    };
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::RightParen, expected)?;

    return Ok((exprs, start_idx));
}

/// Tries to parse an expression that starts with an identifier: `nil`, a
/// prefix operator, a call, or a plain variable.
fn try_identifier_expr_rule(
    tokens: &[Token],
    start_idx: usize,
) -> Result<(ExprNode, usize), ParseError> {
    let (name_token, next_idx) =
        try_token_class(tokens, start_idx, TokenClass::Identifier, "identifier")?;
    let name = name_token.token_text.as_str();
    let call_follows = is_token_class(tokens, next_idx, TokenClass::LeftParen);

    if name == "nil" {
        return Ok((ExprNode::NilLiteral, next_idx));
    }

    // `succ`/`pred` are never callable; `hd`/`tl` take the call form when a
    // parenthesis follows, so the arity check applies to them.
    if let Some(operator) = UnaryOperator::from_keyword(name) {
        let is_prefix = match operator {
            UnaryOperator::Succ | UnaryOperator::Pred => true,
            UnaryOperator::Hd | UnaryOperator::Tl => !call_follows,
        };

        if is_prefix {
            let (operand, next_idx) = try_expr_rule(tokens, next_idx)?;
            return Ok((
                ExprNode::UnaryOp {
                    operator: operator,
                    operand: Box::new(operand),
                },
                next_idx,
            ));
        }
    }

    if call_follows {
        let (args, next_idx) = try_parenthesised_group_rule(tokens, next_idx, true)?;
        return Ok((
            ExprNode::Call {
                fn_name: String::from(name),
                args: args,
            },
            next_idx,
        ));
    }

    return Ok((
        ExprNode::Variable {
            var_name: String::from(name),
        },
        next_idx,
    ));
}

/// Tries to parse an expression.
fn try_expr_rule(tokens: &[Token], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    let token = try_any_token(tokens, start_idx, "expression")?;

    match token.token_class {
        TokenClass::Number => {
            let value = token
                .token_text
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidNumber {
                    number_text: token.token_text.clone(),
                    line_num: token.line_num,
                    line_text: token.line_text.clone(),
                })?;

            return Ok((ExprNode::NumberLiteral { value: value }, start_idx + 1));
        }

        TokenClass::LeftParen => {
            let (mut exprs, start_idx) = try_parenthesised_group_rule(tokens, start_idx, false)?;
            return Ok((exprs.remove(0), start_idx));
        }

        TokenClass::Identifier => {
            return try_identifier_expr_rule(tokens, start_idx);
        }

        _ => {
            return Err(ParseError::unexpected(token, "expression"));
        }
    }
}

/// Tries to parse a brace-delimited block of zero or more commands.
fn try_block_rule(tokens: &[Token], start_idx: usize) -> Result<(Vec<Command>, usize), ParseError> {
    let (_, mut start_idx) = try_token_class(tokens, start_idx, TokenClass::LeftBrace, "'{'")?;
    let mut commands = Vec::new();

    loop {
        let token = try_any_token(tokens, start_idx, "'}'")?;

        if token.token_class == TokenClass::RightBrace {
            return Ok((commands, start_idx + 1));
        }

        let (command, new_start_idx) = try_command_rule(tokens, start_idx)?;
        commands.push(command);
        start_idx = new_start_idx;
    }
}

/// Tries to parse `while EXPR do BLOCK [;]`.
fn try_while_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let line_num = tokens[start_idx].line_num;
    let start_idx = try_keyword(tokens, start_idx, "while")?;
    let (condition, start_idx) = try_expr_rule(tokens, start_idx)?;
    let start_idx = try_keyword(tokens, start_idx, "do")?;
    let (body, mut start_idx) = try_block_rule(tokens, start_idx)?;

    if is_token_class(tokens, start_idx, TokenClass::Semicolon) {
        start_idx += 1;
    }

    return Ok((
        Command::While {
            condition: condition,
            body: body,
            line_num: line_num,
        },
        start_idx,
    ));
}

/// Tries to parse `if EXPR then BLOCK [else BLOCK]`.
fn try_if_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let line_num = tokens[start_idx].line_num;
    let start_idx = try_keyword(tokens, start_idx, "if")?;
    let (condition, start_idx) = try_expr_rule(tokens, start_idx)?;
    let start_idx = try_keyword(tokens, start_idx, "then")?;
    let (then_branch, start_idx) = try_block_rule(tokens, start_idx)?;

    let (else_branch, start_idx) = match is_keyword(tokens, start_idx, "else") {
        true => try_block_rule(tokens, start_idx + 1)?,
        false => (vec![], start_idx),
    };

    return Ok((
        Command::If {
            condition: condition,
            then_branch: then_branch,
            else_branch: else_branch,
            line_num: line_num,
        },
        start_idx,
    ));
}

/// Tries to parse `read IDENTIFIER;`.
fn try_read_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let line_num = tokens[start_idx].line_num;
    let start_idx = try_keyword(tokens, start_idx, "read")?;
    let (var_token, start_idx) = try_variable_name_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Semicolon, "';'")?;

    return Ok((
        Command::Read {
            var_name: var_token.token_text.clone(),
            line_num: line_num,
        },
        start_idx,
    ));
}

/// Tries to parse `write EXPR;`.
fn try_write_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let line_num = tokens[start_idx].line_num;
    let start_idx = try_keyword(tokens, start_idx, "write")?;
    let (value, start_idx) = try_expr_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Semicolon, "';'")?;

    return Ok((
        Command::Write {
            value: value,
            line_num: line_num,
        },
        start_idx,
    ));
}

/// Tries to parse `IDENTIFIER := EXPR;`.
fn try_assign_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let (var_token, start_idx) = try_variable_name_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Assign, "':='")?;
    let (value, start_idx) = try_expr_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Semicolon, "';'")?;

    return Ok((
        Command::Assign {
            var_name: var_token.token_text.clone(),
            value: value,
            line_num: var_token.line_num,
        },
        start_idx,
    ));
}

/// Tries to parse a single command, choosing the production by its first
/// token.
fn try_command_rule(tokens: &[Token], start_idx: usize) -> Result<(Command, usize), ParseError> {
    let token = try_any_token(tokens, start_idx, "command")?;

    if token.token_class != TokenClass::Identifier {
        return Err(ParseError::unexpected(token, "command"));
    }

    match token.token_text.as_str() {
        "while" => return try_while_rule(tokens, start_idx),
        "if" => return try_if_rule(tokens, start_idx),
        "read" => return try_read_rule(tokens, start_idx),
        "write" => return try_write_rule(tokens, start_idx),
        _ => return try_assign_rule(tokens, start_idx),
    }
}

/// Uses recursive descent to parse the given tokens into a `Program`.
///
/// Assumes that the input tokens have discarded whitespace and comments
/// (i.e. they were produced via run_lexical_analysis with
/// `discard_uninteresting = true`).
pub fn parse_recursive_descent(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut commands = Vec::new();
    let mut start_idx = 0;

    while start_idx < tokens.len() {
        let (command, new_start_idx) = try_command_rule(tokens, start_idx)?;
        commands.push(command);
        start_idx = new_start_idx;
    }

    debug!(commands = commands.len(), "parsed program");

    return Ok(Program { commands: commands });
}
