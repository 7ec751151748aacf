//! Parser and printers for the two textual tree notations: dot notation,
//! `( a . ( b . nil ) )`, and list notation, `(a b)`. The parser accepts
//! either notation and any mix of the two.

use thiserror::Error;

use crate::lexical_analysis::{run_lexical_analysis, LexError, LexMode, Token, TokenClass};
use crate::recursive_descent_parsing::{try_any_token, try_token_class, ParseError};
use crate::tree_value::Tree;

/// Errors from turning tree literal text into a tree.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum TreeLiteralError {
    #[error("Invalid tree literal: {0}")]
    Lex(#[from] LexError),

    #[error("Invalid tree literal: {0}")]
    Parse(#[from] ParseError),
}

/// How far a (possibly half-typed) tree literal is from being usable.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LiteralStatus {
    Complete(Tree),
    /// Empty, or some parentheses are still open.
    Partial,
    Invalid(String),
}

// Tries to parse `nil | IDENTIFIER | () | (SEQ)`.
fn try_tree_expr_rule(tokens: &[Token], start_idx: usize) -> Result<(Tree, usize), ParseError> {
    let token = try_any_token(tokens, start_idx, "tree expression")?;

    match token.token_class {
        TokenClass::Nil => return Ok((Tree::Nil, start_idx + 1)),
        TokenClass::Identifier => return Ok((Tree::atom(&token.token_text), start_idx + 1)),
        TokenClass::LeftParen => {
            let next_token = try_any_token(tokens, start_idx + 1, "tree expression or ')'")?;

            if next_token.token_class == TokenClass::RightParen {
                return Ok((Tree::Nil, start_idx + 2));
            }

            let (tree, start_idx) = try_sequence_rule(tokens, start_idx + 1)?;
            let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::RightParen, "')'")?;

            return Ok((tree, start_idx));
        }
        _ => return Err(ParseError::unexpected(token, "tree expression")),
    }
}

// Tries to parse the inside of a parenthesised tree. After the first element a
// '.' commits to a single tail element; otherwise elements are taken greedily
// until ')' (or a '.' introducing an improper tail). The elements are folded
// from the right onto the tail, which defaults to nil.
fn try_sequence_rule(tokens: &[Token], start_idx: usize) -> Result<(Tree, usize), ParseError> {
    let (first_element, mut start_idx) = try_tree_expr_rule(tokens, start_idx)?;
    let mut elements = vec![first_element];
    let mut tail = Tree::Nil;

    loop {
        let token = try_any_token(tokens, start_idx, "')'")?;

        match token.token_class {
            TokenClass::RightParen => break,
            TokenClass::Dot => {
                let (tail_tree, new_start_idx) = try_tree_expr_rule(tokens, start_idx + 1)?;
                tail = tail_tree;
                start_idx = new_start_idx;
                break;
            }
            _ => {
                let (element, new_start_idx) = try_tree_expr_rule(tokens, start_idx)?;
                elements.push(element);
                start_idx = new_start_idx;
            }
        }
    }

    let tree = elements
        .into_iter()
        .rev()
        .fold(tail, |rest, element| Tree::cons(element, rest));

    return Ok((tree, start_idx));
}

/// Parses a complete tree literal from tree-mode tokens. Anything left over
/// after the first complete expression is an error.
pub fn parse_tree_tokens(tokens: &[Token]) -> Result<Tree, ParseError> {
    let (tree, end_idx) = try_tree_expr_rule(tokens, 0)?;

    if let Some(token) = tokens.get(end_idx) {
        return Err(ParseError::TrailingTokens {
            found: token.token_text.clone(),
            line_num: token.line_num,
            line_text: token.line_text.clone(),
        });
    }

    return Ok(tree);
}

/// Lexes and parses tree literal text.
pub fn parse_tree_literal(literal_str: &str) -> Result<Tree, TreeLiteralError> {
    let tokens = run_lexical_analysis(literal_str, LexMode::TreeLiteral, true)?;
    return Ok(parse_tree_tokens(&tokens)?);
}

/// Classifies literal text as complete, partial (could still become valid by
/// typing more), or invalid.
pub fn check_tree_literal(literal_str: &str) -> LiteralStatus {
    let tokens = match run_lexical_analysis(literal_str, LexMode::TreeLiteral, true) {
        Ok(tokens) => tokens,
        Err(lex_error) => return LiteralStatus::Invalid(lex_error.to_string()),
    };

    let mut open_parens: usize = 0;

    for token in &tokens {
        match token.token_class {
            TokenClass::LeftParen => open_parens += 1,
            TokenClass::RightParen => match open_parens.checked_sub(1) {
                Some(remaining) => open_parens = remaining,
                None => {
                    return LiteralStatus::Invalid(format!(
                        "Unbalanced ')' at line {}.",
                        token.line_num
                    ))
                }
            },
            _ => {}
        }
    }

    if tokens.is_empty() || open_parens > 0 {
        return LiteralStatus::Partial;
    }

    match parse_tree_tokens(&tokens) {
        Ok(tree) => return LiteralStatus::Complete(tree),
        Err(parse_error) => return LiteralStatus::Invalid(parse_error.to_string()),
    }
}

// Recurses only into left children; the right spine is walked in a loop.
fn print_dot_helper(tree: &Tree, string_so_far: &mut String) {
    let (elements, spine_end) = tree.right_spine();

    for element in &elements {
        string_so_far.push_str("( ");
        print_dot_helper(element, string_so_far);
        string_so_far.push_str(" . ");
    }

    // The spine can only end in nil or an atom.
    match spine_end {
        Tree::Atom(name) => string_so_far.push_str(name.as_str()),
        _ => string_so_far.push_str("nil"),
    };

    for _ in 0..elements.len() {
        string_so_far.push_str(" )");
    }
}

/// Renders a tree in fully parenthesised dot notation.
pub fn print_dot(tree: &Tree) -> String {
    let mut out_string = String::new();
    print_dot_helper(tree, &mut out_string);
    return out_string;
}

fn print_list_helper(tree: &Tree, string_so_far: &mut String) {
    match tree {
        Tree::Nil => string_so_far.push_str("()"),
        Tree::Atom(name) => string_so_far.push_str(name.as_str()),
        Tree::Pair(..) => {
            let (elements, spine_end) = tree.right_spine();

            string_so_far.push('(');
            for (idx, element) in elements.iter().enumerate() {
                if idx > 0 {
                    string_so_far.push(' ');
                }
                print_list_helper(element, string_so_far);
            }

            // The spine can only end in nil or an atom.
            if !spine_end.is_nil() {
                string_so_far.push_str(" . ");
                print_list_helper(spine_end, string_so_far);
            }
            string_so_far.push(')');
        }
    };
}

/// Renders a tree in list notation, using `(a b . c)` for improper lists.
pub fn print_list(tree: &Tree) -> String {
    let mut out_string = String::new();
    print_list_helper(tree, &mut out_string);
    return out_string;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::tree_value::unary_number;

    use super::*;

    fn list(elements: Vec<Tree>) -> Tree {
        return elements
            .into_iter()
            .rev()
            .fold(Tree::Nil, |rest, element| Tree::cons(element, rest));
    }

    #[test]
    fn test_improper_list_literal() {
        let expected_tree = Tree::cons(
            Tree::atom("a"),
            Tree::cons(Tree::atom("b"), Tree::atom("c")),
        );

        let tree = parse_tree_literal("(a b . c)").expect("Unable to parse tree literal.");

        assert_eq!(tree, expected_tree);
        assert_eq!(print_list(&tree), "(a b . c)");
        assert_eq!(print_dot(&tree), "( a . ( b . c ) )");
    }

    #[test]
    fn test_simple_literals() {
        let cases = vec![
            ("nil", Tree::Nil),
            ("()", Tree::Nil),
            ("  ( )  ", Tree::Nil),
            ("leaf", Tree::atom("leaf")),
            ("(nil . nil)", Tree::cons(Tree::Nil, Tree::Nil)),
            ("(a)", list(vec![Tree::atom("a")])),
            (
                "(a (b c) ())",
                list(vec![
                    Tree::atom("a"),
                    list(vec![Tree::atom("b"), Tree::atom("c")]),
                    Tree::Nil,
                ]),
            ),
            // Mixed notation.
            (
                "((a . b) c)",
                list(vec![Tree::cons(Tree::atom("a"), Tree::atom("b")), Tree::atom("c")]),
            ),
        ];

        for (literal_str, expected_tree) in cases {
            assert_eq!(
                parse_tree_literal(literal_str).expect("Unable to parse tree literal."),
                expected_tree,
                "literal {:?}",
                literal_str
            );
        }
    }

    #[test]
    fn test_list_printing() {
        let tree = list(vec![
            Tree::Nil,
            list(vec![Tree::atom("x")]),
            Tree::cons(Tree::atom("p"), Tree::atom("q")),
        ]);

        assert_eq!(print_list(&tree), "(() (x) (p . q))");
        assert_eq!(print_list(&Tree::Nil), "()");
        assert_eq!(print_dot(&Tree::Nil), "nil");
        assert_eq!(tree.to_string(), print_dot(&tree));
    }

    #[test]
    fn test_long_numeral_printing() {
        let tree = unary_number(200_000);

        let dot_string = print_dot(&tree);
        let list_string = print_list(&tree);

        assert!(dot_string.starts_with("( nil . ( nil . "));
        assert!(dot_string.ends_with("nil ) )"));
        assert_eq!(dot_string.matches(" )").count(), 200_000);
        assert_eq!(list_string.len(), 2 + 200_000 * 2 + 199_999);
    }

    #[test]
    fn test_missing_pair_operand() {
        let literal_error = parse_tree_literal("(a . )").expect_err("Expected parse error.");

        assert_eq!(
            literal_error,
            TreeLiteralError::Parse(ParseError::UnexpectedToken {
                expected: String::from("tree expression"),
                found: String::from(")"),
                line_num: 1,
                line_text: String::from("(a . )"),
            })
        );
    }

    #[test]
    fn test_malformed_literals() {
        assert!(matches!(
            parse_tree_literal("(a . b c)"),
            Err(TreeLiteralError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert!(matches!(
            parse_tree_literal("(a b"),
            Err(TreeLiteralError::Parse(ParseError::UnexpectedEndOfInput { .. }))
        ));
        assert!(matches!(
            parse_tree_literal("(a) b"),
            Err(TreeLiteralError::Parse(ParseError::TrailingTokens { .. }))
        ));
        assert!(matches!(
            parse_tree_literal(")"),
            Err(TreeLiteralError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert!(matches!(
            parse_tree_literal(""),
            Err(TreeLiteralError::Parse(ParseError::UnexpectedEndOfInput { .. }))
        ));
        assert!(matches!(
            parse_tree_literal("(a 7)"),
            Err(TreeLiteralError::Lex(_))
        ));
    }

    #[test]
    fn test_check_tree_literal() {
        assert_eq!(
            check_tree_literal("(a b)"),
            LiteralStatus::Complete(list(vec![Tree::atom("a"), Tree::atom("b")]))
        );
        assert_eq!(check_tree_literal(""), LiteralStatus::Partial);
        assert_eq!(check_tree_literal("((a . b) (c"), LiteralStatus::Partial);
        assert!(matches!(check_tree_literal("(a))"), LiteralStatus::Invalid(_)));
        assert!(matches!(check_tree_literal("(a . )"), LiteralStatus::Invalid(_)));
        assert!(matches!(check_tree_literal("(a $)"), LiteralStatus::Invalid(_)));
    }

    // Atom names come from the identifier syntax, minus the reserved `nil`.
    fn arb_tree() -> impl Strategy<Value = Tree> {
        let leaf = prop_oneof![
            Just(Tree::Nil),
            "[a-z_][a-z0-9_]{0,6}"
                .prop_filter("nil is reserved", |name: &String| name != "nil")
                .prop_map(Tree::Atom),
        ];

        return leaf.prop_recursive(6, 64, 2, |inner| {
            (inner.clone(), inner).prop_map(|(left, right)| Tree::cons(left, right))
        });
    }

    proptest! {
        #[test]
        fn dot_notation_round_trips(tree in arb_tree()) {
            let printed = print_dot(&tree);
            prop_assert_eq!(parse_tree_literal(&printed), Ok(tree));
        }

        #[test]
        fn list_notation_round_trips(tree in arb_tree()) {
            let printed = print_list(&tree);
            prop_assert_eq!(parse_tree_literal(&printed), Ok(tree));
        }

        #[test]
        fn printed_literals_check_complete(tree in arb_tree()) {
            prop_assert_eq!(check_tree_literal(&print_list(&tree)), LiteralStatus::Complete(tree));
        }
    }
}
