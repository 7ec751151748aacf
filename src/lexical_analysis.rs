//! Regex-driven lexer shared by While programs and tree literals.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::trace;

/// The different classes of tokens that compose both notations.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenClass {
    Identifier,
    Number,
    Nil,
    Assign,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Plus,
    Minus,
    Comma,
    Dot,
    Comment,
    Whitespace,
}

impl TokenClass {
    /// Comments and whitespace never reach the parsers.
    pub fn is_uninteresting(&self) -> bool {
        return matches!(self, TokenClass::Comment | TokenClass::Whitespace);
    }
}

/// Selects which token table to lex with.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum LexMode {
    WhileProgram,
    TreeLiteral,
}

/// Represents a single token along with where it came from.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
    pub line_num: usize,
    pub line_text: String,
}

/// Raised when no token rule matches at the current position.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unknown character {character:?} at line {line_num}.\n{line_text}")]
    UnknownCharacter {
        character: char,
        line_num: usize,
        line_text: String,
    },
}

// Represents how to recognize a token class.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

fn make_rule(token_class: TokenClass, pattern: &str) -> TokenRule {
    return TokenRule {
        token_class: token_class,
        regex: Regex::new(pattern).expect("Unable to compile token rule regex."),
    };
}

// Rule tables for each mode. Rules are anchored at the start of the remaining
// input; on equal match lengths the earlier rule wins.
lazy_static! {
    static ref while_token_rules: Vec<TokenRule> = vec![
        make_rule(TokenClass::Identifier, r"^[a-zA-Z_][a-zA-Z0-9_]*"),
        make_rule(TokenClass::Number, r"^[0-9]+"),
        make_rule(TokenClass::Assign, r"^:="),
        make_rule(TokenClass::Semicolon, r"^;"),
        make_rule(TokenClass::LeftParen, r"^\("),
        make_rule(TokenClass::RightParen, r"^\)"),
        make_rule(TokenClass::LeftBrace, r"^\{"),
        make_rule(TokenClass::RightBrace, r"^\}"),
        make_rule(TokenClass::Plus, r"^\+"),
        make_rule(TokenClass::Minus, r"^-"),
        make_rule(TokenClass::Comma, r"^,"),
        make_rule(TokenClass::Dot, r"^\."),
        make_rule(TokenClass::Comment, r"^//[^\n]*"),
        make_rule(TokenClass::Whitespace, r"^\s+"),
    ];
    static ref tree_token_rules: Vec<TokenRule> = vec![
        make_rule(TokenClass::Nil, r"^nil"),
        make_rule(TokenClass::Identifier, r"^[a-zA-Z_][a-zA-Z0-9_]*"),
        make_rule(TokenClass::LeftParen, r"^\("),
        make_rule(TokenClass::RightParen, r"^\)"),
        make_rule(TokenClass::Dot, r"^\."),
        make_rule(TokenClass::Whitespace, r"^\s+"),
    ];
}

fn rules_for_mode(mode: LexMode) -> &'static Vec<TokenRule> {
    match mode {
        LexMode::WhileProgram => return &while_token_rules,
        LexMode::TreeLiteral => return &tree_token_rules,
    }
}

// Finds the rule that matches the most characters from the start of the input
// string, if any rule matches at all.
fn get_longest_matching_rule(
    input_str: &str,
    rules: &'static [TokenRule],
) -> Option<(&'static TokenRule, usize)> {
    let mut longest: Option<(&'static TokenRule, usize)> = None;

    for token_rule in rules.iter() {
        match token_rule
            .regex
            .find(input_str)
            .take_if(|match_obj| match_obj.start() == 0)
        {
            None => continue,
            Some(match_obj) => {
                let longest_len = longest.map_or(0, |(_, len)| len);
                if match_obj.len() > longest_len {
                    longest = Some((token_rule, match_obj.len()));
                }
            }
        };
    }

    return longest;
}

/// Given a string, returns the tokens that comprise it. When
/// `discard_uninteresting` is set, comments and whitespace are dropped, which
/// is what both parsers expect.
pub fn run_lexical_analysis(
    input_str: &str,
    mode: LexMode,
    discard_uninteresting: bool,
) -> Result<Vec<Token>, LexError> {
    let rules = rules_for_mode(mode);
    let source_lines: Vec<&str> = input_str.lines().collect();
    let line_text_at = |line_num: usize| -> String {
        return source_lines
            .get(line_num - 1)
            .map_or(String::new(), |line| String::from(line.trim()));
    };

    let mut curr_idx: usize = 0;
    let mut line_num: usize = 1;
    let mut out = Vec::new();

    while curr_idx < input_str.len() {
        let remaining = &input_str[curr_idx..];

        let (token_rule, match_len) = match get_longest_matching_rule(remaining, rules) {
            Some(found) => found,
            None => {
                return Err(LexError::UnknownCharacter {
                    character: remaining.chars().next().unwrap_or_default(),
                    line_num: line_num,
                    line_text: line_text_at(line_num),
                });
            }
        };

        let token_text = &remaining[..match_len];

        if !(discard_uninteresting && token_rule.token_class.is_uninteresting()) {
            trace!(class = ?token_rule.token_class, text = token_text, line_num, "token");
            out.push(Token {
                token_class: token_rule.token_class,
                token_text: String::from(token_text),
                line_num: line_num,
                line_text: line_text_at(line_num),
            });
        }

        line_num += token_text.matches('\n').count();
        curr_idx += match_len;
    }

    return Ok(out);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn token_classes(tokens: &[Token]) -> Vec<TokenClass> {
        return tokens.iter().map(|token| token.token_class).collect();
    }

    // Test if find_longest_matching_rule prefers the longest match.
    #[test]
    fn test_longest_matching_rule() {
        // Test cases formatted as (input_str, expected_token_class, expected_match_len).
        let cases = vec![
            (r"// This is a comment.", TokenClass::Comment, 21),
            (r"while x do", TokenClass::Identifier, 5),
            (r":= 4", TokenClass::Assign, 2),
            (r"1234;", TokenClass::Number, 4),
        ];

        for (input_str, expected_class, expected_len) in cases {
            let (rule, match_len) = get_longest_matching_rule(input_str, &while_token_rules)
                .expect("Expected a rule to match.");
            assert_eq!(rule.token_class, expected_class);
            assert_eq!(match_len, expected_len);
        }
    }

    // Test if run_lexical_analysis keeps comments when asked to.
    #[test]
    fn test_token_stream_with_uninteresting_tokens() {
        let program_str = "// A comment.\nx := 0;";

        let produced = run_lexical_analysis(program_str, LexMode::WhileProgram, false)
            .expect("Unexpected lex error.");

        let expected_prefix = vec![
            Token {
                token_class: TokenClass::Comment,
                token_text: String::from("// A comment."),
                line_num: 1,
                line_text: String::from("// A comment."),
            },
            Token {
                token_class: TokenClass::Whitespace,
                token_text: String::from("\n"),
                line_num: 1,
                line_text: String::from("// A comment."),
            },
            Token {
                token_class: TokenClass::Identifier,
                token_text: String::from("x"),
                line_num: 2,
                line_text: String::from("x := 0;"),
            },
        ];

        assert_eq!(&produced[..3], &expected_prefix[..]);
    }

    #[test]
    fn test_while_program_tokens() {
        let program_str = "  while x do {\n    y := cons(hd x, 12); // step\n  }";

        let tokens = run_lexical_analysis(program_str, LexMode::WhileProgram, true)
            .expect("Unexpected lex error.");

        assert_eq!(
            token_classes(&tokens),
            vec![
                TokenClass::Identifier,
                TokenClass::Identifier,
                TokenClass::Identifier,
                TokenClass::LeftBrace,
                TokenClass::Identifier,
                TokenClass::Assign,
                TokenClass::Identifier,
                TokenClass::LeftParen,
                TokenClass::Identifier,
                TokenClass::Identifier,
                TokenClass::Comma,
                TokenClass::Number,
                TokenClass::RightParen,
                TokenClass::Semicolon,
                TokenClass::RightBrace,
            ]
        );
        assert_eq!(tokens[4].line_num, 2);
        assert_eq!(tokens[4].line_text, "y := cons(hd x, 12); // step");
        assert_eq!(tokens[14].line_num, 3);
    }

    // Reserved words stay identifiers; the parser tells them apart.
    #[test]
    fn test_keywords_lex_as_identifiers() {
        let tokens = run_lexical_analysis("if then else read write", LexMode::WhileProgram, true)
            .expect("Unexpected lex error.");

        assert!(tokens
            .iter()
            .all(|token| token.token_class == TokenClass::Identifier));
    }

    #[test]
    fn test_unknown_character_in_program() {
        let lex_error = run_lexical_analysis("x := 1;\ny := x * 2;", LexMode::WhileProgram, true)
            .expect_err("Expected a lex error.");

        assert_eq!(
            lex_error,
            LexError::UnknownCharacter {
                character: '*',
                line_num: 2,
                line_text: String::from("y := x * 2;"),
            }
        );
    }

    #[test]
    fn test_tree_literal_tokens() {
        let tokens = run_lexical_analysis("(nil nilly . a_1)", LexMode::TreeLiteral, true)
            .expect("Unexpected lex error.");

        assert_eq!(
            token_classes(&tokens),
            vec![
                TokenClass::LeftParen,
                TokenClass::Nil,
                TokenClass::Identifier,
                TokenClass::Dot,
                TokenClass::Identifier,
                TokenClass::RightParen,
            ]
        );
    }

    // Digits and program punctuation are not part of the tree notation.
    #[test]
    fn test_tree_literal_rejects_program_tokens() {
        assert!(run_lexical_analysis("(a 1)", LexMode::TreeLiteral, true).is_err());
        assert!(run_lexical_analysis("(a , b)", LexMode::TreeLiteral, true).is_err());
    }
}
