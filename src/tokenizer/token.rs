use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::satisfy,
    combinator::{opt, recognize},
    error::{context, VerboseError},
    sequence::{pair, tuple},
    IResult,
};
use thiserror::Error;

use super::{
    literal::{parse_literal, Literal},
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::{parse_newline, parse_whitespace},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Identifiers
    Identifier(String),
    // Symbols
    Operator(Operator),
    Delimiter(Delimiter),
    // Literals
    Literal(Literal),
    // Formatting
    Whitespace(String),
    Newline,
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Delimiter(d) => write!(f, "{}", d),
            Token::Literal(lit) => write!(f, "{}", lit),
            Token::Whitespace(ws) => write!(f, "{}", ws),
            Token::Newline => writeln!(f),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,   // 1-based
            current_column: 1, // 1-based
        }
    }

    #[tracing::instrument(level = "debug", skip(input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start_position = self.current_position;
            let start_line = self.current_line;
            let start_column = self.current_column;

            let result = alt((
                // Formatting
                parse_whitespace,
                parse_newline,
                // Literals
                parse_literal,
                // Code elements
                parse_identifier,
                parse_operator,
                parse_delimiter,
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    tokens.push(TokenSpan {
                        token,
                        start: start_position,
                        end: self.current_position,
                        line: start_line,
                        column: start_column,
                    });

                    remaining = new_remaining;
                }
                Err(e) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    let span = Span {
                        start: self.current_position,
                        end: self.current_position + 1,
                        line: self.current_line,
                        column: self.current_column,
                    };
                    let error = match e {
                        nom::Err::Incomplete(e) => TokenizerError::ParseError {
                            message: format!("Incomplete input, {:?}", e),
                            found,
                            span,
                        },
                        nom::Err::Error(e) | nom::Err::Failure(e) => TokenizerError::ParseError {
                            message: nom::error::convert_error(remaining, e).to_string(),
                            found,
                            span,
                        },
                    };
                    tracing::debug!("{}", error);
                    return Err(error);
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line: {}, column: {}, start: {}, end: {}",
            self.line, self.column, self.start, self.end
        )
    }
}

/// Identifiers may carry one of the memory shorthand prefixes (`#`, `@`, `@@`, `$`, `%`).
#[tracing::instrument(level = "debug", skip(input))]
fn parse_identifier(input: &str) -> ParserResult<Token> {
    let (input, id) = context(
        "identifier",
        recognize(tuple((
            opt(alt((tag("@@"), tag("@"), tag("#"), tag("$"), tag("%")))),
            pair(
                satisfy(|c: char| c.is_alphabetic() || c == '_'),
                take_while(|c: char| c.is_alphanumeric() || c == '_'),
            ),
        ))),
    )(input)?;

    Ok((input, Token::Identifier(id.to_string())))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("Parse error: {message} at position {span}")]
    ParseError {
        message: String,
        found: String,
        span: Span,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(input: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new();
        tokenizer
            .tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| !t.token.is_whitespace() && !t.token.is_newline())
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_identifier() {
        let (rest, token) = parse_identifier("my_var123 other").unwrap();
        assert_eq!(token, Token::Identifier("my_var123".to_string()));
        assert_eq!(rest, " other");
    }

    #[test]
    fn test_prefixed_identifiers() {
        for id in ["$index", "@@entity", "@city", "#intent", "%options"] {
            let (rest, token) = parse_identifier(id).unwrap();
            assert_eq!(token, Token::Identifier(id.to_string()));
            assert_eq!(rest, "");
        }
        assert!(parse_identifier("1abc").is_err());
    }

    #[test]
    fn test_tokenizer_with_position() {
        let mut tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("x\n&& y").unwrap();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].column, 1);
        assert_eq!(tokens[0].token, Token::Identifier("x".to_string()));

        let and = &tokens[2];
        assert_eq!(and.line, 2);
        assert_eq!(and.column, 1);
        assert_eq!(and.token, Token::Operator(Operator::And));
    }

    #[test]
    fn test_function_call_tokens() {
        let tokens = significant("add(one, 2.5)");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("add".to_string()),
                Token::Delimiter(Delimiter::OpenParen),
                Token::Identifier("one".to_string()),
                Token::Delimiter(Delimiter::Comma),
                Token::Literal(Literal::Float(2.5)),
                Token::Delimiter(Delimiter::CloseParen),
            ]
        );
    }

    #[test]
    fn test_member_and_index_tokens() {
        let tokens = significant("user.lists['todo'][0]");
        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[1], Token::Delimiter(Delimiter::Dot));
        assert_eq!(
            tokens[4],
            Token::Literal(Literal::String("todo".to_string()))
        );
        assert_eq!(tokens[7], Token::Literal(Literal::Integer(0)));
    }

    #[test]
    fn test_unknown_character_reports_span() {
        let mut tokenizer = Tokenizer::new();
        let err = tokenizer.tokenize("a ~ b").unwrap_err();
        match err {
            TokenizerError::ParseError { found, span, .. } => {
                assert_eq!(found, "~ b");
                assert_eq!(span.column, 3);
            }
        }
    }
}
