use nom::{
    branch::alt,
    character::complete::{anychar, char, digit1, none_of},
    combinator::{map, opt, recognize},
    error::{context, ErrorKind, ParseError, VerboseError},
    multi::many0,
    sequence::{delimited, pair},
};

use super::token::{ParserResult, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    /// Raw source text of an embedded `${...}` expression.
    Interpolation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Template(Vec<StringPart>),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Template(parts) => {
                write!(f, "`")?;
                for part in parts {
                    match part {
                        StringPart::Literal(s) => write!(f, "{}", s)?,
                        StringPart::Interpolation(e) => write!(f, "${{{}}}", e)?,
                    }
                }
                write!(f, "`")
            }
        }
    }
}

/// Unescapes `\r`, `\n`, `\t` and `\\`. Any other escape is kept verbatim.
pub fn eval_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('r') => result.push('\r'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) if *other != '\r' && *other != '\n' => {
                result.push('\\');
                result.push(*other);
            }
            _ => {
                result.push('\\');
                continue;
            }
        }
        chars.next();
    }
    result
}

fn unescape_quoted(raw: &str, quote: char) -> String {
    let pattern = format!("\\{}", quote);
    eval_escape(&raw.replace(&pattern, &quote.to_string()))
}

fn quoted_body<'a>(quote: char) -> impl FnMut(&'a str) -> ParserResult<'a, &'a str> {
    move |input| {
        recognize(many0(alt((
            recognize(pair(char('\\'), anychar)),
            recognize(none_of(if quote == '\'' { "\\'" } else { "\\\"" })),
        ))))(input)
    }
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string_literal(input: &str) -> ParserResult<Literal> {
    context(
        "string literal",
        alt((
            map(delimited(char('\''), quoted_body('\''), char('\'')), |s| {
                Literal::String(unescape_quoted(s, '\''))
            }),
            map(delimited(char('"'), quoted_body('"'), char('"')), |s| {
                Literal::String(unescape_quoted(s, '"'))
            }),
        )),
    )(input)
}

fn template_error(input: &str) -> nom::Err<VerboseError<&str>> {
    nom::Err::Error(VerboseError::from_error_kind(input, ErrorKind::Char))
}

/// Finds the end of an embedded expression, balancing braces and skipping quoted text.
fn embedded_expression_len(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

fn flush_text(parts: &mut Vec<StringPart>, text: &mut String) {
    if !text.is_empty() {
        let unescaped = eval_escape(&text.replace("\\`", "`").replace("\\$", "$"));
        parts.push(StringPart::Literal(unescaped));
        text.clear();
    }
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_template_literal(input: &str) -> ParserResult<Literal> {
    let Some(body) = input.strip_prefix('`') else {
        return Err(template_error(input));
    };

    let mut parts = Vec::new();
    let mut text = String::new();
    let mut rest = body;
    loop {
        if let Some(after) = rest.strip_prefix('`') {
            flush_text(&mut parts, &mut text);
            return Ok((after, Literal::Template(parts)));
        }
        if let Some(after) = rest.strip_prefix("${") {
            let len = embedded_expression_len(after).ok_or_else(|| template_error(rest))?;
            let expression = &after[..len];
            if expression.trim().is_empty() {
                return Err(template_error(rest));
            }
            flush_text(&mut parts, &mut text);
            parts.push(StringPart::Interpolation(expression.to_string()));
            rest = &after[len + 1..];
            continue;
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some('\\') => {
                text.push('\\');
                if let Some(escaped) = chars.next() {
                    text.push(escaped);
                }
            }
            Some(c) => text.push(c),
            None => return Err(template_error(input)),
        }
        rest = chars.as_str();
    }
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_number_literal(input: &str) -> ParserResult<Literal> {
    let (rest, text) = context(
        "number literal",
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
    )(input)?;

    let literal = if text.contains('.') {
        text.parse::<f64>().map(Literal::Float)
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok(Literal::Integer(i)),
            Err(_) => text.parse::<f64>().map(Literal::Float),
        }
    };
    literal
        .map(|lit| (rest, lit))
        .map_err(|_| nom::Err::Error(VerboseError::from_error_kind(input, ErrorKind::Float)))
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((
                parse_string_literal,
                parse_template_literal,
                parse_number_literal,
            )),
            Token::Literal,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_strings() {
        let (rest, result) = parse_string_literal("'hello world' x").unwrap();
        assert_eq!(rest, " x");
        assert_eq!(result, Literal::String("hello world".to_string()));

        let (_, result) = parse_string_literal("\"double\"").unwrap();
        assert_eq!(result, Literal::String("double".to_string()));
    }

    #[test]
    fn test_string_escapes() {
        let (_, result) = parse_string_literal(r"'it\'s'").unwrap();
        assert_eq!(result, Literal::String("it's".to_string()));

        let (_, result) = parse_string_literal(r"'a\nb\tc\\d'").unwrap();
        assert_eq!(result, Literal::String("a\nb\tc\\d".to_string()));

        // unknown escapes survive untouched
        let (_, result) = parse_string_literal(r"'\d+'").unwrap();
        assert_eq!(result, Literal::String(r"\d+".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        assert!(parse_string_literal("'abc").is_err());
    }

    #[test]
    fn test_template() {
        let (rest, result) = parse_template_literal("`hi ${user.name}!` + 1").unwrap();
        assert_eq!(rest, " + 1");
        assert_eq!(
            result,
            Literal::Template(vec![
                StringPart::Literal("hi ".to_string()),
                StringPart::Interpolation("user.name".to_string()),
                StringPart::Literal("!".to_string()),
            ])
        );
    }

    #[test]
    fn test_template_with_nested_braces_and_quotes() {
        let (_, result) =
            parse_template_literal("`${json('{\"a\":1}').a}${string({x: '}'})}`").unwrap();
        assert_eq!(
            result,
            Literal::Template(vec![
                StringPart::Interpolation("json('{\"a\":1}').a".to_string()),
                StringPart::Interpolation("string({x: '}'})".to_string()),
            ])
        );
    }

    #[test]
    fn test_template_escapes() {
        let (_, result) = parse_template_literal(r"`\`quoted\` \${not}`").unwrap();
        assert_eq!(
            result,
            Literal::Template(vec![StringPart::Literal("`quoted` ${not}".to_string())])
        );

        let (_, result) = parse_template_literal("``").unwrap();
        assert_eq!(result, Literal::Template(vec![]));
    }

    #[test]
    fn test_number_literals() {
        let (rest, result) = parse_number_literal("123").unwrap();
        assert_eq!(result, Literal::Integer(123));
        assert_eq!(rest, "");

        let (_, result) = parse_number_literal("123.45").unwrap();
        assert_eq!(result, Literal::Float(123.45));

        let (rest, result) = parse_number_literal("1.x").unwrap();
        assert_eq!(result, Literal::Integer(1));
        assert_eq!(rest, ".x");

        let (_, result) = parse_number_literal("99999999999999999999").unwrap();
        assert_eq!(result, Literal::Float(1e20));
    }
}
