use super::super::{core::*, prelude::*};
use crate::ast::{BinaryOperator, Syntax, UnaryOperator};
use crate::tokenizer::{
    literal::Literal,
    symbol::{Delimiter, Operator},
    token::Token,
};

pub fn parse_expression() -> impl Parser<Token, Syntax> {
    with_context(lazy(parse_logical_or), "expression")
}

fn fold_binary(first: Syntax, rest: Vec<(BinaryOperator, Syntax)>) -> Syntax {
    rest.into_iter()
        .fold(first, |left, (op, right)| Syntax::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
}

fn parse_logical_or() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_logical_and(),
                many(tuple2(
                    binary_op(Operator::Or, BinaryOperator::Or),
                    parse_logical_and(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical or",
    )
}

fn parse_logical_and() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_relational(),
                many(tuple2(
                    binary_op(Operator::And, BinaryOperator::And),
                    parse_relational(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical and",
    )
}

fn parse_relational() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_concat(),
                many(tuple2(parse_operator_relational(), parse_concat())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "relational",
    )
}

fn parse_operator_relational() -> impl Parser<Token, BinaryOperator> {
    choice(vec![
        Box::new(binary_op(Operator::LessEqual, BinaryOperator::LessEqual)),
        Box::new(binary_op(Operator::Less, BinaryOperator::Less)),
        Box::new(binary_op(Operator::GreaterEqual, BinaryOperator::GreaterEqual)),
        Box::new(binary_op(Operator::Greater, BinaryOperator::Greater)),
    ])
}

fn parse_concat() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_equality(),
                many(tuple2(
                    binary_op(Operator::Concat, BinaryOperator::Concat),
                    parse_equality(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "concat",
    )
}

fn parse_equality() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_additive(),
                many(tuple2(parse_operator_equality(), parse_additive())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "equality",
    )
}

fn parse_operator_equality() -> impl Parser<Token, BinaryOperator> {
    choice(vec![
        Box::new(binary_op(Operator::EqualEqual, BinaryOperator::Equal)),
        Box::new(binary_op(Operator::NotEqual, BinaryOperator::NotEqual)),
        Box::new(binary_op(Operator::LessGreater, BinaryOperator::NotEqual)),
    ])
}

fn parse_additive() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_multiplicative(),
                many(tuple2(parse_operator_additive(), parse_multiplicative())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "additive",
    )
}

fn parse_operator_additive() -> impl Parser<Token, BinaryOperator> {
    choice(vec![
        Box::new(binary_op(Operator::Plus, BinaryOperator::Add)),
        Box::new(binary_op(Operator::Minus, BinaryOperator::Subtract)),
    ])
}

fn parse_multiplicative() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_power(),
                many(tuple2(parse_operator_multiplicative(), parse_power())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "multiplicative",
    )
}

fn parse_operator_multiplicative() -> impl Parser<Token, BinaryOperator> {
    choice(vec![
        Box::new(binary_op(Operator::Multiply, BinaryOperator::Multiply)),
        Box::new(binary_op(Operator::Divide, BinaryOperator::Divide)),
        Box::new(binary_op(Operator::Modulo, BinaryOperator::Modulo)),
    ])
}

/// `^` is right associative: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
fn parse_power() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            tuple2(
                parse_unary(),
                optional(preceded(
                    equal(Token::Operator(Operator::Power)),
                    // boxed so the recursive opaque type is erased
                    choice(vec![Box::new(lazy(parse_power)) as Box<dyn Parser<Token, Syntax>>]),
                )),
            ),
            |(base, exponent)| match exponent {
                Some(exponent) => Syntax::Binary {
                    op: BinaryOperator::Power,
                    left: Box::new(base),
                    right: Box::new(exponent),
                },
                None => base,
            },
        ),
        "power",
    )
}

fn parse_unary() -> impl Parser<Token, Syntax> {
    with_context(
        choice(vec![
            Box::new(map(
                tuple2(parse_operator_unary(), lazy(parse_unary)),
                |(op, operand)| Syntax::Unary {
                    op,
                    operand: Box::new(operand),
                },
            )),
            Box::new(parse_postfix()),
        ]),
        "unary",
    )
}

fn parse_operator_unary() -> impl Parser<Token, UnaryOperator> {
    satisfy(|token: &Token| match token {
        Token::Operator(Operator::Not) => Some(UnaryOperator::Not),
        Token::Operator(Operator::Minus) => Some(UnaryOperator::Minus),
        Token::Operator(Operator::Plus) => Some(UnaryOperator::Plus),
        _ => None,
    })
}

enum Postfix {
    Member(String),
    Index(Syntax),
    Call(Vec<Syntax>),
}

fn apply_postfix(base: Syntax, postfix: Vec<Postfix>) -> Result<Syntax, String> {
    postfix.into_iter().try_fold(base, |instance, op| match op {
        Postfix::Member(property) => Ok(Syntax::Member {
            instance: Box::new(instance),
            property,
        }),
        Postfix::Index(index) => Ok(Syntax::Index {
            instance: Box::new(instance),
            index: Box::new(index),
        }),
        Postfix::Call(args) => match instance.dotted_name() {
            Some(name) => Ok(Syntax::Call { name, args }),
            None => Err("only a name or a dotted name can be called as a function".to_string()),
        },
    })
}

fn parse_postfix() -> impl Parser<Token, Syntax> {
    with_context(
        try_map(
            tuple2(parse_primary(), many(parse_postfix_operator())),
            |(base, postfix)| apply_postfix(base, postfix),
        ),
        "postfix",
    )
}

fn parse_postfix_operator() -> impl Parser<Token, Postfix> {
    choice(vec![
        Box::new(map(
            preceded(delimiter(Delimiter::Dot), parse_identifier_name()),
            Postfix::Member,
        )),
        Box::new(map(
            delimited(
                delimiter(Delimiter::OpenBracket),
                lazy(parse_expression),
                delimiter(Delimiter::CloseBracket),
            ),
            Postfix::Index,
        )),
        Box::new(map(
            delimited(
                delimiter(Delimiter::OpenParen),
                parse_arguments(),
                delimiter(Delimiter::CloseParen),
            ),
            Postfix::Call,
        )),
    ])
}

fn parse_primary() -> impl Parser<Token, Syntax> {
    with_context(
        choice(vec![
            Box::new(parse_parenthesized()),
            Box::new(parse_literal()),
            Box::new(map(parse_identifier_name(), Syntax::Identifier)),
            Box::new(parse_array()),
            Box::new(parse_object()),
        ]),
        "primary",
    )
}

fn parse_parenthesized() -> impl Parser<Token, Syntax> {
    delimited(
        delimiter(Delimiter::OpenParen),
        lazy(parse_expression),
        delimiter(Delimiter::CloseParen),
    )
}

fn parse_literal() -> impl Parser<Token, Syntax> {
    satisfy(|token: &Token| match token {
        Token::Literal(Literal::String(s)) => Some(Syntax::String(s.clone())),
        Token::Literal(Literal::Integer(i)) => Some(Syntax::Integer(*i)),
        Token::Literal(Literal::Float(f)) => Some(Syntax::Float(*f)),
        Token::Literal(Literal::Template(parts)) => Some(Syntax::Template(parts.clone())),
        _ => None,
    })
}

fn parse_identifier_name() -> impl Parser<Token, String> {
    satisfy(|token: &Token| match token {
        Token::Identifier(name) => Some(name.clone()),
        _ => None,
    })
}

fn parse_arguments() -> impl Parser<Token, Vec<Syntax>> {
    separated_list(lazy(parse_expression), delimiter(Delimiter::Comma))
}

fn parse_array() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            delimited(
                delimiter(Delimiter::OpenBracket),
                parse_arguments(),
                delimiter(Delimiter::CloseBracket),
            ),
            Syntax::Array,
        ),
        "array",
    )
}

fn parse_object() -> impl Parser<Token, Syntax> {
    with_context(
        map(
            delimited(
                delimiter(Delimiter::OpenBrace),
                separated_list(parse_key_value(), delimiter(Delimiter::Comma)),
                delimiter(Delimiter::CloseBrace),
            ),
            Syntax::Object,
        ),
        "object",
    )
}

fn parse_key_value() -> impl Parser<Token, (String, Syntax)> {
    map(
        tuple3(
            satisfy(|token: &Token| match token {
                Token::Identifier(name) => Some(name.clone()),
                Token::Literal(Literal::String(s)) => Some(s.clone()),
                _ => None,
            }),
            delimiter(Delimiter::Colon),
            lazy(parse_expression),
        ),
        |(key, _, value)| (key, value),
    )
}

fn binary_op(token: Operator, op: BinaryOperator) -> impl Parser<Token, BinaryOperator> {
    map(equal(Token::Operator(token)), move |_| op)
}

fn delimiter(d: Delimiter) -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::Tokenizer;

    fn tokens(input: &str) -> Vec<Token> {
        let spans = Tokenizer::new().tokenize(input).unwrap();
        TokenPreprocessor::new().process(spans)
    }

    fn parse(input: &str) -> Syntax {
        let tokens = tokens(input);
        let (pos, syntax) = parse_expression().parse(&tokens, 0).unwrap();
        assert_eq!(pos, tokens.len(), "not all tokens consumed for {}", input);
        syntax
    }

    fn id(name: &str) -> Box<Syntax> {
        Box::new(Syntax::Identifier(name.to_string()))
    }

    fn binary(op: BinaryOperator, left: Box<Syntax>, right: Box<Syntax>) -> Box<Syntax> {
        Box::new(Syntax::Binary { op, left, right })
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("a + b * c"),
            *binary(
                BinaryOperator::Add,
                id("a"),
                binary(BinaryOperator::Multiply, id("b"), id("c"))
            )
        );
        assert_eq!(
            parse("a || b && c"),
            *binary(
                BinaryOperator::Or,
                id("a"),
                binary(BinaryOperator::And, id("b"), id("c"))
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse("a - b - c"),
            *binary(
                BinaryOperator::Subtract,
                binary(BinaryOperator::Subtract, id("a"), id("b")),
                id("c")
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse("a ^ b ^ c"),
            *binary(
                BinaryOperator::Power,
                id("a"),
                binary(BinaryOperator::Power, id("b"), id("c"))
            )
        );
    }

    #[test]
    fn test_equality_binds_tighter_than_relational() {
        // a < b == c parses as a < (b == c)
        assert_eq!(
            parse("a < b == c"),
            *binary(
                BinaryOperator::Less,
                id("a"),
                binary(BinaryOperator::Equal, id("b"), id("c"))
            )
        );
        assert_eq!(
            parse("a <> b"),
            *binary(BinaryOperator::NotEqual, id("a"), id("b"))
        );
    }

    #[test]
    fn test_unary_binds_tightest() {
        assert_eq!(
            parse("!a && b"),
            *binary(
                BinaryOperator::And,
                Box::new(Syntax::Unary {
                    op: UnaryOperator::Not,
                    operand: id("a"),
                }),
                id("b")
            )
        );
        assert_eq!(
            parse("--1"),
            Syntax::Unary {
                op: UnaryOperator::Minus,
                operand: Box::new(Syntax::Unary {
                    op: UnaryOperator::Minus,
                    operand: Box::new(Syntax::Integer(1)),
                }),
            }
        );
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(
            parse("user.lists[0].name"),
            Syntax::Member {
                instance: Box::new(Syntax::Index {
                    instance: Box::new(Syntax::Member {
                        instance: id("user"),
                        property: "lists".to_string(),
                    }),
                    index: Box::new(Syntax::Integer(0)),
                }),
                property: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            parse("add(1, a.b)"),
            Syntax::Call {
                name: "add".to_string(),
                args: vec![
                    Syntax::Integer(1),
                    Syntax::Member {
                        instance: id("a"),
                        property: "b".to_string(),
                    },
                ],
            }
        );
        assert_eq!(
            parse("lib.custom()"),
            Syntax::Call {
                name: "lib.custom".to_string(),
                args: vec![],
            }
        );
        assert_eq!(
            parse("first(items).x"),
            Syntax::Member {
                instance: Box::new(Syntax::Call {
                    name: "first".to_string(),
                    args: vec![Syntax::Identifier("items".to_string())],
                }),
                property: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_call_on_index_is_rejected() {
        let tokens = tokens("items[0](1)");
        assert!(parse_expression().parse(&tokens, 0).is_err());
    }

    #[test]
    fn test_trailing_comma_leaves_tokens() {
        let tokens = tokens("f(a, b,)");
        let (pos, syntax) = parse_expression().parse(&tokens, 0).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(syntax, Syntax::Identifier("f".to_string()));
    }

    #[test]
    fn test_array_and_object_literals() {
        assert_eq!(
            parse("[1, 'a']"),
            Syntax::Array(vec![Syntax::Integer(1), Syntax::String("a".to_string())])
        );
        assert_eq!(parse("[]"), Syntax::Array(vec![]));
        assert_eq!(
            parse("{name: 'x', 'the key': 1.5}"),
            Syntax::Object(vec![
                ("name".to_string(), Syntax::String("x".to_string())),
                ("the key".to_string(), Syntax::Float(1.5)),
            ])
        );
        assert_eq!(parse("{}"), Syntax::Object(vec![]));
    }
}
