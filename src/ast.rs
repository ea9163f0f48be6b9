//! # Syntax Tree
//!
//! Output of the [`analyzer`](crate::analyzer). The syntax tree is purely
//! structural: names are not resolved and nothing is validated yet. The binder in
//! [`parser`](crate::parser) lowers it into bound [`Expression`](crate::Expression)s.

use strum_macros::{AsRefStr, Display, EnumString};

use crate::tokenizer::literal::StringPart;

#[derive(Debug, Clone, PartialEq)]
pub enum Syntax {
    String(String),
    Integer(i64),
    Float(f64),
    /// Backtick template, interpolations are still raw source text.
    Template(Vec<StringPart>),
    Identifier(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Syntax>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Syntax>,
        right: Box<Syntax>,
    },
    Member {
        instance: Box<Syntax>,
        property: String,
    },
    Index {
        instance: Box<Syntax>,
        index: Box<Syntax>,
    },
    Call {
        name: String,
        args: Vec<Syntax>,
    },
    Array(Vec<Syntax>),
    Object(Vec<(String, Syntax)>),
}

impl Syntax {
    /// Dotted name of an identifier or member chain, used as a function name.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Syntax::Identifier(name) => Some(name.clone()),
            Syntax::Member { instance, property } => instance
                .dotted_name()
                .map(|prefix| format!("{}.{}", prefix, property)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum UnaryOperator {
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "+")]
    Plus,
}

/// Binary operators, serialized as the function name they bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum BinaryOperator {
    #[strum(serialize = "^")]
    Power,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "&")]
    Concat,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
}
