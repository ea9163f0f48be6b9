use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum QuantifierType {
    /// Every binding must satisfy the predicate.
    All,
    /// Some binding must satisfy the predicate; each becomes its own clause.
    Any,
}

/// Expands a variable in a trigger over a list of memory paths.
///
/// `Quantifier::any("x", ["a", "b"])` turns `x == 1` into the clauses
/// `a == 1` and `b == 1`, remembering which binding produced each.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantifier {
    pub variable: String,
    pub kind: QuantifierType,
    pub bindings: Vec<String>,
}

impl Quantifier {
    pub fn new<S, I, B>(variable: S, kind: QuantifierType, bindings: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self {
            variable: variable.into(),
            kind,
            bindings: bindings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all<S, I, B>(variable: S, bindings: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self::new(variable, QuantifierType::All, bindings)
    }

    pub fn any<S, I, B>(variable: S, bindings: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self::new(variable, QuantifierType::Any, bindings)
    }
}

impl std::fmt::Display for Quantifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.kind, self.variable, self.bindings.len())
    }
}
