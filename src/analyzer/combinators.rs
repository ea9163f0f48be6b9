//! # Parser Combinators
//!
//! Small parsers over a token slice that compose into the expression grammar.
//!
//! ## Combinator Types
//!
//! * **Basic**: `Equal`, `Satisfy`
//! * **Sequential**: `Preceded`, `Delimited`, `Tuple2`, `Tuple3`
//! * **Alternative**: `Choice`, `Optional`
//! * **Repetition**: `Many`, `SeparatedList`
//! * **Transformation**: `Map`, `TryMap`, `AsUnit`
//! * **Structural**: `WithContext`, `Lazy`
//!
//! Every combinator backtracks on failure: a failed parse never moves the caller's
//! position.

use super::core::ParseError;
use super::core::ParseResult;
use super::core::Parser;
use std::fmt;
use std::marker::PhantomData;

/// Equal: Matches a specific token
#[derive(Clone)]
pub struct Equal<I> {
    value: I,
}

impl<I> Equal<I> {
    pub fn new(value: I) -> Self {
        Self { value }
    }
}

impl<I: Clone + PartialEq + fmt::Display> Parser<I, I> for Equal<I> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<I> {
        match input.get(pos) {
            Some(found) if *found == self.value => Ok((pos + 1, found.clone())),
            Some(found) => Err(ParseError::Unexpected {
                expected: self.value.to_string(),
                found: found.to_string(),
                position: pos,
                context: None,
            }),
            None => Err(ParseError::UnexpectedEOF {
                message: format!("expected {}", self.value),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Satisfy: Consumes one token when the predicate maps it to a value
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        match input.get(pos) {
            Some(token) => match (self.f)(token) {
                Some(result) => Ok((pos + 1, result)),
                None => Err(ParseError::Unexpected {
                    expected: "matching token".to_string(),
                    found: token.to_string(),
                    position: pos,
                    context: None,
                }),
            },
            None => Err(ParseError::UnexpectedEOF {
                message: "expected a token".to_string(),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Choice: Tries parsers in order and succeeds with the first one that does
///
/// When every alternative fails, the error that got furthest is reported.
pub struct Choice<I, O> {
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut furthest: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    let replace = furthest
                        .as_ref()
                        .map_or(true, |f| e.get_position() > f.get_position());
                    if replace {
                        furthest = Some(e);
                    }
                }
            }
        }
        Err(furthest.unwrap_or(ParseError::NoAlternative {
            position: pos,
            context: None,
        }))
    }
}

/// Preceded: Runs two parsers and keeps the second result
#[derive(Clone)]
pub struct Preceded<P1, P2, I, O1> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1)>,
}

impl<P1, P2, I, O1> Preceded<P1, P2, I, O1> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, O2> for Preceded<P1, P2, I, O1>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O2> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        self.parser2.parse(input, pos)
    }
}

/// Map: Transforms the output of a parser using a function
#[derive(Clone)]
pub struct Map<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

/// TryMap: Like `Map`, but the transformation may reject the parsed value
///
/// A rejection becomes a `Failure` positioned where the inner parser started.
#[derive(Clone)]
pub struct TryMap<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> TryMap<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for TryMap<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> Result<B, String>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        let (new_pos, value) = self.parser.parse(input, pos)?;
        (self.f)(value)
            .map(|mapped| (new_pos, mapped))
            .map_err(|message| ParseError::Failure {
                message,
                position: pos,
                context: None,
            })
    }
}

/// AsUnit: Discards the output of a parser
#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, O> Parser<I, ()> for AsUnit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

/// Many: Applies a parser zero or more times
#[derive(Clone)]
pub struct Many<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        loop {
            match self.parser.parse(input, current_pos) {
                Ok((new_pos, value)) if new_pos > current_pos => {
                    results.push(value);
                    current_pos = new_pos;
                }
                Ok(_) => break,
                Err(e) => {
                    tracing::trace!(
                        target: "analyzer::many",
                        error = ?e,
                        position = current_pos,
                        items_collected = results.len(),
                        "Many parser stopped collection"
                    );
                    break;
                }
            }
        }

        Ok((current_pos, results))
    }
}

/// SeparatedList: Zero or more items separated by a delimiter
///
/// A separator is only consumed when an item follows it, so a trailing separator
/// is left in the input for the caller to reject.
pub struct SeparatedList<P, S, I, O, OS> {
    item_parser: P,
    separator_parser: S,
    _phantom: PhantomData<(I, O, OS)>,
}

impl<P, S, I, O, OS> SeparatedList<P, S, I, O, OS> {
    pub fn new(item_parser: P, separator_parser: S) -> Self {
        Self {
            item_parser,
            separator_parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, OS, P, S> Parser<I, Vec<O>> for SeparatedList<P, S, I, O, OS>
where
    P: Parser<I, O>,
    S: Parser<I, OS>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();

        let Ok((mut current_pos, first)) = self.item_parser.parse(input, pos) else {
            return Ok((pos, results));
        };
        results.push(first);

        while let Ok((sep_pos, _)) = self.separator_parser.parse(input, current_pos) {
            match self.item_parser.parse(input, sep_pos) {
                Ok((new_pos, value)) => {
                    results.push(value);
                    current_pos = new_pos;
                }
                Err(_) => break,
            }
        }

        Ok((current_pos, results))
    }
}

/// Optional: Succeeds with `None` when the inner parser fails
#[derive(Clone)]
pub struct Optional<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Optional<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Option<O>> {
        match self.parser.parse(input, pos) {
            Ok((new_pos, value)) => Ok((new_pos, Some(value))),
            Err(_) => Ok((pos, None)),
        }
    }
}

#[derive(Clone)]
pub struct Tuple2<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Tuple2<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, (O1, O2)> for Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        Ok((pos, (result1, result2)))
    }
}

#[derive(Clone)]
pub struct Tuple3<P1, P2, P3, I, O1, O2, O3> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    _phantom: PhantomData<(I, O1, O2, O3)>,
}

impl<P1, P2, P3, I, O1, O2, O3> Tuple3<P1, P2, P3, I, O1, O2, O3> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, I, O1, O2, O3> Parser<I, (O1, O2, O3)> for Tuple3<P1, P2, P3, I, O1, O2, O3>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2, O3)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        Ok((pos, (result1, result2, result3)))
    }
}

/// Delimited: Parses content between a left and right delimiter
#[derive(Clone)]
pub struct Delimited<L, P, R, I, OL, OR> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<(I, OL, OR)>,
}

impl<L, P, R, I, OL, OR> Delimited<L, P, R, I, OL, OR> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, OL, OR, L, P, R> Parser<I, O> for Delimited<L, P, R, I, OL, OR>
where
    L: Parser<I, OL>,
    P: Parser<I, O>,
    R: Parser<I, OR>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.left.parse(input, pos)?;
        let (pos, result) = self.parser.parse(input, pos)?;
        let (pos, _) = self.right.parse(input, pos)?;
        Ok((pos, result))
    }
}

/// WithContext: Labels errors with the grammar rule that produced them
#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| e.with_context(&self.context.to_string()))
    }
}

/// Lazy: Builds the inner parser on demand, which allows recursive grammars
#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        (self.f)().parse(input, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal() {
        let parser = Equal::new('a');
        assert_eq!(parser.parse(&['a', 'b'], 0), Ok((1, 'a')));
        assert!(matches!(
            parser.parse(&['a', 'b'], 1),
            Err(ParseError::Unexpected { position: 1, .. })
        ));
        assert!(matches!(
            parser.parse(&['a'], 1),
            Err(ParseError::UnexpectedEOF { .. })
        ));
    }

    #[test]
    fn test_choice_reports_furthest_error() {
        let parser: Choice<char, char> = Choice::new(vec![
            Box::new(Equal::new('x')),
            Box::new(Map::new(
                Tuple2::new(Equal::new('a'), Equal::new('b')),
                |(_, b): (char, char)| b,
            )),
        ]);
        assert_eq!(parser.parse(&['a', 'b'], 0), Ok((2, 'b')));
        let err = parser.parse(&['a', 'c'], 0).unwrap_err();
        assert_eq!(err.get_position(), 1);
    }

    #[test]
    fn test_separated_list_leaves_trailing_separator() {
        let parser: SeparatedList<_, _, char, char, char> =
            SeparatedList::new(Equal::new('a'), Equal::new(','));
        assert_eq!(parser.parse(&['a', ',', 'a', ','], 0), Ok((3, vec!['a', 'a'])));
        assert_eq!(parser.parse(&[',', 'a'], 0), Ok((0, vec![])));
    }

    #[test]
    fn test_many_and_optional() {
        let many: Many<_, char, char> = Many::new(Equal::new('a'));
        assert_eq!(many.parse(&['a', 'a', 'b'], 0), Ok((2, vec!['a', 'a'])));
        let optional: Optional<_, char, char> = Optional::new(Equal::new('b'));
        assert_eq!(optional.parse(&['a'], 0), Ok((0, None)));
    }

    #[test]
    fn test_try_map_rejects() {
        let parser: TryMap<_, _, char, char> =
            TryMap::new(Equal::new('a'), |_: char| Err::<char, _>("nope".to_string()));
        assert_eq!(
            parser.parse(&['a'], 0),
            Err(ParseError::Failure {
                message: "nope".to_string(),
                position: 0,
                context: None,
            })
        );
    }

    #[test]
    fn test_delimited_with_context() {
        let delimited: Delimited<_, _, _, char, char, char> =
            Delimited::new(Equal::new('('), Equal::new('a'), Equal::new(')'));
        let parser = WithContext::new(
            delimited,
            "group",
        );
        assert_eq!(parser.parse(&['(', 'a', ')'], 0), Ok((3, 'a')));
        let err = parser.parse(&['(', 'a'], 0).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedEOF { context: Some(ref c), .. } if c == "group"
        ));
    }
}
