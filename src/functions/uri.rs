use lazy_static::lazy_static;
use regex::Regex;

use super::utils::*;
use crate::{
    error::{Error, ExpressionResult},
    expression::{ExpressionEvaluator, ExpressionType, ReturnType},
    value::Value,
};

lazy_static! {
    static ref ABSOLUTE_URI: Regex = Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?:[^@/?#]*@)?(?P<host>\[[^\]]*\]|[^:/?#]*)(?::(?P<port>\d*))?(?P<path>[^?#]*)(?P<query>\?[^#]*)?(?:#.*)?$"
    )
    .expect("valid regex");
}

#[derive(Debug, Clone, PartialEq)]
struct Uri {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
}

impl Uri {
    fn parse(text: &str) -> ExpressionResult<Self> {
        let invalid = || {
            Error::evaluation(format!(
                "{} is not a valid absolute URI: it should contain a scheme and a host.",
                text
            ))
        };
        let captures = ABSOLUTE_URI.captures(text.trim()).ok_or_else(invalid)?;
        let host = captures.name("host").map_or("", |m| m.as_str());
        if host.is_empty() {
            return Err(invalid());
        }
        let port = match captures.name("port").map(|m| m.as_str()) {
            None | Some("") => None,
            Some(digits) => Some(digits.parse::<u16>().map_err(|_| invalid())?),
        };
        let path = captures.name("path").map_or("", |m| m.as_str());
        Ok(Self {
            scheme: captures["scheme"].to_ascii_lowercase(),
            host: host.to_string(),
            port,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query: captures
                .name("query")
                .map_or(String::new(), |m| m.as_str().to_string()),
        })
    }

    /// Explicit port, or the scheme's well-known port, or -1.
    fn effective_port(&self) -> i64 {
        if let Some(port) = self.port {
            return port as i64;
        }
        match self.scheme.as_str() {
            "http" | "ws" => 80,
            "https" | "wss" => 443,
            "ftp" => 21,
            _ => -1,
        }
    }
}

fn uri_part<F>(part: F) -> impl Fn(&[Value]) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&Uri) -> Value + Send + Sync + 'static,
{
    move |args| {
        let uri = Uri::parse(&parse_string_or_null(&args[0]))?;
        Ok(part(&uri))
    }
}

fn uri_evaluator<F>(expr_type: ExpressionType, return_type: ReturnType, part: F) -> ExpressionEvaluator
where
    F: Fn(&Uri) -> Value + Send + Sync + 'static,
{
    ExpressionEvaluator::new(
        expr_type.as_ref(),
        apply_with_error(uri_part(part), Some(verify_string)),
        return_type,
        validate_unary_string,
    )
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        uri_evaluator(ExpressionType::UriHost, ReturnType::STRING, |uri| {
            Value::String(uri.host.clone())
        }),
        uri_evaluator(ExpressionType::UriPath, ReturnType::STRING, |uri| {
            Value::String(uri.path.clone())
        }),
        uri_evaluator(ExpressionType::UriPathAndQuery, ReturnType::STRING, |uri| {
            Value::String(format!("{}{}", uri.path, uri.query))
        }),
        uri_evaluator(ExpressionType::UriPort, ReturnType::NUMBER, |uri| {
            Value::Integer(uri.effective_port())
        }),
        uri_evaluator(ExpressionType::UriQuery, ReturnType::STRING, |uri| {
            Value::String(uri.query.clone())
        }),
        uri_evaluator(ExpressionType::UriScheme, ReturnType::STRING, |uri| {
            Value::String(uri.scheme.clone())
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        let uri = Uri::parse("https://www.contoso.com:8080/catalog/shownew.htm?date=today#top").unwrap();
        assert_eq!(uri.scheme, "https");
        assert_eq!(uri.host, "www.contoso.com");
        assert_eq!(uri.effective_port(), 8080);
        assert_eq!(uri.path, "/catalog/shownew.htm");
        assert_eq!(uri.query, "?date=today");
    }

    #[test]
    fn test_defaults() {
        let uri = Uri::parse("http://www.contoso.com").unwrap();
        assert_eq!(uri.path, "/");
        assert_eq!(uri.query, "");
        assert_eq!(uri.effective_port(), 80);
    }

    #[test]
    fn test_relative_uri_is_an_error() {
        assert!(Uri::parse("/catalog/shownew.htm").is_err());
        assert!(Uri::parse("contoso.com").is_err());
        assert!(Uri::parse("http://:80/").is_err());
    }
}
