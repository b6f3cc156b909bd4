//! Reverse URL resolution.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};

use fbv_core::{FbvError, FbvResult};

use super::pattern::{tokenize_route, RouteToken, URLPattern};
use super::resolver::URLConf;

/// Characters left unescaped in reversed URLs: unreserved characters, the
/// RFC 3986 sub-delimiters and `/~:@`.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Generates the absolute path of a named pattern.
///
/// Values come from `kwargs` by name or from `args` by position; the two
/// cannot be mixed. Every value must satisfy its placeholder's converter.
/// When several patterns share the name, the first that accepts the
/// arguments wins. Bound kwargs of a pattern may be passed too, but only with
/// their bound value. Regex patterns are never reversed.
///
/// # Errors
///
/// [`FbvError::NoReverseMatch`] if no pattern fits;
/// [`FbvError::ImproperlyConfigured`] if both `args` and `kwargs` are given.
///
/// # Examples
///
/// ```
/// use fbv_http::urls::pattern::path;
/// use fbv_http::urls::resolver::URLConf;
/// use fbv_http::urls::reverse::reverse;
/// use fbv_http::{HttpRequest, HttpResponse};
/// use std::sync::Arc;
///
/// let handler = Arc::new(|_req: HttpRequest| -> fbv_http::BoxFuture {
///     Box::pin(async { Ok(HttpResponse::ok("ok")) })
/// });
/// let conf = URLConf::new(vec![
///     path("articles/<int:year>/", handler, Some("article-year")).unwrap(),
/// ]);
///
/// let mut kwargs = serde_json::Map::new();
/// kwargs.insert("year".into(), 2024.into());
/// assert_eq!(reverse("article-year", &[], &kwargs, &conf).unwrap(), "/articles/2024/");
/// assert_eq!(
///     reverse("article-year", &["1999".to_string()], &serde_json::Map::new(), &conf).unwrap(),
///     "/articles/1999/"
/// );
/// ```
pub fn reverse(
    viewname: &str,
    args: &[String],
    kwargs: &Map<String, Value>,
    urlconf: &URLConf,
) -> FbvResult<String> {
    if !args.is_empty() && !kwargs.is_empty() {
        return Err(FbvError::ImproperlyConfigured(
            "Don't mix positional and keyword arguments in a call to reverse()".to_string(),
        ));
    }

    let mut candidates = urlconf
        .patterns()
        .iter()
        .filter(|p| p.name() == Some(viewname))
        .peekable();
    if candidates.peek().is_none() {
        return Err(FbvError::NoReverseMatch(viewname.to_string()));
    }

    for pattern in candidates {
        if pattern.is_regex() {
            continue;
        }
        if let Some(url) = try_pattern(pattern, args, kwargs)? {
            let encoded = utf8_percent_encode(&url, URL_SAFE).to_string();
            return Ok(format!("/{encoded}"));
        }
    }

    tracing::debug!(viewname, ?args, "no pattern accepts the arguments");
    Err(FbvError::NoReverseMatch(viewname.to_string()))
}

/// Builds the relative URL for one pattern, or `None` if the arguments don't
/// fit it.
fn try_pattern(
    pattern: &URLPattern,
    args: &[String],
    kwargs: &Map<String, Value>,
) -> FbvResult<Option<String>> {
    let tokens = tokenize_route(pattern.route())?;
    let params: Vec<&str> = tokens
        .iter()
        .filter_map(|t| match t {
            RouteToken::Placeholder { name, .. } => Some(*name),
            RouteToken::Literal(_) => None,
        })
        .collect();

    if args.is_empty() {
        let defaults = pattern.default_kwargs();
        let extra_ok = kwargs
            .iter()
            .filter(|(k, _)| !params.contains(&k.as_str()))
            .all(|(k, v)| defaults.get(k) == Some(v));
        let all_present = params.iter().all(|p| kwargs.contains_key(*p));
        if !extra_ok || !all_present {
            return Ok(None);
        }
    } else if args.len() != params.len() {
        return Ok(None);
    }

    let mut url = String::new();
    let mut positional = args.iter();
    for token in &tokens {
        match token {
            RouteToken::Literal(text) => url.push_str(text),
            RouteToken::Placeholder { name, .. } => {
                let converter = pattern
                    .converters()
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, c)| c)
                    .ok_or_else(|| {
                        FbvError::ImproperlyConfigured(format!("No converter for '{name}'"))
                    })?;
                let text = if args.is_empty() {
                    match kwargs.get(*name) {
                        Some(value) => match converter.to_url(value) {
                            Ok(text) => text,
                            Err(_) => return Ok(None),
                        },
                        None => return Ok(None),
                    }
                } else {
                    match positional.next() {
                        Some(text) => text.clone(),
                        None => return Ok(None),
                    }
                };
                let check = Regex::new(&format!("^(?:{})$", converter.regex())).map_err(|e| {
                    FbvError::ImproperlyConfigured(format!("Invalid converter regex: {e}"))
                })?;
                if !check.is_match(&text) {
                    return Ok(None);
                }
                url.push_str(&text);
            }
        }
    }
    Ok(Some(url))
}
