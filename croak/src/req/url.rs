use core::str::FromStr;

/// The pieces of a `scheme://host[:port]/path[?query]` URL that the
/// client core consumes.
///
/// This is a carrier, not a general-purpose URL parser: it splits the
/// string into its parts and nothing more. Scheme validation happens at
/// submission time, so that a rejected scheme surfaces through the reply
/// rather than at construction.
///
/// ```
/// use croak::req::Url;
///
/// let url: Url = "coap://example.com:9000/a/b?who=me".parse().unwrap();
/// assert_eq!(url.scheme, "coap");
/// assert_eq!(url.host, "example.com");
/// assert_eq!(url.port, Some(9000));
/// assert_eq!(url.path, "/a/b");
/// assert_eq!(url.query.as_deref(), Some("who=me"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
  /// The scheme, lowercased (`coap` is the only one the core accepts)
  pub scheme: String,
  /// Host name or address literal
  pub host: String,
  /// Port, if the URL named one
  pub port: Option<u16>,
  /// Path, with its leading `/` (empty when the URL had none)
  pub path: String,
  /// Query string, without the `?`
  pub query: Option<String>,
}

/// Errors encounterable while splitting a URL into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlParseError {
  /// No `://` separator
  MissingScheme,
  /// The authority section was empty
  MissingHost,
  /// The port was not a 16-bit integer
  InvalidPort,
}

impl FromStr for Url {
  type Err = UrlParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (scheme, rest) = s.split_once("://").ok_or(UrlParseError::MissingScheme)?;

    let (authority, tail) = match rest.find(|c| c == '/' || c == '?') {
      | Some(ix) => (&rest[..ix], &rest[ix..]),
      | None => (rest, ""),
    };

    // bracketed IPv6 literals keep their colons
    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
      let (host, after) = bracketed.split_once(']').ok_or(UrlParseError::MissingHost)?;
      (host, after.strip_prefix(':'))
    } else {
      match authority.rsplit_once(':') {
        | Some((host, port)) => (host, Some(port)),
        | None => (authority, None),
      }
    };

    if host.is_empty() {
      return Err(UrlParseError::MissingHost);
    }

    let port = port.map(|p| p.parse::<u16>().map_err(|_| UrlParseError::InvalidPort))
                   .transpose()?;

    let (path, query) = match tail.split_once('?') {
      | Some((path, query)) => (path, Some(query)),
      | None => (tail, None),
    };

    Ok(Url { scheme: scheme.to_ascii_lowercase(),
             host: host.to_string(),
             port,
             path: path.to_string(),
             query: query.filter(|q| !q.is_empty()).map(String::from) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain() {
    let url: Url = "coap://192.0.2.1/hello".parse().unwrap();
    assert_eq!(url,
               Url { scheme: "coap".to_string(),
                     host: "192.0.2.1".to_string(),
                     port: None,
                     path: "/hello".to_string(),
                     query: None });
  }

  #[test]
  fn port_query_and_deep_path() {
    let url: Url = "coap://h:161/a/b/c?x=1&y=2".parse().unwrap();
    assert_eq!(url.port, Some(161));
    assert_eq!(url.path, "/a/b/c");
    assert_eq!(url.query.as_deref(), Some("x=1&y=2"));
  }

  #[test]
  fn no_path() {
    let url: Url = "coap://h".parse().unwrap();
    assert_eq!(url.path, "");
    assert_eq!(url.query, None);
  }

  #[test]
  fn ipv6_literal() {
    let url: Url = "coap://[2001:db8::1]:5684/x".parse().unwrap();
    assert_eq!(url.host, "2001:db8::1");
    assert_eq!(url.port, Some(5684));
  }

  #[test]
  fn schemes_are_kept_not_judged() {
    let url: Url = "HTTP://h/".parse().unwrap();
    assert_eq!(url.scheme, "http");
  }

  #[test]
  fn errors() {
    assert_eq!("no-scheme-here".parse::<Url>(),
               Err(UrlParseError::MissingScheme));
    assert_eq!("coap:///path".parse::<Url>(), Err(UrlParseError::MissingHost));
    assert_eq!("coap://h:99999/".parse::<Url>(),
               Err(UrlParseError::InvalidPort));
  }
}
