//! Stateless URL normalization: canonical form and ByFood domain redirection.

use std::str::FromStr;

use axum::http::Uri;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^/]+/[^?]+").expect("canonical pattern compiles"));

// Exact hosts only; wildcard subdomains are not trusted.
static BYFOOD_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?byfood\.com(?:/.*)?$").expect("domain pattern compiles")
});

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern compiles"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Url format invalid")]
    InvalidUrl,
    #[error("Invalid operation")]
    UnknownOperation,
    #[error("URL does not have a canonical format")]
    Format,
    #[error("URL is not from ByFood Domain")]
    Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Canonical,
    Redirection,
    /// Canonical, then redirection.
    All,
}

impl FromStr for Operation {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(Operation::Canonical),
            "redirection" => Ok(Operation::Redirection),
            "all" => Ok(Operation::All),
            _ => Err(NormalizeError::UnknownOperation),
        }
    }
}

/// Absolute `http`/`https` URL with a host.
pub fn is_http_url(url: &str) -> bool {
    let Ok(uri) = url.parse::<Uri>() else {
        return false;
    };
    let scheme_ok = uri.scheme_str().is_some_and(|scheme| {
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    });
    scheme_ok && uri.host().is_some()
}

/// Drop the query string and one trailing slash. Case is preserved.
pub fn canonicalize(url: &str) -> Result<String, NormalizeError> {
    let matched = CANONICAL.find(url).ok_or(NormalizeError::Format)?.as_str();
    Ok(matched.strip_suffix('/').unwrap_or(matched).to_string())
}

/// Rewrite a ByFood URL to `https://www.byfood.com/...`, lowercased.
pub fn to_canonical_domain(url: &str) -> Result<String, NormalizeError> {
    if !BYFOOD_DOMAIN.is_match(url) {
        return Err(NormalizeError::Domain);
    }

    let rest = SCHEME.replace(url, "").to_lowercase();
    if rest.starts_with("www.") {
        Ok(format!("https://{rest}"))
    } else {
        Ok(format!("https://www.{rest}"))
    }
}

/// Validate `url`, then apply the named operation.
pub fn normalize(url: &str, operation: &str) -> Result<String, NormalizeError> {
    if !is_http_url(url) {
        return Err(NormalizeError::InvalidUrl);
    }

    match operation.parse::<Operation>()? {
        Operation::Canonical => canonicalize(url),
        Operation::Redirection => to_canonical_domain(url),
        Operation::All => to_canonical_domain(&canonicalize(url)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strips_query_and_keeps_case() {
        assert_eq!(
            canonicalize("https://BYFOOD.com/food-EXPeriences?query=abc/").unwrap(),
            "https://BYFOOD.com/food-EXPeriences"
        );
    }

    #[test]
    fn canonical_strips_trailing_slash() {
        assert_eq!(
            canonicalize("http://example.com/a/b/").unwrap(),
            "http://example.com/a/b"
        );
    }

    #[test]
    fn canonical_requires_a_path() {
        assert_eq!(
            canonicalize("https://byfood.com/"),
            Err(NormalizeError::Format)
        );
        assert_eq!(
            canonicalize("https://byfood.com?x=1"),
            Err(NormalizeError::Format)
        );
    }

    #[test]
    fn redirection_forces_www_and_lowercase() {
        assert_eq!(
            to_canonical_domain("https://ByFooD.com/FOOD-EXPeriences/").unwrap(),
            "https://www.byfood.com/food-experiences/"
        );
        assert_eq!(
            to_canonical_domain("http://WWW.byfood.com").unwrap(),
            "https://www.byfood.com"
        );
    }

    #[test]
    fn redirection_rejects_foreign_domains() {
        let err = to_canonical_domain("https://BootlegFood.com/x").unwrap_err();
        assert_eq!(err, NormalizeError::Domain);
        assert_eq!(err.to_string(), "URL is not from ByFood Domain");

        assert_eq!(
            to_canonical_domain("https://evil.byfood.com/x"),
            Err(NormalizeError::Domain)
        );
        assert_eq!(
            to_canonical_domain("https://byfood.com.evil.org/x"),
            Err(NormalizeError::Domain)
        );
    }

    #[test]
    fn all_runs_canonical_then_redirection() {
        assert_eq!(
            normalize("https://BYFOOD.com/food-EXPeriences?query=abc/", "all").unwrap(),
            "https://www.byfood.com/food-experiences"
        );
    }

    #[test]
    fn url_shape_is_checked_before_operation() {
        assert_eq!(
            normalize("//*BYFOOD.com/food-EXPeriences?query=abc/", "canonical"),
            Err(NormalizeError::InvalidUrl)
        );
        assert_eq!(
            normalize("ftp://byfood.com/file", "canonical"),
            Err(NormalizeError::InvalidUrl)
        );
        assert_eq!(normalize("", "redir"), Err(NormalizeError::InvalidUrl));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert_eq!(
            normalize("https://BootlegFood.com/FOOD-EXPeriences/", "redir"),
            Err(NormalizeError::UnknownOperation)
        );
        assert_eq!(
            normalize("https://byfood.com/x", ""),
            Err(NormalizeError::UnknownOperation)
        );
    }
}
