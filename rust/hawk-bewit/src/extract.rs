//! Locating the `bewit` query parameter in a request target.

use crate::{BEWIT_PARAMETER, BewitError};

/// A request target split into its bewit and the resource it signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Raw value of the `bewit` parameter, if one was present. May be empty.
    pub bewit: Option<String>,
    /// Path and query with the `bewit` parameter removed.
    pub resource: String,
}

/// Split the `bewit` parameter out of `url`.
///
/// The parameter may appear anywhere in the query. The remaining parameters
/// keep their order and spelling, and the `?` is dropped if none remain. A
/// fragment is never part of the resource. Absolute URLs are reduced to their
/// path and query first.
///
/// Returns [`BewitError::MultipleAuthentications`] if the parameter appears
/// more than once.
pub fn extract_bewit(url: &str) -> Result<Extracted, BewitError> {
    let target = strip_fragment(origin_form(url));

    let Some((path, query)) = target.split_once('?') else {
        return Ok(Extracted {
            bewit: None,
            resource: target.to_string(),
        });
    };

    let mut bewit = None;
    let mut rest = Vec::new();
    for pair in query.split('&') {
        match pair
            .strip_prefix(BEWIT_PARAMETER)
            .and_then(|tail| tail.strip_prefix('='))
        {
            Some(_) if bewit.is_some() => return Err(BewitError::MultipleAuthentications),
            Some(value) => bewit = Some(value.to_string()),
            None => rest.push(pair),
        }
    }

    if bewit.is_none() {
        return Ok(Extracted {
            bewit: None,
            resource: target.to_string(),
        });
    }

    let resource = if rest.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", rest.join("&"))
    };

    Ok(Extracted { bewit, resource })
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(head, _)| head)
}

/// `scheme://authority/path?query` becomes `/path?query`.
fn origin_form(url: &str) -> &str {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url;
    };
    let is_scheme = !scheme.is_empty()
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"+-.".contains(&b));
    if !is_scheme {
        return url;
    }
    match rest.find(['/', '?', '#']) {
        Some(index) => &rest[index..],
        None => "/",
    }
}
