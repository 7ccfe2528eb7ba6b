//! Locale text resolution.

use tracing::debug;

use crate::domain::entities::LocalizedText;
use crate::domain::error::{DomainError, DomainResult};

/// Resolve `text` for `locale`, falling back to `default_locale`.
///
/// `context` names the field for error reporting, e.g. `q1.question`.
pub fn resolve_text<'a>(
    text: &'a LocalizedText,
    locale: &str,
    default_locale: &str,
    context: &str,
) -> DomainResult<&'a str> {
    if let Some(s) = text.get(locale) {
        return Ok(s);
    }
    match text.get(default_locale) {
        Some(s) => {
            debug!(context, locale, default_locale, "falling back to default locale");
            Ok(s)
        }
        None => Err(DomainError::MissingTranslation {
            context: context.to_string(),
            locale: locale.to_string(),
            default_locale: default_locale.to_string(),
        }),
    }
}

/// Pick the locale a host should use for `requested`.
///
/// Exact matches win, then a case-insensitive match, then a match on the
/// language subtag (`es-MX` -> `es`). Anything else gets `default_locale`.
pub fn negotiate_locale<'a>(
    requested: &str,
    supported: &'a [String],
    default_locale: &'a str,
) -> &'a str {
    let requested = requested.trim();
    if let Some(s) = supported.iter().find(|s| s.as_str() == requested) {
        return s;
    }
    if let Some(s) = supported.iter().find(|s| s.eq_ignore_ascii_case(requested)) {
        return s;
    }
    let language = requested.split(['-', '_']).next().unwrap_or_default();
    supported
        .iter()
        .find(|s| s.eq_ignore_ascii_case(language))
        .map(String::as_str)
        .unwrap_or(default_locale)
}
