//! Locale-aware string ordering for label and package-name sorting.
//!
//! Raw byte comparison puts every non-ASCII letter after `z`; this module wraps
//! an ICU4X collator so labels sort the way users of the active locale expect.

use std::cmp::Ordering;
use std::env;
use std::fmt;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use icu_provider::DataLocale;

/// Collator construction failed even for the root locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationError(String);

impl fmt::Display for CollationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collation data unavailable: {}", self.0)
    }
}

impl std::error::Error for CollationError {}

/// Locale-bound string comparator.
pub struct Collation {
    collator: Collator,
    locale: String,
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collation")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl Collation {
    /// Root (locale-neutral) collation.
    pub fn root() -> Result<Self, CollationError> {
        let collator = Collator::try_new(&DataLocale::default(), CollatorOptions::new())
            .map_err(|e| CollationError(format!("{e:?}")))?;
        Ok(Self {
            collator,
            locale: "und".to_string(),
        })
    }

    /// What: Build a collation for a BCP-47 style locale tag.
    ///
    /// Inputs:
    /// - `tag`: Locale such as `de-DE` or `sv`
    ///
    /// Output:
    /// - Collation for `tag`, or root collation when the tag cannot be parsed
    ///   or has no collation data
    ///
    /// Details:
    /// - Only a failure to build the root collator is returned as an error.
    pub fn for_locale(tag: &str) -> Result<Self, CollationError> {
        let locale = match tag.parse::<Locale>() {
            Ok(l) => l,
            Err(e) => {
                tracing::debug!(locale = %tag, error = ?e, "unparsable locale; using root collation");
                return Self::root();
            }
        };
        match Collator::try_new(&DataLocale::from(&locale), CollatorOptions::new()) {
            Ok(collator) => Ok(Self {
                collator,
                locale: locale.to_string(),
            }),
            Err(e) => {
                tracing::warn!(locale = %locale, error = ?e, "no collation data for locale; using root");
                Self::root()
            }
        }
    }

    /// What: Build a collation for the user's environment locale.
    ///
    /// Output:
    /// - Collation for the detected locale, or root when none is set
    pub fn from_system() -> Result<Self, CollationError> {
        match detect_collation_locale() {
            Some(tag) => Self::for_locale(&tag),
            None => Self::root(),
        }
    }

    /// Locale tag actually in use (`und` for root).
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Compare two strings under this locale's collation rules.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}

/// What: Detect the collation locale from environment variables.
///
/// Output:
/// - `Some("de-DE")`-style tag, or `None` when unset or set to `C`/`POSIX`
///
/// Details:
/// - Checks `LC_ALL`, `LC_COLLATE` and `LANG` in that order.
pub fn detect_collation_locale() -> Option<String> {
    ["LC_ALL", "LC_COLLATE", "LANG"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find_map(|raw| parse_locale_string(&raw))
}

/// What: Normalize a POSIX locale string (`de_DE.UTF-8@euro`) to a tag (`de-DE`).
///
/// Inputs:
/// - `locale_str`: Raw environment value
///
/// Output:
/// - Normalized tag, or `None` for empty, `C` and `POSIX` values
fn parse_locale_string(locale_str: &str) -> Option<String> {
    let trimmed = locale_str.trim();
    let base = trimmed.split(['.', '@']).next()?.trim();
    if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
        return None;
    }
    let parts: Vec<&str> = base.split(['_', '-']).filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [lang] => Some(lang.to_lowercase()),
        [lang, region] => Some(format!("{}-{}", lang.to_lowercase(), region.to_uppercase())),
        // language_Script_REGION, e.g. zh_Hans_CN
        [lang, script, region] => Some(format!(
            "{}-{}-{}",
            lang.to_lowercase(),
            script,
            region.to_uppercase()
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locale_string_normalizes_posix_forms() {
        assert_eq!(parse_locale_string("de_DE.UTF-8"), Some("de-DE".to_string()));
        assert_eq!(parse_locale_string("fr_fr@euro"), Some("fr-FR".to_string()));
        assert_eq!(parse_locale_string("sv"), Some("sv".to_string()));
        assert_eq!(
            parse_locale_string("zh_Hans_CN.UTF-8"),
            Some("zh-Hans-CN".to_string())
        );
        assert_eq!(parse_locale_string("C.UTF-8"), None);
        assert_eq!(parse_locale_string("POSIX"), None);
        assert_eq!(parse_locale_string("  "), None);
    }

    #[test]
    /// What: Accented letters collate next to their base letter, unlike byte order
    ///
    /// - Input: "école" vs "zebra" under root collation
    /// - Output: "école" first, while `str::cmp` puts it last
    fn root_collation_is_not_byte_order() {
        let c = Collation::root().unwrap();
        assert_eq!(c.locale(), "und");
        assert_eq!(c.compare("école", "zebra"), Ordering::Less);
        assert_eq!("école".cmp("zebra"), Ordering::Greater);
        assert_eq!(c.compare("apple", "apple"), Ordering::Equal);
    }

    #[test]
    /// What: Locale tailoring changes the order of the same strings
    ///
    /// - Input: "ä" vs "z" under root and Swedish
    /// - Output: root sorts "ä" with "a"; Swedish sorts it after "z"
    fn swedish_tailoring_moves_a_umlaut_after_z() {
        let root = Collation::root().unwrap();
        let sv = Collation::for_locale("sv-SE").unwrap();
        assert_eq!(root.compare("ä", "z"), Ordering::Less);
        assert_eq!(sv.compare("ä", "z"), Ordering::Greater);
    }

    #[test]
    fn unparsable_locale_falls_back_to_root() {
        let c = Collation::for_locale("not a locale!").unwrap();
        assert_eq!(c.locale(), "und");
    }
}
