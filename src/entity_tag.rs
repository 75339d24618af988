//! Entity tags and entity-tag lists (RFC 7232 §2.3).
//!
//! ```text
//! entity-tag = [ weak ] opaque-tag
//! weak       = %x57.2F ; "W/", case-sensitive
//! opaque-tag = DQUOTE *etagc DQUOTE
//! etagc      = %x21 / %x23-7E / obs-text
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A resource version marker: an opaque value plus a weak/strong flag.
///
/// The value is stored without the surrounding quotes.
///
/// ```rust
/// use accord::EntityTag;
///
/// let tag: EntityTag = r#"W/"v1""#.parse().unwrap();
/// assert!(tag.is_weak());
/// assert_eq!(tag.tag(), "v1");
/// assert_eq!(tag.to_string(), r#"W/"v1""#);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EntityTag {
    value: String,
    weak: bool,
}

impl EntityTag {
    /// Builds an entity tag, validating `value` against `etagc`.
    pub fn new(value: impl Into<String>, weak: bool) -> Result<Self, Error> {
        let value = value.into();
        if value.bytes().all(is_etagc) {
            Ok(Self { value, weak })
        } else {
            Err(Error::InvalidEntityTag(value))
        }
    }

    /// Strong tag. Panics if `value` contains `"` or control characters.
    pub fn strong(value: impl Into<String>) -> Self {
        Self::new(value, false).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Weak tag. Panics if `value` contains `"` or control characters.
    pub fn weak(value: impl Into<String>) -> Self {
        Self::new(value, true).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn tag(&self) -> &str {
        &self.value
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Strong comparison: both tags strong and the values byte-equal.
    pub fn strong_eq(&self, other: &Self) -> bool {
        !self.weak && !other.weak && self.value == other.value
    }

    /// Weak comparison: values byte-equal, strength ignored.
    pub fn weak_eq(&self, other: &Self) -> bool {
        self.value == other.value
    }

    /// Parses one entity-tag off the front of `s`, returning the remainder.
    fn parse_prefix(s: &str) -> Option<(Self, &str)> {
        let (weak, s) = match s.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix('"')?;
        let end = s.find('"')?;
        let value = &s[..end];
        if !value.bytes().all(is_etagc) {
            return None;
        }
        Some((Self { value: value.to_owned(), weak }, &s[end + 1..]))
    }
}

impl FromStr for EntityTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_prefix(s.trim()) {
            Some((tag, "")) => Ok(tag),
            _ => Err(Error::InvalidEntityTag(s.to_owned())),
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            f.write_str("W/")?;
        }
        write!(f, "\"{}\"", self.value)
    }
}

fn is_etagc(b: u8) -> bool {
    b == 0x21 || (0x23..=0x7e).contains(&b) || b >= 0x80
}

// ── EntityTagList ─────────────────────────────────────────────────────────────

/// The value of an `If-Match` or `If-None-Match` header.
///
/// ```text
/// If-Match = "*" / 1#entity-tag
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntityTagList {
    /// `*`: matches any current representation.
    Any,
    Tags(Vec<EntityTag>),
}

impl EntityTagList {
    /// A list with no tags. The evaluator treats it like an absent header.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Tags(tags) if tags.is_empty())
    }

    /// `If-Match` semantics: `*` or a strongly equal member.
    pub fn matches_strong(&self, etag: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|t| t.strong_eq(etag)),
        }
    }

    /// `If-None-Match` semantics: `*` or a weakly equal member.
    pub fn matches_weak(&self, etag: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|t| t.weak_eq(etag)),
        }
    }

    /// Appends the members of `other`. `*` absorbs everything.
    pub(crate) fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Tags(mut a), Self::Tags(b)) => {
                a.extend(b);
                Self::Tags(a)
            }
            _ => Self::Any,
        }
    }
}

impl From<EntityTag> for EntityTagList {
    fn from(tag: EntityTag) -> Self {
        Self::Tags(vec![tag])
    }
}

impl FromStr for EntityTagList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidEntityTag(s.to_owned());

        if s.trim() == "*" {
            return Ok(Self::Any);
        }

        let mut tags = Vec::new();
        let mut rest = s;
        loop {
            // Empty list elements are legal: `"a", , "b"`.
            rest = rest.trim_start_matches([',', ' ', '\t']);
            if rest.is_empty() {
                break;
            }
            let (tag, tail) = EntityTag::parse_prefix(rest).ok_or_else(invalid)?;
            tags.push(tag);
            rest = tail.trim_start_matches([' ', '\t']);
            if !rest.is_empty() && !rest.starts_with(',') {
                return Err(invalid());
            }
        }
        Ok(Self::Tags(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strong_and_weak() {
        let strong: EntityTag = "\"abc\"".parse().unwrap();
        assert!(!strong.is_weak());
        assert_eq!(strong.tag(), "abc");

        let weak: EntityTag = " W/\"abc\" ".parse().unwrap();
        assert!(weak.is_weak());
        assert_eq!(weak.tag(), "abc");
    }

    #[test]
    fn rejects_malformed_tags() {
        for raw in ["abc", "\"abc", "w/\"abc\"", "\"a\"b\"", "\"abc\" x", ""] {
            assert!(raw.parse::<EntityTag>().is_err(), "{raw:?} should not parse");
        }
        assert!(EntityTag::new("has\"quote", false).is_err());
    }

    #[test]
    fn comparison_functions() {
        // RFC 7232 §2.3.2 table.
        let w1 = EntityTag::weak("1");
        let w2 = EntityTag::weak("2");
        let s1 = EntityTag::strong("1");

        assert!(!w1.strong_eq(&w1));
        assert!(w1.weak_eq(&w1));
        assert!(!w1.strong_eq(&w2));
        assert!(!w1.weak_eq(&w2));
        assert!(!w1.strong_eq(&s1));
        assert!(w1.weak_eq(&s1));
        assert!(s1.strong_eq(&s1));
        assert!(s1.weak_eq(&s1));
    }

    #[test]
    fn display_round_trips_wire_form() {
        assert_eq!(EntityTag::strong("xyzzy").to_string(), "\"xyzzy\"");
        assert_eq!(EntityTag::weak("xyzzy").to_string(), "W/\"xyzzy\"");
    }

    #[test]
    fn list_parsing() {
        assert_eq!("*".parse::<EntityTagList>().unwrap(), EntityTagList::Any);

        let list: EntityTagList = "\"xyzzy\", W/\"r2d2xxxx\",\"c3piozzzz\""
            .parse()
            .unwrap();
        assert_eq!(
            list,
            EntityTagList::Tags(vec![
                EntityTag::strong("xyzzy"),
                EntityTag::weak("r2d2xxxx"),
                EntityTag::strong("c3piozzzz"),
            ])
        );
    }

    #[test]
    fn list_keeps_commas_inside_quotes() {
        let list: EntityTagList = "\"a,b\", \"c\"".parse().unwrap();
        assert_eq!(
            list,
            EntityTagList::Tags(vec![EntityTag::strong("a,b"), EntityTag::strong("c")])
        );
    }

    #[test]
    fn list_skips_empty_elements() {
        let list: EntityTagList = " , \"a\" ,, ".parse().unwrap();
        assert_eq!(list, EntityTagList::from(EntityTag::strong("a")));

        let empty: EntityTagList = "".parse().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn list_rejects_garbage() {
        assert!("\"a\" \"b\"".parse::<EntityTagList>().is_err());
        assert!("\"a\", *".parse::<EntityTagList>().is_err());
        assert!("abc".parse::<EntityTagList>().is_err());
    }

    #[test]
    fn list_matching() {
        let resource = EntityTag::strong("v1");
        let weak_list = EntityTagList::from(EntityTag::weak("v1"));

        assert!(EntityTagList::Any.matches_strong(&resource));
        assert!(EntityTagList::Any.matches_weak(&resource));
        assert!(!weak_list.matches_strong(&resource));
        assert!(weak_list.matches_weak(&resource));
    }

    #[test]
    fn merge_concatenates_or_absorbs() {
        let a = EntityTagList::from(EntityTag::strong("a"));
        let b = EntityTagList::from(EntityTag::strong("b"));
        assert_eq!(
            a.clone().merge(b),
            EntityTagList::Tags(vec![EntityTag::strong("a"), EntityTag::strong("b")])
        );
        assert_eq!(a.merge(EntityTagList::Any), EntityTagList::Any);
    }
}
