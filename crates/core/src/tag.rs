//! Field tags
//!
//! A tag is the serialization-name tag of a field, optionally annotated with
//! extra keywords:
//!
//! ```text
//! "id,hexstring"
//! "parent,omitempty,emptyobject"
//! ",emptyarray"          (empty name: the Rust identifier is used)
//! "-"                    (field is skipped)
//! ```
//!
//! Segments are separated by `,` or `;` and are compared as written, with
//! no whitespace trimming: `"a, omitempty"` has the option `" omitempty"`.

/// Encode an int64 as a hex string
pub const HEXSTRING: &str = "hexstring";

/// Encode a nil pointer or interface as `{}`
pub const EMPTYOBJECT: &str = "emptyobject";

/// Encode a nil collection as `[]`
pub const EMPTYARRAY: &str = "emptyarray";

/// Omit the field when its encoder reports it empty
pub const OMITEMPTY: &str = "omitempty";

/// A parsed field tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    raw: String,
}

impl Tag {
    /// Wrap a raw tag string
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The tag exactly as declared
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The serialization name, if the first segment is non-empty
    pub fn name(&self) -> Option<&str> {
        if self.is_skipped() {
            return None;
        }
        self.segments().next().filter(|name| !name.is_empty())
    }

    /// `true` when the field is excluded from encoding and decoding
    pub fn is_skipped(&self) -> bool {
        self.raw == "-"
    }

    /// Exact match on one of the option segments after the name
    pub fn has_option(&self, option: &str) -> bool {
        self.segments().skip(1).any(|segment| segment == option)
    }

    /// Keyword containment anywhere in the raw tag
    ///
    /// This is the match used for the codec keywords, so `"id,hexstring"` and
    /// `"id,hexstring_legacy"` both enable the hex codec.
    pub fn contains(&self, keyword: &str) -> bool {
        self.raw.contains(keyword)
    }

    /// `omitempty` option present
    pub fn omit_empty(&self) -> bool {
        self.has_option(OMITEMPTY)
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split(|c: char| c == ',' || c == ';')
    }
}

impl From<&str> for Tag {
    fn from(raw: &str) -> Self {
        Tag::new(raw)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(Tag::new("id,hexstring").name(), Some("id"));
        assert_eq!(Tag::new("id").name(), Some("id"));
        assert_eq!(Tag::new(",emptyarray").name(), None);
        assert_eq!(Tag::new("").name(), None);
    }

    #[test]
    fn test_tag_name_semicolon_separated() {
        let tag = Tag::new("parent;emptyobject");
        assert_eq!(tag.name(), Some("parent"));
        assert!(tag.has_option(EMPTYOBJECT));
    }

    #[test]
    fn test_tag_skipped() {
        assert!(Tag::new("-").is_skipped());
        assert_eq!(Tag::new("-").name(), None);

        // "-," names a field literally called "-"
        assert!(!Tag::new("-,").is_skipped());
        assert_eq!(Tag::new("-,").name(), Some("-"));
    }

    #[test]
    fn test_tag_has_option_is_exact() {
        let tag = Tag::new("id,omitempty,hexstring");
        assert!(tag.has_option(OMITEMPTY));
        assert!(tag.has_option(HEXSTRING));
        assert!(!tag.has_option("hex"));
        // the name segment is not an option
        assert!(!tag.has_option("id"));
    }

    #[test]
    fn test_tag_contains_is_substring() {
        let tag = Tag::new("id,hexstring_legacy");
        assert!(tag.contains(HEXSTRING));
        assert!(!tag.has_option(HEXSTRING));

        // containment also sees the name segment
        assert!(Tag::new("emptyarray").contains(EMPTYARRAY));
    }

    #[test]
    fn test_tag_omit_empty() {
        assert!(Tag::new("x,omitempty").omit_empty());
        assert!(!Tag::new("omitempty").omit_empty());
        assert!(!Tag::new("x,emptyobject").omit_empty());
    }

    #[test]
    fn test_tag_display_is_raw() {
        assert_eq!(Tag::from("a, omitempty").to_string(), "a, omitempty");
    }

    #[test]
    fn test_tag_segments_not_trimmed() {
        let tag = Tag::new("a, omitempty");
        assert!(!tag.omit_empty());
        assert!(tag.has_option(" omitempty"));
        assert_eq!(Tag::new(" a,omitempty").name(), Some(" a"));
        assert!(!Tag::new(" -").is_skipped());

        // keyword containment still sees padded options
        assert!(Tag::new("id, hexstring").contains(HEXSTRING));
    }
}
