//! Namespaced ids.
//!
//! An id is either bare (owned by [`SourceId::DEFAULT`]) or
//! `"<namespace>:<raw-id>"`. Raw ids never contain `:`; anything before the
//! first `:` is a namespace and must be a known one.

use crate::app::{MangaplexError, Result};
use crate::sources::SourceId;

const DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub source: SourceId,
    pub raw_id: String,
}

/// Split a namespaced id into its source and raw id.
///
/// An explicit `mangadex:` prefix is accepted as well as a bare id. Unknown
/// namespaces are an error rather than falling back to the default source.
pub fn parse(id: &str) -> Result<ParsedId> {
    match id.split_once(DELIMITER) {
        None => Ok(ParsedId {
            source: SourceId::DEFAULT,
            raw_id: id.to_string(),
        }),
        Some((namespace, raw_id)) => {
            let source = SourceId::from_namespace(namespace)
                .ok_or_else(|| MangaplexError::UnknownSource(namespace.to_string()))?;
            Ok(ParsedId {
                source,
                raw_id: raw_id.to_string(),
            })
        }
    }
}

/// Build the id callers see for `raw_id` from `source`.
pub fn format(source: SourceId, raw_id: &str) -> String {
    if source == SourceId::DEFAULT {
        raw_id.to_string()
    } else {
        format!("{}{}{}", source.namespace(), DELIMITER, raw_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_routes_to_default() {
        let parsed = parse("a1b2c3d4-0000-1111-2222-333344445555").unwrap();
        assert_eq!(parsed.source, SourceId::MangaDex);
        assert_eq!(parsed.raw_id, "a1b2c3d4-0000-1111-2222-333344445555");
    }

    #[test]
    fn test_prefixed_id_is_stripped() {
        let parsed = parse("mangapill:2--one-piece").unwrap();
        assert_eq!(parsed.source, SourceId::MangaPill);
        assert_eq!(parsed.raw_id, "2--one-piece");
    }

    #[test]
    fn test_explicit_default_prefix() {
        let parsed = parse("mangadex:abc").unwrap();
        assert_eq!(parsed.source, SourceId::MangaDex);
        assert_eq!(parsed.raw_id, "abc");
    }

    #[test]
    fn test_unknown_namespace_is_rejected() {
        let err = parse("unknownsource:123").unwrap_err();
        assert!(matches!(err, MangaplexError::UnknownSource(ref ns) if ns == "unknownsource"));
    }

    #[test]
    fn test_format_then_parse_round_trips() {
        let cases = [
            (SourceId::MangaDex, "a1b2c3d4-0000-1111-2222-333344445555"),
            (SourceId::MangaPill, "2--one-piece"),
            (SourceId::MangaPill, "2-10001000"),
        ];
        for (source, raw_id) in cases {
            let parsed = parse(&format(source, raw_id)).unwrap();
            assert_eq!(parsed.source, source);
            assert_eq!(parsed.raw_id, raw_id);
        }
    }

    #[test]
    fn test_default_source_formats_bare() {
        assert_eq!(format(SourceId::MangaDex, "abc"), "abc");
        assert_eq!(format(SourceId::MangaPill, "1-2"), "mangapill:1-2");
    }
}
