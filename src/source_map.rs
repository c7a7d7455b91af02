// Source map helpers shared by assets and transformers

use sourcemap::{SourceMap, SourceMapBuilder};
use std::sync::Arc;

/// Source maps are shared between the asset that produced them and the assets
/// derived from it, so they travel behind an `Arc`.
pub type SharedSourceMap = Arc<SourceMap>;

/// A resolved position in an original source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

/// Parse a source map from its JSON form
pub fn parse_source_map(json: &str) -> Result<SharedSourceMap, sourcemap::Error> {
    SourceMap::from_slice(json.as_bytes()).map(Arc::new)
}

/// Serialize a source map to its JSON form
pub fn source_map_to_json(map: &SourceMap) -> Result<String, sourcemap::Error> {
    let mut buf = Vec::new();
    map.to_writer(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Chain two maps
///
/// `next` maps the output to its sources. Tokens of `next` that point at
/// `intermediate` are resolved through `prior`, which maps `intermediate` to
/// the true originals; tokens for any other source already name an original
/// and are kept as is. Intermediate positions `prior` does not cover are
/// dropped.
pub fn compose(prior: &SourceMap, next: &SourceMap, intermediate: &str) -> SourceMap {
    let mut builder = SourceMapBuilder::new(next.get_file());

    for token in next.tokens() {
        match token.get_source() {
            Some(source) if source == intermediate => {
                let (src_line, src_col) = token.get_src();
                let Some(original) = prior.lookup_token(src_line, src_col) else {
                    continue;
                };
                // lookup falls back to earlier lines; only same-line hits count
                if original.get_dst_line() != src_line {
                    continue;
                }
                let Some(original_source) = original.get_source() else {
                    continue;
                };

                let raw = builder.add(
                    token.get_dst_line(),
                    token.get_dst_col(),
                    original.get_src_line(),
                    original.get_src_col(),
                    Some(original_source),
                    original.get_name().or(token.get_name()),
                    false,
                );
                copy_source_contents(&mut builder, raw.src_id, prior, original.get_src_id());
            }
            Some(_) => {
                let raw = builder.add_token(&token, true);
                copy_source_contents(&mut builder, raw.src_id, next, token.get_src_id());
            }
            None => {
                builder.add_token(&token, true);
            }
        }
    }

    builder.into_sourcemap()
}

fn copy_source_contents(builder: &mut SourceMapBuilder, id: u32, from: &SourceMap, from_id: u32) {
    if builder.has_source_contents(id) {
        return;
    }
    if let Some(contents) = from.get_source_contents(from_id) {
        builder.set_source_contents(id, Some(contents));
    }
}

/// Resolve a 1-based generated position to its original position
pub fn original_position(map: &SourceMap, line: u32, column: u32) -> Option<OriginalPosition> {
    // sourcemap uses 0-based indexing
    let token = map.lookup_token(line.saturating_sub(1), column.saturating_sub(1))?;
    let source = token.get_source()?;

    Some(OriginalPosition {
        source: source.to_string(),
        line: token.get_src_line() + 1,
        column: token.get_src_col() + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_MAP: &str =
        r#"{"version":3,"sources":["src/app.ts"],"names":[],"mappings":"AAAA"}"#;

    #[test]
    fn parse_and_serialize() {
        let map = parse_source_map(IDENTITY_MAP).unwrap();
        assert_eq!(map.get_source_count(), 1);
        assert_eq!(map.get_source(0), Some("src/app.ts"));

        let json = source_map_to_json(&map).unwrap();
        let reparsed = parse_source_map(&json).unwrap();
        assert_eq!(reparsed.get_source(0), Some("src/app.ts"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_source_map("not a map").is_err());
    }

    #[test]
    fn original_position_is_one_based() {
        let map = parse_source_map(IDENTITY_MAP).unwrap();
        let pos = original_position(&map, 1, 1).unwrap();
        assert_eq!(
            pos,
            OriginalPosition {
                source: "src/app.ts".to_string(),
                line: 1,
                column: 1,
            }
        );
    }

    #[test]
    fn compose_resolves_through_prior_map() {
        let prior = parse_source_map(IDENTITY_MAP).unwrap();
        let next = parse_source_map(
            r#"{"version":3,"sources":["app.js"],"names":[],"mappings":"AAAA"}"#,
        )
        .unwrap();

        let composed = compose(&prior, &next, "app.js");
        let pos = original_position(&composed, 1, 1).unwrap();
        assert_eq!(pos.source, "src/app.ts");
    }

    #[test]
    fn compose_keeps_tokens_for_other_sources() {
        // next already resolves to the original
        let prior = parse_source_map(
            r#"{"version":3,"sources":["src/app.ts"],"names":[],"mappings":"AAIA"}"#,
        )
        .unwrap();
        let next = parse_source_map(
            r#"{"version":3,"sources":["src/app.ts"],"sourcesContent":["let app = 1;"],"names":[],"mappings":"AAIA"}"#,
        )
        .unwrap();

        let composed = compose(&prior, &next, "app.js");
        let pos = original_position(&composed, 1, 1).unwrap();
        assert_eq!(pos.source, "src/app.ts");
        assert_eq!(pos.column, 5);
        assert_eq!(composed.get_source_contents(0), Some("let app = 1;"));
    }

    #[test]
    fn compose_handles_mixed_sources() {
        // line 1 points at the intermediate file, line 2 at an original
        let prior = parse_source_map(
            r#"{"version":3,"sources":["src/app.ts"],"sourcesContent":["const app = 1;"],"names":[],"mappings":"AAEA"}"#,
        )
        .unwrap();
        let next = parse_source_map(
            r#"{"version":3,"sources":["app.js","src/lib.ts"],"names":[],"mappings":"AAAA;ACAA"}"#,
        )
        .unwrap();

        let composed = compose(&prior, &next, "app.js");

        let first = original_position(&composed, 1, 1).unwrap();
        assert_eq!((first.source.as_str(), first.line), ("src/app.ts", 3));
        let second = original_position(&composed, 2, 1).unwrap();
        assert_eq!(second.source, "src/lib.ts");

        let app = (0..composed.get_source_count())
            .find(|&i| composed.get_source(i) == Some("src/app.ts"))
            .unwrap();
        assert_eq!(composed.get_source_contents(app), Some("const app = 1;"));
    }

    #[test]
    fn compose_drops_uncovered_intermediate_positions() {
        let prior = parse_source_map(IDENTITY_MAP).unwrap();
        // line 2 of app.js has no mapping in prior
        let next = parse_source_map(
            r#"{"version":3,"sources":["app.js"],"names":[],"mappings":"AACA"}"#,
        )
        .unwrap();

        let composed = compose(&prior, &next, "app.js");
        assert_eq!(composed.get_token_count(), 0);
    }
}
