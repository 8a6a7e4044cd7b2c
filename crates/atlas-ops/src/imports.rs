//! Import extraction and specifier resolution.
//!
//! Extraction parses the file's syntax tree (TypeScript grammar for
//! `ts`/`tsx`, JavaScript grammar for `js`/`jsx`) and collects the module
//! specifier of every static `import` declaration plus the sole
//! string-literal argument of `require(...)` calls. Files outside the
//! parseable subset, and files whose parse fails, yield an empty list.
//!
//! Resolution maps raw specifiers back to scanned files. Relative
//! specifiers are tried against the importing file's own directory first;
//! everything else goes through a basename index over the scanned set.
//! When two files share a basename the index keeps the last one seen in
//! scan order, a known limitation of basename keying. Specifiers that
//! match nothing are assumed external and produce no edge.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use tracing::trace;
use tree_sitter::{Node, Parser};

use crate::scan::{is_parseable, PARSEABLE_EXTENSIONS};

/// Extract raw import/require specifiers from one file.
///
/// Non-parseable extensions and parse failures both produce an empty list;
/// neither is an error.
pub fn extract_specifiers(path: &Path, content: &str) -> Vec<String> {
    if !is_parseable(path) {
        return Vec::new();
    }

    let language = match path.extension().and_then(|e| e.to_str()) {
        Some("ts") => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Some("js") | Some("jsx") => tree_sitter_javascript::LANGUAGE.into(),
        _ => return Vec::new(),
    };

    let mut parser = Parser::new();
    if parser.set_language(&language).is_err() {
        return Vec::new();
    }

    let Some(tree) = parser.parse(content, None) else {
        trace!(path = %path.display(), "parse failed, no extractable imports");
        return Vec::new();
    };

    let mut specifiers = Vec::new();
    collect_specifiers(tree.root_node(), content, &mut specifiers);
    specifiers
}

fn collect_specifiers(node: Node<'_>, source: &str, out: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            if let Some(value) = node
                .child_by_field_name("source")
                .and_then(|src| string_literal_value(src, source))
            {
                out.push(value);
            }
        }
        "call_expression" => {
            if let Some(value) = require_argument(node, source) {
                out.push(value);
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_specifiers(child, source, out);
    }
}

/// The specifier of a `require("...")` call, if this is one.
fn require_argument(call: Node<'_>, source: &str) -> Option<String> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "identifier" || source.get(callee.byte_range())? != "require" {
        return None;
    }

    let args = call.child_by_field_name("arguments")?;
    if args.named_child_count() != 1 {
        return None;
    }
    let arg = args.named_child(0)?;
    if arg.kind() != "string" {
        return None;
    }
    string_literal_value(arg, source)
}

fn string_literal_value(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = source.get(node.byte_range())?;
    let trimmed = text.trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Basename index over the scanned file set.
///
/// Built in a single pass over scan results before any resolution query
/// runs, and passed explicitly into the resolution pass. The map keeps the
/// last path seen per basename; the ordered entry list preserves scan order
/// so the suffix fallback stays deterministic.
#[derive(Debug, Default)]
pub struct SpecifierIndex {
    entries: Vec<(String, PathBuf)>,
    by_name: HashMap<String, PathBuf>,
    paths: HashSet<PathBuf>,
}

impl SpecifierIndex {
    /// Index every scanned file by basename. Last write wins on collision.
    pub fn build(files: &[PathBuf]) -> Self {
        let mut index = Self::default();
        for path in files {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                index.entries.push((name.to_string(), path.clone()));
                index.by_name.insert(name.to_string(), path.clone());
            }
            index.paths.insert(path.clone());
        }
        index
    }

    /// Resolve a raw specifier for the given importing file.
    ///
    /// Order: the importer's own directory for relative specifiers (with
    /// extension and `index.*` completion), then exact basename, then
    /// basename plus each parseable extension, then a suffix search over
    /// indexed basenames. `None` means the target is external.
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            if let Some(found) = self.resolve_relative(importer, specifier) {
                return Some(found);
            }
        }

        let last_segment = specifier.rsplit('/').next().unwrap_or(specifier);

        if let Some(path) = self.by_name.get(last_segment) {
            return Some(path.clone());
        }

        for ext in PARSEABLE_EXTENSIONS {
            if let Some(path) = self.by_name.get(&format!("{last_segment}.{ext}")) {
                return Some(path.clone());
            }
        }

        self.suffix_fallback(specifier)
    }

    fn resolve_relative(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        let base = importer.parent()?;
        let joined = normalize(&base.join(specifier));

        if self.paths.contains(&joined) {
            return Some(joined);
        }
        for ext in PARSEABLE_EXTENSIONS {
            // Append rather than `with_extension`: a specifier like
            // "./api.service" must become "api.service.ts".
            let mut name = joined.clone().into_os_string();
            name.push(format!(".{ext}"));
            let with_ext = PathBuf::from(&name);
            if self.paths.contains(&with_ext) {
                return Some(with_ext);
            }
        }
        for ext in PARSEABLE_EXTENSIONS {
            let index_file = joined.join(format!("index.{ext}"));
            if self.paths.contains(&index_file) {
                return Some(index_file);
            }
        }
        None
    }

    /// Last-resort match: an indexed basename (with or without extension)
    /// ending the specifier on a path-segment boundary. First hit in scan
    /// order wins.
    fn suffix_fallback(&self, specifier: &str) -> Option<PathBuf> {
        for (name, path) in &self.entries {
            let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
            if segment_suffix(specifier, name) || segment_suffix(specifier, stem) {
                return Some(path.clone());
            }
        }
        None
    }
}

fn segment_suffix(specifier: &str, candidate: &str) -> bool {
    specifier == candidate
        || specifier
            .strip_suffix(candidate)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_static_imports() {
        let source = r#"
import { api } from "./api";
import Default from '../lib/helpers';
import "./styles";
"#;
        let specs = extract_specifiers(Path::new("app.ts"), source);
        assert_eq!(specs, vec!["./api", "../lib/helpers", "./styles"]);
    }

    #[test]
    fn extracts_require_calls() {
        let source = r#"
const fs = require("fs");
const util = require('./util');
const nope = require(dynamicName);
const alsoNope = notRequire("./x");
"#;
        let specs = extract_specifiers(Path::new("app.js"), source);
        assert_eq!(specs, vec!["fs", "./util"]);
    }

    #[test]
    fn tsx_and_jsx_are_parseable() {
        let source = r#"import { render } from "./render";
export const App = () => <div>hi</div>;
"#;
        assert_eq!(
            extract_specifiers(Path::new("app.tsx"), source),
            vec!["./render"]
        );
        assert_eq!(
            extract_specifiers(Path::new("app.jsx"), source),
            vec!["./render"]
        );
    }

    #[test]
    fn non_parseable_extensions_have_no_specifiers() {
        assert!(extract_specifiers(Path::new("main.py"), "import os").is_empty());
        assert!(extract_specifiers(Path::new("main.rs"), "use std::fs;").is_empty());
    }

    #[test]
    fn malformed_source_does_not_panic() {
        let specs = extract_specifiers(Path::new("bad.ts"), "import { from ((( \"");
        // Whatever tree-sitter recovers is fine; the call must not fail.
        let _ = specs;
    }

    fn index(paths: &[&str]) -> SpecifierIndex {
        let files: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        SpecifierIndex::build(&files)
    }

    #[test]
    fn resolves_relative_with_extension_completion() {
        let idx = index(&["/repo/src/a.ts", "/repo/src/b.ts"]);
        assert_eq!(
            idx.resolve(Path::new("/repo/src/a.ts"), "./b"),
            Some(PathBuf::from("/repo/src/b.ts"))
        );
    }

    #[test]
    fn resolves_parent_relative_specifier() {
        let idx = index(&["/repo/src/x.ts", "/repo/lib/y.ts"]);
        assert_eq!(
            idx.resolve(Path::new("/repo/src/x.ts"), "../lib/y"),
            Some(PathBuf::from("/repo/lib/y.ts"))
        );
    }

    #[test]
    fn resolves_directory_index_file() {
        let idx = index(&["/repo/src/a.ts", "/repo/src/utils/index.ts"]);
        assert_eq!(
            idx.resolve(Path::new("/repo/src/a.ts"), "./utils"),
            Some(PathBuf::from("/repo/src/utils/index.ts"))
        );
    }

    #[test]
    fn unresolvable_specifier_is_external() {
        let idx = index(&["/repo/src/a.ts", "/repo/src/b.ts"]);
        assert_eq!(idx.resolve(Path::new("/repo/src/a.ts"), "left-pad"), None);
        assert_eq!(idx.resolve(Path::new("/repo/src/a.ts"), "react"), None);
    }

    #[test]
    fn basename_collision_keeps_last_seen() {
        let idx = index(&["/repo/a/util.ts", "/repo/b/util.ts"]);
        // Bare specifier falls through to the index, which kept the later path.
        assert_eq!(
            idx.resolve(Path::new("/repo/c/main.ts"), "util"),
            Some(PathBuf::from("/repo/b/util.ts"))
        );
        // A relative specifier stays anchored to the importer's directory.
        assert_eq!(
            idx.resolve(Path::new("/repo/a/main.ts"), "./util"),
            Some(PathBuf::from("/repo/a/util.ts"))
        );
    }

    #[test]
    fn suffix_fallback_respects_segment_boundaries() {
        let idx = index(&["/repo/src/pad.ts"]);
        // "left-pad" must not match pad.ts: "pad" is not a full trailing segment.
        assert_eq!(idx.resolve(Path::new("/repo/src/a.ts"), "left-pad"), None);
        assert_eq!(
            idx.resolve(Path::new("/repo/src/a.ts"), "some/deep/pad"),
            Some(PathBuf::from("/repo/src/pad.ts"))
        );
    }
}
