//! Bundle emitters.
//!
//! The module registry is rendered once as a factory function and wrapped
//! per format. Everything is produced in memory so a failure in any format
//! leaves no bundle file behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::graph::ModuleGraph;
use super::is_valid_identifier;
use super::sourcemap::{LineMap, Origin};
use crate::asset::minify::{minify_css, minify_js};
use crate::config::LibraryConfig;
use crate::core::{BuildMode, OutputDir};
use crate::css::load_css;
use crate::utils::path::relative_path;

/// Registry runtime shared by every format.
const RUNTIME: &str = include_str!("runtime.js");

pub const CJS_FILE: &str = "index.js";
pub const ESM_FILE: &str = "index.esm.js";
pub const UMD_FILE: &str = "index.umd.js";
pub const MIN_FILE: &str = "index.min.js";
pub const TYPES_FILE: &str = "index.d.ts";

/// A file to write: absolute path and content.
pub type Artifact = (PathBuf, String);

/// Generated lines, each with an optional original position.
#[derive(Debug, Default)]
struct Lines(Vec<(String, Origin)>);

impl Lines {
    /// Append unmapped text (may span several lines).
    fn push(&mut self, text: &str) {
        for line in text.split('\n') {
            self.0.push((line.to_owned(), None));
        }
    }

    /// Append module code whose line `n` is line `n` of source `source`.
    fn push_mapped(&mut self, source: u32, code: &str) {
        let code = code.strip_suffix('\n').unwrap_or(code);
        for (line, text) in code.split('\n').enumerate() {
            self.0.push((text.to_owned(), Some((source, line as u32))));
        }
    }

    fn append(&mut self, other: &Lines) {
        self.0.extend(other.0.iter().cloned());
    }
}

/// Bundle code and map for all standard formats, plus the minified UMD in
/// production.
pub fn render_bundles(
    graph: &ModuleGraph,
    config: &LibraryConfig,
    mode: BuildMode,
) -> Result<Vec<Artifact>> {
    let js_dir = OutputDir::Js.path(&config.build.output);
    let source_root = relative_path(&js_dir, config.get_root())
        .display()
        .to_string()
        .replace('\\', "/");
    let factory = factory(graph);
    let exports = graph.entry_exports();

    let mut artifacts = Vec::new();
    let mut emit = |file: &str, lines: &Lines| -> String {
        let (code, map) = render(file, lines, graph, &source_root);
        artifacts.push((js_dir.join(format!("{file}.map")), map));
        artifacts.push((js_dir.join(file), code.clone()));
        code
    };

    emit(CJS_FILE, &cjs(&factory));
    emit(ESM_FILE, &esm(&factory, &exports));
    let umd = emit(UMD_FILE, &umd(&factory, &config.library.global));

    if mode.is_production() {
        let minified = minify_js(&umd, Path::new(UMD_FILE))?;
        let Some(map) = minified.map else {
            bail!("no source map produced for {MIN_FILE}");
        };
        artifacts.push((js_dir.join(format!("{MIN_FILE}.map")), map));
        artifacts.push((
            js_dir.join(MIN_FILE),
            format!("{}\n//# sourceMappingURL={MIN_FILE}.map\n", minified.code.trim_end()),
        ));
    }

    artifacts.push((
        OutputDir::Types.path(&config.build.output).join(TYPES_FILE),
        typings(&exports, &config.library.global),
    ));
    Ok(artifacts)
}

/// Concatenated library stylesheet, `None` when nothing imports CSS.
pub fn render_library_css(
    graph: &ModuleGraph,
    config: &LibraryConfig,
    mode: BuildMode,
) -> Result<Option<Artifact>> {
    if graph.stylesheets.is_empty() {
        return Ok(None);
    }

    let mut css = String::new();
    for path in &graph.stylesheets {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", config.root_relative(path).display()))?;
        let compiled = load_css(path, source, &config.build.css)?;
        css.push_str(&format!(
            "/* {} */\n{}\n",
            config.root_relative(path).display(),
            compiled.trim_end()
        ));
    }

    if mode.is_production() {
        css = minify_css(&css).context("Failed to minify library stylesheet")?;
    }

    let path = OutputDir::Css
        .path(&config.build.output)
        .join(&config.build.bundle.css_file);
    Ok(Some((path, css)))
}

/// Write artifacts, creating parent directories as needed.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    for (path, content) in artifacts {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

// ============================================================================
// Formats
// ============================================================================

/// `function () { ... }` returning the entry module's exports.
fn factory(graph: &ModuleGraph) -> Lines {
    let mut lines = Lines::default();
    lines.push("function () {\n\"use strict\";");
    lines.push(RUNTIME.trim_end());
    lines.push("var __charlib_modules = {");

    for (index, module) in graph.modules.iter().enumerate() {
        lines.push(&format!("{}: function (exports) {{", quote(&module.id)));
        for line in &module.prologue {
            lines.push(line);
        }
        lines.push_mapped(index as u32, &module.body);
        lines.push("},");
    }

    lines.push("};");
    lines.push(&format!("return __charlib_require({});\n}}", quote(graph.entry_id())));
    lines
}

fn cjs(factory: &Lines) -> Lines {
    let mut lines = Lines::default();
    lines.push("module.exports = (");
    lines.append(factory);
    lines.push(")();");
    lines
}

fn esm(factory: &Lines, exports: &[String]) -> Lines {
    let mut lines = Lines::default();
    lines.push("const __charlib_entry = (");
    lines.append(factory);
    lines.push(")();");

    if exports.iter().any(|name| name == "default") {
        lines.push("export default __charlib_entry.default;");
    }
    let named = named_exports(exports);
    if !named.is_empty() {
        lines.push(&format!("export const {{ {} }} = __charlib_entry;", named.join(", ")));
    }
    lines
}

fn umd(factory: &Lines, global: &str) -> Lines {
    let global = quote(global);
    let mut lines = Lines::default();
    lines.push(&format!(
        "(function (root, factory) {{
  if (typeof exports === \"object\" && typeof module === \"object\") module.exports = factory();
  else if (typeof define === \"function\" && define.amd) define([], factory);
  else if (typeof exports === \"object\") exports[{global}] = factory();
  else root[{global}] = factory();
}})(typeof self !== \"undefined\" ? self : this,"
    ));
    lines.append(factory);
    lines.push(");");
    lines
}

fn typings(exports: &[String], global: &str) -> String {
    let mut out = format!("export as namespace {global};\n");
    if exports.iter().any(|name| name == "default") {
        out.push_str("declare const _default: any;\nexport default _default;\n");
    }
    for name in named_exports(exports) {
        out.push_str(&format!("export declare const {name}: any;\n"));
    }
    if exports.is_empty() {
        out.push_str("export {};\n");
    }
    out
}

/// Export names usable as bindings (string-literal names are skipped).
fn named_exports(exports: &[String]) -> Vec<&str> {
    exports
        .iter()
        .map(String::as_str)
        .filter(|name| *name != "default" && is_valid_identifier(name))
        .collect()
}

/// Bundle code with its `sourceMappingURL` trailer, and the map JSON.
///
/// Map sources are relative to the map file, `source_root` being the way
/// back from the bundle directory to the project root.
fn render(file: &str, lines: &Lines, graph: &ModuleGraph, source_root: &str) -> (String, String) {
    let sources: Vec<_> = graph
        .modules
        .iter()
        .map(|m| {
            let name = m.id.strip_prefix("./").unwrap_or(&m.id);
            (format!("{source_root}/{name}"), m.source.as_str())
        })
        .collect();
    let mut map = LineMap::new(file, sources.iter().map(|(path, source)| (path.as_str(), *source)));

    let mut code = String::new();
    for (text, origin) in &lines.0 {
        code.push_str(text);
        code.push('\n');
        map.push_line(*origin);
    }
    code.push_str(&format!("//# sourceMappingURL={file}.map\n"));

    (code, map.into_json())
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(entry: &str) -> (TempDir, LibraryConfig, ModuleGraph) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/index.js"), entry).unwrap();
        fs::write(root.join("src/lib.js"), "export const greet = () => 'hi';\n").unwrap();

        let config = LibraryConfig::with_root(root);
        let graph = ModuleGraph::build(&config.build.entry, config.get_root()).unwrap();
        (dir, config, graph)
    }

    fn content<'a>(artifacts: &'a [Artifact], name: &str) -> &'a str {
        artifacts
            .iter()
            .find(|(path, _)| path.ends_with(name))
            .map(|(_, content)| content.as_str())
            .unwrap()
    }

    #[test]
    fn test_development_outputs() {
        let (_dir, config, graph) =
            project("export { greet } from './lib.js';\nexport default 42;\n");
        let artifacts = render_bundles(&graph, &config, BuildMode::DEVELOPMENT).unwrap();

        let names: Vec<_> = artifacts
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "index.js.map",
                "index.js",
                "index.esm.js.map",
                "index.esm.js",
                "index.umd.js.map",
                "index.umd.js",
                "index.d.ts",
            ]
        );

        let cjs = content(&artifacts, "js/index.js");
        assert!(cjs.starts_with("module.exports = (\nfunction () {"));
        assert!(cjs.ends_with("//# sourceMappingURL=index.js.map\n"));

        let esm = content(&artifacts, "index.esm.js");
        assert!(esm.contains("export default __charlib_entry.default;"));
        assert!(esm.contains("export const { greet } = __charlib_entry;"));

        let umd = content(&artifacts, "index.umd.js");
        assert!(umd.contains("root[\"CharacterLibrary\"] = factory();"));

        let types = content(&artifacts, "index.d.ts");
        assert!(types.contains("export as namespace CharacterLibrary;"));
        assert!(types.contains("export default _default;"));
        assert!(types.contains("export declare const greet: any;"));
    }

    #[test]
    fn test_map_points_at_source_lines() {
        let (_dir, config, graph) = project("export const a = 1;\nexport const b = 2;\n");
        let artifacts = render_bundles(&graph, &config, BuildMode::DEVELOPMENT).unwrap();

        let cjs = content(&artifacts, "js/index.js");
        let map: serde_json::Value =
            serde_json::from_str(content(&artifacts, "index.js.map")).unwrap();
        assert_eq!(map["file"], "index.js");
        assert_eq!(map["sources"][0], "../../src/index.js");

        let mappings = map["mappings"].as_str().unwrap();
        let segments: Vec<_> = mappings.split(';').collect();
        let lines: Vec<_> = cjs.lines().collect();
        let first = lines.iter().position(|l| *l == "const a = 1;").unwrap();
        assert_eq!(segments[first], "AAAA");
        assert_eq!(segments[first + 1], "AACA");
        assert_eq!(segments[0], "");
    }

    #[test]
    fn test_production_adds_minified_bundle() {
        let (_dir, config, graph) = project("export const a = 1;\n");
        let artifacts = render_bundles(&graph, &config, BuildMode::PRODUCTION).unwrap();

        let min = content(&artifacts, "index.min.js");
        assert!(min.ends_with("//# sourceMappingURL=index.min.js.map\n"));
        let map: serde_json::Value =
            serde_json::from_str(content(&artifacts, "index.min.js.map")).unwrap();
        assert_eq!(map["version"], 3);
    }

    #[test]
    fn test_library_css() {
        let (dir, config, _) = project("export const a = 1;\n");
        fs::write(dir.path().join("src/base.css"), ".a {\n  color: red;\n}\n").unwrap();
        fs::write(
            dir.path().join("src/index.js"),
            "import './base.css';\nexport const a = 1;\n",
        )
        .unwrap();
        let graph = ModuleGraph::build(&config.build.entry, config.get_root()).unwrap();

        let (path, css) = render_library_css(&graph, &config, BuildMode::DEVELOPMENT)
            .unwrap()
            .unwrap();
        assert!(path.ends_with("css/character-library.css"));
        assert!(css.starts_with("/* src/base.css */\n.a {"));

        let (_, minified) = render_library_css(&graph, &config, BuildMode::PRODUCTION)
            .unwrap()
            .unwrap();
        assert_eq!(minified, ".a{color:red}");
    }

    #[test]
    fn test_no_stylesheets_no_css() {
        let (_dir, config, graph) = project("export const a = 1;\n");
        assert!(
            render_library_css(&graph, &config, BuildMode::DEVELOPMENT)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_typings_without_exports() {
        assert_eq!(typings(&[], "Lib"), "export as namespace Lib;\nexport {};\n");
    }
}
