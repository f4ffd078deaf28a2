//! Module graph of the builtin bundler.
//!
//! Starting at the entry script, every relative import is parsed with oxc
//! and rewritten into a registry factory body:
//!
//! - `import` statements and `export ... from` move into a prologue of
//!   `__charlib_require` calls, so dependencies run before the body just as
//!   they would under native ES modules;
//! - `export` keywords are stripped and each exported name is registered as
//!   a getter on the module's `exports` object;
//! - stylesheet imports are removed and collected for the library CSS.
//!
//! Rewrites never change the number of lines in a body, so line `n` of the
//! rewritten body is line `n` of the source file.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    ExportDefaultDeclarationKind, ImportDeclarationSpecifier, ModuleExportName, Statement,
};
use oxc_ecmascript::BoundNames;
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType};
use rustc_hash::{FxHashMap, FxHashSet};

use super::BundleError;
use crate::asset::StylesheetKind;
use crate::utils::path::normalize_path;

/// Extensions tried, in order, for imports written without one.
const RESOLVE_EXTENSIONS: &[&str] = &["js", "mjs"];

/// Local name holding an anonymous default export.
const DEFAULT_LOCAL: &str = "__charlib_default";

/// One bundled source file.
#[derive(Debug)]
pub struct Module {
    /// Registry key, the root-relative path with a `./` prefix.
    pub id: String,
    pub source: String,
    /// Export registrations and dependency requires, run before `body`.
    pub prologue: Vec<String>,
    /// Rewritten source, line-aligned with `source`.
    pub body: String,
    /// Names this module exports itself, in declaration order.
    exports: Vec<String>,
    /// Modules re-exported with `export * from`.
    star_exports: Vec<String>,
}

/// Every module reachable from the entry plus the stylesheets they import.
#[derive(Debug)]
pub struct ModuleGraph {
    /// Modules in completion order (dependencies before dependents).
    pub modules: Vec<Module>,
    /// Stylesheets in first-import order.
    pub stylesheets: Vec<PathBuf>,
    entry: String,
}

impl ModuleGraph {
    /// Parse `entry` and everything it imports.
    ///
    /// Fails before anything is written on the first parse error,
    /// unresolved relative import, or package import.
    pub fn build(entry: &Path, root: &Path) -> Result<Self> {
        let mut builder = GraphBuilder {
            root: normalize_path(root),
            modules: Vec::new(),
            stylesheets: Vec::new(),
            seen: FxHashSet::default(),
        };
        let entry = builder.visit(normalize_path(entry))?;

        Ok(Self {
            modules: builder.modules,
            stylesheets: builder.stylesheets,
            entry,
        })
    }

    /// Registry key of the entry module.
    pub fn entry_id(&self) -> &str {
        &self.entry
    }

    /// Export names of the entry, including names re-exported through
    /// `export *` chains. `default` comes first when present.
    pub fn entry_exports(&self) -> Vec<String> {
        let by_id: FxHashMap<_, _> = self.modules.iter().map(|m| (m.id.as_str(), m)).collect();
        let mut names = Vec::new();
        let mut visited = FxHashSet::default();
        collect_exports(&by_id, &self.entry, true, &mut visited, &mut names);

        if let Some(pos) = names.iter().position(|n| n == "default") {
            let default = names.remove(pos);
            names.insert(0, default);
        }
        names
    }
}

fn collect_exports<'a>(
    by_id: &FxHashMap<&str, &'a Module>,
    id: &'a str,
    include_default: bool,
    visited: &mut FxHashSet<&'a str>,
    names: &mut Vec<String>,
) {
    let Some(module) = by_id.get(id) else {
        return;
    };
    if !visited.insert(id) {
        return;
    }

    for name in &module.exports {
        if (include_default || name != "default") && !names.contains(name) {
            names.push(name.clone());
        }
    }
    for star in &module.star_exports {
        collect_exports(by_id, star, false, visited, names);
    }
}

// ============================================================================
// Graph construction
// ============================================================================

struct GraphBuilder {
    root: PathBuf,
    modules: Vec<Module>,
    stylesheets: Vec<PathBuf>,
    seen: FxHashSet<PathBuf>,
}

/// Where an import specifier points.
enum Target {
    Script(PathBuf),
    Stylesheet(PathBuf),
}

impl GraphBuilder {
    /// Parse and rewrite the module at `path`, recursing into its
    /// dependencies in source order. Returns the module's registry key.
    fn visit(&mut self, path: PathBuf) -> Result<String> {
        let id = self.module_id(&path);
        if !self.seen.insert(path.clone()) {
            return Ok(id);
        }

        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", self.display(&path)))?;
        let items = scan_items(&source).map_err(|message| BundleError::Parse {
            path: self.relative(&path),
            message,
        })?;

        let mut rewrite = Rewrite::default();
        for item in items {
            self.apply(&path, item, &mut rewrite)?;
        }

        let body = apply_edits(&source, rewrite.edits);
        let mut prologue = rewrite.registrations;
        prologue.extend(rewrite.requires);

        self.modules.push(Module {
            id: id.clone(),
            source,
            prologue,
            body,
            exports: rewrite.exports,
            star_exports: rewrite.star_exports,
        });
        Ok(id)
    }

    fn apply(&mut self, importer: &Path, item: Item, rewrite: &mut Rewrite) -> Result<()> {
        match item {
            Item::Import {
                span,
                specifier,
                bindings,
            } => {
                rewrite.remove(span);
                match self.resolve(importer, &specifier)? {
                    Target::Stylesheet(path) => {
                        if !bindings.is_empty() {
                            return Err(self.stylesheet_binding(importer, specifier));
                        }
                        self.add_stylesheet(path);
                    }
                    Target::Script(path) => {
                        let dep = self.visit(path)?;
                        if bindings.is_empty() {
                            rewrite.requires.push(format!("__charlib_require({});", quote(&dep)));
                        } else {
                            let module = rewrite.require_var(&dep);
                            for binding in bindings {
                                rewrite.requires.push(binding.declare(&module));
                            }
                        }
                    }
                }
            }
            Item::ExportDecl { strip, names } => {
                rewrite.remove(strip);
                for name in names {
                    let getter = name.clone();
                    rewrite.export(name, getter);
                }
            }
            Item::ExportDefault {
                prefix,
                local,
                terminate_at,
            } => match local {
                Some(local) => {
                    rewrite.remove(prefix);
                    rewrite.export("default".to_owned(), local);
                }
                None => {
                    rewrite.replace(prefix, format!("const {DEFAULT_LOCAL} = "));
                    if let Some(end) = terminate_at {
                        rewrite.replace(end..end, ";".to_owned());
                    }
                    rewrite.export("default".to_owned(), DEFAULT_LOCAL.to_owned());
                }
            },
            Item::ExportList {
                span,
                specifiers,
                specifier: None,
            } => {
                rewrite.remove(span);
                for (local, exported) in specifiers {
                    rewrite.export(exported, local);
                }
            }
            Item::ExportList {
                span,
                specifiers,
                specifier: Some(specifier),
            } => {
                rewrite.remove(span);
                let dep = self.script_dependency(importer, specifier)?;
                let module = rewrite.require_var(&dep);
                for (imported, exported) in specifiers {
                    rewrite.export(exported, format!("{module}[{}]", quote(&imported)));
                }
            }
            Item::ExportAll {
                span,
                exported,
                specifier,
            } => {
                rewrite.remove(span);
                let dep = self.script_dependency(importer, specifier)?;
                match exported {
                    Some(name) => {
                        let module = rewrite.require_var(&dep);
                        rewrite.export(name, module);
                    }
                    None => {
                        rewrite.requires.push(format!(
                            "__charlib_reexport(exports, __charlib_require({}));",
                            quote(&dep)
                        ));
                        rewrite.star_exports.push(dep);
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve a re-export source, which must be a script.
    fn script_dependency(&mut self, importer: &Path, specifier: String) -> Result<String> {
        match self.resolve(importer, &specifier)? {
            Target::Script(path) => self.visit(path),
            Target::Stylesheet(_) => Err(self.stylesheet_binding(importer, specifier)),
        }
    }

    fn resolve(&self, importer: &Path, specifier: &str) -> Result<Target> {
        if !is_relative(specifier) {
            return Err(BundleError::BareImport {
                specifier: specifier.to_owned(),
                importer: self.relative(importer),
            }
            .into());
        }

        let base = importer.parent().unwrap_or(Path::new(".")).join(specifier);
        let unresolved = || BundleError::Unresolved {
            specifier: specifier.to_owned(),
            importer: self.relative(importer),
        };

        if StylesheetKind::from_path(&base).is_some() {
            return base
                .is_file()
                .then(|| Target::Stylesheet(normalize_path(&base)))
                .ok_or_else(|| unresolved().into());
        }

        candidates(&base)
            .into_iter()
            .find(|path| path.is_file())
            .map(|path| Target::Script(normalize_path(&path)))
            .ok_or_else(|| unresolved().into())
    }

    fn add_stylesheet(&mut self, path: PathBuf) {
        if !self.stylesheets.contains(&path) {
            self.stylesheets.push(path);
        }
    }

    fn stylesheet_binding(&self, importer: &Path, specifier: String) -> anyhow::Error {
        BundleError::StylesheetBinding {
            specifier,
            importer: self.relative(importer),
        }
        .into()
    }

    fn module_id(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => {
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect();
                format!("./{}", parts.join("/"))
            }
            Err(_) => path.display().to_string(),
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    fn display(&self, path: &Path) -> String {
        self.relative(path).display().to_string()
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Files an extensionless import may refer to, in lookup order.
fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut paths = vec![base.to_path_buf()];
    for ext in RESOLVE_EXTENSIONS {
        let mut path = base.as_os_str().to_owned();
        path.push(".");
        path.push(ext);
        paths.push(PathBuf::from(path));
    }
    for ext in RESOLVE_EXTENSIONS {
        paths.push(base.join(format!("index.{ext}")));
    }
    paths
}

/// JavaScript string literal (JSON strings are valid JS strings).
fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

// ============================================================================
// Rewriting
// ============================================================================

#[derive(Default)]
struct Rewrite {
    edits: Vec<(Range<usize>, String)>,
    registrations: Vec<String>,
    requires: Vec<String>,
    exports: Vec<String>,
    star_exports: Vec<String>,
    next_var: usize,
}

impl Rewrite {
    fn remove(&mut self, span: Range<usize>) {
        self.replace(span, String::new());
    }

    fn replace(&mut self, span: Range<usize>, text: String) {
        self.edits.push((span, text));
    }

    /// Register `name` as an export whose value is the expression `getter`.
    fn export(&mut self, name: String, getter: String) {
        self.registrations.push(format!(
            "__charlib_export(exports, {}, () => {getter});",
            quote(&name)
        ));
        if !self.exports.contains(&name) {
            self.exports.push(name);
        }
    }

    /// Require `dep` into a fresh variable, returning the variable name.
    fn require_var(&mut self, dep: &str) -> String {
        let var = format!("__charlib_m{}", self.next_var);
        self.next_var += 1;
        self.requires
            .push(format!("var {var} = __charlib_require({});", quote(dep)));
        var
    }
}

/// Apply non-overlapping edits, keeping every removed newline so the
/// output has as many lines as `source`.
fn apply_edits(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (span, text) in edits {
        out.push_str(&source[cursor..span.start]);
        out.push_str(&text);
        let newlines = source[span.clone()].matches('\n').count();
        out.extend(std::iter::repeat_n('\n', newlines));
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

// ============================================================================
// Parsing
// ============================================================================

/// A module-level statement the bundler rewrites, with owned data so the
/// oxc arena can be dropped before dependencies are visited.
#[derive(Debug, PartialEq)]
enum Item {
    Import {
        span: Range<usize>,
        specifier: String,
        bindings: Vec<Binding>,
    },
    /// `export <declaration>`: strip the keyword, export the bound names.
    ExportDecl {
        strip: Range<usize>,
        names: Vec<String>,
    },
    ExportDefault {
        /// `export default ` up to the declaration or expression.
        prefix: Range<usize>,
        /// Name of a named function or class declaration.
        local: Option<String>,
        /// End of an anonymous declaration that needs a `;` once it
        /// becomes an initializer.
        terminate_at: Option<usize>,
    },
    /// `export { local as exported } [from "specifier"]`.
    ExportList {
        span: Range<usize>,
        specifiers: Vec<(String, String)>,
        specifier: Option<String>,
    },
    /// `export * [as exported] from "specifier"`.
    ExportAll {
        span: Range<usize>,
        exported: Option<String>,
        specifier: String,
    },
}

#[derive(Debug, PartialEq)]
enum Binding {
    Default(String),
    Named { imported: String, local: String },
    Namespace(String),
}

impl Binding {
    fn declare(&self, module: &str) -> String {
        match self {
            Self::Default(local) => format!("const {local} = {module}.default;"),
            Self::Named { imported, local } => {
                format!("const {local} = {module}[{}];", quote(imported))
            }
            Self::Namespace(local) => format!("const {local} = {module};"),
        }
    }
}

/// Parse a module and extract the statements the bundler rewrites.
///
/// Returns every parser diagnostic joined on failure.
fn scan_items(source: &str) -> Result<Vec<Item>, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<_> = ret.errors.iter().map(ToString::to_string).collect();
        return Err(messages.join("\n"));
    }

    let range = |start: u32, end: u32| start as usize..end as usize;
    let mut items = Vec::new();

    for stmt in &ret.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let bindings = decl
                    .specifiers
                    .iter()
                    .flat_map(|specs| specs.iter())
                    .map(|spec| match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => Binding::Named {
                            imported: export_name(&s.imported),
                            local: s.local.name.to_string(),
                        },
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            Binding::Default(s.local.name.to_string())
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            Binding::Namespace(s.local.name.to_string())
                        }
                    })
                    .collect();
                items.push(Item::Import {
                    span: range(decl.span.start, decl.span.end),
                    specifier: decl.source.value.to_string(),
                    bindings,
                });
            }
            Statement::ExportNamedDeclaration(decl) => match &decl.declaration {
                Some(declaration) => {
                    let mut names = Vec::new();
                    declaration.bound_names(&mut |ident| names.push(ident.name.to_string()));
                    items.push(Item::ExportDecl {
                        strip: range(decl.span.start, declaration.span().start),
                        names,
                    });
                }
                None => items.push(Item::ExportList {
                    span: range(decl.span.start, decl.span.end),
                    specifiers: decl
                        .specifiers
                        .iter()
                        .map(|s| (export_name(&s.local), export_name(&s.exported)))
                        .collect(),
                    specifier: decl.source.as_ref().map(|s| s.value.to_string()),
                }),
            },
            Statement::ExportDefaultDeclaration(decl) => {
                let (start, local, terminate_at) = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => (
                        func.span.start,
                        func.id.as_ref().map(|id| id.name.to_string()),
                        Some(func.span.end as usize),
                    ),
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => (
                        class.span.start,
                        class.id.as_ref().map(|id| id.name.to_string()),
                        Some(class.span.end as usize),
                    ),
                    other => (other.span().start, None, None),
                };
                items.push(Item::ExportDefault {
                    prefix: range(decl.span.start, start),
                    terminate_at: if local.is_none() { terminate_at } else { None },
                    local,
                });
            }
            Statement::ExportAllDeclaration(decl) => items.push(Item::ExportAll {
                span: range(decl.span.start, decl.span.end),
                exported: decl.exported.as_ref().map(export_name),
                specifier: decl.source.value.to_string(),
            }),
            _ => {}
        }
    }

    Ok(items)
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}
