//! Minification for the production bundle and library stylesheet.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use std::path::Path;

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minified script plus its v3 source map (JSON).
#[derive(Debug)]
pub struct MinifiedJs {
    pub code: String,
    pub map: Option<String>,
}

/// Minify a classic (non-module) script.
///
/// `source_path` is recorded as the map's source so the minified UMD bundle
/// maps back onto the readable one.
pub fn minify_js(source: &str, source_path: &Path) -> Result<MinifiedJs> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(anyhow!("failed to parse {} for minification: {err}", source_path.display()));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: Some(source_path.to_path_buf()),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);
    Ok(MinifiedJs {
        code: output.code,
        map: output.map.map(|map| map.to_json_string()),
    })
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("{e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(result.code)
}
