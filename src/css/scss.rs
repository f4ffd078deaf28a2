//! SCSS compilation through an external command.

use anyhow::{Context, Result, bail};

use crate::utils::exec::{Cmd, FilterRule};

/// Dart Sass deprecation notices, noise on every compile.
const SASS_FILTER: FilterRule = FilterRule::new(&["Deprecation Warning", "DEPRECATION WARNING"]);

/// Pipe `source` through `command` and return its stdout as CSS.
///
/// The command reads SCSS on stdin and writes CSS to stdout
/// (`sass --stdin --no-source-map` by default).
pub fn compile_scss(source: &str, command: &[String]) -> Result<String> {
    if command.is_empty() {
        bail!("no SCSS compiler configured");
    }

    let output = Cmd::from_slice(command)
        .stdin(source)
        .filter(&SASS_FILTER)
        .run()?;
    String::from_utf8(output.stdout).context("SCSS compiler produced non-UTF-8 output")
}
