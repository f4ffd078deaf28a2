//! Selector scoping.
//!
//! Two strategies:
//! - [`scope_css`] parses the stylesheet with lightningcss and prefixes the
//!   selectors of every style rule, including those inside conditional and
//!   grouping at-rules.
//! - [`scope_css_legacy`] is the textual `([^{}]+){` substitution, kept for
//!   byte-compatible output. It also prefixes keyframe selectors.

use std::sync::OnceLock;

use anyhow::{Result, anyhow, bail};
use lightningcss::rules::container::ContainerRule;
use lightningcss::rules::document::MozDocumentRule;
use lightningcss::rules::layer::LayerBlockRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::scope::ScopeRule;
use lightningcss::rules::starting_style::StartingStyleRule;
use lightningcss::rules::supports::SupportsRule;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::{Combinator, Component, Selector, SelectorList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::values::ident::Ident;
use regex::Regex;

/// Prefix every style rule selector in `css` with `.{class}`.
///
/// - each selector of a list gets `.{class} ` prepended
/// - a `:root` in the first compound selector becomes `.{class}` itself
/// - rules inside `@media`, `@supports`, `@container`, `@layer`,
///   `@-moz-document`, `@starting-style` and `@scope` are scoped too
/// - `@keyframes`, `@font-face`, `@page`, `@property`, `@counter-style` and
///   statement at-rules are left alone
/// - rules nested inside a style rule are relative to it and stay as written
///
/// An unknown at-rule with a block is an error: its body cannot be scoped.
/// The result is printed by lightningcss, so comments are dropped and
/// formatting is normalized.
pub fn scope_css(css: &str, class: &str) -> Result<String> {
    let mut stylesheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| anyhow!("{e}"))?;

    scope_rules(&mut stylesheet.rules, class)?;

    let result = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| anyhow!("{e}"))?;
    Ok(result.code)
}

/// Global `([^{}]+){` -> `.{class} $1{` substitution.
pub fn scope_css_legacy(css: &str, class: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"([^{}]+)\{").expect("valid selector regex"));
    re.replace_all(css, format!(".{class} ${{1}}{{").as_str())
        .into_owned()
}

fn scope_rules(rules: &mut CssRuleList<'_>, class: &str) -> Result<()> {
    for rule in &mut rules.0 {
        match rule {
            CssRule::Style(style) => scope_selectors(&mut style.selectors, class),
            CssRule::Nesting(nesting) => scope_selectors(&mut nesting.style.selectors, class),
            CssRule::Media(MediaRule { rules, .. })
            | CssRule::Supports(SupportsRule { rules, .. })
            | CssRule::Container(ContainerRule { rules, .. })
            | CssRule::LayerBlock(LayerBlockRule { rules, .. })
            | CssRule::MozDocument(MozDocumentRule { rules, .. })
            | CssRule::StartingStyle(StartingStyleRule { rules, .. })
            | CssRule::Scope(ScopeRule { rules, .. }) => scope_rules(rules, class)?,
            CssRule::Unknown(unknown) if unknown.block.is_some() => {
                let name: &str = &unknown.name;
                bail!("cannot scope the rules inside unknown at-rule `@{name}`");
            }
            _ => {}
        }
    }
    Ok(())
}

fn scope_selectors(selectors: &mut SelectorList<'_>, class: &str) {
    for selector in selectors.0.iter_mut() {
        *selector = scope_selector(selector, class);
    }
}

/// `.a > .b` -> `.{class} .a > .b`, `:root.dark .b` -> `.{class}.dark .b`.
fn scope_selector<'i>(selector: &Selector<'i>, class: &str) -> Selector<'i> {
    let scope = Component::Class(Ident(class.to_owned().into()));

    let mut components: Vec<Component<'i>> =
        selector.iter_raw_parse_order_from(0).cloned().collect();

    let first_compound = components
        .iter()
        .position(Component::is_combinator)
        .unwrap_or(components.len());
    let root = components[..first_compound]
        .iter()
        .position(|component| matches!(component, Component::Root));

    match root {
        Some(index) => components[index] = scope,
        None => {
            components.insert(0, Component::Combinator(Combinator::Descendant));
            components.insert(0, scope);
        }
    }

    Selector::from(components)
}
