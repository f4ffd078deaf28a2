use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use super::SvgError;
use crate::config::SvgConfig;

/// Namespace prefixes written by vector editors.
const EDITOR_PREFIXES: [&[u8]; 3] = [b"inkscape:", b"sodipodi:", b"sketch:"];

/// Elements whose whitespace-only text is significant.
const TEXT_ELEMENTS: [&[u8]; 6] = [b"text", b"tspan", b"textPath", b"style", b"title", b"desc"];

/// Attributes forced onto the root element.
const ROOT_ATTRIBUTES: [(&str, &str); 2] = [("focusable", "false"), ("aria-hidden", "true")];

/// Where the stream currently is relative to the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeRoot,
    InRoot,
    AfterRoot,
}

/// Open element on the stack.
struct Open {
    name: String,
    preserve_space: bool,
}

/// Optimize one SVG document.
///
/// Fails on malformed XML, a missing root, or a root that is not `<svg>`.
pub fn optimize_svg(source: &str, options: &SvgConfig) -> Result<String, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::with_capacity(source.len()));
    let mut stack: Vec<Open> = Vec::new();
    let mut position = Position::BeforeRoot;

    loop {
        let event = reader.read_event().map_err(|source| SvgError::Xml {
            position: reader.error_position(),
            source,
        })?;

        match event {
            Event::Start(_) | Event::Empty(_) if position == Position::AfterRoot => {
                return Err(SvgError::TrailingContent);
            }
            Event::Start(elem) => {
                if is_stripped_element(elem.name().as_ref(), options) {
                    skip_subtree(&mut reader, elem.name())?;
                    continue;
                }

                let is_root = position == Position::BeforeRoot;
                if is_root {
                    check_root(&elem)?;
                    position = Position::InRoot;
                }

                let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                let preserve_space = TEXT_ELEMENTS.contains(&elem.local_name().as_ref())
                    || stack.last().is_some_and(|open| open.preserve_space);
                stack.push(Open {
                    name,
                    preserve_space,
                });

                writer.write_event(Event::Start(rewrite_element(&elem, is_root, options)?))?;
            }
            Event::Empty(elem) => {
                if is_stripped_element(elem.name().as_ref(), options) {
                    continue;
                }

                let is_root = position == Position::BeforeRoot;
                if is_root {
                    check_root(&elem)?;
                    position = Position::AfterRoot;
                }

                writer.write_event(Event::Empty(rewrite_element(&elem, is_root, options)?))?;
            }
            Event::End(elem) => {
                stack.pop();
                if stack.is_empty() {
                    position = Position::AfterRoot;
                }
                writer.write_event(Event::End(elem))?;
            }
            Event::Text(text) => {
                let blank = text.iter().all(u8::is_ascii_whitespace);
                match position {
                    Position::InRoot => {
                        let preserve = stack.last().is_some_and(|open| open.preserve_space);
                        if !blank || preserve {
                            writer.write_event(Event::Text(text))?;
                        }
                    }
                    _ if blank => {}
                    _ => return Err(SvgError::TrailingContent),
                }
            }
            Event::Comment(_) | Event::PI(_) if options.strip_comments => {}
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
            // Content outside the root element is never emitted
            _ if position != Position::InRoot => {}
            event => writer.write_event(event)?,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SvgError::Unclosed(open.name));
    }
    if position == Position::BeforeRoot {
        return Err(SvgError::NoRoot);
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Reject documents whose root is not `<svg>`.
fn check_root(elem: &BytesStart<'_>) -> Result<(), SvgError> {
    if elem.local_name().as_ref() == b"svg" {
        Ok(())
    } else {
        Err(SvgError::NotSvg(
            String::from_utf8_lossy(elem.name().as_ref()).into_owned(),
        ))
    }
}

/// Consume everything up to and including the matching end tag.
fn skip_subtree(reader: &mut Reader<&[u8]>, name: QName<'_>) -> Result<(), SvgError> {
    let name = name.as_ref().to_vec();
    reader
        .read_to_end(QName(&name))
        .map_err(|source| SvgError::Xml {
            position: reader.error_position(),
            source,
        })?;
    Ok(())
}

/// Whole elements removed by the profile.
fn is_stripped_element(name: &[u8], options: &SvgConfig) -> bool {
    (options.strip_metadata && name == b"metadata")
        || (options.strip_editor_data && is_editor_name(name))
}

fn is_editor_name(name: &[u8]) -> bool {
    EDITOR_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Editor attribute or the `xmlns:` declaration of an editor namespace.
fn is_editor_attribute(key: &[u8]) -> bool {
    if is_editor_name(key) {
        return true;
    }
    key.strip_prefix(b"xmlns:").is_some_and(|ns| {
        EDITOR_PREFIXES
            .iter()
            .any(|prefix| prefix.strip_suffix(b":") == Some(ns))
    })
}

/// Copy an element, dropping editor attributes and, on the root, forcing
/// the accessibility attributes.
fn rewrite_element(
    elem: &BytesStart<'_>,
    is_root: bool,
    options: &SvgConfig,
) -> Result<BytesStart<'static>, SvgError> {
    let mut out = elem.to_owned();
    out.clear_attributes();

    for attr in elem.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if options.strip_editor_data && is_editor_attribute(key) {
            continue;
        }
        if is_root && ROOT_ATTRIBUTES.iter().any(|(name, _)| name.as_bytes() == key) {
            continue;
        }
        out.push_attribute(double_quoted(attr));
    }

    if is_root {
        for attr in ROOT_ATTRIBUTES {
            out.push_attribute(attr);
        }
    }
    Ok(out)
}

/// Attributes are re-emitted with double quotes; a single-quoted value may
/// contain a raw `"` that must be escaped first.
fn double_quoted(attr: Attribute<'_>) -> Attribute<'_> {
    if !attr.value.contains(&b'"') {
        return attr;
    }
    let mut value = Vec::with_capacity(attr.value.len() + 8);
    for &byte in attr.value.iter() {
        if byte == b'"' {
            value.extend_from_slice(b"&quot;");
        } else {
            value.push(byte);
        }
    }
    Attribute {
        key: attr.key,
        value: Cow::Owned(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimize(source: &str) -> Result<String, SvgError> {
        optimize_svg(source, &SvgConfig::default())
    }

    #[test]
    fn test_fixed_profile() {
        let source = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Inkscape -->
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" viewBox="0 0 100 200" inkscape:version="1.2">
  <metadata>
    <rdf:RDF><cc:Work/></rdf:RDF>
  </metadata>
  <sodipodi:namedview id="base" pagecolor="#ffffff"/>
  <!-- head group -->
  <g id="head" inkscape:label="Head">
    <circle cx="50" cy="40" r="20" />
  </g>
</svg>
"##;
        assert_eq!(
            optimize(source).unwrap(),
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 200" focusable="false" aria-hidden="true"><g id="head"><circle cx="50" cy="40" r="20"/></g></svg>"#
        );
    }

    #[test]
    fn test_root_attributes_replaced() {
        let out = optimize(r#"<svg focusable="true" aria-hidden="false" id="root"></svg>"#).unwrap();
        assert_eq!(
            out,
            r#"<svg id="root" focusable="false" aria-hidden="true"></svg>"#
        );
    }

    #[test]
    fn test_empty_root() {
        let out = optimize(r#"<svg viewBox="0 0 1 1"/>"#).unwrap();
        assert_eq!(
            out,
            r#"<svg viewBox="0 0 1 1" focusable="false" aria-hidden="true"/>"#
        );
    }

    #[test]
    fn test_text_whitespace_preserved() {
        let out = optimize("<svg><text x=\"0\"><tspan>Hi</tspan> <tspan>there</tspan></text></svg>")
            .unwrap();
        assert!(out.contains("<tspan>Hi</tspan> <tspan>there</tspan>"));
    }

    #[test]
    fn test_entities_and_cdata_kept() {
        let out = optimize(
            "<svg><style><![CDATA[.a{fill:red}]]></style><title>A &amp; B</title></svg>",
        )
        .unwrap();
        assert!(out.contains("<![CDATA[.a{fill:red}]]>"));
        assert!(out.contains("A &amp; B"));
    }

    #[test]
    fn test_single_quoted_value_with_double_quote() {
        let out = optimize(r#"<svg><g data-label='say "hi"'/></svg>"#).unwrap();
        assert!(out.contains(r#"data-label="say &quot;hi&quot;""#));
    }

    #[test]
    fn test_switches_off_keep_content() {
        let options = SvgConfig {
            strip_comments: false,
            strip_metadata: false,
            strip_editor_data: false,
        };
        let out = optimize_svg(
            r#"<svg xmlns:inkscape="x"><!-- note --><metadata><x/></metadata><g inkscape:label="L"/></svg>"#,
            &options,
        )
        .unwrap();
        assert!(out.contains("<!-- note -->"));
        assert!(out.contains("<metadata><x/></metadata>"));
        assert!(out.contains(r#"inkscape:label="L""#));
        assert!(out.contains(r#"xmlns:inkscape="x""#));
    }

    #[test]
    fn test_rejects_non_svg_root() {
        assert!(matches!(
            optimize("<html><body/></html>"),
            Err(SvgError::NotSvg(name)) if name == "html"
        ));
    }

    #[test]
    fn test_rejects_empty_document() {
        assert!(matches!(optimize("<?xml version=\"1.0\"?>\n"), Err(SvgError::NoRoot)));
        assert!(matches!(optimize(""), Err(SvgError::NoRoot)));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(matches!(
            optimize("<svg><g></svg>"),
            Err(SvgError::Xml { .. })
        ));
    }

    #[test]
    fn test_rejects_unclosed_root() {
        assert!(matches!(
            optimize("<svg><g/>"),
            Err(SvgError::Unclosed(_) | SvgError::Xml { .. })
        ));
    }

    #[test]
    fn test_rejects_second_root() {
        assert!(matches!(
            optimize("<svg/><svg/>"),
            Err(SvgError::TrailingContent)
        ));
    }

    #[test]
    fn test_output_is_stable() {
        let source = "<svg viewBox=\"0 0 10 10\">\n  <path id=\"p\" d=\"M0 0h10\"/>\n</svg>";
        let once = optimize(source).unwrap();
        assert_eq!(optimize(&once).unwrap(), once);
    }
}
