use crate::node::UiNode;
use std::fmt::Write as _;

/// Decode literal `\uXXXX` escape sequences embedded in captured text.
///
/// Scraped display names arrive with emoji flattened to their escaped
/// UTF-16 form, surrogate pairs included. Sequences that do not form a
/// valid scalar (unpaired surrogates, short hex runs) are left as-is.
pub fn decode_unicode_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        match parse_hex4(&candidate[2..]) {
            Some(code) if (0xD800..0xDC00).contains(&code) => {
                // High surrogate: only meaningful with a low surrogate
                // immediately following.
                let low = candidate
                    .get(6..)
                    .and_then(|tail| tail.strip_prefix("\\u"))
                    .and_then(parse_hex4)
                    .filter(|low| (0xDC00..0xE000).contains(low));
                match low {
                    Some(low) => {
                        let scalar = 0x10000u32
                            + ((u32::from(code) - 0xD800) << 10)
                            + (u32::from(low) - 0xDC00);
                        match char::from_u32(scalar) {
                            Some(c) => out.push(c),
                            None => out.push_str(&candidate[..12]),
                        }
                        rest = &rest[pos + 12..];
                    }
                    None => {
                        out.push_str(&candidate[..6]);
                        rest = &rest[pos + 6..];
                    }
                }
            }
            Some(code) if (0xDC00..0xE000).contains(&code) => {
                // Stray low surrogate
                out.push_str(&candidate[..6]);
                rest = &rest[pos + 6..];
            }
            Some(code) => {
                match char::from_u32(u32::from(code)) {
                    Some(c) => out.push(c),
                    None => out.push_str(&candidate[..6]),
                }
                rest = &rest[pos + 6..];
            }
            None => {
                out.push_str("\\u");
                rest = &rest[pos + 2..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn parse_hex4(s: &str) -> Option<u16> {
    let hex = s.get(..4)?;
    if hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

/// Strip the leading label prefix from a raw profile-identifier text.
///
/// The profile screen renders the identifier as `"ID: RA_H2019"`; the part
/// after the first colon is the identifier. Text without a colon is
/// returned trimmed.
pub fn strip_id_prefix(raw: &str) -> String {
    match raw.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Render a tree snapshot as indented text, one node per line.
///
/// Diagnostic helper for pinning selectors against a new target app
/// version; the output mirrors what the inspector tooling shows.
pub fn tree_to_text(root: &UiNode) -> String {
    let mut out = String::new();
    append_node(&mut out, root, 0);
    out
}

fn append_node(out: &mut String, node: &UiNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(
        out,
        "{indent}Class: {}, Text: {}, ContentDesc: {}, ResourceId: {}, ChildCount: {}",
        node.class_name(),
        node.text().unwrap_or_default(),
        node.content_description().unwrap_or_default(),
        node.resource_id().unwrap_or_default(),
        node.child_count(),
    );
    for child in node.children() {
        append_node(out, &child, depth + 1);
    }
}

/// Install the default tracing subscriber, honoring `RUST_LOG`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
