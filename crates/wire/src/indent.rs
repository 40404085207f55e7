//! JSON indenter
//!
//! Reformats JSON text the way a pretty-printing marshaller lays it out:
//! one element per line, `prefix` then one `indent` per nesting level at
//! the start of every line after the first, `": "` between key and value.
//! Empty objects and arrays stay as `{}` and `[]`.

use serde::de::IgnoredAny;

use crate::error::Result;

/// Indent `src` after checking that it is a single well-formed document
pub fn indent(src: &[u8], prefix: &str, indent: &str) -> Result<Vec<u8>> {
    serde_json::from_slice::<IgnoredAny>(src)?;
    Ok(reformat(src, prefix, indent))
}

/// Indent JSON text known to be valid
///
/// Whitespace outside strings is dropped; string contents are copied as is.
pub(crate) fn reformat(src: &[u8], prefix: &str, indent: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // An opening bracket was written and its newline is still pending.
    let mut need_indent = false;

    for &byte in src {
        if in_string {
            out.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
            continue;
        }

        if need_indent && byte != b'}' && byte != b']' {
            need_indent = false;
            depth += 1;
            newline(&mut out, prefix, indent, depth);
        }

        match byte {
            b'"' => {
                in_string = true;
                out.push(byte);
            }
            b'{' | b'[' => {
                need_indent = true;
                out.push(byte);
            }
            b',' => {
                out.push(byte);
                newline(&mut out, prefix, indent, depth);
            }
            b':' => {
                out.push(byte);
                out.push(b' ');
            }
            b'}' | b']' => {
                if need_indent {
                    // empty collection stays on one line
                    need_indent = false;
                } else {
                    depth = depth.saturating_sub(1);
                    newline(&mut out, prefix, indent, depth);
                }
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
    out
}

fn newline(out: &mut Vec<u8>, prefix: &str, indent: &str, depth: usize) {
    out.push(b'\n');
    out.extend_from_slice(prefix.as_bytes());
    for _ in 0..depth {
        out.extend_from_slice(indent.as_bytes());
    }
}
