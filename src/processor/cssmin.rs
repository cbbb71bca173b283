//! Stylesheet minifier

use super::{AssetProcessor, ProcessingContext};
use crate::asset::AssetType;

#[derive(Debug, Clone, Copy, Default)]
pub struct CssMinifier;

impl CssMinifier {
    pub const NAME: &'static str = "cssmin";
}

impl AssetProcessor for CssMinifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        asset_type == AssetType::Css
    }

    fn is_minifier(&self) -> bool {
        true
    }

    fn process(&self, content: &str, _context: &ProcessingContext<'_>) -> Result<String, String> {
        minify(content)
    }
}

/// No whitespace is needed after these
const TIGHT_AFTER: &str = "{};,>:";

/// No whitespace is needed before these
const TIGHT_BEFORE: &str = "{};,>";

/// Minify `input`: drops comments, collapses whitespace and the last
/// semicolon of each block. Strings are kept verbatim.
pub fn minify(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err("unterminated comment".to_string());
            }
            pending_space = true;
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            let tight = out.chars().last().map_or(true, |prev| TIGHT_AFTER.contains(prev));
            if !tight && !TIGHT_BEFORE.contains(c) {
                out.push(' ');
            }
            pending_space = false;
        }

        match c {
            '"' | '\'' => {
                out.push(c);
                let mut closed = false;
                while let Some(s) = chars.next() {
                    out.push(s);
                    if s == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if s == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err("unterminated string".to_string());
                }
            }
            '}' => {
                if out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
