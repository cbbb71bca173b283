//! JavaScript minifier
//!
//! Removes comments and redundant whitespace while leaving string, template
//! and regular expression literals untouched. A line break is kept wherever
//! dropping it could change automatic semicolon insertion.

use super::{AssetProcessor, ProcessingContext};
use crate::asset::AssetType;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsMinifier;

impl JsMinifier {
    pub const NAME: &'static str = "jsmin";
}

impl AssetProcessor for JsMinifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        asset_type == AssetType::Js
    }

    fn is_minifier(&self) -> bool {
        true
    }

    fn process(&self, content: &str, _context: &ProcessingContext<'_>) -> Result<String, String> {
        minify(content)
    }
}

/// Whitespace seen since the last emitted token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    None,
    Space,
    Newline,
}

impl Gap {
    fn widen(self, to: Gap) -> Gap {
        match (self, to) {
            (Gap::Newline, _) | (_, Gap::Newline) => Gap::Newline,
            (Gap::Space, _) | (_, Gap::Space) => Gap::Space,
            _ => Gap::None,
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' || !c.is_ascii()
}

/// Characters after which a line break may terminate a statement
fn ends_statement(c: char) -> bool {
    is_word(c) || matches!(c, ')' | ']' | '}' | '"' | '\'' | '`' | '+' | '-')
}

/// Characters before which a line break may start a new statement
fn starts_statement(c: char) -> bool {
    is_word(c) || matches!(c, '(' | '[' | '{' | '"' | '\'' | '`' | '+' | '-' | '!' | '~' | '/')
}

/// Whether a `/` following `out` starts a regular expression literal
fn regex_allowed(out: &str) -> bool {
    let trimmed = out.trim_end();
    match trimmed.chars().last() {
        None => true,
        Some(c) if "(,=:[!&|?{};+-*%<>~^".contains(c) => true,
        Some(c) if is_word(c) => {
            let word: String = trimmed
                .chars()
                .rev()
                .take_while(|c| is_word(*c))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            matches!(
                word.as_str(),
                "return" | "typeof" | "case" | "do" | "else" | "in" | "of" | "void" | "yield"
            )
        }
        _ => false,
    }
}

/// Minify `input`; fails on unterminated strings, comments and regular expressions
pub fn minify(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut gap = Gap::None;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                gap = gap.widen(Gap::Newline);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut closed = false;
                let mut saw_newline = false;
                while let Some(c) = chars.next() {
                    if c == '\n' {
                        saw_newline = true;
                    } else if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err("unterminated comment".to_string());
                }
                gap = gap.widen(if saw_newline { Gap::Newline } else { Gap::Space });
            }
            c if c.is_whitespace() => {
                gap = gap.widen(if c == '\n' || c == '\r' { Gap::Newline } else { Gap::Space });
            }
            _ => {
                emit_gap(&mut out, gap, c);
                gap = Gap::None;

                match c {
                    '"' | '\'' => copy_string(&mut out, &mut chars, c)?,
                    '`' => copy_template(&mut out, &mut chars)?,
                    '/' if regex_allowed(&out) => copy_regex(&mut out, &mut chars)?,
                    _ => out.push(c),
                }
            }
        }
    }

    Ok(out)
}

fn emit_gap(out: &mut String, gap: Gap, next: char) {
    let Some(prev) = out.chars().last() else {
        return;
    };
    match gap {
        Gap::None => {}
        Gap::Newline if ends_statement(prev) && starts_statement(next) => out.push('\n'),
        Gap::Newline | Gap::Space => {
            let same_sign = (prev == '+' || prev == '-') && prev == next;
            if (is_word(prev) && is_word(next)) || same_sign {
                out.push(' ');
            }
        }
    }
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn copy_string(out: &mut String, chars: &mut Chars<'_>, quote: char) -> Result<(), String> {
    out.push(quote);
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            },
            '\n' => break,
            c if c == quote => return Ok(()),
            _ => {}
        }
    }
    Err("unterminated string literal".to_string())
}

fn copy_template(out: &mut String, chars: &mut Chars<'_>) -> Result<(), String> {
    out.push('`');
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            },
            '`' => return Ok(()),
            _ => {}
        }
    }
    Err("unterminated template literal".to_string())
}

fn copy_regex(out: &mut String, chars: &mut Chars<'_>) -> Result<(), String> {
    out.push('/');
    let mut in_class = false;
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            },
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return Ok(()),
            '\n' => break,
            _ => {}
        }
    }
    Err("unterminated regular expression".to_string())
}
