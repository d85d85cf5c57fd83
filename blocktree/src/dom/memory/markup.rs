//! Lenient markup tokenizer for the in-memory host.
//!
//! This is not an HTML5 tokenizer. It understands what templates and injected markup realistically
//! contain: text, start/end tags with quoted, unquoted or valueless attributes, self-closing
//! syntax, comments, and the common character references. Anything else is either treated as
//! text or skipped, it never fails.
use std::borrow::Cow;

use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Comment(String),
}

/// Elements that never have children or an end tag.
pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

/// Split `input` into tokens. Adjacent text is always merged into a single token.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    // Slices are only ever cut at ASCII bytes (or at the end), so they stay on char boundaries.
    while i < len {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(len, |offset| i + offset);
            text.push_str(&decode_entities(&input[i..end]));
            i = end;
            continue;
        }

        let next = bytes.get(i + 1).copied();

        if input[i..].starts_with(COMMENT_START) {
            flush_text(&mut text, &mut tokens);

            let start = i + COMMENT_START.len();
            match input[start..].find(COMMENT_END) {
                Some(offset) => {
                    tokens.push(Token::Comment(input[start..start + offset].to_string()));
                    i = start + offset + COMMENT_END.len();
                }
                None => {
                    tokens.push(Token::Comment(input[start..].to_string()));
                    i = len;
                }
            }
        } else if next == Some(b'/') && bytes.get(i + 2).is_some_and(u8::is_ascii_alphabetic) {
            flush_text(&mut text, &mut tokens);

            let (name, after) = read_name(input, i + 2);
            tokens.push(Token::EndTag(name));
            i = memchr(b'>', &bytes[after..]).map_or(len, |offset| after + offset + 1);
        } else if next.is_some_and(|byte| byte.is_ascii_alphabetic()) {
            match read_start_tag(input, i + 1) {
                Some((token, after)) => {
                    flush_text(&mut text, &mut tokens);
                    tokens.push(token);
                    i = after;
                }
                // Unterminated tag at the end of the input
                None => i = len,
            }
        } else if matches!(next, Some(b'!' | b'?')) {
            // Doctypes and processing instructions mean nothing inside a fragment
            flush_text(&mut text, &mut tokens);
            i = memchr(b'>', &bytes[i..]).map_or(len, |offset| i + offset + 1);
        } else {
            text.push('<');
            i += 1;
        }
    }

    flush_text(&mut text, &mut tokens);

    tokens
}

/// Read a tag name starting at `start`, returning it lower cased along with the position after it.
fn read_name(input: &str, start: usize) -> (String, usize) {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
    }

    (input[start..end].to_ascii_lowercase(), end)
}

/// Read the remainder of a start tag, where `start` points at the first byte of the tag name.
fn read_start_tag(input: &str, start: usize) -> Option<(Token, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();

    let (name, mut i) = read_name(input, start);
    let mut attributes: Vec<(String, String)> = Vec::new();

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        match *bytes.get(i)? {
            b'>' => {
                return Some((
                    Token::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    i + 1,
                ));
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some((
                    Token::StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    },
                    i + 2,
                ));
            }
            b'/' => i += 1,
            _ => {
                let name_start = i;
                while i < len
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                    && !bytes[i].is_ascii_whitespace()
                {
                    i += 1;
                }
                let attribute = input[name_start..i].to_ascii_lowercase();

                while i < len && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }

                let mut value = String::new();
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    while i < len && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }

                    match *bytes.get(i)? {
                        quote @ (b'"' | b'\'') => {
                            let value_start = i + 1;
                            let value_end = value_start + memchr(quote, &bytes[value_start..])?;
                            value = decode_entities(&input[value_start..value_end]).into_owned();
                            i = value_end + 1;
                        }
                        _ => {
                            let value_start = i;
                            while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                                i += 1;
                            }
                            value = decode_entities(&input[value_start..i]).into_owned();
                        }
                    }
                }

                // First occurrence of an attribute wins
                if !attribute.is_empty() && !attributes.iter().any(|(name, _)| *name == attribute)
                {
                    attributes.push((attribute, value));
                }
            }
        }
    }
}

/// Replace the supported character references within `text`. References that can't be decoded
/// are left as they are.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if memchr(b'&', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);

        let tail = &rest[at..];
        match decode_reference(tail) {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);

    Cow::Owned(out)
}

/// Decode a single reference at the start of `tail` (which begins with `&`), returning the
/// character and the number of bytes it occupied.
fn decode_reference(tail: &str) -> Option<(char, usize)> {
    let end = tail[1..].find(';')? + 1;
    if end > 10 {
        return None;
    }

    let c = match &tail[1..end] {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        name => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some((c, end + 1))
}
