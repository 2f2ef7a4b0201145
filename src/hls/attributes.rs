//! Directive line and attribute-list tokenizer.
//!
//! `#EXT-X-KEY:METHOD=AES-128,URI="key.bin",IV=0x1` parses into the tag
//! `EXT-X-KEY` and three attributes. Each attribute records the byte span of
//! its value within the original line so callers can splice a replacement
//! without touching anything else.

use std::ops::Range;

/// One `KEY=value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub key: &'a str,
    /// Value with surrounding quotes removed; escapes are left as written
    pub value: &'a str,
    pub quoted: bool,
    /// Byte range of `value` in the parsed line
    pub value_span: Range<usize>,
}

/// Ordered attributes of one directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList<'a> {
    entries: Vec<Attribute<'a>>,
}

impl<'a> AttributeList<'a> {
    /// Tokenize an attribute list. Spans are relative to `input`.
    pub fn parse(input: &'a str) -> Self {
        Self::parse_at(input, 0)
    }

    /// Tokenize `input`, shifting all spans by `offset`.
    ///
    /// Quoted values may contain commas and `\"`. An unterminated quoted
    /// value ends parsing; entries before it are kept.
    pub fn parse_at(input: &'a str, offset: usize) -> Self {
        let bytes = input.as_bytes();
        let len = bytes.len();
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < len {
            while pos < len && bytes[pos] == b' ' {
                pos += 1;
            }

            let key_start = pos;
            while pos < len && bytes[pos] != b'=' && bytes[pos] != b',' {
                pos += 1;
            }
            let key = input[key_start..pos].trim();

            // Bare token such as the duration in `#EXTINF:10,`
            if pos >= len || bytes[pos] == b',' {
                if !key.is_empty() {
                    entries.push(Attribute {
                        key,
                        value: "",
                        quoted: false,
                        value_span: offset + pos..offset + pos,
                    });
                }
                pos += 1;
                continue;
            }

            // Skip '='
            pos += 1;

            if pos < len && bytes[pos] == b'"' {
                let value_start = pos + 1;
                let Some(value_end) = find_closing_quote(bytes, value_start) else {
                    break;
                };

                entries.push(Attribute {
                    key,
                    value: &input[value_start..value_end],
                    quoted: true,
                    value_span: offset + value_start..offset + value_end,
                });

                pos = value_end + 1;
                while pos < len && bytes[pos] != b',' {
                    pos += 1;
                }
            } else {
                let value_start = pos;
                while pos < len && bytes[pos] != b',' {
                    pos += 1;
                }
                entries.push(Attribute {
                    key,
                    value: &input[value_start..pos],
                    quoted: false,
                    value_span: offset + value_start..offset + pos,
                });
            }

            // Skip ','
            pos += 1;
        }

        Self { entries }
    }

    /// First attribute named `key` (ASCII case-insensitive).
    pub fn get(&self, key: &str) -> Option<&Attribute<'a>> {
        self.entries.iter().find(|a| a.key.eq_ignore_ascii_case(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A `#TAG` or `#TAG:attributes` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Tag name without the leading `#`
    pub tag: &'a str,
    /// Spans index into the whole line
    pub attributes: AttributeList<'a>,
}

impl<'a> Directive<'a> {
    /// Parse a directive line; `None` if it does not start with `#`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let body = line.strip_prefix('#')?;

        match body.split_once(':') {
            Some((tag, attrs)) => {
                let offset = 1 + tag.len() + 1;
                Some(Self {
                    tag,
                    attributes: AttributeList::parse_at(attrs, offset),
                })
            }
            None => Some(Self {
                tag: body.trim_end(),
                attributes: AttributeList::default(),
            }),
        }
    }
}

fn find_closing_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
