//! Gettext `.po` source parser.
//!
//! Produces raw entries; mapping `msgstr[n]` onto plural categories happens in
//! the catalog, which knows the locale's rule.

use crate::i18n::catalog::CatalogError;
use std::path::Path;

/// One parsed `.po` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoEntry {
    pub context: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// Translations in `msgstr[n]` order; a non-plural entry has exactly one.
    pub msgstr: Vec<String>,
    pub fuzzy: bool,
}

impl PoEntry {
    /// The header entry carries catalog metadata, not a translation.
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.context.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str(usize),
}

#[derive(Default)]
struct PendingEntry {
    entry: PoEntry,
    has_id: bool,
    has_str: bool,
}

/// Parse the text of a `.po` file.
///
/// `path` is only used to label errors.
pub fn parse_po(source: &str, path: &Path) -> Result<Vec<PoEntry>, CatalogError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut entries = Vec::new();
    let mut pending = PendingEntry::default();
    let mut field: Option<Field> = None;
    let mut next_fuzzy = false;

    let err = |line: usize, message: String| CatalogError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            field = None;
            continue;
        }

        if let Some(flags) = line.strip_prefix("#,") {
            if flags.split(',').any(|flag| flag.trim() == "fuzzy") {
                next_fuzzy = true;
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if line.starts_with('"') {
            let value = parse_quoted(line).map_err(|m| err(line_no, m))?;
            let target = field.ok_or_else(|| err(line_no, "string continuation without a keyword".into()))?;
            field_mut(&mut pending.entry, target).push_str(&value);
            continue;
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| err(line_no, format!("expected keyword and string, found '{}'", line)))?;
        let value = parse_quoted(rest.trim()).map_err(|m| err(line_no, m))?;

        match keyword {
            "msgctxt" | "msgid" => {
                // A new entry starts once the previous one has its translation.
                if pending.has_str {
                    let done = std::mem::take(&mut pending);
                    entries.push(done.entry);
                } else if pending.has_id {
                    return Err(err(line_no, format!("msgid '{}' has no msgstr", pending.entry.msgid)));
                }

                if keyword == "msgctxt" {
                    if pending.entry.context.is_some() {
                        return Err(err(line_no, "duplicate msgctxt".into()));
                    }
                    pending.entry.context = Some(value);
                    field = Some(Field::Context);
                } else {
                    pending.entry.msgid = value;
                    pending.has_id = true;
                    field = Some(Field::Id);
                }
                pending.entry.fuzzy |= next_fuzzy;
                next_fuzzy = false;
            }
            "msgid_plural" => {
                if !pending.has_id || pending.has_str {
                    return Err(err(line_no, "msgid_plural must follow msgid".into()));
                }
                pending.entry.msgid_plural = Some(value);
                field = Some(Field::IdPlural);
            }
            _ => {
                let index = parse_msgstr_index(keyword).map_err(|m| err(line_no, m))?;
                if !pending.has_id {
                    return Err(err(line_no, "msgstr without msgid".into()));
                }
                let plural = pending.entry.msgid_plural.is_some();
                match index {
                    None if plural => {
                        return Err(err(line_no, "plural entry requires msgstr[n]".into()));
                    }
                    Some(_) if !plural => {
                        return Err(err(line_no, "msgstr[n] requires msgid_plural".into()));
                    }
                    _ => {}
                }
                let slot = index.unwrap_or(0);
                if slot != pending.entry.msgstr.len() {
                    return Err(err(line_no, format!("msgstr[{}] out of order", slot)));
                }
                pending.entry.msgstr.push(value);
                pending.has_str = true;
                field = Some(Field::Str(slot));
            }
        }
    }

    if pending.has_str {
        entries.push(pending.entry);
    } else if pending.has_id || pending.entry.context.is_some() {
        return Err(err(
            source.lines().count(),
            "unexpected end of file inside an entry".into(),
        ));
    }

    Ok(entries)
}

fn field_mut(entry: &mut PoEntry, field: Field) -> &mut String {
    match field {
        Field::Context => entry.context.get_or_insert_with(String::new),
        Field::Id => &mut entry.msgid,
        Field::IdPlural => entry.msgid_plural.get_or_insert_with(String::new),
        Field::Str(slot) => &mut entry.msgstr[slot],
    }
}

/// `msgstr` -> `None`, `msgstr[2]` -> `Some(2)`.
fn parse_msgstr_index(keyword: &str) -> Result<Option<usize>, String> {
    if keyword == "msgstr" {
        return Ok(None);
    }
    keyword
        .strip_prefix("msgstr[")
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|digits| digits.parse().ok())
        .map(Some)
        .ok_or_else(|| format!("unknown keyword '{}'", keyword))
}

/// Unquote a `"..."` literal, decoding C escapes.
///
/// Octal and `\x` escapes produce raw bytes, so multi-byte UTF-8 sequences may
/// be spelled out byte by byte; the result must still be valid UTF-8.
fn parse_quoted(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| format!("unterminated string: {}", text))?;

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or("trailing backslash in string")?;
                let byte = match escaped {
                    'n' => b'\n',
                    't' => b'\t',
                    'r' => b'\r',
                    'a' => 0x07,
                    'b' => 0x08,
                    'f' => 0x0c,
                    'v' => 0x0b,
                    '"' | '\\' | '\'' | '?' => escaped as u8,
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8).unwrap_or_default();
                        for _ in 0..2 {
                            match chars.peek().and_then(|d| d.to_digit(8)) {
                                Some(digit) => {
                                    value = value * 8 + digit;
                                    chars.next();
                                }
                                None => break,
                            }
                        }
                        u8::try_from(value)
                            .map_err(|_| format!("octal escape out of range: \\{:o}", value))?
                    }
                    'x' => {
                        let mut value: u32 = 0;
                        let mut digits = 0;
                        while let Some(digit) = chars.peek().and_then(|d| d.to_digit(16)) {
                            value = value * 16 + digit;
                            digits += 1;
                            chars.next();
                            if value > 0xff {
                                return Err("hex escape out of range".into());
                            }
                        }
                        if digits == 0 {
                            return Err("\\x escape without hex digits".into());
                        }
                        value as u8
                    }
                    other => return Err(format!("unknown escape '\\{}'", other)),
                };
                out.push(byte);
            }
            '"' => return Err(format!("unescaped quote in string: {}", text)),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(out).map_err(|_| format!("escapes produce invalid UTF-8: {}", text))
}
