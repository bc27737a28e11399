use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Read key/value pairs from a configuration file.
///
/// `.toml` files are UTF-8, go through the TOML parser and are flattened
/// into dotted keys. Everything else is a properties file in ISO-8859-1;
/// characters outside Latin-1 need `\uXXXX` escapes.
pub fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let read_err = |e: std::io::Error| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    };

    if path.extension().is_some_and(|ext| ext == "toml") {
        let content = fs::read_to_string(path).map_err(read_err)?;
        parse_toml(path, &content)
    } else {
        let bytes = fs::read(path).map_err(read_err)?;
        Ok(parse_properties(&decode_latin1(&bytes)))
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse properties-file text: `#`/`!` comments, `=`/`:`/whitespace
/// separators, trailing-backslash continuation lines. Later keys win.
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    logical_lines(content)
        .iter()
        .map(|line| split_key_value(line))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim_start();
        if pending.is_none()
            && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        let continues = trailing % 2 == 1;
        let body = if continues {
            &line[..line.len() - 1]
        } else {
            line
        };

        let mut buf = pending.take().unwrap_or_default();
        buf.push_str(body);
        if continues {
            pending = Some(buf);
        } else {
            lines.push(buf);
        }
    }

    // A continuation on the last line just ends the entry.
    if let Some(buf) = pending {
        lines.push(buf);
    }
    lines
}

fn split_key_value(line: &str) -> (String, String) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start();
    }

    (unescape(&line[..key_end]), unescape(rest.trim_end()))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn parse_toml(path: &Path, content: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut entries = BTreeMap::new();
    flatten_table("", &table, &mut entries)?;
    Ok(entries)
}

/// Flatten nested tables into dotted keys. Booleans map onto the
/// `YES`/`NOT` flag vocabulary.
fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let text = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(true) => "YES".to_string(),
            toml::Value::Boolean(false) => "NOT".to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            toml::Value::Table(nested) => {
                flatten_table(&full_key, nested, out)?;
                continue;
            }
            toml::Value::Array(_) => {
                return Err(ConfigError::Validation(format!(
                    "arrays are not supported (key {full_key})"
                )));
            }
        };
        out.insert(full_key, text);
    }
    Ok(())
}
