use std::path::Path;

use crate::error::ConfigError;

/// Parses a dotenv-style file into ordered `KEY=VALUE` pairs.
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// accepted, and single- or double-quoted values are unescaped.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    parse_env_str(&content, &display)
}

pub(crate) fn parse_env_str(
    content: &str,
    path: &str,
) -> Result<Vec<(String, String)>, ConfigError> {
    let mut out = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (k, v) = line.split_once('=').ok_or_else(|| ConfigError::EnvFile {
            path: path.to_string(),
            line: line_no,
            reason: "expected KEY=VALUE".to_string(),
        })?;
        let key = k.trim();
        if key.is_empty() {
            return Err(ConfigError::EnvFile {
                path: path.to_string(),
                line: line_no,
                reason: "empty key".to_string(),
            });
        }
        let value = parse_env_value(v.trim(), path, line_no)?;
        out.push((key.to_string(), value));
    }

    Ok(out)
}

fn parse_env_value(value: &str, path: &str, line_no: usize) -> Result<String, ConfigError> {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        let inner = &value[1..value.len() - 1];
        return unescape_env_value(inner, path, line_no);
    }
    Ok(value.to_string())
}

fn unescape_env_value(value: &str, path: &str, line_no: usize) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            return Err(ConfigError::EnvFile {
                path: path.to_string(),
                line: line_no,
                reason: "trailing backslash".to_string(),
            });
        };
        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Ok(out)
}
