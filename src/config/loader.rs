//! Settings file loading

use super::source::{ConfigSource, MemorySource, Section, DEFAULT_SECTION};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};

/// Separator used when an array is stored as one raw value.
const ARRAY_JOIN: &str = ";";

/// A TOML or YAML settings file flattened into sections.
///
/// Top-level tables become sections and top-level scalars land in
/// [`DEFAULT_SECTION`]. Nested tables are flattened into dotted keys. Every
/// scalar is kept exactly as written so the literal grammar sees the original
/// text (`0x1F` stays `0x1F`). Arrays are joined with `;`; an element that
/// already contains `;` is rejected. YAML cannot report how a number or
/// boolean was written, so non-string YAML scalars must be quoted.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    path: Option<PathBuf>,
    sections: MemorySource,
}

impl FileSource {
    /// A source with no file behind it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed reading settings file: {}", path.display()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        let sections = match ext.as_str() {
            "toml" => parse_toml(&content, path)?,
            "yaml" | "yml" => parse_yaml(&content, path)?,
            other => anyhow::bail!(
                "Unsupported settings extension '.{}' for file {}",
                other,
                path.display()
            ),
        };

        Ok(Self { path: Some(path.to_path_buf()), sections })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn sections(&self) -> &MemorySource {
        &self.sections
    }
}

impl ConfigSource for FileSource {
    fn load_section(&self, name: &str) -> Result<Option<Section>> {
        self.sections.load_section(name)
    }
}

/// Load settings from `explicit`, or from the first candidate file found in `dir`.
///
/// An explicit path that cannot be read or parsed is an error. A discovered
/// file that fails the same way is skipped with a warning.
pub fn load_source(dir: &Path, explicit: Option<&Path>) -> Result<FileSource> {
    let path = match explicit {
        Some(path) => return FileSource::open(path),
        None => discover_source(dir),
    };

    let Some(path) = path else {
        return Ok(FileSource::empty());
    };

    match FileSource::open(&path) {
        Ok(source) => {
            tracing::debug!("Loaded settings from {}", path.display());
            Ok(source)
        }
        Err(e) => {
            tracing::warn!("Failed to load auto-discovered settings {}: {:#}", path.display(), e);
            Ok(FileSource::empty())
        }
    }
}

fn discover_source(dir: &Path) -> Option<PathBuf> {
    let candidates = [
        "typed-settings.toml",
        ".typed-settings.toml",
        "typed-settings.yaml",
        "typed-settings.yml",
    ];

    candidates.iter().map(|candidate| dir.join(candidate)).find(|path| path.exists())
}

fn parse_toml(content: &str, path: &Path) -> Result<MemorySource> {
    let doc = content
        .parse::<DocumentMut>()
        .with_context(|| format!("Invalid TOML syntax: {}", path.display()))?;

    let mut source = MemorySource::new();
    for (key, item) in doc.iter() {
        match item {
            Item::Table(table) => {
                let out = source.section_mut(key);
                for (nested, item) in table.iter() {
                    flatten_toml(nested, item, out)?;
                }
            }
            Item::Value(toml_edit::Value::InlineTable(table)) => {
                let out = source.section_mut(key);
                for (nested, value) in table.iter() {
                    flatten_toml_value(nested, value, out)?;
                }
            }
            Item::Value(value) => {
                source.insert(DEFAULT_SECTION, key, toml_raw(key, value)?);
            }
            Item::ArrayOfTables(_) => anyhow::bail!("Array of tables '{key}' is not supported"),
            Item::None => {}
        }
    }
    Ok(source)
}

fn flatten_toml(key: &str, item: &Item, out: &mut Section) -> Result<()> {
    match item {
        Item::Table(table) => {
            for (nested, item) in table.iter() {
                flatten_toml(&dotted(key, nested), item, out)?;
            }
        }
        Item::Value(value) => flatten_toml_value(key, value, out)?,
        Item::ArrayOfTables(_) => anyhow::bail!("Array of tables '{key}' is not supported"),
        Item::None => {}
    }
    Ok(())
}

fn flatten_toml_value(key: &str, value: &toml_edit::Value, out: &mut Section) -> Result<()> {
    if let toml_edit::Value::InlineTable(table) = value {
        for (nested, value) in table.iter() {
            flatten_toml_value(&dotted(key, nested), value, out)?;
        }
    } else {
        out.insert(key.to_string(), toml_raw(key, value)?);
    }
    Ok(())
}

/// The value as written in the file; strings are unquoted and unescaped.
fn toml_raw(key: &str, value: &toml_edit::Value) -> Result<String> {
    use toml_edit::Value as V;
    let raw = match value {
        V::String(s) => s.value().clone(),
        V::Integer(i) => i.display_repr().into_owned(),
        V::Float(f) => f.display_repr().into_owned(),
        V::Boolean(b) => b.display_repr().into_owned(),
        V::Datetime(d) => d.display_repr().into_owned(),
        V::Array(items) => {
            let items = items
                .iter()
                .map(|item| match item {
                    V::Array(_) | V::InlineTable(_) => {
                        anyhow::bail!("Array '{key}' must only contain scalars")
                    }
                    scalar => toml_raw(key, scalar),
                })
                .collect::<Result<Vec<_>>>()?;
            join_array(key, items)?
        }
        V::InlineTable(_) => anyhow::bail!("Inline table '{key}' cannot be a single value"),
    };
    Ok(raw)
}

fn parse_yaml(content: &str, path: &Path) -> Result<MemorySource> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", path.display()))?;

    let mut source = MemorySource::new();
    let mapping = match raw {
        serde_yaml::Value::Null => return Ok(source),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => anyhow::bail!("Invalid YAML settings: {} must contain a mapping", path.display()),
    };

    for (key, value) in mapping {
        let key = yaml_key(&key)?;
        match value {
            serde_yaml::Value::Mapping(nested) => {
                flatten_yaml("", nested, source.section_mut(&key))?
            }
            scalar => {
                source.insert(DEFAULT_SECTION, &key, yaml_raw(&key, &scalar)?);
            }
        }
    }
    Ok(source)
}

fn flatten_yaml(prefix: &str, mapping: serde_yaml::Mapping, out: &mut Section) -> Result<()> {
    for (key, value) in mapping {
        let key = dotted(prefix, &yaml_key(&key)?);
        match value {
            serde_yaml::Value::Mapping(nested) => flatten_yaml(&key, nested, out)?,
            scalar => {
                let raw = yaml_raw(&key, &scalar)?;
                out.insert(key, raw);
            }
        }
    }
    Ok(())
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => anyhow::bail!("Unsupported YAML key: {other:?}"),
    }
}

fn yaml_raw(key: &str, value: &serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_) => {
            anyhow::bail!("Value for '{key}' must be quoted to keep its literal form")
        }
        serde_yaml::Value::Sequence(items) => {
            let items = items
                .iter()
                .map(|item| match item {
                    serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
                        anyhow::bail!("Sequence '{key}' must only contain scalars")
                    }
                    scalar => yaml_raw(key, scalar),
                })
                .collect::<Result<Vec<_>>>()?;
            join_array(key, items)
        }
        serde_yaml::Value::Mapping(_) => anyhow::bail!("Mapping '{key}' cannot be a single value"),
        serde_yaml::Value::Tagged(tagged) => yaml_raw(key, &tagged.value),
    }
}

fn join_array(key: &str, items: Vec<String>) -> Result<String> {
    if items.iter().any(|item| item.contains(ARRAY_JOIN)) {
        anyhow::bail!("Array '{key}' has an element containing '{ARRAY_JOIN}'");
    }
    Ok(items.join(ARRAY_JOIN))
}

fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
