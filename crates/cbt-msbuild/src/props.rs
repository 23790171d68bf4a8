//! MSBuild property files
//!
//! Output is a plain `<Project>` with one `<PropertyGroup>`. Values are
//! XML-escaped; whitespace layout is fixed but not significant.

use crate::{Error, Result};
use cbt_fs::{NormalizedPath, RobustnessConfig, io};
use std::fmt::Write as _;

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Ordered MSBuild properties with validated names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<(String, String)>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from pairs; later duplicates replace earlier values.
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value)?;
        }
        Ok(set)
    }

    /// Set a property. Names compare case-insensitively, as in MSBuild.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(Error::InvalidPropertyName { name });
        }
        let value = value.into();

        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as an MSBuild project document.
    pub fn to_props_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        let _ = writeln!(xml, "<Project ToolsVersion=\"4.0\" xmlns=\"{}\">", MSBUILD_NAMESPACE);
        xml.push_str("  <PropertyGroup>\n");
        for (name, value) in self.iter() {
            let _ = writeln!(xml, "    <{name}>{}</{name}>", escape(value));
        }
        xml.push_str("  </PropertyGroup>\n");
        xml.push_str("</Project>\n");
        xml
    }
}

/// Persists a property set
pub trait PropertySink {
    fn write(&self, properties: &PropertySet) -> Result<()>;
}

/// A `.props` file written atomically
#[derive(Debug, Clone)]
pub struct PropsFile {
    path: NormalizedPath,
    robustness: RobustnessConfig,
}

impl PropsFile {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl PropertySink for PropsFile {
    fn write(&self, properties: &PropertySet) -> Result<()> {
        let xml = properties.to_props_xml();
        io::write_atomic(&self.path, xml.as_bytes(), self.robustness)?;
        tracing::info!(path = %self.path, properties = properties.len(), "Wrote property file");
        Ok(())
    }
}

/// MSBuild property names: a letter or `_`, then letters, digits, `_`, `-`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
