//! Dependency manifest loading.
//!
//! The manifest is an XML document whose root element holds one element per
//! dependency:
//!
//! ```xml
//! <dependencies>
//!   <dependency name="catch" url="https://github.com/philsquared/Catch.git"
//!               tag="v1.5.6" target_dir="3rdParty/catch">
//!     <include_dir>single_include</include_dir>
//!   </dependency>
//!   <dependency name="boost" url="https://github.com/boostorg/boost.git"
//!               tag="boost-1.61.0" target_dir="3rdParty/boost">
//!     <submodules>
//!       <submodule>libs/system</submodule>
//!       <submodule>libs/filesystem</submodule>
//!     </submodules>
//!   </dependency>
//! </dependencies>
//! ```
//!
//! Attributes supply the fetch coordinates. Child elements become fields: a
//! child with more than one sub-element is a list of the sub-elements' text,
//! anything else is a single text value.

use crate::error::ManifestError;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use xot::{Node, Xot};

/// Normalized value of a manifest child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Read the value as a sequence. A scalar is a one-element sequence unless empty.
    pub fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items,
            FieldValue::Scalar(s) if s.is_empty() => Vec::new(),
            FieldValue::Scalar(s) => vec![s],
        }
    }

    /// Read the value as a single string. Lists yield their first item.
    pub fn into_scalar(self) -> Option<String> {
        match self {
            FieldValue::Scalar(s) if s.is_empty() => None,
            FieldValue::Scalar(s) => Some(s),
            FieldValue::List(items) => items.into_iter().next(),
        }
    }
}

/// One resolved manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyRecord {
    pub name: String,
    pub url: String,
    pub tag: String,
    pub target_dir: PathBuf,
    pub submodules: Vec<String>,
    pub include_dir: Option<String>,
    pub library32_dir: Option<String>,
    pub library64_dir: Option<String>,
    /// Child elements the resolver does not interpret, kept for downstream consumers.
    pub extra: BTreeMap<String, FieldValue>,
}

impl DependencyRecord {
    /// Look up one of the `<kind>_dir` path fields by kind (`include`, `library32`, `library64`).
    pub fn dir_field(&self, kind: &str) -> Option<&str> {
        match kind {
            "include" => self.include_dir.as_deref(),
            "library32" => self.library32_dir.as_deref(),
            "library64" => self.library64_dir.as_deref(),
            _ => None,
        }
    }
}

/// Which manifest entries a run should keep.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Resolve nothing at all.
    pub skip_all: bool,
    /// If non-empty, only these names are kept.
    pub include_names: BTreeSet<String>,
    /// Names removed after the include check.
    pub exclude_names: BTreeSet<String>,
}

impl FilterOptions {
    pub fn admits(&self, name: &str) -> bool {
        if !self.include_names.is_empty() && !self.include_names.contains(name) {
            return false;
        }
        if !self.exclude_names.is_empty() && self.exclude_names.contains(name) {
            return false;
        }
        true
    }
}

/// Load the manifest at `path` and apply `filter`.
///
/// With `skip_all` set the file is not even opened.
pub fn load(path: &Path, filter: &FilterOptions) -> Result<Vec<DependencyRecord>, ManifestError> {
    if filter.skip_all {
        log::debug!("checkout disabled, not reading {}", path.display());
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ManifestError::Missing(path.to_path_buf()),
        _ => ManifestError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let records = parse_manifest(&text, path)?;
    let total = records.len();
    let kept: Vec<DependencyRecord> = records
        .into_iter()
        .filter(|r| filter.admits(&r.name))
        .collect();
    log::debug!(
        "manifest {}: {} dependencies, {} after filtering",
        path.display(),
        total,
        kept.len()
    );
    Ok(kept)
}

/// Parse manifest text into records, in document order. `origin` is only used in errors.
pub fn parse_manifest(text: &str, origin: &Path) -> Result<Vec<DependencyRecord>, ManifestError> {
    let malformed = |message: String| ManifestError::Malformed {
        path: origin.to_path_buf(),
        message,
    };

    let mut xot = Xot::new();
    let document = xot.parse(text).map_err(|e| malformed(e.to_string()))?;
    let root = xot
        .document_element(document)
        .map_err(|e| malformed(e.to_string()))?;

    let names = AttributeNames::register(&mut xot);

    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    for (index, node) in element_children(&xot, root).enumerate() {
        let record = read_dependency(&xot, &names, node, index)?;
        if !seen.insert(record.name.clone()) {
            log::warn!("dependency '{}' is listed more than once", record.name);
        }
        records.push(record);
    }
    Ok(records)
}

struct AttributeNames {
    name: xot::NameId,
    url: xot::NameId,
    tag: xot::NameId,
    target_dir: xot::NameId,
}

impl AttributeNames {
    fn register(xot: &mut Xot) -> Self {
        Self {
            name: xot.add_name("name"),
            url: xot.add_name("url"),
            tag: xot.add_name("tag"),
            target_dir: xot.add_name("target_dir"),
        }
    }
}

fn element_children(xot: &Xot, node: Node) -> impl Iterator<Item = Node> + '_ {
    xot.children(node).filter(move |child| xot.is_element(*child))
}

fn read_dependency(
    xot: &Xot,
    names: &AttributeNames,
    node: Node,
    index: usize,
) -> Result<DependencyRecord, ManifestError> {
    let attribute = |id: xot::NameId, attribute: &'static str| {
        xot.get_attribute(node, id)
            .map(|value| value.to_string())
            .ok_or(ManifestError::MissingAttribute { index, attribute })
    };

    let mut record = DependencyRecord {
        name: attribute(names.name, "name")?,
        url: attribute(names.url, "url")?,
        tag: attribute(names.tag, "tag")?,
        target_dir: PathBuf::from(attribute(names.target_dir, "target_dir")?),
        ..Default::default()
    };

    for child in element_children(xot, node) {
        let Some(element) = xot.element(child) else {
            continue;
        };
        let key = xot.local_name_str(element.name()).to_string();
        let value = normalize_field(xot, child);
        match key.as_str() {
            "submodules" => record.submodules = value.into_list(),
            "include_dir" => record.include_dir = value.into_scalar(),
            "library32_dir" => record.library32_dir = value.into_scalar(),
            "library64_dir" => record.library64_dir = value.into_scalar(),
            _ => {
                record.extra.insert(key, value);
            }
        }
    }

    Ok(record)
}

/// More than one sub-element makes a list; otherwise the element's text is the value.
fn normalize_field(xot: &Xot, node: Node) -> FieldValue {
    let items: Vec<Node> = element_children(xot, node).collect();
    // a single sub-element collapses to its text so one-item groups read as a scalar
    if items.len() > 1 {
        FieldValue::List(
            items
                .into_iter()
                .map(|item| xot.string_value(item).trim().to_string())
                .collect(),
        )
    } else {
        FieldValue::Scalar(xot.string_value(node).trim().to_string())
    }
}
