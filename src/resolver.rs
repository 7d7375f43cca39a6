//! Category name resolution.
//!
//! A raw category name is renamed, then either mapped to its position in the
//! target list or marked excluded. Excluded names are collected in an
//! [`ExclusionList`] owned by the caller, so the resolver itself holds no
//! mutable state and can be shared freely.

use log::info;
use std::collections::HashMap;

/// Output class index of a box, or the excluded marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassIndex {
    Target(usize),
    Excluded,
}

impl ClassIndex {
    pub fn is_excluded(&self) -> bool {
        matches!(self, ClassIndex::Excluded)
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            ClassIndex::Target(index) => Some(*index),
            ClassIndex::Excluded => None,
        }
    }
}

/// Class names dropped from the output. Starts from the configured list and
/// grows with every excluded name seen during a run; names are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    names: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            list.insert(name.into());
        }
        list
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns `true` if the name was not already present.
    pub fn insert(&mut self, name: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Maps raw category names onto output class indices.
#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    target_names: Vec<String>,
    rename_map: HashMap<String, String>,
}

impl LabelResolver {
    pub fn new(target_names: Vec<String>, rename_map: HashMap<String, String>) -> Self {
        Self {
            target_names,
            rename_map,
        }
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    // Names without an entry map to themselves
    fn rename<'a>(&'a self, raw_name: &'a str) -> &'a str {
        self.rename_map
            .get(raw_name)
            .map(String::as_str)
            .unwrap_or(raw_name)
    }

    /// Resolve `raw_name` to `(renamed name, class index)`.
    ///
    /// A name missing from the target list or present in `exclusions` is
    /// excluded. The first time a name is excluded it is added to
    /// `exclusions` and reported once.
    pub fn resolve(&self, raw_name: &str, exclusions: &mut ExclusionList) -> (String, ClassIndex) {
        let name = self.rename(raw_name);
        let position = self.target_names.iter().position(|t| t == name);

        let index = match position {
            Some(index) if !exclusions.contains(name) => ClassIndex::Target(index),
            _ => {
                if exclusions.insert(name.to_string()) {
                    info!("not using: {:?}", exclusions.names());
                }
                ClassIndex::Excluded
            }
        };

        (name.to_string(), index)
    }
}
