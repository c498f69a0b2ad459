//! Shader Macro Definitions
//!
//! An ordered `KEY -> VALUE` set fed to the shader preprocessor. Entries are
//! kept sorted by key, so the generated `#define` block (and therefore the
//! whole generated source) is identical for identical sets, regardless of
//! insertion order.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kestrel::resources::ShaderDefines;
//!
//! let mut defines = ShaderDefines::new();
//! defines.set("POINT_LIGHTS", "2");
//! defines.set("MAT_TEXTURES", "1");
//! ```

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderDefines {
    defines: Vec<(String, String)>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            defines: Vec::with_capacity(capacity),
        }
    }

    /// Set shader define (maintains sorted order)
    ///
    /// If key exists, updates its value; otherwise inserts new entry.
    pub fn set(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.search(key) {
            Ok(idx) => self.defines[idx].1 = value,
            Err(idx) => self.defines.insert(idx, (key.to_owned(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if let Ok(idx) = self.search(key) {
            self.defines.remove(idx);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_ok()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.search(key).ok().map(|idx| self.defines[idx].1.as_str())
    }

    #[inline]
    pub fn clear(&mut self) {
        self.defines.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge shader defines from another `ShaderDefines`
    ///
    /// If there are conflicts, values from other will override values in self.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    fn search(&self, key: &str) -> Result<usize, usize> {
        self.defines.binary_search_by(|(k, _)| k.as_str().cmp(key))
    }
}

/// Create `ShaderDefines` from list of macro definitions
impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::with_capacity(defines.len());
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_are_stringified() {
        let mut defines = ShaderDefines::new();
        defines.set("POINT_LIGHTS", 3usize);
        defines.set("MAT_TEXTURES", 0);

        assert_eq!(defines.get("POINT_LIGHTS"), Some("3"));
        assert_eq!(defines.get("MAT_TEXTURES"), Some("0"));
        assert_eq!(defines.get("SPOT_LIGHTS"), None);
    }

    #[test]
    fn set_overwrites_and_remove_drops() {
        let mut defines = ShaderDefines::from(&[("DIR_LIGHTS", "1")][..]);
        defines.set("DIR_LIGHTS", 2);
        assert_eq!(defines.len(), 1);
        assert_eq!(defines.get("DIR_LIGHTS"), Some("2"));

        assert!(defines.remove("DIR_LIGHTS"));
        assert!(!defines.remove("DIR_LIGHTS"));
        assert!(defines.is_empty());
    }

    #[test]
    fn iteration_is_key_ordered() {
        let defines = ShaderDefines::from(&[("SPOT_LIGHTS", "0"), ("AMB_LIGHTS", "1"), ("MAT_TEXTURES", "2")][..]);
        let keys: Vec<_> = defines.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["AMB_LIGHTS", "MAT_TEXTURES", "SPOT_LIGHTS"]);
    }

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base = ShaderDefines::from(&[("AMB_LIGHTS", "1"), ("POINT_LIGHTS", "0")][..]);
        base.merge(&ShaderDefines::from(&[("POINT_LIGHTS", "4")][..]));

        assert_eq!(base.get("AMB_LIGHTS"), Some("1"));
        assert_eq!(base.get("POINT_LIGHTS"), Some("4"));
        assert_eq!(base, ShaderDefines::from(&[("POINT_LIGHTS", "4"), ("AMB_LIGHTS", "1")][..]));
    }
}
