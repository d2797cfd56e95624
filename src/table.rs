//! The substitution table that turns the ML-KEM-768 template into ML-KEM-1024.

use std::collections::BTreeMap;

use crate::errors::TableError;

/// Renames applied to the ML-KEM-768 template.
pub const MLKEM1024: &[(&str, &str)] = &[
    ("k", "k1024"),
    ("CiphertextSize768", "CiphertextSize1024"),
    ("EncapsulationKeySize768", "EncapsulationKeySize1024"),
    ("encryptionKey", "encryptionKey1024"),
    ("decryptionKey", "decryptionKey1024"),
    ("EncapsulationKey768", "EncapsulationKey1024"),
    ("NewEncapsulationKey768", "NewEncapsulationKey1024"),
    ("parseEK", "parseEK1024"),
    ("kemEncaps", "kemEncaps1024"),
    ("pkeEncrypt", "pkeEncrypt1024"),
    ("DecapsulationKey768", "DecapsulationKey1024"),
    ("NewDecapsulationKey768", "NewDecapsulationKey1024"),
    ("newKeyFromSeed", "newKeyFromSeed1024"),
    ("kemDecaps", "kemDecaps1024"),
    ("pkeDecrypt", "pkeDecrypt1024"),
    ("GenerateKey768", "GenerateKey1024"),
    ("generateKey", "generateKey1024"),
    ("kemKeyGen", "kemKeyGen1024"),
    ("kemPCT", "kemPCT1024"),
    ("encodingSize4", "encodingSize5"),
    ("encodingSize10", "encodingSize11"),
    ("ringCompressAndEncode4", "ringCompressAndEncode5"),
    ("ringCompressAndEncode10", "ringCompressAndEncode11"),
    ("ringDecodeAndDecompress4", "ringDecodeAndDecompress5"),
    ("ringDecodeAndDecompress10", "ringDecodeAndDecompress11"),
];

/// `k` matches far too much prose to be replaced inside comments.
pub const MLKEM1024_EXACT_ONLY: &str = "k";

/// Immutable identifier → replacement mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: BTreeMap<String, String>,
    exact_only: Option<String>,
    /// Comment substitutions: longest key first, then by key.
    comment_order: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Result<Self, TableError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            let key = key.into();
            if map.contains_key(&key) {
                return Err(TableError::DuplicateKey(key));
            }
            map.insert(key, value.into());
        }
        if let Some((key, value)) = map.iter().find(|(_, value)| map.contains_key(*value)) {
            return Err(TableError::ValueIsKey {
                key: key.clone(),
                value: value.clone(),
            });
        }

        let mut table = SubstitutionTable {
            entries: map,
            exact_only: None,
            comment_order: Vec::new(),
        };
        table.order_comment_substitutions();
        Ok(table)
    }

    /// Mark `key` as used for identifiers only, never for comment text.
    pub fn with_exact_only(mut self, key: impl Into<String>) -> Result<Self, TableError> {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            return Err(TableError::MissingExactOnlyKey(key));
        }
        self.exact_only = Some(key);
        self.order_comment_substitutions();
        Ok(self)
    }

    /// The ML-KEM-768 → ML-KEM-1024 table.
    pub fn mlkem1024() -> Result<Self, TableError> {
        Self::new(MLKEM1024.iter().copied())?.with_exact_only(MLKEM1024_EXACT_ONLY)
    }

    fn order_comment_substitutions(&mut self) {
        let mut order: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|(key, _)| Some(*key) != self.exact_only.as_ref())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        // BTreeMap iteration is already sorted by key, so a stable sort keeps
        // equal-length keys in key order.
        order.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        self.comment_order = order;
    }

    /// Replacement for the identifier `name`, if it is a key.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn exact_only(&self) -> Option<&str> {
        self.exact_only.as_deref()
    }

    /// Substitutions applied to comment text, in application order.
    pub fn comment_substitutions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.comment_order
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Replace every occurrence of every comment key in `text`.
    pub fn rewrite_comment_text(&self, text: &str) -> String {
        self.comment_substitutions()
            .fold(text.to_owned(), |text, (key, value)| {
                if text.contains(key) {
                    text.replace(key, value)
                } else {
                    text
                }
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlkem1024_table_is_valid() {
        let table = SubstitutionTable::mlkem1024().unwrap();
        assert_eq!(table.len(), MLKEM1024.len());
        assert_eq!(table.get("kemKeyGen"), Some("kemKeyGen1024"));
        assert_eq!(table.get("k"), Some("k1024"));
        assert_eq!(table.get("kemKeyGenFoo"), None);
        assert_eq!(table.exact_only(), Some("k"));
    }

    #[test]
    fn test_exact_only_key_is_not_a_comment_substitution() {
        let table = SubstitutionTable::mlkem1024().unwrap();
        assert!(table.comment_substitutions().all(|(key, _)| key != "k"));
        assert_eq!(table.comment_substitutions().count(), MLKEM1024.len() - 1);
        assert_eq!(
            table.rewrite_comment_text("// the key k is kept"),
            "// the key k is kept"
        );
    }

    #[test]
    fn test_comment_order_is_longest_first() {
        let table = SubstitutionTable::new([("ab", "X"), ("abc", "Y"), ("zz", "W")]).unwrap();
        let keys: Vec<_> = table.comment_substitutions().map(|(key, _)| key).collect();
        assert_eq!(keys, ["abc", "ab", "zz"]);
    }

    #[test]
    fn test_overlapping_keys_rewrite_deterministically() {
        let table = SubstitutionTable::new([("ab", "X"), ("abc", "Y")]).unwrap();
        assert_eq!(table.rewrite_comment_text("abcab abc"), "YX Y");

        let table = SubstitutionTable::mlkem1024().unwrap();
        assert_eq!(
            table.rewrite_comment_text("// NewEncapsulationKey768 returns an EncapsulationKey768."),
            "// NewEncapsulationKey1024 returns an EncapsulationKey1024."
        );
    }

    #[test]
    fn test_value_that_is_a_key_is_rejected() {
        let err = SubstitutionTable::new([("a", "b"), ("b", "c")]).unwrap_err();
        assert_eq!(
            err,
            TableError::ValueIsKey {
                key: "a".to_owned(),
                value: "b".to_owned(),
            }
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = SubstitutionTable::new([("a", "b"), ("a", "c")]).unwrap_err();
        assert_eq!(err, TableError::DuplicateKey("a".to_owned()));
    }

    #[test]
    fn test_unknown_exact_only_key_is_rejected() {
        let err = SubstitutionTable::new([("a", "b")])
            .unwrap()
            .with_exact_only("k")
            .unwrap_err();
        assert_eq!(err, TableError::MissingExactOnlyKey("k".to_owned()));
    }
}
