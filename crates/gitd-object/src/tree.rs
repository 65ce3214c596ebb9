use bstr::BString;
use gitd_hash::ObjectId;

use crate::ObjectError;

/// A single entry in a tree object.
///
/// The mode is kept as the raw ASCII octal bytes from the payload — modes
/// are classified (subtree vs blob) but never normalized or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: BString,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Whether this entry points at a subtree.
    ///
    /// A mode beginning with `40000` denotes a tree; every other mode is
    /// treated as a blob.
    pub fn is_tree(&self) -> bool {
        self.mode.starts_with(b"40000")
    }
}

/// Parse a tree payload into its entries.
///
/// The wire format per entry is `<octal-mode> <name>\0<20-byte-hash>`,
/// entries back to back with no separator. Any truncation is an error.
pub fn parse_tree(data: &[u8]) -> Result<Vec<TreeEntry>, ObjectError> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let space_pos = data[pos..]
            .iter()
            .position(|&b| b == b' ')
            .map(|p| p + pos)
            .ok_or_else(|| ObjectError::InvalidTreeEntry {
                offset: pos,
                reason: "mode not terminated".into(),
            })?;

        let null_pos = data[space_pos + 1..]
            .iter()
            .position(|&b| b == 0)
            .map(|p| p + space_pos + 1)
            .ok_or_else(|| ObjectError::InvalidTreeEntry {
                offset: pos,
                reason: "name not terminated".into(),
            })?;

        let hash_start = null_pos + 1;
        let hash_end = hash_start + 20;
        if hash_end > data.len() {
            return Err(ObjectError::InvalidTreeEntry {
                offset: pos,
                reason: "hash truncated".into(),
            });
        }

        entries.push(TreeEntry {
            mode: BString::from(&data[pos..space_pos]),
            name: BString::from(&data[space_pos + 1..null_pos]),
            oid: ObjectId::from_bytes(&data[hash_start..hash_end])?,
        });

        pos = hash_end;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_entry(mode: &str, name: &[u8], oid: &ObjectId) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(name);
        out.push(0);
        out.extend_from_slice(oid.as_bytes());
        out
    }

    #[test]
    fn parse_mixed_entries() {
        let blob_oid = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let tree_oid = ObjectId::from_hex("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();

        let mut data = raw_entry("100644", b"README.md", &blob_oid);
        data.extend_from_slice(&raw_entry("40000", b"src", &tree_oid));

        let entries = parse_tree(&data).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].name, "README.md");
        assert_eq!(entries[0].oid, blob_oid);
        assert!(!entries[0].is_tree());

        assert_eq!(entries[1].name, "src");
        assert_eq!(entries[1].oid, tree_oid);
        assert!(entries[1].is_tree());
    }

    #[test]
    fn empty_tree_has_no_entries() {
        assert!(parse_tree(b"").unwrap().is_empty());
    }

    #[test]
    fn non_utf8_names_are_preserved() {
        let oid = ObjectId::from_hex("cccccccccccccccccccccccccccccccccccccccc").unwrap();
        let data = raw_entry("100644", b"caf\xe9.txt", &oid);
        let entries = parse_tree(&data).unwrap();
        assert_eq!(entries[0].name.as_slice(), b"caf\xe9.txt");
    }

    #[test]
    fn modes_are_not_normalized() {
        let oid = ObjectId::from_hex("dddddddddddddddddddddddddddddddddddddddd").unwrap();
        // An executable and a nonstandard mode both classify as blobs.
        let mut data = raw_entry("100755", b"run.sh", &oid);
        data.extend_from_slice(&raw_entry("123456", b"odd", &oid));
        let entries = parse_tree(&data).unwrap();
        assert_eq!(entries[0].mode, "100755");
        assert!(!entries[0].is_tree());
        assert_eq!(entries[1].mode, "123456");
        assert!(!entries[1].is_tree());
    }

    #[test]
    fn truncated_hash_fails() {
        let oid = ObjectId::from_hex("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee").unwrap();
        let mut data = raw_entry("100644", b"file", &oid);
        data.truncate(data.len() - 1);
        let err = parse_tree(&data).unwrap_err();
        assert!(matches!(err, ObjectError::InvalidTreeEntry { .. }));
    }

    #[test]
    fn missing_name_terminator_fails() {
        let err = parse_tree(b"100644 file-without-null").unwrap_err();
        assert!(matches!(err, ObjectError::InvalidTreeEntry { .. }));
    }
}
