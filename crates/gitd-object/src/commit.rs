use bstr::ByteSlice;
use gitd_hash::ObjectId;

use crate::ObjectError;

/// The commit structure the transfer protocol cares about: the root tree
/// and the ordered parent list. Author, committer, and message are carried
/// opaquely in the payload and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitInfo {
    /// OID of the root tree, if the commit carries a `tree` header.
    pub tree: Option<ObjectId>,
    /// Parent commit OIDs in header order (empty for a root commit).
    pub parents: Vec<ObjectId>,
}

impl CommitInfo {
    /// Extract tree and parent hashes from commit payload bytes.
    ///
    /// Scans the `key value` header lines up to the blank line that starts
    /// the message; unknown headers are ignored.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut info = CommitInfo::default();

        for line in content.lines() {
            if line.is_empty() {
                // Blank line ends the headers; the message follows.
                break;
            }
            let Some(space_pos) = line.iter().position(|&b| b == b' ') else {
                continue;
            };
            let (key, value) = (&line[..space_pos], &line[space_pos + 1..]);
            match key {
                b"tree" => {
                    info.tree = Some(parse_oid(value, "tree")?);
                }
                b"parent" => {
                    info.parents.push(parse_oid(value, "parent")?);
                }
                _ => {}
            }
        }

        Ok(info)
    }
}

fn parse_oid(value: &[u8], field: &str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF8 {field} hash")))?;
    Ok(ObjectId::from_hex(hex)?)
}
