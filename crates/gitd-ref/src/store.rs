use std::sync::Arc;

use gitd_fs::Filesystem;
use gitd_hash::{ObjectId, OID_HEX_LEN};

use crate::{Head, RefError};

/// Ref access over the filesystem collaborator.
pub struct RefStore {
    fs: Arc<dyn Filesystem>,
}

impl RefStore {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Resolve `HEAD`.
    pub fn head(&self) -> Result<Head, RefError> {
        if !self.fs.stat("HEAD").is_file() {
            return Ok(Head::Missing);
        }

        let content = self.fs.read_file("HEAD")?;
        let text = String::from_utf8_lossy(&content);
        let text = text.trim();

        if let Some(target) = text.strip_prefix("ref: ") {
            let target = target.trim().to_string();
            let stat = self.fs.stat(&target);
            // A missing or zero-size target means the branch is unborn.
            if !stat.is_file() || stat.size == 0 {
                return Ok(Head::Unborn { target });
            }
            let oid = self.read(&target)?;
            return Ok(Head::Symbolic { target, oid });
        }

        match parse_ref_content(text.as_bytes(), "HEAD") {
            Ok(oid) => Ok(Head::Detached(oid)),
            Err(_) => Err(RefError::BadHead(text.to_string())),
        }
    }

    /// Read a ref file and return its hash.
    pub fn read(&self, name: &str) -> Result<ObjectId, RefError> {
        let content = self.fs.read_file(name)?;
        parse_ref_content(&content, name)
    }

    /// Write a ref file. Content is the hex hash plus a trailing newline.
    pub fn write(&self, name: &str, oid: &ObjectId) -> Result<(), RefError> {
        let content = format!("{}\n", oid.to_hex());
        self.fs.write_file(name, content.as_bytes())?;
        Ok(())
    }

    /// Enumerate every ref below `refs/`, sorted by name.
    ///
    /// Files that cannot be read or parsed are skipped — a half-written
    /// ref must not break the advertisement.
    pub fn list(&self) -> Result<Vec<(String, ObjectId)>, RefError> {
        if !self.fs.stat("refs").is_dir() {
            return Ok(Vec::new());
        }

        let mut refs = Vec::new();
        for name in self.fs.scan("refs", -1)?.keys() {
            let Ok(content) = self.fs.read_file(name) else {
                continue;
            };
            let Ok(oid) = parse_ref_content(&content, name) else {
                continue;
            };
            refs.push((name.clone(), oid));
        }
        Ok(refs)
    }
}

/// Parse ref file content: the first 40 bytes must be hex; anything after
/// (conventionally a newline) is ignored.
fn parse_ref_content(content: &[u8], name: &str) -> Result<ObjectId, RefError> {
    if content.len() < OID_HEX_LEN {
        return Err(RefError::Parse {
            name: name.to_string(),
            reason: format!("content too short ({} bytes)", content.len()),
        });
    }
    let hex = std::str::from_utf8(&content[..OID_HEX_LEN]).map_err(|_| RefError::Parse {
        name: name.to_string(),
        reason: "non-UTF8 hash".into(),
    })?;
    ObjectId::from_hex(hex).map_err(|e| RefError::Parse {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
