use gitd_fs::FsError;
use gitd_hash::ObjectId;
use gitd_object::Object;

use crate::{zlib, ObjectStore, OdbError};

impl ObjectStore {
    /// Read a loose object by OID.
    ///
    /// The decompressed content is `"<type> <size>\0" || payload`; the
    /// declared size must match the payload exactly. Commit metadata and
    /// tree entries are parsed lazily from the returned object.
    pub fn read(&self, oid: &ObjectId) -> Result<Object, OdbError> {
        let compressed = match self.fs().read_file(&Self::object_path(oid)) {
            Ok(data) => data,
            Err(FsError::NotFound(_)) => return Err(OdbError::NotFound(*oid)),
            Err(e) => return Err(e.into()),
        };

        let raw = zlib::decompress(&compressed).map_err(|e| OdbError::Corrupt {
            oid: *oid,
            reason: e.to_string(),
        })?;

        Ok(Object::from_raw(*oid, &raw)?)
    }
}
