use gitd_hash::{Hasher, ObjectId};
use gitd_object::{header, ObjectType};

use crate::{zlib, ObjectStore, OdbError};

impl ObjectStore {
    /// Write an object payload to the store. Returns the OID.
    ///
    /// No-op success if the object already exists (content-addressed
    /// idempotency). Atomicity of the file write is the filesystem
    /// collaborator's create-and-rename strategy.
    pub fn write(&self, obj_type: ObjectType, data: &[u8]) -> Result<ObjectId, OdbError> {
        let hdr = header::write_header(obj_type, data.len());

        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(data);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let mut raw = hdr;
        raw.extend_from_slice(data);
        let compressed = zlib::compress(&raw, self.compression);

        self.fs()
            .write_file(&Self::object_path(&oid), &compressed)?;
        Ok(oid)
    }
}
