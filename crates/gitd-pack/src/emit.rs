//! Pack emission: stream a v2 packfile for a set of objects.

use std::collections::HashSet;
use std::io::Write;

use flate2::Compression;
use gitd_hash::{Hasher, ObjectId};
use gitd_odb::{zlib, ObjectStore};

use crate::{entry, PackError, PACK_SIGNATURE, PACK_VERSION};

/// Write a packfile containing the given objects, undeltified, in set
/// iteration order.
///
/// Compressed output is streamed; the trailing SHA-1 is maintained
/// incrementally over everything from the first `"PACK"` byte, so the pack
/// is never buffered whole.
pub fn write_pack<W: Write + ?Sized>(
    store: &ObjectStore,
    oids: &HashSet<ObjectId>,
    out: &mut W,
) -> Result<(), PackError> {
    let mut tee = Tee {
        out,
        hasher: Hasher::new(),
    };

    log::debug!("emitting pack with {} objects", oids.len());

    tee.write(PACK_SIGNATURE)?;
    tee.write(&PACK_VERSION.to_be_bytes())?;
    tee.write(&(oids.len() as u32).to_be_bytes())?;

    for oid in oids {
        let obj = store.read(oid)?;
        let header = entry::encode_entry_header(obj.obj_type.type_number(), obj.data.len() as u64);
        tee.write(&header)?;
        tee.write(&zlib::compress(&obj.data, Compression::default()))?;
    }

    let trailer = tee.hasher.finalize();
    tee.out.write_all(trailer.as_bytes())?;
    Ok(())
}

/// Writer that feeds every byte to both the output and the running hash.
struct Tee<'a, W: Write + ?Sized> {
    out: &'a mut W,
    hasher: Hasher,
}

impl<W: Write + ?Sized> Tee<'_, W> {
    fn write(&mut self, data: &[u8]) -> Result<(), PackError> {
        self.out.write_all(data)?;
        self.hasher.update(data);
        Ok(())
    }
}
