//! Pack ingestion: parse a v2 pack stream and persist its objects.

use std::io::{BufRead, Read};

use gitd_hash::ObjectId;
use gitd_object::ObjectType;
use gitd_odb::{zlib, ObjectStore, OdbError};

use crate::{delta, entry, PackError, OFS_DELTA, PACK_SIGNATURE, PACK_VERSION, REF_DELTA};

/// Ingest a packfile from a buffered stream positioned at `"PACK"`.
///
/// Ref-delta entries are resolved against `store`, which must already hold
/// their bases. All resulting objects are written as loose objects; the
/// OIDs are returned in pack order. The trailing pack checksum is neither
/// required nor validated — the stream may end right after the last
/// deflate byte.
pub fn ingest_pack<R: BufRead>(
    store: &ObjectStore,
    reader: &mut R,
) -> Result<Vec<ObjectId>, PackError> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| PackError::BadMagic)?;
    if &magic != PACK_SIGNATURE {
        return Err(PackError::BadMagic);
    }

    let version = read_u32(reader)?;
    if version != PACK_VERSION {
        return Err(PackError::BadVersion(version));
    }
    let count = read_u32(reader)?;
    log::debug!("ingesting pack: version {version}, {count} objects");

    let mut written = Vec::with_capacity(count as usize);

    for index in 0..count {
        let (type_num, size) = entry::read_entry_header(reader, index)?;

        let oid = match type_num {
            OFS_DELTA => return Err(PackError::OfsDeltaUnsupported),
            REF_DELTA => {
                let mut base = [0u8; 20];
                reader.read_exact(&mut base).map_err(|e| truncated(index, e))?;
                let base_oid = ObjectId::from_bytes(&base).expect("20 bytes");

                let raw_delta = zlib::inflate_exact(reader, size as usize)?;
                let base_obj = match store.read(&base_oid) {
                    Ok(obj) => obj,
                    Err(OdbError::NotFound(_)) => return Err(PackError::MissingBase(base_oid)),
                    Err(e) => return Err(e.into()),
                };

                let data = delta::apply(&base_obj.data, &raw_delta)?;
                let oid = store.write(base_obj.obj_type, &data)?;
                log::trace!("resolved {} delta {oid} against {base_oid}", base_obj.obj_type);
                oid
            }
            1..=4 => {
                let obj_type = ObjectType::from_type_number(type_num)?;
                let data = zlib::inflate_exact(reader, size as usize)?;
                let oid = store.write(obj_type, &data)?;
                log::trace!("stored {obj_type} {oid}");
                oid
            }
            other => {
                return Err(PackError::CorruptEntry {
                    index,
                    reason: format!("unknown object type {other}"),
                })
            }
        };
        written.push(oid);
    }

    Ok(written)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, PackError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn truncated(index: u32, source: std::io::Error) -> PackError {
    if source.kind() == std::io::ErrorKind::UnexpectedEof {
        PackError::CorruptEntry {
            index,
            reason: "truncated delta base hash".into(),
        }
    } else {
        PackError::Io(source)
    }
}
