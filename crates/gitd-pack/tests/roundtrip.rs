//! Emit → ingest round-trips across stores.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use gitd_fs::MemoryFs;
use gitd_hash::ObjectId;
use gitd_object::ObjectType;
use gitd_odb::ObjectStore;
use gitd_pack::{ingest_pack, write_pack};

fn fresh_store() -> ObjectStore {
    ObjectStore::new(Arc::new(MemoryFs::new()))
}

#[test]
fn many_objects_roundtrip() {
    let source = fresh_store();
    let mut oids = HashSet::new();

    for i in 0..50u32 {
        let payload = format!("blob number {i}\n").repeat((i % 7 + 1) as usize);
        oids.insert(source.write(ObjectType::Blob, payload.as_bytes()).unwrap());
    }
    // A binary payload and an empty one.
    oids.insert(
        source
            .write(ObjectType::Blob, &(0..=255u8).collect::<Vec<_>>())
            .unwrap(),
    );
    oids.insert(source.write(ObjectType::Blob, b"").unwrap());

    let mut pack = Vec::new();
    write_pack(&source, &oids, &mut pack).unwrap();

    let sink = fresh_store();
    let written: HashSet<ObjectId> = ingest_pack(&sink, &mut Cursor::new(pack))
        .unwrap()
        .into_iter()
        .collect();

    assert_eq!(written, oids);
    for oid in &oids {
        let a = source.read(oid).unwrap();
        let b = sink.read(oid).unwrap();
        assert_eq!(a.obj_type, b.obj_type);
        assert_eq!(a.data, b.data);
    }
}

#[test]
fn all_four_types_survive_transfer() {
    let source = fresh_store();
    let mut oids = HashSet::new();

    let blob = source.write(ObjectType::Blob, b"content\n").unwrap();

    let mut tree = Vec::new();
    tree.extend_from_slice(b"100644 file\0");
    tree.extend_from_slice(blob.as_bytes());
    let tree_oid = source.write(ObjectType::Tree, &tree).unwrap();

    let commit = format!("tree {tree_oid}\n\ncommit message\n");
    let commit_oid = source.write(ObjectType::Commit, commit.as_bytes()).unwrap();

    let tag = format!("object {commit_oid}\ntype commit\ntag v1\n\nannotation\n");
    let tag_oid = source.write(ObjectType::Tag, tag.as_bytes()).unwrap();

    oids.extend([blob, tree_oid, commit_oid, tag_oid]);

    let mut pack = Vec::new();
    write_pack(&source, &oids, &mut pack).unwrap();

    let sink = fresh_store();
    ingest_pack(&sink, &mut Cursor::new(pack)).unwrap();

    assert_eq!(sink.read(&blob).unwrap().obj_type, ObjectType::Blob);
    assert_eq!(sink.read(&tree_oid).unwrap().obj_type, ObjectType::Tree);
    assert_eq!(sink.read(&commit_oid).unwrap().obj_type, ObjectType::Commit);
    assert_eq!(sink.read(&tag_oid).unwrap().obj_type, ObjectType::Tag);
}
