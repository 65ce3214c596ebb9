//! Reachability traversal: the closure of objects to transmit.

use std::collections::HashSet;

use gitd_hash::ObjectId;
use gitd_object::ObjectType;
use gitd_odb::{ObjectStore, OdbError};

use crate::ProtocolError;

/// Compute the set of objects reachable from `wants`, minus everything
/// reachable from `haves`.
///
/// The haves are first expanded to their full closure — declaring a commit
/// had means its trees and blobs are had too, so a reused subtree is never
/// resent. A have the store does not know is ignored (clients may report
/// history the server never saw). The wants walk is a superset walker:
/// nothing is pruned when an ancestor is had, filtering is purely on
/// result membership. A want that cannot be read is fatal; tag objects are
/// not supported anywhere in the walk.
pub fn reachable(
    store: &ObjectStore,
    wants: &HashSet<ObjectId>,
    haves: &HashSet<ObjectId>,
) -> Result<HashSet<ObjectId>, ProtocolError> {
    let excluded = expand_haves(store, haves)?;

    let mut result = HashSet::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<ObjectId> = wants.iter().copied().collect();

    while let Some(oid) = stack.pop() {
        if !excluded.contains(&oid) {
            result.insert(oid);
        }
        if !visited.insert(oid) {
            continue;
        }

        let obj = store.read(&oid)?;
        match obj.obj_type {
            ObjectType::Commit => {
                let info = obj.commit_info()?;
                if let Some(tree) = info.tree {
                    stack.push(tree);
                }
                stack.extend(info.parents);
            }
            ObjectType::Tree => {
                for entry in obj.tree_entries()? {
                    if !excluded.contains(&entry.oid) {
                        result.insert(entry.oid);
                    }
                    if entry.is_tree() {
                        stack.push(entry.oid);
                    }
                }
            }
            ObjectType::Blob => {}
            ObjectType::Tag => return Err(ProtocolError::UnsupportedTag(oid)),
        }
    }

    Ok(result)
}

/// Everything reachable from the declared haves.
fn expand_haves(
    store: &ObjectStore,
    haves: &HashSet<ObjectId>,
) -> Result<HashSet<ObjectId>, ProtocolError> {
    let mut excluded = HashSet::new();
    let mut stack: Vec<ObjectId> = haves.iter().copied().collect();

    while let Some(oid) = stack.pop() {
        if !excluded.insert(oid) {
            continue;
        }

        let obj = match store.read(&oid) {
            Ok(obj) => obj,
            Err(OdbError::NotFound(_)) => continue,
            Err(e) => return Err(e.into()),
        };
        match obj.obj_type {
            ObjectType::Commit => {
                let info = obj.commit_info()?;
                if let Some(tree) = info.tree {
                    stack.push(tree);
                }
                stack.extend(info.parents);
            }
            ObjectType::Tree => {
                for entry in obj.tree_entries()? {
                    if entry.is_tree() {
                        stack.push(entry.oid);
                    } else {
                        excluded.insert(entry.oid);
                    }
                }
            }
            ObjectType::Blob => {}
            ObjectType::Tag => return Err(ProtocolError::UnsupportedTag(oid)),
        }
    }

    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gitd_fs::MemoryFs;

    use super::*;

    fn store() -> ObjectStore {
        ObjectStore::new(Arc::new(MemoryFs::new()))
    }

    fn write_blob(store: &ObjectStore, content: &[u8]) -> ObjectId {
        store.write(ObjectType::Blob, content).unwrap()
    }

    fn write_tree(store: &ObjectStore, entries: &[(&str, &str, ObjectId)]) -> ObjectId {
        let mut data = Vec::new();
        for (mode, name, oid) in entries {
            data.extend_from_slice(mode.as_bytes());
            data.push(b' ');
            data.extend_from_slice(name.as_bytes());
            data.push(0);
            data.extend_from_slice(oid.as_bytes());
        }
        store.write(ObjectType::Tree, &data).unwrap()
    }

    fn write_commit(store: &ObjectStore, tree: ObjectId, parents: &[ObjectId]) -> ObjectId {
        let mut data = format!("tree {tree}\n");
        for p in parents {
            data.push_str(&format!("parent {p}\n"));
        }
        data.push_str("\ncommit message\n");
        store.write(ObjectType::Commit, data.as_bytes()).unwrap()
    }

    fn set(oids: &[ObjectId]) -> HashSet<ObjectId> {
        oids.iter().copied().collect()
    }

    #[test]
    fn single_commit_closure() {
        let store = store();
        let blob = write_blob(&store, b"hi\n");
        let tree = write_tree(&store, &[("100644", "hi.txt", blob)]);
        let commit = write_commit(&store, tree, &[]);

        let result = reachable(&store, &set(&[commit]), &HashSet::new()).unwrap();
        assert_eq!(result, set(&[commit, tree, blob]));
    }

    #[test]
    fn nested_trees_are_walked() {
        let store = store();
        let blob = write_blob(&store, b"deep");
        let sub = write_tree(&store, &[("100644", "file", blob)]);
        let root = write_tree(&store, &[("40000", "dir", sub)]);
        let commit = write_commit(&store, root, &[]);

        let result = reachable(&store, &set(&[commit]), &HashSet::new()).unwrap();
        assert_eq!(result, set(&[commit, root, sub, blob]));
    }

    #[test]
    fn parents_are_walked() {
        let store = store();
        let blob = write_blob(&store, b"v1");
        let tree = write_tree(&store, &[("100644", "f", blob)]);
        let c1 = write_commit(&store, tree, &[]);
        let c2 = write_commit(&store, tree, &[c1]);

        let result = reachable(&store, &set(&[c2]), &HashSet::new()).unwrap();
        assert_eq!(result, set(&[c2, c1, tree, blob]));
    }

    #[test]
    fn had_commit_excludes_its_whole_closure() {
        let store = store();
        let shared_blob = write_blob(&store, b"shared");
        let t1 = write_tree(&store, &[("100644", "shared", shared_blob)]);
        let c1 = write_commit(&store, t1, &[]);

        let new_blob = write_blob(&store, b"new file");
        let t2 = write_tree(
            &store,
            &[("100644", "shared", shared_blob), ("100644", "new", new_blob)],
        );
        let c2 = write_commit(&store, t2, &[c1]);

        // Having c1 means having t1 and the shared blob; only the new
        // commit, its tree, and the genuinely new blob go out.
        let result = reachable(&store, &set(&[c2]), &set(&[c1])).unwrap();
        assert_eq!(result, set(&[c2, t2, new_blob]));
    }

    #[test]
    fn reused_tree_is_not_resent() {
        let store = store();
        let blob = write_blob(&store, b"unchanged");
        let t1 = write_tree(&store, &[("100644", "f", blob)]);
        let c1 = write_commit(&store, t1, &[]);
        // An amend that reuses the tree wholesale.
        let c2 = write_commit(&store, t1, &[c1]);

        let result = reachable(&store, &set(&[c2]), &set(&[c1])).unwrap();
        assert_eq!(result, set(&[c2]));
    }

    #[test]
    fn unknown_haves_are_ignored() {
        let store = store();
        let blob = write_blob(&store, b"data");
        let tree = write_tree(&store, &[("100644", "f", blob)]);
        let commit = write_commit(&store, tree, &[]);

        let ghost = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let result = reachable(&store, &set(&[commit]), &set(&[ghost])).unwrap();
        assert_eq!(result, set(&[commit, tree, blob]));
    }

    #[test]
    fn monotone_in_haves() {
        let store = store();
        let blob = write_blob(&store, b"data");
        let tree = write_tree(&store, &[("100644", "f", blob)]);
        let c1 = write_commit(&store, tree, &[]);
        let c2 = write_commit(&store, tree, &[c1]);

        let all = reachable(&store, &set(&[c2]), &HashSet::new()).unwrap();
        let fewer = reachable(&store, &set(&[c2]), &set(&[c1])).unwrap();
        assert!(fewer.is_subset(&all));
        assert!(!fewer.contains(&c1));
    }

    #[test]
    fn want_of_a_bare_blob() {
        let store = store();
        let blob = write_blob(&store, b"just me");
        let result = reachable(&store, &set(&[blob]), &HashSet::new()).unwrap();
        assert_eq!(result, set(&[blob]));
    }

    #[test]
    fn want_already_had_yields_nothing() {
        let store = store();
        let blob = write_blob(&store, b"had");
        let tree = write_tree(&store, &[("100644", "f", blob)]);
        let commit = write_commit(&store, tree, &[]);

        let result = reachable(&store, &set(&[commit]), &set(&[commit])).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn missing_want_is_fatal() {
        let store = store();
        let ghost = ObjectId::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let err = reachable(&store, &set(&[ghost]), &HashSet::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::Odb(OdbError::NotFound(_))));
    }

    #[test]
    fn tag_objects_are_rejected() {
        let store = store();
        let tag = store
            .write(
                ObjectType::Tag,
                b"object aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\ntype commit\n",
            )
            .unwrap();
        let err = reachable(&store, &set(&[tag]), &HashSet::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedTag(oid) if oid == tag));
    }

    #[test]
    fn diamond_history_visits_once() {
        let store = store();
        let blob = write_blob(&store, b"base");
        let tree = write_tree(&store, &[("100644", "f", blob)]);
        let root = write_commit(&store, tree, &[]);
        let left = write_commit(&store, tree, &[root]);
        let right = write_commit(&store, tree, &[root]);
        let merge = write_commit(&store, tree, &[left, right]);

        let result = reachable(&store, &set(&[merge]), &HashSet::new()).unwrap();
        assert_eq!(result, set(&[merge, left, right, root, tree, blob]));
    }
}
