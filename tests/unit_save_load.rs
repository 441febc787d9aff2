//! Save/load tests for the on-disk format.

use std::fs;

use ribitol_pwuf::{Error, PersistentIndexedArray, PersistentWeightedUnionFind, Relation};
use tempfile::tempdir;

fn words(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn array_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("array.bin");
    let mut a = PersistentIndexedArray::build(2, &[10, 20]).unwrap();
    a.set(0, 1, 30).unwrap();
    a.save(&path).unwrap();

    let w = words(&fs::read(&path).unwrap());
    // N, node count
    assert_eq!(&w[..2], &[2, 5]);
    // leaves use -1 for both children
    assert_eq!(&w[2..5], &[-1, -1, 10]);
    assert_eq!(&w[5..8], &[-1, -1, 20]);
    assert_eq!(&w[8..10], &[0, 1]);
    // the copied path: new leaf, then a new root sharing the old left leaf
    assert_eq!(&w[11..14], &[-1, -1, 30]);
    assert_eq!(&w[14..16], &[0, 3]);
    // version count, roots
    assert_eq!(&w[17..], &[2, 2, 4]);

    let b = PersistentIndexedArray::load(&path).unwrap();
    assert_eq!(b.snapshot(0).unwrap(), vec![10, 20]);
    assert_eq!(b.snapshot(1).unwrap(), vec![10, 30]);
}

#[test]
fn union_find_round_trip() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("uf");
    let mut uf = PersistentWeightedUnionFind::new(5).unwrap();
    let v = uf.union_sets(0, 1, 1, 0).unwrap();
    let v = uf.union_sets(2, 3, 0, v).unwrap();
    let v = uf.union_sets(1, 3, 1, v).unwrap();
    uf.undo().unwrap();
    uf.save(&base).unwrap();

    for ext in ["parent", "weight", "rank", "version"] {
        assert!(dir.path().join(format!("uf.{ext}")).exists());
    }
    let history = words(&fs::read(dir.path().join("uf.version")).unwrap());
    assert_eq!(history, vec![3, 0, 1, 2]);

    let mut loaded = PersistentWeightedUnionFind::load(&base).unwrap();
    assert_eq!(loaded.get_size(), 5);
    assert_eq!(loaded.get_version_count(), 4);
    assert_eq!(loaded.get_current_version(), 2);
    for version in 0..=v {
        for a in 0..5 {
            for b in 0..5 {
                assert_eq!(
                    loaded.relation(a, b, version).unwrap(),
                    uf.relation(a, b, version).unwrap()
                );
            }
        }
    }

    // rank survives, so merges after loading take the same shape
    let x = uf.union_sets(4, 0, 0, v).unwrap();
    let y = loaded.union_sets(4, 0, 0, v).unwrap();
    assert_eq!(x, y);
    assert_eq!(uf.find(4, x).unwrap(), loaded.find(4, y).unwrap());
    assert_eq!(loaded.relation(4, 1, y).unwrap(), Some(Relation::Dominates));
}

#[test]
fn missing_file() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        PersistentIndexedArray::load(dir.path().join("nothing")),
        Err(Error::Io(_))
    ));
    let uf = PersistentWeightedUnionFind::new(3).unwrap();
    let base = dir.path().join("uf");
    uf.save(&base).unwrap();
    fs::remove_file(dir.path().join("uf.rank")).unwrap();
    assert!(matches!(
        PersistentWeightedUnionFind::load(&base),
        Err(Error::Io(_))
    ));
}

#[test]
fn arrays_out_of_step() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("uf");
    let mut uf = PersistentWeightedUnionFind::new(3).unwrap();
    uf.union_sets(0, 1, 0, 0).unwrap();
    uf.save(&base).unwrap();

    // a weight file with one version fewer
    let stale = PersistentIndexedArray::build(3, &[0, 0, 0]).unwrap();
    stale.save(dir.path().join("uf.weight")).unwrap();
    assert!(matches!(
        PersistentWeightedUnionFind::load(&base),
        Err(Error::Format(_))
    ));
}

#[test]
fn bad_history() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("uf");
    PersistentWeightedUnionFind::new(3).unwrap().save(&base).unwrap();

    let bytes = [1i32, 5].iter().flat_map(|w| w.to_ne_bytes()).collect::<Vec<_>>();
    fs::write(dir.path().join("uf.version"), bytes).unwrap();
    assert!(matches!(
        PersistentWeightedUnionFind::load(&base),
        Err(Error::Format(_))
    ));

    // truncated
    fs::write(dir.path().join("uf.version"), 1i32.to_ne_bytes()).unwrap();
    assert!(matches!(
        PersistentWeightedUnionFind::load(&base),
        Err(Error::Format(_))
    ));
}
