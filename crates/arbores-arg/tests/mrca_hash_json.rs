use arbores_arg::{
    canonical_hash, path_from_json, path_to_json, path_to_json_line, times_to_mrca, LocalTree,
    PathState, SprOp,
};
use arbores_core::ArgError;

fn path_with_root_regraft() -> PathState {
    let tree = LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0]);
    let op = SprOp {
        site: 2,
        node: 3,
        cut_time: 1.0,
        target: 5,
        join_time: 4.0,
    };
    PathState::new(4, tree, vec![op])
}

#[test]
fn mrca_follows_local_roots() {
    let snapshot = times_to_mrca(&path_with_root_regraft()).unwrap();
    assert_eq!(snapshot.intervals.len(), 2);
    assert_eq!(snapshot.intervals[0].tmrca, 2.0);
    assert_eq!(snapshot.intervals[1].tmrca, 4.0);
    assert_eq!(snapshot.per_site, vec![2.0, 2.0, 4.0, 4.0]);
    assert!((snapshot.mean - 3.0).abs() < 1e-12);
}

#[test]
fn hash_tracks_times_and_operations() {
    let path = path_with_root_regraft();
    let same = path_with_root_regraft();
    assert_eq!(canonical_hash(&path), canonical_hash(&same));
    assert_eq!(canonical_hash(&path).len(), 64);

    let mut ops = path.ops().to_vec();
    ops[0].join_time = 3.5;
    assert_ne!(canonical_hash(&path), canonical_hash(&path.with_ops(ops)));
    assert_ne!(canonical_hash(&path), canonical_hash(&path.with_ops(Vec::new())));
}

#[test]
fn json_restores_the_same_path() {
    let path = path_with_root_regraft();
    let pretty = path_to_json(&path).unwrap();
    let line = path_to_json_line(&path).unwrap();
    assert!(!line.contains('\n'));
    assert_eq!(path_from_json(&pretty).unwrap(), path);
    assert_eq!(path_from_json(&line).unwrap(), path);
}

#[test]
fn malformed_json_is_a_path_error() {
    let err = path_from_json("{\"n_sites\": 3").unwrap_err();
    assert!(matches!(err, ArgError::Path(_)));
    assert_eq!(err.info().code, "deserialize-path");
}
