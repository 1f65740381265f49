use std::sync::Arc;

use rowview_common::error::ErrorKind;
use rowview_position_map::PositionMap;
use rowview_source::{RowSource, SourceId};
use rowview_testkit::{
    data_gen::{random_arrangement, random_permutation},
    fixtures::{ID_COLUMN, VALUE_COLUMN, names_table, numbered_table, share},
};

use super::{isolated_factory, read_strings};
use crate::{CursorOptions, VirtualCursor};

fn read_ids(cursor: &VirtualCursor) -> Vec<i64> {
    let mut ids = Vec::new();
    let mut more = cursor.move_to_first();
    while more {
        ids.push(cursor.get_long(ID_COLUMN).unwrap());
        more = cursor.move_to_next();
    }
    ids
}

#[test]
fn test_identity_law() {
    let (_, source) = share(numbered_table(6));
    let factory = isolated_factory();
    let cursor = factory.identity(Some(source)).unwrap();
    assert!(cursor.is_identity_filter());
    assert_eq!(read_ids(&cursor), vec![0, 1, 2, 3, 4, 5]);

    cursor.refilter(&[5, 4, 3]).unwrap();
    assert!(!cursor.is_identity_filter());
    assert_eq!(read_ids(&cursor), vec![5, 4, 3]);

    cursor.reset_to_identity_filter();
    assert!(cursor.is_identity_filter());
    assert_eq!(cursor.position(), -1);
    assert_eq!(read_ids(&cursor), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_identity_filter_requires_matching_count() {
    let (_, source) = share(numbered_table(3));
    let factory = isolated_factory();
    let cursor = factory
        .from_map(Some(source), PositionMap::from_positions([0, 1]))
        .unwrap();
    assert!(!cursor.is_identity_filter());
    cursor.reset_to_identity_filter();
    assert_eq!(cursor.filter_map(), vec![0, 1, 2]);
}

#[test]
fn test_refilter_composition() {
    let mut rng = fastrand::Rng::with_seed(7);
    let (typed, source) = share(numbered_table(9));
    let factory = isolated_factory();
    // Keeps the source open while the per-iteration cursors come and go.
    let anchor = factory.identity(Some(source.clone())).unwrap();

    for _ in 0..100 {
        let stepwise = factory.identity(Some(source.clone())).unwrap();
        let direct = factory.identity(Some(source.clone())).unwrap();

        let first_len = rng.usize(1..12);
        let second_len = rng.usize(0..12);
        let first = random_arrangement(&mut rng, 9, first_len);
        let second = random_arrangement(&mut rng, first.len(), second_len);
        let composed: Vec<usize> = second.iter().map(|&i| first[i]).collect();

        stepwise.refilter(&first).unwrap();
        stepwise.refilter(&second).unwrap();
        direct.refilter(&composed).unwrap();
        assert_eq!(stepwise.filter_map(), direct.filter_map());
        assert_eq!(read_ids(&stepwise), read_ids(&direct));
    }

    assert!(!typed.is_closed());
    drop(anchor);
    assert_eq!(typed.close_calls(), 1);
}

#[test]
fn test_refilter_permutation_then_inverse() {
    let mut rng = fastrand::Rng::with_seed(11);
    let (_, source) = share(numbered_table(16));
    let cursor = isolated_factory().identity(Some(source)).unwrap();

    let permutation = random_permutation(&mut rng, 16);
    let mut inverse = vec![0; 16];
    for (i, &p) in permutation.iter().enumerate() {
        inverse[p] = i;
    }
    cursor.refilter(&permutation).unwrap();
    cursor.refilter(&inverse).unwrap();
    assert!(cursor.is_identity_filter());
}

#[test]
fn test_refilter_resets_position_and_rejects_bad_indices() {
    let (_, source) = share(numbered_table(4));
    let cursor = isolated_factory().identity(Some(source)).unwrap();
    assert!(cursor.move_to_position(2));

    let err = cursor.refilter(&[0, 4]).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::IndexOutOfRange { index: 4, len: 4 }
    ));
    assert_eq!(cursor.position(), 2);
    assert!(cursor.is_identity_filter());

    cursor.refilter(&[3, 3, 1]).unwrap();
    assert_eq!(cursor.position(), -1);
    assert!(cursor.is_before_first());
    assert_eq!(cursor.filter_map(), vec![3, 3, 1]);
}

#[test]
fn test_swap_keeps_position() {
    let (_, source) = share(numbered_table(3));
    let cursor = isolated_factory().identity(Some(source)).unwrap();
    assert!(cursor.move_to_position(2));

    cursor.swap_items(0, 1).unwrap();
    assert_eq!(cursor.filter_map(), vec![1, 0, 2]);
    assert_eq!(cursor.position(), 2);

    let err = cursor.swap_items(3, 0).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IndexOutOfRange { .. }));
    assert_eq!(cursor.filter_map(), vec![1, 0, 2]);

    cursor.refilter(&[0, 1, 2]).unwrap();
    assert_eq!(cursor.position(), -1);
}

#[test]
fn test_empty_cursor_boundaries() {
    let (_, source) = share(numbered_table(3));
    let cursor = isolated_factory()
        .from_map(Some(source), PositionMap::new())
        .unwrap();
    assert_eq!(cursor.count(), 0);
    assert!(cursor.is_before_first());
    assert!(cursor.is_after_last());
    assert!(!cursor.is_first());
    assert!(!cursor.is_last());

    assert!(!cursor.move_to_position(0));
    assert_eq!(cursor.position(), 0);
    assert!(!cursor.move_to_first());
    assert!(!cursor.move_to_last());
    assert_eq!(cursor.position(), -1);

    let err = cursor.is_empty_row().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::PositionOutOfRange { .. }));
}

#[test]
fn test_navigation_primitives() {
    let (_, source) = share(numbered_table(5));
    let cursor = isolated_factory()
        .from_map(Some(source), PositionMap::from_positions([4, 2, 0]))
        .unwrap();
    assert_eq!(cursor.position(), -1);
    assert!(cursor.is_before_first());

    assert!(cursor.move_to_last());
    assert!(cursor.is_last());
    assert_eq!(cursor.get_long(ID_COLUMN).unwrap(), 0);

    assert!(cursor.move_by(-2));
    assert!(cursor.is_first());
    assert_eq!(cursor.get_long(VALUE_COLUMN).unwrap(), 40);

    assert!(!cursor.move_to_previous());
    assert_eq!(cursor.position(), -1);

    assert!(!cursor.move_to_position(10));
    assert_eq!(cursor.position(), 3);
    assert!(cursor.is_after_last());

    assert!(cursor.move_to_previous());
    assert_eq!(cursor.position(), 2);
    assert!(cursor.move_by(-1));
    assert_eq!(cursor.get_int(ID_COLUMN).unwrap(), 2);
}

#[test]
fn test_empty_rows_are_navigable_but_unreadable() {
    let (typed, source) = share(numbered_table(3));
    let cursor = isolated_factory()
        .from_map(Some(source), PositionMap::from_signed(&[1, -1, 0]))
        .unwrap();
    assert_eq!(cursor.filter_map(), vec![1, -1, 0]);

    assert!(cursor.move_to_first());
    assert!(!cursor.is_empty_row().unwrap());
    let seeks = typed.seeks();

    assert!(cursor.move_to_next());
    assert_eq!(cursor.position(), 1);
    assert_eq!(typed.seeks(), seeks);
    assert!(cursor.is_empty_row().unwrap());

    assert!(cursor.get_long(ID_COLUMN).unwrap_err().is_empty_row());
    assert!(cursor.get_string(ID_COLUMN).unwrap_err().is_empty_row());
    assert!(cursor.is_null(ID_COLUMN).unwrap_err().is_empty_row());
    assert!(cursor.get_blob(ID_COLUMN).unwrap_err().is_empty_row());
    assert!(cursor.get_double(ID_COLUMN).unwrap_err().is_empty_row());
    let mut buffer = String::new();
    assert!(
        cursor
            .copy_string_to_buffer(ID_COLUMN, &mut buffer)
            .unwrap_err()
            .is_empty_row()
    );

    // Metadata does not depend on the current row.
    assert_eq!(cursor.column_index("value"), Some(VALUE_COLUMN));
    assert_eq!(cursor.column_names(), vec!["_id", "value"]);

    assert!(cursor.move_to_next());
    assert_eq!(cursor.get_short(ID_COLUMN).unwrap(), 0);
}

#[test]
fn test_unreachable_position_resets_to_before_first() {
    let (_, source) = share(numbered_table(2));
    let cursor = isolated_factory()
        .from_map(Some(source), PositionMap::from_positions([1, 99]))
        .unwrap();
    assert!(cursor.move_to_first());
    assert!(!cursor.move_to_next());
    assert_eq!(cursor.position(), -1);
}

#[test]
fn test_requery_is_unsupported() {
    let (_, source) = share(numbered_table(1));
    let cursor = isolated_factory().identity(Some(source)).unwrap();
    let err = cursor.requery().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnsupportedOperation { .. }));
}

#[test]
fn test_chained_cursors() {
    let (_, source) = share(names_table());
    let factory = isolated_factory();

    let filtered = factory
        .from_selector(Some(source.clone()), |row| {
            Ok(row.get_string(VALUE_COLUMN)?.as_deref() != Some("Beta"))
        })
        .unwrap()
        .unwrap();
    filtered.swap_items(0, 1).unwrap();
    assert_eq!(filtered.filter_map(), vec![2, 0]);

    let filtered: Arc<dyn RowSource> = Arc::new(filtered);
    let repeated = factory
        .from_map(Some(filtered.clone()), vec![0u64, 1, 0, 1, 0, 1])
        .unwrap();
    assert_eq!(repeated.count(), 6);
    assert_eq!(
        read_strings(&repeated, VALUE_COLUMN),
        ["Omega", "Alpha", "Omega", "Alpha", "Omega", "Alpha"]
            .map(|name| Some(name.to_string()))
    );

    assert_eq!(SourceId::of(&repeated.root_source()), SourceId::of(&source));
    assert_eq!(
        SourceId::of(repeated.wrapped_source()),
        SourceId::of(&filtered)
    );
    assert_eq!(factory.registry().wrapper_count(&source), 2);
}

#[test]
fn test_sibling_cursors_resync_source() {
    let (_, source) = share(numbered_table(4));
    let factory = isolated_factory();
    let forward = factory.identity(Some(source.clone())).unwrap();
    let backward = factory
        .from_map(Some(source), PositionMap::from_positions([3, 2, 1, 0]))
        .unwrap();

    assert!(forward.move_to_first());
    assert!(backward.move_to_first());
    assert_eq!(forward.get_long(ID_COLUMN).unwrap(), 0);
    assert_eq!(backward.get_long(ID_COLUMN).unwrap(), 3);
}

#[test]
fn test_sibling_cursors_without_resync_share_source_row() {
    let (_, source) = share(numbered_table(4));
    let factory = isolated_factory()
        .with_options(CursorOptions::new().with_resync_source_on_read(false));
    let forward = factory.identity(Some(source.clone())).unwrap();
    let backward = factory
        .from_map(Some(source), PositionMap::from_positions([3, 2, 1, 0]))
        .unwrap();

    assert!(forward.move_to_first());
    assert!(backward.move_to_first());
    assert_eq!(forward.get_long(ID_COLUMN).unwrap(), 3);
}

#[test]
fn test_external_root_close_is_observed() {
    let (typed, source) = share(numbered_table(2));
    let cursor = isolated_factory().identity(Some(source)).unwrap();
    assert!(!cursor.is_closed());
    typed.close();
    assert!(cursor.is_closed());
}
