use super::*;

#[test]
fn new_store_is_empty() {
    let store: RecordStore<u32> = RecordStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.next_sequential_id(), 1);
}

#[test]
fn append_keeps_order_and_advances_next_id() {
    let mut store = RecordStore::new();
    assert_eq!(*store.append("a"), "a");
    store.append("b");
    assert_eq!(store.records(), &["a", "b"]);
    assert_eq!(store.next_sequential_id(), 3);
}

#[test]
fn clear_requires_confirmation() {
    let mut store = RecordStore::new();
    store.append(1);
    assert_eq!(store.clear(false), ClearOutcome::NotConfirmed);
    assert_eq!(store.len(), 1);
}

#[test]
fn clear_removes_everything() {
    let mut store = RecordStore::new();
    store.append(1);
    store.append(2);
    assert_eq!(store.clear(true), ClearOutcome::Cleared(2));
    assert!(store.is_empty());
    assert_eq!(store.next_sequential_id(), 1);
}

#[test]
fn clear_on_empty_store_is_noop() {
    let mut store: RecordStore<u8> = RecordStore::default();
    assert_eq!(store.clear(true), ClearOutcome::AlreadyEmpty);
}
