//! Façades over managed collections.

use jbridge::jvm::{names, JObject};
use jbridge::{to_host, to_managed, Hints, HostValue, JavaList, JavaMap, JavaSet};
use pretty_assertions::assert_eq;

fn int(n: i64) -> HostValue {
    HostValue::from(n)
}

fn view(obj: JObject) -> HostValue {
    to_host(&HostValue::Java(obj), false).unwrap()
}

fn list_of(values: Vec<HostValue>) -> JavaList {
    match view(to_managed(&HostValue::list(values), &Hints::new()).unwrap()) {
        HostValue::JavaList(list) => list,
        other => panic!("expected a JavaList, got {}", other),
    }
}

#[test]
fn test_list_set_reflects_through() {
    let list = list_of(vec![int(1), int(2), int(3)]);
    let previous = list.set(1, &HostValue::str("two")).unwrap();
    assert_eq!(previous, int(2));
    assert_eq!(list.get(1).unwrap(), HostValue::str("two"));
    assert_eq!(list.len().unwrap(), 3);
    assert_eq!(list.jobj().size().unwrap(), 3);
    assert!(list.jobj().get(1).unwrap().is_instance_of(names::STRING));
}

#[test]
fn test_list_insert_overwrites() {
    let list = list_of(vec![int(1), int(2)]);
    list.insert(0, &int(9)).unwrap();
    assert_eq!(list.len().unwrap(), 2);
    assert_eq!(list.to_vec().unwrap(), vec![int(9), int(2)]);
}

#[test]
fn test_list_push_delete_remove() {
    let list = list_of(vec![int(1)]);
    list.push(&int(2)).unwrap();
    list.push(&int(3)).unwrap();
    assert_eq!(list.delete(0).unwrap(), int(1));
    assert!(list.remove(&int(3)).unwrap());
    assert!(!list.remove(&int(3)).unwrap());
    assert_eq!(list.to_vec().unwrap(), vec![int(2)]);
    assert!(list.contains(&int(2)).unwrap());
    assert!(list.delete(5).unwrap_err().is_jvm_error());
}

#[test]
fn test_list_reads_are_gentle() {
    let raw = JObject::array_list();
    raw.add(JObject::new_object()).unwrap();
    let list = JavaList::new(raw.clone()).unwrap();
    match list.get(0).unwrap() {
        HostValue::Java(obj) => assert_eq!(obj.class_name(), names::OBJECT),
        other => panic!("expected the raw object, got {}", other),
    }
}

#[test]
fn test_list_equality_and_display() {
    let list = list_of(vec![int(1), HostValue::str("a")]);
    let same = HostValue::list(vec![int(1), HostValue::str("a")]);
    assert_eq!(HostValue::JavaList(list.clone()), same);
    assert!(!list.equals(&HostValue::list(vec![int(1)])));
    assert!(!list.equals(&int(1)));
    assert_eq!(list.to_string(), "[1, 'a']");
}

#[test]
fn test_set_add_discard() {
    let set = match view(JObject::linked_hash_set()) {
        HostValue::JavaSet(set) => set,
        other => panic!("expected a JavaSet, got {}", other),
    };
    assert!(set.add(&int(1)).unwrap());
    assert!(!set.add(&int(1)).unwrap());
    assert!(set.add(&int(2)).unwrap());
    assert!(set.discard(&int(1)).unwrap());
    assert!(!set.discard(&int(1)).unwrap());
    assert_eq!(set.len().unwrap(), 1);
    assert!(set.contains(&int(2)).unwrap());
}

#[test]
fn test_set_equality_is_by_membership() {
    let set = JavaSet::new(
        to_managed(&HostValue::set([int(1), int(2), int(3)]), &Hints::new()).unwrap(),
    )
    .unwrap();
    assert!(set.equals(&HostValue::set([int(3), int(2), int(1)])));
    assert!(!set.equals(&HostValue::set([int(1), int(2)])));
    assert!(!set.equals(&HostValue::None));
}

#[test]
fn test_map_operations() {
    let map = JavaMap::new(JObject::linked_hash_map()).unwrap();
    assert!(map.set(&HostValue::str("a"), &int(1)).unwrap().is_none());
    assert_eq!(map.set(&HostValue::str("a"), &int(2)).unwrap(), int(1));
    map.set(&HostValue::str("b"), &HostValue::Bool(true)).unwrap();

    assert_eq!(map.len().unwrap(), 2);
    assert_eq!(map.get(&HostValue::str("a")).unwrap(), int(2));
    assert!(map.get(&HostValue::str("zzz")).unwrap().is_none());
    assert!(map.contains_key(&HostValue::str("b")).unwrap());

    let keys = map.keys().unwrap();
    assert_eq!(keys.to_vec().unwrap(), vec![HostValue::str("a"), HostValue::str("b")]);
    assert_eq!(map.values().unwrap(), vec![int(2), HostValue::Bool(true)]);
    assert_eq!(map.to_string(), "{'a': 2, 'b': True}");

    assert_eq!(map.delete(&HostValue::str("a")).unwrap(), int(2));
    assert_eq!(map.len().unwrap(), 1);
}

#[test]
fn test_map_equality_never_fails() {
    let map = JavaMap::new(
        to_managed(
            &HostValue::dict([(HostValue::str("k"), int(1))]),
            &Hints::new(),
        )
        .unwrap(),
    )
    .unwrap();
    assert!(map.equals(&HostValue::dict([(HostValue::str("k"), int(1))])));
    assert!(!map.equals(&HostValue::dict([(HostValue::str("k"), int(2))])));
    assert!(!map.equals(&int(7)));
    assert!(!map.equals(&HostValue::list(vec![HostValue::str("k")])));
}

#[test]
fn test_collection_and_iterator_views() {
    let deque = JObject::array_deque();
    deque.add(JObject::integer(4)).unwrap();
    deque.add(JObject::integer(5)).unwrap();

    let collection = match view(deque.clone()) {
        HostValue::JavaCollection(c) => c,
        other => panic!("expected a JavaCollection, got {}", other),
    };
    assert_eq!(collection.len().unwrap(), 2);
    assert!(collection.contains(&int(5)).unwrap());
    assert!(collection.equals(&HostValue::list(vec![int(4), int(5)])));

    let iterator = match view(deque.iterator().unwrap()) {
        HostValue::JavaIterator(it) => it,
        other => panic!("expected a JavaIterator, got {}", other),
    };
    let values: Vec<HostValue> = iterator.clone().collect::<Result<_, _>>().unwrap();
    assert_eq!(values, vec![int(4), int(5)]);
    assert!(iterator.next_value().unwrap().is_none());
}

#[test]
fn test_facades_unwrap_when_sent_back() {
    let raw = JObject::array_list();
    let list = JavaList::new(raw.clone()).unwrap();
    let back = to_managed(&HostValue::JavaList(list), &Hints::new()).unwrap();
    assert!(back.same_object(&raw));
}

#[test]
fn test_facade_requires_interface() {
    let err = JavaMap::new(JObject::array_list()).unwrap_err();
    assert!(err.is_type_error());
}
