//! This module puts list-entry key predicates into canonical order.
//!
//! Two identities for the same list entry must compare equal, and predicate
//! comparison is order-sensitive, so predicates built from user input are
//! rewritten into the list's declared key order before use.

use log::{debug, warn};

use crate::path::{Predicates, QName};

/// Reorder `predicates` to follow `keys`, the list's declared key order.
///
/// This is deliberately lenient. Declared keys missing from the predicates
/// are skipped (with a warning), and predicates that name no declared key are
/// kept after the declared ones.
pub fn canonical_predicates(keys: &[QName], predicates: &Predicates) -> Predicates {
    if predicates.keys().eq(keys.iter()) {
        return predicates.clone();
    }

    let mut canonical = Predicates::new();
    for key in keys {
        match predicates.get(key) {
            Some(value) => canonical.insert(key.clone(), value.clone()),
            None => warn!("key predicates {} are missing declared key {}", predicates, key),
        }
    }
    for (key, value) in predicates.iter() {
        if !keys.contains(key) {
            debug!("keeping undeclared key predicate {}={}", key, value);
            canonical.insert(key.clone(), value.clone());
        }
    }
    canonical
}

#[test]
fn test_canonical_order() {
    use crate::value::Value;

    let q = QName::new("urn:example:keys", "l");
    let (a, b, c) = (q.with_local("a"), q.with_local("b"), q.with_local("c"));
    let keys = vec![a.clone(), b.clone()];

    let reversed: Predicates = vec![(b.clone(), Value::from(2u8)), (a.clone(), Value::from(1u8))]
        .into_iter()
        .collect();
    let canonical = canonical_predicates(&keys, &reversed);
    assert_eq!(canonical.keys().cloned().collect::<Vec<_>>(), keys);

    // Already canonical input comes back unchanged.
    assert_eq!(canonical_predicates(&keys, &canonical), canonical);

    // Missing keys are skipped; extra predicates go last.
    let partial: Predicates = vec![(c.clone(), Value::from(3u8)), (b.clone(), Value::from(2u8))]
        .into_iter()
        .collect();
    let merged = canonical_predicates(&keys, &partial);
    assert_eq!(merged.keys().cloned().collect::<Vec<_>>(), vec![b, c]);
}
