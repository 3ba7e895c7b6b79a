//! This module defines node identities.
//!
//! Every node in a normalized tree is named, relative to its parent, by a
//! [`PathArgument`]. A sequence of path arguments from the root is an
//! [`InstanceIdentifier`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A qualified name: module namespace, optional revision and local name.
///
/// The strings are reference-counted so that cloning a `QName` (which happens
/// a lot, since every node identity carries one) doesn't allocate.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    namespace: Arc<str>,
    revision: Option<Arc<str>>,
    local_name: Arc<str>,
}

impl QName {
    /// Create a qualified name without a revision.
    pub fn new(namespace: &str, local_name: &str) -> QName {
        QName {
            namespace: namespace.into(),
            revision: None,
            local_name: local_name.into(),
        }
    }

    /// Create a qualified name bound to a module revision.
    pub fn with_revision(namespace: &str, revision: &str, local_name: &str) -> QName {
        QName {
            namespace: namespace.into(),
            revision: Some(revision.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a name in the same module as `self`.
    pub fn with_local(&self, local_name: &str) -> QName {
        QName {
            namespace: self.namespace.clone(),
            revision: self.revision.clone(),
            local_name: local_name.into(),
        }
    }

    /// The namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The module revision, if known.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// The local part of the name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "({}?revision={}){}", self.namespace, rev, self.local_name),
            None => write!(f, "({}){}", self.namespace, self.local_name),
        }
    }
}

// Debug output is the same as Display; the full struct dump is unreadable
// inside nested trees.
impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The key values that identify one entry of a keyed list.
///
/// Iteration order is significant: two predicate sets holding the same pairs
/// in a different order are different identities. Use
/// [`normalize::canonical_predicates`](crate::normalize::canonical_predicates)
/// to put a set into a list's declared key order.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Predicates(Vec<(QName, Value)>);

impl Predicates {
    /// An empty predicate set.
    pub fn new() -> Predicates {
        Predicates(Vec::new())
    }

    /// A predicate set with a single key.
    pub fn single(key: QName, value: Value) -> Predicates {
        Predicates(vec![(key, value)])
    }

    /// Add a key, or replace the value of a key that is already present.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: QName, value: Value) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up the value recorded for a key.
    pub fn get(&self, key: &QName) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` has a predicate.
    pub fn contains_key(&self, key: &QName) -> bool {
        self.get(key).is_some()
    }

    /// Key names, in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &QName> {
        self.0.iter().map(|(k, _)| k)
    }

    /// `(key, value)` pairs, in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &Value)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// The number of predicates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::iter::FromIterator<(QName, Value)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (QName, Value)>>(iter: I) -> Self {
        let mut preds = Predicates::new();
        for (k, v) in iter {
            preds.insert(k, v);
        }
        preds
    }
}

impl fmt::Display for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter().map(|(k, v)| (k, v))).finish()
    }
}

/// The identity of one node relative to its parent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathArgument {
    /// A singleton child: leaf, container, choice, list or leaf-list wrapper.
    Node(QName),
    /// One entry of a keyed list, identified by its key values.
    NodeWithPredicates(QName, Predicates),
    /// One entry of a leaf-list; the identity is the value.
    NodeWithValue(QName, Value),
    /// The synthetic wrapper around the children contributed by one
    /// augmentation. It has no name of its own.
    AugmentationId(BTreeSet<QName>),
}

impl PathArgument {
    /// Shortcut for `PathArgument::Node`.
    pub fn node(qname: QName) -> PathArgument {
        PathArgument::Node(qname)
    }

    /// Shortcut for a single-key `PathArgument::NodeWithPredicates`.
    pub fn with_key<V: Into<Value>>(qname: QName, key: QName, value: V) -> PathArgument {
        PathArgument::NodeWithPredicates(qname, Predicates::single(key, value.into()))
    }

    /// Shortcut for `PathArgument::NodeWithPredicates`.
    pub fn with_predicates(qname: QName, predicates: Predicates) -> PathArgument {
        PathArgument::NodeWithPredicates(qname, predicates)
    }

    /// Shortcut for `PathArgument::NodeWithValue`.
    pub fn with_value<V: Into<Value>>(qname: QName, value: V) -> PathArgument {
        PathArgument::NodeWithValue(qname, value.into())
    }

    /// Shortcut for `PathArgument::AugmentationId`.
    pub fn augmentation<I: IntoIterator<Item = QName>>(children: I) -> PathArgument {
        PathArgument::AugmentationId(children.into_iter().collect())
    }

    /// The node's qualified name; augmentation wrappers don't have one.
    pub fn node_type(&self) -> Option<&QName> {
        match self {
            PathArgument::Node(q) => Some(q),
            PathArgument::NodeWithPredicates(q, _) => Some(q),
            PathArgument::NodeWithValue(q, _) => Some(q),
            PathArgument::AugmentationId(_) => None,
        }
    }

    /// The key values, if this identifies a keyed list entry.
    pub fn predicates(&self) -> Option<&Predicates> {
        match self {
            PathArgument::NodeWithPredicates(_, p) => Some(p),
            _ => None,
        }
    }

    /// A short name for the variant, for error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            PathArgument::Node(_) => "node identifier",
            PathArgument::NodeWithPredicates(..) => "node identifier with predicates",
            PathArgument::NodeWithValue(..) => "node identifier with value",
            PathArgument::AugmentationId(_) => "augmentation identifier",
        }
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathArgument::Node(q) => write!(f, "{}", q),
            PathArgument::NodeWithPredicates(q, p) => write!(f, "{}[{}]", q, p),
            PathArgument::NodeWithValue(q, v) => write!(f, "{}[{}]", q, v),
            PathArgument::AugmentationId(set) => {
                write!(f, "AugmentationIdentifier{{childNames=[")?;
                for (i, q) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", q)?;
                }
                write!(f, "]}}")
            }
        }
    }
}

impl From<QName> for PathArgument {
    fn from(q: QName) -> PathArgument {
        PathArgument::Node(q)
    }
}

/// A path of node identities from the root of a data tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InstanceIdentifier(Vec<PathArgument>);

impl InstanceIdentifier {
    /// The empty path, which names the root.
    pub fn root() -> InstanceIdentifier {
        InstanceIdentifier(Vec::new())
    }

    /// Extend this path by one segment.
    pub fn child<A: Into<PathArgument>>(&self, arg: A) -> InstanceIdentifier {
        let mut path = self.0.clone();
        path.push(arg.into());
        InstanceIdentifier(path)
    }

    /// The path without its last segment; `None` at the root.
    pub fn parent(&self) -> Option<InstanceIdentifier> {
        match self.0.split_last() {
            Some((_, rest)) => Some(InstanceIdentifier(rest.to_vec())),
            None => None,
        }
    }

    /// The last segment; `None` at the root.
    pub fn last(&self) -> Option<&PathArgument> {
        self.0.last()
    }

    /// True for the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments, from the root down.
    pub fn path_arguments(&self) -> &[PathArgument] {
        &self.0
    }
}

impl From<Vec<PathArgument>> for InstanceIdentifier {
    fn from(path: Vec<PathArgument>) -> InstanceIdentifier {
        InstanceIdentifier(path)
    }
}

impl std::iter::FromIterator<PathArgument> for InstanceIdentifier {
    fn from_iter<I: IntoIterator<Item = PathArgument>>(iter: I) -> Self {
        InstanceIdentifier(iter.into_iter().collect())
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for arg in &self.0 {
            write!(f, "/{}", arg)?;
        }
        Ok(())
    }
}

#[test]
fn test_qname_display() {
    let q = QName::new("urn:foo", "bar");
    assert_eq!(q.to_string(), "(urn:foo)bar");
    let q = QName::with_revision("urn:foo", "2020-01-01", "bar");
    assert_eq!(q.to_string(), "(urn:foo?revision=2020-01-01)bar");
    assert_eq!(q.with_local("baz").revision(), Some("2020-01-01"));
}

#[test]
fn test_predicates_order_is_significant() {
    let q = QName::new("urn:foo", "list");
    let a = q.with_local("a");
    let b = q.with_local("b");

    let ab: Predicates = vec![(a.clone(), Value::from(1u8)), (b.clone(), Value::from(2u8))]
        .into_iter()
        .collect();
    let ba: Predicates = vec![(b.clone(), Value::from(2u8)), (a.clone(), Value::from(1u8))]
        .into_iter()
        .collect();
    assert_ne!(ab, ba);
    assert_eq!(ab.get(&b), ba.get(&b));

    let mut replaced = ab.clone();
    replaced.insert(a.clone(), Value::from(9u8));
    assert_eq!(replaced.keys().next(), Some(&a));
    assert_eq!(replaced.get(&a), Some(&Value::from(9u8)));
}

#[test]
fn test_instance_identifier() {
    let q = QName::new("urn:foo", "top");
    let path = InstanceIdentifier::root()
        .child(q.clone())
        .child(PathArgument::with_key(q.with_local("item"), q.with_local("id"), 5u8));
    assert_eq!(path.len(), 2);
    assert_eq!(
        path.to_string(),
        "/(urn:foo)top/(urn:foo)item[{(urn:foo)id=5}]"
    );
    assert_eq!(path.parent().and_then(|p| p.last().cloned()), Some(PathArgument::Node(q)));
    assert!(InstanceIdentifier::root().parent().is_none());
}
