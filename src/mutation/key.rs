use std::fmt;

use crate::wire::{self, IdType, PartitionId, PathElement};

/// Datastore-style entity key. A key with neither `id` nor `name` is incomplete; the backend
/// assigns an id on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Key {
    pub kind: String,
    pub id: i64,
    pub name: String,
    pub parent: Option<Box<Key>>,
    pub namespace: String,
}

impl Key {
    fn child(kind: &str, parent: Option<&Self>) -> Self {
        Self {
            kind: kind.to_string(),
            parent: parent.map(|p| Box::new(p.clone())),
            namespace: parent.map(|p| p.namespace.clone()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// A key whose id will be allocated by the backend.
    #[must_use]
    pub fn incomplete(kind: &str, parent: Option<&Self>) -> Self {
        Self::child(kind, parent)
    }

    #[must_use]
    pub fn name_key(kind: &str, name: &str, parent: Option<&Self>) -> Self {
        Self { name: name.to_string(), ..Self::child(kind, parent) }
    }

    #[must_use]
    pub fn id_key(kind: &str, id: i64, parent: Option<&Self>) -> Self {
        Self { id, ..Self::child(kind, parent) }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Self) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.name.is_empty() && self.id == 0
    }

    /// Every level has a kind and at most one of id or name; ancestors are complete and share
    /// the namespace.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let mut cur = self;
        loop {
            if cur.kind.is_empty() || (!cur.name.is_empty() && cur.id != 0) {
                return false;
            }
            match &cur.parent {
                None => return true,
                Some(p) => {
                    if p.is_incomplete() || p.namespace != cur.namespace {
                        return false;
                    }
                    cur = p;
                }
            }
        }
    }

    pub fn to_wire(&self) -> wire::Key {
        let mut path = Vec::new();
        let mut cur = Some(self);
        while let Some(k) = cur {
            let id_type = if !k.name.is_empty() {
                Some(IdType::Name(k.name.clone()))
            } else if k.id != 0 {
                Some(IdType::Id(k.id))
            } else {
                None
            };
            path.push(PathElement { kind: k.kind.clone(), id_type });
            cur = k.parent.as_deref();
        }
        path.reverse();
        wire::Key { partition_id: PartitionId { namespace_id: self.namespace.clone() }, path }
    }
}

/// Canonical form `/Kind,name-or-id` per level, root first. Used to dedup deletes.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.parent {
            write!(f, "{p}")?;
        }
        write!(f, "/{},", self.kind)?;
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_is_parent_first() {
        let p = Key::name_key("Parent", "p1", None);
        let k = Key::id_key("Child", 7, Some(&p));
        assert_eq!(k.to_string(), "/Parent,p1/Child,7");
    }

    #[test]
    fn validity_rules() {
        assert!(Key::name_key("K", "a", None).is_valid());
        assert!(Key::incomplete("K", None).is_valid());
        assert!(Key::id_key("K", -5, None).is_valid());
        assert!(!Key::name_key("", "a", None).is_valid());
        let both = Key { id: 1, ..Key::name_key("K", "a", None) };
        assert!(!both.is_valid());
        let k = Key::name_key("K", "a", Some(&Key::incomplete("P", None)));
        assert!(!k.is_valid());
        let k = Key::name_key("K", "a", Some(&Key::name_key("P", "p", None))).with_namespace("ns");
        assert!(!k.is_valid());
    }

    #[test]
    fn namespace_is_inherited() {
        let p = Key::name_key("P", "p", None).with_namespace("ns");
        let k = Key::incomplete("K", Some(&p));
        assert_eq!(k.namespace, "ns");
        assert_eq!(k.to_wire().path.len(), 2);
    }
}
