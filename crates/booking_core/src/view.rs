//! crates/booking_core/src/view.rs
//!
//! In-memory lists that are patched locally after a successful mutation and
//! reconciled with the store on the next full fetch.

use uuid::Uuid;

/// Anything with a stable identity a list can be patched by.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// A local change mirroring a write that already succeeded upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// A new item, placed first. Replaces an existing item with the same key instead.
    Prepend(T),
    /// Swaps in a new version of an existing item.
    Replace(T),
    Remove(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalList<T> {
    items: Vec<T>,
    stale: bool,
}

impl<T> Default for LocalList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            stale: false,
        }
    }
}

impl<T: Keyed> LocalList<T> {
    /// A list straight from a full fetch.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            stale: false,
        }
    }

    /// Applies a patch and marks the list as diverging from the last fetch.
    /// Returns `false` if the patch referred to an item that is not in the list.
    pub fn apply(&mut self, patch: Patch<T>) -> bool {
        let applied = match patch {
            Patch::Prepend(item) => {
                match self.position(item.key()) {
                    Some(index) => self.items[index] = item,
                    None => self.items.insert(0, item),
                }
                true
            }
            Patch::Replace(item) => match self.position(item.key()) {
                Some(index) => {
                    self.items[index] = item;
                    true
                }
                None => false,
            },
            Patch::Remove(key) => match self.position(key) {
                Some(index) => {
                    self.items.remove(index);
                    true
                }
                None => false,
            },
        };
        if applied {
            self.stale = true;
        }
        applied
    }

    /// Replaces the local contents with a fresh fetch, discarding all patches.
    pub fn reconcile(&mut self, fetched: Vec<T>) {
        self.items = fetched;
        self.stale = false;
    }

    pub fn get(&self, key: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether local patches have been applied since the last full fetch.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn position(&self, key: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        label: &'static str,
    }

    impl Keyed for Row {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    fn row(label: &'static str) -> Row {
        Row {
            id: Uuid::new_v4(),
            label,
        }
    }

    #[test]
    fn patches_mark_the_list_stale_until_reconciled() {
        let a = row("a");
        let b = row("b");
        let mut list = LocalList::new(vec![a.clone()]);
        assert!(!list.is_stale());

        assert!(list.apply(Patch::Prepend(b.clone())));
        assert_eq!(list.items(), &[b.clone(), a.clone()]);
        assert!(list.is_stale());

        list.reconcile(vec![a.clone()]);
        assert_eq!(list.items(), &[a]);
        assert!(!list.is_stale());
    }

    #[test]
    fn prepend_of_a_known_key_replaces_in_place() {
        let a = row("a");
        let b = row("b");
        let mut list = LocalList::new(vec![a.clone(), b.clone()]);

        let b2 = Row { label: "b2", ..b.clone() };
        list.apply(Patch::Prepend(b2.clone()));

        assert_eq!(list.len(), 2);
        assert_eq!(list.items()[1], b2);
    }

    #[test]
    fn replace_and_remove_of_unknown_keys_are_ignored() {
        let a = row("a");
        let mut list = LocalList::new(vec![a.clone()]);

        assert!(!list.apply(Patch::Replace(row("x"))));
        assert!(!list.apply(Patch::Remove(Uuid::new_v4())));
        assert!(!list.is_stale());

        assert!(list.apply(Patch::Remove(a.id)));
        assert!(list.is_empty());
        assert_eq!(list.get(a.id), None);
    }
}
