use std::collections::BTreeMap;

use gameshop_core::Entity;

/// Keyed in-memory table with a storage-assigned id sequence.
///
/// Not synchronized on its own: the owning database serializes access.
#[derive(Debug)]
pub struct Table<V> {
    rows: BTreeMap<i64, V>,
    last_id: i64,
}

impl<V> Table<V> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Reserve the next id (1, 2, 3, ...). Ids are never reused.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn get(&self, id: i64) -> Option<&V> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut V> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<V> {
        self.rows.remove(&id)
    }

    /// Rows in id order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, v| keep(v));
        before - self.rows.len()
    }
}

impl<V> Table<V>
where
    V: Entity,
    V::Id: Into<i64>,
{
    /// Store a row under its own id, replacing any previous row.
    pub fn put(&mut self, row: V) {
        self.rows.insert(row.id().into(), row);
    }
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameshop_core::SaleId;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(SaleId, &'static str);

    impl Entity for Row {
        type Id = SaleId;

        fn id(&self) -> SaleId {
            self.0
        }
    }

    fn row(t: &mut Table<Row>, label: &'static str) -> i64 {
        let id = t.next_id();
        t.put(Row(SaleId::new(id), label));
        id
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut t = Table::new();
        let a = row(&mut t, "a");
        let b = row(&mut t, "b");
        t.remove(b);
        let c = t.next_id();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(t.values().map(|r| r.1).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn put_replaces_row_with_same_id() {
        let mut t = Table::new();
        let id = row(&mut t, "old");
        t.put(Row(SaleId::new(id), "new"));
        assert_eq!(t.get(id).map(|r| r.1), Some("new"));
        assert_eq!(t.values().count(), 1);
    }

    #[test]
    fn retain_reports_removed_count() {
        let mut t = Table::new();
        for label in ["a", "b", "c", "d", "e"] {
            row(&mut t, label);
        }
        assert_eq!(t.retain(|r| r.0.get() % 2 == 0), 3);
        assert_eq!(t.values().count(), 2);
    }
}
