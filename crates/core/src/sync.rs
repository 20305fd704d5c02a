//! Optimistic local state for a location page.
//!
//! Every change goes through three phases:
//!
//! ```text
//!            begin()                commit(server value)
//!  (tree) ──────────▶ Pending ──────────────────────────▶ Committed
//!                        │
//!                        │ rollback()
//!                        ▼
//!                    RolledBack
//! ```
//!
//! `begin` applies the change to the tree straight away and hands back a
//! [`Ticket`] holding the inverse operation. The ticket is consumed by either
//! `commit` or `rollback`, so it resolves exactly once. New rows get
//! provisional negative ids until the server's row replaces them.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{AreaNode, Category, CategoryNode, Item, StorageArea};
use crate::patch::{ItemPatch, NewItem};
use crate::tree::LocationTree;
use crate::types::{CategoryId, EntityName, ItemId, StorageAreaId};

/// A change to apply optimistically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddArea { name: EntityName },
    RenameArea { id: StorageAreaId, name: EntityName },
    RemoveArea { id: StorageAreaId },
    AddCategory { area_id: StorageAreaId, name: EntityName },
    RenameCategory { id: CategoryId, name: EntityName },
    RemoveCategory { id: CategoryId },
    AddItem { category_id: CategoryId, item: NewItem },
    PatchItem { id: ItemId, patch: ItemPatch },
    RemoveItem { id: ItemId },
}

/// What the server answered for a pending change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    Area(StorageArea),
    Category(Category),
    Item(Item),
    Removed,
}

impl From<StorageArea> for Confirmed {
    fn from(area: StorageArea) -> Self {
        Self::Area(area)
    }
}

impl From<Category> for Confirmed {
    fn from(category: Category) -> Self {
        Self::Category(category)
    }
}

impl From<Item> for Confirmed {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl Confirmed {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Area(_) => "storage area",
            Self::Category(_) => "category",
            Self::Item(_) => "item",
            Self::Removed => "removal",
        }
    }
}

/// Where a change stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Committed,
    RolledBack,
}

/// A change could not be applied or reconciled.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncConflict {
    #[error("storage area {0} is not on this page")]
    UnknownArea(StorageAreaId),
    #[error("category {0} is not on this page")]
    UnknownCategory(CategoryId),
    #[error("item {0} is not on this page")]
    UnknownItem(ItemId),
    /// The server value does not fit the pending change. The change was rolled back.
    #[error("expected a {expected} from the server, got a {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone)]
enum Undo {
    DropArea(StorageAreaId),
    RestoreArea(StorageArea),
    ReinsertArea(usize, AreaNode),
    DropCategory(CategoryId),
    RestoreCategory(Category),
    ReinsertCategory(usize, CategoryNode),
    DropItem(ItemId),
    RestoreItem(Item),
    ReinsertItem(usize, Item),
}

impl Undo {
    /// The server value a commit of this change expects.
    const fn expects(&self) -> &'static str {
        match self {
            Self::DropArea(_) | Self::RestoreArea(_) => "storage area",
            Self::DropCategory(_) | Self::RestoreCategory(_) => "category",
            Self::DropItem(_) | Self::RestoreItem(_) => "item",
            Self::ReinsertArea(..) | Self::ReinsertCategory(..) | Self::ReinsertItem(..) => {
                "removal"
            }
        }
    }
}

/// Proof of a pending change. Not `Clone`: it can be resolved only once.
#[derive(Debug)]
#[must_use = "a pending change must be committed or rolled back"]
pub struct Ticket {
    seq: u64,
    undo: Undo,
}

impl Ticket {
    /// Sequence number for [`OptimisticTree::phase`].
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// A [`LocationTree`] with pending optimistic changes.
#[derive(Debug, Clone)]
pub struct OptimisticTree {
    tree: LocationTree,
    next_seq: u64,
    next_provisional: i64,
    phases: BTreeMap<u64, Phase>,
    /// Rolled-back removals whose parent is itself still removed.
    orphans: Vec<Undo>,
}

impl OptimisticTree {
    #[must_use]
    pub const fn new(tree: LocationTree) -> Self {
        Self {
            tree,
            next_seq: 1,
            next_provisional: -1,
            phases: BTreeMap::new(),
            orphans: Vec::new(),
        }
    }

    /// The tree as the user currently sees it.
    #[must_use]
    pub const fn tree(&self) -> &LocationTree {
        &self.tree
    }

    #[must_use]
    pub fn phase(&self, seq: u64) -> Option<Phase> {
        self.phases.get(&seq).copied()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.phases.values().filter(|p| **p == Phase::Pending).count()
    }

    fn provisional(&mut self) -> i64 {
        let id = self.next_provisional;
        self.next_provisional -= 1;
        id
    }

    /// Apply `mutation` locally and record its inverse.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncConflict`] if the mutation targets something that is
    /// not in the tree. The tree is left unchanged in that case.
    pub fn begin(&mut self, mutation: Mutation) -> Result<Ticket, SyncConflict> {
        let undo = self.apply(mutation)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.phases.insert(seq, Phase::Pending);
        Ok(Ticket { seq, undo })
    }

    fn apply(&mut self, mutation: Mutation) -> Result<Undo, SyncConflict> {
        let now = Utc::now();
        let undo = match mutation {
            Mutation::AddArea { name } => {
                let id = StorageAreaId::new(self.provisional());
                let area = StorageArea {
                    id,
                    name: name.into_inner(),
                    location_id: self.tree.location.id,
                    created_at: now,
                };
                self.tree.insert_area(usize::MAX, AreaNode::empty(area));
                Undo::DropArea(id)
            }
            Mutation::RenameArea { id, name } => {
                let node = self.tree.area_mut(id).ok_or(SyncConflict::UnknownArea(id))?;
                let previous = node.area.clone();
                node.area.name = name.into_inner();
                Undo::RestoreArea(previous)
            }
            Mutation::RemoveArea { id } => {
                let (index, node) = self.tree.remove_area(id).ok_or(SyncConflict::UnknownArea(id))?;
                Undo::ReinsertArea(index, node)
            }
            Mutation::AddCategory { area_id, name } => {
                if self.tree.area(area_id).is_none() {
                    return Err(SyncConflict::UnknownArea(area_id));
                }
                let id = CategoryId::new(self.provisional());
                let category = Category {
                    id,
                    name: name.into_inner(),
                    storage_area_id: area_id,
                    created_at: now,
                };
                self.tree
                    .insert_category(usize::MAX, CategoryNode::empty(category))
                    .map_err(|_| SyncConflict::UnknownArea(area_id))?;
                Undo::DropCategory(id)
            }
            Mutation::RenameCategory { id, name } => {
                let node = self
                    .tree
                    .category_mut(id)
                    .ok_or(SyncConflict::UnknownCategory(id))?;
                let previous = node.category.clone();
                node.category.name = name.into_inner();
                Undo::RestoreCategory(previous)
            }
            Mutation::RemoveCategory { id } => {
                let (index, node) = self
                    .tree
                    .remove_category(id)
                    .ok_or(SyncConflict::UnknownCategory(id))?;
                Undo::ReinsertCategory(index, node)
            }
            Mutation::AddItem { category_id, item } => {
                let id = ItemId::new(self.provisional());
                let row = Item {
                    id,
                    name: item.name.into_inner(),
                    quantity: item.quantity,
                    expiration_date: item.expiration_date,
                    category_id,
                    created_at: Some(now),
                };
                self.tree
                    .insert_item(usize::MAX, row)
                    .map_err(|_| SyncConflict::UnknownCategory(category_id))?;
                Undo::DropItem(id)
            }
            Mutation::PatchItem { id, patch } => {
                let item = self.tree.item_mut(id).ok_or(SyncConflict::UnknownItem(id))?;
                let previous = item.clone();
                patch.apply_to(item);
                Undo::RestoreItem(previous)
            }
            Mutation::RemoveItem { id } => {
                let (index, item) = self.tree.remove_item(id).ok_or(SyncConflict::UnknownItem(id))?;
                Undo::ReinsertItem(index, item)
            }
        };
        Ok(undo)
    }

    /// Merge the server's answer for a pending change.
    ///
    /// Added rows take the server's id and timestamps; renamed and patched
    /// rows take the server's values.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConflict::Mismatch`] when `confirmed` is the wrong kind of
    /// value for the change. The change is rolled back first.
    pub fn commit(&mut self, ticket: Ticket, confirmed: Confirmed) -> Result<(), SyncConflict> {
        let Ticket { seq, undo } = ticket;
        let expected = undo.expects();
        let found = confirmed.kind();
        if expected != found {
            self.undo(undo);
            self.phases.insert(seq, Phase::RolledBack);
            return Err(SyncConflict::Mismatch { expected, found });
        }

        // A node removed by a later change has nothing left to merge into.
        match (undo, confirmed) {
            (
                Undo::DropArea(id) | Undo::RestoreArea(StorageArea { id, .. }),
                Confirmed::Area(area),
            ) => {
                if let Some(node) = self.tree.area_mut(id) {
                    // Keep categories added against the provisional id attached.
                    for child in &mut node.categories {
                        child.category.storage_area_id = area.id;
                    }
                    node.area = area;
                }
            }
            (
                Undo::DropCategory(id) | Undo::RestoreCategory(Category { id, .. }),
                Confirmed::Category(category),
            ) => self.replace_category(id, category),
            (Undo::DropItem(id) | Undo::RestoreItem(Item { id, .. }), Confirmed::Item(item)) => {
                if let Some(row) = self.tree.item_mut(id) {
                    *row = item;
                }
            }
            _ => {}
        }

        self.phases.insert(seq, Phase::Committed);
        Ok(())
    }

    /// Undo a pending change after the server rejected it.
    pub fn rollback(&mut self, ticket: Ticket) {
        let Ticket { seq, undo } = ticket;
        self.undo(undo);
        self.phases.insert(seq, Phase::RolledBack);
    }

    fn replace_category(&mut self, provisional: CategoryId, category: Category) {
        if let Some(node) = self.tree.category_mut(provisional) {
            // Keep items added against the provisional id attached.
            for item in &mut node.items {
                item.category_id = category.id;
            }
            node.category = category;
        }
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::DropArea(id) => {
                self.tree.remove_area(id);
            }
            Undo::RestoreArea(area) => {
                if let Some(node) = self.tree.area_mut(area.id) {
                    node.area = area;
                }
            }
            Undo::DropCategory(id) => {
                self.tree.remove_category(id);
            }
            Undo::RestoreCategory(category) => {
                self.tree.set_category(category);
            }
            Undo::DropItem(id) => {
                self.tree.remove_item(id);
            }
            Undo::RestoreItem(item) => {
                if let Some(row) = self.tree.item_mut(item.id) {
                    *row = item;
                }
            }
            reinsert @ (Undo::ReinsertArea(..)
            | Undo::ReinsertCategory(..)
            | Undo::ReinsertItem(..)) => {
                if let Some(orphan) = self.reinsert(reinsert) {
                    self.orphans.push(orphan);
                } else {
                    self.adopt_orphans();
                }
            }
        }
    }

    /// Put a removed node back. Hands it back if its parent is missing.
    fn reinsert(&mut self, undo: Undo) -> Option<Undo> {
        match undo {
            Undo::ReinsertArea(index, node) => {
                self.tree.insert_area(index, node);
                None
            }
            Undo::ReinsertCategory(index, node) => self
                .tree
                .insert_category(index, node)
                .err()
                .map(|node| Undo::ReinsertCategory(index, node)),
            Undo::ReinsertItem(index, item) => self
                .tree
                .insert_item(index, item)
                .err()
                .map(|item| Undo::ReinsertItem(index, item)),
            other => Some(other),
        }
    }

    /// Retry orphaned reinserts until none of them finds a parent.
    fn adopt_orphans(&mut self) {
        loop {
            let waiting = std::mem::take(&mut self.orphans);
            let before = waiting.len();
            for undo in waiting {
                if let Some(orphan) = self.reinsert(undo) {
                    self.orphans.push(orphan);
                }
            }
            if self.orphans.len() == before {
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::fixtures::{epoch, home};
    use crate::types::{Quantity, RawQuantity};
    use crate::patch::{ItemPatchInput, NewItemInput};

    fn name(s: &str) -> EntityName {
        EntityName::parse(s).unwrap()
    }

    #[test]
    fn test_add_area_then_commit_takes_server_id() {
        let mut state = OptimisticTree::new(home());
        let ticket = state.begin(Mutation::AddArea { name: name("Fridge") }).unwrap();
        let seq = ticket.seq();

        let provisional = state.tree().areas.last().unwrap().area.id;
        assert!(provisional.as_i64() < 0);
        assert_eq!(state.phase(seq), Some(Phase::Pending));

        let server = StorageArea {
            id: StorageAreaId::new(42),
            name: "Fridge".to_owned(),
            location_id: state.tree().location.id,
            created_at: epoch(),
        };
        state.commit(ticket, server.into()).unwrap();

        assert_eq!(state.phase(seq), Some(Phase::Committed));
        assert!(state.tree().area(StorageAreaId::new(42)).is_some());
        assert!(state.tree().area(provisional).is_none());
        assert_eq!(state.pending_count(), 0);
    }

    #[test]
    fn test_rollback_restores_tree_exactly() {
        let original = home();
        let mut state = OptimisticTree::new(original.clone());

        let mutations = [
            Mutation::RemoveArea { id: StorageAreaId::new(10) },
            Mutation::RenameArea { id: StorageAreaId::new(10), name: name("Cellar") },
            Mutation::RemoveCategory { id: CategoryId::new(100) },
            Mutation::RenameCategory { id: CategoryId::new(101), name: name("Rice & Co") },
            Mutation::RemoveItem { id: ItemId::new(1001) },
            Mutation::AddCategory { area_id: StorageAreaId::new(10), name: name("Spices") },
        ];
        for mutation in mutations {
            let ticket = state.begin(mutation).unwrap();
            assert_ne!(state.tree(), &original);
            state.rollback(ticket);
            assert_eq!(state.tree(), &original);
        }
    }

    #[test]
    fn test_patch_item_rollback_restores_previous_values() {
        let original = home();
        let mut state = OptimisticTree::new(original.clone());
        let patch = serde_json::from_str::<ItemPatchInput>(r#"{"quantity": "9", "expiration": ""}"#)
            .unwrap()
            .normalize()
            .unwrap();

        let ticket = state
            .begin(Mutation::PatchItem { id: ItemId::new(1000), patch })
            .unwrap();
        let beans = state.tree().item(ItemId::new(1000)).unwrap();
        assert_eq!(beans.quantity, Quantity::new(9));
        assert_eq!(beans.expiration_date, None);

        state.rollback(ticket);
        assert_eq!(state.tree(), &original);
    }

    #[test]
    fn test_add_item_commit_replaces_provisional_row() {
        let mut state = OptimisticTree::new(home());
        let item = NewItemInput {
            name: "Corn".to_owned(),
            quantity: Some(RawQuantity::Text("2".to_owned())),
            expiration_date: None,
        }
        .normalize()
        .unwrap();

        let ticket = state
            .begin(Mutation::AddItem { category_id: CategoryId::new(100), item })
            .unwrap();
        assert_eq!(state.tree().item_count(), 4);

        let mut server = state.tree().items().find(|i| i.name == "Corn").unwrap().clone();
        server.id = ItemId::new(2000);
        state.commit(ticket, server.into()).unwrap();

        assert!(state.tree().item(ItemId::new(2000)).is_some());
        assert_eq!(state.tree().item_count(), 4);
    }

    #[test]
    fn test_bulk_delete_partial_failure_keeps_failed_item() {
        let mut state = OptimisticTree::new(home());
        let ids = [ItemId::new(1000), ItemId::new(1001), ItemId::new(1002)];
        let tickets: Vec<Ticket> = ids
            .iter()
            .map(|&id| state.begin(Mutation::RemoveItem { id }).unwrap())
            .collect();
        assert_eq!(state.tree().item_count(), 0);

        // Server deleted the first and last, rejected the middle one.
        for (index, ticket) in tickets.into_iter().enumerate() {
            if index == 1 {
                state.rollback(ticket);
            } else {
                state.commit(ticket, Confirmed::Removed).unwrap();
            }
        }

        let left: Vec<_> = state.tree().items().map(|i| i.id).collect();
        assert_eq!(left, [ItemId::new(1001)]);
    }

    #[test]
    fn test_unknown_target_leaves_tree_untouched() {
        let original = home();
        let mut state = OptimisticTree::new(original.clone());
        let err = state
            .begin(Mutation::RemoveItem { id: ItemId::new(5) })
            .unwrap_err();
        assert_eq!(err, SyncConflict::UnknownItem(ItemId::new(5)));
        assert_eq!(state.tree(), &original);
        assert_eq!(state.pending_count(), 0);
    }

    #[test]
    fn test_committed_area_keeps_provisional_children_attached() {
        let mut state = OptimisticTree::new(home());
        let area_ticket = state.begin(Mutation::AddArea { name: name("Fridge") }).unwrap();
        let provisional = state.tree().areas.last().unwrap().area.id;
        let category_ticket = state
            .begin(Mutation::AddCategory { area_id: provisional, name: name("Dairy") })
            .unwrap();
        let dairy = state.tree().areas.last().unwrap().categories[0].category.id;

        let server = StorageArea {
            id: StorageAreaId::new(42),
            name: "Fridge".to_owned(),
            location_id: state.tree().location.id,
            created_at: epoch(),
        };
        state.commit(area_ticket, server.into()).unwrap();
        assert_eq!(
            state.tree().category(dairy).unwrap().category.storage_area_id,
            StorageAreaId::new(42)
        );

        let mut confirmed = state.tree().category(dairy).unwrap().category.clone();
        confirmed.id = CategoryId::new(500);
        state.commit(category_ticket, confirmed.into()).unwrap();
        let before = state.tree().clone();
        assert_eq!(before.category_count(), 3);

        let removal = state
            .begin(Mutation::RemoveCategory { id: CategoryId::new(500) })
            .unwrap();
        assert_eq!(state.tree().category_count(), 2);
        state.rollback(removal);

        assert_eq!(state.tree(), &before);
    }

    #[test]
    fn test_out_of_order_rollback_restores_nested_removals() {
        let original = home();
        let mut state = OptimisticTree::new(original.clone());

        let item = state.begin(Mutation::RemoveItem { id: ItemId::new(1000) }).unwrap();
        let category = state
            .begin(Mutation::RemoveCategory { id: CategoryId::new(100) })
            .unwrap();
        let area = state
            .begin(Mutation::RemoveArea { id: StorageAreaId::new(10) })
            .unwrap();
        assert_eq!(state.tree().item_count(), 0);

        // Children come back before their parents do.
        state.rollback(item);
        state.rollback(category);
        assert_eq!(state.tree().category_count(), 0);
        state.rollback(area);

        assert_eq!(state.tree(), &original);
        assert_eq!(state.pending_count(), 0);
    }

    #[test]
    fn test_mismatched_commit_rolls_back() {
        let original = home();
        let mut state = OptimisticTree::new(original.clone());
        let ticket = state
            .begin(Mutation::RemoveCategory { id: CategoryId::new(100) })
            .unwrap();
        let seq = ticket.seq();

        let err = state.commit(ticket, Confirmed::Area(original.areas[0].area.clone()));
        assert!(matches!(err, Err(SyncConflict::Mismatch { .. })));
        assert_eq!(state.tree(), &original);
        assert_eq!(state.phase(seq), Some(Phase::RolledBack));
    }
}
