//! In-memory working sets, one per resource, scoped to the selected club.

use std::fmt::Debug;

use shared::{
    Attendance, AttendanceId, Club, ClubId, Event, EventId, Expense, ExpenseId, Member, Officer,
    OfficerKey, Role, RoleId, Sponsorship, SponsorshipId, StudentId,
};

/// Identity of an entity inside its store.
pub trait Keyed {
    type Key: Eq + Clone + Debug;

    fn key(&self) -> Self::Key;
}

macro_rules! keyed_by {
    ($entity:ty, $key:ty, $field:ident) => {
        impl Keyed for $entity {
            type Key = $key;

            fn key(&self) -> Self::Key {
                self.$field.clone()
            }
        }
    };
}

keyed_by!(Club, ClubId, club_id);
keyed_by!(Member, StudentId, student_id);
keyed_by!(Role, RoleId, role_id);
keyed_by!(Event, EventId, event_id);
keyed_by!(Attendance, AttendanceId, attendance_id);
keyed_by!(Sponsorship, SponsorshipId, sponsorship_id);
keyed_by!(Expense, ExpenseId, expense_id);

impl Keyed for Officer {
    type Key = OfficerKey;

    fn key(&self) -> Self::Key {
        Officer::key(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

/// Ordered collection with unique keys. Server order is kept; upserts of new
/// keys append.
#[derive(Debug, Clone)]
pub struct EntityStore<T: Keyed> {
    items: Vec<T>,
    phase: Phase,
}

impl<T: Keyed> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: Phase::Loading,
        }
    }
}

impl<T: Keyed> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards prior contents. A later duplicate key wins but keeps the
    /// earlier position.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        for item in items {
            self.upsert(item);
        }
        self.phase = Phase::Ready;
    }

    /// Returns the entry that was replaced, if any.
    pub fn upsert(&mut self, item: T) -> Option<T> {
        let key = item.key();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.items[index], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.position(key).map(|index| self.items.remove(index))
    }

    /// Remove keeping the slot, so a rollback can put the entry back where it was.
    pub(crate) fn take(&mut self, key: &T::Key) -> Option<(usize, T)> {
        self.position(key)
            .map(|index| (index, self.items.remove(index)))
    }

    pub(crate) fn restore(&mut self, index: usize, item: T) {
        if self.position(&item.key()).is_some() {
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.position(key).is_some()
    }

    pub fn find<P>(&self, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
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

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Empty and waiting for a refetch.
    pub fn reset(&mut self) {
        self.items.clear();
        self.phase = Phase::Loading;
    }

    /// A failed read keeps whatever was there; after a scope reset that is
    /// nothing, and the view shows its empty notice.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.phase = Phase::Failed(reason.into());
    }

    /// `No members found`, once loading is over and nothing is there.
    pub fn empty_notice(&self, noun: &str) -> Option<String> {
        (!self.is_loading() && self.is_empty()).then(|| format!("No {noun} found"))
    }

    fn position(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| &item.key() == key)
    }
}

/// Case-insensitive substring match used by the local search pass. An unset
/// or blank needle matches everything.
pub(crate) fn text_matches(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(needle) => haystack
            .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, major: Option<&str>) -> Member {
        Member {
            student_id: id.to_string(),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            email: format!("{id}@example.edu"),
            phone_number: None,
            major: major.map(str::to_string),
            graduation_year: None,
        }
    }

    #[test]
    fn replace_all_never_keeps_duplicate_keys() {
        let mut store = EntityStore::new();
        store.replace_all([member("a", Some("CS")), member("b", None), member("a", Some("EE"))]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.items()[0].major.as_deref(), Some("EE"));
        assert_eq!(store.phase(), &Phase::Ready);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = EntityStore::new();
        store.replace_all([member("a", None), member("b", None)]);

        let replaced = store.upsert(member("a", Some("Math")));
        assert_eq!(replaced.map(|m| m.major), Some(None));
        assert_eq!(store.items()[0].major.as_deref(), Some("Math"));

        assert!(store.upsert(member("c", None)).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn take_and_restore_keep_position() {
        let mut store = EntityStore::new();
        store.replace_all([member("a", None), member("b", None), member("c", None)]);

        let (index, taken) = store.take(&"b".to_string()).unwrap();
        assert_eq!(index, 1);
        store.restore(index, taken);
        let order: Vec<_> = store.iter().map(|m| m.student_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn empty_notice_only_after_loading() {
        let mut store: EntityStore<Member> = EntityStore::new();
        assert_eq!(store.empty_notice("members"), None);

        store.fail("status:500");
        assert_eq!(store.empty_notice("members").as_deref(), Some("No members found"));
    }

    #[test]
    fn text_matching_is_case_insensitive() {
        assert!(text_matches(Some("Computer Science"), Some("science")));
        assert!(text_matches(None, Some("  ")));
        assert!(!text_matches(None, Some("cs")));
    }
}
