//! Indexed in-memory [`SlotStore`].
//!
//! Slots are kept in a primary map plus two secondary indexes: per user,
//! ordered by start, and per profile. Range queries walk the user index
//! instead of scanning every slot.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::availability::{AvailabilitySlot, SlotStatus, UserId};
use crate::domain::ports::{SlotStore, SlotStoreError};

type StartKey = (DateTime<Utc>, Uuid);

#[derive(Debug, Default)]
struct SlotIndex {
    slots: HashMap<Uuid, AvailabilitySlot>,
    by_user: HashMap<UserId, BTreeSet<StartKey>>,
    by_profile: HashMap<Uuid, HashSet<Uuid>>,
}

impl SlotIndex {
    fn insert(&mut self, slot: AvailabilitySlot) {
        self.remove(slot.id());
        self.by_user
            .entry(slot.user_id().clone())
            .or_default()
            .insert((slot.start(), slot.id()));
        self.by_profile
            .entry(slot.profile_id())
            .or_default()
            .insert(slot.id());
        self.slots.insert(slot.id(), slot);
    }

    fn remove(&mut self, id: Uuid) -> Option<AvailabilitySlot> {
        let slot = self.slots.remove(&id)?;
        if let Some(starts) = self.by_user.get_mut(slot.user_id()) {
            starts.remove(&(slot.start(), id));
            if starts.is_empty() {
                self.by_user.remove(slot.user_id());
            }
        }
        if let Some(ids) = self.by_profile.get_mut(&slot.profile_id()) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_profile.remove(&slot.profile_id());
            }
        }
        Some(slot)
    }

    /// Slots of `user_id` starting at or after `from`, in start order.
    fn user_slots_from<'a>(
        &'a self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a AvailabilitySlot> + 'a {
        self.by_user
            .get(user_id)
            .into_iter()
            .flat_map(move |starts| starts.range((from, Uuid::nil())..))
            .filter_map(move |(_, id)| self.slots.get(id))
    }

    fn profile_slot_ids(&self, profile_id: Uuid) -> Vec<Uuid> {
        self.by_profile
            .get(&profile_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    index: RwLock<SlotIndex>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored slots.
    pub async fn len(&self) -> usize {
        self.index.read().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilitySlot>, SlotStoreError> {
        Ok(self.index.read().await.slots.get(&id).cloned())
    }

    async fn save(&self, slot: &AvailabilitySlot) -> Result<(), SlotStoreError> {
        self.index.write().await.insert(slot.clone());
        Ok(())
    }

    async fn list_future_for_profile(
        &self,
        profile_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError> {
        let index = self.index.read().await;
        let mut slots: Vec<AvailabilitySlot> = index
            .profile_slot_ids(profile_id)
            .into_iter()
            .filter_map(|id| index.slots.get(&id))
            .filter(|slot| slot.start() >= from)
            .cloned()
            .collect();
        slots.sort_by_key(|slot| (slot.start(), slot.end()));
        Ok(slots)
    }

    async fn replace_future_for_profile(
        &self,
        profile_id: Uuid,
        from: DateTime<Utc>,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<(), SlotStoreError> {
        let mut index = self.index.write().await;
        let stale: Vec<Uuid> = index
            .profile_slot_ids(profile_id)
            .into_iter()
            .filter(|id| index.slots.get(id).is_some_and(|slot| slot.start() >= from))
            .collect();
        for id in stale {
            index.remove(id);
        }
        for slot in slots {
            index.insert(slot);
        }
        Ok(())
    }

    async fn find_for_user_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, SlotStoreError> {
        let index = self.index.read().await;
        Ok(index
            .user_slots_from(user_id, start)
            .take_while(|slot| slot.start() <= end)
            .filter(|slot| slot.end() <= end)
            .cloned()
            .collect())
    }

    async fn find_next_available_after(
        &self,
        user_id: &UserId,
        after: DateTime<Utc>,
    ) -> Result<Option<AvailabilitySlot>, SlotStoreError> {
        let index = self.index.read().await;
        Ok(index
            .user_slots_from(user_id, after)
            .find(|slot| {
                slot.status() == SlotStatus::Available
                    && slot.current_bookings() < slot.max_bookings()
            })
            .cloned())
    }

    async fn delete_for_profile(&self, profile_id: Uuid) -> Result<usize, SlotStoreError> {
        let mut index = self.index.write().await;
        let ids = index.profile_slot_ids(profile_id);
        Ok(ids
            .into_iter()
            .filter_map(|id| index.remove(id))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::{SlotDraft, SlotSource};
    use crate::test_support::availability::{at, user};
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    const PROFILE_A: Uuid = Uuid::from_u128(1);
    const PROFILE_B: Uuid = Uuid::from_u128(2);

    #[fixture]
    fn store() -> InMemorySlotStore {
        InMemorySlotStore::new()
    }

    fn slot(profile_id: Uuid, user_id: &str, start: &str) -> AvailabilitySlot {
        let start = at(start);
        AvailabilitySlot::new(SlotDraft {
            profile_id,
            user_id: user(user_id),
            start,
            end: start + TimeDelta::minutes(30),
            time_zone: chrono_tz::UTC,
            source: SlotSource::Pattern,
            max_bookings: 1,
            buffer_before_minutes: 0,
            buffer_after_minutes: 0,
            meeting_types: Vec::new(),
        })
    }

    async fn seed(store: &InMemorySlotStore, slots: &[AvailabilitySlot]) {
        for slot in slots {
            store.save(slot).await.expect("save succeeds");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn range_lookup_requires_full_containment(store: InMemorySlotStore) {
        seed(
            &store,
            &[
                slot(PROFILE_A, "user-1", "2024-01-01T08:45:00Z"),
                slot(PROFILE_A, "user-1", "2024-01-01T09:00:00Z"),
                slot(PROFILE_A, "user-1", "2024-01-01T16:45:00Z"),
                slot(PROFILE_A, "user-2", "2024-01-01T10:00:00Z"),
            ],
        )
        .await;

        let found = store
            .find_for_user_in_range(
                &user("user-1"),
                at("2024-01-01T09:00:00Z"),
                at("2024-01-01T17:00:00Z"),
            )
            .await
            .expect("lookup succeeds");
        let starts: Vec<_> = found.iter().map(AvailabilitySlot::start).collect();

        assert_eq!(
            starts,
            vec![at("2024-01-01T09:00:00Z"), at("2024-01-01T16:45:00Z")]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn replace_future_keeps_history_and_other_profiles(store: InMemorySlotStore) {
        let past = slot(PROFILE_A, "user-1", "2024-01-01T09:00:00Z");
        let future = slot(PROFILE_A, "user-1", "2024-01-02T09:00:00Z");
        let other = slot(PROFILE_B, "user-1", "2024-01-02T10:00:00Z");
        seed(&store, &[past.clone(), future.clone(), other.clone()]).await;

        let replacement = slot(PROFILE_A, "user-1", "2024-01-03T09:00:00Z");
        store
            .replace_future_for_profile(
                PROFILE_A,
                at("2024-01-02T00:00:00Z"),
                vec![replacement.clone()],
            )
            .await
            .expect("replace succeeds");

        assert!(store.find_by_id(future.id()).await.expect("lookup").is_none());
        assert!(store.find_by_id(past.id()).await.expect("lookup").is_some());
        assert!(store.find_by_id(other.id()).await.expect("lookup").is_some());
        let listed = store
            .list_future_for_profile(PROFILE_A, at("2024-01-01T00:00:00Z"))
            .await
            .expect("list succeeds");
        assert_eq!(listed, vec![past, replacement]);
    }

    #[rstest]
    #[tokio::test]
    async fn next_available_skips_full_slots(store: InMemorySlotStore) {
        let mut full = slot(PROFILE_A, "user-1", "2024-01-05T09:00:00Z");
        full.book("booking-1", None).expect("capacity available");
        let open = slot(PROFILE_A, "user-1", "2024-01-05T09:30:00Z");
        seed(&store, &[full, open.clone()]).await;

        let next = store
            .find_next_available_after(&user("user-1"), at("2024-01-02T00:00:00Z"))
            .await
            .expect("lookup succeeds");

        assert_eq!(next, Some(open));
    }

    #[rstest]
    #[tokio::test]
    async fn saving_moves_index_entries(store: InMemorySlotStore) {
        let mut booked = slot(PROFILE_A, "user-1", "2024-01-05T09:00:00Z");
        seed(&store, &[booked.clone()]).await;
        booked.book("booking-1", None).expect("capacity available");
        store.save(&booked).await.expect("save succeeds");

        assert_eq!(store.len().await, 1);
        let next = store
            .find_next_available_after(&user("user-1"), at("2024-01-01T00:00:00Z"))
            .await
            .expect("lookup succeeds");
        assert!(next.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_for_profile_counts_removed_slots(store: InMemorySlotStore) {
        seed(
            &store,
            &[
                slot(PROFILE_A, "user-1", "2024-01-01T09:00:00Z"),
                slot(PROFILE_A, "user-1", "2024-01-02T09:00:00Z"),
                slot(PROFILE_B, "user-1", "2024-01-02T10:00:00Z"),
            ],
        )
        .await;

        let removed = store
            .delete_for_profile(PROFILE_A)
            .await
            .expect("delete succeeds");

        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
    }
}
