use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    AccountRepository, AdRepository, ListingRepository, ModerationChangeSet,
    ModerationRepository, RepositoryError,
};
use crate::marketplace::accounts::{UserAccount, UserId};
use crate::marketplace::ads::{Ad, AdId};
use crate::marketplace::listings::{Property, PropertyId, PropertyStatus};
use crate::marketplace::moderation::domain::{
    AppealId, IssueId, PropertyAppeal, Report, ReportId, UserIssue,
};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, UserAccount>,
    properties: HashMap<PropertyId, Property>,
    reports: HashMap<ReportId, Report>,
    appeals: HashMap<AppealId, PropertyAppeal>,
    issues: HashMap<IssueId, UserIssue>,
    ads: HashMap<AdId, Ad>,
}

/// In-process document store. One lock guards every collection, which is what
/// makes [`ModerationRepository::commit`] atomic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RepositoryError> {
        self.collections
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

fn insert_new<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Result<V, RepositoryError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    if map.contains_key(&key) {
        return Err(RepositoryError::Conflict);
    }
    map.insert(key, value.clone());
    Ok(value)
}

fn replace_existing<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Result<(), RepositoryError>
where
    K: std::hash::Hash + Eq,
{
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(RepositoryError::NotFound),
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created(item)));
    items
}

impl AccountRepository for MemoryStore {
    fn insert_user(&self, user: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.users, user.id.clone(), user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    fn update_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        replace_existing(&mut guard.users, user.id.clone(), user)
    }
}

impl ListingRepository for MemoryStore {
    fn insert_property(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.properties, property.id.clone(), property)
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(self.lock()?.properties.get(id).cloned())
    }

    fn update_property(
        &self,
        property: Property,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        check_version(&guard, &property.id, expected_version)?;
        store_property(&mut guard, property);
        Ok(())
    }

    fn properties_by_owner(&self, owner: &UserId) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.lock()?;
        let items = guard
            .properties
            .values()
            .filter(|property| &property.owner_id == owner)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |property: &Property| {
            property.created_at
        }))
    }

    fn properties_with_status(
        &self,
        status: PropertyStatus,
    ) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.lock()?;
        let items = guard
            .properties
            .values()
            .filter(|property| property.status == status)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |property: &Property| {
            property.created_at
        }))
    }

    fn record_view(&self, id: &PropertyId) -> Result<u64, RepositoryError> {
        let mut guard = self.lock()?;
        let property = guard
            .properties
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        property.view_count += 1;
        Ok(property.view_count)
    }
}

/// Replaces a listing document. The view counter is owned by
/// [`ListingRepository::record_view`], so the stored count survives writes
/// made from an older read.
fn store_property(collections: &mut Collections, mut property: Property) {
    if let Some(stored) = collections.properties.get(&property.id) {
        property.view_count = stored.view_count;
    }
    collections.properties.insert(property.id.clone(), property);
}

fn check_version(
    collections: &Collections,
    id: &PropertyId,
    expected: u64,
) -> Result<(), RepositoryError> {
    let stored = collections
        .properties
        .get(id)
        .ok_or(RepositoryError::NotFound)?;
    if stored.version != expected {
        return Err(RepositoryError::StaleVersion {
            expected,
            found: stored.version,
        });
    }
    Ok(())
}

impl ModerationRepository for MemoryStore {
    fn insert_report(&self, report: Report) -> Result<Report, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.reports, report.id.clone(), report)
    }

    fn fetch_report(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(self.lock()?.reports.get(id).cloned())
    }

    fn reports(&self) -> Result<Vec<Report>, RepositoryError> {
        let items = self.lock()?.reports.values().cloned().collect();
        Ok(sorted_by_creation(items, |report: &Report| report.created_at))
    }

    fn insert_appeal(&self, appeal: PropertyAppeal) -> Result<PropertyAppeal, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.appeals, appeal.id.clone(), appeal)
    }

    fn fetch_appeal(&self, id: &AppealId) -> Result<Option<PropertyAppeal>, RepositoryError> {
        Ok(self.lock()?.appeals.get(id).cloned())
    }

    fn appeals(&self) -> Result<Vec<PropertyAppeal>, RepositoryError> {
        let items = self.lock()?.appeals.values().cloned().collect();
        Ok(sorted_by_creation(items, |appeal: &PropertyAppeal| {
            appeal.created_at
        }))
    }

    fn appeals_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<PropertyAppeal>, RepositoryError> {
        let guard = self.lock()?;
        let items = guard
            .appeals
            .values()
            .filter(|appeal| &appeal.property_id == property)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |appeal: &PropertyAppeal| {
            appeal.created_at
        }))
    }

    fn insert_issue(&self, issue: UserIssue) -> Result<UserIssue, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.issues, issue.id.clone(), issue)
    }

    fn fetch_issue(&self, id: &IssueId) -> Result<Option<UserIssue>, RepositoryError> {
        Ok(self.lock()?.issues.get(id).cloned())
    }

    fn update_issue(&self, issue: UserIssue) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        replace_existing(&mut guard.issues, issue.id.clone(), issue)
    }

    fn issues(&self) -> Result<Vec<UserIssue>, RepositoryError> {
        let items = self.lock()?.issues.values().cloned().collect();
        Ok(sorted_by_creation(items, |issue: &UserIssue| issue.created_at))
    }

    fn commit(&self, changes: ModerationChangeSet) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;

        // validate everything before the first write
        if let Some(write) = &changes.property {
            check_version(&guard, &write.property.id, write.expected_version)?;
        }
        if let Some(write) = &changes.report {
            let stored = guard
                .reports
                .get(&write.report.id)
                .ok_or(RepositoryError::NotFound)?;
            if stored.status != write.expected_status {
                return Err(RepositoryError::Superseded);
            }
        }
        if let Some(write) = &changes.appeal {
            let stored = guard
                .appeals
                .get(&write.appeal.id)
                .ok_or(RepositoryError::NotFound)?;
            if stored.status != write.expected_status {
                return Err(RepositoryError::Superseded);
            }
        }
        if let Some(user) = &changes.user {
            if !guard.users.contains_key(&user.id) {
                return Err(RepositoryError::NotFound);
            }
        }

        if let Some(write) = changes.property {
            store_property(&mut guard, write.property);
        }
        if let Some(write) = changes.report {
            guard.reports.insert(write.report.id.clone(), write.report);
        }
        if let Some(write) = changes.appeal {
            guard.appeals.insert(write.appeal.id.clone(), write.appeal);
        }
        if let Some(user) = changes.user {
            guard.users.insert(user.id.clone(), user);
        }
        Ok(())
    }
}

impl AdRepository for MemoryStore {
    fn insert_ad(&self, ad: Ad) -> Result<Ad, RepositoryError> {
        let mut guard = self.lock()?;
        insert_new(&mut guard.ads, ad.id.clone(), ad)
    }

    fn fetch_ad(&self, id: &AdId) -> Result<Option<Ad>, RepositoryError> {
        Ok(self.lock()?.ads.get(id).cloned())
    }

    fn update_ad(&self, ad: Ad) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        replace_existing(&mut guard.ads, ad.id.clone(), ad)
    }

    fn delete_ad(&self, id: &AdId) -> Result<Ad, RepositoryError> {
        self.lock()?.ads.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn ads_by_owner(&self, owner: &UserId) -> Result<Vec<Ad>, RepositoryError> {
        let guard = self.lock()?;
        let items = guard
            .ads
            .values()
            .filter(|ad| &ad.owner_id == owner)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |ad: &Ad| ad.created_at))
    }

    fn ads(&self) -> Result<Vec<Ad>, RepositoryError> {
        let items = self.lock()?.ads.values().cloned().collect();
        Ok(sorted_by_creation(items, |ad: &Ad| ad.created_at))
    }
}
