use crate::models::TenantPreference;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// In-process cache for tenant preferences.
///
/// Preferences are read on every personalized search but change rarely, so
/// a small TTL cache in front of the store takes the repeated lookups off
/// the hot path. Entries are invalidated when a tenant saves preferences;
/// elsewhere staleness is bounded by the TTL.
pub struct PreferenceCache {
    inner: moka::future::Cache<Uuid, Arc<Vec<TenantPreference>>>,
}

impl PreferenceCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { inner }
    }

    pub async fn get(&self, tenant_id: Uuid) -> Option<Arc<Vec<TenantPreference>>> {
        let hit = self.inner.get(&tenant_id).await;
        if hit.is_some() {
            tracing::trace!("preference cache hit: {}", tenant_id);
        }
        hit
    }

    pub async fn insert(
        &self,
        tenant_id: Uuid,
        preferences: Vec<TenantPreference>,
    ) -> Arc<Vec<TenantPreference>> {
        let shared = Arc::new(preferences);
        self.inner.insert(tenant_id, shared.clone()).await;
        shared
    }

    pub async fn invalidate(&self, tenant_id: Uuid) {
        self.inner.invalidate(&tenant_id).await;
        tracing::trace!("preference cache invalidated: {}", tenant_id);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HousingType;

    fn create_preference(tenant_id: Uuid) -> TenantPreference {
        TenantPreference {
            id: Uuid::new_v4(),
            tenant_id,
            housing_type: HousingType::Studio,
            budget_min: 300,
            budget_max: 600,
            radius_km: 15,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let cache = PreferenceCache::new(100, 60);
        let tenant_id = Uuid::new_v4();

        assert!(cache.get(tenant_id).await.is_none());

        cache.insert(tenant_id, vec![create_preference(tenant_id)]).await;
        let hit = cache.get(tenant_id).await.expect("entry should be cached");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].tenant_id, tenant_id);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = PreferenceCache::new(100, 60);
        let tenant_id = Uuid::new_v4();

        cache.insert(tenant_id, vec![create_preference(tenant_id)]).await;
        cache.invalidate(tenant_id).await;
        assert!(cache.get(tenant_id).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_preference_list_is_cacheable() {
        let cache = PreferenceCache::new(100, 60);
        let tenant_id = Uuid::new_v4();

        cache.insert(tenant_id, vec![]).await;
        let hit = cache.get(tenant_id).await.expect("empty entry should be cached");
        assert!(hit.is_empty());
    }
}
