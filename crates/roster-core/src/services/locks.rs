//! Per-tenant writer serialisation

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per tenant. Every read-modify-write of a tenant's
/// documents runs while holding its guard; tenants never contend.
#[derive(Default)]
pub struct TenantLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, tenant_id: &Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(*tenant_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_tenant_serialises() {
        let locks = Arc::new(TenantLocks::new());
        let tenant = Uuid::new_v4();
        let guard = locks.acquire(&tenant).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&tenant).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_tenants_do_not_block() {
        let locks = TenantLocks::new();
        let _a = locks.acquire(&Uuid::new_v4()).await;
        let _b = locks.acquire(&Uuid::new_v4()).await;
    }
}
