use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use roster_core::domain::{
    DeveloperUser, EmployeeProfile, ProfileBook, ReadMarkers, RequestKind, RequestLog, Roster, SubscriptionPlan, Tenant,
    TenantSettings,
};
use roster_core::error::DomainError;
use roster_core::repositories::{DeveloperRepository, TenantRepository, WorkspaceRepository};
use roster_core::services::{TenantLocks, TenantService, TenantUpdate};
use roster_infrastructure::{JsonFileStore, TenantDocument};

async fn store() -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().join("data")).await.unwrap();
    (dir, store)
}

fn tenant(slug: &str) -> Tenant {
    Tenant::new(&format!("Tenant {}", slug), slug, TenantSettings::default()).unwrap()
}

fn sample_roster() -> Roster {
    let mut roster = Roster::default();
    roster.add_team("Night").unwrap();
    roster.insert_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    roster.add_employee("E1", "Ann", "Night").unwrap();
    roster
}

#[tokio::test]
async fn missing_documents_read_as_empty() {
    let (_dir, store) = store().await;
    let id = uuid::Uuid::new_v4();

    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(store.load_roster(&id).await.unwrap(), Roster::default());
    assert!(store.load_requests(&id).await.unwrap().requests.is_empty());
    assert!(store.load_credentials(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn tenant_documents_are_isolated() {
    let (_dir, store) = store().await;
    let a = TenantRepository::create(&store, &tenant("alpha")).await.unwrap();
    let b = TenantRepository::create(&store, &tenant("beta")).await.unwrap();

    store.save_roster(&a.id, &sample_roster()).await.unwrap();

    assert_eq!(store.load_roster(&a.id).await.unwrap().employees.len(), 1);
    assert!(store.load_roster(&b.id).await.unwrap().employees.is_empty());
    assert!(store.layout().tenant_file(&a.id, TenantDocument::Roster).exists());
    assert!(!store.layout().tenant_file(&b.id, TenantDocument::Roster).exists());
}

#[tokio::test]
async fn slug_conflicts_are_rejected() {
    let (_dir, store) = store().await;
    let first = TenantRepository::create(&store, &tenant("acme")).await.unwrap();

    let err = TenantRepository::create(&store, &tenant("acme")).await.unwrap_err();
    assert!(matches!(err, DomainError::TenantSlugAlreadyExists(_)));

    let mut other = TenantRepository::create(&store, &tenant("other")).await.unwrap();
    other.slug = first.slug.clone();
    let err = store.update(&other).await.unwrap_err();
    assert!(matches!(err, DomainError::TenantSlugAlreadyExists(_)));

    assert_eq!(store.find_by_slug("acme").await.unwrap().unwrap().id, first.id);
}

#[tokio::test]
async fn update_of_unknown_tenant_fails() {
    let (_dir, store) = store().await;
    let err = store.update(&tenant("ghost")).await.unwrap_err();
    assert!(matches!(err, DomainError::TenantNotFound));
}

#[tokio::test]
async fn developer_usernames_are_unique_ignoring_case() {
    let (_dir, store) = store().await;
    let developer = DeveloperUser {
        username: "root".into(),
        password_hash: "hash".into(),
        full_name: "Root".into(),
        created_at: Utc::now(),
    };
    DeveloperRepository::create(&store, &developer).await.unwrap();

    let mut again = developer.clone();
    again.username = "ROOT".into();
    let err = DeveloperRepository::create(&store, &again).await.unwrap_err();
    assert!(matches!(err, DomainError::UserAlreadyExists(_)));
    assert!(store.find_by_username("Root").await.unwrap().is_some());
}

#[tokio::test]
async fn writes_leave_no_temporary_files() {
    let (_dir, store) = store().await;
    let t = TenantRepository::create(&store, &tenant("tidy")).await.unwrap();

    let mut log = RequestLog::default();
    let kind = RequestKind::ShiftChange {
        employee_id: "E1".into(),
        employee_name: "Ann".into(),
        current_shift: "M".into(),
        requested_shift: "N".into(),
    };
    log.submit(kind, "Night", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "swap", Utc::now());
    for _ in 0..3 {
        store.save_requests(&t.id, &log).await.unwrap();
        store.save_roster(&t.id, &sample_roster()).await.unwrap();
    }

    let leftovers: Vec<_> = std::fs::read_dir(store.layout().tenant_dir(&t.id))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    assert_eq!(store.load_requests(&t.id).await.unwrap().requests.len(), 1);
}

#[tokio::test]
async fn corrupt_documents_surface_storage_errors() {
    let (_dir, store) = store().await;
    let t = TenantRepository::create(&store, &tenant("broken")).await.unwrap();
    let path = store.layout().tenant_file(&t.id, TenantDocument::Roster);
    std::fs::write(&path, b"{ not json").unwrap();

    let err = store.load_roster(&t.id).await.unwrap_err();
    assert!(matches!(err, DomainError::StorageError(_)));
}

#[tokio::test]
async fn blank_documents_read_as_empty() {
    let (_dir, store) = store().await;
    let t = TenantRepository::create(&store, &tenant("blank")).await.unwrap();
    std::fs::write(store.layout().tenant_file(&t.id, TenantDocument::Settings), b"  \n").unwrap();

    let settings = store.load_settings(&t.id).await.unwrap();
    assert!(settings.sheet_links.is_empty());
}

#[tokio::test]
async fn profiles_and_read_markers_persist_per_tenant() {
    let (_dir, store) = store().await;
    let t = TenantRepository::create(&store, &tenant("profiles")).await.unwrap();

    let mut book = ProfileBook::default();
    book.set("E1", EmployeeProfile { phone: Some("555-0101".into()), ..EmployeeProfile::default() });
    store.save_profiles(&t.id, &book).await.unwrap();
    let mut markers = ReadMarkers::default();
    let read_at = Utc::now();
    markers.mark_read("E1", read_at);
    store.save_read_markers(&t.id, &markers).await.unwrap();

    assert_eq!(store.load_profiles(&t.id).await.unwrap(), book);
    assert_eq!(store.load_read_markers(&t.id).await.unwrap().last_read("e1"), Some(read_at));
    assert!(store.layout().tenant_file(&t.id, TenantDocument::ReadMarkers).ends_with("read_notifications.json"));
    assert!(store.load_profiles(&uuid::Uuid::new_v4()).await.unwrap().profiles.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tenant_edits_are_not_lost() {
    let (_dir, store) = store().await;
    let store = Arc::new(store);
    let service = Arc::new(TenantService::new(store.clone(), store.clone(), Arc::new(TenantLocks::new())));

    for round in 0..20 {
        let pending = Tenant::signup("Clinic", &format!("clinic-{}", round), SubscriptionPlan::Monthly, None, None).unwrap();
        let id = TenantRepository::create(store.as_ref(), &pending).await.unwrap().id;

        let activator = {
            let service = service.clone();
            tokio::spawn(async move { service.activate(&id, None).await })
        };
        let renamer = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .update(&id, TenantUpdate { name: Some("Renamed Clinic".into()), ..TenantUpdate::default() })
                    .await
            })
        };
        activator.await.unwrap().unwrap();
        renamer.await.unwrap().unwrap();

        let tenant = service.get(&id).await.unwrap();
        assert!(tenant.is_active, "round {} lost the activation", round);
        assert_eq!(tenant.name, "Renamed Clinic", "round {} lost the rename", round);
    }
}
