use profile_core::db::open_db_in_memory;
use profile_core::{
    status, CreateProfileRequest, DeleteOutcome, DeleteProfileRequest, GetProfileByIdRequest,
    ProfileEntity, ProfileRepository, ProfileService, ProfileStore, ProfilesReply, RpcReply,
    RpcRequest, ServiceConfig, SnapshotCache, SqliteProfileStore, StoreError, StoreResult,
    UpdateProfileRequest, UserProfile,
};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// SQLite store that counts read calls and can be told to fail them.
struct CountingStore {
    inner: SqliteProfileStore,
    scans: AtomicUsize,
    finds: AtomicUsize,
    fail_reads: AtomicBool,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: SqliteProfileStore::try_new(open_db_in_memory().unwrap()).unwrap(),
            scans: AtomicUsize::new(0),
            finds: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
        }
    }

    fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn read_calls(&self) -> usize {
        self.scans() + self.finds.load(Ordering::SeqCst)
    }

    fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::new("store unreachable"));
        }
        Ok(())
    }
}

impl ProfileStore for CountingStore {
    fn insert(&self, profile: &ProfileEntity) -> StoreResult<()> {
        self.inner.insert(profile)
    }

    fn find(&self, id: &str) -> StoreResult<Option<ProfileEntity>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.find(id)
    }

    fn scan(&self) -> StoreResult<Vec<ProfileEntity>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.scan()
    }

    fn update(&self, profile: &ProfileEntity) -> StoreResult<()> {
        self.inner.update(profile)
    }

    fn delete(&self, id: &str) -> StoreResult<DeleteOutcome> {
        self.inner.delete(id)
    }
}

fn new_service() -> (ProfileService<Arc<CountingStore>>, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::new());
    (ProfileService::new(Arc::clone(&store)), store)
}

fn profile(id: &str) -> UserProfile {
    UserProfile {
        user_id: id.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john@domain.com".to_string(),
        phone_number: "+46730789456".to_string(),
        address: Some("123 Main St".to_string()),
        postal_code: Some("15979".to_string()),
        city: Some("London".to_string()),
    }
}

fn create<S: ProfileStore>(service: &ProfileService<S>, profile: UserProfile) -> u16 {
    service
        .create_profile(&CreateProfileRequest {
            profile: Some(profile),
        })
        .status_code
}

fn get<S: ProfileStore>(service: &ProfileService<S>, id: &str) -> (u16, Option<UserProfile>) {
    let reply = service.get_profile_by_id(&GetProfileByIdRequest {
        user_id: id.to_string(),
    });
    (reply.status_code, reply.profile)
}

fn ids(reply: &ProfilesReply) -> Vec<String> {
    reply.profiles.iter().map(|p| p.user_id.clone()).collect()
}

#[test]
fn create_then_get_roundtrips_profile() {
    let (service, _) = new_service();
    assert_eq!(create(&service, profile("U1")), status::CREATED);

    assert_eq!(get(&service, "U1"), (status::OK, Some(profile("U1"))));
}

#[test]
fn create_rejects_absent_or_blank_profile() {
    let (service, store) = new_service();

    let reply = service.create_profile(&CreateProfileRequest { profile: None });
    assert_eq!(reply.status_code, status::BAD_REQUEST);
    assert_eq!(create(&service, profile("  ")), status::BAD_REQUEST);
    assert_eq!(store.inner.scan().unwrap().len(), 0);
}

#[test]
fn duplicate_create_is_internal_error() {
    let (service, _) = new_service();
    assert_eq!(create(&service, profile("U1")), status::CREATED);
    assert_eq!(create(&service, profile("U1")), status::INTERNAL_SERVER_ERROR);
}

#[test]
fn get_by_id_rejects_blank_and_reports_unknown() {
    let (service, store) = new_service();
    create(&service, profile("U1"));

    assert_eq!(get(&service, ""), (status::BAD_REQUEST, None));
    assert_eq!(get(&service, "   "), (status::BAD_REQUEST, None));
    assert_eq!(store.read_calls(), 0, "blank ids must not touch the store");

    assert_eq!(get(&service, "nonexistent-id"), (status::NOT_FOUND, None));
}

#[test]
fn second_list_call_is_served_from_snapshot() {
    let (service, store) = new_service();
    create(&service, profile("U1"));

    let first = service.get_all_profiles();
    let second = service.get_all_profiles();

    assert_eq!(ids(&first), vec!["U1"]);
    assert_eq!(first, second);
    assert_eq!(store.scans(), 1);
}

#[test]
fn get_by_id_hits_snapshot_without_store_access() {
    let (service, store) = new_service();
    create(&service, profile("U1"));
    create(&service, profile("U2"));
    service.get_all_profiles();
    let reads_after_warmup = store.read_calls();

    assert_eq!(get(&service, "U2").0, status::OK);
    assert_eq!(get(&service, "U1").0, status::OK);
    assert_eq!(store.read_calls(), reads_after_warmup);
}

#[test]
fn get_by_id_miss_in_snapshot_triggers_rebuild() {
    let (service, store) = new_service();
    service.get_all_profiles();
    assert_eq!(store.scans(), 1);

    assert_eq!(get(&service, "missing").0, status::NOT_FOUND);
    assert_eq!(store.scans(), 2);
}

#[test]
fn create_and_delete_invalidate_the_snapshot() {
    let (service, _) = new_service();
    assert!(service.get_all_profiles().profiles.is_empty());

    create(&service, profile("A"));
    assert!(!service.cache().is_populated());
    assert_eq!(ids(&service.get_all_profiles()), vec!["A"]);

    let reply = service.delete_profile(&DeleteProfileRequest {
        user_id: "A".to_string(),
    });
    assert_eq!(reply.status_code, status::OK);
    assert!(!service.cache().is_populated());
    assert!(service.get_all_profiles().profiles.is_empty());
}

#[test]
fn update_is_visible_to_next_read() {
    let (service, _) = new_service();
    create(&service, profile("U1"));
    assert_eq!(get(&service, "U1").0, status::OK);

    let mut changed = profile("U1");
    changed.email = "new@domain.com".to_string();
    let reply = service.update_profile(&UpdateProfileRequest {
        profile: Some(changed),
    });
    assert_eq!(reply.status_code, status::OK);

    let (code, loaded) = get(&service, "U1");
    assert_eq!(code, status::OK);
    assert_eq!(loaded.unwrap().email, "new@domain.com");
}

#[test]
fn update_rejects_absent_and_unknown_targets() {
    let (service, _) = new_service();

    let reply = service.update_profile(&UpdateProfileRequest { profile: None });
    assert_eq!(reply.status_code, status::BAD_REQUEST);

    let reply = service.update_profile(&UpdateProfileRequest {
        profile: Some(profile("ghost")),
    });
    assert_eq!(reply.status_code, status::NOT_FOUND);
}

#[test]
fn delete_status_codes() {
    let (service, _) = new_service();
    create(&service, profile("U1"));

    let blank = service.delete_profile(&DeleteProfileRequest::default());
    assert_eq!(blank.status_code, status::BAD_REQUEST);

    let unknown = service.delete_profile(&DeleteProfileRequest {
        user_id: "nonexistent-id".to_string(),
    });
    assert_eq!(unknown.status_code, status::NOT_FOUND);
    assert_eq!(unknown.message, "Profile not found");

    assert_eq!(ids(&service.get_all_profiles()), vec!["U1"]);
}

/// File-backed service plus the database path, for edits behind its back.
fn file_service(
    dir: &tempfile::TempDir,
) -> (ProfileService<SqliteProfileStore>, std::path::PathBuf) {
    let path = dir.path().join("profiles.sqlite3");
    let config = ServiceConfig {
        db_path: Some(path.clone()),
        ..ServiceConfig::default()
    };
    (ProfileService::open(&config).unwrap(), path)
}

fn drop_address_row(path: &std::path::Path, id: &str) {
    let removed = Connection::open(path)
        .unwrap()
        .execute("DELETE FROM addresses WHERE user_id = ?1;", [id])
        .unwrap();
    assert_eq!(removed, 1);
}

#[test]
fn delete_with_missing_address_is_not_found_and_keeps_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let (service, path) = file_service(&dir);
    create(&service, profile("U1"));
    assert_eq!(ids(&service.get_all_profiles()), vec!["U1"]);

    drop_address_row(&path, "U1");

    let reply = service.delete_profile(&DeleteProfileRequest {
        user_id: "U1".to_string(),
    });
    assert_eq!(reply.status_code, status::NOT_FOUND);
    assert_eq!(reply.message, "Address not found");
    assert!(service.cache().is_populated());
    assert_eq!(ids(&service.get_all_profiles()), vec!["U1"]);
}

#[test]
fn get_by_id_with_missing_address_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let (service, path) = file_service(&dir);
    create(&service, profile("U1"));
    drop_address_row(&path, "U1");

    let (code, loaded) = get(&service, "U1");
    assert_eq!(code, status::INTERNAL_SERVER_ERROR);
    assert!(loaded.is_none());
}

#[test]
fn list_skips_profiles_with_missing_address() {
    let dir = tempfile::tempdir().unwrap();
    let (service, path) = file_service(&dir);
    create(&service, profile("U1"));
    create(&service, profile("U2"));
    drop_address_row(&path, "U1");

    assert_eq!(ids(&service.get_all_profiles()), vec!["U2"]);
}

#[test]
fn failed_rebuild_is_not_cached() {
    let (service, store) = new_service();
    create(&service, profile("U1"));

    store.fail_reads(true);
    assert!(service.get_all_profiles().profiles.is_empty());
    assert!(!service.cache().is_populated());

    store.fail_reads(false);
    assert_eq!(ids(&service.get_all_profiles()), vec!["U1"]);
    assert_eq!(store.scans(), 2);
}

#[test]
fn expired_snapshot_is_rebuilt() {
    let store = Arc::new(CountingStore::new());
    let service = ProfileService::with_cache(
        ProfileRepository::new(Arc::clone(&store)),
        SnapshotCache::new(Duration::from_millis(20)),
    );
    create(&service, profile("U1"));

    service.get_all_profiles();
    thread::sleep(Duration::from_millis(40));
    service.get_all_profiles();

    assert_eq!(store.scans(), 2);
}

#[test]
fn concurrent_creates_and_reads_converge() {
    let (service, _) = new_service();
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for n in 0..5 {
                    let id = format!("W{worker}-{n}");
                    assert_eq!(create(&service, profile(&id)), status::CREATED);
                    service.get_all_profiles();
                    assert_eq!(get(&service, &id).0, status::OK);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // A rebuild may have raced the last invalidation; a mutation-free rebuild
    // always reflects every committed row.
    assert_eq!(service.rebuild_snapshot().len(), 40);
}

#[test]
fn handle_dispatches_framed_requests() {
    let (service, _) = new_service();

    let create: RpcRequest = serde_json::from_str(
        r#"{"method":"CreateProfile","params":{"profile":{
            "userId":"U1","firstName":"John","lastName":"Doe",
            "email":"john@domain.com","phoneNumber":"+46730789456",
            "city":"London"}}}"#,
    )
    .unwrap();
    let reply = service.handle(&create);
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        serde_json::json!({"statusCode": 201, "message": "User profile created"})
    );

    let list: RpcRequest = serde_json::from_str(r#"{"method":"GetAllProfiles"}"#).unwrap();
    match service.handle(&list) {
        RpcReply::Profiles(reply) => {
            assert_eq!(reply.profiles.len(), 1);
            assert_eq!(reply.profiles[0].city.as_deref(), Some("London"));
            assert!(reply.profiles[0].address.is_none());
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    let get: RpcRequest =
        serde_json::from_str(r#"{"method":"GetProfileById","params":{"userId":"nope"}}"#)
            .unwrap();
    assert_eq!(
        serde_json::to_value(service.handle(&get)).unwrap(),
        serde_json::json!({"statusCode": 404})
    );
}

#[test]
fn open_from_file_config_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        db_path: Some(dir.path().join("profiles.sqlite3")),
        ..ServiceConfig::default()
    };

    {
        let service = ProfileService::open(&config).unwrap();
        assert_eq!(create(&service, profile("U1")), status::CREATED);
    }

    let reopened = ProfileService::open(&config).unwrap();
    assert_eq!(get(&reopened, "U1").0, status::OK);
}

#[test]
fn open_rejects_invalid_config() {
    let config = ServiceConfig {
        snapshot_ttl: Duration::ZERO,
        ..ServiceConfig::default()
    };
    assert!(ProfileService::open(&config).is_err());
}
