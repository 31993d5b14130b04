//! Behaviour shared by both profile stores.

use tempfile::NamedTempFile;
use tictactoebot::{
    MemoryProfileStore, ProfileDefaults, ProfileError, ProfileStore, Score, ScoreOutcome,
    SqliteProfileStore,
};
use tictactoebot_engine::{Difficulty, Language, UserId};

const ALICE: UserId = UserId::new(-1001);
const BOB: UserId = UserId::new(4_000_000_000);

fn check_store(store: &dyn ProfileStore) {
    assert!(store.get_profile(ALICE).expect("Lookup failed").is_none());

    let defaults = ProfileDefaults::new(Language::Indonesian, Difficulty::Easy);
    let created = store.get_or_create(ALICE, defaults).expect("Create failed");
    assert_eq!(*created.user(), ALICE);
    assert_eq!(*created.language(), Language::Indonesian);
    assert_eq!(*created.score(), Score::default());

    store
        .set_difficulty(ALICE, Difficulty::Hard)
        .expect("Set difficulty failed");
    store
        .set_language(ALICE, Language::Spanish)
        .expect("Set language failed");
    store.get_or_create(BOB, defaults).expect("Create failed");

    store
        .record_round(&[(ALICE, ScoreOutcome::Win), (BOB, ScoreOutcome::LossToPlayer)])
        .expect("Round failed");
    store
        .increment_score(ALICE, ScoreOutcome::Draw)
        .expect("Increment failed");

    let alice = store
        .get_profile(ALICE)
        .expect("Lookup failed")
        .expect("Profile missing");
    assert_eq!(*alice.difficulty(), Difficulty::Hard);
    assert_eq!(*alice.language(), Language::Spanish);
    assert_eq!(*alice.score(), Score::new(1, 0, 0, 1));

    let bob = store.get_or_create(BOB, defaults).expect("Lookup failed");
    assert_eq!(*bob.score(), Score::new(0, 0, 1, 0));

    assert!(
        store
            .increment_score(UserId::new(77), ScoreOutcome::Win)
            .is_err(),
        "Unknown user accepted"
    );
}

#[test]
fn test_memory_store() {
    check_store(&MemoryProfileStore::new());
}

#[test]
fn test_sqlite_store() {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let store = SqliteProfileStore::open(file.path().to_str().expect("Invalid path"))
        .expect("Open failed");
    check_store(&store);
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let path = file.path().to_str().expect("Invalid path").to_string();

    let store = SqliteProfileStore::open(path.clone()).expect("Open failed");
    store
        .get_or_create(ALICE, ProfileDefaults::default())
        .expect("Create failed");
    store
        .increment_score(ALICE, ScoreOutcome::LossToBot)
        .expect("Increment failed");
    drop(store);

    let store = SqliteProfileStore::open(path).expect("Reopen failed");
    let alice = store
        .get_profile(ALICE)
        .expect("Lookup failed")
        .expect("Profile missing");
    assert_eq!(*alice.score().bot(), 1);
}

#[test]
fn test_sqlite_unknown_user_difficulty() {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let store = SqliteProfileStore::open(file.path().to_str().expect("Invalid path"))
        .expect("Open failed");
    let err = store
        .set_difficulty(BOB, Difficulty::Hard)
        .expect_err("Unknown user accepted");
    assert!(matches!(err, ProfileError::UnknownUser(u) if u == BOB));
}

#[test]
fn test_sqlite_concurrent_first_contact() {
    let carol = UserId::new(9_001);
    for _ in 0..20 {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let store = SqliteProfileStore::open(file.path().to_str().expect("Invalid path"))
            .expect("Open failed");
        let barrier = std::sync::Barrier::new(4);

        let profiles: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        store.get_or_create(carol, ProfileDefaults::default())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("Thread panicked"))
                .collect()
        });

        let first = profiles[0].clone().expect("First contact failed");
        for profile in profiles {
            assert_eq!(profile.expect("First contact failed"), first);
        }
        assert_eq!(
            store.repository().list_users().expect("List failed").len(),
            1
        );
    }
}
