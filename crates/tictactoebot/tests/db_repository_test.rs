//! Tests for database repository operations.

use tempfile::NamedTempFile;

use tictactoebot::{ProfileRepository, ScoreOutcome};

/// Creates a migrated database in a temporary file. The file handle must
/// stay in scope to keep the database alive.
fn setup_test_db() -> (NamedTempFile, ProfileRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = ProfileRepository::new(db_path).expect("Failed to open repository");
    (db_file, repo)
}

#[test]
fn test_create_user_with_zeroed_score() {
    let (_db, repo) = setup_test_db();
    let user = repo.get_or_create_user(100, "en", "easy").expect("Create failed");
    assert_eq!(*user.chat_id(), 100);
    assert!(*user.id() > 0);

    let score = repo.get_score(*user.id()).expect("Score missing");
    assert_eq!(score.to_score().total(), 0);
}

#[test]
fn test_second_contact_returns_existing_user() {
    let (_db, repo) = setup_test_db();
    let first = repo.get_or_create_user(7, "en", "easy").expect("First create failed");
    let second = repo.get_or_create_user(7, "ru", "hard").expect("Second call failed");
    assert_eq!(first.id(), second.id());
    assert_eq!(second.language(), "en");
    assert_eq!(repo.list_users().expect("List failed").len(), 1);
}

#[test]
fn test_concurrent_first_contact_creates_one_user() {
    for _ in 0..20 {
        let (_db, repo) = setup_test_db();
        let barrier = std::sync::Barrier::new(4);
        let ids: Vec<i32> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        *repo
                            .get_or_create_user(42, "en", "easy")
                            .expect("First contact failed")
                            .id()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("Thread panicked"))
                .collect()
        });
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(repo.list_users().expect("List failed").len(), 1);
        let user = repo.get_user_by_chat_id(42).expect("Query failed").expect("User missing");
        assert_eq!(repo.get_score(*user.id()).expect("Score missing").to_score().total(), 0);
    }
}

#[test]
fn test_get_user_by_chat_id() {
    let (_db, repo) = setup_test_db();
    assert!(repo.get_user_by_chat_id(9).expect("Query failed").is_none());

    repo.get_or_create_user(9, "pt", "hard").expect("Create failed");
    let user = repo
        .get_user_by_chat_id(9)
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(user.language(), "pt");
    assert_eq!(user.parse_difficulty().expect("Bad difficulty").to_string(), "hard");
}

#[test]
fn test_reopen_keeps_data() {
    let (db, repo) = setup_test_db();
    repo.get_or_create_user(3, "en", "easy").expect("Create failed");

    let reopened =
        ProfileRepository::new(db.path().to_str().expect("Invalid path").to_string())
            .expect("Reopen failed");
    assert_eq!(reopened.list_users().expect("List failed").len(), 1);
}

#[test]
fn test_update_settings() {
    let (_db, repo) = setup_test_db();
    repo.get_or_create_user(5, "en", "easy").expect("Create failed");

    assert_eq!(repo.update_difficulty(5, "hard").expect("Update failed"), 1);
    assert_eq!(repo.update_language(5, "ar").expect("Update failed"), 1);
    assert_eq!(repo.update_language(6, "ar").expect("Update failed"), 0);

    let user = repo
        .get_user_by_chat_id(5)
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(user.difficulty(), "hard");
    assert_eq!(user.language(), "ar");
    assert!(user.updated_at() >= user.created_at());
}

#[test]
fn test_increment_scores() {
    let (_db, repo) = setup_test_db();
    let alice = repo.get_or_create_user(1, "en", "easy").expect("Create failed");
    let bob = repo.get_or_create_user(2, "en", "easy").expect("Create failed");

    repo.increment_scores(&[(1, ScoreOutcome::Win), (2, ScoreOutcome::LossToPlayer)])
        .expect("Increment failed");
    repo.increment_scores(&[(1, ScoreOutcome::Draw), (2, ScoreOutcome::Draw)])
        .expect("Increment failed");
    repo.increment_scores(&[(1, ScoreOutcome::LossToBot)])
        .expect("Increment failed");

    let a = repo.get_score(*alice.id()).expect("Score missing");
    assert_eq!((*a.player(), *a.bot(), *a.enemy(), *a.draw()), (1, 1, 0, 1));
    let b = repo.get_score(*bob.id()).expect("Score missing");
    assert_eq!((*b.player(), *b.bot(), *b.enemy(), *b.draw()), (0, 0, 1, 1));
}

#[test]
fn test_increment_scores_rolls_back_on_unknown_user() {
    let (_db, repo) = setup_test_db();
    let alice = repo.get_or_create_user(1, "en", "easy").expect("Create failed");

    let result = repo.increment_scores(&[(1, ScoreOutcome::Win), (404, ScoreOutcome::Win)]);
    assert!(result.is_err());

    let a = repo.get_score(*alice.id()).expect("Score missing");
    assert_eq!(*a.player(), 0, "Partial round must not be recorded");
}
