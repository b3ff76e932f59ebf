/// Integration tests for the achievement book backed by the sled store.
mod common;

use common::temp_store;
use parentsim::game::{
    AchievementBook, AchievementId, AchievementStore, ChildStats, GameStore, ACHIEVEMENT_NAMESPACE,
};

#[test]
fn offer_claimer_is_unlocked_without_gameplay() {
    let (_dir, store) = temp_store();
    let book = AchievementBook::open(Box::new(store.clone())).unwrap();
    assert!(book.has(AchievementId::OfferClaimer));
    assert_eq!(book.unlocked_ids().len(), 1);
    assert_eq!(store.load_unlocked().unwrap(), vec!["OFFER_CLAIMER".to_string()]);
}

#[test]
fn unlocks_persist_across_reopen() {
    let (dir, store) = temp_store();
    {
        let mut book = AchievementBook::open(Box::new(store.clone())).unwrap();
        let unlocked = book
            .record_transition(&ChildStats::new(0, 19, 0, 0), &ChildStats::new(0, 22, 0, 0))
            .unwrap();
        assert!(unlocked.contains(&AchievementId::HardWorker));
    }
    drop(store);

    let reopened = GameStore::open(dir.path().join("parentsim")).unwrap();
    let book = AchievementBook::open(Box::new(reopened.clone())).unwrap();
    assert!(book.has(AchievementId::HardWorker));
    assert!(book.has(AchievementId::OfferClaimer));

    let stored = reopened.load_unlocked().unwrap();
    assert_eq!(stored.iter().filter(|id| *id == "OFFER_CLAIMER").count(), 1);
    assert_eq!(stored.len(), 2);
}

#[test]
fn stored_list_is_unioned_with_defaults() {
    let (_dir, store) = temp_store();
    store
        .save_unlocked(&["MENTOR_MASTER".to_string(), "SEASONAL_BADGE".to_string()])
        .unwrap();
    let book = AchievementBook::open(Box::new(store.clone())).unwrap();
    assert!(book.has(AchievementId::MentorMaster));
    assert!(book.has(AchievementId::OfferClaimer));

    let stored = store.load_unlocked().unwrap();
    assert!(stored.contains(&"SEASONAL_BADGE".to_string()));
    assert!(stored.contains(&"OFFER_CLAIMER".to_string()));
    assert_eq!(ACHIEVEMENT_NAMESPACE, "game_achievements");
}

#[test]
fn evaluation_twice_unlocks_once() {
    let (_dir, store) = temp_store();
    let mut book = AchievementBook::open(Box::new(store)).unwrap();
    let (before, after) = (ChildStats::new(0, 10, 0, 0), ChildStats::new(0, 15, 0, 0));
    assert_eq!(book.record_transition(&before, &after).unwrap().len(), 1);
    assert!(book.record_transition(&before, &after).unwrap().is_empty());
    assert_eq!(book.locked_achievements().len(), 3);
}
