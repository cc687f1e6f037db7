use chrono::Utc;
use tempfile::tempdir;

use vocab_trainer::catalog::WordPool;
use vocab_trainer::config::{Config, SessionRules};
use vocab_trainer::session::{EndReason, NewRecord};
use vocab_trainer::store::{JsonStore, CACHE_KEY, HISTORY_KEY, SCORES_KEY, WEIGHTS_KEY};
use vocab_trainer::trainer::Trainer;
use vocab_trainer::translator::{Offline, TranslationCache, TranslationService};
use vocab_trainer::types::{GameMode, Level, WordEntry};
use vocab_trainer::validator;

const WORDS: &str = "word,class,level\nhouse,noun,a1\ncar,noun,a1\nwater,noun,a1\nship,noun,b1\ncurrency,noun,b1\n";

fn config(dir: &std::path::Path, rules: SessionRules) -> Config {
    Config {
        data_dir: Some(dir.to_path_buf()),
        session: rules,
        ..Config::default()
    }
}

fn pool() -> WordPool {
    WordPool::from_reader(WORDS.as_bytes()).unwrap()
}

#[tokio::test]
async fn offline_session_plays_through_fallback_dictionary() {
    let dir = tempdir().unwrap();
    let rules = SessionRules {
        end_on_wrong: false,
        correct_limit: Some(3),
        ..SessionRules::default()
    };
    let mut trainer = Trainer::load(config(dir.path(), rules), pool(), Some(99));
    let mut translator = TranslationService::new(Offline, TranslationCache::default());
    trainer.start_session(GameMode::Custom, Some(Level::A1)).unwrap();

    let mut ended = None;
    for _ in 0..10 {
        let entry = trainer.select_next_word().unwrap();
        let meanings = translator.meanings_for(&entry).await.unwrap();
        let answer = meanings[0].clone();
        trainer.present(entry, meanings);
        let outcome = trainer.submit_answer(&answer).unwrap();
        assert!(outcome.correct);
        if outcome.session_over.is_some() {
            ended = outcome.session_over;
            break;
        }
    }
    assert_eq!(ended, Some(EndReason::CorrectLimit));

    let summary = trainer.end_session().unwrap();
    assert_eq!(summary.score, 3);
    assert_eq!(summary.accuracy, 100.0);
    assert!(summary.new_records.contains(&NewRecord::Level(Level::A1)));

    let store = JsonStore::new(dir.path());
    for key in [WEIGHTS_KEY, HISTORY_KEY, SCORES_KEY] {
        assert!(store.path_for(key).exists(), "{key} was not saved");
    }
}

#[test]
fn repeated_misses_make_a_word_more_likely() {
    let dir = tempdir().unwrap();
    let rules = SessionRules {
        end_on_wrong: false,
        ..SessionRules::default()
    };
    let mut trainer = Trainer::load(config(dir.path(), rules), pool(), Some(3));
    trainer.start_session(GameMode::Custom, Some(Level::B1)).unwrap();
    let currency = WordEntry::new("currency", "noun", Level::B1);
    let ship = WordEntry::new("ship", "noun", Level::B1);

    for _ in 0..3 {
        trainer.present(currency.clone(), vec!["mata uang".to_string()]);
        assert!(!trainer.submit_answer("mata").unwrap().correct);
        trainer.present(ship.clone(), vec!["kapal".to_string()]);
        assert!(trainer.submit_answer("kapal").unwrap().correct);
    }

    let weights = trainer.weights();
    let missed = weights.get(&currency).expect("currency was recorded");
    let known = weights.get(&ship).expect("ship was recorded");
    assert_eq!(missed.total_attempts, 3);
    assert_eq!(missed.correct_attempts, 0);
    assert_eq!(known.correct_attempts, 3);
    assert!(missed.weight > known.weight);
    for (_, record) in weights.iter() {
        assert!(record.correct_attempts <= record.total_attempts);
        assert!((0.1..=5.0).contains(&record.weight));
    }
}

#[test]
fn factory_reset_returns_default_state() {
    let dir = tempdir().unwrap();
    let mut trainer = Trainer::load(config(dir.path(), SessionRules::default()), pool(), Some(1));
    trainer.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
    let entry = trainer.select_next_word().unwrap();
    trainer.present(entry, vec!["rumah".to_string()]);
    trainer.submit_answer("rumah").unwrap();
    trainer.end_session().unwrap();
    trainer
        .store()
        .save(CACHE_KEY, &TranslationCache::default())
        .unwrap();

    std::fs::write(dir.path().join("package.json"), "{}").unwrap();

    assert!(trainer.factory_reset().unwrap() >= 4);
    assert!(dir.path().join("package.json").exists());
    assert!(trainer.weights().is_empty());
    assert!(trainer.history().recent_words.is_empty());
    assert_eq!(trainer.scores().overall, 0);
    assert!(trainer.scores().sessions.is_empty());

    let reloaded = Trainer::load(trainer.config().clone(), pool(), None);
    assert!(reloaded.weights().is_empty());
    assert!(reloaded.history().wrong_words.is_empty());
    assert_eq!(reloaded.scores().overall, 0);
    assert!(Level::ALL.iter().all(|l| reloaded.scores().best_for(*l) == 0));
}

#[test]
fn validator_examples() {
    let m = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert!(!validator::validate("kap", &m(&["kapal"])));
    assert!(validator::validate("kapal", &m(&["kapal", "perahu"])));
    assert!(validator::validate("Rumah", &m(&["rumah"])));
    assert!(validator::validate("mata uang", &m(&["mata uang"])));
    assert!(!validator::validate("", &m(&["apa"])));
}

#[test]
fn export_lands_in_data_dir() {
    let dir = tempdir().unwrap();
    let trainer = Trainer::load(config(dir.path(), SessionRules::default()), pool(), None);
    let path = trainer
        .export_statistics(TranslationCache::default().stats(), Utc::now())
        .unwrap();
    assert!(path.starts_with(dir.path()));
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("export_"));
}
