use std::sync::Arc;
use std::time::Duration;

use studio_core::clock::InstantClock;
use studio_core::storage::{FileStore, MemoryStore};
use studio_core::{
    template, ContentType, HistoryStore, Phase, SaveOutcome, SavedEntry, Studio, StudioConfig,
    SubmitOutcome, TemplateProvider,
};
use tokio_test::{assert_err, assert_ok};

fn memory_studio() -> Studio<TemplateProvider> {
    let history = HistoryStore::open(Arc::new(MemoryStore::new()));
    Studio::new(TemplateProvider::new(Duration::from_millis(1500)), history)
}

#[tokio::test(start_paused = true)]
async fn second_generation_replaces_first_mid_reveal() {
    let studio = memory_studio();
    studio.set_topic("First topic");
    assert_ok!(studio.submit().await);

    let mut rx = studio.reveal().subscribe();
    loop {
        rx.changed().await.unwrap();
        if rx
            .borrow_and_update()
            .as_ref()
            .is_some_and(|s| s.revealed_len() >= 10)
        {
            break;
        }
    }
    assert_eq!(studio.phase(), Phase::Revealing);

    studio.set_topic("Second");
    studio.set_content_type(ContentType::EmailCopy);
    assert_ok!(studio.submit().await);

    let expected = template::generate("Second", &ContentType::EmailCopy);
    let done = studio.reveal().wait_complete().await.unwrap();
    assert_eq!(done.revealed_text(), expected);

    // Leftover ticks from the first reveal must not change anything.
    tokio::time::sleep(Duration::from_secs(30)).await;
    let settled = studio.reveal().snapshot().unwrap();
    assert_eq!(settled.revealed_text(), expected);
    assert_eq!(settled.target().content_type, ContentType::EmailCopy);
}

#[tokio::test(start_paused = true)]
async fn submission_during_latency_supersedes_the_first() {
    let studio = Arc::new(memory_studio());
    studio.set_topic("Old");

    let first = {
        let studio = Arc::clone(&studio);
        tokio::spawn(async move { studio.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;

    studio.set_topic("New");
    let second = assert_ok!(studio.submit().await);
    let first = assert_ok!(first.await.unwrap());

    assert_eq!(first, SubmitOutcome::Superseded);
    let expected = template::generate("New", &ContentType::InstagramCaption);
    assert!(matches!(second, SubmitOutcome::Started(ref r) if r.full_text == expected));

    let done = studio.reveal().wait_complete().await.unwrap();
    assert_eq!(done.revealed_text(), expected);
}

#[tokio::test(start_paused = true)]
async fn history_survives_restart_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let config = StudioConfig::default()
        .with_data_dir(dir.path())
        .with_latency_ms(10)
        .with_tick_ms(1);

    {
        let studio = Studio::from_config(&config).unwrap();
        for topic in ["E1", "E2", "E3"] {
            studio.set_topic(topic);
            studio.set_content_type(ContentType::BlogIntro);
            assert_ok!(studio.submit().await);
            studio.reveal().wait_complete().await.unwrap();
            assert!(matches!(studio.save(), SaveOutcome::Saved(_)));
        }
    }

    let reopened = Studio::from_config(&config).unwrap();
    let topics: Vec<String> = reopened
        .history()
        .iter()
        .map(|e| e.content.lines().next().unwrap().to_string())
        .collect();
    assert_eq!(
        topics,
        vec![
            "📝 Blog Intro about E3:",
            "📝 Blog Intro about E2:",
            "📝 Blog Intro about E1:",
        ]
    );
}

#[tokio::test]
async fn corrupted_history_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aiHistory.json"), "{ definitely not an array").unwrap();

    let history = HistoryStore::open(Arc::new(FileStore::new(dir.path())));
    assert!(history.is_empty());

    let studio = Studio::new(TemplateProvider::new(Duration::ZERO), history)
        .with_clock(Arc::new(InstantClock));
    studio.set_topic("Recovered");
    assert_ok!(studio.submit().await);
    studio.reveal().wait_complete().await.unwrap();
    assert_eq!(studio.save(), SaveOutcome::Saved(1));

    let raw = std::fs::read_to_string(dir.path().join("aiHistory.json")).unwrap();
    let stored: Vec<SavedEntry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_type, ContentType::InstagramCaption);
}

#[tokio::test(start_paused = true)]
async fn blank_topic_keeps_previous_result() {
    let studio = memory_studio();
    studio.set_topic("Kept");
    assert_ok!(studio.submit().await);
    studio.reveal().wait_complete().await.unwrap();

    studio.set_topic("   ");
    assert_err!(studio.submit().await);
    assert_eq!(studio.phase(), Phase::Complete);
    assert!(studio.state().error.is_some());
}
