// src/pipeline/run.rs

//! One batch run: fetch, extract, select, publish.

use crate::error::Result;
use crate::models::{AnnounceConfig, Config};
use crate::pipeline::select::{SelectionPolicy, select_and_render};
use crate::services::{Publisher, RecordExtractor};
use crate::storage::{StateLedger, StateStore};
use crate::utils::http;

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records extracted from the page
    pub records: usize,
    /// Announcements handed to the publisher
    pub attempted: usize,
    pub published: usize,
    pub failed: usize,
}

/// Fetch the registry page and announce what is new.
pub async fn run_once<S: StateStore>(
    config: &Config,
    client: &reqwest::Client,
    ledger: &mut StateLedger<S>,
    publisher: &dyn Publisher,
) -> Result<RunSummary> {
    let extractor = RecordExtractor::new(&config.source)?;

    log::info!("Fetching {}", config.source.url);
    let html = http::fetch_page(client, &config.source.url).await?;

    process_document(&html, &extractor, ledger, publisher, &config.announce).await
}

/// Extract records from `html` and publish up to `max_per_run` announcements.
///
/// A publish failure is logged and counted; the announcement stays recorded.
pub async fn process_document<S: StateStore>(
    html: &str,
    extractor: &RecordExtractor,
    ledger: &mut StateLedger<S>,
    publisher: &dyn Publisher,
    announce: &AnnounceConfig,
) -> Result<RunSummary> {
    let records = extractor.extract(html)?;
    let mut summary = RunSummary {
        records: records.len(),
        ..RunSummary::default()
    };
    log::info!("Found {} applications", summary.records);

    let policy = SelectionPolicy::from(announce);
    let mut selection = select_and_render(records, ledger, &policy);

    while summary.attempted < announce.max_per_run {
        let Some(next) = selection.next() else {
            break;
        };
        let announcement = next?;
        summary.attempted += 1;

        match publisher.publish(&announcement).await {
            Ok(()) => {
                summary.published += 1;
                log::info!("Published via {}: \"{}\"", publisher.name(), announcement.message);
            }
            Err(e) => {
                summary.failed += 1;
                log::error!(
                    "Failed to publish '{}' via {}: {}",
                    announcement.record.current_name,
                    publisher.name(),
                    e
                );
            }
        }
    }

    if summary.attempted == 0 {
        log::info!("Nothing new to announce");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::SourceConfig;
    use crate::pipeline::Announcement;
    use crate::services::DryRunPublisher;
    use crate::storage::{LocalStateStore, MemoryStateStore, StateStore};

    #[derive(Default)]
    struct RecordingPublisher {
        messages: RefCell<Vec<String>>,
        fail: bool,
    }

    #[async_trait(?Send)]
    impl Publisher for RecordingPublisher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn publish(&self, announcement: &Announcement) -> Result<()> {
            self.messages.borrow_mut().push(announcement.message.clone());
            if self.fail {
                return Err(AppError::publish("rate limited"));
            }
            Ok(())
        }
    }

    const PAGE: &str = r#"
        <html><body>
          <div class="c-accordion">
            <h3>Newest Party</h3>
            <div><p><strong>Proposed name:</strong> Newest Party</p></div>
          </div>
          <div class="c-accordion">
            <h3>Unchanged Party</h3>
            <div><p><strong>Part of the UK that this application applies to:</strong> England</p></div>
          </div>
          <div class="c-accordion">
            <h3>Old Name</h3>
            <div><p><strong>Proposed name:</strong> Oldest Party</p></div>
            <ul><li>Oldest Party</li><li>The Oldest</li></ul>
          </div>
        </body></html>
    "#;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(&SourceConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_one_announcement_per_run() {
        let mut ledger = StateLedger::open(MemoryStateStore::new()).unwrap();
        let publisher = RecordingPublisher::default();
        let announce = AnnounceConfig::default();

        let first = process_document(PAGE, &extractor(), &mut ledger, &publisher, &announce)
            .await
            .unwrap();
        assert_eq!(first.records, 3);
        assert_eq!(first.published, 1);
        assert!(ledger.is_announced("Oldest Party"));
        assert!(!ledger.is_announced("Newest Party"));

        let second = process_document(PAGE, &extractor(), &mut ledger, &publisher, &announce)
            .await
            .unwrap();
        assert_eq!(second.published, 1);

        let third = process_document(PAGE, &extractor(), &mut ledger, &publisher, &announce)
            .await
            .unwrap();
        assert_eq!(third.attempted, 0);

        assert_eq!(
            *publisher.messages.borrow(),
            vec![
                "Party renamed: Old Name are now 'Oldest Party'\n\nAKA:\n• \"The Oldest\"".to_string(),
                "New party started: Newest Party".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_commit() {
        let mut ledger = StateLedger::open(MemoryStateStore::new()).unwrap();
        let publisher = RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        };
        let announce = AnnounceConfig {
            max_per_run: 10,
            ..AnnounceConfig::default()
        };

        let summary = process_document(PAGE, &extractor(), &mut ledger, &publisher, &announce)
            .await
            .unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.failed, 2);
        assert!(ledger.is_announced("Oldest Party"));
        assert!(ledger.is_announced("Newest Party"));
    }

    #[tokio::test]
    async fn test_parse_error_commits_nothing() {
        let mut ledger = StateLedger::open(MemoryStateStore::new()).unwrap();
        let publisher = RecordingPublisher::default();

        let result = process_document(
            "<html><body></body></html>",
            &extractor(),
            &mut ledger,
            &publisher,
            &AnnounceConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(ledger.store().save_count(), 0);
        assert!(publisher.messages.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_leaves_state_file_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("partywatch.json");
        let file_store = LocalStateStore::new(&path);
        StateLedger::open(LocalStateStore::new(&path))
            .unwrap()
            .mark_announced("Earlier Party")
            .unwrap();
        let before = std::fs::read(&path).unwrap();

        let mut ledger = StateLedger::open(MemoryStateStore::from_store(&file_store).unwrap()).unwrap();
        let summary = process_document(
            PAGE,
            &extractor(),
            &mut ledger,
            &DryRunPublisher,
            &AnnounceConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.published, 1);
        assert!(ledger.is_announced("Oldest Party"));
        assert_eq!(std::fs::read(&path).unwrap(), before);

        let on_disk = file_store.load().unwrap();
        assert!(on_disk.is_announced("Earlier Party"));
        assert!(!on_disk.is_announced("Oldest Party"));
    }
}
