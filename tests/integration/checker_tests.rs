use std::sync::Arc;

use pricewatch::checker::PriceChecker;
use pricewatch::config::CheckerConfig;
use pricewatch::notify::Messenger;
use pricewatch::scrape::PriceScraper;
use pricewatch::store::ProductStore;

use super::{memory_store, product_page, MapFetcher, RecordingMessenger};

fn checker_config() -> CheckerConfig {
    CheckerConfig {
        interval_minutes: 30,
        request_delay_ms: 0,
        change_threshold_percent: 1.0,
    }
}

async fn setup() -> (
    PriceChecker,
    Arc<super::SqliteStore>,
    Arc<MapFetcher>,
    Arc<RecordingMessenger>,
) {
    let store = memory_store().await;
    let fetcher = Arc::new(MapFetcher::new());
    let messenger = Arc::new(RecordingMessenger::default());
    let scraper = Arc::new(PriceScraper::new(
        Arc::clone(&fetcher) as Arc<dyn pricewatch::fetch::HtmlFetcher>
    ));
    let checker = PriceChecker::new(
        Arc::clone(&store) as Arc<dyn ProductStore>,
        scraper,
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        checker_config(),
    );
    (checker, store, fetcher, messenger)
}

#[tokio::test]
async fn cycle_updates_every_subscriber_and_notifies_on_threshold() {
    let (checker, store, fetcher, messenger) = setup().await;

    store
        .create_with_price("https://shop.example.com/a", 1, Some("A"), 100.0)
        .await
        .unwrap();
    store
        .create_with_price("https://shop.example.com/b", 2, Some("B"), 50.0)
        .await
        .unwrap();

    // A drops 10%, B moves 0.2%
    fetcher.serve("https://shop.example.com/a", product_page("$90.00", "A"));
    fetcher.serve("https://shop.example.com/b", product_page("$50.10", "B"));

    let summary = checker.run_cycle().await;
    assert_eq!(summary.products, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.notified, 1);
    assert_eq!(summary.failed, 0);

    let sent = messenger.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 1);
    assert!(sent[0].1.contains("dropped"));

    // Both products persisted their new price either way
    assert_eq!(
        store.list_products(1).await.unwrap()[0].current_price,
        Some(90.0)
    );
    assert_eq!(
        store.list_products(2).await.unwrap()[0].current_price,
        Some(50.1)
    );
}

#[tokio::test]
async fn one_dead_product_does_not_starve_the_rest() {
    let (checker, store, fetcher, messenger) = setup().await;

    for (path, sub) in [("a", 1i64), ("b", 1), ("c", 2), ("d", 3)] {
        store
            .create_with_price(&format!("https://shop.example.com/{path}"), sub, None, 10.0)
            .await
            .unwrap();
    }

    // "b" has no page at all; everyone else answers
    fetcher.serve("https://shop.example.com/a", product_page("$10.00", "A"));
    fetcher.serve("https://shop.example.com/c", product_page("$10.00", "C"));
    fetcher.serve("https://shop.example.com/d", product_page("$12.00", "D"));

    let summary = checker.run_cycle().await;
    assert_eq!(summary.products, 4);
    assert_eq!(summary.updated, 3);
    assert_eq!(summary.failed, 1);

    // d moved 20% and still got its notification
    let sent = messenger.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 3);
}

#[tokio::test]
async fn back_to_back_cycles_accumulate_history() {
    let (checker, store, fetcher, _) = setup().await;

    let id = store
        .create_with_price("https://shop.example.com/a", 1, None, 100.0)
        .await
        .unwrap();

    fetcher.serve("https://shop.example.com/a", product_page("$98.00", "A"));
    checker.run_cycle().await;

    fetcher.serve("https://shop.example.com/a", product_page("$96.00", "A"));
    checker.run_cycle().await;

    let history = store.get_history(id, 10).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].price, 96.0);
    assert_eq!(history[1].price, 98.0);
    assert_eq!(history[2].price, 100.0);
}

#[tokio::test]
async fn product_without_first_observation_stays_silent() {
    let (checker, store, fetcher, messenger) = setup().await;

    store
        .add_product("https://shop.example.com/a", 1, None)
        .await
        .unwrap();
    fetcher.serve("https://shop.example.com/a", product_page("$500.00", "A"));

    let summary = checker.run_cycle().await;
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.notified, 0);
    assert!(messenger.messages().is_empty());

    // The second cycle has a baseline and can notify
    fetcher.serve("https://shop.example.com/a", product_page("$400.00", "A"));
    let summary = checker.run_cycle().await;
    assert_eq!(summary.notified, 1);
}
