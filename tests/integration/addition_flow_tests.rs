use std::sync::Arc;
use std::time::Duration;

use pricewatch::scrape::PriceScraper;
use pricewatch::session::SessionStore;
use pricewatch::store::ProductStore;
use pricewatch::workflow::{AdditionEvent, AdditionWorkflow, Reply};

use super::{memory_store, product_page, MapFetcher};

const URL: &str = "https://shop.example.com/widget";

async fn setup() -> (AdditionWorkflow, Arc<super::SqliteStore>, Arc<MapFetcher>) {
    let store = memory_store().await;
    let fetcher = Arc::new(MapFetcher::new());
    let scraper = Arc::new(PriceScraper::new(
        Arc::clone(&fetcher) as Arc<dyn pricewatch::fetch::HtmlFetcher>
    ));
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let workflow = AdditionWorkflow::new(
        scraper,
        Arc::clone(&store) as Arc<dyn ProductStore>,
        sessions,
    );
    (workflow, store, fetcher)
}

#[tokio::test]
async fn add_confirm_persists_product_and_first_history_entry() {
    let (workflow, store, fetcher) = setup().await;
    fetcher.serve(URL, product_page("$49.99", "Widget"));

    let reply = workflow.begin(7, URL).await;
    assert_eq!(
        reply,
        Reply::PriceFound {
            price: 49.99,
            title: Some("Widget".to_string())
        }
    );

    let replies = workflow.handle(7, AdditionEvent::Confirm).await.unwrap();
    assert!(matches!(replies[0], Reply::Committed { .. }));

    let products = store.list_products(7).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].current_price, Some(49.99));
    assert_eq!(products[0].name.as_deref(), Some("Widget"));

    let history = store.get_history(products[0].id, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, 49.99);
}

#[tokio::test]
async fn reject_then_recheck_picks_up_changed_page() {
    let (workflow, _, fetcher) = setup().await;
    fetcher.serve(URL, product_page("$20.00", "Widget"));

    workflow.begin(7, URL).await;
    let replies = workflow.handle(7, AdditionEvent::Reject).await.unwrap();
    assert_eq!(replies, vec![Reply::ChooseRecheckOrManual]);

    // The page changed between the first fetch and the recheck
    fetcher.serve(URL, product_page("$18.50", "Widget"));
    let replies = workflow.handle(7, AdditionEvent::Recheck).await.unwrap();
    assert_eq!(
        replies,
        vec![Reply::PriceFound {
            price: 18.5,
            title: Some("Widget".to_string())
        }]
    );
}

#[tokio::test]
async fn recheck_against_dead_page_falls_through_to_manual_entry() {
    let (workflow, store, fetcher) = setup().await;
    fetcher.serve(URL, product_page("$20.00", "Widget"));

    workflow.begin(7, URL).await;
    workflow.handle(7, AdditionEvent::Reject).await.unwrap();

    fetcher.unserve(URL);
    let replies = workflow.handle(7, AdditionEvent::Recheck).await.unwrap();
    assert!(matches!(replies[0], Reply::PriceNotFound { .. }));
    assert_eq!(replies[1], Reply::EnterManualPrice);

    let replies = workflow
        .handle(7, AdditionEvent::ManualPrice("21,90".to_string()))
        .await
        .unwrap();
    assert_eq!(
        replies,
        vec![Reply::PriceFound {
            price: 21.9,
            title: Some("Widget".to_string())
        }]
    );

    let replies = workflow.handle(7, AdditionEvent::Confirm).await.unwrap();
    assert!(matches!(replies[0], Reply::Committed { .. }));

    let products = store.list_products(7).await.unwrap();
    assert_eq!(products[0].current_price, Some(21.9));
}

#[tokio::test]
async fn two_subscribers_track_the_same_url_independently() {
    let (workflow, store, fetcher) = setup().await;
    fetcher.serve(URL, product_page("$10.00", "Widget"));

    workflow.begin(1, URL).await;
    workflow.handle(1, AdditionEvent::Confirm).await.unwrap();

    workflow.begin(2, URL).await;
    workflow.handle(2, AdditionEvent::Confirm).await.unwrap();

    assert_eq!(store.list_products(1).await.unwrap().len(), 1);
    assert_eq!(store.list_products(2).await.unwrap().len(), 1);
    assert_eq!(store.list_all_products().await.unwrap().len(), 2);
}

#[tokio::test]
async fn re_adding_a_tracked_product_is_idempotent() {
    let (workflow, store, fetcher) = setup().await;
    fetcher.serve(URL, product_page("$10.00", "Widget"));

    workflow.begin(7, URL).await;
    workflow.handle(7, AdditionEvent::Confirm).await.unwrap();

    workflow.begin(7, URL).await;
    workflow.handle(7, AdditionEvent::Confirm).await.unwrap();

    let products = store.list_products(7).await.unwrap();
    assert_eq!(products.len(), 1);
}
