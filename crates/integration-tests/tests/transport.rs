//! Transport behaviour: credentials, status mapping, decoding and
//! cancellation against the fake store over HTTP.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use woostore_core::{Product, ProductId};
use woostore_integration_tests::{
    CONSUMER_KEY, FakeStore, RETRY_AFTER_SECS, RunningStore, product_json,
};
use woostore_storefront::config::{AuthMode, WooConfig};
use woostore_storefront::repository::{LoadState, Repository};
use woostore_storefront::screens::HomeScreen;
use woostore_storefront::source::RemoteDataSource;
use woostore_storefront::woo::{WooClient, WooError};

fn store() -> FakeStore {
    FakeStore::new().with_products(vec![
        product_json(1, "Blue Mug", "4.00", &[]),
        product_json(2, "Red Mug", "6.50", &[]),
    ])
}

fn repository_with(config: &WooConfig) -> Repository {
    let client = WooClient::new(config).expect("client should build");
    Repository::shared(Arc::new(RemoteDataSource::new(client, None)))
}

async fn product_states(repository: &Repository, id: i64) -> Vec<LoadState<Product>> {
    repository.product(ProductId::new(id)).collect().await
}

fn final_error(states: &[LoadState<Product>]) -> &WooError {
    states
        .last()
        .and_then(LoadState::error)
        .expect("expected the stream to end in an error")
}

async fn started() -> RunningStore {
    store().spawn().await.expect("fake store should start")
}

#[tokio::test]
async fn test_query_emits_loading_then_success() {
    let running = started().await;
    let repository = running.repository(None).expect("repository");

    let states = product_states(&repository, 2).await;

    assert_eq!(states.len(), 2);
    assert!(states[0].is_loading());
    assert_eq!(states[1].success().map(|p| p.name.as_str()), Some("Red Mug"));
}

#[tokio::test]
async fn test_streams_are_lazy_until_polled() {
    let running = started().await;
    let repository = running.repository(None).expect("repository");

    let stream = repository.product(ProductId::new(1));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(running.store.requests().is_empty());

    let states: Vec<_> = stream.collect().await;
    assert_eq!(states.len(), 2);
    assert_eq!(running.store.requests().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let running = started().await;
    running.store.fail("products/1", 429);
    let repository = running.repository(None).expect("repository");

    let states = product_states(&repository, 1).await;

    assert!(states[0].is_loading());
    assert!(matches!(
        final_error(&states),
        WooError::RateLimited(secs) if *secs == RETRY_AFTER_SECS
    ));
}

#[tokio::test]
async fn test_wrong_secret_is_rejected_by_the_store() {
    let running = started().await;
    let config = WooConfig::new(&running.base_url(), CONSUMER_KEY, "cs_not_the_secret")
        .expect("config should build");
    let repository = repository_with(&config);

    let states = product_states(&repository, 1).await;

    match final_error(&states) {
        WooError::Api { status, code, .. } => {
            assert_eq!(*status, 401);
            assert_eq!(code, "woocommerce_rest_cannot_view");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_basic_auth_keeps_credentials_out_of_the_url() {
    let running = started().await;
    let mut config = running.config().expect("config");
    config.auth_mode = AuthMode::Basic;
    let repository = repository_with(&config);

    let states = product_states(&repository, 1).await;

    assert!(states[1].success().is_some());
    let request = &running.store.requests()[0];
    assert_eq!(request.param("consumer_key"), None);
    assert_eq!(request.param("consumer_secret"), None);
}

#[tokio::test]
async fn test_non_json_body_is_a_parse_error() {
    let running = started().await;
    running.store.garble("products/2");
    let repository = running.repository(None).expect("repository");

    let states = product_states(&repository, 2).await;

    assert!(matches!(final_error(&states), WooError::Parse(_)));
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let running = started().await;
    running.store.fail("products/1", 502);
    let repository = running.repository(None).expect("repository");

    let states = product_states(&repository, 1).await;
    let error = final_error(&states);

    assert_eq!(error.status(), Some(502));
    assert!(!error.is_transport());
}

#[tokio::test]
async fn test_unreachable_store_is_a_transport_error() {
    let running = started().await;
    let repository = running.repository(None).expect("repository");
    drop(running);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let states = product_states(&repository, 1).await;

    assert!(final_error(&states).is_transport());
}

#[tokio::test]
async fn test_destroyed_screen_ignores_late_responses() {
    let running = started().await;
    running.store.stall(Duration::from_millis(300));
    let screen = HomeScreen::new(running.repository(None).expect("repository"), 2);
    let latest = screen.latest().clone();

    // Let the requests reach the store before tearing down.
    while running.store.requests().len() < 3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    screen.destroy().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(latest.latest().is_some_and(|state| state.is_loading()));
}
