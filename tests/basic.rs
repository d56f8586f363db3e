use lapse::*;

use std::time::{Duration, Instant};

#[tokio::test]
async fn test_cache_size_operations() {
    let cache = Cache::<u8, u8>::new();

    cache.insert(1, 2, CacheExpiration::none()).await;
    cache.insert(2, 2, CacheExpiration::none()).await;
    cache.insert(3, 3, CacheExpiration::none()).await;

    assert_eq!(cache.len().await, 3);
    assert_eq!(cache.expired().await, 0);
    assert_eq!(cache.unexpired().await, 3);

    cache.clear().await;

    assert_eq!(cache.len().await, 0);
    assert_eq!(cache.expired().await, 0);
    assert_eq!(cache.unexpired().await, 0);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_counter_scenario() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("counter", 42, Duration::from_secs(60)).await;

    assert_eq!(cache.get(&"counter").await, Some(42));
    assert_eq!(cache.remove(&"counter").await, Some(42));
    assert_eq!(cache.get(&"counter").await, None);
}

#[tokio::test]
async fn test_cache_get_missing_key() {
    let cache = Cache::<&str, i32>::new();

    assert_eq!(cache.get(&"missing").await, None);
    assert!(!cache.contains_key(&"missing").await);
}

#[tokio::test]
async fn test_cache_overwrite_replaces_entry() {
    let cache = Cache::<&str, String>::new();

    assert_eq!(
        cache.insert("key", "one".to_owned(), Duration::from_millis(50)).await,
        None
    );

    // the previous live value is handed back
    assert_eq!(
        cache.insert("key", "two".to_owned(), CacheExpiration::none()).await,
        Some("one".to_owned())
    );

    // and the expiration is replaced along with the value
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.get(&"key").await, Some("two".to_owned()));
    assert_eq!(cache.expiration(&"key").await, None);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_cache_insert_over_expired_returns_nothing() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("key", 1, Duration::from_millis(20)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(cache.insert("key", 2, Duration::from_secs(60)).await, None);
    assert_eq!(cache.get(&"key").await, Some(2));
}

#[tokio::test]
async fn test_cache_get_expired_evicts() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("key", 42, Duration::from_millis(50)).await;
    assert_eq!(cache.get(&"key").await, Some(42));

    tokio::time::sleep(Duration::from_millis(100)).await;

    // still stored until something touches it
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.expired().await, 1);
    assert!(!cache.contains_key(&"key").await);

    assert_eq!(cache.get(&"key").await, None);
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_cache_zero_duration_never_expires() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("key", 42, Duration::ZERO).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.get(&"key").await, Some(42));
    assert_eq!(cache.expiration(&"key").await, None);
    assert_eq!(cache.unexpired().await, 1);
}

#[tokio::test]
async fn test_cache_untracked_never_expires() {
    let cache = Cache::<&str, i32>::new();

    cache.insert_untracked("key", 42).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(cache.contains_key(&"key").await);
    assert_eq!(cache.get(&"key").await, Some(42));
}

#[tokio::test]
async fn test_cache_instant_expiration_is_inclusive() {
    let cache = Cache::<&str, i32>::new();

    // an entry expiring "now" is already gone
    cache.insert("key", 42, Instant::now()).await;

    assert_eq!(cache.get(&"key").await, None);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_expiration_lookup() {
    let cache = Cache::<&str, i32>::new();

    let before = Instant::now();
    cache.insert("key", 42, Duration::from_secs(60)).await;

    let expiration = cache.expiration(&"key").await.unwrap();

    assert!(expiration >= before + Duration::from_secs(60));
    assert!(expiration <= Instant::now() + Duration::from_secs(60));
    assert_eq!(cache.expiration(&"missing").await, None);
}

#[tokio::test]
async fn test_cache_delete_operations() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("key", 42, Duration::from_secs(60)).await;

    cache.delete(&"key").await;
    assert_eq!(cache.get(&"key").await, None);

    // deleting again, or deleting something never stored, is a no-op
    cache.delete(&"key").await;
    cache.delete(&"missing").await;

    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_remove_expired_entry() {
    let cache = Cache::<&str, i32>::new();

    cache.insert("key", 42, Duration::from_millis(50)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.remove(&"key").await, None);
    assert_eq!(cache.get(&"key").await, None);

    // the key is gone either way
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_remove_missing_key() {
    let cache = Cache::<&str, i32>::new();

    assert_eq!(cache.remove(&"missing").await, None);
}

#[tokio::test]
async fn test_cache_purge_operations() {
    let cache = Cache::<u32, u32>::new();
    cache.shutdown();

    for i in 0..10 {
        cache.insert(i, i, Duration::from_millis(20)).await;
    }
    for i in 10..15 {
        cache.insert(i, i, Duration::from_secs(60)).await;
    }

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(cache.expired().await, 10);
    assert_eq!(cache.purge().await, 10);
    assert_eq!(cache.len().await, 5);
    assert_eq!(cache.purge().await, 0);
}

#[tokio::test]
async fn test_cache_different_value_types() {
    #[derive(Clone, Debug, PartialEq)]
    struct User {
        name: String,
        age: u8,
    }

    let users = Cache::<&str, User>::new();
    let user = User {
        name: "John".to_owned(),
        age: 30,
    };

    users.insert("user1", user.clone(), Duration::from_secs(60)).await;
    assert_eq!(users.get(&"user1").await, Some(user));

    let numbers = Cache::<i64, Vec<u8>>::new();

    numbers.insert(-1, vec![1, 2, 3], Duration::from_secs(60)).await;
    assert_eq!(numbers.get(&-1).await, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn test_cache_random_range_from_zero_expires() {
    let cache = Cache::<u8, u8>::new();

    cache.insert(1, 1, 0..1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(cache.get(&1).await, None);
    assert!(cache.is_empty().await);
}
