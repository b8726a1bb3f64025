use super::*;
use crate::error::Error;

#[test]
fn test_get_or_load_runs_loader_once() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    let id = ResourceId::from_path("a");
    let mut calls = 0;

    let (first, loaded) = cache.get_or_load(&id, || { calls += 1; Ok(7) }).unwrap();
    assert!(loaded);
    let (second, loaded) = cache.get_or_load(&id, || { calls += 1; Ok(8) }).unwrap();
    assert!(!loaded);

    assert_eq!(calls, 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*second.lock().unwrap(), 7);
}

#[test]
fn test_failed_load_installs_nothing() {
    let mut cache: ResourceCache<u32> = ResourceCache::new();
    let id = ResourceId::from_path("missing");

    let result = cache.get_or_load(&id, || Err(Error::load("missing", "not found")));
    assert!(result.is_err());
    assert!(!cache.contains(&id));

    let (entry, loaded) = cache.get_or_load(&id, || Ok(1)).unwrap();
    assert!(loaded);
    assert_eq!(*entry.lock().unwrap(), 1);
}

#[test]
fn test_remove_and_drain() {
    let mut cache = ResourceCache::new();
    cache.insert(ResourceId::from_path("a"), 1u8);
    cache.insert(ResourceId::from_path("b"), 2u8);

    assert!(cache.remove(&ResourceId::from_path("a")).is_some());
    assert!(cache.remove(&ResourceId::from_path("a")).is_none());
    assert_eq!(cache.drain().len(), 1);
    assert!(cache.is_empty());
}
