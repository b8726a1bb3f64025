//! Unit tests for Engine singleton manager
//!
//! Tests initialization, ResourceManager lifecycle and the logging API.
//!
//! IMPORTANT: ENGINE_STATE is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::lumen3d::{Engine, Error};
use crate::lumen3d::log::{Logger, LogEntry, LogSeverity};
use crate::config::MemoryBudget;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::GraphicsDevice;
use crate::resource::mock_asset_loader::MockAssetLoader;
use crate::resource::{AssetLoader, DataStorePolicy, Resource};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == "lumen3d::Engine" || entry.source == "lumen3d::EngineTest" {
            self.entries.lock().unwrap().push(format!("{:?}: {}", entry.severity, entry.message));
        }
    }
}

fn setup() {
    Engine::reset_for_testing();
    let _ = Engine::initialize();
}

fn collaborators() -> (Arc<Mutex<MockGraphicsDevice>>, Arc<Mutex<dyn GraphicsDevice>>, Arc<dyn AssetLoader>) {
    let device = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let shared: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    let loader: Arc<dyn AssetLoader> = Arc::new(MockAssetLoader::new().with_image("a.png", 2, 2));
    (device, shared, loader)
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_multiple_initialize_calls_idempotent() {
    setup();
    Engine::initialize().unwrap();
    Engine::initialize().unwrap();

    let (_, device, loader) = collaborators();
    assert!(Engine::create_resource_manager(device, loader, MemoryBudget::default()).is_ok());
    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_shutdown_releases_cached_resources() {
    setup();
    let (mock, device, loader) = collaborators();
    let manager = Engine::create_resource_manager(device, loader, MemoryBudget::default()).unwrap();
    let texture = manager.lock().unwrap()
        .load_texture("a.png", DataStorePolicy::AllowDemotion)
        .unwrap();

    Engine::shutdown();

    assert!(texture.lock().unwrap().is_released());
    assert_eq!(mock.lock().unwrap().textures_destroyed, 1);
    assert!(matches!(Engine::resource_manager(), Err(Error::InitializationFailed(_))));
    Engine::initialize().unwrap();
}

#[test]
#[serial]
fn test_shutdown_idempotent() {
    setup();
    Engine::shutdown();
    Engine::shutdown();
    Engine::initialize().unwrap();
}

// ============================================================================
// RESOURCE MANAGER API TESTS
// ============================================================================

#[test]
#[serial]
fn test_resource_manager_is_shared() {
    setup();
    let (_, device, loader) = collaborators();
    let created = Engine::create_resource_manager(device, loader, MemoryBudget::default()).unwrap();
    let fetched = Engine::resource_manager().unwrap();

    assert!(Arc::ptr_eq(&created, &fetched));
    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_create_resource_manager_twice_fails() {
    setup();
    let (_, device, loader) = collaborators();
    Engine::create_resource_manager(device.clone(), loader.clone(), MemoryBudget::default()).unwrap();

    let result = Engine::create_resource_manager(device, loader, MemoryBudget::default());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_resource_manager_missing() {
    setup();
    assert!(matches!(Engine::resource_manager(), Err(Error::InitializationFailed(_))));
}

#[test]
#[serial]
fn test_destroy_resource_manager_allows_recreation() {
    setup();
    let (_, device, loader) = collaborators();
    Engine::create_resource_manager(device.clone(), loader.clone(), MemoryBudget::default()).unwrap();
    Engine::destroy_resource_manager().unwrap();

    assert!(Engine::resource_manager().is_err());
    assert!(Engine::create_resource_manager(device, loader, MemoryBudget::default()).is_ok());
    Engine::reset_for_testing();
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_engine_logs() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    let (_, device, loader) = collaborators();
    Engine::create_resource_manager(device, loader, MemoryBudget::default()).unwrap();
    Engine::reset_logger();
    Engine::reset_for_testing();

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("Info"));
}

#[test]
#[serial]
fn test_errors_are_logged() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    let _ = Engine::resource_manager();
    Engine::reset_logger();

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("Error"));
}

#[test]
#[serial]
fn test_log_detailed_reaches_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    Engine::log(LogSeverity::Warn, "lumen3d::EngineTest", "low memory".to_string());
    Engine::log_detailed(LogSeverity::Error, "lumen3d::EngineTest", "lost".to_string(), "x.rs", 3);
    Engine::reset_logger();

    let entries = entries.lock().unwrap();
    assert_eq!(*entries, vec!["Warn: low memory".to_string(), "Error: lost".to_string()]);
}
