/// Lumen3D Engine - Singleton manager for engine subsystems
///
/// Holds the process-wide resource manager and the global logger. Every slot
/// is guarded by a RwLock so the cache can be reached from any thread, while
/// mutation of the manager itself goes through its Mutex.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::config::MemoryBudget;
use crate::graphics_device::GraphicsDevice;
use crate::resource::{AssetLoader, ResourceManager};
use crate::error::Result;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    resource_manager: RwLock<Option<Arc<Mutex<ResourceManager>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            resource_manager: RwLock::new(None),
        }
    }
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use lumen_3d_engine::lumen3d::{Engine, config::MemoryBudget};
/// # fn device() -> Arc<Mutex<dyn lumen_3d_engine::lumen3d::render::GraphicsDevice>> { unimplemented!() }
/// # fn loader() -> Arc<dyn lumen_3d_engine::lumen3d::resource::AssetLoader> { unimplemented!() }
///
/// Engine::initialize()?;
/// Engine::create_resource_manager(device(), loader(), MemoryBudget::default())?;
///
/// let resources = Engine::resource_manager()?;
/// // ...
///
/// Engine::shutdown();
/// # Ok::<(), lumen_3d_engine::lumen3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| crate::engine_err!(InitializationFailed, "lumen3d::Engine",
            "Engine not initialized. Call Engine::initialize() first."))
    }

    /// Initialize the engine
    ///
    /// Idempotent. Must be called before creating any subsystem.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine
    ///
    /// Releases every cached resource, then drops the resource manager.
    /// Handles still held by callers stay allocated as objects but are
    /// unusable from then on.
    pub fn shutdown() {
        let Some(state) = ENGINE_STATE.get() else {
            return;
        };
        let manager = match state.resource_manager.write() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                crate::engine_error!("lumen3d::Engine", "ResourceManager lock poisoned during shutdown");
                return;
            }
        };
        if let Some(manager) = manager {
            match manager.lock() {
                Ok(mut manager) => {
                    if let Err(error) = manager.release_all() {
                        crate::engine_warn!("lumen3d::Engine", "Shutdown release failed: {}", error);
                    }
                }
                Err(_) => crate::engine_error!("lumen3d::Engine", "ResourceManager poisoned during shutdown"),
            }
            crate::engine_info!("lumen3d::Engine", "Engine shut down");
        }
    }

    // ===== RESOURCE MANAGER API =====

    /// Create and register the resource manager singleton
    ///
    /// # Errors
    ///
    /// - `Error::InitializationFailed` if the engine is not initialized or a
    ///   resource manager already exists
    pub fn create_resource_manager(
        graphics_device: Arc<Mutex<dyn GraphicsDevice>>,
        asset_loader: Arc<dyn AssetLoader>,
        budget: MemoryBudget,
    ) -> Result<Arc<Mutex<ResourceManager>>> {
        let state = Self::state()?;
        let mut slot = state.resource_manager.write()
            .map_err(|_| crate::engine_err!("lumen3d::Engine", "ResourceManager lock poisoned"))?;

        if slot.is_some() {
            crate::engine_bail!(InitializationFailed, "lumen3d::Engine",
                "ResourceManager already exists. Call Engine::destroy_resource_manager() first.");
        }

        let manager = Arc::new(Mutex::new(ResourceManager::new(graphics_device, asset_loader, budget)));
        *slot = Some(manager.clone());

        crate::engine_info!("lumen3d::Engine", "ResourceManager singleton created");
        Ok(manager)
    }

    /// Get the resource manager singleton
    ///
    /// # Errors
    ///
    /// - `Error::InitializationFailed` if the engine is not initialized or
    ///   the resource manager has not been created
    pub fn resource_manager() -> Result<Arc<Mutex<ResourceManager>>> {
        let state = Self::state()?;
        let slot = state.resource_manager.read()
            .map_err(|_| crate::engine_err!("lumen3d::Engine", "ResourceManager lock poisoned"))?;

        match slot.as_ref() {
            Some(manager) => Ok(manager.clone()),
            None => Err(crate::engine_err!(InitializationFailed, "lumen3d::Engine",
                "ResourceManager not created. Call Engine::create_resource_manager() first.")),
        }
    }

    /// Destroy the resource manager singleton
    ///
    /// The manager releases its resources when the last handle is dropped.
    pub fn destroy_resource_manager() -> Result<()> {
        let state = Self::state()?;
        let mut slot = state.resource_manager.write()
            .map_err(|_| crate::engine_err!("lumen3d::Engine", "ResourceManager lock poisoned"))?;
        *slot = None;

        crate::engine_info!("lumen3d::Engine", "ResourceManager singleton destroyed");
        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut slot) = state.resource_manager.write() {
                *slot = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumen_3d_engine::lumen3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without file:line (used by engine_info!, engine_warn!, ...)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
