//! Runtime Lifecycle
//!
//! Start/stop tracking for the managed runtime. Locating a JVM, assembling a
//! classpath and fetching dependencies happen elsewhere; this module only
//! records whether the runtime is available, which is what class
//! resolution and the converter registries key off.
//!
//! Starting is idempotent, and so is stopping. A stopped runtime can be
//! started again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::info;

use crate::error::{JvmError, JvmResult};

/// Global flag indicating the runtime is up
static JVM_RUNNING: AtomicBool = AtomicBool::new(false);

/// Number of times the runtime has been started (for debugging)
static START_COUNT: AtomicU64 = AtomicU64::new(0);

/// Start the managed runtime.
///
/// Returns immediately if it is already running.
pub fn start_jvm() -> JvmResult<()> {
    if JVM_RUNNING
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Ok(());
    }

    let count = START_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    info!(start_count = count, "JVM started");
    Ok(())
}

/// Check if the managed runtime is running
pub fn jvm_started() -> bool {
    JVM_RUNNING.load(Ordering::Acquire)
}

/// Stop the managed runtime.
///
/// Objects created before shutdown stay usable as plain values; class
/// resolution fails until the runtime is started again.
pub fn shutdown_jvm() -> JvmResult<()> {
    if JVM_RUNNING
        .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        info!("JVM shut down");
    }
    Ok(())
}

/// Fail with [`JvmError::NotStarted`] unless the runtime is running.
pub fn assert_jvm_started() -> JvmResult<()> {
    if jvm_started() {
        Ok(())
    } else {
        Err(JvmError::NotStarted)
    }
}

/// How many times the runtime has been started in this process.
pub fn start_count() -> u64 {
    START_COUNT.load(Ordering::Relaxed)
}
