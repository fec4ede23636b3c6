//! Global Dispatchers
//!
//! The two process-wide registries and the public conversion entry points.
//!
//! Both registries start empty. The first call that needs them starts the
//! managed runtime (if it is not running) and fills them with the stock
//! rules, built from the process-wide [`config`](crate::config). They are
//! never emptied afterwards: a runtime restart reuses them as they are.

use std::sync::OnceLock;

use jbridge_jvm::{start_jvm, JObject};
use tracing::{debug, trace};

use crate::config;
use crate::converter::{Converter, ConverterRegistry};
use crate::error::BridgeResult;
use crate::hints::Hints;
use crate::host::HostValue;
use crate::to_host::host_converters;
use crate::to_managed::managed_converters;

/// Registry behind [`to_managed`]
pub fn managed_registry() -> &'static ConverterRegistry<HostValue, JObject> {
    static REGISTRY: OnceLock<ConverterRegistry<HostValue, JObject>> = OnceLock::new();
    REGISTRY.get_or_init(|| ConverterRegistry::new("to_managed"))
}

/// Registry behind [`to_host`]
pub fn host_registry() -> &'static ConverterRegistry<HostValue, HostValue> {
    static REGISTRY: OnceLock<ConverterRegistry<HostValue, HostValue>> = OnceLock::new();
    REGISTRY.get_or_init(|| ConverterRegistry::new("to_host"))
}

/// Start the runtime and install the stock rules, once.
pub fn ensure_populated() -> BridgeResult<()> {
    start_jvm()?;
    static POPULATED: OnceLock<BridgeResult<()>> = OnceLock::new();
    POPULATED.get_or_init(populate).clone()
}

fn populate() -> BridgeResult<()> {
    let config = config::current();
    let managed = managed_converters()?;
    let host = host_converters(&config)?;
    debug!(
        ?config,
        managed = managed.len(),
        host = host.len(),
        "installing stock converters"
    );
    managed_registry().extend(managed);
    host_registry().extend(host);
    Ok(())
}

/// Convert a host value into a managed object.
///
/// `hints` steer the choice between rules, e.g. `type=long` selects a
/// `java.lang.Long` for a small integer. Fails with
/// [`BridgeError::UnsupportedType`](crate::BridgeError::UnsupportedType)
/// when no rule applies.
pub fn to_managed(value: &HostValue, hints: &Hints) -> BridgeResult<JObject> {
    ensure_populated()?;
    managed_registry().convert(value, hints)
}

/// Convert a managed value into its host counterpart.
///
/// Values that are not managed objects come back unchanged. With `gentle`,
/// a value no rule can convert is also returned unchanged instead of
/// failing.
pub fn to_host(value: &HostValue, gentle: bool) -> BridgeResult<HostValue> {
    ensure_populated()?;
    match host_registry().convert(value, &Hints::new()) {
        Err(err) if gentle && err.is_unsupported_type() => {
            trace!(error = %err, "gentle conversion kept the value as is");
            Ok(value.clone())
        }
        result => result,
    }
}

/// Add a host→managed rule.
///
/// The stock rules are installed first, so the new rule wins ties with
/// them.
pub fn register_managed_converter(converter: Converter<HostValue, JObject>) -> BridgeResult<()> {
    ensure_populated()?;
    debug!(
        converter = converter.name(),
        priority = %converter.priority(),
        "registering to_managed converter"
    );
    managed_registry().insert(converter);
    Ok(())
}

/// Add a managed→host rule.
///
/// The stock rules are installed first, so the new rule wins ties with
/// them.
pub fn register_host_converter(converter: Converter<HostValue, HostValue>) -> BridgeResult<()> {
    ensure_populated()?;
    debug!(
        converter = converter.name(),
        priority = %converter.priority(),
        "registering to_host converter"
    );
    host_registry().insert(converter);
    Ok(())
}
