//! Synthesis of a resolver from a configured locator function.

use tracing::debug;

use crate::config::LocatorRef;
use crate::error::{WiringError, WiringResult};
use crate::foundation::Resolver;
use crate::registry::{FunctionSignature, Member, TypeRegistry, Visibility};

/// Turns `locator` into a resolver.
///
/// The locator must name a public static function of shape
/// `(TypeDescriptor) -> Instance` on a registered type.
pub fn synthesize_resolver(registry: &TypeRegistry, locator: &LocatorRef) -> WiringResult<Resolver> {
    let fail = |reason: &str| {
        WiringError::locator(
            locator.type_name.as_str(),
            locator.method_name.as_str(),
            reason,
        )
    };

    let entry = registry
        .get(&locator.type_name)
        .ok_or_else(|| fail("type cannot be loaded"))?;

    let function = entry
        .function(&locator.method_name)
        .filter(|f| f.visibility() == Visibility::Public && f.is_static())
        .ok_or_else(|| fail("no public static function with this name"))?;

    if !function.signature().is_locator() {
        return Err(fail(&format!(
            "signature is {}, expected {}",
            function.signature(),
            FunctionSignature::locator()
        )));
    }

    let resolver = function
        .as_resolver()
        .ok_or_else(|| fail("function body is not a resolver"))?;

    debug!(locator = %locator.key(), "Using configured locator as resolver");
    Ok(resolver)
}
