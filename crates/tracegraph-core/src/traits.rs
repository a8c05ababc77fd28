use crate::{Result, SystemTrace, TraceConfig};
use serde_json::Value;

/// Capability contract for systems that can report their own processing
/// trace.
///
/// Implementors process `input` and return a flat step log describing every
/// processing step taken, bounded by `config.max_depth`. The analyzer
/// converts the step log into a [`crate::RecursiveTrace`] via
/// [`crate::RecursiveTrace::from_system`].
pub trait Traceable {
    fn process_with_trace(&self, input: &Value, config: &TraceConfig) -> Result<SystemTrace>;
}
