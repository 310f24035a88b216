use std::fmt;

/// Errors produced while splicing an import or instrumenting a module for gas metering.
#[derive(Debug)]
pub enum GasError {
	/// The cost table is missing an entry for some operator, or the requested
	/// accountant import name/signature could not be resolved.
	ConfigError(String),
	/// A function body could not be walked: its control stack did not balance,
	/// or it referenced an index out of range for its index space.
	MalformedInput {
		function: u32,
		reason: String,
	},
	/// A single segment's summed cost would have exceeded `i64::MAX`.
	CostOverflow {
		function: u32,
	},
	/// An instrumenter invariant was violated. Implementers must make this
	/// unreachable; if observed, the module under transform must be discarded.
	InternalError(String),
}

impl fmt::Display for GasError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use self::GasError::*;
		match self {
			ConfigError(msg) => write!(f, "gas metering configuration error: {}", msg),
			MalformedInput { function, reason } =>
				write!(f, "malformed function body (function index {}): {}", function, reason),
			CostOverflow { function } =>
				write!(f, "gas cost overflow while instrumenting function index {}", function),
			InternalError(msg) => write!(f, "internal error in gas instrumenter: {}", msg),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for GasError {}
