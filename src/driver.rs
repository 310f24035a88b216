//! Top-level entry point: splices the accountant import, then instruments every
//! function body defined in the module to call it.
//!
//! Mirrors `gas::inject_gas_counter`'s shape (patch indices, then walk the code
//! section) but splits "patch indices" (`splice::splice_import`) from "walk the code
//! section" (`meter::instrument_function`) into their own modules, since this crate
//! also exposes the latter standalone for callers targeting an accountant that
//! already exists in the module.

use log::debug;
use parity_wasm::elements;

use crate::cost_table::CostTable;
use crate::error::GasError;
use crate::meter::{self, AccountantSignature};
use crate::splice::{self, ImportSpec};

/// Full configuration for a metering pass.
pub struct GasConfig {
	pub cost_table: CostTable,
	pub accountant_module: String,
	pub accountant_field: String,
	pub signature: AccountantSignature,
}

impl GasConfig {
	fn import_spec(&self) -> ImportSpec {
		let params: &[elements::ValueType] = match self.signature {
			AccountantSignature::I64 => &[elements::ValueType::I64],
			AccountantSignature::I32Pair => &[elements::ValueType::I32, elements::ValueType::I32],
		};
		ImportSpec {
			module: &self.accountant_module,
			field: &self.accountant_field,
			params,
		}
	}
}

/// Instrument every function body already defined in `module` to call the accountant
/// at `accountant_index`, without touching the import or index space.
///
/// Exposed for callers who spliced (or already had) their own accountant import and
/// only need the code-section pass.
pub fn instrument_gas(
	module: &mut elements::Module,
	accountant_index: u32,
	cost_table: &CostTable,
	signature: AccountantSignature,
) -> Result<(), GasError> {
	let code_section = match module.code_section_mut() {
		Some(section) => section,
		None => return Ok(()),
	};

	for (index, body) in code_section.bodies_mut().iter_mut().enumerate() {
		meter::instrument_function(body.code_mut(), accountant_index, cost_table, signature, index as u32)?;
	}

	Ok(())
}

/// Splice the configured accountant import into `module` and instrument every
/// function body to charge it.
pub fn meter_module(module: elements::Module, config: &GasConfig) -> Result<elements::Module, GasError> {
	let (mut module, accountant_index) = splice::splice_import(module, &config.import_spec())?;
	debug!("accountant import spliced at function index {}", accountant_index);

	instrument_gas(&mut module, accountant_index, &config.cost_table, config.signature)?;
	debug!("instrumented {} function bodies", module.code_section().map(|s| s.bodies().len()).unwrap_or(0));

	Ok(module)
}
