//! TOML deserialization for a `CostTable`, used at the CLI boundary.
//!
//! Costs remain data, never hard-coded or macro-generated, mirroring this codebase's
//! `rules::Set::default()` pattern of configuration-by-value. Unlike `rules::Set`
//! this file format need not be exhaustive: a `default` entry fills in every
//! mnemonic the file itself doesn't mention.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::cost_table::{CostTable, OpTag};
use crate::error::GasError;

#[derive(Debug, Deserialize)]
struct CostTableFile {
	/// Cost applied to any mnemonic not present in `costs`.
	default: u64,
	#[serde(default)]
	costs: HashMap<String, u64>,
}

/// Load a `CostTable` from a TOML file shaped like:
///
/// ```toml
/// default = 1
///
/// [costs]
/// "i32.add" = 1
/// "call" = 10
/// "memory.grow" = 1000
/// ```
pub fn load_cost_table(path: &Path) -> Result<CostTable, GasError> {
	let text = std::fs::read_to_string(path)
		.map_err(|e| GasError::ConfigError(format!("reading {}: {}", path.display(), e)))?;
	parse_cost_table(&text)
}

fn parse_cost_table(text: &str) -> Result<CostTable, GasError> {
	let file: CostTableFile = toml::from_str(text)
		.map_err(|e| GasError::ConfigError(format!("parsing cost table: {}", e)))?;

	let mut entries: HashMap<OpTag, u64> = HashMap::with_capacity(OpTag::ALL.len());
	for tag in OpTag::ALL.iter() {
		let cost = file.costs.get(tag.mnemonic()).copied().unwrap_or(file.default);
		entries.insert(*tag, cost);
	}

	CostTable::new(entries)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_fills_unmentioned_mnemonics() {
		let table = parse_cost_table(r#"
			default = 1
			[costs]
			"call" = 10
		"#).unwrap();
		assert_eq!(table.cost_of(&parity_wasm::elements::Instruction::Call(0)).unwrap(), 10);
		assert_eq!(table.cost_of(&parity_wasm::elements::Instruction::Nop).unwrap(), 1);
	}

	#[test]
	fn rejects_malformed_toml() {
		assert!(parse_cost_table("not valid toml = [").is_err());
	}
}
