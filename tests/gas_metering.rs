//! End-to-end: meter a module built with the same `parity_wasm::builder` API a real
//! caller would use, then validate the result is still well-formed wasm.
//!
//! Grounded on the old `tests/diff.rs`'s `validate_wasm` pattern (read the binary back
//! with `wabt` and run its validator) and on `splice.rs`'s builder-based test modules.

extern crate parity_wasm;
extern crate wabt;
extern crate wasm_gas_meter as utils;

use std::collections::HashMap;

use parity_wasm::builder;
use parity_wasm::elements::{self, Instruction::*};
use utils::{meter_module, AccountantSignature, CostTable, GasConfig, OpTag};

fn validate(binary: &[u8]) {
	wabt::Module::read_binary(binary, &Default::default())
		.expect("metered module should still decode")
		.validate()
		.expect("metered module should still validate");
}

fn uniform_table(cost: u64) -> CostTable {
	CostTable::uniform(cost)
}

#[test]
fn metered_module_still_validates() {
	let module = builder::module()
		.function()
			.signature().build()
			.body().with_instructions(elements::Instructions::new(vec![
				I32Const(1),
				I32Const(2),
				I32Add,
				Drop,
				End,
			])).build()
			.build()
		.build();

	let config = GasConfig {
		cost_table: uniform_table(1),
		accountant_module: "env".into(),
		accountant_field: "gas_counter".into(),
		signature: AccountantSignature::I64,
	};

	let metered = meter_module(module, &config).unwrap();
	let binary = parity_wasm::serialize(metered).unwrap();
	validate(&binary);
}

/// A function that calls another locally-defined function: after splicing the
/// accountant import at the front of the function-index space, the call target inside
/// the caller's body must be shifted, not just the export/element-segment references
/// already covered by `splice.rs`'s unit tests.
#[test]
fn call_to_sibling_function_shifts_and_still_validates() {
	let module = builder::module()
		.function()
			.signature().build()
			.body().with_instructions(elements::Instructions::new(vec![End])).build()
			.build()
		.function()
			.signature().build()
			.body().with_instructions(elements::Instructions::new(vec![Call(0), End])).build()
			.build()
		.build();

	let entries: HashMap<OpTag, u64> = OpTag::ALL.iter().map(|t| (*t, 2)).collect();
	let config = GasConfig {
		cost_table: CostTable::new(entries).unwrap(),
		accountant_module: "env".into(),
		accountant_field: "gas_counter".into(),
		signature: AccountantSignature::I64,
	};

	let metered = meter_module(module, &config).unwrap();

	// accountant lands at index 0; the two original functions become 1 and 2, and the
	// `call 0` inside the second one must now point at 2, not at the accountant.
	let bodies = metered.code_section().unwrap().bodies();
	let second_body = bodies[1].code().elements();
	assert!(second_body.contains(&Call(2)), "{:?}", second_body);
	assert!(!second_body.contains(&Call(0)), "{:?}", second_body);

	let binary = parity_wasm::serialize(metered).unwrap();
	validate(&binary);
}

#[test]
fn i32_pair_precision_round_trips_through_validation() {
	let module = builder::module()
		.function()
			.signature().build()
			.body().with_instructions(elements::Instructions::new(vec![Nop, End])).build()
			.build()
		.build();

	let config = GasConfig {
		cost_table: uniform_table(3),
		accountant_module: "env".into(),
		accountant_field: "gas_counter".into(),
		signature: AccountantSignature::I32Pair,
	};

	let metered = meter_module(module, &config).unwrap();
	let binary = parity_wasm::serialize(metered).unwrap();
	validate(&binary);
}
