//! Adds a function import to a module and shifts every function-index reference that
//! addresses the space above it by one, so the rest of the module keeps meaning what
//! it meant before the import was added.
//!
//! Grounded on `gas::inject_gas_counter`'s builder sequence (push a signature, push
//! an import, then patch every section that addresses the function index space) but
//! reorders it: this module computes the pivot from the *current* import count
//! before appending anything, then appends the import last, rather than appending
//! first and subtracting it back out of `import_count()` afterward. Both orders reach
//! the same final module; this one avoids a function that is importable, callable,
//! and already shifted-past by its own call sites before it is declared.

use parity_wasm::{builder, elements};

use crate::error::GasError;
use crate::index_rewrite;

/// A function import to splice into a module: `module.field: params -> ()`.
///
/// The accountant this crate calls never returns a value, so the signature built
/// from this spec is always void-returning.
pub struct ImportSpec<'a> {
	pub module: &'a str,
	pub field: &'a str,
	pub params: &'a [elements::ValueType],
}

/// Splice `import` into `module`'s function-import space, shifting every existing
/// function-index reference that now falls at or above the pivot.
///
/// Returns the rebuilt module along with the function index the new import was
/// placed at.
pub fn splice_import(
	mut module: elements::Module,
	import: &ImportSpec,
) -> Result<(elements::Module, u32), GasError> {
	let pivot = module.import_count(elements::ImportCountType::Function) as u32;

	index_rewrite::rewrite_module_indices(&mut module, pivot);

	if let Some(code_section) = module.code_section_mut() {
		for (index, body) in code_section.bodies_mut().iter_mut().enumerate() {
			index_rewrite::rewrite_body(body.code_mut(), pivot, index as u32)?;
		}
	}

	let mut sig_builder = builder::signature();
	for param in import.params {
		sig_builder = match param {
			elements::ValueType::I32 => sig_builder.param().i32(),
			elements::ValueType::I64 => sig_builder.param().i64(),
			elements::ValueType::F32 => sig_builder.param().f32(),
			elements::ValueType::F64 => sig_builder.param().f64(),
		};
	}
	let sig = sig_builder.build_sig();

	let mut mbuilder = builder::from_module(module);
	let type_index = mbuilder.push_signature(sig);
	mbuilder.push_import(
		builder::import()
			.module(import.module)
			.field(import.field)
			.external().func(type_index)
			.build(),
	);

	Ok((mbuilder.build(), pivot))
}

#[cfg(test)]
mod tests {
	use super::*;
	use parity_wasm::elements::Instruction::*;

	fn sample_module() -> elements::Module {
		let module = builder::module()
			.function()
				.signature().build()
				.body().with_instructions(elements::Instructions::new(vec![Call(0), End])).build()
				.build()
			.build();

		builder::from_module(module)
			.with_export(elements::ExportEntry::new("entry".into(), elements::Internal::Function(0)))
			.build()
	}

	#[test]
	fn places_import_at_prior_function_count_and_shifts_call() {
		let module = sample_module();
		let spec = ImportSpec { module: "env", field: "gas_counter", params: &[elements::ValueType::I64] };
		let (module, pivot) = splice_import(module, &spec).unwrap();
		assert_eq!(pivot, 0);

		let body = module.code_section().unwrap().bodies()[0].code().elements();
		assert_eq!(body, &[Call(1), End]);

		let export = &module.export_section().unwrap().entries()[0];
		match export.internal() {
			elements::Internal::Function(idx) => assert_eq!(*idx, 1),
			_ => panic!("expected function export"),
		}

		assert_eq!(module.import_count(elements::ImportCountType::Function), 1);
	}

	#[test]
	fn rejects_malformed_body() {
		let module = builder::module()
			.function()
				.signature().build()
				.body().with_instructions(elements::Instructions::new(vec![End, End])).build()
				.build()
			.build();
		let spec = ImportSpec { module: "env", field: "gas_counter", params: &[elements::ValueType::I64] };
		assert!(splice_import(module, &spec).is_err());
	}

	/// Scenario C from the distilled spec: an element segment entry addressing the
	/// sole def must shift along with every other function-index site.
	#[test]
	fn shifts_element_segment_entries() {
		let mut module = sample_module();
		module.sections_mut().push(elements::Section::Element(
			elements::ElementSection::with_entries(vec![
				elements::ElementSegment::new(
					0,
					Some(elements::InitExpr::new(vec![I32Const(0), End])),
					vec![0],
				),
			]),
		));

		let spec = ImportSpec { module: "env", field: "gas_counter", params: &[elements::ValueType::I64] };
		let (module, pivot) = splice_import(module, &spec).unwrap();
		assert_eq!(pivot, 0);

		let entries = module.elements_section().unwrap().entries();
		assert_eq!(entries[0].members(), &[1]);
	}

	/// Scenario E from the distilled spec: the start-function field must shift the
	/// same way exports and element entries do.
	#[test]
	fn shifts_start_function() {
		let mut module = builder::module()
			.function()
				.signature().build()
				.body().with_instructions(elements::Instructions::new(vec![End])).build()
				.build()
			.function()
				.signature().build()
				.body().with_instructions(elements::Instructions::new(vec![End])).build()
				.build()
			.build();

		module.sections_mut().push(elements::Section::Start(1));

		let spec = ImportSpec { module: "env", field: "gas_counter", params: &[elements::ValueType::I64] };
		let (module, pivot) = splice_import(module, &spec).unwrap();
		assert_eq!(pivot, 0);

		let start = module.sections().iter().find_map(|section| match section {
			elements::Section::Start(idx) => Some(*idx),
			_ => None,
		});
		assert_eq!(start, Some(2));
	}
}
