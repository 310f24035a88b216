//! Shifts function indices past a pivot by one, consistently across a function body
//! and across the module-level sites that also address the function index space.
//!
//! Generalizes this crate's ancestor `gas::update_call_index`, which only walked
//! `Call` immediates; this module additionally validates that the function body's
//! control structure balances, surfacing `GasError::MalformedInput` rather than
//! silently producing output the rest of the pipeline could not have metered
//! correctly.

use parity_wasm::elements::{self, Instruction};

use crate::error::GasError;

/// Tag of an open control-stack frame, mirroring the tags the distilled spec names:
/// function, block, loop, if-then, if-else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
	Function,
	Block,
	Loop,
	IfThen,
	IfElse,
}

/// Walks a function body's control structure, pushing/popping `Frame`s exactly as
/// the distilled spec's control stack does. Shared between the index rewriter (which
/// only needs balance, to know when to stop) and the meter (which needs the same
/// walk plus buffering).
pub(crate) struct ControlStack(Vec<Frame>);

impl ControlStack {
	fn new() -> Self {
		ControlStack(vec![Frame::Function])
	}

	/// Returns `true` once the implicit function frame itself has been closed.
	fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn open(&mut self, frame: Frame) {
		self.0.push(frame);
	}

	fn flip_to_else(&mut self, function: u32) -> Result<(), GasError> {
		match self.0.last_mut() {
			Some(top @ Frame::IfThen) => {
				*top = Frame::IfElse;
				Ok(())
			}
			_ => Err(GasError::MalformedInput {
				function,
				reason: "`else` with no enclosing `if`".into(),
			}),
		}
	}

	fn close(&mut self, function: u32) -> Result<(), GasError> {
		self.0.pop().map(|_| ()).ok_or_else(|| GasError::MalformedInput {
			function,
			reason: "`end` with no matching block opener".into(),
		})
	}
}

/// Rewrite every `call` immediate `i >= pivot` in `instructions` to `i + 1`.
///
/// `function` is the index of the function this body belongs to, used only to
/// attach identity to a `GasError::MalformedInput`.
pub fn rewrite_body(
	instructions: &mut elements::Instructions,
	pivot: u32,
	function: u32,
) -> Result<(), GasError> {
	let mut stack = ControlStack::new();

	for instruction in instructions.elements_mut().iter_mut() {
		if stack.is_empty() {
			return Err(GasError::MalformedInput {
				function,
				reason: "operator follows the function body's closing `end`".into(),
			});
		}
		match instruction {
			Instruction::Call(call_index) => {
				if *call_index >= pivot {
					*call_index += 1;
				}
			}
			// CallIndirect's immediate is a type index, not a function index; left untouched.
			Instruction::Block(_) => stack.open(Frame::Block),
			Instruction::Loop(_) => stack.open(Frame::Loop),
			Instruction::If(_) => stack.open(Frame::IfThen),
			Instruction::Else => stack.flip_to_else(function)?,
			Instruction::End => stack.close(function)?,
			_ => {}
		}
	}

	if !stack.is_empty() {
		return Err(GasError::MalformedInput {
			function,
			reason: "function body ends with unclosed block(s)".into(),
		});
	}

	Ok(())
}

/// Increment every function index `>= pivot` in element segments, function exports,
/// and the start-function field. Mirrors `gas::inject_gas_counter`'s section-by-section
/// patch, applied before any function body is instrumented.
pub fn rewrite_module_indices(module: &mut elements::Module, pivot: u32) {
	for section in module.sections_mut() {
		match section {
			elements::Section::Export(export_section) => {
				for export in export_section.entries_mut() {
					if let elements::Internal::Function(func_index) = export.internal_mut() {
						if *func_index >= pivot {
							*func_index += 1;
						}
					}
				}
			}
			elements::Section::Element(elements_section) => {
				for segment in elements_section.entries_mut() {
					for func_index in segment.members_mut() {
						if *func_index >= pivot {
							*func_index += 1;
						}
					}
				}
			}
			elements::Section::Start(start_idx) => {
				if *start_idx >= pivot {
					*start_idx += 1;
				}
			}
			_ => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parity_wasm::elements::Instruction::*;

	#[test]
	fn shifts_call_at_or_above_pivot() {
		let mut instructions = elements::Instructions::new(vec![Call(0), Call(1), Call(2), End]);
		rewrite_body(&mut instructions, 1, 0).unwrap();
		assert_eq!(instructions.elements(), &[Call(0), Call(2), Call(3), End]);
	}

	#[test]
	fn leaves_call_indirect_type_index_untouched() {
		let mut instructions = elements::Instructions::new(vec![CallIndirect(1, 0), End]);
		rewrite_body(&mut instructions, 0, 0).unwrap();
		assert_eq!(instructions.elements(), &[CallIndirect(1, 0), End]);
	}

	#[test]
	fn rejects_unbalanced_end() {
		let mut instructions = elements::Instructions::new(vec![End, End]);
		assert!(rewrite_body(&mut instructions, 0, 0).is_err());
	}

	#[test]
	fn rejects_unclosed_block() {
		let mut instructions = elements::Instructions::new(vec![
			Block(elements::BlockType::NoResult),
			End,
			// missing the function's own closing `end`
		]);
		assert!(rewrite_body(&mut instructions, 0, 0).is_err());
	}

	#[test]
	fn accepts_balanced_nested_blocks() {
		let mut instructions = elements::Instructions::new(vec![
			Block(elements::BlockType::NoResult),
				If(elements::BlockType::NoResult),
				Else,
				End,
			End,
			End,
		]);
		rewrite_body(&mut instructions, 0, 0).unwrap();
	}
}
