//! A total, dense mapping from operator mnemonic to gas cost.
//!
//! Generalizes this crate's ancestor `rules::Set`, which kept a
//! `HashMap<InstructionType, u32>` keyed by a coarse instruction category. Here every
//! mnemonic gets its own entry, keyed by the discriminant of `OpTag` rather than by
//! string, so construction can statically enumerate (and verify completeness against)
//! every operator this crate classifies.

use std::collections::HashMap;
use parity_wasm::elements::Instruction;

use crate::error::GasError;

macro_rules! op_tags {
	($($variant:ident),+ $(,)?) => {
		/// One tag per operator mnemonic this crate meters.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		#[allow(missing_docs)]
		pub enum OpTag {
			$($variant),+
		}

		impl OpTag {
			/// Every tag this crate classifies, in declaration order (and so, since
			/// `OpTag` is fieldless, in discriminant order too).
			pub const ALL: &'static [OpTag] = &[$(OpTag::$variant),+];
			const COUNT: usize = Self::ALL.len();
		}
	};
}

op_tags! {
	Unreachable, Nop,
	Block, Loop, If, Else, End,
	Br, BrIf, BrTable, Return, Call, CallIndirect, Drop, Select,
	GetLocal, SetLocal, TeeLocal, GetGlobal, SetGlobal,
	I32Load, I64Load, F32Load, F64Load,
	I32Load8S, I32Load8U, I32Load16S, I32Load16U,
	I64Load8S, I64Load8U, I64Load16S, I64Load16U, I64Load32S, I64Load32U,
	I32Store, I64Store, F32Store, F64Store,
	I32Store8, I32Store16, I64Store8, I64Store16, I64Store32,
	CurrentMemory, GrowMemory,
	I32Const, I64Const, F32Const, F64Const,
	I32Eqz, I32Eq, I32Ne, I32LtS, I32LtU, I32GtS, I32GtU, I32LeS, I32LeU, I32GeS, I32GeU,
	I64Eqz, I64Eq, I64Ne, I64LtS, I64LtU, I64GtS, I64GtU, I64LeS, I64LeU, I64GeS, I64GeU,
	F32Eq, F32Ne, F32Lt, F32Gt, F32Le, F32Ge,
	F64Eq, F64Ne, F64Lt, F64Gt, F64Le, F64Ge,
	I32Clz, I32Ctz, I32Popcnt, I32Add, I32Sub, I32Mul, I32DivS, I32DivU, I32RemS, I32RemU,
	I32And, I32Or, I32Xor, I32Shl, I32ShrS, I32ShrU, I32Rotl, I32Rotr,
	I64Clz, I64Ctz, I64Popcnt, I64Add, I64Sub, I64Mul, I64DivS, I64DivU, I64RemS, I64RemU,
	I64And, I64Or, I64Xor, I64Shl, I64ShrS, I64ShrU, I64Rotl, I64Rotr,
	F32Abs, F32Neg, F32Ceil, F32Floor, F32Trunc, F32Nearest, F32Sqrt,
	F32Add, F32Sub, F32Mul, F32Div, F32Min, F32Max, F32Copysign,
	F64Abs, F64Neg, F64Ceil, F64Floor, F64Trunc, F64Nearest, F64Sqrt,
	F64Add, F64Sub, F64Mul, F64Div, F64Min, F64Max, F64Copysign,
	I32WrapI64, I32TruncSF32, I32TruncUF32, I32TruncSF64, I32TruncUF64,
	I64ExtendSI32, I64ExtendUI32, I64TruncSF32, I64TruncUF32, I64TruncSF64, I64TruncUF64,
	F32ConvertSI32, F32ConvertUI32, F32ConvertSI64, F32ConvertUI64, F32DemoteF64,
	F64ConvertSI32, F64ConvertUI32, F64ConvertSI64, F64ConvertUI64, F64PromoteF32,
	I32ReinterpretF32, I64ReinterpretF64, F32ReinterpretI32, F64ReinterpretI64,
}

impl OpTag {
	/// Classify an already-decoded operator by mnemonic. Returns `None` for an
	/// instruction outside this crate's consumed operator set (there are none in the
	/// `std` build of `parity_wasm`, but a build with extra feature flags enabled
	/// could in principle decode something this crate doesn't meter).
	pub fn of(instruction: &Instruction) -> Option<OpTag> {
		use Instruction::*;
		Some(match *instruction {
			Unreachable => OpTag::Unreachable,
			Nop => OpTag::Nop,
			Block(_) => OpTag::Block,
			Loop(_) => OpTag::Loop,
			If(_) => OpTag::If,
			Else => OpTag::Else,
			End => OpTag::End,
			Br(_) => OpTag::Br,
			BrIf(_) => OpTag::BrIf,
			BrTable(_) => OpTag::BrTable,
			Return => OpTag::Return,
			Call(_) => OpTag::Call,
			CallIndirect(_, _) => OpTag::CallIndirect,
			Drop => OpTag::Drop,
			Select => OpTag::Select,
			GetLocal(_) => OpTag::GetLocal,
			SetLocal(_) => OpTag::SetLocal,
			TeeLocal(_) => OpTag::TeeLocal,
			GetGlobal(_) => OpTag::GetGlobal,
			SetGlobal(_) => OpTag::SetGlobal,
			I32Load(_, _) => OpTag::I32Load,
			I64Load(_, _) => OpTag::I64Load,
			F32Load(_, _) => OpTag::F32Load,
			F64Load(_, _) => OpTag::F64Load,
			I32Load8S(_, _) => OpTag::I32Load8S,
			I32Load8U(_, _) => OpTag::I32Load8U,
			I32Load16S(_, _) => OpTag::I32Load16S,
			I32Load16U(_, _) => OpTag::I32Load16U,
			I64Load8S(_, _) => OpTag::I64Load8S,
			I64Load8U(_, _) => OpTag::I64Load8U,
			I64Load16S(_, _) => OpTag::I64Load16S,
			I64Load16U(_, _) => OpTag::I64Load16U,
			I64Load32S(_, _) => OpTag::I64Load32S,
			I64Load32U(_, _) => OpTag::I64Load32U,
			I32Store(_, _) => OpTag::I32Store,
			I64Store(_, _) => OpTag::I64Store,
			F32Store(_, _) => OpTag::F32Store,
			F64Store(_, _) => OpTag::F64Store,
			I32Store8(_, _) => OpTag::I32Store8,
			I32Store16(_, _) => OpTag::I32Store16,
			I64Store8(_, _) => OpTag::I64Store8,
			I64Store16(_, _) => OpTag::I64Store16,
			I64Store32(_, _) => OpTag::I64Store32,
			CurrentMemory(_) => OpTag::CurrentMemory,
			GrowMemory(_) => OpTag::GrowMemory,
			I32Const(_) => OpTag::I32Const,
			I64Const(_) => OpTag::I64Const,
			F32Const(_) => OpTag::F32Const,
			F64Const(_) => OpTag::F64Const,
			I32Eqz => OpTag::I32Eqz, I32Eq => OpTag::I32Eq, I32Ne => OpTag::I32Ne,
			I32LtS => OpTag::I32LtS, I32LtU => OpTag::I32LtU,
			I32GtS => OpTag::I32GtS, I32GtU => OpTag::I32GtU,
			I32LeS => OpTag::I32LeS, I32LeU => OpTag::I32LeU,
			I32GeS => OpTag::I32GeS, I32GeU => OpTag::I32GeU,
			I64Eqz => OpTag::I64Eqz, I64Eq => OpTag::I64Eq, I64Ne => OpTag::I64Ne,
			I64LtS => OpTag::I64LtS, I64LtU => OpTag::I64LtU,
			I64GtS => OpTag::I64GtS, I64GtU => OpTag::I64GtU,
			I64LeS => OpTag::I64LeS, I64LeU => OpTag::I64LeU,
			I64GeS => OpTag::I64GeS, I64GeU => OpTag::I64GeU,
			F32Eq => OpTag::F32Eq, F32Ne => OpTag::F32Ne,
			F32Lt => OpTag::F32Lt, F32Gt => OpTag::F32Gt, F32Le => OpTag::F32Le, F32Ge => OpTag::F32Ge,
			F64Eq => OpTag::F64Eq, F64Ne => OpTag::F64Ne,
			F64Lt => OpTag::F64Lt, F64Gt => OpTag::F64Gt, F64Le => OpTag::F64Le, F64Ge => OpTag::F64Ge,
			I32Clz => OpTag::I32Clz, I32Ctz => OpTag::I32Ctz, I32Popcnt => OpTag::I32Popcnt,
			I32Add => OpTag::I32Add, I32Sub => OpTag::I32Sub, I32Mul => OpTag::I32Mul,
			I32DivS => OpTag::I32DivS, I32DivU => OpTag::I32DivU,
			I32RemS => OpTag::I32RemS, I32RemU => OpTag::I32RemU,
			I32And => OpTag::I32And, I32Or => OpTag::I32Or, I32Xor => OpTag::I32Xor,
			I32Shl => OpTag::I32Shl, I32ShrS => OpTag::I32ShrS, I32ShrU => OpTag::I32ShrU,
			I32Rotl => OpTag::I32Rotl, I32Rotr => OpTag::I32Rotr,
			I64Clz => OpTag::I64Clz, I64Ctz => OpTag::I64Ctz, I64Popcnt => OpTag::I64Popcnt,
			I64Add => OpTag::I64Add, I64Sub => OpTag::I64Sub, I64Mul => OpTag::I64Mul,
			I64DivS => OpTag::I64DivS, I64DivU => OpTag::I64DivU,
			I64RemS => OpTag::I64RemS, I64RemU => OpTag::I64RemU,
			I64And => OpTag::I64And, I64Or => OpTag::I64Or, I64Xor => OpTag::I64Xor,
			I64Shl => OpTag::I64Shl, I64ShrS => OpTag::I64ShrS, I64ShrU => OpTag::I64ShrU,
			I64Rotl => OpTag::I64Rotl, I64Rotr => OpTag::I64Rotr,
			F32Abs => OpTag::F32Abs, F32Neg => OpTag::F32Neg, F32Ceil => OpTag::F32Ceil,
			F32Floor => OpTag::F32Floor, F32Trunc => OpTag::F32Trunc, F32Nearest => OpTag::F32Nearest,
			F32Sqrt => OpTag::F32Sqrt, F32Add => OpTag::F32Add, F32Sub => OpTag::F32Sub,
			F32Mul => OpTag::F32Mul, F32Div => OpTag::F32Div, F32Min => OpTag::F32Min,
			F32Max => OpTag::F32Max, F32Copysign => OpTag::F32Copysign,
			F64Abs => OpTag::F64Abs, F64Neg => OpTag::F64Neg, F64Ceil => OpTag::F64Ceil,
			F64Floor => OpTag::F64Floor, F64Trunc => OpTag::F64Trunc, F64Nearest => OpTag::F64Nearest,
			F64Sqrt => OpTag::F64Sqrt, F64Add => OpTag::F64Add, F64Sub => OpTag::F64Sub,
			F64Mul => OpTag::F64Mul, F64Div => OpTag::F64Div, F64Min => OpTag::F64Min,
			F64Max => OpTag::F64Max, F64Copysign => OpTag::F64Copysign,
			I32WrapI64 => OpTag::I32WrapI64,
			I32TruncSF32 => OpTag::I32TruncSF32, I32TruncUF32 => OpTag::I32TruncUF32,
			I32TruncSF64 => OpTag::I32TruncSF64, I32TruncUF64 => OpTag::I32TruncUF64,
			I64ExtendSI32 => OpTag::I64ExtendSI32, I64ExtendUI32 => OpTag::I64ExtendUI32,
			I64TruncSF32 => OpTag::I64TruncSF32, I64TruncUF32 => OpTag::I64TruncUF32,
			I64TruncSF64 => OpTag::I64TruncSF64, I64TruncUF64 => OpTag::I64TruncUF64,
			F32ConvertSI32 => OpTag::F32ConvertSI32, F32ConvertUI32 => OpTag::F32ConvertUI32,
			F32ConvertSI64 => OpTag::F32ConvertSI64, F32ConvertUI64 => OpTag::F32ConvertUI64,
			F32DemoteF64 => OpTag::F32DemoteF64,
			F64ConvertSI32 => OpTag::F64ConvertSI32, F64ConvertUI32 => OpTag::F64ConvertUI32,
			F64ConvertSI64 => OpTag::F64ConvertSI64, F64ConvertUI64 => OpTag::F64ConvertUI64,
			F64PromoteF32 => OpTag::F64PromoteF32,
			I32ReinterpretF32 => OpTag::I32ReinterpretF32,
			I64ReinterpretF64 => OpTag::I64ReinterpretF64,
			F32ReinterpretI32 => OpTag::F32ReinterpretI32,
			F64ReinterpretI64 => OpTag::F64ReinterpretI64,
			#[allow(unreachable_patterns)]
			_ => return None,
		})
	}

	/// A lowercase dotted mnemonic, used as the key in the TOML configuration file
	/// (`block`, `i32.add`, `call_indirect`, ...).
	pub fn mnemonic(&self) -> &'static str {
		use OpTag::*;
		match self {
			Unreachable => "unreachable", Nop => "nop",
			Block => "block", Loop => "loop", If => "if", Else => "else", End => "end",
			Br => "br", BrIf => "br_if", BrTable => "br_table", Return => "return",
			Call => "call", CallIndirect => "call_indirect", Drop => "drop", Select => "select",
			GetLocal => "local.get", SetLocal => "local.set", TeeLocal => "local.tee",
			GetGlobal => "global.get", SetGlobal => "global.set",
			I32Load => "i32.load", I64Load => "i64.load", F32Load => "f32.load", F64Load => "f64.load",
			I32Load8S => "i32.load8_s", I32Load8U => "i32.load8_u",
			I32Load16S => "i32.load16_s", I32Load16U => "i32.load16_u",
			I64Load8S => "i64.load8_s", I64Load8U => "i64.load8_u",
			I64Load16S => "i64.load16_s", I64Load16U => "i64.load16_u",
			I64Load32S => "i64.load32_s", I64Load32U => "i64.load32_u",
			I32Store => "i32.store", I64Store => "i64.store", F32Store => "f32.store", F64Store => "f64.store",
			I32Store8 => "i32.store8", I32Store16 => "i32.store16",
			I64Store8 => "i64.store8", I64Store16 => "i64.store16", I64Store32 => "i64.store32",
			CurrentMemory => "memory.size", GrowMemory => "memory.grow",
			I32Const => "i32.const", I64Const => "i64.const", F32Const => "f32.const", F64Const => "f64.const",
			I32Eqz => "i32.eqz", I32Eq => "i32.eq", I32Ne => "i32.ne",
			I32LtS => "i32.lt_s", I32LtU => "i32.lt_u", I32GtS => "i32.gt_s", I32GtU => "i32.gt_u",
			I32LeS => "i32.le_s", I32LeU => "i32.le_u", I32GeS => "i32.ge_s", I32GeU => "i32.ge_u",
			I64Eqz => "i64.eqz", I64Eq => "i64.eq", I64Ne => "i64.ne",
			I64LtS => "i64.lt_s", I64LtU => "i64.lt_u", I64GtS => "i64.gt_s", I64GtU => "i64.gt_u",
			I64LeS => "i64.le_s", I64LeU => "i64.le_u", I64GeS => "i64.ge_s", I64GeU => "i64.ge_u",
			F32Eq => "f32.eq", F32Ne => "f32.ne", F32Lt => "f32.lt", F32Gt => "f32.gt",
			F32Le => "f32.le", F32Ge => "f32.ge",
			F64Eq => "f64.eq", F64Ne => "f64.ne", F64Lt => "f64.lt", F64Gt => "f64.gt",
			F64Le => "f64.le", F64Ge => "f64.ge",
			I32Clz => "i32.clz", I32Ctz => "i32.ctz", I32Popcnt => "i32.popcnt",
			I32Add => "i32.add", I32Sub => "i32.sub", I32Mul => "i32.mul",
			I32DivS => "i32.div_s", I32DivU => "i32.div_u", I32RemS => "i32.rem_s", I32RemU => "i32.rem_u",
			I32And => "i32.and", I32Or => "i32.or", I32Xor => "i32.xor",
			I32Shl => "i32.shl", I32ShrS => "i32.shr_s", I32ShrU => "i32.shr_u",
			I32Rotl => "i32.rotl", I32Rotr => "i32.rotr",
			I64Clz => "i64.clz", I64Ctz => "i64.ctz", I64Popcnt => "i64.popcnt",
			I64Add => "i64.add", I64Sub => "i64.sub", I64Mul => "i64.mul",
			I64DivS => "i64.div_s", I64DivU => "i64.div_u", I64RemS => "i64.rem_s", I64RemU => "i64.rem_u",
			I64And => "i64.and", I64Or => "i64.or", I64Xor => "i64.xor",
			I64Shl => "i64.shl", I64ShrS => "i64.shr_s", I64ShrU => "i64.shr_u",
			I64Rotl => "i64.rotl", I64Rotr => "i64.rotr",
			F32Abs => "f32.abs", F32Neg => "f32.neg", F32Ceil => "f32.ceil", F32Floor => "f32.floor",
			F32Trunc => "f32.trunc", F32Nearest => "f32.nearest", F32Sqrt => "f32.sqrt",
			F32Add => "f32.add", F32Sub => "f32.sub", F32Mul => "f32.mul", F32Div => "f32.div",
			F32Min => "f32.min", F32Max => "f32.max", F32Copysign => "f32.copysign",
			F64Abs => "f64.abs", F64Neg => "f64.neg", F64Ceil => "f64.ceil", F64Floor => "f64.floor",
			F64Trunc => "f64.trunc", F64Nearest => "f64.nearest", F64Sqrt => "f64.sqrt",
			F64Add => "f64.add", F64Sub => "f64.sub", F64Mul => "f64.mul", F64Div => "f64.div",
			F64Min => "f64.min", F64Max => "f64.max", F64Copysign => "f64.copysign",
			I32WrapI64 => "i32.wrap_i64",
			I32TruncSF32 => "i32.trunc_f32_s", I32TruncUF32 => "i32.trunc_f32_u",
			I32TruncSF64 => "i32.trunc_f64_s", I32TruncUF64 => "i32.trunc_f64_u",
			I64ExtendSI32 => "i64.extend_i32_s", I64ExtendUI32 => "i64.extend_i32_u",
			I64TruncSF32 => "i64.trunc_f32_s", I64TruncUF32 => "i64.trunc_f32_u",
			I64TruncSF64 => "i64.trunc_f64_s", I64TruncUF64 => "i64.trunc_f64_u",
			F32ConvertSI32 => "f32.convert_i32_s", F32ConvertUI32 => "f32.convert_i32_u",
			F32ConvertSI64 => "f32.convert_i64_s", F32ConvertUI64 => "f32.convert_i64_u",
			F32DemoteF64 => "f32.demote_f64",
			F64ConvertSI32 => "f64.convert_i32_s", F64ConvertUI32 => "f64.convert_i32_u",
			F64ConvertSI64 => "f64.convert_i64_s", F64ConvertUI64 => "f64.convert_i64_u",
			F64PromoteF32 => "f64.promote_f32",
			I32ReinterpretF32 => "i32.reinterpret_f32", I64ReinterpretF64 => "i64.reinterpret_f64",
			F32ReinterpretI32 => "f32.reinterpret_i32", F64ReinterpretI64 => "f64.reinterpret_i64",
		}
	}
}

/// An immutable, exhaustive per-mnemonic gas cost table.
#[derive(Debug, Clone)]
pub struct CostTable {
	costs: [u64; OpTag::COUNT],
}

impl CostTable {
	/// Build a table from a map of mnemonic -> cost. Fails with `GasError::ConfigError`
	/// if any `OpTag` this crate classifies is missing an entry.
	pub fn new(entries: HashMap<OpTag, u64>) -> Result<Self, GasError> {
		let mut costs = [0u64; OpTag::COUNT];
		for tag in OpTag::ALL.iter() {
			match entries.get(tag) {
				Some(cost) => costs[*tag as usize] = *cost,
				None => return Err(GasError::ConfigError(
					format!("cost table missing entry for operator `{}`", tag.mnemonic())
				)),
			}
		}
		Ok(CostTable { costs })
	}

	/// A table that assigns the same cost to every operator. Useful for development
	/// and tests, mirroring `rules::Set::default()`'s "everything costs 1" behavior.
	pub fn uniform(cost: u64) -> Self {
		CostTable { costs: [cost; OpTag::COUNT] }
	}

	/// The cost of a decoded operator. Fails with `GasError::ConfigError` if the
	/// instruction is outside the operator enumeration this table was built over.
	pub fn cost_of(&self, instruction: &Instruction) -> Result<u64, GasError> {
		let tag = OpTag::of(instruction).ok_or_else(|| GasError::ConfigError(
			format!("no cost entry for unrecognized operator {:?}", instruction)
		))?;
		Ok(self.costs[tag as usize])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parity_wasm::elements::Instruction::*;

	fn all_ones() -> HashMap<OpTag, u64> {
		OpTag::ALL.iter().map(|t| (*t, 1)).collect()
	}

	#[test]
	fn rejects_incomplete_table() {
		let mut entries = all_ones();
		entries.remove(&OpTag::I32Add);
		assert!(CostTable::new(entries).is_err());
	}

	#[test]
	fn accepts_complete_table() {
		assert!(CostTable::new(all_ones()).is_ok());
	}

	#[test]
	fn looks_up_by_mnemonic() {
		let table = CostTable::uniform(7);
		assert_eq!(table.cost_of(&I32Const(1)).unwrap(), 7);
		assert_eq!(table.cost_of(&Call(0)).unwrap(), 7);
	}
}
