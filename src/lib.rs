#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

extern crate parity_wasm;
#[macro_use] extern crate log;

mod error;
mod cost_table;
mod index_rewrite;
mod splice;
mod meter;
mod driver;

#[cfg(feature = "config-file")]
pub mod config;

#[cfg(feature = "cli")]
pub mod logger;

pub use error::GasError;
pub use cost_table::{CostTable, OpTag};
pub use meter::AccountantSignature;
pub use splice::{splice_import, ImportSpec};
pub use driver::{instrument_gas, meter_module, GasConfig};
pub use parity_wasm::elements::Instruction;

#[cfg(not(feature = "std"))]
mod std {
	pub use ::alloc::{borrow, boxed, string, vec};
	pub use core::*;

	pub mod rc {
		pub use alloc::rc::Rc;
	}

	pub mod collections {
		pub use alloc::collections::{BTreeMap, BTreeSet};
	}
}

#[cfg(feature = "std")]
mod std {
	pub use std::*;
}
