//! CLI driver: reads a wasm module, instruments it for gas metering, writes the result.

extern crate clap;
extern crate parity_wasm;
extern crate wasm_gas_meter as utils;

use std::path::PathBuf;

use clap::{App, Arg};
use parity_wasm::elements;
use utils::logger;
use utils::{meter_module, AccountantSignature, CostTable, GasConfig, GasError};

#[derive(Debug)]
pub enum Error {
	Decoding(elements::Error, String),
	Encoding(elements::Error),
	Config(GasError),
	Meter(GasError),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		use self::Error::*;
		match self {
			Decoding(err, file) => write!(f, "decoding error ({}). not a valid wasm file: {}", err, file),
			Encoding(err) => write!(f, "encoding error ({})", err),
			Config(err) => write!(f, "cost table error: {}", err),
			Meter(err) => write!(f, "metering failed: {}", err),
		}
	}
}

fn do_main() -> Result<(), Error> {
	logger::init();

	let matches = App::new("wasm-gas-meter")
		.version(env!("CARGO_PKG_VERSION"))
		.arg(Arg::with_name("input")
			.index(1)
			.required(true)
			.help("Input wasm binary"))
		.arg(Arg::with_name("output")
			.index(2)
			.required(true)
			.help("Output wasm binary"))
		.arg(Arg::with_name("cost_table")
			.help("TOML file of per-operator gas costs; uniform cost of 1 when omitted")
			.takes_value(true)
			.long("cost-table"))
		.arg(Arg::with_name("module")
			.help("Module name the accountant is imported from")
			.takes_value(true)
			.long("module")
			.default_value("env"))
		.arg(Arg::with_name("field")
			.help("Field name the accountant is imported as")
			.takes_value(true)
			.long("field")
			.default_value("gas_counter"))
		.arg(Arg::with_name("precision")
			.help("Accountant call signature")
			.takes_value(true)
			.long("precision")
			.possible_values(&["i64", "i32-pair"])
			.default_value("i64"))
		.get_matches();

	let input = matches.value_of("input").expect("is required; qed");
	let output = matches.value_of("output").expect("is required; qed");

	let module = parity_wasm::deserialize_file(input)
		.map_err(|e| Error::Decoding(e, input.to_string()))?;

	let cost_table = match matches.value_of("cost_table") {
		Some(path) => utils::config::load_cost_table(&PathBuf::from(path)).map_err(Error::Config)?,
		None => CostTable::uniform(1),
	};

	let signature = match matches.value_of("precision").expect("has a default value; qed") {
		"i64" => AccountantSignature::I64,
		"i32-pair" => AccountantSignature::I32Pair,
		_ => unreachable!("all possible values are enumerated in clap config; qed"),
	};

	let config = GasConfig {
		cost_table,
		accountant_module: matches.value_of("module").expect("has a default value; qed").to_string(),
		accountant_field: matches.value_of("field").expect("has a default value; qed").to_string(),
		signature,
	};

	let metered = meter_module(module, &config).map_err(Error::Meter)?;

	parity_wasm::serialize_to_file(output, metered).map_err(Error::Encoding)?;

	Ok(())
}

fn main() {
	if let Err(e) = do_main() {
		eprintln!("{}", e);
		std::process::exit(1);
	}
}
