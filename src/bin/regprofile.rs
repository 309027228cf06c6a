//! Register profile inspection tool.
//!
//! Loads a profile (or a gdb register dump) and prints the resulting layout.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use regstate::core::filter_items_covered;
use regstate::{RegisterItem, RegisterRole, RegisterTable, RegisterType, TableConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Logging filter string (e.g. "regstate=debug" or "trace")
    #[arg(long)]
    log: Option<String>,

    /// Treat the input as gdb `maint print registers` output
    #[arg(long)]
    gdb: bool,

    /// Word size of the architecture in bits
    #[arg(long, default_value_t = 64)]
    bits: u32,

    /// Store byte-aligned registers big-endian
    #[arg(long)]
    big_endian: bool,

    /// Hide registers fully covered by a larger register
    #[arg(long)]
    covered: bool,

    /// Profile file, stdin when omitted
    input: Option<PathBuf>,
}

fn init_logger(filters: &str) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filters);
    builder.try_init()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logger(args.log.as_deref().unwrap_or("warn"))?;

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let config = TableConfig::new(args.bits).big_endian(args.big_endian);
    let mut table = RegisterTable::with_config(config);
    if args.gdb {
        table.set_gdb_profile_string(&text)?;
    } else {
        table.set_profile_string(&text)?;
    }

    for ty in RegisterType::ALL {
        let items: Vec<&RegisterItem> = table.items(ty).collect();
        if items.is_empty() {
            continue;
        }
        let items = if args.covered {
            filter_items_covered(&items)
        } else {
            items
        };

        println!("[{ty}] {} bytes", table.regset(ty).arena().size());
        for item in items {
            println!(
                "  {:>4} {:<4} {:<12} {:>4} bits @ {}",
                item.index, item.reg_type, item.name, item.size, item.offset
            );
        }
    }

    for role in RegisterRole::ALL {
        if let Some(name) = table.get_name(role) {
            let status = if table.get_by_role(role).is_some() { "" } else { " (missing)" };
            println!("={role} {name}{status}");
        }
    }

    if let Some(cc) = table.profile_to_cc() {
        println!("cc: {cc}");
    }

    Ok(())
}
