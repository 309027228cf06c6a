//! Translation of gdb register descriptions into profile text.
//!
//! gdb's `maint print registers` prints one row per register:
//!
//! ```text
//!  Name         Nr  Rel Offset    Size  Type
//!  rax           0    0      0       8 int64_t
//!  eflags       17   17    136       4 i386_eflags
//!  st0          24   24    160      10 _i387_ext
//!  ''           57   57    536       0 int
//! ```
//!
//! Each usable row becomes one definition line. Offsets and sizes are in
//! bytes; rows without a name or with zero size are skipped.

use crate::core::error::{RegError, RegResult};
use crate::core::types::RegisterType;
use crate::profile::{parse_profile, RegisterProfile};

/// Translate gdb register rows into profile text understood by [`super::parse_profile`].
pub fn parse_gdb_profile(text: &str) -> RegResult<String> {
    let rows = translate_rows(text)?;
    Ok(rows.iter().map(|(_, line)| format!("{line}\n")).collect())
}

/// Parse a gdb register dump straight into a profile. Errors report line
/// numbers of the gdb input.
pub fn parse_gdb_to_profile(text: &str) -> RegResult<RegisterProfile> {
    let rows = translate_rows(text)?;
    let profile_text: String = rows.iter().map(|(_, line)| format!("{line}\n")).collect();
    parse_profile(&profile_text).map_err(|err| match err {
        RegError::Parse { line, reason } => {
            let source_line = line
                .checked_sub(1)
                .and_then(|idx| rows.get(idx))
                .map_or(line, |(src, _)| *src);
            RegError::Parse {
                line: source_line,
                reason,
            }
        }
        other => other,
    })
}

/// Profile lines paired with the gdb line they came from.
fn translate_rows(text: &str) -> RegResult<Vec<(usize, String)>> {
    let mut rows = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        match tokens.first() {
            None => continue,
            Some(&"Name") => continue,
            Some(first) if first.starts_with('*') => continue,
            Some(_) => {}
        }

        let [name, _nr, _rel, offset, size, gdb_type, ..] = tokens[..] else {
            return Err(RegError::parse(
                line_no,
                format!(
                    "Expected 'name nr rel offset size type' but found {} fields",
                    tokens.len()
                ),
            ));
        };

        let offset: u32 = offset
            .parse()
            .map_err(|_| RegError::parse(line_no, format!("Invalid offset '{offset}'")))?;
        let size: u32 = size
            .parse()
            .map_err(|_| RegError::parse(line_no, format!("Invalid size '{size}'")))?;

        if name == "''" || name.is_empty() || size == 0 {
            log::trace!("Skipping gdb register row {line_no}");
            continue;
        }

        let bits = size
            .checked_mul(8)
            .ok_or_else(|| RegError::parse(line_no, format!("Size {size} too large")))?;
        let ty = register_type_for(name, gdb_type);

        rows.push((line_no, format!("{ty}\t{name}\t.{bits}\t{offset}\t0")));
    }

    Ok(rows)
}

fn register_type_for(name: &str, gdb_type: &str) -> RegisterType {
    const FPU_MARKERS: [&str; 6] = ["float", "i387_ext", "vec", "v4", "v2", "uint128"];

    if name.contains("flags") || gdb_type.contains("flags") {
        RegisterType::Flg
    } else if FPU_MARKERS.iter().any(|marker| gdb_type.contains(marker)) {
        RegisterType::Fpu
    } else {
        RegisterType::Gpr
    }
}
