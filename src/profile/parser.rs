//! Register profile parser implementation.

use super::*;
use crate::core::error::{RegError, RegResult};

/// Parse profile text into aliases and definitions.
///
/// Parsing is all-or-nothing: the first malformed line aborts with the line
/// number and reason.
pub fn parse_profile(text: &str) -> RegResult<RegisterProfile> {
    let parser = Parser::new(text);
    parser.parse()
}

struct Parser<'a> {
    text: &'a str,
    line: usize,
    profile: RegisterProfile,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            line: 0,
            profile: RegisterProfile::new(),
        }
    }

    fn parse(mut self) -> RegResult<RegisterProfile> {
        for (idx, raw) in self.text.lines().enumerate() {
            self.line = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let result = if let Some(rest) = line.strip_prefix('=') {
                self.parse_alias(rest)
            } else {
                self.parse_definition(line)
            };

            if let Err(e) = result {
                log::debug!("Rejecting profile: {e}");
                log::trace!("Offending line: '{raw}'");
                return Err(e);
            }
        }

        log::trace!(
            "Parsed profile: {} aliases, {} definitions",
            self.profile.aliases.len(),
            self.profile.defs.len()
        );
        Ok(self.profile)
    }

    fn error(&self, reason: impl Into<String>) -> RegError {
        RegError::parse(self.line, reason)
    }

    fn parse_alias(&mut self, rest: &str) -> RegResult<()> {
        let body = strip_comment(rest).0;
        let mut tokens = body.split_whitespace();
        let (Some(alias), Some(reg_name), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(self.error("Expected '=<ROLE> <register>'"));
        };

        let role = RegisterRole::from_name(alias)
            .ok_or_else(|| self.error(format!("Unknown register role '{alias}'")))?;

        self.profile.aliases.push(RoleAlias {
            role,
            alias: alias.to_string(),
            reg_name: reg_name.to_string(),
        });
        Ok(())
    }

    fn parse_definition(&mut self, line: &str) -> RegResult<()> {
        let (body, comment) = strip_comment(line);
        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(self.error(format!(
                "Expected '<type> <name> <size> <offset> [packed] [flags]' but found {} fields",
                tokens.len()
            )));
        }

        let (reg_type, arena_type) = self.read_type(tokens[0])?;
        let name = tokens[1];
        let size = self.read_size(tokens[2])?;
        if size == 0 {
            return Err(self.error(format!("Register '{name}' has zero size")));
        }
        let offset = self.read_offset(tokens[3])?;

        let mut rest = &tokens[4..];
        let mut packed = 0;
        if let Some(token) = rest.first() {
            if let Some(value) = parse_size(token) {
                packed = value;
                rest = &rest[1..];
            }
        }

        let flags = match rest {
            [] => None,
            [flags] => Some(flags.to_string()),
            [_, extra, ..] => {
                return Err(self.error(format!("Unexpected trailing field '{extra}'")));
            }
        };

        self.profile.defs.push(RegisterDefinition {
            reg_type,
            arena_type,
            name: name.to_string(),
            size,
            packed,
            offset,
            comment,
            flags,
        });
        Ok(())
    }

    fn read_type(&self, token: &str) -> RegResult<(RegisterType, RegisterType)> {
        let (ty, arena) = match token.split_once('@') {
            Some((ty, arena)) => (ty, Some(arena)),
            None => (token, None),
        };

        let reg_type = RegisterType::from_name(ty)
            .ok_or_else(|| self.error(format!("Unknown register type '{ty}'")))?;
        let arena_type = match arena {
            Some(arena) => RegisterType::from_name(arena)
                .ok_or_else(|| self.error(format!("Unknown arena type '{arena}'")))?,
            None => reg_type.default_arena(),
        };
        Ok((reg_type, arena_type))
    }

    fn read_size(&self, token: &str) -> RegResult<u32> {
        parse_size(token).ok_or_else(|| self.error(format!("Invalid size '{token}'")))
    }

    fn read_offset(&self, token: &str) -> RegResult<Option<u32>> {
        if token == "?" {
            return Ok(None);
        }
        parse_offset(token)
            .map(Some)
            .ok_or_else(|| self.error(format!("Invalid offset '{token}'")))
    }
}

/// Split a line at the first `#` into body and trimmed comment.
fn strip_comment(line: &str) -> (&str, Option<String>) {
    match line.split_once('#') {
        Some((body, comment)) => {
            let comment = comment.trim();
            let comment = (!comment.is_empty()).then(|| comment.to_string());
            (body, comment)
        }
        None => (line, None),
    }
}

fn read_number(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// `.N` is N bits, a bare number is bytes.
fn parse_size(s: &str) -> Option<u32> {
    match s.strip_prefix('.') {
        Some(bits) => read_number(bits),
        None => read_number(s)?.checked_mul(8),
    }
}

/// `.N` is N bits, `B` is bytes, `B.b` is bytes plus bits.
fn parse_offset(s: &str) -> Option<u32> {
    if let Some(bits) = s.strip_prefix('.') {
        return read_number(bits);
    }
    match s.split_once('.') {
        Some((bytes, bits)) => read_number(bytes)?
            .checked_mul(8)?
            .checked_add(read_number(bits)?),
        None => read_number(s)?.checked_mul(8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_alias_and_definition() {
        let profile = parse_profile(
            "# x86 subset\n\
             =PC eip\n\
             \n\
             gpr eip .32 0 0\n\
             gpr ah 1 1 0\n\
             flg eflags .32 4 0 c1p.a.zstido.n.rv # status word\n",
        )
        .unwrap();

        assert_eq!(
            profile.aliases,
            vec![RoleAlias {
                role: RegisterRole::Pc,
                alias: "PC".to_string(),
                reg_name: "eip".to_string(),
            }]
        );
        assert_eq!(profile.defs.len(), 3);

        let ah = &profile.defs[1];
        assert_eq!(ah.size, 8);
        assert_eq!(ah.offset, Some(8));

        let eflags = &profile.defs[2];
        assert_eq!(eflags.reg_type, RegisterType::Flg);
        assert_eq!(eflags.arena_type, RegisterType::Gpr);
        assert_eq!(eflags.offset, Some(32));
        assert_eq!(eflags.flags.as_deref(), Some("c1p.a.zstido.n.rv"));
        assert_eq!(eflags.comment.as_deref(), Some("status word"));
    }

    #[test]
    fn test_offsets_and_sizes() {
        assert_eq!(parse_offset("3.4"), Some(28));
        assert_eq!(parse_offset(".17"), Some(17));
        assert_eq!(parse_offset("0x10"), Some(128));
        assert_eq!(parse_offset("x"), None);
        assert_eq!(parse_size(".1"), Some(1));
        assert_eq!(parse_size("16"), Some(128));
        assert_eq!(parse_size("-1"), None);
        assert_eq!(parse_size("0xffffffff"), None);
    }

    #[test]
    fn test_explicit_arena_and_auto_offset() {
        let profile = parse_profile("xmm@fpu xmm0 .128 ? .32").unwrap();
        let def = &profile.defs[0];
        assert_eq!(def.reg_type, RegisterType::Xmm);
        assert_eq!(def.arena_type, RegisterType::Fpu);
        assert_eq!(def.offset, None);
        assert_eq!(def.packed, 32);
        assert_eq!(def.lane_count(), 4);
    }

    #[test]
    fn test_packed_is_optional() {
        let profile = parse_profile("gpr r0 .32 0\nflg nzcv .4 .32 nzcv").unwrap();
        assert_eq!(profile.defs[0].packed, 0);
        assert_eq!(profile.defs[1].packed, 0);
        assert_eq!(profile.defs[1].flags.as_deref(), Some("nzcv"));
    }

    #[test]
    fn test_errors_report_line() {
        let err = parse_profile("gpr a .8 0 0\nbogus b .8 0 0").unwrap_err();
        assert!(matches!(err, RegError::Parse { line: 2, .. }));

        assert!(matches!(
            parse_profile("=XX eax").unwrap_err(),
            RegError::Parse { line: 1, .. }
        ));
        assert!(parse_profile("=PC").is_err());
        assert!(parse_profile("gpr a .8").is_err());
        assert!(parse_profile("gpr a .0 0 0").is_err());
        assert!(parse_profile("gpr a .8 zz 0").is_err());
        assert!(parse_profile("gpr a .8 0 0 flags extra").is_err());
    }
}
