// This test suite drives a RegisterTable built from a realistic x86-64 profile through the
// public API. It checks that overlapping registers (rax, eax, ax, al, ah and the rflags bit
// registers) share storage bit for bit, that writes never leak outside a register's range,
// and that reads return exactly what was written. Snapshot stacks are exercised across every
// arena, including popping an empty stack, swapping and zeroing arenas and refitting them
// after a layout change. The suite also covers read-only enforcement, atomic profile
// installation (a failed parse leaves the previous layout usable), role lookup, the 32/64-bit
// sibling mapping, packed vector lanes, raw byte and hex loading and incremental diffing.

//! Register table integration tests.

use pretty_assertions::assert_eq;
use regstate::{BitVector, RegError, RegisterRole, RegisterTable, RegisterType, TableConfig};

const X86_64: &str = include_str!("profiles/x86-64.profile");

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn create_test_table() -> RegisterTable {
    init_logging();
    RegisterTable::from_profile(X86_64).expect("x86-64 profile must parse")
}

#[test]
fn test_arena_sizes_follow_layout() {
    let table = create_test_table();
    assert_eq!(table.regset(RegisterType::Gpr).arena().size(), 104);
    assert_eq!(table.regset(RegisterType::Seg).arena().size(), 16);
    assert_eq!(table.regset(RegisterType::Fpu).arena().size(), 20);
    assert_eq!(table.regset(RegisterType::Xmm).arena().size(), 32);
    assert_eq!(table.regset(RegisterType::Ymm).arena().size(), 0);
    assert!(table.get_bytes(RegisterType::Gpr).iter().all(|&b| b == 0));
}

#[test]
fn test_sub_registers_share_storage() {
    let mut table = create_test_table();
    table.setv("rax", 0x1122_3344_5566_7788).unwrap();

    assert_eq!(table.getv("eax").unwrap(), 0x5566_7788);
    assert_eq!(table.getv("ax").unwrap(), 0x7788);
    assert_eq!(table.getv("al").unwrap(), 0x88);
    assert_eq!(table.getv("ah").unwrap(), 0x77);

    table.setv("ah", 0xff).unwrap();
    assert_eq!(table.getv("rax").unwrap(), 0x1122_3344_5566_ff88);

    table.setv("eax", 0).unwrap();
    assert_eq!(table.getv("rax").unwrap(), 0x1122_3344_0000_0000);
}

#[test]
fn test_write_stays_inside_register() {
    let mut table = create_test_table();
    table.setv("rbx", u64::MAX).unwrap();
    table.setv("rcx", u64::MAX).unwrap();

    table.setv("al", 0x1ff).unwrap();
    assert_eq!(table.getv("al").unwrap(), 0xff);
    assert_eq!(table.getv("ah").unwrap(), 0);
    assert_eq!(table.getv("rbx").unwrap(), u64::MAX);
    assert_eq!(table.getv("rcx").unwrap(), u64::MAX);
}

#[test]
fn test_single_bit_flags_alias_status_word() {
    let mut table = create_test_table();
    table.setv("rflags", 1 << 6).unwrap();
    assert_eq!(table.getv("zf").unwrap(), 1);
    assert_eq!(table.getv("cf").unwrap(), 0);

    table.setv("of", 1).unwrap();
    assert_eq!(table.getv("eflags").unwrap(), (1 << 6) | (1 << 11));
    // flg registers live in the gpr arena by default.
    assert_eq!(table.get("of").unwrap().arena, RegisterType::Gpr);
    assert_eq!(table.get("of").unwrap().reg_type, RegisterType::Flg);
}

#[test]
fn test_roles_resolve_through_names() {
    let mut table = create_test_table();
    table.set_value_by_role(RegisterRole::Pc, 0x40_1000).unwrap();
    assert_eq!(table.getv("rip").unwrap(), 0x40_1000);
    assert_eq!(table.getv("PC").unwrap(), 0x40_1000);
    assert_eq!(table.get_by_role(RegisterRole::Sn).unwrap().name, "orax");
    assert_eq!(table.get_by_role(RegisterRole::A9), None);
    assert!(matches!(
        table.get_value_by_role(RegisterRole::Lr),
        Err(RegError::NotFound { .. })
    ));

    table.set_name(RegisterRole::Lr, "rbp");
    assert_eq!(table.get_by_role(RegisterRole::Lr).unwrap().name, "rbp");
}

#[test]
fn test_calling_convention_and_siblings() {
    let table = create_test_table();
    assert_eq!(
        table.profile_to_cc().as_deref(),
        Some("rax reg(rdi, rsi, rdx, rcx, r8, r9)")
    );
    assert_eq!(table.reg_32_to_64("eax"), Some("rax"));
    assert_eq!(table.reg_32_to_64("r9d"), Some("r9"));
    assert_eq!(table.reg_64_to_32("r8"), Some("r8d"));
    assert_eq!(table.reg_64_to_32("rip"), None);
    assert_eq!(table.reg_32_to_64("ax"), None);
}

#[test]
fn test_lookup_helpers() {
    let table = create_test_table();
    assert_eq!(table.get_at(RegisterType::Gpr, 64, 0).unwrap().name, "rflags");
    assert_eq!(table.get_of_type("cs", RegisterType::Seg).unwrap().name, "cs");
    assert_eq!(table.get_of_type("cs", RegisterType::Gpr), None);
    assert_eq!(table.index_get(0).unwrap().name, "rax");
    assert_eq!(table.get("st0").unwrap().comment.as_deref(), Some("x87 extended"));

    let flags: Vec<&str> = table
        .items_of_type(RegisterType::Flg)
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(
        flags,
        vec!["rflags", "eflags", "cf", "pf", "af", "zf", "sf", "tf", "if", "df", "of"]
    );
    assert_eq!(table.items(RegisterType::Seg).count(), 2);
}

#[test]
fn test_wide_and_packed_registers() {
    let mut table = create_test_table();
    let xmm0 = table.get("xmm0").cloned().unwrap();
    assert_eq!(xmm0.lane_count(), 4);
    assert!(matches!(
        table.get_value(&xmm0),
        Err(RegError::SizeMismatch { .. })
    ));

    let mut bytes = vec![0u8; 16];
    bytes[0] = 0x01;
    bytes[8] = 0x02;
    bytes[15] = 0x80;
    let bv = BitVector::from_bytes_le(&bytes, 128);
    table.set_bv(&xmm0, &bv).unwrap();

    assert_eq!(table.getv("xmm0l").unwrap(), 1);
    assert_eq!(table.getv("xmm0h").unwrap(), 0x8000_0000_0000_0002);
    assert_eq!(table.get_bv(&xmm0).unwrap(), bv);
    assert_eq!(
        table.getv("xmm1h"),
        Err(RegError::NotFound {
            what: "register 'xmm1h'".to_string()
        })
    );

    let short = BitVector::from_u64(1, 64);
    assert!(table.set_bv(&xmm0, &short).is_err());
}

#[test]
fn test_x87_register_roundtrip() {
    let mut table = create_test_table();
    let st1 = table.get("st1").cloned().unwrap();
    assert!(st1.is_float);

    let mut bv = BitVector::new(80);
    bv.set(0, true);
    bv.set(79, true);
    table.set_bv(&st1, &bv).unwrap();
    assert_eq!(table.get_bv(&st1).unwrap(), bv);

    let st0 = table.get("st0").cloned().unwrap();
    assert!(table.get_bv(&st0).unwrap().is_zero());
    let fpu = table.get_bytes(RegisterType::Fpu);
    assert_eq!(fpu[10], 0x01);
    assert_eq!(fpu[19], 0x80);
}

#[test]
fn test_snapshot_restores_every_arena() {
    let mut table = create_test_table();
    assert!(!table.arena_pop());

    table.setv("rax", 1).unwrap();
    table.setv("xmm0l", 10).unwrap();
    assert_eq!(table.arena_push(), 1);

    table.setv("rax", 2).unwrap();
    table.setv("xmm0l", 20).unwrap();
    table.setv("cs", 0x33).unwrap();
    assert_eq!(table.arena_push(), 2);
    table.setv("rax", 3).unwrap();

    assert!(table.arena_pop());
    assert_eq!(table.getv("rax").unwrap(), 2);
    assert_eq!(table.getv("cs").unwrap(), 0x33);

    assert!(table.arena_pop());
    assert_eq!(table.getv("rax").unwrap(), 1);
    assert_eq!(table.getv("xmm0l").unwrap(), 10);
    assert_eq!(table.getv("cs").unwrap(), 0);
    assert_eq!(table.arena_depth(), 0);

    assert!(!table.arena_pop());
    assert_eq!(table.getv("rax").unwrap(), 1);
}

#[test]
fn test_swap_and_zero() {
    let mut table = create_test_table();
    table.setv("cs", 0x23).unwrap();

    let mut replacement = vec![0u8; 16];
    replacement[8] = 0x2b;
    let old = table.arena_swap(RegisterType::Seg, replacement).unwrap();
    assert_eq!(old[0], 0x23);
    assert_eq!(table.getv("cs").unwrap(), 0);
    assert_eq!(table.getv("ss").unwrap(), 0x2b);

    assert!(matches!(
        table.arena_swap(RegisterType::Seg, vec![0; 3]),
        Err(RegError::SizeMismatch { expected: 16, actual: 3 })
    ));

    table.arena_zero(RegisterType::Seg);
    assert_eq!(table.getv("ss").unwrap(), 0);
}

#[test]
fn test_read_only_registers_reject_writes() {
    let mut table = create_test_table();
    table.setv("rip", 0x1000).unwrap();
    table.set_read_only("rip", true);
    assert!(table.is_read_only(table.get("rip").unwrap()));

    assert_eq!(
        table.setv("rip", 0x2000),
        Err(RegError::ReadOnly { name: "rip".to_string() })
    );
    assert!(table.set_value_by_role(RegisterRole::Pc, 0x2000).is_err());
    assert_eq!(table.getv("rip").unwrap(), 0x1000);

    // Raw arena writes are not register writes.
    let mut raw = table.get_bytes(RegisterType::Gpr);
    raw[80] = 0x42;
    table.set_bytes(RegisterType::Gpr, &raw).unwrap();
    assert_eq!(table.getv("rip").unwrap(), 0x1042);

    table.set_read_only("rip", false);
    table.setv("rip", 0x3000).unwrap();
    assert_eq!(table.getv("rip").unwrap(), 0x3000);
}

#[test]
fn test_failed_install_keeps_previous_layout() {
    let mut table = create_test_table();
    table.setv("rax", 7).unwrap();

    let err = table
        .set_profile_string("gpr r0 .32 0 0\ngpr r1 .32 nowhere 0\n")
        .unwrap_err();
    assert!(matches!(err, RegError::Parse { line: 2, .. }));

    assert_eq!(table.getv("rax").unwrap(), 7);
    // "r0" is also a role token bound to rax, so check the item list directly.
    assert!(table.all_items().iter().all(|item| item.name != "r0"));
    assert_eq!(table.get("r1"), None);
    assert_eq!(table.profile_text(), Some(X86_64));
}

#[test]
fn test_reinstalling_same_profile_keeps_state() {
    let mut table = create_test_table();
    table.setv("rbx", 99).unwrap();
    table.set_profile_string(X86_64).unwrap();
    assert_eq!(table.getv("rbx").unwrap(), 99);

    table.set_profile_string("gpr pc .16 0 0\n").unwrap();
    assert_eq!(table.getv("pc").unwrap(), 0);
    assert_eq!(table.get("rbx"), None);
    assert_eq!(table.regset(RegisterType::Gpr).arena().size(), 2);
}

#[test]
fn test_auto_offsets_and_redefinition() {
    init_logging();
    let table = RegisterTable::from_profile(
        "gpr a .16 ? 0\n\
         gpr b .8 ? 0\n\
         gpr a .32 ? 0\n",
    )
    .unwrap();
    let a = table.get("a").unwrap();
    assert_eq!((a.index, a.size), (0, 32));
    assert_eq!(table.get("b").unwrap().offset, 16);
    assert_eq!(table.all_items().len(), 2);
}

#[test]
fn test_hex_and_bulk_loading() {
    let mut table = create_test_table();
    assert_eq!(table.set_bytes_hex(RegisterType::Gpr, "0x78563412").unwrap(), 4);
    assert_eq!(table.getv("eax").unwrap(), 0x1234_5678);
    assert!(matches!(
        table.set_bytes_hex(RegisterType::Gpr, "0x123"),
        Err(RegError::Parse { .. })
    ));
    assert!(table.set_bytes(RegisterType::Seg, &[0; 17]).is_err());

    // Arenas are filled in type order: gpr, then the empty drx arena, then fpu.
    let mut dump = vec![0u8; 104 + 20];
    dump[0] = 0xaa;
    dump[104] = 0x33;
    table.read_regs(&dump).unwrap();
    assert_eq!(table.getv("rax").unwrap(), 0xaa);
    assert_eq!(table.get_bytes(RegisterType::Fpu)[0], 0x33);
    assert!(table.read_regs(&[0; 1000]).is_err());
}

#[test]
fn test_big_endian_byte_order() {
    init_logging();
    let mut table = RegisterTable::with_config(TableConfig::new(32).big_endian(true));
    table
        .set_profile_string("gpr r0 .32 0 0\ngpr r0h .16 0 0\ngpr r0b .8 3 0\n")
        .unwrap();
    assert!(table.is_big_endian());

    table.setv("r0", 0x1122_3344).unwrap();
    assert_eq!(table.get_bytes(RegisterType::Gpr), vec![0x11, 0x22, 0x33, 0x44]);
    assert_eq!(table.getv("r0h").unwrap(), 0x1122);
    assert_eq!(table.getv("r0b").unwrap(), 0x44);
}

#[test]
fn test_roundtrip_every_width_and_offset() {
    init_logging();
    const GUARD: u64 = 0xa5a5_5a5a_c3c3_3c3c;
    let values = [0, 1, u64::MAX, 0x8000_0000_0000_0001, 0x0123_4567_89ab_cdef];

    for big_endian in [false, true] {
        for size in 1..=64u32 {
            for offset in 0..17u32 {
                let profile = format!("gpr r .{size} .{offset} 0\ngpr guard .64 .128 0\n");
                let mut table =
                    RegisterTable::with_config(TableConfig::default().big_endian(big_endian));
                table.set_profile_string(&profile).unwrap();
                table.setv("guard", GUARD).unwrap();

                let mask = if size == 64 { u64::MAX } else { (1 << size) - 1 };
                for value in values {
                    table.setv("r", value).unwrap();
                    let ctx = format!("size {size} offset {offset} be {big_endian} {value:#x}");
                    assert_eq!(table.getv("r").unwrap(), value & mask, "{ctx}");
                    assert_eq!(table.getv("guard").unwrap(), GUARD, "{ctx}");

                    let bytes = table.get_bytes(RegisterType::Gpr);
                    let outside = (0..128u32)
                        .filter(|bit| *bit < offset || *bit >= offset + size)
                        .any(|bit| bytes[(bit / 8) as usize] & (1 << (bit % 8)) != 0);
                    assert!(!outside, "{ctx}: write leaked outside the register");
                }
            }
        }
    }
}

#[test]
fn test_diff_walks_changed_registers() {
    let mut table = create_test_table();
    let before = table.get_bytes(RegisterType::Gpr);
    table.setv("al", 1).unwrap();
    table.setv("rsp", 0x7fff_0000).unwrap();
    let after = table.get_bytes(RegisterType::Gpr);

    let mut changed = Vec::new();
    let mut prev = None;
    while let Some(item) = table
        .next_diff(RegisterType::Gpr, &before, &after, prev.as_ref())
        .unwrap()
    {
        changed.push(item.name.clone());
        prev = Some(item.clone());
    }
    assert_eq!(changed, vec!["rax", "eax", "ax", "al", "rsp"]);

    let only_64 = table
        .next_diff_sized(RegisterType::Gpr, &before, &after, None, 64)
        .unwrap()
        .unwrap();
    assert_eq!(only_64.name, "rax");

    let live = table
        .next_diff_live(RegisterType::Gpr, &before, table.get("eax"))
        .unwrap()
        .unwrap();
    assert_eq!(live.name, "ax");

    assert!(table
        .next_diff(RegisterType::Gpr, &before, &after[..8], None)
        .is_err());
}

#[test]
fn test_fit_arena_matches_layout() {
    let mut table = create_test_table();
    table.arena_push();
    table.arena_swap(RegisterType::Seg, vec![1; 16]).unwrap();
    assert_eq!(table.fit_arena(), 104 + 16 + 20 + 32);
    assert_eq!(table.regset(RegisterType::Seg).arena().size(), 16);
    assert_eq!(table.arena_dup(&[5; 200]).len(), 104);
    assert_eq!(table.arena_peek().len(), 104);
}
