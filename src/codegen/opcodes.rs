//! Java bytecode instruction opcodes
//!
//! The subset the generator emits, with the values the Java Virtual Machine
//! Specification assigns them, ordered by value.

// Constants
pub const ICONST_M1: u8 = 0x02;
pub const ICONST_0: u8 = 0x03;
pub const ICONST_1: u8 = 0x04;
pub const ICONST_2: u8 = 0x05;
pub const ICONST_3: u8 = 0x06;
pub const ICONST_4: u8 = 0x07;
pub const ICONST_5: u8 = 0x08;
pub const BIPUSH: u8 = 0x10;
pub const SIPUSH: u8 = 0x11;
pub const LDC: u8 = 0x12;

// Loads
pub const ILOAD: u8 = 0x15;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const ILOAD_1: u8 = 0x1b;
pub const ILOAD_2: u8 = 0x1c;
pub const ILOAD_3: u8 = 0x1d;
pub const ALOAD_0: u8 = 0x2a;
pub const ALOAD_1: u8 = 0x2b;
pub const ALOAD_2: u8 = 0x2c;
pub const ALOAD_3: u8 = 0x2d;
pub const IALOAD: u8 = 0x2e;

// Stores
pub const ISTORE: u8 = 0x36;
pub const ASTORE: u8 = 0x3a;
pub const ISTORE_0: u8 = 0x3b;
pub const ISTORE_1: u8 = 0x3c;
pub const ISTORE_2: u8 = 0x3d;
pub const ISTORE_3: u8 = 0x3e;
pub const ASTORE_0: u8 = 0x4b;
pub const ASTORE_1: u8 = 0x4c;
pub const ASTORE_2: u8 = 0x4d;
pub const ASTORE_3: u8 = 0x4e;
pub const IASTORE: u8 = 0x4f;

// Stack
pub const POP: u8 = 0x57;
pub const DUP: u8 = 0x59;

// Arithmetic and logic
pub const IADD: u8 = 0x60;
pub const ISUB: u8 = 0x64;
pub const IMUL: u8 = 0x68;
pub const IDIV: u8 = 0x6c;
pub const IAND: u8 = 0x7e;
pub const IXOR: u8 = 0x82;
pub const IINC: u8 = 0x84;

// Branches
pub const IFEQ: u8 = 0x99;
pub const IFNE: u8 = 0x9a;
pub const IFLT: u8 = 0x9b;
pub const IFGE: u8 = 0x9c;
pub const IFGT: u8 = 0x9d;
pub const IFLE: u8 = 0x9e;
pub const GOTO: u8 = 0xa7;

// Returns
pub const IRETURN: u8 = 0xac;
pub const ARETURN: u8 = 0xb0;
pub const RETURN: u8 = 0xb1;

// Fields and invocations
pub const GETFIELD: u8 = 0xb4;
pub const PUTFIELD: u8 = 0xb5;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;

// Objects and arrays
pub const NEW: u8 = 0xbb;
pub const NEWARRAY: u8 = 0xbc;
pub const ARRAYLENGTH: u8 = 0xbe;

/// Assembler mnemonic of `op`
pub fn mnemonic(op: u8) -> Option<&'static str> {
    let name = match op {
        ICONST_M1 => "iconst_m1",
        ICONST_0 => "iconst_0",
        ICONST_1 => "iconst_1",
        ICONST_2 => "iconst_2",
        ICONST_3 => "iconst_3",
        ICONST_4 => "iconst_4",
        ICONST_5 => "iconst_5",
        BIPUSH => "bipush",
        SIPUSH => "sipush",
        LDC => "ldc",
        ILOAD => "iload",
        ALOAD => "aload",
        ILOAD_0 => "iload_0",
        ILOAD_1 => "iload_1",
        ILOAD_2 => "iload_2",
        ILOAD_3 => "iload_3",
        ALOAD_0 => "aload_0",
        ALOAD_1 => "aload_1",
        ALOAD_2 => "aload_2",
        ALOAD_3 => "aload_3",
        IALOAD => "iaload",
        ISTORE => "istore",
        ASTORE => "astore",
        ISTORE_0 => "istore_0",
        ISTORE_1 => "istore_1",
        ISTORE_2 => "istore_2",
        ISTORE_3 => "istore_3",
        ASTORE_0 => "astore_0",
        ASTORE_1 => "astore_1",
        ASTORE_2 => "astore_2",
        ASTORE_3 => "astore_3",
        IASTORE => "iastore",
        POP => "pop",
        DUP => "dup",
        IADD => "iadd",
        ISUB => "isub",
        IMUL => "imul",
        IDIV => "idiv",
        IAND => "iand",
        IXOR => "ixor",
        IINC => "iinc",
        IFEQ => "ifeq",
        IFNE => "ifne",
        IFLT => "iflt",
        IFGE => "ifge",
        IFGT => "ifgt",
        IFLE => "ifle",
        GOTO => "goto",
        IRETURN => "ireturn",
        ARETURN => "areturn",
        RETURN => "return",
        GETFIELD => "getfield",
        PUTFIELD => "putfield",
        INVOKEVIRTUAL => "invokevirtual",
        INVOKESPECIAL => "invokespecial",
        INVOKESTATIC => "invokestatic",
        NEW => "new",
        NEWARRAY => "newarray",
        ARRAYLENGTH => "arraylength",
        _ => return None,
    };
    Some(name)
}

/// `(popped, pushed)` slot counts of `op`. Invocations depend on their
/// descriptor and have no fixed effect.
pub fn stack_effect(op: u8) -> Option<(u16, u16)> {
    let effect = match op {
        ICONST_M1..=ICONST_5 | BIPUSH | SIPUSH | LDC => (0, 1),
        ILOAD | ALOAD | ILOAD_0..=ILOAD_3 | ALOAD_0..=ALOAD_3 => (0, 1),
        IALOAD => (2, 1),
        ISTORE | ASTORE | ISTORE_0..=ISTORE_3 | ASTORE_0..=ASTORE_3 => (1, 0),
        IASTORE => (3, 0),
        POP => (1, 0),
        DUP => (1, 2),
        IADD | ISUB | IMUL | IDIV | IAND | IXOR => (2, 1),
        IINC => (0, 0),
        IFEQ..=IFLE => (1, 0),
        GOTO => (0, 0),
        IRETURN | ARETURN => (1, 0),
        RETURN => (0, 0),
        GETFIELD => (1, 1),
        PUTFIELD => (2, 0),
        NEW => (0, 1),
        NEWARRAY | ARRAYLENGTH => (1, 1),
        _ => return None,
    };
    Some(effect)
}

/// Slot-specific short form of a load or store (`iload` with slot 2 is `iload_2`)
pub fn short_form(op: u8, reg: u16) -> Option<u8> {
    if reg > 3 {
        return None;
    }
    let base = match op {
        ILOAD => ILOAD_0,
        ALOAD => ALOAD_0,
        ISTORE => ISTORE_0,
        ASTORE => ASTORE_0,
        _ => return None,
    };
    Some(base + reg as u8)
}
