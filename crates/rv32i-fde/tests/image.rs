//! Loading program images into instruction memory.

use rv32i_encoder::{addi, assemble_code, Gpr};
use rv32i_fde::{
    parse_hex_image, EmulatorError, HaltPolicy, InstructionMemory, MemoryPort, Rv32iCore, RET,
    WORD_COUNT,
};

#[test]
fn test_hex_image_runs() {
    let image = "
        // addi x1, x0, 5 ; add x1, x1, x1 ; addi x1, x0, 0 ; ret
        0x00500093,
        0x001080b3,
        0x00000093,
        0x00008067,
    ";
    let words = parse_hex_image(image).unwrap();
    assert_eq!(words.len(), 4);
    let memory = InstructionMemory::from_words(&words).unwrap();
    let mut core = Rv32iCore::new().with_max_instructions(1000);
    assert_eq!(core.run(0, &memory), Ok(4));
    assert_eq!(core.pc(), 0);
}

#[test]
fn test_hex_image_with_live_return_address() {
    // ra = 10 at the `ret`, so it jumps to word 2 (itself) instead of 0.
    let image = "0x00500093, 0x001080b3, 0x00008067";
    let memory = InstructionMemory::from_words(&parse_hex_image(image).unwrap()).unwrap();

    let mut core = Rv32iCore::new().with_max_instructions(1000);
    match core.run(0, &memory) {
        Err(EmulatorError::InstructionLimitExceeded { executed, pc, .. }) => {
            assert_eq!(executed, 1000);
            assert_eq!(pc, 2);
        }
        other => panic!("expected limit error, got {:?}", other),
    }

    let mut core = Rv32iCore::new()
        .with_halt_policy(HaltPolicy::OnReturn)
        .with_max_instructions(1000);
    assert_eq!(core.run(0, &memory), Ok(3));
    assert_eq!(core.pc(), 2);
}

#[test]
fn test_assembled_bytes_match_words() {
    let bytes = assemble_code("li a0, 5\nret").unwrap();
    let memory = InstructionMemory::from_le_bytes(&bytes).unwrap();
    assert_eq!(memory.read_word(0), addi(Gpr::A0, Gpr::ZERO, 5));
    assert_eq!(memory.read_word(1), RET);
    assert_eq!(memory.read_word(2), 0);
}

#[test]
fn test_image_too_large() {
    let words = vec![0u32; WORD_COUNT + 1];
    assert_eq!(
        InstructionMemory::from_words(&words).unwrap_err(),
        EmulatorError::ImageTooLarge {
            offset: 0,
            words: WORD_COUNT + 1,
            capacity: WORD_COUNT,
        }
    );

    let exact = vec![0x13u32; WORD_COUNT];
    let memory = InstructionMemory::from_words(&exact).unwrap();
    assert_eq!(memory.read_word(u16::MAX), 0x13);
}

#[test]
fn test_parse_error_line_number() {
    let err = parse_hex_image("0x13\n0x13\n0xZZ\n").unwrap_err();
    assert!(matches!(err, EmulatorError::ImageParse { line: 3, .. }));
    assert!(err.to_string().starts_with("line 3:"));
}
