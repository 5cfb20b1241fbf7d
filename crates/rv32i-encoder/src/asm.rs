//! Minimal RV32I text assembler.
//!
//! One instruction per line, operands separated by commas, `#` or `//`
//! comments. Branch and jump targets are numeric byte offsets; there are no
//! labels.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit1, hex_digit1, space0},
    combinator::{all_consuming, map, map_res, opt},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::{error::AsmError, inst::Inst, regs::Gpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Reg(Gpr),
    Imm(i64),
    Mem { offset: i64, base: Gpr },
}

use Operand::{Imm, Mem, Reg};

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_')(input)
}

fn register(input: &str) -> IResult<&str, Gpr> {
    map_res(identifier, |name: &str| Gpr::from_name(name).ok_or(()))(input)
}

fn unsigned_number(input: &str) -> IResult<&str, i64> {
    alt((
        map_res(preceded(tag_no_case("0x"), hex_digit1), |digits: &str| {
            i64::from_str_radix(digits, 16)
        }),
        map_res(digit1, |digits: &str| digits.parse::<i64>()),
    ))(input)
}

fn immediate(input: &str) -> IResult<&str, i64> {
    map(
        pair(opt(alt((char('-'), char('+')))), unsigned_number),
        |(sign, value)| if sign == Some('-') { -value } else { value },
    )(input)
}

fn memory(input: &str) -> IResult<&str, Operand> {
    map(
        pair(
            opt(immediate),
            delimited(
                pair(space0, char('(')),
                delimited(space0, register, space0),
                char(')'),
            ),
        ),
        |(offset, base)| Mem {
            offset: offset.unwrap_or(0),
            base,
        },
    )(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
    alt((memory, map(register, Reg), map(immediate, Imm)))(input)
}

fn statement(input: &str) -> IResult<&str, (&str, Vec<Operand>)> {
    pair(
        preceded(space0, identifier),
        terminated(
            preceded(
                space0,
                separated_list0(delimited(space0, char(','), space0), operand),
            ),
            space0,
        ),
    )(input)
}

fn strip_comment(text: &str) -> &str {
    let end = [text.find('#'), text.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
    &text[..end]
}

/// Assemble a single instruction.
pub fn assemble_instruction(text: &str) -> Result<Inst, AsmError> {
    parse_line(text, 1)?.ok_or_else(|| AsmError::Syntax {
        line: 1,
        text: text.to_string(),
    })
}

/// Assemble a program into instruction words, one per non-empty line.
pub fn assemble_words(asm: &str) -> Result<Vec<u32>, AsmError> {
    let mut words = Vec::new();
    for (idx, text) in asm.lines().enumerate() {
        if let Some(inst) = parse_line(text, idx + 1)? {
            words.push(inst.encode());
        }
    }
    Ok(words)
}

/// Assemble a program into little-endian code bytes.
pub fn assemble_code(asm: &str) -> Result<Vec<u8>, AsmError> {
    Ok(assemble_words(asm)?
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect())
}

fn parse_line(text: &str, line: usize) -> Result<Option<Inst>, AsmError> {
    let code = strip_comment(text).trim();
    if code.is_empty() {
        return Ok(None);
    }
    let (_, (mnemonic, operands)) =
        all_consuming(statement)(code).map_err(|_| AsmError::Syntax {
            line,
            text: code.to_string(),
        })?;
    let mnemonic = mnemonic.to_ascii_lowercase();
    let ctx = Ctx {
        line,
        mnemonic: &mnemonic,
    };
    ctx.build(&operands).map(Some)
}

struct Ctx<'a> {
    line: usize,
    mnemonic: &'a str,
}

impl Ctx<'_> {
    fn invalid(&self, expected: &'static str) -> AsmError {
        AsmError::InvalidOperands {
            line: self.line,
            mnemonic: String::from(self.mnemonic),
            expected,
        }
    }

    fn ranged(&self, value: i64, min: i64, max: i64) -> Result<i32, AsmError> {
        if value < min || value > max {
            return Err(AsmError::ImmediateOutOfRange {
                line: self.line,
                mnemonic: String::from(self.mnemonic),
                value,
                min,
                max,
            });
        }
        Ok(value as i32)
    }

    fn offset(&self, value: i64, min: i64, max: i64) -> Result<i32, AsmError> {
        if value % 2 != 0 {
            return Err(AsmError::MisalignedOffset {
                line: self.line,
                mnemonic: String::from(self.mnemonic),
                value,
            });
        }
        self.ranged(value, min, max)
    }

    fn imm12(&self, value: i64) -> Result<i32, AsmError> {
        self.ranged(value, -2048, 2047)
    }

    fn branch_offset(&self, value: i64) -> Result<i32, AsmError> {
        self.offset(value, -4096, 4094)
    }

    fn jump_offset(&self, value: i64) -> Result<i32, AsmError> {
        self.offset(value, -(1 << 20), (1 << 20) - 2)
    }

    fn r_type(&self, ops: &[Operand], f: fn(Gpr, Gpr, Gpr) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rd), Reg(rs1), Reg(rs2)] => Ok(f(*rd, *rs1, *rs2)),
            _ => Err(self.invalid("rd, rs1, rs2")),
        }
    }

    fn i_type(&self, ops: &[Operand], f: fn(Gpr, Gpr, i32) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rd), Reg(rs1), Imm(imm)] => Ok(f(*rd, *rs1, self.imm12(*imm)?)),
            _ => Err(self.invalid("rd, rs1, imm")),
        }
    }

    fn shift(&self, ops: &[Operand], f: fn(Gpr, Gpr, u8) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rd), Reg(rs1), Imm(shamt)] => Ok(f(*rd, *rs1, self.ranged(*shamt, 0, 31)? as u8)),
            _ => Err(self.invalid("rd, rs1, shamt")),
        }
    }

    fn load(&self, ops: &[Operand], f: fn(Gpr, Gpr, i32) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rd), Mem { offset, base }] => Ok(f(*rd, *base, self.imm12(*offset)?)),
            _ => Err(self.invalid("rd, offset(rs1)")),
        }
    }

    fn store(&self, ops: &[Operand], f: fn(Gpr, Gpr, i32) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rs2), Mem { offset, base }] => Ok(f(*base, *rs2, self.imm12(*offset)?)),
            _ => Err(self.invalid("rs2, offset(rs1)")),
        }
    }

    fn branch(&self, ops: &[Operand], f: fn(Gpr, Gpr, i32) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rs1), Reg(rs2), Imm(offset)] => Ok(f(*rs1, *rs2, self.branch_offset(*offset)?)),
            _ => Err(self.invalid("rs1, rs2, offset")),
        }
    }

    fn upper(&self, ops: &[Operand], f: fn(Gpr, i32) -> Inst) -> Result<Inst, AsmError> {
        match ops {
            [Reg(rd), Imm(imm)] => Ok(f(*rd, self.ranged(*imm, -(1 << 19), (1 << 20) - 1)?)),
            _ => Err(self.invalid("rd, imm20")),
        }
    }

    fn no_operands(&self, ops: &[Operand], inst: Inst) -> Result<Inst, AsmError> {
        if ops.is_empty() {
            Ok(inst)
        } else {
            Err(self.invalid("no operands"))
        }
    }

    fn build(&self, ops: &[Operand]) -> Result<Inst, AsmError> {
        match self.mnemonic {
            "add" => self.r_type(ops, |rd, rs1, rs2| Inst::Add { rd, rs1, rs2 }),
            "sub" => self.r_type(ops, |rd, rs1, rs2| Inst::Sub { rd, rs1, rs2 }),
            "sll" => self.r_type(ops, |rd, rs1, rs2| Inst::Sll { rd, rs1, rs2 }),
            "slt" => self.r_type(ops, |rd, rs1, rs2| Inst::Slt { rd, rs1, rs2 }),
            "sltu" => self.r_type(ops, |rd, rs1, rs2| Inst::Sltu { rd, rs1, rs2 }),
            "xor" => self.r_type(ops, |rd, rs1, rs2| Inst::Xor { rd, rs1, rs2 }),
            "srl" => self.r_type(ops, |rd, rs1, rs2| Inst::Srl { rd, rs1, rs2 }),
            "sra" => self.r_type(ops, |rd, rs1, rs2| Inst::Sra { rd, rs1, rs2 }),
            "or" => self.r_type(ops, |rd, rs1, rs2| Inst::Or { rd, rs1, rs2 }),
            "and" => self.r_type(ops, |rd, rs1, rs2| Inst::And { rd, rs1, rs2 }),

            "addi" => self.i_type(ops, |rd, rs1, imm| Inst::Addi { rd, rs1, imm }),
            "slti" => self.i_type(ops, |rd, rs1, imm| Inst::Slti { rd, rs1, imm }),
            "sltiu" => self.i_type(ops, |rd, rs1, imm| Inst::Sltiu { rd, rs1, imm }),
            "xori" => self.i_type(ops, |rd, rs1, imm| Inst::Xori { rd, rs1, imm }),
            "ori" => self.i_type(ops, |rd, rs1, imm| Inst::Ori { rd, rs1, imm }),
            "andi" => self.i_type(ops, |rd, rs1, imm| Inst::Andi { rd, rs1, imm }),
            "slli" => self.shift(ops, |rd, rs1, shamt| Inst::Slli { rd, rs1, shamt }),
            "srli" => self.shift(ops, |rd, rs1, shamt| Inst::Srli { rd, rs1, shamt }),
            "srai" => self.shift(ops, |rd, rs1, shamt| Inst::Srai { rd, rs1, shamt }),

            "lb" => self.load(ops, |rd, rs1, imm| Inst::Lb { rd, rs1, imm }),
            "lh" => self.load(ops, |rd, rs1, imm| Inst::Lh { rd, rs1, imm }),
            "lw" => self.load(ops, |rd, rs1, imm| Inst::Lw { rd, rs1, imm }),
            "lbu" => self.load(ops, |rd, rs1, imm| Inst::Lbu { rd, rs1, imm }),
            "lhu" => self.load(ops, |rd, rs1, imm| Inst::Lhu { rd, rs1, imm }),
            "sb" => self.store(ops, |rs1, rs2, imm| Inst::Sb { rs1, rs2, imm }),
            "sh" => self.store(ops, |rs1, rs2, imm| Inst::Sh { rs1, rs2, imm }),
            "sw" => self.store(ops, |rs1, rs2, imm| Inst::Sw { rs1, rs2, imm }),

            "beq" => self.branch(ops, |rs1, rs2, offset| Inst::Beq { rs1, rs2, offset }),
            "bne" => self.branch(ops, |rs1, rs2, offset| Inst::Bne { rs1, rs2, offset }),
            "blt" => self.branch(ops, |rs1, rs2, offset| Inst::Blt { rs1, rs2, offset }),
            "bge" => self.branch(ops, |rs1, rs2, offset| Inst::Bge { rs1, rs2, offset }),
            "bltu" => self.branch(ops, |rs1, rs2, offset| Inst::Bltu { rs1, rs2, offset }),
            "bgeu" => self.branch(ops, |rs1, rs2, offset| Inst::Bgeu { rs1, rs2, offset }),
            "beqz" | "bnez" => match ops {
                [Reg(rs1), Imm(offset)] => {
                    let offset = self.branch_offset(*offset)?;
                    let rs1 = *rs1;
                    let rs2 = Gpr::ZERO;
                    Ok(if self.mnemonic == "beqz" {
                        Inst::Beq { rs1, rs2, offset }
                    } else {
                        Inst::Bne { rs1, rs2, offset }
                    })
                }
                _ => Err(self.invalid("rs1, offset")),
            },

            "jal" => match ops {
                [Reg(rd), Imm(offset)] => Ok(Inst::Jal {
                    rd: *rd,
                    offset: self.jump_offset(*offset)?,
                }),
                [Imm(offset)] => Ok(Inst::Jal {
                    rd: Gpr::RA,
                    offset: self.jump_offset(*offset)?,
                }),
                _ => Err(self.invalid("[rd,] offset")),
            },
            "j" => match ops {
                [Imm(offset)] => Ok(Inst::Jal {
                    rd: Gpr::ZERO,
                    offset: self.jump_offset(*offset)?,
                }),
                _ => Err(self.invalid("offset")),
            },
            "jalr" => match ops {
                [Reg(rd), Mem { offset, base }] => Ok(Inst::Jalr {
                    rd: *rd,
                    rs1: *base,
                    imm: self.imm12(*offset)?,
                }),
                [Reg(rd), Reg(rs1), Imm(imm)] => Ok(Inst::Jalr {
                    rd: *rd,
                    rs1: *rs1,
                    imm: self.imm12(*imm)?,
                }),
                [Reg(rs1)] => Ok(Inst::Jalr {
                    rd: Gpr::RA,
                    rs1: *rs1,
                    imm: 0,
                }),
                _ => Err(self.invalid("rd, offset(rs1)")),
            },
            "jr" => match ops {
                [Reg(rs1)] => Ok(Inst::Jalr {
                    rd: Gpr::ZERO,
                    rs1: *rs1,
                    imm: 0,
                }),
                _ => Err(self.invalid("rs1")),
            },

            "lui" => self.upper(ops, |rd, imm| Inst::Lui { rd, imm }),
            "auipc" => self.upper(ops, |rd, imm| Inst::Auipc { rd, imm }),

            "li" => match ops {
                [Reg(rd), Imm(imm)] => Ok(Inst::Addi {
                    rd: *rd,
                    rs1: Gpr::ZERO,
                    imm: self.imm12(*imm)?,
                }),
                _ => Err(self.invalid("rd, imm")),
            },
            "mv" => match ops {
                [Reg(rd), Reg(rs)] => Ok(Inst::Addi {
                    rd: *rd,
                    rs1: *rs,
                    imm: 0,
                }),
                _ => Err(self.invalid("rd, rs")),
            },
            "nop" => self.no_operands(
                ops,
                Inst::Addi {
                    rd: Gpr::ZERO,
                    rs1: Gpr::ZERO,
                    imm: 0,
                },
            ),
            "ret" => self.no_operands(
                ops,
                Inst::Jalr {
                    rd: Gpr::ZERO,
                    rs1: Gpr::RA,
                    imm: 0,
                },
            ),
            "fence" => self.no_operands(ops, Inst::Fence),
            "ecall" => self.no_operands(ops, Inst::Ecall),
            "ebreak" => self.no_operands(ops, Inst::Ebreak),

            ".word" => match ops {
                [Imm(value)] => {
                    let value = self.ranged_word(*value)?;
                    Ok(Inst::Word(value))
                }
                _ => Err(self.invalid("value")),
            },

            _ => Err(AsmError::UnknownMnemonic {
                line: self.line,
                mnemonic: String::from(self.mnemonic),
            }),
        }
    }

    fn ranged_word(&self, value: i64) -> Result<u32, AsmError> {
        let min = i32::MIN as i64;
        let max = u32::MAX as i64;
        if value < min || value > max {
            return Err(AsmError::ImmediateOutOfRange {
                line: self.line,
                mnemonic: String::from(self.mnemonic),
                value,
                min,
                max,
            });
        }
        Ok(value as u32)
    }
}
