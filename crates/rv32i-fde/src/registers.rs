//! Register state: the general-purpose file and machine-mode storage.

use core::fmt;

use rv32i_encoder::Gpr;

use crate::error::EmulatorError;

/// 32 general-purpose registers. `x0` always reads 0; writes to it are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFile {
    regs: [i32; 32],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, reg: Gpr) -> i32 {
        if reg.is_zero() {
            0
        } else {
            self.regs[reg.index()]
        }
    }

    pub fn write(&mut self, reg: Gpr, value: i32) {
        if !reg.is_zero() {
            self.regs[reg.index()] = value;
        }
    }

    /// Read by plain index, rejecting anything outside 0..=31.
    pub fn read_index(&self, index: usize) -> Result<i32, EmulatorError> {
        Ok(self.read(Self::checked(index)?))
    }

    /// Write by plain index, rejecting anything outside 0..=31.
    pub fn write_index(&mut self, index: usize, value: i32) -> Result<(), EmulatorError> {
        self.write(Self::checked(index)?, value);
        Ok(())
    }

    /// Copy of all 32 registers, `x0` included.
    pub fn snapshot(&self) -> [i32; 32] {
        self.regs
    }

    pub fn clear(&mut self) {
        self.regs = [0; 32];
    }

    /// Registers holding a non-zero value, in ascending order.
    pub fn non_zero(&self) -> impl Iterator<Item = (Gpr, i32)> + '_ {
        Gpr::all()
            .map(|reg| (reg, self.read(reg)))
            .filter(|(_, value)| *value != 0)
    }

    fn checked(index: usize) -> Result<Gpr, EmulatorError> {
        u8::try_from(index)
            .ok()
            .and_then(Gpr::try_new)
            .ok_or(EmulatorError::InvalidRegister { index })
    }
}

/// Machine-mode status and trap registers.
///
/// Storage only: nothing in the core raises traps, so these hold whatever the
/// host writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineRegisters {
    pub mstatus: u32,
    pub mepc: u32,
    pub mcause: u32,
    pub mtvec: u32,
}

/// Host-visible register numbering.
///
/// `x0`..`x31` are 0..=31, followed by `pc` and the machine registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId {
    Gpr(Gpr),
    Pc,
    Mstatus,
    Mepc,
    Mcause,
    Mtvec,
}

impl RegisterId {
    /// Number of host-visible registers.
    pub const COUNT: usize = 37;

    pub fn from_number(number: usize) -> Option<Self> {
        match number {
            0..=31 => Gpr::try_new(number as u8).map(RegisterId::Gpr),
            32 => Some(RegisterId::Pc),
            33 => Some(RegisterId::Mstatus),
            34 => Some(RegisterId::Mepc),
            35 => Some(RegisterId::Mcause),
            36 => Some(RegisterId::Mtvec),
            _ => None,
        }
    }

    pub fn number(self) -> usize {
        match self {
            RegisterId::Gpr(reg) => reg.index(),
            RegisterId::Pc => 32,
            RegisterId::Mstatus => 33,
            RegisterId::Mepc => 34,
            RegisterId::Mcause => 35,
            RegisterId::Mtvec => 36,
        }
    }

    /// Accepts `x0`..`x31`, ABI names, `pc` and the machine register names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pc" => Some(RegisterId::Pc),
            "mstatus" => Some(RegisterId::Mstatus),
            "mepc" => Some(RegisterId::Mepc),
            "mcause" => Some(RegisterId::Mcause),
            "mtvec" => Some(RegisterId::Mtvec),
            _ => Gpr::from_name(name).map(RegisterId::Gpr),
        }
    }

    /// Canonical name. General-purpose registers use the `xN` form.
    pub fn name(self) -> &'static str {
        const X_NAMES: [&str; 32] = [
            "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12",
            "x13", "x14", "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24",
            "x25", "x26", "x27", "x28", "x29", "x30", "x31",
        ];
        match self {
            RegisterId::Gpr(reg) => X_NAMES[reg.index()],
            RegisterId::Pc => "pc",
            RegisterId::Mstatus => "mstatus",
            RegisterId::Mepc => "mepc",
            RegisterId::Mcause => "mcause",
            RegisterId::Mtvec => "mtvec",
        }
    }

    /// All host-visible registers in numbering order.
    pub fn all() -> impl Iterator<Item = RegisterId> {
        (0..Self::COUNT).filter_map(Self::from_number)
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
