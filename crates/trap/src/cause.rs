//! 陷阱原因解码
//!
//! 原因寄存器的最高位区分中断与同步异常，其余位是具体的原因号。

use core::fmt;

/// 原因寄存器中的中断标志位
const INTERRUPT_BIT: usize = 1 << (usize::BITS - 1);

/// 中断原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// 1
    SupervisorSoft,
    /// 3
    MachineSoft,
    /// 5
    SupervisorTimer,
    /// 7
    MachineTimer,
    /// 9
    SupervisorExternal,
    /// 11
    MachineExternal,
    /// 13
    CounterOverflow,
    /// 未定义的原因号
    Unknown(usize),
}

/// 同步异常原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// 0
    InstructionMisaligned,
    /// 1
    InstructionFault,
    /// 2
    IllegalInstruction,
    /// 3
    Breakpoint,
    /// 4
    LoadMisaligned,
    /// 5
    LoadFault,
    /// 6
    StoreMisaligned,
    /// 7
    StoreFault,
    /// 8
    UserEnvCall,
    /// 9
    SupervisorEnvCall,
    /// 11
    MachineEnvCall,
    /// 12
    InstructionPageFault,
    /// 13
    LoadPageFault,
    /// 15
    StorePageFault,
    /// 18
    SoftwareCheck,
    /// 19
    HardwareError,
    /// 未定义的原因号
    Unknown(usize),
}

/// 解码后的陷阱
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// 异步中断
    Interrupt(Interrupt),
    /// 同步异常
    Exception(Exception),
}

impl Interrupt {
    fn from_code(code: usize) -> Self {
        match code {
            1 => Interrupt::SupervisorSoft,
            3 => Interrupt::MachineSoft,
            5 => Interrupt::SupervisorTimer,
            7 => Interrupt::MachineTimer,
            9 => Interrupt::SupervisorExternal,
            11 => Interrupt::MachineExternal,
            13 => Interrupt::CounterOverflow,
            other => Interrupt::Unknown(other),
        }
    }

    /// 原因号
    pub fn code(&self) -> usize {
        match *self {
            Interrupt::SupervisorSoft => 1,
            Interrupt::MachineSoft => 3,
            Interrupt::SupervisorTimer => 5,
            Interrupt::MachineTimer => 7,
            Interrupt::SupervisorExternal => 9,
            Interrupt::MachineExternal => 11,
            Interrupt::CounterOverflow => 13,
            Interrupt::Unknown(code) => code,
        }
    }
}

impl Exception {
    fn from_code(code: usize) -> Self {
        match code {
            0 => Exception::InstructionMisaligned,
            1 => Exception::InstructionFault,
            2 => Exception::IllegalInstruction,
            3 => Exception::Breakpoint,
            4 => Exception::LoadMisaligned,
            5 => Exception::LoadFault,
            6 => Exception::StoreMisaligned,
            7 => Exception::StoreFault,
            8 => Exception::UserEnvCall,
            9 => Exception::SupervisorEnvCall,
            11 => Exception::MachineEnvCall,
            12 => Exception::InstructionPageFault,
            13 => Exception::LoadPageFault,
            15 => Exception::StorePageFault,
            18 => Exception::SoftwareCheck,
            19 => Exception::HardwareError,
            other => Exception::Unknown(other),
        }
    }

    /// 原因号
    pub fn code(&self) -> usize {
        match *self {
            Exception::InstructionMisaligned => 0,
            Exception::InstructionFault => 1,
            Exception::IllegalInstruction => 2,
            Exception::Breakpoint => 3,
            Exception::LoadMisaligned => 4,
            Exception::LoadFault => 5,
            Exception::StoreMisaligned => 6,
            Exception::StoreFault => 7,
            Exception::UserEnvCall => 8,
            Exception::SupervisorEnvCall => 9,
            Exception::MachineEnvCall => 11,
            Exception::InstructionPageFault => 12,
            Exception::LoadPageFault => 13,
            Exception::StorePageFault => 15,
            Exception::SoftwareCheck => 18,
            Exception::HardwareError => 19,
            Exception::Unknown(code) => code,
        }
    }
}

impl Trap {
    /// 解码原因寄存器的原始值
    pub fn decode(cause: usize) -> Self {
        let code = cause & !INTERRUPT_BIT;
        if cause & INTERRUPT_BIT != 0 {
            Trap::Interrupt(Interrupt::from_code(code))
        } else {
            Trap::Exception(Exception::from_code(code))
        }
    }

    /// 重新编码为原因寄存器的值
    pub fn to_cause(&self) -> usize {
        match self {
            Trap::Interrupt(i) => INTERRUPT_BIT | i.code(),
            Trap::Exception(e) => e.code(),
        }
    }

    /// 是否为中断
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Trap::Interrupt(_))
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::Interrupt(i) => write!(f, "interrupt {:?}", i),
            Trap::Exception(e) => write!(f, "exception {:?}", e),
        }
    }
}
