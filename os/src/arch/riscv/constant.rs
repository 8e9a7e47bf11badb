//! RISC-V 控制状态寄存器中用到的位

use bitflags::bitflags;

bitflags! {
    /// sstatus 中内核关心的位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sstatus: usize {
        /// S 态中断使能
        const SIE = 1 << 1;
        /// 陷阱前的 SIE，sret 时恢复到 SIE
        const SPIE = 1 << 5;
        /// 陷阱前的特权级，1 表示 S 态
        const SPP = 1 << 8;
    }
}

bitflags! {
    /// sie 中的中断源使能位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sie: usize {
        /// 软件中断
        const SSIE = 1 << 1;
        /// 定时器中断
        const STIE = 1 << 5;
        /// 外部中断
        const SEIE = 1 << 9;
    }
}

/// sstatus.SIE
pub const SSTATUS_SIE: usize = Sstatus::SIE.bits();
