//! RISC-V 64 (Sv39, S 态) 架构支持

pub mod boot;
pub mod constant;
pub mod intr;
pub mod switch;
pub mod timer;
pub mod trap;
