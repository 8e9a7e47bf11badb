//! Mock 实现模块
//!
//! 提供架构、定时器与上下文切换的 Mock 实现，用于测试

pub mod arch;
pub mod switch;
pub mod timer;
