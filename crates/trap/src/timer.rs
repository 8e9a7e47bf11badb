//! 定时器设备接口

/// 参考配置下的时间片（滴答数）
pub const DEFAULT_QUANTUM: u64 = 1_000_000;

/// CLINT 风格的定时器：一个自由运行的计数器，每个 hart 一个比较寄存器
pub trait TimerDevice {
    /// 读取计数器
    fn now(&self) -> u64;

    /// 写入 `hart` 的比较寄存器
    fn set_comparator(&self, hart: usize, deadline: u64);

    /// 把下一次定时器中断设置在一个时间片之后，返回截止时间
    fn program_next(&self, config: &TimerConfig) -> u64 {
        let deadline = self.now().wrapping_add(config.quantum);
        self.set_comparator(config.hart, deadline);
        deadline
    }
}

/// 定时器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// 触发定时器中断的 hart
    pub hart: usize,
    /// 时间片
    pub quantum: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            hart: 0,
            quantum: DEFAULT_QUANTUM,
        }
    }
}
