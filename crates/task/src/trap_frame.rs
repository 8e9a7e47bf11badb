//! 陷阱快照

use core::mem::offset_of;

/// 陷阱入口保存的寄存器快照
///
/// 布局与陷阱入口汇编一一对应，不能调整字段顺序：
///
/// | 偏移 | 内容 |
/// |---|---|
/// | 0..31×8 | x1..x31 |
/// | 31×8 | sepc |
/// | 32×8 | scause |
/// | 33×8 | stval |
/// | 34×8 | 进程内核栈顶 |
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    /// x1..x31，`regs[i]` 对应 `x(i+1)`
    pub regs: [usize; 31],
    /// 恢复执行的地址
    pub sepc: usize,
    /// 原因寄存器，最高位为中断标志
    pub scause: usize,
    /// 附加陷阱值
    pub stval: usize,
    /// 陷阱处理时使用的内核栈顶
    pub kernel_sp: usize,
}

const _: () = {
    assert!(offset_of!(TrapFrame, sepc) == 31 * 8);
    assert!(offset_of!(TrapFrame, scause) == 32 * 8);
    assert!(offset_of!(TrapFrame, stval) == 33 * 8);
    assert!(offset_of!(TrapFrame, kernel_sp) == 34 * 8);
};

impl TrapFrame {
    /// 全零快照
    pub const fn zero() -> Self {
        Self {
            regs: [0; 31],
            sepc: 0,
            scause: 0,
            stval: 0,
            kernel_sp: 0,
        }
    }

    /// 读取通用寄存器 `x{n}`，x0 恒为 0
    pub fn reg(&self, n: usize) -> usize {
        if n == 0 { 0 } else { self.regs[n - 1] }
    }

    /// 写入通用寄存器 `x{n}`，写 x0 被忽略
    pub fn set_reg(&mut self, n: usize, value: usize) {
        if n != 0 {
            self.regs[n - 1] = value;
        }
    }

    /// 栈指针（x2）
    pub fn sp(&self) -> usize {
        self.reg(2)
    }

    /// 设置栈指针（x2）
    pub fn set_sp(&mut self, sp: usize) {
        self.set_reg(2, sp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_indexing() {
        let mut tf = TrapFrame::zero();
        tf.set_reg(0, 5);
        assert_eq!(tf.reg(0), 0);
        tf.set_sp(0x1000);
        assert_eq!(tf.regs[1], 0x1000);
        tf.set_reg(31, 7);
        assert_eq!(tf.regs[30], 7);
        assert_eq!(core::mem::size_of::<TrapFrame>(), 35 * 8);
    }
}
