//! 串口控制台
//!
//! 16550 UART 是内核唯一的字符输出设备，只写不读。
//! 正常路径通过 [`CONSOLE`] 加锁输出；停机路径使用 [`emergency_writer`]，
//! 不依赖任何锁。

use crate::config::UART_BASE;
use core::fmt::{self, Write};
use lazy_static::lazy_static;
use sync::SpinLock;
use uart_16550::MmioSerialPort;

lazy_static! {
    /// 全局控制台
    static ref CONSOLE: SpinLock<MmioSerialPort> = {
        // SAFETY: UART_BASE 是 virt 机器上 16550 的 MMIO 地址，内核恒等访问
        let mut port = unsafe { MmioSerialPort::new(UART_BASE) };
        port.init();
        SpinLock::new(port)
    };
}

/// 初始化控制台
pub fn init() {
    lazy_static::initialize(&CONSOLE);
}

/// 标准输出
pub struct Stdout;

impl Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        CONSOLE.lock().write_str(s)
    }
}

/// 不加锁的输出端，只在停机路径使用
///
/// 持锁者可能正是触发停机的代码，这里直接再开一个指向同一设备的端口。
pub fn emergency_writer() -> MmioSerialPort {
    // SAFETY: 同 CONSOLE；停机后不会再有其它输出者
    unsafe { MmioSerialPort::new(UART_BASE) }
}
