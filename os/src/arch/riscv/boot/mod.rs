//! RISC-V 启动流程
//!
//! `entry.S` 设置启动栈后调用 `rust_main`，随后由 [`main`] 按顺序初始化：
//!
//! 1. 清零 .bss，注册 sync 的架构操作
//! 2. 内核堆、控制台与日志
//! 3. 物理帧分配器
//! 4. 陷阱入口与定时器
//! 5. 创建示例进程并进入调度循环

use core::arch::global_asm;

global_asm!(include_str!("entry.S"));

unsafe extern "C" {
    fn sbss();
    fn ebss();
}

/// 清零 .bss（启动栈不在其中）
fn clear_bss() {
    let start = sbss as *const () as usize;
    let end = ebss as *const () as usize;
    // SAFETY: [sbss, ebss) 由链接脚本给出，此时还没有任何 Rust 静态变量被使用
    unsafe { core::ptr::write_bytes(start as *mut u8, 0, end - start) };
}

/// 内核初始化，永不返回
pub fn main(hartid: usize, dtb: usize) -> ! {
    clear_bss();
    // SAFETY: 只有启动 hart 在运行
    unsafe { crate::arch::init_sync_arch_ops() };

    if crate::mm::init_heap().is_err() {
        crate::halt::halt("failed to claim kernel heap");
    }
    crate::console::init();
    crate::log::init(hartid);

    klog::pr_info!("Chimera OS: kmain entered");
    klog::pr_info!("Hart ID: {:#018x}", hartid);
    klog::pr_info!("DTB Physical Address: {:#018x}", dtb);

    if let Err(err) = crate::mm::init() {
        crate::halt::halt_with_error("frame allocator initialization failed", err);
    }

    crate::arch::trap::init();
    klog::pr_info!("Trap vector installed");
    crate::arch::timer::init(hartid);

    crate::kernel::init();
    crate::kernel::run()
}
