//! 示例工作负载
//!
//! 代码位于链接脚本中页对齐的 `.text.user` 段，每个工作负载独占一页，
//! 它的物理地址就是创建进程时的入口。

use core::arch::global_asm;

global_asm!(include_str!("user.S"));

unsafe extern "C" {
    fn user_process_1();
    fn user_process_2();
}

/// 启动时创建的工作负载：名字与入口物理地址
pub fn workloads() -> [(&'static str, usize); 2] {
    [
        ("user_process_1", user_process_1 as *const () as usize),
        ("user_process_2", user_process_2 as *const () as usize),
    ]
}
