//! 新进程的地址空间布局

use mm::{PAGE_SIZE, Paddr, PteFlags, Vaddr};

/// 一段固定映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMap {
    /// 虚拟起始地址
    pub va: Vaddr,
    /// 物理起始地址
    pub pa: Paddr,
    /// 字节数，向上取整到页
    pub len: usize,
    /// 权限（V 由构建器补上）
    pub flags: PteFlags,
}

impl FixedMap {
    /// 虚拟地址等于物理地址的映射
    pub const fn identity(addr: usize, len: usize, flags: PteFlags) -> Self {
        Self {
            va: Vaddr(addr),
            pa: Paddr(addr),
            len,
            flags,
        }
    }
}

/// 每个新进程使用的固定布局
#[derive(Debug, Clone, Copy)]
pub struct ProcessLayout {
    /// 代码页映射到的虚拟地址
    pub entry_va: Vaddr,
    /// 设备映射（R|W），让进程可以直接做 I/O
    pub device: FixedMap,
    /// 私有用户栈所在的虚拟页；`None` 时寄存器全部清零
    pub user_stack_va: Option<Vaddr>,
    /// 额外的映射，例如内核镜像，使陷阱入口在进程页表下仍然可用
    pub extra: &'static [FixedMap],
    /// 进程自己的内核栈帧按恒等方式映射时使用的权限；`None` 时不映射
    ///
    /// 只映射本进程的那一帧，其他进程的内核栈在这张页表下不可见。
    pub kstack_flags: Option<PteFlags>,
}

/// 默认的用户入口虚拟地址
pub const DEFAULT_ENTRY_VA: usize = 0x1000;

/// 默认的设备（UART）地址
pub const DEFAULT_DEVICE_ADDR: usize = 0x1000_0000;

impl ProcessLayout {
    /// 最小布局：入口页与一个设备页
    pub const fn minimal() -> Self {
        Self {
            entry_va: Vaddr(DEFAULT_ENTRY_VA),
            device: FixedMap::identity(
                DEFAULT_DEVICE_ADDR,
                PAGE_SIZE,
                PteFlags::R.union(PteFlags::W),
            ),
            user_stack_va: None,
            extra: &[],
            kstack_flags: None,
        }
    }
}

impl Default for ProcessLayout {
    fn default() -> Self {
        Self::minimal()
    }
}
