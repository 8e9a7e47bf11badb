//! 内存管理模块
//!
//! 帧分配器与页表构建由 `mm` crate 提供，这里负责：
//!
//! 1. 根据链接脚本导出的 `ekernel` 计算内核镜像的保留量并初始化全局帧分配器；
//! 2. 初始化内核堆（[`global_allocator`]）。
//!
//! 内核恒等访问物理内存，页表页通过 [`DirectMap`] 读写。

pub mod global_allocator;

pub use global_allocator::init_heap;

use crate::config::{KERNEL_RESERVED, MEMORY_BASE, MEMORY_SIZE, PAGE_SIZE};
use mm::{DirectMap, FrameAllocator, MemoryLayout, MmResult};
use sync::SpinLock;

unsafe extern "C" {
    // 链接器脚本中定义的内核结束地址
    fn ekernel();
}

/// 全局帧分配器，[`init`] 之前为 `None`
pub static FRAME_ALLOCATOR: SpinLock<Option<FrameAllocator>> = SpinLock::new(None);

/// 内核镜像（含其前面的固件）占用的字节数，按页向上取整
fn kernel_size() -> usize {
    let end = (ekernel as *const () as usize).div_ceil(PAGE_SIZE) * PAGE_SIZE;
    (end - MEMORY_BASE).max(KERNEL_RESERVED)
}

/// 初始化物理帧分配器
///
/// 需要堆已经可用（位图存放在堆上）。
pub fn init() -> MmResult<()> {
    let layout = MemoryLayout::new(MEMORY_BASE, MEMORY_SIZE, kernel_size());
    let mut frames = FrameAllocator::new(layout)?;
    frames.init();
    klog::pr_info!(
        "[MM] {:#x}..{:#x}: {} frames, {} reserved",
        layout.base,
        layout.end(),
        frames.total_frames(),
        layout.reserved_frames()
    );
    FRAME_ALLOCATOR.lock().replace(frames);
    Ok(())
}

/// 在持有全局帧分配器的情况下执行 `f`
///
/// 分配器尚未初始化时返回 `None`。
pub fn with_frames<R>(f: impl FnOnce(&mut FrameAllocator, &mut DirectMap) -> R) -> Option<R> {
    let mut guard = FRAME_ALLOCATOR.lock();
    let frames = guard.as_mut()?;
    // SAFETY: 内核恒等映射全部物理内存，进程页表同样恒等映射内核 RAM
    let mut mem = unsafe { DirectMap::new(0) };
    Some(f(frames, &mut mem))
}
