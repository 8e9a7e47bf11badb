//! 内核堆
//!
//! 使用 talc 管理一块位于 .bss 中的静态区域。锁使用 sync crate 的
//! [`RawSpinLock`]，因此堆必须在 [`ArchOps`](sync::ArchOps) 注册之后使用。

use crate::config::KERNEL_HEAP_SIZE;
use core::ptr::addr_of_mut;
use sync::RawSpinLock;
use talc::{ErrOnOom, Span, Talc, Talck};

static mut HEAP: [u8; KERNEL_HEAP_SIZE] = [0; KERNEL_HEAP_SIZE];

#[global_allocator]
static ALLOCATOR: Talck<RawSpinLock, ErrOnOom> = Talc::new(ErrOnOom).lock();

/// 把静态堆区域交给分配器
pub fn init_heap() -> Result<(), ()> {
    // SAFETY: HEAP 只在这里被取地址一次，之后完全归分配器所有
    let span = Span::from_array(unsafe { addr_of_mut!(HEAP) });
    // SAFETY: span 指向有效、未被其它代码使用的内存
    unsafe { ALLOCATOR.lock().claim(span) }.map(|_| ())
}
