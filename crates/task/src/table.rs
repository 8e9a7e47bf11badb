//! 定长进程表

use crate::pcb::{Pcb, ProcState};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

/// 默认的进程表容量
pub const NPROC: usize = 64;

/// 定长进程表，pid 即槽位下标
///
/// 槽位存放在堆上且从不移动，切换期间取得的 PCB 指针始终有效。
#[derive(Debug)]
pub struct ProcessTable {
    slots: Box<[Pcb]>,
}

impl ProcessTable {
    /// 创建 `capacity` 个 Unused 槽位
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(Pcb::unused).collect::<Vec<_>>().into_boxed_slice(),
        }
    }

    /// 把所有槽位重置为 Unused
    ///
    /// 不回收原先占用的帧，只应在启动时调用。
    pub fn init_table(&mut self) {
        for (pid, slot) in self.slots.iter_mut().enumerate() {
            *slot = Pcb::unused(pid);
        }
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 第一个 Unused 槽位
    pub fn first_unused(&self) -> Option<usize> {
        self.slots.iter().position(|p| p.state == ProcState::Unused)
    }

    /// 处于给定状态的槽位数
    pub fn count(&self, state: ProcState) -> usize {
        self.slots.iter().filter(|p| p.state == state).count()
    }

    /// 全部槽位
    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter()
    }
}

impl Index<usize> for ProcessTable {
    type Output = Pcb;

    fn index(&self, pid: usize) -> &Pcb {
        &self.slots[pid]
    }
}

impl IndexMut<usize> for ProcessTable {
    fn index_mut(&mut self, pid: usize) -> &mut Pcb {
        &mut self.slots[pid]
    }
}
