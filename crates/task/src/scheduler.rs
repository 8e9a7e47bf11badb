//! 协作式轮转调度器
//!
//! # 状态
//!
//! 进程表、当前进程与调度器自己的切换上下文集中在 [`SchedulerInner`] 中，
//! 由 [`UpCell`] 包装：单核且内核态不可被中断，不需要锁，
//! 只需要保证同一时刻只有一个可变借用。
//!
//! # 借用纪律
//!
//! 上下文切换会把控制流交给另一侧，而另一侧（调度循环或陷阱路径）
//! 会再次借用同一份状态。因此每次切换之前都先取出两个上下文的裸指针，
//! 释放借用，然后才调用 [`ContextSwitch::switch`]。
//!
//! # 调度顺序
//!
//! 每一轮按槽位升序扫描整张表，遇到 Runnable 的进程就切入，
//! 等它让出后继续扫描后面的槽位。没有就绪队列，也没有优先级。

use crate::context::{ContextSwitch, TaskContext};
use crate::error::{TaskError, TaskResult};
use crate::layout::ProcessLayout;
use crate::pcb::{Pcb, Pid, ProcState};
use crate::table::ProcessTable;
use crate::trap_frame::TrapFrame;
use mm::{
    AddressSpace, AlignOps, FrameAllocator, PAGE_SIZE, Paddr, PhysMemory, PteFlags, UsizeConvert,
    Vaddr,
};
use sync::UpCell;

struct SchedulerInner {
    table: ProcessTable,
    current: Option<Pid>,
    /// 调度器自己的执行状态，进程运行期间保存在这里
    scheduler_ctx: TaskContext,
}

/// 进程调度器
pub struct Scheduler<S> {
    inner: UpCell<SchedulerInner>,
    switch: S,
    layout: ProcessLayout,
}

impl<S: ContextSwitch> Scheduler<S> {
    /// 创建容量为 `capacity` 的调度器，所有槽位为 Unused
    pub fn new(switch: S, layout: ProcessLayout, capacity: usize) -> Self {
        Self {
            inner: UpCell::new(SchedulerInner {
                table: ProcessTable::new(capacity),
                current: None,
                scheduler_ctx: TaskContext::zero(),
            }),
            switch,
            layout,
        }
    }

    /// 把进程表所有槽位重置为 Unused
    pub fn init_table(&self) {
        let mut inner = self.inner.exclusive_access();
        inner.table.init_table();
        inner.current = None;
    }

    /// 创建进程
    ///
    /// 取第一个 Unused 槽位，分配内核栈与地址空间，把 `entry` 所在的物理页
    /// 以 R|X 映射到固定入口地址，把设备页以 R|W 映射，初始化陷阱快照，
    /// 最后才把状态置为 Runnable。
    ///
    /// 任何一步失败都只记录日志并返回错误，槽位保持 Unused；
    /// 已经分配出去的内核栈与部分页表不会回收。
    pub fn create(
        &self,
        frames: &mut FrameAllocator,
        mem: &mut impl PhysMemory,
        entry: Paddr,
    ) -> TaskResult<Pid> {
        let Some(pid) = self.inner.access().table.first_unused() else {
            log::warn!("task: no available process slot");
            return Err(TaskError::NoProcessSlot);
        };

        let pcb = self.build(pid, frames, mem, entry).inspect_err(|err| {
            log::warn!("task: failed to create process in slot {}: {}", pid, err);
        })?;

        log::info!(
            "task: created process {}, entry {:#x} at {:#x}, root {:#x}",
            pid,
            entry,
            pcb.trap_frame.sepc,
            pcb.space.map_or(0, |s| s.root().as_usize())
        );
        self.inner.exclusive_access().table[pid] = pcb;
        Ok(pid)
    }

    fn build(
        &self,
        pid: Pid,
        frames: &mut FrameAllocator,
        mem: &mut impl PhysMemory,
        entry: Paddr,
    ) -> TaskResult<Pcb> {
        let layout = &self.layout;
        let kstack = frames.allocate()?;
        let space = AddressSpace::create(frames, mem)?;

        space.map(
            frames,
            mem,
            layout.entry_va,
            entry.align_down_to_page(),
            PteFlags::R | PteFlags::X,
        )?;
        let device = &layout.device;
        space.map_range(frames, mem, device.va, device.pa, device.len, device.flags)?;
        for m in layout.extra {
            space.map_range(frames, mem, m.va, m.pa, m.len, m.flags)?;
        }
        if let Some(flags) = layout.kstack_flags {
            space.map(frames, mem, Vaddr(kstack.as_usize()), kstack, flags)?;
        }

        let mut trap_frame = TrapFrame::zero();
        if let Some(stack_va) = layout.user_stack_va {
            let stack = frames.allocate()?;
            space.map(frames, mem, stack_va, stack, PteFlags::R | PteFlags::W)?;
            trap_frame.set_sp(stack_va.align_down_to_page().as_usize() + PAGE_SIZE);
        }

        let kstack_top = kstack.as_usize() + PAGE_SIZE;
        trap_frame.sepc = layout.entry_va.as_usize() + entry.page_offset();
        trap_frame.kernel_sp = kstack_top;

        Ok(Pcb {
            pid,
            state: ProcState::Runnable,
            kstack: Some(kstack),
            space: Some(space),
            trap_frame,
            context: TaskContext::first_run(self.switch.first_run_entry(), kstack_top),
        })
    }

    /// 扫描一轮进程表
    ///
    /// 按槽位升序依次切入每个 Runnable 进程，返回本轮运行过的进程数。
    pub fn sweep(&self) -> usize {
        let mut ran = 0;
        let capacity = self.inner.access().table.capacity();

        for pid in 0..capacity {
            let (old, new, space, trap_frame) = {
                let mut inner = self.inner.exclusive_access();
                let inner = &mut *inner;
                let pcb = &mut inner.table[pid];
                if pcb.state != ProcState::Runnable {
                    continue;
                }
                let Some(space) = pcb.space else {
                    log::error!("task: runnable process {} has no address space", pid);
                    continue;
                };
                pcb.state = ProcState::Running;
                let new = &pcb.context as *const TaskContext;
                let trap_frame = &mut pcb.trap_frame as *mut TrapFrame;
                inner.current = Some(pid);
                (&mut inner.scheduler_ctx as *mut TaskContext, new, space, trap_frame)
            };

            self.switch.prepare(space, trap_frame);
            // SAFETY: 两个上下文都位于 self.inner 中，且此时没有任何借用存活
            unsafe { self.switch.switch(old, new) };

            // 进程让出后回到这里
            self.inner.exclusive_access().current = None;
            ran += 1;
        }
        ran
    }

    /// 调度循环，永不返回
    pub fn scheduler_loop(&self) -> ! {
        log::info!("task: entering scheduler loop");
        loop {
            if self.sweep() == 0 {
                core::hint::spin_loop();
            }
        }
    }

    /// 当前进程让出处理器
    ///
    /// 把当前进程置为 Runnable 并切换回调度器。没有当前进程时什么也不做，
    /// 返回 `false`；否则在进程重新被调度之后返回 `true`。
    pub fn yield_now(&self) -> bool {
        let (old, new) = {
            let mut inner = self.inner.exclusive_access();
            let inner = &mut *inner;
            let Some(pid) = inner.current else {
                log::debug!("task: yield with no current process ignored");
                return false;
            };
            let pcb = &mut inner.table[pid];
            pcb.state = ProcState::Runnable;
            (
                &mut pcb.context as *mut TaskContext,
                &inner.scheduler_ctx as *const TaskContext,
            )
        };
        // SAFETY: 同 sweep
        unsafe { self.switch.switch(old, new) };
        true
    }

    /// 当前运行的进程
    pub fn current(&self) -> Option<Pid> {
        self.inner.access().current
    }

    /// 当前运行的进程，调度器状态正被独占借用时返回 `None`
    ///
    /// 日志上下文可能在调度器内部被调用，这里不能 panic。
    pub fn try_current(&self) -> Option<Pid> {
        self.inner.try_access().and_then(|inner| inner.current)
    }

    /// 进程状态，pid 越界时返回 `None`
    pub fn state_of(&self, pid: Pid) -> Option<ProcState> {
        let inner = self.inner.access();
        (pid < inner.table.capacity()).then(|| inner.table[pid].state)
    }

    /// 以只读方式访问某个 PCB
    pub fn with_process<R>(&self, pid: Pid, f: impl FnOnce(&Pcb) -> R) -> Option<R> {
        let inner = self.inner.access();
        (pid < inner.table.capacity()).then(|| f(&inner.table[pid]))
    }

    /// 处于 Runnable 状态的进程数
    pub fn runnable_count(&self) -> usize {
        self.inner.access().table.count(ProcState::Runnable)
    }

    /// 进程表容量
    pub fn capacity(&self) -> usize {
        self.inner.access().table.capacity()
    }

    /// 上下文切换实现
    pub fn switcher(&self) -> &S {
        &self.switch
    }

    /// 新进程使用的布局
    pub fn layout(&self) -> &ProcessLayout {
        &self.layout
    }
}
