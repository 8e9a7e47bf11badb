//! 上下文切换的 Mock 实现
//!
//! 记录每一次切换与地址空间准备，并允许测试在“切入”某个上下文时
//! 执行一段回调，用来模拟被切入的进程运行了一段时间。

use std::cell::RefCell;
use std::vec::Vec;

/// 一次被记录的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEvent {
    /// 切换：保存到 `from`，从 `to` 恢复（均为上下文地址）
    Switch { from: usize, to: usize },
    /// 进入进程前准备根页表与 trap frame
    Prepare { root: usize, trap_frame: usize },
}

/// 切入某个上下文时调用的回调，参数为目标上下文地址
pub type SwitchHook = Box<dyn FnMut(usize)>;

/// 记录型上下文切换
#[derive(Default)]
pub struct RecordingSwitch {
    events: RefCell<Vec<SwitchEvent>>,
    hook: RefCell<Option<SwitchHook>>,
}

impl RecordingSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置回调
    pub fn set_hook(&self, hook: impl FnMut(usize) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    /// 记录一次切换，然后调用回调
    ///
    /// 回调执行期间暂时取出，因此回调内部可以再次触发切换（嵌套的切换不会再调用回调）。
    pub fn record_switch(&self, from: usize, to: usize) {
        self.events.borrow_mut().push(SwitchEvent::Switch { from, to });
        let hook = self.hook.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(to);
            let mut slot = self.hook.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }

    pub fn record_prepare(&self, root: usize, trap_frame: usize) {
        self.events
            .borrow_mut()
            .push(SwitchEvent::Prepare { root, trap_frame });
    }

    /// 全部事件
    pub fn events(&self) -> Vec<SwitchEvent> {
        self.events.borrow().clone()
    }

    /// 只看切换事件
    pub fn switches(&self) -> Vec<(usize, usize)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                SwitchEvent::Switch { from, to } => Some((from, to)),
                SwitchEvent::Prepare { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
