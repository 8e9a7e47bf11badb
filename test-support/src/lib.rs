//! 测试支持 crate
//!
//! 提供子系统单元测试共用的 Mock 实现。
//!
//! 这里不依赖任何内核 crate（避免 dev-dependency 造成同一 crate 的两份实例），
//! 各 crate 在 `cfg(test)` 下用薄包装把 mock 接到自己的 trait 上。

pub mod mock;

