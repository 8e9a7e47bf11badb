//! 地址运算 Trait

use crate::config::PAGE_SIZE;

/// 在类型与 `usize` 之间互相转换
pub trait UsizeConvert: Copy {
    /// 取出原始数值
    fn as_usize(&self) -> usize;
    /// 由原始数值构造
    fn from_usize(value: usize) -> Self;
}

/// 页对齐操作
pub trait AlignOps: UsizeConvert {
    /// 是否按页对齐
    fn is_page_aligned(&self) -> bool {
        self.as_usize() % PAGE_SIZE == 0
    }

    /// 页内偏移
    fn page_offset(&self) -> usize {
        self.as_usize() % PAGE_SIZE
    }

    /// 向下对齐到页边界
    fn align_down_to_page(self) -> Self {
        Self::from_usize(self.as_usize() & !(PAGE_SIZE - 1))
    }

    /// 向上对齐到页边界
    fn align_up_to_page(self) -> Self {
        Self::from_usize(self.as_usize().next_multiple_of(PAGE_SIZE))
    }
}

/// 为地址类型实现 `UsizeConvert`、`AlignOps`、加减偏移与十六进制格式化
#[macro_export]
macro_rules! impl_address {
    ($type:ty) => {
        impl $crate::address::operations::UsizeConvert for $type {
            fn as_usize(&self) -> usize {
                self.0
            }

            fn from_usize(value: usize) -> Self {
                Self(value)
            }
        }

        impl $crate::address::operations::AlignOps for $type {}

        impl core::ops::Add<usize> for $type {
            type Output = Self;

            fn add(self, rhs: usize) -> Self {
                Self(self.0 + rhs)
            }
        }

        impl core::ops::Sub<usize> for $type {
            type Output = Self;

            fn sub(self, rhs: usize) -> Self {
                Self(self.0 - rhs)
            }
        }

        impl core::fmt::LowerHex for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::LowerHex::fmt(&self.0, f)
            }
        }
    };
}
