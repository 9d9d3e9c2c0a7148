//! # SynchronizedState — 闭包式互斥访问容器
//!
//! 用一把短临界区的互斥锁保护一份私有状态，只暴露 `read` / `write` 两个闭包入口，
//! 不直接把内部结构体借给外部。
//!
//! ## 约束
//! - 闭包内**不能**再访问同一个容器（`parking_lot::Mutex` 不可重入，会死锁）。
//! - 闭包内不要执行回调或做 I/O，锁只用来读写字段。
//! - 闭包 panic 时锁会随栈展开释放，错误原样传回调用方。

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// 多线程共享的状态容器，`Clone` 只复制句柄。
pub struct SynchronizedState<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SynchronizedState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SynchronizedState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// 在持锁期间以只读方式访问状态，返回闭包的结果。
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// 在持锁期间修改状态，返回闭包的结果。
    pub fn write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// 取一份完整快照。
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.read(|v| v.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for SynchronizedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f.debug_tuple("SynchronizedState").field(&*guard).finish(),
            None => f.write_str("SynchronizedState(<locked>)"),
        }
    }
}
