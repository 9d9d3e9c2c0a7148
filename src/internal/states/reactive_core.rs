//! # ReactiveProperty
//!
//! 基于 `tokio::sync::watch` 的可观察值。任务状态、管理器聚合状态都用它对外广播，
//! 调用方既可以同步读取当前值，也可以异步等待某个条件成立。
//!
//! 写入只发生在控制面上；读取和监听可以在任意线程。所有克隆共享同一个发送端，
//! 最后一个克隆销毁后监听者收到 [`ReactivePropertyError::Closed`]。

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum ReactivePropertyError {
    /// 属性的所有持有者都已销毁，不会再有新值
    #[error("reactive property closed")]
    Closed,
}

impl From<watch::error::RecvError> for ReactivePropertyError {
    fn from(_: watch::error::RecvError) -> Self {
        Self::Closed
    }
}

/// 响应式属性：`update` 写入并通知，`get_current` 读取快照，`watch` / `wait_until` 监听。
#[derive(Debug)]
pub struct ReactiveProperty<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for ReactiveProperty<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T> ReactiveProperty<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(value: T) -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(value)),
        }
    }

    /// 写入新值，即使与旧值相同也会唤醒监听者。
    pub fn update(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// 仅当新值与当前值不同才写入，返回是否发生了变化。
    pub fn update_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        self.sender.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    pub fn get_current(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn watch(&self) -> PropertyWatcher<T> {
        PropertyWatcher {
            receiver: self.sender.subscribe(),
        }
    }

    /// 挂起直到值满足 `predicate`，返回满足条件时的值。当前值已满足时立即返回。
    pub async fn wait_until<F>(&self, predicate: F) -> Result<T, ReactivePropertyError>
    where
        F: FnMut(&T) -> bool,
    {
        let mut receiver = self.sender.subscribe();
        let value = receiver.wait_for(predicate).await?;
        Ok(value.clone())
    }
}

/// 属性监听器，只关心订阅之后发生的变化。
#[derive(Debug)]
pub struct PropertyWatcher<T> {
    receiver: watch::Receiver<T>,
}

impl<T> PropertyWatcher<T>
where
    T: Clone + Send + Sync,
{
    /// 等待下一次变化，返回新值。
    pub async fn changed(&mut self) -> Result<T, ReactivePropertyError> {
        self.receiver.changed().await?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }
}
