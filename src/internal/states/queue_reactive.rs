//! # QueueReactiveProperty — 控制面命令队列
//!
//! 基于 `tokio::sync::mpsc` 的单消费者 FIFO 队列，是下载管理器「串行控制面」的载体：
//! 调用方、传输层回调、定时器都只往队列里投递命令，真正的状态迁移只在唯一的消费者里发生。
//!
//! ## 特性
//! - 严格 FIFO：同一生产者先投递的命令一定先被消费
//! - 生产者可 Clone，消费者唯一
//! - 命令无需 `Clone`，可以携带 oneshot 回执或闭包
//! - 仅库内部使用（`pub(crate)`）

use std::fmt;

use tokio::sync::mpsc;

/// 队列生产者端，可 Clone。
pub(crate) struct QueueReactiveProperty<T: Send + 'static> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Clone for QueueReactiveProperty<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for QueueReactiveProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueReactiveProperty")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// 队列消费者端，独占接收。
pub(crate) struct QueueReactiveConsumer<T: Send + 'static> {
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> QueueReactiveProperty<T>
where
    T: Send + 'static,
{
    /// 创建队列，返回 (生产者, 消费者)。
    pub(crate) fn new() -> (Self, QueueReactiveConsumer<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, QueueReactiveConsumer { receiver })
    }

    /// 投递一条命令，立即返回。
    ///
    /// 消费者已退出时原样返回 `Err(T)`。
    pub(crate) fn send(&self, value: T) -> Result<(), T> {
        self.sender.send(value).map_err(|e| e.0)
    }

    /// 消费者是否已经退出。
    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<T> QueueReactiveConsumer<T>
where
    T: Send + 'static,
{
    /// 异步接收下一条命令；所有生产者都关闭时返回 `None`。
    pub(crate) async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// 非阻塞接收，队列为空时返回 `None`。
    pub(crate) fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// 关闭接收端，之后的 `send` 都会失败；已入队的命令仍可通过 `try_recv` 取出。
    pub(crate) fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::QueueReactiveProperty;

    #[tokio::test]
    async fn keeps_fifo_order_across_producers() {
        let (a, mut consumer) = QueueReactiveProperty::new();
        let b = a.clone();
        a.send(1).unwrap();
        b.send(2).unwrap();
        a.send(3).unwrap();
        assert_eq!(consumer.recv().await, Some(1));
        assert_eq!(consumer.recv().await, Some(2));
        assert_eq!(consumer.try_recv(), Some(3));
        assert_eq!(consumer.try_recv(), None);
    }

    #[tokio::test]
    async fn send_fails_after_close() {
        let (producer, mut consumer) = QueueReactiveProperty::<u8>::new();
        consumer.close();
        assert!(producer.is_closed());
        assert_eq!(producer.send(7), Err(7));
    }
}
