//! 观察者回调的封装：回调本体 + 执行位置。

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

/// 回调在哪里执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteOn {
    /// 管理器的串行回调队列（宿主应用的"主线程"语义），按触发顺序依次执行
    #[default]
    Main,
    /// 直接在触发它的控制面上执行。回调里不能等待管理器的同步接口，否则会死锁
    Current,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// 串行回调队列：一个后台任务按 FIFO 顺序执行投递进来的闭包。
#[derive(Clone)]
pub struct MainQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl MainQueue {
    /// 创建队列并启动消费任务，必须在 tokio 运行时内调用。
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                job();
            }
        });
        Self { sender }
    }

    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Box::new(job)).is_err() {
            tracing::debug!("main queue closed, callback dropped");
        }
    }
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MainQueue")
    }
}

/// 一个已注册的回调。
pub struct Executer<T> {
    execute_on: ExecuteOn,
    handler: Arc<dyn Fn(&T) + Send + Sync + 'static>,
}

impl<T> Clone for Executer<T> {
    fn clone(&self) -> Self {
        Self {
            execute_on: self.execute_on,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> fmt::Debug for Executer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executer")
            .field("execute_on", &self.execute_on)
            .finish()
    }
}

impl<T> Executer<T>
where
    T: Clone + Send + 'static,
{
    pub fn new<F>(execute_on: ExecuteOn, handler: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            execute_on,
            handler: Arc::new(handler),
        }
    }

    pub fn execute(&self, subject: &T, main: &MainQueue) {
        match self.execute_on {
            ExecuteOn::Current => (self.handler)(subject),
            ExecuteOn::Main => {
                let handler = Arc::clone(&self.handler);
                let subject = subject.clone();
                main.dispatch(move || handler(&subject));
            }
        }
    }
}
