//! 管理器的构建器：目录、日志、传输实现都可以替换，`build` 时从快照恢复任务。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::internal::logging::{LogOption, Logable, Logger};
use crate::internal::registry::structs::{Registry, RegistryPaths};
use crate::internal::states::queue_reactive::QueueReactiveProperty;
use crate::internal::states::synchronized_state::SynchronizedState;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;
use crate::internal::task::structs::{MainQueue, TaskStatus};
use crate::internal::transport::http::HttpTransportFactory;
use crate::internal::transport::traits::{ArtifactHook, TransportFactory};

use super::manager_core::ManagerCore;
use super::manager_state::ManagerState;
use super::session_configuration::SessionConfiguration;
use super::session_context::SessionContext;
use super::session_manager::{ManagerShared, SessionManager};

/// 事件广播的缓冲深度，订阅者落后更多时会丢失最旧的事件
const EVENT_CAPACITY: usize = 256;

pub struct SessionManagerBuilder {
    identifier: String,
    configuration: SessionConfiguration,
    root_dir: Option<PathBuf>,
    transient_dir: Option<PathBuf>,
    logger: Option<Arc<dyn Logable>>,
    log_option: LogOption,
    factory: Arc<dyn TransportFactory>,
    hook: Option<Arc<dyn ArtifactHook>>,
}

impl SessionManagerBuilder {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            configuration: SessionConfiguration::default(),
            root_dir: None,
            transient_dir: None,
            logger: None,
            log_option: LogOption::Default,
            factory: Arc::new(HttpTransportFactory),
            hook: None,
        }
    }

    pub fn with_configuration(mut self, configuration: SessionConfiguration) -> Self {
        self.configuration = configuration.clamped();
        self
    }

    /// 注册表根目录，`tmp` 与 `final` 建在它下面。
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    /// 传输层存放中间产物的目录。
    pub fn with_transient_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transient_dir = Some(dir.into());
        self
    }

    /// 自定义日志接收端；设置后 `with_log_option` 不再生效。
    pub fn with_logger(mut self, logger: Arc<dyn Logable>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_log_option(mut self, option: LogOption) -> Self {
        self.log_option = option;
        self
    }

    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_artifact_hook(mut self, hook: Arc<dyn ArtifactHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// 创建目录、恢复快照、与传输层对账，然后启动控制面。必须在 tokio 运行时内调用。
    pub async fn build(self) -> SessionManager {
        let identifier = self.identifier;
        let logger: Arc<dyn Logable> = match self.logger {
            Some(logger) => logger,
            None => Arc::new(Logger::new(identifier.clone(), self.log_option)),
        };

        let paths = match self.root_dir {
            Some(root) => RegistryPaths::with_root(&identifier, root),
            None => RegistryPaths::for_identifier(&identifier),
        };
        let paths = match self.transient_dir {
            Some(dir) => paths.transient(dir),
            None => paths,
        };
        let registry = Arc::new(Registry::new(&identifier, paths, Arc::clone(&logger)));

        let (queue, consumer) = QueueReactiveProperty::new();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let context = Arc::new(SessionContext {
            identifier,
            queue,
            main: MainQueue::spawn(),
            logger,
            registry,
            events,
        });

        let state = SynchronizedState::new(ManagerState::new(self.configuration));
        let status = UnlockReactiveProperty::new(TaskStatus::Waiting);
        let shared = Arc::new(ManagerShared {
            context: Arc::clone(&context),
            state: state.clone(),
            status: status.clone(),
        });

        let mut core = ManagerCore::new(
            context,
            state,
            status,
            Arc::downgrade(&shared),
            self.factory,
            self.hook,
        );
        core.restore().await;
        tokio::spawn(core.run(consumer));

        SessionManager { shared }
    }
}
