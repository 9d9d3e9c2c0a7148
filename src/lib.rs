/// 内部导出的模块
mod internal;

#[cfg(test)]
mod tests;

/// 导出核心入口：管理器、任务与配置
pub use internal::manager::structs::session_configuration::{
    DEFAULT_TIMEOUT, MAX_CONCURRENT_TASKS_LIMIT, PERSIST_DEBOUNCE, REFRESH_INTERVAL,
};
pub use internal::manager::structs::{
    SessionConfiguration, SessionEvent, SessionManager, SessionManagerBuilder,
};
pub use internal::task::structs::{
    DownloadTask, ExecuteOn, TaskProgress, TaskStatus, Validation, VerificationType,
};

/// 任务注册表（磁盘缓存），可以脱离管理器单独查询已完成的文件
pub mod registry {
    use crate::internal;
    pub use internal::registry::structs::{Registry, RegistryPaths, TaskRecord};
}

/// 传输层契约与默认的 HTTP 实现，需要自定义传输时实现这里的 trait
pub mod transport {
    use crate::internal;
    pub use internal::transport::structs::{
        Continuation, EventSink, FailureKind, Headers, LiveTransfer, TransferFailure,
        TransferHandle, TransferRequest, TransportEvent,
    };
    pub use internal::transport::traits::{
        ArtifactHook, ArtifactHookAdapter, Transport, TransportContext, TransportFactory,
    };

    pub mod http {
        use crate::internal;
        pub use internal::transport::http::{HttpTransport, HttpTransportFactory, ResumeToken};
    }
}

pub mod errors {
    use crate::internal;
    pub use internal::errors::*;
}

pub mod logging {
    use crate::internal;
    pub use internal::logging::*;
}

pub mod verification {
    use crate::internal;
    pub use internal::task::structs::verification::{digest, validate_file};
}

pub mod utils {
    use crate::internal;
    pub use internal::utils::file_type::FileType;
    pub use internal::utils::task_info::*;
    pub use internal::utils::url_convertible::{UrlConvertible, default_file_name};
}

pub mod states {
    pub mod synchronized_state {
        use crate::internal;
        pub use internal::states::synchronized_state::*;
    }

    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }

    pub mod debouncer {
        use crate::internal;
        pub use internal::states::debouncer::*;
    }
}
