use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

use crate::internal::errors::TransportError;
use crate::internal::transport::structs::{
    EventSink, LiveTransfer, TransferHandle, TransferRequest, TransportEvent,
};
use crate::internal::transport::traits::{Transport, TransportContext, TransportFactory};

use super::transfer_worker::{CancelReason, TransferWorker};

/// 默认的传输工厂，每次创建一个独立的 `reqwest::Client`。
#[derive(Debug, Clone, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn create_transport(
        &self,
        context: TransportContext,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(HttpTransport::new(context)?))
    }
}

pub(super) struct LiveEntry {
    pub(super) current_url: Url,
    cancel: Option<oneshot::Sender<CancelReason>>,
    worker: Option<JoinHandle<()>>,
}

pub(super) type LiveTable = Arc<Mutex<HashMap<TransferHandle, LiveEntry>>>;

pub struct HttpTransport {
    client: reqwest::Client,
    events: EventSink,
    transient_dir: PathBuf,
    live: LiveTable,
    invalidated: AtomicBool,
}

impl HttpTransport {
    pub fn new(context: TransportContext) -> Result<Self, TransportError> {
        let configuration = context.configuration;
        // 蜂窝 / 受限网络策略在桌面平台上没有对应开关，只记录
        tracing::debug!(
            allows_cellular = configuration.allows_cellular_access,
            allows_constrained = configuration.allows_constrained_network_access,
            allows_expensive = configuration.allows_expensive_network_access,
            "creating http transport"
        );
        let client = reqwest::Client::builder()
            .connect_timeout(configuration.timeout)
            .read_timeout(configuration.timeout)
            .gzip(false)
            .build()?;
        Ok(Self {
            client,
            events: context.events,
            transient_dir: context.transient_dir,
            live: Arc::new(Mutex::new(HashMap::new())),
            invalidated: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn start_transfer(&self, request: TransferRequest) -> Result<TransferHandle, TransportError> {
        if self.invalidated.load(Ordering::SeqCst) {
            return Err(TransportError::Invalidated);
        }
        let handle = TransferHandle::next();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        // 先登记再启动，保证 worker 结束时一定能找到自己的条目
        self.live.lock().insert(
            handle,
            LiveEntry {
                current_url: request.url.clone(),
                cancel: Some(cancel_tx),
                worker: None,
            },
        );

        let worker = TransferWorker {
            client: self.client.clone(),
            events: self.events.clone(),
            transient_dir: self.transient_dir.clone(),
            live: Arc::clone(&self.live),
            handle,
            request,
        };
        let join = tokio::spawn(worker.run(cancel_rx));
        if let Some(entry) = self.live.lock().get_mut(&handle) {
            entry.worker = Some(join);
        }
        Ok(handle)
    }

    fn cancel(&self, handle: TransferHandle, produce_continuation: bool) {
        let sender = self
            .live
            .lock()
            .get_mut(&handle)
            .and_then(|entry| entry.cancel.take());
        if let Some(sender) = sender {
            let _ = sender.send(CancelReason::Caller {
                produce_continuation,
            });
        }
    }

    async fn list_live_handles(&self) -> Vec<LiveTransfer> {
        self.live
            .lock()
            .iter()
            .map(|(handle, entry)| LiveTransfer {
                handle: *handle,
                current_url: entry.current_url.clone(),
            })
            .collect()
    }

    fn invalidate(&self) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        let workers: Vec<JoinHandle<()>> = {
            let mut live = self.live.lock();
            live.values_mut()
                .filter_map(|entry| {
                    if let Some(sender) = entry.cancel.take() {
                        let _ = sender.send(CancelReason::Invalidated);
                    }
                    entry.worker.take()
                })
                .collect()
        };
        let events = self.events.clone();
        tokio::spawn(async move {
            for worker in workers {
                let _ = worker.await;
            }
            events.emit(TransportEvent::Invalidated);
        });
    }
}
