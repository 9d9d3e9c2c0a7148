//! 单个 HTTP 传输的执行体：发请求、流式落盘、响应取消，结束时投递 `Completed`。

use std::path::PathBuf;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_RANGE, LAST_MODIFIED, RANGE};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use url::Url;

use crate::internal::transport::structs::{
    Continuation, EventSink, FailureKind, TransferFailure, TransferHandle, TransferRequest,
    TransportEvent,
};

use super::http_transport::LiveTable;
use super::resume_token::ResumeToken;

/// 取消原因
#[derive(Debug, Clone, Copy)]
pub(super) enum CancelReason {
    Caller { produce_continuation: bool },
    Invalidated,
}

pub(super) struct TransferWorker {
    pub(super) client: reqwest::Client,
    pub(super) events: EventSink,
    pub(super) transient_dir: PathBuf,
    pub(super) live: LiveTable,
    pub(super) handle: TransferHandle,
    pub(super) request: TransferRequest,
}

/// 传输过程中累积的进度，结束时用来生成事件和续传令牌。
struct Progress {
    current_url: Url,
    artifact: String,
    path: PathBuf,
    offset: u64,
    total: u64,
    validator: Option<String>,
    status_code: Option<u16>,
}

impl Progress {
    fn token(&self, origin: &Url) -> Continuation {
        let token = ResumeToken {
            url: origin.to_string(),
            artifact: self.artifact.clone(),
            offset: self.offset,
            total: self.total,
            validator: self.validator.clone(),
        };
        Continuation {
            token: token.encode(),
            artifact_name: Some(self.artifact.clone()),
        }
    }
}

enum Outcome {
    Finished,
    Rejected,
    Cancelled(CancelReason),
    Failed(String),
}

impl TransferWorker {
    pub(super) async fn run(self, mut cancel_rx: oneshot::Receiver<CancelReason>) {
        let resume = self
            .request
            .continuation
            .as_deref()
            .and_then(|data| ResumeToken::decode(data).ok());

        let artifact = match &resume {
            Some(token) => token.artifact.clone(),
            None => format!("transfer-{}-{}.tmp", std::process::id(), self.handle.0),
        };
        let mut progress = Progress {
            current_url: self.request.url.clone(),
            path: self.transient_dir.join(&artifact),
            artifact,
            offset: resume.as_ref().map(|t| t.offset).unwrap_or(0),
            total: resume.as_ref().map(|t| t.total).unwrap_or(0),
            validator: resume.as_ref().and_then(|t| t.validator.clone()),
            status_code: None,
        };

        let outcome = self.transfer(&mut progress, &mut cancel_rx).await;

        // 先注销再投递，`Completed` 之后 list_live_handles 不应再看到它
        self.live.lock().remove(&self.handle);
        self.finish(progress, outcome).await;
    }

    async fn transfer(
        &self,
        progress: &mut Progress,
        cancel_rx: &mut oneshot::Receiver<CancelReason>,
    ) -> Outcome {
        if let Err(e) = tokio::fs::create_dir_all(&self.transient_dir).await {
            return Outcome::Failed(e.to_string());
        }

        let mut builder = self.client.get(self.request.url.clone());
        if let Some(headers) = &self.request.headers {
            for (k, v) in headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
        }
        if progress.offset > 0 {
            builder = builder.header(RANGE, format!("bytes={}-", progress.offset));
            if let Some(validator) = &progress.validator {
                builder = builder.header(IF_RANGE, validator.as_str());
            }
        }

        let response = tokio::select! {
            biased;
            reason = &mut *cancel_rx => return Outcome::Cancelled(reason.unwrap_or(CancelReason::Invalidated)),
            result = builder.send() => match result {
                Ok(r) => r,
                Err(e) => return Outcome::Failed(e.to_string()),
            },
        };

        let status = response.status();
        progress.status_code = Some(status.as_u16());
        if response.url() != &self.request.url {
            let current = response.url().clone();
            self.events.emit(TransportEvent::Redirected {
                handle: self.handle,
                previous_url: progress.current_url.clone(),
                current_url: current.clone(),
            });
            progress.current_url = current;
        }
        if !status.is_success() {
            return Outcome::Rejected;
        }

        progress.validator = response
            .headers()
            .get(ETAG)
            .or_else(|| response.headers().get(LAST_MODIFIED))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or(progress.validator.take());

        // 服务器忽略了 Range（返回 200）时从头开始
        let append = progress.offset > 0 && status == StatusCode::PARTIAL_CONTENT;
        if !append {
            progress.offset = 0;
        }
        progress.total = response
            .content_length()
            .map(|len| len + progress.offset)
            .unwrap_or(0);

        let file = if append {
            OpenOptions::new().append(true).open(&progress.path).await
        } else {
            File::create(&progress.path).await
        };
        let mut file = match file {
            Ok(f) => f,
            Err(e) => return Outcome::Failed(e.to_string()),
        };

        let mut stream = response.bytes_stream();
        loop {
            tokio::select! {
                biased;

                reason = &mut *cancel_rx => {
                    let _ = file.flush().await;
                    return Outcome::Cancelled(reason.unwrap_or(CancelReason::Invalidated));
                }

                chunk = stream.next() => match chunk {
                    Some(Ok(bytes)) => {
                        if let Err(e) = file.write_all(&bytes).await {
                            return Outcome::Failed(e.to_string());
                        }
                        let len = bytes.len() as u64;
                        progress.offset += len;
                        self.events.emit(TransportEvent::Progress {
                            handle: self.handle,
                            current_url: progress.current_url.clone(),
                            bytes_written: len,
                            total_written: progress.offset,
                            total_expected: progress.total,
                        });
                    }
                    Some(Err(e)) => {
                        let _ = file.flush().await;
                        return Outcome::Failed(e.to_string());
                    }
                    None => break,
                },
            }
        }

        match file.flush().await {
            Ok(()) => Outcome::Finished,
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    async fn finish(&self, progress: Progress, outcome: Outcome) {
        let origin = &self.request.url;
        let error = match outcome {
            Outcome::Finished => {
                self.events.emit(TransportEvent::FinishedToLocation {
                    handle: self.handle,
                    current_url: progress.current_url.clone(),
                    status_code: progress.status_code,
                    location: progress.path.clone(),
                });
                None
            }
            Outcome::Rejected => None,
            Outcome::Cancelled(CancelReason::Caller {
                produce_continuation: false,
            }) => {
                let _ = tokio::fs::remove_file(&progress.path).await;
                Some(TransferFailure {
                    kind: FailureKind::Cancelled,
                    message: "cancelled".into(),
                    continuation: None,
                })
            }
            Outcome::Cancelled(CancelReason::Caller { .. }) => Some(TransferFailure {
                kind: FailureKind::Cancelled,
                message: "cancelled".into(),
                continuation: Some(progress.token(origin)),
            }),
            Outcome::Cancelled(CancelReason::Invalidated) => Some(TransferFailure {
                kind: FailureKind::SessionInvalidated,
                message: "session invalidated".into(),
                continuation: Some(progress.token(origin)),
            }),
            Outcome::Failed(message) => Some(TransferFailure {
                kind: FailureKind::Network,
                message,
                continuation: (progress.offset > 0).then(|| progress.token(origin)),
            }),
        };

        self.events.emit(TransportEvent::Completed {
            handle: self.handle,
            current_url: progress.current_url,
            status_code: progress.status_code,
            bytes_received: progress.offset,
            bytes_expected: progress.total.max(progress.offset),
            error,
        });
    }
}
