//! 传输层事件的分发：按 URL（经过重定向映射）找到任务，再核对传输句柄。

use url::Url;

use crate::internal::errors::DownloadError;
use crate::internal::logging::LogType;
use crate::internal::task::structs::DownloadTask;
use crate::internal::transport::structs::{TransferHandle, TransportEvent};

use super::ManagerCore;

impl ManagerCore {
    pub(crate) fn handle_transport_event(&mut self, session: u64, event: TransportEvent) {
        if session != self.session_id {
            tracing::debug!(session, current = self.session_id, "event from a retired session ignored");
            return;
        }
        match event {
            TransportEvent::Progress {
                handle,
                current_url,
                total_written,
                total_expected,
                ..
            } => {
                if let Some(task) = self.resolve(handle, &current_url) {
                    task.did_write_data(self, total_written, total_expected);
                }
            }
            TransportEvent::Redirected {
                handle,
                previous_url,
                current_url,
            } => {
                if let Some(task) = self.resolve(handle, &previous_url) {
                    task.did_redirect(self, current_url);
                }
            }
            TransportEvent::FinishedToLocation {
                handle,
                current_url,
                status_code,
                location,
            } => {
                if let Some(task) = self.resolve(handle, &current_url) {
                    task.did_finish_downloading(self, status_code, &location);
                }
            }
            TransportEvent::Completed {
                handle,
                current_url,
                status_code,
                bytes_received,
                bytes_expected,
                error,
            } => {
                if let Some(task) = self.resolve(handle, &current_url) {
                    task.did_complete_network(self, status_code, bytes_received, bytes_expected, error);
                }
            }
            TransportEvent::Invalidated => self.did_become_invalidated(session),
            TransportEvent::BackgroundEventsFinished => self.did_finish_background_events(),
        }
    }

    /// 找到事件对应的任务。句柄与任务当前的传输不符时视为过期事件。
    fn resolve(&self, handle: TransferHandle, url: &Url) -> Option<DownloadTask> {
        let by_url = self.state.read(|s| s.lookup(url.as_str()));
        if let Some(task) = &by_url {
            if task.transfer() == Some(handle) {
                return by_url;
            }
        }
        let by_handle = self.state.read(|s| {
            s.tasks
                .iter()
                .find(|t| t.transfer() == Some(handle))
                .cloned()
        });
        if by_handle.is_some() {
            return by_handle;
        }
        if by_url.is_none() {
            self.context.log(LogType::error(
                "can't handle transport event",
                DownloadError::FetchDownloadTaskFailed {
                    url: url.to_string(),
                },
            ));
        } else {
            tracing::debug!(url = %url, handle = handle.0, "stale transfer event ignored");
        }
        None
    }
}
