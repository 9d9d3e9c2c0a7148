//! 创建任务、调整顺序、修改配置，以及控制面的屏障与关闭。

use std::cmp::Ordering;

use tokio::sync::oneshot;

use crate::internal::errors::DownloadError;
use crate::internal::manager::structs::control_command::{ControlCommand, DownloadItem};
use crate::internal::manager::structs::session_configuration::SessionConfiguration;
use crate::internal::task::structs::DownloadTask;
use crate::internal::transport::structs::Headers;
use crate::internal::utils::url_convertible::UrlConvertible;

use super::SessionManager;

impl SessionManager {
    /// 创建（或取回同一 URL 的已有）任务并尝试启动。
    ///
    /// 只有地址无法解析时返回错误；任务已存在时用新的请求头与文件名更新它。
    pub async fn download(
        &self,
        url: impl UrlConvertible,
        headers: Option<Headers>,
        file_name: Option<String>,
    ) -> Result<DownloadTask, DownloadError> {
        const MESSAGE: &str = "create download task failed";
        let url = url.as_url().map_err(|e| self.report(MESSAGE, e))?;
        let item = DownloadItem {
            url,
            headers,
            file_name,
        };
        self.request(MESSAGE, |reply| ControlCommand::Download { item, reply })
            .await
    }

    /// 批量创建任务。
    ///
    /// `headers` / `file_names` 非空时长度必须与 `urls` 一致，空数组等同于没有给出；
    /// 无法解析的地址和重复的地址记日志后跳过。
    pub async fn multi_download<U>(
        &self,
        urls: Vec<U>,
        headers: Option<Vec<Headers>>,
        file_names: Option<Vec<String>>,
    ) -> Result<Vec<DownloadTask>, DownloadError>
    where
        U: UrlConvertible,
    {
        const MESSAGE: &str = "create multiple download tasks failed";
        let mismatched = |len: usize| len != 0 && len != urls.len();
        if headers.as_ref().is_some_and(|h| mismatched(h.len())) {
            return Err(self.report(MESSAGE, DownloadError::HeadersMatchFailed));
        }
        if file_names.as_ref().is_some_and(|n| mismatched(n.len())) {
            return Err(self.report(MESSAGE, DownloadError::FileNamesMatchFailed));
        }

        let mut headers = headers.map(Vec::into_iter);
        let mut file_names = file_names.map(Vec::into_iter);
        let mut items = Vec::with_capacity(urls.len());
        for url in urls {
            let item_headers = headers.as_mut().and_then(Iterator::next);
            let file_name = file_names.as_mut().and_then(Iterator::next);
            let Some(url) = self.parse_url(MESSAGE, url) else {
                continue;
            };
            items.push(DownloadItem {
                url,
                headers: item_headers,
                file_name,
            });
        }
        self.request(MESSAGE, |reply| ControlCommand::MultiDownload { items, reply })
            .await
    }

    /// 把 `from` 位置的任务移动到 `to`。
    pub async fn move_task(&self, from: usize, to: usize) -> Result<(), DownloadError> {
        self.request("move task failed", |reply| ControlCommand::MoveTask {
            from,
            to,
            reply,
        })
        .await?
    }

    /// 按比较函数对任务列表重新排序，排序结果会写入快照。
    pub async fn sort_by<F>(&self, comparator: F) -> Result<(), DownloadError>
    where
        F: FnMut(&DownloadTask, &DownloadTask) -> Ordering + Send + 'static,
    {
        self.request("sort tasks failed", |reply| ControlCommand::Sort {
            comparator: Box::new(comparator),
            reply,
        })
        .await
    }

    /// 替换会话配置。新配置在会话重建后生效；上一次重建还没完成时忽略。
    pub fn set_configuration(&self, configuration: SessionConfiguration) {
        self.post(
            "set configuration failed",
            ControlCommand::SetConfiguration(configuration),
        );
    }

    /// 等待此前投递的所有命令处理完毕。
    pub async fn flush(&self) -> Result<(), DownloadError> {
        self.request("flush failed", ControlCommand::Flush).await
    }

    /// 写入快照、作废传输会话并停止控制面。之后的操作都会返回 `ManagerClosed`。
    pub async fn close(&self) {
        let (reply, receiver) = oneshot::channel();
        if self.context().post(ControlCommand::Shutdown(Some(reply))) {
            let _ = receiver.await;
        }
    }
}
