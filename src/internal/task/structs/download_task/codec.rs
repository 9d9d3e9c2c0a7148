//! 任务与快照记录之间的转换。

use std::sync::Arc;

use crate::internal::manager::structs::session_context::SessionContext;
use crate::internal::registry::structs::task_record::TaskRecord;
use crate::internal::task::structs::task_state::TaskState;
use crate::internal::utils::url_convertible::default_file_name;

use super::DownloadTask;

impl DownloadTask {
    pub(crate) fn to_record(&self) -> TaskRecord {
        let url = self.url().clone();
        self.state().read(|s| TaskRecord {
            url,
            current_url: Some(s.current_url.clone()),
            file_name: s.file_name.clone(),
            headers: s.headers.clone(),
            start_date: s.start_date,
            end_date: s.end_date,
            total_bytes: s.total_bytes,
            completed_bytes: s.completed_bytes,
            verification_code: s.verification_code.clone(),
            verification_type: s.verification_type,
            status: s.status,
            validation: s.validation,
            error: s.error.clone(),
            resume_data: s.continuation.clone(),
            tmp_file_name: s.tmp_file_name.clone(),
            response_status: s.response_status,
        })
    }

    pub(crate) fn from_record(record: TaskRecord, context: &Arc<SessionContext>) -> Self {
        let file_name = if record.file_name.is_empty() {
            default_file_name(&record.url)
        } else {
            record.file_name
        };
        let mut state = TaskState::new(&record.url, file_name, record.headers);
        if let Some(current) = record.current_url {
            state.current_url = current;
        }
        state.status = record.status;
        state.validation = record.validation;
        state.verification_code = record.verification_code;
        state.verification_type = record.verification_type;
        state.continuation = record.resume_data;
        state.tmp_file_name = record.tmp_file_name;
        state.start_date = record.start_date;
        state.end_date = record.end_date;
        state.completed_bytes = record.completed_bytes;
        state.total_bytes = record.total_bytes;
        state.last_tick_bytes = record.completed_bytes;
        state.error = record.error;
        state.response_status = record.response_status;
        Self::with_state(record.url, state, context)
    }
}
