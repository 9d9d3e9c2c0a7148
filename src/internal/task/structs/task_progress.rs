/// 字节进度。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskProgress {
    pub completed: u64,
    /// 总大小未知时为 0
    pub total: u64,
}

impl TaskProgress {
    /// 完成比例（0.0～1.0）；总大小未知时返回 0.0。
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }
}
