//! 每个刷新周期根据已完成字节数的增量计算速度与剩余时间。

use super::DownloadTask;

/// 剩余秒数；速度为 0 时为 0，不足 1 秒但还有剩余时记为 1 秒。
pub(crate) fn time_remaining(total: u64, completed: u64, speed: u64) -> u64 {
    if speed == 0 {
        return 0;
    }
    let remaining = total.saturating_sub(completed);
    if remaining == 0 {
        return 0;
    }
    (remaining / speed).max(1)
}

impl DownloadTask {
    /// 刷新速度与剩余时间，返回本周期的速度（字节/秒）。
    pub(crate) fn update_speed_and_time_remaining(&self) -> u64 {
        self.state().write(|s| {
            let speed = s.completed_bytes.saturating_sub(s.last_tick_bytes);
            s.last_tick_bytes = s.completed_bytes;
            s.speed = speed;
            s.time_remaining = time_remaining(s.total_bytes, s.completed_bytes, speed);
            speed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::time_remaining;

    #[test]
    fn remaining_time_rounds_sub_second_up() {
        assert_eq!(time_remaining(1000, 0, 100), 10);
        assert_eq!(time_remaining(1000, 950, 100), 1);
        assert_eq!(time_remaining(1000, 1000, 100), 0);
        assert_eq!(time_remaining(1000, 10, 0), 0);
    }
}
