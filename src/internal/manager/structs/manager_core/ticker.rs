//! 刷新定时器：运行期间每个周期统计一次速度和剩余时间。

use tokio::time::{MissedTickBehavior, interval};

use crate::internal::manager::structs::control_command::ControlCommand;
use crate::internal::manager::structs::session_configuration::REFRESH_INTERVAL;
use crate::internal::task::structs::TaskStatus;
use crate::internal::task::structs::download_task::speed;

use super::ManagerCore;
use super::aggregate::aggregate_progress;

impl ManagerCore {
    pub(crate) fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let queue = self.context.queue.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval(REFRESH_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if queue.send(ControlCommand::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    pub(crate) fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    pub(crate) fn tick(&mut self) {
        if self.status() != TaskStatus::Running {
            return;
        }
        let running = self.state.read(|s| s.running.clone());
        let speed: u64 = running
            .iter()
            .map(|task| task.update_speed_and_time_remaining())
            .sum();
        let progress = aggregate_progress(&self.tasks());
        let time_remaining = speed::time_remaining(progress.total, progress.completed, speed);
        self.state.write(|s| {
            s.speed = speed;
            s.time_remaining = time_remaining;
        });
        self.execute_progress();
    }
}
