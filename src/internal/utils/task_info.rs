//! 展示用格式化：字节数、速度、剩余时间、时间戳。

use chrono::{Local, TimeZone};

const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// 十进制（1000 进位）的文件大小，如 `1.5 MB`。
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1000 {
        return if bytes == 1 {
            "1 byte".to_string()
        } else {
            format!("{bytes} bytes")
        };
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if value >= 100.0 || unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// 下载速度，如 `1.5 MB/s`。
pub fn format_speed(bytes_per_second: u64) -> String {
    format!("{}/s", format_bytes(bytes_per_second))
}

/// 位置式时长：不足一小时为 `mm:ss`，否则为 `h:mm:ss`。
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Unix 秒时间戳转为本地时间 `yyyy-MM-dd HH:mm:ss`，非法时间戳返回空串。
pub fn format_timestamp(seconds: f64) -> String {
    let secs = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
    match Local.timestamp_opt(secs, nanos).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}
