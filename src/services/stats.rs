//! Per-timer-type usage statistics reported by the session backend

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerTypeInfo {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerTypeStats {
    pub timer_type: TimerTypeInfo,
    pub usage_count: u64,
    pub completed_count: u64,
    /// Seconds across completed sessions
    pub total_duration: u64,
    #[serde(default)]
    pub avg_duration: u64,
}

impl TimerTypeStats {
    /// Completed sessions as a rounded percentage of all sessions
    pub fn completion_rate(&self) -> u64 {
        percentage(self.completed_count, self.usage_count)
    }
}

/// Totals across every timer type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_sessions: u64,
    pub total_completed: u64,
    pub total_duration: u64,
    pub completion_rate: u64,
}

impl StatsSummary {
    pub fn from_stats(stats: &[TimerTypeStats]) -> Self {
        let total_sessions = stats.iter().map(|s| s.usage_count).sum();
        let total_completed = stats.iter().map(|s| s.completed_count).sum();
        let total_duration = stats.iter().map(|s| s.total_duration).sum();

        Self {
            total_sessions,
            total_completed,
            total_duration,
            completion_rate: percentage(total_completed, total_sessions),
        }
    }
}

/// Names of the timer types whose counters changed between two reports
pub fn changed_types(previous: &[TimerTypeStats], current: &[TimerTypeStats]) -> Vec<String> {
    current
        .iter()
        .filter(|stat| {
            previous
                .iter()
                .find(|p| p.timer_type.id == stat.timer_type.id)
                .map(|p| {
                    p.usage_count != stat.usage_count
                        || p.completed_count != stat.completed_count
                        || p.total_duration != stat.total_duration
                })
                .unwrap_or(false)
        })
        .map(|stat| stat.timer_type.name.clone())
        .collect()
}

fn percentage(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u64
}
