//! Order statistics for the dashboard tiles

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsWindow {
    Today,
    Week,
    Month,
    Year,
}

impl StatsWindow {
    pub const ALL: [StatsWindow; 4] = [
        StatsWindow::Today,
        StatsWindow::Week,
        StatsWindow::Month,
        StatsWindow::Year,
    ];

    /// Rolling window length ending at "now"
    pub fn duration(&self) -> Duration {
        match self {
            StatsWindow::Today => Duration::hours(24),
            StatsWindow::Week => Duration::hours(7 * 24),
            StatsWindow::Month => Duration::hours(30 * 24),
            StatsWindow::Year => Duration::hours(365 * 24),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub window: StatsWindow,
    pub orders: usize,
    /// Major currency units
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub windows: Vec<WindowStats>,
}

impl OrderStats {
    pub fn window(&self, window: StatsWindow) -> Option<&WindowStats> {
        self.windows.iter().find(|w| w.window == window)
    }
}

/// Paid-order counts and revenue for each window ending at `now`
pub fn order_stats(orders: &[Order], now: DateTime<Utc>) -> OrderStats {
    let windows = StatsWindow::ALL
        .iter()
        .map(|&window| {
            let since = now - window.duration();
            let paid: Vec<&Order> = orders
                .iter()
                .filter(|o| o.paid && o.created_at > since && o.created_at <= now)
                .collect();
            WindowStats {
                window,
                orders: paid.len(),
                revenue: paid.iter().map(|o| o.total()).sum(),
            }
        })
        .collect();
    OrderStats { windows }
}
