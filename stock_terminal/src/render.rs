//! Plain-text rendering of a dashboard `Frame`.
use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use stock_common::quote::Quote;
use stock_common::snapshot::RefreshStatus;
use stock_common::view::{SortDirective, SortKey};
use strum::IntoEnumIterator;

use crate::dashboard::Frame;

const TITLE: &str = "STOCK.TERMINAL";
const ERROR_BANNER: &str = "! Failed to fetch stock data. Please try again.";
const LOADING: &str = "LOADING MARKET DATA...";
const NO_RESULTS: &str = "NO STOCKS FOUND";
const HELP: &str = "/text search  s <column> sort  r refresh  q quit";

const SYMBOL_WIDTH: usize = 10;
const NUMBER_WIDTH: usize = 14;

/// Render `frame` as the text of one screen.
pub fn render(frame: &Frame, interval: Duration) -> String {
    let mut out = String::new();
    let in_flight = frame.status.is_in_flight();

    let _ = write!(out, "{TITLE}    LAST UPDATE: {}", clock(frame.last_update));
    if in_flight {
        out.push_str("  [refreshing]");
    }
    out.push('\n');
    if !frame.view.search.is_empty() {
        let _ = writeln!(out, "SEARCH: {}", frame.view.search);
    }
    if let RefreshStatus::Failed(_) = frame.status {
        let _ = writeln!(out, "{ERROR_BANNER}");
    }
    out.push('\n');

    if in_flight && frame.total == 0 {
        let _ = writeln!(out, "{LOADING}");
    } else {
        let _ = writeln!(out, "{}", header(&frame.view.sort));
        if frame.rows.is_empty() {
            let _ = writeln!(out, "{NO_RESULTS}");
        }
        for quote in &frame.rows {
            let _ = writeln!(out, "{}", row(quote));
        }
    }

    let _ = writeln!(
        out,
        "\nData provided by Finnhub API • Updated every {} seconds",
        interval.as_secs()
    );
    let _ = write!(out, "{HELP}");
    out
}

fn clock(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

fn label(key: SortKey) -> &'static str {
    match key {
        SortKey::Symbol => "SYMBOL",
        SortKey::Price => "PRICE",
        SortKey::Change => "CHANGE",
        SortKey::PercentChange => "% CHANGE",
    }
}

fn header(sort: &SortDirective) -> String {
    let mut line = String::new();
    for key in SortKey::iter() {
        let mut title = label(key).to_string();
        if sort.key == Some(key) {
            title.push(' ');
            title.push_str(sort.direction.arrow());
        }
        match key {
            SortKey::Symbol => {
                let _ = write!(line, "{title:<SYMBOL_WIDTH$}");
            }
            _ => {
                let _ = write!(line, "{title:>NUMBER_WIDTH$}");
            }
        }
    }
    line.push_str("  DAY RANGE");
    line
}

fn row(quote: &Quote) -> String {
    let trend = if quote.is_gaining() { "▲" } else { "▼" };
    format!(
        "{:<SYMBOL_WIDTH$}{:>NUMBER_WIDTH$}{:>NUMBER_WIDTH$}{:>NUMBER_WIDTH$}  {} — {}",
        quote.symbol().as_str(),
        usd(quote.price),
        format!("{trend} {:+.2}", quote.change),
        format!("{:+.2}%", quote.percent_change),
        usd(quote.low),
        usd(quote.high),
    )
}

/// `1234.5` -> `$1,234.50`.
pub fn usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
