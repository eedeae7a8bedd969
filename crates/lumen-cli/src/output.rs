//! Output formatting for CLI

use crate::simulator::Snapshot;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "field")]
    field: String,
    #[tabled(rename = "value")]
    value: String,
}

fn snapshot_rows(snapshot: &Snapshot) -> Vec<Row> {
    let mut rows: Vec<Row> = snapshot
        .texts
        .iter()
        .map(|(region, text)| Row {
            field: region.clone(),
            value: text.clone(),
        })
        .collect();
    rows.extend(snapshot.controls.iter().map(|(control, value)| Row {
        field: format!("control.{control}"),
        value: value.to_string(),
    }));
    let heights = |list: &[u32]| {
        list.iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    rows.push(Row {
        field: "levels".into(),
        value: heights(&snapshot.levels),
    });
    rows.push(Row {
        field: "enabledSelectors".into(),
        value: heights(&snapshot.enabled_selectors),
    });
    rows.push(Row {
        field: "highlighted".into(),
        value: snapshot
            .highlighted
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".into()),
    });
    rows.push(Row {
        field: "selected".into(),
        value: format!("{:?}", snapshot.selected),
    });
    rows.push(Row {
        field: "media".into(),
        value: format!(
            "time={} paused={} rate={} volume={} buffered={}",
            snapshot.media.time,
            snapshot.media.paused,
            snapshot.media.rate,
            snapshot.media.volume,
            snapshot.media.buffered_end
        ),
    });
    rows
}

/// Render a simulation result
pub fn format_snapshot(snapshot: &Snapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(snapshot),
        OutputFormat::Table => Table::new(snapshot_rows(snapshot))
            .with(Style::rounded())
            .to_string(),
        OutputFormat::Text => snapshot_rows(snapshot)
            .into_iter()
            .map(|row| format!("{:<20} {}", row.field, row.value))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render `(seconds, formatted)` pairs
pub fn format_times(times: &[(f64, String)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(
            &times
                .iter()
                .map(|(seconds, formatted)| serde_json::json!({ "seconds": seconds, "formatted": formatted }))
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Table => Table::new(times.iter().map(|(seconds, formatted)| Row {
            field: seconds.to_string(),
            value: formatted.clone(),
        }))
        .with(Style::rounded())
        .to_string(),
        OutputFormat::Text => times
            .iter()
            .map(|(_, formatted)| formatted.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}
