// src/report.rs
// =============================================================================
// Collects the outcome of every request and prints it once the run is over.
//
// ReportObserver is the CLI's Observer: the warmer calls it from many tasks
// at once, so the records sit behind a Mutex.
// =============================================================================

use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use cache_warmer::{FailureKind, Observer, RequestFailure, WarmResponse};
use serde::Serialize;

// Outcome of one request, as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WarmStatus {
    /// A response came back; `status` is its HTTP status code
    Fulfilled { status: u16 },
    /// No response at all
    Rejected { kind: FailureKind },
}

#[derive(Debug, Clone, Serialize)]
pub struct WarmRecord {
    pub url: String,
    #[serde(flatten)]
    pub status: WarmStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WarmRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, WarmStatus::Fulfilled { .. })
    }
}

#[derive(Debug, Default)]
pub struct ReportObserver {
    records: Mutex<Vec<WarmRecord>>,
}

impl ReportObserver {
    /// Takes the records gathered so far, in completion order.
    pub fn take(&self) -> Vec<WarmRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, record: WarmRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl Observer for ReportObserver {
    fn on_fulfilled(&self, response: WarmResponse, url: &str) {
        let message = if response.final_url.trim_end_matches('/') != url {
            Some(format!("-> {}", response.final_url))
        } else {
            None
        };

        self.push(WarmRecord {
            url: url.to_string(),
            status: WarmStatus::Fulfilled {
                status: response.status.as_u16(),
            },
            message,
        });
    }

    fn on_rejected(&self, error: RequestFailure, url: &str) {
        self.push(WarmRecord {
            url: url.to_string(),
            status: WarmStatus::Rejected { kind: error.kind },
            message: Some(error.message),
        });
    }
}

// Prints the results either as a table or JSON
pub fn print_results(records: &[WarmRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(records)?);
    } else {
        print_table(records);
    }
    Ok(())
}

/// The records as a pretty-printed JSON array (`[]` when there are none).
pub fn render_json(records: &[WarmRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn print_table(records: &[WarmRecord]) {
    println!("{:<60} {:<15} {:<30}", "URL", "RESULT", "MESSAGE");
    println!("{}", "=".repeat(105));

    for record in records {
        let message = record.message.as_deref().unwrap_or("");

        // Truncate on a char boundary, URLs are not always ASCII
        let url_display = if record.url.chars().count() > 57 {
            format!("{}...", record.url.chars().take(57).collect::<String>())
        } else {
            record.url.clone()
        };

        println!("{:<60} {:<15} {:<30}", url_display, format_status(&record.status), message);
    }

    println!();

    let ok_count = records.iter().filter(|r| r.is_ok()).count();
    let failed_count = records.len() - ok_count;

    println!("📊 Summary:");
    println!("   ✅ Warmed: {}", ok_count);
    println!("   ❌ Failed: {}", failed_count);
    println!("   📋 Total: {}", records.len());
}

fn format_status(status: &WarmStatus) -> String {
    match status {
        WarmStatus::Fulfilled { status } if *status < 400 => format!("✅ {}", status),
        WarmStatus::Fulfilled { status } => format!("⚠️  {}", status),
        WarmStatus::Rejected { kind } => match kind {
            FailureKind::Timeout => "⏱️  TIMEOUT".to_string(),
            FailureKind::Redirect => "🔁 REDIRECTS".to_string(),
            FailureKind::Connect => "🌐 CONNECT".to_string(),
            FailureKind::Body => "📦 BODY".to_string(),
            FailureKind::Request => "❌ ERROR".to_string(),
        },
    }
}
