//! Text rendering of ingestion reports, answers and stage timings.

use std::fmt::Write;
use std::time::Duration;

use smartpdf_rag::{Answer, BatchReport};
use smartpdf_telemetry::StageTiming;

/// One line per document, in upload order, then a summary line.
pub fn batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(ingested) => {
                let _ = writeln!(
                    out,
                    "✅ Processed {} ({} pages, {} chunks)",
                    ingested.name, ingested.pages, ingested.indexed_chunks
                );
            }
            Err(e) => {
                let _ = writeln!(out, "❌ {}: {e}", outcome.name);
            }
        }
    }
    let _ = write!(
        out,
        "{} of {} document(s) ready for questions.",
        report.success_count(),
        report.outcomes.len()
    );
    out
}

/// The answer text, followed by its sources when there are any.
pub fn answer(answer: &Answer) -> String {
    if answer.sources.is_empty() {
        return answer.text.clone();
    }
    let sources: Vec<&str> = answer.sources.iter().map(String::as_str).collect();
    format!("{}\n\nGenerated from: {}", answer.text, sources.join(", "))
}

fn millis(elapsed: Duration) -> String {
    format!("{:.1} ms", elapsed.as_secs_f64() * 1000.0)
}

/// A table of stage durations, grouped by document where known.
pub fn timings(records: &[StageTiming]) -> String {
    let mut out = String::new();
    for record in records {
        let elapsed = millis(record.elapsed);
        let _ = match &record.document {
            Some(document) => writeln!(out, "  {:<14} {elapsed:>10}  {document}", record.stage),
            None => writeln!(out, "  {:<14} {elapsed:>10}", record.stage),
        };
    }
    out
}
