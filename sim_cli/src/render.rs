//! Text and JSON output
//!
//! The driver is the only place that formats anything; the simulation
//! crates expose data.

use serde::Serialize;
use sim_kernel::{Scheduler, SimulationReport, Timeline};
use std::fmt::Write;

fn cell(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Renders the report as a fixed-width table plus a summary block
pub fn render_report(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Algorithm: {} (quantum {})   Memory: {} frames, {}",
        report.algorithm, report.quantum, report.total_frames, report.replacement
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<8} {:<12} {:>5} {:>5} {:>7} {:>5} {:>6} {:>5} {:>5} {:>10} {:>6} {:>6}",
        "PID", "STATE", "PRIO", "PAGES", "ARRIVAL", "START", "FINISH", "WAIT", "CPU", "TURNAROUND",
        "FAULTS", "REPL"
    );
    for row in &report.processes {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {:>5} {:>5} {:>7} {:>5} {:>6} {:>5} {:>5} {:>10} {:>6} {:>6}",
            row.pid.as_str(),
            row.state.to_string(),
            row.priority,
            row.pages,
            row.arrival,
            cell(row.start_cycle),
            cell(row.finish_cycle),
            row.wait_cycles,
            row.cpu_cycles,
            cell(row.turnaround),
            row.page_faults,
            row.replacements
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total cycles:       {}", report.total_cycles);
    let _ = writeln!(
        out,
        "Completed:          {}/{}",
        report.completed,
        report.processes.len()
    );
    let _ = writeln!(out, "Average wait:       {:.2}", report.average_wait);
    let _ = writeln!(out, "Average turnaround: {:.2}", report.average_turnaround);
    let _ = writeln!(out, "CPU utilization:    {:.2}%", report.cpu_utilization);
    let _ = writeln!(
        out,
        "Page faults:        {} ({} replacements)",
        report.total_page_faults, report.total_replacements
    );
    out
}

/// One bar per run of cycles, e.g. `[0-3) P1 | [3-4) idle`
pub fn render_timeline(timeline: &Timeline) -> String {
    timeline
        .segments()
        .iter()
        .map(|segment| {
            let who = segment
                .pid
                .as_ref()
                .map_or_else(|| "idle".to_string(), |pid| pid.to_string());
            format!("[{}-{}) {}", segment.start, segment.end, who)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Serialize)]
struct TraceLine<'a, E> {
    source: &'static str,
    event: &'a E,
}

fn push_lines<E: Serialize>(
    out: &mut String,
    source: &'static str,
    events: &[E],
) -> Result<(), serde_json::Error> {
    for event in events {
        out.push_str(&serde_json::to_string(&TraceLine { source, event })?);
        out.push('\n');
    }
    Ok(())
}

/// Every audit log of the scheduler as JSON lines
///
/// Lines are grouped by source: `schedule`, then `io`, then `memory`.
pub fn render_trace(scheduler: &Scheduler) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    push_lines(&mut out, "schedule", scheduler.audit_log().events())?;
    push_lines(&mut out, "io", scheduler.io_manager().audit_log().events())?;
    push_lines(&mut out, "memory", scheduler.memory().audit_log().events())?;
    Ok(out)
}
