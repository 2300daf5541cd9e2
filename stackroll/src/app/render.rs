//! Console rendering of a finished run

use colored::Colorize;

use crate::app::run::RunSummary;
use crate::deploy::gate::GateReport;
use crate::deploy::outcome::DeploymentOutcome;

/// Print the outcome of a run to stdout
pub fn render(summary: &RunSummary) {
    println!("{} {}", "Stack:".bold(), summary.target);
    if let Some(previous) = summary.previous_update {
        println!("{} {}", "Previous update:".bold(), previous.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if let Some(gate) = &summary.report.forward {
        render_gate("Deploy", gate);
    }
    if let Some(gate) = &summary.report.rollback {
        render_gate("Rollback", gate);
    }

    if let Some(updated) = summary.report.stack_updated_at {
        println!("{} {}", "Stack updated:".bold(), updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let outcome = summary.report.outcome;
    let line = format!(
        "{} ({})",
        outcome.message(),
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    match outcome {
        DeploymentOutcome::Succeeded => println!("{}", line.green().bold()),
        DeploymentOutcome::SucceededAfterRollback | DeploymentOutcome::FailedRollbackSucceeded => {
            println!("{}", line.yellow().bold())
        }
        DeploymentOutcome::Failed | DeploymentOutcome::FailedRollbackFailed => {
            println!("{}", line.red().bold())
        }
    }
}

fn render_gate(phase: &str, gate: &GateReport) {
    println!(
        "{} health check: {} after {} round(s)",
        phase,
        gate.outcome.to_string().bold(),
        gate.rounds
    );
    for failed in &gate.failed {
        println!(
            "  {} {} ({}, {})",
            "x".red(),
            failed.observation.name,
            failed.observation.status,
            failed.observation.runtime_status
        );
        if let Some(logs) = &failed.logs {
            for line in logs.lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
}
