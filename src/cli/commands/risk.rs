//! Risk command implementation.

use super::ask::ingest_file;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::risk::RiskReport;
use anyhow::Result;

/// Run the risk command.
pub async fn run_risk(file: &str, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Document, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let ingested = ingest_file(&orchestrator, file).await?;

    let spinner = Output::spinner("Assessing risk...");
    let result = orchestrator.assess_risk(&ingested.document_id).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            Output::error(&format!("Risk analysis failed: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&ingested.filename, &report);
    }

    Ok(())
}

fn print_report(filename: &str, report: &RiskReport) {
    Output::header(&format!("Risk report: {}", filename));
    Output::kv("Score", &format!("{}/100", report.risk_score));
    Output::risk_level("Level", &report.risk_level.to_string());

    if !report.key_risks.is_empty() {
        Output::header("Key risks");
        for risk in &report.key_risks {
            Output::list_item(&format!("{} [{}]", risk.title, risk.severity));
            println!("    {}", risk.description);
        }
    }

    Output::header("Analysis");
    println!("{}\n", report.detailed_analysis);
}
