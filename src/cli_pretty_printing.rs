//! Colored terminal rendering of analysis results.

use crate::engines::interface::DecryptionResult;
use crate::orchestrator::{self, OrchestrationResult};
use colored::Colorize;

/// Render a full analysis as a human-readable report.
pub fn analysis_report(result: &OrchestrationResult) -> String {
    let mut out = String::new();

    let classification = &result.classification;
    out.push_str(&format!(
        "{}\n  monoalphabetic {:.0}%  polyalphabetic {:.0}%  transposition {:.0}%  (confidence {:.2})\n",
        "Classification".bold(),
        classification.monoalphabetic * 100.0,
        classification.polyalphabetic * 100.0,
        classification.transposition * 100.0,
        classification.classification_confidence,
    ));
    for line in &classification.reasoning {
        out.push_str(&format!("  {} {}\n", "·".dimmed(), line.dimmed()));
    }

    match &result.best_candidate {
        Some(best) => {
            out.push_str(&format!(
                "\n{} {} (key {}, {}, confidence {:.2})\n",
                "Best:".bold().green(),
                best.cipher_type.to_string().green(),
                best.key.to_string().yellow(),
                best.best_language,
                best.confidence,
            ));
            out.push_str(&format!("  {}\n", best.plaintext.bold()));
        }
        None => {
            out.push_str(&format!(
                "\n{}\n",
                "No plausible decryption survived filtering.".red()
            ));
        }
    }

    if result.candidates.len() > 1 {
        out.push_str(&format!("\n{}\n", "Other candidates".bold()));
        for candidate in result.candidates.iter().skip(1) {
            let preview: String = candidate.plaintext.chars().take(60).collect();
            out.push_str(&format!(
                "  {:>6.1}  {:<20} {:<10} {}  {}\n",
                candidate.best_score,
                format!("{} ({})", candidate.cipher_type, orchestrator::tier_of(candidate.cipher_type)),
                candidate.key.to_string(),
                candidate.best_language,
                preview.dimmed(),
            ));
        }
    }

    out.push_str(&format!(
        "\n{} {} generated, {} kept, tiers {:?}{}\n",
        "Search:".bold(),
        result.candidates_generated,
        result.candidates_after_filter,
        result.tiers_executed,
        if result.early_exit {
            format!(
                ", early exit ({})",
                result.early_exit_reason.as_deref().unwrap_or("unknown")
            )
        } else {
            String::new()
        },
    ));

    out
}

/// Render a keyed or searched decryption.
pub fn decryption_report(result: &DecryptionResult) -> String {
    format!(
        "{} {}\n{} {} (confidence {:.2})\n  {}\n",
        "Plaintext:".bold().green(),
        result.plaintext.bold(),
        "Key:".bold(),
        result.key.to_string().yellow(),
        result.confidence,
        result.explanation.dimmed(),
    )
}

/// Render an error for the terminal.
pub fn error_report(error: &crate::errors::CipherError) -> String {
    format!("{} {}", "error:".bold().red(), error)
}
