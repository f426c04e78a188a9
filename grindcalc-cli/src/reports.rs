use anyhow::Result;
use colored::Colorize;
use std::io::Write;

use grindcalc_engine::{GrindReport, Validity};

fn validity_line(validity: Option<&Validity>) -> String {
    match validity {
        None => "n/a".to_string(),
        Some(Validity::Valid) => "valid".to_string(),
        Some(Validity::UnnecessarySteps { idle }) => {
            format!("unnecessary steps: {}", idle.join(", "))
        }
        Some(Validity::NotPracticable { reversed }) => {
            format!("not practicable, reversed: {}", reversed.join(", "))
        }
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

pub fn generate_console_report<W: Write>(
    writer: &mut W,
    title: &str,
    report: &GrindReport,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", format!("Grind: {title}").bright_cyan().bold())?;
    writeln!(writer, "{}", "=".repeat(title.len() + 7).cyan())?;

    let outcome = if report.is_usable() {
        report.outcome.green()
    } else {
        report.outcome.red()
    };
    writeln!(writer, "Outcome: {outcome}")?;
    writeln!(writer, "Kernel dimension: {}", report.kernel_dimension)?;
    let validity = validity_line(report.validity.as_ref());
    let validity = match report.validity {
        Some(Validity::Valid) => validity.green(),
        Some(Validity::UnnecessarySteps { .. }) => validity.yellow(),
        _ => validity.red(),
    };
    writeln!(writer, "Validity: {validity}")?;
    writeln!(writer, "Residual: {}", optional(report.residual, 3))?;
    writeln!(writer)?;

    if let Some(metrics) = report.metrics {
        writeln!(writer, "{}", "Efficiency".bright_yellow().bold())?;
        writeln!(writer, "   Echoes/action: {:.4}", metrics.epa)?;
        writeln!(
            writer,
            "   Echoes/action incl. scrip @ {}: {:.4}",
            report.scrip_exchange_rate, metrics.epa_total
        )?;
        writeln!(writer, "   Scrip/action: {:.4}", metrics.spa)?;
        writeln!(writer)?;
    }

    let anchor = report.anchor.as_deref().unwrap_or("-");
    writeln!(
        writer,
        "{}",
        format!("Steps (ratio to {anchor})").bright_yellow().bold()
    )?;
    for step in &report.steps {
        let ratio = optional(step.ratio, 6);
        let ratio = match step.ratio {
            Some(r) if r < 0.0 => ratio.red(),
            Some(r) if r == 0.0 => ratio.yellow(),
            _ => ratio.normal(),
        };
        writeln!(writer, "   {:<32} {ratio}", step.name)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(writer: &mut W, report: &GrindReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    writer: &mut W,
    title: &str,
    report: &GrindReport,
) -> Result<()> {
    writeln!(writer, "# Grind: {title}\n")?;
    writeln!(writer, "- **Outcome:** {}", report.outcome)?;
    writeln!(writer, "- **Kernel dimension:** {}", report.kernel_dimension)?;
    writeln!(
        writer,
        "- **Validity:** {}",
        validity_line(report.validity.as_ref())
    )?;
    if let Some(metrics) = report.metrics {
        writeln!(writer, "- **Echoes/action:** {:.4}", metrics.epa)?;
        writeln!(
            writer,
            "- **Echoes/action incl. scrip:** {:.4} (rate {})",
            metrics.epa_total, report.scrip_exchange_rate
        )?;
        writeln!(writer, "- **Scrip/action:** {:.4}", metrics.spa)?;
    }
    writeln!(writer)?;

    writeln!(writer, "## Steps\n")?;
    let anchor = report.anchor.as_deref().unwrap_or("-");
    writeln!(writer, "| Step | Count | Ratio to {anchor} |")?;
    writeln!(writer, "|------|-------|-------|")?;
    for step in &report.steps {
        writeln!(
            writer,
            "| {} | {} | {} |",
            step.name,
            optional(step.count, 6),
            optional(step.ratio, 6)
        )?;
    }
    Ok(())
}
