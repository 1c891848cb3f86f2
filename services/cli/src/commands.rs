use chrono::Utc;
use clap::Args;
use credit_risk::config::{AppConfig, PipelineConfig};
use credit_risk::error::AppError;
use credit_risk::pipeline::{
    save_dataset, save_report, CreditRiskPipeline, PipelineError, PreparationProfile, RiskSummary,
};
use credit_risk::scoring::{
    german_credit_rules, FieldScore, RiskAssessment, RiskReport, RiskScorer, RuleSetConfig,
};
use credit_risk::telemetry;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Raw credit CSV (overrides CREDIT_RISK_INPUT)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Risk report destination, must end in .csv (overrides CREDIT_RISK_OUTPUT)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// JSON rule configuration (overrides CREDIT_RISK_RULES)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Also save the cleaned and encoded dataset to this .csv path
    #[arg(long)]
    pub(crate) processed_output: Option<PathBuf>,
    /// Write the risk level distribution as JSON
    #[arg(long)]
    pub(crate) summary_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// 1-based customer id (row position in the input)
    #[arg(long)]
    pub(crate) customer: usize,
    /// Raw credit CSV (overrides CREDIT_RISK_INPUT)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// JSON rule configuration (overrides CREDIT_RISK_RULES)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Write the configuration to a file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        output,
        rules,
        processed_output,
        summary_json,
    } = args;

    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.pipeline, input, output, rules, processed_output);
    config.pipeline.validate()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let pipeline = build_pipeline(config.pipeline.rules_path.as_deref())?;
    let outcome = pipeline.run_path(&config.pipeline.input_path)?;

    if let Some(path) = &config.pipeline.processed_output {
        save_dataset(&outcome.dataset, path)?;
    }
    save_report(&outcome.report, &config.pipeline.output_path)?;

    let summary = RiskSummary::from_report(&outcome.report, pipeline.scorer().tiers(), Utc::now());
    if let Some(path) = summary_json {
        summary.save_json(path)?;
    }

    info!(environment = ?config.environment, customers = summary.customers, "scoring run finished");
    render_summary(&summary, &config.pipeline.output_path);
    Ok(())
}

pub(crate) fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let ExplainArgs {
        customer,
        input,
        rules,
    } = args;

    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.pipeline, input, None, rules, None);
    telemetry::init(&config.telemetry, config.environment)?;

    let pipeline = build_pipeline(config.pipeline.rules_path.as_deref())?;
    let outcome = pipeline.run_path(&config.pipeline.input_path)?;

    let row = find_customer(&outcome.report, customer)?;
    let breakdown = pipeline.scorer().breakdown(&row.record)?;
    render_breakdown(row.customer_id, &breakdown, row.risk_score, &row.risk_level);
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let rendered = german_credit_rules().to_json_pretty()?;
    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            println!("Rule configuration written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn find_customer(report: &RiskReport, customer: usize) -> Result<&RiskAssessment, PipelineError> {
    report
        .customer(customer)
        .ok_or(PipelineError::CustomerNotFound {
            customer,
            customers: report.len(),
        })
}

fn apply_overrides(
    pipeline: &mut PipelineConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    rules: Option<PathBuf>,
    processed_output: Option<PathBuf>,
) {
    if let Some(input) = input {
        pipeline.input_path = input;
    }
    if let Some(output) = output {
        pipeline.output_path = output;
    }
    if rules.is_some() {
        pipeline.rules_path = rules;
    }
    if processed_output.is_some() {
        pipeline.processed_output = processed_output;
    }
}

fn build_pipeline(rules_path: Option<&Path>) -> Result<CreditRiskPipeline, AppError> {
    let rules = match rules_path {
        Some(path) => RuleSetConfig::from_path(path)?,
        None => german_credit_rules(),
    };
    let scorer: RiskScorer = rules.build()?;
    Ok(CreditRiskPipeline::new(
        PreparationProfile::german_credit(),
        scorer,
    ))
}

fn render_summary(summary: &RiskSummary, output_path: &Path) {
    println!("Credit risk report");
    println!(
        "Scored {} customers (mean score {:.1}) at {}",
        summary.customers,
        summary.mean_score,
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!("\nRisk level distribution");
    for tier in &summary.distribution {
        let threshold = match tier.threshold {
            Some(threshold) => format!(">= {threshold}"),
            None => "unmatched".to_string(),
        };
        println!(
            "- {} ({}): {} customers ({:.1}%)",
            tier.label,
            threshold,
            tier.customers,
            tier.share * 100.0
        );
    }

    println!("\nRisk report saved to {}", output_path.display());
}

fn render_breakdown(customer_id: usize, breakdown: &[FieldScore], total: i64, level: &str) {
    println!("Customer {customer_id}");
    for component in breakdown {
        println!(
            "- {:<18} {:>12} [{}] -> {:+}",
            component.field,
            component.value.to_string(),
            component.kind.label(),
            component.score
        );
    }
    println!("Total score {total} (clamped to 0-100): {level}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_risk::scoring::CustomerRecord;

    fn report() -> RiskReport {
        let scorer = german_credit_rules().build().expect("rules build");
        let record = CustomerRecord::new()
            .with("age", 30)
            .with("sex", "female")
            .with("job", 2)
            .with("housing", 2)
            .with("saving_accounts", 2)
            .with("checking_account", 2)
            .with("credit_amount", 1500)
            .with("duration", 12)
            .with("purpose", "radio/TV");
        scorer
            .generate_report(&[record.clone(), record])
            .expect("report builds")
    }

    #[test]
    fn explain_finds_customers_by_one_based_id() {
        let report = report();
        let row = find_customer(&report, 2).expect("second customer");
        assert_eq!(row.customer_id, 2);
    }

    #[test]
    fn explain_fails_for_unknown_customers() {
        let report = report();
        for customer in [0, 3] {
            let error = find_customer(&report, customer).expect_err("out of range");
            assert!(matches!(
                error,
                PipelineError::CustomerNotFound { customers: 2, .. }
            ));
        }
        let error = AppError::from(find_customer(&report, 3).expect_err("out of range"));
        assert!(error.to_string().contains("customer 3 not found (2 customers loaded)"));
    }
}
