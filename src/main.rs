use blowdown_advisor::config::file::FileConfig;
use blowdown_advisor::core::recommend::{recommend, release_bounds, sorted_by_valve_size};
use blowdown_advisor::domain::model::{Measurement, MeasurementTable};
use blowdown_advisor::ui::{self, fmt_num};
use blowdown_advisor::utils::{logger, validation::Validate};
use blowdown_advisor::{AdvisorError, CliConfig, LoadEngine, LocalStorage, SpreadsheetPipeline};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting blowdown-advisor");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Some(path) = config.config.clone() {
        match FileConfig::from_file(&path) {
            Ok(file) => config.apply_file(file),
            Err(e) => {
                tracing::error!("❌ Could not load config file: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("✅ Session complete");
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("⚠️ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // Exit code follows severity; query misses are warnings, not failures.
            let exit_code = match e.severity() {
                blowdown_advisor::utils::error::ErrorSeverity::Low => 0,
                blowdown_advisor::utils::error::ErrorSeverity::Medium => 2,
                blowdown_advisor::utils::error::ErrorSeverity::High => 1,
                blowdown_advisor::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(config: CliConfig) -> blowdown_advisor::Result<()> {
    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::current_dir();
    let pipeline = SpreadsheetPipeline::new(storage, config.clone());
    let engine = LoadEngine::new_with_monitoring(pipeline, monitor_enabled);

    let table = engine.run().await?;

    if config.list_types {
        println!("Available volume types:");
        for volume_type in table.volume_types() {
            println!("  {}", volume_type);
        }
        return Ok(());
    }

    if let Some(volume_type) = &config.volume_type {
        return run_query(
            &table,
            volume_type,
            config.target_release,
            config.show_table,
        );
    }

    ui::run(table)
}

fn run_query(
    table: &MeasurementTable,
    volume_type: &str,
    target_release: Option<f64>,
    show_table: bool,
) -> blowdown_advisor::Result<()> {
    let subset = table.filter_by_type(volume_type);
    let Some(bounds) = release_bounds(&subset) else {
        return Err(AdvisorError::EmptyResult {
            volume_type: volume_type.to_string(),
        });
    };

    if bounds.is_fixed() {
        println!("⚠️ Only one release volume available for this volume type.");
    }

    // The original slider defaults to the subset minimum.
    let target = target_release.unwrap_or(bounds.min);
    tracing::debug!(
        "Query: volume_type='{}', target={} MCF, subset={} records",
        volume_type,
        target,
        subset.len()
    );

    match recommend(&subset, target) {
        Some(rec) => {
            println!("✅ Recommended Valve Size: {} in", fmt_num(rec.valve_size_in));
            println!("⏱️ Expected Duration: {} seconds", fmt_num(rec.duration_s));
            println!("📦 Actual Release Volume: {} MCF", fmt_num(rec.release_mcf));
            if show_table {
                print_table(&subset);
            }
            Ok(())
        }
        None => {
            if show_table {
                print_table(&subset);
            }
            Err(AdvisorError::NoRecommendation { target })
        }
    }
}

fn print_table(subset: &[&Measurement]) {
    println!();
    println!(
        "{:>15}  {:>12}  {:>13}",
        "Valve Size [in]", "Duration [s]", "Release [MCF]"
    );
    for m in sorted_by_valve_size(subset) {
        println!(
            "{:>15}  {:>12}  {:>13}",
            fmt_num(m.valve_size_in),
            fmt_num(m.duration_s),
            fmt_num(m.release_mcf)
        );
    }
}
