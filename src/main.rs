use api_replay::core::request;
use api_replay::utils::error::{ErrorSeverity, ReplayError};
use api_replay::utils::{logger, validation::Validate};
use api_replay::{BatchRunner, Catalog, CliConfig, HttpDispatcher, LocalStorage, RuntimeConfig};
use clap::Parser;

fn exit_code(error: &ReplayError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(error: ReplayError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(exit_code(&error).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(e);
    }

    let runtime = RuntimeConfig::load(&config.env_file).unwrap_or_else(|e| fail(e));
    let catalog = Catalog::from_file(&config.catalog).unwrap_or_else(|e| fail(e));
    if let Err(e) = catalog.validate() {
        fail(e);
    }
    if catalog.is_empty() {
        tracing::warn!("Catalog {} has no request definitions", config.catalog);
    }
    tracing::info!(
        "📋 {} definitions from {} against {}://{}",
        catalog.len(),
        config.catalog,
        runtime.scheme,
        runtime.host
    );

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no request will be sent");
        let built = request::build_all(&catalog.requests, &runtime).unwrap_or_else(|e| fail(e));
        for (definition, request) in catalog.requests.iter().zip(built) {
            println!("### {}", definition.name);
            println!("{} {}", request.method.as_str(), request.url);
            for (name, value) in &request.headers {
                println!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
            }
            if let Some(body) = request.body_text() {
                println!();
                println!("{}", body);
            }
            println!();
        }
        return Ok(());
    }

    let dispatcher = HttpDispatcher::new(config.timeout()).unwrap_or_else(|e| fail(e));
    let storage = LocalStorage::new(&config.output_path);
    let runner = BatchRunner::new(&runtime, dispatcher, storage).with_policy(config.error_policy());

    let report = runner.run(&catalog.requests).await;

    let summary = report.summary();
    tracing::info!("📊 Run summary: {}", serde_json::to_string(&summary)?);
    println!(
        "📈 {} completed ({} with warnings), {} failed, {} skipped",
        report.completed(),
        report.warnings(),
        report.failed(),
        report.skipped.len()
    );

    match report.first_failure() {
        None => {
            println!("Finished!");
            Ok(())
        }
        Some(error) => {
            eprintln!("❌ {}", error.user_friendly_message());
            eprintln!("💡 {}", error.recovery_suggestion());
            std::process::exit(exit_code(error).max(1));
        }
    }
}
