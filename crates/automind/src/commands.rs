//! AutoMind command implementations

use anyhow::{Context, Result};
use tracing::{error, info};

use automind_agent::tools::register_default_actions;
use automind_agent::{
    ActionRegistry, AgentError, AgentRunConfig, RunOutcome, SingleAgent, ThinkAgent,
};
use automind_config::{self, Config};
use automind_provider::{build_backend, BackendSettings, SharedBackend};

/// Print a failed run: fault kind plus the offending text
pub fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<AgentError>() {
        Some(fault) => {
            error!("Run failed: {}", fault.kind());
            eprintln!("◆ {}\n{}", fault.kind(), fault);
        }
        None => eprintln!("◆ ERROR: {:#}", err),
    }
}

fn build_registry(config: &Config) -> Result<ActionRegistry> {
    let mut registry = ActionRegistry::new();
    register_default_actions(&mut registry, config)?;
    Ok(registry)
}

fn build_model(config: &Config) -> Result<SharedBackend> {
    let api_key = config.api_key().with_context(|| {
        format!(
            "No API key configured. Set backend.api_key in {} or export AUTOMIND_API_KEY",
            automind_config::config_path().display()
        )
    })?;

    let settings = BackendSettings {
        api_key,
        api_base: config.backend.api_base.clone(),
        model: config.backend.model.clone(),
        temperature: config.backend.temperature,
        max_tokens: config.backend.max_tokens,
        timeout_secs: config.backend.timeout_secs,
    };
    let backend = build_backend(config.backend.provider.as_str(), settings)?;
    info!("◆ Backend: {}", backend.model_name());
    Ok(backend)
}

fn run_config(question: String, backstory: Option<String>, config: &Config) -> AgentRunConfig {
    let mut run = AgentRunConfig::from_config(question, config);
    if let Some(backstory) = backstory {
        run.backstory = backstory;
    }
    run
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::ToolResponse { tool, response } => {
            println!("◆ Tool: {}", tool);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("{}", response);
        }
        RunOutcome::Summary(summary) => {
            println!("◆ Summary");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("{}", summary);
        }
        RunOutcome::FinalAnswer(answer) => {
            println!("◆ Final Answer:{}", answer);
        }
        RunOutcome::BudgetExhausted { iterations } => {
            println!(
                "◆ No final answer after {} iteration(s). Try a larger -n.",
                iterations
            );
        }
    }
}

/// Write the default config file
pub async fn init_command() -> Result<()> {
    let path = automind_config::config_path();
    let existed = path.exists();
    automind_config::init().await?;

    if existed {
        println!("◆ Config already exists at {}", path.display());
    } else {
        println!("◆ Created config at {}", path.display());
    }
    println!("\nNext steps:");
    println!("  1. Add your API key to {}", path.display());
    println!("     or export AUTOMIND_API_KEY");
    println!("  2. Ask something: automind ask \"What is the capital of France?\"");

    Ok(())
}

/// Single-shot run
pub async fn ask_command(
    question: String,
    summarize: bool,
    backstory: Option<String>,
) -> Result<()> {
    let config = Config::load().await?;
    let registry = build_registry(&config)?;
    let model = build_model(&config)?;
    let summarize = summarize || config.agent.summarize;

    let agent = SingleAgent::new(
        run_config(question, backstory, &config),
        registry,
        model,
        summarize,
    )?;
    let outcome = agent.run().await?;
    print_outcome(&outcome);
    Ok(())
}

/// Iterative run
pub async fn think_command(
    question: String,
    iterations: Option<u32>,
    backstory: Option<String>,
    trace: bool,
) -> Result<()> {
    let config = Config::load().await?;
    let registry = build_registry(&config)?;
    let model = build_model(&config)?;

    let mut run = run_config(question, backstory, &config);
    if let Some(n) = iterations {
        run = run.with_iterations(n);
    }

    let agent = ThinkAgent::new(run, registry, model)?;
    let report = agent.run_traced().await?;

    if trace {
        println!("◆ Trace ({} iterations)", report.iterations);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        print!("{}", report.scratchpad);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
    print_outcome(&report.outcome);
    Ok(())
}

/// List the registered actions
pub async fn actions_command() -> Result<()> {
    let config = Config::load().await?;
    let registry = build_registry(&config)?;

    println!("◆ Registered actions ({})", registry.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for spec in registry.specs() {
        println!("{}", spec.locator());
        println!("{}\n", spec.schema_json());
    }
    Ok(())
}

/// Show config and backend status
pub async fn status_command() -> Result<()> {
    let config_path = automind_config::config_path();
    let config = Config::load().await?;

    println!("◆ AutoMind Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Config:     {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );
    println!("Backend:    {}", config.backend.provider.as_str());
    println!(
        "Model:      {}",
        config.backend.model.as_deref().unwrap_or("(backend default)")
    );
    println!(
        "API Key:    {}",
        if config.has_api_key() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    println!("Iterations: {}", config.num_iterations());

    Ok(())
}
