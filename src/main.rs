use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursegen::app::{CourseGenerator, GenerationService};
use coursegen::domain::OrchestrationError;
use coursegen::infra::llm::{LlmConfig, ProviderRegistry};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "coursegen", version, about = "Generate courses, lessons and quizzes with LLM provider fallback")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the enabled providers in fallback order
    Providers,
    /// Send a raw prompt through the provider fallback
    Raw { prompt: String },
    /// Generate a course outline for a topic
    Outline { topic: String },
    /// Generate the content of one lesson
    Lesson { topic: String, lesson_title: String },
    /// Generate a multiple-choice quiz for one lesson
    Quiz { topic: String, lesson_title: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // A missing .env file is not an error; the process environment still applies.
    let _ = dotenvy::dotenv();

    if let Err(error) = init_logging(&cli.log_level) {
        eprintln!("{error:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let Some(orchestration) = error.downcast_ref::<OrchestrationError>() {
                for attempt in orchestration.errors() {
                    tracing::error!(
                        provider = attempt.provider().unwrap_or("unknown"),
                        code = %attempt.code(),
                        message = %attempt.message,
                        "provider attempt failed"
                    );
                }
            }
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    let config = LlmConfig::from_env().context("failed to read provider configuration")?;
    let registry =
        ProviderRegistry::with_default_adapters(&config).context("failed to build providers")?;
    let service = GenerationService::new(registry);

    match command {
        Command::Providers => print_json(&service.registry().enabled_providers()),
        Command::Raw { prompt } => print_json(&service.generate(&prompt)?),
        Command::Outline { topic } => {
            let generator = CourseGenerator::new(service)?;
            print_json(&generator.generate_course_outline(&topic)?)
        }
        Command::Lesson {
            topic,
            lesson_title,
        } => {
            let generator = CourseGenerator::new(service)?;
            print_json(&generator.generate_lesson(&topic, &lesson_title)?)
        }
        Command::Quiz {
            topic,
            lesson_title,
        } => {
            let generator = CourseGenerator::new(service)?;
            print_json(&generator.generate_quiz(&topic, &lesson_title)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
