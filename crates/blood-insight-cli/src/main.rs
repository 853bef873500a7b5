//! Blood Insight CLI - AI analysis of blood test reports
//!
//! Usage:
//!     blood-insight [OPTIONS] [IMAGE]
//!
//! Environment Variables:
//!     BLOOD_INSIGHT_GEMINI_KEY: Fallback Gemini key used when no API key is saved
//!     BLOOD_INSIGHT_SETTINGS: Path of the settings file
//!     BLOOD_INSIGHT_GEMINI_BASE_URL: Gemini API base URL
//!     BLOOD_INSIGHT_OPENAI_BASE_URL: OpenAI API base URL
//!     RUST_LOG: Log filter (default: blood_insight=info)

use anyhow::{anyhow, Result};
use blood_insight::{
    is_no_result, list_supported_models, render, FileSettingsStore, ImageInput, InsightConfig,
    InsightDispatcher, ReportSaver, Settings, SettingsStore, SupportedModel,
    DEFAULT_GEMINI_BASE_URL, DEFAULT_OPENAI_BASE_URL,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Blood Insight - AI analysis of blood test reports
#[derive(Parser, Debug)]
#[command(name = "blood-insight")]
#[command(about = "Blood Insight - AI analysis of blood test reports")]
#[command(after_help = r#"Examples:
    # Analyze a report with the saved settings (or the fallback Gemini key)
    blood-insight panel.png

    # Add context for the model
    blood-insight panel.jpg -d "Fasting sample, on statins"

    # Save a model and API key
    blood-insight --set-model gpt-4o --set-api-key sk-xxxxx

    # Choose model and key interactively
    blood-insight --configure

    # Render the result as HTML and keep a copy on disk
    blood-insight panel.png --html --save-dir reports

    # Interactive mode
    blood-insight
"#)]
struct Cli {
    // Analysis options
    /// Optional context passed to the model
    #[arg(short = 'd', long)]
    description: Option<String>,

    /// Print the result as an HTML page instead of Markdown
    #[arg(long)]
    html: bool,

    /// Directory to save results (creates timestamped subdirectory per session)
    #[arg(long, env = "BLOOD_INSIGHT_SAVE_DIR")]
    save_dir: Option<PathBuf>,

    // Settings options
    /// Settings file path
    #[arg(long, env = "BLOOD_INSIGHT_SETTINGS")]
    settings_file: Option<PathBuf>,

    /// Choose model and API key interactively, save, and exit
    #[arg(long)]
    configure: bool,

    /// Save this model (requires --set-api-key)
    #[arg(long, value_name = "MODEL", requires = "set_api_key", value_parser = ["gpt-4o", "gpt-4-turbo", "gemini"])]
    set_model: Option<String>,

    /// Save this API key (requires --set-model)
    #[arg(long, value_name = "KEY", requires = "set_model")]
    set_api_key: Option<String>,

    /// Show the saved settings and exit
    #[arg(long)]
    show_settings: bool,

    /// Delete the saved settings and exit
    #[arg(long)]
    clear_settings: bool,

    /// List supported models and exit
    #[arg(long)]
    list_models: bool,

    // Provider options
    /// Fallback Gemini API key, used when no API key is saved
    #[arg(long, env = "BLOOD_INSIGHT_GEMINI_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "BLOOD_INSIGHT_GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    gemini_base_url: String,

    /// OpenAI API base URL
    #[arg(long, env = "BLOOD_INSIGHT_OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    // Other options
    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Report image or PDF to analyze (interactive mode if not provided)
    image: Option<PathBuf>,
}

/// Log to stderr so results on stdout stay clean
fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "blood_insight=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read one trimmed line from stdin, `None` on EOF
fn prompt_line(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn print_supported_models() {
    println!("Supported models:");
    for model in SupportedModel::ALL {
        println!(
            "  - {:<12} {} ({})",
            model.id(),
            model.label(),
            model.provider()
        );
    }
}

async fn print_settings(store: &FileSettingsStore) {
    println!("Settings file: {}", store.path().display());
    match store.load().await {
        Some(settings) => {
            let status = if SupportedModel::from_id(&settings.model).is_some() {
                ""
            } else {
                " (unsupported)"
            };
            println!("  model:   {}{}", settings.model, status);
            println!("  api key: {}", settings.masked_api_key());
        }
        None => println!("  No settings saved; the fallback Gemini key will be used."),
    }
}

/// Settings dialog: pick a model from the fixed list, enter a key, save
async fn run_settings_dialog(store: &FileSettingsStore) -> Result<()> {
    println!("Select AI Model:");
    for (i, model) in SupportedModel::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, model.label());
    }

    let model = loop {
        let Some(choice) = prompt_line("Model number: ")? else {
            println!("\nCancelled.");
            return Ok(());
        };
        match choice.parse::<usize>() {
            Ok(n) if (1..=SupportedModel::ALL.len()).contains(&n) => {
                break SupportedModel::ALL[n - 1];
            }
            _ => println!("Enter a number between 1 and {}.", SupportedModel::ALL.len()),
        }
    };

    let Some(api_key) = prompt_line("API Key: ")? else {
        println!("\nCancelled.");
        return Ok(());
    };

    store.save(&Settings::new(model.id(), api_key)).await?;
    println!("Settings saved to {} (stored locally)", store.path().display());
    Ok(())
}

/// Analyze one report and print the result.
///
/// Returns whether the analysis succeeded.
async fn analyze_report(
    dispatcher: &InsightDispatcher,
    path: &Path,
    description: &str,
    html: bool,
    saver: Option<&mut ReportSaver>,
) -> bool {
    let image = match ImageInput::from_path(path).await {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    println!("Analyzing {}...", path.display());
    let text = match dispatcher.generate_insights(image, description).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return false;
        }
    };

    let (output, extension) = if html {
        (render::to_html_page(&text), "html")
    } else {
        (text.clone(), "md")
    };

    println!("\n{}", "=".repeat(50));
    println!("{}", output.trim_end());
    println!("{}", "=".repeat(50));

    if is_no_result(&text) {
        println!("The file does not look like a blood test report.");
    }

    if let Some(saver) = saver {
        match saver.save(&output, extension).await {
            Ok(path) => println!("Saved to {}", path.display()),
            Err(e) => eprintln!("Failed to save report: {}", e),
        }
    }

    true
}

/// Run interactive mode
async fn run_interactive_mode(
    dispatcher: &InsightDispatcher,
    html: bool,
    mut saver: Option<ReportSaver>,
) -> Result<()> {
    println!("\nEntering interactive mode. Type 'quit' to exit.\n");

    loop {
        let Some(path) = prompt_line("Report file: ")? else {
            println!("\nGoodbye!");
            break;
        };

        if path.eq_ignore_ascii_case("quit")
            || path.eq_ignore_ascii_case("exit")
            || path.eq_ignore_ascii_case("q")
        {
            println!("Goodbye!");
            break;
        }

        if path.is_empty() {
            continue;
        }

        let description = prompt_line("Description (optional): ")?.unwrap_or_default();

        println!();
        analyze_report(
            dispatcher,
            Path::new(&path),
            &description,
            html,
            saver.as_mut(),
        )
        .await;
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.quiet);

    // Handle --list-models (no settings needed)
    if args.list_models {
        print_supported_models();
        return Ok(());
    }

    let store = match &args.settings_file {
        Some(path) => FileSettingsStore::new(path),
        None => FileSettingsStore::default(),
    };

    // Settings commands exit early
    if args.show_settings {
        print_settings(&store).await;
        return Ok(());
    }

    if args.clear_settings {
        store.clear().await?;
        println!("Settings cleared.");
        return Ok(());
    }

    if let (Some(model), Some(api_key)) = (&args.set_model, &args.set_api_key) {
        if SupportedModel::from_id(model).is_none() {
            return Err(anyhow!(
                "Unsupported model: {} (expected one of {})",
                model,
                list_supported_models().join(", ")
            ));
        }
        store.save(&Settings::new(model, api_key)).await?;
        println!("Settings saved to {}", store.path().display());
        return Ok(());
    }

    if args.configure {
        return run_settings_dialog(&store).await;
    }

    let config = InsightConfig::new()
        .with_gemini_base_url(&args.gemini_base_url)
        .with_openai_base_url(&args.openai_base_url)
        .with_fallback_gemini_key(args.gemini_key.clone());

    let dispatcher = InsightDispatcher::new(Arc::new(store), config);

    let saver = match &args.save_dir {
        Some(dir) => Some(ReportSaver::new(dir).await?),
        None => None,
    };

    if let Some(image) = &args.image {
        let mut saver = saver;
        let description = args.description.clone().unwrap_or_default();
        if !analyze_report(&dispatcher, image, &description, args.html, saver.as_mut()).await {
            std::process::exit(1);
        }
    } else {
        run_interactive_mode(&dispatcher, args.html, saver).await?;
    }

    Ok(())
}
