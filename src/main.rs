mod hknb_controllers;
mod hknb_gui;
mod hknb_models;
mod hknb_views;

use clap::Parser;
use hknb_controllers::HknbControllers;
use hknb_models::HknbModels;

/// Hong Kong next-bus stop list viewer
#[derive(Parser)]
#[command(name = "hknb", version)]
struct Cli {
    /// Launch the desktop frontend instead of the terminal menu
    #[arg(long)]
    gui: bool,

    /// Display language: "en" or "tc" (defaults to the environment locale)
    #[arg(long)]
    lang: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let is_english = match cli.lang.as_deref() {
        Some("en") => true,
        Some("tc") => false,
        Some(other) => {
            eprintln!("Unknown language '{}': expected 'en' or 'tc'", other);
            std::process::exit(2);
        }
        None => HknbModels::detect_english_locale(),
    };

    // Set up panic hook for better error messages
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n{}", "═".repeat(70));
        eprintln!("❌ APPLICATION PANIC");
        eprintln!("{}", "═".repeat(70));
        eprintln!("\nThe application encountered an unexpected error:");
        eprintln!("{}", panic_info);
        eprintln!("\n💡 Troubleshooting:");
        eprintln!("  • Please restart the application");
        eprintln!("  • Report this issue if it persists");
        eprintln!("\n{}", "═".repeat(70));
    }));

    if cli.gui {
        if let Err(e) = hknb_gui::run_gui(is_english) {
            eprintln!("\n⚠️  Failed to start the GUI: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Run the terminal application
    match std::panic::catch_unwind(move || {
        HknbControllers::run(is_english);
    }) {
        Ok(_) => {
            // Normal exit
        }
        Err(_) => {
            eprintln!("\n⚠️  Application terminated unexpectedly");
            std::process::exit(1);
        }
    }
}
