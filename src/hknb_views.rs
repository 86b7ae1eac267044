// Terminal views for the HK Next Bus stop list
use crate::hknb_controllers::StopListBinder;
use crate::hknb_models::SampleFeed;
use std::io::{self, Write};

pub struct HknbViews;

impl HknbViews {
    /// Show main menu
    pub fn show_menu() {
        println!("\n📋 MENU OPTIONS");
        println!("  1️⃣  Tap a stop (toggle its ETA panel)");
        println!("  2️⃣  Switch language (English / 繁體中文)");
        println!("  3️⃣  Refresh ETA data 🔄");
        println!("  4️⃣  Show statistics 📊");
        println!("  0️⃣  Quit application");
        println!("\n{}", "─".repeat(60));
        print!("➜ Your choice: ");
        let _ = io::stdout().flush();
    }

    /// Render the stop chain with connector lines between neighbours and an
    /// indented ETA panel under each expanded row.
    pub fn show_stop_list(route: &str, binder: &StopListBinder) {
        println!("\n{}", "═".repeat(60));
        println!("🚏 ROUTE {} — {} STOPS", route, binder.row_count());
        println!("{}", "═".repeat(60));

        if binder.row_count() == 0 {
            println!("\n   (no stops loaded)");
            return;
        }

        println!();
        for position in 0..binder.row_count() {
            let row = binder.render_row(position);

            if row.top_line_visible {
                println!("   │");
            }
            println!("   ●  {}", row.label);
            if let Some(text) = &row.eta_text {
                let gutter = if row.bottom_line_visible { "│" } else { " " };
                println!("   {}      ⏱  {}", gutter, text);
            }
        }
    }

    /// Prompt for the stop to tap
    pub fn prompt_stop_number(count: usize) {
        print!("\n👆 Enter stop number (1-{}): ", count);
        let _ = io::stdout().flush();
    }

    /// Report the outcome of a tap: opened panel with its ETA text, or closed
    pub fn show_tap_result(label: &str, result: Option<&str>) {
        println!("\n{}", "─".repeat(60));
        match result {
            Some(text) => {
                println!("✓ ETA panel opened for {}", label);
                println!("  ⏱  {}", text);
            }
            None => {
                println!("✓ ETA panel closed for {}", label);
            }
        }
        println!("{}", "─".repeat(60));
    }

    pub fn language_changed(is_english: bool) {
        println!("\n{}", "─".repeat(60));
        if is_english {
            println!("✓ Language set to English");
        } else {
            println!("✓ 語言已切換為繁體中文");
        }
        println!("  All stop labels update on the next render");
        println!("{}", "─".repeat(60));
    }

    pub fn data_refreshed(current_frame: usize, frame_count: usize) {
        println!("\n{}", "─".repeat(60));
        println!(
            "✓ ETA data refreshed (snapshot {} of {})",
            current_frame, frame_count
        );
        println!("  Open panels were reset by the update");
        println!("{}", "─".repeat(60));
    }

    pub fn show_stats(feed: &SampleFeed, binder: &StopListBinder) {
        println!("\n{}", "═".repeat(60));
        println!("📊 STATISTICS");
        println!("{}", "═".repeat(60));
        println!("  🚏 Route: {} | Stops: {}", feed.route(), binder.row_count());
        println!("  ⏱  ETA entries indexed: {}", binder.eta_entry_count());
        println!(
            "  🔄 Snapshot {} of {} | Render generation: {}",
            feed.current_frame(),
            feed.frame_count(),
            binder.generation()
        );
        println!(
            "  🌐 Language: {}",
            if binder.is_english() { "English" } else { "繁體中文" }
        );
        println!("{}", "═".repeat(60));
    }

    /// Data error message
    pub fn data_error(error: &str) {
        println!("\n{}", "═".repeat(60));
        println!("❌ DATA ERROR");
        println!("{}", "═".repeat(60));
        println!("\n{}", error);
        println!("\n💡 Troubleshooting:");
        println!("  • The bundled sample network failed to load");
        println!("  • Reinstall or rebuild the application");
        println!("  • Report this issue if it persists");
        println!("\n{}", "═".repeat(60));
    }

    pub fn goodbye_message() {
        println!("\n{}", "═".repeat(60));
        println!("       👋 Thank you for using HK Next Bus!");
        println!("          多謝使用，一路順風");
        println!("{}", "═".repeat(60));
        println!();
    }
}
