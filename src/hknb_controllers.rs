// Controllers for HK Next Bus: the stop-list binder and the terminal menu loop
use crate::hknb_models::{BusStop, EtaDisplay, HknbModels, RouteEta, SampleFeed};
use crate::hknb_views::HknbViews;
use std::collections::HashMap;
use std::io::{self, Write};

// ============================================================================
// Stop List Binder
// ============================================================================

/// Display data for one row of the stop list.
///
/// `row_id` is the stop's own identifier, not its position, so hosts that
/// correlate rows for animation or diffing stay stable when the list changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RowViewModel {
    pub label: String,
    pub top_line_visible: bool,
    pub bottom_line_visible: bool,
    pub row_id: String,
    pub expanded: bool,
    pub eta: Option<EtaDisplay>,
    pub eta_text: Option<String>,
}

/// Binds a stop sequence and its ETA data to a scrollable list.
///
/// Owns the displayed stops, a per-stop ETA index rebuilt wholesale on every
/// update, the language flag, and the expand/collapse state of each row.
/// Expansion is keyed by stop id rather than stored on the row, so recycled
/// or re-rendered rows always re-derive the right state.
///
/// Single-threaded: every operation runs synchronously on the caller's
/// thread, and hosts must serialize calls.
pub struct StopListBinder {
    stops: Vec<BusStop>,
    eta_index: HashMap<String, Vec<RouteEta>>,
    is_english: bool,
    expanded: HashMap<String, bool>,
    generation: u64,
}

impl StopListBinder {
    pub fn new(is_english: bool) -> Self {
        StopListBinder {
            stops: Vec::new(),
            eta_index: HashMap::new(),
            is_english,
            expanded: HashMap::new(),
            generation: 0,
        }
    }

    /// Replace the stop list and rebuild the ETA index from scratch.
    ///
    /// The previous index is discarded entirely, expansion state is reset
    /// (every row is recreated), and the re-render signal fires. Empty
    /// inputs simply produce an empty list.
    pub fn update_data(&mut self, new_stops: Vec<BusStop>, etas: &[RouteEta]) {
        self.stops = new_stops;
        self.eta_index = HknbModels::build_eta_index(etas);
        self.expanded.clear();
        self.generation += 1;
        log::debug!(
            "Updated binder with {} stops and {} ETAs ({} stops indexed)",
            self.stops.len(),
            etas.len(),
            self.eta_index.len()
        );
    }

    /// Switch between English and Traditional Chinese labels.
    ///
    /// Takes effect on the next render pass; the re-render signal fires.
    pub fn set_language(&mut self, is_english: bool) {
        self.is_english = is_english;
        self.generation += 1;
        log::debug!(
            "Language set to {}",
            if is_english { "English" } else { "Traditional Chinese" }
        );
    }

    pub fn is_english(&self) -> bool {
        self.is_english
    }

    pub fn row_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of ETA entries currently indexed, for host statistics.
    pub fn eta_entry_count(&self) -> usize {
        self.eta_index.values().map(Vec::len).sum()
    }

    /// Re-render signal: hosts repaint the whole list when this changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Produce display data for the row at `position` (0-based).
    ///
    /// The first row hides its top connector line and the last row hides its
    /// bottom one, which draws the stop chain. Panics if `position` is out of
    /// range; that is a host indexing bug, not a recoverable condition.
    pub fn render_row(&self, position: usize) -> RowViewModel {
        let stop = &self.stops[position];
        let name = if self.is_english { &stop.name_en } else { &stop.name_tc };
        let expanded = self.expanded.get(&stop.stop_id).copied().unwrap_or(false);
        let eta = if expanded {
            Some(self.eta_display_for(&stop.stop_id))
        } else {
            None
        };

        RowViewModel {
            label: format!("{}. {}", position + 1, name),
            top_line_visible: position != 0,
            bottom_line_visible: position != self.stops.len() - 1,
            row_id: stop.stop_id.clone(),
            expanded,
            eta_text: eta.map(|e| e.text(self.is_english)),
            eta,
        }
    }

    /// Toggle the row's ETA panel.
    ///
    /// Returns the localized earliest-arrival text when the panel opens and
    /// `None` when it closes. Panics if `position` is out of range.
    pub fn on_row_tapped(&mut self, position: usize) -> Option<String> {
        let stop_id = self.stops[position].stop_id.clone();
        let now_expanded = {
            let flag = self.expanded.entry(stop_id.clone()).or_insert(false);
            *flag = !*flag;
            *flag
        };

        if now_expanded {
            Some(self.eta_display_for(&stop_id).text(self.is_english))
        } else {
            None
        }
    }

    fn eta_display_for(&self, stop_id: &str) -> EtaDisplay {
        EtaDisplay::for_stop(self.eta_index.get(stop_id).map(Vec::as_slice))
    }
}

// ============================================================================
// Terminal Application
// ============================================================================

pub struct HknbControllers;

impl HknbControllers {
    /// Main menu loop for the terminal frontend.
    pub fn run(is_english: bool) {
        Self::show_welcome_screen();

        let mut feed = match SampleFeed::load() {
            Ok(feed) => feed,
            Err(e) => {
                HknbViews::data_error(&format!("{}", e));
                Self::pause();
                return;
            }
        };

        let mut binder = StopListBinder::new(is_english);
        let stops = feed.stops().to_vec();
        let frame = feed.next_frame();
        binder.update_data(stops, &frame);

        println!("\n✓ Route {} loaded: {} stops", feed.route(), binder.row_count());

        loop {
            HknbViews::show_stop_list(feed.route(), &binder);
            HknbViews::show_menu();

            let choice = Self::read_input();

            match choice.trim() {
                "1" => {
                    Self::handle_stop_tap(&mut binder);
                    Self::pause();
                }
                "2" => {
                    let english = !binder.is_english();
                    binder.set_language(english);
                    HknbViews::language_changed(english);
                    Self::pause();
                }
                "3" => {
                    let stops = feed.stops().to_vec();
                    let frame = feed.next_frame();
                    binder.update_data(stops, &frame);
                    HknbViews::data_refreshed(feed.current_frame(), feed.frame_count());
                    Self::pause();
                }
                "4" => {
                    HknbViews::show_stats(&feed, &binder);
                    Self::pause();
                }
                "0" => {
                    HknbViews::goodbye_message();
                    break;
                }
                "" => {
                    // Just pressed Enter, show the list again
                }
                other => {
                    println!("\n✗ Invalid option '{}'. Please select 0-4.", other);
                    Self::pause();
                }
            }
        }
    }

    /// Show welcome screen
    fn show_welcome_screen() {
        println!("\n{}", "═".repeat(70));
        println!("  ╔═══════════════════════════════════════════════════════════╗");
        println!("  ║            🚏 HK NEXT BUS - 香港巴士到站時間               ║");
        println!("  ║                 Stop List & Arrival Viewer                ║");
        println!("  ╚═══════════════════════════════════════════════════════════╝");
        println!("{}", "═".repeat(70));
        println!("\n  📋 Features:");
        println!("     • Stop-by-stop route chain with arrival countdowns");
        println!("     • Tap a stop to reveal its earliest ETA");
        println!("     • English / 繁體中文 labels");
        println!("\n{}", "═".repeat(70));
    }

    /// Prompt for a stop number and toggle that row's ETA panel.
    fn handle_stop_tap(binder: &mut StopListBinder) {
        if binder.row_count() == 0 {
            println!("\n⚠️  No stops loaded");
            return;
        }

        HknbViews::prompt_stop_number(binder.row_count());
        let input = Self::read_input();

        match input.trim().parse::<usize>() {
            Ok(num) if num > 0 && num <= binder.row_count() => {
                let label = binder.render_row(num - 1).label;
                let result = binder.on_row_tapped(num - 1);
                HknbViews::show_tap_result(&label, result.as_deref());
            }
            _ => {
                println!(
                    "✗ Invalid selection. Please enter a number between 1 and {}",
                    binder.row_count()
                );
            }
        }
    }

    /// Simple pause - wait for Enter key
    fn pause() {
        print!("\n📌 Press Enter to continue...");
        io::stdout().flush().unwrap();
        let mut dummy = String::new();
        io::stdin().read_line(&mut dummy).unwrap();
    }

    /// Read input from stdin with error handling
    fn read_input() -> String {
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => input,
            Err(e) => {
                eprintln!("⚠️  Error reading input: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, name_en: &str, name_tc: &str) -> BusStop {
        BusStop {
            stop_id: id.to_string(),
            name_en: name_en.to_string(),
            name_tc: name_tc.to_string(),
            service_type: "1".to_string(),
        }
    }

    fn eta(stop_id: &str, minutes: i32) -> RouteEta {
        RouteEta {
            stop_id: stop_id.to_string(),
            minutes_remaining: minutes,
        }
    }

    fn sample_binder() -> StopListBinder {
        let mut binder = StopListBinder::new(true);
        binder.update_data(
            vec![
                stop("A", "Sau Mau Ping Central", "中秀茂坪"),
                stop("B", "Sau Ming House", "秀明樓"),
                stop("C", "Star Ferry Pier", "尖沙咀碼頭"),
            ],
            &[eta("A", 3), eta("A", 1), eta("B", -1)],
        );
        binder
    }

    fn render_all(binder: &StopListBinder) -> Vec<RowViewModel> {
        (0..binder.row_count()).map(|p| binder.render_row(p)).collect()
    }

    #[test]
    fn test_row_count_tracks_stop_list() {
        let binder = sample_binder();
        assert_eq!(binder.row_count(), 3);

        let mut empty = StopListBinder::new(true);
        empty.update_data(Vec::new(), &[]);
        assert_eq!(empty.row_count(), 0);
    }

    #[test]
    fn test_labels_are_numbered_and_bilingual() {
        let mut binder = sample_binder();
        assert_eq!(binder.render_row(0).label, "1. Sau Mau Ping Central");
        assert_eq!(binder.render_row(2).label, "3. Star Ferry Pier");

        binder.set_language(false);
        assert_eq!(binder.render_row(0).label, "1. 中秀茂坪");
        assert_eq!(binder.render_row(2).label, "3. 尖沙咀碼頭");
    }

    #[test]
    fn test_connector_lines_hidden_at_ends() {
        let binder = sample_binder();
        let rows = render_all(&binder);

        assert!(!rows[0].top_line_visible);
        assert!(rows[0].bottom_line_visible);
        assert!(rows[1].top_line_visible);
        assert!(rows[1].bottom_line_visible);
        assert!(rows[2].top_line_visible);
        assert!(!rows[2].bottom_line_visible);
    }

    #[test]
    fn test_single_row_has_no_connector_lines() {
        let mut binder = StopListBinder::new(true);
        binder.update_data(vec![stop("A", "Only", "唯一")], &[]);

        let row = binder.render_row(0);
        assert!(!row.top_line_visible);
        assert!(!row.bottom_line_visible);
    }

    #[test]
    fn test_row_id_is_stop_id_not_position() {
        let binder = sample_binder();
        assert_eq!(binder.render_row(0).row_id, "A");
        assert_eq!(binder.render_row(2).row_id, "C");
    }

    #[test]
    fn test_tap_expands_then_collapses() {
        let mut binder = sample_binder();

        // A has entries 3 and 1; earliest is 1
        assert_eq!(binder.on_row_tapped(0).as_deref(), Some("1 min"));
        assert!(binder.render_row(0).expanded);
        assert_eq!(binder.render_row(0).eta_text.as_deref(), Some("1 min"));

        assert_eq!(binder.on_row_tapped(0), None);
        assert!(!binder.render_row(0).expanded);
        assert_eq!(binder.render_row(0).eta_text, None);
    }

    #[test]
    fn test_tap_results_cover_all_display_states() {
        let mut binder = sample_binder();

        // B only has a sentinel entry
        assert_eq!(binder.on_row_tapped(1).as_deref(), Some("No buses"));
        // C is absent from the index entirely
        assert_eq!(binder.on_row_tapped(2).as_deref(), Some("No ETA data"));

        let mut arriving = StopListBinder::new(true);
        arriving.update_data(vec![stop("A", "Gate", "閘口")], &[eta("A", 0), eta("A", 9)]);
        assert_eq!(arriving.on_row_tapped(0).as_deref(), Some("Arriving"));

        arriving.set_language(false);
        arriving.on_row_tapped(0);
        assert_eq!(arriving.on_row_tapped(0).as_deref(), Some("即將到站"));
    }

    #[test]
    fn test_expansion_is_keyed_by_stop_id() {
        let mut binder = sample_binder();
        binder.on_row_tapped(1);

        let rows = render_all(&binder);
        assert!(!rows[0].expanded);
        assert!(rows[1].expanded);
        assert!(!rows[2].expanded);

        // Rendering is a pure read; the state sticks across passes
        let again = render_all(&binder);
        assert_eq!(rows, again);
    }

    #[test]
    fn test_expansion_survives_language_change_but_not_update() {
        let mut binder = sample_binder();
        binder.on_row_tapped(0);

        binder.set_language(false);
        assert!(binder.render_row(0).expanded);
        assert_eq!(binder.render_row(0).eta_text.as_deref(), Some("1 分鐘"));

        binder.update_data(
            vec![stop("A", "Sau Mau Ping Central", "中秀茂坪")],
            &[eta("A", 2)],
        );
        assert!(!binder.render_row(0).expanded);
    }

    #[test]
    fn test_update_discards_previous_index() {
        let mut binder = sample_binder();

        binder.update_data(
            vec![
                stop("A", "Sau Mau Ping Central", "中秀茂坪"),
                stop("B", "Sau Ming House", "秀明樓"),
            ],
            &[eta("B", 4)],
        );

        assert_eq!(binder.row_count(), 2);
        // A's old entries are gone; B's sentinel was replaced by a real ETA
        assert_eq!(binder.on_row_tapped(0).as_deref(), Some("No ETA data"));
        assert_eq!(binder.on_row_tapped(1).as_deref(), Some("4 min"));
    }

    #[test]
    fn test_set_language_is_idempotent() {
        let mut binder = sample_binder();
        binder.on_row_tapped(0);

        binder.set_language(true);
        let first = render_all(&binder);
        binder.set_language(true);
        let second = render_all(&binder);

        assert_eq!(first, second);
    }

    #[test]
    fn test_generation_signals_rerender() {
        let mut binder = StopListBinder::new(true);
        let start = binder.generation();

        binder.update_data(vec![stop("A", "Gate", "閘口")], &[]);
        let after_update = binder.generation();
        assert!(after_update > start);

        binder.set_language(false);
        assert!(binder.generation() > after_update);

        // Taps repaint one row only; the full-list signal stays put
        let before_tap = binder.generation();
        binder.on_row_tapped(0);
        assert_eq!(binder.generation(), before_tap);
    }

    #[test]
    fn test_eta_entry_count_excludes_unkeyed_entries() {
        let mut binder = StopListBinder::new(true);
        binder.update_data(
            vec![stop("A", "Gate", "閘口")],
            &[eta("A", 1), eta("A", 2), eta("", 9)],
        );
        assert_eq!(binder.eta_entry_count(), 2);
    }

    #[test]
    #[should_panic]
    fn test_render_row_out_of_range_panics() {
        let binder = sample_binder();
        binder.render_row(3);
    }
}
