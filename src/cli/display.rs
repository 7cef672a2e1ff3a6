use crate::file_processing::writer::ApplyReport;
use crate::models::{CodeProjectDirectives, ParsedResult};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use similar::TextDiff;
use std::path::Path;
use std::time::Duration;

/// Manages CLI display and output formatting.
pub struct CliDisplayManager {
    spinner: Option<ProgressBar>,
}

impl CliDisplayManager {
    /// Creates a new `CliDisplayManager`.
    pub fn new() -> Self {
        CliDisplayManager { spinner: None }
    }

    /// Prints the application header.
    pub fn print_header(&self) {
        println!("\n{}", "╭──────────────────────╮".bright_magenta());
        println!(
            "{}",
            format!("│  ◆ Z9 v{:<13}│", env!("CARGO_PKG_VERSION"))
                .bright_magenta()
                .bold()
        );
        println!("{}\n", "╰──────────────────────╯".bright_magenta());
    }

    pub fn print_prompt_start(&self, tree_lines: Option<usize>, has_image: bool) {
        let description = match tree_lines {
            Some(lines) => format!("Including project outline ({} entries)", lines),
            None => "No 'src' folder found, sending prompt without outline".to_string(),
        };
        self.print_section("📁", "[1/3] Building Prompt", &description);
        if has_image {
            self.print_info("Attaching image snapshot");
        }
    }

    pub fn print_query_start(&self) {
        self.print_section("⚓", "[2/3] Querying Completion API", "");
    }

    pub fn print_response_success(&self, chars: usize) {
        self.print_info(&format!("Received response ({} chars)", chars));
    }

    /// Prints the thinking trace, action summaries and requested directives.
    pub fn print_result(&self, result: &ParsedResult, project_root: &Path) {
        if let Some(error) = &result.error {
            println!("   {} {}", "✗".bright_red(), error.bright_red());
            return;
        }

        if let Some(thinking) = &result.thinking {
            self.print_section("💭", "Thinking", "");
            for line in thinking.lines() {
                println!("   {}", line.dimmed());
            }
        }

        if let Some(actions) = &result.actions {
            self.print_section("📋", "Actions", "");
            if actions.is_empty() {
                self.print_info("(none)");
            }
            for action in actions {
                println!(
                    "   {} {} {}",
                    "•".bright_yellow(),
                    action.name.bold(),
                    action.description.italic()
                );
            }
        }

        match &result.code_project {
            Some(directives) => self.print_directives(directives, project_root),
            None => {
                if result.thinking.is_none() && result.actions.is_none() {
                    if let Some(content) = &result.content {
                        println!("{}", content);
                    }
                }
            }
        }
    }

    fn print_directives(&self, directives: &CodeProjectDirectives, project_root: &Path) {
        self.print_section(
            "🧩",
            &format!("Code Project '{}'", directives.id),
            &format!("{} directive(s)", directives.len()),
        );

        for file in &directives.files {
            let current = std::fs::read_to_string(project_root.join(&file.path)).unwrap_or_default();
            println!("   {} {}", "write".bright_green().bold(), file.path);
            for line in render_diff(&file.path, &current, &file.content).lines() {
                print_diff_line(line);
            }
        }
        for edit in &directives.edits {
            println!("   {} {}", "edit".bright_blue().bold(), edit.path);
            for line in edit.instructions.lines() {
                println!("      {}", line.italic());
            }
        }
        for path in &directives.delete_files {
            println!("   {} {}", "delete".bright_red().bold(), path);
        }
        for file_move in &directives.move_files {
            println!(
                "   {} {} → {}",
                "move".bright_cyan().bold(),
                file_move.from,
                file_move.to
            );
        }
    }

    /// Prints the start of saving results.
    pub fn print_saving_results_start(&self) {
        self.print_section("💾", "[3/3] Saving Results", "");
    }

    pub fn print_saved_response(&self, path: &Path) {
        self.print_info(&format!("Saved response to '{}'", path.display()));
    }

    pub fn print_apply_report(&self, report: &ApplyReport) {
        self.print_info(&format!(
            "Applied {} directive(s), skipped {}",
            report.applied(),
            report.skipped
        ));
        for failure in &report.failures {
            println!("   {} {}", "✗".bright_red(), failure.bright_red());
        }
    }

    /// Prints the application footer.
    pub fn print_footer(&self, report: Option<&ApplyReport>, duration: Duration) {
        println!();
        if let Some(report) = report {
            println!(
                "{}",
                format!("⚡ Wrote {} file(s)", report.written)
                    .bright_white()
                    .dimmed(),
            );
            println!(
                "{}",
                format!(
                    "⚡ Queued {} edit(s), deleted {}, moved {}",
                    report.edited, report.deleted, report.moved
                )
                .bright_white()
                .dimmed(),
            );
        }
        println!(
            "{}",
            format!("⚡ Completed in {:.2?}", duration)
                .bright_white()
                .dimmed(),
        );
        println!();
    }

    /// Starts a spinner for ongoing operations.
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let template = format!(
            "   {} {{spinner}} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
        match ProgressStyle::with_template(&template) {
            Ok(style) => {
                spinner.set_style(
                    style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
                );
            }
            Err(e) => log::debug!("Falling back to default spinner style: {}", e),
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stops the spinner.
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Helper function to print a section header.
    fn print_section(&self, icon: &str, title: &str, description: &str) {
        println!("{} {}", icon.bright_yellow(), title.bright_cyan().bold());
        if !description.is_empty() {
            println!(
                "   {} {}",
                "→".bright_white(),
                description.italic().bright_white()
            );
        }
    }

    /// Helper function to print an informational message.
    fn print_info(&self, message: &str) {
        println!(
            "   {} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
    }
}

impl Default for CliDisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified diff of a file write against the file's current content.
pub fn render_diff(path: &str, current: &str, proposed: &str) -> String {
    TextDiff::from_lines(current, proposed)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", path), &format!("b/{}", path))
        .to_string()
}

fn print_diff_line(line: &str) {
    let styled = if line.starts_with("+++") || line.starts_with("---") {
        line.bold()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else if line.starts_with("@@") {
        line.cyan()
    } else {
        line.normal()
    };
    println!("      {}", styled);
}
