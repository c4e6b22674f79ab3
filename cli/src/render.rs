use crate::logger::Logger;
use indicatif::ProgressBar;
use stackformation_engine::stack::{StackEvent, StackStatus, StatusStyle};
use stackformation_engine::{EventSink, Outcome};
use std::collections::BTreeMap;
use tabled::settings::{peaker::Priority, Style, Width};
use tabled::{Table, Tabled};

/// Width event tables are wrapped at, the widest column shrinks first
const TABLE_WIDTH: usize = 80;

/// Status colored by what it means for the stack
pub fn status(status: &StackStatus) -> String {
    let styled = console::style(status.as_str());

    let styled = match status.style() {
        StatusStyle::Warning => styled.yellow(),
        StatusStyle::Success => styled.green(),
        StatusStyle::Error => styled.red(),
        StatusStyle::Plain => styled,
    };

    styled.to_string()
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Logical ID")]
    logical_resource_id: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&StackEvent> for EventRow {
    fn from(event: &StackEvent) -> Self {
        Self {
            status: status(&event.status),
            resource_type: event.resource_type.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            reason: event.reason.clone().unwrap_or_default(),
        }
    }
}

fn event_table(rows: Vec<EventRow>) -> String {
    let mut table = Table::new(rows);

    table
        .with(Style::modern())
        .with(Width::wrap(TABLE_WIDTH).priority(Priority::max(true)));

    table.to_string()
}

/// Key/value pairs right-aligned on the key
pub fn key_values(values: &BTreeMap<String, String>) -> String {
    values
        .iter()
        .map(|(key, value)| format!("{key:>30}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shows the progress of an observed stack in the terminal
///
/// Events found in one poll are printed together as a table above the spinner.
pub struct ConsoleSink {
    spinner: ProgressBar,
    pending: Vec<EventRow>,
}

impl ConsoleSink {
    pub fn new(stack: &str) -> Self {
        Self {
            spinner: Logger::spinner(&format!("Observing {stack}...")),
            pending: vec![],
        }
    }

    fn println(&self, line: &str) {
        if let Err(e) = Logger::multi_progress().println(line) {
            log::error!("Failed to print: {e:?}");
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let table = event_table(std::mem::take(&mut self.pending));
        self.println(&table);
    }
}

impl EventSink for ConsoleSink {
    fn polling(&mut self, stack_status: &StackStatus) {
        self.flush();

        self.spinner
            .set_message(format!("Polling... (Status: {})", status(stack_status)));
    }

    fn event(&mut self, event: &StackEvent) {
        self.pending.push(event.into());
    }

    fn finished(&mut self, stack_status: &StackStatus, outcome: Outcome) {
        self.flush();
        self.spinner.finish_and_clear();

        let title = match outcome {
            Outcome::Success => console::style("Completed").green().bold(),
            Outcome::Failure => console::style("Error!").red().bold(),
        };

        println!("\n{title}\n{} {}", console::style("Status:").dim(), status(stack_status));
    }

    fn outputs(&mut self, outputs: &BTreeMap<String, String>) {
        if outputs.is_empty() {
            return;
        }

        println!("\n{}\n{}", console::style("Outputs").bold(), key_values(outputs));
    }
}

impl Drop for ConsoleSink {
    /// Don't leave the spinner behind when the observation is aborted
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
