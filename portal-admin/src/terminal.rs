use std::io::{self, BufRead, Write};
use std::time::Duration;

use content_core::nav::{CustomTargetAction, FocusTarget};
use content_core::{NavigationHost, Notice, Operator};

fn prompt(question: &str) -> Option<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{} ", question).ok()?;
    stderr.flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    Some(line.trim().to_string())
}

fn describe(target: &FocusTarget) -> String {
    match &target.id {
        Some(id) => format!("<{} id=\"{}\"> {}", target.tag, id, target.text),
        None => format!("<{}> {}", target.tag, target.text),
    }
}

/// Operator on the controlling terminal: notices go to stderr, confirmations
/// are read from stdin. `assume_yes` answers every confirmation.
pub struct TerminalOperator {
    pub assume_yes: bool,
}

impl Operator for TerminalOperator {
    fn notify(&mut self, notice: &Notice) {
        let tag = match notice {
            Notice::Info(_) => "info",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        };
        eprintln!("[{}] {}", tag, notice.message());
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        prompt(&format!("{} [y/N]", question))
            .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Reports navigation effects on stderr; asks on stdin for free-text targets.
pub struct TerminalHost;

impl NavigationHost for TerminalHost {
    fn scroll_into_view(&mut self, target: &FocusTarget) {
        eprintln!("-> {}", describe(target));
    }

    fn highlight(&mut self, target: &FocusTarget, hold: Duration) {
        eprintln!(
            "   highlighted {} for {} ms",
            target.tag,
            hold.as_millis()
        );
    }

    fn open_external(&mut self, url: &str) {
        eprintln!("open externally: {}", url);
    }

    fn choose_action(&mut self, target: &str, label: &str) -> CustomTargetAction {
        eprintln!("'{}' ({}) is not an anchor or URL.", target, label);
        eprintln!("  1) create a section  2) search content  3) open as link  4) cancel");
        match prompt("choice:").as_deref() {
            Some("1") => CustomTargetAction::CreateSection,
            Some("2") => CustomTargetAction::SearchContent,
            Some("3") => CustomTargetAction::OpenExternal,
            _ => CustomTargetAction::Cancel,
        }
    }

    fn report_not_found(&mut self, query: &str) {
        eprintln!("no heading matches '{}'", query);
    }
}
