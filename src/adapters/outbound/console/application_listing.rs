use crate::credential_audit::domain::{ApplicationView, CredentialSummary, NotificationItem};
use owo_colors::{OwoColorize, Style};
use std::fmt::Write;

/// Days left at or below which a credential is highlighted as urgent
const URGENT_DAYS: i64 = 5;

/// Renders applications as an indented plain-text listing for the terminal
pub struct ApplicationListing {
    colored: bool,
}

impl ApplicationListing {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn render(&self, views: &[ApplicationView]) -> String {
        if views.is_empty() {
            return "No matching applications.\n".to_string();
        }

        let mut out = String::new();
        for item in NotificationItem::from_views(views) {
            let _ = writeln!(
                out,
                "{} ({})",
                self.paint(&item.application_name, Style::new().bold()),
                item.application_id
            );
            if item.credentials.is_empty() {
                let _ = writeln!(out, "  no credentials");
            }
            for credential in &item.credentials {
                let _ = writeln!(
                    out,
                    "  {:<20} {}: {} (expires {})",
                    self.status(credential),
                    credential.credential_type,
                    credential.display_name(),
                    credential.formatted_expiration()
                );
            }
        }

        let _ = writeln!(out, "\n{} application(s)", views.len());
        out
    }

    fn status(&self, credential: &CredentialSummary) -> String {
        let style = if credential.is_expired {
            Style::new().red().bold()
        } else if credential.days_remaining <= URGENT_DAYS {
            Style::new().yellow()
        } else {
            Style::new().green()
        };
        self.paint(&credential.status_label(), style)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.colored {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}
