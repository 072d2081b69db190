use crate::credential_audit::domain::{CredentialSummary, NotificationItem};
use crate::ports::outbound::{NotificationFormatter, RenderedReport};

/// Colour of the status cell per urgency band
const EXPIRED_COLOR: &str = "#dc3545";
const URGENT_COLOR: &str = "#fd7e14";
const WARNING_COLOR: &str = "#ffc107";

/// Credentials within this many days are shown as urgent
const URGENT_DAYS: i64 = 3;

/// EmailReportFormatter adapter rendering the expiration report email
///
/// Both bodies walk the items in the given order and print the same four
/// fields per credential: status, type, name and expiration.
pub struct EmailReportFormatter;

impl EmailReportFormatter {
    pub fn new() -> Self {
        Self
    }

    fn subject(items: &[NotificationItem]) -> String {
        let noun = if items.len() == 1 {
            "application"
        } else {
            "applications"
        };
        format!(
            "[credwatch] {} {} with expiring credentials",
            items.len(),
            noun
        )
    }

    fn status_color(credential: &CredentialSummary) -> &'static str {
        if credential.is_expired {
            EXPIRED_COLOR
        } else if credential.days_remaining <= URGENT_DAYS {
            URGENT_COLOR
        } else {
            WARNING_COLOR
        }
    }
}

impl Default for EmailReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper methods for rendering each body
impl EmailReportFormatter {
    fn render_html(&self, items: &[NotificationItem]) -> String {
        let mut sections = String::new();

        for item in items {
            sections.push_str(&format!(
                "<h3>{} <span class=\"app-id\">({})</span></h3>\n",
                html_escape(&item.application_name),
                html_escape(&item.application_id)
            ));
            sections.push_str(
                "<table>\n<tr><th>Status</th><th>Type</th><th>Name</th><th>Expires</th></tr>\n",
            );
            for credential in &item.credentials {
                sections.push_str(&format!(
                    "<tr><td style=\"color: {}\"><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    Self::status_color(credential),
                    html_escape(&credential.status_label()),
                    html_escape(credential.credential_type),
                    html_escape(credential.display_name()),
                    html_escape(&credential.formatted_expiration())
                ));
            }
            sections.push_str("</table>\n");
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 720px; margin: 0 auto; padding: 20px; }}
        .header {{ background: #343a40; color: white; padding: 20px; border-radius: 5px 5px 0 0; }}
        .content {{ background: #f9f9f9; padding: 20px; border-radius: 0 0 5px 5px; }}
        h1 {{ margin: 0; font-size: 22px; }}
        h3 {{ color: #555; margin-top: 20px; }}
        .app-id {{ color: #888; font-size: 12px; font-weight: normal; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ text-align: left; padding: 4px 8px; border-bottom: 1px solid #ddd; }}
        .footer {{ text-align: center; margin-top: 20px; color: #666; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Credential Expiration Report</h1>
        </div>
        <div class="content">
            <p>{} application(s) have credentials that are expired or about to expire.</p>
{}        </div>
        <div class="footer">Generated by credwatch</div>
    </div>
</body>
</html>"#,
            items.len(),
            sections
        )
    }

    fn render_text(&self, items: &[NotificationItem]) -> String {
        let mut body = String::new();
        body.push_str("Credential Expiration Report\n");
        body.push_str("============================\n\n");
        body.push_str(&format!(
            "{} application(s) have credentials that are expired or about to expire.\n",
            items.len()
        ));

        for item in items {
            body.push_str(&format!(
                "\n{} ({})\n",
                item.application_name, item.application_id
            ));
            for credential in &item.credentials {
                body.push_str(&format!(
                    "  - [{}] {}: {} (expires {})\n",
                    credential.status_label(),
                    credential.credential_type,
                    credential.display_name(),
                    credential.formatted_expiration()
                ));
            }
        }

        body.push_str("\n---\nGenerated by credwatch");
        body
    }
}

impl NotificationFormatter for EmailReportFormatter {
    fn render(&self, items: &[NotificationItem]) -> RenderedReport {
        RenderedReport {
            subject: Self::subject(items),
            html_body: self.render_html(items),
            text_body: self.render_text(items),
        }
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn credential(kind: &'static str, name: Option<&str>, days: i64) -> CredentialSummary {
        CredentialSummary {
            credential_type: kind,
            name: name.map(str::to_string),
            expires_at: Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 0).unwrap(),
            days_remaining: days,
            is_expired: days <= 0,
        }
    }

    fn items() -> Vec<NotificationItem> {
        vec![
            NotificationItem {
                application_name: "Payroll <API>".to_string(),
                application_id: "app-1".to_string(),
                credentials: vec![
                    credential("Secret", Some("deploy"), 5),
                    credential("Certificate", None, -2),
                ],
            },
            NotificationItem {
                application_name: "Billing".to_string(),
                application_id: "app-2".to_string(),
                credentials: vec![credential("Secret", Some("ci"), 1)],
            },
        ]
    }

    #[test]
    fn test_subject_embeds_count() {
        let report = EmailReportFormatter::new().render(&items());
        assert_eq!(
            report.subject,
            "[credwatch] 2 applications with expiring credentials"
        );

        let single = EmailReportFormatter::new().render(&items()[..1]);
        assert!(single.subject.contains("1 application with"));
    }

    #[test]
    fn test_text_body_lists_every_credential() {
        let text = EmailReportFormatter::new().render(&items()).text_body;

        assert!(text.contains("Payroll <API> (app-1)"));
        assert!(text.contains("[Expires in 5 days] Secret: deploy (expires 2026-03-14 15:09 UTC)"));
        assert!(text.contains("[EXPIRED] Certificate: Unnamed"));
        assert!(text.contains("[Expires in 1 day] Secret: ci"));
    }

    #[test]
    fn test_html_body_escapes_names() {
        let html = EmailReportFormatter::new().render(&items()).html_body;

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Payroll &lt;API&gt;"));
        assert!(!html.contains("Payroll <API>"));
        assert!(html.contains(EXPIRED_COLOR));
    }

    #[test]
    fn test_bodies_are_content_equivalent() {
        let report = EmailReportFormatter::new().render(&items());

        let mut html_cursor = 0;
        let mut text_cursor = 0;
        for item in items() {
            for credential in &item.credentials {
                for field in [
                    credential.status_label(),
                    credential.credential_type.to_string(),
                    credential.display_name().to_string(),
                    credential.formatted_expiration(),
                ] {
                    let escaped = html_escape(&field);
                    let in_html = report.html_body[html_cursor..]
                        .find(&escaped)
                        .expect("field missing from html body");
                    let in_text = report.text_body[text_cursor..]
                        .find(&field)
                        .expect("field missing from text body");
                    html_cursor += in_html;
                    text_cursor += in_text;
                }
            }
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"x'\""), "&quot;x&#39;&quot;");
    }
}
