/// Formatter adapters rendering the notification email
mod email_report_formatter;

pub use email_report_formatter::EmailReportFormatter;
