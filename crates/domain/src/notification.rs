use crate::reminder::Reminder;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Escapes text for use inside HTML or XML documents
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn email_content(reminder: &Reminder) -> EmailContent {
    let title = or_default(&reminder.title, "No Title");
    let due_at = reminder.due_at.format("%a, %d %b %Y %H:%M UTC");

    let html = format!(
        "<h2>{}</h2>\
         <p><strong>Message:</strong> {}</p>\
         <p><strong>Category:</strong> {}</p>\
         <p><strong>Due:</strong> {}</p>",
        escape_markup(title),
        escape_markup(or_default(&reminder.message, "No message")),
        escape_markup(or_default(&reminder.category, "No category")),
        due_at,
    );

    EmailContent {
        subject: format!("Reminder: {}", title),
        html,
    }
}

/// Plain text body for SMS. The reply instruction is handled by the inbound
/// reply webhook.
pub fn sms_body(reminder: &Reminder) -> String {
    format!(
        "Reminder title: {}\nMessage: {}\nCategory: {}\nFrequency: Once\nReply with \"Done\" to mark as complete",
        or_default(&reminder.title, "No Title"),
        reminder.message.trim(),
        reminder.category.trim(),
    )
}

/// TwiML document read out to the callee
pub fn voice_twiml(reminder: &Reminder) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
  <Say voice="Polly.Amy">Your reminder named {} with message of: {} under the category {} was triggered. Bye.</Say>
  <Hangup/>
</Response>"#,
        escape_markup(or_default(&reminder.title, "No Title")),
        escape_markup(or_default(&reminder.message, "No message")),
        escape_markup(or_default(&reminder.category, "No category")),
    )
}
