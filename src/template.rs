use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::error::MailError;

/// Field name to value mapping supplied by the web layer for a lead or reservation.
pub type Fields = Map<String, Value>;

pub const LEAD_NOTIFICATION_HTML: &str = include_str!("../templates/lead_notification.html");
pub const LEAD_NOTIFICATION_TEXT: &str = include_str!("../templates/lead_notification.txt");
pub const RESERVATION_CONFIRMATION_HTML: &str =
    include_str!("../templates/reservation_confirmation.html");
pub const RESERVATION_CONFIRMATION_TEXT: &str =
    include_str!("../templates/reservation_confirmation.txt");

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder pattern compiles")
});

/// Substitutes `{{ name }}` placeholders with the matching field, verbatim.
///
/// A placeholder whose field is missing or null renders as an empty string.
/// Malformed template syntax is reported as [`MailError::Template`].
pub fn render_template(template: &str, fields: &Fields) -> Result<String, MailError> {
    let mut context = Context::new();
    for (key, value) in fields {
        context.insert(key.as_str(), &display_value(value).unwrap_or_default());
    }

    for captures in PLACEHOLDER.captures_iter(template) {
        let name = &captures[1];
        if !context.contains_key(name) {
            context.insert(name, "");
        }
    }

    Ok(Tera::one_off(template, &context, false)?)
}

/// Display form of a field; missing, null and blank values count as absent.
pub fn field_text(fields: &Fields, key: &str) -> Option<String> {
    display_value(fields.get(key)?).filter(|text| !text.trim().is_empty())
}

// Numbers keep their JSON form (`380.0` stays `380.0`) in bodies and subjects alike.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
