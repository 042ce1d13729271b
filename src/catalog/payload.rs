use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;

use crate::error::CatalogError;
use crate::models::AnswerSet;

/// Name of the multipart text part carrying the answers document.
pub const ANSWERS_PART: &str = "answers";

static XML_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9._-]*$").expect("valid XML name pattern"));

/// Build the answers document posted to `/license/{id}/issue`:
///
/// ```text
/// <answers> <locale>{locale}</locale><license-{id}>{answers}</license-{id}></answers>
/// ```
///
/// Each answer becomes `<field>value</field>` in [`AnswerSet`] order. Values
/// are escaped; field identifiers must be valid XML element names.
pub fn answer_payload(
    license_id: &str,
    locale: &str,
    answers: &AnswerSet,
) -> Result<String, CatalogError> {
    let class_element = format!("license-{}", license_id);
    if !XML_NAME.is_match(&class_element) {
        return Err(CatalogError::InvalidLicenseId {
            id: license_id.to_string(),
        });
    }

    let mut body = String::new();
    for (field, value) in answers.iter() {
        if !XML_NAME.is_match(field) {
            return Err(CatalogError::InvalidAnswer {
                key: field.to_string(),
            });
        }
        body.push_str(&format!("<{0}>{1}</{0}>", field, escape(value)));
    }

    Ok(format!(
        "<answers> <locale>{locale}</locale><{class}>{body}</{class}></answers>",
        locale = escape(locale),
        class = class_element,
        body = body,
    ))
}
