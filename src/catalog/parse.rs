//! Extraction functions, one per response schema.
//!
//! Each takes a response body (or an already parsed document) and returns the
//! typed value or a [`CatalogError`] saying why it could not.

use std::collections::HashSet;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::CatalogError;
use crate::models::{LicenseField, LicenseFieldOption, LicenseSummary};
use crate::xml::{XmlDocument, XmlElement, XmlError};

fn parse_body(operation: &'static str, body: &str) -> Result<XmlDocument, CatalogError> {
    XmlDocument::parse(body).map_err(|source| CatalogError::Parse { operation, source })
}

/// Identifiers of every `licenses/license` element, minus `excluded`.
///
/// Blank identifiers are skipped. Document order is preserved.
pub fn parse_license_ids(
    body: &str,
    excluded: &HashSet<String>,
) -> Result<Vec<String>, CatalogError> {
    let doc = parse_body("list_licenses", body)?;

    let ids = doc
        .select_children("licenses", "license")
        .into_iter()
        .filter_map(|e| e.attribute("id"))
        .map(str::trim)
        .filter(|id| !id.is_empty() && !excluded.contains(*id))
        .map(str::to_string)
        .collect();

    Ok(ids)
}

/// Build a [`LicenseSummary`] from a `licenseclass` response.
///
/// The summary takes `license_id` (the identifier that was requested), not
/// an attribute of the response.
pub fn parse_license_class(license_id: &str, body: &str) -> Result<LicenseSummary, CatalogError> {
    const OP: &str = "get_license";

    let doc = parse_body(OP, body)?;
    let class = doc
        .find("licenseclass")
        .ok_or_else(|| CatalogError::not_found(OP, "licenseclass"))?;

    let fields = class
        .children_named("field")
        .map(parse_field)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LicenseSummary {
        id: license_id.to_string(),
        label: text_value(class, "label"),
        fields,
    })
}

/// Trimmed text of the first `name` child; empty when the child is missing.
fn text_value(element: &XmlElement, name: &str) -> String {
    element
        .child_text(name)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn required_id(element: &XmlElement, node: &str) -> Result<String, CatalogError> {
    element
        .attribute("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CatalogError::not_found("get_license", node))
}

fn parse_field(field: &XmlElement) -> Result<LicenseField, CatalogError> {
    let options = field
        .children_named("enum")
        .map(parse_option)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LicenseField {
        id: required_id(field, "field/@id")?,
        label: text_value(field, "label"),
        description: text_value(field, "description"),
        options,
    })
}

fn parse_option(option: &XmlElement) -> Result<LicenseFieldOption, CatalogError> {
    Ok(LicenseFieldOption {
        id: required_id(option, "enum/@id")?,
        label: text_value(option, "label"),
        description: text_value(option, "description"),
    })
}

/// Text of the first non-blank `result/<child>` element.
fn result_value(doc: &XmlDocument, child: &str) -> Option<String> {
    doc.select_children("result", child)
        .into_iter()
        .map(|e| e.text().trim().to_string())
        .find(|value| !value.is_empty())
}

/// The issued license URI from a `result` response.
pub fn parse_license_uri(body: &str) -> Result<String, CatalogError> {
    const OP: &str = "resolve_license_uri";

    let doc = parse_body(OP, body)?;
    result_value(&doc, "license-uri").ok_or_else(|| CatalogError::not_found(OP, "result/license-uri"))
}

/// Human-readable license name from a details document.
///
/// Falls back to the license URI when the document carries no name.
pub fn license_name(doc: &XmlDocument) -> Option<String> {
    result_value(doc, "license-name").or_else(|| result_value(doc, "license-uri"))
}

/// Serialize `summary` back into the `licenseclass` shape it was parsed from.
pub fn license_class_xml(summary: &LicenseSummary) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Start(
        BytesStart::new("licenseclass").with_attributes([("id", summary.id.as_str())]),
    ))?;
    write_text_element(&mut writer, "label", &summary.label)?;

    for field in &summary.fields {
        writer.write_event(Event::Start(
            BytesStart::new("field").with_attributes([("id", field.id.as_str())]),
        ))?;
        write_text_element(&mut writer, "label", &field.label)?;
        write_text_element(&mut writer, "description", &field.description)?;

        for option in &field.options {
            writer.write_event(Event::Start(
                BytesStart::new("enum").with_attributes([("id", option.id.as_str())]),
            ))?;
            write_text_element(&mut writer, "label", &option.label)?;
            write_text_element(&mut writer, "description", &option.description)?;
            writer.write_event(Event::End(BytesEnd::new("enum")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("field")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("licenseclass")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const STANDARD_CLASS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<licenseclass id="standard">
  <label>Creative Commons</label>
  <field id="commercial">
    <label>Allow commercial uses of your work?</label>
    <description>The licensor permits others to copy and distribute the work.</description>
    <type>enum</type>
    <enum id="y">
      <label>Yes</label>
      <description>Commercial use allowed</description>
    </enum>
    <enum id="n">
      <label>No</label>
      <description>Non-commercial use only</description>
    </enum>
  </field>
  <field id="derivatives">
    <label>Allow modifications of your work?</label>
    <description>Adaptations &amp; remixes</description>
    <enum id="y"><label>Yes</label><description/></enum>
    <enum id="sa"><label>ShareAlike</label><description/></enum>
    <enum id="n"><label>No</label><description/></enum>
  </field>
</licenseclass>"#;

    fn no_exclusions() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_parse_license_ids_applies_exclusions_in_order() {
        let body = r#"<licenses>
  <license id="standard">Creative Commons</license>
  <license id="recombo">Sampling</license>
  <license id="publicdomain">Public Domain</license>
  <license id="mark">Public Domain Mark</license>
  <license id="zero">CC0</license>
</licenses>"#;
        let excluded: HashSet<String> = ["recombo", "mark"].iter().map(|s| s.to_string()).collect();

        let ids = parse_license_ids(body, &excluded).unwrap();
        assert_eq!(ids, vec!["standard", "publicdomain", "zero"]);
    }

    #[test]
    fn test_parse_license_ids_skips_blank_ids() {
        let body = r#"<licenses><license id=""/><license/><license id="standard"/></licenses>"#;
        let ids = parse_license_ids(body, &no_exclusions()).unwrap();
        assert_eq!(ids, vec!["standard"]);
    }

    #[test]
    fn test_parse_license_ids_malformed() {
        let err = parse_license_ids("<licenses><license id=\"a\">", &no_exclusions()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_license_class() {
        let summary = parse_license_class("standard", STANDARD_CLASS).unwrap();
        assert_eq!(summary.id, "standard");
        assert_eq!(summary.label, "Creative Commons");
        assert_eq!(summary.fields.len(), 2);

        let commercial = &summary.fields[0];
        assert_eq!(commercial.id, "commercial");
        assert_eq!(commercial.label, "Allow commercial uses of your work?");
        assert_eq!(commercial.options.len(), 2);
        assert_eq!(commercial.options[1].id, "n");
        assert_eq!(commercial.options[1].description, "Non-commercial use only");

        let derivatives = &summary.fields[1];
        assert_eq!(derivatives.description, "Adaptations & remixes");
        let option_ids: Vec<_> = derivatives.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(option_ids, vec!["y", "sa", "n"]);
        assert_eq!(derivatives.options[0].description, "");
    }

    #[test]
    fn test_parse_license_class_label_with_markup() {
        let body = r#"<licenseclass>
  <label> Creative Commons </label>
  <field id="commercial">
    <label>Allow <em>commercial</em> uses?</label>
    <description>Others may <strong>sell</strong> copies.</description>
  </field>
</licenseclass>"#;
        let summary = parse_license_class("standard", body).unwrap();
        assert_eq!(summary.label, "Creative Commons");
        assert_eq!(summary.fields[0].label, "Allow commercial uses?");
        assert_eq!(summary.fields[0].description, "Others may sell copies.");
    }

    #[test]
    fn test_parse_license_class_without_fields() {
        let body = "<licenseclass id=\"publicdomain\"><label>Public Domain</label></licenseclass>";
        let summary = parse_license_class("publicdomain", body).unwrap();
        assert_eq!(summary.label, "Public Domain");
        assert!(summary.fields.is_empty());
    }

    #[test]
    fn test_parse_license_class_missing_class() {
        let err = parse_license_class("standard", "<error>unknown class</error>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_parse_license_class_field_without_id() {
        let body = "<licenseclass><label>x</label><field><label>q</label></field></licenseclass>";
        let err = parse_license_class("standard", body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_license_class_round_trip() {
        let summary = parse_license_class("standard", STANDARD_CLASS).unwrap();
        let xml = license_class_xml(&summary).unwrap();
        let reparsed = parse_license_class("standard", &xml).unwrap();
        assert_eq!(reparsed, summary);
    }

    #[test]
    fn test_parse_license_uri() {
        let body = r#"<result>
  <license-uri>http://creativecommons.org/licenses/by-sa/4.0/</license-uri>
  <license-name>Attribution-ShareAlike 4.0 International</license-name>
</result>"#;
        assert_eq!(
            parse_license_uri(body).unwrap(),
            "http://creativecommons.org/licenses/by-sa/4.0/"
        );
    }

    #[test]
    fn test_parse_license_uri_missing_or_blank() {
        let missing = parse_license_uri("<result><license-name>x</license-name></result>").unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let blank = parse_license_uri("<result><license-uri>   </license-uri></result>").unwrap_err();
        assert_eq!(blank.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_license_name_falls_back_to_uri() {
        let named = XmlDocument::parse(
            "<result><license-uri>u</license-uri><license-name>Attribution 4.0</license-name></result>",
        )
        .unwrap();
        assert_eq!(license_name(&named).as_deref(), Some("Attribution 4.0"));

        let unnamed = XmlDocument::parse("<result><license-uri>u</license-uri></result>").unwrap();
        assert_eq!(license_name(&unnamed).as_deref(), Some("u"));

        let empty = XmlDocument::parse("<result/>").unwrap();
        assert!(license_name(&empty).is_none());
    }
}
