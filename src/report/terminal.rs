use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use license_catalog::models::{Catalog, LicenseSummary};

/// Print license class identifiers, one per line.
pub fn render_ids(ids: &[String], locale: &str, quiet: bool) {
    if !quiet {
        println!(
            "\n {} license classes offered for locale {}\n",
            ids.len().to_string().bold(),
            locale.cyan()
        );
    }
    for id in ids {
        println!("{}", id);
    }
}

/// Render a full catalog: summary box, one table per license class, then
/// the identifiers that could not be retrieved.
pub fn render_catalog(catalog: &Catalog, locale: &str, quiet: bool) {
    let field_count: usize = catalog.licenses.iter().map(|l| l.fields.len()).sum();

    if quiet {
        println!(
            "Licenses: {}  Questions: {}  Failed: {}",
            catalog.licenses.len().to_string().green(),
            field_count,
            catalog.failed.len().to_string().red(),
        );
        return;
    }

    println!(
        "\n {} v{}",
        "license-catalog".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Locale: {}\n", locale);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("{}  License classes : {:>4}", "✓".green(), catalog.licenses.len())
    );
    println!(
        " │  {:<48} │",
        format!("   Questions       : {:>4}", field_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Failed          : {:>4}", "✗".red(), catalog.failed.len())
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    for license in &catalog.licenses {
        render_license(license);
    }

    if !catalog.is_complete() {
        println!(
            " {} Could not retrieve: {}\n",
            "[ERROR]".red().bold(),
            catalog.failed.join(", ")
        );
    }
}

/// Render one license class and its questions.
pub fn render_license(license: &LicenseSummary) {
    println!(
        " {} {} ({})\n",
        "■".cyan(),
        license.label.bold(),
        license.id
    );

    if license.fields.is_empty() {
        println!("   {}\n", "No questions; the license is issued as is.".dimmed());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Question").add_attribute(Attribute::Bold),
            Cell::new("Answers").add_attribute(Attribute::Bold),
        ]);

    for field in &license.fields {
        let options: Vec<String> = field
            .options
            .iter()
            .map(|o| format!("{} = {}", o.id, o.label))
            .collect();

        table.add_row(vec![
            Cell::new(&field.id).fg(Color::Cyan),
            Cell::new(&field.label),
            Cell::new(options.join("\n")),
        ]);
    }

    println!("{}\n", table);
}
