use anyhow::Result;
use locale_sync::{LocaleCatalog, LocaleRecord};

const MAX_NAME_WIDTH: usize = 35;

pub async fn run(catalog: &dyn LocaleCatalog, project_id: &str) -> Result<()> {
    let records = catalog.locales(project_id).await?;
    print_locale_table(&records);
    Ok(())
}

pub fn print_locale_table(records: &[LocaleRecord]) {
    for line in locale_table(records) {
        println!("{line}");
    }
    println!("\n{} locales", records.len());
}

fn locale_table(records: &[LocaleRecord]) -> Vec<String> {
    let id_width = records
        .iter()
        .map(|r| r.id.as_str().chars().count())
        .max()
        .unwrap_or(0);
    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    records
        .iter()
        .map(|r| {
            let code = if r.code.is_empty() { "-" } else { &r.code };
            format!(
                "  {:<id_width$}  {:<name_width$}  {}",
                r.id.as_str(),
                truncate(&r.name, name_width),
                code
            )
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
