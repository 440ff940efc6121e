//! The `geoquiz categories` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use geoquiz_core::model::Category;

use super::controller_from_config;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (mut controller, _) = controller_from_config(config_path)?;

    if !controller.load_categories().await {
        anyhow::bail!(
            "{}",
            controller.error().unwrap_or("no categories available")
        );
    }

    println!("{}", category_table(controller.categories()));
    Ok(())
}

pub fn category_table(categories: &[Category]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Id", "Name", "Description"]);

    for (i, category) in categories.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&category.id),
            Cell::new(&category.name),
            Cell::new(&category.description),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_categories_in_order() {
        let categories = vec![
            Category {
                id: "rocks".into(),
                name: "Rochas".into(),
                description: "Tipos de rocha".into(),
            },
            Category {
                id: "plates".into(),
                name: "Placas".into(),
                description: "No description available".into(),
            },
        ];
        let rendered = category_table(&categories).to_string();
        let rocks = rendered.find("Rochas").unwrap();
        let plates = rendered.find("Placas").unwrap();
        assert!(rocks < plates);
        assert!(rendered.contains("Tipos de rocha"));
    }
}
