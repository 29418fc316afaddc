use std::path::Path;

use crate::shared::open_pdf;

pub fn run(file: &Path, json: bool) -> Result<(), i32> {
    let pdf = open_pdf(file)?;
    let page_count = pdf.page_count();

    if !json {
        println!("Pages: {page_count}");
    }

    let mut page_infos: Vec<serde_json::Value> = Vec::new();

    for entry in pdf.pages_iter() {
        let page = entry.map_err(|e| {
            eprintln!("Error: failed to read page: {e}");
            1
        })?;
        let number = page.page_number() + 1;

        if json {
            page_infos.push(serde_json::json!({
                "page": number,
                "width": page.width(),
                "height": page.height(),
                "rotation": page.rotation().degrees(),
            }));
        } else {
            println!(
                "Page {}: {:.2} x {:.2} pt (rotation {}°)",
                number,
                page.width(),
                page.height(),
                page.rotation().degrees()
            );
        }
    }

    if json {
        let output = serde_json::json!({
            "pages": page_count,
            "page_info": page_infos,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    }

    Ok(())
}
