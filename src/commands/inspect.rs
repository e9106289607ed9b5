use anyhow::{anyhow, Result};
use std::path::Path;

use crate::bank::QuestionBank;
use crate::output::Layout;

pub fn validate(path: &Path) -> Result<()> {
    let bank = QuestionBank::open(path)?;
    let report = bank.validate();
    println!("{}", report);
    if report.is_valid() {
        println!(
            "{:?} is valid ({} questions)",
            path,
            bank.stats().total_questions()
        );
        Ok(())
    } else {
        Err(anyhow!("{:?} has {} error(s)", path, report.errors.len()))
    }
}

pub fn stats(path: &Path) -> Result<()> {
    let bank = QuestionBank::open(path)?;
    println!("{}", bank.stats());
    Ok(())
}

pub fn list_templates() -> String {
    let mut lines = vec!["Available Templates:".to_owned(), "=".repeat(50)];
    for layout in Layout::all() {
        lines.push(String::new());
        lines.push(layout.to_string());
    }
    lines.join("\n")
}
