use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};

mod bullet_points;

pub use bullet_points::{BulletPointPrinter, StdoutLineWriter};

/// Ask for a non-empty value on the terminal
pub fn prompt(prompt: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Please enter a value")
            } else {
                Ok(())
            }
        })
        .interact_text()?)
}
