//! List tags command implementation.

use archives::tags;

/// Runs the list-tags command.
pub fn run() {
    for line in render() {
        println!("{line}");
    }
}

fn render() -> Vec<String> {
    let mut lines = vec![
        "Docstring tags:".to_string(),
        String::new(),
        format!("{:<9} {:<8} Description", "Tag", "Payload"),
        "-".repeat(80),
    ];
    lines.extend(tags::catalog().map(|tag| {
        let repeat = if tag.is_repeatable() { " (repeatable)" } else { "" };
        format!(
            "{:<9} {:<8} {}{repeat}",
            tag.usage(),
            tag.arity().to_string(),
            tag.description()
        )
    }));
    lines
}
