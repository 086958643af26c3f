//! List rules command implementation.

use archives::rules;

/// Runs the list-rules command.
pub fn run() {
    for line in render() {
        println!("{line}");
    }
}

fn render() -> Vec<String> {
    let mut lines = vec![
        "Available rules:".to_string(),
        String::new(),
        format!("{:<6} {:<26} {:<9} Description", "Code", "Name", "Applies"),
        "-".repeat(80),
    ];
    lines.extend(rules::catalog().map(|rule| {
        format!(
            "{:<6} {:<26} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.kind().to_string(),
            rule.description()
        )
    }));
    lines.push(String::new());
    lines.push("Disable rules by code or name, e.g.:".to_string());
    lines.push("  archives check --disable F106,function-cc src/".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_rule() {
        let lines = render();
        for rule in rules::catalog() {
            assert!(
                lines.iter().any(|l| l.starts_with(rule.code())),
                "{} missing",
                rule.code()
            );
        }
        assert!(lines.iter().any(|l| l.contains("missing-arg")));
    }
}
