//! Terminal output styling for edgeops
//!
//! Check results use emoji markers so the report reads the same with or
//! without colour support.

use owo_colors::OwoColorize;

/// Print a passing check or completed action
pub fn success(message: &str) {
    println!("✅ {}", message.bright_white());
}

/// Print a failing check or failed action
pub fn error(message: &str) {
    // Pastel coral/salmon: RGB(255, 160, 160)
    eprintln!("❌ {}", message.truecolor(255, 160, 160));
}

/// Print a soft failure
pub fn warning(message: &str) {
    // Pastel cream/yellow: RGB(255, 230, 160)
    println!("⚠️  {}", message.truecolor(255, 230, 160));
}

/// Print an info message
pub fn info(message: &str) {
    println!("ℹ️  {}", message.bright_white());
}

/// Print a section header with a separator line
pub fn section(title: &str) {
    // Pastel lavender: RGB(181, 174, 254)
    println!("\n{}", title.truecolor(181, 174, 254).bold());
    // Brighter grey: RGB(160, 160, 160)
    println!("{}", "─".repeat(50).truecolor(160, 160, 160));
}

/// Print a small section header without separator
pub fn subsection(title: &str) {
    // Softer pastel teal: RGB(120, 180, 195)
    println!("\n{}", title.truecolor(120, 180, 195));
    println!("{}", "·".repeat(30).truecolor(160, 160, 160));
}

/// Print a key-value pair with styled key and value
pub fn key_value(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).truecolor(160, 160, 160),
        value.bright_white()
    );
}

/// Print a key-value pair where the value is highlighted
pub fn key_value_highlight(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).truecolor(160, 160, 160),
        value.truecolor(120, 180, 195).bold()
    );
}

/// Print a dimmed/muted message
pub fn dimmed(message: &str) {
    println!("   {}", message.truecolor(160, 160, 160));
}

/// Print a blank line for spacing
pub fn blank() {
    println!();
}

/// Print a command suggestion
pub fn command_suggestion(description: &str, command: &str) {
    println!(
        "   {} {}",
        description.truecolor(160, 160, 160),
        command.truecolor(255, 230, 160).bold()
    );
}

/// Print next steps section
pub fn next_steps(steps: &[String]) {
    subsection("Next steps");
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  {} {}",
            format!("{}.", i + 1).truecolor(181, 174, 254),
            step.bright_white()
        );
    }
}
