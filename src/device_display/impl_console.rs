use crate::device_display::interface::DeviceDisplay;
use std::error::Error;

pub struct DeviceDisplayConsole {
    lines: Vec<String>,
    min_width: usize,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            min_width: 16,
        }
    }

    fn render_display(&self) -> String {
        let width = self
            .lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.min_width);

        let mut out = format!("┌{}┐\n", "─".repeat(width));
        if self.lines.is_empty() {
            out.push_str(&format!("│{}│\n", " ".repeat(width)));
        }
        for line in &self.lines {
            let padding = width - line.chars().count();
            out.push_str(&format!("│{}{}│\n", line, " ".repeat(padding)));
        }
        out.push_str(&format!("└{}┘", "─".repeat(width)));
        out
    }
}

impl Default for DeviceDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("{}", self.render_display());
        Ok(())
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lines = text.lines().map(str::to_string).collect();
        println!("{}", self.render_display());
        Ok(())
    }
}
