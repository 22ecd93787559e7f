//! Sizing Module — Intrinsic content per component kind.
//!
//! Responsibilities:
//! - Produce the text lines a leaf widget displays
//! - Derive the intrinsic content size (widest line x line count)
//!
//! Border and padding are not included; the box model adds them.

use serde::{Deserialize, Serialize};

use crate::text_utils::{display_width, split_lines};
use crate::types::{format_number, WidgetContent};

/// Explicit intrinsic-size policy. Every field has a default so a partial
/// JSON object is a valid table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingTable {
    /// Spaces on each side of a button label.
    pub button_label_padding: u16,
    /// Bar cells between `[` and `]`.
    pub progress_bar_width: u16,
    /// Item lines shown for List/Select/Menu before `... +N more`.
    pub max_visible_items: usize,
    pub input_placeholder: String,
    pub spinner_frame: String,
    pub item_bullet: String,
}

impl Default for SizingTable {
    fn default() -> Self {
        Self {
            button_label_padding: 1,
            progress_bar_width: 20,
            max_visible_items: 5,
            input_placeholder: "___________".to_string(),
            spinner_frame: "⣾".to_string(),
            item_bullet: "•".to_string(),
        }
    }
}

impl SizingTable {
    /// Lines a widget displays. Containers have none.
    pub fn content_lines(&self, widget: &WidgetContent) -> Vec<String> {
        match widget {
            WidgetContent::Container => Vec::new(),
            WidgetContent::Text { content } => {
                split_lines(content).into_iter().map(str::to_string).collect()
            }
            WidgetContent::Button {
                label,
                icon_left,
                icon_right,
                number,
                separated,
            } => vec![self.button_line(label, icon_left, icon_right, *number, *separated)],
            WidgetContent::TextInput { placeholder } => {
                let shown = placeholder.as_deref().unwrap_or(&self.input_placeholder);
                vec![format!("[{shown}]")]
            }
            WidgetContent::Checkbox { label, checked } => {
                vec![format!("[{}] {label}", if *checked { '✓' } else { ' ' })]
            }
            WidgetContent::Radio { label, checked } => {
                vec![format!("({}) {label}", if *checked { '•' } else { ' ' })]
            }
            WidgetContent::ProgressBar { value, max } => vec![self.progress_line(*value, *max)],
            WidgetContent::Spinner { label } => vec![format!("{} {label}", self.spinner_frame)],
            WidgetContent::Items { items } => {
                let mut lines: Vec<String> = items
                    .iter()
                    .take(self.max_visible_items)
                    .map(|item| format!("{} {item}", self.item_bullet))
                    .collect();
                if items.len() > self.max_visible_items {
                    lines.push(format!("... +{} more", items.len() - self.max_visible_items));
                }
                lines
            }
            WidgetContent::Other { tag } => vec![tag.clone()],
        }
    }

    /// Intrinsic content size as (width, height) in cells.
    pub fn content_size(&self, widget: &WidgetContent) -> (u16, u16) {
        let lines = self.content_lines(widget);
        let width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
        (clamp_cells(width), clamp_cells(lines.len()))
    }

    fn button_line(
        &self,
        label: &str,
        icon_left: &Option<String>,
        icon_right: &Option<String>,
        number: Option<f64>,
        separated: bool,
    ) -> String {
        let right = icon_right
            .as_deref()
            .map(|icon| format!(" {icon}"))
            .unwrap_or_default();

        if let (true, Some(icon)) = (separated, icon_left) {
            let left = match number {
                Some(n) => format!("{icon} {}", format_number(n)),
                None => icon.clone(),
            };
            return format!("{left} │ {label}{right}");
        }

        let pad = " ".repeat(self.button_label_padding as usize);
        let left = icon_left
            .as_deref()
            .map(|icon| format!("{icon} "))
            .unwrap_or_default();
        format!("{pad}{left}{label}{right}{pad}")
    }

    fn progress_line(&self, value: f64, max: f64) -> String {
        let width = usize::from(self.progress_bar_width);
        let ratio = if max == 0.0 { 0.0 } else { value / max };
        let filled = (ratio * width as f64).floor().clamp(0.0, width as f64) as usize;
        format!(
            "[{}{}] {}/{}",
            "█".repeat(filled),
            "░".repeat(width - filled),
            format_number(value),
            format_number(max)
        )
    }
}

fn clamp_cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentNode, ComponentType};
    use serde_json::json;

    fn lines_of(node: &ComponentNode) -> Vec<String> {
        SizingTable::default().content_lines(&node.widget())
    }

    #[test]
    fn test_button_lines() {
        let ok = ComponentNode::new("b", ComponentType::Button).with_prop("label", "OK");
        assert_eq!(lines_of(&ok), vec![" OK "]);
        assert_eq!(SizingTable::default().content_size(&ok.widget()), (4, 1));

        let separated = ComponentNode::new("b", ComponentType::Button)
            .with_prop("label", "Inbox")
            .with_prop("iconLeft", "✉")
            .with_prop("iconLeftEnabled", true)
            .with_prop("number", 3)
            .with_prop("separated", true);
        assert_eq!(lines_of(&separated), vec!["✉ 3 │ Inbox"]);
    }

    #[test]
    fn test_progress_bar_line() {
        let bar = ComponentNode::new("p", ComponentType::ProgressBar)
            .with_prop("value", 50)
            .with_prop("max", 100);
        let line = &lines_of(&bar)[0];
        assert_eq!(line, &format!("[{}{}] 50/100", "█".repeat(10), "░".repeat(10)));
        assert_eq!(display_width(line), 29);
    }

    #[test]
    fn test_item_lines_truncate() {
        let list = ComponentNode::new("l", ComponentType::List)
            .with_prop("items", json!(["a", "b", "c", "d", "e", "f", "g"]));
        let lines = lines_of(&list);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "• a");
        assert_eq!(lines[5], "... +2 more");
    }

    #[test]
    fn test_simple_leaves() {
        let input = ComponentNode::new("i", ComponentType::TextInput);
        assert_eq!(lines_of(&input), vec!["[___________]"]);

        let check = ComponentNode::new("c", ComponentType::Checkbox).with_prop("checked", true);
        assert_eq!(lines_of(&check), vec!["[✓] Checkbox"]);

        let spinner = ComponentNode::new("s", ComponentType::Spinner);
        assert_eq!(lines_of(&spinner), vec!["⣾ Loading..."]);

        let text = ComponentNode::new("t", ComponentType::Text).with_prop("content", "one\nthree");
        assert_eq!(SizingTable::default().content_size(&text.widget()), (5, 2));

        let custom = ComponentNode::new("x", ComponentType::Custom("Gauge".into()));
        assert_eq!(lines_of(&custom), vec!["Gauge"]);

        let boxed = ComponentNode::new("r", ComponentType::Box);
        assert_eq!(SizingTable::default().content_size(&boxed.widget()), (0, 0));
    }

    #[test]
    fn test_partial_table_json() {
        let table: SizingTable =
            serde_json::from_value(json!({"progressBarWidth": 10, "maxVisibleItems": 2})).unwrap();
        assert_eq!(table.progress_bar_width, 10);
        assert_eq!(table.max_visible_items, 2);
        assert_eq!(table.button_label_padding, 1);
        assert_eq!(table.spinner_frame, "⣾");
    }
}
