use anyhow::Result;

use crate::cancel::Signal;
use crate::extensions::Renderer;
use crate::types::{Decoration, DisplayItem};

/// Passthrough renderer: labels from the item, item decorations re-based
/// onto the item's window row.
#[derive(Debug, Default)]
pub struct LabelRenderer;

impl Renderer for LabelRenderer {
    fn name(&self) -> &str {
        "label"
    }

    fn render(&self, items: &mut [DisplayItem], signal: &Signal) -> Result<()> {
        signal.check()?;
        for (row, display) in items.iter_mut().enumerate() {
            display.label = display.item.label().to_string();
            display.decorations = display
                .item
                .decorations
                .iter()
                .map(|decoration| Decoration {
                    line: row + 1,
                    ..*decoration
                })
                .collect();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::types::Item;

    #[test]
    fn rebases_decorations_onto_window_rows() {
        let mut window: Vec<DisplayItem> = (0..2)
            .map(|id| {
                DisplayItem::new(Rc::new(Item {
                    id,
                    decorations: vec![Decoration::span(1, 2, 3)],
                    ..Item::new(format!("item-{id}"))
                }))
            })
            .collect();

        LabelRenderer
            .render(&mut window, &Signal::new())
            .expect("render");

        assert_eq!(window[0].decorations[0].line, 1);
        assert_eq!(window[1].decorations[0].line, 2);
        assert_eq!(window[1].label, "item-1");
    }
}
