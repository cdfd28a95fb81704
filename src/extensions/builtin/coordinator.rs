use crate::extensions::{Coordinator, Layout, Style, Theme};
use crate::host::{ScreenSize, WindowRect};

/// Default layout: a one-row input on top, the list below it, an optional
/// preview pane on the right half, and a centered help overlay.
#[derive(Debug, Default)]
pub struct SplitCoordinator;

impl Coordinator for SplitCoordinator {
    fn style(&self, theme: &Theme) -> Style {
        Style {
            border: theme.border.clone(),
            divider: theme.divider.clone(),
        }
    }

    fn layout(&self, screen: ScreenSize) -> Layout {
        let width = screen.width.max(4);
        let height = screen.height.max(4);
        let list_height = height - 1;
        let list_width = width / 2;

        Layout {
            input: WindowRect {
                row: 0,
                col: 0,
                width,
                height: 1,
            },
            list: WindowRect {
                row: 1,
                col: 0,
                width: list_width,
                height: list_height,
            },
            preview: Some(WindowRect {
                row: 1,
                col: list_width,
                width: width - list_width,
                height: list_height,
            }),
            help: WindowRect {
                row: height / 4,
                col: width / 4,
                width: width / 2,
                height: height / 2,
            },
        }
    }
}
