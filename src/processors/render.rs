use std::rc::Rc;
use std::time::Instant;

use tracing::warn;

use crate::cancel::{Cancelled, Signal, StageError};
use crate::collections::ItemBelt;
use crate::error::EngineError;
use crate::events::{EventQueue, IndexTarget, ProcessorEvent, Stage};
use crate::extensions::Renderer;
use crate::types::{DisplayItem, Item};

/// Initial geometry for the render stage.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub height: usize,
    /// Rows kept visible above and below the cursor where possible.
    pub scroll_offset: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            height: 10,
            scroll_offset: 2,
        }
    }
}

/// Owns the cursor and offset and produces the visible window of display
/// items through the current renderer.
///
/// The cursor stays clamped to `[0, item_count)` and the offset keeps the
/// cursor inside the visible window, honoring the scroll offset where the
/// geometry allows.
pub struct RenderProcessor {
    renderers: ItemBelt<Rc<dyn Renderer>>,
    queue: EventQueue,
    cursor: usize,
    offset: usize,
    height: usize,
    scroll_offset: usize,
    item_count: usize,
    items: Vec<Rc<Item>>,
    window: Vec<DisplayItem>,
    pending: bool,
    disposal: Signal,
}

impl RenderProcessor {
    /// # Panics
    ///
    /// Panics when `renderers` is empty; the render stage always has an
    /// active strategy.
    #[must_use]
    pub fn new(
        renderers: Vec<Rc<dyn Renderer>>,
        options: RenderOptions,
        queue: EventQueue,
    ) -> Self {
        Self {
            renderers: ItemBelt::new(renderers),
            queue,
            cursor: 0,
            offset: 0,
            height: options.height.max(1),
            scroll_offset: options.scroll_offset,
            item_count: 0,
            items: Vec::new(),
            window: Vec::new(),
            pending: false,
            disposal: Signal::new(),
        }
    }

    /// Reserve a render over a fresh item list.
    pub fn start(&mut self, items: Vec<Rc<Item>>) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        self.items = items;
        self.pending = true;
        Ok(())
    }

    /// Reserve a re-render over the current item list (cursor motion,
    /// renderer switch, height change).
    pub fn rerender(&mut self) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        self.pending = true;
        Ok(())
    }

    /// Run the reserved render, if any.
    pub fn turn(&mut self, _now: Instant) {
        if !self.pending {
            return;
        }
        self.pending = false;
        self.queue
            .dispatch_processor(ProcessorEvent::Started(Stage::Render));

        self.item_count = self.items.len();
        self.clamp();

        let end = (self.offset + self.height).min(self.item_count);
        let mut window: Vec<DisplayItem> = self.items[self.offset..end]
            .iter()
            .map(|item| DisplayItem::new(Rc::clone(item)))
            .collect();

        let renderer = Rc::clone(self.renderers.current());
        let signal = self.disposal.child();
        match renderer.render(&mut window, &signal) {
            Ok(()) => {
                self.window = window;
                self.queue
                    .dispatch_processor(ProcessorEvent::Succeeded(Stage::Render));
            }
            // Cancellation only reaches here through disposal; terminate
            // without publishing or reporting.
            Err(error) if error.downcast_ref::<Cancelled>().is_some() => {}
            Err(error) => {
                warn!(renderer = renderer.name(), %error, "render failed");
                // Publish the default-labelled window so the list can
                // still advance over good data.
                self.window = self.items[self.offset..end]
                    .iter()
                    .map(|item| DisplayItem::new(Rc::clone(item)))
                    .collect();
                self.queue.dispatch_processor(ProcessorEvent::Failed(
                    Stage::Render,
                    StageError::failed(error),
                ));
            }
        }
    }

    fn clamp(&mut self) {
        if self.item_count == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = self.cursor.min(self.item_count - 1);

        // The scroll offset degrades gracefully when the window is small.
        let scrolloff = self.scroll_offset.min((self.height - 1) / 2);
        if self.cursor < self.offset + scrolloff {
            self.offset = self.cursor.saturating_sub(scrolloff);
        } else if self.cursor + scrolloff + 1 > self.offset + self.height {
            self.offset = self.cursor + scrolloff + 1 - self.height;
        }
        self.offset = self.offset.min(self.item_count.saturating_sub(self.height));
    }

    /// Restore cursor and offset from a resumed session snapshot; both are
    /// reclamped against the item list on the next render.
    pub fn restore(&mut self, cursor: usize, offset: usize) {
        self.cursor = cursor;
        self.offset = offset;
    }

    /// Set the cursor; `Last` is the `"$"` sentinel.
    pub fn set_cursor(&mut self, target: IndexTarget) {
        self.cursor = match target {
            IndexTarget::At(cursor) => cursor,
            IndexTarget::Last => self.item_count.saturating_sub(1),
        };
        self.clamp();
    }

    /// Move the cursor by a signed amount, saturating at both ends.
    pub fn move_cursor(&mut self, amount: i64) {
        self.cursor = self.cursor.saturating_add_signed(amount as isize);
        self.clamp();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.clamp();
    }

    pub fn set_index(&mut self, target: IndexTarget) {
        self.renderers.set_index(target);
    }

    /// Relative renderer switch. Returns whether the index changed.
    pub fn shift_index(&mut self, amount: i64, cycle: bool) -> bool {
        self.renderers.shift(amount, cycle)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.renderers.index()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Item currently under the cursor.
    #[must_use]
    pub fn item_at_cursor(&self) -> Option<Rc<Item>> {
        self.items.get(self.cursor).cloned()
    }

    /// Item at an arbitrary position in the current list.
    #[must_use]
    pub fn item_at(&self, position: usize) -> Option<Rc<Item>> {
        self.items.get(position).cloned()
    }

    /// Current item list handed to the last `start`.
    #[must_use]
    pub fn items(&self) -> &[Rc<Item>] {
        &self.items
    }

    /// Published window of display items.
    #[must_use]
    pub fn window(&self) -> &[DisplayItem] {
        &self.window
    }

    /// 1-based line of the cursor within the window, for the host cursor.
    #[must_use]
    pub fn line(&self) -> usize {
        self.cursor - self.offset + 1
    }

    pub fn dispose(&mut self) {
        self.disposal.abort();
        self.pending = false;
    }
}
