use std::time::Instant;

use tracing::warn;

use crate::cancel::StageError;
use crate::events::{Event, ProcessorEvent, SelectMethod, Stage};
use crate::extensions::MatchInput;
use crate::host::Host;

use super::Picker;

/// Work queued by event handling and executed, in insertion order, later in
/// the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReservedWork {
    StartMatch { restart: bool },
    StartSort,
    StartRender,
    Rerender,
    SchedulePreview,
}

impl Picker {
    /// Translate one drained event into state changes and reserved work.
    pub(crate) fn handle_event(&mut self, host: &mut dyn Host, event: Event) {
        match event {
            Event::CmdlineChanged { cmdline } => {
                self.input.set_query(&cmdline);
                self.reserve(ReservedWork::StartMatch { restart: true });
            }
            Event::CmdposChanged { cmdpos } => {
                self.input.set_cmdpos(cmdpos);
            }
            Event::MoveCursor { amount, scroll } => {
                let step = if scroll {
                    self.render.height() as i64
                } else {
                    1
                };
                self.render.move_cursor(amount.saturating_mul(step));
                self.reserve(ReservedWork::Rerender);
            }
            Event::MoveCursorAt { cursor } => {
                self.render.set_cursor(cursor);
                self.reserve(ReservedWork::Rerender);
            }
            Event::SelectItem { cursor, method } => {
                let position = cursor.unwrap_or_else(|| self.render.cursor());
                if let Some(item) = self.render.item_at(position) {
                    self.apply_selection(item.id, method);
                    self.reserve(ReservedWork::Rerender);
                }
            }
            Event::SelectAllItems { method } => {
                let ids: Vec<u64> =
                    self.matching.items().iter().map(|item| item.id).collect();
                for id in ids {
                    self.apply_selection(id, method);
                }
                self.reserve(ReservedWork::Rerender);
            }
            Event::SwitchMatcher { amount, cycle } => {
                if self.matching.shift_index(amount, cycle) {
                    self.reserve(ReservedWork::StartMatch { restart: true });
                }
            }
            Event::SwitchMatcherAt { index } => {
                self.matching.set_index(index);
                self.reserve(ReservedWork::StartMatch { restart: true });
            }
            Event::SwitchSorter { amount, cycle } => {
                if self.sort.shift_index(amount, cycle) {
                    self.reserve(ReservedWork::StartSort);
                }
            }
            Event::SwitchSorterAt { index } => {
                self.sort.set_index(index);
                self.reserve(ReservedWork::StartSort);
            }
            Event::SwitchRenderer { amount, cycle } => {
                if self.render.shift_index(amount, cycle) {
                    self.reserve(ReservedWork::Rerender);
                }
            }
            Event::SwitchRendererAt { index } => {
                self.render.set_index(index);
                self.reserve(ReservedWork::Rerender);
            }
            Event::SwitchPreviewer { amount, cycle } => {
                if self.preview.shift_index(amount, cycle) {
                    self.reserve(ReservedWork::SchedulePreview);
                }
            }
            Event::SwitchPreviewerAt { index } => {
                self.preview.set_index(index);
                self.reserve(ReservedWork::SchedulePreview);
            }
            Event::InvokeAction { name } => {
                self.driver.accept(name);
            }
            Event::ListExecute { command } => {
                if let Err(error) = self.list.execute(host, &command) {
                    warn!(%command, %error, "list command failed");
                }
            }
            Event::PreviewExecute { command } => {
                if let Err(error) = self.preview_component.execute(host, &command) {
                    warn!(%command, %error, "preview command failed");
                }
            }
            Event::HelpToggle => {
                self.toggle_help(host);
            }
            Event::HelpPage { amount } => {
                self.help.page_by(amount);
            }
            Event::Processor(event) => {
                self.handle_processor_event(event);
            }
        }
    }

    fn handle_processor_event(&mut self, event: ProcessorEvent) {
        match event {
            ProcessorEvent::Started(_) => {}
            ProcessorEvent::Updated(stage) => match stage {
                Stage::Collect => {
                    self.reserve(ReservedWork::StartMatch { restart: false });
                }
                Stage::Match => {
                    self.reserve(ReservedWork::StartSort);
                }
                Stage::Sort | Stage::Render | Stage::Preview => {}
            },
            ProcessorEvent::Succeeded(stage) => match stage {
                Stage::Collect => {
                    self.reserve(ReservedWork::StartMatch { restart: false });
                }
                Stage::Match => {
                    self.reserve(ReservedWork::StartSort);
                }
                Stage::Sort => {
                    self.reserve(ReservedWork::StartRender);
                }
                Stage::Render => {
                    self.list.set_failed(false);
                    self.list.set_window(self.render.window(), self.render.line());
                    self.reserve(ReservedWork::SchedulePreview);
                }
                Stage::Preview => {
                    self.preview_component.set_failed(false);
                    self.preview_component
                        .set_payload(self.preview.payload().cloned());
                }
            },
            ProcessorEvent::Failed(stage, error) => {
                self.handle_stage_failure(stage, &error);
            }
        }
    }

    /// Non-cancelled failures flip the stage's failure indicator and let
    /// the pipeline advance over the last good data; the cancellation
    /// sentinel is silently ignored.
    fn handle_stage_failure(&mut self, stage: Stage, error: &StageError) {
        if error.is_cancelled() {
            return;
        }
        warn!(stage = stage.name(), "stage failed");
        match stage {
            Stage::Collect | Stage::Match => {
                self.input.set_failed(true);
            }
            Stage::Sort => {
                self.list.set_failed(true);
                // The sort stage published the unsorted copy.
                self.reserve(ReservedWork::StartRender);
            }
            Stage::Render => {
                self.list.set_failed(true);
                // The render stage published the default-labelled window.
                self.list.set_window(self.render.window(), self.render.line());
                self.reserve(ReservedWork::SchedulePreview);
            }
            Stage::Preview => {
                self.preview_component.set_failed(true);
                self.preview_component.set_payload(None);
            }
        }
    }

    /// Execute previously reserved work. Processor `start`s replace any
    /// pending reservation inside the processor, so duplicates collapse.
    pub(crate) fn run_reserved(&mut self, work: ReservedWork, now: Instant) {
        let result = match work {
            ReservedWork::StartMatch { restart } => self.matching.start(
                MatchInput {
                    items: self.collect.items().to_vec(),
                    query: self.input.query().to_string(),
                },
                restart,
            ),
            ReservedWork::StartSort => self.sort.start(self.matching.items().to_vec()),
            ReservedWork::StartRender => self.render.start(self.sort.items().to_vec()),
            ReservedWork::Rerender => self.render.rerender(),
            ReservedWork::SchedulePreview => {
                self.preview_debounce
                    .schedule(now, self.render.item_at_cursor());
                Ok(())
            }
        };
        if let Err(error) = result {
            // Disposal raced the reservation; the picker is shutting down.
            warn!(%error, "reserved work dropped");
        }
    }

    pub(crate) fn reserve(&mut self, work: ReservedWork) {
        self.reserved.push(work);
    }

    fn apply_selection(&mut self, id: u64, method: SelectMethod) {
        match method {
            SelectMethod::On => {
                self.selection.insert(id);
            }
            SelectMethod::Off => {
                self.selection.remove(&id);
            }
            SelectMethod::Toggle => {
                if !self.selection.remove(&id) {
                    self.selection.insert(id);
                }
            }
        }
    }

    fn toggle_help(&mut self, host: &mut dyn Host) {
        if self.help.toggle() {
            if let Some(layout) = self.layout {
                match host.open_window(layout.help) {
                    Ok(window) => self.help.attach(window),
                    Err(error) => warn!(%error, "help window failed to open"),
                }
            }
        } else if let Some(window) = self.help.detach() {
            let _ = host.close_window(window);
        }
    }
}
