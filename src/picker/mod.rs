//! The picker orchestrator.
//!
//! Wires the processors and components together, owns selection state,
//! translates events into processor commands, and drives the render cycle
//! from the scheduler tick. Processors talk back through the event queue
//! only; the orchestrator holds all downward references.

mod action;
mod handler;

pub use action::{ActionRegistry, SELECT_ACTION};
pub(crate) use handler::ReservedWork;

use std::collections::BTreeSet;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::cancel::Signal;
use crate::components::{HelpComponent, InputComponent, ListComponent, PreviewComponent};
use crate::debounce::Debounce;
use crate::error::EngineError;
use crate::events::{Event, EventQueue};
use crate::extensions::builtin::{
    EchoAction, LabelRenderer, SplitCoordinator, StaticSource, SubstringMatcher,
};
use crate::extensions::{
    ActionContext, ActionFlow, Coordinator, Layout, Matcher, Previewer, Renderer, Sorter,
    Source, SourceParams, Style, SubmatchParams, Theme,
};
use crate::host::Host;
use crate::input::{DriverStatus, InputDriver};
use crate::processors::{
    CollectOptions, CollectProcessor, MatchOptions, MatchProcessor, PreviewProcessor,
    RenderOptions, RenderProcessor, SortProcessor,
};
use crate::scheduler::{SCHEDULER_INTERVAL, Scheduler};
use crate::types::{Item, PickerContext, PickerOutcome};

/// Default debounce applied to preview starts.
pub const PREVIEW_DEBOUNCE_DELAY: Duration = Duration::from_millis(150);

/// Tuning knobs shared by the whole picker.
#[derive(Debug, Clone)]
pub struct PickerOptions {
    pub collect: CollectOptions,
    pub matching: MatchOptions,
    pub render: RenderOptions,
    pub preview_debounce: Duration,
    pub scheduler_interval: Duration,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            collect: CollectOptions::default(),
            matching: MatchOptions::default(),
            render: RenderOptions::default(),
            preview_debounce: PREVIEW_DEBOUNCE_DELAY,
            scheduler_interval: SCHEDULER_INTERVAL,
        }
    }
}

/// Everything needed to construct a picker.
pub struct PickerParams {
    pub name: String,
    pub args: Vec<String>,
    pub source: Rc<dyn Source>,
    pub matchers: Vec<Rc<dyn Matcher>>,
    pub sorters: Vec<Rc<dyn Sorter>>,
    pub renderers: Vec<Rc<dyn Renderer>>,
    pub previewers: Vec<Rc<dyn Previewer>>,
    /// Action map; an empty map makes accept return the picked item
    /// directly (selection-only picker, used for nested pickers).
    pub actions: ActionRegistry,
    pub default_action: String,
    pub coordinator: Rc<dyn Coordinator>,
    pub theme: Theme,
    pub options: PickerOptions,
    /// Snapshot to resume from. The host is expected to prime its
    /// command-line with the snapshot's query.
    pub context: Option<PickerContext>,
}

impl PickerParams {
    /// Params with the builtin defaults: substring matcher, passthrough
    /// renderer, echo action, split layout.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Rc<dyn Source>) -> Self {
        let mut actions = ActionRegistry::new();
        actions.register(Rc::new(EchoAction));
        Self {
            name: name.into(),
            args: Vec::new(),
            source,
            matchers: vec![Rc::new(SubstringMatcher::new())],
            sorters: Vec::new(),
            renderers: vec![Rc::new(LabelRenderer)],
            previewers: Vec::new(),
            actions,
            default_action: "echo".into(),
            coordinator: Rc::new(SplitCoordinator),
            theme: Theme::default(),
            options: PickerOptions::default(),
            context: None,
        }
    }
}

/// An interactive picker session over one source.
pub struct Picker {
    name: String,
    args: Vec<String>,
    queue: EventQueue,
    pub(crate) collect: CollectProcessor,
    pub(crate) matching: MatchProcessor,
    pub(crate) sort: SortProcessor,
    pub(crate) render: RenderProcessor,
    pub(crate) preview: PreviewProcessor,
    pub(crate) input: InputComponent,
    pub(crate) list: ListComponent,
    pub(crate) preview_component: PreviewComponent,
    pub(crate) help: HelpComponent,
    pub(crate) driver: InputDriver,
    actions: ActionRegistry,
    default_action: String,
    coordinator: Rc<dyn Coordinator>,
    theme: Theme,
    style: Style,
    pub(crate) layout: Option<Layout>,
    pub(crate) selection: BTreeSet<u64>,
    pub(crate) preview_debounce: Debounce<Option<Rc<Item>>>,
    pub(crate) reserved: Vec<ReservedWork>,
    options: PickerOptions,
    disposal: Signal,
    opened: bool,
    disposed: bool,
}

impl Picker {
    #[must_use]
    pub fn new(params: PickerParams) -> Self {
        let PickerParams {
            name,
            args,
            source,
            matchers,
            sorters,
            renderers,
            previewers,
            actions,
            default_action,
            coordinator,
            theme,
            options,
            context,
        } = params;

        let queue = EventQueue::new();
        let mut collect =
            CollectProcessor::new(source, options.collect.clone(), queue.clone());
        let mut matching =
            MatchProcessor::new(matchers, options.matching.clone(), queue.clone());
        let mut sort = SortProcessor::new(sorters, queue.clone());
        let mut render =
            RenderProcessor::new(renderers, options.render.clone(), queue.clone());
        let mut preview = PreviewProcessor::new(previewers, queue.clone());
        let mut input = InputComponent::new();
        let mut selection = BTreeSet::new();
        let mut reserved = Vec::new();

        if let Some(context) = context {
            collect.seed(context.collected_items);
            matching.seed(context.filtered_items);
            render.restore(context.cursor, context.offset);
            matching.set_index(crate::events::IndexTarget::At(context.matcher_index));
            sort.set_index(crate::events::IndexTarget::At(context.sorter_index));
            render.set_index(crate::events::IndexTarget::At(context.renderer_index));
            if let Some(index) = context.previewer_index {
                preview.set_index(crate::events::IndexTarget::At(index));
            }
            input.set_query(&context.query);
            selection = context.selection;
            // Show the resumed snapshot before the first match completes.
            reserved.push(ReservedWork::StartSort);
        }

        let preview_debounce = Debounce::new(options.preview_debounce);
        Self {
            name,
            args,
            queue,
            collect,
            matching,
            sort,
            render,
            preview,
            input,
            list: ListComponent::new(),
            preview_component: PreviewComponent::new(),
            help: HelpComponent::new(10),
            driver: InputDriver::new(),
            actions,
            default_action,
            coordinator,
            theme,
            style: Style::default(),
            layout: None,
            selection,
            preview_debounce,
            reserved,
            options,
            disposal: Signal::new(),
            opened: false,
            disposed: false,
        }
    }

    /// Acquire the UI surface: resolve the layout, open the windows, and
    /// emit `PickerEnter`.
    pub fn open(&mut self, host: &mut dyn Host) -> Result<()> {
        if self.opened {
            return Ok(());
        }
        self.style = self.coordinator.style(&self.theme);
        let layout = self.coordinator.layout(host.screen_size());

        self.input.attach(host.open_window(layout.input)?);
        self.list.attach(host.open_window(layout.list)?);
        if let (Some(rect), true) = (layout.preview, self.preview.has_previewers()) {
            self.preview_component.attach(host.open_window(rect)?);
        }
        self.render.set_height(layout.list.height);
        self.help = HelpComponent::new(layout.help.height.max(1));
        self.help.set_lines(self.help_lines());

        self.layout = Some(layout);
        self.opened = true;
        host.emit_event("PickerEnter");
        debug!(picker = %self.name, "picker opened");
        Ok(())
    }

    /// Kick off collection without entering the event loop.
    ///
    /// [`start`](Self::start) calls this itself; embedders that drive
    /// [`tick`](Self::tick) from their own loop call it once after
    /// [`open`](Self::open).
    pub fn begin(&mut self) -> Result<()> {
        if self.disposed {
            return Err(EngineError::Disposed.into());
        }
        if !self.opened {
            return Err(EngineError::NotOpened.into());
        }
        self.collect.start(&SourceParams {
            args: self.args.clone(),
        })?;
        Ok(())
    }

    /// Run the event loop to completion.
    ///
    /// Returns `None` when the picker was disposed externally, otherwise
    /// the terminal outcome. The UI surface is released on every exit
    /// path.
    pub fn start(&mut self, host: &mut dyn Host) -> Result<Option<PickerOutcome>> {
        self.begin()?;

        let scheduler = Scheduler::new(self.options.scheduler_interval);
        let signal = self.disposal.clone();
        let outcome = scheduler.run(&signal, || self.tick(host));
        let closed = self.close(host);
        let outcome = outcome?;
        closed?;
        Ok(outcome)
    }

    /// One scheduler turn: refresh input, drain events, run reserved work,
    /// advance the processors, render the components.
    pub fn tick(&mut self, host: &mut dyn Host) -> Result<ControlFlow<PickerOutcome>> {
        self.driver.poll(host, &self.queue);

        let queue = self.queue.clone();
        queue.drain(|event| self.handle_event(host, event));

        let now = Instant::now();
        let work = std::mem::take(&mut self.reserved);
        for reserved in work {
            self.run_reserved(reserved, now);
        }

        self.collect.turn(now);
        self.matching.turn(now);
        self.sort.turn(now);
        self.render.turn(now);
        if let Some(item) = self.preview_debounce.poll(now) {
            let _ = self.preview.start(item);
        }
        self.preview.turn(now);

        let mut dirty = false;
        dirty |= self.input.render(host)?;
        dirty |= self.list.render(host)?;
        dirty |= self.preview_component.render(host)?;
        dirty |= self.help.render(host)?;
        if dirty {
            host.request_redraw();
        }

        match self.driver.status().clone() {
            DriverStatus::Active => Ok(ControlFlow::Continue(())),
            DriverStatus::Cancelled => Ok(ControlFlow::Break(PickerOutcome {
                accepted: false,
                query: self.input.query().to_string(),
                picked: None,
            })),
            DriverStatus::Accepted { action } => {
                let picked = self.render.item_at_cursor();
                // A picker without actions resolves accept to returning
                // the picked item (selection-only picker).
                if self.actions.is_empty() {
                    return Ok(ControlFlow::Break(PickerOutcome {
                        accepted: true,
                        query: self.input.query().to_string(),
                        picked,
                    }));
                }
                let name = action.unwrap_or_else(|| self.default_action.clone());
                match self.run_action(host, &name)? {
                    ActionFlow::Continue => {
                        self.driver.reactivate();
                        Ok(ControlFlow::Continue(()))
                    }
                    ActionFlow::Quit => Ok(ControlFlow::Break(PickerOutcome {
                        accepted: true,
                        query: self.input.query().to_string(),
                        picked,
                    })),
                }
            }
        }
    }

    fn run_action(&mut self, host: &mut dyn Host, name: &str) -> Result<ActionFlow> {
        let name = if name == SELECT_ACTION {
            match self.select_action(host)? {
                Some(chosen) => chosen,
                // Cancelled sub-pick: back to the outer picker.
                None => return Ok(ActionFlow::Continue),
            }
        } else {
            name.to_string()
        };

        let action = match self.actions.resolve(&name) {
            Ok(action) => action,
            Err(error) => {
                host.echo(&error.to_string());
                return Ok(ActionFlow::Continue);
            }
        };

        let context = self.action_context();
        let signal = self.disposal.child();
        match action.invoke(host, &context, &signal) {
            Ok(flow) => Ok(flow),
            Err(error) => {
                warn!(action = %name, %error, "action failed");
                host.echo(&format!("action '{name}' failed"));
                Ok(ActionFlow::Continue)
            }
        }
    }

    /// Open the nested action picker and return the chosen action name.
    fn select_action(&mut self, host: &mut dyn Host) -> Result<Option<String>> {
        let names = self.actions.names();
        let mut params = PickerParams::new(
            "@action",
            Rc::new(StaticSource::from_values("@action", names)),
        );
        params.actions = ActionRegistry::new();
        params.previewers = Vec::new();
        params.options = self.options.clone();
        let mut sub = Picker::new(params);
        sub.open(host)?;
        let outcome = sub.start(host)?;

        // The outer surface survives the sub-pick; repaint it.
        self.reserved.push(ReservedWork::Rerender);
        Ok(outcome
            .filter(|outcome| outcome.accepted)
            .and_then(|outcome| outcome.picked)
            .map(|item| item.value.clone()))
    }

    fn action_context(&self) -> ActionContext {
        let item = self.render.item_at_cursor();
        let selected_items: Vec<Rc<Item>> = if self.selection.is_empty() {
            item.iter().cloned().collect()
        } else {
            self.collect
                .items()
                .iter()
                .filter(|candidate| self.selection.contains(&candidate.id))
                .cloned()
                .collect()
        };
        ActionContext {
            item,
            selected_items,
            filtered_items: self.sort.items().to_vec(),
            query: self.input.query().to_string(),
            submatch: SubmatchParams {
                name: self.name.clone(),
                args: self.args.clone(),
            },
        }
    }

    /// Release the UI surface and cancel all in-flight work. Idempotent.
    pub fn close(&mut self, host: &mut dyn Host) -> Result<()> {
        if !self.opened {
            return Ok(());
        }
        self.opened = false;

        let mut first_error = None;
        for window in [
            self.input.detach(),
            self.list.detach(),
            self.preview_component.detach(),
            self.help.detach(),
        ]
        .into_iter()
        .flatten()
        {
            if let Err(error) = host.close_window(window) {
                first_error.get_or_insert(error);
            }
        }
        host.emit_event("PickerLeave");
        self.dispose();
        debug!(picker = %self.name, "picker closed");
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Cancel all in-flight work and reject further starts.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.disposal.abort();
        self.collect.dispose();
        self.matching.dispose();
        self.sort.dispose();
        self.render.dispose();
        self.preview.dispose();
        self.preview_debounce.cancel();
    }

    /// Resumable snapshot of the current session state.
    #[must_use]
    pub fn context(&self) -> PickerContext {
        PickerContext {
            query: self.input.query().to_string(),
            selection: self.selection.clone(),
            collected_items: self.collect.items().to_vec(),
            filtered_items: self.sort.items().to_vec(),
            cursor: self.render.cursor(),
            offset: self.render.offset(),
            matcher_index: self.matching.index(),
            sorter_index: self.sort.index(),
            renderer_index: self.render.index(),
            previewer_index: self
                .preview
                .has_previewers()
                .then(|| self.preview.index()),
        }
    }

    /// Session record for the store; saved by the host after dispose.
    /// `@`-prefixed names are filtered at the store's save boundary.
    #[must_use]
    pub fn session(&self) -> crate::session::Session {
        crate::session::Session {
            name: self.name.clone(),
            args: self.args.clone(),
            context: self.context(),
        }
    }

    /// Inject an event (host key maps, nested flows, tests).
    pub fn dispatch(&self, event: Event) {
        self.queue.dispatch(event);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether the source is still being collected (spinner state).
    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.collect.is_collecting()
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    fn help_lines(&self) -> Vec<String> {
        let mut lines = vec!["Actions:".to_string()];
        for name in self.actions.names() {
            if name == self.default_action {
                lines.push(format!("  {name} (default)"));
            } else {
                lines.push(format!("  {name}"));
            }
        }
        lines.push(String::new());
        lines.push("Strategies:".to_string());
        lines.push(format!("  matchers: {}", self.matching.matcher_count()));
        lines
    }
}

impl Drop for Picker {
    fn drop(&mut self) {
        self.dispose();
    }
}
