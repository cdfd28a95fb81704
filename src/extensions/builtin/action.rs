use anyhow::Result;

use crate::cancel::Signal;
use crate::extensions::{Action, ActionContext, ActionFlow};
use crate::host::Host;

/// Echoes the picked values through the host's message channel and closes
/// the picker.
#[derive(Debug, Default)]
pub struct EchoAction;

impl Action for EchoAction {
    fn name(&self) -> &str {
        "echo"
    }

    fn invoke(
        &self,
        host: &mut dyn Host,
        context: &ActionContext,
        signal: &Signal,
    ) -> Result<ActionFlow> {
        signal.check()?;
        let values: Vec<&str> = context
            .selected_items
            .iter()
            .map(|item| item.value.as_str())
            .collect();
        host.echo(&values.join(" "));
        Ok(ActionFlow::Quit)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::extensions::SubmatchParams;
    use crate::host::MemoryHost;
    use crate::types::Item;

    #[test]
    fn echoes_selected_values_and_quits() {
        let mut host = MemoryHost::new();
        let items = vec![Rc::new(Item::new("a")), Rc::new(Item::new("b"))];
        let context = ActionContext {
            item: Some(Rc::clone(&items[0])),
            selected_items: items.clone(),
            filtered_items: items,
            query: String::new(),
            submatch: SubmatchParams::default(),
        };
        let flow = EchoAction
            .invoke(&mut host, &context, &Signal::new())
            .expect("invoke");
        assert_eq!(flow, ActionFlow::Quit);
        assert_eq!(host.echoed, ["a b"]);
    }
}
