use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Item;

/// Resumable snapshot of a picker session.
///
/// Captured when the picker is disposed and replayed into a fresh picker on
/// resume: the collected items seed the collect stage, the filtered items
/// seed the published match list, and the indices restore the active
/// strategies. Selection is a set of item ids and survives serialization as
/// a set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickerContext {
    pub query: String,
    #[serde(default)]
    pub selection: BTreeSet<u64>,
    #[serde(default)]
    pub collected_items: Vec<Rc<Item>>,
    #[serde(default)]
    pub filtered_items: Vec<Rc<Item>>,
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub matcher_index: usize,
    #[serde(default)]
    pub sorter_index: usize,
    #[serde(default)]
    pub renderer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previewer_index: Option<usize>,
}

/// Terminal result of a picker run.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOutcome {
    /// `false` when the user cancelled out of the prompt.
    pub accepted: bool,
    /// Final query string at the moment the prompt closed.
    pub query: String,
    /// Item under the cursor at the moment the prompt was accepted.
    pub picked: Option<Rc<Item>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_round_trips_selection_as_a_set() {
        let mut context = PickerContext {
            query: "ap".into(),
            cursor: 1,
            ..PickerContext::default()
        };
        context.selection.extend([4, 2, 2, 9]);
        context.collected_items = vec![Rc::new(Item::new("apple"))];

        let encoded = serde_json::to_string(&context).expect("serialize");
        let decoded: PickerContext = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, context);
        assert_eq!(decoded.selection.len(), 3);
        assert_eq!(
            decoded.selection.iter().copied().collect::<Vec<_>>(),
            vec![2, 4, 9]
        );
    }
}
