use crate::cancel::Signal;
use crate::extensions::{Source, SourceParams};
use crate::stream::{PollStream, from_vec};
use crate::types::Item;

/// Source over a fixed set of items.
pub struct StaticSource {
    name: String,
    items: Vec<Item>,
}

impl StaticSource {
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Source whose items are bare values.
    #[must_use]
    pub fn from_values<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, values.into_iter().map(Item::new).collect())
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(
        &self,
        _params: &SourceParams,
        _signal: &Signal,
    ) -> Box<dyn PollStream<Item = Item>> {
        Box::new(from_vec(self.items.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Step;

    #[test]
    fn streams_items_in_declaration_order() {
        let source = StaticSource::from_values("letters", ["a", "b"]);
        let signal = Signal::new();
        let mut stream = source.collect(&SourceParams::default(), &signal);

        let mut values = Vec::new();
        while let Step::Ready(item) = stream.poll_next(&signal).expect("poll") {
            values.push(item.value);
        }
        assert_eq!(values, ["a", "b"]);
    }
}
