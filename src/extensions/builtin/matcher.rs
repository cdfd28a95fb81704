use std::rc::Rc;

use crate::cancel::Signal;
use crate::extensions::{MatchInput, Matcher};
use crate::stream::{IterStream, PollStream};
use crate::types::{Decoration, Item};

/// Substring matcher: keeps items whose value contains the query, in
/// collect order.
///
/// An empty query matches everything. Matched items get a score favoring
/// earlier match positions and a decoration covering the matched span.
#[derive(Debug, Default)]
pub struct SubstringMatcher {
    incremental: bool,
}

impl SubstringMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the growing match list on every chunk flush.
    #[must_use]
    pub fn incremental(mut self) -> Self {
        self.incremental = true;
        self
    }
}

impl Matcher for SubstringMatcher {
    fn name(&self) -> &str {
        "substring"
    }

    fn incremental(&self) -> bool {
        self.incremental
    }

    fn match_items(
        &self,
        input: MatchInput,
        _signal: &Signal,
    ) -> Box<dyn PollStream<Item = Rc<Item>>> {
        let MatchInput { items, query } = input;
        let matched = items.into_iter().filter_map(move |item| {
            if query.is_empty() {
                return Some(item);
            }
            let start = item.value.find(&query)?;
            let mut scored = Item::clone(&item);
            scored.score = Some(score_for(start));
            scored
                .decorations
                .push(Decoration::span(1, start + 1, query.len()));
            Some(Rc::new(scored))
        });
        Box::new(IterStream::new(matched))
    }
}

/// Earlier match positions score higher.
fn score_for(start: usize) -> f64 {
    1.0 / (1.0 + start as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Step;

    fn collect_matches(values: &[&str], query: &str) -> Vec<Rc<Item>> {
        let matcher = SubstringMatcher::new();
        let items = values
            .iter()
            .enumerate()
            .map(|(id, value)| {
                Rc::new(Item {
                    id: id as u64,
                    ..Item::new(*value)
                })
            })
            .collect();
        let signal = Signal::new();
        let mut stream = matcher.match_items(
            MatchInput {
                items,
                query: query.into(),
            },
            &signal,
        );
        let mut matched = Vec::new();
        while let Step::Ready(item) = stream.poll_next(&signal).expect("poll") {
            matched.push(item);
        }
        matched
    }

    #[test]
    fn keeps_collect_order_for_matches() {
        let matched = collect_matches(&["apple", "apricot", "banana"], "ap");
        let values: Vec<&str> = matched.iter().map(|item| item.value.as_str()).collect();
        assert_eq!(values, ["apple", "apricot"]);
    }

    #[test]
    fn matched_list_is_a_subsequence_of_input() {
        let values = ["aa", "ab", "ba", "bb", "aab"];
        let matched = collect_matches(&values, "a");
        let ids: Vec<u64> = matched.iter().map(|item| item.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn empty_query_passes_everything_through_untouched() {
        let matched = collect_matches(&["x", "y"], "");
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|item| item.score.is_none()));
    }

    #[test]
    fn earlier_matches_score_higher() {
        let matched = collect_matches(&["needle", "a needle"], "needle");
        let first = matched[0].score.expect("score");
        let second = matched[1].score.expect("score");
        assert!(first > second);
    }

    #[test]
    fn matched_span_is_decorated() {
        let matched = collect_matches(&["xyzzy"], "zz");
        assert_eq!(matched[0].decorations, [Decoration::span(1, 3, 2)]);
    }
}
