use std::rc::Rc;

use crate::cancel::Signal;
use crate::stream::PollStream;
use crate::types::Item;

use super::{MatchInput, Matcher, Source, SourceParams};

/// Arguments handed to a curator run: source args plus the live query.
#[derive(Debug, Clone, Default)]
pub struct CuratorInput {
    pub args: Vec<String>,
    pub query: String,
}

/// A fused source+matcher: one extension that produces items already
/// filtered by the query.
///
/// The engine never drives a curator directly; [`decompose`] splits it into
/// a [`Source`] (collects with the empty query) and an incremental
/// [`Matcher`] (re-curates on every query change, ignoring the collected
/// snapshot).
pub trait Curator {
    fn name(&self) -> &str;

    fn curate(&self, input: &CuratorInput, signal: &Signal) -> Box<dyn PollStream<Item = Item>>;
}

/// Split a curator into the source/matcher pair the pipeline expects.
pub fn decompose(curator: Rc<dyn Curator>) -> (Rc<dyn Source>, Rc<dyn Matcher>) {
    let source = Rc::new(CuratorSource {
        curator: Rc::clone(&curator),
    });
    let matcher = Rc::new(CuratorMatcher { curator });
    (source, matcher)
}

struct CuratorSource {
    curator: Rc<dyn Curator>,
}

impl Source for CuratorSource {
    fn name(&self) -> &str {
        self.curator.name()
    }

    fn collect(
        &self,
        params: &SourceParams,
        signal: &Signal,
    ) -> Box<dyn PollStream<Item = Item>> {
        let input = CuratorInput {
            args: params.args.clone(),
            query: String::new(),
        };
        self.curator.curate(&input, signal)
    }
}

struct CuratorMatcher {
    curator: Rc<dyn Curator>,
}

impl Matcher for CuratorMatcher {
    fn name(&self) -> &str {
        self.curator.name()
    }

    fn incremental(&self) -> bool {
        true
    }

    fn match_items(
        &self,
        input: MatchInput,
        signal: &Signal,
    ) -> Box<dyn PollStream<Item = Rc<Item>>> {
        let curated = self.curator.curate(
            &CuratorInput {
                args: Vec::new(),
                query: input.query,
            },
            signal,
        );
        Box::new(Wrap { inner: curated })
    }
}

/// Adapts a curator's item stream to the matcher's shared-item stream.
struct Wrap {
    inner: Box<dyn PollStream<Item = Item>>,
}

impl PollStream for Wrap {
    type Item = Rc<Item>;

    fn poll_next(&mut self, signal: &Signal) -> anyhow::Result<crate::stream::Step<Rc<Item>>> {
        use crate::stream::Step;
        Ok(match self.inner.poll_next(signal)? {
            Step::Ready(item) => Step::Ready(Rc::new(item)),
            Step::Pending => Step::Pending,
            Step::Done => Step::Done,
        })
    }
}
