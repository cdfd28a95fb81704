use std::cmp::Ordering;
use std::rc::Rc;

use anyhow::Result;

use crate::cancel::Signal;
use crate::extensions::Sorter;
use crate::types::Item;

/// Stable sort by matcher score, best first; unscored items sink to the
/// bottom in their original order.
#[derive(Debug, Default)]
pub struct ScoreSorter;

impl Sorter for ScoreSorter {
    fn name(&self) -> &str {
        "score"
    }

    fn sort(&self, items: &mut [Rc<Item>], signal: &Signal) -> Result<()> {
        signal.check()?;
        items.sort_by(|a, b| match (a.score, b.score) {
            (Some(left), Some(right)) => {
                right.partial_cmp(&left).unwrap_or(Ordering::Equal)
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(())
    }
}

/// Stable sort by display label.
#[derive(Debug, Default)]
pub struct AlphabeticalSorter;

impl Sorter for AlphabeticalSorter {
    fn name(&self) -> &str {
        "alphabetical"
    }

    fn sort(&self, items: &mut [Rc<Item>], signal: &Signal) -> Result<()> {
        signal.check()?;
        items.sort_by(|a, b| a.label().cmp(b.label()));
        Ok(())
    }
}
