//! Lazy filtering of arbitrary sequences.
//!
//! ```
//! use rowmap::core::filter::filter;
//!
//! let even: Vec<u32> = filter(|n: &u32| n % 2 == 0, 1..=6).collect();
//! assert_eq!(even, vec![2, 4, 6]);
//! ```

use std::iter::Filter;

/// Sequence of the elements of `source` for which `predicate` holds.
///
/// The predicate runs exactly once per source element, and only when the
/// consumer pulls; dropping the sequence early has no other effect.
pub fn filter<I, P>(predicate: P, source: I) -> Filter<I::IntoIter, P>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    source.into_iter().filter(predicate)
}

/// Like [`filter`] for fallible sequences: the predicate sees `Ok` values
/// only, errors are always passed through to the consumer.
///
/// ```
/// use rowmap::core::filter::filter_ok;
///
/// let rows: Vec<Result<i32, String>> = vec![Ok(1), Err("bad row".into()), Ok(30)];
/// let kept: Vec<_> = filter_ok(|n: &i32| *n > 10, rows).collect();
/// assert_eq!(kept, vec![Err("bad row".to_string()), Ok(30)]);
/// ```
pub fn filter_ok<I, T, E, P>(predicate: P, source: I) -> FilterOk<I::IntoIter, P>
where
    I: IntoIterator<Item = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    FilterOk {
        source: source.into_iter(),
        predicate,
    }
}

#[derive(Debug, Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct FilterOk<I, P> {
    source: I,
    predicate: P,
}

impl<I, T, E, P> Iterator for FilterOk<I, P>
where
    I: Iterator<Item = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.source.by_ref() {
            if let Ok(value) = &item {
                if !(self.predicate)(value) {
                    continue;
                }
            }
            return Some(item);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.source.size_hint().1)
    }
}
