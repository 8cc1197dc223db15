//! Small set-algebra helpers over type-name sets.

use apollo_compiler::Name;
use indexmap::IndexSet;

/// Intersection of every set produced by `sets`.
///
/// An empty iterator yields the empty set, and the fold stops as soon as the
/// running intersection becomes empty.
pub(crate) fn intersect_all<'a>(
    sets: impl IntoIterator<Item = &'a IndexSet<Name>>,
) -> IndexSet<Name> {
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return IndexSet::new();
    };
    let mut intersection = first.clone();
    for set in iter {
        if intersection.is_empty() {
            break;
        }
        intersection.retain(|name| set.contains(name));
    }
    intersection
}
