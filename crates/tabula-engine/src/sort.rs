use tabula_model::Attribute;

/// Indices of `values` in ascending [`Attribute::compare`] order.
///
/// `values` itself is left untouched; `send` walks the permutation to emit
/// the reordered run. Nothing downstream observes tie order, so the
/// unstable sort is fine.
pub fn ascending_permutation(values: &[Attribute]) -> Vec<usize> {
    let mut ordering: Vec<usize> = (0..values.len()).collect();
    ordering.sort_unstable_by(|&a, &b| values[a].compare(&values[b]));
    ordering
}
