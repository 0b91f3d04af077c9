//! Section sizing shared by every row and column of a grid.
//!
//! Turns per-section `(minimum, maximum, stretch)` triples plus a total size
//! into integer section sizes. Unlike a plain proportional split, sections are
//! pinned as they reach their maximum and locked at their minimum, and the
//! remaining space is redistributed among whatever is still free to move.
//!
//! # Algorithm
//!
//! 1. If the total is below the sum of minima, the minima become the stretch
//!    weights and the floors are dropped, so sections shrink together.
//! 2. Grow all unfinished sections in proportion to their stretch. Whenever a
//!    section would reach its maximum before free space runs out, advance
//!    everyone to that point and pin it. Otherwise hand out what is left.
//! 3. Lock every section that ended below its minimum, reset the others and
//!    repeat step 2 with the space the locked sections did not take.
//! 4. Round to whole pixels.

use serde::{Deserialize, Serialize};

use crate::primitives::MAX_EXTENT;

/// Size bounds and growth weight of one section (a grid row or column).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub minimum: i32,
    pub maximum: i32,
    pub stretch: f64,
}

impl Section {
    pub const fn new(minimum: i32, maximum: i32, stretch: f64) -> Self {
        Self {
            minimum,
            maximum,
            stretch,
        }
    }
}

/// What happens to space left over once every section sits at its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurplusPolicy {
    /// Keep every section at its maximum and leave the surplus unused.
    #[default]
    Leave,
    /// Hand the surplus to all sections in proportion to their stretch
    /// factors. Sections may then exceed their maximum, but the sizes always
    /// add up to the requested total.
    Distribute,
}

/// Compute section sizes from parallel arrays of minima, maxima and stretch factors.
///
/// Returns an empty vector (and logs a warning) when the arrays differ in length.
pub fn section_sizes(
    minimum: &[i32],
    maximum: &[i32],
    stretch: &[f64],
    total: i32,
    policy: SurplusPolicy,
) -> Vec<i32> {
    if minimum.len() != maximum.len() || maximum.len() != stretch.len() {
        tracing::warn!(
            ?minimum,
            ?maximum,
            ?stretch,
            "section arrays differ in length"
        );
        return Vec::new();
    }
    let sections: Vec<Section> = minimum
        .iter()
        .zip(maximum)
        .zip(stretch)
        .map(|((&min, &max), &factor)| Section::new(min, max, factor))
        .collect();
    distribute_sections(&sections, total, policy)
}

/// Compute integer sizes for `sections` so that they fill `total`.
///
/// Whenever `total` lies between the sum of minima and the sum of maxima,
/// every result respects its section's bounds and the results add up to
/// `total` within one pixel per section.
pub fn distribute_sections(sections: &[Section], total: i32, policy: SurplusPolicy) -> Vec<i32> {
    if sections.is_empty() {
        return Vec::new();
    }
    if let Some(bad) = sections.iter().find(|s| !(s.stretch > 0.0) || !s.stretch.is_finite()) {
        tracing::warn!(stretch = bad.stretch, "stretch factors must be positive");
        return Vec::new();
    }

    let count = sections.len();
    let total = total.max(0) as f64;
    let mut minimum: Vec<f64> = sections.iter().map(|s| s.minimum.max(0) as f64).collect();
    let mut maximum: Vec<f64> = sections
        .iter()
        .map(|s| s.maximum.max(s.minimum).max(0) as f64)
        .collect();
    let mut stretch: Vec<f64> = sections.iter().map(|s| s.stretch).collect();

    let minimum_sum: f64 = minimum.iter().sum();
    let squeezed = total < minimum_sum;
    if squeezed {
        // Not even the floors fit: shrink every section in proportion to its floor.
        stretch = std::mem::replace(&mut minimum, vec![0.0; count]);
        maximum = vec![MAX_EXTENT as f64; count];
    }

    let iteration_limit = 2 * count;
    let mut sizes = vec![0.0f64; count];
    let mut locked = vec![false; count];
    let mut unfinished: Vec<usize> = (0..count).filter(|&i| stretch[i] > 0.0).collect();
    let mut free = total;

    let mut outer = 0;
    while !unfinished.is_empty() && outer < iteration_limit {
        outer += 1;
        grow_proportionally(&mut sizes, &mut unfinished, &maximum, &stretch, &mut free, iteration_limit);

        let mut violated = false;
        for i in 0..count {
            if !locked[i] && sizes[i] < minimum[i] {
                sizes[i] = minimum[i];
                locked[i] = true;
                violated = true;
            }
        }
        if violated {
            free = total;
            unfinished.clear();
            for i in 0..count {
                if locked[i] {
                    free -= sizes[i];
                } else if stretch[i] > 0.0 {
                    unfinished.push(i);
                    sizes[i] = 0.0;
                }
            }
        }
    }
    if !unfinished.is_empty() {
        tracing::warn!(
            ?sections,
            total,
            "section sizing exceeded its iteration bound, result may violate constraints"
        );
    }

    if policy == SurplusPolicy::Distribute && !squeezed {
        let surplus = total - sizes.iter().sum::<f64>();
        if surplus > 1e-9 {
            let stretch_sum: f64 = stretch.iter().sum();
            tracing::debug!(surplus, "distributing space beyond section maxima");
            for (size, factor) in sizes.iter_mut().zip(&stretch) {
                *size += surplus * factor / stretch_sum;
            }
        }
    }

    sizes.into_iter().map(|s| s.round() as i32).collect()
}

/// One proportional growth pass over the `unfinished` sections.
///
/// On return `unfinished` is empty unless the iteration bound was hit.
fn grow_proportionally(
    sizes: &mut [f64],
    unfinished: &mut Vec<usize>,
    maximum: &[f64],
    stretch: &[f64],
    free: &mut f64,
    iteration_limit: usize,
) {
    let mut inner = 0;
    while !unfinished.is_empty() && inner < iteration_limit {
        inner += 1;

        // The section that reaches its maximum first if everyone grows by stretch.
        let mut next_position = 0;
        let mut next_step = f64::INFINITY;
        for (position, &i) in unfinished.iter().enumerate() {
            let step = (maximum[i] - sizes[i]) / stretch[i];
            if step < next_step {
                next_step = step;
                next_position = position;
            }
        }

        let stretch_sum: f64 = unfinished.iter().map(|&i| stretch[i]).sum();
        let reachable_step = *free / stretch_sum;
        if next_step < reachable_step {
            for &i in unfinished.iter() {
                sizes[i] += next_step * stretch[i];
                *free -= next_step * stretch[i];
            }
            unfinished.remove(next_position);
        } else {
            for &i in unfinished.iter() {
                sizes[i] += reachable_step * stretch[i];
            }
            *free = 0.0;
            unfinished.clear();
        }
    }
    if !unfinished.is_empty() {
        tracing::warn!(
            remaining = unfinished.len(),
            "proportional growth exceeded its iteration bound"
        );
    }
}

// =========================================================================
// Tests
// =========================================================================
