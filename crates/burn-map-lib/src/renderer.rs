//! Rendering adapter for map widgets
//!
//! The pipeline never touches a map library. A widget integration implements
//! [`MapRenderer`], and [`RenderAdapter`] owns the drawn primitives: on every new
//! [`RenderPlan`] it removes what disappeared or changed, adds what is new, and keeps
//! everything else untouched.

use crate::{BoundingBox, Coordinate, RenderPlan, StyledCluster, StyledShape};
use indexmap::IndexMap;
use std::hash::Hash;

/// Drawing primitives offered by a map widget
pub trait MapRenderer {
    /// Opaque reference to a drawn primitive
    type Handle;

    fn add_polygon(&mut self, shape: &StyledShape) -> Self::Handle;

    fn add_marker(&mut self, cluster: &StyledCluster) -> Self::Handle;

    fn remove(&mut self, handle: Self::Handle);

    fn fit_bounds(&mut self, bounds: &BoundingBox);

    fn set_view(&mut self, viewport: &Viewport);
}

/// Center and zoom used when a plan has no bounds
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for Viewport {
    /// Pyrénées-Orientales, where the burn records come from
    fn default() -> Self {
        Self {
            center: Coordinate::new(42.6, 2.6),
            zoom: 9,
        }
    }
}

/// What one [`RenderAdapter::apply`] call changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

/// Where the camera was last sent
#[derive(Clone, Copy, Debug, PartialEq)]
enum Framing {
    Bounds(BoundingBox),
    Default,
}

/// Keeps a [`MapRenderer`] in sync with successive render plans
pub struct RenderAdapter<R: MapRenderer> {
    renderer: R,
    default_viewport: Viewport,
    shapes: Vec<(StyledShape, R::Handle)>,
    clusters: Vec<(StyledCluster, R::Handle)>,
    framing: Option<Framing>,
}

impl<R: MapRenderer> RenderAdapter<R> {
    pub fn new(renderer: R, default_viewport: Viewport) -> Self {
        Self {
            renderer,
            default_viewport,
            shapes: Vec::new(),
            clusters: Vec::new(),
            framing: None,
        }
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Number of primitives currently drawn
    #[inline]
    pub fn drawn_count(&self) -> usize {
        self.shapes.len() + self.clusters.len()
    }

    /// Bring the map in line with `plan`
    ///
    /// Removals are issued before additions. The camera only moves when the plan's
    /// framing differs from the last one applied.
    pub fn apply(&mut self, plan: &RenderPlan) -> DiffStats {
        #[cfg(feature = "profiling")]
        profiling::scope!("RenderAdapter::apply");

        let mut stats = DiffStats::default();

        let drawn_shapes = std::mem::take(&mut self.shapes);
        self.shapes = reconcile(
            &mut self.renderer,
            drawn_shapes,
            &plan.shapes,
            |shape: &StyledShape| shape.feature_id,
            R::add_polygon,
            &mut stats,
        );

        let drawn_clusters = std::mem::take(&mut self.clusters);
        self.clusters = reconcile(
            &mut self.renderer,
            drawn_clusters,
            &plan.clusters,
            |cluster: &StyledCluster| cluster.owner_key,
            R::add_marker,
            &mut stats,
        );

        let framing = match plan.bounds {
            Some(bounds) => Framing::Bounds(bounds),
            None => Framing::Default,
        };
        if self.framing != Some(framing) {
            match &framing {
                Framing::Bounds(bounds) => self.renderer.fit_bounds(bounds),
                Framing::Default => self.renderer.set_view(&self.default_viewport),
            }
            self.framing = Some(framing);
        }

        tracing::debug!(
            "Render plan applied: {} added, {} removed, {} unchanged",
            stats.added,
            stats.removed,
            stats.unchanged
        );
        stats
    }

    /// Remove every drawn primitive
    pub fn clear(&mut self) {
        for (_, handle) in self.shapes.drain(..) {
            self.renderer.remove(handle);
        }
        for (_, handle) in self.clusters.drain(..) {
            self.renderer.remove(handle);
        }
        self.framing = None;
    }
}

/// Match drawn items against the next plan's items by key and equality
///
/// Keys only bucket the search; an item is reused when it is equal. Unmatched drawn
/// items are removed (in drawing order), then unmatched plan items are added (in plan
/// order). The result is ordered kept-first.
fn reconcile<R, T, K>(
    renderer: &mut R,
    drawn: Vec<(T, R::Handle)>,
    next: &[T],
    key: impl Fn(&T) -> K,
    add: impl Fn(&mut R, &T) -> R::Handle,
    stats: &mut DiffStats,
) -> Vec<(T, R::Handle)>
where
    R: MapRenderer,
    T: Clone + PartialEq,
    K: Hash + Eq,
{
    let mut previous: IndexMap<K, Vec<(T, R::Handle)>> = IndexMap::new();
    for entry in drawn {
        previous.entry(key(&entry.0)).or_default().push(entry);
    }

    let mut kept = Vec::with_capacity(next.len());
    let mut pending = Vec::new();
    for item in next {
        let reused = previous.get_mut(&key(item)).and_then(|slot| {
            slot.iter()
                .position(|(drawn, _)| drawn == item)
                .map(|index| slot.remove(index))
        });
        match reused {
            Some(entry) => {
                stats.unchanged += 1;
                kept.push(entry);
            }
            None => pending.push(item),
        }
    }

    for (_, handle) in previous.into_values().flatten() {
        renderer.remove(handle);
        stats.removed += 1;
    }
    for item in pending {
        let handle = add(renderer, item);
        kept.push((item.clone(), handle));
        stats.added += 1;
    }

    kept
}
