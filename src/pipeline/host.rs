//! Host-chain resolution and the per-run host volume arena.

use std::collections::HashSet;
use std::ops::ControlFlow;

use slotmap::SlotMap;
use tracing::debug;

use crate::config::ClassificationTolerance;
use crate::error::{ModelError, Result};
use crate::kernel::SolidKernel;
use crate::model::{Category, ElementId, ModelProvider};
use crate::topology::Solid;

use super::algebra::{is_intersecting, union_all};

slotmap::new_key_type! {
    /// Key of a [`HostVolume`] in a [`HostArena`].
    pub struct HostId;
}

/// The merged volume of a terminal host and the elements folded into it.
#[derive(Debug, Clone)]
pub struct HostVolume {
    element: ElementId,
    category: Category,
    family_name: Option<String>,
    type_name: String,
    subordinates: Vec<ElementId>,
    solids: Vec<Solid>,
    merged: Solid,
    intersections: Vec<HostId>,
    intersection_solids: Vec<Solid>,
}

impl HostVolume {
    /// The terminal host element.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Hosted elements folded into this volume, in first-seen order.
    #[must_use]
    pub fn subordinates(&self) -> &[ElementId] {
        &self.subordinates
    }

    /// Component solids: the host's own followed by its subordinates'.
    #[must_use]
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    /// Union of all component solids.
    #[must_use]
    pub fn merged(&self) -> &Solid {
        &self.merged
    }

    /// Host volumes found touching or overlapping this one.
    #[must_use]
    pub fn intersections(&self) -> &[HostId] {
        &self.intersections
    }

    /// The component solids of the neighbours that triggered each match.
    #[must_use]
    pub fn intersection_solids(&self) -> &[Solid] {
        &self.intersection_solids
    }
}

/// Arena of the host volumes of one run, iterated in selection order.
#[derive(Debug, Default)]
pub struct HostArena {
    volumes: SlotMap<HostId, HostVolume>,
    order: Vec<HostId>,
}

impl HostArena {
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: HostId) -> Option<&HostVolume> {
        self.volumes.get(id)
    }

    /// Host ids in order of first appearance in the selection.
    #[must_use]
    pub fn ids(&self) -> &[HostId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (HostId, &HostVolume)> {
        self.order.iter().filter_map(|id| self.volumes.get(*id).map(|v| (*id, v)))
    }

    fn insert(&mut self, volume: HostVolume) -> HostId {
        let id = self.volumes.insert(volume);
        self.order.push(id);
        id
    }

    /// Records, for every host, the other hosts whose component solids touch
    /// or overlap its merged solid. The first matching component of each
    /// neighbour is kept.
    ///
    /// `on_item` runs after each host; `Break` stops the scan with the
    /// remaining hosts unclassified.
    pub fn classify<K, F>(
        &mut self,
        kernel: &K,
        tolerance: &ClassificationTolerance,
        mut on_item: F,
    ) -> ControlFlow<()>
    where
        K: SolidKernel + ?Sized,
        F: FnMut(usize) -> ControlFlow<()>,
    {
        for (done, id) in self.order.clone().into_iter().enumerate() {
            let Some(host) = self.volumes.get(id) else {
                continue;
            };
            let mut matches = Vec::new();
            for other_id in &self.order {
                let Some(other) = self.volumes.get(*other_id) else {
                    continue;
                };
                if other.element == host.element {
                    continue;
                }
                if let Some(solid) = other
                    .solids
                    .iter()
                    .find(|s| is_intersecting(kernel, &host.merged, s, tolerance))
                {
                    matches.push((*other_id, solid.clone()));
                }
            }
            if let Some(host) = self.volumes.get_mut(id) {
                for (other_id, solid) in matches {
                    host.intersections.push(other_id);
                    host.intersection_solids.push(solid);
                }
            }
            on_item(done + 1)?;
        }
        ControlFlow::Continue(())
    }

    /// Union of the merged solids of every host intersecting `id`.
    pub fn obstruction<K: SolidKernel + ?Sized>(&self, id: HostId, kernel: &K) -> Option<Solid> {
        let host = self.volumes.get(id)?;
        let solids: Vec<Solid> = host
            .intersections
            .iter()
            .filter_map(|other| self.volumes.get(*other))
            .map(|other| other.merged.clone())
            .collect();
        union_all(kernel, &solids)
    }
}

/// Outcome of climbing the host chain of one selected element.
struct Climb {
    terminal: ElementId,
    subordinates: Vec<ElementId>,
}

/// Resolves the selection into one host volume per distinct terminal host.
///
/// Elements without usable geometry are dropped.
///
/// # Errors
///
/// Returns [`ModelError::EmptySelection`] for an empty selection and
/// [`ModelError::UnknownElement`] for ids the model does not know.
pub fn resolve_hosts<M, K>(model: &M, kernel: &K, selection: &[ElementId]) -> Result<HostArena>
where
    M: ModelProvider + ?Sized,
    K: SolidKernel + ?Sized,
{
    if selection.is_empty() {
        return Err(ModelError::EmptySelection.into());
    }

    let mut groups: Vec<Climb> = Vec::new();
    for &id in selection {
        if model.element(id).is_none() {
            return Err(ModelError::UnknownElement(id).into());
        }
        let Some(climb) = climb(model, kernel, id) else {
            debug!(element = %id, "no usable geometry, element dropped");
            continue;
        };
        match groups.iter_mut().find(|g| g.terminal == climb.terminal) {
            Some(group) => {
                for sub in climb.subordinates {
                    if !group.subordinates.contains(&sub) {
                        group.subordinates.push(sub);
                    }
                }
            }
            None => groups.push(climb),
        }
    }

    let mut arena = HostArena::default();
    for group in groups {
        let Some(element) = model.element(group.terminal) else {
            continue;
        };
        let mut solids = fetch_solids(model, group.terminal);
        for sub in &group.subordinates {
            solids.extend(fetch_solids(model, *sub));
        }
        let Some(merged) = union_all(kernel, &solids) else {
            continue;
        };
        arena.insert(HostVolume {
            element: group.terminal,
            category: element.category(),
            family_name: element.family_name().map(str::to_owned),
            type_name: element.type_name().to_owned(),
            subordinates: group.subordinates,
            solids,
            merged,
            intersections: Vec::new(),
            intersection_solids: Vec::new(),
        });
    }
    Ok(arena)
}

/// Climbs from `start` while the next host has geometry of its own.
fn climb<M, K>(model: &M, kernel: &K, start: ElementId) -> Option<Climb>
where
    M: ModelProvider + ?Sized,
    K: SolidKernel + ?Sized,
{
    let mut union = union_all(kernel, &fetch_solids(model, start))?;
    let mut subordinates = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut current = start;

    while let Some(host) = model.host_of(current) {
        if !visited.insert(host) {
            debug!(element = %current, host = %host, "host cycle, climb stopped");
            break;
        }
        let mut solids = fetch_solids(model, host);
        if solids.is_empty() {
            break;
        }
        solids.push(union);
        let Some(next) = union_all(kernel, &solids) else {
            break;
        };
        union = next;
        subordinates.push(current);
        current = host;
    }

    Some(Climb {
        terminal: current,
        subordinates,
    })
}

/// Valid solids of an element, extracted with its category's options.
fn fetch_solids<M: ModelProvider + ?Sized>(model: &M, id: ElementId) -> Vec<Solid> {
    let Some(element) = model.element(id) else {
        return Vec::new();
    };
    model
        .solids(id, &element.category().geometry_options())
        .into_iter()
        .filter(|s| s.face_count() > 0 && s.volume() > 0.0)
        .collect()
}
