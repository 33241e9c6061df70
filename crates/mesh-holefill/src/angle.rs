//! Boundary corner records and the arena that stores them.
//!
//! The corners of the live front form a circular doubly-linked list. Links
//! are generation-checked arena indices rather than direct references, so a
//! stale id left over from a splice or merge is detected instead of
//! silently pointing at reused storage.

/// Generation-checked handle to an [`Angle`] in an [`AngleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AngleId {
    index: u32,
    generation: u32,
}

impl AngleId {
    /// Sentinel for a not-yet-linked neighbor.
    pub const INVALID: AngleId = AngleId {
        index: u32::MAX,
        generation: 0,
    };

    /// Whether this id refers to a slot at all.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }
}

/// A boundary corner: the vertex triple (previous, current, next), the
/// derived interior angle in degrees, and links to the neighboring corners.
#[derive(Debug, Clone)]
pub struct Angle {
    /// Filling index of the previous front vertex.
    pub prev_vertex: u32,
    /// Filling index of the corner vertex itself.
    pub mid_vertex: u32,
    /// Filling index of the next front vertex.
    pub next_vertex: u32,

    /// Interior angle at `mid_vertex`, in degrees.
    pub degree: f64,

    /// Neighboring corner counter-clockwise before this one.
    pub prev: AngleId,
    /// Neighboring corner counter-clockwise after this one.
    pub next: AngleId,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Angle>,
}

/// Arena holding the live corners of one fill invocation.
#[derive(Debug, Default)]
pub struct AngleArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl AngleArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no corners are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a corner and return its handle.
    pub fn insert(&mut self, angle: Angle) -> AngleId {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(angle);
            AngleId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(angle),
            });
            AngleId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Remove a corner. Returns None if the id is stale or invalid.
    pub fn remove(&mut self, id: AngleId) -> Option<Angle> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.entry.is_none() {
            return None;
        }

        let angle = slot.entry.take();
        slot.generation += 1;
        self.free.push(id.index);
        self.len -= 1;
        angle
    }

    /// Look up a corner. Returns None if the id is stale or invalid.
    pub fn get(&self, id: AngleId) -> Option<&Angle> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Mutable lookup. Returns None if the id is stale or invalid.
    pub fn get_mut(&mut self, id: AngleId) -> Option<&mut Angle> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Find the corner whose middle vertex is `mid`.
    pub fn find_by_mid(&self, mid: u32) -> Option<AngleId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let angle = slot.entry.as_ref()?;
            (angle.mid_vertex == mid).then_some(AngleId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Reindex vertex references after a filling vertex was removed:
    /// every reference greater than `removed` shifts down by one.
    pub fn shift_vertex_indices(&mut self, removed: u32) {
        for slot in &mut self.slots {
            if let Some(angle) = slot.entry.as_mut() {
                for ix in [
                    &mut angle.prev_vertex,
                    &mut angle.mid_vertex,
                    &mut angle.next_vertex,
                ] {
                    if *ix > removed {
                        *ix -= 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(mid: u32) -> Angle {
        Angle {
            prev_vertex: 0,
            mid_vertex: mid,
            next_vertex: 0,
            degree: 90.0,
            prev: AngleId::INVALID,
            next: AngleId::INVALID,
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let mut arena = AngleArena::new();
        let id = arena.insert(corner(7));

        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id).unwrap().mid_vertex, 7);

        let removed = arena.remove(id).unwrap();
        assert_eq!(removed.mid_vertex, 7);
        assert!(arena.is_empty());
        assert!(arena.get(id).is_none());
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut arena = AngleArena::new();
        let id = arena.insert(corner(1));
        arena.remove(id);

        // The slot is reused, but the old id must stay dead.
        let new_id = arena.insert(corner(2));
        assert!(arena.get(id).is_none());
        assert!(arena.remove(id).is_none());
        assert_eq!(arena.get(new_id).unwrap().mid_vertex, 2);
    }

    #[test]
    fn test_find_by_mid() {
        let mut arena = AngleArena::new();
        arena.insert(corner(3));
        let id = arena.insert(corner(5));

        assert_eq!(arena.find_by_mid(5), Some(id));
        assert!(arena.find_by_mid(9).is_none());
    }

    #[test]
    fn test_shift_vertex_indices() {
        let mut arena = AngleArena::new();
        let id = arena.insert(Angle {
            prev_vertex: 2,
            mid_vertex: 5,
            next_vertex: 4,
            degree: 90.0,
            prev: AngleId::INVALID,
            next: AngleId::INVALID,
        });

        arena.shift_vertex_indices(3);

        let angle = arena.get(id).unwrap();
        assert_eq!(angle.prev_vertex, 2);
        assert_eq!(angle.mid_vertex, 4);
        assert_eq!(angle.next_vertex, 3);
    }
}
