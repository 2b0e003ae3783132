//! In-memory clip registry.
//!
//! Holds clip metadata only. Payload bytes live in a [`crate::PayloadStore`].
//! Sequences own snapshots of the clips they were built from, so edits and
//! removals here never reach sequences that were already generated.

use reelmix_models::{Clip, ClipId, ClipRole};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Insertion-ordered store of clip records.
#[derive(Debug, Clone, Default)]
pub struct ClipRegistry {
    clips: Vec<Clip>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip. A clip with the same ID is replaced in place.
    pub fn add(&mut self, clip: Clip) -> ClipId {
        let id = clip.id.clone();
        match self.position(&id) {
            Some(pos) => self.clips[pos] = clip,
            None => self.clips.push(clip),
        }
        debug!(clip_id = %id, total = self.clips.len(), "Clip registered");
        id
    }

    pub fn get(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    /// Change a clip's role.
    pub fn set_role(&mut self, id: &ClipId, role: ClipRole) -> EngineResult<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| EngineError::ClipNotFound(id.clone()))?;
        self.clips[pos].set_role(role);
        Ok(())
    }

    pub fn remove(&mut self, id: &ClipId) -> Option<Clip> {
        let pos = self.position(id)?;
        Some(self.clips.remove(pos))
    }

    /// Remove every listed clip; returns how many were present.
    pub fn remove_many<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a ClipId>,
    {
        let ids: Vec<&ClipId> = ids.into_iter().collect();
        let before = self.clips.len();
        self.clips.retain(|c| !ids.contains(&&c.id));
        before - self.clips.len()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }

    /// Copy of the current clip set, in insertion order.
    pub fn snapshot(&self) -> Vec<Clip> {
        self.clips.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn count_by_role(&self, role: ClipRole) -> usize {
        self.clips.iter().filter(|c| c.is_role(role)).count()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn position(&self, id: &ClipId) -> Option<usize> {
        self.clips.iter().position(|c| &c.id == id)
    }
}
