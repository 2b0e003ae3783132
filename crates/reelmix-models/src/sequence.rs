//! Generated sequences and their deduplication signature.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Clip, ClipId, ClipRole};

/// Identifier of a sequence, unique within one generation run.
///
/// Ordinals start at 1 and follow creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SequenceId(pub u32);

impl SequenceId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-normalized identity of a sequence's constituent clips.
///
/// Selling-point order is not part of the signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationSignature {
    pub hook: ClipId,
    /// Sorted ascending
    pub points: Vec<ClipId>,
    pub cta: ClipId,
}

impl CombinationSignature {
    pub fn new<'a, I>(hook: &ClipId, points: I, cta: &ClipId) -> Self
    where
        I: IntoIterator<Item = &'a ClipId>,
    {
        let mut points: Vec<ClipId> = points.into_iter().cloned().collect();
        points.sort();
        Self {
            hook: hook.clone(),
            points,
            cta: cta.clone(),
        }
    }
}

impl fmt::Display for CombinationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points: Vec<&str> = self.points.iter().map(|p| p.as_str()).collect();
        write!(f, "{}|{}|{}", self.hook, points.join(","), self.cta)
    }
}

/// An ordered, immutable composition: hook, selling points, cta.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Sequence {
    pub id: SequenceId,
    /// Clip snapshots captured at generation time
    pub clips: Vec<Clip>,
    /// Sum of clip durations, fixed at creation
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}

impl Sequence {
    /// Lay out `hook`, then `points` in the given order, then `cta`.
    pub fn from_parts(id: SequenceId, hook: Clip, points: Vec<Clip>, cta: Clip) -> Self {
        let mut clips = Vec::with_capacity(points.len() + 2);
        clips.push(hook);
        clips.extend(points);
        clips.push(cta);

        let duration = clips.iter().map(|c| c.duration).sum();

        Self {
            id,
            clips,
            duration,
            created_at: Utc::now(),
        }
    }

    pub fn hook(&self) -> &Clip {
        &self.clips[0]
    }

    pub fn selling_points(&self) -> &[Clip] {
        &self.clips[1..self.clips.len() - 1]
    }

    pub fn cta(&self) -> &Clip {
        &self.clips[self.clips.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn signature(&self) -> CombinationSignature {
        CombinationSignature::new(
            &self.hook().id,
            self.selling_points().iter().map(|c| &c.id),
            &self.cta().id,
        )
    }

    /// Whether the clips form hook, selling points, cta with the roles
    /// they carried at generation time.
    pub fn is_well_formed(&self) -> bool {
        self.clips.len() >= 2
            && self.hook().is_role(ClipRole::Hook)
            && self.cta().is_role(ClipRole::Cta)
            && self
                .selling_points()
                .iter()
                .all(|c| c.is_role(ClipRole::SellingPoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: &str, duration: f64, role: ClipRole) -> Clip {
        Clip::new(format!("{id}.mp4"), duration, role).with_id(ClipId::from_string(id))
    }

    #[test]
    fn test_layout_and_duration() {
        let seq = Sequence::from_parts(
            SequenceId(1),
            clip("h", 2.0, ClipRole::Hook),
            vec![clip("b", 3.0, ClipRole::SellingPoint), clip("a", 1.0, ClipRole::SellingPoint)],
            clip("c", 1.5, ClipRole::Cta),
        );

        assert_eq!(seq.len(), 4);
        assert_eq!(seq.hook().id.as_str(), "h");
        assert_eq!(seq.selling_points()[0].id.as_str(), "b");
        assert_eq!(seq.cta().id.as_str(), "c");
        assert!((seq.duration - 7.5).abs() < 1e-9);
        assert!(seq.is_well_formed());
    }

    #[test]
    fn test_signature_ignores_point_order() {
        let h = clip("h", 1.0, ClipRole::Hook);
        let c = clip("c", 1.0, ClipRole::Cta);
        let a = clip("a", 1.0, ClipRole::SellingPoint);
        let b = clip("b", 1.0, ClipRole::SellingPoint);

        let one = Sequence::from_parts(
            SequenceId(1),
            h.clone(),
            vec![a.clone(), b.clone()],
            c.clone(),
        );
        let two = Sequence::from_parts(SequenceId(2), h, vec![b, a], c);

        assert_eq!(one.signature(), two.signature());
        assert_eq!(one.signature().to_string(), "h|a,b|c");
    }

    #[test]
    fn test_zero_point_sequence() {
        let seq = Sequence::from_parts(
            SequenceId(1),
            clip("h", 2.0, ClipRole::Hook),
            Vec::new(),
            clip("c", 1.0, ClipRole::Cta),
        );
        assert!(seq.selling_points().is_empty());
        assert_eq!(seq.signature().to_string(), "h||c");
        assert!((seq.duration - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_not_recomputed() {
        let mut hook = clip("h", 2.0, ClipRole::Hook);
        let seq = Sequence::from_parts(
            SequenceId(1),
            hook.clone(),
            Vec::new(),
            clip("c", 1.0, ClipRole::Cta),
        );
        hook.duration = 10.0;
        assert!((seq.duration - 3.0).abs() < 1e-9);
    }
}
