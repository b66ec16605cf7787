//! chain/graph.rs
//! Index-based link graph shared by pull and push chains.
//!
//! Every stage lives in an arena slot addressed by a `StageId`. A node keeps
//! one exclusive forward link (`next`) and one lookup-only back link
//! (`prev`). Pull chains read `next` as "upstream", push chains as
//! "downstream". Slots of removed stages are never reused.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChainConfig;
use crate::telemetry::{ChainSnapshot, StageCounters, StageSnapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub(crate) usize);

impl StageId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown stage {0}")]
    UnknownStage(StageId),

    /// Self link or a link that would close a cycle.
    #[error("invalid chain state linking {from} -> {to}: {reason}")]
    InvalidChainState { from: StageId, to: StageId, reason: &'static str },

    /// Operation does not apply to this kind of stage.
    #[error("stage {id} is a {kind}, expected {expected}")]
    WrongStageKind { id: StageId, kind: &'static str, expected: &'static str },
}

/// Short name used in logs and snapshots.
pub trait StageKind {
    fn kind(&self) -> &'static str;
}

#[derive(Debug)]
struct Node<S> {
    stage: S,
    next: Option<StageId>,
    prev: Option<StageId>,
    counters: StageCounters,
}

/// Arena of stages plus their links.
///
/// Not safe for concurrent access: wrap the whole chain in a lock if several
/// threads must drive it.
#[derive(Debug)]
pub struct Chain<S> {
    nodes: Vec<Option<Node<S>>>,
    config: ChainConfig,
}

impl<S> Default for Chain<S> {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl<S> Chain<S> {
    pub fn new(config: ChainConfig) -> Self {
        Self { nodes: Vec::new(), config }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Add an unlinked stage.
    pub fn add(&mut self, stage: S) -> StageId {
        let id = StageId(self.nodes.len());
        self.nodes.push(Some(Node { stage, next: None, prev: None, counters: StageCounters::default() }));
        id
    }

    pub fn contains(&self, id: StageId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    /// Live stages.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|_| StageId(i)))
    }

    fn node(&self, id: StageId) -> Result<&Node<S>, ChainError> {
        self.nodes.get(id.0).and_then(Option::as_ref).ok_or(ChainError::UnknownStage(id))
    }

    fn node_mut(&mut self, id: StageId) -> Result<&mut Node<S>, ChainError> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut).ok_or(ChainError::UnknownStage(id))
    }

    pub fn stage(&self, id: StageId) -> Result<&S, ChainError> {
        Ok(&self.node(id)?.stage)
    }

    pub fn stage_mut(&mut self, id: StageId) -> Result<&mut S, ChainError> {
        Ok(&mut self.node_mut(id)?.stage)
    }

    pub fn next(&self, id: StageId) -> Result<Option<StageId>, ChainError> {
        Ok(self.node(id)?.next)
    }

    pub fn prev(&self, id: StageId) -> Result<Option<StageId>, ChainError> {
        Ok(self.node(id)?.prev)
    }

    pub fn counters(&self, id: StageId) -> Result<&StageCounters, ChainError> {
        Ok(&self.node(id)?.counters)
    }

    /// Apply `f` to the stage's counters when telemetry is on.
    pub(crate) fn record(&mut self, id: StageId, f: impl FnOnce(&mut StageCounters)) {
        if !self.config.telemetry {
            return;
        }
        if let Ok(node) = self.node_mut(id) {
            f(&mut node.counters);
        }
    }

    /// Reject self links, unknown ids and links that would close a cycle.
    pub(crate) fn check_link(&self, from: StageId, to: StageId) -> Result<(), ChainError> {
        self.node(from)?;
        self.node(to)?;
        if from == to {
            return Err(ChainError::InvalidChainState { from, to, reason: "stage linked to itself" });
        }

        // Links are acyclic, so this walk terminates.
        let mut cursor = Some(to);
        while let Some(id) = cursor {
            if id == from {
                return Err(ChainError::InvalidChainState { from, to, reason: "link would close a cycle" });
            }
            cursor = self.node(id)?.next;
        }
        Ok(())
    }

    /// Point `from` at `to`. Last write wins on both ends: `from` drops its
    /// old `next`, and `to` is detached from whatever pointed at it before.
    /// Returns the replaced `next` of `from`, if any.
    pub fn link(&mut self, from: StageId, to: StageId) -> Result<Option<StageId>, ChainError> {
        self.check_link(from, to)?;

        let old_next = self.node(from)?.next;
        if old_next == Some(to) {
            return Ok(None);
        }
        if let Some(old) = old_next {
            self.node_mut(old)?.prev = None;
        }

        if let Some(old_prev) = self.node(to)?.prev {
            log::debug!("chain: detaching {to} from previous neighbour {old_prev}");
            self.node_mut(old_prev)?.next = None;
        }

        self.node_mut(from)?.next = Some(to);
        self.node_mut(to)?.prev = Some(from);
        log::debug!("chain: linked {from} -> {to}");
        Ok(old_next)
    }

    /// Clear the forward link of `from`. Returns the former `next`.
    pub fn unlink(&mut self, from: StageId) -> Result<Option<StageId>, ChainError> {
        let old = self.node_mut(from)?.next.take();
        if let Some(old) = old {
            self.node_mut(old)?.prev = None;
            log::debug!("chain: unlinked {from} -> {old}");
        }
        Ok(old)
    }

    /// Take a stage out of the chain. Its neighbours stay in place with
    /// their links to it cleared; they are not spliced together.
    pub fn remove(&mut self, id: StageId) -> Result<S, ChainError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ChainError::UnknownStage(id))?;

        if let Some(prev) = node.prev {
            if let Ok(p) = self.node_mut(prev) {
                p.next = None;
            }
        }
        if let Some(next) = node.next {
            if let Ok(n) = self.node_mut(next) {
                n.prev = None;
            }
        }
        log::debug!("chain: removed stage {id}");
        Ok(node.stage)
    }

    /// Follow `next` links starting at `head` (inclusive).
    pub fn walk(&self, head: StageId) -> Result<Vec<StageId>, ChainError> {
        let mut out = Vec::new();
        let mut cursor = Some(head);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.node(id)?.next;
        }
        Ok(out)
    }
}

impl<S: StageKind> Chain<S> {
    pub fn snapshot(&self) -> ChainSnapshot {
        let stages = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                n.as_ref().map(|n| StageSnapshot {
                    id: i,
                    kind: n.stage.kind().to_string(),
                    next: n.next.map(StageId::index),
                    counters: n.counters.clone(),
                })
            })
            .collect();
        ChainSnapshot { stages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(n: usize) -> (Chain<u8>, Vec<StageId>) {
        let mut c = Chain::default();
        let ids = (0..n).map(|i| c.add(i as u8)).collect();
        (c, ids)
    }

    #[test]
    fn link_and_walk() {
        let (mut c, ids) = chain_of(3);
        c.link(ids[0], ids[1]).unwrap();
        c.link(ids[1], ids[2]).unwrap();
        assert_eq!(c.walk(ids[0]).unwrap(), ids);
        assert_eq!(c.prev(ids[2]).unwrap(), Some(ids[1]));
    }

    #[test]
    fn self_link_rejected() {
        let (mut c, ids) = chain_of(1);
        assert!(matches!(c.link(ids[0], ids[0]), Err(ChainError::InvalidChainState { .. })));
    }

    #[test]
    fn cycle_rejected_and_links_untouched() {
        let (mut c, ids) = chain_of(3);
        c.link(ids[0], ids[1]).unwrap();
        c.link(ids[1], ids[2]).unwrap();
        assert!(matches!(c.link(ids[2], ids[0]), Err(ChainError::InvalidChainState { .. })));
        assert_eq!(c.next(ids[2]).unwrap(), None);
        assert_eq!(c.prev(ids[0]).unwrap(), None);
    }

    #[test]
    fn relink_detaches_old_neighbours() {
        let (mut c, ids) = chain_of(3);
        c.link(ids[0], ids[1]).unwrap();
        assert_eq!(c.link(ids[0], ids[2]).unwrap(), Some(ids[1]));
        assert_eq!(c.prev(ids[1]).unwrap(), None);

        // ids[2] now moves under ids[1]; ids[0] loses it.
        c.link(ids[1], ids[2]).unwrap();
        assert_eq!(c.next(ids[0]).unwrap(), None);
        assert_eq!(c.prev(ids[2]).unwrap(), Some(ids[1]));
    }

    #[test]
    fn remove_clears_neighbour_links() {
        let (mut c, ids) = chain_of(3);
        c.link(ids[0], ids[1]).unwrap();
        c.link(ids[1], ids[2]).unwrap();
        assert_eq!(c.remove(ids[1]).unwrap(), 1);
        assert_eq!(c.next(ids[0]).unwrap(), None);
        assert_eq!(c.prev(ids[2]).unwrap(), None);
        assert_eq!(c.len(), 2);
        assert!(matches!(c.stage(ids[1]), Err(ChainError::UnknownStage(_))));
    }
}
