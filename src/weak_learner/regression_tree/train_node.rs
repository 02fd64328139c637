//! Defines the nodes of a regression tree under construction.
//!
//! The tree grows leaf-wise:
//! nodes live in a flat arena and
//! the leaf with the largest gain is split next.
use crate::weak_learner::common::{
    type_and_struct::*,
    split_rule::*,
};
use super::node::Node;


/// The best split found for a leaf.
#[derive(Clone, Debug)]
pub(super) struct SplitCandidate {
    pub(super) splitter: Splitter,
    pub(super) gain: LossValue,
}


/// A node of the arena.
pub(super) struct TrainNode {
    pub(super) indices: Vec<usize>,
    pub(super) sum: GradientHessian,
    pub(super) candidate: Option<SplitCandidate>,
    pub(super) children: Option<(Splitter, usize, usize)>,
}


impl TrainNode {
    pub(super) fn new(indices: Vec<usize>, gh: &[GradientHessian]) -> Self {
        let sum = indices.iter()
            .fold(GradientHessian::default(), |acc, &i| acc + gh[i]);
        Self { indices, sum, candidate: None, children: None, }
    }


    /// The Newton step `-G / (H + lambda)` of this node.
    pub(super) fn prediction(&self, lambda_l2: f64) -> f64 {
        let denom = self.sum.hess + lambda_l2;
        if denom <= 0.0 {
            0.0
        } else {
            - self.sum.grad / denom
        }
    }
}


/// Arena of `TrainNode`s. The root has index `0`.
pub(super) struct TrainTree {
    pub(super) nodes: Vec<TrainNode>,
    pub(super) n_leaves: usize,
}


impl TrainTree {
    pub(super) fn new(root: TrainNode) -> Self {
        Self { nodes: vec![root], n_leaves: 1, }
    }


    /// Returns the index of the leaf with the largest gain.
    pub(super) fn best_leaf(&self) -> Option<usize> {
        self.nodes.iter()
            .enumerate()
            .filter(|(_, node)| node.children.is_none())
            .filter_map(|(k, node)| {
                node.candidate.as_ref().map(|cand| (k, cand.gain))
            })
            .fold(None, |best: Option<(usize, LossValue)>, (k, gain)| {
                match best {
                    Some((_, g)) if g >= gain => best,
                    _ => Some((k, gain)),
                }
            })
            .map(|(k, _)| k)
    }


    /// Converts the arena into the recursive `Node`.
    pub(super) fn into_node(self, lambda_l2: f64) -> Node {
        self.build(0, lambda_l2)
    }


    fn build(&self, k: usize, lambda_l2: f64) -> Node {
        let node = &self.nodes[k];
        match &node.children {
            Some((splitter, left, right)) => {
                let left = Box::new(self.build(*left, lambda_l2));
                let right = Box::new(self.build(*right, lambda_l2));
                Node::branch(splitter.clone(), left, right)
            },
            None => Node::leaf(node.prediction(lambda_l2)),
        }
    }
}
