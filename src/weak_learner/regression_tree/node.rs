//! A node struct used in the regression tree algorithm.
use serde::{Serialize, Deserialize};

use crate::{Regressor, Sample};
use crate::weak_learner::common::split_rule::*;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Node {
    Branch {
        splitter: Splitter,
        left:     Box<Node>,
        right:    Box<Node>,
    },
    Leaf {
        value: f64,
    },
}


impl Node {
    pub(crate) fn branch(
        splitter: Splitter,
        left:     Box<Node>,
        right:    Box<Node>,
    ) -> Self
    {
        Self::Branch { splitter, left, right, }
    }


    pub(crate) fn leaf(value: f64) -> Self {
        Self::Leaf { value, }
    }


    /// Returns the number of leaves of this sub-tree.
    pub(crate) fn leaves(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => left.leaves() + right.leaves(),
            Self::Leaf { .. } => 1,
        }
    }
}


impl Regressor for Node {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        match self {
            Self::Branch { splitter, left, right, } => {
                match splitter.split(sample, row) {
                    LeftRight::Left  => left.predict(sample, row),
                    LeftRight::Right => right.predict(sample, row),
                }
            },
            Self::Leaf { value, } => *value,
        }
    }
}
