//! The cache owned by [`WeightedLogLoss`](super::WeightedLogLoss).
//!
//! Probabilities, the loss value, and the gradient all depend on
//! the current parameters.
//! They are dropped together when the parameters change,
//! so a reader never sees a mix of old and new values.


/// The state of the probability cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// The parameters changed since the last refresh.
    Stale,
    /// A refresh is running.
    Recomputing,
    /// Probabilities match the current parameters.
    Valid,
}


#[derive(Debug)]
pub(crate) struct LossCache {
    state: CacheState,
    log_probs: Vec<Vec<f64>>,
    probs: Vec<Vec<f64>>,
    value: Option<f64>,
    gradient: Option<Vec<f64>>,
}


impl LossCache {
    pub(crate) fn new() -> Self {
        Self {
            state: CacheState::Stale,
            log_probs: Vec::new(),
            probs: Vec::new(),
            value: None,
            gradient: None,
        }
    }


    #[inline]
    pub(crate) fn state(&self) -> CacheState {
        self.state
    }


    /// Drops every cached quantity.
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.state = CacheState::Stale;
        self.value = None;
        self.gradient = None;
    }


    #[inline]
    pub(crate) fn begin_refresh(&mut self) {
        debug_assert_eq!(self.state, CacheState::Stale);
        self.state = CacheState::Recomputing;
    }


    #[inline]
    pub(crate) fn finish_refresh(
        &mut self,
        log_probs: Vec<Vec<f64>>,
        probs: Vec<Vec<f64>>,
    )
    {
        debug_assert_eq!(self.state, CacheState::Recomputing);
        self.log_probs = log_probs;
        self.probs = probs;
        self.state = CacheState::Valid;
    }


    #[inline]
    pub(crate) fn log_probs(&self) -> &[Vec<f64>] {
        debug_assert_eq!(self.state, CacheState::Valid);
        &self.log_probs[..]
    }


    #[inline]
    pub(crate) fn probs(&self) -> &[Vec<f64>] {
        debug_assert_eq!(self.state, CacheState::Valid);
        &self.probs[..]
    }


    #[inline]
    pub(crate) fn value(&self) -> Option<f64> {
        self.value
    }


    #[inline]
    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }


    #[inline]
    pub(crate) fn gradient(&self) -> Option<&[f64]> {
        self.gradient.as_deref()
    }


    #[inline]
    pub(crate) fn set_gradient(&mut self, gradient: Vec<f64>) {
        self.gradient = Some(gradient);
    }
}
