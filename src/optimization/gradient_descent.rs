use tracing::debug;

use crate::Result;


/// An objective that can be minimized by [`GradientDescent`].
pub trait Optimizable {
    /// Returns the objective value at the current parameters.
    fn value(&mut self) -> f64;


    /// Returns the gradient at the current parameters.
    fn gradient(&mut self) -> Vec<f64>;


    /// Returns a copy of the current parameters.
    fn parameters(&self) -> Vec<f64>;


    /// Replace the current parameters.
    fn set_parameters(&mut self, parameters: Vec<f64>) -> Result<()>;
}


/// Default maximal number of iterations.
const DEFAULT_MAX_ITER: usize = 100;
/// Sufficient decrease constant of the Armijo condition.
const ARMIJO_CONSTANT: f64 = 1e-4;
/// The step size shrinks by this factor on each rejected trial.
const BACKTRACK_RATE: f64 = 0.5;
/// Line search gives up below this step size.
const MIN_STEP_SIZE: f64 = 1e-12;


/// Gradient descent with an Armijo backtracking line search.
/// The accepted step size of an iteration, doubled,
/// is the first trial of the next iteration.
#[derive(Clone, Debug)]
pub struct GradientDescent {
    max_iter: usize,
    tolerance: f64,
    initial_step: f64,
}


impl Default for GradientDescent {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITER)
    }
}


impl GradientDescent {
    /// Construct a new instance that runs at most `max_iter` iterations.
    pub fn new(max_iter: usize) -> Self {
        Self { max_iter, tolerance: 1e-6, initial_step: 1.0, }
    }


    /// Stop when the squared norm of the gradient is below `tolerance`.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }


    /// Set the first trial step size.
    pub fn initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }


    /// Minimizes `objective` from its current parameters
    /// and returns the final objective value.
    pub fn minimize<O>(&self, objective: &mut O) -> Result<f64>
        where O: Optimizable
    {
        let mut value = objective.value();
        let mut step = self.initial_step;

        for iter in 1..=self.max_iter {
            let gradient = objective.gradient();
            let sq_norm = gradient.iter().map(|g| g * g).sum::<f64>();
            if sq_norm <= self.tolerance { break; }

            let theta = objective.parameters();
            let mut accepted = false;
            while step >= MIN_STEP_SIZE {
                let next = theta.iter()
                    .zip(&gradient[..])
                    .map(|(t, g)| t - step * g)
                    .collect::<Vec<_>>();
                objective.set_parameters(next)?;
                let next_value = objective.value();

                if next_value <= value - ARMIJO_CONSTANT * step * sq_norm {
                    value = next_value;
                    accepted = true;
                    break;
                }
                step *= BACKTRACK_RATE;
            }

            if !accepted {
                objective.set_parameters(theta)?;
                debug!("line search failed at iteration {iter}");
                break;
            }
            debug!("iteration {iter}: value = {value}, step = {step}");
            step *= 2.0;
        }

        Ok(value)
    }
}
