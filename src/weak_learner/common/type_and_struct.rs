use std::ops;
use std::cmp;


/// A struct that stores the first/second order derivative information
/// of an instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientHessian {
    /// First order derivative.
    pub grad: f64,
    /// Second order derivative.
    pub hess: f64,
}


impl GradientHessian {
    /// Construct a new pair.
    #[inline]
    pub fn new(grad: f64, hess: f64) -> Self {
        Self { grad, hess }
    }


    /// Returns `true` if both derivatives are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.grad == 0.0 && self.hess == 0.0
    }
}


impl ops::Add<Self> for GradientHessian {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.grad + rhs.grad, self.hess + rhs.hess)
    }
}


impl ops::AddAssign<Self> for GradientHessian {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.grad += rhs.grad;
        self.hess += rhs.hess;
    }
}


impl ops::Sub<Self> for GradientHessian {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.grad - rhs.grad, self.hess - rhs.hess)
    }
}


#[derive(Clone, Copy, PartialEq, Debug)]
#[repr(transparent)]
pub(crate) struct LossValue(pub(crate) f64);


impl From<f64> for LossValue {
    #[inline]
    fn from(loss_value: f64) -> Self {
        Self(loss_value)
    }
}


impl cmp::PartialOrd<Self> for LossValue {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
