//! Right-hand side abstraction driven by the fixed-step runner.

use crate::error::SimResult;

/// A system `dx/dt = f(t, x)` the integrators can advance.
///
/// [`zf_model::ModelGraph`] is the production implementation with
/// `State = Vec<f64>`; tests plug in scalar toys.
pub trait TransientModel {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// Derivative at `(t, x)`. `SimError::Retryable` repeats the step with a
    /// smaller `dt`; `&mut self` because evaluation writes the model's result
    /// arena.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
