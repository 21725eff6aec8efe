//! Solver options fixed for the lifetime of one run.
//!
//! `Settings` carries the regularization weight `rho` added to the normal
//! equations, the exponent `cg_rate` of the per-outer-iteration tolerance
//! schedule, an optional cap on CG iterations, and the diagnostic verbosity
//! flags. The surrounding optimizer supplies these once; nothing here is
//! expected to change between calls.

use bitflags::bitflags;
use num_traits::Float;

bitflags! {
    /// Diagnostic trace selection, checked at runtime.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Verbosity: u32 {
        /// Trace one-time setup work (transpose, preconditioner).
        const SETUP = 0b001;
        /// Trace each solve call.
        const SOLVE = 0b010;
        /// Report the CG iteration count of each solve.
        const CG    = 0b100;
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::empty()
    }
}

/// Scalar parameters and flags for one solver instance.
#[derive(Debug, Clone)]
pub struct Settings<T> {
    /// Diagonal shift rho added to A'A. Must be strictly positive.
    pub rho: T,
    /// Tolerance tightens as 1/(iter+1)^cg_rate across outer iterations.
    pub cg_rate: T,
    /// CG iteration budget per solve; `None` means the system dimension n.
    pub max_cg_iters: Option<usize>,
    /// Diagnostic trace flags.
    pub verbosity: Verbosity,
}

/// Reference defaults for the shift and the schedule exponent.
const DEFAULT_RHO: f64 = 1e-3;
const DEFAULT_CG_RATE: f64 = 2.0;

impl<T: Float + From<f64>> Default for Settings<T> {
    fn default() -> Self {
        Self {
            rho: DEFAULT_RHO.into(),
            cg_rate: DEFAULT_CG_RATE.into(),
            max_cg_iters: None,
            verbosity: Verbosity::empty(),
        }
    }
}

impl<T: Float + From<f64>> Settings<T> {
    pub fn new(rho: T, cg_rate: T) -> Self {
        Self {
            rho,
            cg_rate,
            ..Self::default()
        }
    }
    pub fn with_max_cg_iters(mut self, max_cg_iters: usize) -> Self {
        self.max_cg_iters = Some(max_cg_iters);
        self
    }
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference() {
        let s: Settings<f64> = Settings::default();
        assert_eq!(s.rho, 1e-3);
        assert_eq!(s.cg_rate, 2.0);
        assert!(s.max_cg_iters.is_none());
        assert!(s.verbosity.is_empty());
    }

    #[test]
    fn builder_chain() {
        let s = Settings::new(1.0_f64, 1.5).with_max_cg_iters(50).with_verbosity(Verbosity::SOLVE | Verbosity::CG);
        assert_eq!(s.max_cg_iters, Some(50));
        assert!(s.verbosity.contains(Verbosity::CG));
        assert!(!s.verbosity.contains(Verbosity::SETUP));
    }
}
