//! Centralized tuning constants for the grind model.
//!
//! These values define the deterministic math for the solver and the check
//! model. Keeping them together ensures the numbers can only be adjusted via
//! reviewed code changes rather than scattered literals.

// Check model --------------------------------------------------------------
/// Success chance at a score equal to the check difficulty.
pub const CHECK_BASE_CHANCE: f64 = 0.6;
/// Success chance gained per point above a narrow difficulty.
pub const NARROW_STEP: f64 = 0.1;
/// Floor on narrow check success.
pub const NARROW_FLOOR: f64 = 0.1;

// Menace healing -----------------------------------------------------------
/// Menace points healed per action without social heals.
pub const MENACE_HEAL_PER_ACTION: f64 = 3.0;

// Solver -------------------------------------------------------------------
/// Number of leading objective rows (Actions, Echoes, Scrip).
pub const OBJECTIVE_ROWS: usize = 3;
/// Scrip to echoes exchange rate from ham arbitrage (63.5 echoes per 125 scrip).
pub const DEFAULT_SCRIP_EXCHANGE_RATE: f64 = 63.5 / 125.0;
/// Relative tolerance for treating a singular value as zero.
pub const DEFAULT_ZERO_TOLERANCE: f64 = 5e-16;
/// Pivot budget for the simplex optimizer.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
/// Jacobi sweeps before the SVD gives up on further rotations.
pub(crate) const SVD_MAX_SWEEPS: usize = 80;
/// Pivot and feasibility tolerance inside the simplex tableau.
pub(crate) const SIMPLEX_EPS: f64 = 1e-11;
/// Phase-one objective above which the program counts as infeasible.
pub(crate) const SIMPLEX_FEASIBILITY_EPS: f64 = 1e-9;
/// Solution entries this small relative to the largest are reported as zero.
pub(crate) const SOLUTION_ZERO_EPS: f64 = 1e-12;

// Catalog ------------------------------------------------------------------
/// Suffix used for synthetic overflow step names.
pub const OVERFLOW_SUFFIX: &str = " Overflow";
/// Highest Player of Chess score covered by the Balmoral tables.
pub(crate) const BALMORAL_MAX_CHESS: usize = 10;
