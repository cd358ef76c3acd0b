//! Derivative-free global search: differential evolution.
//!
//! A fixed-size population evolves by best/1/bin mutation and binomial
//! crossover. The search is deterministic for a given seed, never evaluates
//! the objective outside the supplied bounds, and stops on the first of four
//! rules: success threshold, wall-clock budget, progress plateau, or the
//! absolute generation cap. Wall clock is sampled once per generation so
//! timing never perturbs the deterministic synthesis path.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use knock_spec::ParamBounds;

use crate::error::{SynthError, SynthResult};
use crate::rng::create_rng;

/// Differential evolution settings.
///
/// The numeric defaults are configuration, tuned for the impact-sound search
/// space; callers with different cost surfaces should adjust them rather
/// than treat them as invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeConfig {
    /// Population size (at least 4).
    pub population: usize,
    /// Differential weight F, in (0, 2].
    pub mutation: f64,
    /// Crossover probability CR, in [0, 1].
    pub crossover: f64,
    /// Absolute generation cap.
    pub max_generations: usize,
    /// Best-cost value below which the search stops as converged.
    pub success_threshold: f64,
    /// Wall-clock budget, checked at generation boundaries.
    pub time_budget: Duration,
    /// Number of recent generations the plateau rule looks back over.
    pub plateau_window: usize,
    /// Minimum relative improvement over the window to keep searching.
    pub plateau_rel_tol: f64,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population: 24,
            mutation: 0.7,
            crossover: 0.9,
            max_generations: 200,
            success_threshold: 1e-3,
            time_budget: Duration::from_secs(30),
            plateau_window: 12,
            plateau_rel_tol: 1e-3,
        }
    }
}

impl DeConfig {
    /// Checks the configuration, failing with `InvalidConfiguration`.
    pub fn validate(&self) -> SynthResult<()> {
        if self.population < 4 {
            return Err(SynthError::invalid_config(format!(
                "population must be at least 4, got {}",
                self.population
            )));
        }
        if !self.mutation.is_finite() || self.mutation <= 0.0 || self.mutation > 2.0 {
            return Err(SynthError::invalid_config(format!(
                "mutation must be in (0, 2], got {}",
                self.mutation
            )));
        }
        if !self.crossover.is_finite() || !(0.0..=1.0).contains(&self.crossover) {
            return Err(SynthError::invalid_config(format!(
                "crossover must be in [0, 1], got {}",
                self.crossover
            )));
        }
        if self.max_generations == 0 {
            return Err(SynthError::invalid_config("max_generations must be positive"));
        }
        if !self.success_threshold.is_finite() || self.success_threshold < 0.0 {
            return Err(SynthError::invalid_config(format!(
                "success_threshold must be non-negative, got {}",
                self.success_threshold
            )));
        }
        if self.time_budget.is_zero() {
            return Err(SynthError::invalid_config("time_budget must be positive"));
        }
        if self.plateau_window < 2 {
            return Err(SynthError::invalid_config(format!(
                "plateau_window must be at least 2, got {}",
                self.plateau_window
            )));
        }
        if !self.plateau_rel_tol.is_finite() || self.plateau_rel_tol < 0.0 {
            return Err(SynthError::invalid_config(format!(
                "plateau_rel_tol must be non-negative, got {}",
                self.plateau_rel_tol
            )));
        }
        Ok(())
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Best cost fell to or below the success threshold.
    Converged,
    /// The wall-clock budget ran out.
    TimeBudget,
    /// Best cost stopped improving over the plateau window.
    Plateau,
    /// The absolute generation cap was reached.
    GenerationCap,
    /// The progress callback requested a stop.
    CallbackStop,
}

/// Read-only snapshot handed to the progress callback once per generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationStats {
    /// Completed generation count.
    pub generation: usize,
    /// Best cost found so far.
    pub best_cost: f64,
    /// Objective evaluations so far.
    pub evaluations: usize,
}

/// Best-effort outcome of one search run.
///
/// The search itself never fails: an unconverged run still returns the best
/// vector found, and callers inspect `cost` and `termination` to judge
/// acceptability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best parameter vector found, inside bounds.
    pub best: Vec<f64>,
    /// Cost of the best vector.
    pub cost: f64,
    /// Generations completed.
    pub generations: usize,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Which stopping rule fired.
    pub termination: TerminationReason,
}

/// Differential evolution search over a bounded flat parameter vector.
pub struct DifferentialEvolution {
    bounds: ParamBounds,
    config: DeConfig,
    rng: Pcg32,
    initial_guess: Option<Vec<f64>>,
}

impl DifferentialEvolution {
    /// Creates a search, validating the configuration.
    pub fn new(bounds: ParamBounds, config: DeConfig, seed: u64) -> SynthResult<Self> {
        config.validate()?;
        Ok(Self {
            bounds,
            config,
            rng: create_rng(seed),
            initial_guess: None,
        })
    }

    /// Installs an analytically-chosen warm start.
    ///
    /// The guess replaces the first population member after being clamped
    /// into bounds; the rest of the population still starts cold.
    pub fn with_initial_guess(mut self, mut x0: Vec<f64>) -> SynthResult<Self> {
        if x0.len() != self.bounds.len() {
            return Err(SynthError::invalid_config(format!(
                "initial guess has {} values, bounds have {} dimensions",
                x0.len(),
                self.bounds.len()
            )));
        }
        self.bounds.clamp(&mut x0);
        self.initial_guess = Some(x0);
        Ok(self)
    }

    /// Runs the search without progress reporting.
    pub fn run<O>(&mut self, objective: O) -> OptimizationResult
    where
        O: FnMut(&[f64]) -> f64,
    {
        self.run_with(objective, |_| false)
    }

    /// Runs the search, invoking `callback` once per completed generation.
    ///
    /// The callback sees the running best cost and generation index and may
    /// return `true` to stop the search.
    pub fn run_with<O, C>(&mut self, mut objective: O, mut callback: C) -> OptimizationResult
    where
        O: FnMut(&[f64]) -> f64,
        C: FnMut(&GenerationStats) -> bool,
    {
        let start = Instant::now();
        let dims = self.bounds.len();
        let np = self.config.population;

        let mut population: Vec<Vec<f64>> = (0..np).map(|_| self.sample_uniform(dims)).collect();
        if let Some(x0) = &self.initial_guess {
            population[0] = x0.clone();
        }

        let mut costs: Vec<f64> = population.iter().map(|x| objective(x)).collect();
        let mut evaluations = np;
        let mut best_index = argmin(&costs);

        let mut history: VecDeque<f64> = VecDeque::with_capacity(self.config.plateau_window);
        let mut generation = 0usize;

        let termination = loop {
            if costs[best_index] <= self.config.success_threshold {
                break TerminationReason::Converged;
            }
            if generation >= self.config.max_generations {
                break TerminationReason::GenerationCap;
            }
            if history.len() == self.config.plateau_window {
                let baseline = *history.front().unwrap_or(&costs[best_index]);
                let improvement = baseline - costs[best_index];
                if improvement <= self.config.plateau_rel_tol * baseline.abs().max(1e-12) {
                    break TerminationReason::Plateau;
                }
            }
            if start.elapsed() > self.config.time_budget {
                break TerminationReason::TimeBudget;
            }

            let best_vector = population[best_index].clone();
            for i in 0..np {
                let (r1, r2) = self.pick_two_distinct(np, i);
                let forced_dim = self.rng.gen_range(0..dims);

                let mut trial = population[i].clone();
                for d in 0..dims {
                    if d == forced_dim || self.rng.gen::<f64>() < self.config.crossover {
                        trial[d] = best_vector[d]
                            + self.config.mutation * (population[r1][d] - population[r2][d]);
                    }
                }
                self.bounds.clamp(&mut trial);

                let trial_cost = objective(&trial);
                evaluations += 1;
                if trial_cost <= costs[i] {
                    population[i] = trial;
                    costs[i] = trial_cost;
                    if trial_cost < costs[best_index] {
                        best_index = i;
                    }
                }
            }

            generation += 1;
            if history.len() == self.config.plateau_window {
                history.pop_front();
            }
            history.push_back(costs[best_index]);

            let stats = GenerationStats {
                generation,
                best_cost: costs[best_index],
                evaluations,
            };
            if callback(&stats) {
                break TerminationReason::CallbackStop;
            }
        };

        OptimizationResult {
            best: population[best_index].clone(),
            cost: costs[best_index],
            generations: generation,
            evaluations,
            elapsed: start.elapsed(),
            termination,
        }
    }

    fn sample_uniform(&mut self, dims: usize) -> Vec<f64> {
        let mut vector = Vec::with_capacity(dims);
        for dim in 0..dims {
            let (lo, hi) = self.bounds.interval(dim);
            vector.push(lo + self.rng.gen::<f64>() * (hi - lo));
        }
        vector
    }

    fn pick_two_distinct(&mut self, np: usize, exclude: usize) -> (usize, usize) {
        let r1 = loop {
            let candidate = self.rng.gen_range(0..np);
            if candidate != exclude {
                break candidate;
            }
        };
        let r2 = loop {
            let candidate = self.rng.gen_range(0..np);
            if candidate != exclude && candidate != r1 {
                break candidate;
            }
        };
        (r1, r2)
    }
}

fn argmin(costs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &cost) in costs.iter().enumerate() {
        if cost < costs[best] {
            best = i;
        }
    }
    best
}
