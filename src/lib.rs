//! # eqprover: equivalence-law proofs for propositional logic
//!
//! **`eqprover`** decides whether two propositional formulas are equivalent and, when they are,
//! searches for a proof: a chain of textbook equivalence laws (De Morgan, distributivity,
//! absorption, ...) that rewrites one formula into the other.
//!
//! ## How it works
//!
//! 1. Both inputs are parsed into immutable [`Expr`][crate::expr::Expr] trees.
//! 2. A truth table settles equivalence semantically. Non-equivalent inputs are reported as such
//!    and never searched.
//! 3. A rewrite loop applies one of 17 [`Law`][crate::laws::Law]s per iteration. A
//!    [policy][crate::policy] proposes the next law from a feature vector of the current state;
//!    when its proposal does not apply, a fixed fallback plan picks a law instead.
//! 4. Four strategies drive the loop: Direct, Contrapositive, Absurdity and Bidirectional.
//!    By default the first three are tried in turn.
//! 5. Optionally, the resulting proof is shortened by searching for shortcuts between its states.
//!
//! Search is sound but incomplete: every reported proof is a valid chain of rewrites, but an
//! equivalent pair may exhaust the iteration budget without a proof.
//!
//! ## Basic Usage
//!
//! ```rust
//! use eqprover::prover::{Prover, ProverConfig, MethodUsed};
//! use rand::SeedableRng;
//!
//! let prover = Prover::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//!
//! let report = prover.prove("~(p ^ q)", "~p v ~q", &ProverConfig::default(), &mut rng).unwrap();
//! assert!(report.success && report.equivalent);
//! assert_eq!(report.method_used, MethodUsed::Direct);
//! assert_eq!(report.transformations[0].law.name(), "de_morgan");
//!
//! let report = prover.prove("p ^ q", "p v q", &ProverConfig::default(), &mut rng).unwrap();
//! assert!(!report.equivalent);
//! ```
//!
//! ## Core Components
//!
//! - **[`prover`]**: The entry point: parse, verify, prove, report.
//! - **[`engine`]**: The proof strategies and the fallback chain.
//! - **[`laws`]**: The equivalence laws.
//! - **[`policy`]**: Policy traits and the built-in policies.
//! - **[`optimize`]**: Proof shortening.
//! - **[`dot`]**: Utilities for visualizing expression trees using Graphviz.

pub mod dot;
pub mod engine;
pub mod error;
pub mod expr;
pub mod features;
pub mod laws;
pub mod optimize;
pub mod parser;
pub mod paths;
pub mod policy;
pub mod prover;
pub mod search;
pub mod symbols;
pub mod verify;
