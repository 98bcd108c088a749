//! Heterogeneous group assignment over repeated rounds.
//!
//! A population of participants, each described by categorical attributes,
//! is partitioned into balanced groups several times. Good assignments
//! make every group diverse and let participants meet as many different
//! people as possible across rounds.
//!
//! - **Model**: participants, groups, iterations and assignments, with the
//!   structural checks every produced assignment satisfies.
//! - **Objective**: normalized mix and diversity costs, combined by
//!   weights, with bounds memoized per assignment shape.
//! - **Random**: balanced random partitions and a best-of-N search.
//! - **Simulated Annealing (SA)**: a generic annealing loop and its
//!   application to assignments via single pairwise swaps.
//! - **Table**: rows-of-cells adapters for input, output and value
//!   synonyms.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_groupmix::model::{Participant, PartitionRequest, Population};
//! use u_groupmix::sa::{AnnealingOptimizer, SaConfig};
//! use u_numflow::random::create_rng;
//!
//! let people = (0..9)
//!     .map(|i| {
//!         let gender = if i % 2 == 0 { "m" } else { "w" };
//!         Participant::new(i.to_string(), [("gender", gender)])
//!     })
//!     .collect();
//! let population = Arc::new(Population::new(people).unwrap());
//!
//! let optimizer = AnnealingOptimizer::new(["gender"])
//!     .unwrap()
//!     .with_config(SaConfig::default().with_max_cycles(200));
//! let assignment = optimizer
//!     .find_assignment(&population, PartitionRequest::new(3, 2), &mut create_rng(42))
//!     .unwrap();
//!
//! assert_eq!(assignment.iterations().len(), 2);
//! assert!(assignment.groups().all(|g| g.len() == 3));
//! ```

pub mod error;
pub mod model;
pub mod objective;
pub mod random;
pub mod sa;
pub mod table;

pub use error::{GroupingError, Result};
