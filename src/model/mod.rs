//! Data model: participants, groups, iterations and assignments.
//!
//! Participants live once in a [`Population`] arena and are referenced from
//! groups by [`MemberId`] handles. An [`Assignment`] shares its population
//! through an `Arc`, so cloning one copies only the group containers.

mod assignment;
mod participant;

pub use assignment::{Assignment, BoundsKey, Group, Iteration, PartitionRequest, Shape};
pub use participant::{MemberId, Participant, Population};
