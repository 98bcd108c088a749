//! Participants and the population arena they live in.

use crate::error::{GroupingError, Result};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A person to be grouped: a unique identifier plus categorical attributes.
///
/// Equality and hashing look at the identifier only. Two values with the
/// same `uid` are the same participant even if their attribute maps differ.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    uid: String,
    attributes: BTreeMap<String, String>,
}

impl Participant {
    /// Creates a participant from an identifier and `(class, value)` pairs.
    ///
    /// ```
    /// use u_groupmix::model::Participant;
    ///
    /// let p = Participant::new("7", [("gender", "w"), ("faculty", "2")]);
    /// assert_eq!(p.attribute("gender"), Some("w"));
    /// ```
    pub fn new<I, K, V>(uid: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            uid: uid.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Value of an attribute class, if the participant has it.
    pub fn attribute(&self, class: &str) -> Option<&str> {
        self.attributes.get(class).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns a copy with every attribute value passed through `f`.
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str, &str) -> String,
    {
        Self {
            uid: self.uid.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), f(k, v)))
                .collect(),
        }
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.uid, self.attributes)
    }
}

/// Handle of a participant inside a [`Population`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberId(pub(crate) usize);

impl MemberId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Immutable arena of participants.
///
/// Groups refer to participants through [`MemberId`] handles, so copying
/// an assignment never copies attribute maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    participants: Vec<Participant>,
    fingerprint: u64,
}

impl Population {
    /// Builds a population, rejecting empty input and duplicate identifiers.
    pub fn new(participants: Vec<Participant>) -> Result<Self> {
        if participants.is_empty() {
            return Err(GroupingError::invalid("population must not be empty"));
        }
        let mut seen = HashSet::with_capacity(participants.len());
        for p in &participants {
            if !seen.insert(p.uid()) {
                return Err(GroupingError::invalid(format!(
                    "duplicate participant uid {:?}",
                    p.uid()
                )));
            }
        }

        let mut hasher = DefaultHasher::new();
        for p in &participants {
            p.uid.hash(&mut hasher);
            p.attributes.hash(&mut hasher);
        }
        let fingerprint = hasher.finish();

        Ok(Self {
            participants,
            fingerprint,
        })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant behind a handle. Handles come from this population, so
    /// an out-of-range id is a logic error and yields `None`.
    pub fn get(&self, id: MemberId) -> Option<&Participant> {
        self.participants.get(id.0)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// All handles in arena order.
    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        (0..self.participants.len()).map(MemberId)
    }

    /// Handle of the participant with the given uid.
    pub fn find(&self, uid: &str) -> Option<MemberId> {
        self.participants
            .iter()
            .position(|p| p.uid() == uid)
            .map(MemberId)
    }

    /// Content hash over identifiers and attributes, used to key cost bounds.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Attribute classes of the first participant.
    pub fn attribute_classes(&self) -> Vec<String> {
        self.participants
            .first()
            .map(|p| p.attributes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Fails unless every participant carries every class in `classes`.
    pub fn require_classes(&self, classes: &[String]) -> Result<()> {
        for p in &self.participants {
            if let Some(missing) = classes.iter().find(|c| !p.attributes.contains_key(*c)) {
                return Err(GroupingError::invalid(format!(
                    "participant {:?} has no attribute {:?}",
                    p.uid(),
                    missing
                )));
            }
        }
        Ok(())
    }
}
