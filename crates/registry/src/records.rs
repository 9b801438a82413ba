//! Wire records stored in the ledger.
//!
//! Field names are part of the stored format and are case-sensitive:
//!
//! ```text
//! Person           {"id", "infoElements"}
//! InfoElement      {"id", "title", "elementType", "elementValue", "validTill",
//!                   "hash", "verifiedOn", "verificationProof", "status", "comments"}
//! SubmittedRequest {"id", "version", "submittedOn", "person"}
//! submission log   [SubmittedRequest, ...]
//! ```
//!
//! Mutations of a person's element sequence are pure methods on [`Person`];
//! the stores only read the aggregate, call one of them and write it back.

use std::{borrow::Cow, collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Identifier of an [`InfoElement`] within its person.
///
/// Stored ids may be JSON strings or non-negative integers. Callers address
/// elements with string arguments, so two ids are equal when their text
/// forms are equal: `7` and `"7"` name the same element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    /// Numeric id, as written by older clients.
    Number(u64),
    /// String id.
    Text(String),
}

impl ElementId {
    /// Returns the canonical text form used for comparisons.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Returns `true` if this id addresses the element named by `raw`.
    ///
    /// Uses the same text comparison as `==`, so `"07"` does not address `7`.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.as_text() == raw
    }
}

impl PartialEq for ElementId {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl Eq for ElementId {}

impl std::hash::Hash for ElementId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_text().hash(state);
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for ElementId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

/// One piece of identity information held by a person.
///
/// Apart from `id`, every field is an opaque string; missing fields decode
/// as empty strings and are always written back.
///
/// ```
/// use kyc_registry::InfoElement;
///
/// let element = InfoElement::builder().id("doc1").hash("abc").build();
/// assert_eq!(element.hash, "abc");
/// assert!(element.status.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct InfoElement {
    /// Identifier, unique within the owning person.
    #[builder(into)]
    pub id: ElementId,

    #[serde(default)]
    #[builder(into, default)]
    pub title: String,

    #[serde(default)]
    #[builder(into, default)]
    pub element_type: String,

    #[serde(default)]
    #[builder(into, default)]
    pub element_value: String,

    #[serde(default)]
    #[builder(into, default)]
    pub valid_till: String,

    /// Digest of the underlying document.
    #[serde(default)]
    #[builder(into, default)]
    pub hash: String,

    #[serde(default)]
    #[builder(into, default)]
    pub verified_on: String,

    #[serde(default)]
    #[builder(into, default)]
    pub verification_proof: String,

    #[serde(default)]
    #[builder(into, default)]
    pub status: String,

    #[serde(default)]
    #[builder(into, default)]
    pub comments: String,
}

/// Outcome of [`Person::upsert_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// An element with the same id was replaced at `index`.
    Replaced {
        /// Position of the replaced element.
        index: usize,
    },
    /// No element had the id; the new element was appended at `index`.
    Appended {
        /// Position of the new element (the last one).
        index: usize,
    },
}

/// The person aggregate: an id plus an ordered sequence of elements.
///
/// Invariant: no two elements share an id. [`upsert_element`](Self::upsert_element)
/// maintains it; [`validate`](Self::validate) checks records supplied whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Person id, also the ledger key of the record.
    pub id: String,

    /// Elements in insertion order.
    #[serde(default)]
    pub info_elements: Vec<InfoElement>,
}

impl Person {
    /// Creates a person with no elements.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), info_elements: Vec::new() }
    }

    /// Returns the element addressed by `element_id`, if any.
    #[must_use]
    pub fn element(&self, element_id: &str) -> Option<&InfoElement> {
        self.info_elements.iter().find(|element| element.id.matches(element_id))
    }

    /// Inserts `element`, or replaces the element with the same id in place.
    ///
    /// A replaced element keeps its position; a new element goes to the end.
    pub fn upsert_element(&mut self, element: InfoElement) -> Upsert {
        match self.info_elements.iter().position(|existing| existing.id == element.id) {
            Some(index) => {
                self.info_elements[index] = element;
                Upsert::Replaced { index }
            },
            None => {
                self.info_elements.push(element);
                Upsert::Appended { index: self.info_elements.len() - 1 }
            },
        }
    }

    /// Removes every element addressed by `element_id`, keeping the order of
    /// the rest. Returns how many were removed.
    pub fn remove_element(&mut self, element_id: &str) -> usize {
        let before = self.info_elements.len();
        self.info_elements.retain(|element| !element.id.matches(element_id));
        before - self.info_elements.len()
    }

    /// Checks the aggregate invariants of a record supplied as a whole.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidArgument`] if the id is empty.
    /// - [`RegistryError::InvalidRecord`] if two elements share an id.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.id.is_empty() {
            return Err(RegistryError::invalid_argument("id", "person id must not be empty"));
        }

        let mut seen = HashSet::with_capacity(self.info_elements.len());
        for element in &self.info_elements {
            if !seen.insert(element.id.as_text()) {
                return Err(RegistryError::invalid_record(format!(
                    "person ({}) holds more than one element with id ({})",
                    self.id, element.id
                )));
            }
        }
        Ok(())
    }
}

/// A person snapshot taken at submission time.
///
/// `person` is an independent copy; later changes to the person record do
/// not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRequest {
    /// Submission id, unique across the log.
    pub id: String,
    /// Format tag fixed at creation.
    pub version: String,
    /// Submission time marker.
    pub submitted_on: String,
    /// Embedded copy of the person.
    pub person: Person,
}

/// The whole submission log as stored under its fixed key.
///
/// Append-only: entries are kept in submission order and never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionRecord {
    entries: Vec<SubmittedRequest>,
}

impl SubmissionRecord {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All submissions in submission order.
    #[must_use]
    pub fn entries(&self) -> &[SubmittedRequest] {
        &self.entries
    }

    /// Returns `true` if a submission with `request_id` exists.
    #[must_use]
    pub fn contains(&self, request_id: &str) -> bool {
        self.find(request_id).is_some()
    }

    /// Returns the submission with `request_id`, if any.
    #[must_use]
    pub fn find(&self, request_id: &str) -> Option<&SubmittedRequest> {
        self.entries.iter().find(|entry| entry.id == request_id)
    }

    /// Appends `request` at the end of the log.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSubmission`] and leaves the log
    /// unchanged if the id is already present.
    pub fn append(&mut self, request: SubmittedRequest) -> RegistryResult<()> {
        if self.contains(&request.id) {
            return Err(RegistryError::duplicate_submission(request.id));
        }
        self.entries.push(request);
        Ok(())
    }
}
