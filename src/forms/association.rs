//! Form association types and the weak reference from submissions to
//! tracked records.
//!
//! The original system modelled the submission-to-record link as a generic
//! polymorphic back-reference. Here it is an explicit tagged union: a
//! submission either points at a batch, points at a bag, or stands alone.

use serde::{Deserialize, Serialize};

use crate::errors::AssociationViolation;

/// What kind of record a form may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationType {
    Batch,
    Bag,
    Standalone,
}

impl AssociationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "batch" => Some(Self::Batch),
            "bag" => Some(Self::Bag),
            "standalone" => Some(Self::Standalone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Bag => "bag",
            Self::Standalone => "standalone",
        }
    }
}

/// A submission's weak reference: lookup by id, no ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRef {
    Batch(i32),
    Bag(i32),
    None,
}

impl AssociationRef {
    /// Normalized lowercase kind tag of the referenced record.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Batch(_) => Some("batch"),
            Self::Bag(_) => Some("bag"),
            Self::None => None,
        }
    }
}

/// Check the raw (content type, object id) pair against the form's declared
/// association type and build the typed reference.
///
/// Standalone forms must carry neither half; non-standalone forms must carry
/// both, with a known content type tag. Whether the referenced record exists
/// and matches the declared kind is the resolver's second step, which needs
/// the store.
pub fn check_pair(
    association_type: AssociationType,
    content_type: Option<&str>,
    object_id: Option<i32>,
) -> Result<AssociationRef, AssociationViolation> {
    match association_type {
        AssociationType::Standalone => {
            if content_type.is_some() || object_id.is_some() {
                Err(AssociationViolation::StandaloneWithObject)
            } else {
                Ok(AssociationRef::None)
            }
        }
        AssociationType::Batch | AssociationType::Bag => {
            let (Some(tag), Some(id)) = (content_type, object_id) else {
                return Err(AssociationViolation::PairRequired);
            };
            match tag {
                "batch" => Ok(AssociationRef::Batch(id)),
                "bag" => Ok(AssociationRef::Bag(id)),
                _ => Err(AssociationViolation::InvalidContentType),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_type_round_trip() {
        for a in [
            AssociationType::Batch,
            AssociationType::Bag,
            AssociationType::Standalone,
        ] {
            assert_eq!(AssociationType::parse(a.as_str()), Some(a));
        }
        assert_eq!(AssociationType::parse("Batch"), None);
    }

    #[test]
    fn test_standalone_rejects_any_pairing() {
        assert_eq!(
            check_pair(AssociationType::Standalone, Some("batch"), Some(1)),
            Err(AssociationViolation::StandaloneWithObject)
        );
        assert_eq!(
            check_pair(AssociationType::Standalone, None, Some(1)),
            Err(AssociationViolation::StandaloneWithObject)
        );
        assert_eq!(
            check_pair(AssociationType::Standalone, Some("batch"), None),
            Err(AssociationViolation::StandaloneWithObject)
        );
        assert_eq!(
            check_pair(AssociationType::Standalone, None, None),
            Ok(AssociationRef::None)
        );
    }

    #[test]
    fn test_non_standalone_requires_both_halves() {
        assert_eq!(
            check_pair(AssociationType::Batch, None, None),
            Err(AssociationViolation::PairRequired)
        );
        assert_eq!(
            check_pair(AssociationType::Batch, Some("batch"), None),
            Err(AssociationViolation::PairRequired)
        );
        assert_eq!(
            check_pair(AssociationType::Bag, None, Some(3)),
            Err(AssociationViolation::PairRequired)
        );
    }

    #[test]
    fn test_known_tags_build_typed_refs() {
        assert_eq!(
            check_pair(AssociationType::Batch, Some("batch"), Some(7)),
            Ok(AssociationRef::Batch(7))
        );
        // Kind mismatch against the form is caught after resolution, so a
        // bag tag on a batch form still builds a reference here.
        assert_eq!(
            check_pair(AssociationType::Batch, Some("bag"), Some(7)),
            Ok(AssociationRef::Bag(7))
        );
        assert_eq!(
            check_pair(AssociationType::Bag, Some("form"), Some(7)),
            Err(AssociationViolation::InvalidContentType)
        );
    }

    #[test]
    fn test_ref_kind_tags() {
        assert_eq!(AssociationRef::Batch(1).kind(), Some("batch"));
        assert_eq!(AssociationRef::Bag(1).kind(), Some("bag"));
        assert_eq!(AssociationRef::None.kind(), None);
    }
}
