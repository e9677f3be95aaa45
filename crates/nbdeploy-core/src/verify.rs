//! Set equivalence between extracted names and the names a grouping uses.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::errors::{NbDeployError, NbResult};
use crate::models::{ElementCatalog, Grouping};

/// Order and multiplicity are ignored; a name listed in two groups is not an
/// error here.
pub fn check_equivalence<'a, A, P>(actual: A, proposed: P) -> NbResult<()>
where
    A: IntoIterator<Item = &'a str>,
    P: IntoIterator<Item = &'a str>,
{
    let actual: BTreeSet<&str> = actual.into_iter().collect();
    let proposed: BTreeSet<&str> = proposed.into_iter().collect();

    if actual == proposed {
        debug!(names = actual.len(), "Grouping matches extracted elements");
        return Ok(());
    }

    let missing: Vec<String> = actual.difference(&proposed).map(|s| s.to_string()).collect();
    let extra: Vec<String> = proposed.difference(&actual).map(|s| s.to_string()).collect();
    warn!(?missing, ?extra, "Grouping does not match extracted elements");
    Err(NbDeployError::Equivalence { missing, extra })
}

pub fn is_equivalent<'a, A, P>(actual: A, proposed: P) -> bool
where
    A: IntoIterator<Item = &'a str>,
    P: IntoIterator<Item = &'a str>,
{
    check_equivalence(actual, proposed).is_ok()
}

pub fn verify_grouping(catalog: &ElementCatalog, grouping: &Grouping) -> NbResult<()> {
    check_equivalence(catalog.names(), grouping.element_names())
}
