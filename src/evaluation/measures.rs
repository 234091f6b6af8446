//! Evaluation measure listing (`evaluationmeasure/list`)

use crate::xml::open_document;
use crate::{Error, Result};

/// Root tag of a measure listing.
pub const MEASURES_TAG: &str = "oml:evaluation_measures";

/// Endpoint listing every evaluation measure the server knows.
pub const MEASURES_ENDPOINT: &str = "evaluationmeasure/list";

/// Parse a measure listing into measure names, in server order.
///
/// ```
/// use openml_evaluations::evaluation::parse_measures;
///
/// let names = parse_measures(
///     "<oml:evaluation_measures><oml:measures>\
///        <oml:measure>area_under_roc_curve</oml:measure>\
///        <oml:measure>predictive_accuracy</oml:measure>\
///      </oml:measures></oml:evaluation_measures>",
/// )
/// .unwrap();
/// assert_eq!(names, vec!["area_under_roc_curve", "predictive_accuracy"]);
/// ```
///
/// # Errors
///
/// - [`Error::MissingTag`] if the root is not `oml:evaluation_measures`
/// - [`Error::UnexpectedShape`] if there is no `oml:measures` list or it is empty
pub fn parse_measures(xml: &str) -> Result<Vec<String>> {
    let root = open_document(xml, MEASURES_TAG)?;
    let measures = root.child("measures").ok_or_else(|| {
        Error::UnexpectedShape("does not contain \"oml:measures\"".to_string())
    })?;

    let names: Vec<String> = measures
        .children_named("measure")
        .map(|m| m.text().to_string())
        .collect();
    if names.is_empty() {
        return Err(Error::UnexpectedShape(
            "does not contain \"oml:measure\" as a list".to_string(),
        ));
    }
    Ok(names)
}
