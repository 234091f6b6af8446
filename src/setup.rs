//! Setup records (`setup/list`)
//!
//! A setup is one hyperparameter configuration of a flow. For joining onto
//! evaluations only the `(parameter name, value)` pairs matter; the full
//! parameter description is kept on [`Parameter`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::paging::Paged;
use crate::xml::{open_document, FieldSet, XmlElement};
use crate::{Error, Result};

/// Root tag of a setup listing.
pub const SETUPS_TAG: &str = "oml:setups";

const SETUP_FIELDS: &[&str] = &["setup_id", "flow_id"];

const PARAMETER_FIELDS: &[&str] = &[
    "id",
    "flow_id",
    "flow_name",
    "full_name",
    "parameter_name",
    "data_type",
    "default_value",
    "value",
];

/// One hyperparameter of a setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter (input) ID
    pub id: u64,
    /// Flow the parameter belongs to (may be a subflow)
    pub flow_id: u64,
    /// Name of that flow
    pub flow_name: String,
    /// Fully qualified parameter name
    pub full_name: String,
    /// Short parameter name
    pub parameter_name: String,
    /// Declared data type, if any
    pub data_type: Option<String>,
    /// Default value, if any
    pub default_value: Option<String>,
    /// Value used in this setup, if any
    pub value: Option<String>,
}

/// A `(name, value)` pair as carried by the joined output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSetting {
    /// Short parameter name
    pub name: String,
    /// Value used in the setup, if any
    pub value: Option<String>,
}

impl ParameterSetting {
    /// Create a setting.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// JSON form: a two-element `[name, value]` array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!([self.name, self.value])
    }
}

/// Setup Record: a flow and its parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRecord {
    setup_id: u64,
    flow_id: u64,
    parameters: Vec<Parameter>,
}

impl SetupRecord {
    /// Create a setup record.
    #[must_use]
    pub fn new(setup_id: u64, flow_id: u64, parameters: Vec<Parameter>) -> Self {
        Self {
            setup_id,
            flow_id,
            parameters,
        }
    }

    /// Setup ID.
    #[must_use]
    pub const fn setup_id(&self) -> u64 {
        self.setup_id
    }

    /// Flow ID.
    #[must_use]
    pub const fn flow_id(&self) -> u64 {
        self.flow_id
    }

    /// Parameters in server order (empty when the setup has none).
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Flatten the parameters into `(name, value)` settings.
    #[must_use]
    pub fn settings(&self) -> Vec<ParameterSetting> {
        self.parameters
            .iter()
            .map(|p| ParameterSetting::new(p.parameter_name.clone(), p.value.clone()))
            .collect()
    }
}

/// Setups in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupList(pub Vec<SetupRecord>);

impl SetupList {
    /// Consume into the records.
    #[must_use]
    pub fn into_inner(self) -> Vec<SetupRecord> {
        self.0
    }
}

impl Paged for SetupList {
    fn record_count(&self) -> usize {
        self.0.len()
    }

    fn absorb(&mut self, page: Self) {
        self.0.extend(page.0);
    }

    fn truncate_to(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

/// Parse a `setup/list` response body.
///
/// # Errors
///
/// - [`Error::MissingTag`] if the root is not `oml:setups`
/// - [`Error::NoResult`] / [`Error::Server`] for error documents
/// - Schema errors for malformed setups or parameters
pub fn parse_setups(xml: &str) -> Result<SetupList> {
    let root = open_document(xml, SETUPS_TAG)?;
    root.children()
        .iter()
        .map(|child| {
            if child.is_named("setup") {
                decode_setup(child)
            } else {
                Err(Error::UnexpectedField {
                    record: "setups",
                    field: child.name().to_string(),
                })
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(SetupList)
}

/// Decode a single `oml:setup` element.
///
/// # Errors
///
/// Returns schema errors for the setup or any of its parameters.
pub fn decode_setup(element: &XmlElement) -> Result<SetupRecord> {
    let fields = FieldSet::collect("setup", SETUP_FIELDS, &["parameter"], element)?;
    let parameters = element
        .children_named("parameter")
        .map(decode_parameter)
        .collect::<Result<Vec<_>>>()?;
    Ok(SetupRecord::new(
        fields.id("setup_id")?,
        fields.id("flow_id")?,
        parameters,
    ))
}

fn decode_parameter(element: &XmlElement) -> Result<Parameter> {
    let fields = FieldSet::collect("parameter", PARAMETER_FIELDS, &[], element)?;
    Ok(Parameter {
        id: fields.id("id")?,
        flow_id: fields.id("flow_id")?,
        flow_name: fields.required("flow_name")?.to_string(),
        full_name: fields.required("full_name")?.to_string(),
        parameter_name: fields.required("parameter_name")?.to_string(),
        data_type: fields.text("data_type").map(str::to_string),
        default_value: fields.text("default_value").map(str::to_string),
        value: fields.text("value").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETUPS: &str = r#"<oml:setups xmlns:oml="http://openml.org/openml">
      <oml:setup>
        <oml:setup_id>1</oml:setup_id>
        <oml:flow_id>56</oml:flow_id>
        <oml:parameter>
          <oml:id>1</oml:id><oml:flow_id>56</oml:flow_id><oml:flow_name>weka.ZeroR</oml:flow_name>
          <oml:full_name>weka.ZeroR(1)_D</oml:full_name><oml:parameter_name>D</oml:parameter_name>
          <oml:data_type>flag</oml:data_type><oml:default_value/><oml:value>true</oml:value>
        </oml:parameter>
        <oml:parameter>
          <oml:id>2</oml:id><oml:flow_id>56</oml:flow_id><oml:flow_name>weka.ZeroR</oml:flow_name>
          <oml:full_name>weka.ZeroR(1)_E</oml:full_name><oml:parameter_name>E</oml:parameter_name>
          <oml:value/>
        </oml:parameter>
      </oml:setup>
      <oml:setup>
        <oml:setup_id>2</oml:setup_id>
        <oml:flow_id>57</oml:flow_id>
      </oml:setup>
    </oml:setups>"#;

    #[test]
    fn test_parse_setups() {
        let setups = parse_setups(SETUPS).unwrap().into_inner();
        assert_eq!(setups.len(), 2);

        let first = &setups[0];
        assert_eq!(first.setup_id(), 1);
        assert_eq!(first.parameters().len(), 2);
        assert_eq!(first.parameters()[0].default_value, None);
        assert_eq!(
            first.settings(),
            vec![
                ParameterSetting::new("D", Some("true".to_string())),
                ParameterSetting::new("E", None),
            ]
        );

        assert!(setups[1].parameters().is_empty());
        assert!(setups[1].settings().is_empty());
    }

    #[test]
    fn test_setting_json() {
        let setting = ParameterSetting::new("C", Some("0.25".to_string()));
        assert_eq!(setting.to_json(), json!(["C", "0.25"]));
        assert_eq!(ParameterSetting::new("E", None).to_json(), json!(["E", null]));
    }

    #[test]
    fn test_parameter_missing_name() {
        let xml = "<oml:setups><oml:setup><oml:setup_id>1</oml:setup_id><oml:flow_id>2</oml:flow_id>\
                   <oml:parameter><oml:id>1</oml:id><oml:flow_id>2</oml:flow_id>\
                   <oml:flow_name>f</oml:flow_name><oml:full_name>f_x</oml:full_name>\
                   </oml:parameter></oml:setup></oml:setups>";
        let err = parse_setups(xml).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                record: "parameter",
                field: "parameter_name"
            }
        ));
    }
}
