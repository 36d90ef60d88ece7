//! Variable catalogue and inspection output
//!
//! Lists what a model history file holds so a caller can pick variable names
//! for the extractors.

use crate::dataset::Dataset;
use crate::errors::Result;
use netcdf::{AttributeValue, Variable};
use std::collections::BTreeMap;

/// Descriptive metadata of one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMetadata {
    pub name: String,
    pub data_type: String,
    pub long_name: Option<String>,
    pub units: Option<String>,
    pub dimensions: Vec<DimensionInfo>,
}

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

impl VariableMetadata {
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.length).collect()
    }

    /// Whether the variable varies along the unlimited dimension
    pub fn is_record(&self) -> bool {
        self.dimensions.first().is_some_and(|d| d.is_unlimited)
    }
}

fn string_attribute(var: &Variable<'_>, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(mut ss) if !ss.is_empty() => Some(ss.remove(0)),
        _ => None,
    }
}

fn metadata_of(var: &Variable<'_>) -> VariableMetadata {
    VariableMetadata {
        name: var.name(),
        data_type: format!("{:?}", var.vartype()).to_lowercase(),
        long_name: string_attribute(var, "long_name"),
        units: string_attribute(var, "units"),
        dimensions: var
            .dimensions()
            .iter()
            .map(|d| DimensionInfo {
                name: d.name(),
                length: d.len(),
                is_unlimited: d.is_unlimited(),
            })
            .collect(),
    }
}

/// Metadata of every variable in the first file, keyed by name
pub fn variable_catalogue(ds: &Dataset) -> BTreeMap<String, VariableMetadata> {
    ds.first_file()
        .variables()
        .map(|var| {
            let meta = metadata_of(&var);
            (meta.name.clone(), meta)
        })
        .collect()
}

/// Metadata of a single variable
pub fn get_variable_metadata(ds: &Dataset, var_name: &str) -> Result<VariableMetadata> {
    Ok(metadata_of(&ds.variable(var_name)?))
}

/// Prints `name : long_name` for every variable, sorted by name.
pub fn list_variables(ds: &Dataset) {
    println!("\n Variables in {}", ds.path().display());
    println!("==============");
    let catalogue = variable_catalogue(ds);
    if catalogue.is_empty() {
        println!("   (No variables found)");
        return;
    }
    for (name, meta) in catalogue {
        println!("{} : {}", name, meta.long_name.as_deref().unwrap_or(""));
    }
}

fn format_attribute(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => format!("\"{}\"", s),
        AttributeValue::Double(d) => d.to_string(),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Short(s) => s.to_string(),
        other => format!("{:?}", other),
    }
}

/// Prints type, shape, dimensions and attributes of one variable.
pub fn describe_variable(ds: &Dataset, var_name: &str) -> Result<()> {
    let var = ds.variable(var_name)?;
    let meta = metadata_of(&var);

    println!("\n Variable Description: {}", var_name);
    println!("={}", "=".repeat(var_name.len() + 25));
    println!(" Data type: {}", meta.data_type);

    if meta.dimensions.is_empty() {
        println!(" Dimensions: (scalar)");
    } else {
        for dim in &meta.dimensions {
            if dim.is_unlimited {
                println!("    {} = {} (unlimited)", dim.name, dim.length);
            } else {
                println!("    {} = {}", dim.name, dim.length);
            }
        }
    }

    let attributes: Vec<_> = var.attributes().collect();
    if attributes.is_empty() {
        println!("\n  Attributes: (none)");
    } else {
        println!("\n  Attributes:");
        for attr in attributes {
            match attr.value() {
                Ok(value) => println!("   - {}: {}", attr.name(), format_attribute(&value)),
                Err(e) => println!("   - {}: (error reading value: {})", attr.name(), e),
            }
        }
    }

    Ok(())
}
