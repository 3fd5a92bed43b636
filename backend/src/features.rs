//! Maps a validated [`TrainInput`] onto the column layout a model was trained on.
//!
//! The feature order shipped with the artifact is resolved once, at load time,
//! into typed [`Column`] slots and a class-code to column index table. Encoding
//! a request is then a single pass over the layout with no name lookups.

use std::collections::HashSet;

use log::warn;

use crate::models::{ClassCode, TrainInput, CLASS_PREFIX};

pub const DISTANCE: &str = "distance";
pub const DURATION: &str = "duration";
pub const CATERING: &str = "if_offering_catering";
pub const DYNAMIC_FARE: &str = "if_dynamic_fare";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Distance,
    Duration,
    Catering,
    DynamicFare,
    Class(ClassCode),
    /// A `class_*` column for a code the API does not accept. Always 0.
    UnknownClass(String),
    /// Any other column the model knows about but requests never fill. Always 0.
    Other(String),
}

impl Column {
    fn parse(name: &str) -> Self {
        match name {
            DISTANCE => Column::Distance,
            DURATION => Column::Duration,
            CATERING => Column::Catering,
            DYNAMIC_FARE => Column::DynamicFare,
            _ => match name.strip_prefix(CLASS_PREFIX) {
                Some(code) => match ClassCode::from_code(code) {
                    Some(class) => Column::Class(class),
                    None => Column::UnknownClass(name.to_string()),
                },
                None => Column::Other(name.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureLayout {
    names: Vec<String>,
    columns: Vec<Column>,
    class_slots: [Option<usize>; ClassCode::ALL.len()],
}

impl FeatureLayout {
    pub fn from_order(order: &[String]) -> Result<Self, String> {
        if order.is_empty() {
            return Err("feature order is empty".to_string());
        }

        let mut seen = HashSet::with_capacity(order.len());
        let mut columns = Vec::with_capacity(order.len());
        let mut class_slots = [None; ClassCode::ALL.len()];

        for (idx, name) in order.iter().enumerate() {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature column '{}'", name));
            }

            let column = Column::parse(name);
            if let Column::Class(class) = column {
                class_slots[class.index()] = Some(idx);
            }
            columns.push(column);
        }

        Ok(Self {
            names: order.to_vec(),
            columns,
            class_slots,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn class_slot(&self, class: ClassCode) -> Option<usize> {
        self.class_slots[class.index()]
    }

    /// Accepted class codes the model has no one-hot column for.
    pub fn missing_classes(&self) -> Vec<ClassCode> {
        ClassCode::ALL
            .into_iter()
            .filter(|class| self.class_slot(*class).is_none())
            .collect()
    }

    /// Build the single-row vector for `input`, in layout order.
    ///
    /// A class code without a column leaves the whole one-hot family at 0.
    pub fn encode(&self, input: &TrainInput) -> FeatureVector<'_> {
        let values = self
            .columns
            .iter()
            .map(|column| match column {
                Column::Distance => input.distance as f32,
                Column::Duration => input.duration as f32,
                Column::Catering => flag(input.has_catering),
                Column::DynamicFare => flag(input.is_dynamic),
                Column::Class(class) => flag(*class == input.class_code),
                Column::UnknownClass(_) | Column::Other(_) => 0.0,
            })
            .collect();

        if self.class_slot(input.class_code).is_none() {
            warn!(
                "class code {} has no column in the model, encoding it as all zeros",
                input.class_code.as_str()
            );
        }

        FeatureVector {
            layout: self,
            values,
        }
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    layout: &'a FeatureLayout,
    values: Vec<f32>,
}

impl<'a> FeatureVector<'a> {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.layout.index_of(name).map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.layout
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl PartialEq for FeatureLayout {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}
