//! Cell id selection events exchanged between applications

use crate::error::CoreError;
use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request to toggle the selection state of the given ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleIdRequest {
    pub ids: Vec<u32>,
}

/// The ids currently selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedIds {
    pub ids: Vec<u32>,
}

/// Operations between two cell sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellSetBinaryOpType {
    /// Synaptic projections from the first set onto the second
    Projections,
}

impl CellSetBinaryOpType {
    /// Keyword used in event scripts
    pub fn keyword(self) -> &'static str {
        match self {
            CellSetBinaryOpType::Projections => "SYNAPTIC_PROJECTIONS",
        }
    }
}

impl fmt::Display for CellSetBinaryOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for CellSetBinaryOpType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SYNAPTIC_PROJECTIONS" => Ok(CellSetBinaryOpType::Projections),
            other => Err(CoreError::Parse(format!(
                "Unknown cell set operation: {}",
                other
            ))),
        }
    }
}

/// Binary operation over two cell sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSetBinaryOp {
    pub first: Vec<u32>,
    pub second: Vec<u32>,
    pub operation: CellSetBinaryOpType,
}

impl CellSetBinaryOp {
    pub fn new(first: Vec<u32>, second: Vec<u32>, operation: CellSetBinaryOpType) -> Self {
        Self {
            first,
            second,
            operation,
        }
    }
}

impl From<Vec<u32>> for ToggleIdRequest {
    fn from(ids: Vec<u32>) -> Self {
        Self { ids }
    }
}

impl From<Vec<u32>> for SelectedIds {
    fn from(ids: Vec<u32>) -> Self {
        Self { ids }
    }
}

impl Topic for ToggleIdRequest {
    const TYPE_NAME: &'static str = "lumos::data::ToggleIdRequest";
}

impl Topic for SelectedIds {
    const TYPE_NAME: &'static str = "lumos::data::SelectedIds";
}

impl Topic for CellSetBinaryOp {
    const TYPE_NAME: &'static str = "lumos::data::CellSetBinaryOp";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_keyword() {
        let operation: CellSetBinaryOpType = " SYNAPTIC_PROJECTIONS ".parse().unwrap();
        assert_eq!(operation, CellSetBinaryOpType::Projections);
        assert_eq!(operation.to_string(), "SYNAPTIC_PROJECTIONS");
        assert!("UNION".parse::<CellSetBinaryOpType>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let op = CellSetBinaryOp::new(vec![1, 2], vec![3], CellSetBinaryOpType::Projections);
        assert_eq!(
            op.to_json().unwrap(),
            r#"{"first":[1,2],"second":[3],"operation":"Projections"}"#
        );

        let selected = SelectedIds::from_json(r#"{"ids":[4,5,6]}"#).unwrap();
        assert_eq!(selected, SelectedIds::from(vec![4, 5, 6]));
    }
}
