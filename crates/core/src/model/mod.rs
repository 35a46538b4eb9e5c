//! Wire-level data model for raw CFG payloads.
//!
//! These types mirror the analysis server's JSON exactly:
//! - `functions`: address string -> list of block address strings
//! - `nodes`: `{type: "IRSB", addr}` or `{type: "proc", name}`
//! - `edges`: `{from, to}` with full node objects as endpoints
//!
//! Raw nodes arrive duck-typed (an informal `type` tag with optional
//! `addr`/`name` fields). Validation into the [`CfgNode`] tagged union
//! happens here, at the boundary, so everything downstream can match
//! exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address of a basic block or function entry point.
pub type Address = u64;

/// Error for address strings that are neither hex nor decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address string {0:?}")]
pub struct AddressParseError(pub String);

/// Parse an address string as `0x`-prefixed hex or plain decimal.
pub fn parse_address(s: &str) -> Result<Address, AddressParseError> {
    let trimmed = s.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => Address::from_str_radix(hex, 16),
        None => trimmed.parse::<Address>(),
    };
    parsed.map_err(|_| AddressParseError(s.to_string()))
}

/// A graph node exactly as the backend serializes it.
///
/// Block nodes may additionally carry a full IR body (`irsb`) when not sent
/// as a bare reference; the pipeline ignores any such extra fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawNode {
    pub fn block(addr: Address) -> Self {
        Self { kind: "IRSB".to_string(), addr: Some(addr), name: None }
    }

    pub fn procedure(name: impl Into<String>) -> Self {
        Self { kind: "proc".to_string(), addr: None, name: Some(name.into()) }
    }
}

/// A raw node that failed validation into the tagged union.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeShapeError {
    #[error("node of type \"IRSB\" is missing its addr field")]
    MissingAddr,
    #[error("node of type \"proc\" is missing its name field")]
    MissingName,
    #[error("unrecognized node type {0:?}")]
    UnknownType(String),
}

/// Validated graph node: a basic block identified by start address, or an
/// external procedure identified by symbolic name.
///
/// Procedure names are taken verbatim; names differing only in case are
/// distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CfgNode {
    Block { addr: Address },
    Procedure { name: String },
}

impl CfgNode {
    /// Validate a raw wire node. Malformed shapes are rejected, never
    /// coerced.
    pub fn from_raw(raw: &RawNode) -> Result<Self, NodeShapeError> {
        match raw.kind.as_str() {
            "IRSB" => match raw.addr {
                Some(addr) => Ok(CfgNode::Block { addr }),
                None => Err(NodeShapeError::MissingAddr),
            },
            "proc" => match &raw.name {
                Some(name) => Ok(CfgNode::Procedure { name: name.clone() }),
                None => Err(NodeShapeError::MissingName),
            },
            other => Err(NodeShapeError::UnknownType(other.to_string())),
        }
    }

    /// Display label for presentation: blocks render as hex addresses,
    /// procedures as their name.
    pub fn label(&self) -> String {
        match self {
            CfgNode::Block { addr } => format!("0x{addr:x}"),
            CfgNode::Procedure { name } => name.clone(),
        }
    }
}

/// A raw control-flow edge; both endpoints are full node objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    pub from: RawNode,
    pub to: RawNode,
}

/// A complete raw CFG payload as produced by one analysis run.
///
/// The function map is deserialized into a `BTreeMap` so iteration order is
/// deterministic (ascending by key string); color assignment relies on the
/// parsed map's ascending-address order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCfg {
    pub functions: BTreeMap<String, Vec<String>>,
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawCfg {
    /// Parse the function map into numeric addresses, keyed ascending.
    pub fn function_blocks(&self) -> Result<BTreeMap<Address, Vec<Address>>, AddressParseError> {
        let mut out = BTreeMap::new();
        for (addr, blocks) in &self.functions {
            let blocks = blocks
                .iter()
                .map(|b| parse_address(b))
                .collect::<Result<Vec<_>, _>>()?;
            out.insert(parse_address(addr)?, blocks);
        }
        Ok(out)
    }
}
