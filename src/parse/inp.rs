//! Reader for Abaqus-style `.inp` meshes.
//!
//! Only the `*NODE`, `*ELEMENT` and `*BOUNDARY` sections are read. Any other
//! keyword line ends the current section, `**` lines are comments.

use std::collections::BTreeMap;
use std::num::{ParseFloatError, ParseIntError};

use serde::Serialize;
use thiserror::Error;

use crate::geom::{BoundaryFixity, Element, ElementId, NodeId, Point3};

/// Result type for `.inp` parsing.
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid number: {0}")]
    Number(#[from] ParseFloatError),
    #[error("invalid index: {0}")]
    Index(#[from] ParseIntError),
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
}

fn format_error(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::Format {
        line,
        message: message.into(),
    }
}

/// Nodes, elements and fixed DOFs of one `.inp` file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InpMesh {
    /// Two-dimensional nodes get `z = 0`.
    pub nodes: BTreeMap<NodeId, Point3>,
    pub elements: Vec<Element>,
    pub boundary: BoundaryFixity,
    /// Largest coordinate count seen on a node line.
    pub dimension: usize,
}

impl InpMesh {
    #[must_use]
    pub fn planar_nodes(&self) -> BTreeMap<NodeId, [f64; 2]> {
        self.nodes.iter().map(|(id, p)| (*id, [p.x, p.y])).collect()
    }

    #[must_use]
    pub fn spatial_nodes(&self) -> BTreeMap<NodeId, [f64; 3]> {
        self.nodes.iter().map(|(id, p)| (*id, [p.x, p.y, p.z])).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Node,
    Element,
    Boundary,
    Other,
}

impl Section {
    fn from_keyword(line: &str) -> Self {
        let keyword = line
            .trim_start_matches('*')
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "NODE" => Self::Node,
            "ELEMENT" => Self::Element,
            "BOUNDARY" => Self::Boundary,
            _ => Self::Other,
        }
    }
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).filter(|f| !f.is_empty()).collect()
}

fn parse_node(number: usize, fields: &[&str]) -> ParseResult<(NodeId, Point3, usize)> {
    let (id, coords) = fields
        .split_first()
        .ok_or_else(|| format_error(number, "empty node line"))?;
    if !(2..=3).contains(&coords.len()) {
        return Err(format_error(
            number,
            format!("node needs two or three coordinates, got {}", coords.len()),
        ));
    }
    let values = coords.iter().map(|c| c.parse::<f64>()).collect::<Result<Vec<_>, _>>()?;
    let z = values.get(2).copied().unwrap_or(0.0);
    Ok((id.parse()?, Point3::new(values[0], values[1], z), values.len()))
}

fn parse_element(number: usize, fields: &[&str]) -> ParseResult<Element> {
    let (id, nodes) = fields
        .split_first()
        .ok_or_else(|| format_error(number, "empty element line"))?;
    if nodes.is_empty() {
        return Err(format_error(number, "element has no nodes"));
    }
    let id: ElementId = id.parse()?;
    let nodes = nodes.iter().map(|n| n.parse::<NodeId>()).collect::<Result<Vec<_>, _>>()?;
    Ok(Element::new(id, nodes))
}

fn parse_boundary(number: usize, fields: &[&str]) -> ParseResult<(NodeId, Vec<usize>)> {
    let (id, dofs) = fields
        .split_first()
        .ok_or_else(|| format_error(number, "empty boundary line"))?;
    if dofs.is_empty() {
        return Err(format_error(number, "boundary line names no degree of freedom"));
    }
    let dofs = dofs.iter().map(|d| d.parse::<usize>()).collect::<Result<Vec<_>, _>>()?;
    Ok((id.parse()?, dofs))
}

/// Parses `.inp` text.
pub fn parse_str(input: &str) -> ParseResult<InpMesh> {
    let mut mesh = InpMesh::default();
    let mut section = Section::Other;

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("**") {
            continue;
        }
        if line.starts_with('*') {
            section = Section::from_keyword(line);
            continue;
        }

        let fields = fields(line);
        match section {
            Section::Node => {
                let (id, point, dimension) = parse_node(number, &fields)?;
                if mesh.nodes.insert(id, point).is_some() {
                    return Err(format_error(number, format!("duplicate node {id}")));
                }
                mesh.dimension = mesh.dimension.max(dimension);
            }
            Section::Element => mesh.elements.push(parse_element(number, &fields)?),
            Section::Boundary => {
                let (id, dofs) = parse_boundary(number, &fields)?;
                mesh.boundary.fix(id, dofs);
            }
            Section::Other => {}
        }
    }

    log::debug!(
        "parsed inp mesh: {} nodes, {} elements, {} fixed nodes",
        mesh.nodes.len(),
        mesh.elements.len(),
        mesh.boundary.iter().count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
*HEADING
unit square
** nodes follow
*NODE
1, 0.0, 0.0
2, 1.0, 0.0
3, 1.0, 1.0
4, 0.0, 1.0
*Element, type=CPS4
1, 1, 2, 3, 4
*boundary
1, 1, 2
2, 2
*STEP
";

    #[test]
    fn reads_all_sections() {
        let mesh = parse_str(SQUARE).unwrap();
        assert_eq!(mesh.nodes.len(), 4);
        assert_eq!(mesh.nodes[&3], Point3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.dimension, 2);
        assert_eq!(mesh.elements, vec![Element::new(1, vec![1, 2, 3, 4])]);
        assert!(mesh.boundary.is_fixed(1, 1) && mesh.boundary.is_fixed(1, 2));
        assert!(mesh.boundary.is_fixed(2, 2) && !mesh.boundary.is_fixed(2, 1));
        assert!(!mesh.boundary.is_fixed(3, 1));
    }

    #[test]
    fn bad_number_is_reported() {
        let err = parse_str("*NODE\n1, zero, 0.0\n").unwrap_err();
        assert!(matches!(err, ParseError::Number(_)));
        let err = parse_str("*ELEMENT\nx, 1, 2\n").unwrap_err();
        assert!(matches!(err, ParseError::Index(_)));
    }

    #[test]
    fn format_errors_carry_line_numbers() {
        let err = parse_str("*NODE\n1, 0.0, 0.0\n2, 1.0\n").unwrap_err();
        assert!(matches!(err, ParseError::Format { line: 3, .. }));
        let err = parse_str("*NODE\n1, 0.0, 0.0\n1, 1.0, 1.0\n").unwrap_err();
        assert!(matches!(err, ParseError::Format { line: 3, .. }));
    }

    #[test]
    fn lines_outside_known_sections_are_ignored() {
        let mesh = parse_str("*HEADING\n1, 2, 3\n").unwrap();
        assert!(mesh.nodes.is_empty() && mesh.elements.is_empty());
    }
}
