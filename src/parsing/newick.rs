//! Newick import for component trees.
//!
//! Leaves are resolved against the model, so they may carry either a plain
//! accession or a legacy accession (`GrtS{id}`, `GrtP{e}P{f}P{p}`). Branch
//! lengths, internal labels (usually support values) and bracketed comments
//! are accepted and discarded.

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};
use petgraph::graph::NodeIndex;

use crate::core::graph::LegoGraph;
use crate::model::store::Model;
use crate::parsing::ParseError;
use crate::utils::validation::check_newick_depth;

/// Recursive form of a tree, before leaves are resolved
#[derive(Debug, Default, PartialEq)]
pub struct ParsedNode {
    pub name: Option<String>,
    pub children: Vec<ParsedNode>,
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// Unquoted labels stop at Newick structural characters
fn parse_label(input: &str) -> IResult<&str, String> {
    let unquoted = map(take_while(|c: char| !"():;,[]".contains(c)), |s: &str| {
        s.trim().to_string()
    });
    let quoted = delimited(char('\''), map(is_not("'"), str::to_string), char('\''));

    alt((quoted, unquoted)).parse(input)
}

fn parse_length(input: &str) -> IResult<&str, f64> {
    preceded(ws(char(':')), double).parse(input)
}

fn parse_comment(input: &str) -> IResult<&str, Option<&str>> {
    opt(ws(delimited(char('['), take_while(|c| c != ']'), char(']')))).parse(input)
}

fn parse_subtree(input: &str) -> IResult<&str, ParsedNode> {
    let (input, children) = opt(delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), parse_subtree),
        ws(char(')')),
    ))
    .parse(input)?;

    let (input, label) = parse_label(input)?;
    let (input, _) = parse_comment(input)?;
    let (input, _) = opt(parse_length).parse(input)?;
    let (input, _) = parse_comment(input)?;

    Ok((
        input,
        ParsedNode {
            name: Some(label).filter(|l| !l.is_empty()),
            children: children.unwrap_or_default(),
        },
    ))
}

// Deepest run of open parentheses, ignoring quoted labels and comments
fn nesting_depth(text: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let mut closer = None;
    for c in text.chars() {
        match (closer, c) {
            (Some(end), c) if c == end => closer = None,
            (Some(_), _) => {}
            (None, '\'') => closer = Some('\''),
            (None, '[') => closer = Some(']'),
            (None, '(') => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            (None, ')') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Parse a single Newick tree ending in `;`.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the text is not one Newick tree,
/// or nests deeper than `MAX_NEWICK_DEPTH`.
pub fn parse_newick_text(text: &str) -> Result<ParsedNode, ParseError> {
    if let Some(message) = check_newick_depth(nesting_depth(text)) {
        return Err(ParseError::InvalidFormat(message));
    }

    match (ws(parse_subtree), ws(char(';'))).parse(text) {
        Ok((rest, (root, _))) if rest.trim().is_empty() => Ok(root),
        Ok((rest, _)) => Err(ParseError::InvalidFormat(format!(
            "Unexpected text after the tree: '{}'",
            rest.chars().take(50).collect::<String>()
        ))),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ParseError::InvalidFormat(format!(
            "Invalid Newick at offset {} ({:?}): '{}'",
            text.offset(e.input),
            e.code,
            e.input.chars().take(50).collect::<String>()
        ))),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::InvalidFormat(
            "Incomplete Newick tree".to_string(),
        )),
    }
}

/// Parse a Newick tree into a rooted graph whose leaves are model nodes.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for malformed text, unnamed or
/// repeated leaves, or `ParseError::Model` if a leaf names nothing in
/// `model`.
pub fn parse_newick(text: &str, model: &Model) -> Result<LegoGraph, ParseError> {
    let root = parse_newick_text(text)?;
    let mut graph = LegoGraph::new();
    add_subtree(&mut graph, root, model)?;
    Ok(graph)
}

/// Read a Newick file, as [`parse_newick`]
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or as [`parse_newick`].
pub fn parse_newick_file(path: &std::path::Path, model: &Model) -> Result<(LegoGraph, String), ParseError> {
    let text = std::fs::read_to_string(path)?;
    let graph = parse_newick(&text, model)?;
    Ok((graph, text.trim().to_string()))
}

fn add_subtree(graph: &mut LegoGraph, node: ParsedNode, model: &Model) -> Result<NodeIndex, ParseError> {
    if node.children.is_empty() {
        let name = node
            .name
            .ok_or_else(|| ParseError::InvalidFormat("Tree has a leaf with no name".to_string()))?;
        let leaf = model.find_node(&name)?;

        if graph.find_leaf(leaf).is_some() {
            return Err(ParseError::InvalidFormat(format!(
                "Leaf '{name}' appears more than once in the tree"
            )));
        }
        return Ok(graph.add_leaf(leaf));
    }

    let clade = graph.add_clade();
    for child in node.children {
        let child = add_subtree(graph, child, model)?;
        graph.add_edge(clade, child);
    }
    Ok(clade)
}
