//! Contract tests for the published tool surface.
//!
//! The tool list is part of the server's public contract with MCP
//! clients; renames and removals break saved client configurations.

use gap_mcp::mcp::handler::GapServer;

const EXPECTED_TOOLS: [&str; 14] = [
    "gap_eval",
    "gap_group_info",
    "gap_elements",
    "gap_subgroups",
    "gap_character_table",
    "gap_sylow",
    "gap_center",
    "gap_derived_series",
    "gap_conjugacy_classes",
    "gap_isomorphism",
    "gap_abelian_invariants",
    "gap_automorphisms",
    "gap_load_package",
    "gap_reset",
];

#[test]
fn exposes_exactly_the_published_tools() {
    let names: Vec<String> = GapServer::all_tools()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect();

    assert_eq!(names.len(), EXPECTED_TOOLS.len());
    for expected in EXPECTED_TOOLS {
        assert!(
            names.iter().any(|name| name == expected),
            "missing tool {expected}"
        );
    }
}

#[test]
fn tool_names_are_unique() {
    let mut names: Vec<String> = GapServer::all_tools()
        .iter()
        .map(|tool| tool.name.to_string())
        .collect();
    let before = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn every_tool_is_namespaced_and_documented() {
    for tool in GapServer::all_tools() {
        assert!(
            tool.name.starts_with("gap_"),
            "tool {} is not namespaced under gap_",
            tool.name
        );
        let description = tool.description.as_deref().unwrap_or_default();
        assert!(
            !description.is_empty(),
            "tool {} lacks a description",
            tool.name
        );
    }
}

#[test]
fn no_tool_publishes_optional_display_metadata() {
    // The description is the whole human-facing surface; clients derive
    // display names from the tool name when no title is set.
    for tool in GapServer::all_tools() {
        assert!(tool.title.is_none(), "tool {} sets a title", tool.name);
        assert!(tool.icons.is_none(), "tool {} sets icons", tool.name);
        assert!(tool.meta.is_none(), "tool {} sets meta", tool.name);
    }
}
