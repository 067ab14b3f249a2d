//! Subcommand implementations. Each writes its report to `out`.

use std::io::Write;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use omnigraph_core::{
    Config, ConfidenceEngine, DependencyReport, GraphEdge, ScoringContext, UniversalGraph,
    UniversalNodeId,
};

use crate::facts::{self, Facts};

pub struct BuildOptions<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub project: Option<&'a str>,
    pub detect_http: bool,
}

/// Build a graph from a facts file and emit Omni-Schema JSON.
///
/// Per-item rejections and unmatched HTTP registrations go to `diagnostics`.
pub fn build(
    options: BuildOptions<'_>,
    config: &Config,
    out: &mut impl Write,
    diagnostics: &mut impl Write,
) -> Result<UniversalGraph> {
    let content = std::fs::read_to_string(options.input)
        .wrap_err_with(|| format!("failed to read {}", options.input.display()))?;
    let facts: Facts = serde_json::from_str(&content)
        .wrap_err_with(|| format!("{} is not a facts document", options.input.display()))?;

    let assembly = facts::assemble(facts, config, options.project, options.detect_http);

    for rejected in &assembly.rejected {
        writeln!(diagnostics, "skipped {}", rejected)?;
    }
    for client in &assembly.links.unmatched_clients {
        writeln!(
            diagnostics,
            "unmatched client {} {} ({})",
            client.method(),
            client.normalized(),
            client.node_id()
        )?;
    }
    for endpoint in &assembly.links.unmatched_endpoints {
        writeln!(
            diagnostics,
            "unmatched endpoint {} {} ({})",
            endpoint.method(),
            endpoint.normalized(),
            endpoint.node_id()
        )?;
    }

    let json = assembly.graph.to_json()?;
    match options.output {
        Some(path) => {
            std::fs::write(path, &json)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            writeln!(
                diagnostics,
                "wrote {} nodes, {} edges to {}",
                assembly.graph.node_count(),
                assembly.graph.edge_count(),
                path.display()
            )?;
        }
        None => writeln!(out, "{}", json)?,
    }

    Ok(assembly.graph)
}

pub fn load_graph(path: &Path) -> Result<UniversalGraph> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    UniversalGraph::from_json(&content)
        .wrap_err_with(|| format!("{} is not an Omni-Schema graph", path.display()))
}

/// Print the dependencies (or dependents) of one node.
pub fn deps(
    graph: &UniversalGraph,
    node: &str,
    min_confidence: f64,
    reverse: bool,
    json: bool,
    out: &mut impl Write,
) -> Result<DependencyReport> {
    let node = UniversalNodeId::parse(node)?.canonical();
    if graph.get_node(&node).is_none() {
        tracing::warn!(node = %node, "node not present in graph");
    }

    let report = if reverse {
        graph.get_dependents(&node, min_confidence)
    } else {
        graph.get_dependencies(&node, min_confidence)
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(report);
    }

    let heading = if reverse { "Dependents" } else { "Dependencies" };
    writeln!(out, "{} of {} (threshold {:.2})", heading, report.node_id, min_confidence)?;
    writeln!(out, "  Definite ({}):", report.definite.len())?;
    for edge in &report.definite {
        write_edge(out, edge, reverse)?;
    }
    writeln!(out, "  Uncertain ({}):", report.uncertain.len())?;
    for edge in &report.uncertain {
        write_edge(out, edge, reverse)?;
    }
    if report.requires_human_approval {
        writeln!(out, "  Human approval required before acting on uncertain edges.")?;
    }

    Ok(report)
}

/// List edges below the approval threshold.
pub fn review(
    graph: &UniversalGraph,
    threshold: f64,
    json: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let edges: Vec<&GraphEdge> = graph.edges_requiring_review(threshold).collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&edges)?)?;
        return Ok(edges.len());
    }

    if edges.is_empty() {
        writeln!(out, "No edges below {:.2}.", threshold)?;
        return Ok(0);
    }
    writeln!(out, "{} edge(s) below {:.2}:", edges.len(), threshold)?;
    for edge in &edges {
        writeln!(
            out,
            "  {} -> {}  {} {:.2} [{}]",
            edge.from_id(),
            edge.to_id(),
            edge.edge_type(),
            edge.confidence(),
            edge.level()
        )?;
        writeln!(out, "      {}", edge.evidence())?;
    }
    Ok(edges.len())
}

/// Show how a relationship of `edge_type` would be scored.
pub fn score(
    config: &Config,
    edge_type: &str,
    context: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let context: ScoringContext = match context {
        Some(raw) => serde_json::from_str(raw).wrap_err("--context must be a JSON object")?,
        None => ScoringContext::new(),
    };
    let engine = ConfidenceEngine::new(config.confidence.clone());
    let evidence = engine.score_tag(edge_type, &context)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&evidence)?)?;
        return Ok(());
    }

    writeln!(out, "Edge type:   {}", evidence.edge_type())?;
    writeln!(out, "Base score:  {:.2}", evidence.base_score())?;
    for adjustment in evidence.adjustments() {
        writeln!(out, "  {:+.2}  {}", adjustment.delta, adjustment.reason)?;
    }
    writeln!(out, "Final score: {}", evidence.final_score())?;
    writeln!(out, "Level:       {}", evidence.level())?;
    writeln!(
        out,
        "Review:      {}",
        if engine.needs_review(evidence.final_score()) {
            "required"
        } else {
            "not required"
        }
    )?;
    Ok(())
}

/// Decode a canonical node id.
pub fn parse_id(id: &str, out: &mut impl Write) -> Result<()> {
    let id = UniversalNodeId::parse(id)?;
    writeln!(out, "language:  {}", id.language())?;
    writeln!(out, "module:    {}", id.module())?;
    writeln!(out, "type:      {} ({:?})", id.node_type(), id.node_type().category())?;
    writeln!(out, "name:      {}", id.name())?;
    if let Some(method) = id.method() {
        writeln!(out, "method:    {}", method)?;
    }
    Ok(())
}

fn write_edge(out: &mut impl Write, edge: &GraphEdge, reverse: bool) -> Result<()> {
    let other = if reverse { edge.from_id() } else { edge.to_id() };
    writeln!(
        out,
        "    {}  {} {:.2} [{}]",
        other,
        edge.edge_type(),
        edge.confidence(),
        edge.level()
    )?;
    Ok(())
}
