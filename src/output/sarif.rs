//! SARIF 2.1.0 re-export of a canonical result.
//!
//! The driver is named after the result's provenance tag, so a report from
//! a chained scan still says which engine actually produced it.

use std::collections::BTreeMap;

use serde_sarif::sarif::{
    ArtifactLocation, Location, Message, MultiformatMessageString, PhysicalLocation, Region,
    ReportingDescriptor, Result as SarifResult, ResultLevel, Run, Sarif, Tool, ToolComponent,
};

use crate::finding::{Position, ResultItem, ScanResult};

pub fn format(result: &ScanResult) -> String {
    let catalog = RuleCatalog::collect(&result.results);

    let results: Vec<SarifResult> = result
        .results
        .iter()
        .map(|item| to_sarif_result(item, &catalog))
        .collect();

    let driver = ToolComponent::builder()
        .name(result.prefix.clone())
        .rules(catalog.descriptors())
        .build();

    let run = Run::builder()
        .tool(Tool::builder().driver(driver).build())
        .results(results)
        .build();

    let sarif = Sarif::builder().version("2.1.0").runs(vec![run]).build();

    let mut out = serde_json::to_string_pretty(&sarif).expect("SARIF serialization failed");
    out.push('\n');
    out
}

/// Distinct rule ids in sorted order, each with the message of its first
/// finding.
struct RuleCatalog<'a> {
    rules: BTreeMap<&'a str, &'a str>,
}

impl<'a> RuleCatalog<'a> {
    fn collect(items: &'a [ResultItem]) -> Self {
        let mut rules = BTreeMap::new();
        for item in items {
            rules
                .entry(item.check_id.as_str())
                .or_insert(item.extra.message.as_str());
        }
        RuleCatalog { rules }
    }

    fn index_of(&self, check_id: &str) -> Option<i64> {
        self.rules
            .keys()
            .position(|id| *id == check_id)
            .and_then(|i| i64::try_from(i).ok())
    }

    fn descriptors(&self) -> Vec<ReportingDescriptor> {
        self.rules
            .iter()
            .map(|(id, message)| {
                let mut rule = ReportingDescriptor::builder().id(id.to_string()).build();
                rule.short_description = Some(
                    MultiformatMessageString::builder()
                        .text(message.to_string())
                        .build(),
                );
                rule
            })
            .collect()
    }
}

fn to_sarif_result(item: &ResultItem, catalog: &RuleCatalog<'_>) -> SarifResult {
    let mut sarif_result = SarifResult::builder()
        .message(Message::builder().text(item.extra.message.clone()).build())
        .build();

    sarif_result.rule_id = Some(item.check_id.clone());
    sarif_result.rule_index = catalog.index_of(&item.check_id);
    sarif_result.level = Some(level(&item.extra.severity));
    sarif_result.locations = location(item).map(|l| vec![l]);
    sarif_result
}

/// `None` for findings without a path.
fn location(item: &ResultItem) -> Option<Location> {
    if item.path.is_empty() {
        return None;
    }

    let mut physical = PhysicalLocation::builder().build();
    physical.artifact_location = Some(ArtifactLocation::builder().uri(item.path.clone()).build());
    physical.region = region(item.start, item.end);

    let mut location = Location::builder().build();
    location.physical_location = Some(physical);
    Some(location)
}

/// Unknown (zero) coordinates are omitted; no start line means no region.
fn region(start: Position, end: Position) -> Option<Region> {
    let start_line = known(start.line)?;
    let mut region = Region::builder().start_line(start_line).build();
    region.start_column = known(start.col);
    region.end_line = known(end.line);
    region.end_column = known(end.col);
    Some(region)
}

fn known(value: u32) -> Option<i64> {
    (value > 0).then(|| i64::from(value))
}

/// Maps a pass-through severity label onto the SARIF level vocabulary.
fn level(severity: &str) -> ResultLevel {
    match severity.to_ascii_lowercase().as_str() {
        "error" | "critical" | "high" => ResultLevel::Error,
        "note" | "info" | "low" => ResultLevel::Note,
        _ => ResultLevel::Warning,
    }
}
