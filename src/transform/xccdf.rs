use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{Result, ScanError};

use super::{rule_id_matches, CheckRef, ReportTransform, RuleOutcome, RuleResult, Severity, Tally};

/// Reads XCCDF result documents directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct XccdfTransform;

impl XccdfTransform {
    /// Every `rule-result` in document order.
    pub fn rule_results(&self, results: &Path) -> Result<Vec<RuleOutcome>> {
        let text = std::fs::read_to_string(results)?;
        parse_rule_results(&text).map_err(|message| ScanError::ResultDocument {
            file: results.display().to_string(),
            message,
        })
    }
}

impl ReportTransform for XccdfTransform {
    fn tally(&self, results: &Path) -> Result<Tally> {
        Ok(Tally::from_outcomes(&self.rule_results(results)?))
    }

    fn rule_outcome(&self, results: &Path, rule_id: &str) -> Result<Option<RuleOutcome>> {
        // A rule evaluated twice keeps its last result.
        Ok(self
            .rule_results(results)?
            .into_iter()
            .rev()
            .find(|o| rule_id_matches(&o.rule_id, rule_id)))
    }

    fn rule_ids(&self, results: &Path) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .rule_results(results)?
            .into_iter()
            .map(|o| o.rule_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

fn parse_rule_results(text: &str) -> std::result::Result<Vec<RuleOutcome>, String> {
    let doc = Document::parse(text).map_err(|e| e.to_string())?;

    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "rule-result")
        .map(rule_outcome)
        .collect()
}

fn rule_outcome(node: Node<'_, '_>) -> std::result::Result<RuleOutcome, String> {
    let rule_id = node
        .attribute("idref")
        .ok_or_else(|| "rule-result without idref".to_string())?
        .to_string();

    let result_text = child(node, "result")
        .and_then(|n| n.text())
        .ok_or_else(|| format!("rule-result {} has no result", rule_id))?;
    let result = RuleResult::from_str_lenient(result_text)
        .ok_or_else(|| format!("rule-result {} has unknown result {:?}", rule_id, result_text))?;

    let severity = node
        .attribute("severity")
        .and_then(Severity::from_str_lenient)
        .unwrap_or(Severity::Unknown);

    let check = child(node, "check")
        .and_then(|c| child(c, "check-content-ref"))
        .and_then(|r| {
            r.attribute("name").map(|name| CheckRef {
                name: name.to_string(),
                href: r.attribute("href").map(str::to_string),
            })
        });

    Ok(RuleOutcome {
        rule_id,
        result,
        severity,
        check,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}
