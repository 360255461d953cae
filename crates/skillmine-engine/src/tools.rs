use anyhow::Result;
use skillmine_store::RelationStore;
use skillmine_types::{
    PairCount, SequenceCount, Source, SourceToolCount, ToolCallRecord, ToolCount, ToolErrorStats,
    ToolUsageReport,
};
use std::collections::{BTreeMap, HashMap};

/// N-gram lengths mined within a single turn.
const NGRAM_SIZES: [usize; 3] = [2, 3, 4];

/// Top rows kept per n-gram table and for co-occurrence pairs.
const TOP_SEQUENCES: usize = 50;

/// Phase 2b: analyze the tool_calls relation. Frequency tables are
/// persisted; the full report is returned for classification and rendering.
pub fn run_tool_analysis(store: &RelationStore) -> Result<ToolUsageReport> {
    let calls = store.read_tool_calls()?;
    let report = analyze_tool_usage(&calls);
    store.write_tool_frequency(&report.frequency)?;
    store.write_tool_frequency_by_source(&report.frequency_by_source)?;
    Ok(report)
}

/// Frequency, within-turn n-gram, co-occurrence, and error-rate analysis.
///
/// All rankings order by count descending with lexicographic tie-breaks so
/// downstream classification is deterministic.
pub fn analyze_tool_usage(calls: &[ToolCallRecord]) -> ToolUsageReport {
    if calls.is_empty() {
        return ToolUsageReport::default();
    }

    let mut report = ToolUsageReport::default();

    // --- Frequency ---

    let mut freq: HashMap<&str, u32> = HashMap::new();
    let mut freq_by_source: HashMap<(Source, &str), u32> = HashMap::new();
    for call in calls {
        *freq.entry(call.tool_name.as_str()).or_insert(0) += 1;
        *freq_by_source.entry((call.source, call.tool_name.as_str())).or_insert(0) += 1;
    }

    report.frequency = freq
        .iter()
        .map(|(&tool_name, &count)| ToolCount { tool_name: tool_name.to_string(), count })
        .collect();
    report.frequency.sort_by(|a, b| b.count.cmp(&a.count).then(a.tool_name.cmp(&b.tool_name)));

    report.frequency_by_source = freq_by_source
        .into_iter()
        .map(|((source, tool_name), count)| SourceToolCount {
            source,
            tool_name: tool_name.to_string(),
            count,
        })
        .collect();
    report.frequency_by_source.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.source.cmp(&b.source))
            .then(a.tool_name.cmp(&b.tool_name))
    });

    // --- Per-turn sequences ---

    let mut turns: BTreeMap<(Source, &str, u32), Vec<(u32, &str)>> = BTreeMap::new();
    for call in calls {
        turns
            .entry((call.source, call.session_id.as_str(), call.prompt_idx))
            .or_default()
            .push((call.call_idx, call.tool_name.as_str()));
    }

    let turn_sequences: Vec<Vec<&str>> = turns
        .into_values()
        .map(|mut sequence| {
            sequence.sort_unstable_by_key(|&(call_idx, _)| call_idx);
            sequence.into_iter().map(|(_, tool)| tool).collect()
        })
        .collect();

    for n in NGRAM_SIZES {
        let mut counter: HashMap<&[&str], u32> = HashMap::new();
        for tools in &turn_sequences {
            if tools.len() < n {
                continue;
            }
            for window in tools.windows(n) {
                *counter.entry(window).or_insert(0) += 1;
            }
        }

        let mut rows: Vec<SequenceCount> = counter
            .into_iter()
            .map(|(gram, count)| SequenceCount {
                sequence: gram.iter().map(|s| s.to_string()).collect(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.sequence.cmp(&b.sequence)));
        rows.truncate(TOP_SEQUENCES);
        report.ngrams.insert(n, rows);
    }

    let mut pair_counts: HashMap<(&str, &str), u32> = HashMap::new();
    for tools in &turn_sequences {
        let mut distinct: Vec<&str> = tools.clone();
        distinct.sort_unstable();
        distinct.dedup();
        for (i, &a) in distinct.iter().enumerate() {
            for &b in &distinct[i + 1..] {
                *pair_counts.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    report.cooccurrence = pair_counts
        .into_iter()
        .map(|((a, b), count)| PairCount {
            tool_a: a.to_string(),
            tool_b: b.to_string(),
            count,
        })
        .collect();
    report.cooccurrence.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.tool_a.cmp(&b.tool_a))
            .then(a.tool_b.cmp(&b.tool_b))
    });
    report.cooccurrence.truncate(TOP_SEQUENCES);

    // --- Error rates ---

    let mut error_counts: HashMap<&str, u32> = HashMap::new();
    for call in calls.iter().filter(|c| c.is_error) {
        *error_counts.entry(call.tool_name.as_str()).or_insert(0) += 1;
    }

    report.errors = error_counts
        .into_iter()
        .map(|(tool_name, error_count)| {
            let count = freq.get(tool_name).copied().unwrap_or(error_count);
            ToolErrorStats {
                tool_name: tool_name.to_string(),
                error_count,
                count,
                error_rate_pct: f64::from(error_count) / f64::from(count) * 100.0,
            }
        })
        .collect();
    report
        .errors
        .sort_by(|a, b| b.error_count.cmp(&a.error_count).then(a.tool_name.cmp(&b.tool_name)));

    report
}
