//! Metrics cache ops (§3.3, §4.5): `cx-graph` computes, this persists and
//! serves it back so callers don't recompute PageRank/betweenness on every
//! query.

use crate::params::{get_float, get_int, get_str, int_param, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::entity::EntityId;
use cx_core::metrics::Metrics;
use cx_core::CxError;

fn metrics_to_params(m: &Metrics) -> Params {
    let mut p = Params::new();
    p.insert("entity_id".into(), str_param(m.entity_id.0.clone()));
    p.insert("pagerank".into(), DataValue::from(m.pagerank));
    p.insert("betweenness".into(), DataValue::from(m.betweenness));
    p.insert("in_degree".into(), int_param(m.in_degree as i64));
    p.insert("out_degree".into(), int_param(m.out_degree as i64));
    p.insert("computed_at".into(), str_param(m.computed_at.to_rfc3339()));
    p
}

fn row_to_metrics(row: &[DataValue]) -> Result<Metrics, CxError> {
    Ok(Metrics {
        entity_id: EntityId(get_str(row, 0, "entity_id")?),
        pagerank: get_float(row, 1, "pagerank")?,
        betweenness: get_float(row, 2, "betweenness")?,
        in_degree: get_int(row, 3, "in_degree")? as u32,
        out_degree: get_int(row, 4, "out_degree")? as u32,
        computed_at: chrono::DateTime::parse_from_rfc3339(&get_str(row, 5, "computed_at")?)
            .map_err(|e| CxError::Integrity { reason: format!("computed_at: {e}") })?
            .with_timezone(&chrono::Utc),
    })
}

const METRICS_COLUMNS: &str = "entity_id, pagerank, betweenness, in_degree, out_degree, computed_at";

impl Store {
    pub async fn save_bulk_metrics(&self, metrics: &[Metrics]) -> Result<(), CxError> {
        for m in metrics {
            let query = format!(
                "?[{METRICS_COLUMNS}] <- [[$entity_id, $pagerank, $betweenness, $in_degree, \
                 $out_degree, $computed_at]] :put Metrics {{ entity_id => pagerank, betweenness, \
                 in_degree, out_degree, computed_at }}"
            );
            self.db()
                .run_script(&query, metrics_to_params(m), ScriptMutability::Mutable)
                .map_err(|e| CxError::StoreConflict { reason: format!("save_bulk_metrics: {e}") })?;
        }
        Ok(())
    }

    pub async fn get_metrics(&self, id: &EntityId) -> Result<Option<Metrics>, CxError> {
        let query = format!("?[{METRICS_COLUMNS}] := *Metrics {{ {METRICS_COLUMNS} }}, entity_id == $id");
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        let result = self
            .db()
            .run_script(&query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_metrics: {e}") })?;
        result.rows.first().map(|r| row_to_metrics(r)).transpose()
    }

    async fn all_metrics(&self) -> Result<Vec<Metrics>, CxError> {
        let query = format!("?[{METRICS_COLUMNS}] := *Metrics {{ {METRICS_COLUMNS} }}");
        let result = self
            .db()
            .run_script(&query, Params::new(), ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("all_metrics: {e}") })?;
        result.rows.iter().map(|r| row_to_metrics(r)).collect()
    }

    pub async fn get_top_by_pagerank(&self, n: usize) -> Result<Vec<Metrics>, CxError> {
        let mut all = self.all_metrics().await?;
        all.sort_by(|a, b| b.pagerank.partial_cmp(&a.pagerank).unwrap_or(std::cmp::Ordering::Equal));
        all.truncate(n);
        Ok(all)
    }

    /// Keystones: high pagerank *and* high betweenness — entities that are
    /// both popular and sit on many shortest paths.
    pub async fn get_keystones(&self, threshold: f64) -> Result<Vec<Metrics>, CxError> {
        let all = self.all_metrics().await?;
        Ok(all
            .into_iter()
            .filter(|m| m.pagerank >= threshold && m.betweenness >= threshold)
            .collect())
    }

    /// Bottlenecks: high betweenness but low out-degree — few outgoing
    /// edges yet many shortest paths pass through.
    pub async fn get_bottlenecks(&self, threshold: f64) -> Result<Vec<Metrics>, CxError> {
        let all = self.all_metrics().await?;
        Ok(all
            .into_iter()
            .filter(|m| m.betweenness >= threshold && m.out_degree <= 1)
            .collect())
    }
}
