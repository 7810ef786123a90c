//! SQLite implementation of [`GraphStore`].
//!
//! [`SqliteStore`] persists the graph in three tables (`nodes`,
//! `node_labels`, `edges`) with WAL mode and foreign keys. Every write
//! method runs in one transaction; property merges happen in Rust and the
//! merged map is written back as JSON TEXT.

use std::collections::HashSet;

use moma_core::PropertyMap;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::error::StorageError;
use crate::identifier::Identifier;
use crate::traits::GraphStore;
use crate::types::{
    apply_overlay, merge_properties, PropertyOverlay, StoredEdge, StoredNode, WriteStatus,
};

/// SQLite-backed implementation of [`GraphStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn load_properties(tx: &Connection, id: &str) -> Result<Option<PropertyMap>, StorageError> {
        let json: Option<String> = tx
            .query_row(
                "SELECT properties_json FROM nodes WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn load_labels(conn: &Connection, id: &str) -> Result<Vec<Identifier>, StorageError> {
        let mut stmt =
            conn.prepare_cached("SELECT label FROM node_labels WHERE node_id = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        let mut labels = Vec::new();
        for row in rows {
            labels.push(Identifier::from_stored(row?));
        }
        Ok(labels)
    }

    fn load_node(conn: &Connection, id: &str) -> Result<Option<StoredNode>, StorageError> {
        let Some(properties) = Self::load_properties(conn, id)? else {
            return Ok(None);
        };
        Ok(Some(StoredNode {
            id: id.to_string(),
            labels: Self::load_labels(conn, id)?,
            properties,
        }))
    }

    fn node_exists(tx: &Transaction<'_>, id: &str) -> Result<bool, StorageError> {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM nodes WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn write_properties(tx: &Transaction<'_>, id: &str, properties: &PropertyMap) -> Result<(), StorageError> {
        let json = serde_json::to_string(properties)?;
        tx.execute(
            "INSERT INTO nodes (id, properties_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET properties_json = excluded.properties_json",
            params![id, json],
        )?;
        Ok(())
    }
}

impl GraphStore for SqliteStore {
    // -------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------

    fn merge_nodes(&mut self, nodes: &[StoredNode]) -> Result<WriteStatus, StorageError> {
        let tx = self.conn.transaction()?;
        let mut status = WriteStatus::default();
        for node in nodes {
            let mut properties = Self::load_properties(&tx, &node.id)?.unwrap_or_default();
            merge_properties(&mut properties, &node.properties);
            Self::write_properties(&tx, &node.id, &properties)?;

            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO node_labels (node_id, label) VALUES (?1, ?2)")?;
            for label in &node.labels {
                stmt.execute(params![node.id, label.as_str()])?;
            }
            status.written += 1;
        }
        tx.commit()?;
        Ok(status)
    }

    fn merge_edges(&mut self, edges: &[StoredEdge]) -> Result<WriteStatus, StorageError> {
        let tx = self.conn.transaction()?;
        let mut status = WriteStatus::default();
        for edge in edges {
            if !Self::node_exists(&tx, &edge.from)? || !Self::node_exists(&tx, &edge.to)? {
                status.skipped += 1;
                continue;
            }

            let existing: Option<String> = tx
                .query_row(
                    "SELECT properties_json FROM edges
                     WHERE source_id = ?1 AND target_id = ?2 AND rel_type = ?3",
                    params![edge.from, edge.to, edge.rel_type.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            let mut properties: PropertyMap = match existing {
                Some(text) => serde_json::from_str(&text)?,
                None => PropertyMap::new(),
            };
            merge_properties(&mut properties, &edge.properties);

            tx.execute(
                "INSERT INTO edges (source_id, target_id, rel_type, properties_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(source_id, target_id, rel_type)
                 DO UPDATE SET properties_json = excluded.properties_json",
                params![
                    edge.from,
                    edge.to,
                    edge.rel_type.as_str(),
                    serde_json::to_string(&properties)?
                ],
            )?;
            status.written += 1;
        }
        tx.commit()?;
        Ok(status)
    }

    fn overlay_properties(&mut self, updates: &[PropertyOverlay]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut matched = 0;
        for update in updates {
            let Some(mut properties) = Self::load_properties(&tx, &update.id)? else {
                continue;
            };
            apply_overlay(&mut properties, &update.properties);
            Self::write_properties(&tx, &update.id, &properties)?;
            matched += 1;
        }
        tx.commit()?;
        Ok(matched)
    }

    fn delete_nodes(&mut self, ids: &[String]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare_cached("DELETE FROM nodes WHERE id = ?1")?;
            for id in ids {
                deleted += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(deleted)
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    fn get_nodes(&self, ids: &[String]) -> Result<Vec<StoredNode>, StorageError> {
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(node) = Self::load_node(&self.conn, id)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn find_nodes_by_label(&self, label: &Identifier) -> Result<Vec<StoredNode>, StorageError> {
        let ids: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT node_id FROM node_labels WHERE label = ?1 ORDER BY node_id")?;
            let rows = stmt.query_map(params![label.as_str()], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()?
        };
        self.get_nodes(&ids)
    }

    fn find_incident_edges(&self, ids: &[String]) -> Result<Vec<StoredEdge>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT source_id, target_id, rel_type, properties_json FROM edges
             WHERE source_id = ?1 OR target_id = ?1
             ORDER BY source_id, target_id, rel_type",
        )?;
        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        let mut edges = Vec::new();
        for id in ids {
            let rows = stmt.query_map(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?;
            for row in rows {
                let (from, to, rel_type, json) = row?;
                if !seen.insert((from.clone(), to.clone(), rel_type.clone())) {
                    continue;
                }
                edges.push(StoredEdge {
                    from,
                    to,
                    rel_type: Identifier::from_stored(rel_type),
                    properties: serde_json::from_str(&json)?,
                });
            }
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moma_core::Label;
    use serde_json::json;

    fn node(id: &str, labels: &[Label], props: serde_json::Value) -> StoredNode {
        StoredNode {
            id: id.to_string(),
            labels: labels.iter().map(|l| Identifier::from(*l)).collect(),
            properties: serde_json::from_value(props).unwrap(),
        }
    }

    fn edge(from: &str, to: &str, rel: &str, props: serde_json::Value) -> StoredEdge {
        StoredEdge {
            from: from.to_string(),
            to: to.to_string(),
            rel_type: Identifier::new(rel).unwrap(),
            properties: serde_json::from_value(props).unwrap(),
        }
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_nodes_accumulates_labels_in_order() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .merge_nodes(&[node("d1", &[Label::Csv, Label::Data], json!({"name": "a"}))])
            .unwrap();
        store
            .merge_nodes(&[node("d1", &[Label::Data, Label::FileObject], json!({"sha256": "x"}))])
            .unwrap();

        let got = store.get_nodes(&ids(&["d1"])).unwrap();
        let labels: Vec<&str> = got[0].labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["CSV", "Data", "FileObject"]);
        assert_eq!(got[0].properties["name"], "a");
        assert_eq!(got[0].properties["sha256"], "x");
    }

    #[test]
    fn test_merge_edges_skips_missing_endpoints() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .merge_nodes(&[
                node("ds1", &[Label::Dataset], json!({})),
                node("d1", &[Label::Csv], json!({})),
            ])
            .unwrap();
        let status = store
            .merge_edges(&[
                edge("ds1", "d1", "distribution", json!({})),
                edge("ds1", "nope", "distribution", json!({})),
            ])
            .unwrap();
        assert_eq!(status.written, 1);
        assert_eq!(status.skipped, 1);
    }

    #[test]
    fn test_edge_properties_overlay_on_merge() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .merge_nodes(&[
                node("a", &[Label::Dataset], json!({})),
                node("b", &[Label::RecordSet], json!({})),
            ])
            .unwrap();
        store
            .merge_edges(&[edge("a", "b", "recordSet", json!({"w": 1, "k": "x"}))])
            .unwrap();
        store
            .merge_edges(&[edge("a", "b", "recordSet", json!({"w": 2}))])
            .unwrap();

        let edges = store.find_incident_edges(&ids(&["a", "b"])).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].properties["w"], 2);
        assert_eq!(edges[0].properties["k"], "x");
    }

    #[test]
    fn test_delete_cascades_edges() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .merge_nodes(&[
                node("a", &[Label::Dataset], json!({})),
                node("b", &[Label::RecordSet], json!({})),
            ])
            .unwrap();
        store
            .merge_edges(&[edge("a", "b", "recordSet", json!({}))])
            .unwrap();

        assert_eq!(store.delete_nodes(&ids(&["b", "ghost"])).unwrap(), 1);
        assert!(store.find_incident_edges(&ids(&["a"])).unwrap().is_empty());
        assert!(store.get_nodes(&ids(&["b"])).unwrap().is_empty());
    }

    #[test]
    fn test_overlay_counts_matches_only() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .merge_nodes(&[node("a", &[Label::Dataset], json!({"status": "draft"}))])
            .unwrap();
        let matched = store
            .overlay_properties(&[
                PropertyOverlay {
                    id: "a".to_string(),
                    properties: serde_json::from_value(json!({"status": "published"})).unwrap(),
                },
                PropertyOverlay {
                    id: "missing".to_string(),
                    properties: serde_json::from_value(json!({"status": "x"})).unwrap(),
                },
            ])
            .unwrap();
        assert_eq!(matched, 1);
        let a = &store.get_nodes(&ids(&["a"])).unwrap()[0];
        assert_eq!(a.properties["status"], "published");
        assert!(store.get_nodes(&ids(&["missing"])).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_sanitized_label() {
        let mut store = SqliteStore::in_memory().unwrap();
        let qualified = Identifier::new("cr:FileObject").unwrap();
        store
            .merge_nodes(&[StoredNode {
                id: "d1".to_string(),
                labels: vec![Identifier::from(Label::Csv), qualified.clone()],
                properties: PropertyMap::new(),
            }])
            .unwrap();
        let found = store.find_nodes_by_label(&qualified).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].labels[1].token().unwrap(), "cr:FileObject");
    }
}
